use common::ConnectionId;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::Mutex;

pub enum FindGameOutcome {
    Paired { opponent: ConnectionId },
    Waiting,
}

/// FIFO waiting list pairing unmatched connections. The queue never holds
/// the same connection twice.
#[derive(Clone, Default)]
pub struct Matchmaker {
    queue: Arc<Mutex<VecDeque<ConnectionId>>>,
}

impl Matchmaker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pops the longest-waiting connection as the opponent, unless that is
    /// the requester itself (a repeated findGame keeps it waiting).
    pub async fn find_game(&self, connection_id: &ConnectionId) -> FindGameOutcome {
        let mut queue = self.queue.lock().await;

        if queue.front() == Some(connection_id) {
            return FindGameOutcome::Waiting;
        }

        if let Some(opponent) = queue.pop_front() {
            return FindGameOutcome::Paired { opponent };
        }

        queue.push_back(connection_id.clone());
        FindGameOutcome::Waiting
    }

    /// Puts a popped opponent back at the head after a failed pairing, so it
    /// keeps its place in line.
    pub async fn requeue_front(&self, connection_id: ConnectionId) {
        let mut queue = self.queue.lock().await;
        if !queue.contains(&connection_id) {
            queue.push_front(connection_id);
        }
    }

    pub async fn remove(&self, connection_id: &ConnectionId) -> bool {
        let mut queue = self.queue.lock().await;
        let before = queue.len();
        queue.retain(|waiting| waiting != connection_id);
        queue.len() != before
    }

    pub async fn waiting_count(&self) -> usize {
        self.queue.lock().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conn(id: &str) -> ConnectionId {
        ConnectionId::new(id.to_string())
    }

    #[tokio::test]
    async fn test_first_requester_waits() {
        let matchmaker = Matchmaker::new();

        assert!(matches!(
            matchmaker.find_game(&conn("a")).await,
            FindGameOutcome::Waiting
        ));
        assert_eq!(matchmaker.waiting_count().await, 1);
    }

    #[tokio::test]
    async fn test_pairing_is_fifo_fair() {
        let matchmaker = Matchmaker::new();

        matchmaker.find_game(&conn("a")).await;

        let outcome = matchmaker.find_game(&conn("b")).await;
        match outcome {
            FindGameOutcome::Paired { opponent } => assert_eq!(opponent, conn("a")),
            FindGameOutcome::Waiting => panic!("expected a pairing"),
        }

        assert!(matches!(
            matchmaker.find_game(&conn("c")).await,
            FindGameOutcome::Waiting
        ));
        assert_eq!(matchmaker.waiting_count().await, 1);
    }

    #[tokio::test]
    async fn test_repeated_find_game_does_not_self_match() {
        let matchmaker = Matchmaker::new();

        matchmaker.find_game(&conn("a")).await;
        assert!(matches!(
            matchmaker.find_game(&conn("a")).await,
            FindGameOutcome::Waiting
        ));
        assert_eq!(matchmaker.waiting_count().await, 1);
    }

    #[tokio::test]
    async fn test_requeue_front_restores_priority() {
        let matchmaker = Matchmaker::new();

        matchmaker.find_game(&conn("a")).await;
        matchmaker.find_game(&conn("b")).await;
        matchmaker.requeue_front(conn("a")).await;

        let outcome = matchmaker.find_game(&conn("c")).await;
        match outcome {
            FindGameOutcome::Paired { opponent } => assert_eq!(opponent, conn("a")),
            FindGameOutcome::Waiting => panic!("expected a pairing"),
        }
    }

    #[tokio::test]
    async fn test_remove_drops_a_waiting_connection() {
        let matchmaker = Matchmaker::new();

        matchmaker.find_game(&conn("a")).await;
        assert!(matchmaker.remove(&conn("a")).await);
        assert!(!matchmaker.remove(&conn("a")).await);
        assert_eq!(matchmaker.waiting_count().await, 0);
    }
}
