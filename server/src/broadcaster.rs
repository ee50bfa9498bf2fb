use common::protocol::ServerMessage;
use common::{ConnectionId, Logger};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};

pub type ClientSender = mpsc::Sender<ServerMessage>;

/// Maps live connections to their outbound channels. Delivery failures are
/// logged, never propagated; a dead channel is cleaned up by the connection's
/// own disconnect handling.
#[derive(Clone)]
pub struct Broadcaster {
    clients: Arc<Mutex<HashMap<ConnectionId, ClientSender>>>,
    logger: Logger,
}

impl std::fmt::Debug for Broadcaster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Broadcaster").finish()
    }
}

impl Broadcaster {
    pub fn new(logger: Logger) -> Self {
        Self {
            clients: Arc::new(Mutex::new(HashMap::new())),
            logger,
        }
    }

    pub async fn register(&self, connection_id: ConnectionId, sender: ClientSender) {
        self.clients.lock().await.insert(connection_id, sender);
    }

    pub async fn unregister(&self, connection_id: &ConnectionId) {
        self.clients.lock().await.remove(connection_id);
    }

    pub async fn is_registered(&self, connection_id: &ConnectionId) -> bool {
        self.clients.lock().await.contains_key(connection_id)
    }

    pub async fn send_to(&self, connection_id: &ConnectionId, message: ServerMessage) {
        let sender = {
            let clients = self.clients.lock().await;
            clients.get(connection_id).cloned()
        };

        match sender {
            Some(sender) => {
                if let Err(e) = sender.send(message).await {
                    self.logger.warn(format!(
                        "Failed to send to client {}: {}",
                        connection_id, e
                    ));
                }
            }
            None => {
                self.logger
                    .warn(format!("No sender registered for client {}", connection_id));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_send_to_registered_connection() {
        let broadcaster = Broadcaster::new(Logger::new(16));
        let connection = ConnectionId::new("conn".to_string());
        let (tx, mut rx) = mpsc::channel(8);

        broadcaster.register(connection.clone(), tx).await;
        assert!(broadcaster.is_registered(&connection).await);

        broadcaster
            .send_to(&connection, ServerMessage::WaitingForOpponent)
            .await;
        assert_eq!(rx.recv().await, Some(ServerMessage::WaitingForOpponent));
    }

    #[tokio::test]
    async fn test_send_to_unknown_connection_is_logged_not_fatal() {
        let logger = Logger::new(16);
        let broadcaster = Broadcaster::new(logger.clone());

        broadcaster
            .send_to(
                &ConnectionId::new("ghost".to_string()),
                ServerMessage::WaitingForOpponent,
            )
            .await;

        assert!(
            logger
                .recent()
                .iter()
                .any(|entry| entry.message.contains("ghost"))
        );
    }

    #[tokio::test]
    async fn test_unregister_removes_the_sender() {
        let broadcaster = Broadcaster::new(Logger::new(16));
        let connection = ConnectionId::new("conn".to_string());
        let (tx, _rx) = mpsc::channel(8);

        broadcaster.register(connection.clone(), tx).await;
        broadcaster.unregister(&connection).await;

        assert!(!broadcaster.is_registered(&connection).await);
    }
}
