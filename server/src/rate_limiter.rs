use common::{ConnectionId, GameError};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

struct WindowState {
    count: u32,
    window_start: Instant,
}

/// Fixed-window move counter per connection. Overflowing operations are
/// rejected outright, never queued or delayed. Windows reset lazily on the
/// first operation after expiry; there is no background sweep.
#[derive(Clone)]
pub struct RateLimiter {
    window: Duration,
    max_operations: u32,
    counters: Arc<Mutex<HashMap<ConnectionId, WindowState>>>,
}

impl RateLimiter {
    pub fn new(window: Duration, max_operations: u32) -> Self {
        Self {
            window,
            max_operations,
            counters: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub async fn check(&self, connection_id: &ConnectionId) -> Result<(), GameError> {
        self.check_at(connection_id, Instant::now()).await
    }

    pub async fn check_at(
        &self,
        connection_id: &ConnectionId,
        now: Instant,
    ) -> Result<(), GameError> {
        let mut counters = self.counters.lock().await;

        match counters.get_mut(connection_id) {
            Some(state) if now.duration_since(state.window_start) <= self.window => {
                if state.count >= self.max_operations {
                    return Err(GameError::RateLimit(
                        "Too many moves. Please wait a moment.".to_string(),
                    ));
                }
                state.count += 1;
                Ok(())
            }
            _ => {
                counters.insert(
                    connection_id.clone(),
                    WindowState {
                        count: 1,
                        window_start: now,
                    },
                );
                Ok(())
            }
        }
    }

    pub async fn remove(&self, connection_id: &ConnectionId) {
        self.counters.lock().await.remove(connection_id);
    }
}
