use common::config::Validate;
use common::logger::DEFAULT_LOG_CAPACITY;
use serde::{Deserialize, Serialize};

pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:5000";
pub const DEFAULT_RATE_LIMIT_WINDOW_MS: u64 = 1000;
pub const DEFAULT_MAX_MOVES_PER_WINDOW: u32 = 5;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub listen_addr: String,
    /// Directory served under /ui for the browser front end, if any.
    pub static_files_path: Option<String>,
    pub rate_limit_window_ms: u64,
    pub max_moves_per_window: u32,
    pub log_buffer_capacity: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: DEFAULT_LISTEN_ADDR.to_string(),
            static_files_path: None,
            rate_limit_window_ms: DEFAULT_RATE_LIMIT_WINDOW_MS,
            max_moves_per_window: DEFAULT_MAX_MOVES_PER_WINDOW,
            log_buffer_capacity: DEFAULT_LOG_CAPACITY,
        }
    }
}

impl Validate for ServerConfig {
    fn validate(&self) -> Result<(), String> {
        if self.listen_addr.is_empty() {
            return Err("listen_addr must not be empty".to_string());
        }
        if self.rate_limit_window_ms == 0 {
            return Err("rate_limit_window_ms must be positive".to_string());
        }
        if self.max_moves_per_window == 0 {
            return Err("max_moves_per_window must be positive".to_string());
        }
        if self.log_buffer_capacity == 0 {
            return Err("log_buffer_capacity must be positive".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(ServerConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config: ServerConfig = serde_yaml_ng_from("listen_addr: \"127.0.0.1:9000\"");

        assert_eq!(config.listen_addr, "127.0.0.1:9000");
        assert_eq!(config.max_moves_per_window, DEFAULT_MAX_MOVES_PER_WINDOW);
        assert_eq!(config.rate_limit_window_ms, DEFAULT_RATE_LIMIT_WINDOW_MS);
    }

    #[test]
    fn test_zero_window_is_rejected() {
        let config = ServerConfig {
            rate_limit_window_ms: 0,
            ..ServerConfig::default()
        };

        assert!(config.validate().is_err());
    }

    fn serde_yaml_ng_from(content: &str) -> ServerConfig {
        use common::config::{ConfigSerializer, YamlConfigSerializer};
        YamlConfigSerializer {}.deserialize(content).unwrap()
    }
}
