pub mod config;
pub mod engine;
pub mod error;
pub mod id_generator;
pub mod identifiers;
pub mod logger;
pub mod protocol;

pub use error::GameError;
pub use identifiers::*;
pub use logger::{LogEntry, LogLevel, Logger};
