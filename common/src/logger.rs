use chrono::Local;
use ringbuffer::{AllocRingBuffer, RingBuffer};
use std::sync::{Arc, Mutex};

pub const DEFAULT_LOG_CAPACITY: usize = 1000;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        }
    }
}

#[derive(Clone, Debug)]
pub struct LogEntry {
    pub timestamp: String,
    pub level: LogLevel,
    pub message: String,
}

/// Explicitly constructed logging collaborator. Cloning shares the same
/// bounded entry buffer, so one instance is built at startup and handed to
/// every component.
#[derive(Clone)]
pub struct Logger {
    entries: Arc<Mutex<AllocRingBuffer<LogEntry>>>,
}

impl Logger {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Arc::new(Mutex::new(AllocRingBuffer::new(capacity.max(1)))),
        }
    }

    pub fn log(&self, level: LogLevel, message: &str) {
        let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
        println!("[{}][{}] {}", timestamp, level.as_str(), message);

        let entry = LogEntry {
            timestamp,
            level,
            message: message.to_string(),
        };
        if let Ok(mut entries) = self.entries.lock() {
            entries.enqueue(entry);
        }
    }

    pub fn debug(&self, message: impl AsRef<str>) {
        self.log(LogLevel::Debug, message.as_ref());
    }

    pub fn info(&self, message: impl AsRef<str>) {
        self.log(LogLevel::Info, message.as_ref());
    }

    pub fn warn(&self, message: impl AsRef<str>) {
        self.log(LogLevel::Warn, message.as_ref());
    }

    pub fn error(&self, message: impl AsRef<str>) {
        self.log(LogLevel::Error, message.as_ref());
    }

    /// Retained entries, oldest first. The buffer drops the oldest entry once
    /// capacity is reached.
    pub fn recent(&self) -> Vec<LogEntry> {
        match self.entries.lock() {
            Ok(entries) => entries.iter().cloned().collect(),
            Err(_) => Vec::new(),
        }
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new(DEFAULT_LOG_CAPACITY)
    }
}
