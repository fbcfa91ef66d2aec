//! Leveled log sinks.
//!
//! The core never logs through process-wide state. Every component takes a
//! `&dyn LogSink` and the caller decides where records end up: `tracing`
//! (and from there the console and the run log file), memory, or nowhere.

use std::sync::Mutex;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

/// One (timestamp, level, message) triple.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogRecord {
    pub timestamp: DateTime<Local>,
    pub level: LogLevel,
    pub message: String,
}

impl LogRecord {
    pub fn now(level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            timestamp: Local::now(),
            level,
            message: message.into(),
        }
    }
}

/// Destination for log records emitted while organizing.
pub trait LogSink: Send + Sync {
    fn record(&self, record: &LogRecord);

    fn debug(&self, message: &str) {
        self.record(&LogRecord::now(LogLevel::Debug, message));
    }

    fn info(&self, message: &str) {
        self.record(&LogRecord::now(LogLevel::Info, message));
    }

    fn warn(&self, message: &str) {
        self.record(&LogRecord::now(LogLevel::Warn, message));
    }

    fn error(&self, message: &str) {
        self.record(&LogRecord::now(LogLevel::Error, message));
    }
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl LogSink for NullSink {
    fn record(&self, _record: &LogRecord) {}
}

/// Forwards records to `tracing` so whatever subscriber the binary installed
/// renders them.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn record(&self, record: &LogRecord) {
        match record.level {
            LogLevel::Debug => tracing::debug!("{}", record.message),
            LogLevel::Info => tracing::info!("{}", record.message),
            LogLevel::Warn => tracing::warn!("{}", record.message),
            LogLevel::Error => tracing::error!("{}", record.message),
        }
    }
}

/// Keeps every record in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<LogRecord>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<LogRecord> {
        match self.records.lock() {
            Ok(r) => r.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// True if any record at `level` contains `needle`.
    pub fn contains(&self, level: LogLevel, needle: &str) -> bool {
        self.records()
            .iter()
            .any(|r| r.level == level && r.message.contains(needle))
    }
}

impl LogSink for MemorySink {
    fn record(&self, record: &LogRecord) {
        match self.records.lock() {
            Ok(mut r) => r.push(record.clone()),
            Err(poisoned) => poisoned.into_inner().push(record.clone()),
        }
    }
}
