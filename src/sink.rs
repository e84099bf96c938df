//! Status lines produced while a run is in progress.
//!
//! Components never print directly; they append [`LogEntry`] values to a
//! [`LogSink`] handed to them by the caller. The session forwards entries to
//! the foreground over a channel, tests collect them in memory.

use serde::Serialize;
use std::sync::Mutex;
use tokio::sync::mpsc::UnboundedSender;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogEntry {
    pub level: LogLevel,
    pub message: String,
}

impl LogEntry {
    pub fn new<S: Into<String>>(level: LogLevel, message: S) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }

    pub fn info<S: Into<String>>(message: S) -> Self {
        Self::new(LogLevel::Info, message)
    }

    pub fn success<S: Into<String>>(message: S) -> Self {
        Self::new(LogLevel::Success, message)
    }

    pub fn warning<S: Into<String>>(message: S) -> Self {
        Self::new(LogLevel::Warning, message)
    }

    pub fn error<S: Into<String>>(message: S) -> Self {
        Self::new(LogLevel::Error, message)
    }
}

pub trait LogSink: Send + Sync {
    fn append(&self, entry: LogEntry);
}

/// Forwards entries to whoever holds the receiving end.
pub struct ChannelSink<T> {
    sender: UnboundedSender<T>,
}

impl<T> ChannelSink<T>
where
    T: From<LogEntry> + Send,
{
    pub fn new(sender: UnboundedSender<T>) -> Self {
        Self { sender }
    }
}

impl<T> LogSink for ChannelSink<T>
where
    T: From<LogEntry> + Send,
{
    fn append(&self, entry: LogEntry) {
        // A dropped receiver means nobody is displaying the log anymore.
        if self.sender.send(T::from(entry)).is_err() {
            tracing::trace!("log receiver dropped");
        }
    }
}

/// Keeps every entry in memory.
#[derive(Default)]
pub struct MemorySink {
    entries: Mutex<Vec<LogEntry>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries
            .lock()
            .map(|entries| entries.clone())
            .unwrap_or_default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.entries().into_iter().map(|e| e.message).collect()
    }
}

impl LogSink for MemorySink {
    fn append(&self, entry: LogEntry) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.push(entry);
        }
    }
}
