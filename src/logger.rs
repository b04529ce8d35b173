use crate::config::PublisherConfig;
use chrono::{DateTime, Utc};
use crossbeam_channel::{bounded, unbounded, Receiver, Sender};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

/// Log level enum for type-safe logging
#[derive(
    Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug = 0,
    #[default]
    Info = 1,
    Warn = 2,
    Error = 3,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "debug" => Some(LogLevel::Debug),
            "info" => Some(LogLevel::Info),
            "warn" | "warning" => Some(LogLevel::Warn),
            "error" => Some(LogLevel::Error),
            _ => None,
        }
    }

    fn from_u8(value: u8) -> Self {
        match value {
            0 => LogLevel::Debug,
            1 => LogLevel::Info,
            2 => LogLevel::Warn,
            _ => LogLevel::Error,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Destination for engine log lines.
///
/// The manager receives a sink at construction instead of reaching for a
/// process-wide logger, so hosts decide where pipeline logs end up.
pub trait LogSink: Send + Sync {
    fn log(&self, level: LogLevel, message: &str, source: &'static str);
}

/// Forwards log lines to `tracing`. This is the default sink.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn log(&self, level: LogLevel, message: &str, source: &'static str) {
        match level {
            LogLevel::Error => tracing::error!(source, "{}", message),
            LogLevel::Warn => tracing::warn!(source, "{}", message),
            LogLevel::Info => tracing::info!(source, "{}", message),
            LogLevel::Debug => tracing::debug!(source, "{}", message),
        }
    }
}

/// Cheap, cloneable handle that filters by level before hitting the sink.
#[derive(Clone)]
pub struct LogHandle {
    sink: Arc<dyn LogSink>,
    min_level: LogLevel,
}

impl LogHandle {
    pub fn new(sink: Arc<dyn LogSink>, min_level: LogLevel) -> Self {
        Self { sink, min_level }
    }

    pub fn min_level(&self) -> LogLevel {
        self.min_level
    }

    pub fn log(&self, level: LogLevel, message: &str, source: &'static str) {
        if level < self.min_level {
            return;
        }
        self.sink.log(level, message, source);
    }
}

impl Default for LogHandle {
    fn default() -> Self {
        Self::new(Arc::new(TracingSink), LogLevel::Info)
    }
}

impl fmt::Debug for LogHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogHandle")
            .field("min_level", &self.min_level)
            .finish_non_exhaustive()
    }
}

/// Log entry kept by [`MemoryLogger`]
#[derive(Debug, Clone, Serialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub message: String,
    pub source: &'static str,
}

/// Simple circular buffer for fixed-size log storage
struct CircularBuffer {
    buffer: Vec<LogEntry>,
    head: usize,
    size: usize,
    capacity: usize,
}

impl CircularBuffer {
    fn new(capacity: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(capacity),
            head: 0,
            size: 0,
            capacity,
        }
    }

    fn push(&mut self, item: LogEntry) {
        if self.size < self.capacity {
            self.buffer.push(item);
            self.size += 1;
        } else {
            self.buffer[self.head] = item;
            self.head = (self.head + 1) % self.capacity;
        }
    }

    fn to_vec(&self) -> Vec<LogEntry> {
        if self.size < self.capacity {
            self.buffer.clone()
        } else {
            // Return items in chronological order
            let mut result = Vec::with_capacity(self.size);
            result.extend_from_slice(&self.buffer[self.head..]);
            result.extend_from_slice(&self.buffer[..self.head]);
            result
        }
    }

    fn clear(&mut self) {
        self.buffer.clear();
        self.head = 0;
        self.size = 0;
    }
}

/// Commands for the logger thread
enum LogCommand {
    Log(LogEntry),
    GetLogs(Sender<Vec<LogEntry>>),
    Clear,
}

/// In-memory sink backing a UI log pane.
///
/// Entries are handed to a background thread over an unbounded channel and
/// kept in a ring buffer of `capacity` entries. Once the ring is full the
/// oldest entries are overwritten.
pub struct MemoryLogger {
    sender: Sender<LogCommand>,
    min_level: Arc<AtomicU8>,
}

impl MemoryLogger {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (sender, receiver) = unbounded();
        let min_level = Arc::new(AtomicU8::new(LogLevel::Debug as u8));

        std::thread::spawn(move || {
            Self::logger_thread(receiver, capacity);
        });

        Self { sender, min_level }
    }

    /// Background thread that manages the log buffer
    fn logger_thread(receiver: Receiver<LogCommand>, capacity: usize) {
        let mut buffer = CircularBuffer::new(capacity);

        for cmd in receiver {
            match cmd {
                LogCommand::Log(entry) => buffer.push(entry),
                LogCommand::GetLogs(response_tx) => {
                    let _ = response_tx.send(buffer.to_vec());
                }
                LogCommand::Clear => buffer.clear(),
            }
        }
    }

    /// Set minimum log level (runtime filtering)
    pub fn set_min_level(&self, level: LogLevel) {
        self.min_level.store(level as u8, Ordering::Relaxed);
    }

    pub fn min_level(&self) -> LogLevel {
        LogLevel::from_u8(self.min_level.load(Ordering::Relaxed))
    }

    pub fn get_logs(&self) -> Vec<LogEntry> {
        let (response_tx, response_rx) = bounded(1);
        if self.sender.send(LogCommand::GetLogs(response_tx)).is_ok() {
            response_rx.recv().unwrap_or_default()
        } else {
            Vec::new()
        }
    }

    pub fn clear_logs(&self) {
        let _ = self.sender.send(LogCommand::Clear);
    }
}

impl MemoryLogger {
    /// Sized and filtered from the engine config
    pub fn from_config(config: &PublisherConfig) -> Self {
        let logger = Self::new(config.log_capacity);
        logger.set_min_level(config.log_level);
        logger
    }
}

impl Default for MemoryLogger {
    fn default() -> Self {
        Self::new(1000)
    }
}

impl LogSink for MemoryLogger {
    fn log(&self, level: LogLevel, message: &str, source: &'static str) {
        if (level as u8) < self.min_level.load(Ordering::Relaxed) {
            return;
        }

        let entry = LogEntry {
            timestamp: Utc::now(),
            level,
            message: message.to_string(),
            source,
        };

        // Never blocks; only fails once the logger thread is gone
        let _ = self.sender.send(LogCommand::Log(entry));
    }
}
