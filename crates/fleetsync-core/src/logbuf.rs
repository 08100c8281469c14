// ── Structured log buffer ──
//
// A bounded ring of structured records, one buffer per logical context
// tag, injected into whatever needs to log (no process-wide singleton).
// Records also flow through `tracing` so normal subscribers see them.

use std::collections::VecDeque;
use std::fs;
use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Retained record count per buffer.
const DEFAULT_CAPACITY: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
    Success,
}

/// One structured log record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogRecord {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub context: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Bounded ring buffer of log records for one context.
pub struct LogBuffer {
    context: String,
    capacity: usize,
    records: Mutex<VecDeque<LogRecord>>,
}

impl LogBuffer {
    pub fn new(context: impl Into<String>) -> Self {
        Self::with_capacity(context, DEFAULT_CAPACITY)
    }

    pub fn with_capacity(context: impl Into<String>, capacity: usize) -> Self {
        Self {
            context: context.into(),
            capacity,
            records: Mutex::new(VecDeque::with_capacity(capacity)),
        }
    }

    pub fn context(&self) -> &str {
        &self.context
    }

    /// Append a record, dropping the oldest once the buffer is full.
    pub fn push(&self, level: LogLevel, message: impl Into<String>) {
        self.push_with(level, message, None, None);
    }

    pub fn push_with(
        &self,
        level: LogLevel,
        message: impl Into<String>,
        data: Option<Value>,
        error: Option<String>,
    ) {
        let record = LogRecord {
            timestamp: Utc::now(),
            level,
            context: self.context.clone(),
            message: message.into(),
            data,
            error,
        };

        match record.level {
            LogLevel::Debug => tracing::debug!(context = %self.context, "{}", record.message),
            LogLevel::Info | LogLevel::Success => {
                tracing::info!(context = %self.context, "{}", record.message);
            }
            LogLevel::Warn => tracing::warn!(context = %self.context, "{}", record.message),
            LogLevel::Error => tracing::error!(context = %self.context, "{}", record.message),
        }

        let mut records = self.records.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        if records.len() == self.capacity {
            records.pop_front();
        }
        records.push_back(record);
    }

    pub fn info(&self, message: impl Into<String>) {
        self.push(LogLevel::Info, message);
    }

    pub fn warn(&self, message: impl Into<String>) {
        self.push(LogLevel::Warn, message);
    }

    pub fn error(&self, message: impl Into<String>, error: impl std::fmt::Display) {
        self.push_with(LogLevel::Error, message, None, Some(error.to_string()));
    }

    pub fn success(&self, message: impl Into<String>) {
        self.push(LogLevel::Success, message);
    }

    /// Copy of the current contents, oldest first.
    pub fn snapshot(&self) -> Vec<LogRecord> {
        self.records
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .iter()
            .cloned()
            .collect()
    }

    /// Persist the current contents as JSON.
    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&self.snapshot())?;
        fs::write(path, json)
    }

    /// Load previously persisted records.
    pub fn load(path: &Path) -> std::io::Result<Vec<LogRecord>> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }
}
