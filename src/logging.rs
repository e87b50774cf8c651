//! Component-tagged log sink.
//!
//! Every entry is mirrored to `tracing` and, when a log file is configured,
//! appended to it as one JSON object per line. Debug entries are dropped
//! unless the relay runs in debug mode.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub component: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<serde_json::Value>,
}

impl LogEntry {
    pub fn new(level: LogLevel, component: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            level,
            component: component.into(),
            message: message.into(),
            context: None,
        }
    }

    pub fn with_context(mut self, ctx: serde_json::Value) -> Self {
        self.context = Some(ctx);
        self
    }

    fn emit_tracing(&self) {
        let component = self.component.as_str();
        let message = self.message.as_str();
        match (self.level, &self.context) {
            (LogLevel::Debug, None) => tracing::debug!(component, "{message}"),
            (LogLevel::Info, None) => tracing::info!(component, "{message}"),
            (LogLevel::Warn, None) => tracing::warn!(component, "{message}"),
            (LogLevel::Error, None) => tracing::error!(component, "{message}"),
            (LogLevel::Debug, Some(ctx)) => tracing::debug!(component, context = %ctx, "{message}"),
            (LogLevel::Info, Some(ctx)) => tracing::info!(component, context = %ctx, "{message}"),
            (LogLevel::Warn, Some(ctx)) => tracing::warn!(component, context = %ctx, "{message}"),
            (LogLevel::Error, Some(ctx)) => tracing::error!(component, context = %ctx, "{message}"),
        }
    }
}

pub struct Logger {
    writer: Option<BufWriter<File>>,
    debug: bool,
}

impl Logger {
    pub fn new(file_path: Option<&Path>, debug: bool) -> std::io::Result<Self> {
        let writer = match file_path {
            Some(path) => {
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    std::fs::create_dir_all(parent)?;
                }
                let file = OpenOptions::new().create(true).append(true).open(path)?;
                Some(BufWriter::new(file))
            }
            None => None,
        };

        Ok(Self { writer, debug })
    }

    pub fn log(&mut self, entry: &LogEntry) {
        if entry.level == LogLevel::Debug && !self.debug {
            return;
        }
        entry.emit_tracing();
        if let Some(ref mut writer) = self.writer {
            if let Ok(json) = serde_json::to_string(entry) {
                let _ = writeln!(writer, "{}", json);
                let _ = writer.flush();
            }
        }
    }
}

#[derive(Clone)]
pub struct SharedLogger {
    inner: Arc<Mutex<Logger>>,
    debug: bool,
}

impl SharedLogger {
    pub fn new(file_path: Option<&Path>, debug: bool) -> std::io::Result<Self> {
        Ok(Self {
            inner: Arc::new(Mutex::new(Logger::new(file_path, debug)?)),
            debug,
        })
    }

    /// Console-only logger (no file).
    pub fn console(debug: bool) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Logger {
                writer: None,
                debug,
            })),
            debug,
        }
    }

    /// Whether debug entries are recorded; lets callers skip building
    /// expensive debug messages.
    pub fn debug_enabled(&self) -> bool {
        self.debug
    }

    pub fn log(&self, entry: LogEntry) {
        if let Ok(mut logger) = self.inner.lock() {
            logger.log(&entry);
        }
    }

    pub fn info(&self, component: impl Into<String>, message: impl Into<String>) {
        self.log(LogEntry::new(LogLevel::Info, component, message));
    }

    pub fn warn(&self, component: impl Into<String>, message: impl Into<String>) {
        self.log(LogEntry::new(LogLevel::Warn, component, message));
    }

    pub fn error(&self, component: impl Into<String>, message: impl Into<String>) {
        self.log(LogEntry::new(LogLevel::Error, component, message));
    }

    pub fn debug(&self, component: impl Into<String>, message: impl Into<String>) {
        if self.debug {
            self.log(LogEntry::new(LogLevel::Debug, component, message));
        }
    }

    pub fn log_with_context(
        &self,
        level: LogLevel,
        component: impl Into<String>,
        message: impl Into<String>,
        context: serde_json::Value,
    ) {
        self.log(LogEntry::new(level, component, message).with_context(context));
    }
}
