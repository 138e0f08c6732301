//! File logger implementation
//!
//! Writes timestamped log lines to a file. Useful when stderr/stdout is not
//! visible, e.g. when the adapter runs embedded in a plugin host.

use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::SystemTime;

use super::traits::Logger;

/// Minimum severity a [`FileLogger`] will write
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug = 0,
    Info = 1,
    Warn = 2,
    Error = 3,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Debug => write!(f, "DEBUG"),
            LogLevel::Info => write!(f, "INFO "),
            LogLevel::Warn => write!(f, "WARN "),
            LogLevel::Error => write!(f, "ERROR"),
        }
    }
}

impl LogLevel {
    /// Parse a level name, case-insensitive. Unknown names fall back to Debug.
    pub fn parse(value: &str) -> Self {
        match value.to_lowercase().as_str() {
            "info" => LogLevel::Info,
            "warn" => LogLevel::Warn,
            "error" => LogLevel::Error,
            _ => LogLevel::Debug,
        }
    }

    /// Level from the `MCP_ADAPTER_LOG_LEVEL` environment variable,
    /// defaulting to Debug when unset.
    pub fn from_env() -> Self {
        std::env::var("MCP_ADAPTER_LOG_LEVEL")
            .map(|v| Self::parse(&v))
            .unwrap_or(LogLevel::Debug)
    }
}

/// A logger that appends timestamped lines to a file
///
/// Lines below `min_level` are dropped. The file handle is behind a mutex;
/// each line is flushed so a crash loses at most the line being written.
pub struct FileLogger {
    path: PathBuf,
    min_level: LogLevel,
    file: Mutex<File>,
}

impl FileLogger {
    /// Open (or create) the log file in append mode. The minimum level is
    /// read from `MCP_ADAPTER_LOG_LEVEL`.
    pub fn open(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            path,
            min_level: LogLevel::from_env(),
            file: Mutex::new(file),
        })
    }

    /// Override the minimum level
    pub fn with_min_level(mut self, level: LogLevel) -> Self {
        self.min_level = level;
        self
    }

    /// Path the logger writes to
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_line(&self, level: LogLevel, message: &str) {
        if level < self.min_level {
            return;
        }
        let timestamp = Self::timestamp();
        // A poisoned or failed write is swallowed; logging must never
        // take the adapter down.
        if let Ok(mut file) = self.file.lock() {
            let _ = writeln!(file, "[{}] [{}] {}", timestamp, level, message);
            let _ = file.flush();
        }
    }

    fn timestamp() -> String {
        SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .map(|d| {
                let secs = d.as_secs();
                let millis = d.subsec_millis();
                let hours = (secs % 86400) / 3600;
                let mins = (secs % 3600) / 60;
                let secs = secs % 60;
                format!("{:02}:{:02}:{:02}.{:03}", hours, mins, secs, millis)
            })
            .unwrap_or_else(|_| "??:??:??.???".to_string())
    }
}

impl Logger for FileLogger {
    fn debug(&self, message: &str) {
        self.write_line(LogLevel::Debug, message);
    }

    fn info(&self, message: &str) {
        self.write_line(LogLevel::Info, message);
    }

    fn warn(&self, message: &str) {
        self.write_line(LogLevel::Warn, message);
    }

    fn error(&self, message: &str) {
        self.write_line(LogLevel::Error, message);
    }
}
