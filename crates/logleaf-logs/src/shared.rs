//! Thread-safe handle around a single [`LogWriter`]

use chrono::{DateTime, TimeZone};
use logleaf_core::Result;
use parking_lot::Mutex;
use std::fmt::Display;
use std::sync::Arc;

use crate::writer::{LogEntry, LogReceipt, LogWriter};

/// Serializes log calls from several threads.
///
/// Each call holds the lock across the size check, rename and append, so
/// callers never race a rotation.
#[derive(Clone)]
pub struct SharedLogWriter {
    inner: Arc<Mutex<LogWriter>>,
}

impl SharedLogWriter {
    pub fn new(writer: LogWriter) -> Self {
        Self {
            inner: Arc::new(Mutex::new(writer)),
        }
    }

    pub fn log(&self, entry: impl Into<LogEntry>) -> Result<LogReceipt> {
        self.inner.lock().log(entry)
    }

    pub fn log_at<Tz>(&self, entry: impl Into<LogEntry>, now: &DateTime<Tz>) -> Result<LogReceipt>
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        self.inner.lock().log_at(entry, now)
    }

    pub fn get_log(&self) -> Result<String> {
        self.inner.lock().get_log()
    }

    /// Run `f` with exclusive access to the writer
    pub fn with_writer<R>(&self, f: impl FnOnce(&mut LogWriter) -> R) -> R {
        f(&mut self.inner.lock())
    }
}

impl From<LogWriter> for SharedLogWriter {
    fn from(writer: LogWriter) -> Self {
        Self::new(writer)
    }
}
