//! Log writer: rotation, pruning and appending for one target

use chrono::{DateTime, Local, TimeZone};
use logleaf_core::{
    render_timestamp, validate_timestamp_format, Error, LogTarget, LoggerConfig, RequestContext,
    Result,
};
use logleaf_extract::{client_ip, BuiltinClassifier, Classifier};
use std::fmt::Display;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::format::{format_record, header_line};
use crate::retention::{prune, PruneReport};
use crate::rotation::{rotate, rotate_if_needed, Rotation, RotationState, RotationTrigger};

/// One log call: the caller's values plus the request they came from
#[derive(Debug, Clone, Default)]
pub struct LogEntry {
    pub fields: Vec<String>,
    pub context: RequestContext,
}

impl LogEntry {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            fields: vec![message.into()],
            context: RequestContext::default(),
        }
    }

    pub fn fields<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
            context: RequestContext::default(),
        }
    }

    pub fn with_context(mut self, context: RequestContext) -> Self {
        self.context = context;
        self
    }
}

impl From<&str> for LogEntry {
    fn from(message: &str) -> Self {
        Self::message(message)
    }
}

impl From<String> for LogEntry {
    fn from(message: String) -> Self {
        Self::message(message)
    }
}

/// What a successful log call did
#[derive(Debug, Default)]
pub struct LogReceipt {
    /// Archive created by a rotation before the write
    pub archived: Option<PathBuf>,
    pub pruned: PruneReport,
    pub bytes_written: u64,
}

/// Pipeline stage of a log call, reported when a call is aborted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Idle,
    Rotating,
    Pruning,
    Writing,
}

/// Log writer that handles rotation and retention.
///
/// Not internally synchronized: share it through
/// [`SharedLogWriter`](crate::SharedLogWriter) when several threads log.
pub struct LogWriter {
    target: LogTarget,
    state: RotationState,
    timestamp_format: String,
    classifier: Arc<dyn Classifier>,
}

impl LogWriter {
    /// Open a writer for `target`, creating the file (and header) if needed
    pub fn open(target: LogTarget) -> Result<Self> {
        Self::open_at(target, &Local::now())
    }

    /// Open with the rotation period seeded from `now`
    pub fn open_at<Tz: TimeZone>(target: LogTarget, now: &DateTime<Tz>) -> Result<Self> {
        let path = target.path();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| Error::write_failed(path, e))?;

        if file.metadata()?.len() == 0 {
            if let Some(header) = header_line(&target) {
                file.write_all(header.as_bytes())
                    .map_err(|e| Error::write_failed(path, e))?;
            }
        }

        debug!("Opened log target {}", path.display());

        Ok(Self {
            timestamp_format: target.timestamp_format().to_string(),
            state: RotationState::starting_at(now),
            classifier: Arc::new(BuiltinClassifier),
            target,
        })
    }

    /// Open an existing log, taking the rotation period from the file's
    /// last modification so a week change since then is still noticed
    pub fn resume(target: LogTarget) -> Result<Self> {
        let now = Local::now();
        let state = RotationState::resume(&target, &now)?;
        let mut writer = Self::open_at(target, &now)?;
        writer.state = state;
        Ok(writer)
    }

    /// Build the target from `config` and open it
    pub fn from_config(config: LoggerConfig) -> Result<Self> {
        Self::open(config.build()?)
    }

    /// Replace the browser/OS detection backend
    pub fn with_classifier(mut self, classifier: Arc<dyn Classifier>) -> Self {
        self.classifier = classifier;
        self
    }

    /// Change the timestamp format for subsequent records
    pub fn set_timestamp_format(&mut self, format: impl Into<String>) -> Result<()> {
        let format = format.into();
        validate_timestamp_format(&format)?;
        self.timestamp_format = format;
        Ok(())
    }

    /// Log an entry stamped with the local time
    pub fn log(&mut self, entry: impl Into<LogEntry>) -> Result<LogReceipt> {
        self.log_at(entry, &Local::now())
    }

    /// Log an entry as of `now`.
    ///
    /// Runs rotation, pruning and the append in that order. A failing stage
    /// aborts the call and skips the stages after it; the writer stays
    /// usable. The record is formatted first so a malformed entry never
    /// triggers a rotation.
    pub fn log_at<Tz>(&mut self, entry: impl Into<LogEntry>, now: &DateTime<Tz>) -> Result<LogReceipt>
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        let entry = entry.into();
        let timestamp = render_timestamp(now, &self.timestamp_format)?;
        let context = self.context_values(&entry.context);
        let record = format_record(&self.target, &timestamp, &entry.fields, &context)?;

        let mut stage = Stage::Rotating;
        let result = self.run_stages(&record, now, &mut stage);
        if let Err(e) = &result {
            warn!(?stage, "Log call to {} aborted: {}", self.target.path().display(), e);
        }
        result
    }

    fn run_stages<Tz: TimeZone>(
        &mut self,
        record: &str,
        now: &DateTime<Tz>,
        stage: &mut Stage,
    ) -> Result<LogReceipt> {
        let rotation = rotate_if_needed(&self.target, &mut self.state, now)?;

        *stage = Stage::Pruning;
        let pruned = prune(&self.target, self.target.max_archives())?;
        if !pruned.is_clean() {
            warn!(
                failures = pruned.failures.len(),
                "Some archives of {} could not be pruned",
                self.target.path().display()
            );
        }

        *stage = Stage::Writing;
        let bytes_written = self.append(record)?;

        *stage = Stage::Idle;
        Ok(LogReceipt {
            archived: rotation.and_then(|r| r.archive),
            pruned,
            bytes_written,
        })
    }

    /// Rotate now if a trigger applies, without writing a record
    pub fn rotate_due(&mut self) -> Result<Option<Rotation>> {
        rotate_if_needed(&self.target, &mut self.state, &Local::now())
    }

    /// Archive the active file regardless of period and size
    pub fn rotate_now(&mut self) -> Result<Rotation> {
        rotate(&self.target, &mut self.state, RotationTrigger::Forced, &Local::now())
    }

    /// Append one record, writing the header first into an empty file
    fn append(&self, record: &str) -> Result<u64> {
        let path = self.target.path();
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| Error::write_failed(path, e))?;

        let mut buf = String::new();
        if file.metadata()?.len() == 0 {
            if let Some(header) = header_line(&self.target) {
                buf.push_str(&header);
            }
        }
        buf.push_str(record);

        file.write_all(buf.as_bytes())
            .and_then(|_| file.flush())
            .map_err(|e| Error::write_failed(path, e))?;
        Ok(buf.len() as u64)
    }

    fn context_values(&self, ctx: &RequestContext) -> Vec<String> {
        let columns = self.target.context();
        let mut values = Vec::with_capacity(columns.len());
        if columns.ip {
            values.push(client_ip(ctx));
        }
        if columns.browser_os {
            let ua = ctx.user_agent();
            values.push(self.classifier.browser(ua));
            values.push(self.classifier.os(ua));
        }
        values
    }

    /// Full contents of the active file
    pub fn get_log(&self) -> Result<String> {
        let path = self.target.path();
        fs::read_to_string(path).map_err(|e| Error::read_failed(path, e))
    }

    /// Get the log file path
    pub fn path(&self) -> &Path {
        self.target.path()
    }

    pub fn target(&self) -> &LogTarget {
        &self.target
    }

    pub fn rotation_state(&self) -> RotationState {
        self.state
    }

    pub fn timestamp_format(&self) -> &str {
        &self.timestamp_format
    }

    /// Get current file size
    pub fn current_size(&self) -> Result<u64> {
        Ok(fs::metadata(self.target.path())?.len())
    }
}

impl std::fmt::Debug for LogWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogWriter")
            .field("target", &self.target)
            .field("state", &self.state)
            .field("timestamp_format", &self.timestamp_format)
            .finish_non_exhaustive()
    }
}
