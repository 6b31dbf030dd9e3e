//! LogLeaf Logs - Record formatting, rotation, retention and streaming
//!
//! - [`LogWriter`] - appends records, rotating and pruning first
//! - [`rotation`] - week/size rotation policy
//! - [`retention`] - archive enumeration and pruning
//! - [`format`] - plain and delimited record rendering
//! - [`LogReader`] - read-back, tail and follow

mod archive;
pub mod format;
mod reader;
pub mod retention;
pub mod rotation;
mod shared;
mod writer;

pub use archive::{next_archive_name, ArchiveName};
pub use reader::LogReader;
pub use retention::{list_archives, prune, ArchiveInfo, PruneFailure, PruneReport};
pub use rotation::{Rotation, RotationState, RotationTrigger};
pub use shared::SharedLogWriter;
pub use writer::{LogEntry, LogReceipt, LogWriter, Stage};

use logleaf_core::{LoggerConfig, Result};

/// Build a target from `config` and open a writer for it
pub fn open(config: LoggerConfig) -> Result<LogWriter> {
    LogWriter::from_config(config)
}
