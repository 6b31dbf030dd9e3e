//! Retention pruning of rotated archives

use glob::Pattern;
use logleaf_core::{Error, LogTarget, Result};
use std::cmp::Reverse;
use std::fs;
use std::path::PathBuf;
use std::time::SystemTime;
use tracing::{debug, info, warn};

use crate::archive::ArchiveName;

/// An archive file found on disk
#[derive(Debug, Clone)]
pub struct ArchiveInfo {
    pub path: PathBuf,
    /// Parsed name, `None` for files that only match the glob
    pub name: Option<ArchiveName>,
    pub size: u64,
    pub modified: SystemTime,
}

/// A deletion that did not go through
#[derive(Debug)]
pub struct PruneFailure {
    pub path: PathBuf,
    pub error: std::io::Error,
}

/// Result of one pruning pass
#[derive(Debug, Default)]
pub struct PruneReport {
    /// Archives left after pruning
    pub kept: usize,
    pub deleted: Vec<PathBuf>,
    pub failures: Vec<PruneFailure>,
}

impl PruneReport {
    /// Number of archives actually removed
    pub fn deleted_count(&self) -> usize {
        self.deleted.len()
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Glob matching every archive of `target`
fn archive_pattern(target: &LogTarget) -> String {
    format!(
        "{} {} *",
        Pattern::escape(&target.path().to_string_lossy()),
        Pattern::escape(target.archive_prefix())
    )
}

/// List archives of `target`, newest first.
///
/// Ties on modification time fall back to the encoded period and counter,
/// then the file name, so the order is stable between runs.
pub fn list_archives(target: &LogTarget) -> Result<Vec<ArchiveInfo>> {
    let pattern = archive_pattern(target);
    let entries = glob::glob(&pattern).map_err(|e| Error::Pattern(e.to_string()))?;

    let mut archives = Vec::new();
    for entry in entries {
        let path = match entry {
            Ok(path) => path,
            Err(e) => {
                warn!("Skipping unreadable archive entry: {}", e);
                continue;
            }
        };

        let meta = match fs::metadata(&path) {
            Ok(meta) if meta.is_file() => meta,
            Ok(_) => continue,
            Err(e) => {
                debug!("Archive vanished during scan {}: {}", path.display(), e);
                continue;
            }
        };

        archives.push(ArchiveInfo {
            name: ArchiveName::parse(target, &path),
            size: meta.len(),
            modified: meta.modified()?,
            path,
        });
    }

    archives.sort_by(|a, b| {
        (Reverse(a.modified), Reverse(a.name), Reverse(&a.path)).cmp(&(
            Reverse(b.modified),
            Reverse(b.name),
            Reverse(&b.path),
        ))
    });
    Ok(archives)
}

/// Delete all but the `max_archives` most recent archives.
///
/// Listing failures abort; individual deletion failures are collected in
/// the report and the remaining candidates are still processed.
pub fn prune(target: &LogTarget, max_archives: usize) -> Result<PruneReport> {
    let archives = list_archives(target)?;
    Ok(remove_beyond(target, archives, max_archives))
}

/// Delete everything past the first `max_archives` of an already sorted listing
fn remove_beyond(target: &LogTarget, archives: Vec<ArchiveInfo>, max_archives: usize) -> PruneReport {
    let mut report = PruneReport {
        kept: archives.len().min(max_archives),
        ..Default::default()
    };

    for archive in archives.into_iter().skip(max_archives) {
        match fs::remove_file(&archive.path) {
            Ok(()) => {
                debug!("Pruned archive {}", archive.path.display());
                report.deleted.push(archive.path);
            }
            Err(error) => {
                warn!("Failed to prune {}: {}", archive.path.display(), error);
                report.kept += 1;
                report.failures.push(PruneFailure {
                    path: archive.path,
                    error,
                });
            }
        }
    }

    if report.deleted_count() > 0 {
        info!(
            deleted = report.deleted_count(),
            kept = report.kept,
            "Pruned archives of {}",
            target.path().display()
        );
    }
    report
}
