//! Archive naming: `<path> <prefix> <week> <year> <counter>`

use logleaf_core::{LogTarget, PeriodKey};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Period and counter encoded in an archive file name
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ArchiveName {
    pub period: PeriodKey,
    pub counter: u32,
}

impl ArchiveName {
    pub fn new(period: PeriodKey, counter: u32) -> Self {
        Self { period, counter }
    }

    /// Path of this archive next to the target's active file
    pub fn path_for(&self, target: &LogTarget) -> PathBuf {
        let mut name = OsString::from(target.path().as_os_str());
        name.push(format!(
            " {} {} {}",
            target.archive_prefix(),
            self.period.label(),
            self.counter
        ));
        PathBuf::from(name)
    }

    /// Recover period and counter from an archive path of `target`
    pub fn parse(target: &LogTarget, path: &Path) -> Option<Self> {
        let active = target.path().file_name()?.to_str()?;
        let name = path.file_name()?.to_str()?;
        let rest = name
            .strip_prefix(active)?
            .strip_prefix(' ')?
            .strip_prefix(target.archive_prefix())?
            .strip_prefix(' ')?;

        let mut parts = rest.split(' ');
        let week = parts.next()?.parse().ok()?;
        let year = parts.next()?.parse().ok()?;
        let counter = parts.next()?.parse().ok()?;
        if parts.next().is_some() {
            return None;
        }
        Some(Self::new(PeriodKey::new(year, week), counter))
    }
}

/// Smallest-counter archive path for `period` that does not exist yet
pub fn next_archive_name(target: &LogTarget, period: PeriodKey) -> PathBuf {
    let mut counter = 1;
    loop {
        let path = ArchiveName::new(period, counter).path_for(target);
        if !path.exists() {
            return path;
        }
        counter += 1;
    }
}
