//! Week and size based log rotation

use chrono::{DateTime, Local, TimeZone};
use logleaf_core::{Error, LogTarget, PeriodKey, Result};
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::PathBuf;
use tracing::{debug, info};

use crate::archive::next_archive_name;
use crate::format::{header_len, header_line};

/// Period the active file was last rotated in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RotationState {
    last_period: PeriodKey,
}

impl RotationState {
    pub fn new(last_period: PeriodKey) -> Self {
        Self { last_period }
    }

    /// State for a file first opened at `now`
    pub fn starting_at<Tz: TimeZone>(now: &DateTime<Tz>) -> Self {
        Self::new(PeriodKey::of(now))
    }

    /// State for an existing file: the period of its last modification,
    /// or of `now` when it holds no records yet
    pub fn resume<Tz: TimeZone>(target: &LogTarget, now: &DateTime<Tz>) -> Result<Self> {
        let path = target.path();
        let meta = match fs::metadata(path) {
            Ok(meta) => meta,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Self::starting_at(now)),
            Err(e) => return Err(Error::rotation(path, e)),
        };
        if !has_records(target, meta.len()) {
            return Ok(Self::starting_at(now));
        }

        let modified: DateTime<Local> = meta.modified()?.into();
        Ok(Self::new(PeriodKey::of(&modified)))
    }

    pub fn last_period(&self) -> PeriodKey {
        self.last_period
    }
}

/// Why a rotation is due
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationTrigger {
    /// The period of `now` differs from the last rotation period.
    /// A clock rollback also lands here.
    PeriodChanged { from: PeriodKey, to: PeriodKey },
    /// The active file reached the size ceiling within the same period
    SizeExceeded { size: u64, limit: u64 },
    /// Requested by the caller
    Forced,
}

/// Outcome of a rotation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rotation {
    pub trigger: RotationTrigger,
    /// Where the previous content went; `None` when the file held no records
    pub archive: Option<PathBuf>,
    pub state: RotationState,
}

/// Decide whether the active file must be archived before the next write
pub fn check<Tz: TimeZone>(
    target: &LogTarget,
    state: &RotationState,
    now: &DateTime<Tz>,
) -> Result<Option<RotationTrigger>> {
    let current = PeriodKey::of(now);
    if current != state.last_period {
        return Ok(Some(RotationTrigger::PeriodChanged {
            from: state.last_period,
            to: current,
        }));
    }

    let size = active_size(target)?;
    if has_records(target, size) && size >= target.max_size_bytes() {
        return Ok(Some(RotationTrigger::SizeExceeded {
            size,
            limit: target.max_size_bytes(),
        }));
    }

    Ok(None)
}

pub fn should_rotate<Tz: TimeZone>(
    target: &LogTarget,
    state: &RotationState,
    now: &DateTime<Tz>,
) -> Result<bool> {
    Ok(check(target, state, now)?.is_some())
}

/// Rotate if a trigger applies. `state` is only updated on success.
pub fn rotate_if_needed<Tz: TimeZone>(
    target: &LogTarget,
    state: &mut RotationState,
    now: &DateTime<Tz>,
) -> Result<Option<Rotation>> {
    match check(target, state, now)? {
        Some(trigger) => rotate(target, state, trigger, now).map(Some),
        None => Ok(None),
    }
}

/// Archive the active file and start a fresh one.
///
/// The archive is labelled with the period its content was written in.
/// A file without records is left in place and only the period advances.
pub fn rotate<Tz: TimeZone>(
    target: &LogTarget,
    state: &mut RotationState,
    trigger: RotationTrigger,
    now: &DateTime<Tz>,
) -> Result<Rotation> {
    let path = target.path();
    let current = PeriodKey::of(now);
    let size = active_size(target)?;

    let archive = if has_records(target, size) {
        let archive = next_archive_name(target, state.last_period);
        debug!(
            "Rotating {} to {} ({:?})",
            path.display(),
            archive.display(),
            trigger
        );

        fs::rename(path, &archive).map_err(|e| Error::rotation(path, e))?;
        start_fresh_file(target)?;
        info!(archive = %archive.display(), "Log file rotated");
        Some(archive)
    } else {
        if size == 0 && !path.exists() {
            start_fresh_file(target)?;
        }
        debug!("Nothing to archive in {}, advancing period", path.display());
        None
    };

    state.last_period = current;
    Ok(Rotation {
        trigger,
        archive,
        state: *state,
    })
}

/// Create an empty active file, re-emitting the header when configured
fn start_fresh_file(target: &LogTarget) -> Result<()> {
    let path = target.path();
    let mut file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(path)
        .map_err(|e| Error::rotation(path, e))?;

    if let Some(header) = header_line(target) {
        file.write_all(header.as_bytes())
            .and_then(|_| file.flush())
            .map_err(|e| Error::rotation(path, e))?;
    }
    Ok(())
}

/// Size of the active file; a missing file counts as empty
fn active_size(target: &LogTarget) -> Result<u64> {
    match fs::metadata(target.path()) {
        Ok(meta) => Ok(meta.len()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(0),
        Err(e) => Err(Error::rotation(target.path(), e)),
    }
}

fn has_records(target: &LogTarget, size: u64) -> bool {
    size > header_len(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use logleaf_core::LoggerConfig;
    use tempfile::TempDir;

    fn week(n: u32) -> DateTime<Utc> {
        // 2024-01-01 is the Monday of ISO week 1
        Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap() + chrono::Duration::weeks(n as i64 - 1)
    }

    #[test]
    fn test_no_rotation_within_period() {
        let dir = TempDir::new().unwrap();
        let target = LoggerConfig::new(dir.path().join("app.txt")).build().unwrap();
        fs::write(target.path(), "line\n").unwrap();

        let state = RotationState::starting_at(&week(1));
        assert!(!should_rotate(&target, &state, &week(1)).unwrap());
    }

    #[test]
    fn test_period_change_triggers() {
        let dir = TempDir::new().unwrap();
        let target = LoggerConfig::new(dir.path().join("app.txt")).build().unwrap();
        let state = RotationState::starting_at(&week(1));

        let trigger = check(&target, &state, &week(2)).unwrap();
        assert_eq!(
            trigger,
            Some(RotationTrigger::PeriodChanged {
                from: PeriodKey::new(2024, 1),
                to: PeriodKey::new(2024, 2),
            })
        );
    }

    #[test]
    fn test_same_week_number_next_year_triggers() {
        let dir = TempDir::new().unwrap();
        let target = LoggerConfig::new(dir.path().join("app.txt")).build().unwrap();
        fs::write(target.path(), "early january\n").unwrap();

        // 2024-12-30 falls in ISO week 1 of 2025
        let now = Utc.with_ymd_and_hms(2024, 12, 30, 10, 0, 0).unwrap();
        let mut state = RotationState::new(PeriodKey::new(2024, 1));
        assert_eq!(
            check(&target, &state, &now).unwrap(),
            Some(RotationTrigger::PeriodChanged {
                from: PeriodKey::new(2024, 1),
                to: PeriodKey::new(2025, 1),
            })
        );

        let rotation = rotate_if_needed(&target, &mut state, &now).unwrap().unwrap();
        assert_eq!(
            rotation.archive.unwrap(),
            dir.path().join("app.txt Week 1 2024 1")
        );
        assert_eq!(state.last_period(), PeriodKey::new(2025, 1));
    }

    #[test]
    fn test_clock_rollback_triggers() {
        let dir = TempDir::new().unwrap();
        let target = LoggerConfig::new(dir.path().join("app.txt")).build().unwrap();
        let state = RotationState::starting_at(&week(5));
        assert!(should_rotate(&target, &state, &week(4)).unwrap());
    }

    #[test]
    fn test_size_trigger() {
        let dir = TempDir::new().unwrap();
        let target = LoggerConfig::new(dir.path().join("app.txt"))
            .with_max_size(100)
            .build()
            .unwrap();
        let state = RotationState::starting_at(&week(1));

        fs::write(target.path(), vec![b'x'; 99]).unwrap();
        assert!(!should_rotate(&target, &state, &week(1)).unwrap());

        fs::write(target.path(), vec![b'x'; 100]).unwrap();
        assert_eq!(
            check(&target, &state, &week(1)).unwrap(),
            Some(RotationTrigger::SizeExceeded {
                size: 100,
                limit: 100
            })
        );
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let target = LoggerConfig::new(dir.path().join("app.txt"))
            .with_max_size(0)
            .build()
            .unwrap();
        let state = RotationState::starting_at(&week(1));
        assert!(!should_rotate(&target, &state, &week(1)).unwrap());
    }

    #[test]
    fn test_rotate_archives_under_previous_period() {
        let dir = TempDir::new().unwrap();
        let target = LoggerConfig::new(dir.path().join("app.txt")).build().unwrap();
        fs::write(target.path(), "week one\n").unwrap();

        let mut state = RotationState::starting_at(&week(1));
        let rotation = rotate_if_needed(&target, &mut state, &week(2))
            .unwrap()
            .unwrap();

        let archive = rotation.archive.unwrap();
        assert_eq!(
            archive,
            dir.path().join("app.txt Week 1 2024 1")
        );
        assert_eq!(fs::read_to_string(&archive).unwrap(), "week one\n");
        assert_eq!(fs::read_to_string(target.path()).unwrap(), "");
        assert_eq!(state.last_period(), PeriodKey::new(2024, 2));
        assert_eq!(rotation.state, state);
    }

    #[test]
    fn test_rotate_rewrites_header() {
        let dir = TempDir::new().unwrap();
        let target = LoggerConfig::new(dir.path().join("app.csv"))
            .with_columns(["Time", "Event"])
            .with_max_size(10)
            .build()
            .unwrap();
        let header = header_line(&target).unwrap();
        fs::write(target.path(), format!("{}t,e\n", header)).unwrap();

        let mut state = RotationState::starting_at(&week(3));
        let rotation = rotate_if_needed(&target, &mut state, &week(3))
            .unwrap()
            .unwrap();

        assert!(matches!(rotation.trigger, RotationTrigger::SizeExceeded { .. }));
        assert_eq!(fs::read_to_string(target.path()).unwrap(), header);
    }

    #[test]
    fn test_header_only_file_is_not_archived() {
        let dir = TempDir::new().unwrap();
        let target = LoggerConfig::new(dir.path().join("app.csv"))
            .with_columns(["Time", "Event"])
            .build()
            .unwrap();
        fs::write(target.path(), header_line(&target).unwrap()).unwrap();

        let mut state = RotationState::starting_at(&week(1));
        let rotation = rotate_if_needed(&target, &mut state, &week(2))
            .unwrap()
            .unwrap();

        assert!(rotation.archive.is_none());
        assert_eq!(state.last_period(), PeriodKey::new(2024, 2));
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_size_rotation_never_overwrites() {
        let dir = TempDir::new().unwrap();
        let target = LoggerConfig::new(dir.path().join("app.txt"))
            .with_max_size(100)
            .build()
            .unwrap();
        let mut state = RotationState::starting_at(&week(1));

        fs::write(target.path(), vec![b'a'; 120]).unwrap();
        let first = rotate_if_needed(&target, &mut state, &week(1)).unwrap().unwrap();

        fs::write(target.path(), vec![b'b'; 150]).unwrap();
        let second = rotate_if_needed(&target, &mut state, &week(1)).unwrap().unwrap();

        assert_eq!(first.archive.unwrap(), dir.path().join("app.txt Week 1 2024 1"));
        let second = second.archive.unwrap();
        assert_eq!(second, dir.path().join("app.txt Week 1 2024 2"));
        assert_eq!(fs::read(&second).unwrap(), vec![b'b'; 150]);
    }

    #[test]
    fn test_forced_rotation() {
        let dir = TempDir::new().unwrap();
        let target = LoggerConfig::new(dir.path().join("app.txt")).build().unwrap();
        fs::write(target.path(), "keep me\n").unwrap();

        let mut state = RotationState::starting_at(&week(6));
        let rotation = rotate(&target, &mut state, RotationTrigger::Forced, &week(6)).unwrap();
        assert_eq!(
            rotation.archive.unwrap(),
            dir.path().join("app.txt Week 6 2024 1")
        );
        assert_eq!(fs::read_to_string(target.path()).unwrap(), "");
    }

    #[test]
    fn test_resume_from_file_mtime() {
        use filetime::{set_file_mtime, FileTime};

        let dir = TempDir::new().unwrap();
        let target = LoggerConfig::new(dir.path().join("app.txt")).build().unwrap();

        // Missing file starts at now
        let state = RotationState::resume(&target, &week(8)).unwrap();
        assert_eq!(state.last_period(), PeriodKey::new(2024, 8));

        fs::write(target.path(), "from week three\n").unwrap();
        let mtime = Local.from_utc_datetime(&week(3).naive_utc());
        set_file_mtime(target.path(), FileTime::from_unix_time(mtime.timestamp(), 0)).unwrap();

        let state = RotationState::resume(&target, &week(8)).unwrap();
        assert_eq!(state.last_period(), PeriodKey::of(&mtime));
        assert!(should_rotate(&target, &state, &week(8)).unwrap());
    }

    #[cfg(unix)]
    #[test]
    fn test_failed_rename_keeps_state() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let target = LoggerConfig::new(dir.path().join("app.txt")).build().unwrap();
        fs::write(target.path(), "data\n").unwrap();
        fs::set_permissions(dir.path(), fs::Permissions::from_mode(0o500)).unwrap();

        let mut state = RotationState::starting_at(&week(1));
        let result = rotate_if_needed(&target, &mut state, &week(2));

        fs::set_permissions(dir.path(), fs::Permissions::from_mode(0o700)).unwrap();

        // Root ignores directory permissions
        if let Err(err) = result {
            assert!(matches!(err, Error::Rotation { .. }));
            assert_eq!(state.last_period(), PeriodKey::new(2024, 1));
            assert_eq!(fs::read_to_string(target.path()).unwrap(), "data\n");
        }
    }
}
