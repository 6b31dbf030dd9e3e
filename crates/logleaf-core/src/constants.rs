//! Constants and default values for LogLeaf

/// Log file used when the caller does not name one
pub const DEFAULT_LOG_FILE: &str = "logleaf_log.txt";

/// Extensions a log file may carry
pub const ALLOWED_EXTENSIONS: &[&str] = &["txt", "csv", "tsv"];

/// Default timestamp format (chrono strftime syntax)
pub const DEFAULT_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Word placed between the log path and the period label in archive names
pub const DEFAULT_ARCHIVE_PREFIX: &str = "Week";

/// Default log max size in bytes (25MB)
pub const DEFAULT_MAX_LOG_SIZE: u64 = 25 * 1024 * 1024;

/// Default archives to keep (3 months of weekly archives)
pub const DEFAULT_MAX_ARCHIVES: usize = 3 * 4;

/// Column name appended when client IP logging is enabled
pub const IP_COLUMN: &str = "IP";

/// Column names appended when browser/OS logging is enabled
pub const BROWSER_COLUMN: &str = "Browser";
pub const OS_COLUMN: &str = "OS";

/// Separator between timestamp and a lone message in plain logs
pub const PLAIN_MESSAGE_SEPARATOR: &str = " : ";

/// Separator between values in plain logs with several fields
pub const PLAIN_FIELD_SEPARATOR: &str = ", ";

/// Platform line terminator
#[cfg(windows)]
pub const LINE_ENDING: &str = "\r\n";
#[cfg(not(windows))]
pub const LINE_ENDING: &str = "\n";

/// Config file names searched for (in priority order)
pub const CONFIG_FILES: &[&str] = &[
    "logleaf.toml",
    "logleaf.yaml",
    "logleaf.yml",
    "logleaf.json",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_log_file_is_allowed() {
        let ext = std::path::Path::new(DEFAULT_LOG_FILE)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap();
        assert!(ALLOWED_EXTENSIONS.contains(&ext));
    }

    #[test]
    fn test_line_ending() {
        assert!(LINE_ENDING.ends_with('\n'));
    }
}
