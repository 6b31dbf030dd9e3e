//! Terminal and JSON output formatting

use chrono::{DateTime, Local};
use colored::Colorize;
use logleaf_logs::{ArchiveInfo, PruneReport};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use tabled::{
    settings::{object::Columns, Alignment, Modify, Style},
    Table, Tabled,
};

/// Global flag for JSON output mode
static JSON_MODE: AtomicBool = AtomicBool::new(false);

/// Enable or disable JSON output mode
pub fn set_json_mode(enabled: bool) {
    JSON_MODE.store(enabled, Ordering::SeqCst);
}

/// Check if JSON output mode is enabled
pub fn is_json_mode() -> bool {
    JSON_MODE.load(Ordering::SeqCst)
}

#[derive(Tabled)]
pub struct ArchiveRow {
    #[tabled(rename = "archive")]
    pub name: String,
    #[tabled(rename = "period")]
    pub period: String,
    #[tabled(rename = "#")]
    pub counter: String,
    #[tabled(rename = "size")]
    pub size: String,
    #[tabled(rename = "modified")]
    pub modified: String,
}

/// JSON-friendly archive representation
#[derive(Serialize)]
pub struct ArchiveJson {
    pub path: String,
    pub year: Option<i32>,
    pub week: Option<u32>,
    pub counter: Option<u32>,
    pub size_bytes: u64,
    pub modified: String,
}

impl From<&ArchiveInfo> for ArchiveJson {
    fn from(info: &ArchiveInfo) -> Self {
        ArchiveJson {
            path: info.path.display().to_string(),
            year: info.name.map(|n| n.period.year),
            week: info.name.map(|n| n.period.week),
            counter: info.name.map(|n| n.counter),
            size_bytes: info.size,
            modified: DateTime::<Local>::from(info.modified).to_rfc3339(),
        }
    }
}

#[derive(Serialize)]
struct ResponseJson<T: Serialize> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
}

pub fn print_archives(archives: &[ArchiveInfo]) {
    if is_json_mode() {
        let rows: Vec<ArchiveJson> = archives.iter().map(ArchiveJson::from).collect();
        print_json(&rows);
        return;
    }

    if archives.is_empty() {
        print_info("No archives");
        return;
    }

    let rows: Vec<ArchiveRow> = archives
        .iter()
        .map(|info| ArchiveRow {
            name: info
                .path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default(),
            period: info
                .name
                .map(|n| n.period.to_string())
                .unwrap_or_else(|| "-".to_string()),
            counter: info
                .name
                .map(|n| n.counter.to_string())
                .unwrap_or_else(|| "-".to_string()),
            size: format_bytes(info.size),
            modified: DateTime::<Local>::from(info.modified)
                .format("%Y-%m-%d %H:%M")
                .to_string(),
        })
        .collect();

    let table = Table::new(rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::single(3)).with(Alignment::right()))
        .to_string();
    println!("{}", table);
}

pub fn print_prune_report(report: &PruneReport) {
    if is_json_mode() {
        let deleted: Vec<String> = report
            .deleted
            .iter()
            .map(|p| p.display().to_string())
            .collect();
        let failed: Vec<String> = report
            .failures
            .iter()
            .map(|f| format!("{}: {}", f.path.display(), f.error))
            .collect();
        print_json(&serde_json::json!({
            "deleted": deleted,
            "failed": failed,
            "kept": report.kept,
        }));
        return;
    }

    for path in &report.deleted {
        println!("{} {}", "-".red(), path.display());
    }
    for failure in &report.failures {
        print_error(&format!("{}: {}", failure.path.display(), failure.error));
    }
    print_success(&format!(
        "Pruned {} archive(s), {} kept",
        report.deleted_count(),
        report.kept
    ));
}

pub fn format_bytes(bytes: u64) -> String {
    if bytes >= 1_073_741_824 {
        format!("{:.1}G", bytes as f64 / 1_073_741_824.0)
    } else if bytes >= 1_048_576 {
        format!("{:.1}M", bytes as f64 / 1_048_576.0)
    } else if bytes >= 1024 {
        format!("{:.0}K", bytes as f64 / 1024.0)
    } else if bytes > 0 {
        format!("{}B", bytes)
    } else {
        "0B".to_string()
    }
}

pub fn print_success(message: &str) {
    println!("{} {}", "✓".green(), message);
}

pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red(), message);
}

pub fn print_info(message: &str) {
    println!("{} {}", "ℹ".blue(), message);
}

pub fn print_logs(lines: &[String]) {
    if is_json_mode() {
        print_json(&lines);
        return;
    }

    for line in lines {
        println!("{}", line);
    }
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Error serializing to JSON: {}", e),
    }
}

pub fn print_success_json<T: Serialize>(message: &str, data: Option<T>) {
    if is_json_mode() {
        let response = ResponseJson {
            success: true,
            message: Some(message.to_string()),
            data,
        };
        print_json(&response);
    } else {
        print_success(message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(0), "0B");
        assert_eq!(format_bytes(512), "512B");
        assert_eq!(format_bytes(2048), "2K");
        assert_eq!(format_bytes(25 * 1024 * 1024), "25.0M");
        assert_eq!(format_bytes(3 * 1_073_741_824), "3.0G");
    }
}
