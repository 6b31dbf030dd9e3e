//! Config command implementation

use anyhow::Result;
use colored::Colorize;
use logleaf_core::{LogFormat, LoggerConfig};

use crate::output::{format_bytes, is_json_mode, print_json};

pub fn execute(config: LoggerConfig) -> Result<()> {
    if is_json_mode() {
        print_json(&config);
        config.build()?;
        return Ok(());
    }

    let target = config.build()?;
    let format = match target.format() {
        LogFormat::PlainText => "plain text".to_string(),
        LogFormat::Delimited { delimiter } => format!("delimited ({:?})", delimiter),
    };
    let columns = if target.columns().is_empty() {
        "-".to_string()
    } else {
        target.columns().join(", ")
    };

    println!("{}", "LogLeaf configuration".bold());
    println!("  {:<18} {}", "path:", target.path().display());
    println!("  {:<18} {}", "format:", format);
    println!("  {:<18} {}", "timestamp format:", target.timestamp_format());
    println!("  {:<18} {}", "columns:", columns);
    println!(
        "  {:<18} {} ({} bytes)",
        "max size:",
        format_bytes(target.max_size_bytes()),
        target.max_size_bytes()
    );
    println!("  {:<18} {}", "max archives:", target.max_archives());
    println!("  {:<18} {}", "archive prefix:", target.archive_prefix());
    Ok(())
}
