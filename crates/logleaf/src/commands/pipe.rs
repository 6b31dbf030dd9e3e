//! Pipe command implementation

use anyhow::{Context, Result};
use logleaf_core::LoggerConfig;
use logleaf_logs::LogEntry;
use std::io::BufRead;
use tracing::debug;

use crate::cli::RequestArgs;
use crate::output::print_success_json;

pub fn execute(config: LoggerConfig, args: RequestArgs) -> Result<()> {
    let mut writer = super::open_writer(config)?;
    let ctx = super::request_context(&args);

    let stdin = std::io::stdin();
    let mut count = 0usize;
    for line in stdin.lock().lines() {
        let line = line.context("Failed to read stdin")?;
        let receipt = writer.log(LogEntry::message(line).with_context(ctx.clone()))?;
        if let Some(archive) = receipt.archived {
            debug!("Rotated to {}", archive.display());
        }
        count += 1;
    }

    print_success_json(
        &format!("Logged {} line(s) to {}", count, writer.path().display()),
        Some(count),
    );
    Ok(())
}
