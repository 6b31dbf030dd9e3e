//! Write command implementation

use anyhow::Result;
use logleaf_core::LoggerConfig;
use logleaf_logs::LogEntry;
use serde_json::json;

use crate::cli::WriteArgs;
use crate::output::{print_error, print_info, print_success_json};

pub fn execute(config: LoggerConfig, args: WriteArgs) -> Result<()> {
    let mut writer = super::open_writer(config)?;
    let entry = LogEntry::fields(args.fields).with_context(super::request_context(&args.request));

    let receipt = writer.log(entry)?;

    if let Some(archive) = &receipt.archived {
        print_info(&format!("Rotated previous log to {}", archive.display()));
    }
    for failure in &receipt.pruned.failures {
        print_error(&format!(
            "Could not prune {}: {}",
            failure.path.display(),
            failure.error
        ));
    }

    print_success_json(
        &format!("Logged to {}", writer.path().display()),
        Some(json!({
            "path": writer.path().display().to_string(),
            "bytes_written": receipt.bytes_written,
            "archived": receipt.archived.as_ref().map(|p| p.display().to_string()),
            "pruned": receipt.pruned.deleted_count(),
        })),
    );
    Ok(())
}
