//! Rotate command implementation

use anyhow::Result;
use logleaf_core::LoggerConfig;
use logleaf_logs::prune;
use serde_json::json;

use crate::output::{print_info, print_success_json};

pub fn execute(config: LoggerConfig, force: bool) -> Result<()> {
    let mut writer = super::open_writer(config)?;

    let rotation = if force {
        Some(writer.rotate_now()?)
    } else {
        writer.rotate_due()?
    };

    let Some(archive) = rotation.and_then(|r| r.archive) else {
        print_info("Nothing to rotate");
        return Ok(());
    };

    let target = writer.target();
    let pruned = prune(target, target.max_archives())?;

    print_success_json(
        &format!("Rotated to {}", archive.display()),
        Some(json!({
            "archive": archive.display().to_string(),
            "pruned": pruned.deleted_count(),
        })),
    );
    Ok(())
}
