//! Prune command implementation

use anyhow::{bail, Result};
use logleaf_core::LoggerConfig;
use logleaf_logs::prune;

use crate::output::print_prune_report;

pub fn execute(config: LoggerConfig, keep: Option<usize>) -> Result<()> {
    let target = config.build()?;
    let keep = keep.unwrap_or(target.max_archives());

    let report = prune(&target, keep)?;
    print_prune_report(&report);

    if !report.is_clean() {
        bail!("{} archive(s) could not be deleted", report.failures.len());
    }
    Ok(())
}
