//! Archives command implementation

use anyhow::Result;
use logleaf_core::LoggerConfig;
use logleaf_logs::list_archives;

use crate::output::print_archives;

pub fn execute(config: LoggerConfig) -> Result<()> {
    let target = config.build()?;
    print_archives(&list_archives(&target)?);
    Ok(())
}
