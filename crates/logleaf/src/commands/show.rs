//! Show command implementation

use anyhow::Result;
use logleaf_core::LoggerConfig;
use logleaf_logs::LogReader;

use crate::output::{is_json_mode, print_logs};

pub fn execute(config: LoggerConfig) -> Result<()> {
    let target = config.build()?;
    let content = LogReader::for_target(&target).contents()?;

    if is_json_mode() {
        let lines: Vec<String> = content.lines().map(String::from).collect();
        print_logs(&lines);
    } else {
        print!("{}", content);
    }
    Ok(())
}
