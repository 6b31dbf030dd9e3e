//! Tail command implementation

use anyhow::Result;
use logleaf_core::LoggerConfig;
use logleaf_logs::LogReader;

use crate::cli::TailArgs;
use crate::output::print_logs;

pub async fn execute(config: LoggerConfig, args: TailArgs) -> Result<()> {
    let target = config.build()?;
    let reader = LogReader::for_target(&target);

    print_logs(&reader.tail(args.lines)?);

    if args.follow {
        let mut rx = reader.follow()?;
        while let Some(line) = rx.recv().await {
            println!("{}", line);
        }
    }

    Ok(())
}
