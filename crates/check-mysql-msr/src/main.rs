//! check-mysql-msr binary

use check_mysql_msr::{Args, config_failure, resolve_config, run};
use clap::Parser;
use clap::error::ErrorKind;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            // help and version go to stdout, usage errors to stderr
            let _ = e.print();
            return match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::SUCCESS,
                _ => ExitCode::from(1),
            };
        }
    };

    let config = match resolve_config(&args) {
        Ok(config) => config,
        Err(e) => {
            let outcome = config_failure(&e);
            println!("{}", outcome);
            return outcome.exit_code();
        }
    };

    common::logging::init_with_format(
        config.logging.format.unwrap_or_default(),
        config.logging.level.as_deref(),
    );

    let outcome = run(&config).await;
    println!("{}", outcome);
    outcome.exit_code()
}
