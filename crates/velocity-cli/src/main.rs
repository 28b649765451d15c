use std::process::ExitCode;

use clap::Parser;
use velocity_cli::{CliArgs, VelocityCli};

#[tokio::main]
async fn main() -> ExitCode {
    let args = CliArgs::parse();

    let result = match VelocityCli::from_args("velocity", &args) {
        Ok(cli) => cli.run(args).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("velocity: {e}");
            ExitCode::FAILURE
        }
    }
}
