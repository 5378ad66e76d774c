use std::process::ExitCode;

use clap::Parser;

use firds::cli::{self, Cli};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = firds::logging::init(&cli.log_dir) {
        eprintln!("error: {e:#}");
        return ExitCode::FAILURE;
    }

    match cli::run::run(&cli).await {
        Ok(output) => {
            println!("{}", output.table.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}
