use std::process::ExitCode;

use clap::Parser;
use remindly::adapter::cli::Cli;
use remindly::adapter::error::ApiError;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match remindly::run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", ApiError::from(e));
            ExitCode::FAILURE
        }
    }
}
