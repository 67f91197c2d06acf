use std::process::ExitCode;

use clap::Parser;
use dreisam_pegel::cli::{run, Cli};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // A .env next to the binary may carry DREISAM_PEGEL_* overrides.
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => {
            tracing::info!("dreisam-pegel run finished");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "dreisam-pegel run failed");
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
