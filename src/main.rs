#![warn(clippy::all)]

use clap::Parser;
use std::process::ExitCode;
use tracing::Instrument;
use tracing_subscriber::fmt::format::FmtSpan;

use interview_deck::{ApiClient, cli, config::Config};

#[tokio::main]
async fn main() -> ExitCode {
    let args = cli::Cli::parse();

    let config = match Config::new(&args.connection) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    // --log-level이 주어지면 RUST_LOG보다 우선한다.
    let log_filter = match args.connection.log_level {
        Some(_) => config.log_filter(),
        None => std::env::var("RUST_LOG").unwrap_or_else(|_| config.log_filter()),
    };

    tracing_subscriber::fmt()
        .with_env_filter(log_filter)
        .with_span_events(FmtSpan::CLOSE)
        // 표준 출력은 렌더링 결과만 쓴다.
        .with_writer(std::io::stderr)
        .init();

    let client = match ApiClient::new(&config.api_url, config.retries) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let span = tracing::info_span!(
        "command",
        api = %config.api_url,
        id = %uuid::Uuid::new_v4(),
    );
    cli::run(args.command, client).instrument(span).await
}
