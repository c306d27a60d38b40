//! `wikictl` entry point.
//!
//! This binary is the composition root. Responsibilities:
//!
//! 1. **Parse options** with `clap`; connection settings may also come from
//!    `WIKI_*` environment variables.
//! 2. **Wire observability**: `tracing-subscriber` with a pretty or JSON
//!    layer, plus an OpenTelemetry OTLP exporter when
//!    `OTEL_EXPORTER_OTLP_ENDPOINT` is set.
//! 3. **Construct the transport**: [`transport::HttpTransport`], or
//!    [`wiki::canned::CannedTransport`] under `--offline`, and hand it to a
//!    [`wiki::WikiClient`].
//! 4. **Dispatch** the subcommand and map its result onto the exit code.

mod args;
mod commands;
mod observability;

use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing::error;
use transport::HttpTransport;
use wiki::canned::CannedTransport;
use wiki::WikiClient;

use crate::args::Cli;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let telemetry = match observability::init(cli.log_format) {
        Ok(telemetry) => telemetry,
        Err(e) => {
            eprintln!("error: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    let code = match execute(cli).await {
        Ok(code) => code,
        Err(e) => {
            error!(error = %format!("{e:#}"), "command failed");
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    };

    telemetry.shutdown();
    code
}

async fn execute(cli: Cli) -> anyhow::Result<ExitCode> {
    let config = commands::wiki_config(&cli.connection).context("invalid wiki configuration")?;

    if cli.connection.offline {
        let client = WikiClient::new(&config, CannedTransport::new());
        return commands::run(client, &cli.connection, cli.command).await;
    }

    let transport = HttpTransport::new(&commands::transport_config(&cli.connection))?;
    let client = WikiClient::new(&config, transport);
    commands::run(client, &cli.connection, cli.command).await
}
