// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Orderwerk: receipt printer order poller.
//
// Entry point. Loads `.env`, parses flags, initialises logging, runs the
// startup checks, and hands control to the polling coordinator until a
// shutdown signal arrives.

mod cli;
mod services;

use std::process::ExitCode;

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use orderwerk_core::human_errors::humanize_error;

use cli::Cli;
use services::app_services::AppServices;
use services::shutdown::spawn_signal_listener;

#[tokio::main]
async fn main() -> ExitCode {
    // Missing .env is fine; the environment may already be set.
    let dotenv = dotenvy::dotenv();
    let cli = Cli::parse();
    init_logging(cli.log_json);

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Orderwerk starting");
    if let Ok(path) = dotenv {
        tracing::debug!(path = %path.display(), "loaded environment file");
    }

    let services = match AppServices::init(cli.config(), cli.source.clone()) {
        Ok(services) => services,
        Err(e) => {
            let human = humanize_error(&e);
            tracing::error!(error = %e, "startup failed");
            eprintln!("{human}");
            return ExitCode::FAILURE;
        }
    };

    if cli.check {
        tracing::info!(
            printer = services.printer_name(),
            state_file = %services.state_file().display(),
            "startup checks passed"
        );
        return ExitCode::SUCCESS;
    }

    let shutdown = CancellationToken::new();
    spawn_signal_listener(shutdown.clone());

    let mut coordinator = services.into_coordinator();
    coordinator.run(shutdown).await;

    tracing::info!(cursor = coordinator.cursor(), "Orderwerk stopped");
    ExitCode::SUCCESS
}

fn init_logging(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if json {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}
