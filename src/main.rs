// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Filternet-Admin command-line entry point.
//!
//! Exit status is 0 on success or help, and also when the email given to a
//! command has no account. Usage errors, configuration errors and failed
//! commands exit 1.

use filternet_admin::{
    cli::{self, output, Command},
    config::{Config, LogFormat},
    db::FirestoreDb,
    error::AppError,
    services::IdentityToolkitClient,
    AppState,
};
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> ExitCode {
    let command = match Command::parse(std::env::args().skip(1)) {
        Ok(command) => command,
        Err(e) => {
            eprintln!("{}", e);
            print!("{}", output::usage());
            return ExitCode::FAILURE;
        }
    };

    if !command.needs_services() {
        print!("{}", output::usage());
        return ExitCode::SUCCESS;
    }

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to initialize Firebase Admin access: {}", e);
            eprintln!("Place the service account key at the path in FIREBASE_CREDENTIALS");
            eprintln!("(Firebase Console > Project Settings > Service Accounts > Generate new private key)");
            return ExitCode::FAILURE;
        }
    };

    init_logging(config.log_format);

    let result = run(&command, config).await;
    match &result {
        Ok(()) => {}
        Err(e) if e.is_not_found() => {
            tracing::warn!(command = command.name(), error = %e, "No such user");
            eprintln!("{}", output::command_error(command.name(), e));
        }
        Err(e) => {
            tracing::error!(command = command.name(), error = %e, "Command failed");
            eprintln!("{}", output::command_error(command.name(), e));
        }
    }

    ExitCode::from(cli::exit_status(&result))
}

async fn run(command: &Command, config: Config) -> Result<(), AppError> {
    tracing::info!(
        project = %config.project_id,
        service_account = config.service_account_email(),
        command = command.name(),
        "Starting filternet-admin"
    );

    let identity = Arc::new(IdentityToolkitClient::connect(&config).await?);

    // Role commands never touch Firestore.
    let store = if command.needs_store() {
        FirestoreDb::connect(&config).await?
    } else {
        FirestoreDb::new_mock()
    };

    let state = AppState {
        config,
        identity,
        store: Arc::new(store),
    };

    cli::execute(command, &state, &mut std::io::stdout().lock()).await
}

/// Initialize structured logging on stderr, leaving stdout for command output.
fn init_logging(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("filternet_admin=info,warn"));

    match format {
        LogFormat::Json => {
            let layer = tracing_subscriber::fmt::layer()
                .json()
                .with_target(false)
                .with_current_span(true)
                .flatten_event(true)
                .with_writer(std::io::stderr);
            tracing_subscriber::registry().with(filter).with(layer).init();
        }
        LogFormat::Pretty => {
            let layer = tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr);
            tracing_subscriber::registry().with(filter).with(layer).init();
        }
    }
}
