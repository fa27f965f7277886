// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Command-line verbs and their dispatch.

pub mod output;

use crate::error::{AppError, Result};
use crate::services::SyncProgress;
use crate::AppState;
use chrono::Utc;
use std::io::Write;
use validator::ValidateEmail;

/// A parsed invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    AddAdmin(String),
    RemoveAdmin(String),
    ListAdmins,
    CheckAdmin(String),
    SyncUsers,
    SyncUser(String),
    Help,
}

/// Problems with the command line itself.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UsageError {
    #[error("No command given")]
    MissingCommand,

    #[error("Email required for {0} command")]
    MissingEmail(&'static str),

    #[error("Not a valid email address: {0}")]
    InvalidEmail(String),

    #[error("Unknown command: {0}")]
    UnknownCommand(String),
}

impl Command {
    /// Parse the arguments after the program name: a verb and an optional email.
    pub fn parse<I, S>(args: I) -> std::result::Result<Self, UsageError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut args = args.into_iter().map(Into::into);
        let verb = args.next().ok_or(UsageError::MissingCommand)?;
        let email = args.next();

        let with_email = |name: &'static str| -> std::result::Result<String, UsageError> {
            let email = email
                .clone()
                .map(|e| e.trim().to_string())
                .filter(|e| !e.is_empty())
                .ok_or(UsageError::MissingEmail(name))?;
            if !email.validate_email() {
                return Err(UsageError::InvalidEmail(email));
            }
            Ok(email)
        };

        match verb.as_str() {
            "add-admin" => Ok(Command::AddAdmin(with_email("add-admin")?)),
            "remove-admin" => Ok(Command::RemoveAdmin(with_email("remove-admin")?)),
            "list-admins" => Ok(Command::ListAdmins),
            "check-admin" => Ok(Command::CheckAdmin(with_email("check-admin")?)),
            "sync-users" => Ok(Command::SyncUsers),
            "sync-user" => Ok(Command::SyncUser(with_email("sync-user")?)),
            "help" | "--help" | "-h" => Ok(Command::Help),
            _ => Err(UsageError::UnknownCommand(verb)),
        }
    }

    /// Verb as typed on the command line.
    pub fn name(&self) -> &'static str {
        match self {
            Command::AddAdmin(_) => "add-admin",
            Command::RemoveAdmin(_) => "remove-admin",
            Command::ListAdmins => "list-admins",
            Command::CheckAdmin(_) => "check-admin",
            Command::SyncUsers => "sync-users",
            Command::SyncUser(_) => "sync-user",
            Command::Help => "help",
        }
    }

    /// True if the command reads or writes the document store.
    pub fn needs_store(&self) -> bool {
        matches!(self, Command::SyncUsers | Command::SyncUser(_))
    }

    /// True if the command talks to any external service.
    pub fn needs_services(&self) -> bool {
        !matches!(self, Command::Help)
    }
}

/// Run a command, writing human-readable output to `out`.
///
/// Per-user failures during `sync-users` are part of the report, not an
/// error; everything else that goes wrong is returned.
pub async fn execute<W: Write>(command: &Command, state: &AppState, out: &mut W) -> Result<()> {
    tracing::debug!(command = command.name(), "Executing command");

    let text = match command {
        Command::Help => output::usage(),
        Command::AddAdmin(email) => {
            output::assignment(&state.role_manager().assign(email).await?)
        }
        Command::RemoveAdmin(email) => {
            output::revocation(&state.role_manager().revoke(email).await?)
        }
        Command::ListAdmins => output::admin_list(&state.role_manager().list().await?),
        Command::CheckAdmin(email) => {
            output::admin_status(&state.role_manager().check(email).await?)
        }
        Command::SyncUsers => {
            let report = state
                .user_sync()
                .sync_all_with_progress(Utc::now(), |progress| {
                    let text = match progress {
                        SyncProgress::Enumerated(count) => output::sync_header(count),
                        SyncProgress::Processed(entry) => output::sync_entry(entry),
                    };
                    emit(out, &text)
                })
                .await?;
            output::sync_summary(&report)
        }
        Command::SyncUser(email) => {
            output::sync_entry(&state.user_sync().sync_email(email).await?)
        }
    };

    emit(out, &text)
}

fn emit<W: Write>(out: &mut W, text: &str) -> Result<()> {
    out.write_all(text.as_bytes())
        .and_then(|_| out.flush())
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to write output: {}", e)))
}

/// Process exit status for a command that got past argument parsing.
///
/// A lookup miss has already been reported to the user and exits 0. Any
/// other error exits 1.
pub fn exit_status(result: &Result<()>) -> u8 {
    match result {
        Ok(()) => 0,
        Err(e) if e.is_not_found() => 0,
        Err(_) => 1,
    }
}
