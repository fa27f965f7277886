// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Human-readable console output. Not meant to be parsed.

use crate::error::AppError;
use crate::models::identity::ClaimValue;
use crate::services::{
    AdminAssignment, AdminRevocation, AdminStatus, AdminSummary, SyncEntry, SyncOutcome,
    SyncReport,
};
use crate::time_utils::format_utc_rfc3339;

const BIN: &str = "filternet-admin";

/// Join lines into output text, one trailing newline per line.
fn lines<I>(lines: I) -> String
where
    I: IntoIterator<Item = String>,
{
    lines.into_iter().map(|line| line + "\n").collect()
}

/// Usage text for `help` and after usage errors.
pub fn usage() -> String {
    format!(
        r#"
WaterFilterNet Admin Manager
============================

Usage:
  {BIN} <command> [email]

Commands:
  add-admin <email>      Add admin role to user
  remove-admin <email>   Remove admin role from user
  list-admins            List all admin users
  check-admin <email>    Check if user is admin
  sync-users             Create missing Firestore user documents
  sync-user <email>      Create the Firestore document for one user
  help                   Show this help message

Examples:
  {BIN} add-admin admin@example.com
  {BIN} list-admins
  {BIN} check-admin admin@example.com

Note: User must be registered in Firebase Auth before adding admin role.
"#
    )
}

pub fn assignment(a: &AdminAssignment) -> String {
    lines([
        "Admin role assigned successfully!".to_string(),
        format!("   User: {}", a.email),
        format!("   UID: {}", a.uid),
        format!("   Company: {}", a.tenant),
        format!("   Assigned: {}", a.assigned_at),
        String::new(),
        "Note: existing sessions keep their old claims until their ID token is refreshed (up to 1 hour)"
            .to_string(),
    ])
}

pub fn revocation(r: &AdminRevocation) -> String {
    let mut out = vec![
        "Admin role removed successfully!".to_string(),
        format!("   User: {}", r.email),
        format!("   UID: {}", r.uid),
    ];
    if !r.remaining_claims.is_empty() {
        out.push(format!("   Remaining claims: {}", r.remaining_claims.len()));
    }
    lines(out)
}

pub fn admin_list(admins: &[AdminSummary]) -> String {
    if admins.is_empty() {
        return lines(["No admin users found.".to_string()]);
    }

    let mut out = vec![format!("Found {} admin user(s):", admins.len()), String::new()];
    for (index, admin) in admins.iter().enumerate() {
        out.push(format!(
            "{}. {}",
            index + 1,
            admin.email.as_deref().unwrap_or("<no email>")
        ));
        out.push(format!("   UID: {}", admin.uid));
        out.push(format!(
            "   Company: {}",
            admin.tenant.as_deref().unwrap_or("Not set")
        ));
        out.push(format!(
            "   Assigned: {}",
            admin.assigned_at.as_deref().unwrap_or("Unknown")
        ));
        out.push(format!(
            "   Last Sign In: {}",
            admin
                .last_sign_in_at
                .map(format_utc_rfc3339)
                .unwrap_or_else(|| "Never".to_string())
        ));
        out.push(String::new());
    }
    lines(out)
}

pub fn admin_status(status: &AdminStatus) -> String {
    let user = &status.user;
    let mut out = vec![
        "User Details:".to_string(),
        format!("   Email: {}", user.email_or_placeholder()),
        format!("   UID: {}", user.uid),
        format!("   Email Verified: {}", user.email_verified),
        format!(
            "   Created: {}",
            user.created_at
                .map(format_utc_rfc3339)
                .unwrap_or_else(|| "Unknown".to_string())
        ),
        format!(
            "   Last Sign In: {}",
            user.last_sign_in_at
                .map(format_utc_rfc3339)
                .unwrap_or_else(|| "Never".to_string())
        ),
        String::new(),
        "Custom Claims:".to_string(),
    ];

    if status.claims().is_empty() {
        out.push("   No custom claims set".to_string());
    } else {
        out.extend(
            status
                .claims()
                .iter()
                .map(|(key, value)| format!("   {}: {}", key, ClaimValue(value))),
        );
    }

    out.push(String::new());
    out.push(format!(
        "Admin Status: {}",
        if status.is_admin { "YES" } else { "NO" }
    ));
    lines(out)
}

/// First line of a `sync-users` run, printed once enumeration is done.
pub fn sync_header(count: usize) -> String {
    format!("Found {} users in Firebase Auth\n\n", count)
}

pub fn sync_entry(entry: &SyncEntry) -> String {
    let who = entry.email.as_deref().unwrap_or(&entry.uid);
    let line = match &entry.outcome {
        SyncOutcome::Created { role } => {
            format!("Created Firestore document for {} ({})", who, role)
        }
        SyncOutcome::Skipped => format!("Skipping {} - already exists in Firestore", who),
        SyncOutcome::Failed { error } => format!("Error processing user {}: {}", who, error),
    };
    lines([line])
}

/// Totals printed after the last entry.
pub fn sync_summary(report: &SyncReport) -> String {
    lines([
        String::new(),
        "=== Migration Complete ===".to_string(),
        format!("Created: {} users", report.created),
        format!("Skipped: {} users (already existed)", report.skipped),
        format!("Errors: {} users", report.errors),
        format!("Total processed: {} users", report.total()),
    ])
}

/// Message for a failed command.
pub fn command_error(command: &str, err: &AppError) -> String {
    match err {
        AppError::NotFound(_) if command == "add-admin" => {
            "User not found. Please ensure the user has signed up first.".to_string()
        }
        AppError::NotFound(_) => "User not found.".to_string(),
        other => format!("Error running {}: {}", command, other),
    }
}
