// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! One-way sync of identity provider users into the `users` collection.
//!
//! For every user: check whether a document exists, and if not, synthesize
//! the starter document and write it. Existing documents are never touched.
//! Users are processed one at a time; a failure on one user is recorded and
//! the run moves on, while a failure to enumerate users aborts the run.

use crate::db::UserStore;
use crate::error::Result;
use crate::models::{IdentityRecord, UserDocument};
use crate::services::enumerate;
use crate::services::identity::IdentityProvider;
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// What happened to a single user.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncOutcome {
    /// A new document was written with this role.
    Created { role: String },
    /// A document already existed.
    Skipped,
    /// The existence check or write failed.
    Failed { error: String },
}

/// Per-user line of a sync report.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncEntry {
    pub uid: String,
    pub email: Option<String>,
    pub outcome: SyncOutcome,
}

/// Summary of a sync run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SyncReport {
    pub created: u32,
    pub skipped: u32,
    pub errors: u32,
    pub entries: Vec<SyncEntry>,
}

impl SyncReport {
    /// Number of users processed.
    pub fn total(&self) -> u32 {
        self.created + self.skipped + self.errors
    }

    fn record(&mut self, user: &IdentityRecord, outcome: SyncOutcome) -> &SyncEntry {
        match outcome {
            SyncOutcome::Created { .. } => self.created += 1,
            SyncOutcome::Skipped => self.skipped += 1,
            SyncOutcome::Failed { .. } => self.errors += 1,
        }
        self.entries.push(SyncEntry {
            uid: user.uid.clone(),
            email: user.email.clone(),
            outcome,
        });
        &self.entries[self.entries.len() - 1]
    }
}

/// Progress of a sync run, reported while it happens.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SyncProgress<'a> {
    /// Enumeration finished with this many users; nothing written yet.
    Enumerated(usize),
    /// One user has been processed.
    Processed(&'a SyncEntry),
}

/// Sync pipeline over injected provider and store handles.
#[derive(Clone)]
pub struct UserSync {
    identity: Arc<dyn IdentityProvider>,
    store: Arc<dyn UserStore>,
    page_size: u32,
}

impl UserSync {
    pub fn new(
        identity: Arc<dyn IdentityProvider>,
        store: Arc<dyn UserStore>,
        page_size: u32,
    ) -> Self {
        Self {
            identity,
            store,
            page_size,
        }
    }

    /// Sync every user in the identity provider.
    pub async fn sync_all(&self) -> Result<SyncReport> {
        self.sync_all_at(Utc::now()).await
    }

    /// Sync every user, using `now` for missing timestamps.
    ///
    /// Users are enumerated in full before any write, so an enumeration
    /// failure leaves the store untouched.
    pub async fn sync_all_at(&self, now: DateTime<Utc>) -> Result<SyncReport> {
        self.sync_all_with_progress(now, |_| Ok(())).await
    }

    /// Sync every user, calling `on_progress` after enumeration and after
    /// each user. An error from `on_progress` stops the run.
    pub async fn sync_all_with_progress<F>(
        &self,
        now: DateTime<Utc>,
        mut on_progress: F,
    ) -> Result<SyncReport>
    where
        F: FnMut(SyncProgress<'_>) -> Result<()>,
    {
        let users = enumerate::collect_users(self.identity.as_ref(), self.page_size).await?;
        tracing::info!(count = users.len(), "Found users in identity provider");
        on_progress(SyncProgress::Enumerated(users.len()))?;

        let mut report = SyncReport::default();
        for user in &users {
            let outcome = self.sync_record(user, now).await;
            on_progress(SyncProgress::Processed(report.record(user, outcome)))?;
        }

        tracing::info!(
            created = report.created,
            skipped = report.skipped,
            errors = report.errors,
            total = report.total(),
            "User sync complete"
        );

        Ok(report)
    }

    /// Look up one user by email and sync it.
    pub async fn sync_email(&self, email: &str) -> Result<SyncEntry> {
        let user = self.identity.get_user_by_email(email).await?;
        let outcome = self.sync_record(&user, Utc::now()).await;

        Ok(SyncEntry {
            uid: user.uid,
            email: user.email,
            outcome,
        })
    }

    /// Sync a single record. Never fails; errors become `SyncOutcome::Failed`.
    pub async fn sync_record(&self, user: &IdentityRecord, now: DateTime<Utc>) -> SyncOutcome {
        match self.try_sync_record(user, now).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::warn!(
                    uid = %user.uid,
                    email = user.email_or_placeholder(),
                    error = %e,
                    "Failed to sync user"
                );
                SyncOutcome::Failed {
                    error: e.to_string(),
                }
            }
        }
    }

    async fn try_sync_record(
        &self,
        user: &IdentityRecord,
        now: DateTime<Utc>,
    ) -> Result<SyncOutcome> {
        if self.store.user_exists(&user.uid).await? {
            tracing::debug!(uid = %user.uid, "User document already exists");
            return Ok(SyncOutcome::Skipped);
        }

        let doc = UserDocument::from_identity(user, now);
        self.store.set_user(&doc).await?;

        tracing::info!(uid = %doc.uid, role = %doc.role, "Created user document");
        Ok(SyncOutcome::Created { role: doc.role })
    }
}
