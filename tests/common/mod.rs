// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-memory fakes for the identity provider and the user store.

use filternet_admin::config::Config;
use filternet_admin::db::{FirestoreDb, UserStore};
use filternet_admin::error::{AppError, Result};
use filternet_admin::models::{CustomClaims, IdentityRecord, UserDocument, UserPage};
use filternet_admin::services::IdentityProvider;
use filternet_admin::AppState;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection against the emulator.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::create_emulator_client("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// Generate a unique user ID for test isolation.
#[allow(dead_code)]
pub fn unique_uid(prefix: &str) -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    format!("{}-{}", prefix, nanos)
}

/// Build an identity record with an email derived from the ID.
#[allow(dead_code)]
pub fn user(uid: &str) -> IdentityRecord {
    IdentityRecord::new(uid, Some(format!("{}@example.com", uid).as_str()))
}

/// Build `count` users named `user-000`, `user-001`, ...
#[allow(dead_code)]
pub fn users(count: usize) -> Vec<IdentityRecord> {
    (0..count).map(|i| user(&format!("user-{:03}", i))).collect()
}

// ─── Identity provider fake ──────────────────────────────────────

/// Identity provider backed by an ordered list of users.
///
/// Continuation tokens are decimal offsets into the list.
#[derive(Default)]
pub struct MemoryIdentityProvider {
    users: Mutex<Vec<IdentityRecord>>,
    /// Page index (0-based) whose request fails
    fail_page: Mutex<Option<usize>>,
    /// How far each following page reaches back into the previous one
    page_overlap: usize,
    list_calls: AtomicUsize,
    claim_writes: AtomicUsize,
}

#[allow(dead_code)]
impl MemoryIdentityProvider {
    pub fn new(users: Vec<IdentityRecord>) -> Self {
        Self {
            users: Mutex::new(users),
            ..Default::default()
        }
    }

    /// Re-serve the last `overlap` users of each page at the start of the
    /// next one, as happens when users are created mid-enumeration.
    pub fn with_page_overlap(mut self, overlap: usize) -> Self {
        self.page_overlap = overlap;
        self
    }

    pub fn fail_on_page(&self, page: usize) {
        *self.fail_page.lock().unwrap() = Some(page);
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn claim_writes(&self) -> usize {
        self.claim_writes.load(Ordering::SeqCst)
    }

    pub fn claims_of(&self, uid: &str) -> Option<CustomClaims> {
        self.users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.uid == uid)
            .map(|u| u.custom_claims.clone())
    }

    pub fn snapshot(&self) -> Vec<IdentityRecord> {
        self.users.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl IdentityProvider for MemoryIdentityProvider {
    async fn list_users(&self, max_results: u32, page_token: Option<&str>) -> Result<UserPage> {
        let page_index = self.list_calls.fetch_add(1, Ordering::SeqCst);
        if *self.fail_page.lock().unwrap() == Some(page_index) {
            return Err(AppError::IdentityProvider(
                "HTTP 503 Service Unavailable".to_string(),
            ));
        }

        let offset: usize = match page_token {
            Some(token) => token
                .parse()
                .map_err(|_| AppError::IdentityProvider(format!("bad page token {token}")))?,
            None => 0,
        };

        let users = self.users.lock().unwrap();
        let size = max_results as usize;
        let end = (offset + size).min(users.len());
        let page = users[offset.min(end)..end].to_vec();

        let next_offset = end.saturating_sub(self.page_overlap).max(offset + 1);
        let next_page_token = (end < users.len()).then(|| next_offset.to_string());

        Ok(UserPage {
            users: page,
            next_page_token,
        })
    }

    async fn get_user_by_email(&self, email: &str) -> Result<IdentityRecord> {
        self.users
            .lock()
            .unwrap()
            .iter()
            .find(|u| {
                u.email
                    .as_deref()
                    .is_some_and(|e| e.eq_ignore_ascii_case(email))
            })
            .cloned()
            .ok_or_else(|| AppError::NotFound(email.to_string()))
    }

    async fn set_custom_claims(&self, uid: &str, claims: &CustomClaims) -> Result<()> {
        let mut users = self.users.lock().unwrap();
        let user = users
            .iter_mut()
            .find(|u| u.uid == uid)
            .ok_or_else(|| AppError::NotFound(uid.to_string()))?;
        user.custom_claims = claims.clone();
        self.claim_writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

// ─── User store fake ─────────────────────────────────────────────

/// User store backed by a map, with per-uid failure injection.
#[derive(Default)]
pub struct MemoryUserStore {
    docs: Mutex<HashMap<String, UserDocument>>,
    fail_reads: Mutex<HashSet<String>>,
    fail_writes: Mutex<HashSet<String>>,
    writes: AtomicUsize,
}

#[allow(dead_code)]
impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a document without counting it as a write.
    pub fn insert(&self, doc: UserDocument) {
        self.docs.lock().unwrap().insert(doc.uid.clone(), doc);
    }

    pub fn fail_read(&self, uid: &str) {
        self.fail_reads.lock().unwrap().insert(uid.to_string());
    }

    pub fn fail_write(&self, uid: &str) {
        self.fail_writes.lock().unwrap().insert(uid.to_string());
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn len(&self) -> usize {
        self.docs.lock().unwrap().len()
    }

    pub fn get(&self, uid: &str) -> Option<UserDocument> {
        self.docs.lock().unwrap().get(uid).cloned()
    }
}

#[async_trait::async_trait]
impl UserStore for MemoryUserStore {
    async fn user_exists(&self, uid: &str) -> Result<bool> {
        if self.fail_reads.lock().unwrap().contains(uid) {
            return Err(AppError::Database("read unavailable".to_string()));
        }
        Ok(self.docs.lock().unwrap().contains_key(uid))
    }

    async fn get_user(&self, uid: &str) -> Result<Option<UserDocument>> {
        if self.fail_reads.lock().unwrap().contains(uid) {
            return Err(AppError::Database("read unavailable".to_string()));
        }
        Ok(self.get(uid))
    }

    async fn set_user(&self, doc: &UserDocument) -> Result<()> {
        if self.fail_writes.lock().unwrap().contains(&doc.uid) {
            return Err(AppError::Database("write rejected".to_string()));
        }
        self.docs
            .lock()
            .unwrap()
            .insert(doc.uid.clone(), doc.clone());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// App state wired to the given fakes.
#[allow(dead_code)]
pub fn test_state(
    identity: Arc<MemoryIdentityProvider>,
    store: Arc<MemoryUserStore>,
) -> AppState {
    AppState {
        config: Config::test_default(),
        identity,
        store,
    }
}
