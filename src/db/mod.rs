// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Database layer (Firestore).

pub mod firestore;

pub use firestore::FirestoreDb;

use crate::error::Result;
use crate::models::UserDocument;

/// Collection names as constants.
pub mod collections {
    pub const USERS: &str = "users";
}

/// Document-store operations on the `users` collection.
///
/// The sync pipeline only needs an existence check and a full-overwrite
/// write; callers are responsible for checking before writing.
#[async_trait::async_trait]
pub trait UserStore: Send + Sync {
    /// True if a document exists at `users/{uid}`.
    async fn user_exists(&self, uid: &str) -> Result<bool>;

    /// Read a user document, if present.
    async fn get_user(&self, uid: &str) -> Result<Option<UserDocument>>;

    /// Write `doc` at `users/{doc.uid}`, replacing anything already there.
    async fn set_user(&self, doc: &UserDocument) -> Result<()>;
}
