// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Filternet-Admin: administrative tooling for the WaterFilterNet Firebase project
//!
//! This crate syncs Firebase Authentication users into the Firestore `users`
//! collection and manages the admin role through custom claims.

pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod services;
pub mod time_utils;

use config::Config;
use db::UserStore;
use services::{IdentityProvider, RoleManager, UserSync};
use std::sync::Arc;

/// Shared service handles for one invocation.
pub struct AppState {
    pub config: Config,
    pub identity: Arc<dyn IdentityProvider>,
    pub store: Arc<dyn UserStore>,
}

impl AppState {
    pub fn user_sync(&self) -> UserSync {
        UserSync::new(
            self.identity.clone(),
            self.store.clone(),
            self.config.page_size,
        )
    }

    pub fn role_manager(&self) -> RoleManager {
        RoleManager::new(
            self.identity.clone(),
            self.config.tenant_id.clone(),
            self.config.claims_mode,
            self.config.page_size,
        )
    }
}
