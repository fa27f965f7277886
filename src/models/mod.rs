// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod identity;
pub mod user;

pub use identity::{CustomClaims, IdentityRecord, UserPage};
pub use user::{Loyalty, ServicePreferences, UserDocument};
