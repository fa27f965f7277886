// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod enumerate;
pub mod identity;
pub mod roles;
pub mod sync;

pub use identity::{IdentityProvider, IdentityToolkitClient};
pub use roles::{AdminAssignment, AdminRevocation, AdminStatus, AdminSummary, RoleManager};
pub use sync::{SyncEntry, SyncOutcome, SyncProgress, SyncReport, UserSync};
