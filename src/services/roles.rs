// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Admin role management through identity provider custom claims.
//!
//! Claim changes only reach new ID tokens; sessions that already hold a
//! token keep the old claims until it is refreshed.

use crate::config::ClaimsMode;
use crate::error::Result;
use crate::models::{CustomClaims, IdentityRecord};
use crate::services::enumerate;
use crate::services::identity::IdentityProvider;
use crate::time_utils::format_utc_rfc3339;
use chrono::{DateTime, Utc};
use futures_util::TryStreamExt;
use std::sync::Arc;

/// Result of granting the admin role.
#[derive(Debug, Clone, PartialEq)]
pub struct AdminAssignment {
    pub uid: String,
    pub email: String,
    pub tenant: String,
    pub assigned_at: String,
}

/// Result of revoking the admin role.
#[derive(Debug, Clone, PartialEq)]
pub struct AdminRevocation {
    pub uid: String,
    pub email: String,
    /// Claims left on the user afterwards (always empty in replace mode)
    pub remaining_claims: CustomClaims,
}

/// An admin found while listing.
#[derive(Debug, Clone, PartialEq)]
pub struct AdminSummary {
    pub uid: String,
    pub email: Option<String>,
    pub tenant: Option<String>,
    pub assigned_at: Option<String>,
    pub last_sign_in_at: Option<DateTime<Utc>>,
}

/// Admin status of one user.
#[derive(Debug, Clone, PartialEq)]
pub struct AdminStatus {
    pub user: IdentityRecord,
    pub is_admin: bool,
}

impl AdminStatus {
    pub fn claims(&self) -> &CustomClaims {
        &self.user.custom_claims
    }
}

/// Grants, revokes and reports the admin role.
#[derive(Clone)]
pub struct RoleManager {
    identity: Arc<dyn IdentityProvider>,
    tenant: String,
    mode: ClaimsMode,
    page_size: u32,
}

impl RoleManager {
    pub fn new(
        identity: Arc<dyn IdentityProvider>,
        tenant: impl Into<String>,
        mode: ClaimsMode,
        page_size: u32,
    ) -> Self {
        Self {
            identity,
            tenant: tenant.into(),
            mode,
            page_size,
        }
    }

    /// Grant the admin role to the user with this email.
    pub async fn assign(&self, email: &str) -> Result<AdminAssignment> {
        self.assign_at(email, Utc::now()).await
    }

    /// Grant the admin role, stamping `now` as the assignment time.
    pub async fn assign_at(&self, email: &str, now: DateTime<Utc>) -> Result<AdminAssignment> {
        let user = self.identity.get_user_by_email(email).await?;
        let assigned_at = format_utc_rfc3339(now);

        let claims = match self.mode {
            ClaimsMode::Replace => CustomClaims::admin(&self.tenant, &assigned_at),
            ClaimsMode::Merge => {
                let mut claims = user.custom_claims.clone();
                claims.apply_admin(&self.tenant, &assigned_at);
                claims
            }
        };

        self.identity.set_custom_claims(&user.uid, &claims).await?;

        tracing::info!(
            uid = %user.uid,
            email,
            tenant = %self.tenant,
            "Admin role assigned"
        );

        Ok(AdminAssignment {
            uid: user.uid,
            email: email.to_string(),
            tenant: self.tenant.clone(),
            assigned_at,
        })
    }

    /// Revoke the admin role from the user with this email.
    ///
    /// In replace mode every custom claim is cleared, not just the role.
    pub async fn revoke(&self, email: &str) -> Result<AdminRevocation> {
        let user = self.identity.get_user_by_email(email).await?;

        let remaining_claims = match self.mode {
            ClaimsMode::Replace => CustomClaims::new(),
            ClaimsMode::Merge => {
                let mut claims = user.custom_claims.clone();
                claims.strip_admin();
                claims
            }
        };

        self.identity
            .set_custom_claims(&user.uid, &remaining_claims)
            .await?;

        tracing::info!(uid = %user.uid, email, "Admin role removed");

        Ok(AdminRevocation {
            uid: user.uid,
            email: email.to_string(),
            remaining_claims,
        })
    }

    /// Every user whose claims carry the admin role, in provider order.
    pub async fn list(&self) -> Result<Vec<AdminSummary>> {
        let admins: Vec<AdminSummary> =
            enumerate::all_users(self.identity.as_ref(), self.page_size)
                .try_filter(|user| futures_util::future::ready(user.custom_claims.is_admin()))
                .map_ok(|user| AdminSummary {
                    tenant: user.custom_claims.tenant().map(str::to_string),
                    assigned_at: user.custom_claims.assigned_at().map(str::to_string),
                    uid: user.uid,
                    email: user.email,
                    last_sign_in_at: user.last_sign_in_at,
                })
                .try_collect()
                .await?;

        tracing::debug!(count = admins.len(), "Listed admin users");
        Ok(admins)
    }

    /// Report whether the user with this email is an admin.
    pub async fn check(&self, email: &str) -> Result<AdminStatus> {
        let user = self.identity.get_user_by_email(email).await?;
        let is_admin = user.custom_claims.is_admin();

        Ok(AdminStatus { user, is_admin })
    }
}
