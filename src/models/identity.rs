// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Identity provider records and custom claims.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Claim key holding the user's role.
pub const ROLE_CLAIM: &str = "role";
/// Claim key holding the tenant the role was granted for.
pub const TENANT_CLAIM: &str = "company";
/// Claim key holding when the role was granted (RFC 3339).
pub const ASSIGNED_AT_CLAIM: &str = "assignedAt";
/// The only role value that grants admin access.
pub const ADMIN_ROLE: &str = "admin";

/// A user as reported by the identity provider.
///
/// Read-only to this tool apart from the custom claims.
#[derive(Debug, Clone, PartialEq)]
pub struct IdentityRecord {
    /// Provider user ID; also the document ID in the `users` collection
    pub uid: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub photo_url: Option<String>,
    pub phone_number: Option<String>,
    pub email_verified: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub last_sign_in_at: Option<DateTime<Utc>>,
    pub custom_claims: CustomClaims,
}

impl IdentityRecord {
    /// Minimal record with only an ID and email, mainly for tests and fakes.
    pub fn new(uid: impl Into<String>, email: Option<&str>) -> Self {
        Self {
            uid: uid.into(),
            email: email.map(str::to_string),
            display_name: None,
            photo_url: None,
            phone_number: None,
            email_verified: false,
            created_at: None,
            last_sign_in_at: None,
            custom_claims: CustomClaims::default(),
        }
    }

    /// Email for log lines and console output.
    pub fn email_or_placeholder(&self) -> &str {
        self.email.as_deref().unwrap_or("<no email>")
    }
}

/// One page of a user listing.
#[derive(Debug, Clone, Default)]
pub struct UserPage {
    pub users: Vec<IdentityRecord>,
    /// Opaque continuation token; `None` (or empty) on the last page
    pub next_page_token: Option<String>,
}

/// Arbitrary custom claims attached to a user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustomClaims(Map<String, Value>);

impl CustomClaims {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims granting the admin role for `tenant` at `assigned_at`.
    pub fn admin(tenant: &str, assigned_at: &str) -> Self {
        let mut claims = Self::new();
        claims.apply_admin(tenant, assigned_at);
        claims
    }

    /// Set the admin keys, leaving other claims untouched.
    pub fn apply_admin(&mut self, tenant: &str, assigned_at: &str) {
        self.0
            .insert(ROLE_CLAIM.to_string(), Value::from(ADMIN_ROLE));
        self.0
            .insert(TENANT_CLAIM.to_string(), Value::from(tenant));
        self.0
            .insert(ASSIGNED_AT_CLAIM.to_string(), Value::from(assigned_at));
    }

    /// Remove the admin keys, leaving other claims untouched.
    pub fn strip_admin(&mut self) {
        for key in [ROLE_CLAIM, TENANT_CLAIM, ASSIGNED_AT_CLAIM] {
            self.0.remove(key);
        }
    }

    /// True only when `role` is exactly the string `"admin"`.
    pub fn is_admin(&self) -> bool {
        self.role() == Some(ADMIN_ROLE)
    }

    pub fn role(&self) -> Option<&str> {
        self.get_str(ROLE_CLAIM)
    }

    pub fn tenant(&self) -> Option<&str> {
        self.get_str(TENANT_CLAIM)
    }

    pub fn assigned_at(&self) -> Option<&str> {
        self.get_str(ASSIGNED_AT_CLAIM)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Claims in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Serialize for the provider, which stores claims as a JSON string.
    pub fn to_json_string(&self) -> String {
        Value::Object(self.0.clone()).to_string()
    }

    /// Parse the provider's JSON-string form. Anything other than a JSON
    /// object yields an empty claim set.
    pub fn from_json_str(raw: &str) -> Self {
        match serde_json::from_str::<Value>(raw) {
            Ok(Value::Object(map)) => Self(map),
            _ => Self::default(),
        }
    }

    fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }
}

/// Renders a claim value the way it reads on a console: strings unquoted,
/// everything else as JSON.
pub struct ClaimValue<'a>(pub &'a Value);

impl fmt::Display for ClaimValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Value::String(s) => f.write_str(s),
            other => write!(f, "{}", other),
        }
    }
}
