// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! User document stored in Firestore, and how one is built from an identity record.

use crate::models::identity::IdentityRecord;
use crate::time_utils::format_utc_rfc3339;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Role stored on documents for ordinary users.
pub const USER_ROLE: &str = "user";
/// Display name used when neither a name nor an email local part is available.
pub const FALLBACK_DISPLAY_NAME: &str = "User";

/// User profile stored in Firestore.
///
/// Document ID is always `uid`. Created once by a sync and never rewritten
/// by this tool afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDocument {
    /// Identity provider user ID (also used as document ID)
    pub uid: String,
    /// Email address, empty if the provider has none
    pub email: String,
    pub display_name: String,
    pub photo_url: Option<String>,
    pub phone_number: Option<String>,
    /// When the account was created (RFC 3339)
    pub created_at: String,
    /// Last sign-in (RFC 3339)
    pub last_login: String,
    pub is_email_verified: bool,
    /// `"admin"` or `"user"`
    pub role: String,
    pub woo_customer_id: Option<String>,
    pub default_address_id: Option<String>,
    pub marketing_consent: bool,
    pub loyalty: Loyalty,
    pub service_preferences: ServicePreferences,
    pub additional_info: Option<String>,
}

/// Loyalty programme state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Loyalty {
    pub points: u32,
    pub tier: String,
    pub last_earned: Option<String>,
}

impl Default for Loyalty {
    fn default() -> Self {
        Self {
            points: 0,
            tier: "Bronze".to_string(),
            last_earned: None,
        }
    }
}

/// Service scheduling and notification preferences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServicePreferences {
    pub preferred_time_slots: Vec<String>,
    pub available_days: Vec<String>,
    pub email_reminders: bool,
    pub sms_reminders: bool,
    pub push_notifications: bool,
    pub reminder_days_before: u32,
    pub preferred_contact_method: String,
    pub special_instructions: Option<String>,
}

impl Default for ServicePreferences {
    /// Starter configuration: weekday mornings, email and push reminders two weeks ahead.
    fn default() -> Self {
        Self {
            preferred_time_slots: vec!["09:00-12:00".to_string()],
            available_days: ["monday", "tuesday", "wednesday", "thursday", "friday"]
                .iter()
                .map(|d| d.to_string())
                .collect(),
            email_reminders: true,
            sms_reminders: false,
            push_notifications: true,
            reminder_days_before: 14,
            preferred_contact_method: "email".to_string(),
            special_instructions: None,
        }
    }
}

impl UserDocument {
    /// Build the initial document for an identity record.
    ///
    /// Pure: the only input besides the record is `now`, used when the
    /// provider reports no creation or sign-in time.
    pub fn from_identity(record: &IdentityRecord, now: DateTime<Utc>) -> Self {
        let role = if record.custom_claims.is_admin() {
            crate::models::identity::ADMIN_ROLE
        } else {
            USER_ROLE
        };

        Self {
            uid: record.uid.clone(),
            email: record.email.clone().unwrap_or_default(),
            display_name: display_name_for(record),
            photo_url: non_empty(record.photo_url.as_deref()),
            phone_number: non_empty(record.phone_number.as_deref()),
            created_at: format_utc_rfc3339(record.created_at.unwrap_or(now)),
            last_login: format_utc_rfc3339(record.last_sign_in_at.unwrap_or(now)),
            is_email_verified: record.email_verified,
            role: role.to_string(),
            woo_customer_id: None,
            default_address_id: None,
            marketing_consent: false,
            loyalty: Loyalty::default(),
            service_preferences: ServicePreferences::default(),
            additional_info: None,
        }
    }
}

/// Display name, else the email's local part, else `"User"`.
pub fn display_name_for(record: &IdentityRecord) -> String {
    non_empty(record.display_name.as_deref())
        .or_else(|| {
            record
                .email
                .as_deref()
                .and_then(|email| email.split('@').next())
                .and_then(|local| non_empty(Some(local)))
        })
        .unwrap_or_else(|| FALLBACK_DISPLAY_NAME.to_string())
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.filter(|v| !v.is_empty()).map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::identity::{CustomClaims, ROLE_CLAIM};
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 9, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_display_name_fallback_chain() {
        let mut record = IdentityRecord::new("u1", Some("a@b.com"));
        assert_eq!(display_name_for(&record), "a");

        record.display_name = Some("Marios El".to_string());
        assert_eq!(display_name_for(&record), "Marios El");

        record.display_name = Some(String::new());
        assert_eq!(display_name_for(&record), "a");

        let record = IdentityRecord::new("u2", None);
        assert_eq!(display_name_for(&record), "User");
    }

    #[test]
    fn test_display_name_odd_emails() {
        assert_eq!(
            display_name_for(&IdentityRecord::new("u", Some("no-at-sign"))),
            "no-at-sign"
        );
        assert_eq!(
            display_name_for(&IdentityRecord::new("u", Some("@example.com"))),
            "User"
        );
        assert_eq!(display_name_for(&IdentityRecord::new("u", Some(""))), "User");
    }

    #[test]
    fn test_role_from_claims() {
        let mut record = IdentityRecord::new("u1", Some("a@b.com"));
        assert_eq!(UserDocument::from_identity(&record, now()).role, "user");

        record.custom_claims.insert(ROLE_CLAIM, "editor");
        assert_eq!(UserDocument::from_identity(&record, now()).role, "user");

        record.custom_claims = CustomClaims::admin("acme", "2024-01-01T00:00:00Z");
        assert_eq!(UserDocument::from_identity(&record, now()).role, "admin");
    }

    #[test]
    fn test_defaults() {
        let record = IdentityRecord::new("u1", None);
        let doc = UserDocument::from_identity(&record, now());

        assert_eq!(doc.uid, "u1");
        assert_eq!(doc.email, "");
        assert_eq!(doc.created_at, "2024-09-01T12:00:00Z");
        assert_eq!(doc.last_login, "2024-09-01T12:00:00Z");
        assert_eq!(doc.loyalty, Loyalty::default());
        assert_eq!(doc.loyalty.tier, "Bronze");
        assert!(doc.loyalty.last_earned.is_none());

        let prefs = &doc.service_preferences;
        assert_eq!(prefs.preferred_time_slots, vec!["09:00-12:00"]);
        assert_eq!(
            prefs.available_days,
            vec!["monday", "tuesday", "wednesday", "thursday", "friday"]
        );
        assert!(prefs.email_reminders);
        assert!(!prefs.sms_reminders);
        assert!(prefs.push_notifications);
        assert_eq!(prefs.reminder_days_before, 14);
        assert_eq!(prefs.preferred_contact_method, "email");
        assert!(prefs.special_instructions.is_none());
    }

    #[test]
    fn test_provider_timestamps_win() {
        let mut record = IdentityRecord::new("u1", Some("a@b.com"));
        record.created_at = Some(Utc.with_ymd_and_hms(2023, 5, 4, 3, 2, 1).unwrap());
        record.last_sign_in_at = Some(Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap());
        record.email_verified = true;
        record.photo_url = Some(String::new());
        record.phone_number = Some("97809650".to_string());

        let doc = UserDocument::from_identity(&record, now());
        assert_eq!(doc.created_at, "2023-05-04T03:02:01Z");
        assert_eq!(doc.last_login, "2024-01-02T03:04:05Z");
        assert!(doc.is_email_verified);
        assert!(doc.photo_url.is_none());
        assert_eq!(doc.phone_number.as_deref(), Some("97809650"));
    }

    #[test]
    fn test_deterministic() {
        let record = IdentityRecord::new("u1", Some("a@b.com"));
        assert_eq!(
            UserDocument::from_identity(&record, now()),
            UserDocument::from_identity(&record, now())
        );
    }

    #[test]
    fn test_wire_field_names() {
        let doc = UserDocument::from_identity(&IdentityRecord::new("u1", Some("a@b.com")), now());
        let value = serde_json::to_value(&doc).unwrap();

        for key in [
            "uid",
            "email",
            "displayName",
            "photoUrl",
            "phoneNumber",
            "createdAt",
            "lastLogin",
            "isEmailVerified",
            "role",
            "wooCustomerId",
            "defaultAddressId",
            "marketingConsent",
            "loyalty",
            "servicePreferences",
            "additionalInfo",
        ] {
            assert!(value.get(key).is_some(), "missing field {key}");
        }
        assert!(value["loyalty"]["lastEarned"].is_null());
        assert_eq!(value["servicePreferences"]["reminderDaysBefore"], 14);
    }
}
