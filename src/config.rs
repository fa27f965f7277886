// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Configuration loaded from environment variables and the service-account key.
//!
//! The key file is read once at startup. When both Firebase emulators are
//! configured the key file becomes optional, so the tool can run against a
//! local emulator suite without real credentials.

use serde::Deserialize;
use std::env;
use std::path::{Path, PathBuf};

/// Default location of the service-account key, relative to the working directory.
pub const DEFAULT_CREDENTIALS_PATH: &str = "scripts/firebase-admin-key.json";

/// Tenant written into admin claims unless overridden.
pub const DEFAULT_TENANT_ID: &str = "waterfilternet-cyprus";

/// Identity Toolkit caps listing pages at 1000 users.
pub const MAX_PAGE_SIZE: u32 = 1000;

/// How role assignment treats claims that are already on the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClaimsMode {
    /// Overwrite the entire claim set (assign) or clear it (revoke).
    #[default]
    Replace,
    /// Touch only the admin keys and keep everything else.
    Merge,
}

impl std::str::FromStr for ClaimsMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "replace" => Ok(ClaimsMode::Replace),
            "merge" => Ok(ClaimsMode::Merge),
            other => Err(ConfigError::Invalid {
                name: "CLAIMS_MODE",
                value: other.to_string(),
            }),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Fields we need from a Google service-account key file.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub project_id: String,
    pub client_email: String,
}

impl ServiceAccountKey {
    /// Read and parse a key file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::Credentials {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        serde_json::from_str(&raw).map_err(|e| ConfigError::Credentials {
            path: path.to_path_buf(),
            reason: format!("not a service-account key: {}", e),
        })
    }
}

/// Tool configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to the service-account key file
    pub credentials_path: PathBuf,
    /// Parsed key, absent only in emulator mode
    pub service_account: Option<ServiceAccountKey>,
    /// Firebase / GCP project ID
    pub project_id: String,
    /// Tenant identifier stored in admin claims
    pub tenant_id: String,
    /// Users requested per listing page
    pub page_size: u32,
    pub claims_mode: ClaimsMode,
    pub log_format: LogFormat,
    /// Auth emulator host (host:port), if set
    pub auth_emulator_host: Option<String>,
    /// Firestore emulator host (host:port), if set
    pub firestore_emulator_host: Option<String>,
}

impl Config {
    /// Service account the tool acts as, if a key file was loaded.
    pub fn service_account_email(&self) -> Option<&str> {
        self.service_account
            .as_ref()
            .map(|key| key.client_email.as_str())
    }

    /// Default config for testing only.
    pub fn test_default() -> Self {
        Self {
            credentials_path: PathBuf::from(DEFAULT_CREDENTIALS_PATH),
            service_account: None,
            project_id: "test-project".to_string(),
            tenant_id: DEFAULT_TENANT_ID.to_string(),
            page_size: MAX_PAGE_SIZE,
            claims_mode: ClaimsMode::Replace,
            log_format: LogFormat::Pretty,
            auth_emulator_host: None,
            firestore_emulator_host: None,
        }
    }

    /// Load configuration from environment variables and the key file.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let credentials_path = var("FIREBASE_CREDENTIALS")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CREDENTIALS_PATH));
        let auth_emulator_host = var("FIREBASE_AUTH_EMULATOR_HOST");
        let firestore_emulator_host = var("FIRESTORE_EMULATOR_HOST");
        let emulated = auth_emulator_host.is_some() && firestore_emulator_host.is_some();

        let service_account = match ServiceAccountKey::load(&credentials_path) {
            Ok(key) => Some(key),
            Err(e) if !emulated => return Err(e),
            Err(_) => None,
        };

        let project_id = var("FIREBASE_PROJECT_ID")
            .or_else(|| service_account.as_ref().map(|k| k.project_id.clone()))
            .ok_or(ConfigError::Missing("FIREBASE_PROJECT_ID"))?;

        let page_size = match var("LIST_PAGE_SIZE") {
            Some(raw) => raw
                .trim()
                .parse::<u32>()
                .map_err(|_| ConfigError::Invalid {
                    name: "LIST_PAGE_SIZE",
                    value: raw.clone(),
                })?
                .clamp(1, MAX_PAGE_SIZE),
            None => MAX_PAGE_SIZE,
        };

        let claims_mode = match var("CLAIMS_MODE") {
            Some(raw) => raw.parse()?,
            None => ClaimsMode::default(),
        };

        let log_format = match var("LOG_FORMAT").as_deref().map(str::trim) {
            Some("json") => LogFormat::Json,
            Some("pretty") | None => LogFormat::Pretty,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    name: "LOG_FORMAT",
                    value: other.to_string(),
                })
            }
        };

        Ok(Self {
            credentials_path,
            service_account,
            project_id,
            tenant_id: var("ADMIN_TENANT_ID").unwrap_or_else(|| DEFAULT_TENANT_ID.to_string()),
            page_size,
            claims_mode,
            log_format,
            auth_emulator_host,
            firestore_emulator_host,
        })
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },

    #[error("Cannot load service-account key at {}: {reason}", path.display())]
    Credentials { path: PathBuf, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn write_key(dir: &Path, body: &str) -> PathBuf {
        let path = dir.join(format!(
            "key-{}.json",
            chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default()
        ));
        std::fs::write(&path, body).unwrap();
        path
    }

    fn lookup(vars: HashMap<&'static str, String>) -> impl Fn(&str) -> Option<String> {
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_config_from_key_file() {
        let path = write_key(
            &env::temp_dir(),
            r#"{"type":"service_account","project_id":"waterfilternet-82513","client_email":"admin@waterfilternet-82513.iam.gserviceaccount.com"}"#,
        );
        let vars = HashMap::from([("FIREBASE_CREDENTIALS", path.display().to_string())]);

        let config = Config::from_lookup(lookup(vars)).expect("Config should load");

        assert_eq!(config.project_id, "waterfilternet-82513");
        assert_eq!(config.tenant_id, DEFAULT_TENANT_ID);
        assert_eq!(config.page_size, MAX_PAGE_SIZE);
        assert_eq!(config.claims_mode, ClaimsMode::Replace);
        assert_eq!(
            config.service_account_email(),
            Some("admin@waterfilternet-82513.iam.gserviceaccount.com")
        );
    }

    #[test]
    fn test_missing_key_file_is_fatal() {
        let vars = HashMap::from([(
            "FIREBASE_CREDENTIALS",
            "/nonexistent/firebase-admin-key.json".to_string(),
        )]);

        let err = Config::from_lookup(lookup(vars)).unwrap_err();
        assert!(matches!(err, ConfigError::Credentials { .. }));
    }

    #[test]
    fn test_invalid_key_file_is_fatal() {
        let path = write_key(&env::temp_dir(), "not json at all");
        let vars = HashMap::from([("FIREBASE_CREDENTIALS", path.display().to_string())]);

        let err = Config::from_lookup(lookup(vars)).unwrap_err();
        assert!(err.to_string().contains("not a service-account key"));
    }

    #[test]
    fn test_emulator_mode_without_key() {
        let vars = HashMap::from([
            ("FIREBASE_CREDENTIALS", "/nonexistent/key.json".to_string()),
            ("FIREBASE_AUTH_EMULATOR_HOST", "localhost:9099".to_string()),
            ("FIRESTORE_EMULATOR_HOST", "localhost:8080".to_string()),
            ("FIREBASE_PROJECT_ID", "demo-project".to_string()),
            ("LIST_PAGE_SIZE", "5000".to_string()),
            ("CLAIMS_MODE", "Merge".to_string()),
            ("LOG_FORMAT", "json".to_string()),
        ]);

        let config = Config::from_lookup(lookup(vars)).unwrap();
        assert!(config.service_account.is_none());
        assert!(config.service_account_email().is_none());
        assert_eq!(config.project_id, "demo-project");
        assert_eq!(config.page_size, MAX_PAGE_SIZE);
        assert_eq!(config.claims_mode, ClaimsMode::Merge);
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn test_emulator_mode_still_needs_project() {
        let vars = HashMap::from([
            ("FIREBASE_CREDENTIALS", "/nonexistent/key.json".to_string()),
            ("FIREBASE_AUTH_EMULATOR_HOST", "localhost:9099".to_string()),
            ("FIRESTORE_EMULATOR_HOST", "localhost:8080".to_string()),
        ]);

        let err = Config::from_lookup(lookup(vars)).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("FIREBASE_PROJECT_ID")));
    }

    #[test]
    fn test_rejects_bad_values() {
        let base = || {
            HashMap::from([
                ("FIREBASE_CREDENTIALS", "/nonexistent/key.json".to_string()),
                ("FIREBASE_AUTH_EMULATOR_HOST", "localhost:9099".to_string()),
                ("FIRESTORE_EMULATOR_HOST", "localhost:8080".to_string()),
                ("FIREBASE_PROJECT_ID", "demo-project".to_string()),
            ])
        };

        let mut vars = base();
        vars.insert("LIST_PAGE_SIZE", "lots".to_string());
        assert!(Config::from_lookup(lookup(vars)).is_err());

        let mut vars = base();
        vars.insert("CLAIMS_MODE", "append".to_string());
        assert!(Config::from_lookup(lookup(vars)).is_err());

        let mut vars = base();
        vars.insert("LOG_FORMAT", "xml".to_string());
        assert!(Config::from_lookup(lookup(vars)).is_err());
    }
}
