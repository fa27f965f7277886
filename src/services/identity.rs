// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Identity provider port and its Firebase Authentication implementation.
//!
//! Talks to the Identity Toolkit v1 REST API:
//! - `accounts:batchGet` for paged listing
//! - `accounts:lookup` for email lookup
//! - `accounts:update` for replacing custom claims

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::models::{CustomClaims, IdentityRecord, UserPage};
use crate::time_utils::parse_epoch_millis;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

const TOOLKIT_HOST: &str = "https://identitytoolkit.googleapis.com";
const HTTP_TIMEOUT: Duration = Duration::from_secs(30);
const IDENTITY_SCOPES: [&str; 2] = [
    "https://www.googleapis.com/auth/identitytoolkit",
    "https://www.googleapis.com/auth/cloud-platform",
];

/// Operations this tool needs from the identity provider.
#[async_trait::async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Fetch one page of users. `page_token` is the previous page's
    /// continuation token, or `None` for the first page.
    async fn list_users(&self, max_results: u32, page_token: Option<&str>) -> Result<UserPage>;

    /// Look up a user by email. Fails with `AppError::NotFound` if absent.
    async fn get_user_by_email(&self, email: &str) -> Result<IdentityRecord>;

    /// Replace the user's entire custom claim set. An empty set clears all claims.
    async fn set_custom_claims(&self, uid: &str, claims: &CustomClaims) -> Result<()>;
}

enum Auth {
    /// OAuth access tokens minted from the service-account key.
    ServiceAccount(Arc<gcloud_sdk::GoogleAuthTokenGenerator>),
    /// The Auth emulator accepts any request bearing `owner`.
    Emulator,
}

/// Identity Toolkit REST client.
pub struct IdentityToolkitClient {
    http: reqwest::Client,
    base_url: String,
    auth: Auth,
}

impl IdentityToolkitClient {
    /// Connect using the configured credentials, or the Auth emulator if
    /// FIREBASE_AUTH_EMULATOR_HOST is set.
    pub async fn connect(config: &Config) -> Result<Self> {
        if let Some(host) = &config.auth_emulator_host {
            tracing::info!(host = %host, "Using Firebase Auth Emulator");
            return Self::new(
                &format!("http://{}/identitytoolkit.googleapis.com", host),
                &config.project_id,
                Auth::Emulator,
            );
        }

        let generator = gcloud_sdk::GoogleAuthTokenGenerator::new(
            gcloud_sdk::TokenSourceType::File(config.credentials_path.clone()),
            IDENTITY_SCOPES.iter().map(|s| s.to_string()).collect(),
        )
        .await
        .map_err(|e| {
            AppError::IdentityProvider(format!("Failed to load identity credentials: {}", e))
        })?;

        tracing::info!(project = %config.project_id, "Identity Toolkit client initialized");

        Self::new(
            TOOLKIT_HOST,
            &config.project_id,
            Auth::ServiceAccount(Arc::new(generator)),
        )
    }

    fn new(host: &str, project_id: &str, auth: Auth) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .map_err(|e| AppError::Internal(anyhow::anyhow!("HTTP client error: {}", e)))?;

        Ok(Self {
            http,
            base_url: format!("{}/v1/projects/{}", host, project_id),
            auth,
        })
    }

    async fn authorization(&self) -> Result<String> {
        match &self.auth {
            Auth::Emulator => Ok("Bearer owner".to_string()),
            Auth::ServiceAccount(generator) => {
                let token = generator.create_token().await.map_err(|e| {
                    AppError::IdentityProvider(format!("Failed to obtain access token: {}", e))
                })?;
                Ok(format!(
                    "{} {}",
                    token.token_type,
                    token.token.as_sensitive_str()
                ))
            }
        }
    }

    async fn post_json<T: for<'de> Deserialize<'de>>(
        &self,
        method: &str,
        body: &serde_json::Value,
    ) -> Result<T> {
        let url = format!("{}/accounts:{}", self.base_url, method);

        let response = self
            .http
            .post(&url)
            .header(reqwest::header::AUTHORIZATION, self.authorization().await?)
            .json(body)
            .send()
            .await
            .map_err(|e| AppError::IdentityProvider(e.to_string()))?;

        check_response_json(response).await
    }
}

#[async_trait::async_trait]
impl IdentityProvider for IdentityToolkitClient {
    async fn list_users(&self, max_results: u32, page_token: Option<&str>) -> Result<UserPage> {
        let url = format!("{}/accounts:batchGet", self.base_url);

        let mut query = vec![("maxResults", max_results.to_string())];
        if let Some(token) = page_token {
            query.push(("nextPageToken", token.to_string()));
        }

        let response = self
            .http
            .get(&url)
            .header(reqwest::header::AUTHORIZATION, self.authorization().await?)
            .query(&query)
            .send()
            .await
            .map_err(|e| AppError::IdentityProvider(e.to_string()))?;

        let body: BatchGetResponse = check_response_json(response).await?;

        Ok(UserPage {
            users: body.users.into_iter().map(IdentityRecord::from).collect(),
            next_page_token: body.next_page_token.filter(|t| !t.is_empty()),
        })
    }

    async fn get_user_by_email(&self, email: &str) -> Result<IdentityRecord> {
        let body: LookupResponse = self
            .post_json("lookup", &serde_json::json!({ "email": [email] }))
            .await?;

        body.users
            .into_iter()
            .next()
            .map(IdentityRecord::from)
            .ok_or_else(|| AppError::NotFound(email.to_string()))
    }

    async fn set_custom_claims(&self, uid: &str, claims: &CustomClaims) -> Result<()> {
        let body = serde_json::json!({
            "localId": uid,
            "customAttributes": claims.to_json_string(),
        });

        let _: serde_json::Value = self
            .post_json("update", &body)
            .await
            .map_err(|e| match e {
                AppError::IdentityProvider(msg) if msg.contains("USER_NOT_FOUND") => {
                    AppError::NotFound(uid.to_string())
                }
                other => other,
            })?;

        tracing::debug!(uid, claims = claims.len(), "Custom claims replaced");
        Ok(())
    }
}

/// Check response status and parse the JSON body.
async fn check_response_json<T: for<'de> Deserialize<'de>>(
    response: reqwest::Response,
) -> Result<T> {
    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if status.as_u16() == 429 {
            tracing::warn!("Identity Toolkit quota exceeded (429)");
        }

        return Err(AppError::IdentityProvider(format!(
            "HTTP {}: {}",
            status, body
        )));
    }

    response
        .json()
        .await
        .map_err(|e| AppError::IdentityProvider(format!("JSON parse error: {}", e)))
}

/// `accounts:batchGet` response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BatchGetResponse {
    #[serde(default)]
    users: Vec<ToolkitUser>,
    next_page_token: Option<String>,
}

/// `accounts:lookup` response; `users` is omitted when nothing matches.
#[derive(Debug, Deserialize)]
struct LookupResponse {
    #[serde(default)]
    users: Vec<ToolkitUser>,
}

/// User as returned by the Identity Toolkit API.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ToolkitUser {
    local_id: String,
    email: Option<String>,
    display_name: Option<String>,
    photo_url: Option<String>,
    phone_number: Option<String>,
    #[serde(default)]
    email_verified: bool,
    /// Epoch milliseconds as a decimal string
    created_at: Option<String>,
    /// Epoch milliseconds as a decimal string
    last_login_at: Option<String>,
    /// Custom claims serialized as a JSON string
    custom_attributes: Option<String>,
}

impl From<ToolkitUser> for IdentityRecord {
    fn from(user: ToolkitUser) -> Self {
        Self {
            uid: user.local_id,
            email: user.email,
            display_name: user.display_name,
            photo_url: user.photo_url,
            phone_number: user.phone_number,
            email_verified: user.email_verified,
            created_at: parse_epoch_millis(user.created_at.as_deref()),
            last_sign_in_at: parse_epoch_millis(user.last_login_at.as_deref()),
            custom_claims: user
                .custom_attributes
                .as_deref()
                .map(CustomClaims::from_json_str)
                .unwrap_or_default(),
        }
    }
}
