/// Directory Client - outbound calls to the GitLab user directory
///
/// Pure transport: searching users and listing a user's GPG keys. The
/// single-match invariant and key decoding live in the resolver; nothing
/// here interprets the results.
use crate::error::GatewayResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde::Deserialize;
use std::time::Duration;
use tracing::info;

/// One candidate identity from the directory's user search
#[derive(Debug, Clone, Deserialize)]
pub struct DirectoryUser {
    pub id: u64,
    pub name: String,
    pub username: String,
    pub web_url: String,
}

impl DirectoryUser {
    /// Human-readable form used when a search names this user in an error
    pub fn describe(&self) -> String {
        format!("{} ({}, {})", self.username, self.name, self.web_url)
    }
}

/// One GPG key record attached to a directory user
#[derive(Debug, Clone, Deserialize)]
pub struct KeyRecord {
    pub id: u64,
    /// Armored key material, opaque at this layer
    pub key: String,
    pub created_at: DateTime<Utc>,
}

/// Outbound identity-directory operations
///
/// A trait seam so the resolver takes an injected client and tests can
/// substitute a fake without touching process state.
#[async_trait]
pub trait Directory: Send + Sync {
    /// `GET /users?search=<term>` - candidate identities for a search term
    async fn search_users(&self, search: &str) -> GatewayResult<Vec<DirectoryUser>>;

    /// `GET /users/<id>/gpg_keys` - key records for a resolved identity
    async fn list_gpg_keys(&self, user_id: u64) -> GatewayResult<Vec<KeyRecord>>;
}

/// GitLab REST API v4 directory client
pub struct GitLabDirectory {
    client: reqwest::Client,
    base_url: String,
}

impl GitLabDirectory {
    /// Build a client with a static bearer token and a fixed per-call timeout
    pub fn new(host: &str, token: &str, timeout: Duration) -> GatewayResult<Self> {
        let mut bearer = HeaderValue::from_str(&format!("Bearer {}", token)).map_err(|_| {
            crate::error::GatewayError::Config(
                "GitLab token contains characters not allowed in a header".to_string(),
            )
        })?;
        bearer.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, bearer);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: format!("https://{}/api/v4", host),
        })
    }
}

#[async_trait]
impl Directory for GitLabDirectory {
    async fn search_users(&self, search: &str) -> GatewayResult<Vec<DirectoryUser>> {
        let url = format!("{}/users", self.base_url);
        info!(%url, search, "directory user search");

        let users = self
            .client
            .get(&url)
            .query(&[("search", search)])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(users)
    }

    async fn list_gpg_keys(&self, user_id: u64) -> GatewayResult<Vec<KeyRecord>> {
        let url = format!("{}/users/{}/gpg_keys", self.base_url, user_id);
        info!(%url, "directory key listing");

        let records = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(records)
    }
}
