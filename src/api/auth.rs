//! DoubleCloud Authentication
//!
//! Handles authentication with either a ready-made IAM token or a
//! service-account authorized key. Keys are turned into access tokens by
//! signing a short-lived JWT and exchanging it at the token endpoint.

use super::error::{ApiError, Result};
use super::http::DcHttpClient;
use async_trait::async_trait;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

/// Default OAuth token endpoint used for service-account key exchange
pub const DEFAULT_TOKEN_ENDPOINT: &str = "https://auth.double.cloud/oauth/token";

/// Grant type of the JWT-bearer exchange
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Lifetime of the signed assertion
const ASSERTION_TTL: Duration = Duration::from_secs(60 * 60);

/// Token expiry buffer - refresh tokens this much before they actually expire
/// This prevents using tokens that are about to expire during a request
const TOKEN_EXPIRY_BUFFER: Duration = Duration::from_secs(60);

/// Default token TTL if the exchange does not report one (conservative: 30 minutes)
const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(30 * 60);

/// Service-account authorized key as downloaded from the console
#[derive(Clone, Deserialize)]
pub struct AuthorizedKey {
    pub id: String,
    pub service_account_id: String,
    pub private_key: String,
}

impl std::fmt::Debug for AuthorizedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthorizedKey")
            .field("id", &self.id)
            .field("service_account_id", &self.service_account_id)
            .field("private_key", &"<redacted>")
            .finish()
    }
}

impl AuthorizedKey {
    /// Parse the JSON key document
    pub fn from_json(raw: &str) -> Result<Self> {
        let key: AuthorizedKey = serde_json::from_str(raw)
            .map_err(|e| ApiError::Auth(format!("malformed authorized key: {}", e)))?;
        if key.id.is_empty() || key.service_account_id.is_empty() || key.private_key.is_empty() {
            return Err(ApiError::Auth(
                "authorized key must contain id, service_account_id and private_key".to_string(),
            ));
        }
        Ok(key)
    }
}

/// A freshly issued access token
#[derive(Debug, Clone)]
pub struct AccessToken {
    pub token: String,
    /// How long the token stays valid; `None` never expires
    pub ttl: Option<Duration>,
}

/// Source of access tokens
#[async_trait]
pub trait TokenSource: Send + Sync {
    async fn fetch(&self) -> Result<AccessToken>;
}

/// Pre-issued IAM token (e.g. from `DC_TOKEN`)
pub struct StaticToken(String);

#[async_trait]
impl TokenSource for StaticToken {
    async fn fetch(&self) -> Result<AccessToken> {
        Ok(AccessToken {
            token: self.0.clone(),
            ttl: None,
        })
    }
}

#[derive(Serialize)]
struct Claims<'a> {
    iss: &'a str,
    sub: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Serialize)]
struct ExchangeRequest<'a> {
    grant_type: &'a str,
    assertion: &'a str,
}

#[derive(Deserialize)]
struct ExchangeResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

/// Exchanges a signed service-account assertion for an access token
pub struct ServiceAccountKey {
    key: AuthorizedKey,
    token_endpoint: String,
    http: DcHttpClient,
}

impl ServiceAccountKey {
    pub fn new(key: AuthorizedKey, token_endpoint: impl Into<String>, http: DcHttpClient) -> Self {
        Self {
            key,
            token_endpoint: token_endpoint.into(),
            http,
        }
    }

    /// Sign the JWT assertion presented to the token endpoint
    pub fn assertion(&self) -> Result<String> {
        let now = chrono::Utc::now().timestamp();
        let claims = Claims {
            iss: &self.key.service_account_id,
            sub: &self.key.service_account_id,
            aud: &self.token_endpoint,
            iat: now,
            exp: now + ASSERTION_TTL.as_secs() as i64,
        };

        let mut header = Header::new(Algorithm::PS256);
        header.kid = Some(self.key.id.clone());

        let encoding_key = EncodingKey::from_rsa_pem(self.key.private_key.as_bytes())
            .map_err(|e| ApiError::Auth(format!("invalid private key: {}", e)))?;

        jsonwebtoken::encode(&header, &claims, &encoding_key)
            .map_err(|e| ApiError::Auth(format!("failed to sign assertion: {}", e)))
    }
}

#[async_trait]
impl TokenSource for ServiceAccountKey {
    async fn fetch(&self) -> Result<AccessToken> {
        let assertion = self.assertion()?;
        let request = ExchangeRequest {
            grant_type: JWT_BEARER_GRANT,
            assertion: &assertion,
        };

        let response: ExchangeResponse = self
            .http
            .post_form(&self.token_endpoint, &request)
            .await
            .map_err(|e| match e {
                ApiError::Status { status, message } => {
                    ApiError::Auth(format!("token exchange rejected ({}): {}", status, message))
                }
                other => other,
            })?;

        tracing::debug!(
            "Exchanged authorized key {} for an access token",
            self.key.id
        );

        Ok(AccessToken {
            token: response.access_token,
            ttl: Some(
                response
                    .expires_in
                    .map(Duration::from_secs)
                    .unwrap_or(DEFAULT_TOKEN_TTL),
            ),
        })
    }
}

/// Credentials holder with token caching
#[derive(Clone)]
pub struct Credentials {
    provider: Arc<dyn TokenSource>,
    token_cache: Arc<RwLock<Option<CachedToken>>>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials").finish_non_exhaustive()
    }
}

#[derive(Clone)]
struct CachedToken {
    token: String,
    /// When this token expires (with buffer applied); `None` never expires
    expires_at: Option<Instant>,
}

impl CachedToken {
    /// Check if this cached token is still valid
    fn is_valid(&self) -> bool {
        self.expires_at.map_or(true, |at| Instant::now() < at)
    }
}

impl Credentials {
    pub fn new(provider: Arc<dyn TokenSource>) -> Self {
        Self {
            provider,
            token_cache: Arc::new(RwLock::new(None)),
        }
    }

    /// Credentials backed by a fixed IAM token
    pub fn static_token(token: impl Into<String>) -> Self {
        Self::new(Arc::new(StaticToken(token.into())))
    }

    /// Get an access token for API calls
    /// Checks token expiry before returning cached token
    pub async fn get_token(&self) -> Result<String> {
        {
            let cache = self.token_cache.read().await;
            if let Some(cached) = cache.as_ref() {
                if cached.is_valid() {
                    return Ok(cached.token.clone());
                }
                tracing::debug!("Cached token expired, fetching new token");
            }
        }

        let fresh = self.provider.fetch().await?;

        let expires_at = fresh
            .ttl
            .map(|ttl| Instant::now() + ttl.saturating_sub(TOKEN_EXPIRY_BUFFER));

        {
            let mut cache = self.token_cache.write().await;
            *cache = Some(CachedToken {
                token: fresh.token.clone(),
                expires_at,
            });
        }

        Ok(fresh.token)
    }

    /// Force refresh the token
    pub async fn refresh_token(&self) -> Result<String> {
        {
            let mut cache = self.token_cache.write().await;
            *cache = None;
        }

        self.get_token().await
    }
}
