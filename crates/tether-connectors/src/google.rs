//! Google ID-token verification with JWKS key rotation.
//!
//! Validates the RS256 signature against Google's published JWKS, checks the
//! issuer and audience, and requires a verified email before returning the
//! caller's identity.

use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tether_core::constants::{GOOGLE_ALLOWED_ISSUERS, GOOGLE_JWKS_URL};
use tether_core::models::VerifiedUserInfo;
use tether_core::AppError;
use tokio::sync::RwLock;

/// JWKS (JSON Web Key Set) structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Jwks {
    pub keys: Vec<Jwk>,
}

/// JSON Web Key structure (RSA subset; Google signs ID tokens with RS256)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Jwk {
    #[serde(rename = "kty")]
    pub key_type: String,
    #[serde(rename = "kid")]
    pub key_id: Option<String>,
    #[serde(rename = "alg")]
    pub algorithm: Option<String>,
    #[serde(rename = "n")]
    pub modulus: Option<String>,
    #[serde(rename = "e")]
    pub exponent: Option<String>,
}

/// Claims carried by a Google ID token.
#[derive(Debug, Clone, Deserialize)]
pub struct GoogleIdClaims {
    pub iss: String,
    pub aud: String,
    pub sub: String,
    pub email: Option<String>,
    #[serde(default)]
    pub email_verified: bool,
    pub exp: i64,
}

/// Cached public key with expiration
#[derive(Clone)]
struct CachedKey {
    key: DecodingKey,
    expires_at: DateTime<Utc>,
}

/// Verifier for Google-issued ID tokens.
pub struct GoogleTokenVerifier {
    jwks_url: String,
    client_id: String,
    cache: Arc<RwLock<HashMap<String, CachedKey>>>,
    cache_ttl_seconds: i64,
}

impl GoogleTokenVerifier {
    /// Create a verifier for the given OAuth client id, using Google's
    /// published JWKS endpoint. Keys are cached for an hour by default.
    pub fn new(client_id: String, cache_ttl_seconds: Option<i64>) -> Self {
        Self::with_jwks_url(GOOGLE_JWKS_URL.to_string(), client_id, cache_ttl_seconds)
    }

    /// Same as [`GoogleTokenVerifier::new`] with an overridable JWKS URL (tests).
    pub fn with_jwks_url(
        jwks_url: String,
        client_id: String,
        cache_ttl_seconds: Option<i64>,
    ) -> Self {
        Self {
            jwks_url,
            client_id,
            cache: Arc::new(RwLock::new(HashMap::new())),
            cache_ttl_seconds: cache_ttl_seconds.unwrap_or(3600),
        }
    }

    /// Fetch JWKS from the configured URL
    async fn fetch_jwks(&self) -> Result<Jwks, AppError> {
        let response = reqwest::get(&self.jwks_url)
            .await
            .map_err(|e| AppError::Unauthorized(format!("Failed to fetch JWKS: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::Unauthorized(format!(
                "JWKS endpoint returned error: {}",
                response.status()
            )));
        }

        let jwks: Jwks = response
            .json()
            .await
            .map_err(|e| AppError::Unauthorized(format!("Failed to parse JWKS: {}", e)))?;

        Ok(jwks)
    }

    /// Convert JWK to DecodingKey
    fn jwk_to_decoding_key(jwk: &Jwk) -> Result<DecodingKey, AppError> {
        if jwk.key_type != "RSA" {
            return Err(AppError::Unauthorized(format!(
                "Unsupported key type: {}",
                jwk.key_type
            )));
        }

        let n = jwk
            .modulus
            .as_ref()
            .ok_or_else(|| AppError::Unauthorized("RSA key missing modulus".to_string()))?;
        let e = jwk
            .exponent
            .as_ref()
            .ok_or_else(|| AppError::Unauthorized("RSA key missing exponent".to_string()))?;

        DecodingKey::from_rsa_components(n, e)
            .map_err(|e| AppError::Unauthorized(format!("Failed to create RSA key: {}", e)))
    }

    /// Get decoding key for a given key ID, with caching
    async fn get_decoding_key(&self, kid: Option<&str>) -> Result<DecodingKey, AppError> {
        let cache_key = kid.unwrap_or("default").to_string();

        // Check cache first
        {
            let cache = self.cache.read().await;
            if let Some(cached) = cache.get(&cache_key) {
                if cached.expires_at > Utc::now() {
                    return Ok(cached.key.clone());
                }
            }
        }

        // Cache miss or expired - fetch fresh JWKS
        let jwks = self.fetch_jwks().await?;

        let jwk = if let Some(kid) = kid {
            jwks.keys
                .iter()
                .find(|k| k.key_id.as_deref() == Some(kid))
                .ok_or_else(|| {
                    AppError::Unauthorized(format!("Key ID {} not found in JWKS", kid))
                })?
        } else {
            jwks.keys
                .first()
                .ok_or_else(|| AppError::Unauthorized("No keys found in JWKS".to_string()))?
        };

        let decoding_key = Self::jwk_to_decoding_key(jwk)?;

        {
            let mut cache = self.cache.write().await;
            cache.insert(
                cache_key,
                CachedKey {
                    key: decoding_key.clone(),
                    expires_at: Utc::now() + chrono::Duration::seconds(self.cache_ttl_seconds),
                },
            );
        }

        Ok(decoding_key)
    }

    /// Validate a Google ID token and extract the verified identity.
    ///
    /// Fails when the signature, audience, or expiry is invalid, when the
    /// issuer is not Google, or when the account's email is not verified.
    pub async fn verify(&self, token: &str) -> Result<VerifiedUserInfo, AppError> {
        let header = jsonwebtoken::decode_header(token).map_err(|e| {
            tracing::debug!("ID token header rejected: {}", e);
            AppError::InvalidOAuthToken("invalid google oauth token".to_string())
        })?;

        let decoding_key = self.get_decoding_key(header.kid.as_deref()).await?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&[self.client_id.as_str()]);
        validation.validate_exp = true;

        let token_data =
            decode::<GoogleIdClaims>(token, &decoding_key, &validation).map_err(|e| {
                tracing::debug!("ID token validation failed: {}", e);
                AppError::InvalidOAuthToken("invalid google oauth token".to_string())
            })?;

        let claims = token_data.claims;

        if !issuer_allowed(&claims.iss) {
            return Err(AppError::InvalidOAuthToken("wrong issuer".to_string()));
        }

        let email = claims.email.ok_or_else(|| {
            AppError::InvalidOAuthToken("token carries no email claim".to_string())
        })?;

        if !claims.email_verified {
            return Err(AppError::InvalidOAuthToken(
                "email account is not verified".to_string(),
            ));
        }

        Ok(VerifiedUserInfo {
            email,
            email_verified: true,
        })
    }
}

fn issuer_allowed(iss: &str) -> bool {
    GOOGLE_ALLOWED_ISSUERS.contains(&iss)
}
