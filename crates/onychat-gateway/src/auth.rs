//! Bearer token verification.
//!
//! Tokens are `<identity>.<expires_unix>.<hex hmac-sha256>` where the MAC
//! covers `<identity>.<expires_unix>`. Identities may contain dots; the
//! token is split from the right.

use async_trait::async_trait;
use axum::http::HeaderMap;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::time::Duration;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("missing credential")]
    Missing,

    #[error("malformed token")]
    Malformed,

    #[error("signature mismatch")]
    BadSignature,

    #[error("token expired")]
    Expired,

    #[error("invalid signing key")]
    InvalidKey,
}

impl From<AuthError> for onychat_core::OnychatError {
    fn from(e: AuthError) -> Self {
        onychat_core::OnychatError::AuthFailed(e.to_string())
    }
}

/// Turns a bearer credential into the identity it was issued for.
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<String, AuthError>;
}

/// Verifies tokens signed with a shared HMAC secret.
pub struct HmacTokenVerifier {
    secret: Vec<u8>,
}

impl HmacTokenVerifier {
    pub fn new(secret: &str) -> Self {
        Self {
            secret: secret.as_bytes().to_vec(),
        }
    }

    /// Mint a token for `identity` valid for `ttl` from now.
    pub fn issue(&self, identity: &str, ttl: Duration) -> Result<String, AuthError> {
        let expires = i64::try_from(ttl.as_secs())
            .ok()
            .and_then(|secs| chrono::Utc::now().timestamp().checked_add(secs))
            .ok_or(AuthError::Malformed)?;
        self.issue_until(identity, expires)
    }

    fn issue_until(&self, identity: &str, expires: i64) -> Result<String, AuthError> {
        if identity.is_empty() {
            return Err(AuthError::Malformed);
        }
        let mac = self.mac(identity, expires)?;
        let sig = hex::encode(mac.finalize().into_bytes());
        Ok(format!("{identity}.{expires}.{sig}"))
    }

    fn mac(&self, identity: &str, expires: i64) -> Result<HmacSha256, AuthError> {
        let mut mac = HmacSha256::new_from_slice(&self.secret).map_err(|_| AuthError::InvalidKey)?;
        mac.update(identity.as_bytes());
        mac.update(b".");
        mac.update(expires.to_string().as_bytes());
        Ok(mac)
    }
}

#[async_trait]
impl TokenVerifier for HmacTokenVerifier {
    async fn verify(&self, token: &str) -> Result<String, AuthError> {
        if token.is_empty() {
            return Err(AuthError::Missing);
        }
        let mut parts = token.rsplitn(3, '.');
        let (Some(sig_hex), Some(expires), Some(identity)) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(AuthError::Malformed);
        };
        if identity.is_empty() {
            return Err(AuthError::Malformed);
        }
        let expires: i64 = expires.parse().map_err(|_| AuthError::Malformed)?;
        let sig = hex::decode(sig_hex).map_err(|_| AuthError::Malformed)?;

        // constant-time comparison
        self.mac(identity, expires)?
            .verify_slice(&sig)
            .map_err(|_| AuthError::BadSignature)?;

        if expires <= chrono::Utc::now().timestamp() {
            return Err(AuthError::Expired);
        }
        Ok(identity.to_string())
    }
}

/// `Authorization: Bearer <token>` → `<token>`.
pub fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}
