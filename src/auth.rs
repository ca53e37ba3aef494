use crate::config::SessionConfig;
use crate::error::{AppError, AppResult};
use crate::models::PlayerId;
use hmac::{Hmac, Mac};
use serde::Serialize;
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Tokens issued this far in the future are still accepted
const MAX_CLOCK_SKEW_SECS: i64 = 300;

/// The player making a request, taken from a verified session token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Viewer {
    pub player_id: PlayerId,
}

/// Signs and verifies session tokens
#[derive(Clone)]
pub struct SessionKeys {
    secret: Vec<u8>,
    ttl_secs: i64,
}

impl std::fmt::Debug for SessionKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionKeys")
            .field("ttl_secs", &self.ttl_secs)
            .finish_non_exhaustive()
    }
}

/// Create the message a session token signs
///
/// # Arguments
/// * `player_id` - The player the token is issued to
/// * `issued_at` - Unix timestamp of issue
pub fn create_auth_message(player_id: PlayerId, issued_at: i64) -> String {
    format!("forefinder:{}:{}", player_id, issued_at)
}

impl SessionKeys {
    pub fn new(secret: impl Into<Vec<u8>>, ttl_secs: i64) -> Self {
        Self {
            secret: secret.into(),
            ttl_secs,
        }
    }

    pub fn from_config(config: &SessionConfig) -> Self {
        Self::new(config.secret.as_bytes(), config.ttl_secs)
    }

    fn mac(&self, player_id: PlayerId, issued_at: i64) -> HmacSha256 {
        // HMAC accepts keys of any length
        let mut mac = HmacSha256::new_from_slice(&self.secret)
            .unwrap_or_else(|_| unreachable!("HMAC key length is unrestricted"));
        mac.update(create_auth_message(player_id, issued_at).as_bytes());
        mac
    }

    /// Issue a token for `player_id` valid from now
    pub fn issue(&self, player_id: PlayerId) -> String {
        self.issue_at(player_id, chrono::Utc::now().timestamp())
    }

    /// Issue a token with an explicit issue time
    pub fn issue_at(&self, player_id: PlayerId, issued_at: i64) -> String {
        let signature = self.mac(player_id, issued_at).finalize().into_bytes();
        format!("{}.{}.{}", player_id, issued_at, hex::encode(signature))
    }

    /// Verify a token against the current time
    pub fn verify(&self, token: &str) -> AppResult<Viewer> {
        self.verify_at(token, chrono::Utc::now().timestamp())
    }

    /// Verify a token's signature and age
    ///
    /// Checks that:
    /// 1. The token has the `player.issued_at.signature` shape
    /// 2. The signature matches (constant-time comparison)
    /// 3. It was issued within the TTL and not beyond the allowed clock skew
    pub fn verify_at(&self, token: &str, now: i64) -> AppResult<Viewer> {
        let malformed = || AppError::Unauthorized("Malformed session token".to_string());

        let mut parts = token.trim().splitn(3, '.');
        let player_id: PlayerId = parts
            .next()
            .and_then(|p| p.parse().ok())
            .ok_or_else(malformed)?;
        let issued_at: i64 = parts
            .next()
            .and_then(|p| p.parse().ok())
            .ok_or_else(malformed)?;
        let signature = parts
            .next()
            .and_then(|p| hex::decode(p).ok())
            .ok_or_else(malformed)?;

        self.mac(player_id, issued_at)
            .verify_slice(&signature)
            .map_err(|_| AppError::Unauthorized("Invalid session token".to_string()))?;

        if issued_at - now > MAX_CLOCK_SKEW_SECS {
            return Err(AppError::Unauthorized("Session token issued in the future".to_string()));
        }
        if now - issued_at > self.ttl_secs {
            return Err(AppError::Unauthorized("Session token expired".to_string()));
        }

        Ok(Viewer { player_id })
    }
}

/// Pull the token out of an `Authorization: Bearer ...` header value
pub fn extract_bearer_token(header: &str) -> AppResult<&str> {
    let token = header
        .strip_prefix("Bearer ")
        .or_else(|| header.strip_prefix("bearer "))
        .map(str::trim)
        .unwrap_or("");

    if token.is_empty() {
        return Err(AppError::Unauthorized("Missing bearer token".to_string()));
    }
    Ok(token)
}
