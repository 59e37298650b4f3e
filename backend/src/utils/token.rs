//! Minimal HS256 bearer tokens binding a user to one session.
//!
//! Fixed secret, fixed algorithm. The token is three dot-joined base64
//! segments (header, claims, HMAC-SHA256 signature); no key rotation and no
//! algorithm negotiation.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use rand::RngCore;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Owning user id.
    pub sub: String,
    /// Session id the token is bound to.
    pub sid: String,
    /// Expiration time (unix seconds).
    pub exp: i64,
    /// Issued at (unix seconds).
    pub iat: i64,
}

impl Claims {
    pub fn new(user_id: String, session_id: String, lifetime_seconds: u64) -> Self {
        let now = Utc::now();
        let exp = now + Duration::seconds(lifetime_seconds as i64);
        Self {
            sub: user_id,
            sid: session_id,
            exp: exp.timestamp(),
            iat: now.timestamp(),
        }
    }
}

/// Generates a cryptographically random 256-bit session identifier,
/// hex-encoded.
pub fn generate_session_id() -> String {
    let mut bytes = [0u8; 32];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

pub fn create_session_token(
    user_id: String,
    session_id: String,
    secret: &str,
    lifetime_seconds: u64,
) -> anyhow::Result<String> {
    let claims = Claims::new(user_id, session_id, lifetime_seconds);
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_ref()),
    )?;

    Ok(token)
}

/// Verifies signature and embedded expiry. Callers must not surface which of
/// the two failed.
pub fn verify_session_token(token: &str, secret: &str) -> anyhow::Result<Claims> {
    let validation = Validation::default();
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_ref()),
        &validation,
    )?;

    Ok(token_data.claims)
}
