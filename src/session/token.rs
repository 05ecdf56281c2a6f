use axum::extract::FromRef;
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};
use tracing::debug;
use uuid::Uuid;

use crate::state::AppState;

/// Identity carried inside the session token. No secret material.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionClaims {
    pub user: SessionUser,
    pub iat: usize,
    pub exp: usize,
}

/// Why a token failed verification. Collapsed to a single outcome before
/// anything reaches the client; kept tagged here so logs can tell tampering
/// from routine expiry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenRejection {
    Expired,
    Tampered,
    Malformed,
}

/// HS256 signing and verification keys, built once from the configured
/// session secret.
#[derive(Clone)]
pub struct SessionKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl FromRef<AppState> for SessionKeys {
    fn from_ref(state: &AppState) -> Self {
        let session = &state.config.session;
        Self {
            encoding: EncodingKey::from_secret(session.secret.as_bytes()),
            decoding: DecodingKey::from_secret(session.secret.as_bytes()),
            ttl: Duration::days(session.ttl_days),
        }
    }
}

impl SessionKeys {
    pub fn sign(&self, user: SessionUser) -> anyhow::Result<(String, OffsetDateTime)> {
        let now = OffsetDateTime::now_utc();
        let expires_at = now + self.ttl;
        let claims = SessionClaims {
            user,
            iat: now.unix_timestamp() as usize,
            exp: expires_at.unix_timestamp() as usize,
        };
        let token = encode(&Header::default(), &claims, &self.encoding)?;
        debug!(user_id = %claims.user.id, "session token signed");
        Ok((token, expires_at))
    }

    pub fn verify(&self, token: &str) -> Result<SessionClaims, TokenRejection> {
        let mut validation = Validation::default();
        validation.leeway = 0;
        let data =
            decode::<SessionClaims>(token, &self.decoding, &validation).map_err(|e| {
                match e.kind() {
                    ErrorKind::ExpiredSignature => TokenRejection::Expired,
                    ErrorKind::InvalidSignature => TokenRejection::Tampered,
                    _ => TokenRejection::Malformed,
                }
            })?;
        // exactly-at-expiry counts as expired
        if OffsetDateTime::now_utc().unix_timestamp() as usize >= data.claims.exp {
            return Err(TokenRejection::Expired);
        }
        Ok(data.claims)
    }
}
