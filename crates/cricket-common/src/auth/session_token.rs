//! Signed session tokens
//!
//! A session is an HS256 JWT naming the identity it was issued to. The
//! local auth provider keeps the current token and re-validates it whenever
//! the session is restored.

use chrono::{Duration, Utc};
use cricket_core::{Identity, IdentityId};
use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config::SessionConfig;
use crate::error::{AppError, AppResult};

/// Claims carried by a session token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject (identity id)
    pub sub: String,
    pub email: String,
    pub iss: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Session id, unique per sign-in
    pub sid: String,
}

impl SessionClaims {
    /// Identity the token was issued to
    #[must_use]
    pub fn identity(&self) -> Identity {
        Identity::new(IdentityId::new(self.sub.clone()), self.email.clone())
    }

    #[must_use]
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }
}

/// Issues and validates session tokens
#[derive(Clone)]
pub struct SessionTokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
    ttl_secs: i64,
}

impl SessionTokenService {
    #[must_use]
    pub fn new(secret: &str, issuer: impl Into<String>, ttl_secs: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            issuer: issuer.into(),
            ttl_secs,
        }
    }

    #[must_use]
    pub fn from_config(config: &SessionConfig) -> Self {
        Self::new(&config.secret, config.issuer.clone(), config.ttl_secs)
    }

    /// Session lifetime in seconds
    #[must_use]
    pub fn ttl_secs(&self) -> i64 {
        self.ttl_secs
    }

    /// Issue a fresh token for an identity
    ///
    /// # Errors
    /// Returns an error if encoding fails
    pub fn issue(&self, identity: &Identity) -> AppResult<String> {
        let now = Utc::now();
        let claims = SessionClaims {
            sub: identity.id.to_string(),
            email: identity.email.clone(),
            iss: self.issuer.clone(),
            iat: now.timestamp(),
            exp: (now + Duration::seconds(self.ttl_secs)).timestamp(),
            sid: uuid::Uuid::new_v4().to_string(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AppError::internal(anyhow::anyhow!("failed to encode session token: {e}")))
    }

    /// Decode and validate a token
    ///
    /// # Errors
    /// `TokenExpired` once past `exp`, `InvalidToken` for anything else wrong
    pub fn validate(&self, token: &str) -> AppResult<SessionClaims> {
        let mut validation = Validation::default();
        validation.leeway = 0;
        validation.set_issuer(&[self.issuer.as_str()]);

        decode::<SessionClaims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AppError::TokenExpired,
                _ => AppError::InvalidToken,
            })
    }
}

impl std::fmt::Debug for SessionTokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionTokenService")
            .field("issuer", &self.issuer)
            .field("ttl_secs", &self.ttl_secs)
            .finish_non_exhaustive()
    }
}
