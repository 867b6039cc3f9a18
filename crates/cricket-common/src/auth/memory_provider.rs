//! In-memory auth provider
//!
//! Accounts live in a `DashMap` keyed by normalised email. At most one
//! session is current at a time, held as a signed token and re-validated
//! on every restore.

use async_trait::async_trait;
use cricket_core::{AuthProvider, Identity, IdentityId, RepoResult};
use dashmap::DashMap;
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

use super::password::PasswordService;
use super::session_token::SessionTokenService;
use crate::config::SessionConfig;
use crate::error::{AppError, AppResult};

#[derive(Debug, Clone)]
struct Account {
    identity: Identity,
    password_hash: String,
}

/// Auth provider backed by process memory
pub struct MemoryAuthProvider {
    accounts: DashMap<String, Account>,
    current_token: RwLock<Option<String>>,
    tokens: SessionTokenService,
    passwords: PasswordService,
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

impl MemoryAuthProvider {
    #[must_use]
    pub fn new(tokens: SessionTokenService) -> Self {
        Self {
            accounts: DashMap::new(),
            current_token: RwLock::new(None),
            tokens,
            passwords: PasswordService::new(),
        }
    }

    #[must_use]
    pub fn from_config(config: &SessionConfig) -> Self {
        Self::new(SessionTokenService::from_config(config))
    }

    /// Create a new provider wrapped in Arc
    #[must_use]
    pub fn new_shared(tokens: SessionTokenService) -> Arc<Self> {
        Arc::new(Self::new(tokens))
    }

    /// Register an account and return its identity
    ///
    /// # Errors
    /// `Validation` for a malformed email or weak password, `AlreadyExists`
    /// if the email is taken
    #[instrument(skip(self, password))]
    pub fn register(&self, email: &str, password: &str) -> AppResult<Identity> {
        let key = normalize_email(email);
        if key.is_empty() || !key.contains('@') {
            return Err(AppError::validation("a valid email is required"));
        }

        let password_hash = self.passwords.hash_new(password)?;

        match self.accounts.entry(key.clone()) {
            dashmap::mapref::entry::Entry::Occupied(_) => Err(AppError::AlreadyExists(key)),
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                let identity = Identity::new(
                    IdentityId::new(uuid::Uuid::new_v4().to_string()),
                    email.trim(),
                );
                slot.insert(Account {
                    identity: identity.clone(),
                    password_hash,
                });
                debug!(identity_id = %identity.id, "Account registered");
                Ok(identity)
            }
        }
    }

    /// Drop the current session as if it were revoked elsewhere
    pub fn invalidate_session(&self) {
        if self.current_token.write().take().is_some() {
            debug!("Session invalidated externally");
        }
    }

    /// Whether a session token is currently held
    pub fn has_session(&self) -> bool {
        self.current_token.read().is_some()
    }

    /// Number of registered accounts
    pub fn account_count(&self) -> usize {
        self.accounts.len()
    }

    fn authenticate(&self, email: &str, password: &str) -> AppResult<Identity> {
        let account = self
            .accounts
            .get(&normalize_email(email))
            .map(|entry| entry.value().clone())
            .ok_or(AppError::InvalidCredentials)?;

        self.passwords
            .verify_or_error(password, &account.password_hash)?;
        Ok(account.identity)
    }
}

impl std::fmt::Debug for MemoryAuthProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryAuthProvider")
            .field("accounts", &self.accounts.len())
            .field("has_session", &self.has_session())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl AuthProvider for MemoryAuthProvider {
    #[instrument(skip(self))]
    async fn restore_session(&self) -> RepoResult<Option<Identity>> {
        let Some(token) = self.current_token.read().clone() else {
            return Ok(None);
        };

        match self.tokens.validate(&token) {
            Ok(claims) => {
                let identity = claims.identity();
                let still_registered = self
                    .accounts
                    .get(&normalize_email(&identity.email))
                    .is_some_and(|account| account.identity.id == identity.id);

                if still_registered {
                    Ok(Some(identity))
                } else {
                    self.invalidate_session();
                    Ok(None)
                }
            }
            Err(AppError::TokenExpired | AppError::InvalidToken) => {
                debug!("Stored session token no longer valid");
                self.invalidate_session();
                Ok(None)
            }
            Err(e) => Err(e.into_domain()),
        }
    }

    #[instrument(skip(self, password))]
    async fn sign_in(&self, email: &str, password: &str) -> RepoResult<Identity> {
        let identity = self.authenticate(email, password).map_err(|e| {
            warn!(error = %e, "Sign-in rejected");
            e.into_domain()
        })?;

        let token = self.tokens.issue(&identity).map_err(AppError::into_domain)?;
        *self.current_token.write() = Some(token);

        debug!(identity_id = %identity.id, "Session issued");
        Ok(identity)
    }

    #[instrument(skip(self))]
    async fn sign_out(&self) -> RepoResult<()> {
        self.current_token.write().take();
        Ok(())
    }
}
