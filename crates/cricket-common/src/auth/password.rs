//! Password hashing for locally registered accounts
//!
//! Argon2id with a random salt per hash.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use crate::error::{AppError, AppResult};

/// Shortest password an account may register with
pub const MIN_PASSWORD_LEN: usize = 6;

/// Longest password accepted before hashing
pub const MAX_PASSWORD_LEN: usize = 128;

/// Hash a password using Argon2id
///
/// # Errors
/// Returns an error if hashing fails
pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::internal(anyhow::anyhow!("password hashing failed: {e}")))
}

/// Verify a password against a stored PHC hash
///
/// # Errors
/// Returns an error if the stored hash cannot be parsed
pub fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    let parsed = PasswordHash::new(hash)
        .map_err(|e| AppError::internal(anyhow::anyhow!("malformed password hash: {e}")))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

/// Check a password is acceptable for a new account
///
/// # Errors
/// Returns `AppError::Validation` describing the first rule broken
pub fn validate_password_strength(password: &str) -> AppResult<()> {
    let len = password.chars().count();
    if len < MIN_PASSWORD_LEN {
        return Err(AppError::validation(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    if len > MAX_PASSWORD_LEN {
        return Err(AppError::validation(format!(
            "password must be at most {MAX_PASSWORD_LEN} characters"
        )));
    }
    if password.trim().is_empty() {
        return Err(AppError::validation("password must not be blank"));
    }
    Ok(())
}

/// Password service for dependency injection
#[derive(Debug, Clone, Copy, Default)]
pub struct PasswordService;

impl PasswordService {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Validate then hash a password for a new account
    ///
    /// # Errors
    /// Returns a validation error for weak passwords, or an internal error
    /// if hashing fails
    pub fn hash_new(&self, password: &str) -> AppResult<String> {
        validate_password_strength(password)?;
        hash_password(password)
    }

    /// Verify a password and map a mismatch to `InvalidCredentials`
    ///
    /// # Errors
    /// Returns `AppError::InvalidCredentials` if the password doesn't match
    pub fn verify_or_error(&self, password: &str, hash: &str) -> AppResult<()> {
        if verify_password(password, hash)? {
            Ok(())
        } else {
            Err(AppError::InvalidCredentials)
        }
    }
}
