//! Authentication utilities and the in-memory auth provider

mod memory_provider;
mod password;
mod session_token;

pub use memory_provider::MemoryAuthProvider;
pub use password::{hash_password, validate_password_strength, verify_password, PasswordService};
pub use session_token::{SessionClaims, SessionTokenService};
