//! Auth provider port
//!
//! Wraps an external credential/session service. The session gate is the
//! only intended caller.

use async_trait::async_trait;

use crate::entities::Identity;

use super::store::RepoResult;

#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Identity of the persisted session, or `None` if there is no valid one
    async fn restore_session(&self) -> RepoResult<Option<Identity>>;

    /// Sign in with email and password
    async fn sign_in(&self, email: &str, password: &str) -> RepoResult<Identity>;

    /// End the current session
    async fn sign_out(&self) -> RepoResult<()>;
}
