//! Session gate
//!
//! Single owner of "who is signed in". Every state change goes through
//! [`SessionGate::transition`], which publishes the new state on a watch
//! channel and calls the registered observers.
//!
//! ```text
//! Unknown --check--> Anonymous | Authenticated
//! Unknown | Anonymous --sign_in--> Authenticated
//! Authenticated --sign_out / invalidated--> Anonymous
//! ```

use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use tokio::sync::{watch, Mutex};
use tracing::{debug, info, instrument, warn};
use validator::Validate;

use cricket_core::{AuthProvider, DomainError, Identity};

use super::error::{ServiceError, ServiceResult};
use crate::dto::SignInRequest;

/// Where the session currently stands
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    /// No session check has completed yet
    #[default]
    Unknown,
    Anonymous,
    Authenticated(Identity),
}

impl SessionState {
    pub fn identity(&self) -> Option<&Identity> {
        match self {
            Self::Authenticated(identity) => Some(identity),
            _ => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }
}

type Observer = Arc<dyn Fn(Option<&Identity>) + Send + Sync>;
type ObserverRegistry = DashMap<u64, Observer>;

/// Handle for an identity-change observer
///
/// The observer is removed on [`Subscription::unsubscribe`] or when the
/// handle is dropped.
#[must_use = "dropping a Subscription unsubscribes the observer"]
pub struct Subscription {
    id: u64,
    registry: Weak<ObserverRegistry>,
}

impl Subscription {
    /// Remove the observer now
    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.remove(&self.id);
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

/// Current identity, sign-in/sign-out, and change notification
pub struct SessionGate {
    provider: Arc<dyn AuthProvider>,
    state: watch::Sender<SessionState>,
    observers: Arc<ObserverRegistry>,
    next_observer: AtomicU64,
    /// Serializes transitions that wait on the provider
    transition_lock: Mutex<()>,
}

impl SessionGate {
    pub fn new(provider: Arc<dyn AuthProvider>) -> Self {
        let (state, _) = watch::channel(SessionState::Unknown);
        Self {
            provider,
            state,
            observers: Arc::new(DashMap::new()),
            next_observer: AtomicU64::new(0),
            transition_lock: Mutex::new(()),
        }
    }

    /// Create a new gate wrapped in Arc
    pub fn new_shared(provider: Arc<dyn AuthProvider>) -> Arc<Self> {
        Arc::new(Self::new(provider))
    }

    /// Snapshot of the current state
    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    pub fn current_identity(&self) -> Option<Identity> {
        self.state.borrow().identity().cloned()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_authenticated()
    }

    /// The signed-in identity, or `NotAuthenticated`
    pub fn require_identity(&self) -> ServiceResult<Identity> {
        self.current_identity()
            .ok_or(ServiceError::Domain(DomainError::NotAuthenticated))
    }

    /// Resolve the initial state from any persisted session
    pub async fn initialize(&self) -> ServiceResult<SessionState> {
        self.check_session().await
    }

    /// Re-validate the session with the provider
    ///
    /// A session that has vanished or expired moves the gate to `Anonymous`.
    #[instrument(skip(self))]
    pub async fn check_session(&self) -> ServiceResult<SessionState> {
        let _guard = self.transition_lock.lock().await;

        let restored = self.provider.restore_session().await.map_err(|e| {
            warn!(error = %e, "Session check failed");
            ServiceError::from(e)
        })?;

        let next = match restored {
            Some(identity) => SessionState::Authenticated(identity),
            None => {
                if self.is_authenticated() {
                    info!("Session ended outside the app");
                }
                SessionState::Anonymous
            }
        };
        self.transition(next.clone());
        Ok(next)
    }

    /// Sign in with email and password
    #[instrument(skip(self, credentials), fields(email = %credentials.email))]
    pub async fn sign_in(&self, credentials: SignInRequest) -> ServiceResult<Identity> {
        credentials.validate()?;

        let _guard = self.transition_lock.lock().await;
        if self.is_authenticated() {
            return Err(ServiceError::Domain(DomainError::AlreadyAuthenticated));
        }

        let identity = self
            .provider
            .sign_in(credentials.email.trim(), &credentials.password)
            .await
            .map_err(|e| {
                warn!(error = %e, "Sign-in failed");
                ServiceError::from(e)
            })?;

        self.transition(SessionState::Authenticated(identity.clone()));
        info!(identity_id = %identity.id, "Signed in");
        Ok(identity)
    }

    /// End the session
    ///
    /// Only an authenticated gate can sign out; anything else is
    /// `NotAuthenticated` and leaves the state alone.
    #[instrument(skip(self))]
    pub async fn sign_out(&self) -> ServiceResult<()> {
        let _guard = self.transition_lock.lock().await;
        let identity = self.require_identity()?;

        self.provider.sign_out().await?;
        info!(identity_id = %identity.id, "Signed out");
        self.transition(SessionState::Anonymous);
        Ok(())
    }

    /// Call `observer` on every identity change until the handle is dropped
    pub fn on_identity_change<F>(&self, observer: F) -> Subscription
    where
        F: Fn(Option<&Identity>) + Send + Sync + 'static,
    {
        let id = self.next_observer.fetch_add(1, Ordering::Relaxed);
        self.observers.insert(id, Arc::new(observer));
        debug!(observer_id = id, "Identity observer registered");

        Subscription {
            id,
            registry: Arc::downgrade(&self.observers),
        }
    }

    /// Receiver that sees every published state
    pub fn watch(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// Number of registered observers
    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    fn transition(&self, next: SessionState) {
        let previous = self.state.send_replace(next.clone());
        if previous == next {
            return;
        }

        debug!(from = ?previous, to = ?next, "Session state changed");

        // Snapshot first so observers may unsubscribe from inside the callback
        let observers: Vec<Observer> = self
            .observers
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect();
        for observer in observers {
            observer(next.identity());
        }
    }
}

impl std::fmt::Debug for SessionGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionGate")
            .field("state", &self.state())
            .field("observers", &self.observer_count())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cricket_common::{MemoryAuthProvider, SessionTokenService};
    use std::sync::Mutex as StdMutex;

    const SECRET: &str = "test-secret-key-that-is-long-enough";

    fn provider() -> Arc<MemoryAuthProvider> {
        let provider =
            MemoryAuthProvider::new_shared(SessionTokenService::new(SECRET, "night-cricket", 900));
        provider.register("keeper@example.com", "gloves-on").unwrap();
        provider
    }

    fn credentials(password: &str) -> SignInRequest {
        SignInRequest {
            email: "keeper@example.com".to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn test_initial_check_resolves_unknown() {
        let gate = SessionGate::new(provider());
        assert_eq!(gate.state(), SessionState::Unknown);

        let state = gate.initialize().await.unwrap();
        assert_eq!(state, SessionState::Anonymous);
        assert!(gate.require_identity().unwrap_err().is_auth());
    }

    #[tokio::test]
    async fn test_sign_in_and_out() {
        let gate = SessionGate::new(provider());
        gate.initialize().await.unwrap();

        let identity = gate.sign_in(credentials("gloves-on")).await.unwrap();
        assert_eq!(gate.current_identity(), Some(identity.clone()));
        assert_eq!(gate.require_identity().unwrap(), identity);

        gate.sign_out().await.unwrap();
        assert_eq!(gate.state(), SessionState::Anonymous);
    }

    #[tokio::test]
    async fn test_sign_out_needs_a_session() {
        let gate = SessionGate::new(provider());
        let err = gate.sign_out().await.unwrap_err();
        assert_eq!(err.error_code(), "NOT_AUTHENTICATED");
        assert_eq!(gate.state(), SessionState::Unknown);

        gate.initialize().await.unwrap();
        assert!(gate.sign_out().await.unwrap_err().is_auth());
        assert_eq!(gate.state(), SessionState::Anonymous);
    }

    #[tokio::test]
    async fn test_sign_in_from_unknown() {
        let gate = SessionGate::new(provider());
        gate.sign_in(credentials("gloves-on")).await.unwrap();
        assert!(gate.is_authenticated());
    }

    #[tokio::test]
    async fn test_second_sign_in_is_rejected() {
        let gate = SessionGate::new(provider());
        gate.sign_in(credentials("gloves-on")).await.unwrap();

        let err = gate.sign_in(credentials("gloves-on")).await.unwrap_err();
        assert_eq!(err.error_code(), "ALREADY_AUTHENTICATED");
    }

    #[tokio::test]
    async fn test_bad_credentials_leave_state_alone() {
        let gate = SessionGate::new(provider());
        gate.initialize().await.unwrap();

        let err = gate.sign_in(credentials("butterfingers")).await.unwrap_err();
        assert!(err.is_auth());
        assert_eq!(err.error_code(), "INVALID_CREDENTIALS");
        assert_eq!(gate.state(), SessionState::Anonymous);
    }

    #[tokio::test]
    async fn test_malformed_credentials() {
        let gate = SessionGate::new(provider());
        let err = gate
            .sign_in(SignInRequest {
                email: "not an email".to_string(),
                password: String::new(),
            })
            .await
            .unwrap_err();
        assert!(err.is_validation());
    }

    #[tokio::test]
    async fn test_external_invalidation() {
        let auth = provider();
        let gate = SessionGate::new(auth.clone());
        gate.sign_in(credentials("gloves-on")).await.unwrap();

        auth.invalidate_session();
        let state = gate.check_session().await.unwrap();
        assert_eq!(state, SessionState::Anonymous);
    }

    #[tokio::test]
    async fn test_observers_fire_on_change_only() {
        let gate = SessionGate::new(provider());
        let seen: Arc<StdMutex<Vec<Option<String>>>> = Arc::default();

        let sink = Arc::clone(&seen);
        let subscription = gate.on_identity_change(move |identity| {
            sink.lock()
                .unwrap()
                .push(identity.map(|i| i.email.clone()));
        });

        gate.initialize().await.unwrap();
        gate.check_session().await.unwrap();
        gate.sign_in(credentials("gloves-on")).await.unwrap();
        gate.check_session().await.unwrap();
        gate.sign_out().await.unwrap();

        assert_eq!(
            *seen.lock().unwrap(),
            vec![None, Some("keeper@example.com".to_string()), None]
        );

        subscription.unsubscribe();
        assert_eq!(gate.observer_count(), 0);
        gate.sign_in(credentials("gloves-on")).await.unwrap();
        assert_eq!(seen.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_dropping_subscription_unsubscribes() {
        let gate = SessionGate::new(provider());
        {
            let _subscription = gate.on_identity_change(|_| {});
            assert_eq!(gate.observer_count(), 1);
        }
        assert_eq!(gate.observer_count(), 0);
    }

    #[tokio::test]
    async fn test_watch_receiver() {
        let gate = SessionGate::new(provider());
        let mut rx = gate.watch();

        gate.sign_in(credentials("gloves-on")).await.unwrap();
        rx.changed().await.unwrap();
        assert!(rx.borrow().is_authenticated());
    }
}
