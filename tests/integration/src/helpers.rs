//! Test helpers for integration tests
//!
//! Builds a shared in-memory store and signs users in against it, each with
//! a session gate and service context of their own.

use std::sync::Arc;

use anyhow::Result;
use cricket_common::{AppConfig, MemoryAuthProvider};
use cricket_core::{AuthProvider, Decision, DecisionKind, DocumentId, DocumentStore, Identity};
use cricket_db::InMemoryDocumentStore;
use cricket_service::dto::SignInRequest;
use cricket_service::{
    DecisionRepository, EventService, PollService, ServiceContext, SessionGate,
};

use crate::fixtures::{unique_email, TEST_PASSWORD};

/// Shared store plus configuration for one test
pub struct TestApp {
    pub store: Arc<InMemoryDocumentStore>,
    pub config: AppConfig,
}

impl TestApp {
    /// Sequential writes, no batch support
    pub fn new() -> Self {
        Self::with_store(InMemoryDocumentStore::new(), AppConfig::development())
    }

    /// Store and configuration both set up for atomic batches
    pub fn with_atomic_batches() -> Self {
        let mut config = AppConfig::development();
        config.choice.atomic_batches = true;
        Self::with_store(InMemoryDocumentStore::new().with_atomic_batches(), config)
    }

    pub fn with_store(store: InMemoryDocumentStore, mut config: AppConfig) -> Self {
        config.session.secret = "integration-test-secret-that-is-long-enough".to_string();
        config.session.issuer = "night-cricket-tests".to_string();
        Self {
            store: Arc::new(store),
            config,
        }
    }

    /// Register a fresh account and sign it in
    pub async fn sign_in(&self, name: &str) -> Result<TestUser> {
        let user = self.anonymous()?;
        let email = unique_email(name);
        user.auth.register(&email, TEST_PASSWORD)?;

        let identity = user
            .ctx
            .session()
            .sign_in(SignInRequest {
                email,
                password: TEST_PASSWORD.to_string(),
            })
            .await?;

        Ok(TestUser {
            identity: Some(identity),
            ..user
        })
    }

    /// A user with an initialized but anonymous session
    pub fn anonymous(&self) -> Result<TestUser> {
        let auth = Arc::new(MemoryAuthProvider::from_config(&self.config.session));
        let store: Arc<dyn DocumentStore> = self.store.clone();
        let provider: Arc<dyn AuthProvider> = auth.clone();
        let ctx = ServiceContext::builder()
            .store(store)
            .session(SessionGate::new_shared(provider))
            .config(self.config.clone())
            .build()?;

        Ok(TestUser {
            auth,
            ctx,
            identity: None,
        })
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

/// One user's view of the app
pub struct TestUser {
    pub auth: Arc<MemoryAuthProvider>,
    pub ctx: ServiceContext,
    identity: Option<Identity>,
}

impl TestUser {
    /// Identity of a signed-in user
    ///
    /// # Panics
    /// Panics for an anonymous user
    pub fn identity(&self) -> &Identity {
        self.identity
            .as_ref()
            .expect("test user is not signed in")
    }

    pub fn events(&self) -> EventService<'_> {
        EventService::new(&self.ctx)
    }

    pub fn polls(&self) -> PollService<'_> {
        PollService::new(&self.ctx)
    }

    pub fn repository(&self) -> DecisionRepository<'_> {
        DecisionRepository::new(&self.ctx)
    }

    /// Create a poll and load it back
    pub async fn create_poll(&self, options: &str) -> Result<Decision> {
        let id = self
            .polls()
            .create(crate::fixtures::poll_request_with(options))
            .await?;
        Ok(self.polls().get(&id).await?)
    }

    /// Create an event and load it back
    pub async fn create_event(&self) -> Result<Decision> {
        let id = self.events().create(crate::fixtures::event_request()).await?;
        Ok(self.events().get(&id).await?)
    }

    /// Store's current view of a decision
    pub async fn reload(&self, kind: DecisionKind, id: &DocumentId) -> Result<Decision> {
        Ok(self.repository().get(kind, id).await?)
    }
}
