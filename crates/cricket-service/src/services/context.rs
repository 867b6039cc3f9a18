//! Service context - dependency container for services
//!
//! Holds the document store, the session gate, and the loaded configuration.

use std::sync::Arc;

use cricket_common::{
    try_init_tracing_with_config, AppConfig, AppError, MemoryAuthProvider, TracingConfig,
};
use cricket_core::{AuthProvider, DecisionKind, DocumentStore};
use tracing::{debug, info};

use super::error::{ServiceError, ServiceResult};
use super::session::SessionGate;

/// Service context containing all dependencies
///
/// Cloning is cheap; the store and the session gate are shared.
#[derive(Clone)]
pub struct ServiceContext {
    store: Arc<dyn DocumentStore>,
    session: Arc<SessionGate>,
    config: AppConfig,
}

impl ServiceContext {
    /// Create a new service context
    pub fn new(store: Arc<dyn DocumentStore>, session: Arc<SessionGate>, config: AppConfig) -> Self {
        Self {
            store,
            session,
            config,
        }
    }

    /// Context over `store` with an in-memory auth provider configured from
    /// `config.session`
    pub fn from_config(store: Arc<dyn DocumentStore>, config: AppConfig) -> Self {
        let provider: Arc<dyn AuthProvider> =
            Arc::new(MemoryAuthProvider::from_config(&config.session));
        Self::new(store, SessionGate::new_shared(provider), config)
    }

    /// Load configuration from the environment, install the tracing
    /// subscriber for that environment, and build the context over `store`
    ///
    /// # Errors
    /// Returns `ServiceError::App` with a config error if the environment is
    /// malformed
    pub fn from_env(store: Arc<dyn DocumentStore>) -> ServiceResult<Self> {
        let config = AppConfig::from_env().map_err(|e| AppError::Config(e.to_string()))?;

        if try_init_tracing_with_config(&TracingConfig::for_environment(config.app.env)).is_err() {
            debug!("Tracing subscriber already installed");
        }
        info!(app = %config.app.name, env = ?config.app.env, "Service context configured");

        Ok(Self::from_config(store, config))
    }

    /// Start building a context
    pub fn builder() -> ServiceContextBuilder {
        ServiceContextBuilder::new()
    }

    /// Get the document store
    pub fn store(&self) -> &dyn DocumentStore {
        self.store.as_ref()
    }

    /// Get the session gate
    pub fn session(&self) -> &SessionGate {
        self.session.as_ref()
    }

    /// Shared handle to the session gate
    pub fn session_handle(&self) -> Arc<SessionGate> {
        Arc::clone(&self.session)
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Collection holding decisions of `kind`
    pub fn collection(&self, kind: DecisionKind) -> &str {
        self.config.store.collection(kind)
    }

    /// Whether choice updates should be committed as one batch
    pub fn use_atomic_batches(&self) -> bool {
        self.config.choice.atomic_batches && self.store.capabilities().atomic_batches
    }
}

impl std::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContext")
            .field("store", &"dyn DocumentStore")
            .field("session", &self.session.state())
            .field("config", &self.config.app.name)
            .finish()
    }
}

/// Builder for creating ServiceContext with custom configuration
#[derive(Default)]
pub struct ServiceContextBuilder {
    store: Option<Arc<dyn DocumentStore>>,
    session: Option<Arc<SessionGate>>,
    config: Option<AppConfig>,
}

impl ServiceContextBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn store(mut self, store: Arc<dyn DocumentStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn session(mut self, session: Arc<SessionGate>) -> Self {
        self.session = Some(session);
        self
    }

    pub fn config(mut self, config: AppConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Build the ServiceContext
    ///
    /// Configuration falls back to development defaults.
    ///
    /// # Errors
    /// Returns `ServiceError::Validation` if the store or session gate is missing
    pub fn build(self) -> ServiceResult<ServiceContext> {
        Ok(ServiceContext::new(
            self.store
                .ok_or_else(|| ServiceError::validation("store is required"))?,
            self.session
                .ok_or_else(|| ServiceError::validation("session is required"))?,
            self.config.unwrap_or_else(AppConfig::development),
        ))
    }
}
