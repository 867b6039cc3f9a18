//! Application configuration structs
//!
//! Loads configuration from environment variables (and a `.env` file).

use cricket_core::DecisionKind;
use serde::Deserialize;
use std::env;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub app: AppSettings,
    pub store: StoreConfig,
    pub session: SessionConfig,
    pub choice: ChoiceConfig,
}

/// General application settings
#[derive(Debug, Clone, Deserialize)]
pub struct AppSettings {
    #[serde(default = "default_app_name")]
    pub name: String,
    #[serde(default)]
    pub env: Environment,
}

/// Environment type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    #[must_use]
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    #[must_use]
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }

    fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "production" => Some(Self::Production),
            "staging" => Some(Self::Staging),
            "development" => Some(Self::Development),
            _ => None,
        }
    }
}

/// Document store collection names
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_events_collection")]
    pub events_collection: String,
    #[serde(default = "default_polls_collection")]
    pub polls_collection: String,
}

impl StoreConfig {
    /// Collection holding decisions of the given kind
    #[must_use]
    pub fn collection(&self, kind: DecisionKind) -> &str {
        match kind {
            DecisionKind::Event => &self.events_collection,
            DecisionKind::Poll => &self.polls_collection,
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            events_collection: default_events_collection(),
            polls_collection: default_polls_collection(),
        }
    }
}

/// Session token configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    pub secret: String,
    #[serde(default = "default_session_ttl")]
    pub ttl_secs: i64,
    #[serde(default = "default_issuer")]
    pub issuer: String,
}

/// Choice engine behaviour
#[derive(Debug, Clone, Copy, Deserialize, Default)]
pub struct ChoiceConfig {
    /// Commit remove-then-add as one batch when the store supports it
    #[serde(default)]
    pub atomic_batches: bool,
}

// Default value functions
fn default_app_name() -> String {
    "night-cricket".to_string()
}

fn default_events_collection() -> String {
    DecisionKind::Event.default_collection().to_string()
}

fn default_polls_collection() -> String {
    DecisionKind::Poll.default_collection().to_string()
}

fn default_session_ttl() -> i64 {
    3600 // 1 hour
}

fn default_issuer() -> String {
    "night-cricket".to_string()
}

const DEVELOPMENT_SECRET: &str = "night-cricket-development-secret";

fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if a variable is malformed, or `SESSION_SECRET` is
    /// missing outside development
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup
    ///
    /// # Errors
    /// Same as [`AppConfig::from_env`]
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = match lookup("APP_ENV") {
            Some(raw) => Environment::parse(&raw)
                .ok_or(ConfigError::InvalidValue("APP_ENV", raw))?,
            None => Environment::default(),
        };

        let secret = match lookup("SESSION_SECRET") {
            Some(secret) if !secret.is_empty() => secret,
            _ if env.is_development() => DEVELOPMENT_SECRET.to_string(),
            _ => return Err(ConfigError::MissingVar("SESSION_SECRET")),
        };

        let ttl_secs = match lookup("SESSION_TTL_SECS") {
            Some(raw) => raw
                .parse()
                .map_err(|_| ConfigError::InvalidValue("SESSION_TTL_SECS", raw))?,
            None => default_session_ttl(),
        };

        let atomic_batches = match lookup("CHOICE_ATOMIC_BATCHES") {
            Some(raw) => {
                parse_bool(&raw).ok_or(ConfigError::InvalidValue("CHOICE_ATOMIC_BATCHES", raw))?
            }
            None => false,
        };

        Ok(Self {
            app: AppSettings {
                name: lookup("APP_NAME").unwrap_or_else(default_app_name),
                env,
            },
            store: StoreConfig {
                events_collection: lookup("EVENTS_COLLECTION")
                    .unwrap_or_else(default_events_collection),
                polls_collection: lookup("POLLS_COLLECTION")
                    .unwrap_or_else(default_polls_collection),
            },
            session: SessionConfig {
                secret,
                ttl_secs,
                issuer: lookup("SESSION_ISSUER").unwrap_or_else(default_issuer),
            },
            choice: ChoiceConfig { atomic_batches },
        })
    }

    /// Development defaults, no environment involved
    #[must_use]
    pub fn development() -> Self {
        Self {
            app: AppSettings {
                name: default_app_name(),
                env: Environment::Development,
            },
            store: StoreConfig::default(),
            session: SessionConfig {
                secret: DEVELOPMENT_SECRET.to_string(),
                ttl_secs: default_session_ttl(),
                issuer: default_issuer(),
            },
            choice: ChoiceConfig::default(),
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}
