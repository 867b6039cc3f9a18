//! Configuration structs

mod app_config;

pub use app_config::{
    AppConfig, AppSettings, ChoiceConfig, ConfigError, Environment, SessionConfig, StoreConfig,
};
