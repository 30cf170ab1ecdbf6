//! Infrastructure layer: persistence adapters and configuration.

pub mod config;
pub mod store;

pub use config::{AppConfig, ConfigError};
pub use store::{AccountStore, CatalogStore, InMemoryStore, PostgresStore, StoreError};
