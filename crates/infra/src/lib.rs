//! Infrastructure layer: storage adapters, cascade orchestration, bootstrap
//! seed and configuration.

pub mod cascade;
pub mod config;
pub mod seed;
pub mod store;

pub use cascade::{CascadeError, CascadeOutcome, CascadingSoftDelete};
pub use config::{AppConfig, BootstrapAccount, ConfigError};
pub use store::{
    AccountQuery, AccountStore, AreaQuery, CatalogSnapshot, CatalogStore, InMemoryStore, Page, PageRequest,
    PostgresStore, RetireOutcome, StoreError,
};
