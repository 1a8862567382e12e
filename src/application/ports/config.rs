//! Configuration port interface

use async_trait::async_trait;
use std::path::PathBuf;

use crate::domain::config::AppConfig;
use crate::domain::error::ConfigError;

/// Source of the optional on-disk configuration layer
#[async_trait]
pub trait ConfigStore: Send + Sync {
    /// Load the stored layer; a store with nothing in it yields
    /// [`AppConfig::empty`] rather than an error.
    async fn load(&self) -> Result<AppConfig, ConfigError>;

    /// Where the layer lives, for diagnostics
    fn path(&self) -> PathBuf;
}
