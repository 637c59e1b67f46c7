use std::path::PathBuf;

use ai_goap::{CatalogError, PoolError};
use ai_utility::SelectorError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("invalid config value `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl ConfigError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        ConfigError::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

/// Construction-time failures of the life runtime. Nothing at tick time returns these.
#[derive(Debug, Error)]
pub enum LifeError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("invalid step catalog: {0}")]
    Catalog(#[from] CatalogError),
    #[error("invalid goal registry: {0}")]
    Selector(#[from] SelectorError),
    #[error(transparent)]
    Pool(#[from] PoolError),
}
