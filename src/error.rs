use thiserror::Error;

use crate::bind::BindError;
use crate::loader::ConfigError;

/// Top-level error type for the metacfg library.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error("failed to load configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("failed to bind configuration: {0}")]
    Bind(#[from] BindError),
}
