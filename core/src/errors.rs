//! # Errors
//!
//! This module defines errors, returned by the library.

use thiserror::Error;

/// Errors returned by the retarget core.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PowError {
    /// ConfigError is returned when the configuration is invalid
    #[error("ConfigError: {0}")]
    ConfigError(String),
    /// Returned when a configuration file can't be read
    #[error("IO error: {0}")]
    IOError(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    TomlError(#[from] toml::de::Error),
    #[error("Environment variable error: {0}")]
    EnvVarError(#[from] std::env::VarError),

    /// Returned when a header's bits differ from the difficulty the chain requires
    #[error("Header at height {height} has bits {got:#010x}, expected {expected:#010x}")]
    UnexpectedBits { height: u32, expected: u32, got: u32 },
    /// Returned when a header's hash doesn't satisfy its target
    #[error("Header at height {0} does not satisfy its proof of work")]
    InvalidProofOfWork(u32),

    #[error(transparent)]
    Eyre(#[from] eyre::Report),
}
