//! # Environment Variable Support For [`RetargetConfig`]

use super::{NetworkName, RetargetConfig};
use crate::errors::PowError;
use std::str::FromStr;

/// Reads a required environment variable.
pub(crate) fn read_string_from_env(env_var: &'static str) -> Result<String, PowError> {
    std::env::var(env_var).map_err(|e| {
        PowError::ConfigError(format!("Environment variable {}: {}", env_var, e))
    })
}

/// Reads a required environment variable and parses it into `T`.
pub(crate) fn read_string_from_env_then_parse<T: FromStr>(
    env_var: &'static str,
) -> Result<T, PowError>
where
    T::Err: std::fmt::Display,
{
    read_string_from_env(env_var)?
        .parse::<T>()
        .map_err(|e| PowError::ConfigError(format!("Environment variable {}: {}", env_var, e)))
}

fn read_optional_from_env(env_var: &'static str) -> Option<String> {
    std::env::var(env_var).ok()
}

fn read_optional_from_env_then_parse<T: FromStr>(
    env_var: &'static str,
) -> Result<Option<T>, PowError>
where
    T::Err: std::fmt::Display,
{
    match std::env::var(env_var) {
        Ok(_) => read_string_from_env_then_parse::<T>(env_var).map(Some),
        Err(std::env::VarError::NotPresent) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

impl RetargetConfig {
    /// Builds a config from `NETWORK` and the optional `POW_LIMIT`,
    /// `EDA_HEIGHT`, `DAA_HEIGHT` and `LOG_LEVEL` variables.
    pub fn from_env() -> Result<Self, PowError> {
        let network = read_string_from_env_then_parse::<NetworkName>("NETWORK")?;
        let pow_limit = read_optional_from_env("POW_LIMIT");
        let eda_height = read_optional_from_env_then_parse::<u32>("EDA_HEIGHT")?;
        let daa_height = read_optional_from_env_then_parse::<u32>("DAA_HEIGHT")?;
        let log_level = read_optional_from_env("LOG_LEVEL");

        let config = RetargetConfig {
            network,
            pow_limit,
            eda_height,
            daa_height,
            log_level,
        };

        tracing::debug!("RetargetConfig from env: {:?}", config);
        Ok(config)
    }
}
