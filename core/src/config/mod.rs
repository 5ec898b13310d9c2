//! # Configuration Options
//!
//! This module defines configuration options.
//!
//! This information can be passed to the library in two ways: a TOML file or
//! environment variables. Every override is optional: a config holding only a
//! `network` runs that network's historical rules.

use crate::errors::PowError;
use consensus_lib::common::constants::EDA_LOOKBACK;
use consensus_lib::compact::target_from_be_hex;
use consensus_lib::ConsensusPowParams;
use serde::Deserialize;
use std::str::FromStr;
use std::{fs::File, io::Read, path::PathBuf};
use tracing::level_filters::LevelFilter;

pub mod env;
pub mod network;

pub use network::{ActivationSchedule, NetworkName};

/// Configuration options for any node that validates headers with the
/// difficulty engine.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct RetargetConfig {
    /// Network whose parameters and fork heights are used.
    pub network: NetworkName,
    /// Big-endian hex of a proof-of-work limit that replaces the network's.
    #[serde(default)]
    pub pow_limit: Option<String>,
    /// Overrides the height at which the emergency adjustment activates.
    #[serde(default)]
    pub eda_height: Option<u32>,
    /// Overrides the height at which the weighted-average algorithm activates.
    #[serde(default)]
    pub daa_height: Option<u32>,
    /// Default log level, `RUST_LOG` still takes precedence per target.
    #[serde(default)]
    pub log_level: Option<String>,
}

impl Default for RetargetConfig {
    fn default() -> Self {
        Self {
            network: NetworkName::Regtest,
            pow_limit: None,
            eda_height: None,
            daa_height: None,
            log_level: None,
        }
    }
}

impl RetargetConfig {
    /// Create a new `RetargetConfig` with default values.
    pub fn new() -> Self {
        RetargetConfig {
            ..Default::default()
        }
    }

    /// Proof-of-work parameters of the configured network, with the limit
    /// override applied.
    pub fn pow_params(&self) -> Result<ConsensusPowParams, PowError> {
        let base: &'static ConsensusPowParams = self.network.into();
        let mut params = *base;

        if let Some(pow_limit) = &self.pow_limit {
            let pow_limit = target_from_be_hex(pow_limit)?;
            if pow_limit == consensus_lib::U256::ZERO {
                return Err(PowError::ConfigError(
                    "Proof-of-work limit can't be zero".to_string(),
                ));
            }
            params.pow_limit = pow_limit;
        }

        Ok(params)
    }

    /// Fork heights of the configured network, with the overrides applied.
    pub fn activation_schedule(&self) -> Result<ActivationSchedule, PowError> {
        let mut schedule = ActivationSchedule::from(self.network);
        if let Some(eda_height) = self.eda_height {
            schedule.eda_height = eda_height;
        }
        if let Some(daa_height) = self.daa_height {
            schedule.daa_height = daa_height;
        }

        if schedule.eda_height > schedule.daa_height {
            return Err(PowError::ConfigError(format!(
                "EDA height {} is above DAA height {}",
                schedule.eda_height, schedule.daa_height
            )));
        }

        // Frozen difficulty never reads history, so any heights work there.
        let params: &'static ConsensusPowParams = self.network.into();
        if !params.no_retargeting {
            let interval = params.difficulty_adjustment_interval();
            if schedule.daa_height < interval {
                return Err(PowError::ConfigError(format!(
                    "DAA height {} is below the adjustment interval {}",
                    schedule.daa_height, interval
                )));
            }

            if schedule.eda_height < EDA_LOOKBACK - 1 {
                return Err(PowError::ConfigError(format!(
                    "EDA height {} leaves fewer than {} blocks of history",
                    schedule.eda_height, EDA_LOOKBACK
                )));
            }
        }

        Ok(schedule)
    }

    /// Parsed log level, if one is configured.
    pub fn log_level(&self) -> Result<Option<LevelFilter>, PowError> {
        self.log_level
            .as_deref()
            .map(|level| {
                LevelFilter::from_str(level)
                    .map_err(|e| PowError::ConfigError(format!("{}: {}", level, e)))
            })
            .transpose()
    }

    /// Read contents of a TOML file and generate a `RetargetConfig`.
    pub fn try_parse_file(path: PathBuf) -> Result<Self, PowError> {
        let mut contents = String::new();
        File::open(&path)?.read_to_string(&mut contents)?;

        tracing::trace!("Using configuration file: {:?}", path);

        RetargetConfig::try_parse_from(contents)
    }

    /// Try to parse a `RetargetConfig` from given TOML formatted string.
    pub fn try_parse_from(input: String) -> Result<Self, PowError> {
        Ok(toml::from_str::<RetargetConfig>(&input)?)
    }
}
