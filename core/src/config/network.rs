use crate::errors::PowError;
use consensus_lib::params::{MAINNET_POW_PARAMS, REGTEST_POW_PARAMS, TESTNET_POW_PARAMS};
use consensus_lib::{ConsensusPowParams, DifficultyAlgorithm};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
/// A pre-defined network name that can be converted into a
/// [`ConsensusPowParams`] reference and an [`ActivationSchedule`].
pub enum NetworkName {
    Mainnet,
    Testnet,
    Regtest,
}

impl FromStr for NetworkName {
    type Err = PowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mainnet" => Ok(NetworkName::Mainnet),
            "testnet" => Ok(NetworkName::Testnet),
            "regtest" => Ok(NetworkName::Regtest),
            _ => Err(PowError::ConfigError(format!(
                "Unknown network name: {}",
                s
            ))),
        }
    }
}

impl Display for NetworkName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NetworkName::Mainnet => write!(f, "mainnet"),
            NetworkName::Testnet => write!(f, "testnet"),
            NetworkName::Regtest => write!(f, "regtest"),
        }
    }
}

impl From<NetworkName> for &'static ConsensusPowParams {
    fn from(name: NetworkName) -> Self {
        match name {
            NetworkName::Mainnet => &MAINNET_POW_PARAMS,
            NetworkName::Testnet => &TESTNET_POW_PARAMS,
            NetworkName::Regtest => &REGTEST_POW_PARAMS,
        }
    }
}

impl From<NetworkName> for ActivationSchedule {
    fn from(name: NetworkName) -> Self {
        match name {
            NetworkName::Mainnet => MAINNET_SCHEDULE,
            NetworkName::Testnet => TESTNET_SCHEDULE,
            NetworkName::Regtest => REGTEST_SCHEDULE,
        }
    }
}

/// Heights at which the retargeting algorithms take over.
///
/// The difficulty engine never picks its own algorithm, the node asks the
/// schedule and passes the answer in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActivationSchedule {
    /// First previous-block height governed by the emergency adjustment.
    pub eda_height: u32,
    /// First previous-block height governed by the weighted-average algorithm.
    pub daa_height: u32,
}

impl ActivationSchedule {
    /// Algorithm for the block built on top of a block at `prev_height`.
    pub fn algorithm_for(&self, prev_height: u32) -> DifficultyAlgorithm {
        if prev_height >= self.daa_height {
            DifficultyAlgorithm::WeightedAverage
        } else if prev_height >= self.eda_height {
            DifficultyAlgorithm::Eda
        } else {
            DifficultyAlgorithm::LegacyBoundary
        }
    }
}

/// August 1, 2017 and November 13, 2017 hard forks.
pub const MAINNET_SCHEDULE: ActivationSchedule = ActivationSchedule {
    eda_height: 478558,
    daa_height: 504031,
};

pub const TESTNET_SCHEDULE: ActivationSchedule = ActivationSchedule {
    eda_height: 1155875,
    daa_height: 1188697,
};

/// Every fork is active from genesis on regtest.
pub const REGTEST_SCHEDULE: ActivationSchedule = ActivationSchedule {
    eda_height: 0,
    daa_height: 0,
};
