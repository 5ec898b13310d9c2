//! # Proof-of-Work Parameters
//!
//! Per-network consensus parameters read by the difficulty engine and the
//! proof-of-work validator. Which preset is active is decided by the node, the
//! engine only ever receives a reference.

use crate::compact::target_to_bits;
use crypto_bigint::U256;

/// Proof-of-work consensus parameters of a network.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConsensusPowParams {
    /// Easiest allowed target. Larger targets are rejected.
    pub pow_limit: U256,
    /// Design time between two blocks, in seconds.
    pub target_spacing: i64,
    /// Length of a full legacy retarget window, in seconds.
    pub target_timespan: i64,
    /// Testnet relaxation: blocks arriving late may use the minimum difficulty.
    pub allow_min_difficulty_blocks: bool,
    /// Regtest: the difficulty never changes.
    pub no_retargeting: bool,
}

impl ConsensusPowParams {
    /// Number of blocks between two legacy retargets.
    pub const fn difficulty_adjustment_interval(&self) -> u32 {
        (self.target_timespan / self.target_spacing) as u32
    }

    /// Compact form of [`ConsensusPowParams::pow_limit`].
    pub fn pow_limit_bits(&self) -> u32 {
        target_to_bits(&self.pow_limit)
    }
}

/// Two weeks in seconds.
const TWO_WEEKS: i64 = 14 * 24 * 60 * 60;

/// Ten minutes in seconds.
const TEN_MINUTES: i64 = 10 * 60;

pub const MAINNET_POW_PARAMS: ConsensusPowParams = ConsensusPowParams {
    pow_limit: U256::from_be_hex(
        "00000000ffffffffffffffffffffffffffffffffffffffffffffffffffffffff",
    ),
    target_spacing: TEN_MINUTES,
    target_timespan: TWO_WEEKS,
    allow_min_difficulty_blocks: false,
    no_retargeting: false,
};

pub const TESTNET_POW_PARAMS: ConsensusPowParams = ConsensusPowParams {
    allow_min_difficulty_blocks: true,
    ..MAINNET_POW_PARAMS
};

pub const REGTEST_POW_PARAMS: ConsensusPowParams = ConsensusPowParams {
    pow_limit: U256::from_be_hex(
        "7fffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff",
    ),
    target_spacing: TEN_MINUTES,
    target_timespan: TWO_WEEKS,
    allow_min_difficulty_blocks: true,
    no_retargeting: true,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_adjustment_interval() {
        assert_eq!(MAINNET_POW_PARAMS.difficulty_adjustment_interval(), 2016);
        assert_eq!(REGTEST_POW_PARAMS.difficulty_adjustment_interval(), 2016);
    }

    #[test]
    fn test_pow_limit_bits() {
        assert_eq!(MAINNET_POW_PARAMS.pow_limit_bits(), 0x1d00ffff);
        assert_eq!(TESTNET_POW_PARAMS.pow_limit_bits(), 0x1d00ffff);
        assert_eq!(REGTEST_POW_PARAMS.pow_limit_bits(), 0x207fffff);
    }
}
