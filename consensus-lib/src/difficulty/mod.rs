//! # Difficulty Engine
//!
//! Computes the compact target the next block has to satisfy. Three
//! independent retargeting algorithms are provided:
//!
//! - **Legacy**: retarget once per adjustment interval, scaling the previous
//!   target by the clamped time the interval took.
//! - **Emergency Difficulty Adjustment (EDA)**: legacy retargeting plus a 20%
//!   difficulty drop whenever six blocks took more than 12 hours.
//! - **Weighted average**: a per-block retarget over a fixed 144-block window,
//!   weighting recent blocks more heavily. See [`cash`].
//!
//! Choosing the algorithm for a given height is a policy decision of the
//! caller, passed in as a [`DifficultyAlgorithm`].
//!
//! Precondition violations (missing ancestors, not enough history) mean the
//! chain index is inconsistent and cause a panic.

use crypto_bigint::U256;

use crate::chain_index::ChainIndexView;
use crate::common::constants::MIN_DIFFICULTY_SPACING_MULTIPLIER;
use crate::compact::{bits_to_target, target_to_bits};
use crate::params::ConsensusPowParams;

pub mod cash;
pub mod eda;

#[cfg(test)]
pub(crate) mod test_chain;

pub use cash::{compute_target, get_next_cash_work_required};
pub use eda::get_next_eda_work_required;

/// Retargeting algorithm governing the next block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DifficultyAlgorithm {
    /// Retarget only at adjustment interval boundaries.
    LegacyBoundary,
    /// Legacy retargeting plus the emergency difficulty adjustment.
    Eda,
    /// 144-block weighted-average retargeting.
    WeightedAverage,
}

/// Returns the compact target required for the block following `prev`.
///
/// ## Parameters
///
/// * `prev` - The current tip, `None` when the next block is the genesis block
/// * `candidate_time` - Timestamp of the block being built or validated
/// * `algorithm` - Algorithm the caller's activation policy selected
/// * `params` - Proof-of-work parameters of the network
pub fn get_next_work_required<B: ChainIndexView>(
    prev: Option<&B>,
    candidate_time: i64,
    algorithm: DifficultyAlgorithm,
    params: &ConsensusPowParams,
) -> u32 {
    let Some(prev) = prev else {
        return params.pow_limit_bits();
    };

    if params.no_retargeting {
        return prev.bits();
    }

    match algorithm {
        DifficultyAlgorithm::LegacyBoundary => {
            get_next_legacy_work_required(prev, candidate_time, params)
        }
        DifficultyAlgorithm::Eda => get_next_eda_work_required(prev, candidate_time, params),
        DifficultyAlgorithm::WeightedAverage => {
            get_next_cash_work_required(prev, candidate_time, params)
        }
    }
}

/// Plain interval-boundary retargeting without the emergency rule.
pub fn get_next_legacy_work_required<B: ChainIndexView>(
    prev: &B,
    candidate_time: i64,
    params: &ConsensusPowParams,
) -> u32 {
    if let Some(bits) = interval_boundary_retarget(prev, params) {
        return bits;
    }

    if params.allow_min_difficulty_blocks {
        return min_difficulty_rules(prev, candidate_time, params);
    }

    prev.bits()
}

/// Legacy periodic retarget.
///
/// Scales the previous target by `actual / target_timespan`, where `actual`
/// is the time the interval took, clamped to a factor of four either way.
/// The product is formed at full precision before dividing.
pub fn calculate_next_work_required(
    prev_bits: u32,
    prev_time: i64,
    first_block_time: i64,
    params: &ConsensusPowParams,
) -> u32 {
    if params.no_retargeting {
        return prev_bits;
    }

    let actual_timespan = (prev_time - first_block_time)
        .clamp(params.target_timespan / 4, params.target_timespan * 4);

    let mut new_target = bits_to_target(prev_bits)
        .wrapping_mul(&U256::from(actual_timespan as u64))
        .wrapping_div(&U256::from(params.target_timespan as u64));

    if new_target > params.pow_limit {
        new_target = params.pow_limit;
    }

    tracing::trace!(
        actual_timespan,
        "Legacy retarget {:#010x} -> {:#010x}",
        prev_bits,
        target_to_bits(&new_target)
    );

    target_to_bits(&new_target)
}

/// Runs the legacy retarget when the next block starts a new adjustment
/// interval, `None` otherwise.
pub(crate) fn interval_boundary_retarget<B: ChainIndexView>(
    prev: &B,
    params: &ConsensusPowParams,
) -> Option<u32> {
    let interval = params.difficulty_adjustment_interval();
    let height = prev.height() + 1;
    if height % interval != 0 {
        return None;
    }

    let first_height = height.checked_sub(interval).unwrap_or_else(|| {
        panic!(
            "Retarget at height {} needs {} blocks of history",
            height, interval
        )
    });
    let first = prev.ancestor(first_height);

    Some(calculate_next_work_required(
        prev.bits(),
        prev.block_time(),
        first.block_time(),
        params,
    ))
}

/// Testnet rules for blocks that are not on an interval boundary.
///
/// A block arriving more than two target spacings after its parent may use
/// the minimum difficulty. Otherwise the target of the last block that was
/// not mined under that exception applies.
pub(crate) fn min_difficulty_rules<B: ChainIndexView>(
    prev: &B,
    candidate_time: i64,
    params: &ConsensusPowParams,
) -> u32 {
    let pow_limit_bits = params.pow_limit_bits();

    if candidate_time
        > prev.block_time() + MIN_DIFFICULTY_SPACING_MULTIPLIER * params.target_spacing
    {
        return pow_limit_bits;
    }

    // Height 0 is a boundary, so the walk never needs a block below genesis.
    let interval = params.difficulty_adjustment_interval();
    let mut block = prev.clone();
    while block.height() % interval != 0 && block.bits() == pow_limit_bits {
        block = block.ancestor(block.height() - 1);
    }

    block.bits()
}

#[cfg(test)]
mod tests {
    use super::test_chain::build_chain;
    use super::*;
    use crate::chain_index::BlockRef;
    use crate::params::{MAINNET_POW_PARAMS, REGTEST_POW_PARAMS, TESTNET_POW_PARAMS};

    #[test]
    fn test_get_next_work() {
        let bits = calculate_next_work_required(
            0x1d00ffff,
            1262152739,
            1261130161,
            &MAINNET_POW_PARAMS,
        );
        assert_eq!(bits, 0x1d00d86a);
    }

    #[test]
    fn test_get_next_work_pow_limit() {
        let bits = calculate_next_work_required(
            0x1d00ffff,
            1233061996,
            1231006505,
            &MAINNET_POW_PARAMS,
        );
        assert_eq!(bits, 0x1d00ffff);
    }

    #[test]
    fn test_get_next_work_lower_limit_actual() {
        let bits = calculate_next_work_required(
            0x1c05a3f4,
            1279297671,
            1279008237,
            &MAINNET_POW_PARAMS,
        );
        assert_eq!(bits, 0x1c0168fd);

        // One second is clamped the same way.
        let bits = calculate_next_work_required(0x1c05a3f4, 1, 0, &MAINNET_POW_PARAMS);
        assert_eq!(bits, 0x1c0168fd);
    }

    #[test]
    fn test_get_next_work_upper_limit_actual() {
        let bits = calculate_next_work_required(
            0x1c387f6f,
            1269211443,
            1263163443,
            &MAINNET_POW_PARAMS,
        );
        assert_eq!(bits, 0x1d00e1fd);

        let ten_windows = 10 * MAINNET_POW_PARAMS.target_timespan;
        let bits = calculate_next_work_required(0x1c387f6f, ten_windows, 0, &MAINNET_POW_PARAMS);
        assert_eq!(bits, 0x1d00e1fd);
    }

    #[test]
    fn test_negative_timespan_is_clamped() {
        let bits = calculate_next_work_required(0x1c05a3f4, 0, 1000, &MAINNET_POW_PARAMS);
        assert_eq!(bits, 0x1c0168fd);
    }

    #[test]
    fn test_no_retargeting_keeps_bits() {
        let bits = calculate_next_work_required(0x207fffff, 1, 0, &REGTEST_POW_PARAMS);
        assert_eq!(bits, 0x207fffff);

        let arena = build_chain(0, 2016, 600, 0x1c05a3f4);
        let tip = arena.tip().unwrap();
        for algorithm in [
            DifficultyAlgorithm::LegacyBoundary,
            DifficultyAlgorithm::Eda,
            DifficultyAlgorithm::WeightedAverage,
        ] {
            assert_eq!(
                get_next_work_required(Some(&tip), 0, algorithm, &REGTEST_POW_PARAMS),
                0x1c05a3f4
            );
        }
    }

    #[test]
    fn test_genesis_gets_pow_limit() {
        let bits = get_next_work_required::<BlockRef>(
            None,
            1231006505,
            DifficultyAlgorithm::Eda,
            &MAINNET_POW_PARAMS,
        );
        assert_eq!(bits, 0x1d00ffff);
    }

    #[test]
    fn test_legacy_boundary_retargets() {
        // Heights 0..=2015, the next block starts a new interval.
        let arena = build_chain(0, 2016, 500, 0x1c05a3f4);
        let tip = arena.tip().unwrap();

        let expected = calculate_next_work_required(
            0x1c05a3f4,
            tip.block_time(),
            tip.ancestor(0).block_time(),
            &MAINNET_POW_PARAMS,
        );
        assert_ne!(expected, 0x1c05a3f4);
        assert_eq!(
            get_next_work_required(
                Some(&tip),
                tip.block_time() + 500,
                DifficultyAlgorithm::LegacyBoundary,
                &MAINNET_POW_PARAMS
            ),
            expected
        );
    }

    #[test]
    fn test_legacy_off_boundary_keeps_bits() {
        let arena = build_chain(0, 100, 10_000, 0x1c05a3f4);
        let tip = arena.tip().unwrap();
        assert_eq!(
            get_next_legacy_work_required(&tip, tip.block_time() + 10_000, &MAINNET_POW_PARAMS),
            0x1c05a3f4
        );
    }

    #[test]
    fn test_testnet_walk_back_reaches_genesis() {
        let arena = build_chain(0, 10, 600, 0x1d00ffff);
        let tip = arena.tip().unwrap();
        assert_eq!(
            get_next_legacy_work_required(&tip, tip.block_time() + 600, &TESTNET_POW_PARAMS),
            0x1d00ffff
        );
    }

    #[test]
    #[should_panic(expected = "is below the chain origin")]
    fn test_testnet_walk_back_past_checkpoint_origin_panics() {
        // Every block above the origin is a minimum-difficulty block, so the
        // last real target sits below the origin.
        let arena = build_chain(4033, 3, 600, 0x1d00ffff);
        let tip = arena.tip().unwrap();
        get_next_legacy_work_required(&tip, tip.block_time() + 600, &TESTNET_POW_PARAMS);
    }

    #[test]
    fn test_testnet_late_block_gets_min_difficulty() {
        let arena = build_chain(0, 100, 600, 0x1c05a3f4);
        let tip = arena.tip().unwrap();
        assert_eq!(
            get_next_legacy_work_required(&tip, tip.block_time() + 1201, &TESTNET_POW_PARAMS),
            0x1d00ffff
        );
        assert_eq!(
            get_next_legacy_work_required(&tip, tip.block_time() + 1200, &TESTNET_POW_PARAMS),
            0x1c05a3f4
        );
    }
}
