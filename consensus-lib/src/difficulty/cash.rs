//! # Weighted-Average Difficulty Adjustment
//!
//! Retargets every block from the work done and the time taken over the last
//! 144 blocks. Each block's solve time is weighted by its target relative to
//! the newest target and by its position in the window, so recent blocks
//! count more.
//!
//! The timespan accumulator is 32 bits wide and wraps, and the per-block target
//! ratio is truncated to its low 64 bits. Both are consensus rules: computing
//! them at full precision forks the node off the network.

use crypto_bigint::U256;

use crate::chain_index::ChainIndexView;
use crate::common::constants::{
    DAA_IDEAL_BLOCK_TIME, DAA_WINDOW_SIZE, MIN_DIFFICULTY_SPACING_MULTIPLIER,
};
use crate::compact::{bits_to_target, low_u64, target_to_bits};
use crate::params::ConsensusPowParams;

/// Computes the next compact target with the weighted-average algorithm.
///
/// ## Panics
///
/// Panics if `prev` is below the adjustment interval height or the window
/// start is missing from the chain index.
pub fn get_next_cash_work_required<B: ChainIndexView>(
    prev: &B,
    candidate_time: i64,
    params: &ConsensusPowParams,
) -> u32 {
    if params.allow_min_difficulty_blocks
        && candidate_time
            > prev.block_time() + MIN_DIFFICULTY_SPACING_MULTIPLIER * params.target_spacing
    {
        return params.pow_limit_bits();
    }

    let height = prev.height();
    assert!(
        height >= params.difficulty_adjustment_interval(),
        "Weighted-average retarget needs at least {} blocks of history, tip is at height {}",
        params.difficulty_adjustment_interval(),
        height
    );

    let first_height = height.checked_sub(DAA_WINDOW_SIZE).unwrap_or_else(|| {
        panic!(
            "Weighted-average window of {} blocks does not fit below height {}",
            DAA_WINDOW_SIZE, height
        )
    });
    let first = prev.ancestor(first_height);

    let next_target = compute_target(&first, prev);
    if next_target > params.pow_limit {
        return params.pow_limit_bits();
    }

    target_to_bits(&next_target)
}

/// Computes a target from the work done between `first` (exclusive) and
/// `last` (inclusive) and the time it took. The result is not clamped to the
/// proof-of-work limit.
///
/// ## Panics
///
/// Panics if `last` is not above `first` or if `last` has a zero target.
pub fn compute_target<B: ChainIndexView>(first: &B, last: &B) -> U256 {
    assert!(
        last.height() > first.height(),
        "Window end {} must be above window start {}",
        last.height(),
        first.height()
    );

    let block_count = last.height() - first.height();
    let last_target = bits_to_target(last.bits());
    assert!(
        last_target != U256::ZERO,
        "Block at height {} has a zero target",
        last.height()
    );

    let mut timespan: u32 = 0;
    let mut prior_timestamp = first.time();

    for (weight, height) in (1u32..).zip(first.height() + 1..=last.height()) {
        let block = last.ancestor(height);
        let target_i = bits_to_target(block.bits());

        // Out of order timestamps count as zero time.
        let timestamp = block.time().max(prior_timestamp);
        let time_i = timestamp - prior_timestamp;
        prior_timestamp = timestamp;

        let ratio = low_u64(&target_i.wrapping_div(&last_target));
        let adj_time_i = u64::from(time_i).wrapping_mul(ratio) as u32;

        timespan = timespan.wrapping_add(adj_time_i.wrapping_mul(weight));
    }

    // Normalize the recency weights.
    timespan = timespan.wrapping_mul(2) / (block_count + 1);

    last_target
        .wrapping_mul(&U256::from(timespan))
        .wrapping_div(&U256::from(DAA_IDEAL_BLOCK_TIME * u64::from(block_count)))
}
