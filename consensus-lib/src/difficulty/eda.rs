//! Legacy retargeting extended with the Emergency Difficulty Adjustment.

use crate::chain_index::ChainIndexView;
use crate::common::constants::{EDA_LOOKBACK, EDA_MTP_THRESHOLD_SECS};
use crate::compact::{bits_to_target, target_to_bits};
use crate::params::ConsensusPowParams;

use super::{interval_boundary_retarget, min_difficulty_rules};

/// Computes the next compact target with the legacy rules and the emergency
/// difficulty adjustment.
///
/// Off an interval boundary, if the median time past moved by at least 12
/// hours over the last six blocks, the target grows by a quarter (about 20%
/// less difficulty) so the chain cannot stall after a sudden hashrate loss.
///
/// ## Panics
///
/// Panics if a required ancestor is missing from the chain index.
pub fn get_next_eda_work_required<B: ChainIndexView>(
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

    // Can't go below the minimum difficulty.
    let bits = prev.bits();
    let pow_limit_bits = params.pow_limit_bits();
    if bits == pow_limit_bits {
        return pow_limit_bits;
    }

    let height = prev.height() + 1;
    let lookback_height = height.checked_sub(EDA_LOOKBACK).unwrap_or_else(|| {
        panic!(
            "Emergency adjustment at height {} needs {} blocks of history",
            height, EDA_LOOKBACK
        )
    });
    let lookback = prev.ancestor(lookback_height);

    let mtp_6_blocks = prev.median_time_past() - lookback.median_time_past();
    if mtp_6_blocks < EDA_MTP_THRESHOLD_SECS {
        return bits;
    }

    let target = bits_to_target(bits);
    let mut new_target = target.wrapping_add(&(target >> 2));
    if new_target > params.pow_limit {
        new_target = params.pow_limit;
    }

    let new_bits = target_to_bits(&new_target);
    tracing::debug!(
        height,
        mtp_6_blocks,
        "Emergency difficulty adjustment {:#010x} -> {:#010x}",
        bits,
        new_bits
    );

    new_bits
}
