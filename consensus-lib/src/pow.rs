//! # Proof of Work Validation
//!
//! Checks a block hash against the target claimed by its header and measures
//! the work a target represents. Header data reaching this module is
//! untrusted, so malformed targets are an ordinary `false`, never a panic.

use crypto_bigint::{Encoding, U256};

use crate::compact::decode_compact;
use crate::params::ConsensusPowParams;

/// Validates that `hash` satisfies the target encoded in `bits`.
///
/// `hash` is in internal byte order (little-endian), which is how block hashes
/// are compared against targets.
///
/// ## Returns
///
/// * `false` - if the target is negative, zero, overflows, or exceeds the
///   network's proof-of-work limit, or if the hash is above the target
/// * `true` - otherwise
pub fn check_proof_of_work(hash: &[u8; 32], bits: u32, params: &ConsensusPowParams) -> bool {
    let decoded = decode_compact(bits);

    if decoded.negative
        || decoded.target == U256::ZERO
        || decoded.overflow
        || decoded.target > params.pow_limit
    {
        tracing::trace!("Rejecting out of range compact target {:#010x}", bits);
        return false;
    }

    U256::from_le_bytes(*hash) <= decoded.target
}

/// Calculates the amount of work represented by a difficulty target.
///
/// work = 2 ** 256 / (target + 1), computed with the identity
/// 2**256 / (x + 1) == ~x / (x + 1) + 1 so it stays within 256 bits.
pub fn calculate_work(target: &U256) -> U256 {
    if *target == U256::MAX {
        return U256::ONE;
    }

    let comp = !*target;
    comp.wrapping_div(&target.wrapping_add(&U256::ONE))
        .wrapping_add(&U256::ONE)
}

/// Work contributed by a block with the given compact target. Malformed or
/// zero targets contribute nothing.
pub fn block_proof(bits: u32) -> U256 {
    let decoded = decode_compact(bits);
    if decoded.negative || decoded.overflow || decoded.target == U256::ZERO {
        return U256::ZERO;
    }
    calculate_work(&decoded.target)
}
