//! # Compact Target Codec
//!
//! Block headers carry their proof-of-work target in a 32-bit floating-point
//! like "compact" form:
//! - Bits 24-31: size/exponent (number of bytes of the magnitude)
//! - Bit 23: sign bit, never produced by [`target_to_bits`]
//! - Bits 0-22: the leading 23 significant bits of the magnitude
//!
//! Encoding is lossy: everything below the 23-bit mantissa window is
//! truncated, never rounded. Retarget results are always re-encoded, so the
//! truncated low bits feed into the next computation and have to match other
//! implementations exactly.

use crypto_bigint::{Encoding, U256};
use eyre::{eyre, Result};

const SIGN_BIT: u32 = 0x0080_0000;
const MANTISSA_MASK: u32 = 0x007f_ffff;

/// Result of decoding a compact target.
///
/// `negative` and `overflow` are computed unconditionally, callers handling
/// untrusted headers reject the target when either is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedTarget {
    pub target: U256,
    pub negative: bool,
    pub overflow: bool,
}

/// Decodes a compact target into its 256-bit value and validity flags.
pub fn decode_compact(bits: u32) -> DecodedTarget {
    let size = bits >> 24;
    let word = bits & MANTISSA_MASK;

    let target = if size <= 3 {
        U256::from(word >> (8 * (3 - size)))
    } else {
        U256::from(word) << (8 * (size - 3)) as usize
    };

    let negative = word != 0 && (bits & SIGN_BIT) != 0;
    let overflow = word != 0
        && (size > 34 || (word > 0xff && size > 33) || (word > 0xffff && size > 32));

    DecodedTarget {
        target,
        negative,
        overflow,
    }
}

/// Converts a compact target to its 256-bit value, ignoring the sign and
/// overflow flags.
///
/// Only use this on bits that came out of the retarget engine or an already
/// validated header.
pub fn bits_to_target(bits: u32) -> U256 {
    decode_compact(bits).target
}

/// Converts a 256-bit target to compact form.
///
/// Picks the smallest exponent whose 3-byte window holds the leading bytes of
/// the value. If the top bit of that window is set it would be read back as
/// the sign bit, so the window moves one byte to the left.
pub fn target_to_bits(target: &U256) -> u32 {
    let mut size = target.bits().div_ceil(8);
    let mut compact = if size <= 3 {
        (low_u64(target) << (8 * (3 - size))) as u32
    } else {
        low_u64(&(*target >> (8 * (size - 3)))) as u32
    };

    if compact & SIGN_BIT != 0 {
        compact >>= 8;
        size += 1;
    }

    compact | ((size as u32) << 24)
}

/// Returns the low 64 bits of a 256-bit value.
pub fn low_u64(value: &U256) -> u64 {
    let bytes = value.to_le_bytes();
    let mut low = [0u8; 8];
    low.copy_from_slice(&bytes[..8]);
    u64::from_le_bytes(low)
}

/// Parses a big-endian hex string (optionally `0x` prefixed, at most 64 hex
/// digits) into a target.
pub fn target_from_be_hex(input: &str) -> Result<U256> {
    let digits = input.trim().trim_start_matches("0x");
    if digits.is_empty() || digits.len() > 64 {
        return Err(eyre!(
            "Target must have between 1 and 64 hex digits, got {}",
            digits.len()
        ));
    }

    let padded = format!("{:0>64}", digits);
    let decoded = hex::decode(padded)?;
    let mut bytes = [0u8; 32];
    bytes.copy_from_slice(&decoded);
    Ok(U256::from_be_bytes(bytes))
}
