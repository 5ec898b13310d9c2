//! # Common Constants
//! Consensus constants used by the difficulty algorithms. Changing any of
//! these forks the node off the network.

/// Number of blocks (the block itself plus its ancestors) whose timestamps
/// make up the median time past.
pub const MEDIAN_TIME_SPAN: usize = 11;

/// The weighted-average algorithm always looks back this many blocks,
/// independent of the legacy adjustment interval.
pub const DAA_WINDOW_SIZE: u32 = 144;

/// Ideal block spacing baked into the weighted-average algorithm.
pub const DAA_IDEAL_BLOCK_TIME: u64 = 600;

/// The emergency rule compares the median time past of the previous block
/// with the one of the block `EDA_LOOKBACK - 1` blocks before it.
pub const EDA_LOOKBACK: u32 = 7;

/// If the last six blocks took at least this long (median time past delta),
/// the emergency rule lowers the difficulty.
pub const EDA_MTP_THRESHOLD_SECS: i64 = 12 * 3600;

/// Testnet relaxation: a block this many target spacings after its parent may
/// be mined at minimum difficulty.
pub const MIN_DIFFICULTY_SPACING_MULTIPLIER: i64 = 2;
