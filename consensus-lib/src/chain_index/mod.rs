//! # Chain Index
//!
//! Read-only view over an ordered block header history, as consumed by the
//! difficulty engine, plus an arena implementation of it.
//!
//! The arena stores immutable block records addressed by height, so "ancestor
//! at height H" is an index computation instead of a walk over parent links.
//! An arena may start at any origin height; nothing before the origin can be
//! looked up.

use borsh::{BorshDeserialize, BorshSerialize};
use crypto_bigint::{Encoding, U256};
use eyre::{eyre, Result};
use serde::{Deserialize, Serialize};

use crate::common::constants::MEDIAN_TIME_SPAN;
use crate::pow::block_proof;

/// Read access to one block of a stable chain history.
///
/// Implementations must stay internally consistent for the duration of a
/// retarget or validation call.
pub trait ChainIndexView: Clone {
    fn height(&self) -> u32;

    /// Header timestamp as stored in the block.
    fn time(&self) -> u32;

    fn block_time(&self) -> i64 {
        i64::from(self.time())
    }

    fn bits(&self) -> u32;

    /// Median of the timestamps of this block and up to ten of its ancestors.
    fn median_time_past(&self) -> i64;

    /// Returns the block at `height` on the path from this block back to the
    /// origin of the chain.
    ///
    /// ## Panics
    ///
    /// Panics if `height` is above this block or below the chain origin.
    fn ancestor(&self, height: u32) -> Self;
}

/// A single immutable entry of the arena.
#[derive(Serialize, Deserialize, Eq, PartialEq, Clone, Debug, BorshDeserialize, BorshSerialize)]
pub struct BlockRecord {
    pub hash: [u8; 32],
    pub time: u32,
    pub bits: u32,
    /// Cumulative proof-of-work up to and including this block, big-endian.
    pub chain_work: [u8; 32],
}

/// Append-only arena of block records for a single chain.
#[derive(
    Serialize, Deserialize, Eq, PartialEq, Clone, Debug, Default, BorshDeserialize, BorshSerialize,
)]
pub struct BlockIndexArena {
    origin_height: u32,
    records: Vec<BlockRecord>,
}

impl BlockIndexArena {
    /// Creates an empty arena whose first block will be the genesis block.
    pub fn new() -> Self {
        Self::with_origin(0)
    }

    /// Creates an empty arena whose first block will sit at `origin_height`.
    pub fn with_origin(origin_height: u32) -> Self {
        BlockIndexArena {
            origin_height,
            records: Vec::new(),
        }
    }

    pub fn origin_height(&self) -> u32 {
        self.origin_height
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Appends a block on top of the current tip and returns its height.
    pub fn append(&mut self, hash: [u8; 32], time: u32, bits: u32) -> Result<u32> {
        let offset = u32::try_from(self.records.len())
            .map_err(|_| eyre!("Block index arena is full"))?;
        let height = self
            .origin_height
            .checked_add(offset)
            .ok_or_else(|| eyre!("Block height overflows u32"))?;

        let parent_work = self
            .records
            .last()
            .map(|record| U256::from_be_bytes(record.chain_work))
            .unwrap_or(U256::ZERO);
        let chain_work = parent_work.wrapping_add(&block_proof(bits));

        self.records.push(BlockRecord {
            hash,
            time,
            bits,
            chain_work: chain_work.to_be_bytes(),
        });

        Ok(height)
    }

    pub fn tip(&self) -> Option<BlockRef<'_>> {
        self.records.len().checked_sub(1).map(|index| BlockRef {
            arena: self,
            index,
        })
    }

    /// Returns the block at `height`, `None` if it is not in the arena.
    pub fn at_height(&self, height: u32) -> Option<BlockRef<'_>> {
        let index = height.checked_sub(self.origin_height)? as usize;
        if index < self.records.len() {
            Some(BlockRef { arena: self, index })
        } else {
            None
        }
    }
}

/// Borrowed handle to a block inside a [`BlockIndexArena`].
#[derive(Clone, Copy, Debug)]
pub struct BlockRef<'a> {
    arena: &'a BlockIndexArena,
    index: usize,
}

impl<'a> BlockRef<'a> {
    pub fn record(&self) -> &'a BlockRecord {
        &self.arena.records[self.index]
    }

    pub fn hash(&self) -> [u8; 32] {
        self.record().hash
    }

    pub fn chain_work(&self) -> U256 {
        U256::from_be_bytes(self.record().chain_work)
    }
}

impl ChainIndexView for BlockRef<'_> {
    fn height(&self) -> u32 {
        self.arena.origin_height + self.index as u32
    }

    fn time(&self) -> u32 {
        self.record().time
    }

    fn bits(&self) -> u32 {
        self.record().bits
    }

    fn median_time_past(&self) -> i64 {
        // Fewer than eleven timestamps are only valid near genesis.
        if self.index + 1 < MEDIAN_TIME_SPAN && self.arena.origin_height != 0 {
            panic!(
                "Median time past at height {} needs height {}, which is below the chain origin {}",
                self.height(),
                self.height().saturating_sub(MEDIAN_TIME_SPAN as u32 - 1),
                self.arena.origin_height
            );
        }

        let start = (self.index + 1).saturating_sub(MEDIAN_TIME_SPAN);
        let mut times: Vec<u32> = self.arena.records[start..=self.index]
            .iter()
            .map(|record| record.time)
            .collect();
        times.sort_unstable();
        i64::from(times[times.len() / 2])
    }

    fn ancestor(&self, height: u32) -> Self {
        let own_height = self.height();
        assert!(
            height <= own_height,
            "Ancestor height {} is above block height {}",
            height,
            own_height
        );
        assert!(
            height >= self.arena.origin_height,
            "Ancestor height {} is below the chain origin {}",
            height,
            self.arena.origin_height
        );

        BlockRef {
            arena: self.arena,
            index: (height - self.arena.origin_height) as usize,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compact::bits_to_target;
    use crate::pow::calculate_work;

    fn arena_with_times(origin_height: u32, times: &[u32]) -> BlockIndexArena {
        let mut arena = BlockIndexArena::with_origin(origin_height);
        for (i, time) in times.iter().enumerate() {
            arena.append([i as u8; 32], *time, 0x1d00ffff).unwrap();
        }
        arena
    }

    #[test]
    fn test_append_assigns_heights_from_origin() {
        let mut arena = BlockIndexArena::with_origin(500);
        assert!(arena.tip().is_none());
        assert_eq!(arena.append([1; 32], 1000, 0x1d00ffff).unwrap(), 500);
        assert_eq!(arena.append([2; 32], 1600, 0x1d00ffff).unwrap(), 501);

        let tip = arena.tip().unwrap();
        assert_eq!(tip.height(), 501);
        assert_eq!(tip.hash(), [2; 32]);
        assert_eq!(tip.ancestor(500).height(), 500);
        assert!(arena.at_height(499).is_none());
        assert!(arena.at_height(502).is_none());
        assert_eq!(arena.at_height(500).unwrap().time(), 1000);
    }

    #[test]
    fn test_append_accumulates_chain_work() {
        let arena = arena_with_times(0, &[0, 600, 1200]);
        let work = calculate_work(&bits_to_target(0x1d00ffff));
        let tip = arena.tip().unwrap();
        assert_eq!(tip.chain_work(), work.wrapping_add(&work).wrapping_add(&work));
    }

    #[test]
    fn test_median_time_past_short_chain() {
        let arena = arena_with_times(0, &[10, 30, 20]);
        assert_eq!(arena.tip().unwrap().median_time_past(), 20);
        assert_eq!(arena.at_height(0).unwrap().median_time_past(), 10);
        // Two timestamps: the upper middle is taken.
        assert_eq!(arena.at_height(1).unwrap().median_time_past(), 30);
    }

    #[test]
    fn test_median_time_past_uses_eleven_blocks() {
        let times = [1000, 3, 7, 2, 10, 1, 5, 9, 4, 8, 6, 11];
        let arena = arena_with_times(0, &times);
        // The oldest timestamp (1000) falls out of the window.
        assert_eq!(arena.tip().unwrap().median_time_past(), 6);
    }

    #[test]
    fn test_median_time_past_after_checkpoint_origin() {
        let times = [1000, 3, 7, 2, 10, 1, 5, 9, 4, 8, 6, 11];
        let arena = arena_with_times(3000, &times);
        // Eleven records above the origin are enough.
        assert_eq!(arena.tip().unwrap().median_time_past(), 6);
        assert_eq!(arena.at_height(3010).unwrap().median_time_past(), 6);
    }

    #[test]
    #[should_panic(expected = "is below the chain origin")]
    fn test_median_time_past_near_checkpoint_origin_panics() {
        let arena = arena_with_times(3000, &[10, 30, 20]);
        arena.tip().unwrap().median_time_past();
    }

    #[test]
    fn test_ancestor_lookup() {
        let arena = arena_with_times(100, &[0, 600, 1200, 1800]);
        let tip = arena.tip().unwrap();
        assert_eq!(tip.ancestor(101).time(), 600);
        assert_eq!(tip.ancestor(103).height(), 103);
    }

    #[test]
    #[should_panic(expected = "is above block height")]
    fn test_ancestor_above_block_panics() {
        let arena = arena_with_times(0, &[0, 600, 1200]);
        arena.at_height(1).unwrap().ancestor(2);
    }

    #[test]
    #[should_panic(expected = "is below the chain origin")]
    fn test_ancestor_before_origin_panics() {
        let arena = arena_with_times(10, &[0, 600, 1200]);
        arena.tip().unwrap().ancestor(9);
    }

    #[test]
    fn test_arena_borsh_snapshot() {
        let arena = arena_with_times(42, &[0, 600, 1200]);
        let bytes = borsh::to_vec(&arena).unwrap();
        let restored = BlockIndexArena::try_from_slice(&bytes).unwrap();
        assert_eq!(restored, arena);
        assert_eq!(restored.tip().unwrap().height(), 44);
    }
}
