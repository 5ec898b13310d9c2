//! # Header Chain
//!
//! Contextual header acceptance: every header must carry exactly the bits the
//! difficulty engine requires on top of the current tip, and its hash must
//! satisfy them. Accepted headers extend an arena whose tip drives the next
//! retarget.

use crate::config::{ActivationSchedule, RetargetConfig};
use crate::errors::PowError;
use consensus_lib::{
    check_proof_of_work, get_next_work_required, BlockIndexArena, BlockRef, ChainIndexView,
    ConsensusPowParams, DifficultyAlgorithm, U256,
};
use serde::{Deserialize, Serialize};

/// The parts of a block header the difficulty rules look at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderSummary {
    /// Block hash in internal byte order.
    #[serde(with = "hex::serde")]
    pub hash: [u8; 32],
    pub time: u32,
    pub bits: u32,
}

#[derive(Debug, Clone)]
pub struct HeaderChain {
    arena: BlockIndexArena,
    params: ConsensusPowParams,
    schedule: ActivationSchedule,
}

impl HeaderChain {
    /// An empty chain whose first accepted header is the genesis block.
    pub fn new(params: ConsensusPowParams, schedule: ActivationSchedule) -> Self {
        Self::with_arena(BlockIndexArena::new(), params, schedule)
    }

    /// Continues an existing arena, for example one restored from a snapshot
    /// that starts at a checkpoint.
    pub fn with_arena(
        arena: BlockIndexArena,
        params: ConsensusPowParams,
        schedule: ActivationSchedule,
    ) -> Self {
        HeaderChain {
            arena,
            params,
            schedule,
        }
    }

    pub fn from_config(config: &RetargetConfig) -> Result<Self, PowError> {
        Ok(Self::new(config.pow_params()?, config.activation_schedule()?))
    }

    pub fn arena(&self) -> &BlockIndexArena {
        &self.arena
    }

    pub fn params(&self) -> &ConsensusPowParams {
        &self.params
    }

    pub fn tip(&self) -> Option<BlockRef<'_>> {
        self.arena.tip()
    }

    /// Cumulative work of the chain, zero when empty.
    pub fn total_work(&self) -> U256 {
        self.tip().map_or(U256::ZERO, |tip| tip.chain_work())
    }

    /// Algorithm governing the block after the current tip.
    pub fn next_algorithm(&self) -> DifficultyAlgorithm {
        match self.tip() {
            Some(tip) => self.schedule.algorithm_for(tip.height()),
            None => DifficultyAlgorithm::LegacyBoundary,
        }
    }

    /// Compact target the next header must carry if stamped `candidate_time`.
    pub fn next_work_required(&self, candidate_time: i64) -> u32 {
        let tip = self.tip();
        get_next_work_required(
            tip.as_ref(),
            candidate_time,
            self.next_algorithm(),
            &self.params,
        )
    }

    /// Validates `header` against the current tip and appends it.
    ///
    /// Returns the height of the accepted header. A rejected header leaves the
    /// chain unchanged.
    pub fn accept_header(&mut self, header: HeaderSummary) -> Result<u32, PowError> {
        let height = self
            .tip()
            .map_or(self.arena.origin_height(), |tip| tip.height() + 1);

        let expected = self.next_work_required(i64::from(header.time));
        if header.bits != expected {
            return Err(PowError::UnexpectedBits {
                height,
                expected,
                got: header.bits,
            });
        }

        if !check_proof_of_work(&header.hash, header.bits, &self.params) {
            return Err(PowError::InvalidProofOfWork(height));
        }

        let height = self.arena.append(header.hash, header.time, header.bits)?;
        tracing::debug!(height, bits = header.bits, "Accepted header");

        Ok(height)
    }

    /// Accepts headers in order, stopping at the first rejected one.
    ///
    /// Headers before the rejected one stay accepted.
    pub fn accept_headers(
        &mut self,
        headers: impl IntoIterator<Item = HeaderSummary>,
    ) -> Result<Option<u32>, PowError> {
        let mut last = None;
        for header in headers {
            last = Some(self.accept_header(header)?);
        }
        Ok(last)
    }
}
