//! # Consensus-lib
//! Proof-of-work consensus primitives: the compact target codec, per-network
//! proof-of-work parameters, the read-only chain index contract, the
//! difficulty retargeting engine and the proof-of-work validator.
//!
//! Every routine here is a pure function of its inputs. Precondition
//! violations (an inconsistent chain index) panic; untrusted input is
//! reported through ordinary return values.

pub mod chain_index;
pub mod common;
pub mod compact;
pub mod difficulty;
pub mod params;
pub mod pow;

pub use chain_index::{BlockIndexArena, BlockRef, ChainIndexView};
pub use compact::{bits_to_target, decode_compact, target_to_bits, DecodedTarget};
pub use crypto_bigint::U256;
pub use difficulty::{get_next_work_required, DifficultyAlgorithm};
pub use params::ConsensusPowParams;
pub use pow::{calculate_work, check_proof_of_work};
