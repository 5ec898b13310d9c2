//! # Retarget Core
//!
//! Node-side glue around [`consensus_lib`]: configuration of the active
//! network, logging, error types and contextual header acceptance that drives
//! the difficulty engine.

pub mod config;
pub mod errors;
pub mod header_chain;
pub mod utils;

pub use consensus_lib;
