//! # Common Module
//! Constants shared by the retargeting algorithms and the chain index.

pub mod constants;
