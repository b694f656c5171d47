//! Branch novelty oracle for a taint-guided hybrid fuzzer
//!
//! The instrumented target reports each conditional branch it executes to a
//! [`CoverageMap`], which answers whether that branch is worth handing to the
//! solver. The map state that matters across runs is kept in a small file that
//! any number of fuzzer processes can share.

pub mod misc;
pub mod err;
pub mod persist;
pub mod coverage;
pub mod trace;
pub mod stats;
pub mod config;

pub use coverage::{hash_pc, is_power_of_two_or_zero, CoverageMap, MAP_SIZE};
pub use err::BitmapErr;
