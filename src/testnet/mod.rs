//! Test helpers
//!
//! In-memory ledgers with easy difficulty, a recording observer, and
//! signing shortcuts for unit tests.

pub mod test_utils;

pub use test_utils::*;
