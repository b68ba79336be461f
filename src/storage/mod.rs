//! Pending transaction storage
//!
//! This module holds the in-memory pool of transactions awaiting the next block.

pub mod memory_pool;

pub use memory_pool::TransactionPool;
