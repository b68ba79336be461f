//! Service adapter
//!
//! Exposes the ledger's client surface (submit transaction, mine, read chain,
//! read balance) as status-coded responses, and serves them over TCP.

pub mod handlers;
pub mod server;

pub use handlers::{LedgerService, Request, Response, TransactionRequest};
pub use server::Server;
