use crate::core::{Block, Blockchain};
use crate::error::LedgerError;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;

pub const STATUS_OK: u16 = 200;
pub const STATUS_CREATED: u16 = 201;
pub const STATUS_BAD_REQUEST: u16 = 400;
pub const STATUS_NOT_ACCEPTABLE: u16 = 406;
pub const STATUS_INTERNAL_ERROR: u16 = 500;

/// A transfer submitted by a client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionRequest {
    pub sender_blockchain_address: String,
    pub recipient_blockchain_address: String,
    pub value: f64,
    #[serde(default)]
    pub sender_public_key: Option<String>,
    #[serde(default)]
    pub signature: Option<String>,
}

/// Operations the service exposes
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Request {
    PostTransaction(TransactionRequest),
    PostMine,
    GetChain,
    GetBalance { address: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub status: u16,
    pub body: Value,
}

impl Response {
    fn new(status: u16, body: Value) -> Response {
        Response { status, body }
    }

    fn error(status: u16, err: &LedgerError) -> Response {
        Response::new(status, json!({ "message": err.to_string() }))
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[derive(Debug, Serialize)]
struct ChainBody<'a> {
    length: usize,
    chain: &'a [Block],
}

/// Maps ledger operations onto status-coded request/response values
#[derive(Clone)]
pub struct LedgerService {
    blockchain: Arc<Blockchain>,
}

impl LedgerService {
    pub fn new(blockchain: Arc<Blockchain>) -> LedgerService {
        LedgerService { blockchain }
    }

    pub fn handle(&self, request: &Request) -> Response {
        match request {
            Request::PostTransaction(tx) => self.post_transaction(tx),
            Request::PostMine => self.post_mine(),
            Request::GetChain => self.get_chain(),
            Request::GetBalance { address } => self.get_balance(address),
        }
    }

    pub fn post_transaction(&self, request: &TransactionRequest) -> Response {
        let result = self.blockchain.try_add_transaction(
            &request.sender_blockchain_address,
            &request.recipient_blockchain_address,
            request.value,
            request.sender_public_key.as_deref(),
            request.signature.as_deref(),
        );
        match result {
            Ok(true) => Response::new(STATUS_CREATED, json!({ "message": "success" })),
            Ok(false) => Response::new(STATUS_NOT_ACCEPTABLE, json!({ "message": "fail" })),
            Err(e) => Response::error(STATUS_BAD_REQUEST, &e),
        }
    }

    pub fn post_mine(&self) -> Response {
        match self.blockchain.mining() {
            Ok(_) => Response::new(STATUS_OK, json!({ "message": "success" })),
            Err(e) => Response::error(STATUS_INTERNAL_ERROR, &e),
        }
    }

    pub fn get_chain(&self) -> Response {
        let chain = self.blockchain.get_chain();
        let body = ChainBody {
            length: chain.len(),
            chain: &chain,
        };
        match serde_json::to_value(&body) {
            Ok(body) => Response::new(STATUS_OK, body),
            Err(e) => Response::error(STATUS_INTERNAL_ERROR, &LedgerError::from(e)),
        }
    }

    pub fn get_balance(&self, address: &str) -> Response {
        let amount = self.blockchain.calculate_total_amount(address);
        Response::new(STATUS_OK, json!({ "amount": amount }))
    }
}
