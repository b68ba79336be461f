use crate::core::{Block, Transaction};
use crate::utils::{canonical_encode, hash_record, sha256_digest};
use data_encoding::HEXLOWER;
use log::debug;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cooperative cancellation signal for a running nonce search
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> CancellationToken {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

/// How a nonce search ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowOutcome {
    Found(u64),
    Cancelled { attempts: u64 },
    Exhausted { attempts: u64 },
}

pub struct ProofOfWork {
    difficulty: usize,
    max_attempts: Option<u64>,
}

impl ProofOfWork {
    pub fn new(difficulty: usize) -> ProofOfWork {
        ProofOfWork {
            difficulty,
            max_attempts: None,
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: Option<u64>) -> ProofOfWork {
        self.max_attempts = max_attempts;
        self
    }

    /// The timestamp-free view of a block that proof-of-work is computed over
    pub fn candidate_record(transactions: &[Transaction], previous_hash: &str, nonce: u64) -> Value {
        let transactions: Vec<Value> = transactions.iter().map(Transaction::to_record).collect();
        json!({
            "transactions": transactions,
            "nonce": nonce,
            "previous_hash": previous_hash,
        })
    }

    pub fn valid_proof(
        transactions: &[Transaction],
        previous_hash: &str,
        nonce: u64,
        difficulty: usize,
    ) -> bool {
        let guess = hash_record(&Self::candidate_record(transactions, previous_hash, nonce));
        meets_difficulty(&guess, difficulty)
    }

    /// Check a sealed block's nonce against this difficulty
    pub fn validate(&self, block: &Block) -> bool {
        Self::valid_proof(
            block.get_transactions(),
            block.get_previous_hash(),
            block.get_nonce(),
            self.difficulty,
        )
    }

    /// Try nonces 0, 1, 2, ... until one satisfies `valid_proof`, the token is
    /// cancelled, or the attempt bound runs out.
    pub fn search(
        &self,
        transactions: &[Transaction],
        previous_hash: &str,
        cancel: &CancellationToken,
    ) -> PowOutcome {
        // "nonce" sorts ahead of the other candidate keys, so every candidate is
        // the nonce field followed by the same remainder.
        let records: Vec<Value> = transactions.iter().map(Transaction::to_record).collect();
        let remainder = canonical_encode(&json!({
            "transactions": records,
            "previous_hash": previous_hash,
        }));
        let remainder = &remainder[1..];

        debug!(
            "Searching for nonce over {} transactions (difficulty {})",
            transactions.len(),
            self.difficulty
        );

        let mut nonce: u64 = 0;
        loop {
            if cancel.is_cancelled() {
                return PowOutcome::Cancelled { attempts: nonce };
            }
            if self.max_attempts.is_some_and(|max| nonce >= max) {
                return PowOutcome::Exhausted { attempts: nonce };
            }

            let candidate = format!("{{\"nonce\": {nonce}, {remainder}");
            let guess = HEXLOWER.encode(&sha256_digest(candidate.as_bytes()));
            if meets_difficulty(&guess, self.difficulty) {
                debug!("Found nonce {nonce}: {guess}");
                return PowOutcome::Found(nonce);
            }

            nonce = match nonce.checked_add(1) {
                Some(next) => next,
                None => return PowOutcome::Exhausted { attempts: u64::MAX },
            };
        }
    }
}

fn meets_difficulty(hash: &str, difficulty: usize) -> bool {
    difficulty <= hash.len() && hash.bytes().take(difficulty).all(|b| b == b'0')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_transactions() -> Vec<Transaction> {
        vec![
            Transaction::new("A", "B", 1.0).unwrap(),
            Transaction::new("THE BLOCKCHAIN", "miner", 1.0).unwrap(),
        ]
    }

    #[test]
    fn test_candidate_excludes_timestamp() {
        let record = ProofOfWork::candidate_record(&[], "prev", 3);
        assert_eq!(
            canonical_encode(&record),
            r#"{"nonce": 3, "previous_hash": "prev", "transactions": []}"#
        );
    }

    #[test]
    fn test_search_agrees_with_valid_proof() {
        let txs = sample_transactions();
        let pow = ProofOfWork::new(2);
        let nonce = match pow.search(&txs, "prev", &CancellationToken::new()) {
            PowOutcome::Found(nonce) => nonce,
            other => panic!("unexpected outcome {other:?}"),
        };

        assert!(ProofOfWork::valid_proof(&txs, "prev", nonce, 2));
        for smaller in 0..nonce {
            assert!(!ProofOfWork::valid_proof(&txs, "prev", smaller, 2));
        }
    }

    #[test]
    fn test_search_is_repeatable() {
        let txs = sample_transactions();
        let pow = ProofOfWork::new(2);
        let token = CancellationToken::new();
        assert_eq!(pow.search(&txs, "p", &token), pow.search(&txs, "p", &token));
    }

    #[test]
    fn test_zero_difficulty_accepts_first_nonce() {
        let pow = ProofOfWork::new(0);
        assert_eq!(
            pow.search(&[], "p", &CancellationToken::new()),
            PowOutcome::Found(0)
        );
    }

    #[test]
    fn test_cancelled_search_stops() {
        let token = CancellationToken::new();
        token.cancel();
        let pow = ProofOfWork::new(64);
        assert_eq!(
            pow.search(&[], "p", &token),
            PowOutcome::Cancelled { attempts: 0 }
        );
    }

    #[test]
    fn test_bounded_search_exhausts() {
        let pow = ProofOfWork::new(64).with_max_attempts(Some(50));
        assert_eq!(
            pow.search(&[], "p", &CancellationToken::new()),
            PowOutcome::Exhausted { attempts: 50 }
        );
    }

    #[test]
    fn test_difficulty_prefix() {
        assert!(meets_difficulty("000abc", 3));
        assert!(!meets_difficulty("00abc0", 3));
        assert!(meets_difficulty("abc", 0));
        assert!(!meets_difficulty("00", 3));
    }

    #[test]
    fn test_validate_sealed_block() {
        let txs = sample_transactions();
        let pow = ProofOfWork::new(1);
        let PowOutcome::Found(nonce) = pow.search(&txs, "prev", &CancellationToken::new()) else {
            panic!("search should succeed at difficulty 1");
        };
        let block = Block::with_timestamp(5.0, txs, nonce, "prev".to_string());
        assert!(pow.validate(&block));
    }
}
