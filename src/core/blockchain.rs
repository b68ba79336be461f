// This is the ledger engine - it owns the chain and the pending transaction pool
// Every mutation goes through the state write lock, so a pool snapshot taken for
// proof-of-work can't be changed underneath a seal, and readers never see a
// half-appended block.

use crate::config::LedgerConfig;
use crate::core::{
    Block, CancellationToken, LedgerObserver, LogObserver, PowOutcome, ProofOfWork, Transaction,
};
use crate::error::{LedgerError, Result};
use crate::storage::TransactionPool;
use crate::wallet;
use log::debug;
use std::sync::{Arc, Mutex, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

struct ChainState {
    chain: Vec<Block>,
    pool: TransactionPool,
}

impl ChainState {
    fn tip_hash(&self) -> String {
        self.chain
            .last()
            .map(Block::hash)
            .unwrap_or_else(Block::genesis_previous_hash)
    }

    fn total_amount(&self, address: &str) -> f64 {
        let mut total_amount = 0.0;
        for block in &self.chain {
            for transaction in block.get_transactions() {
                let value = transaction.get_value();
                if transaction.get_recipient() == address {
                    total_amount += value;
                }
                if transaction.get_sender() == address {
                    total_amount -= value;
                }
            }
        }
        total_amount
    }

    // The block takes its own copy of the pool, which is then emptied
    fn seal(&mut self, nonce: u64, previous_hash: String) -> Result<Block> {
        let block = Block::new_block(self.pool.snapshot(), nonce, previous_hash)?;
        self.chain.push(block.clone());
        self.pool.clear();
        Ok(block)
    }
}

pub struct Blockchain {
    state: RwLock<ChainState>,
    // Only one nonce search runs at a time
    mining_lock: Mutex<()>,
    config: LedgerConfig,
    observer: Arc<dyn LedgerObserver>,
}

impl Blockchain {
    /// Create a ledger holding only the genesis block, reporting events to the log
    pub fn new(config: LedgerConfig) -> Result<Blockchain> {
        Self::with_observer(config, Arc::new(LogObserver))
    }

    pub fn with_observer(
        config: LedgerConfig,
        observer: Arc<dyn LedgerObserver>,
    ) -> Result<Blockchain> {
        config.validate()?;
        let blockchain = Blockchain {
            state: RwLock::new(ChainState {
                chain: Vec::new(),
                pool: TransactionPool::new(),
            }),
            mining_lock: Mutex::new(()),
            config,
            observer,
        };
        blockchain.create_block(0, Block::genesis_previous_hash())?;
        Ok(blockchain)
    }

    // Blocks are only published whole, so a poisoned lock still guards consistent state
    fn read_state(&self) -> RwLockReadGuard<'_, ChainState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, ChainState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn get_config(&self) -> &LedgerConfig {
        &self.config
    }

    /// Seal the whole pool into a new block and empty the pool.
    /// The nonce is not checked here; callers verify it with `valid_proof` first.
    pub fn create_block(&self, nonce: u64, previous_hash: String) -> Result<Block> {
        let mut state = self.write_state();
        state.seal(nonce, previous_hash)
    }

    /// Admit a transaction, returning whether it was accepted.
    ///
    /// Rewards from the mining sentinel go straight in. Everything else needs a
    /// public key and signature that verify against the transaction. Malformed
    /// input is reported to the observer and counts as a rejection.
    pub fn add_transaction(
        &self,
        sender: &str,
        recipient: &str,
        value: f64,
        sender_public_key: Option<&str>,
        signature: Option<&str>,
    ) -> bool {
        match self.try_add_transaction(sender, recipient, value, sender_public_key, signature) {
            Ok(admitted) => admitted,
            Err(e) => {
                self.observer
                    .on_transaction_rejected(sender, recipient, &e.to_string());
                false
            }
        }
    }

    /// Like `add_transaction`, but malformed hex keys or signatures and invalid
    /// values come back as errors instead of a plain `false`.
    pub fn try_add_transaction(
        &self,
        sender: &str,
        recipient: &str,
        value: f64,
        sender_public_key: Option<&str>,
        signature: Option<&str>,
    ) -> Result<bool> {
        let transaction = Transaction::new(sender, recipient, value)?;

        if transaction.is_reward() {
            self.write_state().pool.append(transaction.clone());
            self.observer.on_transaction_admitted(&transaction);
            return Ok(true);
        }

        let (Some(public_key), Some(signature)) = (sender_public_key, signature) else {
            self.observer
                .on_transaction_rejected(sender, recipient, "missing public key or signature");
            return Ok(false);
        };

        if !wallet::verify(public_key, signature, &transaction)? {
            self.observer
                .on_transaction_rejected(sender, recipient, "signature does not verify");
            return Ok(false);
        }

        {
            let mut state = self.write_state();
            if self.config.enforce_balance {
                let available = state.total_amount(sender);
                if available < value {
                    drop(state);
                    self.observer.on_transaction_rejected(
                        sender,
                        recipient,
                        &format!("insufficient funds: required {value}, available {available}"),
                    );
                    return Ok(false);
                }
            }
            state.pool.append(transaction.clone());
        }

        self.observer.on_transaction_admitted(&transaction);
        Ok(true)
    }

    /// Proof check at the configured difficulty
    pub fn valid_proof(&self, transactions: &[Transaction], previous_hash: &str, nonce: u64) -> bool {
        ProofOfWork::valid_proof(transactions, previous_hash, nonce, self.config.difficulty)
    }

    fn proof_of_work_engine(&self) -> ProofOfWork {
        ProofOfWork::new(self.config.difficulty).with_max_attempts(self.config.max_attempts)
    }

    /// Find the first nonce that proves the current pool against the current tip
    pub fn proof_of_work(&self) -> Result<u64> {
        let (transactions, previous_hash) = {
            let state = self.read_state();
            (state.pool.snapshot(), state.tip_hash())
        };

        match self
            .proof_of_work_engine()
            .search(&transactions, &previous_hash, &CancellationToken::new())
        {
            PowOutcome::Found(nonce) => Ok(nonce),
            PowOutcome::Exhausted { attempts } => Err(LedgerError::SearchExhausted { attempts }),
            PowOutcome::Cancelled { .. } => Err(LedgerError::MiningCancelled),
        }
    }

    /// Mine one block paying the configured reward; returns `true` once sealed
    pub fn mining(&self) -> Result<bool> {
        self.mine_with(&CancellationToken::new()).map(|_| true)
    }

    /// Mine one block, giving up when `cancel` fires or the attempt bound is hit.
    ///
    /// The first search runs without holding the state lock. Before sealing, the pool
    /// and tip are compared with what was searched. If either moved, one more search
    /// runs while holding the state lock, so admissions wait until the block is sealed.
    /// `max_attempts` covers both searches together. The reward joins the pool only
    /// at seal time, so an abandoned attempt leaves the pool as it found it.
    pub fn mine_with(&self, cancel: &CancellationToken) -> Result<Block> {
        self.mine_inner(cancel, || {})
    }

    // `after_unlocked_search` runs between the lock-free search and re-validation
    fn mine_inner<F>(&self, cancel: &CancellationToken, after_unlocked_search: F) -> Result<Block>
    where
        F: Fn(),
    {
        let miner = self
            .config
            .miner_address
            .as_deref()
            .ok_or(LedgerError::MissingMiningAddress)?;
        let reward = Transaction::new_reward(miner, self.config.mining_reward)?;

        let _mining = self.mining_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let (pending, previous_hash) = {
            let state = self.read_state();
            (state.pool.snapshot(), state.tip_hash())
        };
        let (nonce, spent) = self.search_with_reward(
            &pending,
            &previous_hash,
            &reward,
            self.config.max_attempts,
            0,
            cancel,
        )?;
        after_unlocked_search();

        let block = {
            let mut state = self.write_state();
            let unchanged =
                state.pool.as_slice() == pending.as_slice() && state.tip_hash() == previous_hash;
            let (nonce, previous_hash) = if unchanged {
                (nonce, previous_hash)
            } else {
                debug!("Pool or tip changed during proof-of-work, searching again under lock");
                let pending = state.pool.snapshot();
                let previous_hash = state.tip_hash();
                let budget = self
                    .config
                    .max_attempts
                    .map(|max| max.saturating_sub(spent));
                let (nonce, _) = self.search_with_reward(
                    &pending,
                    &previous_hash,
                    &reward,
                    budget,
                    spent,
                    cancel,
                )?;
                (nonce, previous_hash)
            };
            state.pool.append(reward.clone());
            state.seal(nonce, previous_hash)?
        };

        self.observer.on_transaction_admitted(&reward);
        self.observer.on_block_mined(&block);
        Ok(block)
    }

    /// Search over `pending` followed by `reward`, returning the nonce and the attempts
    /// it took. `spent` is added to the attempt count reported on exhaustion.
    fn search_with_reward(
        &self,
        pending: &[Transaction],
        previous_hash: &str,
        reward: &Transaction,
        budget: Option<u64>,
        spent: u64,
        cancel: &CancellationToken,
    ) -> Result<(u64, u64)> {
        let mut candidate = pending.to_vec();
        candidate.push(reward.clone());

        let pow = ProofOfWork::new(self.config.difficulty).with_max_attempts(budget);
        match pow.search(&candidate, previous_hash, cancel) {
            PowOutcome::Found(nonce) => Ok((nonce, nonce.saturating_add(1))),
            PowOutcome::Cancelled { attempts } => {
                debug!(
                    "Mining cancelled after {} attempts",
                    spent.saturating_add(attempts)
                );
                Err(LedgerError::MiningCancelled)
            }
            PowOutcome::Exhausted { attempts } => Err(LedgerError::SearchExhausted {
                attempts: spent.saturating_add(attempts),
            }),
        }
    }

    /// Net value received by `address` across the whole chain
    pub fn calculate_total_amount(&self, address: &str) -> f64 {
        self.read_state().total_amount(address)
    }

    pub fn get_chain(&self) -> Vec<Block> {
        self.read_state().chain.clone()
    }

    pub fn chain_length(&self) -> usize {
        self.read_state().chain.len()
    }

    pub fn last_block(&self) -> Option<Block> {
        self.read_state().chain.last().cloned()
    }

    pub fn get_pending_transactions(&self) -> Vec<Transaction> {
        self.read_state().pool.snapshot()
    }

    /// Re-check linkage and proof-of-work of every block after genesis
    pub fn is_valid_chain(&self) -> bool {
        let state = self.read_state();
        let pow = ProofOfWork::new(self.config.difficulty);

        let Some(genesis) = state.chain.first() else {
            return false;
        };
        if genesis.get_previous_hash() != Block::genesis_previous_hash() {
            return false;
        }

        state.chain.windows(2).all(|pair| {
            pair[1].get_previous_hash() == pair[0].hash() && pow.validate(&pair[1])
        })
    }
}
