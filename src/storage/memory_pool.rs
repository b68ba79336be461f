use crate::core::Transaction;

/// Ordered buffer of transactions waiting for the next block.
///
/// No validation happens here; the ledger decides what gets in and guards
/// the pool with its own lock.
#[derive(Debug, Default, Clone)]
pub struct TransactionPool {
    inner: Vec<Transaction>,
}

impl TransactionPool {
    pub fn new() -> TransactionPool {
        Self::default()
    }

    pub fn append(&mut self, tx: Transaction) {
        self.inner.push(tx);
    }

    /// Ordered copy of the pending transactions
    pub fn snapshot(&self) -> Vec<Transaction> {
        self.inner.clone()
    }

    pub fn clear(&mut self) {
        self.inner.clear();
    }

    pub fn as_slice(&self) -> &[Transaction] {
        self.inner.as_slice()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tx(value: f64) -> Transaction {
        Transaction::new("A", "B", value).unwrap()
    }

    #[test]
    fn test_append_keeps_order() {
        let mut pool = TransactionPool::new();
        pool.append(tx(1.0));
        pool.append(tx(2.0));
        pool.append(tx(3.0));

        let values: Vec<f64> = pool.snapshot().iter().map(|t| t.get_value()).collect();
        assert_eq!(values, vec![1.0, 2.0, 3.0]);
        assert_eq!(pool.len(), 3);
    }

    #[test]
    fn test_snapshot_is_detached() {
        let mut pool = TransactionPool::new();
        pool.append(tx(1.0));
        let snapshot = pool.snapshot();

        pool.append(tx(2.0));
        pool.clear();

        assert_eq!(snapshot.len(), 1);
        assert!(pool.is_empty());
    }
}
