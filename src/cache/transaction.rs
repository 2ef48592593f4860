//! Resolved-transaction cache implementation using Moka

use crate::models::Transaction;
use moka::future::Cache;
use std::time::Duration;
use tracing::debug;

/// Keeps recently resolved transactions keyed by hash, in front of the store.
#[derive(Clone)]
pub struct TransactionCacheManager {
    cache: Cache<String, Transaction>,
}

impl TransactionCacheManager {
    pub fn new(capacity: u64, ttl: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(capacity)
            .time_to_live(ttl)
            .build();

        Self { cache }
    }

    pub async fn get(&self, hash: &str) -> Option<Transaction> {
        let result = self.cache.get(hash).await;
        if result.is_some() {
            debug!("Cache hit for tx: {}", hash);
        }
        result
    }

    /// Only call with transactions that are already persisted.
    pub async fn insert(&self, transaction: Transaction) {
        debug!("Caching resolved tx: {}", transaction.hash);
        self.cache.insert(transaction.hash.clone(), transaction).await;
    }
}
