use crate::blockchain::client::{ClientError, LedgerClient};
use crate::blockchain::models::{DetailProblem, FormatError};
use crate::cache::TransactionCacheManager;
use crate::db::TransactionRepository;
use crate::models::Transaction;
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum ResolutionError {
    #[error("No detail available for transaction {0}")]
    NotFound(String),

    #[error("Malformed detail for transaction {hash}: {reason}")]
    Malformed { hash: String, reason: String },

    #[error("Ledger error: {0}")]
    Ledger(ClientError),

    #[error("Timestamp error: {0}")]
    Format(#[from] FormatError),

    #[error("Database error: {0}")]
    Storage(#[from] sqlx::Error),
}

/// A transaction together with whether it already exists in the store.
#[derive(Debug, Clone)]
pub struct Resolved {
    pub transaction: Transaction,
    pub stored: bool,
}

/// Cache-or-fetch resolution of transaction detail. Stored detail is never refetched.
pub struct TransactionResolver {
    ledger: Arc<dyn LedgerClient>,
    transactions: Arc<dyn TransactionRepository>,
    cache: TransactionCacheManager,
    concurrency: usize,
}

impl TransactionResolver {
    pub fn new(
        ledger: Arc<dyn LedgerClient>,
        transactions: Arc<dyn TransactionRepository>,
        cache: TransactionCacheManager,
        concurrency: usize,
    ) -> Self {
        Self {
            ledger,
            transactions,
            cache,
            concurrency: concurrency.max(1),
        }
    }

    /// Returns the stored transaction for `hash`, or fetches and decomposes it from the
    /// ledger without persisting. `timestamp` is only used for freshly fetched detail.
    pub async fn fetch(&self, hash: &str, timestamp: i64) -> Result<Resolved, ResolutionError> {
        if let Some(transaction) = self.cache.get(hash).await {
            return Ok(Resolved { transaction, stored: true });
        }

        if let Some(transaction) = self.transactions.find_transaction(hash).await? {
            self.cache.insert(transaction.clone()).await;
            return Ok(Resolved { transaction, stored: true });
        }

        debug!("Fetching detail for tx {}", hash);
        let detail = self
            .ledger
            .get_transaction_detail(hash)
            .await
            .map_err(|e| match e {
                ClientError::NoData(_) => ResolutionError::NotFound(hash.to_string()),
                ClientError::Decode(reason) => ResolutionError::Malformed {
                    hash: hash.to_string(),
                    reason,
                },
                other => ResolutionError::Ledger(other),
            })?;

        let transaction = detail
            .into_transaction(hash, timestamp)
            .map_err(|problem| ResolutionError::Malformed {
                hash: hash.to_string(),
                reason: match problem {
                    DetailProblem::MissingHash => "missing hash".to_string(),
                    DetailProblem::HashMismatch(other) => format!("detail is for {}", other),
                },
            })?;

        Ok(Resolved { transaction, stored: false })
    }

    /// `fetch`, then persist newly fetched detail as already delivered.
    pub async fn resolve(&self, hash: &str, timestamp: i64) -> Result<Transaction, ResolutionError> {
        let Resolved { transaction, stored } = self.fetch(hash, timestamp).await?;

        if !stored {
            self.transactions
                .save_transactions(std::slice::from_ref(&transaction))
                .await?;
            self.cache.insert(transaction.clone()).await;
        }

        Ok(transaction)
    }

    /// Fetches many hashes with bounded concurrency. Results come back in completion order.
    pub async fn fetch_many(
        &self,
        candidates: Vec<(String, i64)>,
    ) -> Vec<(String, Result<Resolved, ResolutionError>)> {
        stream::iter(candidates)
            .map(|(hash, timestamp)| async move {
                let result = self.fetch(&hash, timestamp).await;
                (hash, result)
            })
            .buffer_unordered(self.concurrency)
            .collect()
            .await
    }

    /// Resolves (and persists) many hashes with bounded concurrency.
    pub async fn resolve_many(
        &self,
        candidates: Vec<(String, i64)>,
    ) -> Vec<(String, Result<Transaction, ResolutionError>)> {
        stream::iter(candidates)
            .map(|(hash, timestamp)| async move {
                let result = self.resolve(&hash, timestamp).await;
                (hash, result)
            })
            .buffer_unordered(self.concurrency)
            .collect()
            .await
    }
}
