pub mod address;
pub mod connection;
pub mod journal;
pub mod migration;
pub mod transaction;

use crate::models::Transaction;
use async_trait::async_trait;
use sqlx::SqlitePool;

/// Tracked address registry.
#[async_trait]
pub trait AddressRepository: Send + Sync {
    async fn list_addresses(&self) -> Result<Vec<String>, sqlx::Error>;
    async fn is_tracked(&self, address: &str) -> Result<bool, sqlx::Error>;
    /// Returns `true` when the address was not tracked before.
    async fn add_address(&self, address: &str) -> Result<bool, sqlx::Error>;
    /// Deletes every tracked address and stores `addresses` in their place.
    async fn replace_addresses(&self, addresses: &[String]) -> Result<usize, sqlx::Error>;
}

/// Hashes already scanned by a sync pass.
#[async_trait]
pub trait JournalRepository: Send + Sync {
    async fn is_journaled(&self, hash: &str) -> Result<bool, sqlx::Error>;
    async fn journal_hashes(&self, hashes: &[String]) -> Result<(), sqlx::Error>;
}

/// Resolved transactions with their senders and recipients.
#[async_trait]
pub trait TransactionRepository: Send + Sync {
    async fn find_transaction(&self, hash: &str) -> Result<Option<Transaction>, sqlx::Error>;
    /// Inserts unknown hashes with their detail; for known hashes only `processed` is updated.
    async fn save_transactions(&self, transactions: &[Transaction]) -> Result<(), sqlx::Error>;
    async fn find_by_processed(&self, processed: bool) -> Result<Vec<Transaction>, sqlx::Error>;
}

/// SQLite-backed implementation of every repository.
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl AddressRepository for SqliteStore {
    async fn list_addresses(&self) -> Result<Vec<String>, sqlx::Error> {
        address::get_all_tracked_addresses(&self.pool).await
    }

    async fn is_tracked(&self, addr: &str) -> Result<bool, sqlx::Error> {
        address::is_address_tracked(&self.pool, addr).await
    }

    async fn add_address(&self, addr: &str) -> Result<bool, sqlx::Error> {
        address::add_address(&self.pool, addr).await
    }

    async fn replace_addresses(&self, addresses: &[String]) -> Result<usize, sqlx::Error> {
        address::replace_addresses(&self.pool, addresses).await
    }
}

#[async_trait]
impl JournalRepository for SqliteStore {
    async fn is_journaled(&self, hash: &str) -> Result<bool, sqlx::Error> {
        journal::is_journaled(&self.pool, hash).await
    }

    async fn journal_hashes(&self, hashes: &[String]) -> Result<(), sqlx::Error> {
        journal::journal_hashes(&self.pool, hashes).await
    }
}

#[async_trait]
impl TransactionRepository for SqliteStore {
    async fn find_transaction(&self, hash: &str) -> Result<Option<Transaction>, sqlx::Error> {
        transaction::find_transaction(&self.pool, hash).await
    }

    async fn save_transactions(&self, transactions: &[Transaction]) -> Result<(), sqlx::Error> {
        transaction::save_transactions(&self.pool, transactions).await
    }

    async fn find_by_processed(&self, processed: bool) -> Result<Vec<Transaction>, sqlx::Error> {
        transaction::find_by_processed(&self.pool, processed).await
    }
}
