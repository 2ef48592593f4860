//! Shared fixtures: in-memory store, scripted explorer and backend doubles.

use crate::{
    blockchain::{
        client::{ClientError, LedgerClient},
        models::{AddressInfo, AddressSummary, RecentTx, TxDetail, TxEntry},
        notifier::{BackendTarget, DeliveryError},
    },
    config::Config,
    db::{connection, SqliteStore},
    models::Transaction,
    state::AppState,
};
use async_trait::async_trait;
use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

// Checksummed explorer addresses
pub const ADDR_A: &str = "8LDw7vt9ixFuWwAnKKdDJ3ggsSTLxMJyoM";
pub const ADDR_B: &str = "8MBM9RJ3TqroKqTSBUqresMfKCGzwo2pus";
pub const ADDR_C: &str = "8GMKYA7Euojmbzwaey8nT3mTWQMf22yYbe";
pub const ADDR_D: &str = "8WxruNGD4ieYwfZsTnNkSRPJtRxSRWeGiS";

pub const TIME_1: &str = "2017-06-01T12:30:15Z";
pub const TIME_1_MS: i64 = 1_496_320_215_000;
pub const TIME_2: &str = "2017-06-02T08:00Z";

pub fn recent(hash: &str, time_utc: &str) -> RecentTx {
    RecentTx {
        hash: hash.to_string(),
        confirmations: 1,
        total: None,
        time_utc: time_utc.to_string(),
    }
}

fn entries(side: &[(&str, f64)]) -> Vec<TxEntry> {
    side.iter()
        .map(|(addr, amount)| TxEntry {
            addr: Some(addr.to_string()),
            amount: *amount,
        })
        .collect()
}

pub fn detail(hash: &str, vin: &[(&str, f64)], vout: &[(&str, f64)]) -> TxDetail {
    TxDetail {
        hash: Some(hash.to_string()),
        vin: entries(vin),
        vout: entries(vout),
    }
}

/// Explorer double answering from scripted data and counting detail lookups.
#[derive(Default)]
pub struct MockLedger {
    recent: Mutex<Vec<RecentTx>>,
    fail_recent: AtomicBool,
    details: Mutex<HashMap<String, TxDetail>>,
    detail_calls: Mutex<HashMap<String, usize>>,
    balances: Mutex<HashMap<String, f64>>,
    summary: Mutex<Vec<(AddressInfo, Vec<RecentTx>)>>,
    fail_summary: AtomicBool,
}

impl MockLedger {
    pub fn set_recent(&self, recent: Vec<RecentTx>) {
        *self.recent.lock().unwrap() = recent;
    }

    pub fn fail_recent(&self, fail: bool) {
        self.fail_recent.store(fail, Ordering::SeqCst);
    }

    pub fn add_detail(&self, detail: TxDetail) {
        let hash = detail.hash.clone().unwrap_or_default();
        self.serve_detail(&hash, detail);
    }

    /// Answers detail lookups for `hash` with `detail`, whatever hash it carries.
    pub fn serve_detail(&self, hash: &str, detail: TxDetail) {
        self.details.lock().unwrap().insert(hash.to_string(), detail);
    }

    pub fn detail_calls(&self, hash: &str) -> usize {
        self.detail_calls.lock().unwrap().get(hash).copied().unwrap_or(0)
    }

    pub fn fail_summary(&self, fail: bool) {
        self.fail_summary.store(fail, Ordering::SeqCst);
    }

    pub fn set_balance(&self, address: &str, balance: f64) {
        self.balances.lock().unwrap().insert(address.to_string(), balance);
    }

    /// Lists `txs` under `address` in multiaddr responses. The explorer may list
    /// transactions whose detail never mentions the address.
    pub fn set_address_txs(&self, address: &str, txs: Vec<RecentTx>) {
        let info = AddressInfo {
            address: address.to_string(),
            total_sent: 0,
            total_received: 0,
            final_balance: 0,
            n_tx: txs.len() as i64,
        };
        let mut summary = self.summary.lock().unwrap();
        summary.retain(|(existing, _)| existing.address != address);
        summary.push((info, txs));
    }
}

#[async_trait]
impl LedgerClient for MockLedger {
    async fn list_recent_transactions(&self) -> Result<Vec<RecentTx>, ClientError> {
        if self.fail_recent.load(Ordering::SeqCst) {
            return Err(ClientError::Status {
                status: 503,
                body: "unavailable".to_string(),
            });
        }
        Ok(self.recent.lock().unwrap().clone())
    }

    async fn get_transaction_detail(&self, hash: &str) -> Result<TxDetail, ClientError> {
        *self
            .detail_calls
            .lock()
            .unwrap()
            .entry(hash.to_string())
            .or_insert(0) += 1;

        self.details
            .lock()
            .unwrap()
            .get(hash)
            .cloned()
            .ok_or_else(|| ClientError::NoData(hash.to_string()))
    }

    async fn get_balance(&self, address: &str) -> Result<f64, ClientError> {
        self.balances
            .lock()
            .unwrap()
            .get(address)
            .copied()
            .ok_or_else(|| ClientError::Status {
                status: 500,
                body: format!("unknown address {}", address),
            })
    }

    async fn get_address_summary(
        &self,
        addresses: &[String],
        tx_limit: usize,
    ) -> Result<AddressSummary, ClientError> {
        if self.fail_summary.load(Ordering::SeqCst) {
            return Err(ClientError::Status {
                status: 502,
                body: "multiaddr unavailable".to_string(),
            });
        }
        let summary = self.summary.lock().unwrap();
        let matching: Vec<&(AddressInfo, Vec<RecentTx>)> = summary
            .iter()
            .filter(|(info, _)| addresses.contains(&info.address))
            .collect();

        Ok(AddressSummary {
            addresses: matching.iter().map(|(info, _)| info.clone()).collect(),
            txs: matching
                .iter()
                .flat_map(|(_, txs)| txs.iter().cloned())
                .take(tx_limit)
                .collect(),
        })
    }
}

/// Backend double failing the first `failures` attempts and recording what it accepted.
pub struct MockBackend {
    failures: usize,
    attempts: AtomicUsize,
    delivered: Mutex<Vec<Vec<String>>>,
}

impl MockBackend {
    pub fn accepting() -> Self {
        Self::failing_times(0)
    }

    pub fn failing_times(failures: usize) -> Self {
        Self {
            failures,
            attempts: AtomicUsize::new(0),
            delivered: Mutex::new(Vec::new()),
        }
    }

    pub fn rejecting() -> Self {
        Self::failing_times(usize::MAX)
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    /// Hashes of every accepted batch, in delivery order.
    pub fn delivered(&self) -> Vec<Vec<String>> {
        self.delivered.lock().unwrap().clone()
    }
}

#[async_trait]
impl BackendTarget for MockBackend {
    async fn send(&self, batch: &[Transaction]) -> Result<(), DeliveryError> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst);
        if attempt < self.failures {
            return Err(DeliveryError::Rejected {
                status: 500,
                body: format!("attempt {} refused", attempt + 1),
            });
        }

        let mut hashes: Vec<String> = batch.iter().map(|tx| tx.hash.clone()).collect();
        hashes.sort();
        self.delivered.lock().unwrap().push(hashes);
        Ok(())
    }
}

pub fn test_config() -> Config {
    let mut config = Config::from_env();
    config.forward_max_attempts = 3;
    config.forward_retry_delay = Duration::from_millis(1);
    config.fetch_concurrency = 4;
    config.cache_ttl = Duration::from_secs(60);
    config.cache_max_capacity = 100;
    config
}

pub async fn test_store() -> Arc<SqliteStore> {
    let pool = connection::establish_in_memory()
        .await
        .expect("Failed to open in-memory database");
    Arc::new(SqliteStore::new(pool))
}

pub struct Harness {
    pub state: Arc<AppState>,
    pub store: Arc<SqliteStore>,
    pub ledger: Arc<MockLedger>,
    pub backend: Arc<MockBackend>,
}

pub async fn harness(backend: MockBackend) -> Harness {
    let store = test_store().await;
    let ledger = Arc::new(MockLedger::default());
    let backend = Arc::new(backend);
    let state = Arc::new(AppState::new(
        test_config(),
        store.clone(),
        ledger.clone(),
        backend.clone(),
    ));

    Harness {
        state,
        store,
        ledger,
        backend,
    }
}
