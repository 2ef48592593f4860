use crate::blockchain::client::{ClientError, LedgerClient};
use crate::blockchain::notifier::{BackendNotifier, ForwardOutcome};
use crate::blockchain::processor::{dedup_recent, merge_batch};
use crate::blockchain::resolver::TransactionResolver;
use crate::db::{AddressRepository, JournalRepository, TransactionRepository};
use crate::models::Transaction;
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Failed to fetch recent transactions: {0}")]
    Ledger(#[from] ClientError),

    #[error("Database error: {0}")]
    Storage(#[from] sqlx::Error),
}

/// Summary of one sync pass.
#[derive(Debug, Default)]
pub struct SyncReport {
    /// Distinct hashes returned by the poll.
    pub polled: usize,
    /// Hashes not yet in the journal.
    pub new: usize,
    /// New transactions touching a tracked address.
    pub relevant: usize,
    /// New hashes whose detail or timestamp could not be resolved.
    pub skipped: usize,
    /// Previously failed transactions included for resend.
    pub resent: usize,
    pub forward: Option<ForwardOutcome>,
}

/// Periodic orchestrator: poll, dedupe against the journal, resolve, filter, forward.
pub struct SyncEngine {
    ledger: Arc<dyn LedgerClient>,
    addresses: Arc<dyn AddressRepository>,
    journal: Arc<dyn JournalRepository>,
    transactions: Arc<dyn TransactionRepository>,
    resolver: Arc<TransactionResolver>,
    notifier: BackendNotifier,
    pass_lock: Mutex<()>,
}

impl SyncEngine {
    pub fn new(
        ledger: Arc<dyn LedgerClient>,
        addresses: Arc<dyn AddressRepository>,
        journal: Arc<dyn JournalRepository>,
        transactions: Arc<dyn TransactionRepository>,
        resolver: Arc<TransactionResolver>,
        notifier: BackendNotifier,
    ) -> Self {
        Self {
            ledger,
            addresses,
            journal,
            transactions,
            resolver,
            notifier,
            pass_lock: Mutex::new(()),
        }
    }

    /// Runs one pass. Overlapping calls wait for each other.
    ///
    /// A failure listing recent transactions aborts before anything is written. Once
    /// the poll succeeds, every polled hash is journaled whatever the forward outcome,
    /// including hashes whose detail failed to resolve. An empty poll writes nothing to
    /// the journal but still resends transactions awaiting delivery.
    pub async fn run_sync_pass(&self) -> Result<SyncReport, SyncError> {
        let _guard = self.pass_lock.lock().await;

        let tracked: HashSet<String> = self.addresses.list_addresses().await?.into_iter().collect();

        info!("Checking for new tx updates...");
        let recent = dedup_recent(self.ledger.list_recent_transactions().await?);
        if recent.is_empty() {
            debug!("Explorer returned no recent transactions");
        }

        let mut report = SyncReport {
            polled: recent.len(),
            ..SyncReport::default()
        };

        let mut candidates = Vec::new();
        for tx in &recent {
            if self.journal.is_journaled(&tx.hash).await? {
                continue;
            }
            match tx.timestamp() {
                Ok(timestamp) => candidates.push((tx.hash.clone(), timestamp)),
                Err(e) => {
                    warn!("Skipping tx {}: {}", tx.hash, e);
                    report.skipped += 1;
                }
            }
            report.new += 1;
        }

        let mut fresh: Vec<Transaction> = Vec::new();
        for (hash, result) in self.resolver.fetch_many(candidates).await {
            match result {
                Ok(resolved) if resolved.transaction.touches_any(&tracked) => {
                    info!("Transaction with hash {} includes a known address.", hash);
                    fresh.push(resolved.transaction);
                }
                Ok(_) => {
                    debug!("Transaction with hash {} does not include a known address.", hash);
                }
                Err(e) => {
                    warn!("Skipping tx {} for this pass: {}", hash, e);
                    report.skipped += 1;
                }
            }
        }
        report.relevant = fresh.len();

        if !fresh.is_empty() {
            // Stored as pending first so an interrupted forward is still resent
            let pending: Vec<Transaction> = fresh
                .iter()
                .cloned()
                .map(|mut tx| {
                    tx.processed = false;
                    tx
                })
                .collect();
            self.transactions.save_transactions(&pending).await?;
        }

        let failed = self.transactions.find_by_processed(false).await?;
        let (batch, resent) = merge_batch(fresh, failed);
        report.resent = resent;
        if resent > 0 {
            info!("Including previously failed updates, size: {}", resent);
        }

        let forward = if batch.is_empty() {
            Ok(None)
        } else {
            self.notifier.forward(batch).await.map(Some)
        };

        if !recent.is_empty() {
            let polled_hashes: Vec<String> = recent.iter().map(|tx| tx.hash.clone()).collect();
            self.journal.journal_hashes(&polled_hashes).await?;
            info!("Saved latest transaction hashes to tx update journal, size: {}", polled_hashes.len());
        }

        report.forward = forward?;

        info!(
            "Sync pass complete: polled={}, new={}, relevant={}, skipped={}, resent={}, delivered={:?}",
            report.polled,
            report.new,
            report.relevant,
            report.skipped,
            report.resent,
            report.forward.as_ref().map(ForwardOutcome::is_delivered)
        );

        Ok(report)
    }
}
