//! On-demand query path: registry updates plus transaction and balance lookups.

use crate::blockchain::models::RecentTx;
use crate::blockchain::processor::{dedup_recent, filter_relevant};
use crate::db::AddressRepository;
use crate::models::{InfoResponse, SetAddressesResponse, Transaction};
use crate::state::AppState;
use futures::stream::{self, StreamExt};
use std::collections::{HashMap, HashSet};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Resolves every transaction the explorer lists for `addresses`, storing new detail.
/// Best effort: hashes that fail to resolve are left out, and a failed summary call
/// yields an empty list.
pub async fn perform_transaction_data_flow(state: &AppState, addresses: &[String]) -> Vec<Transaction> {
    if addresses.is_empty() {
        return Vec::new();
    }
    let started = Instant::now();

    let listed = match list_address_transactions(state, addresses).await {
        Some(listed) => listed,
        None => return Vec::new(),
    };

    let mut candidates = Vec::with_capacity(listed.len());
    for tx in dedup_recent(listed) {
        match tx.timestamp() {
            Ok(timestamp) => candidates.push((tx.hash, timestamp)),
            Err(e) => warn!("Skipping tx {}: {}", tx.hash, e),
        }
    }

    let mut resolved = Vec::with_capacity(candidates.len());
    for (hash, result) in state.resolver.resolve_many(candidates).await {
        match result {
            Ok(tx) => resolved.push(tx),
            Err(e) => warn!("Couldn't resolve tx {}: {}", hash, e),
        }
    }

    let requested: HashSet<String> = addresses.iter().cloned().collect();
    let mut transactions = filter_relevant(resolved, &requested);
    transactions.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then_with(|| a.hash.cmp(&b.hash)));

    debug!("Tx data flow for {} addresses took {:?}", addresses.len(), started.elapsed());
    transactions
}

async fn list_address_transactions(state: &AppState, addresses: &[String]) -> Option<Vec<RecentTx>> {
    // First call only counts, second asks for exactly that many transactions
    let total = match state.ledger.get_address_summary(addresses, 0).await {
        Ok(summary) => summary.total_tx_count().max(0) as usize,
        Err(e) => {
            warn!("Couldn't get total transaction count for {}: {}", addresses.join("|"), e);
            return None;
        }
    };
    if total == 0 {
        return Some(Vec::new());
    }

    match state.ledger.get_address_summary(addresses, total).await {
        Ok(summary) => Some(summary.txs),
        Err(e) => {
            warn!("Couldn't list transactions for {}: {}", addresses.join("|"), e);
            None
        }
    }
}

/// Current balance per address; a failed lookup maps to `None`.
pub async fn balances(state: &AppState, addresses: &[String]) -> HashMap<String, Option<f64>> {
    let started = Instant::now();

    let result: HashMap<String, Option<f64>> = stream::iter(addresses.iter().cloned())
        .map(|address| async move {
            let balance = match state.ledger.get_balance(&address).await {
                Ok(balance) => Some(balance),
                Err(e) => {
                    warn!("Couldn't get balance for addr {}: {}", address, e);
                    None
                }
            };
            (address, balance)
        })
        .buffer_unordered(state.config.fetch_concurrency.max(1))
        .collect()
        .await;

    debug!("Balance data for {} addresses took {:?}", addresses.len(), started.elapsed());
    result
}

/// Replaces the tracked registry with `addresses` and eagerly resolves their transactions.
pub async fn set_addresses(state: &AppState, addresses: &[String]) -> Result<SetAddressesResponse, sqlx::Error> {
    let keys_processed = state.store.replace_addresses(addresses).await?;
    info!("Tracked address registry replaced, size: {}", keys_processed);

    let transactions_processed = perform_transaction_data_flow(state, addresses).await.len();

    Ok(SetAddressesResponse {
        keys_processed,
        transactions_processed,
        status: "OK".to_string(),
    })
}

/// Transactions and balances for the whole registry.
pub async fn all_info(state: &AppState) -> Result<InfoResponse, sqlx::Error> {
    let addresses = state.store.list_addresses().await?;
    Ok(collect_info(state, &addresses).await)
}

/// Registers any unseen `addresses`, then reports on exactly those addresses.
pub async fn info(state: &AppState, addresses: &[String]) -> Result<InfoResponse, sqlx::Error> {
    for address in addresses {
        if state.store.add_address(address).await? {
            info!("Registered new tracked address {}", address);
        }
    }
    Ok(collect_info(state, addresses).await)
}

async fn collect_info(state: &AppState, addresses: &[String]) -> InfoResponse {
    let (txs, balance_map) = tokio::join!(
        perform_transaction_data_flow(state, addresses),
        balances(state, addresses)
    );
    InfoResponse {
        txs,
        balances: balance_map,
    }
}
