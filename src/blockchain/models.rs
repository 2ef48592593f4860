//! Explorer wire types and their conversion into domain records.

use crate::models::{Participant, Transaction};
use chrono::NaiveDateTime;
use serde::Deserialize;
use thiserror::Error;

/// Accepted `time_utc` layouts, tried in order.
pub const EXPLORER_DATE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%SZ", "%Y-%m-%dT%H:%MZ"];

#[derive(Error, Debug, Clone, PartialEq)]
#[error("Unparseable date: \"{value}\". Supported formats: {formats:?}")]
pub struct FormatError {
    pub value: String,
    pub formats: [&'static str; 2],
}

/// Parses an explorer UTC timestamp into epoch milliseconds.
pub fn parse_explorer_timestamp(value: &str) -> Result<i64, FormatError> {
    EXPLORER_DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value.trim(), format).ok())
        .map(|parsed| parsed.and_utc().timestamp_millis())
        .ok_or_else(|| FormatError {
            value: value.to_string(),
            formats: EXPLORER_DATE_FORMATS,
        })
}

/// One entry of the "lasttxs" feed.
#[derive(Debug, Clone, Deserialize)]
pub struct RecentTx {
    pub hash: String,
    #[serde(default)]
    pub confirmations: i64,
    /// Approximate value moved, as reported by the explorer.
    #[serde(default, alias = "change")]
    pub total: Option<f64>,
    #[serde(alias = "time")]
    pub time_utc: String,
}

impl RecentTx {
    pub fn timestamp(&self) -> Result<i64, FormatError> {
        parse_explorer_timestamp(&self.time_utc)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TxEntry {
    #[serde(default)]
    pub addr: Option<String>,
    #[serde(default)]
    pub amount: f64,
}

/// Body of the explorer's transaction detail endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct TxDetail {
    #[serde(default)]
    pub hash: Option<String>,
    #[serde(default)]
    pub vin: Vec<TxEntry>,
    #[serde(default)]
    pub vout: Vec<TxEntry>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DetailProblem {
    MissingHash,
    HashMismatch(String),
}

impl TxDetail {
    /// Decomposes the detail into a transaction: one sender per `vin` entry and one
    /// recipient per `vout` entry, amounts taken as-is. Entries without an address
    /// (coinbase inputs, data outputs) are recorded with an empty address.
    pub fn into_transaction(self, expected_hash: &str, timestamp: i64) -> Result<Transaction, DetailProblem> {
        let hash = match self.hash {
            Some(hash) if !hash.trim().is_empty() => hash,
            _ => return Err(DetailProblem::MissingHash),
        };
        if hash != expected_hash {
            return Err(DetailProblem::HashMismatch(hash));
        }

        let to_participant = |entry: TxEntry| Participant::new(entry.addr.unwrap_or_default(), entry.amount);
        let senders = self.vin.into_iter().map(to_participant).collect();
        let recipients = self.vout.into_iter().map(to_participant).collect();

        Ok(Transaction::new(hash, timestamp, senders, recipients))
    }
}

/// Per-address entry of the "multiaddr" response.
#[derive(Debug, Clone, Deserialize)]
pub struct AddressInfo {
    pub address: String,
    #[serde(default)]
    pub total_sent: i64,
    #[serde(default)]
    pub total_received: i64,
    #[serde(default)]
    pub final_balance: i64,
    #[serde(default)]
    pub n_tx: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AddressSummary {
    #[serde(default)]
    pub addresses: Vec<AddressInfo>,
    #[serde(default)]
    pub txs: Vec<RecentTx>,
}

impl AddressSummary {
    pub fn total_tx_count(&self) -> i64 {
        self.addresses.iter().map(|info| info.n_tx).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_both_timestamp_layouts() {
        let with_seconds = parse_explorer_timestamp("2017-06-01T12:30:15Z").unwrap();
        let without_seconds = parse_explorer_timestamp("2017-06-01T12:30Z").unwrap();

        assert_eq!(with_seconds, 1_496_320_215_000);
        assert_eq!(without_seconds, 1_496_320_200_000);
    }

    #[test]
    fn rejects_unknown_timestamp_layout() {
        let err = parse_explorer_timestamp("01/06/2017 12:30").unwrap_err();
        assert_eq!(err.value, "01/06/2017 12:30");
        assert!(err.to_string().contains("Unparseable date"));
    }

    #[test]
    fn decomposes_detail_without_aggregating_duplicates() {
        let detail: TxDetail = serde_json::from_value(serde_json::json!({
            "id": 42,
            "hash": "h1",
            "vin": [{"addr": "A", "amount": 2.5}, {"addr": "A", "amount": 2.5}],
            "vout": [{"addr": "B", "amount": 4.99}, {"addr": null, "amount": 0.0}]
        }))
        .unwrap();

        let tx = detail.into_transaction("h1", 7).unwrap();

        assert_eq!(tx.timestamp, 7);
        assert_eq!(tx.senders, vec![Participant::new("A", 2.5), Participant::new("A", 2.5)]);
        assert_eq!(tx.recipients[0], Participant::new("B", 4.99));
        assert_eq!(tx.recipients[1].address, "");
    }

    #[test]
    fn detail_without_hash_is_malformed() {
        let detail: TxDetail = serde_json::from_value(serde_json::json!({"vin": [], "vout": []})).unwrap();
        assert_eq!(detail.into_transaction("h1", 0), Err(DetailProblem::MissingHash));

        let other: TxDetail = serde_json::from_value(serde_json::json!({"hash": "h2"})).unwrap();
        assert_eq!(
            other.into_transaction("h1", 0),
            Err(DetailProblem::HashMismatch("h2".to_string()))
        );
    }

    #[test]
    fn summary_sums_transaction_counts() {
        let summary: AddressSummary = serde_json::from_value(serde_json::json!({
            "addresses": [
                {"address": "A", "total_sent": 1, "total_received": 2, "final_balance": 1, "n_tx": 3},
                {"address": "B", "n_tx": 4}
            ],
            "txs": [{"hash": "h1", "confirmations": 3, "change": -5, "time_utc": "2017-06-01T12:30Z"}]
        }))
        .unwrap();

        assert_eq!(summary.total_tx_count(), 7);
        assert_eq!(summary.txs[0].timestamp().unwrap(), 1_496_320_200_000);
    }
}
