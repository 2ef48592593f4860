// Domain records shared by persistence, the sync pipeline and the API.
// Wire types for the explorer live in blockchain::models.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// One input or output entry of a transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    #[serde(rename = "publicKey")]
    pub address: String,
    pub amount: f64,
}

pub type Sender = Participant;
pub type Recipient = Participant;

impl Participant {
    pub fn new(address: impl Into<String>, amount: f64) -> Self {
        Self {
            address: address.into(),
            amount,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub hash: String,
    /// Milliseconds since the Unix epoch.
    #[serde(rename = "date")]
    pub timestamp: i64,
    pub recipients: Vec<Recipient>,
    pub senders: Vec<Sender>,
    /// `true` once the backend accepted it, `false` while queued for resend.
    #[serde(skip, default = "default_processed")]
    pub processed: bool,
}

fn default_processed() -> bool {
    true
}

impl Transaction {
    pub fn new(
        hash: String,
        timestamp: i64,
        senders: Vec<Sender>,
        recipients: Vec<Recipient>,
    ) -> Self {
        Self {
            hash,
            timestamp,
            recipients,
            senders,
            processed: true,
        }
    }

    /// Every sender and recipient address, duplicates included.
    pub fn addresses(&self) -> impl Iterator<Item = &str> {
        self.senders
            .iter()
            .chain(self.recipients.iter())
            .map(|p| p.address.as_str())
    }

    /// Relevance filter: does any sender or recipient belong to `tracked`?
    pub fn touches_any(&self, tracked: &HashSet<String>) -> bool {
        self.addresses().any(|addr| tracked.contains(addr))
    }
}

// API response models
#[derive(Debug, Serialize, Deserialize)]
pub struct SetAddressesResponse {
    pub keys_processed: usize,
    pub transactions_processed: usize,
    pub status: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct InfoResponse {
    pub txs: Vec<Transaction>,
    pub balances: HashMap<String, Option<f64>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Transaction {
        Transaction::new(
            "h1".to_string(),
            1_500_000_000_000,
            vec![Participant::new("A", 5.0)],
            vec![Participant::new("B", 4.9), Participant::new("A", 0.1)],
        )
    }

    #[test]
    fn relevance_checks_senders_and_recipients() {
        let tx = sample();
        let only_b: HashSet<String> = ["B".to_string()].into_iter().collect();
        let only_c: HashSet<String> = ["C".to_string()].into_iter().collect();

        assert!(tx.touches_any(&only_b));
        assert!(!tx.touches_any(&only_c));
        assert!(!tx.touches_any(&HashSet::new()));
    }

    #[test]
    fn serializes_in_backend_wire_shape() {
        let value = serde_json::to_value(sample()).unwrap();

        assert_eq!(value["hash"], "h1");
        assert_eq!(value["date"], 1_500_000_000_000i64);
        assert_eq!(value["senders"][0]["publicKey"], "A");
        assert_eq!(value["recipients"][1]["amount"], 0.1);
        assert!(value.get("processed").is_none());
    }
}
