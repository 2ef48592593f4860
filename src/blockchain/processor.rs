use crate::blockchain::models::RecentTx;
use crate::models::Transaction;
use std::collections::HashSet;

/// Drops repeated hashes from a poll result, keeping the first occurrence.
pub fn dedup_recent(recent: Vec<RecentTx>) -> Vec<RecentTx> {
    let mut seen = HashSet::new();
    recent
        .into_iter()
        .filter(|tx| seen.insert(tx.hash.clone()))
        .collect()
}

/// Builds the forward batch from this pass's relevant transactions and the ones
/// awaiting resend. Each hash appears once. Returns the batch and how many entries
/// came only from the resend queue.
pub fn merge_batch(fresh: Vec<Transaction>, failed: Vec<Transaction>) -> (Vec<Transaction>, usize) {
    let mut seen: HashSet<String> = fresh.iter().map(|tx| tx.hash.clone()).collect();
    let mut batch = fresh;
    let mut resent = 0;

    for tx in failed {
        if seen.insert(tx.hash.clone()) {
            batch.push(tx);
            resent += 1;
        }
    }

    (batch, resent)
}

/// Keeps only transactions touching `addresses`.
pub fn filter_relevant(transactions: Vec<Transaction>, addresses: &HashSet<String>) -> Vec<Transaction> {
    transactions
        .into_iter()
        .filter(|tx| tx.touches_any(addresses))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Participant;

    fn tx(hash: &str, from: &str, to: &str) -> Transaction {
        Transaction::new(
            hash.to_string(),
            0,
            vec![Participant::new(from, 1.0)],
            vec![Participant::new(to, 1.0)],
        )
    }

    fn recent(hash: &str) -> RecentTx {
        RecentTx {
            hash: hash.to_string(),
            confirmations: 1,
            total: None,
            time_utc: "2017-06-01T12:30Z".to_string(),
        }
    }

    #[test]
    fn dedup_keeps_first_occurrence_order() {
        let deduped = dedup_recent(vec![recent("a"), recent("b"), recent("a"), recent("c")]);
        let hashes: Vec<_> = deduped.iter().map(|tx| tx.hash.as_str()).collect();
        assert_eq!(hashes, vec!["a", "b", "c"]);
    }

    #[test]
    fn merge_does_not_double_count_pending_fresh_transactions() {
        let fresh = vec![tx("h1", "A", "B")];
        let failed = vec![tx("h1", "A", "B"), tx("h0", "A", "C")];

        let (batch, resent) = merge_batch(fresh, failed);

        let hashes: Vec<_> = batch.iter().map(|tx| tx.hash.as_str()).collect();
        assert_eq!(hashes, vec!["h1", "h0"]);
        assert_eq!(resent, 1);
    }

    #[test]
    fn filter_relevant_drops_disjoint_transactions() {
        let tracked: HashSet<String> = ["A".to_string()].into_iter().collect();
        let kept = filter_relevant(vec![tx("h1", "A", "B"), tx("h2", "C", "D")], &tracked);

        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].hash, "h1");
    }
}
