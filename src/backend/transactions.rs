use serde::{Deserialize, Serialize};

pub const RECENT_TRANSACTIONS_LIMIT: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionReceipt {
    pub success: bool,
    pub block_number: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub hash: String,
    pub from: String,
    pub summary: String,
    pub chain_id: u64,
    /// Milliseconds since the epoch.
    pub added_time: i64,
    pub receipt: Option<TransactionReceipt>,
    pub confirmed_time: Option<i64>,
}

impl Transaction {
    pub fn is_pending(&self) -> bool {
        self.receipt.is_none()
    }
}

/// Newest first, at most `limit`.
pub fn recent_transactions(transactions: &[Transaction], limit: usize) -> Vec<Transaction> {
    let mut sorted = transactions.to_vec();
    sorted.sort_by(|a, b| b.added_time.cmp(&a.added_time));
    sorted.truncate(limit);
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tx(hash: &str, added_time: i64) -> Transaction {
        Transaction {
            hash: hash.to_string(),
            from: "0xfrom".to_string(),
            summary: format!("tx {}", hash),
            chain_id: 1,
            added_time,
            receipt: None,
            confirmed_time: None,
        }
    }

    #[test]
    fn test_recent_keeps_five_newest_descending() {
        let times = [30, 10, 70, 50, 20, 60, 40];
        let txs: Vec<Transaction> = times
            .iter()
            .map(|t| tx(&format!("0x{}", t), *t))
            .collect();

        let recent = recent_transactions(&txs, RECENT_TRANSACTIONS_LIMIT);
        let added: Vec<i64> = recent.iter().map(|t| t.added_time).collect();
        assert_eq!(added, vec![70, 60, 50, 40, 30]);
    }

    #[test]
    fn test_recent_of_empty() {
        assert!(recent_transactions(&[], RECENT_TRANSACTIONS_LIMIT).is_empty());
    }
}
