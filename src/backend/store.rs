#[cfg(not(target_arch = "wasm32"))]
use rusqlite::{params, Connection};
#[cfg(target_arch = "wasm32")]
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};
use crate::backend::transactions::{Transaction, TransactionReceipt};
use crate::error::{Error, Result};

/// Transaction history, scoped by (chain id, account).
#[derive(Clone)]
pub struct TransactionStore {
    #[cfg(not(target_arch = "wasm32"))]
    conn: Arc<Mutex<Connection>>,
    #[cfg(target_arch = "wasm32")]
    transactions: Arc<Mutex<HashMap<String, Transaction>>>,
}

#[cfg(not(target_arch = "wasm32"))]
fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS transactions (
            hash TEXT PRIMARY KEY,
            chain_id INTEGER NOT NULL,
            account TEXT NOT NULL,
            added_time INTEGER NOT NULL,
            data BLOB NOT NULL
        )",
        [],
    )?;
    Ok(())
}

impl TransactionStore {
    #[cfg(not(target_arch = "wasm32"))]
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        init_schema(&conn)?;
        Ok(Self { conn: Arc::new(Mutex::new(conn)) })
    }

    #[cfg(target_arch = "wasm32")]
    pub fn new<P: AsRef<Path>>(_path: P) -> Result<Self> {
        Self::new_in_memory()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn new_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        init_schema(&conn)?;
        Ok(Self { conn: Arc::new(Mutex::new(conn)) })
    }

    #[cfg(target_arch = "wasm32")]
    pub fn new_in_memory() -> Result<Self> {
        Ok(Self { transactions: Arc::new(Mutex::new(HashMap::new())) })
    }

    pub fn add(&self, tx: &Transaction) -> Result<()> {
        #[cfg(not(target_arch = "wasm32"))]
        {
            let data = serde_json::to_vec(tx)?;
            let conn = self.conn.lock().map_err(|_| Error::Poisoned)?;
            conn.execute(
                "INSERT OR REPLACE INTO transactions (hash, chain_id, account, added_time, data)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![tx.hash, tx.chain_id as i64, tx.from.to_lowercase(), tx.added_time, data],
            )?;
        }

        #[cfg(target_arch = "wasm32")]
        {
            let mut transactions = self.transactions.lock().map_err(|_| Error::Poisoned)?;
            transactions.insert(tx.hash.clone(), tx.clone());
        }

        Ok(())
    }

    pub fn get(&self, hash: &str) -> Result<Option<Transaction>> {
        #[cfg(not(target_arch = "wasm32"))]
        {
            let conn = self.conn.lock().map_err(|_| Error::Poisoned)?;
            let mut stmt = conn.prepare("SELECT data FROM transactions WHERE hash = ?1")?;
            let mut rows = stmt.query(params![hash])?;
            let data: Option<Vec<u8>> = match rows.next()? {
                Some(row) => Some(row.get(0)?),
                None => None,
            };
            match data {
                Some(data) => Ok(Some(serde_json::from_slice(&data)?)),
                None => Ok(None),
            }
        }

        #[cfg(target_arch = "wasm32")]
        {
            let transactions = self.transactions.lock().map_err(|_| Error::Poisoned)?;
            Ok(transactions.get(hash).cloned())
        }
    }

    /// Attaches a receipt. Unknown hashes are ignored and yield `None`.
    pub fn finalize(
        &self,
        hash: &str,
        receipt: TransactionReceipt,
        confirmed_time: i64,
    ) -> Result<Option<Transaction>> {
        let Some(mut tx) = self.get(hash)? else {
            return Ok(None);
        };
        tx.receipt = Some(receipt);
        tx.confirmed_time = Some(confirmed_time);
        self.add(&tx)?;
        Ok(Some(tx))
    }

    /// Newest first.
    pub fn list(&self, chain_id: u64, account: &str) -> Result<Vec<Transaction>> {
        let account = account.to_lowercase();

        #[cfg(not(target_arch = "wasm32"))]
        {
            let conn = self.conn.lock().map_err(|_| Error::Poisoned)?;
            let mut stmt = conn.prepare(
                "SELECT data FROM transactions WHERE chain_id = ?1 AND account = ?2
                 ORDER BY added_time DESC",
            )?;
            let rows = stmt.query_map(params![chain_id as i64, account], |row| {
                row.get::<_, Vec<u8>>(0)
            })?;
            let mut transactions = Vec::new();
            for data in rows {
                transactions.push(serde_json::from_slice(&data?)?);
            }
            Ok(transactions)
        }

        #[cfg(target_arch = "wasm32")]
        {
            let transactions = self.transactions.lock().map_err(|_| Error::Poisoned)?;
            let mut scoped: Vec<Transaction> = transactions
                .values()
                .filter(|tx| tx.chain_id == chain_id && tx.from.to_lowercase() == account)
                .cloned()
                .collect();
            scoped.sort_by(|a, b| b.added_time.cmp(&a.added_time));
            Ok(scoped)
        }
    }

    /// Returns how many transactions were removed.
    pub fn clear_all(&self, chain_id: u64, account: &str) -> Result<usize> {
        let account = account.to_lowercase();

        #[cfg(not(target_arch = "wasm32"))]
        {
            let conn = self.conn.lock().map_err(|_| Error::Poisoned)?;
            let removed = conn.execute(
                "DELETE FROM transactions WHERE chain_id = ?1 AND account = ?2",
                params![chain_id as i64, account],
            )?;
            Ok(removed)
        }

        #[cfg(target_arch = "wasm32")]
        {
            let mut transactions = self.transactions.lock().map_err(|_| Error::Poisoned)?;
            let before = transactions.len();
            transactions
                .retain(|_, tx| !(tx.chain_id == chain_id && tx.from.to_lowercase() == account));
            Ok(before - transactions.len())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn tx(hash: &str, chain_id: u64, from: &str, added_time: i64) -> Transaction {
        Transaction {
            hash: hash.to_string(),
            from: from.to_string(),
            summary: "Vote on proposal".to_string(),
            chain_id,
            added_time,
            receipt: None,
            confirmed_time: None,
        }
    }

    #[test]
    fn test_store_add_list() {
        let store = TransactionStore::new_in_memory().expect("Failed to create store");
        store.add(&tx("0x1", 1, "0xAlice", 10)).expect("add");
        store.add(&tx("0x2", 1, "0xalice", 20)).expect("add");
        store.add(&tx("0x3", 100, "0xalice", 30)).expect("add");

        let listed = store.list(1, "0xALICE").expect("list");
        let hashes: Vec<&str> = listed.iter().map(|t| t.hash.as_str()).collect();
        assert_eq!(hashes, vec!["0x2", "0x1"]);
    }

    #[test]
    fn test_finalize_attaches_receipt() {
        let store = TransactionStore::new_in_memory().expect("Failed to create store");
        store.add(&tx("0x1", 1, "0xalice", 10)).expect("add");

        let receipt = TransactionReceipt { success: true, block_number: 42 };
        let updated = store
            .finalize("0x1", receipt.clone(), 99)
            .expect("finalize")
            .expect("known hash");
        assert_eq!(updated.receipt, Some(receipt));
        assert!(!store.get("0x1").expect("get").expect("present").is_pending());

        let missing = store
            .finalize("0xmissing", TransactionReceipt { success: false, block_number: 1 }, 1)
            .expect("finalize");
        assert!(missing.is_none());
    }

    #[test]
    fn test_clear_all_is_scoped() {
        let store = TransactionStore::new_in_memory().expect("Failed to create store");
        store.add(&tx("0x1", 1, "0xalice", 10)).expect("add");
        store.add(&tx("0x2", 1, "0xbob", 20)).expect("add");
        store.add(&tx("0x3", 100, "0xalice", 30)).expect("add");

        assert_eq!(store.clear_all(1, "0xalice").expect("clear"), 1);
        assert!(store.list(1, "0xalice").expect("list").is_empty());
        assert_eq!(store.list(1, "0xbob").expect("list").len(), 1);
        assert_eq!(store.list(100, "0xalice").expect("list").len(), 1);
    }

    #[test]
    fn test_store_persists_on_disk() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("davi.db");
        {
            let store = TransactionStore::new(&path).expect("open");
            store.add(&tx("0x1", 1, "0xalice", 10)).expect("add");
        }
        let reopened = TransactionStore::new(&path).expect("reopen");
        assert_eq!(reopened.list(1, "0xalice").expect("list").len(), 1);
    }
}
