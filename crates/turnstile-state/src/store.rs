//! CounterStore — redb-backed persistence for named counters.
//!
//! Every mutation is one write transaction; the new value is committed
//! before it is reported. Supports both on-disk and in-memory backends
//! (the latter for testing).

use std::path::Path;
use std::sync::Arc;

use redb::{Database, ReadableDatabase, ReadableTable};
use tracing::debug;

use crate::error::{StateError, StateResult};
use crate::tables::COUNTERS;

/// Convert any `Display` error into a `StateError` variant via a closure factory.
macro_rules! map_err {
    ($variant:ident) => {
        |e| StateError::$variant(e.to_string())
    };
}

/// Thread-safe counter store backed by redb.
#[derive(Clone)]
pub struct CounterStore {
    db: Arc<Database>,
}

impl CounterStore {
    /// Open (or create) a persistent counter store at the given path.
    pub fn open(path: &Path) -> StateResult<Self> {
        let db = Database::create(path).map_err(map_err!(Open))?;
        let store = Self { db: Arc::new(db) };
        store.ensure_tables()?;
        debug!(?path, "counter store opened");
        Ok(store)
    }

    /// Create an ephemeral in-memory counter store (for testing).
    pub fn open_in_memory() -> StateResult<Self> {
        let backend = redb::backends::InMemoryBackend::new();
        let db = Database::builder()
            .create_with_backend(backend)
            .map_err(map_err!(Open))?;
        let store = Self { db: Arc::new(db) };
        store.ensure_tables()?;
        debug!("in-memory counter store opened");
        Ok(store)
    }

    fn ensure_tables(&self) -> StateResult<()> {
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        txn.open_table(COUNTERS).map_err(map_err!(Table))?;
        txn.commit().map_err(map_err!(Transaction))?;
        Ok(())
    }

    /// Return the current value of `name` and persist `value + 1`.
    ///
    /// An unseen name starts at 0. The transaction is committed before the
    /// value is returned; on any error nothing is written.
    pub fn increment_and_fetch(&self, name: &str) -> StateResult<u64> {
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        let current = {
            let mut table = txn.open_table(COUNTERS).map_err(map_err!(Table))?;
            let current = table
                .get(name)
                .map_err(map_err!(Read))?
                .map(|guard| guard.value())
                .unwrap_or(0);
            let next = current
                .checked_add(1)
                .ok_or_else(|| StateError::Overflow(name.to_string()))?;
            table.insert(name, next).map_err(map_err!(Write))?;
            current
        };
        txn.commit().map_err(map_err!(Transaction))?;
        debug!(counter = name, value = current, "counter incremented");
        Ok(current)
    }

    /// Current value without incrementing. Unseen names read as 0.
    pub fn peek(&self, name: &str) -> StateResult<u64> {
        let txn = self.db.begin_read().map_err(map_err!(Transaction))?;
        let table = txn.open_table(COUNTERS).map_err(map_err!(Table))?;
        let value = table
            .get(name)
            .map_err(map_err!(Read))?
            .map(|guard| guard.value())
            .unwrap_or(0);
        Ok(value)
    }

    /// All counters that have been incremented at least once.
    pub fn list(&self) -> StateResult<Vec<(String, u64)>> {
        let txn = self.db.begin_read().map_err(map_err!(Transaction))?;
        let table = txn.open_table(COUNTERS).map_err(map_err!(Table))?;
        let mut results = Vec::new();
        for entry in table.iter().map_err(map_err!(Read))? {
            let (key, value) = entry.map_err(map_err!(Read))?;
            results.push((key.value().to_string(), value.value()));
        }
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::thread;

    #[test]
    fn fresh_counter_starts_at_zero() {
        let store = CounterStore::open_in_memory().unwrap();
        assert_eq!(store.peek("global").unwrap(), 0);
        assert_eq!(store.increment_and_fetch("global").unwrap(), 0);
        assert_eq!(store.peek("global").unwrap(), 1);
    }

    #[test]
    fn sequential_increments_return_pre_increment_values() {
        let store = CounterStore::open_in_memory().unwrap();
        let values: Vec<u64> = (0..10)
            .map(|_| store.increment_and_fetch("global").unwrap())
            .collect();
        assert_eq!(values, (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn counters_are_independent_by_name() {
        let store = CounterStore::open_in_memory().unwrap();
        store.increment_and_fetch("a").unwrap();
        store.increment_and_fetch("a").unwrap();
        assert_eq!(store.increment_and_fetch("b").unwrap(), 0);
        assert_eq!(store.increment_and_fetch("a").unwrap(), 2);

        let mut all = store.list().unwrap();
        all.sort();
        assert_eq!(all, vec![("a".to_string(), 3), ("b".to_string(), 1)]);
    }

    #[test]
    fn empty_store_lists_nothing() {
        let store = CounterStore::open_in_memory().unwrap();
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn concurrent_increments_never_duplicate() {
        let store = CounterStore::open_in_memory().unwrap();
        let mut handles = vec![];

        for _ in 0..8 {
            let store = store.clone();
            handles.push(thread::spawn(move || {
                (0..25)
                    .map(|_| store.increment_and_fetch("global").unwrap())
                    .collect::<Vec<_>>()
            }));
        }

        let mut seen = HashSet::new();
        for h in handles {
            for value in h.join().unwrap() {
                assert!(seen.insert(value), "duplicate value {value}");
            }
        }
        assert_eq!(seen, (0..200).collect::<HashSet<_>>());
        assert_eq!(store.peek("global").unwrap(), 200);
    }

    #[test]
    fn overflow_is_an_error_and_leaves_value_untouched() {
        let store = CounterStore::open_in_memory().unwrap();
        {
            let txn = store.db.begin_write().unwrap();
            {
                let mut table = txn.open_table(COUNTERS).unwrap();
                table.insert("full", u64::MAX).unwrap();
            }
            txn.commit().unwrap();
        }

        assert!(matches!(
            store.increment_and_fetch("full"),
            Err(StateError::Overflow(name)) if name == "full"
        ));
        assert_eq!(store.peek("full").unwrap(), u64::MAX);
    }

    // ── Persistence (on-disk) ──────────────────────────────────────

    #[test]
    fn persistence_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("counters.redb");

        {
            let store = CounterStore::open(&db_path).unwrap();
            assert_eq!(store.increment_and_fetch("global").unwrap(), 0);
            assert_eq!(store.increment_and_fetch("global").unwrap(), 1);
        }

        // Reopen the same database file.
        let store = CounterStore::open(&db_path).unwrap();
        assert_eq!(store.increment_and_fetch("global").unwrap(), 2);
    }
}
