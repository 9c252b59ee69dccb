//! # Keyed Tables
//!
//! `Table<K, V>` is the per-entity key-value store. It carries no lock of
//! its own: the owning manager groups its tables in one state struct behind a
//! single `parking_lot::RwLock`, which is what makes a multi-table mutation
//! atomic.

use std::collections::HashMap;
use std::hash::Hash;

/// An in-memory key-value table.
#[derive(Debug, Clone)]
pub struct Table<K, V> {
    data: HashMap<K, V>,
}

impl<K: Eq + Hash, V> Table<K, V> {
    /// Create an empty table.
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
        }
    }

    /// Insert a record, returning the previous value if the key existed.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        self.data.insert(key, value)
    }

    /// Borrow a record.
    pub fn get(&self, key: &K) -> Option<&V> {
        self.data.get(key)
    }

    /// Mutably borrow a record.
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        self.data.get_mut(key)
    }

    /// Read-validate-update a record in one step.
    ///
    /// Returns `None` if the record doesn't exist, or `Some` with the
    /// closure's result. A closure that returns `Err` must leave the record
    /// untouched.
    pub fn try_update<R, E>(
        &mut self,
        key: &K,
        f: impl FnOnce(&mut V) -> Result<R, E>,
    ) -> Option<Result<R, E>> {
        self.data.get_mut(key).map(f)
    }

    /// Remove a record.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        self.data.remove(key)
    }

    /// Check if a record exists.
    pub fn contains(&self, key: &K) -> bool {
        self.data.contains_key(key)
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl<K: Eq + Hash, V: Clone> Table<K, V> {
    /// Clone a record out of the table.
    pub fn get_cloned(&self, key: &K) -> Option<V> {
        self.data.get(key).cloned()
    }
}

impl<K: Eq + Hash, V> Default for Table<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_get_remove() {
        let mut table: Table<u64, String> = Table::new();
        assert!(table.is_empty());
        assert_eq!(table.insert(1, "a".into()), None);
        assert_eq!(table.insert(1, "b".into()), Some("a".into()));
        assert_eq!(table.get(&1).map(String::as_str), Some("b"));
        assert_eq!(table.len(), 1);
        assert_eq!(table.remove(&1), Some("b".into()));
        assert!(!table.contains(&1));
    }

    #[test]
    fn test_try_update_missing_key() {
        let mut table: Table<u64, u64> = Table::new();
        let result: Option<Result<(), ()>> = table.try_update(&7, |v| {
            *v += 1;
            Ok(())
        });
        assert!(result.is_none());
    }

    #[test]
    fn test_try_update_error_leaves_record() {
        let mut table: Table<u64, u64> = Table::new();
        table.insert(1, 3);
        let result = table.try_update(&1, |v| {
            if *v < 4 {
                return Err("short");
            }
            *v -= 4;
            Ok(*v)
        });
        assert_eq!(result, Some(Err("short")));
        assert_eq!(table.get_cloned(&1), Some(3));
    }
}
