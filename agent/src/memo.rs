//! Per-turn memoization.
//!
//! Every model-derived quantity is cached on its hashable arguments so that
//! asking the same question twice within a turn returns the same answer.
//! Caches are owned by the world model and scorer built for one turn and
//! are dropped with them.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::hash::Hash;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
}

#[derive(Debug)]
pub struct Memo<K, V> {
    entries: RefCell<HashMap<K, V>>,
    hits: Cell<u64>,
    misses: Cell<u64>,
}

impl<K, V> Default for Memo<K, V> {
    fn default() -> Self {
        Self {
            entries: RefCell::new(HashMap::new()),
            hits: Cell::new(0),
            misses: Cell::new(0),
        }
    }
}

impl<K: Eq + Hash, V: Clone> Memo<K, V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached value for `key`, computing and storing it on a miss.
    /// Failed computations are not cached.
    pub fn get_or_try_insert_with<E>(
        &self,
        key: K,
        compute: impl FnOnce() -> Result<V, E>,
    ) -> Result<V, E> {
        let cached = self.entries.borrow().get(&key).cloned();
        if let Some(value) = cached {
            self.hits.set(self.hits.get() + 1);
            return Ok(value);
        }

        self.misses.set(self.misses.get() + 1);
        let value = compute()?;
        self.entries.borrow_mut().insert(key, value.clone());
        Ok(value)
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.len(),
            hits: self.hits.get(),
            misses: self.misses.get(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_lookup_hits() {
        let memo: Memo<&str, u32> = Memo::new();
        let mut calls = 0;

        for _ in 0..3 {
            let v = memo
                .get_or_try_insert_with("k", || {
                    calls += 1;
                    Ok::<_, ()>(7)
                })
                .unwrap();
            assert_eq!(v, 7);
        }

        assert_eq!(calls, 1);
        assert_eq!(
            memo.stats(),
            CacheStats {
                entries: 1,
                hits: 2,
                misses: 1
            }
        );
    }

    #[test]
    fn test_errors_are_not_cached() {
        let memo: Memo<u8, u8> = Memo::new();

        assert!(memo.get_or_try_insert_with(1, || Err("offline")).is_err());
        assert!(memo.is_empty());
        assert_eq!(memo.get_or_try_insert_with(1, || Ok::<_, &str>(3)), Ok(3));
    }
}
