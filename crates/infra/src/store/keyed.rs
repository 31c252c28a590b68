use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, RwLock};

use crate::StoreError;

/// Simple keyed read/write store.
pub trait KeyedStore<K, V>: Send + Sync {
    fn get(&self, key: &K) -> Result<Option<V>, StoreError>;
    fn upsert(&self, key: K, value: V) -> Result<(), StoreError>;
    /// Insert only if `key` is vacant. Returns `false` when it was already taken.
    fn insert_if_absent(&self, key: K, value: V) -> Result<bool, StoreError>;
    fn remove(&self, key: &K) -> Result<Option<V>, StoreError>;
    /// Read-modify-write under one exclusive lock. The stored value is replaced
    /// only when `f` succeeds. Returns `None` when `key` is vacant.
    fn update(
        &self,
        key: &K,
        f: &mut dyn FnMut(&mut V) -> Result<(), StoreError>,
    ) -> Result<Option<V>, StoreError>;
    fn list(&self) -> Result<Vec<V>, StoreError>;
}

impl<K, V, S> KeyedStore<K, V> for Arc<S>
where
    S: KeyedStore<K, V> + ?Sized,
{
    fn get(&self, key: &K) -> Result<Option<V>, StoreError> {
        (**self).get(key)
    }

    fn upsert(&self, key: K, value: V) -> Result<(), StoreError> {
        (**self).upsert(key, value)
    }

    fn insert_if_absent(&self, key: K, value: V) -> Result<bool, StoreError> {
        (**self).insert_if_absent(key, value)
    }

    fn remove(&self, key: &K) -> Result<Option<V>, StoreError> {
        (**self).remove(key)
    }

    fn update(
        &self,
        key: &K,
        f: &mut dyn FnMut(&mut V) -> Result<(), StoreError>,
    ) -> Result<Option<V>, StoreError> {
        (**self).update(key, f)
    }

    fn list(&self) -> Result<Vec<V>, StoreError> {
        (**self).list()
    }
}

/// In-memory store for tests/dev.
#[derive(Debug)]
pub struct InMemoryStore<K, V> {
    inner: RwLock<HashMap<K, V>>,
}

impl<K, V> InMemoryStore<K, V> {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(HashMap::new()),
        }
    }
}

impl<K, V> Default for InMemoryStore<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned<T>(_: T) -> StoreError {
    StoreError::unavailable("in-memory store lock poisoned")
}

impl<K, V> KeyedStore<K, V> for InMemoryStore<K, V>
where
    K: Eq + Hash + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    fn get(&self, key: &K) -> Result<Option<V>, StoreError> {
        let map = self.inner.read().map_err(poisoned)?;
        Ok(map.get(key).cloned())
    }

    fn upsert(&self, key: K, value: V) -> Result<(), StoreError> {
        let mut map = self.inner.write().map_err(poisoned)?;
        map.insert(key, value);
        Ok(())
    }

    fn insert_if_absent(&self, key: K, value: V) -> Result<bool, StoreError> {
        let mut map = self.inner.write().map_err(poisoned)?;
        if map.contains_key(&key) {
            return Ok(false);
        }
        map.insert(key, value);
        Ok(true)
    }

    fn remove(&self, key: &K) -> Result<Option<V>, StoreError> {
        let mut map = self.inner.write().map_err(poisoned)?;
        Ok(map.remove(key))
    }

    fn update(
        &self,
        key: &K,
        f: &mut dyn FnMut(&mut V) -> Result<(), StoreError>,
    ) -> Result<Option<V>, StoreError> {
        let mut map = self.inner.write().map_err(poisoned)?;
        let Some(current) = map.get_mut(key) else {
            return Ok(None);
        };
        let mut next = current.clone();
        f(&mut next)?;
        *current = next.clone();
        Ok(Some(next))
    }

    fn list(&self) -> Result<Vec<V>, StoreError> {
        let map = self.inner.read().map_err(poisoned)?;
        Ok(map.values().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_if_absent_keeps_first_value() {
        let store: InMemoryStore<String, u32> = InMemoryStore::new();
        assert!(store.insert_if_absent("a".to_string(), 1).unwrap());
        assert!(!store.insert_if_absent("a".to_string(), 2).unwrap());
        assert_eq!(store.get(&"a".to_string()).unwrap(), Some(1));
    }

    #[test]
    fn update_applies_only_on_success() {
        let store: InMemoryStore<u8, u32> = InMemoryStore::new();
        store.upsert(1, 10).unwrap();

        let updated = store.update(&1, &mut |v| {
            *v += 1;
            Ok(())
        });
        assert_eq!(updated.unwrap(), Some(11));

        let failed = store.update(&1, &mut |v| {
            *v = 0;
            Err(StoreError::unavailable("nope"))
        });
        assert!(failed.is_err());
        assert_eq!(store.get(&1).unwrap(), Some(11));

        assert_eq!(store.update(&2, &mut |_| Ok(())).unwrap(), None);
        assert_eq!(store.remove(&1).unwrap(), Some(11));
        assert_eq!(store.get(&1).unwrap(), None);
    }

    #[test]
    fn upsert_overwrites_and_list_returns_values() {
        let store = Arc::new(InMemoryStore::<u8, &'static str>::new());
        store.upsert(1, "one").unwrap();
        store.upsert(1, "uno").unwrap();
        store.upsert(2, "dos").unwrap();

        let mut values = store.list().unwrap();
        values.sort();
        assert_eq!(values, vec!["dos", "uno"]);
    }
}
