use super::{Collection, PersistenceError, PersistenceResult, Repository, Stored};
use parking_lot::RwLock;
use std::collections::BTreeMap;

struct Rows<T> {
    next_id: i64,
    values: BTreeMap<i64, T>,
}

/// Process-local store, used by tests and by the HTTP server when no
/// database is configured.
pub struct MemoryStore<T> {
    rows: RwLock<Rows<T>>,
}

impl<T> Default for MemoryStore<T> {
    fn default() -> Self {
        Self {
            rows: RwLock::new(Rows {
                next_id: 1,
                values: BTreeMap::new(),
            }),
        }
    }
}

impl<T> MemoryStore<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.rows.read().values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: Collection> Repository<T> for MemoryStore<T> {
    fn insert(&self, value: &T) -> PersistenceResult<i64> {
        value.validate()?;
        let mut rows = self.rows.write();
        let id = rows.next_id;
        rows.next_id += 1;
        rows.values.insert(id, value.clone());
        Ok(id)
    }

    fn update(&self, id: i64, value: &T) -> PersistenceResult<()> {
        value.validate()?;
        let mut rows = self.rows.write();
        match rows.values.get_mut(&id) {
            Some(slot) => {
                *slot = value.clone();
                Ok(())
            }
            None => Err(PersistenceError::NotFound {
                collection: T::NAME,
                id,
            }),
        }
    }

    fn get_by_id(&self, id: i64) -> PersistenceResult<Option<T>> {
        Ok(self.rows.read().values.get(&id).cloned())
    }

    fn get_all(&self) -> PersistenceResult<Vec<Stored<T>>> {
        Ok(self
            .rows
            .read()
            .values
            .iter()
            .map(|(id, value)| Stored {
                id: *id,
                value: value.clone(),
            })
            .collect())
    }
}
