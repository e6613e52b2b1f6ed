//! Schema cache in front of another introspector.

use super::ColumnIntrospector;
use crate::executor::LifeError;
use crate::query::TableRef;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

/// Remembers the first column list seen for each table.
///
/// Entries never expire on their own; call [`invalidate`](Self::invalidate)
/// or [`clear`](Self::clear) after a migration the application should see.
/// Errors from the inner introspector are not cached.
#[derive(Debug)]
pub struct CachedIntrospector<I> {
    inner: I,
    cache: Mutex<HashMap<TableRef, Vec<String>>>,
}

impl<I: ColumnIntrospector> CachedIntrospector<I> {
    pub fn new(inner: I) -> Self {
        Self {
            inner,
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn inner(&self) -> &I {
        &self.inner
    }

    /// Forget the cached columns of one table.
    pub fn invalidate(&self, table: &TableRef) -> Result<(), LifeError> {
        self.lock()?.remove(&table.unaliased());
        Ok(())
    }

    pub fn clear(&self) -> Result<(), LifeError> {
        self.lock()?.clear();
        Ok(())
    }

    /// Number of tables currently cached.
    pub fn len(&self) -> Result<usize, LifeError> {
        Ok(self.lock()?.len())
    }

    pub fn is_empty(&self) -> Result<bool, LifeError> {
        Ok(self.lock()?.is_empty())
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<TableRef, Vec<String>>>, LifeError> {
        self.cache
            .lock()
            .map_err(|_| LifeError::Other("schema cache lock poisoned".to_string()))
    }
}

impl<I: ColumnIntrospector> ColumnIntrospector for CachedIntrospector<I> {
    fn current_columns(&self, table: &TableRef) -> Result<Vec<String>, LifeError> {
        let key = table.unaliased();
        if let Some(columns) = self.lock()?.get(&key) {
            log::debug!("schema cache hit for {}", key);
            return Ok(columns.clone());
        }

        log::debug!("schema cache miss for {}", key);
        let columns = self.inner.current_columns(&key)?;
        self.lock()?.insert(key, columns.clone());
        Ok(columns)
    }
}
