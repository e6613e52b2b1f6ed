//! In-memory column map.

use super::ColumnIntrospector;
use crate::executor::LifeError;
use crate::query::TableRef;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

/// Table columns held in memory.
///
/// Tables are keyed without their alias. Definitions can change after the
/// schema is shared, which is how a concurrent migration looks from the
/// application side.
///
/// ```
/// use lifeguard_column_select::schema::{ColumnIntrospector, StaticSchema};
/// use lifeguard_column_select::query::TableRef;
///
/// let schema = StaticSchema::new().with_table("albums", ["id", "name"]);
/// assert_eq!(
///     schema.current_columns(&TableRef::new("albums")).unwrap(),
///     vec!["id", "name"]
/// );
/// ```
#[derive(Debug, Default)]
pub struct StaticSchema {
    tables: RwLock<HashMap<TableRef, Vec<String>>>,
}

impl StaticSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`define`](Self::define).
    pub fn with_table<T, I, C>(mut self, table: T, columns: I) -> Self
    where
        T: Into<TableRef>,
        I: IntoIterator<Item = C>,
        C: Into<String>,
    {
        let tables = self.tables.get_mut().unwrap_or_else(PoisonError::into_inner);
        tables.insert(table.into().unaliased(), columns.into_iter().map(Into::into).collect());
        self
    }

    /// Create or replace a table definition.
    pub fn define<T, I, C>(&self, table: T, columns: I) -> Result<(), LifeError>
    where
        T: Into<TableRef>,
        I: IntoIterator<Item = C>,
        C: Into<String>,
    {
        let table = table.into().unaliased();
        let columns = columns.into_iter().map(Into::into).collect();
        self.write()?.insert(table, columns);
        Ok(())
    }

    /// Append a column to an existing table.
    pub fn add_column(&self, table: &TableRef, column: impl Into<String>) -> Result<(), LifeError> {
        let mut tables = self.write()?;
        let columns = tables
            .get_mut(&table.unaliased())
            .ok_or_else(|| LifeError::TableNotFound(table.unaliased().to_string()))?;
        columns.push(column.into());
        Ok(())
    }

    /// Remove a column from an existing table. Removing an unknown column is a no-op.
    pub fn drop_column(&self, table: &TableRef, column: &str) -> Result<(), LifeError> {
        let mut tables = self.write()?;
        let columns = tables
            .get_mut(&table.unaliased())
            .ok_or_else(|| LifeError::TableNotFound(table.unaliased().to_string()))?;
        columns.retain(|c| c != column);
        Ok(())
    }

    pub fn drop_table(&self, table: &TableRef) -> Result<(), LifeError> {
        self.write()?.remove(&table.unaliased());
        Ok(())
    }

    fn write(
        &self,
    ) -> Result<std::sync::RwLockWriteGuard<'_, HashMap<TableRef, Vec<String>>>, LifeError> {
        self.tables
            .write()
            .map_err(|_| LifeError::Other("schema lock poisoned".to_string()))
    }
}

impl ColumnIntrospector for StaticSchema {
    fn current_columns(&self, table: &TableRef) -> Result<Vec<String>, LifeError> {
        let key = table.unaliased();
        let tables = self
            .tables
            .read()
            .map_err(|_| LifeError::Other("schema lock poisoned".to_string()))?;
        tables
            .get(&key)
            .cloned()
            .ok_or_else(|| LifeError::TableNotFound(key.to_string()))
    }
}
