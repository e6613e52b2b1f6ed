//! Column introspection against a live PostgreSQL database.

use super::ColumnIntrospector;
use crate::config::DatabaseConfig;
use crate::connection::connect_with_config;
use crate::executor::{LifeError, LifeExecutor, MayPostgresExecutor};
use crate::query::TableRef;

const COLUMNS_SQL: &str = "SELECT column_name::text \
     FROM information_schema.columns \
     WHERE table_schema = $1 AND table_name = $2 \
     ORDER BY ordinal_position";

const TABLE_EXISTS_SQL: &str = "SELECT EXISTS ( \
     SELECT FROM information_schema.tables \
     WHERE table_schema = $1 AND table_name = $2)";

/// Reads column lists from `information_schema.columns`.
///
/// Tables without a schema are looked up in `default_schema`. Every call hits
/// the database; wrap it in a [`CachedIntrospector`](super::CachedIntrospector)
/// to keep one column list per table for the life of the process.
pub struct PgIntrospector<E> {
    executor: E,
    default_schema: String,
}

impl<E: LifeExecutor> PgIntrospector<E> {
    pub fn new(executor: E, default_schema: impl Into<String>) -> Self {
        Self {
            executor,
            default_schema: default_schema.into(),
        }
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    pub fn default_schema(&self) -> &str {
        &self.default_schema
    }

    fn table_exists(&self, schema: &str, name: &str) -> Result<bool, LifeError> {
        let row = self.executor.query_one(TABLE_EXISTS_SQL, &[&schema, &name])?;
        row.try_get::<_, bool>(0)
            .map_err(|e| LifeError::ParseError(format!("Failed to read table existence: {e}")))
    }
}

impl PgIntrospector<MayPostgresExecutor> {
    /// Connect with a loaded [`DatabaseConfig`], using its `schema` as default.
    ///
    /// ```no_run
    /// use lifeguard_column_select::{DatabaseConfig, PgIntrospector};
    ///
    /// let config = DatabaseConfig::load()?;
    /// let introspector = PgIntrospector::connect(&config)?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn connect(config: &DatabaseConfig) -> Result<Self, LifeError> {
        let client = connect_with_config(config)
            .map_err(|e| LifeError::Other(format!("Connection error: {e}")))?;
        Ok(Self::new(MayPostgresExecutor::new(client), config.schema.clone()))
    }
}

impl<E: LifeExecutor + Send + Sync> ColumnIntrospector for PgIntrospector<E> {
    fn current_columns(&self, table: &TableRef) -> Result<Vec<String>, LifeError> {
        let schema = table.schema().unwrap_or(&self.default_schema);
        let name = table.name();

        #[cfg(feature = "tracing")]
        let _span = tracing::debug_span!("lifeguard.introspect", schema, table = name).entered();

        let rows = self.executor.query_all(COLUMNS_SQL, &[&schema, &name])?;
        let columns = rows
            .iter()
            .map(|row| {
                row.try_get::<_, String>(0)
                    .map_err(|e| LifeError::ParseError(format!("Failed to read column name: {e}")))
            })
            .collect::<Result<Vec<_>, _>>()?;

        // Zero-column tables exist in PostgreSQL, so an empty result is ambiguous
        if columns.is_empty() && !self.table_exists(schema, name)? {
            return Err(LifeError::TableNotFound(format!("{schema}.{name}")));
        }

        log::debug!("introspected {} column(s) for {}.{}", columns.len(), schema, name);
        Ok(columns)
    }
}
