//! Column introspection.
//!
//! A [`ColumnIntrospector`] answers one question: which columns does a table
//! have right now, in table order. Implementations:
//!
//! - [`StaticSchema`]: an in-memory column map
//! - [`CachedIntrospector`]: a schema cache in front of another introspector
//! - [`PgIntrospector`]: `information_schema.columns` over a [`LifeExecutor`](crate::LifeExecutor)

use crate::executor::LifeError;
use crate::query::TableRef;
use std::sync::Arc;

pub mod cache;
pub mod postgres;
pub mod static_schema;

#[doc(inline)]
pub use cache::CachedIntrospector;
#[doc(inline)]
pub use postgres::PgIntrospector;
#[doc(inline)]
pub use static_schema::StaticSchema;

/// Resolves the ordered column names of a table.
///
/// Introspectors are shared between models and threads.
pub trait ColumnIntrospector: Send + Sync {
    /// Current columns of `table`, in table order.
    ///
    /// # Errors
    ///
    /// [`LifeError::TableNotFound`] when the table does not exist, or whatever the
    /// backing store fails with.
    fn current_columns(&self, table: &TableRef) -> Result<Vec<String>, LifeError>;
}

/// Shared handle models keep to their introspector.
pub type SharedIntrospector = Arc<dyn ColumnIntrospector>;

impl<T: ColumnIntrospector + ?Sized> ColumnIntrospector for Arc<T> {
    fn current_columns(&self, table: &TableRef) -> Result<Vec<String>, LifeError> {
        (**self).current_columns(table)
    }
}

impl<T: ColumnIntrospector + ?Sized> ColumnIntrospector for &T {
    fn current_columns(&self, table: &TableRef) -> Result<Vec<String>, LifeError> {
        (**self).current_columns(table)
    }
}
