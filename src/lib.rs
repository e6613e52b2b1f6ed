//! # Lifeguard column select
//!
//! Explicit, table-qualified default projections for Lifeguard model datasets.
//!
//! With the [`ColumnSelect`] plugin attached, a model mapped to `albums` selects
//! `"albums"."id", "albums"."name", ...` instead of `*`. The list is taken
//! from the table's schema when the dataset is set, so a column added by a
//! migration while the application runs does not change what it selects.
//!
//! See [README on GitHub](https://github.com/microscaler/lifeguard)

pub mod config;
pub mod connection;
pub mod executor;
pub mod model;
pub mod plugins;
pub mod query;
pub mod schema;

pub use config::DatabaseConfig;
pub use connection::{connect, ConnectionError};
pub use executor::{LifeError, LifeExecutor, MayPostgresExecutor};
pub use model::{Model, ModelPlugin};
pub use plugins::ColumnSelect;
pub use query::{identifier, qualify, QueryDefinition, SelectExpr, TableRef};
pub use schema::{
    CachedIntrospector, ColumnIntrospector, PgIntrospector, SharedIntrospector, StaticSchema,
};
