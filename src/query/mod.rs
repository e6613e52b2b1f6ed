//! Query definitions for model datasets.
//!
//! - **Identifiers**: `TableRef`, `Identifier`, `QualifiedColumn`, `SelectExpr`
//!   plus the [`qualify`] and [`identifier`] constructors
//! - **Definition**: `QueryDefinition`, rendered to SQL through SeaQuery
//!
//! # Examples
//!
//! ```
//! use lifeguard_column_select::query::QueryDefinition;
//!
//! let query = QueryDefinition::from_table("albums");
//! assert!(query.projection().is_none());
//! assert_eq!(query.to_sql(), r#"SELECT * FROM "albums""#);
//! ```

pub mod iden;
#[doc(inline)]
pub use iden::{identifier, qualify, Identifier, QualifiedColumn, SelectExpr, TableRef};

pub mod definition;
#[doc(inline)]
pub use definition::{JoinClause, JoinKind, QueryDefinition, SortOrder};
