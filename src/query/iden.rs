//! Table, identifier and projection-expression types.
//!
//! These are plain owned values. They are converted into SeaQuery references
//! only when a [`QueryDefinition`](super::QueryDefinition) is rendered.

use sea_query::{Alias, ColumnRef, Expr, IntoColumnRef, IntoTableRef};
use std::fmt;

/// A table a query reads from: a name, an optional schema and an optional alias.
///
/// Equality and hashing include the alias. Use [`TableRef::unaliased`] to get
/// the key under which a schema layer knows the table.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TableRef {
    schema: Option<String>,
    name: String,
    alias: Option<String>,
}

impl TableRef {
    /// An unqualified table name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            schema: None,
            name: name.into(),
            alias: None,
        }
    }

    /// A schema-qualified table name.
    pub fn with_schema(schema: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            schema: Some(schema.into()),
            name: name.into(),
            alias: None,
        }
    }

    /// Give the table an alias (`FROM albums AS a`).
    pub fn aliased(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn schema(&self) -> Option<&str> {
        self.schema.as_deref()
    }

    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    /// The same table without its alias.
    pub fn unaliased(&self) -> TableRef {
        TableRef {
            schema: self.schema.clone(),
            name: self.name.clone(),
            alias: None,
        }
    }

    pub(crate) fn to_sea_table_ref(&self) -> sea_query::TableRef {
        match &self.schema {
            Some(schema) => {
                (Alias::new(schema.clone()), Alias::new(self.name.clone())).into_table_ref()
            }
            None => Alias::new(self.name.clone()).into_table_ref(),
        }
    }
}

impl fmt::Display for TableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.schema {
            Some(schema) => write!(f, "{}.{}", schema, self.name)?,
            None => write!(f, "{}", self.name)?,
        }
        if let Some(alias) = &self.alias {
            write!(f, " AS {}", alias)?;
        }
        Ok(())
    }
}

/// `"albums"` is an unqualified table; `"music.albums"` is schema-qualified.
///
/// The table name is everything after the last dot, so `"a.b.c"` names table
/// `c` in schema `a.b`.
impl From<&str> for TableRef {
    fn from(value: &str) -> Self {
        match value.rsplit_once('.') {
            Some((schema, name)) => TableRef::with_schema(schema, name),
            None => TableRef::new(value),
        }
    }
}

impl From<String> for TableRef {
    fn from(value: String) -> Self {
        TableRef::from(value.as_str())
    }
}

/// A bare column name, quoted on rendering.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identifier(String);

impl Identifier {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A column qualified by the table it belongs to.
///
/// When the table carries an alias, the alias is the qualifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QualifiedColumn {
    table: TableRef,
    column: Identifier,
}

impl QualifiedColumn {
    pub fn new(table: impl Into<TableRef>, column: Identifier) -> Self {
        Self {
            table: table.into(),
            column,
        }
    }

    pub fn table(&self) -> &TableRef {
        &self.table
    }

    pub fn column(&self) -> &Identifier {
        &self.column
    }

    pub(crate) fn to_column_ref(&self) -> ColumnRef {
        let column = Alias::new(self.column.as_str().to_owned());
        match (self.table.alias(), self.table.schema()) {
            (Some(alias), _) => (Alias::new(alias.to_owned()), column).into_column_ref(),
            (None, Some(schema)) => {
                let table = Alias::new(self.table.name().to_owned());
                (Alias::new(schema.to_owned()), table, column).into_column_ref()
            }
            (None, None) => (Alias::new(self.table.name().to_owned()), column).into_column_ref(),
        }
    }
}

impl fmt::Display for QualifiedColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.table.alias(), self.table.schema()) {
            (Some(alias), _) => write!(f, "{}.{}", alias, self.column),
            (None, Some(schema)) => write!(f, "{}.{}.{}", schema, self.table.name(), self.column),
            (None, None) => write!(f, "{}.{}", self.table.name(), self.column),
        }
    }
}

/// One entry of a projection list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectExpr {
    /// `*`: every column of every source
    All,
    /// An unqualified column
    Column(Identifier),
    /// `table.column`
    Qualified(QualifiedColumn),
    /// `expr AS alias`
    Aliased(Box<SelectExpr>, Identifier),
}

impl SelectExpr {
    /// Wrap this expression in `AS alias`.
    pub fn alias(self, alias: impl Into<String>) -> SelectExpr {
        SelectExpr::Aliased(Box::new(self), identifier(alias))
    }

    /// The name this expression has in a result row, if it has one.
    pub fn output_name(&self) -> Option<&str> {
        match self {
            SelectExpr::All => None,
            SelectExpr::Column(id) => Some(id.as_str()),
            SelectExpr::Qualified(q) => Some(q.column().as_str()),
            SelectExpr::Aliased(_, alias) => Some(alias.as_str()),
        }
    }

    pub(crate) fn to_expr(&self) -> Expr {
        match self {
            SelectExpr::All => Expr::cust("*"),
            SelectExpr::Column(id) => Expr::col(Alias::new(id.as_str().to_owned())),
            SelectExpr::Qualified(q) => Expr::col(q.to_column_ref()),
            SelectExpr::Aliased(inner, _) => inner.to_expr(),
        }
    }
}

impl fmt::Display for SelectExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectExpr::All => f.write_str("*"),
            SelectExpr::Column(id) => write!(f, "{}", id),
            SelectExpr::Qualified(q) => write!(f, "{}", q),
            SelectExpr::Aliased(inner, alias) => write!(f, "{} AS {}", inner, alias),
        }
    }
}

impl From<QualifiedColumn> for SelectExpr {
    fn from(value: QualifiedColumn) -> Self {
        SelectExpr::Qualified(value)
    }
}

impl From<Identifier> for SelectExpr {
    fn from(value: Identifier) -> Self {
        SelectExpr::Column(value)
    }
}

/// Wrap a bare name as a quotable identifier.
pub fn identifier(name: impl Into<String>) -> Identifier {
    Identifier(name.into())
}

/// Qualify `column` with `table`, producing a projection expression.
///
/// ```
/// use lifeguard_column_select::query::{identifier, qualify, TableRef};
///
/// let expr = qualify(&TableRef::new("albums"), identifier("id"));
/// assert_eq!(expr.to_string(), "albums.id");
/// ```
pub fn qualify(table: &TableRef, column: Identifier) -> SelectExpr {
    SelectExpr::Qualified(QualifiedColumn::new(table.clone(), column))
}
