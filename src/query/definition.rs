//! The query definition a model dataset is built from.
//!
//! A [`QueryDefinition`] is a value: builder methods consume and return it.
//! The projection distinguishes "unset" (`None`, the database picks every
//! column) from an explicit list, including an explicitly empty one.

use crate::executor::LifeError;
use crate::query::iden::{QualifiedColumn, SelectExpr, TableRef};
use crate::schema::ColumnIntrospector;
use once_cell::sync::OnceCell;
use sea_query::{
    Alias, Asterisk, Expr, ExprTrait, JoinType, Order, PostgresQueryBuilder, Query,
    QueryStatementWriter, SelectStatement, Values,
};

/// Kind of an explicit join clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    Inner,
    Left,
    Right,
}

impl From<JoinKind> for JoinType {
    fn from(kind: JoinKind) -> Self {
        match kind {
            JoinKind::Inner => JoinType::InnerJoin,
            JoinKind::Left => JoinType::LeftJoin,
            JoinKind::Right => JoinType::RightJoin,
        }
    }
}

/// `JOIN table ON left = right`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinClause {
    pub kind: JoinKind,
    pub table: TableRef,
    pub left: QualifiedColumn,
    pub right: QualifiedColumn,
}

/// Sort direction for [`QueryDefinition::order_by`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

/// An in-memory description of a `SELECT`, prior to execution.
///
/// # Example
///
/// ```
/// use lifeguard_column_select::query::{identifier, qualify, QueryDefinition, TableRef};
///
/// let albums = TableRef::new("albums");
/// let query = QueryDefinition::from_table(albums.clone())
///     .select(vec![qualify(&albums, identifier("name"))])
///     .limit(10);
///
/// assert_eq!(
///     query.to_sql(),
///     r#"SELECT "albums"."name" FROM "albums" LIMIT 10"#
/// );
/// ```
#[derive(Debug, Clone, Default)]
pub struct QueryDefinition {
    projection: Option<Vec<SelectExpr>>,
    sources: Vec<TableRef>,
    joins: Vec<JoinClause>,
    filters: Vec<Expr>,
    order: Vec<(SelectExpr, SortOrder)>,
    limit: Option<u64>,
    offset: Option<u64>,
    // Cleared by every builder method
    columns: OnceCell<Vec<String>>,
}

impl PartialEq for QueryDefinition {
    fn eq(&self, other: &Self) -> bool {
        self.projection == other.projection
            && self.sources == other.sources
            && self.joins == other.joins
            && self.filters == other.filters
            && self.order == other.order
            && self.limit == other.limit
            && self.offset == other.offset
    }
}

impl QueryDefinition {
    /// A query with no sources and an unset projection.
    pub fn new() -> Self {
        Self::default()
    }

    /// `SELECT * FROM table`, with the projection left unset.
    pub fn from_table(table: impl Into<TableRef>) -> Self {
        Self::new().from(table)
    }

    /// Add a source table. Several sources form an implicit cross join.
    pub fn from(mut self, table: impl Into<TableRef>) -> Self {
        self.sources.push(table.into());
        self.touch()
    }

    /// Replace the projection with an explicit list.
    pub fn select<I>(mut self, exprs: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<SelectExpr>,
    {
        self.projection = Some(exprs.into_iter().map(Into::into).collect());
        self.touch()
    }

    /// Append to the projection. An unset projection becomes explicit.
    pub fn select_append<I>(mut self, exprs: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<SelectExpr>,
    {
        self.projection
            .get_or_insert_with(Vec::new)
            .extend(exprs.into_iter().map(Into::into));
        self.touch()
    }

    /// Explicitly select every column (`SELECT *`).
    ///
    /// Unlike [`unselect`](Self::unselect), the projection counts as set.
    pub fn select_all(mut self) -> Self {
        self.projection = Some(vec![SelectExpr::All]);
        self.touch()
    }

    /// Return the projection to the unset state.
    pub fn unselect(mut self) -> Self {
        self.projection = None;
        self.touch()
    }

    pub fn join(
        mut self,
        kind: JoinKind,
        table: impl Into<TableRef>,
        left: QualifiedColumn,
        right: QualifiedColumn,
    ) -> Self {
        self.joins.push(JoinClause {
            kind,
            table: table.into(),
            left,
            right,
        });
        self.touch()
    }

    pub fn inner_join(
        self,
        table: impl Into<TableRef>,
        left: QualifiedColumn,
        right: QualifiedColumn,
    ) -> Self {
        self.join(JoinKind::Inner, table, left, right)
    }

    pub fn left_join(
        self,
        table: impl Into<TableRef>,
        left: QualifiedColumn,
        right: QualifiedColumn,
    ) -> Self {
        self.join(JoinKind::Left, table, left, right)
    }

    /// Add a `WHERE` condition; conditions are `AND`ed.
    pub fn filter(mut self, condition: Expr) -> Self {
        self.filters.push(condition);
        self.touch()
    }

    pub fn order_by(mut self, expr: impl Into<SelectExpr>, order: SortOrder) -> Self {
        self.order.push((expr.into(), order));
        self.touch()
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self.touch()
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self.touch()
    }

    /// The explicit projection, or `None` when unset.
    pub fn projection(&self) -> Option<&[SelectExpr]> {
        self.projection.as_deref()
    }

    pub fn sources(&self) -> &[TableRef] {
        &self.sources
    }

    pub fn first_source(&self) -> Option<&TableRef> {
        self.sources.first()
    }

    pub fn joins(&self) -> &[JoinClause] {
        &self.joins
    }

    /// Column names a row of this query would carry, resolved once and memoized.
    ///
    /// With an unset projection these are the columns of every source, then of
    /// every joined table, in order. With an explicit projection they are the
    /// output names of its expressions, where `*` expands to the same list.
    ///
    /// # Errors
    ///
    /// Whatever the introspector returns, e.g. [`LifeError::TableNotFound`].
    pub fn columns(&self, introspector: &dyn ColumnIntrospector) -> Result<Vec<String>, LifeError> {
        self.columns
            .get_or_try_init(|| self.resolve_columns(introspector))
            .cloned()
    }

    fn resolve_columns(&self, introspector: &dyn ColumnIntrospector) -> Result<Vec<String>, LifeError> {
        match &self.projection {
            None => self.all_columns(introspector),
            Some(exprs) => {
                let mut names = Vec::with_capacity(exprs.len());
                for expr in exprs {
                    match expr.output_name() {
                        Some(name) => names.push(name.to_string()),
                        None => names.extend(self.all_columns(introspector)?),
                    }
                }
                Ok(names)
            }
        }
    }

    fn all_columns(&self, introspector: &dyn ColumnIntrospector) -> Result<Vec<String>, LifeError> {
        let tables = self.sources.iter().chain(self.joins.iter().map(|j| &j.table));
        let mut names = Vec::new();
        for table in tables {
            names.extend(introspector.current_columns(&table.unaliased())?);
        }
        Ok(names)
    }

    /// Build the SeaQuery statement for this definition.
    pub fn to_statement(&self) -> SelectStatement {
        let mut stmt = Query::select();

        match &self.projection {
            None => {
                stmt.column(Asterisk);
            }
            Some(exprs) => {
                for expr in exprs {
                    match expr {
                        SelectExpr::All => {
                            stmt.column(Asterisk);
                        }
                        SelectExpr::Aliased(inner, alias) => {
                            stmt.expr_as(inner.to_expr(), Alias::new(alias.as_str().to_owned()));
                        }
                        other => {
                            stmt.expr(other.to_expr());
                        }
                    }
                }
            }
        }

        for table in &self.sources {
            match table.alias() {
                Some(alias) => {
                    stmt.from_as(table.to_sea_table_ref(), Alias::new(alias.to_owned()));
                }
                None => {
                    stmt.from(table.to_sea_table_ref());
                }
            }
        }

        for join in &self.joins {
            let on = Expr::col(join.left.to_column_ref()).equals(join.right.to_column_ref());
            match join.table.alias() {
                Some(alias) => {
                    stmt.join_as(
                        join.kind.into(),
                        join.table.to_sea_table_ref(),
                        Alias::new(alias.to_owned()),
                        on,
                    );
                }
                None => {
                    stmt.join(join.kind.into(), join.table.to_sea_table_ref(), on);
                }
            }
        }

        for condition in &self.filters {
            stmt.and_where(condition.clone());
        }

        for (expr, order) in &self.order {
            let order = match order {
                SortOrder::Asc => Order::Asc,
                SortOrder::Desc => Order::Desc,
            };
            stmt.order_by_expr(expr.to_expr(), order);
        }

        if let Some(limit) = self.limit {
            stmt.limit(limit);
        }
        if let Some(offset) = self.offset {
            stmt.offset(offset);
        }

        stmt
    }

    /// Render to parameterized SQL for execution.
    pub fn build(&self) -> (String, Values) {
        self.to_statement().build(PostgresQueryBuilder)
    }

    /// Render to SQL with values inlined.
    pub fn to_sql(&self) -> String {
        self.to_statement().to_string(PostgresQueryBuilder)
    }

    fn touch(mut self) -> Self {
        self.columns = OnceCell::new();
        self
    }
}
