//! The `column_select` plugin.
//!
//! Changes a model's default selection from `SELECT *` to an explicit list of
//! the table's columns, qualified with the table:
//! `SELECT albums.id, albums.name, ... FROM albums`.
//!
//! The column list is taken when the dataset is set on the model. A column
//! added by a migration while the application is running is therefore not
//! picked up until the dataset is set again.

use crate::executor::LifeError;
use crate::model::{Model, ModelPlugin};
use crate::query::{identifier, qualify, QueryDefinition, SelectExpr, TableRef};
use crate::schema::ColumnIntrospector;

/// Registry name of the plugin.
pub const NAME: &str = "column_select";

/// Model plugin that selects qualified columns explicitly.
#[derive(Debug, Clone, Copy, Default)]
pub struct ColumnSelect;

impl ModelPlugin for ColumnSelect {
    fn name(&self) -> &'static str {
        NAME
    }

    /// Re-set the model's dataset, if it has one, so it gets converted.
    fn configure(&self, model: &mut Model) -> Result<(), LifeError> {
        if let Some(dataset) = model.dataset().cloned() {
            model.set_dataset(dataset)?;
        }
        Ok(())
    }

    fn convert_input_dataset(
        &self,
        dataset: QueryDefinition,
        introspector: &dyn ColumnIntrospector,
    ) -> Result<QueryDefinition, LifeError> {
        rewrite(dataset, introspector)
    }
}

/// Select every column of the sole source table explicitly.
///
/// Applies only when the query has no explicit projection, exactly one source
/// and no joins; any other query is returned unchanged without consulting the
/// introspector. Introspection errors are returned as-is.
///
/// ```
/// use lifeguard_column_select::plugins::column_select::rewrite;
/// use lifeguard_column_select::{QueryDefinition, StaticSchema};
///
/// let schema = StaticSchema::new().with_table("albums", ["id", "name", "artist_id"]);
/// let query = rewrite(QueryDefinition::from_table("albums"), &schema)?;
/// assert_eq!(
///     query.to_sql(),
///     r#"SELECT "albums"."id", "albums"."name", "albums"."artist_id" FROM "albums""#
/// );
/// # Ok::<(), lifeguard_column_select::LifeError>(())
/// ```
pub fn rewrite(
    query: QueryDefinition,
    introspector: &dyn ColumnIntrospector,
) -> Result<QueryDefinition, LifeError> {
    let source = match sole_source(&query) {
        Some(source) => source.clone(),
        None => {
            log::trace!("column_select: leaving projection as is");
            return Ok(query);
        }
    };

    let columns = query.columns(introspector)?;
    if columns.is_empty() {
        return Ok(query);
    }

    log::debug!("column_select: selecting {} column(s) from {}", columns.len(), source);
    let projection: Vec<SelectExpr> = columns
        .into_iter()
        .map(|column| qualify(&source, identifier(column)))
        .collect();
    Ok(query.select(projection))
}

fn sole_source(query: &QueryDefinition) -> Option<&TableRef> {
    if query.projection().is_some() || !query.joins().is_empty() {
        return None;
    }
    match query.sources() {
        [source] => Some(source),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::QualifiedColumn;
    use crate::schema::StaticSchema;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn schema() -> StaticSchema {
        StaticSchema::new()
            .with_table("albums", ["id", "name", "artist_id"])
            .with_table("artists", ["id", "name"])
    }

    fn albums() -> TableRef {
        TableRef::new("albums")
    }

    fn col(table: &TableRef, name: &str) -> SelectExpr {
        qualify(table, identifier(name))
    }

    /// Fails the test if consulted.
    struct Untouchable;

    impl ColumnIntrospector for Untouchable {
        fn current_columns(&self, table: &TableRef) -> Result<Vec<String>, LifeError> {
            panic!("introspected {table} for a query that should be left alone");
        }
    }

    struct Counting<'a> {
        inner: &'a StaticSchema,
        calls: AtomicUsize,
    }

    impl ColumnIntrospector for Counting<'_> {
        fn current_columns(&self, table: &TableRef) -> Result<Vec<String>, LifeError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.current_columns(table)
        }
    }

    #[test]
    fn test_single_table_gets_qualified_columns_in_order() {
        let query = rewrite(QueryDefinition::from_table("albums"), &schema()).unwrap();
        let albums = albums();
        assert_eq!(
            query.projection(),
            Some(
                &[
                    col(&albums, "id"),
                    col(&albums, "name"),
                    col(&albums, "artist_id"),
                ][..]
            )
        );
        assert_eq!(query.sources(), &[albums][..]);
        assert!(query.joins().is_empty());
    }

    #[test]
    fn test_explicit_projection_is_kept() {
        let original = QueryDefinition::from_table("albums").select([col(&albums(), "name")]);
        let query = rewrite(original.clone(), &Untouchable).unwrap();
        assert_eq!(query, original);
    }

    #[test]
    fn test_empty_explicit_projection_is_kept() {
        let original = QueryDefinition::from_table("albums").select(Vec::<SelectExpr>::new());
        let query = rewrite(original.clone(), &Untouchable).unwrap();
        assert_eq!(query.projection(), Some(&[][..]));
        assert_eq!(query, original);
    }

    #[test]
    fn test_select_all_counts_as_explicit() {
        let original = QueryDefinition::from_table("albums").select_all();
        assert_eq!(rewrite(original.clone(), &Untouchable).unwrap(), original);
    }

    #[test]
    fn test_no_source_is_kept() {
        let original = QueryDefinition::new();
        assert_eq!(rewrite(original.clone(), &Untouchable).unwrap(), original);
    }

    #[test]
    fn test_two_sources_are_kept() {
        let original = QueryDefinition::from_table("albums").from("artists");
        let query = rewrite(original.clone(), &Untouchable).unwrap();
        assert!(query.projection().is_none());
        assert_eq!(query, original);
    }

    #[test]
    fn test_join_is_kept() {
        let artists = TableRef::new("artists");
        let original = QueryDefinition::from_table("albums").inner_join(
            artists.clone(),
            QualifiedColumn::new(albums(), identifier("artist_id")),
            QualifiedColumn::new(artists, identifier("id")),
        );
        let query = rewrite(original.clone(), &Untouchable).unwrap();
        assert!(query.projection().is_none());
        assert_eq!(query, original);
    }

    #[test]
    fn test_join_with_two_sources_is_kept() {
        let artists = TableRef::new("artists");
        let original = QueryDefinition::from_table("albums").from("tracks").left_join(
            artists.clone(),
            QualifiedColumn::new(albums(), identifier("artist_id")),
            QualifiedColumn::new(artists, identifier("id")),
        );
        assert_eq!(rewrite(original.clone(), &Untouchable).unwrap(), original);
    }

    #[test]
    fn test_rewrite_is_idempotent() {
        let schema = schema();
        let counting = Counting { inner: &schema, calls: AtomicUsize::new(0) };

        let once = rewrite(QueryDefinition::from_table("albums"), &counting).unwrap();
        let twice = rewrite(once.clone(), &counting).unwrap();

        assert_eq!(once, twice);
        assert_eq!(counting.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_missing_table_error_propagates() {
        let err = rewrite(QueryDefinition::from_table("tracks"), &schema()).unwrap_err();
        assert!(matches!(err, LifeError::TableNotFound(t) if t == "tracks"));
    }

    #[test]
    fn test_aliased_source_is_qualified_by_alias() {
        let aliased = TableRef::new("albums").aliased("a");
        let query = rewrite(QueryDefinition::from_table(aliased), &schema()).unwrap();
        assert_eq!(
            query.to_sql(),
            r#"SELECT "a"."id", "a"."name", "a"."artist_id" FROM "albums" AS "a""#
        );
    }

    #[test]
    fn test_schema_qualified_source() {
        let schema = StaticSchema::new().with_table("music.albums", ["id"]);
        let query = rewrite(QueryDefinition::from_table("music.albums"), &schema).unwrap();
        assert_eq!(
            query.to_sql(),
            r#"SELECT "music"."albums"."id" FROM "music"."albums""#
        );
    }

    #[test]
    fn test_other_clauses_survive() {
        let query = QueryDefinition::from_table("albums").limit(3);
        let query = rewrite(query, &schema()).unwrap();
        assert_eq!(
            query.to_sql(),
            r#"SELECT "albums"."id", "albums"."name", "albums"."artist_id" FROM "albums" LIMIT 3"#
        );
    }

    #[test]
    fn test_table_without_columns_stays_unset() {
        let schema = StaticSchema::new().with_table("empty", Vec::<String>::new());
        let query = rewrite(QueryDefinition::from_table("empty"), &schema).unwrap();
        assert!(query.projection().is_none());
    }

    #[test]
    fn test_configure_rewrites_existing_dataset() {
        use std::sync::Arc;

        let mut model = Model::with_table("Album", "albums", Arc::new(schema())).unwrap();
        assert!(model.dataset().unwrap().projection().is_none());

        model.plugin(ColumnSelect).unwrap();
        assert_eq!(model.dataset().unwrap().projection().map(<[SelectExpr]>::len), Some(3));
    }
}
