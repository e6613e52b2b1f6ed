//! Integration tests for the column_select plugin
//!
//! These drive the model layer end to end with an in-memory schema:
//! attaching the plugin to a model that already has a dataset, setting
//! datasets afterwards, subclassing, and a migration landing while models
//! are configured.

use lifeguard_column_select::query::{identifier, qualify, QualifiedColumn, SortOrder};
use lifeguard_column_select::{
    CachedIntrospector, ColumnSelect, LifeError, Model, QueryDefinition, SharedIntrospector,
    StaticSchema, TableRef,
};
use std::sync::Arc;

fn music_schema() -> Arc<StaticSchema> {
    Arc::new(
        StaticSchema::new()
            .with_table("albums", ["id", "name", "artist_id"])
            .with_table("artists", ["id", "name"])
            .with_table("archive.albums", ["id", "name", "archived_at"]),
    )
}

const ALBUMS_SQL: &str = r#"SELECT "albums"."id", "albums"."name", "albums"."artist_id" FROM "albums""#;

// ============================================================================
// Configuration hook
// ============================================================================

#[test]
fn test_plugin_on_model_with_dataset() {
    let mut album = Model::with_table("Album", "albums", music_schema()).unwrap();
    album.plugin(ColumnSelect).unwrap();

    assert!(album.has_plugin("column_select"));
    assert_eq!(album.select_sql().as_deref(), Some(ALBUMS_SQL));
}

#[test]
fn test_plugin_on_model_without_dataset() {
    let mut album = Model::new("Album", music_schema());
    album.plugin_named("column_select").unwrap();
    assert!(album.dataset().is_none());

    album.set_table("albums").unwrap();
    assert_eq!(album.select_sql().as_deref(), Some(ALBUMS_SQL));
}

#[test]
fn test_configure_fails_for_missing_table() {
    let mut model = Model::with_table("Track", "tracks", music_schema()).unwrap();
    let err = model.plugin(ColumnSelect).unwrap_err();
    assert!(matches!(err, LifeError::TableNotFound(_)));
}

// ============================================================================
// Derivation hook
// ============================================================================

#[test]
fn test_explicit_dataset_selection_is_respected() {
    let mut album = Model::new("Album", music_schema());
    album.plugin(ColumnSelect).unwrap();

    let albums = TableRef::new("albums");
    album
        .set_dataset(QueryDefinition::from_table(albums.clone()).select([qualify(&albums, identifier("name"))]))
        .unwrap();
    assert_eq!(
        album.select_sql().as_deref(),
        Some(r#"SELECT "albums"."name" FROM "albums""#)
    );
}

#[test]
fn test_multi_source_dataset_is_left_alone() {
    let mut model = Model::new("AlbumArtist", music_schema());
    model.plugin(ColumnSelect).unwrap();
    model
        .set_dataset(QueryDefinition::from_table("albums").from("artists"))
        .unwrap();

    assert!(model.dataset().unwrap().projection().is_none());
    assert_eq!(
        model.select_sql().as_deref(),
        Some(r#"SELECT * FROM "albums", "artists""#)
    );
}

#[test]
fn test_joined_dataset_is_left_alone() {
    let albums = TableRef::new("albums");
    let artists = TableRef::new("artists");
    let mut model = Model::new("AlbumWithArtist", music_schema());
    model.plugin(ColumnSelect).unwrap();
    model
        .set_dataset(QueryDefinition::from_table(albums.clone()).inner_join(
            artists.clone(),
            QualifiedColumn::new(albums, identifier("artist_id")),
            QualifiedColumn::new(artists, identifier("id")),
        ))
        .unwrap();

    assert!(model.dataset().unwrap().projection().is_none());
}

#[test]
fn test_derived_dataset_keeps_other_clauses() {
    let mut album = Model::new("Album", music_schema());
    album.plugin(ColumnSelect).unwrap();

    let albums = TableRef::new("albums");
    let derived = album
        .convert_input_dataset(
            QueryDefinition::from_table(albums.clone())
                .order_by(qualify(&albums, identifier("name")), SortOrder::Asc)
                .limit(2),
        )
        .unwrap();
    assert_eq!(
        derived.to_sql(),
        format!(r#"{ALBUMS_SQL} ORDER BY "albums"."name" ASC LIMIT 2"#)
    );
    // Converting does not store
    assert!(album.dataset().is_none());
}

// ============================================================================
// Subclasses
// ============================================================================

#[test]
fn test_subclasses_evaluate_their_own_table() {
    let mut base = Model::new("Base", music_schema());
    base.plugin(ColumnSelect).unwrap();

    let artist = base.subclass("Artist", Some(TableRef::new("artists"))).unwrap();
    let archived = base
        .subclass("ArchivedAlbum", Some(TableRef::with_schema("archive", "albums")))
        .unwrap();

    assert_eq!(
        artist.select_sql().as_deref(),
        Some(r#"SELECT "artists"."id", "artists"."name" FROM "artists""#)
    );
    assert_eq!(
        archived.select_sql().as_deref(),
        Some(
            r#"SELECT "archive"."albums"."id", "archive"."albums"."name", "archive"."albums"."archived_at" FROM "archive"."albums""#
        )
    );
}

#[test]
fn test_subclass_without_table_inherits_rewritten_dataset() {
    let mut album = Model::with_table("Album", "albums", music_schema()).unwrap();
    album.plugin(ColumnSelect).unwrap();

    let single = album.subclass("Single", None).unwrap();
    assert_eq!(single.dataset(), album.dataset());
    assert_eq!(single.columns().unwrap(), vec!["id", "name", "artist_id"]);
}

// ============================================================================
// Migrations while running
// ============================================================================

#[test]
fn test_column_added_after_configuration_is_not_selected() {
    let schema = music_schema();
    let mut album = Model::with_table("Album", "albums", schema.clone()).unwrap();
    album.plugin(ColumnSelect).unwrap();

    schema
        .add_column(&TableRef::new("albums"), "released_on")
        .unwrap();

    assert_eq!(album.select_sql().as_deref(), Some(ALBUMS_SQL));

    // A model derived afterwards sees the new column
    let later = album.subclass("Later", Some(TableRef::new("albums"))).unwrap();
    assert_eq!(later.columns().unwrap().len(), 4);
}

#[test]
fn test_schema_cache_pins_columns_across_models() {
    let schema = music_schema();
    let cache = Arc::new(CachedIntrospector::new(Arc::clone(&schema)));
    let shared: SharedIntrospector = cache.clone();

    let mut first = Model::new("First", Arc::clone(&shared));
    first.plugin(ColumnSelect).unwrap();
    first.set_table("albums").unwrap();

    schema
        .add_column(&TableRef::new("albums"), "released_on")
        .unwrap();

    let mut second = Model::new("Second", Arc::clone(&shared));
    second.plugin(ColumnSelect).unwrap();
    second.set_table("albums").unwrap();
    assert_eq!(second.select_sql(), first.select_sql());

    cache.invalidate(&TableRef::new("albums")).unwrap();
    second.set_table("albums").unwrap();
    assert_eq!(second.columns().unwrap().len(), 4);
}
