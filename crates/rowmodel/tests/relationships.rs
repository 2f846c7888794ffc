use std::sync::Arc;

use rowmodel::TableToTypeResolver;
use rowmodel::prelude::*;
use rowmodel_memory::{MemoryRow, MemoryStore};
use serde_json::json;

fn mapper() -> Arc<Mapper<MemoryRow>> {
    Mapper::builder()
        .register(
            TypeDefinition::new("model::Author")
                .property("@property-read int $id")
                .property("@property string $name")
                .property("@property-read Book[] $books m:belongsToMany"),
        )
        .register(
            TypeDefinition::new("model::Book")
                .property("@property-read int $id")
                .property("@property string $title")
                .property("@property-read Author $author m:hasOne")
                .property("@property-read Author|null $editor m:hasOne(editor_id:author)")
                .property("@property-read Tag[] $tags m:hasMany")
                .property("@property-read Review $review m:belongsToOne")
                .property(
                    "@property-read Review|null $optionalReview m:belongsToOne(book_id:review)",
                ),
        )
        .register(
            TypeDefinition::new("model::Tag")
                .property("@property-read int $id")
                .property("@property string $name"),
        )
        .register(
            TypeDefinition::new("model::Review")
                .property("@property-read int $id")
                .property("@property-read Book $book m:hasOne"),
        )
        .build()
        .unwrap()
}

fn store() -> MemoryStore {
    MemoryStore::from_json(json!({
        "author": [
            { "id": 1, "name": "Terry" },
            { "id": 2, "name": "Neil" },
            { "id": 3, "name": "Nobody" },
        ],
        "book": [
            { "id": 1, "title": "Mort", "author_id": 1, "editor_id": null },
            { "id": 2, "title": "Good Omens", "author_id": 2, "editor_id": 1 },
            { "id": 3, "title": "Orphan", "author_id": 99 },
        ],
        "tag": [
            { "id": 1, "name": "fantasy" },
            { "id": 2, "name": "humor" },
        ],
        "book_tag": [
            { "book_id": 1, "tag_id": 2 },
            { "book_id": 2, "tag_id": 1 },
            { "book_id": 1, "tag_id": 42 },
            { "book_id": 1, "tag_id": 1 },
        ],
        "review": [
            { "id": 1, "book_id": 1 },
            { "id": 2, "book_id": 2 },
            { "id": 3, "book_id": 2 },
        ],
    }))
    .unwrap()
}

fn book(mapper: &Arc<Mapper<MemoryRow>>, store: &MemoryStore, id: i64) -> Entity<MemoryRow> {
    mapper.entity("model::Book", store.find("book", id).unwrap()).unwrap()
}

fn names(entities: &[Entity<MemoryRow>]) -> Vec<String> {
    entities
        .iter()
        .map(|e| e.get("name").unwrap().as_str().unwrap().to_string())
        .collect()
}

#[test]
fn has_one_wraps_the_referenced_row() {
    let (mapper, store) = (mapper(), store());
    let author = book(&mapper, &store, 1).get("author").unwrap().into_entity().unwrap();

    assert_eq!(author.type_name().as_str(), "model::Author");
    assert_eq!(author.row(), &store.find("author", 1).unwrap());
    assert_eq!(
        author,
        mapper.entity("model::Author", store.find("author", 1).unwrap()).unwrap()
    );
}

#[test]
fn has_one_missing_target_follows_nullability() {
    let (mapper, store) = (mapper(), store());

    let err = book(&mapper, &store, 3).get("author").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NullViolation);

    assert!(book(&mapper, &store, 1).get("editor").unwrap().is_null());
    let editor = book(&mapper, &store, 2).get("editor").unwrap().into_entity().unwrap();
    assert_eq!(editor.get("name").unwrap().as_str(), Some("Terry"));
}

#[test]
fn has_many_drops_dangling_association_rows() {
    let (mapper, store) = (mapper(), store());
    let tags = book(&mapper, &store, 1).get("tags").unwrap().into_collection().unwrap();

    // Three association rows, one pointing at a missing tag.
    assert_eq!(names(&tags), ["humor", "fantasy"]);
    assert!(tags.iter().all(|t| t.type_name().as_str() == "model::Tag"));

    let tags = book(&mapper, &store, 3).get("tags").unwrap();
    assert_eq!(tags.as_collection().map(<[_]>::len), Some(0));
}

#[test]
fn belongs_to_many_returns_every_referencing_row() {
    let (mapper, store) = (mapper(), store());
    let author = |id: i64| {
        mapper
            .entity("model::Author", store.find("author", id).unwrap())
            .unwrap()
    };

    let books = author(1).get("books").unwrap().into_collection().unwrap();
    assert_eq!(books.len(), 1);
    assert_eq!(books[0].get("title").unwrap().as_str(), Some("Mort"));

    let books = author(3).get("books").unwrap().into_collection().unwrap();
    assert!(books.is_empty());
}

#[test]
fn belongs_to_one_single_row() {
    let (mapper, store) = (mapper(), store());
    let review = book(&mapper, &store, 1).get("review").unwrap().into_entity().unwrap();
    assert_eq!(review.row(), &store.find("review", 1).unwrap());
}

#[test]
fn belongs_to_one_ambiguity_ignores_nullability() {
    let (mapper, store) = (mapper(), store());
    let good_omens = book(&mapper, &store, 2);

    for property in ["review", "optionalReview"] {
        let err = good_omens.get(property).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AmbiguousRelationship, "{property}");
        assert!(matches!(err, Error::AmbiguousRelationship { count: 2, .. }));
    }
}

#[test]
fn belongs_to_one_without_rows_follows_nullability() {
    let (mapper, store) = (mapper(), store());
    let orphan = book(&mapper, &store, 3);

    assert_eq!(orphan.get("review").unwrap_err().kind(), ErrorKind::NullViolation);
    assert!(orphan.get("optionalReview").unwrap().is_null());
}

#[test]
fn book_with_one_or_two_reviews() {
    let mapper = mapper();
    let fixture = |reviews: serde_json::Value| {
        MemoryStore::from_json(json!({
            "book": [{ "id": 7, "title": "Solo", "author_id": 1 }],
            "review": reviews,
        }))
        .unwrap()
    };

    let store = fixture(json!([{ "id": 1, "book_id": 7 }, { "id": 2, "book_id": 7 }]));
    let err = book(&mapper, &store, 7).get("review").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AmbiguousRelationship);

    let store = fixture(json!([{ "id": 1, "book_id": 7 }]));
    let review = book(&mapper, &store, 7).get("review").unwrap().into_entity().unwrap();
    let expected = mapper
        .entity("model::Review", store.find("review", 1).unwrap())
        .unwrap();
    assert_eq!(review, expected);
}

#[test]
fn traversal_chains_through_fresh_entities() {
    let (mapper, store) = (mapper(), store());
    let review = mapper
        .entity("model::Review", store.find("review", 1).unwrap())
        .unwrap();

    let author = review
        .get("book")
        .unwrap()
        .into_entity()
        .unwrap()
        .get("author")
        .unwrap()
        .into_entity()
        .unwrap();
    assert_eq!(author.get("name").unwrap().as_str(), Some("Terry"));

    // Back to the same book through the author: a new wrapper, equal by value.
    let again = author.get("books").unwrap().into_collection().unwrap();
    assert_eq!(again[0], book(&mapper, &store, 1));
}

#[test]
fn missing_table_surfaces_data_source_error() {
    let mapper = mapper();
    let store = MemoryStore::from_json(json!({
        "book": [{ "id": 1, "title": "Lonely", "author_id": 1 }],
    }))
    .unwrap();
    let err = book(&mapper, &store, 1).get("author").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DataSource);
}

#[test]
fn unregistered_target_type_is_a_schema_error() {
    let mapper = Mapper::builder()
        .register(
            TypeDefinition::new("model::Book")
                .property("@property-read Publisher $publisher m:hasOne"),
        )
        .build()
        .unwrap();
    let store = MemoryStore::from_json(json!({
        "book": [{ "id": 1, "publisher_id": 5 }],
        "publisher": [{ "id": 5 }],
    }))
    .unwrap();
    let book = mapper.entity("model::Book", store.row("book", 0).unwrap()).unwrap();

    let err = book.get("publisher").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MalformedSchema);
    assert!(err.is_configuration());
}

struct LegacyTables;

impl TableToTypeResolver for LegacyTables {
    fn type_for_table(&self, _current: &TypeName, table: &str) -> TypeName {
        match table {
            "tbl_person" => TypeName::new("people::Person"),
            other => TypeName::new(other),
        }
    }
}

#[test]
fn custom_resolver_picks_target_types() {
    let mapper = Mapper::builder()
        .resolver(Arc::new(LegacyTables))
        .register(
            TypeDefinition::new("docs::Document")
                .property("@property-read ::people::Person $owner m:hasOne(owner:tbl_person)"),
        )
        .register(TypeDefinition::new("people::Person").property("@property string $name"))
        .build()
        .unwrap();
    let store = MemoryStore::from_json(json!({
        "document": [{ "id": 1, "owner": 4 }],
        "tbl_person": [{ "id": 4, "name": "Ada" }],
    }))
    .unwrap();

    let document = mapper
        .entity("docs::Document", store.row("document", 0).unwrap())
        .unwrap();
    let owner = document.get("owner").unwrap().into_entity().unwrap();
    assert_eq!(owner.type_name().as_str(), "people::Person");
    assert_eq!(owner.get("name").unwrap().as_str(), Some("Ada"));
}
