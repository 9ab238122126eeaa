// fixtures/mod.rs - Test fixtures module
//
// A fixture is reusable test data. Each collection fixture is a struct
// implementing TestCollection; tests load it into an InMemoryCatalog (or
// seed a scratch MongoDB collection with it) instead of hand-writing
// documents in every test.

pub mod collections;

use bson::Document;

use crate::catalog::api::InMemoryCatalog;

/// A set of game documents shaped like the live catalog.
pub trait TestCollection {
    /// The documents, in insertion order.
    fn documents() -> Vec<Document>;

    /// An in-memory store holding exactly these documents.
    fn catalog() -> InMemoryCatalog {
        InMemoryCatalog::new(Self::documents())
    }
}
