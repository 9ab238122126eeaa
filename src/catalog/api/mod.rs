// catalog/api/mod.rs - Store access for the catalog
//
// `CatalogStore` is the seam between the query core and whatever holds
// the documents. The MongoDB implementation needs the `db-tools` feature;
// the in-memory one is always available and backs the tests.

use async_trait::async_trait;
use bson::{Bson, Document};

use crate::catalog::error::CatalogError;
use crate::catalog::query::CatalogQuery;

pub mod analytics;
pub mod memory;
pub mod queries;

#[cfg(feature = "db-tools")]
pub mod mongo;

pub use memory::InMemoryCatalog;
#[cfg(feature = "db-tools")]
pub use mongo::MongoCatalog;

/// A document collection holding game records.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Short name used in log lines and errors.
    fn name(&self) -> &'static str;

    /// Run a filtered, optionally sorted and capped find.
    async fn find(&self, query: &CatalogQuery) -> Result<Vec<Document>, CatalogError>;

    /// First document matching `filter`.
    async fn find_one(&self, filter: Document) -> Result<Option<Document>, CatalogError>;

    /// Deduplicated values of one field. Values keep their stored shape, so
    /// array-valued fields may come back as arrays.
    async fn distinct(&self, field: &str) -> Result<Vec<Bson>, CatalogError>;

    /// Number of documents in the collection.
    async fn count(&self) -> Result<u64, CatalogError>;

    /// Run an aggregation pipeline.
    async fn aggregate(&self, pipeline: Vec<Document>) -> Result<Vec<Document>, CatalogError>;

    /// Raw collection statistics (`collStats`).
    async fn collection_stats(&self) -> Result<Document, CatalogError> {
        Err(CatalogError::Unsupported {
            store: self.name(),
            operation: "collStats",
        })
    }
}
