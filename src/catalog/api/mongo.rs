// catalog/api/mongo.rs - MongoDB-backed catalog store
//
// One long-lived client per process. The driver pools connections
// internally; queries run one at a time and rely on the driver's own
// timeouts. No retries: a failure surfaces at the call that hit it.

use async_trait::async_trait;
use bson::{doc, Bson, Document};
use futures::TryStreamExt;
use mongodb::{Client, Collection, Database};

use crate::catalog::api::CatalogStore;
use crate::catalog::config::StoreConfig;
use crate::catalog::error::CatalogError;
use crate::catalog::query::CatalogQuery;

#[derive(Clone, Debug)]
pub struct MongoCatalog {
    database: Database,
    collection: Collection<Document>,
}

impl MongoCatalog {
    /// Connect and verify the server answers a ping.
    pub async fn connect(config: &StoreConfig) -> Result<Self, CatalogError> {
        tracing::info!("Connecting to catalog at {}", config.redacted_uri());

        let client = Client::with_uri_str(&config.uri).await?;
        let catalog = Self::from_client(&client, &config.database, &config.collection);
        catalog.ping().await?;

        tracing::info!(
            "Connected to catalog {}.{}",
            config.database,
            config.collection
        );
        Ok(catalog)
    }

    pub fn from_client(client: &Client, database: &str, collection: &str) -> Self {
        let database = client.database(database);
        let collection = database.collection::<Document>(collection);
        Self {
            database,
            collection,
        }
    }

    pub async fn ping(&self) -> Result<(), CatalogError> {
        self.database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| CatalogError::Connection(e.to_string()))?;
        Ok(())
    }

    /// The underlying driver collection, for seeding and cleanup.
    pub fn collection(&self) -> &Collection<Document> {
        &self.collection
    }
}

#[async_trait]
impl CatalogStore for MongoCatalog {
    fn name(&self) -> &'static str {
        "mongodb catalog"
    }

    async fn find(&self, query: &CatalogQuery) -> Result<Vec<Document>, CatalogError> {
        let filter = query.filter.as_document().clone();
        tracing::debug!("find filter={} sort={:?} limit={:?}", filter, query.sort, query.limit);

        let mut action = self.collection.find(filter);
        if let Some(sort) = &query.sort {
            action = action.sort(sort.to_document());
        }
        if let Some(limit) = query.limit {
            action = action.limit(limit);
        }

        let cursor = action.await?;
        let documents: Vec<Document> = cursor.try_collect().await?;
        Ok(documents)
    }

    async fn find_one(&self, filter: Document) -> Result<Option<Document>, CatalogError> {
        Ok(self.collection.find_one(filter).await?)
    }

    async fn distinct(&self, field: &str) -> Result<Vec<Bson>, CatalogError> {
        Ok(self.collection.distinct(field, doc! {}).await?)
    }

    async fn count(&self) -> Result<u64, CatalogError> {
        Ok(self.collection.count_documents(doc! {}).await?)
    }

    async fn aggregate(&self, pipeline: Vec<Document>) -> Result<Vec<Document>, CatalogError> {
        let cursor = self.collection.aggregate(pipeline).await?;
        let rows: Vec<Document> = cursor.try_collect().await?;
        Ok(rows)
    }

    async fn collection_stats(&self) -> Result<Document, CatalogError> {
        let stats = self
            .database
            .run_command(doc! { "collStats": self.collection.name() })
            .await?;
        Ok(stats)
    }
}
