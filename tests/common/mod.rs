// common/mod.rs - Shared test utilities for catalog setup
//
// Helpers here keep the suites free of hand-written documents:
// - in-memory catalogs loaded from the fixture collections
// - criteria presets matching what the search form produces
// - a scratch MongoDB collection for the live tests (db-tools only)

#![allow(dead_code)]

use steam_catalog::catalog::api::InMemoryCatalog;
use steam_catalog::catalog::model::{DisplayRecord, FilterCriteria};
use steam_catalog::fixtures::collections::{GamesCollection, PlatformTrioCollection};
use steam_catalog::fixtures::TestCollection;

/// Criteria with nothing selected: no name, no price range, no platform.
pub fn open_criteria() -> FilterCriteria {
    FilterCriteria::default()
}

/// Criteria a freshly opened search form submits.
pub fn default_criteria() -> FilterCriteria {
    FilterCriteria::initial()
}

pub fn games_catalog() -> InMemoryCatalog {
    GamesCollection::catalog()
}

pub fn trio_catalog() -> InMemoryCatalog {
    PlatformTrioCollection::catalog()
}

/// Names of the rows, in result order.
pub fn names(rows: &[DisplayRecord]) -> Vec<&str> {
    rows.iter().map(|row| row.name.as_str()).collect()
}

/// Store settings for the live tests, `None` when MONGODB_URI is unset.
#[cfg(feature = "db-tools")]
pub fn live_config(collection: &str) -> Option<steam_catalog::catalog::config::StoreConfig> {
    dotenv::dotenv().ok();
    match steam_catalog::catalog::config::StoreConfig::from_env() {
        Ok(mut config) => {
            config.collection = collection.to_string();
            Some(config)
        }
        Err(e) => {
            eprintln!("Skipping live catalog test: {}", e);
            None
        }
    }
}

/// Run `test_fn` against a scratch collection seeded with the fixture
/// documents. The collection is dropped afterwards, also when the test
/// body fails.
#[cfg(feature = "db-tools")]
pub async fn with_live_catalog<C, F, Fut>(test_name: &str, test_fn: F) -> anyhow::Result<()>
where
    C: TestCollection,
    F: FnOnce(steam_catalog::catalog::api::MongoCatalog) -> Fut,
    Fut: std::future::Future<Output = anyhow::Result<()>>,
{
    use steam_catalog::catalog::api::MongoCatalog;

    let collection = format!(
        "test_{}_{}",
        test_name,
        chrono::Utc::now().timestamp_millis()
    );
    let Some(config) = live_config(&collection) else {
        return Ok(());
    };

    let catalog = MongoCatalog::connect(&config).await?;
    catalog.collection().drop().await?;
    catalog.collection().insert_many(C::documents()).await?;

    let result = test_fn(catalog.clone()).await;

    catalog.collection().drop().await?;
    result
}
