// catalog/api/queries.rs - Catalog operations used by the presentation layer
//
// Philosophy: pure functions that take a store and parameters and return
// typed results. The builder and the normalizer do the shaping; these
// functions only sequence one store call with them. Store failures are
// propagated untouched so the caller can show a single notification.

use std::collections::BTreeSet;

use bson::{doc, oid::ObjectId, Bson, Document};

use crate::catalog::api::CatalogStore;
use crate::catalog::error::CatalogError;
use crate::catalog::model::{FieldValue, FilterCriteria, GameDetails, SearchResults};
use crate::catalog::normalize;
use crate::catalog::query::{tagged_documents, CatalogQuery, QueryBuilder};
use crate::catalog::tags;

/// Documents sampled when collecting the tag vocabulary.
pub const TAG_SAMPLE_SIZE: i64 = 1000;

/// Run a search and normalize every returned document.
pub async fn search_games<S>(store: &S, criteria: &FilterCriteria) -> Result<SearchResults, CatalogError>
where
    S: CatalogStore + ?Sized,
{
    search_games_with(store, &QueryBuilder::default(), criteria).await
}

/// Same as `search_games` with an explicitly configured builder.
pub async fn search_games_with<S>(
    store: &S,
    builder: &QueryBuilder,
    criteria: &FilterCriteria,
) -> Result<SearchResults, CatalogError>
where
    S: CatalogStore + ?Sized,
{
    tracing::info!("Search request on {}: criteria={:?}", store.name(), criteria);

    let query = builder.build(criteria);
    let documents = store.find(&query).await.map_err(|e| {
        tracing::error!("Search failed: {}", e);
        e
    })?;

    let results: Vec<_> = documents.iter().map(normalize::normalize).collect();
    tracing::info!("Search successful: found {} games", results.len());

    Ok(SearchResults {
        total_count: results.len(),
        results,
    })
}

/// Look a game up by the identifier shown in the result list.
///
/// The identifier is tried as an object id first, then as a literal string
/// id. A miss on both is `Ok(None)`, not an error.
pub async fn find_by_id<S>(store: &S, id: &str) -> Result<Option<Document>, CatalogError>
where
    S: CatalogStore + ?Sized,
{
    let id = id.trim();

    if let Ok(oid) = ObjectId::parse_str(id) {
        if let Some(game) = store.find_one(doc! { "_id": oid }).await? {
            return Ok(Some(game));
        }
        tracing::debug!("No document with object id {}, retrying as string id", id);
    }

    let game = store.find_one(doc! { "_id": id }).await?;
    if game.is_none() {
        tracing::info!("No details found for id {:?}", id);
    }
    Ok(game)
}

/// Detail bundle for one game, `None` when the id matches nothing.
pub async fn game_details<S>(store: &S, id: &str) -> Result<Option<GameDetails>, CatalogError>
where
    S: CatalogStore + ?Sized,
{
    Ok(find_by_id(store, id).await?.as_ref().map(normalize::details))
}

/// Sorted genre names across the catalog. Genre values may be stored as
/// plain strings or as arrays of strings; both are flattened.
pub async fn available_genres<S>(store: &S) -> Result<Vec<String>, CatalogError>
where
    S: CatalogStore + ?Sized,
{
    let values = store.distinct("genres").await?;
    Ok(flatten_values(&values))
}

/// Sorted tag names seen in a sample of tagged documents.
pub async fn available_tags<S>(store: &S) -> Result<Vec<String>, CatalogError>
where
    S: CatalogStore + ?Sized,
{
    let query = CatalogQuery::filter(tagged_documents()).with_limit(TAG_SAMPLE_SIZE);
    let documents = store.find(&query).await?;

    let names: BTreeSet<String> = documents.iter().flat_map(tags::tag_names).collect();
    tracing::debug!("Collected {} tags from {} documents", names.len(), documents.len());
    Ok(names.into_iter().collect())
}

/// Flatten distinct values into a sorted, deduplicated list of non-empty
/// strings.
pub fn flatten_values(values: &[Bson]) -> Vec<String> {
    let names: BTreeSet<String> = values
        .iter()
        .filter_map(FieldValue::from_bson)
        .flat_map(FieldValue::into_values)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .collect();
    names.into_iter().collect()
}
