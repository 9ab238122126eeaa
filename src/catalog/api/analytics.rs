// catalog/api/analytics.rs - Aggregate statistics over the catalog
//
// Each section is a pipeline builder plus a decoder from the store's
// result documents into typed rows. `catalog_report` runs every section;
// a failing section is logged and recorded, the others still run.

use std::collections::BTreeSet;
use std::future::Future;

use bson::{doc, Bson, Document};

use crate::catalog::api::CatalogStore;
use crate::catalog::error::CatalogError;
use crate::catalog::model::{
    Bucket, CatalogReport, FacetCount, Platform, PlatformSupport, PopularGame, StorageStats,
    YearCount,
};
use crate::catalog::normalize::{as_f64, as_i64};

pub const PRICE_BOUNDARIES: [i32; 9] = [0, 1, 5, 10, 20, 30, 50, 100, 1000];
pub const RATING_BOUNDARIES: [i32; 7] = [0, 50, 70, 80, 90, 95, 100];

/// Games need more reviews than this to count in the rating histogram.
pub const MIN_REVIEWS_FOR_RATING: i32 = 100;

const OTHER_BUCKET: &str = "other";
const TOP_FACETS: i32 = 10;
const TOP_TAGS: i32 = 15;

// ---------------------------------------------------------------------------
// Pipelines
// ---------------------------------------------------------------------------

fn bucket_stage(group_by: &str, boundaries: &[i32]) -> Document {
    doc! {
        "$bucket": {
            "groupBy": group_by,
            "boundaries": boundaries.to_vec(),
            "default": OTHER_BUCKET,
            "output": { "count": { "$sum": 1 } },
        }
    }
}

pub fn price_buckets_pipeline() -> Vec<Document> {
    vec![
        bucket_stage("$price", &PRICE_BOUNDARIES),
        doc! { "$sort": { "_id": 1 } },
    ]
}

pub fn release_years_pipeline() -> Vec<Document> {
    vec![
        doc! { "$match": { "release_date": { "$nin": [Bson::Null, ""] } } },
        doc! { "$project": { "year": { "$substrCP": ["$release_date", 0, 4] } } },
        doc! { "$group": { "_id": "$year", "count": { "$sum": 1 } } },
        doc! { "$sort": { "_id": 1 } },
    ]
}

/// Top values of an array field, by number of documents.
pub fn top_values_pipeline(field: &str, limit: i32) -> Vec<Document> {
    let path = format!("${}", field);
    vec![
        doc! { "$unwind": path.clone() },
        doc! { "$group": { "_id": path, "count": { "$sum": 1 } } },
        doc! { "$sort": { "count": -1 } },
        doc! { "$limit": limit },
    ]
}

pub fn rating_buckets_pipeline() -> Vec<Document> {
    let total = doc! { "$add": ["$positive", "$negative"] };
    vec![
        doc! { "$match": { "positive": { "$type": "number" }, "negative": { "$type": "number" } } },
        doc! {
            "$project": {
                "name": 1,
                "total_reviews": total.clone(),
                "positive_rate": {
                    "$cond": [
                        { "$eq": [total.clone(), 0] },
                        0,
                        { "$multiply": [{ "$divide": ["$positive", total] }, 100] },
                    ]
                },
            }
        },
        doc! { "$match": { "total_reviews": { "$gt": MIN_REVIEWS_FOR_RATING } } },
        bucket_stage("$positive_rate", &RATING_BOUNDARIES),
    ]
}

pub fn platform_support_pipeline() -> Vec<Document> {
    vec![
        doc! {
            "$group": {
                "_id": { "windows": "$windows", "mac": "$mac", "linux": "$linux" },
                "count": { "$sum": 1 },
            }
        },
        doc! { "$sort": { "count": -1 } },
    ]
}

pub fn owner_distribution_pipeline() -> Vec<Document> {
    vec![
        doc! { "$group": { "_id": "$estimated_owners", "count": { "$sum": 1 } } },
        doc! { "$sort": { "_id": 1 } },
    ]
}

pub fn most_recommended_pipeline(limit: i32) -> Vec<Document> {
    vec![
        doc! { "$match": { "recommendations": { "$type": "number" } } },
        doc! { "$sort": { "recommendations": -1 } },
        doc! { "$limit": limit },
        doc! { "$project": { "name": 1, "recommendations": 1, "peak_ccu": 1 } },
    ]
}

/// Tag frequency computed inside the store by splitting the serialized
/// mapping on commas and colons. Names come back with their quotes, which
/// `decode_tag_counts` strips.
pub fn top_tags_pipeline(limit: i32) -> Vec<Document> {
    vec![
        doc! { "$match": { "tags": { "$type": "string", "$regex": "^\\{.*\\}$" } } },
        doc! {
            "$project": {
                "tag_str": {
                    "$substrCP": ["$tags", 1, { "$subtract": [{ "$strLenCP": "$tags" }, 2] }]
                }
            }
        },
        doc! { "$addFields": { "tag_pairs": { "$split": ["$tag_str", ","] } } },
        doc! { "$unwind": "$tag_pairs" },
        doc! {
            "$addFields": {
                "tag_name": {
                    "$trim": { "input": { "$arrayElemAt": [{ "$split": ["$tag_pairs", ":"] }, 0] } }
                }
            }
        },
        doc! { "$group": { "_id": "$tag_name", "count": { "$sum": 1 } } },
        doc! { "$sort": { "count": -1 } },
        doc! { "$limit": limit },
    ]
}

// ---------------------------------------------------------------------------
// Decoders
// ---------------------------------------------------------------------------

fn count_of(doc: &Document) -> i64 {
    doc.get("count").and_then(as_i64).unwrap_or(0)
}

/// Decode `$bucket` output. The bucket id is its lower boundary; the
/// upper boundary is the next one in `boundaries`.
pub fn decode_buckets(rows: &[Document], boundaries: &[i32]) -> Vec<Bucket> {
    rows.iter()
        .map(|row| {
            let lower = row.get("_id").and_then(as_f64);
            let upper = lower.and_then(|lower| {
                boundaries
                    .iter()
                    .position(|b| f64::from(*b) == lower)
                    .and_then(|i| boundaries.get(i + 1))
                    .map(|b| f64::from(*b))
            });
            Bucket {
                lower,
                upper,
                count: count_of(row),
            }
        })
        .collect()
}

pub fn decode_years(rows: &[Document]) -> Vec<YearCount> {
    rows.iter()
        .filter_map(|row| match row.get("_id") {
            Some(Bson::String(year)) if !year.trim().is_empty() => Some(YearCount {
                year: year.trim().to_string(),
                count: count_of(row),
            }),
            _ => None,
        })
        .collect()
}

/// Decode `{_id: value, count: n}` rows; empty and null ids are skipped.
pub fn decode_facets(rows: &[Document]) -> Vec<FacetCount> {
    rows.iter()
        .filter_map(|row| {
            let value = match row.get("_id")? {
                Bson::String(text) => text.trim().to_string(),
                Bson::Null => return None,
                other => other.to_string(),
            };
            (!value.is_empty()).then(|| FacetCount {
                value,
                count: count_of(row),
            })
        })
        .collect()
}

/// Like `decode_facets`, with surrounding quotes removed from tag names.
pub fn decode_tag_counts(rows: &[Document]) -> Vec<FacetCount> {
    decode_facets(rows)
        .into_iter()
        .map(|facet| FacetCount {
            value: facet.value.trim_matches(|c| c == '\'' || c == '"').to_string(),
            count: facet.count,
        })
        .filter(|facet| !facet.value.is_empty())
        .collect()
}

fn flag_set(value: Option<&Bson>) -> bool {
    match value {
        Some(Bson::String(text)) => text.eq_ignore_ascii_case("true"),
        Some(Bson::Boolean(flag)) => *flag,
        _ => false,
    }
}

pub fn decode_platform_support(rows: &[Document]) -> Vec<PlatformSupport> {
    rows.iter()
        .map(|row| {
            let platforms: BTreeSet<Platform> = match row.get("_id") {
                Some(Bson::Document(flags)) => Platform::ALL
                    .into_iter()
                    .filter(|platform| flag_set(flags.get(platform.field())))
                    .collect(),
                _ => BTreeSet::new(),
            };
            PlatformSupport {
                platforms,
                count: count_of(row),
            }
        })
        .collect()
}

pub fn decode_popular_games(rows: &[Document]) -> Vec<PopularGame> {
    rows.iter()
        .map(|row| PopularGame {
            name: row.get_str("name").unwrap_or("unknown").to_string(),
            recommendations: row.get("recommendations").and_then(as_i64).unwrap_or(0),
            peak_ccu: row.get("peak_ccu").and_then(as_i64).unwrap_or(0),
        })
        .collect()
}

pub fn decode_storage(stats: &Document) -> StorageStats {
    let number = |key: &str| stats.get(key).and_then(as_f64).unwrap_or(0.0);
    StorageStats {
        documents: stats.get("count").and_then(as_i64).unwrap_or(0).max(0) as u64,
        size_bytes: number("size"),
        storage_bytes: number("storageSize"),
        index_bytes: number("totalIndexSize"),
    }
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

async fn section<T, F>(name: &str, errors: &mut Vec<String>, run: F) -> Vec<T>
where
    F: Future<Output = Result<Vec<T>, CatalogError>>,
{
    match run.await {
        Ok(rows) => rows,
        Err(e) => {
            tracing::warn!("Statistics section '{}' failed: {}", name, e);
            errors.push(format!("{}: {}", name, e));
            Vec::new()
        }
    }
}

async fn aggregate_with<S, T>(
    store: &S,
    pipeline: Vec<Document>,
    decode: impl FnOnce(&[Document]) -> Vec<T>,
) -> Result<Vec<T>, CatalogError>
where
    S: CatalogStore + ?Sized,
{
    let rows = store.aggregate(pipeline).await?;
    Ok(decode(&rows))
}

/// Collect every statistics section.
pub async fn catalog_report<S>(store: &S) -> CatalogReport
where
    S: CatalogStore + ?Sized,
{
    let mut report = CatalogReport::default();
    let errors = &mut report.errors;

    report.storage = match store.collection_stats().await {
        Ok(stats) => {
            let mut storage = decode_storage(&stats);
            if storage.documents == 0 {
                storage.documents = store.count().await.unwrap_or(0);
            }
            Some(storage)
        }
        Err(e) => {
            tracing::warn!("Statistics section 'storage' failed: {}", e);
            errors.push(format!("storage: {}", e));
            None
        }
    };

    report.price_buckets = section(
        "price buckets",
        errors,
        aggregate_with(store, price_buckets_pipeline(), |rows| {
            decode_buckets(rows, &PRICE_BOUNDARIES)
        }),
    )
    .await;

    report.release_years = section(
        "release years",
        errors,
        aggregate_with(store, release_years_pipeline(), decode_years),
    )
    .await;

    report.top_developers = section(
        "developers",
        errors,
        aggregate_with(store, top_values_pipeline("developers", TOP_FACETS), decode_facets),
    )
    .await;

    report.top_genres = section(
        "genres",
        errors,
        aggregate_with(store, top_values_pipeline("genres", TOP_FACETS), decode_facets),
    )
    .await;

    report.rating_buckets = section(
        "positive rate",
        errors,
        aggregate_with(store, rating_buckets_pipeline(), |rows| {
            decode_buckets(rows, &RATING_BOUNDARIES)
        }),
    )
    .await;

    report.platform_support = section(
        "platforms",
        errors,
        aggregate_with(store, platform_support_pipeline(), decode_platform_support),
    )
    .await;

    report.owner_distribution = section(
        "estimated owners",
        errors,
        aggregate_with(store, owner_distribution_pipeline(), decode_facets),
    )
    .await;

    report.most_recommended = section(
        "most recommended",
        errors,
        aggregate_with(store, most_recommended_pipeline(TOP_FACETS), decode_popular_games),
    )
    .await;

    report.top_tags = section(
        "tags",
        errors,
        aggregate_with(store, top_tags_pipeline(TOP_TAGS), decode_tag_counts),
    )
    .await;

    tracing::info!(
        "Statistics report complete: {} sections failed",
        report.errors.len()
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bucket_stage_shape() {
        let stage = bucket_stage("$price", &PRICE_BOUNDARIES);
        let bucket = stage.get_document("$bucket").unwrap();
        assert_eq!(bucket.get_str("groupBy").unwrap(), "$price");
        assert_eq!(bucket.get_array("boundaries").unwrap().len(), PRICE_BOUNDARIES.len());
        assert_eq!(bucket.get_str("default").unwrap(), OTHER_BUCKET);
    }

    #[test]
    fn test_top_values_pipeline_unwinds_field() {
        let pipeline = top_values_pipeline("genres", 10);
        assert_eq!(pipeline[0].get_str("$unwind").unwrap(), "$genres");
        assert_eq!(pipeline[3].get_i32("$limit").unwrap(), 10);
    }

    #[test]
    fn test_flag_set_accepts_both_encodings() {
        assert!(flag_set(Some(&Bson::String("True".into()))));
        assert!(flag_set(Some(&Bson::Boolean(true))));
        assert!(!flag_set(Some(&Bson::String("False".into()))));
        assert!(!flag_set(None));
    }
}
