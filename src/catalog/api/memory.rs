// catalog/api/memory.rs - In-memory catalog store
//
// Evaluates the part of the document query language this crate emits:
// `$and`, `$or`, plain equality (including membership in array fields),
// `$eq`, `$ne`, `$in`, `$exists`, `$gt`/`$gte`/`$lt`/`$lte` and
// `$regex`/`$options`. Sorting follows the store's cross-type order:
// missing and null first, then numbers, then strings.

use std::cmp::Ordering;

use async_trait::async_trait;
use bson::{Bson, Document};
use regex::Regex;

use crate::catalog::api::CatalogStore;
use crate::catalog::error::CatalogError;
use crate::catalog::normalize::as_f64;
use crate::catalog::query::CatalogQuery;

/// A read-only collection held in memory.
#[derive(Clone, Debug, Default)]
pub struct InMemoryCatalog {
    documents: Vec<Document>,
}

impl InMemoryCatalog {
    pub fn new(documents: Vec<Document>) -> Self {
        Self { documents }
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    fn select(&self, filter: &Document) -> Result<Vec<&Document>, CatalogError> {
        let mut selected = Vec::new();
        for doc in &self.documents {
            if matches_filter(filter, doc)? {
                selected.push(doc);
            }
        }
        Ok(selected)
    }
}

#[async_trait]
impl CatalogStore for InMemoryCatalog {
    fn name(&self) -> &'static str {
        "in-memory catalog"
    }

    async fn find(&self, query: &CatalogQuery) -> Result<Vec<Document>, CatalogError> {
        let mut selected = self.select(query.filter.as_document())?;

        if let Some(sort) = &query.sort {
            selected.sort_by(|a, b| {
                let ordering = compare_values(a.get(&sort.field), b.get(&sort.field));
                if sort.direction.sign() < 0 {
                    ordering.reverse()
                } else {
                    ordering
                }
            });
        }

        let limit = match query.limit {
            Some(limit) if limit > 0 => limit as usize,
            _ => usize::MAX,
        };

        Ok(selected.into_iter().take(limit).cloned().collect())
    }

    async fn find_one(&self, filter: Document) -> Result<Option<Document>, CatalogError> {
        Ok(self.select(&filter)?.into_iter().next().cloned())
    }

    async fn distinct(&self, field: &str) -> Result<Vec<Bson>, CatalogError> {
        let mut values: Vec<Bson> = Vec::new();
        for value in self.documents.iter().filter_map(|doc| doc.get(field)) {
            if !values.iter().any(|seen| values_equal(seen, value)) {
                values.push(value.clone());
            }
        }
        Ok(values)
    }

    async fn count(&self) -> Result<u64, CatalogError> {
        Ok(self.documents.len() as u64)
    }

    async fn aggregate(&self, _pipeline: Vec<Document>) -> Result<Vec<Document>, CatalogError> {
        Err(CatalogError::Unsupported {
            store: self.name(),
            operation: "aggregate",
        })
    }
}

/// Evaluate a filter document against one document.
pub fn matches_filter(filter: &Document, doc: &Document) -> Result<bool, CatalogError> {
    for (key, condition) in filter {
        let matched = match key.as_str() {
            "$and" => {
                let mut all = true;
                for clause in sub_filters(key, condition)? {
                    if !matches_filter(clause, doc)? {
                        all = false;
                        break;
                    }
                }
                all
            }
            "$or" => {
                let mut any = false;
                for clause in sub_filters(key, condition)? {
                    if matches_filter(clause, doc)? {
                        any = true;
                        break;
                    }
                }
                any
            }
            op if op.starts_with('$') => {
                return Err(CatalogError::Query(format!("unsupported top-level operator {}", op)));
            }
            field => matches_condition(doc.get(field), condition)?,
        };
        if !matched {
            return Ok(false);
        }
    }
    Ok(true)
}

fn sub_filters<'a>(key: &str, condition: &'a Bson) -> Result<Vec<&'a Document>, CatalogError> {
    match condition {
        Bson::Array(items) => items
            .iter()
            .map(|item| {
                item.as_document()
                    .ok_or_else(|| CatalogError::Query(format!("{} members must be documents", key)))
            })
            .collect(),
        _ => Err(CatalogError::Query(format!("{} needs an array", key))),
    }
}

fn is_operator_document(condition: &Bson) -> Option<&Document> {
    match condition {
        Bson::Document(ops) if ops.keys().next().is_some_and(|k| k.starts_with('$')) => Some(ops),
        _ => None,
    }
}

fn matches_condition(value: Option<&Bson>, condition: &Bson) -> Result<bool, CatalogError> {
    let Some(ops) = is_operator_document(condition) else {
        return Ok(equals_or_contains(value, condition));
    };

    for (op, operand) in ops {
        let matched = match op.as_str() {
            "$eq" => equals_or_contains(value, operand),
            "$ne" => !equals_or_contains(value, operand),
            "$in" => match operand {
                Bson::Array(options) => options.iter().any(|option| equals_or_contains(value, option)),
                _ => return Err(CatalogError::Query("$in needs an array".to_string())),
            },
            "$exists" => {
                let wanted = !matches!(operand, Bson::Boolean(false) | Bson::Int32(0) | Bson::Int64(0));
                value.is_some() == wanted
            }
            "$gt" => compares(value, operand, |o| o == Ordering::Greater),
            "$gte" => compares(value, operand, |o| o != Ordering::Less),
            "$lt" => compares(value, operand, |o| o == Ordering::Less),
            "$lte" => compares(value, operand, |o| o != Ordering::Greater),
            "$regex" => {
                let options = match ops.get("$options") {
                    Some(Bson::String(options)) => options.as_str(),
                    _ => "",
                };
                regex_matches(value, operand, options)?
            }
            "$options" => true,
            other => {
                return Err(CatalogError::Query(format!("unsupported operator {}", other)));
            }
        };
        if !matched {
            return Ok(false);
        }
    }
    Ok(true)
}

fn equals_or_contains(value: Option<&Bson>, expected: &Bson) -> bool {
    match (value, expected) {
        (None, Bson::Null) => true,
        (None, _) => false,
        (Some(Bson::Array(items)), expected) if !matches!(expected, Bson::Array(_)) => {
            items.iter().any(|item| values_equal(item, expected))
        }
        (Some(actual), expected) => values_equal(actual, expected),
    }
}

fn values_equal(a: &Bson, b: &Bson) -> bool {
    match (numeric(a), numeric(b)) {
        (Some(x), Some(y)) => x == y,
        (None, None) => a == b,
        _ => false,
    }
}

fn numeric(value: &Bson) -> Option<f64> {
    match value {
        Bson::Int32(_) | Bson::Int64(_) | Bson::Double(_) => as_f64(value),
        _ => None,
    }
}

/// Range comparison only between values of the same type bracket.
fn compares(value: Option<&Bson>, operand: &Bson, accept: impl Fn(Ordering) -> bool) -> bool {
    let Some(value) = value else {
        return false;
    };
    if type_rank(Some(value)) != type_rank(Some(operand)) {
        return false;
    }
    accept(compare_values(Some(value), Some(operand)))
}

fn regex_matches(value: Option<&Bson>, pattern: &Bson, options: &str) -> Result<bool, CatalogError> {
    let (pattern, options) = match pattern {
        Bson::String(pattern) => (pattern.as_str(), options.to_string()),
        Bson::RegularExpression(regex) => (regex.pattern.as_str(), format!("{}{}", regex.options, options)),
        _ => return Err(CatalogError::Query("$regex needs a string pattern".to_string())),
    };

    let flags: String = options.chars().filter(|c| matches!(c, 'i' | 'm' | 's' | 'x')).collect();
    let source = if flags.is_empty() {
        pattern.to_string()
    } else {
        format!("(?{}){}", flags, pattern)
    };
    let regex = Regex::new(&source)
        .map_err(|e| CatalogError::Query(format!("invalid $regex {:?}: {}", pattern, e)))?;

    Ok(match value {
        Some(Bson::String(text)) => regex.is_match(text),
        Some(Bson::Array(items)) => items
            .iter()
            .any(|item| matches!(item, Bson::String(text) if regex.is_match(text))),
        _ => false,
    })
}

fn type_rank(value: Option<&Bson>) -> u8 {
    match value {
        None | Some(Bson::Null) | Some(Bson::Undefined) => 0,
        Some(Bson::Int32(_)) | Some(Bson::Int64(_)) | Some(Bson::Double(_)) => 1,
        Some(Bson::String(_)) => 2,
        Some(Bson::Document(_)) => 3,
        Some(Bson::Array(_)) => 4,
        Some(Bson::ObjectId(_)) => 5,
        Some(Bson::Boolean(_)) => 6,
        Some(Bson::DateTime(_)) => 7,
        Some(_) => 8,
    }
}

fn compare_values(a: Option<&Bson>, b: Option<&Bson>) -> Ordering {
    let rank = type_rank(a).cmp(&type_rank(b));
    if rank != Ordering::Equal {
        return rank;
    }
    match (a, b) {
        (Some(Bson::String(x)), Some(Bson::String(y))) => x.cmp(y),
        (Some(Bson::Boolean(x)), Some(Bson::Boolean(y))) => x.cmp(y),
        (Some(Bson::DateTime(x)), Some(Bson::DateTime(y))) => x.cmp(y),
        (Some(Bson::ObjectId(x)), Some(Bson::ObjectId(y))) => x.bytes().cmp(&y.bytes()),
        (Some(x), Some(y)) => match (numeric(x), numeric(y)) {
            (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
            _ => Ordering::Equal,
        },
        _ => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::model::{SortDirection, SortSpec};
    use crate::catalog::query::Predicate;
    use bson::doc;

    fn sample() -> InMemoryCatalog {
        InMemoryCatalog::new(vec![
            doc! { "name": "Beta", "price": 5, "genres": ["Action", "Indie"] },
            doc! { "name": "alpha", "price": 2.5 },
            doc! { "name": "Gamma", "price": "n/a", "genres": "Puzzle" },
            doc! { "name": "Delta" },
        ])
    }

    #[test]
    fn test_equality_matches_array_members() {
        let doc = doc! { "genres": ["Action", "Indie"] };
        assert!(matches_filter(&doc! { "genres": "Indie" }, &doc).unwrap());
        assert!(!matches_filter(&doc! { "genres": "Racing" }, &doc).unwrap());
    }

    #[test]
    fn test_numeric_equality_across_types() {
        let doc = doc! { "price": 5_i64 };
        assert!(matches_filter(&doc! { "price": 5.0 }, &doc).unwrap());
    }

    #[test]
    fn test_range_ignores_other_types() {
        let filter = doc! { "price": { "$gte": 0.0, "$lte": 10.0 } };
        assert!(!matches_filter(&filter, &doc! { "price": "n/a" }).unwrap());
        assert!(!matches_filter(&filter, &doc! {}).unwrap());
        assert!(matches_filter(&filter, &doc! { "price": 10 }).unwrap());
    }

    #[test]
    fn test_exists_and_ne() {
        let filter = doc! { "tags": { "$exists": true, "$ne": "" } };
        assert!(matches_filter(&filter, &doc! { "tags": "{'A': 1}" }).unwrap());
        assert!(!matches_filter(&filter, &doc! { "tags": "" }).unwrap());
        assert!(!matches_filter(&filter, &doc! {}).unwrap());
    }

    #[test]
    fn test_regex_with_options() {
        let filter = doc! { "name": { "$regex": "ALP", "$options": "i" } };
        assert!(matches_filter(&filter, &doc! { "name": "alpha" }).unwrap());
        let filter = doc! { "name": { "$regex": "ALP" } };
        assert!(!matches_filter(&filter, &doc! { "name": "alpha" }).unwrap());
    }

    #[test]
    fn test_invalid_regex_is_a_query_error() {
        let filter = doc! { "name": { "$regex": "(" } };
        let err = matches_filter(&filter, &doc! { "name": "x" }).unwrap_err();
        assert!(matches!(err, CatalogError::Query(_)));
    }

    #[test]
    fn test_or_group() {
        let filter = doc! { "$or": [ { "name": "Beta" }, { "name": "Delta" } ] };
        assert!(matches_filter(&filter, &doc! { "name": "Delta" }).unwrap());
        assert!(!matches_filter(&filter, &doc! { "name": "Gamma" }).unwrap());
    }

    #[tokio::test]
    async fn test_find_sorts_missing_first_then_numbers_then_strings() {
        let store = sample();
        let query = CatalogQuery {
            filter: Predicate::all(),
            sort: Some(SortSpec::new("price", SortDirection::Ascending)),
            limit: None,
        };
        let names: Vec<String> = store
            .find(&query)
            .await
            .unwrap()
            .iter()
            .map(|d| d.get_str("name").unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["Delta", "alpha", "Beta", "Gamma"]);
    }

    #[tokio::test]
    async fn test_find_applies_limit() {
        let store = sample();
        let query = CatalogQuery::filter(Predicate::all()).with_limit(2);
        assert_eq!(store.find(&query).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_distinct_keeps_shapes() {
        let store = sample();
        let genres = store.distinct("genres").await.unwrap();
        assert_eq!(genres.len(), 2);
        assert!(matches!(genres[0], Bson::Array(_)));
        assert_eq!(genres[1], Bson::String("Puzzle".to_string()));
    }

    #[tokio::test]
    async fn test_aggregate_unsupported() {
        let err = sample().aggregate(vec![]).await.unwrap_err();
        assert!(matches!(err, CatalogError::Unsupported { .. }));
    }
}
