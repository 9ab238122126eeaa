// catalog/query.rs - Compound predicate construction
//
// Turns a FilterCriteria value into one document-store predicate, a sort
// pair and the fixed result cap. Pure functions, no I/O: everything here
// can be tested without a store.
//
// Shape of the produced filter:
//   { "name": {"$regex": .., "$options": "i"},
//     "price": {"$gte": .., "$lte": ..},
//     "windows": "True",                      // exactly one platform
//     "$and": [ {platform}.., {"tags": {"$regex": ..}}.. ] }

use bson::{doc, Bson, Document};
use serde::{Deserialize, Serialize};

use crate::catalog::model::{FilterCriteria, Platform, SortSpec};

/// Every search returns at most this many documents.
pub const RESULT_CAP: i64 = 100;

const AND: &str = "$and";

/// How platform flags are encoded in the stored documents.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlatformEncoding {
    /// Stringified booleans (`"True"`), as the existing dataset was ingested.
    #[default]
    Legacy,
    /// Native BSON booleans.
    Native,
    /// Accept either encoding.
    Either,
}

impl PlatformEncoding {
    fn truthy(&self) -> Bson {
        match self {
            PlatformEncoding::Legacy => Bson::String("True".to_string()),
            PlatformEncoding::Native => Bson::Boolean(true),
            PlatformEncoding::Either => Bson::Document(doc! {
                "$in": [Bson::String("True".to_string()), Bson::Boolean(true)]
            }),
        }
    }
}

/// A filter expression understood by the store's query engine.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Predicate(Document);

impl Predicate {
    /// The predicate matching every document.
    pub fn all() -> Self {
        Self(Document::new())
    }

    pub fn from_document(filter: Document) -> Self {
        Self(filter)
    }

    pub fn as_document(&self) -> &Document {
        &self.0
    }

    pub fn into_document(self) -> Document {
        self.0
    }

    pub fn has_name_clause(&self) -> bool {
        self.0.contains_key("name")
    }

    pub fn has_price_clause(&self) -> bool {
        self.0.contains_key("price")
    }

    /// Members of the conjunctive group, empty when there is none.
    pub fn conjuncts(&self) -> Vec<&Document> {
        match self.0.get(AND) {
            Some(Bson::Array(items)) => items.iter().filter_map(Bson::as_document).collect(),
            _ => Vec::new(),
        }
    }

    /// Number of tag pattern clauses in the conjunctive group.
    pub fn tag_clause_count(&self) -> usize {
        self.conjuncts()
            .iter()
            .filter(|clause| clause.contains_key("tags"))
            .count()
    }

    fn insert(&mut self, key: &str, value: impl Into<Bson>) {
        self.0.insert(key, value);
    }

    /// Append clauses to the `$and` group, creating it if needed. Existing
    /// members are never replaced.
    fn push_conjuncts(&mut self, clauses: Vec<Document>) {
        if clauses.is_empty() {
            return;
        }
        let mut group = match self.0.remove(AND) {
            Some(Bson::Array(existing)) => existing,
            Some(other) => vec![other],
            None => Vec::new(),
        };
        group.extend(clauses.into_iter().map(Bson::Document));
        self.0.insert(AND, Bson::Array(group));
    }
}

impl From<Predicate> for Document {
    fn from(predicate: Predicate) -> Self {
        predicate.0
    }
}

/// Everything the store needs to run a find.
#[derive(Clone, Debug, PartialEq)]
pub struct CatalogQuery {
    pub filter: Predicate,
    pub sort: Option<SortSpec>,
    pub limit: Option<i64>,
}

impl CatalogQuery {
    /// An unsorted, uncapped query.
    pub fn filter(filter: Predicate) -> Self {
        Self {
            filter,
            sort: None,
            limit: None,
        }
    }

    pub fn with_limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Builds predicates; carries the options that depend on the dataset.
#[derive(Clone, Copy, Debug, Default)]
pub struct QueryBuilder {
    platform_encoding: PlatformEncoding,
}

impl QueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn platform_encoding(mut self, encoding: PlatformEncoding) -> Self {
        self.platform_encoding = encoding;
        self
    }

    /// Build the capped, sorted query for a set of criteria. Never fails;
    /// criteria that cannot be applied are simply left out.
    pub fn build(&self, criteria: &FilterCriteria) -> CatalogQuery {
        let filter = self.predicate(criteria);
        tracing::debug!("Built catalog filter: {}", filter.as_document());

        CatalogQuery {
            filter,
            sort: Some(criteria.sort_key.spec()),
            limit: Some(RESULT_CAP),
        }
    }

    pub fn predicate(&self, criteria: &FilterCriteria) -> Predicate {
        let mut predicate = Predicate::all();

        if let Some(name) = criteria.name_filter() {
            predicate.insert(
                "name",
                doc! { "$regex": regex::escape(name), "$options": "i" },
            );
        }

        if let Some(range) = criteria.price_range {
            predicate.insert("price", doc! { "$gte": range.min, "$lte": range.max });
        }

        let platform_clauses: Vec<Document> = criteria
            .platforms
            .iter()
            .map(|platform| self.platform_clause(*platform))
            .collect();
        match platform_clauses.len() {
            0 => {}
            1 => {
                for (key, value) in platform_clauses.into_iter().flatten() {
                    predicate.insert(&key, value);
                }
            }
            _ => predicate.push_conjuncts(platform_clauses),
        }

        let tag_clauses: Vec<Document> = criteria
            .selected_tags
            .iter()
            .map(|tag| tag_clause(tag))
            .collect();
        predicate.push_conjuncts(tag_clauses);

        predicate
    }

    fn platform_clause(&self, platform: Platform) -> Document {
        let mut clause = Document::new();
        clause.insert(platform.field(), self.platform_encoding.truthy());
        clause
    }
}

/// Build the query for `criteria` with the default (legacy) encoding.
pub fn build_query(criteria: &FilterCriteria) -> CatalogQuery {
    QueryBuilder::default().build(criteria)
}

/// Pattern matching one `'<tag>': <digits>` entry of the serialized mapping.
pub fn tag_pattern(tag: &str) -> String {
    format!(r"'{}':\s*\d+", regex::escape(tag))
}

fn tag_clause(tag: &str) -> Document {
    doc! { "tags": { "$regex": tag_pattern(tag) } }
}

/// Documents carrying a non-empty tag mapping, used to sample tag names.
pub fn tagged_documents() -> Predicate {
    Predicate::from_document(doc! { "tags": { "$exists": true, "$ne": "" } })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::model::SortKey;

    #[test]
    fn test_empty_criteria_match_everything() {
        let query = build_query(&FilterCriteria::default());
        assert!(query.filter.as_document().is_empty());
        assert_eq!(query.limit, Some(RESULT_CAP));
        assert_eq!(query.sort, Some(SortKey::Popularity.spec()));
    }

    #[test]
    fn test_name_clause_is_escaped_and_case_insensitive() {
        let criteria = FilterCriteria::default().with_name("C++ (Deluxe)");
        let filter = build_query(&criteria).filter.into_document();
        let name = filter.get_document("name").unwrap();
        assert_eq!(name.get_str("$regex").unwrap(), r"C\+\+ \(Deluxe\)");
        assert_eq!(name.get_str("$options").unwrap(), "i");
    }

    #[test]
    fn test_single_platform_is_merged_at_top_level() {
        let criteria = FilterCriteria::default().with_platform(Platform::Mac);
        let filter = build_query(&criteria).filter.into_document();
        assert_eq!(filter.get_str("mac").unwrap(), "True");
        assert!(!filter.contains_key(AND));
    }

    #[test]
    fn test_multiple_platforms_share_one_group_with_tags() {
        let criteria = FilterCriteria::default()
            .with_platform(Platform::Windows)
            .with_platform(Platform::Linux)
            .with_tag("Indie");
        let predicate = build_query(&criteria).filter;
        let conjuncts = predicate.conjuncts();
        assert_eq!(conjuncts.len(), 3);
        assert_eq!(conjuncts[0].get_str("windows").unwrap(), "True");
        assert_eq!(conjuncts[1].get_str("linux").unwrap(), "True");
        assert_eq!(predicate.tag_clause_count(), 1);
    }

    #[test]
    fn test_push_conjuncts_appends() {
        let mut predicate = Predicate::from_document(doc! { "$and": [ { "a": 1 } ] });
        predicate.push_conjuncts(vec![doc! { "b": 2 }]);
        predicate.push_conjuncts(vec![]);
        assert_eq!(predicate.conjuncts().len(), 2);
    }

    #[test]
    fn test_native_and_either_platform_encoding() {
        let criteria = FilterCriteria::default().with_platform(Platform::Windows);

        let native = QueryBuilder::new()
            .platform_encoding(PlatformEncoding::Native)
            .predicate(&criteria);
        assert!(native.as_document().get_bool("windows").unwrap());

        let either = QueryBuilder::new()
            .platform_encoding(PlatformEncoding::Either)
            .predicate(&criteria);
        let clause = either.as_document().get_document("windows").unwrap();
        assert_eq!(clause.get_array("$in").unwrap().len(), 2);
    }

    #[test]
    fn test_tag_pattern_escapes_metacharacters() {
        assert_eq!(tag_pattern("Rogue.lite"), r"'Rogue\.lite':\s*\d+");
        assert_eq!(tag_pattern("4X"), r"'4X':\s*\d+");
        assert_eq!(tag_pattern("C++"), r"'C\+\+':\s*\d+");
    }
}
