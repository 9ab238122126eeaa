// catalog/model/mod.rs - Shared data models for the catalog query layer
//
// These types are the contract between the presentation layer and the
// query core: the filter value going in, the display rows coming out, and
// the analytics rows produced by the statistics pipelines.

use std::collections::BTreeSet;

use bson::{doc, Bson, Document};
use serde::{Deserialize, Serialize};

/// Placeholder used for any scalar field a document does not carry.
pub const UNKNOWN: &str = "unknown";

/// Placeholder for a rate when a game has no reviews at all.
pub const NO_RATING: &str = "no rating";

/// Placeholder for peak concurrent users stored as the 0/1 sentinel.
pub const NOT_AVAILABLE: &str = "not available";

/// Placeholder for a missing short description in the detail view.
pub const NO_DESCRIPTION: &str = "no description";

/// Platforms a game can be flagged for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Platform {
    Windows,
    Mac,
    Linux,
}

impl Platform {
    pub const ALL: [Platform; 3] = [Platform::Windows, Platform::Mac, Platform::Linux];

    /// Name of the document field holding this platform's flag.
    pub fn field(&self) -> &'static str {
        match self {
            Platform::Windows => "windows",
            Platform::Mac => "mac",
            Platform::Linux => "linux",
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Platform::Windows => write!(f, "Windows"),
            Platform::Mac => write!(f, "Mac"),
            Platform::Linux => write!(f, "Linux"),
        }
    }
}

/// Result ordering offered to the user.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortKey {
    #[default]
    Popularity,
    ReleaseDateDesc,
    PriceAsc,
    RatingDesc,
    NameAsc,
}

impl SortKey {
    pub const ALL: [SortKey; 5] = [
        SortKey::Popularity,
        SortKey::ReleaseDateDesc,
        SortKey::PriceAsc,
        SortKey::RatingDesc,
        SortKey::NameAsc,
    ];

    /// The (field, direction) pair this key sorts by.
    pub fn spec(&self) -> SortSpec {
        match self {
            SortKey::Popularity => SortSpec::new("peak_ccu", SortDirection::Descending),
            SortKey::ReleaseDateDesc => SortSpec::new("release_date", SortDirection::Descending),
            SortKey::PriceAsc => SortSpec::new("price", SortDirection::Ascending),
            SortKey::RatingDesc => SortSpec::new("pct_pos_total", SortDirection::Descending),
            SortKey::NameAsc => SortSpec::new("name", SortDirection::Ascending),
        }
    }
}

impl std::fmt::Display for SortKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SortKey::Popularity => write!(f, "Peak CCU: High to Low"),
            SortKey::ReleaseDateDesc => write!(f, "Release Date: New to Old"),
            SortKey::PriceAsc => write!(f, "Price: Low to High"),
            SortKey::RatingDesc => write!(f, "Positive Rate: Good to Bad"),
            SortKey::NameAsc => write!(f, "Name: A-Z"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    /// Sign understood by the document store's sort specification.
    pub fn sign(&self) -> i32 {
        match self {
            SortDirection::Ascending => 1,
            SortDirection::Descending => -1,
        }
    }
}

/// A single (field, direction) sort pair.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub field: String,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn new(field: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            field: field.into(),
            direction,
        }
    }

    pub fn to_document(&self) -> Document {
        let mut sort = Document::new();
        sort.insert(self.field.clone(), self.direction.sign());
        sort
    }
}

/// Inclusive price bounds.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PriceRange {
    pub min: f64,
    pub max: f64,
}

impl PriceRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Parse raw bound text. Either bound failing to parse as a finite
    /// number means no price filter at all.
    pub fn parse(min: &str, max: &str) -> Option<Self> {
        let min = parse_bound(min)?;
        let max = parse_bound(max)?;
        Some(Self { min, max })
    }
}

fn parse_bound(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

/// Filter criteria chosen by the user, rebuilt on every search.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterCriteria {
    pub name_substring: Option<String>,
    pub price_range: Option<PriceRange>,
    pub platforms: BTreeSet<Platform>,
    pub selected_tags: BTreeSet<String>,
    pub sort_key: SortKey,
}

impl FilterCriteria {
    /// The state a fresh (or reset) search form starts in.
    pub fn initial() -> Self {
        Self {
            name_substring: None,
            price_range: Some(PriceRange::new(0.0, 100.0)),
            platforms: BTreeSet::from([Platform::Windows]),
            selected_tags: BTreeSet::new(),
            sort_key: SortKey::Popularity,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name_substring = Some(name.into());
        self
    }

    /// Set the price range from raw input text, dropping it when invalid.
    pub fn with_price_input(mut self, min: &str, max: &str) -> Self {
        self.price_range = PriceRange::parse(min, max);
        self
    }

    pub fn with_price_range(mut self, min: f64, max: f64) -> Self {
        self.price_range = Some(PriceRange::new(min, max));
        self
    }

    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platforms.insert(platform);
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.selected_tags.insert(tag.into());
        self
    }

    pub fn sorted_by(mut self, sort_key: SortKey) -> Self {
        self.sort_key = sort_key;
        self
    }

    /// The trimmed name filter, if there is anything left to match.
    pub fn name_filter(&self) -> Option<&str> {
        self.name_substring
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }
}

/// A field that may arrive as a bare string or as a list of strings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldValue {
    Scalar(String),
    List(Vec<String>),
}

impl FieldValue {
    /// Coerce a raw document value. Null yields `None`; nested values
    /// other than strings are rendered through their display form.
    pub fn from_bson(value: &Bson) -> Option<Self> {
        match value {
            Bson::Null | Bson::Undefined => None,
            Bson::Array(items) => Some(FieldValue::List(
                items.iter().filter_map(scalar_text).collect(),
            )),
            other => scalar_text(other).map(FieldValue::Scalar),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Scalar(value) => value.is_empty(),
            FieldValue::List(values) => values.is_empty(),
        }
    }

    /// List entries joined with ", "; a scalar passes through unchanged.
    pub fn joined(&self) -> String {
        match self {
            FieldValue::Scalar(value) => value.clone(),
            FieldValue::List(values) => values.join(", "),
        }
    }

    pub fn into_values(self) -> Vec<String> {
        match self {
            FieldValue::Scalar(value) => vec![value],
            FieldValue::List(values) => values,
        }
    }
}

fn scalar_text(value: &Bson) -> Option<String> {
    match value {
        Bson::String(text) => Some(text.clone()),
        Bson::Int32(n) => Some(n.to_string()),
        Bson::Int64(n) => Some(n.to_string()),
        Bson::Double(n) => Some(n.to_string()),
        Bson::Boolean(b) => Some(b.to_string()),
        Bson::ObjectId(oid) => Some(oid.to_hex()),
        _ => None,
    }
}

/// One normalized result row. Every field is always populated.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayRecord {
    pub id: String,
    pub name: String,
    pub release_date: String,
    pub price: String,
    pub positive_rate: String,
    pub estimated_owners: String,
    pub peak_ccu: String,
}

impl DisplayRecord {
    /// The record in document shape, keyed like the raw catalog fields.
    pub fn to_document(&self) -> Document {
        doc! {
            "_id": self.id.clone(),
            "name": self.name.clone(),
            "release_date": self.release_date.clone(),
            "price": self.price.clone(),
            "positive_rate": self.positive_rate.clone(),
            "estimated_owners": self.estimated_owners.clone(),
            "peak_ccu": self.peak_ccu.clone(),
        }
    }
}

/// Positive/negative review counts for one game.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewSummary {
    pub positive: i64,
    pub negative: i64,
}

impl ReviewSummary {
    /// Saturates instead of overflowing on absurd counts.
    pub fn total(&self) -> i64 {
        self.positive.saturating_add(self.negative)
    }

    /// Percentage of positive reviews, `None` when there are none at all.
    pub fn rate(&self) -> Option<f64> {
        let total = self.total();
        if total <= 0 {
            return None;
        }
        Some(self.positive as f64 / total as f64 * 100.0)
    }

    /// Rate with one decimal and a percent sign, or the no-rating marker.
    pub fn rate_label(&self) -> String {
        match self.rate() {
            Some(rate) => format!("{:.1}%", rate),
            None => NO_RATING.to_string(),
        }
    }
}

/// Everything the detail view shows for one game.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameDetails {
    pub record: DisplayRecord,
    pub developers: String,
    pub publishers: String,
    pub genres: Option<String>,
    pub reviews: ReviewSummary,
    pub top_tags: Option<String>,
    pub description: String,
}

/// Search response with normalized rows
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SearchResults {
    pub results: Vec<DisplayRecord>,
    pub total_count: usize,
}

impl SearchResults {
    /// True when the store returned as many rows as the cap allows.
    pub fn is_capped(&self) -> bool {
        self.total_count as i64 >= crate::catalog::query::RESULT_CAP
    }
}

// ---------------------------------------------------------------------------
// Analytics rows
// ---------------------------------------------------------------------------

/// Value count for a grouped field (developer, genre, tag, owners bucket)
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetCount {
    pub value: String,
    pub count: i64,
}

/// Histogram bucket; `lower == None` is the catch-all "other" bucket.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bucket {
    pub lower: Option<f64>,
    pub upper: Option<f64>,
    pub count: i64,
}

impl Bucket {
    pub fn is_other(&self) -> bool {
        self.lower.is_none()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearCount {
    pub year: String,
    pub count: i64,
}

/// Number of games sharing one combination of platform flags.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformSupport {
    pub platforms: BTreeSet<Platform>,
    pub count: i64,
}

impl PlatformSupport {
    pub fn label(&self) -> String {
        if self.platforms.is_empty() {
            return "no platform support".to_string();
        }
        self.platforms
            .iter()
            .map(|platform| platform.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopularGame {
    pub name: String,
    pub recommendations: i64,
    pub peak_ccu: i64,
}

/// Collection size figures as reported by the store.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StorageStats {
    pub documents: u64,
    pub size_bytes: f64,
    pub storage_bytes: f64,
    pub index_bytes: f64,
}

impl StorageStats {
    pub fn size_mb(&self) -> f64 {
        self.size_bytes / (1024.0 * 1024.0)
    }

    pub fn storage_mb(&self) -> f64 {
        self.storage_bytes / (1024.0 * 1024.0)
    }

    pub fn index_mb(&self) -> f64 {
        self.index_bytes / (1024.0 * 1024.0)
    }

    pub fn total_mb(&self) -> f64 {
        self.storage_mb() + self.index_mb()
    }
}

/// All analytics sections. A failed section stays empty and its error is
/// recorded in `errors`.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CatalogReport {
    pub storage: Option<StorageStats>,
    pub price_buckets: Vec<Bucket>,
    pub release_years: Vec<YearCount>,
    pub top_developers: Vec<FacetCount>,
    pub top_genres: Vec<FacetCount>,
    pub rating_buckets: Vec<Bucket>,
    pub platform_support: Vec<PlatformSupport>,
    pub owner_distribution: Vec<FacetCount>,
    pub most_recommended: Vec<PopularGame>,
    pub top_tags: Vec<FacetCount>,
    pub errors: Vec<String>,
}
