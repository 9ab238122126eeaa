// catalog/mod.rs - Root module for the games catalog query layer
//
// Architecture:
// - model/: Filter values, display rows and analytics rows
// - query.rs: FilterCriteria -> compound predicate + sort + cap (pure)
// - normalize.rs: raw document -> DisplayRecord / GameDetails (pure)
// - tags.rs: lenient parser for the serialized tag mapping
// - api/: CatalogStore trait, store implementations, catalog operations
// - config.rs, error.rs: connection settings and the store error type
//
// The presentation layer builds a FilterCriteria, calls
// api::queries::search_games and renders the returned rows.

pub mod api;
pub mod config;
pub mod error;
pub mod model;
pub mod normalize;
pub mod query;
pub mod tags;

pub use api::CatalogStore;
pub use error::CatalogError;
pub use model::{DisplayRecord, FilterCriteria, GameDetails, Platform, SortKey};
pub use normalize::normalize;
pub use query::{build_query, CatalogQuery, Predicate, QueryBuilder, RESULT_CAP};
