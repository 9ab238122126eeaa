// query_builder_tests.rs - Predicate construction checked against documents
//
// The builder is pure, so most assertions look at the produced filter.
// Where semantics matter more than shape (tag conjunction, empty price
// ranges) the filter is evaluated with the in-memory matcher.

mod common;

use bson::{doc, Bson};
use common::{default_criteria, open_criteria};
use steam_catalog::catalog::api::memory::matches_filter;
use steam_catalog::catalog::model::{Platform, SortDirection, SortKey};
use steam_catalog::catalog::query::{build_query, tag_pattern, PlatformEncoding, QueryBuilder};
use steam_catalog::catalog::RESULT_CAP;

#[test]
fn test_open_criteria_match_everything() {
    let query = build_query(&open_criteria());
    assert!(query.filter.as_document().is_empty());
    assert_eq!(query.limit, Some(RESULT_CAP));
}

#[test]
fn test_initial_criteria_filter_price_and_windows() {
    let query = build_query(&default_criteria());
    let filter = query.filter.as_document();

    let price = filter.get_document("price").unwrap();
    assert_eq!(price.get_f64("$gte").unwrap(), 0.0);
    assert_eq!(price.get_f64("$lte").unwrap(), 100.0);
    assert_eq!(filter.get_str("windows").unwrap(), "True");
    assert!(!query.filter.has_name_clause());
}

#[test]
fn test_every_query_is_capped() {
    let criteria = [
        open_criteria(),
        default_criteria(),
        default_criteria().with_name("portal").with_tag("Puzzle"),
    ];
    for criteria in &criteria {
        assert_eq!(build_query(criteria).limit, Some(100));
    }
}

#[test]
fn test_sort_table() {
    let expected = [
        (SortKey::Popularity, "peak_ccu", SortDirection::Descending),
        (SortKey::ReleaseDateDesc, "release_date", SortDirection::Descending),
        (SortKey::PriceAsc, "price", SortDirection::Ascending),
        (SortKey::RatingDesc, "pct_pos_total", SortDirection::Descending),
        (SortKey::NameAsc, "name", SortDirection::Ascending),
    ];
    for (key, field, direction) in expected {
        let sort = build_query(&open_criteria().sorted_by(key)).sort.unwrap();
        assert_eq!(sort.field, field, "{:?}", key);
        assert_eq!(sort.direction, direction, "{:?}", key);
    }
}

#[test]
fn test_name_filter_is_case_insensitive_substring() {
    let query = build_query(&open_criteria().with_name("  PORTAL "));
    let filter = query.filter.as_document();

    assert!(matches_filter(filter, &doc! { "name": "Portal 2" }).unwrap());
    assert!(matches_filter(filter, &doc! { "name": "The portal collection" }).unwrap());
    assert!(!matches_filter(filter, &doc! { "name": "Hades" }).unwrap());
}

#[test]
fn test_name_filter_is_literal_text() {
    let query = build_query(&open_criteria().with_name("C++"));
    let filter = query.filter.as_document();

    assert!(matches_filter(filter, &doc! { "name": "Learn C++ Today" }).unwrap());
    assert!(!matches_filter(filter, &doc! { "name": "Learn C Today" }).unwrap());
}

#[test]
fn test_blank_name_adds_no_clause() {
    let query = build_query(&open_criteria().with_name("   "));
    assert!(!query.filter.has_name_clause());
}

#[test]
fn test_non_numeric_price_bounds_drop_price_clause() {
    for (min, max) in [("abc", "10"), ("0", "lots"), ("", ""), ("NaN", "5"), ("0", "inf")] {
        let criteria = default_criteria().with_price_input(min, max);
        let query = build_query(&criteria);
        assert!(!query.filter.has_price_clause(), "{:?}..{:?}", min, max);
    }
}

#[test]
fn test_price_input_with_whitespace_parses() {
    let criteria = open_criteria().with_price_input(" 5 ", "20.5");
    let query = build_query(&criteria);
    let price = query.filter.as_document().get_document("price").unwrap();
    assert_eq!(price.get_f64("$gte").unwrap(), 5.0);
    assert_eq!(price.get_f64("$lte").unwrap(), 20.5);
}

#[test]
fn test_inverted_price_range_matches_nothing() {
    let query = build_query(&open_criteria().with_price_range(50.0, 10.0));
    let filter = query.filter.as_document();

    assert!(query.filter.has_price_clause());
    for price in [5.0, 10.0, 30.0, 50.0, 70.0] {
        assert!(!matches_filter(filter, &doc! { "price": price }).unwrap());
    }
}

#[test]
fn test_multiple_tags_all_required() {
    let criteria = open_criteria().with_tag("Indie").with_tag("Roguelike");
    let query = build_query(&criteria);
    let filter = query.filter.as_document();

    assert_eq!(query.filter.tag_clause_count(), 2);

    let both = doc! { "tags": "{'Roguelike': 1800, 'Action': 1500, 'Indie': 1300}" };
    let only_indie = doc! { "tags": "{'Indie': 1400, 'Co-op': 900}" };
    assert!(matches_filter(filter, &both).unwrap());
    assert!(!matches_filter(filter, &only_indie).unwrap());
}

#[test]
fn test_tag_pattern_requires_whole_entry() {
    let query = build_query(&open_criteria().with_tag("Indie"));
    let filter = query.filter.as_document();

    // "Indie" must not match inside a longer tag name
    let longer = doc! { "tags": "{'Indie Horror': 30}" };
    assert!(!matches_filter(filter, &longer).unwrap());
    assert!(matches_filter(filter, &doc! { "tags": "{'Indie':12}" }).unwrap());
}

#[test]
fn test_tag_pattern_escapes_metacharacters() {
    let pattern = tag_pattern("Rogue.lite");
    assert!(pattern.contains(r"Rogue\.lite"));

    let query = build_query(&open_criteria().with_tag("Rogue.lite"));
    let filter = query.filter.as_document();
    assert!(matches_filter(filter, &doc! { "tags": "{'Rogue.lite': 10}" }).unwrap());
    assert!(!matches_filter(filter, &doc! { "tags": "{'RogueXlite': 10}" }).unwrap());
}

#[test]
fn test_platforms_and_tags_share_conjunctive_group() {
    let criteria = open_criteria()
        .with_platform(Platform::Windows)
        .with_platform(Platform::Linux)
        .with_tag("Indie");
    let query = build_query(&criteria);

    let conjuncts = query.filter.conjuncts();
    assert_eq!(conjuncts.len(), 3);
    assert_eq!(query.filter.tag_clause_count(), 1);
    assert!(conjuncts.iter().any(|c| c.get_str("windows").ok() == Some("True")));
    assert!(conjuncts.iter().any(|c| c.get_str("linux").ok() == Some("True")));

    let filter = query.filter.as_document();
    let windows_only = doc! { "windows": "True", "linux": "False", "tags": "{'Indie': 5}" };
    let both = doc! { "windows": "True", "linux": "True", "tags": "{'Indie': 5}" };
    assert!(!matches_filter(filter, &windows_only).unwrap());
    assert!(matches_filter(filter, &both).unwrap());
}

#[test]
fn test_native_platform_encoding() {
    let builder = QueryBuilder::new().platform_encoding(PlatformEncoding::Native);
    let query = builder.build(&open_criteria().with_platform(Platform::Mac));
    let filter = query.filter.as_document();

    assert_eq!(filter.get("mac"), Some(&Bson::Boolean(true)));
    assert!(matches_filter(filter, &doc! { "mac": true }).unwrap());
    assert!(!matches_filter(filter, &doc! { "mac": "True" }).unwrap());
}

#[test]
fn test_either_platform_encoding_accepts_both() {
    let builder = QueryBuilder::new().platform_encoding(PlatformEncoding::Either);
    let query = builder.build(&open_criteria().with_platform(Platform::Windows));
    let filter = query.filter.as_document();

    assert!(matches_filter(filter, &doc! { "windows": true }).unwrap());
    assert!(matches_filter(filter, &doc! { "windows": "True" }).unwrap());
    assert!(!matches_filter(filter, &doc! { "windows": "False" }).unwrap());
    assert!(!matches_filter(filter, &doc! { "name": "no flags" }).unwrap());
}

#[test]
fn test_building_twice_gives_same_query() {
    let criteria = default_criteria().with_name("a").with_tag("Co-op");
    assert_eq!(build_query(&criteria), build_query(&criteria));
}
