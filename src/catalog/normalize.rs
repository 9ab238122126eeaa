// catalog/normalize.rs - Raw catalog documents to display records
//
// Documents in the catalog are loosely shaped: numbers arrive as int32,
// int64 or double, list fields may be a bare string, and any field can be
// missing. Everything is coerced here so the presentation layer only ever
// sees fully populated strings.

use bson::{Bson, Document};

use crate::catalog::model::{
    DisplayRecord, FieldValue, GameDetails, ReviewSummary, NOT_AVAILABLE, NO_DESCRIPTION,
    UNKNOWN,
};
use crate::catalog::tags;

/// Normalize one result row.
pub fn normalize(doc: &Document) -> DisplayRecord {
    DisplayRecord {
        id: document_id(doc),
        name: text_field(doc, "name"),
        release_date: release_date(doc),
        price: price_label(doc.get("price")),
        positive_rate: positive_rate(doc),
        estimated_owners: text_field(doc, "estimated_owners"),
        peak_ccu: peak_ccu_label(doc.get("peak_ccu")),
    }
}

/// Build the detail bundle for one game.
pub fn details(doc: &Document) -> GameDetails {
    GameDetails {
        record: normalize(doc),
        developers: list_field(doc, "developers").unwrap_or_else(|| UNKNOWN.to_string()),
        publishers: list_field(doc, "publishers").unwrap_or_else(|| UNKNOWN.to_string()),
        genres: list_field(doc, "genres"),
        reviews: review_summary(doc),
        top_tags: tags::summarize_top_tags(doc),
        description: match doc.get("short_description") {
            Some(Bson::String(text)) if !text.is_empty() => text.clone(),
            _ => NO_DESCRIPTION.to_string(),
        },
    }
}

/// Identifier as the presentation layer sees it: object ids as 24-char hex.
pub fn document_id(doc: &Document) -> String {
    match doc.get("_id") {
        Some(Bson::ObjectId(oid)) => oid.to_hex(),
        Some(other) => scalar_label(other).unwrap_or_else(|| UNKNOWN.to_string()),
        None => UNKNOWN.to_string(),
    }
}

pub fn review_summary(doc: &Document) -> ReviewSummary {
    ReviewSummary {
        positive: doc.get("positive").and_then(as_i64).unwrap_or(0),
        negative: doc.get("negative").and_then(as_i64).unwrap_or(0),
    }
}

fn positive_rate(doc: &Document) -> String {
    let has_counts = doc.contains_key("positive") || doc.contains_key("negative");
    match doc.get("positive_rate") {
        // Already-normalized rows carry the label instead of the counts
        Some(Bson::String(label)) if !has_counts && !label.trim().is_empty() => {
            label.trim().to_string()
        }
        _ => review_summary(doc).rate_label(),
    }
}

fn text_field(doc: &Document, key: &str) -> String {
    doc.get(key)
        .and_then(scalar_label)
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| UNKNOWN.to_string())
}

fn release_date(doc: &Document) -> String {
    match doc.get("release_date") {
        Some(Bson::DateTime(when)) => when.to_chrono().format("%Y-%m-%d").to_string(),
        _ => text_field(doc, "release_date"),
    }
}

/// Joined list field, `None` when missing or empty.
fn list_field(doc: &Document, key: &str) -> Option<String> {
    doc.get(key)
        .and_then(FieldValue::from_bson)
        .filter(|value| !value.is_empty())
        .map(|value| value.joined())
}

/// Price with a dollar sign and two decimals; text that is already a
/// label passes through.
pub fn price_label(value: Option<&Bson>) -> String {
    match value {
        Some(Bson::String(text)) => {
            let text = text.trim();
            if text.is_empty() {
                UNKNOWN.to_string()
            } else if text.starts_with('$') || text == UNKNOWN {
                text.to_string()
            } else {
                format!("${}", text)
            }
        }
        Some(other) => match as_f64(other) {
            Some(price) => format!("${:.2}", price),
            None => UNKNOWN.to_string(),
        },
        None => UNKNOWN.to_string(),
    }
}

/// Peak concurrent users. 0 and 1 mean "never computed" in the source data.
pub fn peak_ccu_label(value: Option<&Bson>) -> String {
    let Some(value) = value else {
        return NOT_AVAILABLE.to_string();
    };
    match as_i64(value) {
        Some(0) | Some(1) => NOT_AVAILABLE.to_string(),
        Some(count) => count.to_string(),
        None => match value {
            Bson::String(text) if !text.trim().is_empty() => text.trim().to_string(),
            _ => NOT_AVAILABLE.to_string(),
        },
    }
}

fn scalar_label(value: &Bson) -> Option<String> {
    match value {
        Bson::String(text) => Some(text.trim().to_string()),
        Bson::Int32(n) => Some(n.to_string()),
        Bson::Int64(n) => Some(n.to_string()),
        Bson::Double(n) => Some(n.to_string()),
        Bson::Boolean(b) => Some(b.to_string()),
        Bson::ObjectId(oid) => Some(oid.to_hex()),
        Bson::DateTime(when) => Some(when.to_chrono().format("%Y-%m-%d").to_string()),
        _ => None,
    }
}

/// Integral value of a number or numeric string.
pub fn as_i64(value: &Bson) -> Option<i64> {
    match value {
        Bson::Int32(n) => Some(i64::from(*n)),
        Bson::Int64(n) => Some(*n),
        Bson::Double(n) if n.is_finite() && n.fract() == 0.0 => Some(*n as i64),
        Bson::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

pub fn as_f64(value: &Bson) -> Option<f64> {
    match value {
        Bson::Int32(n) => Some(f64::from(*n)),
        Bson::Int64(n) => Some(*n as f64),
        Bson::Double(n) if n.is_finite() => Some(*n),
        Bson::String(text) => text.trim().parse().ok().filter(|n: &f64| n.is_finite()),
        _ => None,
    }
}
