// fixtures/collections/mod.rs
//
// Collection fixtures. Field encodings mirror the live dataset: platform
// flags are the strings "True"/"False", tags are a single-quoted mapping
// string, and list fields are sometimes bare strings.

pub mod games;

pub use games::{GamesCollection, PlatformTrioCollection};
