// lib.rs - Root module for the steam_catalog library
//
// `catalog` holds the query core and store access. `fixtures` holds
// reusable game documents for tests and offline demos.

pub mod catalog;

/// The fixtures module contains reusable test collections
pub mod fixtures;
