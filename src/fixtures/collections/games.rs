// fixtures/collections/games.rs
//
// Game documents covering the shapes the normalizer has to cope with:
// object and string ids, bare-string list fields, the 0/1 peak-CCU
// sentinel, games without reviews, malformed and double-quoted tag
// mappings, and prices on both sides of the default 0-100 range.

use bson::{doc, oid::ObjectId, Document};

use crate::fixtures::TestCollection;

pub const PORTAL_2_ID: &str = "5f1d7a3b9c8e4a0012345601";
pub const STARDEW_VALLEY_ID: &str = "5f1d7a3b9c8e4a0012345602";
pub const HADES_ID: &str = "5f1d7a3b9c8e4a0012345603";
pub const FACTORIO_ID: &str = "5f1d7a3b9c8e4a0012345604";
pub const ROCK_N_ROLL_RACER_ID: &str = "5f1d7a3b9c8e4a0012345607";
pub const FLIGHT_SIM_ID: &str = "5f1d7a3b9c8e4a0012345608";
pub const CELESTE_ID: &str = "app-504230";
pub const PROTOTYPE_ID: &str = "app-000001";

fn oid(hex: &str) -> ObjectId {
    // Constants above are valid 24-char hex
    ObjectId::parse_str(hex).unwrap_or_else(|_| ObjectId::new())
}

/// A realistic slice of the catalog.
pub struct GamesCollection;

impl TestCollection for GamesCollection {
    fn documents() -> Vec<Document> {
        vec![
            doc! {
                "_id": oid(PORTAL_2_ID),
                "name": "Portal 2",
                "release_date": "2011-04-18",
                "price": 9.99,
                "windows": "True",
                "mac": "True",
                "linux": "True",
                "positive": 300_000,
                "negative": 3_000,
                "pct_pos_total": 99,
                "recommendations": 290_000,
                "estimated_owners": "10000000 - 20000000",
                "peak_ccu": 2_500,
                "developers": ["Valve"],
                "publishers": ["Valve"],
                "genres": ["Action", "Adventure"],
                "tags": "{'Puzzle': 1500, 'Co-op': 1200, 'First-Person': 900, 'Sci-fi': 800, 'Funny': 700, 'Singleplayer': 650}",
                "short_description": "The sequel to the award-winning Portal.",
            },
            doc! {
                "_id": oid(STARDEW_VALLEY_ID),
                "name": "Stardew Valley",
                "release_date": "2016-02-26",
                "price": 14.99,
                "windows": "True",
                "mac": "True",
                "linux": "True",
                "positive": 500_000,
                "negative": 8_000,
                "pct_pos_total": 98,
                "recommendations": 480_000,
                "estimated_owners": "20000000 - 50000000",
                "peak_ccu": 94_000,
                "developers": "ConcernedApe",
                "publishers": ["ConcernedApe", "Chucklefish"],
                "genres": ["Indie", "RPG", "Simulation"],
                "tags": "{'Farming Sim': 2000, 'Pixel Graphics': 1500, 'Indie': 1400, 'Co-op': 900}",
                "short_description": "You've inherited your grandfather's old farm plot.",
            },
            doc! {
                "_id": oid(HADES_ID),
                "name": "Hades",
                "release_date": "2020-09-17",
                "price": 24.99,
                "windows": "True",
                "mac": "True",
                "linux": "False",
                "positive": 200_000,
                "negative": 4_000,
                "pct_pos_total": 98,
                "recommendations": 190_000,
                "estimated_owners": "5000000 - 10000000",
                "peak_ccu": 37_000,
                "developers": ["Supergiant Games"],
                "publishers": ["Supergiant Games"],
                "genres": ["Action", "Indie", "RPG"],
                "tags": "{'Roguelike': 1800, 'Action': 1500, 'Indie': 1300}",
                "short_description": "Defy the god of the dead.",
            },
            doc! {
                "_id": oid(FACTORIO_ID),
                "name": "Factorio",
                "release_date": "2020-08-14",
                "price": 35.0,
                "windows": "True",
                "mac": "True",
                "linux": "True",
                "positive": 160_000,
                "negative": 2_000,
                "pct_pos_total": 99,
                "recommendations": 150_000,
                "estimated_owners": "2000000 - 5000000",
                "peak_ccu": 1,
                "developers": ["Wube Software LTD."],
                "publishers": ["Wube Software LTD."],
                "genres": ["Simulation", "Strategy"],
                "tags": "{'Automation': 2500, 'Base Building': 1800, 'Indie': 900}",
                "short_description": "Build and maintain factories.",
            },
            doc! {
                "_id": CELESTE_ID,
                "name": "Celeste",
                "release_date": "2018-01-25",
                "price": 19.99,
                "windows": "True",
                "mac": "True",
                "linux": "True",
                "positive": 90_000,
                "negative": 2_500,
                "pct_pos_total": 97,
                "recommendations": 85_000,
                "estimated_owners": "2000000 - 5000000",
                "peak_ccu": 1_200,
                "developers": ["Maddy Makes Games"],
                "publishers": "Maddy Makes Games",
                "genres": ["Action", "Adventure", "Indie"],
                "tags": "{'Precision Platformer': 1600, 'Indie': 1200, 'Pixel Graphics': 800}",
                "short_description": "Help Madeline survive her inner demons.",
            },
            doc! {
                "_id": PROTOTYPE_ID,
                "name": "Untitled Prototype",
                "price": 0,
                "windows": "True",
                "mac": "False",
                "linux": "False",
                "positive": 0,
                "negative": 0,
                "peak_ccu": 0,
                "genres": "Indie",
                "tags": "{'Early Access': }",
            },
            doc! {
                "_id": oid(ROCK_N_ROLL_RACER_ID),
                "name": "Rock 'n' Roll Racer",
                "release_date": "2019-06-01",
                "price": 4.99,
                "windows": "False",
                "mac": "True",
                "linux": "False",
                "positive": 30,
                "negative": 10,
                "pct_pos_total": 75,
                "estimated_owners": "0 - 20000",
                "peak_ccu": 12,
                "developers": ["Garage Band Studio"],
                "publishers": ["Garage Band Studio"],
                "genres": ["Racing", "Indie"],
                "tags": "{\"Rock 'n' Roll\": 40, 'Racing': 30}",
            },
            doc! {
                "_id": oid(FLIGHT_SIM_ID),
                "name": "Flight Simulator Deluxe",
                "release_date": "2020-08-18",
                "price": 119.99,
                "windows": "True",
                "mac": "False",
                "linux": "False",
                "positive": 40_000,
                "negative": 10_000,
                "pct_pos_total": 80,
                "recommendations": 38_000,
                "estimated_owners": "1000000 - 2000000",
                "peak_ccu": 15_000,
                "developers": ["Asobo Studio"],
                "publishers": ["Xbox Game Studios"],
                "genres": ["Simulation"],
                "tags": "{'Simulation': 1500, 'Flight': 1300, 'Open World': 700}",
                "short_description": "From light planes to wide-body jets.",
            },
        ]
    }
}

/// Three games: two Windows titles with an "a" in the name, one without
/// a Windows build.
pub struct PlatformTrioCollection;

impl TestCollection for PlatformTrioCollection {
    fn documents() -> Vec<Document> {
        vec![
            doc! {
                "_id": oid(STARDEW_VALLEY_ID),
                "name": "Stardew Valley",
                "price": 14.99,
                "windows": "True",
                "peak_ccu": 94_000,
            },
            doc! {
                "_id": oid(FACTORIO_ID),
                "name": "Factorio",
                "price": 35.0,
                "windows": "False",
                "peak_ccu": 25_000,
            },
            doc! {
                "_id": oid(HADES_ID),
                "name": "Hades",
                "price": 24.99,
                "windows": "True",
                "peak_ccu": 37_000,
            },
        ]
    }
}
