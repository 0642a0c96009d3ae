//! Known physical locations: which location-cell values open a new section,
//! and the order locations are presented in.
//!
//! The catalog is plain configuration. It is built once (from the defaults
//! or a JSON file) and passed by reference into the parser and the stats
//! engine, so swapping the lists never touches parsing logic.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

/// Rank given to locations missing from the display order.
pub const UNKNOWN_LOCATION_RANK: usize = 9999;

/// Section headers recognised by the row scan.
pub const DEFAULT_MAIN_LOCATIONS: &[&str] = &[
    "Dock Trailer",
    "Event Shelves",
    "Dock Mop Sink",
    "Karaoke",
    "Basement",
    "Unlocked Room Basement",
    "Front Desk",
    "Mop room by dish",
    "Golf",
    "Hallway Storage by ADA bathrooms",
    "Kitchen Chemical Room",
];

/// Presentation order of physical areas.
pub const DEFAULT_DISPLAY_ORDER: &[&str] = &[
    "Dock Trailer",
    "Event Shelves",
    "Dock Mop Sink",
    "Karaoke",
    "Basement",
    "Unlocked Room Basement",
    "Front Desk",
    "Mop room by dish",
    "Golf",
    "Hallway Storage by ADA bathrooms",
];

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LocationCatalog {
    /// Location-cell values (case-insensitive, exact or substring) that start
    /// a new main-location section.
    pub main_locations: Vec<String>,
    /// Sort priority for display; earlier entries come first.
    pub display_order: Vec<String>,
}

impl Default for LocationCatalog {
    fn default() -> Self {
        Self {
            main_locations: DEFAULT_MAIN_LOCATIONS.iter().map(|s| s.to_string()).collect(),
            display_order: DEFAULT_DISPLAY_ORDER.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl LocationCatalog {
    pub fn new(main_locations: Vec<String>, display_order: Vec<String>) -> Self {
        Self {
            main_locations,
            display_order,
        }
    }

    /// Whether a location cell names (or contains) a known main location.
    pub fn is_main_location(&self, text: &str) -> bool {
        let lower = text.trim().to_lowercase();
        if lower.is_empty() {
            return false;
        }
        self.main_locations.iter().any(|loc| {
            let loc = loc.trim().to_lowercase();
            !loc.is_empty() && (lower == loc || lower.contains(&loc))
        })
    }

    /// Case-folded equality of two location spellings.
    pub fn same_location(a: &str, b: &str) -> bool {
        a.trim().to_lowercase() == b.trim().to_lowercase()
    }

    /// Index in the display order, or [`UNKNOWN_LOCATION_RANK`].
    pub fn sort_rank(&self, location: &str) -> usize {
        self.display_order
            .iter()
            .position(|l| l == location)
            .unwrap_or(UNKNOWN_LOCATION_RANK)
    }

    /// Display-order comparison: known locations by rank, then everything
    /// else alphabetically ignoring case, byte order breaking ties.
    pub fn compare_locations(&self, a: &str, b: &str) -> Ordering {
        self.sort_rank(a)
            .cmp(&self.sort_rank(b))
            .then_with(|| a.to_lowercase().cmp(&b.to_lowercase()))
            .then_with(|| a.cmp(b))
    }
}
