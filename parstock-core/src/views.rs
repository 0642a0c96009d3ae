//! Read-only views over parsed items: filtering, display ordering,
//! grouping by location and week-over-week stock movers.

use std::cmp::Ordering;

use serde::Serialize;

use crate::dates::MonthDay;
use crate::locations::LocationCatalog;
use crate::model::InventoryItem;

// ---------------------------------------------------------------------------
// Filtering
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum VolatilityFilter {
    #[default]
    All,
    /// Only items flagged as high volatility.
    High,
    /// Everything that is not flagged, including items without metrics.
    Normal,
}

/// Criteria for narrowing an item list. All criteria must hold.
#[derive(Clone, Debug, Default)]
pub struct ItemFilter {
    /// Exact location name.
    pub location: Option<String>,
    /// Case-insensitive substring over item name, location and shelf.
    pub search: Option<String>,
    pub below_par_only: bool,
    pub volatility: VolatilityFilter,
}

impl ItemFilter {
    /// Whether any criterion narrows the list.
    pub fn is_active(&self) -> bool {
        self.location.is_some()
            || self.search.is_some()
            || self.below_par_only
            || self.volatility != VolatilityFilter::All
    }

    pub fn matches(&self, item: &InventoryItem) -> bool {
        if let Some(ref location) = self.location {
            if &item.location != location {
                return false;
            }
        }
        if self.below_par_only && !item.is_below_par {
            return false;
        }
        match self.volatility {
            VolatilityFilter::All => {}
            VolatilityFilter::High if !item.is_high_volatility() => return false,
            VolatilityFilter::Normal if item.is_high_volatility() => return false,
            _ => {}
        }
        if let Some(ref term) = self.search {
            let term = term.to_lowercase();
            let hit = item.item_name.to_lowercase().contains(&term)
                || item.location.to_lowercase().contains(&term)
                || item
                    .shelf
                    .as_deref()
                    .map(|s| s.to_lowercase().contains(&term))
                    .unwrap_or(false);
            if !hit {
                return false;
            }
        }
        true
    }

    pub fn apply<'a>(&self, items: &'a [InventoryItem]) -> Vec<&'a InventoryItem> {
        items.iter().filter(|i| self.matches(i)).collect()
    }
}

// ---------------------------------------------------------------------------
// Ordering and grouping
// ---------------------------------------------------------------------------

const UNNUMBERED_SHELF: u32 = 9999;

/// Natural ordering key for shelf labels such as "Shelf 2 Row B".
///
/// `(has_no_shelf, shelf_number, row_letter)`: shelf 1 row A < shelf 1 row B
/// < shelf 2 (no row) < anything without a shelf.
pub fn shelf_sort_key(shelf: Option<&str>) -> (bool, u32, Option<char>) {
    let Some(shelf) = shelf else {
        return (true, UNNUMBERED_SHELF, None);
    };
    let lower = shelf.to_lowercase();
    let number = number_after(&lower, "shelf").unwrap_or(UNNUMBERED_SHELF);
    let row = letter_after(&lower, "row");
    // `None` must sort after every letter.
    (false, number, row.or(Some(char::MAX)))
}

fn number_after(text: &str, keyword: &str) -> Option<u32> {
    text.match_indices(keyword).find_map(|(i, _)| {
        let rest = text[i + keyword.len()..].trim_start();
        let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
        digits.parse().ok()
    })
}

fn letter_after(text: &str, keyword: &str) -> Option<char> {
    text.match_indices(keyword).find_map(|(i, _)| {
        text[i + keyword.len()..]
            .trim_start()
            .chars()
            .next()
            .filter(|c| c.is_ascii_lowercase())
    })
}

/// Order items by location rank, then natural shelf order, then name.
pub fn sort_for_display(items: &mut [&InventoryItem], catalog: &LocationCatalog) {
    items.sort_by(|a, b| compare_for_display(a, b, catalog));
}

fn compare_for_display(a: &InventoryItem, b: &InventoryItem, catalog: &LocationCatalog) -> Ordering {
    catalog
        .compare_locations(&a.location, &b.location)
        .then_with(|| shelf_sort_key(a.shelf.as_deref()).cmp(&shelf_sort_key(b.shelf.as_deref())))
        .then_with(|| a.item_name.cmp(&b.item_name))
}

/// Group items by location, groups in catalog order, items in display order.
pub fn group_by_location<'a>(
    items: &'a [InventoryItem],
    catalog: &LocationCatalog,
) -> Vec<(String, Vec<&'a InventoryItem>)> {
    let mut sorted: Vec<&InventoryItem> = items.iter().collect();
    sort_for_display(&mut sorted, catalog);

    let mut groups: Vec<(String, Vec<&InventoryItem>)> = Vec::new();
    for item in sorted {
        match groups.last_mut() {
            Some((location, members)) if *location == item.location => members.push(item),
            _ => groups.push((item.location.clone(), vec![item])),
        }
    }
    groups
}

// ---------------------------------------------------------------------------
// Week-over-week movers
// ---------------------------------------------------------------------------

/// Stock change between an item's two most recent snapshots.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StockMovement<'a> {
    #[serde(skip)]
    pub item: &'a InventoryItem,
    pub item_id: &'a str,
    pub previous_date: MonthDay,
    pub latest_date: MonthDay,
    pub previous_stock: f64,
    pub latest_stock: f64,
    /// Positive when stock went up.
    pub change: f64,
    /// Relative to previous stock; 0 when previous stock was not positive.
    pub percent_change: f64,
}

/// Items with the largest absolute week-over-week stock change, biggest first.
///
/// Items with fewer than two snapshots or no change are left out.
pub fn stock_movers(items: &[InventoryItem], limit: usize) -> Vec<StockMovement<'_>> {
    let mut movers: Vec<StockMovement> = items
        .iter()
        .filter_map(|item| {
            let mut snaps: Vec<_> = item.historical_snapshots.iter().collect();
            snaps.sort_by_key(|s| s.date);
            let [.., previous, latest] = snaps.as_slice() else {
                return None;
            };
            let change = latest.stock - previous.stock;
            if change == 0.0 {
                return None;
            }
            let percent_change = if previous.stock > 0.0 {
                change / previous.stock * 100.0
            } else {
                0.0
            };
            Some(StockMovement {
                item,
                item_id: &item.item_id,
                previous_date: previous.date,
                latest_date: latest.date,
                previous_stock: previous.stock,
                latest_stock: latest.stock,
                change,
                percent_change,
            })
        })
        .collect();

    movers.sort_by(|a, b| {
        b.change
            .abs()
            .partial_cmp(&a.change.abs())
            .unwrap_or(Ordering::Equal)
    });
    movers.truncate(limit);
    movers
}
