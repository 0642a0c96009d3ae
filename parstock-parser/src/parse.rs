//! Grid to item list.
//!
//! The entry points are pure: every piece of working state (the chosen
//! header row, the column layout, the section tracker) lives inside one call.

use std::collections::BTreeMap;

use parstock_core::thresholds::MIN_GRID_ROWS;
use parstock_core::{
    parse_cell_number, HistoricalSnapshot, InventoryItem, LocationCatalog, StockSource,
};

use crate::columns::{discover, ColumnLayout};
use crate::grid::{cell, find_header_row, grid_width, is_blank_row, Row};
use crate::links::extract_order_link;
use crate::sections::{Placement, RowOutcome, SectionTracker};

/// Everything one parse produced, including how the grid was read.
#[derive(Clone, Debug, PartialEq)]
pub struct ParsedSheet {
    pub header_row: usize,
    pub layout: ColumnLayout,
    pub items: Vec<InventoryItem>,
}

impl ParsedSheet {
    pub fn stock_source(&self) -> StockSource {
        self.layout
            .latest_snapshot()
            .map(|s| StockSource::Dated(s.date))
            .unwrap_or(StockSource::TotalColumn)
    }
}

/// Parse with the built-in location catalog.
pub fn parse(grid: &[Row]) -> Vec<InventoryItem> {
    parse_grid(grid, &LocationCatalog::default())
}

/// Parse a grid into items. Grids with fewer than two rows yield nothing.
pub fn parse_grid(grid: &[Row], catalog: &LocationCatalog) -> Vec<InventoryItem> {
    parse_sheet(grid, catalog)
        .map(|sheet| sheet.items)
        .unwrap_or_default()
}

/// Parse a grid, keeping the header row and column layout alongside the
/// items. `None` when the grid is too small to have a header and data.
pub fn parse_sheet(grid: &[Row], catalog: &LocationCatalog) -> Option<ParsedSheet> {
    if grid.len() < MIN_GRID_ROWS {
        log::debug!("grid has {} rows, nothing to parse", grid.len());
        return None;
    }

    let header_row = find_header_row(grid);
    log::debug!(
        "header row {} ({} cells)",
        header_row,
        grid[header_row].len()
    );

    let layout = discover(grid, header_row, grid_width(grid));
    match layout.latest_snapshot() {
        Some(latest) => log::debug!(
            "{} snapshot columns, current stock from {} (column {})",
            layout.snapshots.len(),
            latest.date,
            latest.index
        ),
        None => log::warn!(
            "no dated inventory columns found; stock comes from the Total column (column {})",
            layout.fixed.total
        ),
    }

    let mut tracker = SectionTracker::new(catalog);
    let mut items = Vec::new();
    for row in &grid[header_row + 1..] {
        if is_blank_row(row) {
            continue;
        }
        let location_cell = cell(row, layout.fixed.location);
        let product = cell(row, layout.fixed.product);
        if let RowOutcome::Item(placement) = tracker.observe(location_cell, product) {
            items.push(build_item(row, &layout, placement, product));
        }
    }

    log_summary(&items, catalog);
    Some(ParsedSheet {
        header_row,
        layout,
        items,
    })
}

fn build_item(row: &[String], layout: &ColumnLayout, placement: Placement, product: &str) -> InventoryItem {
    let number = |index: usize| parse_cell_number(cell(row, index));

    let snapshots: Vec<HistoricalSnapshot> = layout
        .snapshots
        .iter()
        .map(|col| HistoricalSnapshot {
            date: col.date,
            stock: number(col.index),
            ordered: col.ordered.map(number),
            usage: col.usage.map(|u| number(u.index)),
        })
        .collect();

    let stock = match layout.latest_snapshot() {
        Some(latest) => number(latest.index),
        None => number(layout.fixed.total),
    };

    InventoryItem::new(
        placement.location,
        placement.shelf,
        product.to_string(),
        stock,
        number(layout.fixed.par_level),
        extract_order_link(cell(row, layout.fixed.link_to_order)),
        snapshots,
    )
}

fn log_summary(items: &[InventoryItem], catalog: &LocationCatalog) {
    let mut per_location: BTreeMap<&str, usize> = BTreeMap::new();
    for item in items {
        *per_location.entry(item.location.as_str()).or_default() += 1;
    }
    log::info!(
        "parsed {} items across {} locations",
        items.len(),
        per_location.len()
    );
    for (location, count) in &per_location {
        if !catalog.is_main_location(location) {
            log::warn!("{} items under unrecognised location {:?}", count, location);
        }
    }
}
