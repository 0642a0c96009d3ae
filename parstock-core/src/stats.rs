//! Dashboard statistics over a parsed item list.

use std::collections::{BTreeMap, BTreeSet};

use crate::dates::MonthDay;
use crate::locations::LocationCatalog;
use crate::model::{DashboardStats, InventoryItem, StockSource};

/// Reduce items into the dashboard aggregates.
///
/// Every item's stock lands in exactly one `stock_by_location` bucket, so the
/// bucket sum always equals `total_stock`.
pub fn compute_stats(items: &[InventoryItem], catalog: &LocationCatalog) -> DashboardStats {
    let historical_dates: Vec<MonthDay> = items
        .iter()
        .flat_map(|item| item.historical_snapshots.iter().map(|s| s.date))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let stock_source_date = historical_dates
        .last()
        .copied()
        .map(StockSource::Dated)
        .unwrap_or(StockSource::TotalColumn);

    let mut stock_by_location: BTreeMap<String, f64> = BTreeMap::new();
    for item in items {
        *stock_by_location.entry(item.location.clone()).or_insert(0.0) += item.stock;
    }

    let mut locations: Vec<String> = stock_by_location.keys().cloned().collect();
    locations.sort_by(|a, b| catalog.compare_locations(a, b));

    let stats = DashboardStats {
        total_items: items.len(),
        total_stock: items.iter().map(|i| i.stock).sum(),
        items_below_par: items.iter().filter(|i| i.is_below_par).count(),
        total_order_amount: items.iter().map(|i| i.order_amount).sum(),
        locations,
        stock_by_location,
        high_volatility_items: items.iter().filter(|i| i.is_high_volatility()).count(),
        historical_dates,
        stock_source_date,
    };

    log::info!(
        "stats: {} items, {} below par, stock source {}",
        stats.total_items,
        stats.items_below_par,
        stats.stock_source_date
    );

    stats
}
