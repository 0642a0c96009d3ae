//! Core model and statistics for par-level inventory sheets.
//!
//! Everything in this crate is a pure function of its inputs: the grid parser
//! builds [`InventoryItem`]s, and the statistics engine reduces them into
//! [`DashboardStats`] without touching any shared state.

pub mod dates;
pub mod locations;
pub mod math;
pub mod model;
pub mod numbers;
pub mod stats;
pub mod thresholds;
pub mod views;
pub mod volatility;

pub use dates::MonthDay;
pub use locations::LocationCatalog;
pub use model::{
    DashboardStats, HistoricalSnapshot, InventoryItem, InventoryReport, StockSource,
    VolatilityMetrics,
};
pub use numbers::parse_cell_number;
pub use stats::compute_stats;
pub use views::{
    group_by_location, shelf_sort_key, sort_for_display, stock_movers, ItemFilter, StockMovement,
    VolatilityFilter,
};
pub use volatility::compute_volatility;
