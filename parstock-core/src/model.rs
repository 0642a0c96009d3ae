use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::dates::MonthDay;
use crate::locations::LocationCatalog;
use crate::volatility::compute_volatility;

// ---------------------------------------------------------------------------
// Item types
// ---------------------------------------------------------------------------

/// Stock recorded in one dated snapshot column, with the ordered and usage
/// companion columns joined in when the sheet has them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoricalSnapshot {
    pub date: MonthDay,
    pub stock: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ordered: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<f64>,
}

/// Usage outlier analysis for a single item.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolatilityMetrics {
    pub mean_usage: f64,
    /// `None` with fewer than two samples.
    pub standard_deviation: Option<f64>,
    /// Most recent usage sample.
    pub current_usage: f64,
    pub is_high_volatility: bool,
    /// Usage samples in chronological order.
    pub historical_usage: Vec<f64>,
}

/// One item row recovered from the sheet.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    /// Location, optional shelf and item name joined with " - ". Not unique
    /// when the sheet repeats a row.
    pub item_id: String,
    pub location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shelf: Option<String>,
    pub item_name: String,
    pub stock: f64,
    pub par: f64,
    pub order_amount: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_link: Option<String>,
    pub is_below_par: bool,
    pub needs_order: bool,
    pub historical_snapshots: Vec<HistoricalSnapshot>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volatility: Option<VolatilityMetrics>,
}

impl InventoryItem {
    /// Assemble an item, deriving the id, reorder fields and volatility.
    ///
    /// `snapshots` must already be in chronological order.
    pub fn new(
        location: String,
        shelf: Option<String>,
        item_name: String,
        stock: f64,
        par: f64,
        order_link: Option<String>,
        historical_snapshots: Vec<HistoricalSnapshot>,
    ) -> Self {
        let item_id = compose_item_id(&location, shelf.as_deref(), &item_name);
        let order_amount = order_amount(stock, par);
        let volatility = compute_volatility(&historical_snapshots);
        Self {
            item_id,
            location,
            shelf,
            item_name,
            stock,
            par,
            order_amount,
            order_link,
            is_below_par: stock < par,
            needs_order: order_amount > 0.0,
            historical_snapshots,
            volatility,
        }
    }

    pub fn is_high_volatility(&self) -> bool {
        self.volatility
            .as_ref()
            .map(|v| v.is_high_volatility)
            .unwrap_or(false)
    }
}

/// Units needed to bring stock back up to par; never negative.
pub fn order_amount(stock: f64, par: f64) -> f64 {
    if stock < par {
        (par - stock).max(0.0)
    } else {
        0.0
    }
}

pub fn compose_item_id(location: &str, shelf: Option<&str>, item_name: &str) -> String {
    match shelf {
        Some(shelf) => format!("{} - {} - {}", location, shelf, item_name),
        None => format!("{} - {}", location, item_name),
    }
}

// ---------------------------------------------------------------------------
// Aggregate types
// ---------------------------------------------------------------------------

/// Label used when no dated snapshot column exists.
pub const TOTAL_COLUMN_SOURCE: &str = "Total column (no date columns found)";

/// Where current stock figures came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StockSource {
    /// The chronologically latest snapshot column.
    Dated(MonthDay),
    /// The plain Total column, because the sheet had no dated columns.
    TotalColumn,
}

impl fmt::Display for StockSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StockSource::Dated(date) => write!(f, "{}", date),
            StockSource::TotalColumn => write!(f, "{}", TOTAL_COLUMN_SOURCE),
        }
    }
}

impl Serialize for StockSource {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for StockSource {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(MonthDay::parse(&s)
            .map(StockSource::Dated)
            .unwrap_or(StockSource::TotalColumn))
    }
}

/// Dashboard-level reductions over the item list.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_items: usize,
    pub total_stock: f64,
    pub items_below_par: usize,
    pub total_order_amount: f64,
    /// Unique locations in display order.
    pub locations: Vec<String>,
    pub stock_by_location: BTreeMap<String, f64>,
    pub high_volatility_items: usize,
    /// Every snapshot date seen on any item, chronologically.
    pub historical_dates: Vec<MonthDay>,
    pub stock_source_date: StockSource,
}

/// The envelope handed to the presentation layer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryReport {
    pub items: Vec<InventoryItem>,
    pub stats: DashboardStats,
}

impl InventoryReport {
    pub fn build(items: Vec<InventoryItem>, catalog: &LocationCatalog) -> Self {
        let stats = crate::stats::compute_stats(&items, catalog);
        Self { items, stats }
    }
}
