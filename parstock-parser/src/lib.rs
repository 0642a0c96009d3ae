//! Grid parser: recovers par-level inventory items from a loosely structured
//! spreadsheet grid.
//!
//! The sheet has no schema. Headers drift, columns get reordered, and a new
//! dated count column is appended every week. Parsing runs in three steps:
//! - pick the header row (the widest of the first rows)
//! - classify columns: fixed fields, dated snapshots, ordered/usage companions
//! - walk the data rows, tracking the current location and shelf
//!
//! Malformed input degrades to defaults; nothing here returns an error
//! except the file loaders.

pub mod columns;
pub mod error;
pub mod grid;
pub mod grid_loader;
pub mod links;
pub mod parse;
pub mod sections;

pub use columns::{ColumnLayout, ColumnRole, DateRange, FixedColumns, SnapshotColumn};
pub use error::{LoadError, LoadResult};
pub use grid::RawGrid;
pub use grid_loader::{grid_from_json, load_csv, load_grid_file, load_json};
pub use links::extract_order_link;
pub use parse::{parse, parse_grid, parse_sheet, ParsedSheet};
pub use sections::{SectionState, SectionTracker};
