//! Centralized tuning constants for sheet parsing and volatility detection.
//!
//! The grid parser and the statistics engine both read from here, so a
//! change to a scan bound or to the outlier rule applies everywhere at once.

/// Number of leading rows inspected when choosing the header row.
pub const HEADER_SCAN_ROWS: usize = 10;

/// Upper bound on the column indices considered during role discovery.
pub const MAX_SCANNED_COLUMNS: usize = 200;

/// A grid with fewer rows than this yields no items.
pub const MIN_GRID_ROWS: usize = 2;

/// First column the data-driven snapshot inference looks at. Columns before
/// it hold the fixed fields (location, product, total, par, quantity to order).
pub const FALLBACK_FIRST_COLUMN: usize = 5;

/// Exclusive upper bound for the data-driven snapshot inference.
pub const FALLBACK_MAX_COLUMN: usize = 100;

/// Data rows sampled per column by the data-driven snapshot inference.
pub const FALLBACK_SAMPLE_ROWS: usize = 10;

/// Share of non-empty sampled cells that must be numeric for a column to be
/// treated as a snapshot candidate.
pub const FALLBACK_NUMERIC_RATIO: f64 = 0.7;

/// Headers containing "ordered" longer than this are not treated as ordered
/// columns (avoids matching long descriptive headers).
pub const ORDERED_HEADER_MAX_LEN: usize = 20;

/// Minimum number of usage samples before volatility is reported.
pub const MIN_USAGE_SAMPLES: usize = 2;

/// Current usage further than this many standard deviations from the mean
/// is flagged as high volatility.
pub const HIGH_VOLATILITY_SIGMAS: f64 = 2.0;
