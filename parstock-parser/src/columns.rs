//! Column-role discovery.
//!
//! Two independent passes produce the same `(index, ColumnRole)` shape:
//!
//! - [`discover_from_headers`] reads header text: dated snapshot columns,
//!   usage-range columns and "ordered" companion columns.
//! - [`infer_from_data`] looks for mostly-numeric data columns whose date can
//!   still be recovered from header text.
//!
//! [`discover`] runs the header pass, falls back to the data pass only when
//! no snapshot column was found, and assembles the result together with the
//! fixed single-occurrence columns into a [`ColumnLayout`].

use std::fmt;
use std::sync::OnceLock;

use parstock_core::numbers::is_numeric_cell;
use parstock_core::thresholds::{
    FALLBACK_FIRST_COLUMN, FALLBACK_MAX_COLUMN, FALLBACK_NUMERIC_RATIO, FALLBACK_SAMPLE_ROWS,
    ORDERED_HEADER_MAX_LEN,
};
use parstock_core::MonthDay;
use regex::Regex;

use crate::grid::{cell, normalize_header, Row};

// ---------------------------------------------------------------------------
// Roles
// ---------------------------------------------------------------------------

/// A `from-to` usage period; usage is keyed by its end date.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DateRange {
    pub start: MonthDay,
    pub end: MonthDay,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColumnRole {
    Location,
    Product,
    Total,
    ParLevel,
    QuantityToOrder,
    LinkToOrder,
    DatedSnapshot(MonthDay),
    OrderedFor(MonthDay),
    UsageFor(DateRange),
}

impl fmt::Display for ColumnRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnRole::Location => write!(f, "Location"),
            ColumnRole::Product => write!(f, "Product"),
            ColumnRole::Total => write!(f, "Total"),
            ColumnRole::ParLevel => write!(f, "Par Level"),
            ColumnRole::QuantityToOrder => write!(f, "Quantity to Order"),
            ColumnRole::LinkToOrder => write!(f, "Link to Order"),
            ColumnRole::DatedSnapshot(date) => write!(f, "Inv {}", date),
            ColumnRole::OrderedFor(date) => write!(f, "Ordered ({})", date),
            ColumnRole::UsageFor(range) => write!(f, "{}-{} Usage", range.start, range.end),
        }
    }
}

// ---------------------------------------------------------------------------
// Header text classifiers
// ---------------------------------------------------------------------------

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("built-in column pattern must compile")
}

/// Snapshot header patterns, most specific first.
fn snapshot_patterns() -> &'static [Regex] {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        vec![
            compile(r"(?i)inv\s+(\d{1,2}/\d{1,2})"),
            compile(r"^(\d{1,2}/\d{1,2})$"),
            compile(r"(?i)inv.*?(\d{1,2}/\d{1,2})"),
            compile(r"(\d{1,2}/\d{1,2})"),
        ]
    })
}

fn usage_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| compile(r"(?i)(\d{1,2}/\d{1,2})\s*-\s*(\d{1,2}/\d{1,2})\s*usage"))
}

/// Extract the snapshot date from a header such as `"Inv 12/8"`,
/// `"Inv\n12/08"` or a bare `"12/8"`.
///
/// Patterns are tried in order; a pattern that matches an out-of-range date
/// falls through to the next one.
pub fn parse_snapshot_date(header: &str) -> Option<MonthDay> {
    let normalized = normalize_header(header);
    if normalized.is_empty() {
        return None;
    }
    snapshot_patterns().iter().find_map(|re| {
        re.captures(&normalized)
            .and_then(|caps| MonthDay::parse(caps.get(1)?.as_str()))
    })
}

/// Extract the period from a `"12/8-12/15 Usage"` header.
pub fn parse_usage_range(header: &str) -> Option<DateRange> {
    let normalized = normalize_header(header);
    let caps = usage_pattern().captures(&normalized)?;
    Some(DateRange {
        start: MonthDay::parse(caps.get(1)?.as_str())?,
        end: MonthDay::parse(caps.get(2)?.as_str())?,
    })
}

/// `"Ordered"`, or a short header containing it. Longer headers that
/// merely mention the word are left alone.
pub fn is_ordered_header(header: &str) -> bool {
    let lower = normalize_header(header).to_lowercase();
    lower == "ordered" || (lower.contains("ordered") && lower.len() < ORDERED_HEADER_MAX_LEN)
}

// ---------------------------------------------------------------------------
// Fixed columns
// ---------------------------------------------------------------------------

/// Positions of the single-occurrence columns.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FixedColumns {
    pub location: usize,
    pub product: usize,
    pub total: usize,
    pub par_level: usize,
    pub quantity_to_order: usize,
    pub link_to_order: usize,
}

impl Default for FixedColumns {
    /// Positional layout used when no header matches.
    fn default() -> Self {
        Self {
            location: 0,
            product: 1,
            total: 2,
            par_level: 3,
            quantity_to_order: 4,
            link_to_order: 5,
        }
    }
}

impl FixedColumns {
    /// First header match for each role over the whole header row, falling
    /// back to the positional default per role.
    pub fn locate(headers: &[String]) -> Self {
        let lowered: Vec<String> = headers
            .iter()
            .map(|h| normalize_header(h).to_lowercase())
            .collect();
        let find = |pred: fn(&str) -> bool| lowered.iter().position(|h| pred(h));
        let defaults = Self::default();

        Self {
            location: find(|h| h.contains("location")).unwrap_or(defaults.location),
            product: find(|h| h.contains("product")).unwrap_or(defaults.product),
            total: find(|h| h.contains("total") && !h.contains("order")).unwrap_or(defaults.total),
            par_level: find(|h| {
                h.contains("par level") || h.contains("parlevel") || (h.contains("par") && h.contains("level"))
            })
            .unwrap_or(defaults.par_level),
            quantity_to_order: find(|h| {
                h.contains("quantity to order")
                    || h.contains("quantitytoorder")
                    || (h.contains("quantity") && h.contains("order"))
            })
            .unwrap_or(defaults.quantity_to_order),
            link_to_order: find(|h| {
                h.contains("link to order")
                    || h.contains("linktoorder")
                    || (h.contains("link") && h.contains("order") && h.contains("more"))
            })
            .unwrap_or(defaults.link_to_order),
        }
    }

    pub fn roles(&self) -> [(usize, ColumnRole); 6] {
        [
            (self.location, ColumnRole::Location),
            (self.product, ColumnRole::Product),
            (self.total, ColumnRole::Total),
            (self.par_level, ColumnRole::ParLevel),
            (self.quantity_to_order, ColumnRole::QuantityToOrder),
            (self.link_to_order, ColumnRole::LinkToOrder),
        ]
    }
}

// ---------------------------------------------------------------------------
// Discovery passes
// ---------------------------------------------------------------------------

/// Classify header cells `0..width` into snapshot, usage and ordered roles.
///
/// A header carrying a full usage range is a usage column, since the range
/// also contains a date; any other header is tried against the snapshot
/// patterns first. Duplicate snapshot dates keep the first column. An
/// ordered column belongs to the last snapshot column seen before it in scan
/// order, and is dropped if no snapshot precedes it.
pub fn discover_from_headers(headers: &[String], width: usize) -> Vec<(usize, ColumnRole)> {
    let mut roles = Vec::new();
    let mut last_snapshot: Option<MonthDay> = None;

    for index in 0..width {
        let header = normalize_header(cell(headers, index));
        if header.is_empty() {
            continue;
        }

        if let Some(range) = parse_usage_range(&header) {
            log::debug!("column {}: usage {}-{} ({:?})", index, range.start, range.end, header);
            roles.push((index, ColumnRole::UsageFor(range)));
        } else if let Some(date) = parse_snapshot_date(&header) {
            if has_snapshot(&roles, date) {
                log::debug!("column {}: skipping duplicate snapshot date {}", index, date);
            } else {
                log::debug!("column {}: snapshot {} ({:?})", index, date, header);
                roles.push((index, ColumnRole::DatedSnapshot(date)));
            }
            last_snapshot = Some(date);
        } else if is_ordered_header(&header) {
            match last_snapshot {
                Some(date) => {
                    log::debug!("column {}: ordered for {}", index, date);
                    roles.push((index, ColumnRole::OrderedFor(date)));
                }
                None => log::debug!("column {}: ordered column before any snapshot, ignored", index),
            }
        }
    }
    roles
}

/// Recover snapshot columns from the data when headers yielded none.
///
/// Scans columns from `FALLBACK_FIRST_COLUMN`, sampling the non-empty cells
/// of the first `FALLBACK_SAMPLE_ROWS` data rows. A column qualifies when at
/// least `FALLBACK_NUMERIC_RATIO` of the sample is numeric and a date can be
/// read from its header cell, or failing that from the same column in one of
/// the rows above the header row.
pub fn infer_from_data(
    headers: &[String],
    preamble: &[Row],
    data: &[Row],
    width: usize,
) -> Vec<(usize, ColumnRole)> {
    let mut roles: Vec<(usize, ColumnRole)> = Vec::new();
    let sample = &data[..data.len().min(FALLBACK_SAMPLE_ROWS)];

    for index in FALLBACK_FIRST_COLUMN..width.min(FALLBACK_MAX_COLUMN) {
        let values: Vec<&str> = sample
            .iter()
            .map(|row| cell(row, index))
            .filter(|c| !c.is_empty())
            .collect();
        if values.is_empty() {
            continue;
        }
        let numeric = values.iter().filter(|c| is_numeric_cell(c)).count();
        if (numeric as f64) < values.len() as f64 * FALLBACK_NUMERIC_RATIO {
            continue;
        }

        let candidates = std::iter::once(cell(headers, index))
            .chain(preamble.iter().map(|row| cell(row, index)));
        let date = candidates
            .filter(|text| parse_usage_range(text).is_none())
            .find_map(parse_snapshot_date);

        match date {
            Some(date) if has_snapshot(&roles, date) => {
                log::debug!("column {}: inferred duplicate date {}, skipped", index, date);
            }
            Some(date) => {
                log::debug!("column {}: snapshot {} inferred from numeric data", index, date);
                roles.push((index, ColumnRole::DatedSnapshot(date)));
            }
            None => log::debug!("column {}: numeric data but no date header", index),
        }
    }
    roles
}

fn has_snapshot(roles: &[(usize, ColumnRole)], date: MonthDay) -> bool {
    roles
        .iter()
        .any(|(_, role)| matches!(role, ColumnRole::DatedSnapshot(d) if *d == date))
}

// ---------------------------------------------------------------------------
// Layout
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UsageColumn {
    pub index: usize,
    pub range: DateRange,
}

/// A dated stock column with its joined companion columns.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SnapshotColumn {
    pub index: usize,
    pub date: MonthDay,
    pub ordered: Option<usize>,
    pub usage: Option<UsageColumn>,
}

/// Every column role the parser needs for one grid.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColumnLayout {
    pub fixed: FixedColumns,
    /// Chronological by (month, day).
    pub snapshots: Vec<SnapshotColumn>,
}

impl ColumnLayout {
    /// Pair discovered roles into snapshot columns.
    ///
    /// Each snapshot takes the first ordered column tagged with its date and
    /// the first usage column whose range ends on its date.
    pub fn assemble(fixed: FixedColumns, roles: &[(usize, ColumnRole)]) -> Self {
        let mut snapshots: Vec<SnapshotColumn> = roles
            .iter()
            .filter_map(|&(index, role)| match role {
                ColumnRole::DatedSnapshot(date) => Some(SnapshotColumn {
                    index,
                    date,
                    ordered: roles.iter().find_map(|&(i, r)| match r {
                        ColumnRole::OrderedFor(d) if d == date => Some(i),
                        _ => None,
                    }),
                    usage: roles.iter().find_map(|&(i, r)| match r {
                        ColumnRole::UsageFor(range) if range.end == date => {
                            Some(UsageColumn { index: i, range })
                        }
                        _ => None,
                    }),
                }),
                _ => None,
            })
            .collect();
        snapshots.sort_by_key(|s| s.date);
        Self { fixed, snapshots }
    }

    /// Column holding current stock: the latest snapshot, if any.
    pub fn latest_snapshot(&self) -> Option<&SnapshotColumn> {
        self.snapshots.last()
    }

    /// All assigned roles, ordered by column index.
    pub fn roles(&self) -> Vec<(usize, ColumnRole)> {
        let mut roles: Vec<(usize, ColumnRole)> = self.fixed.roles().to_vec();
        for s in &self.snapshots {
            roles.push((s.index, ColumnRole::DatedSnapshot(s.date)));
            if let Some(i) = s.ordered {
                roles.push((i, ColumnRole::OrderedFor(s.date)));
            }
            if let Some(u) = s.usage {
                roles.push((u.index, ColumnRole::UsageFor(u.range)));
            }
        }
        roles.sort_by_key(|(i, _)| *i);
        roles
    }
}

/// Run both discovery passes and assemble the layout.
///
/// `header_row` indexes into `grid`; rows before it are the preamble, rows
/// after it are data.
pub fn discover(grid: &[Row], header_row: usize, width: usize) -> ColumnLayout {
    let headers: &[String] = grid.get(header_row).map(|r| r.as_slice()).unwrap_or(&[]);
    let fixed = FixedColumns::locate(headers);

    let mut roles = discover_from_headers(headers, width);
    let found_in_headers = roles
        .iter()
        .any(|(_, r)| matches!(r, ColumnRole::DatedSnapshot(_)));
    if !found_in_headers {
        log::debug!("no snapshot columns in headers, scanning data columns");
        let preamble = &grid[..header_row.min(grid.len())];
        let data = grid.get(header_row + 1..).unwrap_or(&[]);
        roles.extend(infer_from_data(headers, preamble, data, width));
    }

    ColumnLayout::assemble(fixed, &roles)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Row {
        cells.iter().map(|s| s.to_string()).collect()
    }

    fn md(s: &str) -> MonthDay {
        MonthDay::parse(s).unwrap()
    }

    #[test]
    fn snapshot_headers_in_several_spellings() {
        assert_eq!(parse_snapshot_date("Inv 12/8"), Some(md("12/08")));
        assert_eq!(parse_snapshot_date("inv\n12/08"), Some(md("12/08")));
        assert_eq!(parse_snapshot_date("9/5"), Some(md("09/05")));
        assert_eq!(parse_snapshot_date("Inventory count 1/15"), Some(md("01/15")));
        assert_eq!(parse_snapshot_date("Counted 3/4 (late)"), Some(md("03/04")));
        assert_eq!(parse_snapshot_date("Product"), None);
        assert_eq!(parse_snapshot_date(""), None);
    }

    #[test]
    fn invalid_dates_fall_through_every_pattern() {
        assert_eq!(parse_snapshot_date("Inv 13/45"), None);
        assert_eq!(parse_snapshot_date("123/45"), None);
    }

    #[test]
    fn usage_ranges() {
        let range = parse_usage_range("12/8-12/15 Usage").unwrap();
        assert_eq!(range.start, md("12/08"));
        assert_eq!(range.end, md("12/15"));
        assert!(parse_usage_range("12/8 - 12/15\nusage").is_some());
        assert!(parse_usage_range("Usage").is_none());
        assert!(parse_usage_range("12/8-13/15 Usage").is_none());
    }

    #[test]
    fn ordered_headers_must_be_short() {
        assert!(is_ordered_header("Ordered"));
        assert!(is_ordered_header("ORDERED"));
        assert!(is_ordered_header("Qty ordered"));
        assert!(!is_ordered_header("Items that were ordered last month"));
        assert!(!is_ordered_header("Order"));
    }

    #[test]
    fn fixed_columns_by_header_text() {
        let headers = row(&[
            "Product",
            "Location",
            "Par Level",
            "Total to order",
            "Total",
            "Link to Order More",
            "Quantity to Order",
        ]);
        let fixed = FixedColumns::locate(&headers);
        assert_eq!(fixed.product, 0);
        assert_eq!(fixed.location, 1);
        assert_eq!(fixed.par_level, 2);
        assert_eq!(fixed.total, 4);
        assert_eq!(fixed.link_to_order, 5);
        assert_eq!(fixed.quantity_to_order, 6);
    }

    #[test]
    fn fixed_columns_fall_back_to_positions() {
        let fixed = FixedColumns::locate(&row(&["", "", "", ""]));
        assert_eq!(fixed, FixedColumns::default());
        let partial = FixedColumns::locate(&row(&["Stuff", "Things", "Product"]));
        assert_eq!(partial.product, 2);
        assert_eq!(partial.location, 0);
    }

    #[test]
    fn duplicate_snapshot_dates_keep_the_first() {
        let headers = row(&["Location", "Product", "Inv 9/5", "Inv 09/05", "Inv 9/12"]);
        let roles = discover_from_headers(&headers, headers.len());
        assert_eq!(
            roles,
            vec![
                (2, ColumnRole::DatedSnapshot(md("9/5"))),
                (4, ColumnRole::DatedSnapshot(md("9/12"))),
            ]
        );
    }

    #[test]
    fn usage_headers_are_not_mistaken_for_snapshots() {
        let headers = row(&["Inv 12/8", "Inv 12/15", "12/8-12/15 Usage"]);
        let roles = discover_from_headers(&headers, 3);
        assert_eq!(roles.len(), 3);
        assert!(matches!(roles[2].1, ColumnRole::UsageFor(r) if r.end == md("12/15")));
    }

    #[test]
    fn usage_word_without_a_range_still_yields_a_snapshot() {
        let headers = row(&["Location", "Product", "Inv 12/15 (usage est)", "Ordered"]);
        let roles = discover_from_headers(&headers, headers.len());
        assert_eq!(
            roles,
            vec![
                (2, ColumnRole::DatedSnapshot(md("12/15"))),
                (3, ColumnRole::OrderedFor(md("12/15"))),
            ]
        );
    }

    #[test]
    fn inference_skips_usage_ranges_but_not_usage_notes() {
        let headers = row(&["L", "P", "T", "Par", "Q", "Link", "12/1-12/8 Usage", "Inv 12/8 usage est"]);
        let data = vec![row(&["Golf", "Tees", "", "", "", "", "4", "5"])];
        let roles = infer_from_data(&headers, &[], &data, 8);
        assert_eq!(roles, vec![(7, ColumnRole::DatedSnapshot(md("12/8")))]);
    }

    #[test]
    fn ordered_pairs_with_last_snapshot_in_scan_order() {
        let headers = row(&["Ordered", "Inv 12/8", "Ordered", "Inv 12/15", "Notes", "Ordered"]);
        let roles = discover_from_headers(&headers, headers.len());
        assert_eq!(
            roles,
            vec![
                (1, ColumnRole::DatedSnapshot(md("12/8"))),
                (2, ColumnRole::OrderedFor(md("12/8"))),
                (3, ColumnRole::DatedSnapshot(md("12/15"))),
                (5, ColumnRole::OrderedFor(md("12/15"))),
            ]
        );
    }

    #[test]
    fn layout_joins_companions_and_sorts_chronologically() {
        let headers = row(&[
            "Location",
            "Product",
            "Total",
            "Par Level",
            "Quantity to Order",
            "Link to Order More",
            "Inv 12/15",
            "Ordered",
            "12/8-12/15 Usage",
            "Inv 12/8",
            "Ordered",
        ]);
        let layout = discover(&[headers.clone(), row(&["x"])], 0, headers.len());
        assert_eq!(layout.snapshots.len(), 2);
        assert_eq!(
            layout.snapshots[0],
            SnapshotColumn {
                index: 9,
                date: md("12/8"),
                ordered: Some(10),
                usage: None
            }
        );
        assert_eq!(
            layout.snapshots[1],
            SnapshotColumn {
                index: 6,
                date: md("12/15"),
                ordered: Some(7),
                usage: Some(UsageColumn {
                    index: 8,
                    range: DateRange {
                        start: md("12/8"),
                        end: md("12/15")
                    }
                })
            }
        );
        assert_eq!(layout.latest_snapshot().map(|s| s.index), Some(6));
    }

    #[test]
    fn data_columns_are_inferred_when_headers_have_no_dates() {
        // Dates sit on a title row above the widest row.
        let grid = vec![
            row(&["", "", "", "", "", "", "12/1", "12/8", "Notes"]),
            row(&[
                "Location", "Product", "Total", "Par", "Qty", "Link", "Count A", "Count B", "Memo", "",
            ]),
            row(&["Golf", "Tees", "5", "10", "", "", "4", "1,200", "ok"]),
            row(&["Golf", "Balls", "5", "10", "", "", "", "7", "fine"]),
            row(&["Golf", "Pencils", "5", "10", "", "", "n/a", "3", "x"]),
        ];
        let header_row = crate::grid::find_header_row(&grid);
        assert_eq!(header_row, 1);
        let layout = discover(&grid, header_row, crate::grid::grid_width(&grid));
        let found: Vec<(usize, MonthDay)> =
            layout.snapshots.iter().map(|s| (s.index, s.date)).collect();
        // Column 6 is only half numeric, column 8 is text.
        assert_eq!(found, vec![(7, md("12/8"))]);
    }

    #[test]
    fn inference_needs_a_date_somewhere() {
        let headers = row(&["L", "P", "T", "Par", "Q", "Link", "Count"]);
        let data = vec![row(&["Golf", "Tees", "", "", "", "", "4"])];
        assert!(infer_from_data(&headers, &[], &data, 7).is_empty());
    }

    #[test]
    fn seventy_percent_numeric_is_enough() {
        let headers = row(&["L", "P", "T", "Par", "Q", "Link", "Inv 1/5"]);
        let mut data: Vec<Row> = (0..7).map(|_| row(&["", "", "", "", "", "", "3"])).collect();
        data.extend((0..3).map(|_| row(&["", "", "", "", "", "", "none"])));
        let roles = infer_from_data(&headers, &[], &data, 7);
        assert_eq!(roles, vec![(6, ColumnRole::DatedSnapshot(md("1/5")))]);
    }

    #[test]
    fn layout_roles_cover_fixed_and_dated_columns() {
        let headers = row(&["Location", "Product", "Total", "Par Level", "Qty to order", "Link", "Inv 1/5", "Ordered"]);
        let layout = discover(&[headers.clone()], 0, headers.len());
        let roles = layout.roles();
        assert_eq!(roles.first(), Some(&(0, ColumnRole::Location)));
        assert!(roles.contains(&(6, ColumnRole::DatedSnapshot(md("1/5")))));
        assert!(roles.contains(&(7, ColumnRole::OrderedFor(md("1/5")))));
        assert_eq!(ColumnRole::DatedSnapshot(md("1/5")).to_string(), "Inv 01/05");
    }
}
