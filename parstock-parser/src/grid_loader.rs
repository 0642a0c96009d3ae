//! Materialize a [`RawGrid`] from an exported sheet.
//!
//! Supported inputs:
//!   - CSV or TSV, no header handling (the parser finds the header row)
//!   - JSON, either a bare array of rows or a values-range response
//!     `{"range": ..., "values": [[...], ...]}`
//!
//! Trailing blank cells are dropped from every row so the result has the
//! same ragged shape a sparse sheet export would.

use std::io::Read;
use std::path::Path;

use serde_json::Value;

use crate::error::{LoadError, LoadResult};
use crate::grid::{RawGrid, Row};

/// Load a grid from delimited text.
pub fn load_delimited<R: Read>(reader: R, delimiter: u8) -> LoadResult<RawGrid> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(reader);

    let mut grid = Vec::new();
    for result in csv_reader.records() {
        let record = result?;
        grid.push(trim_trailing(record.iter().map(String::from).collect()));
    }
    Ok(grid)
}

pub fn load_csv<R: Read>(reader: R) -> LoadResult<RawGrid> {
    load_delimited(reader, b',')
}

/// Load a grid from a JSON document.
pub fn load_json<R: Read>(reader: R) -> LoadResult<RawGrid> {
    let value: Value = serde_json::from_reader(reader)?;
    grid_from_json(value)
}

/// Convert an already-parsed JSON value into a grid.
///
/// Strings pass through, numbers and booleans are stringified, `null` is an
/// empty cell. Nested arrays or objects inside a row are rejected.
pub fn grid_from_json(value: Value) -> LoadResult<RawGrid> {
    let rows = match value {
        Value::Array(rows) => rows,
        Value::Object(mut map) => match map.remove("values") {
            Some(Value::Array(rows)) => rows,
            // An empty range comes back without a values key.
            None => Vec::new(),
            Some(other) => {
                return Err(LoadError::UnsupportedShape(format!(
                    "\"values\" must be an array of rows, got {}",
                    json_kind(&other)
                )))
            }
        },
        other => {
            return Err(LoadError::UnsupportedShape(format!(
                "expected an array of rows or an object with \"values\", got {}",
                json_kind(&other)
            )))
        }
    };

    rows.into_iter()
        .enumerate()
        .map(|(i, row)| match row {
            Value::Array(cells) => cells
                .into_iter()
                .map(|c| json_cell(c, i))
                .collect::<LoadResult<Row>>()
                .map(trim_trailing),
            other => Err(LoadError::UnsupportedShape(format!(
                "row {} is {}, expected an array of cells",
                i,
                json_kind(&other)
            ))),
        })
        .collect()
}

/// Load a grid from a file, choosing the format by extension:
/// `.json`, `.tsv`, anything else is read as CSV.
pub fn load_grid_file(path: impl AsRef<Path>) -> LoadResult<RawGrid> {
    let path = path.as_ref();
    let file = std::fs::File::open(path).map_err(|source| LoadError::Io {
        path: path.display().to_string(),
        source,
    })?;

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    let grid = match extension.as_deref() {
        Some("json") => load_json(file)?,
        Some("tsv") => load_delimited(file, b'\t')?,
        _ => load_csv(file)?,
    };
    log::debug!("loaded {} rows from {}", grid.len(), path.display());
    Ok(grid)
}

fn json_cell(value: Value, row: usize) -> LoadResult<String> {
    match value {
        Value::String(s) => Ok(s),
        Value::Null => Ok(String::new()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        other => Err(LoadError::UnsupportedShape(format!(
            "row {} contains {}, expected a scalar cell",
            row,
            json_kind(&other)
        ))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn trim_trailing(mut row: Row) -> Row {
    while row.last().map(|c| c.trim().is_empty()).unwrap_or(false) {
        row.pop();
    }
    row
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_CSV: &str = "\
Weekly count,,,,,
Location,Product,Total,Par Level,Quantity to Order,Link to Order More,Inv 12/08
Basement,,,,,,
,\"Gloves, nitrile\",\"1,200\",10,,https://example.com/gloves,4
";

    #[test]
    fn csv_rows_keep_their_ragged_shape() {
        let grid = load_csv(SAMPLE_CSV.as_bytes()).unwrap();
        assert_eq!(grid.len(), 4);
        assert_eq!(grid[0], vec!["Weekly count"]);
        assert_eq!(grid[1].len(), 7);
        assert_eq!(grid[2], vec!["Basement"]);
        assert_eq!(grid[3][1], "Gloves, nitrile");
        assert_eq!(grid[3][2], "1,200");
    }

    #[test]
    fn tsv_uses_tabs() {
        let grid = load_delimited("Location\tProduct\nGolf\tTees\n".as_bytes(), b'\t').unwrap();
        assert_eq!(grid[1], vec!["Golf", "Tees"]);
    }

    #[test]
    fn json_values_range_is_unwrapped() {
        let json = r#"{"range": "Sheet1!A1:Z", "values": [["Location", "Product"], ["Golf", "Tees", 12, null, true]]}"#;
        let grid = load_json(json.as_bytes()).unwrap();
        assert_eq!(grid[0], vec!["Location", "Product"]);
        assert_eq!(grid[1], vec!["Golf", "Tees", "12", "", "true"]);
    }

    #[test]
    fn json_bare_array_and_trailing_nulls() {
        let grid = load_json(r#"[["a", "b", null, ""], []]"#.as_bytes()).unwrap();
        assert_eq!(grid[0], vec!["a", "b"]);
        assert!(grid[1].is_empty());
    }

    #[test]
    fn json_without_values_is_an_empty_grid() {
        let grid = load_json(r#"{"range": "Sheet1!A1:Z"}"#.as_bytes()).unwrap();
        assert!(grid.is_empty());
    }

    #[test]
    fn json_shape_errors_are_named() {
        let err = load_json(r#"{"values": 3}"#.as_bytes()).unwrap_err();
        assert!(matches!(err, LoadError::UnsupportedShape(_)));

        let err = load_json(r#"[["a", ["nested"]]]"#.as_bytes()).unwrap_err();
        assert!(matches!(err, LoadError::UnsupportedShape(_)));

        let err = load_json(r#""just text""#.as_bytes()).unwrap_err();
        assert!(matches!(err, LoadError::UnsupportedShape(_)));

        let err = load_json("{not json".as_bytes()).unwrap_err();
        assert!(matches!(err, LoadError::Json(_)));
    }

    #[test]
    fn missing_file_reports_the_path() {
        let err = load_grid_file("/definitely/not/here.csv").unwrap_err();
        match err {
            LoadError::Io { path, .. } => assert_eq!(path, "/definitely/not/here.csv"),
            other => panic!("expected Io error, got {:?}", other),
        }
    }
}
