//! Lenient numeric parsing for hand-typed sheet cells.

/// Parse a cell as a number, stripping comma thousands separators.
///
/// Reads the longest leading numeric prefix ("12 cases" is 12), and returns
/// 0.0 for empty, non-numeric or non-finite input. Never fails.
pub fn parse_cell_number(cell: &str) -> f64 {
    numeric_value(cell).unwrap_or(0.0)
}

/// True when the cell starts with something that reads as a number.
pub fn is_numeric_cell(cell: &str) -> bool {
    numeric_value(cell).is_some()
}

fn numeric_value(cell: &str) -> Option<f64> {
    let cleaned: String = cell.chars().filter(|&c| c != ',').collect();
    let prefix = numeric_prefix(cleaned.trim_start())?;
    prefix.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Longest prefix of the form `[+-]digits[.digits][e[+-]digits]`, requiring
/// at least one digit in the mantissa.
fn numeric_prefix(s: &str) -> Option<&str> {
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end += 1;
    }

    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;

    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        digits += frac_end - frac_start;
        if digits > 0 {
            end = frac_end;
        }
    }

    if digits == 0 {
        return None;
    }

    if end < bytes.len() && (bytes[end] == b'e' || bytes[end] == b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && (bytes[exp_end] == b'+' || bytes[exp_end] == b'-') {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    Some(&s[..end])
}
