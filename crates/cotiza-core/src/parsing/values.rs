use rust_decimal::Decimal;
use std::str::FromStr;

/// Coerce a table cell into a number.
///
/// Accepts plain decimals ("100", "-12.5", "10.5") and scientific notation
/// ("1e3"). Anything else, including the empty string, is `None`; callers
/// decide whether a missing number defaults to zero or stays missing.
pub fn coerce_number(s: &str) -> Option<Decimal> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    Decimal::from_str(s)
        .ok()
        .or_else(|| Decimal::from_scientific(s).ok())
}

/// Parse a printed total amount such as "1.234,56" or "1,234.56".
///
/// When the amount has exactly one comma and it is the last separator, the
/// comma is the decimal mark and every period is a thousands separator.
/// Otherwise commas are thousands separators and are stripped, and of the
/// remaining periods only the last one is kept as the decimal point.
pub fn parse_amount(raw: &str) -> Option<Decimal> {
    let s = raw.trim();
    if !s.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }
    let commas = s.matches(',').count();
    let last_sep = s.chars().rev().find(|c| *c == '.' || *c == ',');

    let normalized = if commas == 1 && last_sep == Some(',') {
        s.replace('.', "").replace(',', ".")
    } else {
        collapse_periods(&s.replace(',', ""))
    };

    Decimal::from_str(&normalized).ok()
}

/// Drop every period except the last one.
fn collapse_periods(s: &str) -> String {
    let periods = s.matches('.').count();
    if periods <= 1 {
        return s.to_string();
    }
    let mut skip = periods - 1;
    s.chars()
        .filter(|&c| {
            if c == '.' && skip > 0 {
                skip -= 1;
                false
            } else {
                true
            }
        })
        .collect()
}
