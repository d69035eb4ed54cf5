//! Price detection for raw cells.
use regex::Regex;
use std::sync::LazyLock;

/// Cells that are a single number, optionally wrapped in a currency symbol
static PRICE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?P<pre>[€$£¥])?\s*(?P<num>[0-9][0-9.,\s]*)\s*(?P<post>[€$£¥])?\s*$")
        .unwrap()
});

/// A numeric price parsed from a cell
#[derive(Debug, Clone, PartialEq)]
pub struct PriceMatch {
    /// Parsed amount
    pub value: f64,
    /// Currency symbol found alongside the number, if any
    pub symbol: Option<char>,
}

/// Detect a price in a raw cell.
///
/// Only cells that are entirely numeric (apart from a currency symbol and grouping
/// punctuation) qualify; a number buried in prose is not a price. Both "1,234.56" and
/// "1.234,56" grouping styles are understood.
pub fn detect_price(cell: &str) -> Option<PriceMatch> {
    let captures = PRICE_RE.captures(cell)?;
    let symbol = captures
        .name("pre")
        .or_else(|| captures.name("post"))
        .and_then(|m| m.as_str().chars().next());
    let value = parse_amount(captures.name("num")?.as_str())?;
    Some(PriceMatch { value, symbol })
}

/// Parse a numeric string whose decimal separator may be "." or ","
fn parse_amount(raw: &str) -> Option<f64> {
    let compact: String = raw.chars().filter(|c| !c.is_whitespace()).collect();

    let normalised = match (compact.contains('.'), compact.contains(',')) {
        (true, true) => {
            // the rightmost separator is the decimal point, the other groups thousands
            if compact.rfind('.') > compact.rfind(',') {
                compact.replace(',', "")
            } else {
                compact.replace('.', "").replace(',', ".")
            }
        }
        (false, true) => {
            // a comma followed by exactly 1 or 2 digits is a decimal comma
            let tail_len = compact.len() - compact.rfind(',').unwrap_or(0) - 1;
            if compact.matches(',').count() == 1 && (1..=2).contains(&tail_len) {
                compact.replace(',', ".")
            } else {
                compact.replace(',', "")
            }
        }
        (true, false) => {
            if compact.matches('.').count() > 1 {
                compact.replace('.', "")
            } else {
                compact
            }
        }
        (false, false) => compact,
    };

    normalised.parse().ok()
}
