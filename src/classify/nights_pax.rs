//! Duration and group-size detection for raw cells.
//!
//! Rate-sheet headers express these dimensions in many shapes: combined ("2N/4P",
//! "3 nights 2 people"), worded ("7 nights", "4 pax"), terse ("2N", "4P") or as a bare
//! integer in a column that elsewhere holds night counts.
use regex::Regex;
use std::sync::LazyLock;

/// Confidence when a single pattern yields both dimensions
const COMBINED_CONFIDENCE: f64 = 0.9;
/// Contribution of each standalone single-dimension match
const STANDALONE_CONFIDENCE: f64 = 0.4;
/// Bare integers outside `1..=MAX_BARE_NIGHTS` are not night counts
const MAX_BARE_NIGHTS: u32 = 31;
/// Group sizes above this are treated as noise
const MAX_PAX: u32 = 99;

/// Patterns that capture nights and pax together; the flag marks which comes first
static COMBINED_PATTERNS: LazyLock<Vec<(Regex, &'static str, bool)>> = LazyLock::new(|| {
    vec![
        (
            Regex::new(r"(?i)\b(\d{1,2})\s*n(?:ights?)?\s*[/xX,&+-]?\s*(\d{1,2})\s*p(?:ax|ersons?|eople|ers)?\b")
                .unwrap(),
            "nights-pax",
            true,
        ),
        (
            Regex::new(r"(?i)\b(\d{1,2})\s*p(?:ax|ersons?|eople|ers)?\s*[/xX,&+-]?\s*(\d{1,2})\s*n(?:ights?)?\b")
                .unwrap(),
            "pax-nights",
            false,
        ),
    ]
});

/// Patterns that capture a night count alone
static NIGHTS_PATTERNS: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    vec![
        (Regex::new(r"(?i)\b(\d{1,2})\s*nights?\b").unwrap(), "nights"),
        (
            Regex::new(r"(?i)\bnights?\s*[:=]?\s*(\d{1,2})\b").unwrap(),
            "nights-prefix",
        ),
        (Regex::new(r"(?i)\b(\d{1,2})\s*n\b").unwrap(), "n-suffix"),
        (Regex::new(r"^(\d{1,2})$").unwrap(), "bare-number"),
    ]
});

/// Patterns that capture a group size alone
static PAX_PATTERNS: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    vec![
        (
            Regex::new(r"(?i)\b(\d{1,2})\s*(?:pax|persons?|people|guests?|adults?)\b").unwrap(),
            "pax",
        ),
        (
            Regex::new(r"(?i)\b(?:pax|persons?|people|guests?)\s*[:=]?\s*(\d{1,2})\b").unwrap(),
            "pax-prefix",
        ),
        (Regex::new(r"(?i)\b(\d{1,2})\s*p\b").unwrap(), "p-suffix"),
    ]
});

/// A duration and/or group-size match for a single cell
#[derive(Debug, Clone, PartialEq)]
pub struct NightsPaxMatch {
    /// Number of nights, when the cell carries one
    pub nights: Option<u32>,
    /// Number of people, when the cell carries one
    pub pax: Option<u32>,
    /// Name of the pattern family that matched
    pub pattern: String,
    /// Heuristic trust score in `[0, 1]`
    pub confidence: f64,
}

/// Detect a night count and/or group size in a raw cell.
///
/// A combined pattern ("2N/4P") scores 0.9. Otherwise each dimension found on its own
/// contributes 0.4, so a cell naming both still ranks above a lone bare integer. A bare
/// integer counts as nights only when it is plausible as one (1 to 31).
pub fn detect_nights_pax(cell: &str) -> Option<NightsPaxMatch> {
    let trimmed = cell.trim();
    if trimmed.is_empty() {
        return None;
    }

    for (regex, pattern, nights_first) in COMBINED_PATTERNS.iter() {
        if let Some(captures) = regex.captures(trimmed) {
            let first: u32 = captures[1].parse().ok()?;
            let second: u32 = captures[2].parse().ok()?;
            let (nights, pax) = if *nights_first {
                (first, second)
            } else {
                (second, first)
            };
            if !plausible_nights(nights) || !plausible_pax(pax) {
                return None;
            }
            return Some(NightsPaxMatch {
                nights: Some(nights),
                pax: Some(pax),
                pattern: (*pattern).to_string(),
                confidence: COMBINED_CONFIDENCE,
            });
        }
    }

    let nights = first_capture(&NIGHTS_PATTERNS, trimmed).filter(|&(value, _)| plausible_nights(value));
    let pax = first_capture(&PAX_PATTERNS, trimmed).filter(|&(value, _)| plausible_pax(value));

    let pattern = match (&nights, &pax) {
        (Some((_, nights_pattern)), Some((_, pax_pattern))) => {
            format!("{nights_pattern}+{pax_pattern}")
        }
        (Some((_, pattern)), None) | (None, Some((_, pattern))) => (*pattern).to_string(),
        (None, None) => return None,
    };
    let matches = u32::from(nights.is_some()) + u32::from(pax.is_some());

    Some(NightsPaxMatch {
        nights: nights.map(|(value, _)| value),
        pax: pax.map(|(value, _)| value),
        pattern,
        confidence: (STANDALONE_CONFIDENCE * f64::from(matches)).min(1.0),
    })
}

/// Return the first pattern's capture as an integer, with the pattern's name
fn first_capture(
    patterns: &[(Regex, &'static str)],
    cell: &str,
) -> Option<(u32, &'static str)> {
    patterns.iter().find_map(|(regex, pattern)| {
        let captures = regex.captures(cell)?;
        let value = captures[1].parse().ok()?;
        Some((value, *pattern))
    })
}

fn plausible_nights(value: u32) -> bool {
    (1..=MAX_BARE_NIGHTS).contains(&value)
}

fn plausible_pax(value: u32) -> bool {
    (1..=MAX_PAX).contains(&value)
}
