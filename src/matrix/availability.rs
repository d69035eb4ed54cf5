//! The zero-price availability policy.
//!
//! A zero in a price cell is ambiguous: operators use it for "free", "no data" and
//! "closed" alike. The policy here resolves it from the original cell text, preferring
//! to mark a combination unavailable over inventing a free offer.
use super::PriceCell;
use unicase::UniCase;

/// Markers that must equal the whole cell text ("full" alone, not "full board")
const UNAVAILABLE_TOKENS: &[&str] = &["n/a", "na", "tbc", "tba", "-", "closed", "full"];

/// Markers matched anywhere in the cell text
const UNAVAILABLE_PHRASES: &[&str] = &["sold out", "no availability", "not available"];

/// Original texts that make a zero an intentional free offer
const FREE_OFFER_TOKENS: &[&str] = &["0", "0.00"];

/// How a cell's value and availability were resolved
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AvailabilityDecision {
    /// Whether the combination can be booked
    pub is_available: bool,
    /// Price to record; 0 when unavailable
    pub price: f64,
    /// Whether a zero was resolved by the conservative default
    pub ambiguous: bool,
}

impl AvailabilityDecision {
    fn unavailable() -> Self {
        Self {
            is_available: false,
            price: 0.0,
            ambiguous: false,
        }
    }
}

/// Decide availability and effective price for one cell.
///
/// In order: an explicit unavailable flag always wins; a zero with recognised
/// "not available" text, or with blank text, is unavailable; a zero whose text is
/// literally "0"/"0.00" is a free offer; any other zero is conservatively unavailable
/// and flagged as ambiguous. Positive values are available as-is and negative values
/// are never trusted.
pub fn resolve_availability(cell: &PriceCell) -> AvailabilityDecision {
    if !cell.is_available {
        return AvailabilityDecision::unavailable();
    }

    if cell.value > 0.0 {
        return AvailabilityDecision {
            is_available: true,
            price: cell.value,
            ambiguous: false,
        };
    }

    if cell.value < 0.0 {
        return AvailabilityDecision {
            ambiguous: true,
            ..AvailabilityDecision::unavailable()
        };
    }

    let original = cell.original_value.trim();
    if original.is_empty() || is_unavailable_text(original) {
        return AvailabilityDecision::unavailable();
    }

    if FREE_OFFER_TOKENS.contains(&original) {
        return AvailabilityDecision {
            is_available: true,
            price: 0.0,
            ambiguous: false,
        };
    }

    AvailabilityDecision {
        ambiguous: true,
        ..AvailabilityDecision::unavailable()
    }
}

/// Whether the original text is a recognised "not available" marker
fn is_unavailable_text(original: &str) -> bool {
    let lower = original.to_lowercase();
    UNAVAILABLE_TOKENS
        .iter()
        .any(|&token| UniCase::new(original) == UniCase::new(token))
        || UNAVAILABLE_PHRASES.iter().any(|phrase| lower.contains(phrase))
}
