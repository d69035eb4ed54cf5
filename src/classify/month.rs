//! Month and special-period detection for raw cells.
use crate::month::{Month, MonthFormat, detect_special_period};

/// Confidence assigned to a full month name
const FULL_CONFIDENCE: f64 = 0.95;
/// Confidence assigned to a 3/4-letter abbreviation
const ABBREVIATED_CONFIDENCE: f64 = 0.85;
/// Confidence assigned to a special-period marker
const SPECIAL_CONFIDENCE: f64 = 0.7;
/// Penalty for cells much longer than a month label (low trust in noisy cells)
const LONG_CELL_PENALTY: f64 = 0.15;
/// Cells longer than this many characters are considered noisy
const LONG_CELL_LEN: usize = 12;
/// Floor for penalised confidences
const MIN_CONFIDENCE: f64 = 0.1;

/// A month or special-period match for a single cell
#[derive(Debug, Clone, PartialEq)]
pub struct MonthMatch {
    /// Canonical month name ("August") or special-period display name ("Easter")
    pub name: String,
    /// How the label was written in the cell
    pub format: MonthFormat,
    /// Heuristic trust score in `[0, 1]`
    pub confidence: f64,
}

/// Detect a month name or special-period marker in a raw cell.
///
/// Special-period markers take precedence so that a label like "Easter (18-21 Apr)" is
/// reported as Easter rather than April. Full names score 0.95, abbreviations 0.85 and
/// special periods 0.7; a match inside a long cell is penalised.
pub fn detect_month(cell: &str) -> Option<MonthMatch> {
    let trimmed = cell.trim();
    if trimmed.is_empty() {
        return None;
    }

    let (name, format, confidence) = if let Some(special) = detect_special_period(trimmed) {
        (special.to_string(), MonthFormat::Special, SPECIAL_CONFIDENCE)
    } else {
        let (month, format) = Month::find_in(trimmed)?;
        let confidence = match format {
            MonthFormat::Full => FULL_CONFIDENCE,
            MonthFormat::Abbreviated => ABBREVIATED_CONFIDENCE,
            MonthFormat::Special => unreachable!(),
        };
        (month.name().to_string(), format, confidence)
    };

    let confidence = if trimmed.chars().count() > LONG_CELL_LEN {
        (confidence - LONG_CELL_PENALTY).max(MIN_CONFIDENCE)
    } else {
        confidence
    };

    Some(MonthMatch {
        name,
        format,
        confidence,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::assert_approx_eq;
    use rstest::rstest;

    #[rstest]
    #[case("January", "January", MonthFormat::Full, 0.95)]
    #[case("january", "January", MonthFormat::Full, 0.95)]
    #[case("Aug", "August", MonthFormat::Abbreviated, 0.85)]
    #[case("SEPT", "September", MonthFormat::Abbreviated, 0.85)]
    #[case("Easter", "Easter", MonthFormat::Special, 0.7)]
    #[case("Peak Season", "Peak Season", MonthFormat::Special, 0.7)]
    // 18 characters: the match is trusted less in a noisy cell
    #[case("Easter (18-21 Apr)", "Easter", MonthFormat::Special, 0.55)]
    #[case("January bookings only", "January", MonthFormat::Full, 0.8)]
    fn test_detect_month(
        #[case] cell: &str,
        #[case] name: &str,
        #[case] format: MonthFormat,
        #[case] confidence: f64,
    ) {
        let detected = detect_month(cell).unwrap();
        assert_eq!(detected.name, name);
        assert_eq!(detected.format, format);
        assert_approx_eq!(f64, detected.confidence, confidence);
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[case("Hotel")]
    #[case("1234")]
    fn test_detect_month_none(#[case] cell: &str) {
        assert_eq!(detect_month(cell), None);
    }
}
