//! Content classification for raw spreadsheet cells.
//!
//! Rate sheets arrive with no schema: a cell might be a month header, an accommodation
//! type, a duration marker, a price or free text. [`classify`] runs the specialised
//! detectors in priority order and returns the first confident interpretation, so that
//! downstream normalisation can reason about rows and columns instead of strings.
//!
//! Classification is pure and per-cell. Detectors look at one string at a time;
//! [`analyze_sequence`] and [`detect_month_sequence`] layer row/column heuristics on
//! top without the detectors themselves holding state.
use crate::month::Month;
use indexmap::IndexMap;
use itertools::Itertools;
use std::fmt;

pub mod accommodation;
pub mod month;
pub mod nights_pax;
pub mod price;

pub use accommodation::{AccommodationCategory, AccommodationMatch, detect_accommodation};
pub use month::{MonthMatch, detect_month};
pub use nights_pax::{NightsPaxMatch, detect_nights_pax};
pub use price::{PriceMatch, detect_price};

/// A month match must exceed this to win the cell
const MONTH_THRESHOLD: f64 = 0.7;
/// An accommodation match must exceed this to win the cell
const ACCOMMODATION_THRESHOLD: f64 = 0.6;
/// A nights/pax match must exceed this to win the cell
const NIGHTS_PAX_THRESHOLD: f64 = 0.3;
/// Confidence of a price cell (numbers are unambiguous but context-free)
const PRICE_CONFIDENCE: f64 = 0.8;
/// Confidence of the text fallback
const TEXT_CONFIDENCE: f64 = 0.5;
/// Confidence of an empty cell
const EMPTY_CONFIDENCE: f64 = 1.0;
/// Fewest detected months that can form a sequence
const MIN_SEQUENCE_MONTHS: usize = 3;

/// What a single cell means, with the winning detector's payload
#[derive(Debug, Clone, PartialEq)]
pub enum CellContent {
    /// A month or special-period header
    Month(MonthMatch),
    /// An accommodation-type label
    Accommodation(AccommodationMatch),
    /// A duration and/or group-size marker
    NightsPax(NightsPaxMatch),
    /// A numeric price
    Price(PriceMatch),
    /// Non-empty text no detector claimed
    Text,
    /// Blank or whitespace-only
    Empty,
}

impl CellContent {
    /// The payload-free discriminant, used for tallying
    pub fn kind(&self) -> CellKind {
        match self {
            Self::Month(_) => CellKind::Month,
            Self::Accommodation(_) => CellKind::Accommodation,
            Self::NightsPax(_) => CellKind::NightsPax,
            Self::Price(_) => CellKind::Price,
            Self::Text => CellKind::Text,
            Self::Empty => CellKind::Empty,
        }
    }
}

/// The kind of content a cell holds, without the match payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellKind {
    /// Month or special-period header
    Month,
    /// Accommodation-type label
    Accommodation,
    /// Duration and/or group-size marker
    NightsPax,
    /// Numeric price
    Price,
    /// Unclaimed text
    Text,
    /// Blank cell
    Empty,
}

impl fmt::Display for CellKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Self::Month => "month",
            Self::Accommodation => "accommodation",
            Self::NightsPax => "nights/pax",
            Self::Price => "price",
            Self::Text => "text",
            Self::Empty => "empty",
        };
        write!(f, "{name}")
    }
}

/// A classification of one raw cell
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    /// Winning interpretation of the cell
    pub content: CellContent,
    /// Confidence in that interpretation, in `[0, 1]`
    pub confidence: f64,
}

/// Classify a single raw cell.
///
/// Detectors run in priority order (month, accommodation, nights/pax, price) and the
/// first whose confidence clears its threshold wins. Anything else is text, or empty
/// when the cell is blank.
pub fn classify(cell: &str) -> Classification {
    if cell.trim().is_empty() {
        return Classification {
            content: CellContent::Empty,
            confidence: EMPTY_CONFIDENCE,
        };
    }

    if let Some(matched) = detect_month(cell)
        && matched.confidence > MONTH_THRESHOLD
    {
        return Classification {
            confidence: matched.confidence,
            content: CellContent::Month(matched),
        };
    }

    if let Some(matched) = detect_accommodation(cell)
        && matched.confidence > ACCOMMODATION_THRESHOLD
    {
        return Classification {
            confidence: matched.confidence,
            content: CellContent::Accommodation(matched),
        };
    }

    if let Some(matched) = detect_nights_pax(cell)
        && matched.confidence > NIGHTS_PAX_THRESHOLD
    {
        return Classification {
            confidence: matched.confidence,
            content: CellContent::NightsPax(matched),
        };
    }

    if let Some(matched) = detect_price(cell) {
        return Classification {
            content: CellContent::Price(matched),
            confidence: PRICE_CONFIDENCE,
        };
    }

    Classification {
        content: CellContent::Text,
        confidence: TEXT_CONFIDENCE,
    }
}

/// Aggregate view of a run of cells (a row or a column slice)
#[derive(Debug, Clone, PartialEq)]
pub struct SequenceAnalysis {
    /// Per-cell classifications, in input order
    pub classifications: Vec<Classification>,
    /// Plurality kind among non-empty cells, if any cell is non-empty
    pub primary_kind: Option<CellKind>,
    /// Share of non-empty cells holding the primary kind
    pub confidence: f64,
    /// Tally of non-empty kinds, in first-seen order
    pub counts: IndexMap<CellKind, u32>,
}

/// Classify every cell in a run and report the dominant kind.
///
/// Empty cells are excluded from the tally so a sparse month row still reads as a month
/// row. Ties go to the kind seen first.
pub fn analyze_sequence<'a, I>(cells: I) -> SequenceAnalysis
where
    I: IntoIterator<Item = &'a str>,
{
    let classifications: Vec<_> = cells.into_iter().map(classify).collect();

    let mut counts: IndexMap<CellKind, u32> = IndexMap::new();
    for classification in &classifications {
        let kind = classification.content.kind();
        if kind != CellKind::Empty {
            *counts.entry(kind).or_insert(0) += 1;
        }
    }

    let total: u32 = counts.values().sum();
    let mut primary: Option<(CellKind, u32)> = None;
    for (&kind, &count) in &counts {
        if primary.is_none_or(|(_, best)| count > best) {
            primary = Some((kind, count));
        }
    }

    let confidence = primary.map_or(0.0, |(_, count)| f64::from(count) / f64::from(total));

    SequenceAnalysis {
        classifications,
        primary_kind: primary.map(|(kind, _)| kind),
        confidence,
        counts,
    }
}

/// Result of checking a run of cells for an ordered month sequence
#[derive(Debug, Clone, PartialEq)]
pub struct MonthSequence {
    /// Whether the run reads as consecutive calendar months
    pub is_sequence: bool,
    /// Calendar months detected, in cell order (special periods are skipped)
    pub months: Vec<Month>,
    /// Index deltas between consecutive detections; +1 is consecutive, -11 wraps
    /// December into January
    pub gaps: Vec<i64>,
}

/// Check whether a run of cells forms a calendar-ordered month sequence.
///
/// At least three months must be present and every step must be +1 or the
/// December-to-January wrap. Header rows that pass this check are trusted as the time
/// axis of a pricing matrix.
pub fn detect_month_sequence<'a, I>(cells: I) -> MonthSequence
where
    I: IntoIterator<Item = &'a str>,
{
    let months = cells
        .into_iter()
        .filter(|cell| crate::month::detect_special_period(cell).is_none())
        .filter_map(|cell| Month::find_in(cell).map(|(month, _)| month))
        .collect_vec();

    let gaps = months
        .iter()
        .tuple_windows()
        .map(|(a, b)| i64::from(b.index()) - i64::from(a.index()))
        .collect_vec();

    MonthSequence {
        is_sequence: months.len() >= MIN_SEQUENCE_MONTHS
            && gaps.iter().all(|&gap| gap == 1 || gap == -11),
        months,
        gaps,
    }
}
