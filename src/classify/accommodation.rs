//! Accommodation-type detection for raw cells.
use crate::month::words;
use serde_string_enum::{DeserializeLabeledStringEnum, SerializeLabeledStringEnum};
use unicase::UniCase;

/// Base confidence for a keyword found inside a longer cell
const BASE_CONFIDENCE: f64 = 0.7;
/// Confidence when the whole cell is the keyword or its display name
const EXACT_CONFIDENCE: f64 = 0.95;
/// Penalty for cells longer than [`LONG_CELL_LEN`] characters
const LONG_CELL_PENALTY: f64 = 0.15;
/// Cells longer than this many characters are considered descriptive prose
const LONG_CELL_LEN: usize = 20;
/// Penalty for cells with more than [`MAX_PLAIN_WORDS`] words
const WORDY_CELL_PENALTY: f64 = 0.1;
/// Accommodation labels rarely run past this many words
const MAX_PLAIN_WORDS: usize = 3;
/// Floor for penalised confidences
const MIN_CONFIDENCE: f64 = 0.1;

/// Broad category of an accommodation label
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, SerializeLabeledStringEnum, DeserializeLabeledStringEnum,
)]
pub enum AccommodationCategory {
    /// Serviced rooms, including B&Bs and guesthouses
    #[string = "hotel"]
    Hotel,
    /// Unserviced units with cooking facilities
    #[string = "self-catering"]
    SelfCatering,
    /// Apartments, studios and aparthotels
    #[string = "apartment"]
    Apartment,
    /// Standalone villas and bungalows
    #[string = "villa"]
    Villa,
    /// Hostels and dorm beds
    #[string = "hostel"]
    Hostel,
    /// Resort complexes
    #[string = "resort"]
    Resort,
    /// Lodging outside the named categories
    #[string = "other"]
    Other,
}

/// Keyword table mapping accommodation vocabulary to a display name and category.
///
/// Rows are matched in order, so multi-word and compound patterns come before the broad
/// single words they contain ("aparthotel" before "hotel", "twin room" before "room").
const ACCOMMODATION_PATTERNS: &[(&str, &str, AccommodationCategory)] = &[
    ("self-catering", "Self-Catering", AccommodationCategory::SelfCatering),
    ("self catering", "Self-Catering", AccommodationCategory::SelfCatering),
    ("bed & breakfast", "Bed & Breakfast", AccommodationCategory::Hotel),
    ("bed and breakfast", "Bed & Breakfast", AccommodationCategory::Hotel),
    ("b&b", "Bed & Breakfast", AccommodationCategory::Hotel),
    ("guest house", "Guesthouse", AccommodationCategory::Hotel),
    ("guesthouse", "Guesthouse", AccommodationCategory::Hotel),
    ("aparthotel", "Aparthotel", AccommodationCategory::Apartment),
    ("apartment", "Apartment", AccommodationCategory::Apartment),
    ("apt", "Apartment", AccommodationCategory::Apartment),
    ("hotel", "Hotel", AccommodationCategory::Hotel),
    ("resort", "Resort", AccommodationCategory::Resort),
    ("villa", "Villa", AccommodationCategory::Villa),
    ("bungalow", "Bungalow", AccommodationCategory::Villa),
    ("hostel", "Hostel", AccommodationCategory::Hostel),
    ("dorm", "Dorm Bed", AccommodationCategory::Hostel),
    ("cottage", "Cottage", AccommodationCategory::SelfCatering),
    ("chalet", "Chalet", AccommodationCategory::SelfCatering),
    ("lodge", "Lodge", AccommodationCategory::SelfCatering),
    ("studio", "Studio", AccommodationCategory::Apartment),
    ("penthouse", "Penthouse", AccommodationCategory::Apartment),
    ("twin room", "Twin Room", AccommodationCategory::Hotel),
    ("double room", "Double Room", AccommodationCategory::Hotel),
    ("single room", "Single Room", AccommodationCategory::Hotel),
    ("family room", "Family Room", AccommodationCategory::Hotel),
    ("suite", "Suite", AccommodationCategory::Hotel),
    ("room", "Room", AccommodationCategory::Hotel),
];

/// An accommodation-type match for a single cell
#[derive(Debug, Clone, PartialEq)]
pub struct AccommodationMatch {
    /// Canonical display name for the matched type ("Self-Catering")
    pub display_name: String,
    /// Broad category the type belongs to
    pub category: AccommodationCategory,
    /// Heuristic trust score in `[0, 1]`
    pub confidence: f64,
}

/// Detect an accommodation type in a raw cell.
///
/// An exact match against a keyword or display name scores 0.95; a keyword found inside
/// a longer cell scores 0.7, penalised further when the cell reads like prose.
pub fn detect_accommodation(cell: &str) -> Option<AccommodationMatch> {
    let trimmed = cell.trim();
    if trimmed.is_empty() {
        return None;
    }
    let lower = trimmed.to_lowercase();

    let &(keyword, display_name, category) = ACCOMMODATION_PATTERNS
        .iter()
        .find(|(keyword, _, _)| keyword_in(&lower, keyword))?;

    let exact = UniCase::new(trimmed) == UniCase::new(keyword)
        || UniCase::new(trimmed) == UniCase::new(display_name);
    let mut confidence = if exact {
        EXACT_CONFIDENCE
    } else {
        BASE_CONFIDENCE
    };
    if trimmed.chars().count() > LONG_CELL_LEN {
        confidence -= LONG_CELL_PENALTY;
    }
    if trimmed.split_whitespace().count() > MAX_PLAIN_WORDS {
        confidence -= WORDY_CELL_PENALTY;
    }

    Some(AccommodationMatch {
        display_name: display_name.to_string(),
        category,
        confidence: confidence.max(MIN_CONFIDENCE),
    })
}

/// Check whether a keyword occurs in a lowercased cell.
///
/// Plain-alphabetic keywords must appear as a whole word so that "apt" never fires
/// inside "captain"; compound keywords ("b&b", "twin room") match as substrings.
fn keyword_in(lower_cell: &str, keyword: &str) -> bool {
    if keyword.chars().all(char::is_alphabetic) {
        words(lower_cell).any(|word| word == keyword)
    } else {
        lower_cell.contains(keyword)
    }
}
