//! Calendar months and special pricing periods.
//!
//! Rate-sheet rows are labelled with either calendar months ("January", "Aug") or named
//! special periods ("Easter (18-21 Apr)", "Peak Season"). Special periods are first-class
//! pricing periods, not months, but both kinds share the lookup tables in this module.
use chrono::{Datelike, NaiveDate};
use serde_string_enum::{DeserializeLabeledStringEnum, SerializeLabeledStringEnum};
use strum::{Display, EnumIter, IntoEnumIterator, IntoStaticStr};
use unicase::UniCase;

/// A calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumIter, IntoStaticStr)]
pub enum Month {
    /// Month 1
    January,
    /// Month 2
    February,
    /// Month 3
    March,
    /// Month 4
    April,
    /// Month 5
    May,
    /// Month 6
    June,
    /// Month 7
    July,
    /// Month 8
    August,
    /// Month 9
    September,
    /// Month 10
    October,
    /// Month 11
    November,
    /// Month 12
    December,
}

/// How a month label was written in the source cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, SerializeLabeledStringEnum, DeserializeLabeledStringEnum)]
pub enum MonthFormat {
    /// Full name ("August")
    #[string = "full"]
    Full,
    /// 3/4-letter short form ("Aug")
    #[string = "abbreviated"]
    Abbreviated,
    /// Named special period ("Easter")
    #[string = "special"]
    Special,
}

impl Month {
    /// The canonical full name, e.g. "August"
    pub fn name(self) -> &'static str {
        self.into()
    }

    /// One-based calendar index (January = 1)
    pub fn index(self) -> u32 {
        match self {
            Month::January => 1,
            Month::February => 2,
            Month::March => 3,
            Month::April => 4,
            Month::May => 5,
            Month::June => 6,
            Month::July => 7,
            Month::August => 8,
            Month::September => 9,
            Month::October => 10,
            Month::November => 11,
            Month::December => 12,
        }
    }

    /// The month with the given one-based index, if it is in `1..=12`
    pub fn from_index(index: u32) -> Option<Month> {
        Month::iter().find(|month| month.index() == index)
    }

    /// The calendar month containing `date`
    pub fn of_date(date: NaiveDate) -> Month {
        Month::from_index(date.month()).expect("chrono month is always in 1..=12")
    }

    /// Recognised short forms for this month (3/4-letter abbreviations)
    fn abbreviations(self) -> &'static [&'static str] {
        match self {
            Month::January => &["jan"],
            Month::February => &["feb"],
            Month::March => &["mar"],
            Month::April => &["apr"],
            Month::May => &[],
            Month::June => &["jun"],
            Month::July => &["jul"],
            Month::August => &["aug"],
            Month::September => &["sep", "sept"],
            Month::October => &["oct"],
            Month::November => &["nov"],
            Month::December => &["dec"],
        }
    }

    /// Parse a single word as a month name or abbreviation (case-insensitive)
    pub fn parse_token(token: &str) -> Option<(Month, MonthFormat)> {
        let token = UniCase::new(token);
        for month in Month::iter() {
            if token == UniCase::new(month.name()) {
                return Some((month, MonthFormat::Full));
            }
        }
        for month in Month::iter() {
            if month
                .abbreviations()
                .iter()
                .any(|abbrev| token == UniCase::new(abbrev))
            {
                return Some((month, MonthFormat::Abbreviated));
            }
        }

        None
    }

    /// Find the first month named in `label`, checking full names before abbreviations.
    ///
    /// The label is split into alphabetic words, so "January 2024" and "Jan-Feb" both
    /// match (the latter as January, since the first hit within a table wins).
    pub fn find_in(label: &str) -> Option<(Month, MonthFormat)> {
        let mut abbreviated = None;
        for token in words(label) {
            match Month::parse_token(token) {
                Some(hit @ (_, MonthFormat::Full)) => return Some(hit),
                Some(hit) => {
                    abbreviated.get_or_insert(hit);
                }
                None => {}
            }
        }

        abbreviated
    }
}

/// Keyword table mapping special-period markers to canonical display names.
///
/// Evaluated in order; the first row with a keyword present in the label wins, so "Winter
/// Peak" is Peak Season rather than Winter.
const SPECIAL_PERIODS: &[(&[&str], &str)] = &[
    (&["easter"], "Easter"),
    (&["peak", "high"], "Peak Season"),
    (&["off", "low"], "Off Season"),
    (&["christmas", "xmas"], "Christmas"),
    (&["new year"], "New Year"),
    (&["summer"], "Summer"),
    (&["winter"], "Winter"),
    (&["spring"], "Spring"),
    (&["autumn"], "Autumn"),
];

/// Sort group for labels that are not calendar months (specials sort after December)
const SPECIAL_SORT_GROUP: u32 = 13;

/// Detect a special pricing period marker in a row label.
///
/// Single-word keywords must appear as a whole word; phrases may appear anywhere in the
/// label.
pub fn detect_special_period(label: &str) -> Option<&'static str> {
    let lower = label.to_lowercase();
    let keyword_present = |keyword: &&str| {
        if keyword.contains(' ') {
            lower.contains(*keyword)
        } else {
            words(&lower).any(|word| word == *keyword)
        }
    };

    SPECIAL_PERIODS
        .iter()
        .find(|(keywords, _)| keywords.iter().any(keyword_present))
        .map(|(_, name)| *name)
}

/// Normalise a raw row label to its canonical form.
///
/// Calendar months (any casing or abbreviation) become the canonical full name. Special
/// period labels pass through untouched so embedded date-range annotations such as
/// "Easter (18-21 Apr)" survive. Unrecognised labels are merely trimmed.
pub fn normalise_period_label(label: &str) -> String {
    if detect_special_period(label).is_none()
        && let Some((month, _)) = Month::find_in(label)
    {
        return month.name().to_string();
    }

    label.trim().to_string()
}

/// Sort key implementing the period ordering contract: calendar months in calendar order,
/// then special periods after all months, alphabetically among themselves.
pub fn period_sort_key(label: &str) -> (u32, String) {
    if detect_special_period(label).is_none()
        && let Some((month, _)) = Month::find_in(label)
    {
        return (month.index(), String::new());
    }

    (SPECIAL_SORT_GROUP, label.to_lowercase())
}

/// Iterate over the alphabetic words of a label
pub(crate) fn words(label: &str) -> impl Iterator<Item = &str> {
    label
        .split(|c: char| !c.is_alphabetic())
        .filter(|word| !word.is_empty())
}
