//! Cleaning and scoring of package inclusion lines.
//!
//! Inclusion lists arrive as free text pasted from brochures: bullet markers, stray
//! numbering, emphasis markup, placeholder rows. [`process_inclusions`] cleans each
//! line, validates it, assigns a category and a confidence score, optionally merges
//! near-duplicates, and reports an overall quality score with concrete suggestions for
//! the operator.
use documented::DocumentedFields;
use indexmap::IndexMap;
use itertools::Itertools;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_string_enum::{DeserializeLabeledStringEnum, SerializeLabeledStringEnum};
use std::collections::HashSet;
use std::sync::LazyLock;

/// Base confidence before adjustments
const BASE_CONFIDENCE: f64 = 0.8;
/// Bonus for a length in the sweet spot
const LENGTH_BONUS: f64 = 0.1;
/// Penalty for very short text
const SHORT_PENALTY: f64 = 0.2;
/// Penalty for very long text
const LONG_PENALTY: f64 = 0.1;
/// Bonus for a word count typical of inclusion lines
const WORD_COUNT_BONUS: f64 = 0.1;
/// Bonus for inclusion-signal vocabulary
const SIGNAL_BONUS: f64 = 0.15;
/// Penalty for vague qualifiers
const VAGUE_PENALTY: f64 = 0.2;
/// Character range that reads like a clean inclusion line
const LENGTH_SWEET_SPOT: std::ops::RangeInclusive<usize> = 10..=50;
/// Texts shorter than this are penalised
const SHORT_TEXT_LEN: usize = 5;
/// Texts longer than this are penalised
const LONG_TEXT_LEN: usize = 100;
/// Word-count range typical of inclusion lines
const WORD_COUNT_SWEET_SPOT: std::ops::RangeInclusive<usize> = 2..=8;
/// Cleaned texts shorter than this are rejected
const MIN_VALID_LEN: usize = 3;
/// Cleaned texts longer than this are descriptions, not inclusions
const MAX_VALID_LEN: usize = 200;
/// A line must contain at least one word with this many letters
const MIN_WORD_LETTERS: usize = 3;
/// Words below this length are ignored when comparing two lines
const SIMILARITY_WORD_LEN: usize = 2;
/// Confidence bump applied to a merged record
const MERGE_BONUS: f64 = 0.1;

/// Vocabulary that signals a genuine inclusion
const SIGNAL_WORDS: &[&str] = &[
    "included",
    "free",
    "complimentary",
    "daily",
    "weekly",
    "unlimited",
    "access",
    "service",
    "services",
    "facility",
    "facilities",
    "amenity",
    "amenities",
];

/// Qualifiers that make a line non-committal
const VAGUE_WORDS: &[&str] = &["various", "some", "certain", "available", "possible"];

/// Keyword table mapping inclusion vocabulary to a category
const CATEGORY_PATTERNS: &[(&str, &[&str])] = &[
    (
        "Dining",
        &[
            "breakfast",
            "dinner",
            "lunch",
            "meal",
            "meals",
            "board",
            "buffet",
            "restaurant",
            "catering",
        ],
    ),
    ("Internet", &["wifi", "wi-fi", "internet", "broadband"]),
    (
        "Facilities",
        &["pool", "gym", "sauna", "spa", "tennis", "playground"],
    ),
    (
        "Transport",
        &["transfer", "transfers", "shuttle", "pickup", "airport"],
    ),
    ("Parking", &["parking", "garage"]),
    (
        "Housekeeping",
        &["cleaning", "housekeeping", "maid"],
    ),
    (
        "Services",
        &["reception", "concierge", "guide", "staff", "service", "services"],
    ),
    (
        "Climate",
        &["heating", "aircon", "airconditioning", "conditioning"],
    ),
    (
        "Amenities",
        &["toiletries", "hairdryer", "minibar", "tv", "television", "safe"],
    ),
    ("Linens", &["linen", "linens", "bedding", "sheets", "towels"]),
];

/// Category for lines no keyword claims
const OTHER_CATEGORY: &str = "Other";

// A bare asterisk only counts as a bullet when whitespace follows, so emphasis
// markers like "**text**" survive until after emphasis detection.
static BULLET_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(?:[-–—•▪◦·]+|\*\s|\(?\d{1,2}[.)])\s*").unwrap());
static PLACEHOLDER_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        Regex::new(r"(?i)^item\s*\d+$").unwrap(),
        Regex::new(r"(?i)^(?:tbd|tba|tbc|pending|coming soon)$").unwrap(),
        Regex::new(r"(?i)^(?:n/?a|none|nil)$").unwrap(),
    ]
});

/// Text emphasis recovered from markup or casing
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, SerializeLabeledStringEnum, DeserializeLabeledStringEnum,
)]
pub enum Emphasis {
    /// Double markers or all-caps text
    #[string = "bold"]
    Bold,
    /// Single markers or underscore-delimited text
    #[string = "italic"]
    Italic,
    /// Carried for externally supplied data; the heuristic never infers it
    #[string = "underline"]
    Underline,
}

/// One raw inclusion line after cleaning, validation and scoring
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessedInclusion {
    /// Raw line as supplied; merged records join their originals with " / "
    pub original_text: String,
    /// Cleaned display text
    pub cleaned_text: String,
    /// Whether the line survived validation
    pub is_valid: bool,
    /// Emphasis inferred from markup or casing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emphasis: Option<Emphasis>,
    /// Keyword category; absent for invalid lines
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Heuristic trust score in `[0, 1]`
    pub confidence: f64,
    /// Validation problems, empty for valid lines
    pub issues: Vec<String>,
}

/// Options controlling inclusion processing
#[derive(Debug, Clone, DocumentedFields, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InclusionsOptions {
    /// Merge near-duplicate valid lines into one record
    pub merge_similar: bool,
    /// Word-overlap ratio above which two lines count as duplicates
    pub similarity_threshold: f64,
}

impl Default for InclusionsOptions {
    fn default() -> Self {
        Self {
            merge_similar: false,
            similarity_threshold: 0.7,
        }
    }
}

/// Result of processing one batch of inclusion lines
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InclusionsOutcome {
    /// Per-line records, in input order, with merged groups collapsed
    pub items: Vec<ProcessedInclusion>,
    /// Valid-item count per category, in first-seen order
    pub categories: IndexMap<String, usize>,
    /// Combined quality score in `[0, 1]`
    pub overall_quality: f64,
    /// Concrete follow-ups for the operator
    pub suggestions: Vec<String>,
}

impl InclusionsOutcome {
    /// Items that survived validation
    pub fn valid_items(&self) -> impl Iterator<Item = &ProcessedInclusion> {
        self.items.iter().filter(|item| item.is_valid)
    }

    /// Items rejected by validation, kept for operator review
    pub fn invalid_items(&self) -> impl Iterator<Item = &ProcessedInclusion> {
        self.items.iter().filter(|item| !item.is_valid)
    }
}

/// Clean, validate, categorise and score a batch of raw inclusion lines.
///
/// Invalid lines are kept in the result for review but excluded from categories and
/// from the confidence part of the quality score.
pub fn process_inclusions<S: AsRef<str>>(
    raw_lines: &[S],
    options: &InclusionsOptions,
) -> InclusionsOutcome {
    let mut items: Vec<_> = raw_lines
        .iter()
        .map(|line| process_line(line.as_ref()))
        .collect();

    if options.merge_similar {
        items = merge_similar(items, options.similarity_threshold);
    }

    let mut categories: IndexMap<String, usize> = IndexMap::new();
    for item in items.iter().filter(|item| item.is_valid) {
        if let Some(category) = &item.category {
            *categories.entry(category.clone()).or_insert(0) += 1;
        }
    }

    let overall_quality = quality_score(&items, categories.len());
    let suggestions = build_suggestions(&items, &categories, options);

    InclusionsOutcome {
        items,
        categories,
        overall_quality,
        suggestions,
    }
}

/// Run the per-line pipeline: clean, detect emphasis, validate, categorise, score
fn process_line(raw: &str) -> ProcessedInclusion {
    let unbulleted = BULLET_RE.replace(raw.trim(), "");
    let emphasis = detect_emphasis(&unbulleted);
    let cleaned = clean_text(&unbulleted);
    let issues = validate(&cleaned);
    let is_valid = issues.is_empty();

    ProcessedInclusion {
        original_text: raw.to_string(),
        cleaned_text: cleaned.clone(),
        is_valid,
        emphasis,
        category: is_valid.then(|| categorise(&cleaned).to_string()),
        confidence: confidence(&cleaned),
        issues,
    }
}

/// Strip emphasis markers, collapse whitespace, drop a single trailing period and
/// capitalise the first letter
fn clean_text(text: &str) -> String {
    let stripped = text
        .trim()
        .trim_start_matches(['*', '_'])
        .trim_end_matches(['*', '_']);
    let collapsed = stripped.split_whitespace().join(" ");
    let without_period = collapsed.strip_suffix('.').unwrap_or(&collapsed);

    let mut chars = without_period.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Infer emphasis from markup or casing.
///
/// This reads the text itself, not formatting metadata, so it is an approximation:
/// all-caps and double markers read as bold, single markers and underscores as italic.
fn detect_emphasis(text: &str) -> Option<Emphasis> {
    let trimmed = text.trim();
    if wrapped_in(trimmed, "**") || wrapped_in(trimmed, "__") {
        return Some(Emphasis::Bold);
    }
    if wrapped_in(trimmed, "*") || wrapped_in(trimmed, "_") {
        return Some(Emphasis::Italic);
    }

    let letters: Vec<char> = trimmed.chars().filter(|c| c.is_alphabetic()).collect();
    if !letters.is_empty() && letters.iter().all(|c| c.is_uppercase()) {
        return Some(Emphasis::Bold);
    }

    None
}

fn wrapped_in(text: &str, marker: &str) -> bool {
    text.len() > 2 * marker.len() && text.starts_with(marker) && text.ends_with(marker)
}

/// Collect validation problems; an empty list means the line is usable
fn validate(cleaned: &str) -> Vec<String> {
    let mut issues = Vec::new();

    if cleaned.chars().count() < MIN_VALID_LEN {
        issues.push("too short".to_string());
        return issues;
    }
    if cleaned.chars().count() > MAX_VALID_LEN {
        issues.push("too long to be an inclusion".to_string());
    }
    if PLACEHOLDER_RES.iter().any(|re| re.is_match(cleaned)) {
        issues.push("placeholder text".to_string());
    }
    if !cleaned.chars().any(char::is_alphanumeric) {
        issues.push("punctuation only".to_string());
    } else if !cleaned.chars().any(char::is_alphabetic) {
        issues.push("purely numeric".to_string());
    } else if !words_of(cleaned)
        .any(|word| word.chars().filter(|c| c.is_alphabetic()).count() >= MIN_WORD_LETTERS)
    {
        issues.push("no real words".to_string());
    }

    issues
}

/// First matching category for the cleaned text, or "Other"
fn categorise(cleaned: &str) -> &'static str {
    let lower = cleaned.to_lowercase();
    let cleaned_words: HashSet<&str> = words_of(&lower).collect();

    CATEGORY_PATTERNS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|keyword| cleaned_words.contains(keyword)))
        .map_or(OTHER_CATEGORY, |(category, _)| category)
}

/// Score how much the cleaned text reads like a real inclusion line
fn confidence(cleaned: &str) -> f64 {
    let mut confidence = BASE_CONFIDENCE;

    let length = cleaned.chars().count();
    if LENGTH_SWEET_SPOT.contains(&length) {
        confidence += LENGTH_BONUS;
    } else if length < SHORT_TEXT_LEN {
        confidence -= SHORT_PENALTY;
    } else if length > LONG_TEXT_LEN {
        confidence -= LONG_PENALTY;
    }

    if WORD_COUNT_SWEET_SPOT.contains(&cleaned.split_whitespace().count()) {
        confidence += WORD_COUNT_BONUS;
    }

    let lower = cleaned.to_lowercase();
    let lower_words: HashSet<&str> = words_of(&lower).collect();
    if SIGNAL_WORDS.iter().any(|word| lower_words.contains(word)) {
        confidence += SIGNAL_BONUS;
    }
    if VAGUE_WORDS.iter().any(|word| lower_words.contains(word)) {
        confidence -= VAGUE_PENALTY;
    }

    confidence.clamp(0.0, 1.0)
}

/// Overall quality of a processed batch.
///
/// Validity rate dominates, average confidence of the valid items refines it, and
/// category diversity adds up to 0.2 as an independent signal.
fn quality_score(items: &[ProcessedInclusion], distinct_categories: usize) -> f64 {
    if items.is_empty() {
        return 0.0;
    }

    let valid: Vec<_> = items.iter().filter(|item| item.is_valid).collect();
    let valid_ratio = to_f64(valid.len()) / to_f64(items.len());
    let avg_confidence = if valid.is_empty() {
        0.0
    } else {
        valid.iter().map(|item| item.confidence).sum::<f64>() / to_f64(valid.len())
    };
    let diversity = (0.05 * to_f64(distinct_categories)).min(0.2);

    (0.6 * valid_ratio + 0.3 * avg_confidence + diversity).clamp(0.0, 1.0)
}

/// Merge groups of near-duplicate valid items into single records.
///
/// Each group keeps the position of its first member. The highest-confidence member
/// serves as the template, the merged text is the re-cleaned union of the members'
/// words, and the originals stay traceable, joined with " / ".
fn merge_similar(items: Vec<ProcessedInclusion>, threshold: f64) -> Vec<ProcessedInclusion> {
    let mut merged: Vec<ProcessedInclusion> = Vec::with_capacity(items.len());
    let mut consumed = vec![false; items.len()];

    for index in 0..items.len() {
        if consumed[index] {
            continue;
        }
        if !items[index].is_valid {
            merged.push(items[index].clone());
            continue;
        }

        let mut group = vec![index];
        for other in index + 1..items.len() {
            if !consumed[other]
                && items[other].is_valid
                && similarity(&items[index].cleaned_text, &items[other].cleaned_text) > threshold
            {
                consumed[other] = true;
                group.push(other);
            }
        }

        if group.len() == 1 {
            merged.push(items[index].clone());
        } else {
            merged.push(merge_group(&items, &group));
        }
    }

    merged
}

/// Combine a group of similar items into one record
fn merge_group(items: &[ProcessedInclusion], group: &[usize]) -> ProcessedInclusion {
    let template = group
        .iter()
        .map(|&index| &items[index])
        .max_by(|a, b| a.confidence.total_cmp(&b.confidence))
        .expect("merge groups are never empty");

    let mut seen = HashSet::new();
    let union_text = group
        .iter()
        .flat_map(|&index| items[index].cleaned_text.split_whitespace())
        .filter(|word| seen.insert(word.to_lowercase()))
        .join(" ");

    ProcessedInclusion {
        original_text: group
            .iter()
            .map(|&index| items[index].original_text.as_str())
            .join(" / "),
        cleaned_text: clean_text(&union_text),
        is_valid: true,
        emphasis: template.emphasis,
        category: template.category.clone(),
        confidence: (template.confidence + MERGE_BONUS).min(1.0),
        issues: Vec::new(),
    }
}

/// Word-overlap ratio between two cleaned texts, ignoring short words
fn similarity(a: &str, b: &str) -> f64 {
    let lower_a = a.to_lowercase();
    let lower_b = b.to_lowercase();
    let words_a: HashSet<&str> = long_words_of(&lower_a).collect();
    let words_b: HashSet<&str> = long_words_of(&lower_b).collect();
    if words_a.is_empty() || words_b.is_empty() {
        return 0.0;
    }

    let intersection = words_a.intersection(&words_b).count();
    let union = words_a.union(&words_b).count();
    to_f64(intersection) / to_f64(union)
}

/// Concrete operator follow-ups for a processed batch
fn build_suggestions(
    items: &[ProcessedInclusion],
    categories: &IndexMap<String, usize>,
    options: &InclusionsOptions,
) -> Vec<String> {
    let mut suggestions = Vec::new();

    let invalid = items.iter().filter(|item| !item.is_valid).count();
    if invalid > 0 {
        suggestions.push(format!("remove or fix {invalid} invalid inclusion line(s)"));
    }

    let vague = items
        .iter()
        .filter(|item| item.is_valid && item.confidence < 0.5)
        .count();
    if vague > 0 {
        suggestions.push(format!(
            "reword {vague} low-confidence inclusion(s) to name concrete amenities"
        ));
    }

    if !options.merge_similar {
        let valid: Vec<_> = items.iter().filter(|item| item.is_valid).collect();
        let duplicate_pairs = valid
            .iter()
            .tuple_combinations()
            .filter(|(a, b)| {
                similarity(&a.cleaned_text, &b.cleaned_text) > options.similarity_threshold
            })
            .count();
        if duplicate_pairs > 0 {
            suggestions.push(format!(
                "merge {duplicate_pairs} near-duplicate pair(s) of inclusions"
            ));
        }
    }

    if categories.len() == 1 && items.iter().filter(|item| item.is_valid).count() >= 4 {
        let category = categories.keys().next().expect("one category present");
        suggestions.push(format!(
            "all inclusions fall under {category}; check the sheet for missed amenity lines"
        ));
    }

    suggestions
}

/// Iterate over the alphanumeric words of a text
fn words_of(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
}

/// Words long enough to matter for similarity comparison
fn long_words_of(text: &str) -> impl Iterator<Item = &str> {
    words_of(text).filter(|word| word.chars().count() > SIMILARITY_WORD_LEN)
}

/// Lossless usize-to-f64 for the small counts used in scoring
fn to_f64(count: usize) -> f64 {
    u32::try_from(count).map_or(f64::MAX, f64::from)
}
