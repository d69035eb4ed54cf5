//! Normalisation of sliced pricing matrices into flat records.
//!
//! The spreadsheet slicer hands over a [`PricingMatrix`]: the month labels, the three
//! inner dimensions (accommodation type, nights, pax) and a grid of raw price cells.
//! [`normalize`] validates the structure, flattens the grid into one
//! [`PricingRecord`] per combination, resolves the zero-price availability policy,
//! optionally interpolates missing combinations and converts currency, rounds, and
//! sorts. The passes must run in that order: interpolation is defined over the complete
//! extracted set, and the output ordering is a contract with downstream consumers.
use crate::month::{detect_special_period, normalise_period_label, period_sort_key};
use anyhow::{Result, ensure};
use chrono::NaiveDate;
use documented::DocumentedFields;
use indexmap::IndexSet;
use itertools::Itertools;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

pub mod availability;
pub mod interpolate;
pub mod legacy;

use availability::resolve_availability;

/// A raw price cell as sliced from the sheet, before normalisation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceCell {
    /// Numeric value the slicer parsed from the cell
    pub value: f64,
    /// Original cell text, used to disambiguate zero values
    pub original_value: String,
    /// Explicit availability flag; `false` always wins
    pub is_available: bool,
    /// Per-cell currency override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    /// First day the price applies, when the cell states one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid_from: Option<NaiveDate>,
    /// Last day the price applies, inclusive
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid_to: Option<NaiveDate>,
    /// Free-text annotation carried through to the record
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Spreadsheet reference ("B7") for traceability
    #[serde(default)]
    pub cell_reference: String,
}

impl PriceCell {
    /// An available cell with a plain numeric value, as a slicer emits for clean input
    pub fn new(value: f64) -> Self {
        Self {
            value,
            original_value: value.to_string(),
            is_available: true,
            currency: None,
            valid_from: None,
            valid_to: None,
            notes: None,
            cell_reference: String::new(),
        }
    }
}

/// A sliced pricing matrix: month rows over an (accommodation, nights, pax) grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingMatrix {
    /// Month or special-period labels, one per grid row
    pub months: Vec<String>,
    /// Accommodation-type labels
    pub accommodation_types: Vec<String>,
    /// Stay lengths priced in the sheet
    pub nights_options: Vec<u32>,
    /// Group sizes priced in the sheet
    pub pax_options: Vec<u32>,
    /// One row per month; cells run over the (accommodation, nights, pax) cartesian
    /// product with accommodation outermost. Rows may be ragged; missing cells are
    /// skipped.
    pub grid: Vec<Vec<Option<PriceCell>>>,
    /// Default currency for cells without an override
    pub currency: String,
    /// Start of the sheet-wide validity window
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid_from: Option<NaiveDate>,
    /// End of the sheet-wide validity window, inclusive
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid_to: Option<NaiveDate>,
}

/// One flattened, normalised pricing combination.
///
/// Records are created by [`normalize`] and immutable thereafter; re-importing a sheet
/// produces a fresh set rather than mutating an old one. The uniqueness key within one
/// package version is (month, accommodation type, nights, pax).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingRecord {
    /// Canonical month name, or the special-period label as printed
    pub month: String,
    /// Accommodation-type label
    pub accommodation_type: String,
    /// Stay length in nights
    pub nights: u32,
    /// Group size the price applies to
    pub pax: u32,
    /// Price in `currency`; 0 for unavailable combinations
    pub price: f64,
    /// ISO 4217 currency code
    pub currency: String,
    /// Whether the combination can be booked
    pub is_available: bool,
    /// Canonical special-period name when the month label is one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub special_period: Option<String>,
    /// First day the price applies
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid_from: Option<NaiveDate>,
    /// Last day the price applies, inclusive
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid_to: Option<NaiveDate>,
    /// Annotations accumulated during normalisation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Source cell reference, absent for interpolated records
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cell_reference: Option<String>,
}

/// Similarity weights for interpolating a missing combination.
///
/// The weight of a candidate starts at 1 and gains each matching dimension's weight.
/// Month dominates because seasonal pricing is the strongest price driver.
#[derive(Debug, Clone, DocumentedFields, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InterpolationWeights {
    /// Gain for a matching accommodation type
    pub accommodation: f64,
    /// Gain for a matching stay length
    pub nights: f64,
    /// Gain for a matching group size
    pub pax: f64,
    /// Gain for a matching month
    pub month: f64,
}

impl Default for InterpolationWeights {
    fn default() -> Self {
        Self {
            accommodation: 2.0,
            nights: 2.0,
            pax: 2.0,
            month: 3.0,
        }
    }
}

/// A currency conversion to apply to matching records
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrencyConversion {
    /// Only records in this currency are converted
    pub from: String,
    /// Currency code written onto converted records
    pub to: String,
    /// Multiplier applied to the price
    pub rate: f64,
}

/// Options controlling the optional normalisation passes
#[derive(Debug, Clone, DocumentedFields, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizeOptions {
    /// Fill missing combinations from similar entries
    pub interpolate: bool,
    /// Convert matching records to another currency
    pub currency_conversion: Option<CurrencyConversion>,
    /// Round prices after all adjustments
    pub round_prices: bool,
    /// Decimal places to round to
    pub decimal_places: u8,
    /// Similarity weights for interpolation
    pub weights: InterpolationWeights,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            interpolate: false,
            currency_conversion: None,
            round_prices: true,
            decimal_places: 2,
            weights: InterpolationWeights::default(),
        }
    }
}

/// Counters describing one normalisation run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NormalizeSummary {
    /// Month rows in the input
    pub months: usize,
    /// Size of the full (month, accommodation, nights, pax) product
    pub combinations: usize,
    /// Records extracted directly from cells
    pub extracted: usize,
    /// Extracted records that are unavailable
    pub unavailable: usize,
    /// Zero-price cells resolved to unavailable by the conservative default
    pub zero_ambiguities: usize,
    /// Records fabricated by interpolation
    pub interpolated: usize,
    /// Records converted to another currency
    pub converted: usize,
    /// Canonical special periods encountered, in first-seen order
    pub special_periods: Vec<String>,
}

/// Result of one normalisation run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizeOutcome {
    /// Whether the run produced trustworthy data
    pub success: bool,
    /// Flattened records, sorted by month, accommodation type, nights and pax
    pub data: Vec<PricingRecord>,
    /// Data-quality notes that did not stop processing
    pub warnings: Vec<String>,
    /// Structural or fatal problems; when non-empty, `data` is empty
    pub errors: Vec<String>,
    /// Counters for reporting
    pub summary: NormalizeSummary,
}

impl NormalizeOutcome {
    fn failure(errors: Vec<String>) -> Self {
        Self {
            success: false,
            data: Vec::new(),
            warnings: Vec::new(),
            errors,
            summary: NormalizeSummary::default(),
        }
    }
}

/// Normalise a sliced pricing matrix into sorted, flat pricing records.
///
/// Structural problems and fatal mid-pipeline errors both yield `success = false` with
/// no data: partial output is never returned. Data-quality findings (zero-price
/// ambiguity, interpolation, conversions) are reported as warnings and counters
/// alongside the data instead.
pub fn normalize(matrix: &PricingMatrix, options: &NormalizeOptions) -> NormalizeOutcome {
    let errors = validate_structure(matrix);
    if !errors.is_empty() {
        return NormalizeOutcome::failure(errors);
    }

    match run_pipeline(matrix, options) {
        Ok(outcome) => outcome,
        Err(err) => NormalizeOutcome::failure(vec![format!("{err:#}")]),
    }
}

/// Check the invariants flattening relies on, collecting every violation
fn validate_structure(matrix: &PricingMatrix) -> Vec<String> {
    let mut errors = Vec::new();

    if matrix.months.is_empty() {
        errors.push("matrix has no month labels".to_string());
    }
    if matrix.accommodation_types.is_empty() {
        errors.push("matrix has no accommodation types".to_string());
    }
    if matrix.nights_options.is_empty() {
        errors.push("matrix has no nights options".to_string());
    }
    if matrix.pax_options.is_empty() {
        errors.push("matrix has no pax options".to_string());
    }
    if matrix.grid.len() != matrix.months.len() {
        errors.push(format!(
            "price grid has {} rows for {} months",
            matrix.grid.len(),
            matrix.months.len()
        ));
    }

    check_unique(&mut errors, "month labels", matrix.months.iter());
    check_unique(
        &mut errors,
        "accommodation types",
        matrix.accommodation_types.iter(),
    );
    check_unique(&mut errors, "nights options", matrix.nights_options.iter());
    check_unique(&mut errors, "pax options", matrix.pax_options.iter());

    errors
}

/// Record an error if an axis contains duplicate values
fn check_unique<T, I>(errors: &mut Vec<String>, axis: &str, values: I)
where
    T: std::hash::Hash + Eq,
    I: Iterator<Item = T> + ExactSizeIterator,
{
    let total = values.len();
    let distinct: IndexSet<_> = values.collect();
    if distinct.len() != total {
        errors.push(format!("matrix contains duplicate {axis}"));
    }
}

/// The fallible part of normalisation; errors here abandon the whole run
fn run_pipeline(matrix: &PricingMatrix, options: &NormalizeOptions) -> Result<NormalizeOutcome> {
    check_dates(matrix)?;
    if let Some(conversion) = &options.currency_conversion {
        ensure!(
            conversion.rate.is_finite() && conversion.rate > 0.0,
            "currency conversion rate {} is not a positive number",
            conversion.rate
        );
    }
    if options.interpolate {
        let weights = [
            options.weights.accommodation,
            options.weights.nights,
            options.weights.pax,
            options.weights.month,
        ];
        ensure!(
            weights.iter().all(|&weight| weight.is_finite() && weight >= 0.0),
            "interpolation weights must be finite and non-negative"
        );
    }

    let mut warnings = Vec::new();
    let mut summary = NormalizeSummary {
        months: matrix.months.len(),
        combinations: matrix.months.len()
            * matrix.accommodation_types.len()
            * matrix.nights_options.len()
            * matrix.pax_options.len(),
        ..NormalizeSummary::default()
    };

    let mut records = flatten(matrix, &mut warnings, &mut summary);

    let distinct = records
        .iter()
        .map(|r| (r.month.as_str(), r.accommodation_type.as_str(), r.nights, r.pax))
        .collect::<HashSet<_>>()
        .len();
    if distinct != records.len() {
        let message = format!(
            "{} combinations share a (month, accommodation, nights, pax) key after month \
             normalisation",
            records.len() - distinct
        );
        warn!("{message}");
        warnings.push(message);
    }

    if options.interpolate {
        let added = interpolate::fill_missing(&mut records, matrix, &options.weights);
        if added > 0 {
            debug!("interpolated {added} missing combinations");
            warnings.push(format!("interpolated {added} missing combinations"));
            summary.interpolated = added;
        }
    }

    if let Some(conversion) = &options.currency_conversion {
        summary.converted = convert_currency(&mut records, conversion);
    }

    if options.round_prices {
        round_prices(&mut records, options.decimal_places)?;
    }

    sort_records(&mut records);

    Ok(NormalizeOutcome {
        success: true,
        data: records,
        warnings,
        errors: Vec::new(),
        summary,
    })
}

/// Reject validity windows that end before they start
fn check_dates(matrix: &PricingMatrix) -> Result<()> {
    if let (Some(from), Some(to)) = (matrix.valid_from, matrix.valid_to) {
        ensure!(
            from <= to,
            "matrix validity window ends before it starts ({from} > {to})"
        );
    }

    for (row, cells) in matrix.grid.iter().enumerate() {
        for cell in cells.iter().flatten() {
            if let (Some(from), Some(to)) = (cell.valid_from, cell.valid_to) {
                ensure!(
                    from <= to,
                    "cell {:?} in row {} has a validity window ending before it starts",
                    cell.cell_reference,
                    row
                );
            }
        }
    }

    Ok(())
}

/// Flatten the grid into one record per present cell.
///
/// Cells are read sequentially within each month's row, nesting accommodation type
/// outermost, then nights, then pax. A missing or short row simply yields fewer
/// records.
fn flatten(
    matrix: &PricingMatrix,
    warnings: &mut Vec<String>,
    summary: &mut NormalizeSummary,
) -> Vec<PricingRecord> {
    let mut records = Vec::new();

    for (month_label, row) in matrix.months.iter().zip(&matrix.grid) {
        let month = normalise_period_label(month_label);
        let special_period = detect_special_period(month_label).map(String::from);
        if let Some(name) = &special_period
            && !summary.special_periods.contains(name)
        {
            summary.special_periods.push(name.clone());
        }

        let combos = matrix
            .accommodation_types
            .iter()
            .cartesian_product(&matrix.nights_options)
            .cartesian_product(&matrix.pax_options);
        for (index, ((accommodation_type, &nights), &pax)) in combos.enumerate() {
            let Some(cell) = row.get(index).and_then(Option::as_ref) else {
                continue;
            };

            let decision = resolve_availability(cell);
            if decision.ambiguous {
                summary.zero_ambiguities += 1;
                let message = format!(
                    "zero price with unrecognised text {:?} in cell {:?} treated as unavailable",
                    cell.original_value, cell.cell_reference
                );
                warn!("{message}");
                warnings.push(message);
            }
            if !decision.is_available {
                summary.unavailable += 1;
            }

            records.push(PricingRecord {
                month: month.clone(),
                accommodation_type: accommodation_type.clone(),
                nights,
                pax,
                price: decision.price,
                currency: cell
                    .currency
                    .clone()
                    .unwrap_or_else(|| matrix.currency.clone()),
                is_available: decision.is_available,
                special_period: special_period.clone(),
                valid_from: cell.valid_from.or(matrix.valid_from),
                valid_to: cell.valid_to.or(matrix.valid_to),
                notes: cell.notes.clone(),
                cell_reference: (!cell.cell_reference.is_empty())
                    .then(|| cell.cell_reference.clone()),
            });
        }
    }

    summary.extracted = records.len();
    records
}

/// Convert matching records in place, returning how many changed
fn convert_currency(records: &mut [PricingRecord], conversion: &CurrencyConversion) -> usize {
    let mut converted = 0;
    for record in records.iter_mut().filter(|r| r.currency == conversion.from) {
        record.price *= conversion.rate;
        record.currency = conversion.to.clone();
        append_note(
            record,
            &format!(
                "converted from {} at rate {}",
                conversion.from, conversion.rate
            ),
        );
        converted += 1;
    }

    converted
}

/// Round every price half-up at the configured precision
fn round_prices(records: &mut [PricingRecord], decimal_places: u8) -> Result<()> {
    ensure!(
        decimal_places <= 9,
        "cannot round to {decimal_places} decimal places"
    );
    let factor = 10f64.powi(i32::from(decimal_places));

    for record in records {
        record.price = (record.price * factor).round() / factor;
    }

    Ok(())
}

/// Append to a record's notes, starting one when absent
pub(crate) fn append_note(record: &mut PricingRecord, note: &str) {
    match &mut record.notes {
        Some(notes) => {
            notes.push_str("; ");
            notes.push_str(note);
        }
        None => record.notes = Some(note.to_string()),
    }
}

/// Sort records by calendar month (special periods last, alphabetically), then
/// accommodation type, nights and pax.
///
/// The sort is stable and idempotent; downstream consumers diff successive imports and
/// rely on this ordering.
pub fn sort_records(records: &mut [PricingRecord]) {
    records.sort_by_cached_key(|record| {
        (
            period_sort_key(&record.month),
            record.accommodation_type.clone(),
            record.nights,
            record.pax,
        )
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::matrix;
    use float_cmp::assert_approx_eq;
    use rstest::rstest;

    fn record(month: &str, accommodation: &str, nights: u32, pax: u32) -> PricingRecord {
        PricingRecord {
            month: month.to_string(),
            accommodation_type: accommodation.to_string(),
            nights,
            pax,
            price: 100.0,
            currency: "EUR".to_string(),
            is_available: true,
            special_period: None,
            valid_from: None,
            valid_to: None,
            notes: None,
            cell_reference: None,
        }
    }

    #[rstest]
    fn test_validate_structure_collects_all_errors(mut matrix: PricingMatrix) {
        matrix.months.clear();
        matrix.pax_options.clear();
        let errors = validate_structure(&matrix);
        assert_eq!(errors.len(), 3, "{errors:?}");
        assert!(errors.contains(&"matrix has no month labels".to_string()));
        assert!(errors.contains(&"matrix has no pax options".to_string()));
        // two grid rows remain for zero months
        assert!(errors.contains(&"price grid has 2 rows for 0 months".to_string()));
    }

    #[rstest]
    fn test_validate_structure_duplicate_months(mut matrix: PricingMatrix) {
        matrix.months[1] = matrix.months[0].clone();
        let errors = validate_structure(&matrix);
        assert_eq!(errors, vec!["matrix contains duplicate month labels"]);
    }

    #[rstest]
    fn test_normalize_structural_failure_returns_no_data(mut matrix: PricingMatrix) {
        matrix.grid.pop();
        let outcome = normalize(&matrix, &NormalizeOptions::default());
        assert!(!outcome.success);
        assert!(outcome.data.is_empty());
        assert_eq!(outcome.errors, vec!["price grid has 1 rows for 2 months"]);
    }

    #[rstest]
    fn test_normalize_extracts_every_cell(matrix: PricingMatrix) {
        let outcome = normalize(&matrix, &NormalizeOptions::default());
        assert!(outcome.success);
        assert_eq!(outcome.data.len(), 16);
        assert_eq!(outcome.summary.extracted, 16);
        assert_eq!(outcome.summary.combinations, 16);
        assert_eq!(outcome.summary.unavailable, 0);
        assert!(outcome.warnings.is_empty());

        // first sorted record: June, Apartment, 3 nights, 2 pax
        let first = &outcome.data[0];
        assert_eq!(first.month, "June");
        assert_eq!(first.accommodation_type, "Apartment");
        assert_eq!(first.nights, 3);
        assert_eq!(first.pax, 2);
        assert_approx_eq!(f64, first.price, 95.0);
        assert_eq!(first.currency, "EUR");
    }

    #[rstest]
    fn test_normalize_skips_missing_cells(mut matrix: PricingMatrix) {
        matrix.grid[0][3] = None;
        matrix.grid[1].truncate(6);
        let outcome = normalize(&matrix, &NormalizeOptions::default());
        assert!(outcome.success);
        assert_eq!(outcome.data.len(), 13);
        assert_eq!(outcome.summary.extracted, 13);
    }

    #[rstest]
    fn test_normalize_month_labels_canonicalised(mut matrix: PricingMatrix) {
        matrix.months[0] = "jun".to_string();
        let outcome = normalize(&matrix, &NormalizeOptions::default());
        assert!(outcome.data.iter().any(|r| r.month == "June"));
    }

    #[rstest]
    fn test_normalize_zero_ambiguity_warning(mut matrix: PricingMatrix) {
        let cell = matrix.grid[0][0].as_mut().unwrap();
        cell.value = 0.0;
        cell.original_value = "call us".to_string();
        cell.cell_reference = "B2".to_string();

        let outcome = normalize(&matrix, &NormalizeOptions::default());
        assert!(outcome.success);
        assert_eq!(outcome.summary.zero_ambiguities, 1);
        assert_eq!(outcome.summary.unavailable, 1);
        assert_eq!(
            outcome.warnings,
            vec![
                "zero price with unrecognised text \"call us\" in cell \"B2\" treated as \
                 unavailable"
            ]
        );
    }

    #[rstest]
    fn test_normalize_duplicate_key_warning(mut matrix: PricingMatrix) {
        // distinct labels, same canonical month
        matrix.months[1] = "Jun".to_string();

        let outcome = normalize(&matrix, &NormalizeOptions::default());
        assert!(outcome.success);
        // colliding records are kept; the collision is reported, not resolved
        assert_eq!(outcome.data.len(), 16);
        assert_eq!(
            outcome.warnings,
            vec![
                "8 combinations share a (month, accommodation, nights, pax) key after month \
                 normalisation"
            ]
        );
    }

    #[rstest]
    fn test_normalize_special_period_passthrough(mut matrix: PricingMatrix) {
        matrix.months[0] = "Easter (18-21 Apr)".to_string();
        let outcome = normalize(&matrix, &NormalizeOptions::default());
        let easter: Vec<_> = outcome
            .data
            .iter()
            .filter(|r| r.special_period.as_deref() == Some("Easter"))
            .collect();
        assert_eq!(easter.len(), 8);
        assert_eq!(outcome.summary.special_periods, vec!["Easter"]);
        // the label keeps its date annotation
        assert!(easter.iter().all(|r| r.month == "Easter (18-21 Apr)"));
        // special periods sort after calendar months
        assert_eq!(outcome.data.last().unwrap().month, "Easter (18-21 Apr)");
    }

    #[rstest]
    fn test_normalize_currency_conversion(mut matrix: PricingMatrix) {
        matrix.grid[0][0].as_mut().unwrap().currency = Some("GBP".to_string());
        let options = NormalizeOptions {
            currency_conversion: Some(CurrencyConversion {
                from: "EUR".to_string(),
                to: "USD".to_string(),
                rate: 1.25,
            }),
            ..NormalizeOptions::default()
        };
        let outcome = normalize(&matrix, &options);
        assert!(outcome.success);
        // the GBP cell is left alone
        assert_eq!(outcome.summary.converted, 15);
        let unconverted: Vec<_> = outcome.data.iter().filter(|r| r.currency == "GBP").collect();
        assert_eq!(unconverted.len(), 1);
        assert_approx_eq!(f64, unconverted[0].price, 85.0);
        let converted = outcome.data.iter().find(|r| r.currency == "USD").unwrap();
        assert!(converted.notes.as_deref().unwrap().contains("converted from EUR"));
    }

    #[rstest]
    fn test_normalize_bad_conversion_rate_is_fatal(matrix: PricingMatrix) {
        let options = NormalizeOptions {
            currency_conversion: Some(CurrencyConversion {
                from: "EUR".to_string(),
                to: "USD".to_string(),
                rate: 0.0,
            }),
            ..NormalizeOptions::default()
        };
        let outcome = normalize(&matrix, &options);
        assert!(!outcome.success);
        assert!(outcome.data.is_empty());
        assert_eq!(
            outcome.errors,
            vec!["currency conversion rate 0 is not a positive number"]
        );
    }

    #[rstest]
    fn test_normalize_negative_weight_is_fatal(matrix: PricingMatrix) {
        let options = NormalizeOptions {
            interpolate: true,
            weights: InterpolationWeights {
                month: -1.0,
                ..InterpolationWeights::default()
            },
            ..NormalizeOptions::default()
        };
        let outcome = normalize(&matrix, &options);
        assert!(!outcome.success);
        assert_eq!(
            outcome.errors,
            vec!["interpolation weights must be finite and non-negative"]
        );
    }

    #[rstest]
    fn test_normalize_bad_validity_window_is_fatal(mut matrix: PricingMatrix) {
        matrix.valid_from = NaiveDate::from_ymd_opt(2024, 9, 1);
        matrix.valid_to = NaiveDate::from_ymd_opt(2024, 8, 1);
        let outcome = normalize(&matrix, &NormalizeOptions::default());
        assert!(!outcome.success);
        assert_eq!(
            outcome.errors,
            vec!["matrix validity window ends before it starts (2024-09-01 > 2024-08-01)"]
        );
    }

    #[rstest]
    #[case(90.125, 2, 90.13)]
    #[case(90.124, 2, 90.12)]
    #[case(2.5, 0, 3.0)]
    #[case(99.875, 2, 99.88)]
    fn test_round_prices_half_up(#[case] price: f64, #[case] places: u8, #[case] expected: f64) {
        let mut records = vec![record("June", "Hotel", 3, 2)];
        records[0].price = price;
        round_prices(&mut records, places).unwrap();
        assert_approx_eq!(f64, records[0].price, expected);
    }

    #[rstest]
    fn test_sort_records_full_ordering() {
        let mut records = vec![
            record("Peak Season", "Hotel", 3, 2),
            record("July", "Hotel", 7, 2),
            record("July", "Hotel", 3, 4),
            record("July", "Hotel", 3, 2),
            record("Easter", "Hotel", 3, 2),
            record("June", "Villa", 3, 2),
            record("June", "Apartment", 3, 2),
        ];
        sort_records(&mut records);

        let keys: Vec<_> = records
            .iter()
            .map(|r| (r.month.as_str(), r.accommodation_type.as_str(), r.nights, r.pax))
            .collect();
        assert_eq!(
            keys,
            vec![
                ("June", "Apartment", 3, 2),
                ("June", "Villa", 3, 2),
                ("July", "Hotel", 3, 2),
                ("July", "Hotel", 3, 4),
                ("July", "Hotel", 7, 2),
                ("Easter", "Hotel", 3, 2),
                ("Peak Season", "Hotel", 3, 2),
            ]
        );
    }

    // the required ordering is idempotent: re-sorting sorted data changes nothing
    #[rstest]
    fn test_sort_records_idempotent(matrix: PricingMatrix) {
        let outcome = normalize(&matrix, &NormalizeOptions::default());
        let mut resorted = outcome.data.clone();
        sort_records(&mut resorted);
        assert_eq!(resorted, outcome.data);
    }
}
