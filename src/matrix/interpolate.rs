//! Filling missing price combinations from similar entries.
//!
//! Interpolation runs over the complete extracted set, after flattening and before
//! currency conversion and rounding. It never invents a price from nothing: a
//! combination with no candidate sharing at least one inner dimension stays absent.
use super::{InterpolationWeights, PricingMatrix, PricingRecord};
use crate::month::{detect_special_period, normalise_period_label};
use indexmap::IndexSet;
use itertools::Itertools;
use std::collections::HashSet;

/// Interpolate every missing (month, accommodation, nights, pax) combination.
///
/// Candidates are available, positively-priced records in the matrix's default currency
/// sharing at least one of accommodation type, nights or pax with the gap. Each
/// candidate's price is weighted by similarity; a matching month weighs most because
/// seasonal pricing dominates. Returns how many records were added.
pub fn fill_missing(
    records: &mut Vec<PricingRecord>,
    matrix: &PricingMatrix,
    weights: &InterpolationWeights,
) -> usize {
    let existing: HashSet<_> = records
        .iter()
        .map(|r| (r.month.as_str(), r.accommodation_type.as_str(), r.nights, r.pax))
        .collect();

    // raw labels may collapse to one canonical month
    let months: IndexSet<String> = matrix
        .months
        .iter()
        .map(|m| normalise_period_label(m))
        .collect();

    let mut added = Vec::new();
    let combos = months
        .iter()
        .cartesian_product(&matrix.accommodation_types)
        .cartesian_product(&matrix.nights_options)
        .cartesian_product(&matrix.pax_options);
    for (((month, accommodation_type), &nights), &pax) in combos {
        if existing.contains(&(month.as_str(), accommodation_type.as_str(), nights, pax)) {
            continue;
        }

        let Some((price, donors)) = weighted_average(
            records,
            &matrix.currency,
            (month, accommodation_type, nights, pax),
            weights,
        ) else {
            continue;
        };

        added.push(PricingRecord {
            month: month.clone(),
            accommodation_type: accommodation_type.clone(),
            nights,
            pax,
            price,
            currency: matrix.currency.clone(),
            is_available: true,
            special_period: detect_special_period(month).map(String::from),
            valid_from: matrix.valid_from,
            valid_to: matrix.valid_to,
            notes: Some(format!("interpolated from {donors} similar entries")),
            cell_reference: None,
        });
    }

    let count = added.len();
    records.append(&mut added);
    count
}

/// Similarity-weighted average price over the candidate records, with the candidate
/// count; `None` when no record qualifies
fn weighted_average(
    records: &[PricingRecord],
    currency: &str,
    combo: (&str, &str, u32, u32),
    weights: &InterpolationWeights,
) -> Option<(f64, usize)> {
    let (month, accommodation_type, nights, pax) = combo;

    let mut weight_sum = 0.0;
    let mut price_sum = 0.0;
    let mut candidates = 0;
    for record in records {
        if !record.is_available || record.price <= 0.0 || record.currency != currency {
            continue;
        }
        let shares_dimension = record.accommodation_type == accommodation_type
            || record.nights == nights
            || record.pax == pax;
        if !shares_dimension {
            continue;
        }

        let mut weight = 1.0;
        if record.accommodation_type == accommodation_type {
            weight += weights.accommodation;
        }
        if record.nights == nights {
            weight += weights.nights;
        }
        if record.pax == pax {
            weight += weights.pax;
        }
        if record.month == month {
            weight += weights.month;
        }

        weight_sum += weight;
        price_sum += weight * record.price;
        candidates += 1;
    }

    (candidates > 0).then(|| (price_sum / weight_sum, candidates))
}
