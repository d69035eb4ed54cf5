//! Price resolution for validated booking requests.
//!
//! [`calculate_price`] walks a [`Package`] for a (people, nights, arrival date) triple:
//! tier first, then period, duration, price point. Every miss is a [`QuoteError`]
//! naming what was available, because "no pricing for 37 people" is an expected
//! business answer, not a fault. Arithmetic invariants of the finished quote are
//! checked separately and logged, never blocking the result.
use crate::month::Month;
use crate::package::{Package, PeriodKind, PriceValue, PricingPeriod};
use anyhow::{Result, bail, ensure};
use chrono::NaiveDate;
use float_cmp::approx_eq;
use itertools::Itertools;
use log::error;
use serde::{Deserialize, Serialize};

/// Tolerance for the total versus per-person times people invariant
const TOTAL_TOLERANCE: f64 = 0.01;

/// Why a booking request could not be priced
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum QuoteError {
    /// The group size falls outside every tier
    #[error("no pricing tier covers {people} people (available tiers: {})", .available.iter().join(", "))]
    NoTier {
        /// Requested group size
        people: u32,
        /// Labels of the tiers the package does offer
        available: Vec<String>,
    },

    /// No special period covers the arrival date and no month entry matches
    #[error("no pricing period covers {month} (arrival {date})")]
    NoPeriod {
        /// Requested arrival date
        date: NaiveDate,
        /// Calendar month derived from the arrival date
        month: Month,
    },

    /// The stay length is not one of the package's duration options
    #[error("{nights} nights is not a bookable duration (options: {})", .options.iter().join(", "))]
    InvalidDuration {
        /// Requested stay length
        nights: u32,
        /// Durations the package does offer
        options: Vec<u32>,
    },

    /// The matched period has no price for the tier and duration
    #[error("no price for tier {tier:?} over {nights} nights in period {period:?}")]
    NoPricePoint {
        /// Label of the matched tier
        tier: String,
        /// Requested stay length
        nights: u32,
        /// Label of the matched period
        period: String,
    },
}

/// Result type for quote resolution
pub type QuoteResult<T> = std::result::Result<T, QuoteError>;

/// A resolved quote for one booking request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceQuote {
    /// Per-person price for the stay
    pub price_per_person: PriceValue,
    /// Price for the whole group; on request whenever the per-person price is
    pub total_price: PriceValue,
    /// Group size the quote covers
    pub people: u32,
    /// Label of the tier that matched
    pub tier: String,
    /// Label of the period that matched
    pub period: String,
    /// Stay length in nights
    pub nights: u32,
    /// ISO 4217 currency code
    pub currency: String,
}

/// Resolve a price for a booking request against a normalised package.
///
/// Tier selection takes the first tier covering `people`. Period selection checks
/// special periods by explicit date range first, in declared order; a qualifying
/// special period wins even when a month entry also covers the date. The stay length
/// must be a declared duration option, and the period must price the (tier, nights)
/// combination. An on-request price propagates to the total without multiplication.
pub fn calculate_price(
    package: &Package,
    people: u32,
    nights: u32,
    arrival: NaiveDate,
) -> QuoteResult<PriceQuote> {
    let (tier_index, tier) = package.tier_for(people).ok_or_else(|| QuoteError::NoTier {
        people,
        available: package.tiers.iter().map(|t| t.label.clone()).collect(),
    })?;

    let period = resolve_period(package, arrival).ok_or_else(|| QuoteError::NoPeriod {
        date: arrival,
        month: Month::of_date(arrival),
    })?;

    if !package.duration_options.contains(&nights) {
        return Err(QuoteError::InvalidDuration {
            nights,
            options: package.duration_options.clone(),
        });
    }

    let price_per_person =
        period
            .price_for(tier_index, nights)
            .ok_or_else(|| QuoteError::NoPricePoint {
                tier: tier.label.clone(),
                nights,
                period: period.label.clone(),
            })?;

    let total_price = match price_per_person {
        PriceValue::Amount(amount) => PriceValue::Amount(amount * f64::from(people)),
        PriceValue::OnRequest => PriceValue::OnRequest,
    };

    let quote = PriceQuote {
        price_per_person,
        total_price,
        people,
        tier: tier.label.clone(),
        period: period.label.clone(),
        nights,
        currency: package.currency.clone(),
    };
    if let Err(problem) = check_quote(&quote) {
        error!("quote failed arithmetic validation: {problem:#}; {quote:?}");
    }

    Ok(quote)
}

/// Pick the period for an arrival date.
///
/// Special periods match by explicit date range, in declared order; only when none
/// matches is the arrival's calendar month compared against month entries.
fn resolve_period(package: &Package, arrival: NaiveDate) -> Option<&PricingPeriod> {
    package
        .periods
        .iter()
        .find(|period| period.kind == PeriodKind::Special && period.covers_date(arrival))
        .or_else(|| {
            let month = Month::of_date(arrival);
            package
                .periods
                .iter()
                .find(|period| period.month() == Some(month))
        })
}

/// Check the arithmetic invariants of a finished quote.
///
/// A violation is a data-quality signal for operators, not a runtime fault; the caller
/// logs it and returns the quote regardless.
fn check_quote(quote: &PriceQuote) -> Result<()> {
    match (quote.price_per_person, quote.total_price) {
        (PriceValue::OnRequest, PriceValue::OnRequest) => Ok(()),
        (PriceValue::Amount(per_person), PriceValue::Amount(total)) => {
            if quote.people >= 1 {
                ensure!(
                    total >= per_person,
                    "total {total} is below the per-person price {per_person}"
                );
            }
            ensure!(
                approx_eq!(
                    f64,
                    total,
                    per_person * f64::from(quote.people),
                    epsilon = TOTAL_TOLERANCE
                ),
                "total {total} differs from per-person {per_person} x {} people",
                quote.people
            );
            if quote.people > 1 {
                ensure!(
                    total > per_person,
                    "total {total} does not exceed the per-person price for {} people",
                    quote.people
                );
            }
            Ok(())
        }
        _ => bail!("per-person and total prices must both be amounts or both on request"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::package;
    use float_cmp::assert_approx_eq;
    use rstest::rstest;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[rstest]
    fn test_calculate_price(package: Package) {
        let quote = calculate_price(&package, 4, 3, date(2024, 8, 10)).unwrap();
        assert_eq!(quote.price_per_person, PriceValue::Amount(110.0));
        assert_eq!(quote.total_price, PriceValue::Amount(440.0));
        assert_eq!(quote.people, 4);
        assert_eq!(quote.tier, "1-5 persons");
        assert_eq!(quote.period, "August");
        assert_eq!(quote.nights, 3);
        assert_eq!(quote.currency, "EUR");
    }

    // Easter covers the date, so it wins over the April month entry
    #[rstest]
    fn test_special_period_beats_month(package: Package) {
        let quote = calculate_price(&package, 4, 3, date(2024, 4, 19)).unwrap();
        assert_eq!(quote.period, "Easter");
        assert_eq!(quote.price_per_person, PriceValue::Amount(120.0));
    }

    #[rstest]
    fn test_month_match_outside_special_dates(package: Package) {
        let quote = calculate_price(&package, 4, 3, date(2024, 4, 25)).unwrap();
        assert_eq!(quote.period, "April");
        assert_eq!(quote.price_per_person, PriceValue::Amount(85.0));
    }

    // an on-request price propagates to the total without multiplication
    #[rstest]
    fn test_on_request_propagates(package: Package) {
        let quote = calculate_price(&package, 13, 7, date(2024, 4, 19)).unwrap();
        assert_eq!(quote.price_per_person, PriceValue::OnRequest);
        assert_eq!(quote.total_price, PriceValue::OnRequest);
        assert_eq!(quote.tier, "12+ persons");
    }

    #[rstest]
    fn test_no_tier(package: Package) {
        let err = calculate_price(&package, 200, 3, date(2024, 8, 10)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "no pricing tier covers 200 people (available tiers: 1-5 persons, 6-11 persons, 12+ persons)"
        );
    }

    #[rstest]
    fn test_no_period(package: Package) {
        let err = calculate_price(&package, 4, 3, date(2024, 6, 15)).unwrap_err();
        assert_eq!(
            err,
            QuoteError::NoPeriod {
                date: date(2024, 6, 15),
                month: Month::June,
            }
        );
        assert_eq!(
            err.to_string(),
            "no pricing period covers June (arrival 2024-06-15)"
        );
    }

    #[rstest]
    fn test_invalid_duration(package: Package) {
        let err = calculate_price(&package, 4, 5, date(2024, 8, 10)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "5 nights is not a bookable duration (options: 3, 7)"
        );
    }

    #[rstest]
    fn test_no_price_point(mut package: Package) {
        package.periods[0]
            .prices
            .retain(|point| !(point.tier_index == 1 && point.nights == 7));
        let err = calculate_price(&package, 7, 7, date(2024, 4, 25)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "no price for tier \"6-11 persons\" over 7 nights in period \"April\""
        );
    }

    #[rstest]
    fn test_total_scales_with_people(package: Package) {
        for people in 1..=5 {
            let quote = calculate_price(&package, people, 7, date(2024, 8, 10)).unwrap();
            let per_person = quote.price_per_person.amount().unwrap();
            let total = quote.total_price.amount().unwrap();
            assert_approx_eq!(f64, total, per_person * f64::from(people), epsilon = 0.01);
            assert!(total >= per_person);
        }
    }

    fn quote(per_person: PriceValue, total: PriceValue, people: u32) -> PriceQuote {
        PriceQuote {
            price_per_person: per_person,
            total_price: total,
            people,
            tier: "1-5 persons".to_string(),
            period: "August".to_string(),
            nights: 3,
            currency: "EUR".to_string(),
        }
    }

    #[rstest]
    fn test_check_quote_accepts_exact_arithmetic() {
        let quote = quote(PriceValue::Amount(100.0), PriceValue::Amount(400.0), 4);
        check_quote(&quote).unwrap();
    }

    #[rstest]
    fn test_check_quote_accepts_within_tolerance() {
        let quote = quote(PriceValue::Amount(100.0), PriceValue::Amount(400.005), 4);
        check_quote(&quote).unwrap();
    }

    #[rstest]
    fn test_check_quote_rejects_mixed_sentinel() {
        let quote = quote(PriceValue::Amount(100.0), PriceValue::OnRequest, 4);
        assert!(check_quote(&quote).is_err());
    }

    #[rstest]
    fn test_check_quote_rejects_total_mismatch() {
        let quote = quote(PriceValue::Amount(100.0), PriceValue::Amount(350.0), 4);
        assert!(check_quote(&quote).is_err());
    }

    #[rstest]
    fn test_check_quote_single_person_total_equals_per_person() {
        let quote = quote(PriceValue::Amount(100.0), PriceValue::Amount(100.0), 1);
        check_quote(&quote).unwrap();
    }
}
