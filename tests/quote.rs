//! Integration tests for package price resolution.
use chrono::NaiveDate;
use float_cmp::assert_approx_eq;
use ratesheet::package::{
    GroupSizeTier, Package, PeriodKind, PricePoint, PriceValue, PricingPeriod, validate_package,
};
use ratesheet::quote::{QuoteError, calculate_price};

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

/// A two-tier package with a June month rate and a New Year special
fn sample_package() -> Package {
    let prices = |amounts: &[(usize, u32, f64)]| {
        amounts
            .iter()
            .map(|&(tier_index, nights, amount)| PricePoint {
                tier_index,
                nights,
                price: PriceValue::Amount(amount),
            })
            .collect()
    };

    Package {
        name: "City Break".to_string(),
        currency: "EUR".to_string(),
        tiers: vec![
            GroupSizeTier {
                label: "1-4 persons".to_string(),
                min_people: 1,
                max_people: 4,
            },
            GroupSizeTier {
                label: "5-8 persons".to_string(),
                min_people: 5,
                max_people: 8,
            },
        ],
        periods: vec![
            PricingPeriod {
                label: "June".to_string(),
                kind: PeriodKind::Month,
                start_date: None,
                end_date: None,
                prices: prices(&[(0, 2, 60.0), (0, 5, 55.0), (1, 2, 50.0), (1, 5, 45.0)]),
            },
            PricingPeriod {
                label: "New Year".to_string(),
                kind: PeriodKind::Special,
                start_date: Some(date(2024, 12, 29)),
                end_date: Some(date(2025, 1, 2)),
                prices: prices(&[(0, 2, 95.0), (1, 2, 85.0)]),
            },
            PricingPeriod {
                label: "January".to_string(),
                kind: PeriodKind::Month,
                start_date: None,
                end_date: None,
                prices: prices(&[(0, 2, 40.0), (0, 5, 35.0), (1, 2, 30.0), (1, 5, 25.0)]),
            },
        ],
        duration_options: vec![2, 5],
        inclusions: vec!["City tour".to_string()],
    }
}

#[test]
fn test_package_validates() {
    validate_package(&sample_package()).unwrap();
}

#[test]
fn test_quote_month_rate() {
    let quote = calculate_price(&sample_package(), 3, 5, date(2024, 6, 14)).unwrap();

    assert_eq!(quote.price_per_person, PriceValue::Amount(55.0));
    assert_eq!(quote.total_price, PriceValue::Amount(165.0));
    assert_eq!(quote.tier, "1-4 persons");
    assert_eq!(quote.period, "June");
    assert_eq!(quote.currency, "EUR");
}

#[test]
fn test_quote_special_period_beats_month() {
    // January 1st falls inside the New Year window, so the special rate wins
    let quote = calculate_price(&sample_package(), 6, 2, date(2025, 1, 1)).unwrap();
    assert_eq!(quote.period, "New Year");
    assert_eq!(quote.price_per_person, PriceValue::Amount(85.0));
    assert_eq!(quote.total_price, PriceValue::Amount(510.0));

    // A week later the window has closed and the January rate applies
    let quote = calculate_price(&sample_package(), 6, 2, date(2025, 1, 8)).unwrap();
    assert_eq!(quote.period, "January");
    assert_eq!(quote.price_per_person, PriceValue::Amount(30.0));
}

#[test]
fn test_quote_total_scales_with_people_not_nights() {
    let per_person = 60.0;
    for people in 1..=4 {
        let quote = calculate_price(&sample_package(), people, 2, date(2024, 6, 1)).unwrap();
        let total = quote.total_price.amount().unwrap();
        assert_approx_eq!(f64, total, per_person * f64::from(people));
    }
}

#[test]
fn test_quote_on_request_total() {
    let mut package = sample_package();
    package.periods[0].prices[1].price = PriceValue::OnRequest;

    let quote = calculate_price(&package, 2, 5, date(2024, 6, 14)).unwrap();
    assert_eq!(quote.price_per_person, PriceValue::OnRequest);
    assert_eq!(quote.total_price, PriceValue::OnRequest);
}

#[test]
fn test_quote_errors() {
    let package = sample_package();

    assert_eq!(
        calculate_price(&package, 9, 2, date(2024, 6, 1)).unwrap_err(),
        QuoteError::NoTier {
            people: 9,
            available: vec!["1-4 persons".to_string(), "5-8 persons".to_string()],
        }
    );

    assert!(matches!(
        calculate_price(&package, 2, 2, date(2024, 3, 1)).unwrap_err(),
        QuoteError::NoPeriod { .. }
    ));

    assert_eq!(
        calculate_price(&package, 2, 4, date(2024, 6, 1))
            .unwrap_err()
            .to_string(),
        "4 nights is not a bookable duration (options: 2, 5)"
    );

    // The special period only lists two-night prices
    assert!(matches!(
        calculate_price(&package, 2, 5, date(2024, 12, 30)).unwrap_err(),
        QuoteError::NoPricePoint { .. }
    ));
}
