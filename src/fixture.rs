//! Fixtures for tests

use crate::matrix::{PriceCell, PricingMatrix};
use crate::package::{GroupSizeTier, Package, PeriodKind, PricePoint, PriceValue, PricingPeriod};
use chrono::NaiveDate;
use rstest::fixture;

/// Assert that an error with the given message occurs
macro_rules! assert_error {
    ($result:expr, $msg:expr) => {
        assert_eq!(
            $result.unwrap_err().chain().next().unwrap().to_string(),
            $msg
        );
    };
}
pub(crate) use assert_error;

#[fixture]
pub fn tiers() -> Vec<GroupSizeTier> {
    vec![
        GroupSizeTier {
            label: "1-5 persons".into(),
            min_people: 1,
            max_people: 5,
        },
        GroupSizeTier {
            label: "6-11 persons".into(),
            min_people: 6,
            max_people: 11,
        },
        GroupSizeTier {
            label: "12+ persons".into(),
            min_people: 12,
            max_people: 99,
        },
    ]
}

/// Build the full tier/duration price grid for one period from per-person rates
fn price_grid(rates: &[(usize, u32, PriceValue)]) -> Vec<PricePoint> {
    rates
        .iter()
        .map(|&(tier_index, nights, price)| PricePoint {
            tier_index,
            nights,
            price,
        })
        .collect()
}

#[fixture]
pub fn package(tiers: Vec<GroupSizeTier>) -> Package {
    let amount = PriceValue::Amount;
    Package {
        name: "Coastal Escape".into(),
        currency: "EUR".into(),
        tiers,
        periods: vec![
            PricingPeriod {
                label: "April".into(),
                kind: PeriodKind::Month,
                start_date: None,
                end_date: None,
                prices: price_grid(&[
                    (0, 3, amount(85.0)),
                    (0, 7, amount(80.0)),
                    (1, 3, amount(75.0)),
                    (1, 7, amount(70.0)),
                    (2, 3, amount(65.0)),
                    (2, 7, amount(60.0)),
                ]),
            },
            PricingPeriod {
                label: "Easter".into(),
                kind: PeriodKind::Special,
                start_date: NaiveDate::from_ymd_opt(2024, 4, 18),
                end_date: NaiveDate::from_ymd_opt(2024, 4, 21),
                prices: price_grid(&[
                    (0, 3, amount(120.0)),
                    (0, 7, amount(110.0)),
                    (1, 3, amount(100.0)),
                    (1, 7, amount(95.0)),
                    (2, 3, amount(90.0)),
                    (2, 7, PriceValue::OnRequest),
                ]),
            },
            PricingPeriod {
                label: "August".into(),
                kind: PeriodKind::Month,
                start_date: None,
                end_date: None,
                prices: price_grid(&[
                    (0, 3, amount(110.0)),
                    (0, 7, amount(100.0)),
                    (1, 3, amount(95.0)),
                    (1, 7, amount(90.0)),
                    (2, 3, amount(80.0)),
                    (2, 7, amount(75.0)),
                ]),
            },
        ],
        duration_options: vec![3, 7],
        inclusions: vec![
            "Daily breakfast".into(),
            "Airport transfer".into(),
            "Free WiFi".into(),
        ],
    }
}

#[fixture]
pub fn matrix() -> PricingMatrix {
    let cell = |value: f64| Some(PriceCell::new(value));
    PricingMatrix {
        months: vec!["June".into(), "July".into()],
        accommodation_types: vec!["Hotel".into(), "Apartment".into()],
        nights_options: vec![3, 7],
        pax_options: vec![2, 4],
        // grid rows follow the month list; cells run over the
        // (accommodation, nights, pax) cartesian product in that nesting order
        grid: vec![
            vec![
                cell(85.0),
                cell(80.0),
                cell(75.0),
                cell(70.0),
                cell(95.0),
                cell(90.0),
                cell(88.0),
                cell(82.0),
            ],
            vec![
                cell(105.0),
                cell(100.0),
                cell(95.0),
                cell(90.0),
                cell(115.0),
                cell(110.0),
                cell(108.0),
                cell(102.0),
            ],
        ],
        currency: "EUR".into(),
        valid_from: None,
        valid_to: None,
    }
}
