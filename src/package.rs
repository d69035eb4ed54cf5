//! The normalised holiday-package model.
//!
//! A [`Package`] is the stable output of rate-sheet ingestion and the sole input to
//! quoting: group-size tiers, pricing periods (calendar months and special periods such
//! as Easter), per-person price points and the package's inclusions.
use crate::month::Month;
use anyhow::{Context, Result, ensure};
use chrono::NaiveDate;
use log::warn;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_string_enum::{DeserializeLabeledStringEnum, SerializeLabeledStringEnum};
use std::collections::HashSet;

/// Serialised form of [`PriceValue::OnRequest`]
pub const ON_REQUEST_LABEL: &str = "ON_REQUEST";

/// A price cell value: a concrete amount or a price-on-request marker
#[derive(Debug, Clone, Copy, PartialEq, derive_more::Display)]
pub enum PriceValue {
    /// Per-person amount in the package currency
    #[display("{_0:.2}")]
    Amount(f64),
    /// The operator quotes this combination manually
    #[display("ON_REQUEST")]
    OnRequest,
}

impl PriceValue {
    /// The amount, unless the price is on request
    pub fn amount(&self) -> Option<f64> {
        match self {
            Self::Amount(amount) => Some(*amount),
            Self::OnRequest => None,
        }
    }

    /// Whether this price must be quoted manually
    pub fn is_on_request(&self) -> bool {
        matches!(self, Self::OnRequest)
    }
}

impl Serialize for PriceValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Amount(amount) => serializer.serialize_f64(*amount),
            Self::OnRequest => serializer.serialize_str(ON_REQUEST_LABEL),
        }
    }
}

impl<'de> Deserialize<'de> for PriceValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(f64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(amount) => Ok(Self::Amount(amount)),
            Raw::Text(text) if text == ON_REQUEST_LABEL => Ok(Self::OnRequest),
            Raw::Text(text) => Err(D::Error::custom(format!(
                "invalid price value {text:?} (expected a number or {ON_REQUEST_LABEL:?})"
            ))),
        }
    }
}

/// A group-size band with its own price column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupSizeTier {
    /// Label as printed on the sheet ("1-5 persons")
    pub label: String,
    /// Smallest group size the tier covers
    pub min_people: u32,
    /// Largest group size the tier covers
    pub max_people: u32,
}

impl GroupSizeTier {
    /// Whether a group of this size falls in the tier
    pub fn contains(&self, people: u32) -> bool {
        (self.min_people..=self.max_people).contains(&people)
    }
}

/// Whether a pricing period is a calendar month or a named special period
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, SerializeLabeledStringEnum, DeserializeLabeledStringEnum,
)]
pub enum PeriodKind {
    /// A calendar month ("August")
    #[string = "month"]
    Month,
    /// A named period that overrides months ("Easter", "Peak Season")
    #[string = "special"]
    Special,
}

/// A row of the pricing matrix: one month or special period with its price points
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingPeriod {
    /// Canonical period label ("August", "Easter")
    pub label: String,
    /// Month or special period
    pub kind: PeriodKind,
    /// First day the period covers, when the sheet states one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    /// Last day the period covers, inclusive
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    /// Per-person price for each tier/duration combination
    pub prices: Vec<PricePoint>,
}

impl PricingPeriod {
    /// The calendar month this period stands for, if it is one
    pub fn month(&self) -> Option<Month> {
        match self.kind {
            PeriodKind::Month => Month::parse_token(&self.label).map(|(month, _)| month),
            PeriodKind::Special => None,
        }
    }

    /// Whether the period's explicit date range covers a date.
    ///
    /// Periods without explicit dates never match by date; month periods are matched by
    /// calendar month instead.
    pub fn covers_date(&self, date: NaiveDate) -> bool {
        match (self.start_date, self.end_date) {
            (Some(start), Some(end)) => (start..=end).contains(&date),
            _ => false,
        }
    }

    /// Look up the price for a tier and duration
    pub fn price_for(&self, tier_index: usize, nights: u32) -> Option<PriceValue> {
        self.prices
            .iter()
            .find(|point| point.tier_index == tier_index && point.nights == nights)
            .map(|point| point.price)
    }
}

/// A single priced combination within a period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    /// Index into the package's tier list
    pub tier_index: usize,
    /// Stay length the price applies to
    pub nights: u32,
    /// Per-person price for the whole stay
    pub price: PriceValue,
}

/// A fully normalised holiday package
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Package {
    /// Display name of the package
    pub name: String,
    /// ISO 4217 currency code for every amount in the package
    pub currency: String,
    /// Group-size tiers in ascending order
    pub tiers: Vec<GroupSizeTier>,
    /// Pricing periods in the order they should be tried when quoting
    pub periods: Vec<PricingPeriod>,
    /// Stay lengths the package can be booked for, ascending
    pub duration_options: Vec<u32>,
    /// Cleaned inclusion lines
    #[serde(default)]
    pub inclusions: Vec<String>,
}

impl Package {
    /// Find the tier covering a group size, with its index
    pub fn tier_for(&self, people: u32) -> Option<(usize, &GroupSizeTier)> {
        self.tiers
            .iter()
            .enumerate()
            .find(|(_, tier)| tier.contains(people))
    }

    /// Iterate over special periods first, then months, preserving declared order
    pub fn periods_by_precedence(&self) -> impl Iterator<Item = &PricingPeriod> {
        let (specials, months): (Vec<_>, Vec<_>) = self
            .periods
            .iter()
            .partition(|period| period.kind == PeriodKind::Special);
        specials.into_iter().chain(months)
    }
}

/// Check that a package is internally consistent.
///
/// Quoting assumes the invariants enforced here: ascending non-overlapping tiers,
/// unique period labels, sorted duration options and price points that reference
/// existing tiers and durations.
pub fn validate_package(package: &Package) -> Result<()> {
    ensure!(!package.name.trim().is_empty(), "package name is empty");
    ensure!(
        package.currency.len() == 3 && package.currency.chars().all(|c| c.is_ascii_alphabetic()),
        "currency {:?} is not an ISO 4217 code",
        package.currency
    );
    check_tiers(&package.tiers).context("invalid group-size tiers")?;
    check_durations(&package.duration_options).context("invalid duration options")?;
    check_periods(package).with_context(|| format!("invalid periods in {:?}", package.name))?;

    Ok(())
}

/// Check that tiers are well-formed, ascending and non-overlapping
fn check_tiers(tiers: &[GroupSizeTier]) -> Result<()> {
    ensure!(!tiers.is_empty(), "package has no group-size tiers");

    for tier in tiers {
        ensure!(
            tier.min_people >= 1 && tier.min_people <= tier.max_people,
            "tier {:?} has an invalid people range {}-{}",
            tier.label,
            tier.min_people,
            tier.max_people
        );
    }

    for pair in tiers.windows(2) {
        ensure!(
            pair[0].max_people < pair[1].min_people,
            "tiers {:?} and {:?} overlap or are out of order",
            pair[0].label,
            pair[1].label
        );
    }

    Ok(())
}

/// Check that duration options are positive, unique and ascending
fn check_durations(durations: &[u32]) -> Result<()> {
    ensure!(!durations.is_empty(), "package has no duration options");
    ensure!(
        durations.iter().all(|&nights| nights >= 1),
        "duration options must be at least one night"
    );
    ensure!(
        durations.windows(2).all(|pair| pair[0] < pair[1]),
        "duration options must be unique and ascending"
    );

    Ok(())
}

/// Check period labels, date ranges and price-point references
fn check_periods(package: &Package) -> Result<()> {
    ensure!(!package.periods.is_empty(), "package has no pricing periods");

    let mut labels = HashSet::new();
    for period in &package.periods {
        ensure!(
            labels.insert(period.label.as_str()),
            "duplicate period label {:?}",
            period.label
        );
        ensure!(
            period.kind != PeriodKind::Month || period.month().is_some(),
            "month period {:?} is not a calendar month name",
            period.label
        );
        if let (Some(start), Some(end)) = (period.start_date, period.end_date) {
            ensure!(
                start <= end,
                "period {:?} ends before it starts ({start} > {end})",
                period.label
            );
        }
        if period.kind == PeriodKind::Special && period.start_date.is_none() {
            warn!(
                "special period {:?} has no explicit dates and cannot be matched by date",
                period.label
            );
        }

        check_price_points(period, package)
            .with_context(|| format!("invalid price points in period {:?}", period.label))?;
    }

    Ok(())
}

/// Check that each price point references a real tier and duration
fn check_price_points(period: &PricingPeriod, package: &Package) -> Result<()> {
    let mut seen = HashSet::new();
    for point in &period.prices {
        ensure!(
            point.tier_index < package.tiers.len(),
            "tier index {} is out of range ({} tiers)",
            point.tier_index,
            package.tiers.len()
        );
        ensure!(
            package.duration_options.contains(&point.nights),
            "{} nights is not one of the package's duration options",
            point.nights
        );
        ensure!(
            seen.insert((point.tier_index, point.nights)),
            "duplicate price point for tier {} over {} nights",
            point.tier_index,
            point.nights
        );
        if let PriceValue::Amount(amount) = point.price {
            ensure!(
                amount.is_finite() && amount >= 0.0,
                "price {} for tier {} over {} nights is not a valid amount",
                amount,
                point.tier_index,
                point.nights
            );
            if amount == 0.0 {
                warn!(
                    "zero price retained for tier {} over {} nights in period {:?}",
                    point.tier_index, point.nights, period.label
                );
            }
        }
    }

    Ok(())
}
