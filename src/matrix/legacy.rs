//! Axis derivation for the legacy two-row sheet format.
//!
//! Older sheets carry no explicit matrix axes: a people row ("2 people", "12+") sits
//! above a pricing header row ("3 nights", "7 nights"). The slicer hands both rows
//! over and the nights options plus a binary pax split (up to 11 versus 12 and more)
//! are derived here before the data is fed through the matrix form.
use crate::classify::detect_nights_pax;
use anyhow::{Result, ensure};
use indexmap::IndexSet;
use itertools::Itertools;
use regex::Regex;
use std::sync::LazyLock;

/// Largest group size of the small legacy pax band
pub const SMALL_GROUP_MAX: u32 = 11;
/// Representative size of the open-ended large legacy pax band
pub const LARGE_GROUP_MIN: u32 = 12;

static NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d{1,3}").unwrap());

/// Matrix axes recovered from the legacy row pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyAxes {
    /// Stay lengths found in the pricing header row, ascending
    pub nights_options: Vec<u32>,
    /// Pax bands found in the people row: 11 stands for "up to 11", 12 for "12+"
    pub pax_options: Vec<u32>,
}

/// Derive matrix axes from a legacy people row and pricing header row.
///
/// Nights come from the header cells via the usual duration patterns; group sizes in
/// the people row are bucketed into the two legacy bands. Rows that yield no nights or
/// no group sizes are errors, since the matrix form cannot be built without both axes.
pub fn derive_legacy_axes(
    people_row: &[String],
    pricing_header_row: &[String],
) -> Result<LegacyAxes> {
    let nights_options: IndexSet<u32> = pricing_header_row
        .iter()
        .filter_map(|cell| detect_nights_pax(cell)?.nights)
        .collect();
    ensure!(
        !nights_options.is_empty(),
        "no night counts found in the pricing header row"
    );

    let group_sizes: Vec<u32> = people_row
        .iter()
        .flat_map(|cell| {
            NUMBER_RE
                .find_iter(cell)
                .filter_map(|m| m.as_str().parse().ok())
                .collect_vec()
        })
        .collect();
    ensure!(
        !group_sizes.is_empty(),
        "no group sizes found in the people row"
    );

    let mut pax_options = Vec::new();
    if group_sizes.iter().any(|&size| size <= SMALL_GROUP_MAX) {
        pax_options.push(SMALL_GROUP_MAX);
    }
    if group_sizes.iter().any(|&size| size >= LARGE_GROUP_MIN) {
        pax_options.push(LARGE_GROUP_MIN);
    }

    Ok(LegacyAxes {
        nights_options: nights_options.into_iter().sorted().collect(),
        pax_options,
    })
}
