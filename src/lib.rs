//! Common functionality for the ratesheet pricing tools.
#![warn(missing_docs)]
pub mod classify;
pub mod inclusions;
pub mod log;
pub mod matrix;
pub mod month;
pub mod package;
pub mod quote;
pub mod settings;

#[cfg(test)]
mod fixture;
