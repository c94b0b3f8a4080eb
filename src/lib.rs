//! Techno-economic analysis of data-center cooling options.
//!
//! Aligns retail electricity prices and a rack-activity profile to a
//! simulation horizon, projects per-step capital, energy, cooling, and
//! maintenance costs for each cooling case, and derives the cumulative and
//! month-averaged views used for charting.

#[cfg(feature = "api")]
pub mod api;
pub mod calendar;
pub mod cli;
pub mod config;
pub mod error;
/// Input tables and CSV export.
pub mod io;
/// Alignment, cost projection, and aggregation.
pub mod sim;

#[cfg(test)]
mod fixture;
