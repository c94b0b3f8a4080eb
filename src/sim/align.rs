//! Alignment of the raw price and activity tables onto the run horizon.

use log::debug;
use serde::Serialize;

use crate::calendar::MonthLabel;
use crate::error::TeaError;
use crate::io::tables::{ActivityTable, PriceTable};

use super::types::{Granularity, SimConfig};

/// Source prices are in cents per kWh.
const CENTS_PER_UNIT: f64 = 100.0;

/// Price and activity vectors indexed 1:1 by step, oldest first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlignedSeries {
    /// Electricity price per step (currency per kWh).
    pub price: Vec<f64>,
    /// Activity fraction per step (0 to 1).
    pub activity: Vec<f64>,
    /// Calendar month containing each step.
    pub months: Vec<MonthLabel>,
}

impl AlignedSeries {
    /// Horizon length in steps.
    pub fn len(&self) -> usize {
        self.price.len()
    }

    /// Whether the horizon is empty.
    pub fn is_empty(&self) -> bool {
        self.price.is_empty()
    }
}

/// Aligns the configured region/sector prices and the activity profile to
/// the most recent `horizon` steps of history.
///
/// Months are put in chronological order and, at daily granularity,
/// expanded into one step per calendar day. Activity rows are taken from
/// the end of the table as-is; the table is assumed chronological.
///
/// # Errors
///
/// * `LookupError` - region/sector column absent from `prices`
/// * `InsufficientHistory` - either table is shorter than the horizon
/// * `MalformedTable` - a price needed inside the horizon is missing
pub fn align(
    prices: &PriceTable,
    activity: &ActivityTable,
    config: &SimConfig,
) -> Result<AlignedSeries, TeaError> {
    let horizon = config.horizon_steps()?;
    let mut history = prices.series(&config.region, config.sector)?;
    history.sort_by_key(|(month, _)| *month);

    let (months, cents) = expand(&history, config.granularity);
    if months.len() < horizon {
        return Err(TeaError::InsufficientHistory {
            series: "price".into(),
            requested: horizon,
            available: months.len(),
        });
    }
    if activity.len() < horizon {
        return Err(TeaError::InsufficientHistory {
            series: "activity".into(),
            requested: horizon,
            available: activity.len(),
        });
    }

    let start = months.len() - horizon;
    let months = months[start..].to_vec();
    let price = cents[start..]
        .iter()
        .zip(&months)
        .map(|(value, month)| {
            value.map(|c| c / CENTS_PER_UNIT).ok_or_else(|| {
                TeaError::malformed(
                    "price",
                    format!(
                        "no {} {} price for {month}",
                        config.region, config.sector
                    ),
                )
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    let activity = activity.hours()[activity.len() - horizon..].to_vec();

    debug!(
        "aligned {horizon} {} steps for {} ({} to {})",
        config.granularity,
        config.region,
        months[0],
        months[horizon - 1]
    );

    Ok(AlignedSeries {
        price,
        activity,
        months,
    })
}

/// One entry per step: monthly rows pass through, daily rows repeat per day.
fn expand(
    history: &[(MonthLabel, Option<f64>)],
    granularity: Granularity,
) -> (Vec<MonthLabel>, Vec<Option<f64>>) {
    let mut months = Vec::new();
    let mut values = Vec::new();
    for &(month, value) in history {
        let repeat = match granularity {
            Granularity::Daily => month.days(),
            Granularity::Monthly => 1,
        };
        months.extend(std::iter::repeat_n(month, repeat));
        values.extend(std::iter::repeat_n(value, repeat));
    }
    (months, values)
}
