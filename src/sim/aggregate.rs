//! Read-only reductions of projected cost series for charting.
//!
//! Nothing here feeds back into the projection. Views are rebuilt from a
//! [`TeaRun`] on demand.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::calendar::MonthLabel;
use crate::error::TeaError;

use super::TeaRun;
use super::projector::discount_factor;
use super::types::{CostSeries, DiscountMode};

/// Running sum of `values`.
pub fn cumulative(values: &[f64]) -> Vec<f64> {
    values
        .iter()
        .scan(0.0, |acc, v| {
            *acc += v;
            Some(*acc)
        })
        .collect()
}

/// Replaces each value with the mean of its calendar month.
///
/// Steps are grouped by runs of equal consecutive `months` entries, so a
/// horizon that starts or ends mid-month averages only the steps it holds.
///
/// # Errors
///
/// Returns `InvalidParameter` if `values` and `months` differ in length.
pub fn monthly_average(values: &[f64], months: &[MonthLabel]) -> Result<Vec<f64>, TeaError> {
    if values.len() != months.len() {
        return Err(TeaError::invalid(
            "months",
            format!(
                "expected one month per value, got {} values and {} months",
                values.len(),
                months.len()
            ),
        ));
    }
    Ok(average_month_runs(values, months))
}

/// Month averaging over the common prefix of `values` and `months`.
fn average_month_runs(values: &[f64], months: &[MonthLabel]) -> Vec<f64> {
    let len = values.len().min(months.len());
    let mut out = Vec::with_capacity(len);
    let mut start = 0;
    while start < len {
        let month = months[start];
        let end = months[start..len]
            .iter()
            .position(|m| *m != month)
            .map_or(len, |offset| start + offset);
        let mean = values[start..end].iter().sum::<f64>() / (end - start) as f64;
        out.extend(std::iter::repeat_n(mean, end - start));
        start = end;
    }
    out
}

/// Cumulative cost curves of one case.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CumulativeCosts {
    /// Case label.
    pub name: String,
    /// Cumulative capital cost.
    pub capital: Vec<f64>,
    /// Cumulative IT energy cost.
    pub it_energy: Vec<f64>,
    /// Cumulative cooling energy cost.
    pub cooling_energy: Vec<f64>,
    /// Cumulative maintenance cost.
    pub maintenance: Vec<f64>,
    /// Cumulative IT plus cooling energy cost.
    pub electricity: Vec<f64>,
    /// Cumulative total cost.
    pub total: Vec<f64>,
}

impl From<&CostSeries> for CumulativeCosts {
    fn from(s: &CostSeries) -> Self {
        Self {
            name: s.name.clone(),
            capital: cumulative(&s.capital),
            it_energy: cumulative(&s.it_energy),
            cooling_energy: cumulative(&s.cooling_energy),
            maintenance: cumulative(&s.maintenance),
            electricity: cumulative(&s.electricity()),
            total: cumulative(&s.total),
        }
    }
}

/// Secondary chart shown next to the cumulative total cost.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum SecondaryView {
    /// Total cost only.
    #[default]
    None,
    /// Month-averaged electricity consumption.
    ElectricityConsumption,
    /// Cumulative IT plus cooling energy cost.
    ElectricityCosts,
    /// Cumulative cooling energy cost.
    CoolingCosts,
    /// Cumulative maintenance cost.
    MaintenanceCosts,
    /// Cumulative capital cost.
    CapitalCosts,
    /// Stacked cost decomposition per case.
    Stackplot,
    /// Stacked decomposition without the IT energy layer.
    StackplotWithoutIt,
}

impl SecondaryView {
    /// Every view, in menu order.
    pub const ALL: [SecondaryView; 8] = [
        SecondaryView::None,
        SecondaryView::ElectricityConsumption,
        SecondaryView::ElectricityCosts,
        SecondaryView::CoolingCosts,
        SecondaryView::MaintenanceCosts,
        SecondaryView::CapitalCosts,
        SecondaryView::Stackplot,
        SecondaryView::StackplotWithoutIt,
    ];

    /// Menu label.
    pub fn label(&self) -> &'static str {
        match self {
            SecondaryView::None => "None",
            SecondaryView::ElectricityConsumption => "Electricity consumption",
            SecondaryView::ElectricityCosts => "Electricity costs",
            SecondaryView::CoolingCosts => "Cooling costs",
            SecondaryView::MaintenanceCosts => "Maintenance costs",
            SecondaryView::CapitalCosts => "Capital costs",
            SecondaryView::Stackplot => "Stackplot",
            SecondaryView::StackplotWithoutIt => "Stackplot without IT",
        }
    }

    /// Whether this view replaces the line charts with stacks.
    pub fn is_stack(&self) -> bool {
        matches!(
            self,
            SecondaryView::Stackplot | SecondaryView::StackplotWithoutIt
        )
    }

    /// Short machine name (`"cooling-costs"`), usable in file names and URLs.
    pub fn slug(&self) -> String {
        self.label().to_ascii_lowercase().replace(' ', "-")
    }
}

impl fmt::Display for SecondaryView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for SecondaryView {
    type Err = TeaError;

    /// Accepts the menu label or its slug, ignoring case and `-`/`_`/space.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let norm = |t: &str| {
            t.chars()
                .filter(|c| !matches!(*c, ' ' | '-' | '_'))
                .collect::<String>()
                .to_ascii_lowercase()
        };
        let wanted = norm(s);
        SecondaryView::ALL
            .into_iter()
            .find(|v| norm(v.label()) == wanted)
            .ok_or_else(|| {
                TeaError::invalid(
                    "output.view",
                    format!(
                        "unknown view \"{s}\", expected one of: {}",
                        SecondaryView::ALL.map(|v| v.label()).join(", ")
                    ),
                )
            })
    }
}

impl TryFrom<String> for SecondaryView {
    type Error = TeaError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SecondaryView> for String {
    fn from(value: SecondaryView) -> Self {
        value.label().to_string()
    }
}

/// A labelled curve over the time axis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NamedSeries {
    /// Legend label.
    pub label: String,
    /// One value per step.
    pub values: Vec<f64>,
}

impl NamedSeries {
    fn new(label: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            label: label.into(),
            values,
        }
    }
}

/// Cumulative cost layers of one case, bottom layer first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stack {
    /// Case label.
    pub case: String,
    /// Layers in drawing order.
    pub layers: Vec<NamedSeries>,
}

/// Everything a chart front-end needs for one view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartData {
    /// Selected view.
    pub view: SecondaryView,
    /// Step positions in years.
    pub time_years: Vec<f64>,
    /// Nominal electricity price per step.
    pub price: Vec<f64>,
    /// Price corrected to present value (present-value runs only).
    pub price_present_value: Option<Vec<f64>>,
    /// Cumulative total cost per case.
    pub totals: Vec<NamedSeries>,
    /// Per-case curves for line views; empty for `None` and stack views.
    pub secondary: Vec<NamedSeries>,
    /// Per-case decompositions for stack views.
    pub stacks: Vec<Stack>,
    /// Shared y-axis ceiling for stack views.
    pub stack_max: Option<f64>,
}

impl ChartData {
    /// Builds the chart series for `view` from a completed run.
    pub fn build(run: &TeaRun, view: SecondaryView) -> Self {
        let steps_per_year = run.config.granularity.steps_per_year();
        let horizon = run.aligned.len();
        let time_years = (0..horizon)
            .map(|i| i as f64 / steps_per_year as f64)
            .collect();

        let price = run.aligned.price.clone();
        let price_present_value = match run.config.discounting {
            DiscountMode::Present => {
                let rate = run.config.effective_annual_rate();
                Some(
                    price
                        .iter()
                        .enumerate()
                        .map(|(i, p)| p * discount_factor(rate, steps_per_year, i))
                        .collect(),
                )
            }
            DiscountMode::Future => None,
        };

        let cumulative: Vec<CumulativeCosts> =
            run.series.iter().map(CumulativeCosts::from).collect();
        let totals = cumulative
            .iter()
            .map(|c| NamedSeries::new(c.name.clone(), c.total.clone()))
            .collect();

        let secondary = match view {
            SecondaryView::ElectricityConsumption => run
                .series
                .iter()
                .map(|s| {
                    NamedSeries::new(
                        format!("{} - Electricity", s.name),
                        average_month_runs(&s.consumption, &run.aligned.months),
                    )
                })
                .collect(),
            SecondaryView::ElectricityCosts => line_view(&cumulative, "Electricity", |c| {
                c.electricity.clone()
            }),
            SecondaryView::CoolingCosts => {
                line_view(&cumulative, "Cooling", |c| c.cooling_energy.clone())
            }
            SecondaryView::MaintenanceCosts => {
                line_view(&cumulative, "Maintenance", |c| c.maintenance.clone())
            }
            SecondaryView::CapitalCosts => {
                line_view(&cumulative, "Capex", |c| c.capital.clone())
            }
            SecondaryView::None | SecondaryView::Stackplot | SecondaryView::StackplotWithoutIt => {
                Vec::new()
            }
        };

        let (stacks, stack_max) = if view.is_stack() {
            let with_it = view == SecondaryView::Stackplot;
            let stacks: Vec<Stack> = cumulative.iter().map(|c| stack(c, with_it)).collect();
            let max = run
                .series
                .iter()
                .map(|s| {
                    let totals: Vec<f64> = if with_it {
                        s.total.clone()
                    } else {
                        s.total.iter().zip(&s.it_energy).map(|(t, it)| t - it).collect()
                    };
                    cumulative_max(&totals)
                })
                .fold(0.0_f64, f64::max);
            (stacks, Some(max))
        } else {
            (Vec::new(), None)
        };

        Self {
            view,
            time_years,
            price,
            price_present_value,
            totals,
            secondary,
            stacks,
            stack_max,
        }
    }
}

fn line_view(
    cumulative: &[CumulativeCosts],
    suffix: &str,
    pick: impl Fn(&CumulativeCosts) -> Vec<f64>,
) -> Vec<NamedSeries> {
    cumulative
        .iter()
        .map(|c| NamedSeries::new(format!("{} - {suffix}", c.name), pick(c)))
        .collect()
}

fn stack(c: &CumulativeCosts, with_it: bool) -> Stack {
    let mut layers = Vec::with_capacity(4);
    if with_it {
        layers.push(NamedSeries::new("IT", c.it_energy.clone()));
    }
    layers.push(NamedSeries::new("Cooling", c.cooling_energy.clone()));
    layers.push(NamedSeries::new("Maintenance", c.maintenance.clone()));
    layers.push(NamedSeries::new("Capital costs", c.capital.clone()));
    Stack {
        case: c.name.clone(),
        layers,
    }
}

fn cumulative_max(values: &[f64]) -> f64 {
    cumulative(values).into_iter().fold(0.0, f64::max)
}
