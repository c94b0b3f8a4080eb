//! Core run types: simulation settings, per-case parameters, cost series.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TeaError;
use crate::io::tables::Sector;

/// Length of one simulation step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    /// One step per calendar day.
    Daily,
    /// One step per calendar month.
    #[default]
    Monthly,
}

impl Granularity {
    /// Nominal steps per year, used for compounding and lifetimes.
    pub fn steps_per_year(&self) -> usize {
        match self {
            Granularity::Daily => 365,
            Granularity::Monthly => 12,
        }
    }

    /// Steps covering `years`, rounded half to even.
    ///
    /// Daily horizons use 365.25 days per year so that leap days are covered.
    pub fn horizon_steps(&self, years: f64) -> f64 {
        let per_year = match self {
            Granularity::Daily => 365.25,
            Granularity::Monthly => 12.0,
        };
        (per_year * years).round_ties_even()
    }

    /// Electricity-consumption formula historically used at this granularity.
    pub fn consumption_formula(&self) -> ConsumptionFormula {
        match self {
            Granularity::Daily => ConsumptionFormula::BackComputed,
            Granularity::Monthly => ConsumptionFormula::Direct,
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Granularity::Daily => "daily",
            Granularity::Monthly => "monthly",
        })
    }
}

impl FromStr for Granularity {
    type Err = TeaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "daily" => Ok(Granularity::Daily),
            "monthly" => Ok(Granularity::Monthly),
            other => Err(TeaError::invalid(
                "simulation.granularity",
                format!("must be \"daily\" or \"monthly\", got \"{other}\""),
            )),
        }
    }
}

/// How future cash flows are expressed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscountMode {
    /// Nominal future currency. The interest rate is ignored.
    #[default]
    Future,
    /// Present value, discounted at the configured interest rate.
    Present,
}

impl fmt::Display for DiscountMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DiscountMode::Future => "future",
            DiscountMode::Present => "present",
        })
    }
}

impl FromStr for DiscountMode {
    type Err = TeaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "future" => Ok(DiscountMode::Future),
            "present" => Ok(DiscountMode::Present),
            other => Err(TeaError::invalid(
                "simulation.discounting",
                format!("must be \"future\" or \"present\", got \"{other}\""),
            )),
        }
    }
}

/// How the per-step electricity consumption series is derived.
///
/// The two forms disagree once discounting is active, because the
/// back-computed form divides a discounted cost by an undiscounted price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsumptionFormula {
    /// `(IT cost + cooling cost) / price`.
    BackComputed,
    /// `PUE × IT load × activity`.
    Direct,
}

/// Immutable settings for one run.
///
/// # Examples
///
/// ```
/// use dc_tea::sim::types::{DiscountMode, Granularity, SimConfig};
///
/// let cfg = SimConfig::new(2.0, Granularity::Daily, "California");
/// assert_eq!(cfg.horizon_steps(), Ok(730));
/// assert_eq!(cfg.discounting, DiscountMode::Future);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimConfig {
    /// Simulated horizon in years.
    pub horizon_years: f64,
    /// Step length.
    pub granularity: Granularity,
    /// Region name as it appears in the price table.
    pub region: String,
    /// Price-table sector.
    pub sector: Sector,
    /// Nominal or present-value accounting.
    pub discounting: DiscountMode,
    /// Annual interest rate in percent.
    pub interest_rate_pct: f64,
}

impl SimConfig {
    /// Creates a configuration with nominal accounting, industrial prices
    /// and no interest.
    pub fn new(horizon_years: f64, granularity: Granularity, region: impl Into<String>) -> Self {
        Self {
            horizon_years,
            granularity,
            region: region.into(),
            sector: Sector::default(),
            discounting: DiscountMode::default(),
            interest_rate_pct: 0.0,
        }
    }

    /// Horizon length in steps.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` if the horizon is not finite or rounds to
    /// zero steps.
    pub fn horizon_steps(&self) -> Result<usize, TeaError> {
        if !self.horizon_years.is_finite() || self.horizon_years <= 0.0 {
            return Err(TeaError::invalid(
                "simulation.horizon_years",
                format!("must be a positive number, got {}", self.horizon_years),
            ));
        }
        let steps = self.granularity.horizon_steps(self.horizon_years);
        if steps < 1.0 {
            return Err(TeaError::invalid(
                "simulation.horizon_years",
                format!(
                    "{} years is shorter than one {} step",
                    self.horizon_years, self.granularity
                ),
            ));
        }
        Ok(steps as usize)
    }

    /// Annual rate (as a fraction) that enters the discount factor.
    ///
    /// Nominal accounting always yields zero, whatever rate was entered.
    pub fn effective_annual_rate(&self) -> f64 {
        match self.discounting {
            DiscountMode::Future => 0.0,
            DiscountMode::Present => self.interest_rate_pct / 100.0,
        }
    }
}

/// Rack fleet shared by every case.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DataCenter {
    /// Number of racks.
    pub racks: u32,
    /// Power draw per rack (kW).
    pub rack_power_kw: f64,
}

impl DataCenter {
    /// Total IT load (kW).
    pub fn it_load_kw(&self) -> f64 {
        f64::from(self.racks) * self.rack_power_kw
    }
}

/// Financial and efficiency parameters of one cooling case.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CaseParameters {
    /// Display label.
    pub name: String,
    /// Power usage effectiveness (>= 1).
    pub pue: f64,
    /// Asset lifetime (years).
    pub lifetime_years: f64,
    /// Up-front installation cost.
    pub installation_cost: f64,
    /// Cost of each renewal at end of life.
    pub renewal_cost: f64,
    /// Yearly maintenance as a fraction of installation cost.
    pub maintenance_rate: f64,
}

impl CaseParameters {
    /// Zips parallel per-case lists into cases.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` if there are no cases or the lists differ
    /// in length.
    pub fn from_lists(
        names: &[String],
        pue: &[f64],
        lifetime_years: &[f64],
        installation_cost: &[f64],
        renewal_cost: &[f64],
        maintenance_rate: &[f64],
    ) -> Result<Vec<Self>, TeaError> {
        let n = names.len();
        if n == 0 {
            return Err(TeaError::invalid("cases.names", "at least one case is required"));
        }
        let lengths = [
            ("cases.pue", pue.len()),
            ("cases.lifetime_years", lifetime_years.len()),
            ("cases.installation_cost", installation_cost.len()),
            ("cases.renewal_cost", renewal_cost.len()),
            ("cases.maintenance_rate", maintenance_rate.len()),
        ];
        for (field, len) in lengths {
            if len != n {
                return Err(TeaError::invalid(
                    field,
                    format!("has {len} entries but cases.names has {n}"),
                ));
            }
        }

        Ok((0..n)
            .map(|i| Self {
                name: names[i].clone(),
                pue: pue[i],
                lifetime_years: lifetime_years[i],
                installation_cost: installation_cost[i],
                renewal_cost: renewal_cost[i],
                maintenance_rate: maintenance_rate[i],
            })
            .collect())
    }

    /// Lifetime expressed in whole steps (truncated).
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` if the lifetime is shorter than one step.
    pub fn lifetime_steps(&self, granularity: Granularity) -> Result<usize, TeaError> {
        let steps = self.lifetime_years * granularity.steps_per_year() as f64;
        if !steps.is_finite() || steps < 1.0 {
            return Err(TeaError::invalid(
                format!("cases.lifetime_years ({})", self.name),
                format!(
                    "must cover at least one {granularity} step, got {} years",
                    self.lifetime_years
                ),
            ));
        }
        Ok(steps.trunc() as usize)
    }

    /// Checks value ranges, returning every violation found.
    pub fn validate(&self, index: usize) -> Vec<TeaError> {
        let mut errors = Vec::new();
        let field = |name: &str| format!("cases.{name}[{index}]");

        if self.name.trim().is_empty() {
            errors.push(TeaError::invalid(field("names"), "must not be empty"));
        }
        if !self.pue.is_finite() || self.pue < 1.0 {
            errors.push(TeaError::invalid(
                field("pue"),
                format!("must be >= 1, got {}", self.pue),
            ));
        }
        if !self.lifetime_years.is_finite() || self.lifetime_years <= 0.0 {
            errors.push(TeaError::invalid(
                field("lifetime_years"),
                format!("must be > 0, got {}", self.lifetime_years),
            ));
        }
        for (name, value) in [
            ("installation_cost", self.installation_cost),
            ("renewal_cost", self.renewal_cost),
            ("maintenance_rate", self.maintenance_rate),
        ] {
            if !value.is_finite() || value < 0.0 {
                errors.push(TeaError::invalid(
                    field(name),
                    format!("must be a non-negative number, got {value}"),
                ));
            }
        }
        errors
    }
}

/// Per-step cost breakdown of one case.
///
/// All vectors share the horizon length. Derived once per run and never
/// mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CostSeries {
    /// Case label.
    pub name: String,
    /// Installation at step 0 plus renewals.
    pub capital: Vec<f64>,
    /// Energy cost of the IT load.
    pub it_energy: Vec<f64>,
    /// Energy cost of cooling overhead.
    pub cooling_energy: Vec<f64>,
    /// Maintenance cost.
    pub maintenance: Vec<f64>,
    /// Sum of the four categories above.
    pub total: Vec<f64>,
    /// Facility electricity consumption per step (kW × activity units).
    pub consumption: Vec<f64>,
    /// Lifetime boundaries crossed after installation, whatever the renewal
    /// cost.
    pub renewals: usize,
}

impl CostSeries {
    /// Number of steps.
    pub fn len(&self) -> usize {
        self.total.len()
    }

    /// Whether the series is empty.
    pub fn is_empty(&self) -> bool {
        self.total.is_empty()
    }

    /// IT plus cooling energy cost per step.
    pub fn electricity(&self) -> Vec<f64> {
        self.it_energy
            .iter()
            .zip(&self.cooling_energy)
            .map(|(it, cooling)| it + cooling)
            .collect()
    }
}
