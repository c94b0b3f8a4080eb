//! TOML-based scenario configuration and preset definitions.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::TeaError;
use crate::io::tables::{ActivityTable, DEFAULT_PRICE_HEADER_ROWS, PriceTable, Sector};
use crate::sim::RunInputs;
use crate::sim::aggregate::SecondaryView;
use crate::sim::types::{
    CaseParameters, ConsumptionFormula, DataCenter, DiscountMode, Granularity, SimConfig,
};

/// Top-level scenario configuration parsed from TOML.
///
/// All fields have defaults matching the monthly scenario. Load from TOML
/// with [`ScenarioConfig::from_toml_file`] or use
/// [`ScenarioConfig::monthly`] for the built-in default.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioConfig {
    /// Horizon, price selection, and discounting.
    #[serde(default)]
    pub simulation: SimulationConfig,
    /// Rack fleet.
    #[serde(default)]
    pub datacenter: DataCenterConfig,
    /// Cooling cases as parallel lists.
    #[serde(default)]
    pub cases: CasesConfig,
    /// Input table locations.
    #[serde(default)]
    pub data: DataConfig,
    /// Chart view and logging.
    #[serde(default)]
    pub output: OutputConfig,
}

/// Horizon, price selection, and discounting.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// Simulated horizon in years (must be > 0).
    pub horizon_years: f64,
    /// `"daily"` or `"monthly"`.
    pub granularity: Granularity,
    /// Region as named in the price table.
    pub region: String,
    /// Price-table sector.
    pub sector: Sector,
    /// `"future"` (nominal) or `"present"` (discounted).
    pub discounting: DiscountMode,
    /// Annual interest rate in percent.
    pub interest_rate_pct: f64,
    /// Overrides the consumption formula implied by the granularity.
    pub consumption: Option<ConsumptionFormula>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            horizon_years: 20.0,
            granularity: Granularity::Monthly,
            region: "California".to_string(),
            sector: Sector::Industrial,
            discounting: DiscountMode::Future,
            interest_rate_pct: 7.0,
            consumption: None,
        }
    }
}

/// Rack fleet.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DataCenterConfig {
    /// Number of racks.
    pub racks: u32,
    /// Power per rack (kW).
    pub rack_power_kw: f64,
}

impl Default for DataCenterConfig {
    fn default() -> Self {
        Self {
            racks: 42,
            rack_power_kw: 10.0,
        }
    }
}

/// Cooling cases given as index-aligned lists.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CasesConfig {
    /// Case labels.
    pub names: Vec<String>,
    /// Power usage effectiveness per case (>= 1).
    pub pue: Vec<f64>,
    /// Asset lifetime per case (years).
    pub lifetime_years: Vec<f64>,
    /// Installation cost per case.
    pub installation_cost: Vec<f64>,
    /// Renewal cost per case.
    pub renewal_cost: Vec<f64>,
    /// Yearly maintenance fraction of installation cost per case.
    pub maintenance_rate: Vec<f64>,
}

impl Default for CasesConfig {
    fn default() -> Self {
        Self {
            names: vec!["Evaporative".to_string(), "Classic".to_string()],
            pue: vec![1.02, 1.2],
            lifetime_years: vec![11.0, 15.0],
            installation_cost: vec![48700.0, 43200.0],
            renewal_cost: vec![28288.0, 24343.0],
            maintenance_rate: vec![0.15, 0.19],
        }
    }
}

impl CasesConfig {
    /// Zips the lists into case parameters.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` if the lists are empty or differ in length.
    pub fn to_cases(&self) -> Result<Vec<CaseParameters>, TeaError> {
        CaseParameters::from_lists(
            &self.names,
            &self.pue,
            &self.lifetime_years,
            &self.installation_cost,
            &self.renewal_cost,
            &self.maintenance_rate,
        )
    }
}

/// Input table locations.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DataConfig {
    /// Monthly price table (EIA layout).
    pub prices: PathBuf,
    /// Banner lines above the price-table header.
    pub price_header_rows: usize,
    /// Activity profile with an `hours` column, one row per step. When
    /// unset, the bundled table matching the granularity is used.
    pub activity: Option<PathBuf>,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            prices: PathBuf::from("data/Average_retail_price_of_electricity_monthly.csv"),
            price_header_rows: DEFAULT_PRICE_HEADER_ROWS,
            activity: None,
        }
    }
}

impl DataConfig {
    /// Bundled activity table with one row per `granularity` step.
    pub fn default_activity_path(granularity: Granularity) -> PathBuf {
        match granularity {
            Granularity::Daily => PathBuf::from("data/Activity_hours_daily.csv"),
            Granularity::Monthly => PathBuf::from("data/Activity_hours_monthly.csv"),
        }
    }

    /// Activity table read for a run at `granularity`.
    pub fn activity_path(&self, granularity: Granularity) -> PathBuf {
        self.activity
            .clone()
            .unwrap_or_else(|| Self::default_activity_path(granularity))
    }

    /// Loads both tables for a run at `granularity`. Relative paths resolve
    /// against the working directory.
    ///
    /// # Errors
    ///
    /// Propagates table loading errors.
    pub fn load(&self, granularity: Granularity) -> Result<(PriceTable, ActivityTable), TeaError> {
        let prices = PriceTable::from_csv_file(&self.prices, self.price_header_rows)?;
        let activity = ActivityTable::from_csv_file(&self.activity_path(granularity))?;
        Ok((prices, activity))
    }
}

/// Chart view and logging.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// Secondary chart view.
    pub view: SecondaryView,
    /// Log filter passed to `env_logger` (e.g. `"info"`, `"dc_tea=debug"`).
    pub log_level: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            view: SecondaryView::None,
            log_level: "info".to_string(),
        }
    }
}

impl ScenarioConfig {
    /// Returns the monthly scenario: 20 years of month steps.
    pub fn monthly() -> Self {
        Self {
            simulation: SimulationConfig::default(),
            datacenter: DataCenterConfig::default(),
            cases: CasesConfig::default(),
            data: DataConfig::default(),
            output: OutputConfig::default(),
        }
    }

    /// Returns the daily scenario: same plant, one step per calendar day,
    /// reading the daily activity table.
    pub fn daily() -> Self {
        Self {
            simulation: SimulationConfig {
                granularity: Granularity::Daily,
                ..SimulationConfig::default()
            },
            ..Self::monthly()
        }
    }

    /// Available preset names.
    pub const PRESETS: &[&str] = &["monthly", "daily"];

    /// Loads a scenario from a named preset.
    ///
    /// # Errors
    ///
    /// Returns `LookupError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, TeaError> {
        match name {
            "monthly" => Ok(Self::monthly()),
            "daily" => Ok(Self::daily()),
            _ => Err(TeaError::LookupError {
                kind: "preset".to_string(),
                key: name.to_string(),
                available: Self::PRESETS.iter().map(|p| p.to_string()).collect(),
            }),
        }
    }

    /// Parses a scenario from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns `Input` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, TeaError> {
        let content = fs::read_to_string(path).map_err(|e| TeaError::Input {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_toml_str(&content).map_err(|e| match e {
            TeaError::Input { message, .. } => TeaError::Input {
                path: path.display().to_string(),
                message,
            },
            other => other,
        })
    }

    /// Parses a scenario from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns `Input` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, TeaError> {
        toml::from_str(s).map_err(|e: toml::de::Error| TeaError::Input {
            path: "<toml>".to_string(),
            message: e.to_string(),
        })
    }

    /// Builds the run inputs described by this scenario.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` if the case lists are mismatched.
    pub fn run_inputs(&self) -> Result<RunInputs, TeaError> {
        let s = &self.simulation;
        Ok(RunInputs {
            config: SimConfig {
                horizon_years: s.horizon_years,
                granularity: s.granularity,
                region: s.region.clone(),
                sector: s.sector,
                discounting: s.discounting,
                interest_rate_pct: s.interest_rate_pct,
            },
            datacenter: DataCenter {
                racks: self.datacenter.racks,
                rack_power_kw: self.datacenter.rack_power_kw,
            },
            cases: self.cases.to_cases()?,
            consumption: self.simulation.consumption,
        })
    }

    /// Consumption formula for this scenario, honouring the override.
    pub fn consumption_formula(&self) -> ConsumptionFormula {
        self.simulation
            .consumption
            .unwrap_or_else(|| self.simulation.granularity.consumption_formula())
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if configuration is valid.
    pub fn validate(&self) -> Vec<TeaError> {
        let mut errors = Vec::new();

        if self.data.prices.as_os_str().is_empty() {
            errors.push(TeaError::invalid("data.prices", "must not be empty"));
        }
        if self
            .data
            .activity
            .as_ref()
            .is_some_and(|p| p.as_os_str().is_empty())
        {
            errors.push(TeaError::invalid("data.activity", "must not be empty"));
        }
        if self.output.log_level.trim().is_empty() {
            errors.push(TeaError::invalid("output.log_level", "must not be empty"));
        }

        match self.run_inputs() {
            Ok(inputs) => errors.extend(inputs.validate()),
            Err(e) => errors.push(e),
        }
        errors
    }
}

/// Parses a comma-separated list of numbers such as `"1.02, 1.2"`.
///
/// Empty items are ignored, so a trailing comma is accepted.
///
/// # Errors
///
/// Returns `InvalidParameter` naming `field` for the first item that is not
/// a number.
pub fn parse_list(field: &str, text: &str) -> Result<Vec<f64>, TeaError> {
    split_list(text)
        .map(|item| {
            item.parse::<f64>().map_err(|_| {
                TeaError::invalid(field, format!("\"{item}\" is not a number"))
            })
        })
        .collect()
}

/// Splits a comma-separated list of names, trimming each item.
pub fn parse_names(text: &str) -> Vec<String> {
    split_list(text).map(str::to_string).collect()
}

fn split_list(text: &str) -> impl Iterator<Item = &str> {
    text.split(',').map(str::trim).filter(|item| !item.is_empty())
}
