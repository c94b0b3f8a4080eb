//! End-of-horizon cost totals per case.

use std::fmt;

use serde::Serialize;

use super::TeaRun;
use super::types::CostSeries;

/// Horizon totals of one case.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CaseSummary {
    /// Case label.
    pub name: String,
    /// Installation plus renewals.
    pub capital: f64,
    /// IT energy cost.
    pub it_energy: f64,
    /// Cooling energy cost.
    pub cooling_energy: f64,
    /// Maintenance cost.
    pub maintenance: f64,
    /// Sum of all categories.
    pub total: f64,
    /// Number of renewals after installation.
    pub renewals: usize,
}

impl From<&CostSeries> for CaseSummary {
    fn from(s: &CostSeries) -> Self {
        Self {
            name: s.name.clone(),
            capital: s.capital.iter().sum(),
            it_energy: s.it_energy.iter().sum(),
            cooling_energy: s.cooling_energy.iter().sum(),
            maintenance: s.maintenance.iter().sum(),
            total: s.total.iter().sum(),
            renewals: s.renewals,
        }
    }
}

/// Aggregate comparison of all cases in a run.
///
/// Computed post-hoc from the cost series so the report always agrees with
/// the exported data.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeaReport {
    /// Region the prices came from.
    pub region: String,
    /// Horizon length in steps.
    pub steps: usize,
    /// Granularity label (`"daily"` or `"monthly"`).
    pub granularity: String,
    /// Discounting label (`"future"` or `"present"`).
    pub discounting: String,
    /// Per-case totals in case order.
    pub cases: Vec<CaseSummary>,
    /// Case with the lowest total cost; the first one wins ties.
    pub cheapest: Option<String>,
}

impl TeaReport {
    /// Summarises a completed run.
    pub fn from_run(run: &TeaRun) -> Self {
        let cases: Vec<CaseSummary> = run.series.iter().map(CaseSummary::from).collect();
        let cheapest = cases
            .iter()
            .reduce(|best, c| if c.total < best.total { c } else { best })
            .map(|c| c.name.clone());
        Self {
            region: run.config.region.clone(),
            steps: run.aligned.len(),
            granularity: run.config.granularity.to_string(),
            discounting: run.config.discounting.to_string(),
            cases,
            cheapest,
        }
    }
}

impl fmt::Display for TeaReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- TEA Report ---")?;
        writeln!(f, "Region:               {}", self.region)?;
        writeln!(
            f,
            "Horizon:              {} {} steps ({} value)",
            self.steps, self.granularity, self.discounting
        )?;
        for c in &self.cases {
            writeln!(f)?;
            writeln!(f, "[{}]", c.name)?;
            writeln!(
                f,
                "Capital costs:        {:.2} ({} renewals)",
                c.capital, c.renewals
            )?;
            writeln!(f, "IT energy costs:      {:.2}", c.it_energy)?;
            writeln!(f, "Cooling costs:        {:.2}", c.cooling_energy)?;
            writeln!(f, "Maintenance costs:    {:.2}", c.maintenance)?;
            writeln!(f, "Total cost:           {:.2}", c.total)?;
        }
        if let Some(name) = &self.cheapest {
            writeln!(f)?;
            write!(f, "Lowest total cost:    {name}")?;
        }
        Ok(())
    }
}
