//! The command line interface.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use log::{info, warn};

use crate::config::{ScenarioConfig, parse_list, parse_names};
use crate::io::export::{default_export_path, export_chart_csv, export_csv};
use crate::io::tables::Sector;
use crate::sim::aggregate::{ChartData, SecondaryView};
use crate::sim::report::TeaReport;
use crate::sim::types::{DiscountMode, Granularity};
use crate::sim::{TeaRun, run};

/// Techno-economic comparison of data-center cooling options.
///
/// Loads a scenario (TOML file or built-in preset), applies any overrides
/// given on the command line, and prints a cost report per cooling case.
#[derive(Parser, Debug)]
#[command(name = "dc-tea", version, about)]
pub struct Cli {
    /// Scenario TOML file
    #[arg(long, value_name = "PATH", conflicts_with = "preset")]
    pub scenario: Option<PathBuf>,
    /// Built-in preset (`monthly` or `daily`); `monthly` if neither this nor
    /// `--scenario` is given
    #[arg(long, value_name = "NAME")]
    pub preset: Option<String>,

    /// Price table CSV
    #[arg(long, value_name = "PATH")]
    pub prices: Option<PathBuf>,
    /// Banner lines above the price-table header
    #[arg(long, value_name = "N")]
    pub price_header_rows: Option<usize>,
    /// Activity table CSV
    #[arg(long, value_name = "PATH")]
    pub activity: Option<PathBuf>,

    /// Horizon in years
    #[arg(long)]
    pub years: Option<f64>,
    /// Step length: daily or monthly
    #[arg(long)]
    pub granularity: Option<Granularity>,
    /// Price-table region
    #[arg(long)]
    pub region: Option<String>,
    /// Price-table sector
    #[arg(long)]
    pub sector: Option<Sector>,
    /// future (nominal) or present (discounted)
    #[arg(long)]
    pub discounting: Option<DiscountMode>,
    /// Annual interest rate in percent
    #[arg(long, value_name = "PCT")]
    pub interest_rate: Option<f64>,
    /// Number of racks
    #[arg(long)]
    pub racks: Option<u32>,
    /// Power per rack in kW
    #[arg(long, value_name = "KW")]
    pub rack_power: Option<f64>,

    /// Case names, comma separated
    #[arg(long, value_name = "LIST")]
    pub names: Option<String>,
    /// PUE per case, comma separated
    #[arg(long, value_name = "LIST")]
    pub pue: Option<String>,
    /// Lifetime in years per case, comma separated
    #[arg(long, value_name = "LIST")]
    pub lifetime: Option<String>,
    /// Installation cost per case, comma separated
    #[arg(long, value_name = "LIST")]
    pub installation_cost: Option<String>,
    /// Renewal cost per case, comma separated
    #[arg(long, value_name = "LIST")]
    pub renewal_cost: Option<String>,
    /// Yearly maintenance fraction per case, comma separated
    #[arg(long, value_name = "LIST")]
    pub maintenance_rate: Option<String>,

    /// Secondary chart view written by `--chart-out`
    #[arg(long)]
    pub view: Option<SecondaryView>,
    /// Write the per-step cost table; defaults to `tea_for_<region>.csv`
    #[arg(long, value_name = "PATH", num_args = 0..=1)]
    pub export: Option<Option<PathBuf>>,
    /// Write the selected chart view as CSV
    #[arg(long, value_name = "PATH")]
    pub chart_out: Option<PathBuf>,
    /// Log filter, e.g. `info` or `dc_tea=debug`
    #[arg(long, value_name = "FILTER")]
    pub log_level: Option<String>,

    /// Serve the results over HTTP after the run
    #[cfg(feature = "api")]
    #[arg(long)]
    pub serve: bool,
    /// Port for `--serve`
    #[cfg(feature = "api")]
    #[arg(long, default_value_t = 3000)]
    pub port: u16,
}

impl Cli {
    /// Loads the selected scenario: `--scenario`, else `--preset`, else
    /// the monthly preset.
    ///
    /// # Errors
    ///
    /// Returns an error if the file or preset cannot be loaded.
    pub fn load_scenario(&self) -> Result<ScenarioConfig> {
        if let Some(path) = &self.scenario {
            ScenarioConfig::from_toml_file(path)
                .with_context(|| format!("Failed to load scenario {}", path.display()))
        } else {
            let name = self.preset.as_deref().unwrap_or("monthly");
            ScenarioConfig::from_preset(name).context("Failed to load preset")
        }
    }

    /// Applies command-line overrides on top of `cfg`.
    ///
    /// # Errors
    ///
    /// Returns an error if a comma-separated list contains a non-number.
    pub fn apply_overrides(&self, cfg: &mut ScenarioConfig) -> Result<()> {
        let data = &mut cfg.data;
        if let Some(p) = &self.prices {
            data.prices.clone_from(p);
        }
        if let Some(n) = self.price_header_rows {
            data.price_header_rows = n;
        }
        if let Some(p) = &self.activity {
            data.activity = Some(p.clone());
        }

        let s = &mut cfg.simulation;
        if let Some(y) = self.years {
            s.horizon_years = y;
        }
        if let Some(g) = self.granularity {
            s.granularity = g;
        }
        if let Some(r) = &self.region {
            s.region.clone_from(r);
        }
        if let Some(sector) = self.sector {
            s.sector = sector;
        }
        if let Some(d) = self.discounting {
            s.discounting = d;
        }
        if let Some(r) = self.interest_rate {
            s.interest_rate_pct = r;
        }

        if let Some(n) = self.racks {
            cfg.datacenter.racks = n;
        }
        if let Some(kw) = self.rack_power {
            cfg.datacenter.rack_power_kw = kw;
        }

        let cases = &mut cfg.cases;
        if let Some(text) = &self.names {
            cases.names = parse_names(text);
        }
        for (text, field, target) in [
            (&self.pue, "cases.pue", &mut cases.pue),
            (&self.lifetime, "cases.lifetime_years", &mut cases.lifetime_years),
            (
                &self.installation_cost,
                "cases.installation_cost",
                &mut cases.installation_cost,
            ),
            (&self.renewal_cost, "cases.renewal_cost", &mut cases.renewal_cost),
            (
                &self.maintenance_rate,
                "cases.maintenance_rate",
                &mut cases.maintenance_rate,
            ),
        ] {
            if let Some(text) = text {
                *target = parse_list(field, text)?;
            }
        }

        if let Some(v) = self.view {
            cfg.output.view = v;
        }
        if let Some(level) = &self.log_level {
            cfg.output.log_level.clone_from(level);
        }
        Ok(())
    }
}

/// Parse CLI arguments and run the analysis
pub fn run_cli() -> Result<()> {
    let cli = Cli::parse();

    let mut scenario = cli.load_scenario()?;
    cli.apply_overrides(&mut scenario)?;
    init_logger(&scenario.output.log_level);

    let errors = scenario.validate();
    if !errors.is_empty() {
        let lines: Vec<String> = errors.iter().map(ToString::to_string).collect();
        bail!("Invalid scenario:\n  {}", lines.join("\n  "));
    }

    let (prices, activity) = scenario
        .data
        .load(scenario.simulation.granularity)
        .context("Failed to load input tables")?;
    let inputs = scenario.run_inputs()?;
    let tea = run(inputs, &prices, &activity).context("TEA run failed")?;

    println!("{}", TeaReport::from_run(&tea));

    write_outputs(&cli, &scenario, &tea)?;

    #[cfg(feature = "api")]
    if cli.serve {
        serve(tea, cli.port)?;
    }

    Ok(())
}

fn init_logger(filter: &str) {
    let env = env_logger::Env::default().default_filter_or(filter);
    if env_logger::Builder::from_env(env).try_init().is_err() {
        warn!("Logger already initialised");
    }
}

fn write_outputs(cli: &Cli, scenario: &ScenarioConfig, tea: &TeaRun) -> Result<()> {
    if let Some(path) = &cli.export {
        let path = path
            .clone()
            .unwrap_or_else(|| default_export_path(&tea.config.region));
        export_csv(tea, &path)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        info!("Cost table written to {}", path.display());
    }

    if let Some(path) = &cli.chart_out {
        let chart = ChartData::build(tea, scenario.output.view);
        export_chart_csv(&chart, path)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        info!("{} chart written to {}", scenario.output.view, path.display());
    }
    Ok(())
}

#[cfg(feature = "api")]
fn serve(tea: TeaRun, port: u16) -> Result<()> {
    use std::net::SocketAddr;
    use std::sync::Arc;

    use crate::api::{self, AppState};

    let state = Arc::new(AppState::new(tea));
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let rt = tokio::runtime::Runtime::new().context("Failed to create tokio runtime")?;
    rt.block_on(api::serve(state, addr))
        .with_context(|| format!("API server on {addr} failed"))
}
