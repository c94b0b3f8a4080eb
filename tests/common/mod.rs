//! Shared test fixtures for integration tests.

#![allow(dead_code)]

use std::path::PathBuf;

use dc_tea::calendar::MonthLabel;
use dc_tea::io::tables::{ActivityTable, PriceTable, Sector, price_column_name};
use dc_tea::sim::RunInputs;
use dc_tea::sim::types::{CaseParameters, DataCenter, Granularity, SimConfig};

/// Path of a file under the bundled `data/` directory.
pub fn data_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data").join(name)
}

/// Price table with a constant `cents` value for every month of
/// `first_year..=last_year`, written newest first like the EIA download.
pub fn flat_prices(region: &str, cents: f64, first_year: i32, last_year: i32) -> PriceTable {
    let mut csv = format!("Month,{}\n", price_column_name(region, Sector::Industrial));
    for year in (first_year..=last_year).rev() {
        for month in (1..=12).rev() {
            let label = MonthLabel::new(year, month).unwrap();
            csv.push_str(&format!("{label},{cents}\n"));
        }
    }
    PriceTable::from_csv_str(&csv, 0).unwrap()
}

/// Activity table with `n` identical rows.
pub fn flat_activity(n: usize, hours: f64) -> ActivityTable {
    ActivityTable::new(vec![hours; n]).unwrap()
}

/// One rack drawing 10 kW.
pub fn one_rack() -> DataCenter {
    DataCenter {
        racks: 1,
        rack_power_kw: 10.0,
    }
}

/// PUE 1.2, one-year lifetime, 1000 installation, 500 renewal, 10 %
/// maintenance.
pub fn reference_case() -> CaseParameters {
    CaseParameters {
        name: "Reference".into(),
        pue: 1.2,
        lifetime_years: 1.0,
        installation_cost: 1000.0,
        renewal_cost: 500.0,
        maintenance_rate: 0.1,
    }
}

/// Two-year daily run of [`reference_case`] on one rack.
pub fn reference_inputs(region: &str) -> RunInputs {
    RunInputs {
        config: SimConfig::new(2.0, Granularity::Daily, region),
        datacenter: one_rack(),
        cases: vec![reference_case()],
        consumption: None,
    }
}
