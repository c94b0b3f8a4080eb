//! Fixtures for tests

use crate::calendar::MonthLabel;
use crate::sim::TeaRun;
use crate::sim::align::AlignedSeries;
use crate::sim::projector::Projector;
use crate::sim::types::{CaseParameters, DataCenter, Granularity, SimConfig};

/// Monthly aligned series starting Jan 2020 with a slowly rising price.
pub(crate) fn monthly_series(n: usize) -> AlignedSeries {
    let mut month = MonthLabel { year: 2020, month: 1 };
    let mut months = Vec::with_capacity(n);
    for _ in 0..n {
        months.push(month);
        month = month.next();
    }
    AlignedSeries {
        price: (0..n).map(|i| 0.10 + 0.001 * i as f64).collect(),
        activity: (0..n).map(|i| if i % 12 < 6 { 0.8 } else { 0.6 }).collect(),
        months,
    }
}

/// Three monthly years on four 10 kW racks for the given cases.
pub(crate) fn build_run(cases: Vec<CaseParameters>) -> TeaRun {
    let config = SimConfig::new(3.0, Granularity::Monthly, "California");
    let datacenter = DataCenter {
        racks: 4,
        rack_power_kw: 10.0,
    };
    let aligned = monthly_series(36);
    let series = Projector::new(&config, datacenter, &aligned)
        .and_then(|p| p.project(&cases))
        .unwrap();
    TeaRun {
        config,
        datacenter,
        cases,
        aligned,
        series,
    }
}

/// Single case, three monthly years.
pub(crate) fn flat_run() -> TeaRun {
    build_run(vec![CaseParameters {
        name: "Only".into(),
        pue: 1.1,
        lifetime_years: 5.0,
        installation_cost: 10000.0,
        renewal_cost: 5000.0,
        maintenance_rate: 0.1,
    }])
}

/// Evaporative (lifetime 1 y) vs Classic (lifetime 2 y), three monthly years.
pub(crate) fn two_case_run() -> TeaRun {
    build_run(vec![
        CaseParameters {
            name: "Evaporative".into(),
            pue: 1.02,
            lifetime_years: 1.0,
            installation_cost: 48700.0,
            renewal_cost: 28288.0,
            maintenance_rate: 0.15,
        },
        CaseParameters {
            name: "Classic".into(),
            pue: 1.2,
            lifetime_years: 2.0,
            installation_cost: 43200.0,
            renewal_cost: 24343.0,
            maintenance_rate: 0.19,
        },
    ])
}
