//! End-to-end runs on small in-memory tables with hand-checkable costs.

mod common;

use dc_tea::error::TeaError;
use dc_tea::sim::aggregate::{ChartData, SecondaryView, cumulative};
use dc_tea::sim::report::TeaReport;
use dc_tea::sim::run;
use dc_tea::sim::types::{CaseParameters, DiscountMode, Granularity, SimConfig};
use float_cmp::approx_eq;

#[test]
fn two_year_daily_reference_costs() {
    // 2018 and 2019 hold no leap day: 730 steps of 365-day years
    let prices = common::flat_prices("Texas", 10.0, 2018, 2019);
    let activity = common::flat_activity(730, 1.0);
    let tea = run(common::reference_inputs("Texas"), &prices, &activity).unwrap();

    assert_eq!(tea.aligned.len(), 730);
    let s = &tea.series[0];
    assert_eq!(s.total.len(), 730);
    assert_eq!(s.capital[0], 1000.0);
    assert_eq!(s.capital[365], 500.0);
    assert_eq!(
        s.capital.iter().filter(|c| **c != 0.0).count(),
        2,
        "only installation and one renewal"
    );

    assert!(approx_eq!(f64, s.it_energy[1], 1.0, epsilon = 1e-12));
    assert!(approx_eq!(f64, s.cooling_energy[1], 0.2, epsilon = 1e-12));
    assert!(approx_eq!(f64, s.maintenance[1], 0.1 * 1000.0 / 365.0, epsilon = 1e-12));
    assert!((s.total[1] - 1.474).abs() < 1e-3);

    for i in 0..s.len() {
        assert_eq!(
            s.total[i],
            s.capital[i] + s.it_energy[i] + s.cooling_energy[i] + s.maintenance[i]
        );
    }
}

#[test]
fn renewals_fall_on_lifetime_multiples() {
    let prices = common::flat_prices("Texas", 10.0, 2015, 2019);
    let activity = common::flat_activity(60, 0.7);
    let mut inputs = common::reference_inputs("Texas");
    inputs.config = SimConfig::new(5.0, Granularity::Monthly, "Texas");
    inputs.cases.push(CaseParameters {
        name: "Long-lived".into(),
        lifetime_years: 2.5,
        ..common::reference_case()
    });
    let tea = run(inputs, &prices, &activity).unwrap();

    for (case, lifetime_steps) in tea.series.iter().zip([12, 30]) {
        assert_eq!(case.capital[0], 1000.0);
        for i in 1..case.len() {
            assert_eq!(
                case.capital[i] != 0.0,
                i % lifetime_steps == 0,
                "{} step {i}",
                case.name
            );
        }
    }
}

#[test]
fn future_mode_equals_zero_rate_present_mode() {
    let prices = common::flat_prices("Texas", 12.5, 2018, 2019);
    let activity = common::flat_activity(730, 0.8);

    let mut nominal = common::reference_inputs("Texas");
    nominal.config.interest_rate_pct = 9.0;
    let mut zero = common::reference_inputs("Texas");
    zero.config.discounting = DiscountMode::Present;
    zero.config.interest_rate_pct = 0.0;

    let a = run(nominal, &prices, &activity).unwrap();
    let b = run(zero, &prices, &activity).unwrap();
    assert_eq!(a.series, b.series);
}

#[test]
fn leap_year_expands_february_and_spreads_maintenance() {
    // 2016 is a leap year; round(365.25) = 365 steps ending Dec 31
    let prices = common::flat_prices("Texas", 10.0, 2016, 2016);
    let activity = common::flat_activity(366, 1.0);
    let mut inputs = common::reference_inputs("Texas");
    inputs.config.horizon_years = 1.0;
    let tea = run(inputs, &prices, &activity).unwrap();

    assert_eq!(tea.aligned.len(), 365);
    let february = tea
        .aligned
        .months
        .iter()
        .filter(|m| m.to_string() == "Feb 2016")
        .count();
    assert_eq!(february, 29);
    assert!(approx_eq!(
        f64,
        tea.series[0].maintenance[0],
        100.0 / 366.0,
        epsilon = 1e-12
    ));
}

#[test]
fn short_history_is_insufficient() {
    let prices = common::flat_prices("Texas", 10.0, 2019, 2019);
    let activity = common::flat_activity(730, 1.0);
    let err = run(common::reference_inputs("Texas"), &prices, &activity).unwrap_err();
    assert_eq!(
        err,
        TeaError::InsufficientHistory {
            series: "price".into(),
            requested: 730,
            available: 365,
        }
    );
}

#[test]
fn short_activity_is_insufficient() {
    let prices = common::flat_prices("Texas", 10.0, 2018, 2019);
    let activity = common::flat_activity(100, 1.0);
    let err = run(common::reference_inputs("Texas"), &prices, &activity).unwrap_err();
    assert!(matches!(
        err,
        TeaError::InsufficientHistory { ref series, .. } if series == "activity"
    ));
}

#[test]
fn unknown_region_is_lookup_error() {
    let prices = common::flat_prices("Texas", 10.0, 2018, 2019);
    let activity = common::flat_activity(730, 1.0);
    let err = run(common::reference_inputs("Ohio"), &prices, &activity).unwrap_err();
    assert!(matches!(err, TeaError::LookupError { ref key, .. } if key == "Ohio"));
}

#[test]
fn zero_lifetime_is_invalid_parameter() {
    let prices = common::flat_prices("Texas", 10.0, 2018, 2019);
    let activity = common::flat_activity(730, 1.0);
    let mut inputs = common::reference_inputs("Texas");
    inputs.cases[0].lifetime_years = 0.0;
    let err = run(inputs, &prices, &activity).unwrap_err();
    assert_eq!(err.field(), Some("cases.lifetime_years[0]"));
}

#[test]
fn views_and_report_agree_with_series() {
    let prices = common::flat_prices("Texas", 10.0, 2018, 2019);
    let activity = common::flat_activity(730, 1.0);
    let tea = run(common::reference_inputs("Texas"), &prices, &activity).unwrap();

    let chart = ChartData::build(&tea, SecondaryView::Stackplot);
    let expected = cumulative(&tea.series[0].total);
    assert_eq!(chart.totals[0].values, expected);
    let top = chart.stacks[0]
        .layers
        .iter()
        .map(|l| l.values[729])
        .sum::<f64>();
    assert!(approx_eq!(f64, top, expected[729], epsilon = 1e-6));

    let report = TeaReport::from_run(&tea);
    assert!(approx_eq!(f64, report.cases[0].total, expected[729], epsilon = 1e-6));
    assert_eq!(report.cases[0].renewals, 1);
}
