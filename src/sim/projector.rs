//! Per-case, per-step cost projection.

use log::debug;

use crate::calendar::days_in_year;
use crate::error::TeaError;

use super::align::AlignedSeries;
use super::types::{
    CaseParameters, ConsumptionFormula, CostSeries, DataCenter, Granularity, SimConfig,
};

/// Discount multiplier for step `step`: `(1 + annual_rate / steps_per_year)^-step`.
///
/// # Examples
///
/// ```
/// use dc_tea::sim::projector::discount_factor;
///
/// assert_eq!(discount_factor(0.0, 12, 50), 1.0);
/// assert!((discount_factor(0.12, 12, 1) - 1.0 / 1.01).abs() < 1e-15);
/// ```
pub fn discount_factor(annual_rate: f64, steps_per_year: usize, step: usize) -> f64 {
    let per_step = annual_rate / steps_per_year as f64;
    (1.0 + per_step).powf(-(step as f64))
}

/// Stateless cost projector for one run.
///
/// Every step is a pure function of its index, the aligned inputs, and the
/// case parameters.
#[derive(Debug, Clone)]
pub struct Projector<'a> {
    config: &'a SimConfig,
    datacenter: DataCenter,
    aligned: &'a AlignedSeries,
    consumption_formula: ConsumptionFormula,
}

impl<'a> Projector<'a> {
    /// Creates a projector using the granularity's consumption formula.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` if the price, activity, and month vectors of
    /// `aligned` differ in length.
    pub fn new(
        config: &'a SimConfig,
        datacenter: DataCenter,
        aligned: &'a AlignedSeries,
    ) -> Result<Self, TeaError> {
        let steps = aligned.price.len();
        if aligned.activity.len() != steps || aligned.months.len() != steps {
            return Err(TeaError::invalid(
                "aligned",
                format!(
                    "price, activity, and months must have equal lengths, got {}, {}, and {}",
                    steps,
                    aligned.activity.len(),
                    aligned.months.len()
                ),
            ));
        }
        Ok(Self {
            config,
            datacenter,
            aligned,
            consumption_formula: config.granularity.consumption_formula(),
        })
    }

    /// Overrides the electricity-consumption formula.
    pub fn with_consumption_formula(mut self, formula: ConsumptionFormula) -> Self {
        self.consumption_formula = formula;
        self
    }

    /// Steps in the year containing `step`, used to spread maintenance.
    fn steps_in_year(&self, step: usize) -> usize {
        match self.config.granularity {
            Granularity::Daily => days_in_year(self.aligned.months[step].year),
            Granularity::Monthly => 12,
        }
    }

    /// Projects one case over the whole horizon.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` if the case lifetime is shorter than one step.
    pub fn project_case(&self, case: &CaseParameters) -> Result<CostSeries, TeaError> {
        let granularity = self.config.granularity;
        let steps_per_year = granularity.steps_per_year();
        let lifetime = case.lifetime_steps(granularity)?;
        let rate = self.config.effective_annual_rate();
        let it_load = self.datacenter.it_load_kw();
        let horizon = self.aligned.len();

        let mut series = CostSeries {
            name: case.name.clone(),
            capital: vec![0.0; horizon],
            it_energy: vec![0.0; horizon],
            cooling_energy: vec![0.0; horizon],
            maintenance: vec![0.0; horizon],
            total: vec![0.0; horizon],
            consumption: vec![0.0; horizon],
            renewals: horizon.saturating_sub(1) / lifetime,
        };

        for i in 0..horizon {
            let df = discount_factor(rate, steps_per_year, i);
            let price = self.aligned.price[i];
            let activity = self.aligned.activity[i];

            if i == 0 {
                series.capital[i] = case.installation_cost;
            } else if i % lifetime == 0 {
                series.capital[i] = case.renewal_cost * df;
            }

            series.it_energy[i] = it_load * price * activity * df;
            series.cooling_energy[i] = (case.pue - 1.0) * it_load * price * activity * df;
            series.maintenance[i] =
                case.maintenance_rate * case.installation_cost / self.steps_in_year(i) as f64 * df;
            series.total[i] = series.capital[i]
                + series.it_energy[i]
                + series.cooling_energy[i]
                + series.maintenance[i];

            series.consumption[i] = match self.consumption_formula {
                // A zero price carries no information about the load
                ConsumptionFormula::BackComputed if price == 0.0 => 0.0,
                ConsumptionFormula::BackComputed => {
                    (series.it_energy[i] + series.cooling_energy[i]) / price
                }
                ConsumptionFormula::Direct => case.pue * it_load * activity,
            };
        }

        debug!(
            "projected case {} over {horizon} steps (lifetime {lifetime} steps)",
            case.name
        );
        Ok(series)
    }

    /// Projects every case, preserving case order.
    ///
    /// # Errors
    ///
    /// Returns the first case error encountered.
    pub fn project(&self, cases: &[CaseParameters]) -> Result<Vec<CostSeries>, TeaError> {
        cases.iter().map(|case| self.project_case(case)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::MonthLabel;
    use crate::sim::types::DiscountMode;
    use float_cmp::approx_eq;

    fn flat_series(n: usize, price: f64, activity: f64, start: MonthLabel) -> AlignedSeries {
        let mut months = Vec::with_capacity(n);
        let mut month = start;
        while months.len() < n {
            for _ in 0..month.days() {
                if months.len() == n {
                    break;
                }
                months.push(month);
            }
            month = month.next();
        }
        AlignedSeries {
            price: vec![price; n],
            activity: vec![activity; n],
            months,
        }
    }

    fn scenario_case() -> CaseParameters {
        CaseParameters {
            name: "Evaporative".into(),
            pue: 1.2,
            lifetime_years: 1.0,
            installation_cost: 1000.0,
            renewal_cost: 500.0,
            maintenance_rate: 0.1,
        }
    }

    fn one_rack() -> DataCenter {
        DataCenter {
            racks: 1,
            rack_power_kw: 10.0,
        }
    }

    #[test]
    fn daily_reference_scenario() {
        let cfg = SimConfig::new(2.0, Granularity::Daily, "X");
        // 2018-2019 contain no leap day
        let aligned = flat_series(730, 0.10, 1.0, MonthLabel::new(2018, 1).unwrap());
        let series = Projector::new(&cfg, one_rack(), &aligned)
            .unwrap()
            .project_case(&scenario_case())
            .unwrap();

        assert_eq!(series.len(), 730);
        assert_eq!(series.capital[0], 1000.0);
        assert_eq!(series.capital[365], 500.0);
        let renewals: Vec<usize> = (1..730).filter(|&i| series.capital[i] != 0.0).collect();
        assert_eq!(renewals, vec![365]);
        assert_eq!(series.renewals, 1);

        assert!(approx_eq!(f64, series.it_energy[1], 1.0, epsilon = 1e-12));
        assert!(approx_eq!(f64, series.cooling_energy[1], 0.2, epsilon = 1e-12));
        assert!(approx_eq!(f64, series.maintenance[1], 100.0 / 365.0, epsilon = 1e-12));
        assert!(approx_eq!(f64, series.total[1], 1.2 + 100.0 / 365.0, epsilon = 1e-12));
        assert!((series.total[1] - 1.474).abs() < 1e-3);
    }

    #[test]
    fn total_is_sum_of_categories() {
        let mut cfg = SimConfig::new(3.0, Granularity::Monthly, "X");
        cfg.discounting = DiscountMode::Present;
        cfg.interest_rate_pct = 7.0;
        let aligned = flat_series(36, 0.08, 0.7, MonthLabel::new(2020, 1).unwrap());
        let series = Projector::new(&cfg, one_rack(), &aligned)
            .unwrap()
            .project_case(&scenario_case())
            .unwrap();
        for i in 0..series.len() {
            let sum = series.capital[i]
                + series.it_energy[i]
                + series.cooling_energy[i]
                + series.maintenance[i];
            assert_eq!(series.total[i], sum);
        }
    }

    #[test]
    fn installation_is_never_discounted() {
        let mut cfg = SimConfig::new(2.0, Granularity::Monthly, "X");
        cfg.discounting = DiscountMode::Present;
        cfg.interest_rate_pct = 12.0;
        let aligned = flat_series(24, 0.1, 1.0, MonthLabel::new(2020, 1).unwrap());
        let series = Projector::new(&cfg, one_rack(), &aligned)
            .unwrap()
            .project_case(&scenario_case())
            .unwrap();
        assert_eq!(series.capital[0], 1000.0);
        assert!(approx_eq!(
            f64,
            series.capital[12],
            500.0 * 1.01_f64.powi(-12),
            epsilon = 1e-9
        ));
    }

    #[test]
    fn future_mode_ignores_entered_rate() {
        let aligned = flat_series(24, 0.1, 0.5, MonthLabel::new(2020, 1).unwrap());
        let mut nominal = SimConfig::new(2.0, Granularity::Monthly, "X");
        nominal.interest_rate_pct = 7.0;
        let mut zero_rate = nominal.clone();
        zero_rate.discounting = DiscountMode::Present;
        zero_rate.interest_rate_pct = 0.0;

        let a = Projector::new(&nominal, one_rack(), &aligned)
            .unwrap()
            .project_case(&scenario_case())
            .unwrap();
        let b = Projector::new(&zero_rate, one_rack(), &aligned)
            .unwrap()
            .project_case(&scenario_case())
            .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn daily_maintenance_spreads_over_leap_year() {
        let cfg = SimConfig::new(1.0, Granularity::Daily, "X");
        let aligned = flat_series(365, 0.1, 1.0, MonthLabel::new(2016, 1).unwrap());
        let series = Projector::new(&cfg, one_rack(), &aligned)
            .unwrap()
            .project_case(&scenario_case())
            .unwrap();
        assert!(approx_eq!(f64, series.maintenance[0], 100.0 / 366.0, epsilon = 1e-12));
    }

    #[test]
    fn consumption_formulas_agree_without_discounting() {
        let cfg = SimConfig::new(1.0, Granularity::Monthly, "X");
        let aligned = flat_series(12, 0.1, 0.5, MonthLabel::new(2020, 1).unwrap());
        let direct = Projector::new(&cfg, one_rack(), &aligned)
            .unwrap()
            .project_case(&scenario_case())
            .unwrap();
        let back = Projector::new(&cfg, one_rack(), &aligned)
            .unwrap()
            .with_consumption_formula(ConsumptionFormula::BackComputed)
            .project_case(&scenario_case())
            .unwrap();
        for i in 0..12 {
            assert!(approx_eq!(f64, direct.consumption[i], 6.0, epsilon = 1e-12));
            assert!(approx_eq!(f64, back.consumption[i], 6.0, epsilon = 1e-12));
        }
    }

    #[test]
    fn back_computed_consumption_carries_discount() {
        let mut cfg = SimConfig::new(1.0, Granularity::Daily, "X");
        cfg.discounting = DiscountMode::Present;
        cfg.interest_rate_pct = 10.0;
        let aligned = flat_series(365, 0.1, 1.0, MonthLabel::new(2019, 1).unwrap());
        let series = Projector::new(&cfg, one_rack(), &aligned)
            .unwrap()
            .project_case(&scenario_case())
            .unwrap();
        assert!(approx_eq!(f64, series.consumption[0], 12.0, epsilon = 1e-12));
        assert!(series.consumption[100] < 12.0);
    }

    #[test]
    fn zero_price_yields_zero_back_computed_consumption() {
        let cfg = SimConfig::new(1.0, Granularity::Daily, "X");
        let aligned = flat_series(365, 0.0, 1.0, MonthLabel::new(2019, 1).unwrap());
        let series = Projector::new(&cfg, one_rack(), &aligned)
            .unwrap()
            .project_case(&scenario_case())
            .unwrap();
        assert!(series.consumption.iter().all(|&c| c == 0.0));
    }

    #[test]
    fn short_lifetime_fails_fast() {
        let cfg = SimConfig::new(1.0, Granularity::Monthly, "X");
        let aligned = flat_series(12, 0.1, 1.0, MonthLabel::new(2020, 1).unwrap());
        let mut case = scenario_case();
        case.lifetime_years = 0.0;
        let err = Projector::new(&cfg, one_rack(), &aligned)
            .unwrap()
            .project(&[scenario_case(), case])
            .unwrap_err();
        assert!(matches!(err, TeaError::InvalidParameter { .. }));
    }

    #[test]
    fn projection_is_bit_identical_across_runs() {
        let mut cfg = SimConfig::new(5.0, Granularity::Monthly, "X");
        cfg.discounting = DiscountMode::Present;
        cfg.interest_rate_pct = 7.0;
        let aligned = flat_series(60, 0.093, 0.81, MonthLabel::new(2015, 6).unwrap());
        let projector = Projector::new(&cfg, one_rack(), &aligned).unwrap();
        let a = projector.project(&[scenario_case()]).unwrap();
        let b = projector.project(&[scenario_case()]).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn free_renewals_are_still_counted() {
        let cfg = SimConfig::new(3.0, Granularity::Monthly, "X");
        let aligned = flat_series(36, 0.1, 1.0, MonthLabel::new(2020, 1).unwrap());
        let mut case = scenario_case();
        case.renewal_cost = 0.0;
        let series = Projector::new(&cfg, one_rack(), &aligned)
            .unwrap()
            .project_case(&case)
            .unwrap();
        assert!(series.capital[1..].iter().all(|&c| c == 0.0));
        assert_eq!(series.renewals, 2);
    }

    #[test]
    fn mismatched_aligned_lengths_are_rejected() {
        let cfg = SimConfig::new(1.0, Granularity::Monthly, "X");
        let mut aligned = flat_series(12, 0.1, 1.0, MonthLabel::new(2020, 1).unwrap());
        aligned.activity.pop();
        let err = Projector::new(&cfg, one_rack(), &aligned).unwrap_err();
        assert_eq!(err.field(), Some("aligned"));

        let mut aligned = flat_series(12, 0.1, 1.0, MonthLabel::new(2020, 1).unwrap());
        aligned.months.truncate(3);
        assert!(matches!(
            Projector::new(&cfg, one_rack(), &aligned),
            Err(TeaError::InvalidParameter { .. })
        ));
    }
}
