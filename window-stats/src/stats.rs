// Copyright (c) James Kassemi, SC, US. All rights reserved.

//! Statistics over a window's current values.
//!
//! Every statistic except the count is `None` for an empty window. Median and
//! percentiles read the sorted cache (building it once per membership change);
//! minimum and maximum use the cache only when it is already warm and fall back
//! to a linear scan otherwise.

use std::fmt;

use crate::error::{Result, StatsError};
use crate::store::{ValueAccess, Values, Window};

/// A per-window statistic that can be requested by name.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Metric {
    Sum,
    Average,
    Median,
    Percentile(f64),
    Minimum,
    Maximum,
    StandardDeviation,
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Metric::Sum => f.write_str("sum"),
            Metric::Average => f.write_str("average"),
            Metric::Median => f.write_str("median"),
            Metric::Percentile(p) => write!(f, "percentile_{p}"),
            Metric::Minimum => f.write_str("minimum"),
            Metric::Maximum => f.write_str("maximum"),
            Metric::StandardDeviation => f.write_str("standard_deviation"),
        }
    }
}

pub fn validate_percentile(percentile: f64) -> Result<()> {
    if (0.0..=100.0).contains(&percentile) {
        Ok(())
    } else {
        Err(StatsError::InvalidPercentile { percentile })
    }
}

/// Hyndman-Fan type 7 estimate over ascending `sorted` values.
///
/// With 1-indexed order statistics `v`, `h = (n - 1) * p / 100 + 1` and the
/// result interpolates linearly between `v[floor(h)]` and `v[ceil(h)]`.
pub fn percentile_of_sorted(sorted: &[f64], percentile: f64) -> Option<f64> {
    let n = sorted.len();
    match n {
        0 => None,
        1 => Some(sorted[0]),
        _ => {
            let pos = (n - 1) as f64 * (percentile / 100.0);
            let lower = (pos.floor() as usize).min(n - 1);
            let upper = (pos.ceil() as usize).min(n - 1);
            let weight = pos - lower as f64;
            if lower == upper || weight == 0.0 {
                Some(sorted[lower])
            } else {
                Some(sorted[lower] + weight * (sorted[upper] - sorted[lower]))
            }
        }
    }
}

/// Ordered by `f64::total_cmp`, like the sorted cache, so the scan and the
/// cache agree. A (positive) NaN sorts above every number.
fn extreme(values: Values<'_>, pick_max: bool) -> Option<f64> {
    match values {
        Values::Sorted(sorted) if pick_max => sorted.last().copied(),
        Values::Sorted(sorted) => sorted.first().copied(),
        Values::Raw(_) if pick_max => values.iter().max_by(f64::total_cmp),
        Values::Raw(_) => values.iter().min_by(f64::total_cmp),
    }
}

/// Population standard deviation around a caller-supplied mean.
pub fn population_std_dev<I>(values: I, mean: f64) -> Option<f64>
where
    I: IntoIterator<Item = f64>,
{
    let mut count = 0usize;
    let mut squares = 0.0;
    for value in values {
        let delta = value - mean;
        squares += delta * delta;
        count += 1;
    }
    (count > 0).then(|| (squares / count as f64).sqrt())
}

impl Window {
    pub fn sum(&self) -> Option<f64> {
        (!self.is_empty()).then_some(self.running_sum())
    }

    pub fn average(&self) -> Option<f64> {
        (!self.is_empty()).then(|| self.running_sum() / self.count() as f64)
    }

    pub fn minimum(&mut self) -> Option<f64> {
        extreme(self.values(ValueAccess::PreferSorted), false)
    }

    pub fn maximum(&mut self) -> Option<f64> {
        extreme(self.values(ValueAccess::PreferSorted), true)
    }

    pub fn median(&mut self) -> Option<f64> {
        percentile_of_sorted(self.values(ValueAccess::Sorted).as_sorted(), 50.0)
    }

    pub fn percentile(&mut self, percentile: f64) -> Result<Option<f64>> {
        validate_percentile(percentile)?;
        Ok(percentile_of_sorted(
            self.values(ValueAccess::Sorted).as_sorted(),
            percentile,
        ))
    }

    /// Uses the running mean so the result agrees with [`Window::average`].
    pub fn standard_deviation(&mut self) -> Option<f64> {
        let mean = self.average()?;
        population_std_dev(self.values(ValueAccess::Raw).iter(), mean)
    }

    pub fn metric(&mut self, metric: Metric) -> Result<Option<f64>> {
        match metric {
            Metric::Sum => Ok(self.sum()),
            Metric::Average => Ok(self.average()),
            Metric::Median => Ok(self.median()),
            Metric::Percentile(p) => self.percentile(p),
            Metric::Minimum => Ok(self.minimum()),
            Metric::Maximum => Ok(self.maximum()),
            Metric::StandardDeviation => Ok(self.standard_deviation()),
        }
    }
}

impl<'a> Values<'a> {
    fn as_sorted(self) -> &'a [f64] {
        match self {
            Values::Sorted(sorted) => sorted,
            Values::Raw(_) => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Observation;
    use core_types::parse_duration;

    fn approx_eq(a: f64, b: f64) {
        assert!((a - b).abs() <= 1e-9, "expected {a} ~= {b}");
    }

    fn window_with(values: &[f64]) -> Window {
        let mut window = Window::new("1h", parse_duration("1h").unwrap());
        for (i, &value) in values.iter().enumerate() {
            window.push(Observation {
                timestamp_ms: i as i64,
                value,
            });
        }
        window
    }

    #[test]
    fn type7_percentiles_over_one_to_ten() {
        let sorted: Vec<f64> = (1..=10).map(f64::from).collect();
        approx_eq(percentile_of_sorted(&sorted, 0.0).unwrap(), 1.0);
        approx_eq(percentile_of_sorted(&sorted, 100.0).unwrap(), 10.0);
        approx_eq(percentile_of_sorted(&sorted, 50.0).unwrap(), 5.5);
        approx_eq(percentile_of_sorted(&sorted, 10.0).unwrap(), 1.9);
        approx_eq(percentile_of_sorted(&sorted, 90.0).unwrap(), 9.1);
        approx_eq(percentile_of_sorted(&sorted, 25.0).unwrap(), 3.25);
    }

    #[test]
    fn single_value_is_every_percentile() {
        for p in [0.0, 1.0, 50.0, 99.9, 100.0] {
            assert_eq!(percentile_of_sorted(&[42.0], p), Some(42.0));
        }
        assert_eq!(percentile_of_sorted(&[], 50.0), None);
    }

    #[test]
    fn percentile_range_is_enforced() {
        for p in [-0.1, 100.1, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                validate_percentile(p),
                Err(StatsError::InvalidPercentile { .. })
            ));
        }
        assert!(validate_percentile(0.0).is_ok());
        assert!(validate_percentile(100.0).is_ok());

        let mut window = window_with(&[1.0, 2.0]);
        assert!(window.percentile(101.0).is_err());
        assert!(!window.has_sorted_cache());
    }

    #[test]
    fn median_of_even_count_interpolates() {
        let mut window = window_with(&[4.0, 1.0, 3.0, 2.0]);
        approx_eq(window.median().unwrap(), 2.5);
    }

    #[test]
    fn population_standard_deviation() {
        let mut window = window_with(&[2.0, 4.0, 6.0]);
        approx_eq(window.average().unwrap(), 4.0);
        approx_eq(window.standard_deviation().unwrap(), (8.0f64 / 3.0).sqrt());
        approx_eq(window_with(&[5.0]).standard_deviation().unwrap(), 0.0);
    }

    #[test]
    fn min_max_do_not_force_a_sort() {
        let mut window = window_with(&[3.0, -1.0, 7.0, 2.0]);
        assert_eq!(window.minimum(), Some(-1.0));
        assert_eq!(window.maximum(), Some(7.0));
        assert!(!window.has_sorted_cache());

        window.median();
        assert!(window.has_sorted_cache());
        assert_eq!(window.minimum(), Some(-1.0));
        assert_eq!(window.maximum(), Some(7.0));
    }

    #[test]
    fn empty_window_reports_nothing() {
        let mut window = window_with(&[]);
        assert_eq!(window.count(), 0);
        assert_eq!(window.sum(), None);
        assert_eq!(window.average(), None);
        assert_eq!(window.median(), None);
        assert_eq!(window.percentile(90.0).unwrap(), None);
        assert_eq!(window.minimum(), None);
        assert_eq!(window.maximum(), None);
        assert_eq!(window.standard_deviation(), None);
    }

    #[test]
    fn metric_dispatch_and_names() {
        let mut window = window_with(&[1.0, 2.0, 3.0]);
        assert_eq!(window.metric(Metric::Sum).unwrap(), Some(6.0));
        assert_eq!(window.metric(Metric::Percentile(100.0)).unwrap(), Some(3.0));
        assert!(window.metric(Metric::Percentile(-1.0)).is_err());
        assert_eq!(Metric::Percentile(90.0).to_string(), "percentile_90");
        assert_eq!(Metric::Percentile(99.9).to_string(), "percentile_99.9");
        assert_eq!(Metric::StandardDeviation.to_string(), "standard_deviation");
    }

    #[test]
    fn min_max_with_nan_match_cold_and_warm_cache() {
        let mut window = window_with(&[1.0, f64::NAN, 2.0]);
        let cold = (window.minimum(), window.maximum());
        assert!(!window.has_sorted_cache());
        assert_eq!(cold.0, Some(1.0));
        assert!(cold.1.is_some_and(f64::is_nan));

        window.median();
        assert!(window.has_sorted_cache());
        assert_eq!(window.minimum(), Some(1.0));
        assert!(window.maximum().is_some_and(f64::is_nan));

        let mut all_nan = window_with(&[f64::NAN, f64::NAN]);
        assert!(all_nan.minimum().is_some_and(f64::is_nan));
    }

    #[test]
    fn infinities_propagate() {
        let mut window = window_with(&[1.0, f64::INFINITY]);
        assert_eq!(window.sum(), Some(f64::INFINITY));
        assert_eq!(window.maximum(), Some(f64::INFINITY));
        assert!(window.standard_deviation().unwrap().is_nan());
    }
}
