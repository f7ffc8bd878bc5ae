// Copyright (c) James Kassemi, SC, US. All rights reserved.
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::stats::Metric;

pub const DEFAULT_PERCENTILES: [f64; 2] = [90.0, 95.0];

/// Every statistic for one window, as returned by `get_metrics`.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowMetrics {
    pub count: u64,
    pub sum: Option<f64>,
    pub average: Option<f64>,
    pub median: Option<f64>,
    /// `(requested percentile, value)` in request order.
    pub percentiles: Vec<(f64, Option<f64>)>,
    pub minimum: Option<f64>,
    pub maximum: Option<f64>,
    pub standard_deviation: Option<f64>,
}

impl WindowMetrics {
    pub fn empty() -> Self {
        Self {
            count: 0,
            sum: None,
            average: None,
            median: None,
            percentiles: Vec::new(),
            minimum: None,
            maximum: None,
            standard_deviation: None,
        }
    }

    pub(crate) fn from_row(count: u64, row: Vec<(Metric, Option<f64>)>) -> Self {
        let mut metrics = Self {
            count,
            ..Self::empty()
        };
        for (metric, value) in row {
            match metric {
                Metric::Sum => metrics.sum = value,
                Metric::Average => metrics.average = value,
                Metric::Median => metrics.median = value,
                Metric::Percentile(p) => metrics.percentiles.push((p, value)),
                Metric::Minimum => metrics.minimum = value,
                Metric::Maximum => metrics.maximum = value,
                Metric::StandardDeviation => metrics.standard_deviation = value,
            }
        }
        metrics
    }

    /// Value for a requested percentile; `None` if it was not requested or
    /// the window is empty.
    pub fn percentile(&self, percentile: f64) -> Option<f64> {
        self.percentiles
            .iter()
            .find(|(p, _)| *p == percentile)
            .and_then(|(_, value)| *value)
    }
}

impl Default for WindowMetrics {
    fn default() -> Self {
        Self::empty()
    }
}

impl Serialize for WindowMetrics {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(7 + self.percentiles.len()))?;
        map.serialize_entry("count", &self.count)?;
        map.serialize_entry(&Metric::Sum.to_string(), &self.sum)?;
        map.serialize_entry(&Metric::Average.to_string(), &self.average)?;
        map.serialize_entry(&Metric::Median.to_string(), &self.median)?;
        for (p, value) in &self.percentiles {
            map.serialize_entry(&Metric::Percentile(*p).to_string(), value)?;
        }
        map.serialize_entry(&Metric::Minimum.to_string(), &self.minimum)?;
        map.serialize_entry(&Metric::Maximum.to_string(), &self.maximum)?;
        map.serialize_entry(
            &Metric::StandardDeviation.to_string(),
            &self.standard_deviation,
        )?;
        map.end()
    }
}
