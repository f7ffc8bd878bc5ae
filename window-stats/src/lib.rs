// Copyright (c) James Kassemi, SC, US. All rights reserved.

//! Rolling time-window statistics over a stream of numeric observations.
//!
//! The crate exposes:
//! - [`RollingStats`]: thread-safe facade that records values and answers
//!   count, sum, average, median, percentile, min, max and standard deviation
//!   for every configured window.
//! - [`WindowStore`] / [`Window`]: the per-window queues with lazy expiry and a
//!   sorted-value cache.
//! - [`WindowMap`]: per-window results in configuration order.

pub mod bundle;
pub mod error;
pub mod reshape;
pub mod rolling;
pub mod stats;
pub mod store;
pub mod window_map;

pub use bundle::{WindowMetrics, DEFAULT_PERCENTILES};
pub use error::{Result, StatsError};
pub use reshape::transpose;
pub use rolling::RollingStats;
pub use stats::{percentile_of_sorted, population_std_dev, validate_percentile, Metric};
pub use store::{ExpirySummary, Observation, ValueAccess, Values, Window, WindowStore};
pub use window_map::WindowMap;

pub use core_types::{Clock, ExpiryThrottle, ManualClock, MonotonicClock, StatsConfig, SystemClock};
