// Copyright (c) James Kassemi, SC, US. All rights reserved.

//! Thread-safe rolling statistics over several concurrently tracked windows.

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use core_types::{Clock, MonotonicClock, StatsConfig, Throttle};
use log::{debug, trace};
use parking_lot::Mutex;

use crate::bundle::{WindowMetrics, DEFAULT_PERCENTILES};
use crate::error::{Result, StatsError};
use crate::reshape::transpose;
use crate::stats::{validate_percentile, Metric};
use crate::store::{ExpirySummary, Window, WindowStore};
use crate::window_map::WindowMap;

struct Inner {
    store: WindowStore,
    throttle: Throttle,
}

/// Records numeric observations and answers statistics per window.
///
/// All windows share one lock. Every record and every query first offers an
/// expiry pass to the throttle, so a reader never sees an observation more
/// than one throttle interval past its window.
pub struct RollingStats {
    inner: Mutex<Inner>,
    clock: Arc<dyn Clock>,
    debug: bool,
}

impl RollingStats {
    /// Default settings (100 ms expiry throttle, monotonic clock).
    pub fn new<I, S>(windows: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::from_config(&StatsConfig::new(windows))
    }

    pub fn from_config(config: &StatsConfig) -> Result<Self> {
        Self::with_clock(config, Arc::new(MonotonicClock::new()))
    }

    pub fn with_clock(config: &StatsConfig, clock: Arc<dyn Clock>) -> Result<Self> {
        let store = WindowStore::new(&config.windows)?;
        let throttle = Throttle::from_setting(config.expiry_throttle.interval_ms());
        if config.debug {
            debug!(
                "rolling stats ready: windows={:?} expiry_throttle_ms={:?}",
                config.windows,
                throttle.interval_ms()
            );
        }
        Ok(Self {
            inner: Mutex::new(Inner { store, throttle }),
            clock,
            debug: config.debug,
        })
    }

    pub fn window_ids(&self) -> Vec<String> {
        let inner = self.inner.lock();
        inner.store.window_ids().map(str::to_string).collect()
    }

    /// Records `value` in every window.
    ///
    /// Non-finite values are accepted and flow into sum, average and
    /// standard deviation until they expire.
    pub fn record(&self, value: f64) {
        let mut inner = self.inner.lock();
        // Read under the lock so queued timestamps never go backwards.
        let now = self.clock.now_ms();
        inner.store.record(value, now);
        self.maybe_expire(&mut inner, now);
    }

    /// Runs `op`, records how long it took in milliseconds, and returns its
    /// result untouched.
    pub fn record_duration<T, F>(&self, op: F) -> T
    where
        F: FnOnce() -> T,
    {
        let started = Instant::now();
        let output = op();
        self.record(elapsed_ms(started));
        output
    }

    /// Awaits `fut`, then records how long it took to settle. The output
    /// (including an `Err`) is handed back unchanged.
    pub async fn record_duration_async<T, Fut>(&self, fut: Fut) -> T
    where
        Fut: Future<Output = T>,
    {
        let started = Instant::now();
        let output = fut.await;
        self.record(elapsed_ms(started));
        output
    }

    /// Runs an expiry pass now, bypassing the throttle.
    pub fn force_expire(&self) -> ExpirySummary {
        let mut inner = self.inner.lock();
        let now = self.clock.now_ms();
        let summary = inner.store.expire(now);
        self.log_expiry(&summary);
        summary
    }

    pub fn get_counts(&self) -> WindowMap<u64> {
        self.per_window(|window| window.count() as u64)
    }

    pub fn get_sums(&self) -> WindowMap<Option<f64>> {
        self.per_window(|window| window.sum())
    }

    pub fn get_averages(&self) -> WindowMap<Option<f64>> {
        self.per_window(|window| window.average())
    }

    pub fn get_medians(&self) -> WindowMap<Option<f64>> {
        self.per_window(Window::median)
    }

    pub fn get_percentiles(&self, percentile: f64) -> Result<WindowMap<Option<f64>>> {
        validate_percentile(percentile)?;
        self.per_window_checked(|window| window.percentile(percentile))
    }

    pub fn get_minimums(&self) -> WindowMap<Option<f64>> {
        self.per_window(Window::minimum)
    }

    pub fn get_maximums(&self) -> WindowMap<Option<f64>> {
        self.per_window(Window::maximum)
    }

    pub fn get_standard_deviations(&self) -> WindowMap<Option<f64>> {
        self.per_window(Window::standard_deviation)
    }

    /// Full statistics bundle for each window at the default percentiles
    /// (90th and 95th).
    pub fn get_default_metrics(&self) -> Result<WindowMap<WindowMetrics>> {
        self.get_metrics(&DEFAULT_PERCENTILES)
    }

    /// Full statistics bundle for each window, with one `percentile_N` entry
    /// per distinct requested percentile, in first-requested order. All
    /// percentiles are validated up front.
    pub fn get_metrics(&self, percentiles: &[f64]) -> Result<WindowMap<WindowMetrics>> {
        let mut distinct: Vec<f64> = Vec::with_capacity(percentiles.len());
        for &p in percentiles {
            validate_percentile(p)?;
            if !distinct.contains(&p) {
                distinct.push(p);
            }
        }
        let mut requested = vec![Metric::Sum, Metric::Average, Metric::Median];
        requested.extend(distinct.into_iter().map(Metric::Percentile));
        requested.extend([Metric::Minimum, Metric::Maximum, Metric::StandardDeviation]);

        self.with_fresh_store(|store| -> Result<WindowMap<WindowMetrics>> {
            let counts: WindowMap<u64> = store
                .windows()
                .iter()
                .map(|w| (w.id().to_string(), w.count() as u64))
                .collect();
            let mut columns = Vec::with_capacity(requested.len());
            for metric in requested {
                columns.push((metric, collect_column(store, |w| w.metric(metric))?));
            }
            let rows = transpose(columns);
            Ok(counts
                .into_iter()
                .zip(rows)
                .map(|((id, count), (_, row))| (id, WindowMetrics::from_row(count, row)))
                .collect())
        })
    }

    /// Current values of one window in recording order.
    pub fn get_values(&self, window: &str) -> Result<Vec<f64>> {
        self.with_fresh_store(|store| store.get_values(window))
            .ok_or_else(|| unknown_window(window))
    }

    /// Current values of one window in ascending order.
    pub fn get_sorted_values(&self, window: &str) -> Result<Vec<f64>> {
        self.with_fresh_store(|store| store.get_sorted_values(window))
            .ok_or_else(|| unknown_window(window))
    }

    fn per_window<T, F>(&self, mut f: F) -> WindowMap<T>
    where
        F: FnMut(&mut Window) -> T,
    {
        self.with_fresh_store(|store| {
            store
                .windows_mut()
                .iter_mut()
                .map(|w| (w.id().to_string(), f(w)))
                .collect()
        })
    }

    fn per_window_checked<T, F>(&self, f: F) -> Result<WindowMap<T>>
    where
        F: FnMut(&mut Window) -> Result<T>,
    {
        self.with_fresh_store(|store| collect_column(store, f))
    }

    fn with_fresh_store<R, F>(&self, f: F) -> R
    where
        F: FnOnce(&mut WindowStore) -> R,
    {
        let mut inner = self.inner.lock();
        let now = self.clock.now_ms();
        self.maybe_expire(&mut inner, now);
        f(&mut inner.store)
    }

    fn maybe_expire(&self, inner: &mut Inner, now: i64) {
        let Inner { store, throttle } = inner;
        let mut summary = None;
        throttle.maybe_run(now, || summary = Some(store.expire(now)));
        if let Some(summary) = summary {
            self.log_expiry(&summary);
        }
    }

    fn log_expiry(&self, summary: &ExpirySummary) {
        if summary.removed == 0 {
            return;
        }
        if self.debug {
            debug!(
                "expired {} observations across {} windows",
                summary.removed, summary.windows_touched
            );
        } else {
            trace!(
                "expired {} observations across {} windows",
                summary.removed,
                summary.windows_touched
            );
        }
    }
}

fn collect_column<T, F>(store: &mut WindowStore, mut f: F) -> Result<WindowMap<T>>
where
    F: FnMut(&mut Window) -> Result<T>,
{
    store
        .windows_mut()
        .iter_mut()
        .map(|w| -> Result<(String, T)> { Ok((w.id().to_string(), f(w)?)) })
        .collect()
}

fn elapsed_ms(started: Instant) -> f64 {
    started.elapsed().as_secs_f64() * 1_000.0
}

fn unknown_window(window: &str) -> StatsError {
    StatsError::UnknownWindow {
        window: window.to_string(),
    }
}
