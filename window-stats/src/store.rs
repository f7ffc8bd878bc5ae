// Copyright (c) James Kassemi, SC, US. All rights reserved.

//! Per-window observation queues with lazy head expiry and a sorted-value cache.

use std::collections::{vec_deque, VecDeque};

use core_types::{parse_duration, WindowDuration};
use log::trace;

use crate::error::{Result, StatsError};

/// A recorded value and the time it was captured.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    pub timestamp_ms: i64,
    pub value: f64,
}

/// How a caller wants a window's values handed back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueAccess {
    /// Insertion order, never sorts.
    Raw,
    /// Sorted if the cache is warm, insertion order otherwise.
    PreferSorted,
    /// Always sorted; builds the cache if needed.
    Sorted,
}

/// Borrowed view over a window's current values.
#[derive(Debug, Clone, Copy)]
pub enum Values<'a> {
    Sorted(&'a [f64]),
    Raw(&'a VecDeque<Observation>),
}

impl<'a> Values<'a> {
    pub fn is_sorted(&self) -> bool {
        matches!(self, Values::Sorted(_))
    }

    pub fn len(&self) -> usize {
        match self {
            Values::Sorted(values) => values.len(),
            Values::Raw(queue) => queue.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> ValuesIter<'a> {
        match *self {
            Values::Sorted(values) => ValuesIter::Sorted(values.iter()),
            Values::Raw(queue) => ValuesIter::Raw(queue.iter()),
        }
    }

    pub fn to_vec(&self) -> Vec<f64> {
        match self {
            Values::Sorted(values) => values.to_vec(),
            Values::Raw(queue) => queue.iter().map(|obs| obs.value).collect(),
        }
    }
}

pub enum ValuesIter<'a> {
    Sorted(std::slice::Iter<'a, f64>),
    Raw(vec_deque::Iter<'a, Observation>),
}

impl Iterator for ValuesIter<'_> {
    type Item = f64;

    fn next(&mut self) -> Option<f64> {
        match self {
            ValuesIter::Sorted(iter) => iter.next().copied(),
            ValuesIter::Raw(iter) => iter.next().map(|obs| obs.value),
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self {
            ValuesIter::Sorted(iter) => iter.size_hint(),
            ValuesIter::Raw(iter) => iter.size_hint(),
        }
    }
}

/// Neumaier-compensated accumulator, so removing a large value does not wipe
/// out the small ones recorded alongside it.
#[derive(Debug, Clone, Copy, Default)]
struct CompensatedSum {
    sum: f64,
    compensation: f64,
}

impl CompensatedSum {
    fn add(&mut self, value: f64) {
        let total = self.sum + value;
        // Once the sum is non-finite the lost low-order bits no longer matter,
        // and tracking them would turn the compensation into NaN.
        if total.is_finite() {
            if self.sum.abs() >= value.abs() {
                self.compensation += (self.sum - total) + value;
            } else {
                self.compensation += (value - total) + self.sum;
            }
        }
        self.sum = total;
    }

    fn value(&self) -> f64 {
        self.sum + self.compensation
    }
}

/// One configured rolling duration and the observations it currently holds.
///
/// `running_sum` always equals the sum of the queued values, and
/// `sorted_cache`, when present, is exactly the queued values in ascending
/// order. Any change to queue membership clears the cache.
#[derive(Debug, Clone)]
pub struct Window {
    id: String,
    duration: WindowDuration,
    queue: VecDeque<Observation>,
    running_sum: CompensatedSum,
    sorted_cache: Option<Vec<f64>>,
}

impl Window {
    pub fn new(id: impl Into<String>, duration: WindowDuration) -> Self {
        Self {
            id: id.into(),
            duration,
            queue: VecDeque::new(),
            running_sum: CompensatedSum::default(),
            sorted_cache: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn duration(&self) -> WindowDuration {
        self.duration
    }

    pub fn count(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn running_sum(&self) -> f64 {
        self.running_sum.value()
    }

    pub fn observations(&self) -> impl Iterator<Item = &Observation> {
        self.queue.iter()
    }

    pub fn oldest(&self) -> Option<&Observation> {
        self.queue.front()
    }

    pub fn has_sorted_cache(&self) -> bool {
        self.sorted_cache.is_some()
    }

    pub fn push(&mut self, observation: Observation) {
        self.running_sum.add(observation.value);
        self.queue.push_back(observation);
        self.sorted_cache = None;
    }

    /// Drops observations older than the window. Returns how many were removed.
    ///
    /// An observation exactly `duration` old is kept.
    pub fn expire(&mut self, now_ms: i64) -> usize {
        let max_age = i128::from(self.duration.as_millis());
        let mut removed = 0;
        while let Some(front) = self.queue.front() {
            if i128::from(now_ms) - i128::from(front.timestamp_ms) <= max_age {
                break;
            }
            self.running_sum.add(-front.value);
            self.queue.pop_front();
            removed += 1;
        }
        if removed > 0 {
            self.sorted_cache = None;
            self.resync_sum();
        }
        removed
    }

    // NaN and infinity cannot be subtracted back out of the running sum.
    fn resync_sum(&mut self) {
        if self.queue.is_empty() {
            self.running_sum = CompensatedSum::default();
        } else if !self.running_sum.value().is_finite() {
            let mut fresh = CompensatedSum::default();
            for obs in &self.queue {
                fresh.add(obs.value);
            }
            self.running_sum = fresh;
        }
    }

    pub fn values(&mut self, access: ValueAccess) -> Values<'_> {
        match access {
            ValueAccess::Raw => Values::Raw(&self.queue),
            ValueAccess::PreferSorted => match self.sorted_cache {
                Some(ref sorted) => Values::Sorted(sorted.as_slice()),
                None => Values::Raw(&self.queue),
            },
            ValueAccess::Sorted => Values::Sorted(self.sorted()),
        }
    }

    fn sorted(&mut self) -> &[f64] {
        if self.sorted_cache.is_none() {
            trace!("window {}: sorting {} values", self.id, self.queue.len());
            let mut sorted: Vec<f64> = self.queue.iter().map(|obs| obs.value).collect();
            sorted.sort_unstable_by(f64::total_cmp);
            self.sorted_cache = Some(sorted);
        }
        self.sorted_cache.as_deref().unwrap_or_default()
    }
}

/// Counts from one expiry pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExpirySummary {
    pub removed: usize,
    pub windows_touched: usize,
}

/// Fixed set of windows, kept in configuration order.
#[derive(Debug, Clone)]
pub struct WindowStore {
    windows: Vec<Window>,
}

impl WindowStore {
    /// Builds one empty window per literal. Duplicate literals are tracked as
    /// separate windows.
    pub fn new<S: AsRef<str>>(specs: &[S]) -> Result<Self> {
        if specs.is_empty() {
            return Err(StatsError::NoWindows);
        }
        let windows = specs
            .iter()
            .map(|spec| {
                let spec = spec.as_ref();
                parse_duration(spec).map(|duration| Window::new(spec, duration))
            })
            .collect::<std::result::Result<Vec<_>, _>>()?;
        trace!(
            "window store created with windows [{}]",
            windows
                .iter()
                .map(|w| format!("{}={}", w.id, w.duration))
                .collect::<Vec<_>>()
                .join(", ")
        );
        Ok(Self { windows })
    }

    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    pub fn windows(&self) -> &[Window] {
        &self.windows
    }

    pub fn windows_mut(&mut self) -> &mut [Window] {
        &mut self.windows
    }

    pub fn window_ids(&self) -> impl Iterator<Item = &str> {
        self.windows.iter().map(Window::id)
    }

    pub fn window(&self, id: &str) -> Option<&Window> {
        self.windows.iter().find(|w| w.id == id)
    }

    pub fn window_mut(&mut self, id: &str) -> Option<&mut Window> {
        self.windows.iter_mut().find(|w| w.id == id)
    }

    /// Appends `value` to every window.
    pub fn record(&mut self, value: f64, now_ms: i64) {
        let observation = Observation {
            timestamp_ms: now_ms,
            value,
        };
        for window in &mut self.windows {
            window.push(observation);
        }
    }

    pub fn expire(&mut self, now_ms: i64) -> ExpirySummary {
        let mut summary = ExpirySummary::default();
        for window in &mut self.windows {
            let removed = window.expire(now_ms);
            if removed > 0 {
                trace!("window {}: expired {} observations", window.id, removed);
                summary.removed += removed;
                summary.windows_touched += 1;
            }
        }
        summary
    }

    pub fn get_values(&self, id: &str) -> Option<Vec<f64>> {
        self.window(id)
            .map(|w| w.observations().map(|obs| obs.value).collect())
    }

    pub fn get_sorted_values(&mut self, id: &str) -> Option<Vec<f64>> {
        self.window_mut(id)
            .map(|w| w.values(ValueAccess::Sorted).to_vec())
    }
}
