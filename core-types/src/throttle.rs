// Copyright (c) James Kassemi, SC, US. All rights reserved.

//! Leading-edge rate limiter for periodic maintenance passes.

pub const DEFAULT_THROTTLE_MS: u64 = 100;

/// Runs a trigger at most once per `interval_ms`.
///
/// The first trigger always runs; later ones run only when at least
/// `interval_ms` has passed since the last run. A disabled throttle (or an
/// interval of zero) runs every trigger.
#[derive(Debug, Clone)]
pub struct Throttle {
    interval_ms: Option<u64>,
    last_run_ms: Option<i64>,
}

impl Throttle {
    pub fn new(interval_ms: u64) -> Self {
        Self {
            interval_ms: Some(interval_ms),
            last_run_ms: None,
        }
    }

    pub fn disabled() -> Self {
        Self {
            interval_ms: None,
            last_run_ms: None,
        }
    }

    pub fn from_setting(interval_ms: Option<u64>) -> Self {
        match interval_ms {
            Some(ms) => Self::new(ms),
            None => Self::disabled(),
        }
    }

    pub fn interval_ms(&self) -> Option<u64> {
        self.interval_ms
    }

    pub fn is_enabled(&self) -> bool {
        self.interval_ms.is_some()
    }

    pub fn last_run_ms(&self) -> Option<i64> {
        self.last_run_ms
    }

    /// Whether a trigger at `now_ms` would run.
    pub fn is_due(&self, now_ms: i64) -> bool {
        match (self.interval_ms, self.last_run_ms) {
            (None, _) | (Some(0), _) | (_, None) => true,
            // A clock that stepped backwards counts as due rather than stalling.
            (Some(interval), Some(last)) => {
                now_ms < last || now_ms.saturating_sub(last) as u64 >= interval
            }
        }
    }

    /// Runs `trigger` if due and reports whether it ran.
    pub fn maybe_run<F>(&mut self, now_ms: i64, trigger: F) -> bool
    where
        F: FnOnce(),
    {
        if !self.is_due(now_ms) {
            return false;
        }
        self.last_run_ms = Some(now_ms);
        trigger();
        true
    }
}

impl Default for Throttle {
    fn default() -> Self {
        Self::new(DEFAULT_THROTTLE_MS)
    }
}
