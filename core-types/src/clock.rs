// Copyright (c) James Kassemi, SC, US. All rights reserved.

//! Millisecond time sources.

use std::sync::atomic::{AtomicI64, Ordering};
use std::time::{Duration, Instant};

use chrono::Utc;

pub trait Clock: Send + Sync {
    /// Current time in milliseconds. Only differences between readings matter.
    fn now_ms(&self) -> i64;
}

/// Wall clock (Unix epoch milliseconds).
///
/// Follows every system time adjustment: a step backwards keeps observations
/// alive longer than their window, a step forwards expires them early. Prefer
/// [`MonotonicClock`] unless readings must track the wall clock exactly.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// Epoch milliseconds taken once at construction, advanced by a monotonic
/// [`Instant`] afterwards. Never goes backwards.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    anchor_ms: i64,
    anchor: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            anchor_ms: Utc::now().timestamp_millis(),
            anchor: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now_ms(&self) -> i64 {
        self.anchor_ms
            .saturating_add(duration_to_ms(self.anchor.elapsed()))
    }
}

/// Clock that only moves when told to.
#[derive(Debug, Default)]
pub struct ManualClock {
    now_ms: AtomicI64,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::starting_at(0)
    }

    pub fn starting_at(now_ms: i64) -> Self {
        Self {
            now_ms: AtomicI64::new(now_ms),
        }
    }

    pub fn advance(&self, duration: Duration) {
        self.advance_ms(duration_to_ms(duration));
    }

    pub fn advance_ms(&self, delta_ms: i64) {
        self.now_ms.fetch_add(delta_ms, Ordering::Relaxed);
    }

    pub fn set_ms(&self, now_ms: i64) {
        self.now_ms.store(now_ms, Ordering::Relaxed);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> i64 {
        self.now_ms.load(Ordering::Relaxed)
    }
}

fn duration_to_ms(duration: Duration) -> i64 {
    i64::try_from(duration.as_millis()).unwrap_or(i64::MAX)
}
