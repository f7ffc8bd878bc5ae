// Copyright (c) James Kassemi, SC, US. All rights reserved.

//! Shared collaborators for rolling window statistics: duration literals,
//! clocks, expiry throttling and configuration.

pub mod clock;
pub mod config;
pub mod duration;
pub mod throttle;

pub use clock::{Clock, ManualClock, MonotonicClock, SystemClock};
pub use crate::config::{ConfigError, ExpiryThrottle, StatsConfig};
pub use duration::{parse_duration, DurationError, WindowDuration};
pub use throttle::{Throttle, DEFAULT_THROTTLE_MS};
