// Copyright (c) James Kassemi, SC, US. All rights reserved.

//! Window duration literals (`"30s"`, `"5m"`, `"1h"`).

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

const MILLIS_PER_SECOND: u64 = 1_000;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DurationError {
    #[error("invalid window duration '{spec}' (expected <digits><s|m|h>, e.g. \"5m\")")]
    InvalidFormat { spec: String },
}

impl DurationError {
    fn invalid(spec: &str) -> Self {
        DurationError::InvalidFormat {
            spec: spec.to_string(),
        }
    }
}

/// A parsed window length, in milliseconds. Always > 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct WindowDuration {
    millis: u64,
}

impl WindowDuration {
    pub fn from_millis(millis: u64) -> Option<Self> {
        (millis > 0).then_some(Self { millis })
    }

    pub fn as_millis(&self) -> u64 {
        self.millis
    }
}

impl fmt::Display for WindowDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms", self.millis)
    }
}

/// Parses `^(\d+)(s|m|h)$` into milliseconds.
///
/// Units are lowercase only. A zero magnitude is rejected since a window must
/// retain observations for some positive span.
pub fn parse_duration(spec: &str) -> Result<WindowDuration, DurationError> {
    let unit = spec.chars().last().ok_or_else(|| DurationError::invalid(spec))?;
    let digits = &spec[..spec.len() - unit.len_utf8()];
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(DurationError::invalid(spec));
    }
    let value: u64 = digits.parse().map_err(|_| DurationError::invalid(spec))?;
    let seconds = match unit {
        's' => Some(value),
        'm' => value.checked_mul(60),
        'h' => value.checked_mul(3_600),
        _ => None,
    }
    .ok_or_else(|| DurationError::invalid(spec))?;
    seconds
        .checked_mul(MILLIS_PER_SECOND)
        .and_then(WindowDuration::from_millis)
        .ok_or_else(|| DurationError::invalid(spec))
}
