// Copyright (c) James Kassemi, SC, US. All rights reserved.
use core_types::DurationError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, StatsError>;

#[derive(Debug, Error)]
pub enum StatsError {
    #[error(transparent)]
    InvalidWindow(#[from] DurationError),
    #[error("at least one window must be configured")]
    NoWindows,
    #[error("percentile must be within [0, 100], got {percentile}")]
    InvalidPercentile { percentile: f64 },
    #[error("window '{window}' is not configured")]
    UnknownWindow { window: String },
}

