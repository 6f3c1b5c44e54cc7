//! Crate-wide error types.

use thiserror::Error;

use crate::data::series::TimePoint;
use crate::sim::validator::RejectReason;

/// Configuration error with field path and constraint description.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("config error: {field}: {message}")]
pub struct ConfigError {
    /// Dotted field path (e.g., `"simulation.interval_minutes"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

/// Any failure a simulation run can surface.
///
/// Only validation rejections are retried, and only inside the stepper's
/// bounded retry loop; everything that reaches this enum is fatal for the
/// run that produced it.
#[derive(Debug, Error)]
pub enum SimError {
    /// Invalid configuration, reported before any stepping begins.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The resampler found neither samples nor interpolation anchors.
    #[error("no {quantity} data for interval ({from} .. {to}]")]
    DataGap {
        quantity: &'static str,
        from: TimePoint,
        to: TimePoint,
    },

    /// A policy kept producing infeasible actions until the retry budget
    /// ran out.
    #[error(
        "policy \"{policy}\" produced no feasible actions at {clock} \
         after {attempts} attempts: {reason}"
    )]
    PolicyContract {
        policy: &'static str,
        clock: TimePoint,
        attempts: u32,
        reason: RejectReason,
    },

    /// A stepper accepts exactly one `run()` call.
    #[error("stepper for policy \"{policy}\" has already run")]
    AlreadyRun { policy: &'static str },

    /// Malformed dataset file.
    #[error("invalid data in {path}: {message}")]
    Data { path: String, message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
