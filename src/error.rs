//! Error types shared by the library and the `oc` binary.
//!
//! Exit codes follow one convention across the tool:
//! - `2`: invalid input, configuration or IO
//! - `3`: not enough usable data
//! - `4`: numerical failure

use serde::{Deserialize, Serialize};

/// A fit or optimizer that produced an unusable result for one cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Divergence {
    /// Cycle counter of the refiner loop (starts at 1).
    pub cycle: usize,
    /// Predicted minimum time of the cycle.
    pub time: f64,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum OcError {
    #[error("input length mismatch: time={time}, brightness={brightness}, error={error}")]
    LengthMismatch {
        time: usize,
        brightness: usize,
        error: usize,
    },

    #[error("time values must be ascending: t[{index}]={current} follows {previous}")]
    UnsortedTime {
        index: usize,
        previous: f64,
        current: f64,
    },

    #[error("series has {actual} usable points, at least {minimum} are required")]
    InsufficientData { actual: usize, minimum: usize },

    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("unknown fit type '{0}': use 'poly', 'nonparametric' or 'model'")]
    UnknownFitKind(String),

    #[error("fit diverged in cycle {} near t={:.6}: {}", .0.cycle, .0.time, .0.reason)]
    FitDivergence(Divergence),

    #[error("{0}")]
    Io(String),

    #[error("{0}")]
    Parse(String),
}

impl OcError {
    pub fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }

    pub fn diverged(cycle: usize, time: f64, reason: impl Into<String>) -> Self {
        Self::FitDivergence(Divergence {
            cycle,
            time,
            reason: reason.into(),
        })
    }

    pub fn exit_code(&self) -> u8 {
        match self {
            Self::LengthMismatch { .. }
            | Self::UnsortedTime { .. }
            | Self::InvalidParameter { .. }
            | Self::UnknownFitKind(_)
            | Self::Io(_)
            | Self::Parse(_) => 2,
            Self::InsufficientData { .. } => 3,
            Self::FitDivergence(_) => 4,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_follow_error_class() {
        assert_eq!(OcError::invalid("period", "must be > 0").exit_code(), 2);
        assert_eq!(
            OcError::InsufficientData {
                actual: 1,
                minimum: 2
            }
            .exit_code(),
            3
        );
        assert_eq!(OcError::diverged(3, 1.5, "singular").exit_code(), 4);
    }

    #[test]
    fn divergence_message_names_cycle() {
        let msg = OcError::diverged(7, 12.25, "non-finite objective").to_string();
        assert_eq!(
            msg,
            "fit diverged in cycle 7 near t=12.250000: non-finite objective"
        );
    }
}
