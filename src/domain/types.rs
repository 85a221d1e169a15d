//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during fitting
//! - exported to JSON or text tables
//! - reloaded later to rebuild an O-C diagram against a different ephemeris

use std::str::FromStr;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::{Divergence, OcError};

/// Which local model is fitted around each expected minimum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum FitKind {
    /// Low-order polynomial (`order`).
    Poly,
    /// Local-linear kernel regression (`smoothness` scales the bandwidth).
    Nonparametric,
    /// Phase-folded template shifted in time and brightness.
    #[value(alias = "model")]
    #[serde(alias = "model")]
    Template,
}

impl FitKind {
    pub fn display_name(self) -> &'static str {
        match self {
            FitKind::Poly => "poly",
            FitKind::Nonparametric => "nonparametric",
            FitKind::Template => "template",
        }
    }
}

impl FromStr for FitKind {
    type Err = OcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "poly" | "polynomial" => Ok(FitKind::Poly),
            "nonparametric" => Ok(FitKind::Nonparametric),
            "model" | "template" => Ok(FitKind::Template),
            _ => Err(OcError::UnknownFitKind(s.to_string())),
        }
    }
}

/// What the refiner does when a fit in one cycle diverges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DivergencePolicy {
    /// Stop the run and return [`OcError::FitDivergence`].
    #[default]
    Abort,
    /// Skip the cycle and record the divergence in [`MinimaResult::diverged`].
    Skip,
}

/// Configuration of a minimum-detection run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MinimaConfig {
    pub fit: FitKind,
    /// Half-width of the fitting window, as a fraction of the period.
    pub phase_interval: f64,
    /// Polynomial order (poly fits only).
    pub order: usize,
    /// Bandwidth multiplier of refined nonparametric fits.
    pub smoothness: f64,
    /// Bootstrap resamplings per accepted minimum.
    pub samplings: usize,
    /// Worker threads for bootstrapping; `None` uses every core.
    pub threads: Option<usize>,
    /// Base seed of the bootstrap; `None` draws one from OS entropy.
    pub seed: Option<u64>,
    /// Minimum fraction of expected samples a window must hold.
    pub duty_cycle: f64,
    pub on_divergence: DivergencePolicy,
}

impl Default for MinimaConfig {
    fn default() -> Self {
        Self {
            fit: FitKind::Poly,
            phase_interval: 0.1,
            order: 3,
            smoothness: 1.0,
            samplings: 100_000,
            threads: None,
            seed: None,
            duty_cycle: 0.2,
            on_divergence: DivergencePolicy::Abort,
        }
    }
}

impl MinimaConfig {
    /// Check every tunable before any fitting starts.
    pub fn validate(&self) -> Result<(), OcError> {
        if !(self.phase_interval.is_finite() && self.phase_interval > 0.0 && self.phase_interval <= 0.5) {
            return Err(OcError::invalid(
                "phase_interval",
                format!("{} (must be in (0, 0.5])", self.phase_interval),
            ));
        }
        if self.order == 0 {
            return Err(OcError::invalid("order", "must be >= 1"));
        }
        if !(self.smoothness.is_finite() && self.smoothness > 0.0) {
            return Err(OcError::invalid(
                "smoothness",
                format!("{} (must be finite and > 0)", self.smoothness),
            ));
        }
        if !(self.duty_cycle.is_finite() && self.duty_cycle > 0.0 && self.duty_cycle <= 1.0) {
            return Err(OcError::invalid(
                "duty_cycle",
                format!("{} (must be in (0, 1])", self.duty_cycle),
            ));
        }
        if self.threads == Some(0) {
            return Err(OcError::invalid("threads", "must be >= 1"));
        }
        Ok(())
    }
}

/// One detected minimum.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Minimum {
    pub time: f64,
    /// One-sided bootstrap uncertainty of `time`.
    pub error: f64,
}

/// Output of the minimum refiner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MinimaResult {
    /// Accepted minima in detection (= time) order.
    pub minima: Vec<Minimum>,
    /// `floor` of the first timestamp; all cycle arithmetic is relative to it.
    pub zero_time: f64,
    /// Refined time of the first minimum (anchor of the cycle count).
    pub reference_epoch: f64,
    /// `t - zero_time - (i - 1) * period` of the first accepted minimum.
    pub epoch: Option<f64>,
    /// Number of cycles the refiner stepped through.
    pub cycles: usize,
    /// Cycles skipped because their fit diverged (`DivergencePolicy::Skip`).
    pub diverged: Vec<Divergence>,
}

impl MinimaResult {
    pub fn times(&self) -> Vec<f64> {
        self.minima.iter().map(|m| m.time).collect()
    }

    pub fn errors(&self) -> Vec<f64> {
        self.minima.iter().map(|m| m.error).collect()
    }
}

/// One point of an O-C diagram.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OcPoint {
    pub time: f64,
    /// Observed minus calculated time.
    pub oc: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fit_kind_parses_source_tags() {
        assert_eq!("poly".parse::<FitKind>().unwrap(), FitKind::Poly);
        assert_eq!("nonparametric".parse::<FitKind>().unwrap(), FitKind::Nonparametric);
        assert_eq!("model".parse::<FitKind>().unwrap(), FitKind::Template);
        assert_eq!("Template".parse::<FitKind>().unwrap(), FitKind::Template);
    }

    #[test]
    fn unknown_fit_kind_is_a_configuration_error() {
        let err = "spline".parse::<FitKind>().unwrap_err();
        assert_eq!(err, OcError::UnknownFitKind("spline".to_string()));
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn default_config_is_valid() {
        assert!(MinimaConfig::default().validate().is_ok());
    }

    #[test]
    fn validate_rejects_bad_tunables() {
        let bad = [
            MinimaConfig { phase_interval: 0.0, ..MinimaConfig::default() },
            MinimaConfig { phase_interval: 0.7, ..MinimaConfig::default() },
            MinimaConfig { order: 0, ..MinimaConfig::default() },
            MinimaConfig { smoothness: f64::NAN, ..MinimaConfig::default() },
            MinimaConfig { duty_cycle: -0.1, ..MinimaConfig::default() },
            MinimaConfig { threads: Some(0), ..MinimaConfig::default() },
        ];
        for cfg in bad {
            assert!(matches!(cfg.validate(), Err(OcError::InvalidParameter { .. })), "{cfg:?}");
        }
    }

    #[test]
    fn oc_point_omits_missing_error_in_json() {
        let p = OcPoint { time: 1.0, oc: 0.01, error: None };
        let json = serde_json::to_string(&p).unwrap();
        assert_eq!(json, r#"{"time":1.0,"oc":0.01}"#);
    }
}
