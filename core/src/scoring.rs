//! Metric normalization and stress scoring.
//!
//! score = Σ weight · normalized signal, with task load being the mean of
//! normalized task count and normalized patients handled. The result is
//! clamped to [0, 1] even though the default caps and weights cannot leave it.

use crate::{
    config::ScoringConfig,
    employee::RawMetrics,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Three-level severity band derived from a stress score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StressLevel {
    Healthy,
    Warning,
    Critical,
}

impl StressLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Healthy => "healthy",
            Self::Warning => "warning",
            Self::Critical => "critical",
        }
    }

    /// Title-case label used on badges.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Healthy => "Healthy",
            Self::Warning => "Warning",
            Self::Critical => "Critical",
        }
    }
}

impl fmt::Display for StressLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `clamp(value / cap, 0, 1)`. Non-finite input normalizes to 0.
pub fn normalize(value: f64, cap: f64) -> f64 {
    if !value.is_finite() || cap <= 0.0 {
        return 0.0;
    }
    (value / cap).clamp(0.0, 1.0)
}

/// The five weighted signals, each in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MetricSignals {
    pub hours: f64,
    pub errors: f64,
    pub night_shifts: f64,
    pub login_count: f64,
    pub task_load: f64,
}

/// Stateless scorer over a fixed ScoringConfig.
#[derive(Debug, Clone, Default)]
pub struct StressScorer {
    config: ScoringConfig,
}

impl StressScorer {
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    pub fn signals(&self, m: &RawMetrics) -> MetricSignals {
        let caps = &self.config.caps;
        let task = normalize(m.task_count, caps.task_count);
        let patients = normalize(m.patients_handled, caps.patients_handled);
        MetricSignals {
            hours: normalize(m.avg_hours, caps.hours),
            errors: normalize(m.error_rate, caps.errors),
            night_shifts: normalize(m.night_shifts, caps.night_shifts),
            login_count: normalize(m.login_count, caps.login_count),
            task_load: (task + patients) / 2.0,
        }
    }

    pub fn score(&self, m: &RawMetrics) -> f64 {
        let s = self.signals(m);
        let w = &self.config.weights;
        let raw = s.hours * w.hours
            + s.errors * w.errors
            + s.night_shifts * w.night_shifts
            + s.login_count * w.login_count
            + s.task_load * w.task_load;
        clamp_score(raw)
    }

    /// Band for a score. Lower bounds are inclusive.
    pub fn classify(&self, score: f64) -> StressLevel {
        let t = &self.config.thresholds;
        if score >= t.critical {
            StressLevel::Critical
        } else if score >= t.warning {
            StressLevel::Warning
        } else {
            StressLevel::Healthy
        }
    }
}

/// Clamp to [0, 1]; NaN maps to 0.
pub fn clamp_score(score: f64) -> f64 {
    if score.is_nan() {
        0.0
    } else {
        score.clamp(0.0, 1.0)
    }
}

/// Score as a whole percentage, rounded half away from zero.
pub fn percent(score: f64) -> i64 {
    (score * 100.0).round() as i64
}
