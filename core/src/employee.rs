//! The employee record: one staff member's activity snapshot and risk state.

use crate::{
    scoring::{clamp_score, StressLevel, StressScorer},
    types::EmployeeId,
};
use serde::{Deserialize, Serialize};

pub const DEFAULT_NAME: &str = "Unknown Employee";
pub const DEFAULT_SHIFT: &str = "Day";

/// The six raw activity metrics. All non-negative.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawMetrics {
    pub avg_hours: f64,
    pub error_rate: f64,
    pub night_shifts: f64,
    pub login_count: f64,
    pub task_count: f64,
    pub patients_handled: f64,
}

/// An employee with derived stress state.
///
/// `stress_score` and `stress_level` are only writable through
/// [`EmployeeRecord::set_stress_score`], which reclassifies in the same call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployeeRecord {
    pub employee_id: EmployeeId,
    pub name: String,
    #[serde(flatten)]
    pub metrics: RawMetrics,
    pub shift: String,
    stress_score: f64,
    stress_level: StressLevel,
}

impl EmployeeRecord {
    /// Build a record and score it from its raw metrics.
    pub fn scored(
        employee_id: impl Into<EmployeeId>,
        name: impl Into<String>,
        shift: impl Into<String>,
        metrics: RawMetrics,
        scorer: &StressScorer,
    ) -> Self {
        let stress_score = scorer.score(&metrics);
        Self {
            employee_id: employee_id.into(),
            name: name.into(),
            metrics,
            shift: shift.into(),
            stress_score,
            stress_level: scorer.classify(stress_score),
        }
    }

    pub fn stress_score(&self) -> f64 {
        self.stress_score
    }

    pub fn stress_level(&self) -> StressLevel {
        self.stress_level
    }

    /// Overwrite the score (clamped to [0, 1]) and reclassify.
    pub fn set_stress_score(&mut self, score: f64, scorer: &StressScorer) {
        self.stress_score = clamp_score(score);
        self.stress_level = scorer.classify(self.stress_score);
    }

    /// Department label: the shift prefix before the first '-'.
    pub fn department(&self) -> &str {
        self.shift.split('-').next().unwrap_or(&self.shift)
    }

    pub fn is_level(&self, level: StressLevel) -> bool {
        self.stress_level == level
    }
}
