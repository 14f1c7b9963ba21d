use crate::error::{MindError, MindResult};
use serde::{Deserialize, Serialize};

// ── Scoring ────────────────────────────────────────────────────────

/// Normalization caps. A raw metric at or above its cap normalizes to 1.0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricCaps {
    pub hours: f64,
    pub errors: f64,
    pub night_shifts: f64,
    pub login_count: f64,
    pub task_count: f64,
    pub patients_handled: f64,
}

impl Default for MetricCaps {
    fn default() -> Self {
        Self {
            hours: 12.0,
            errors: 10.0,
            night_shifts: 5.0,
            login_count: 100.0,
            task_count: 150.0,
            patients_handled: 50.0,
        }
    }
}

/// Signal weights. Must sum to 1.0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StressWeights {
    pub hours: f64,
    pub errors: f64,
    pub night_shifts: f64,
    pub login_count: f64,
    pub task_load: f64,
}

impl Default for StressWeights {
    fn default() -> Self {
        Self {
            hours: 0.30,
            errors: 0.25,
            night_shifts: 0.20,
            login_count: 0.15,
            task_load: 0.10,
        }
    }
}

impl StressWeights {
    pub fn total(&self) -> f64 {
        self.hours + self.errors + self.night_shifts + self.login_count + self.task_load
    }
}

/// Lower bounds (inclusive) of the warning and critical bands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StressThresholds {
    pub warning: f64,
    pub critical: f64,
}

impl Default for StressThresholds {
    fn default() -> Self {
        Self { warning: 0.4, critical: 0.7 }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub caps: MetricCaps,
    pub weights: StressWeights,
    pub thresholds: StressThresholds,
}

// ── Planner / swap ─────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Flat score reduction applied to the high-stress side of a swap.
    pub swap_stress_decrement: f64,
    /// Sender shown on swap notifications.
    pub notification_sender: String,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            swap_stress_decrement: 0.2,
            notification_sender: "MindEase AI System".into(),
        }
    }
}

// ── Remote endpoints ───────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    /// Base URL for /predict, /notify and /optimize.
    pub api_endpoint: String,
    /// Post the ingested set to /predict and take its scores when it answers.
    pub predict_on_ingest: bool,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            api_endpoint: "http://localhost:5000/api".into(),
            predict_on_ingest: true,
        }
    }
}

// ── Persistence ────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Key the working-set snapshot is stored under.
    pub snapshot_key: String,
    /// Polling interval used by the statistics view.
    pub refresh_interval_secs: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            snapshot_key: "employeeData".into(),
            refresh_interval_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub scoring: ScoringConfig,
    pub planner: PlannerConfig,
    pub remote: RemoteConfig,
    pub store: StoreConfig,
}

impl DashboardConfig {
    /// Load from a JSON file. Missing sections and fields keep their defaults.
    /// In tests, use DashboardConfig::default_test().
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config: DashboardConfig = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Cannot parse {path}: {e}"))?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults with remote calls pointed at a closed local port and
    /// prediction disabled, so tests never depend on a live backend.
    pub fn default_test() -> Self {
        Self {
            remote: RemoteConfig {
                api_endpoint: "http://127.0.0.1:9/api".into(),
                predict_on_ingest: false,
            },
            ..Self::default()
        }
    }

    pub fn validate(&self) -> MindResult<()> {
        let caps = &self.scoring.caps;
        for (name, cap) in [
            ("hours", caps.hours),
            ("errors", caps.errors),
            ("night_shifts", caps.night_shifts),
            ("login_count", caps.login_count),
            ("task_count", caps.task_count),
            ("patients_handled", caps.patients_handled),
        ] {
            if !(cap.is_finite() && cap > 0.0) {
                return Err(config_error(format!("cap '{name}' must be positive, got {cap}")));
            }
        }

        let total = self.scoring.weights.total();
        if (total - 1.0).abs() > 1e-9 {
            return Err(config_error(format!("weights must sum to 1.0, got {total}")));
        }

        let t = &self.scoring.thresholds;
        if !(0.0 < t.warning && t.warning < t.critical && t.critical <= 1.0) {
            return Err(config_error(format!(
                "thresholds must satisfy 0 < warning < critical <= 1, got {} / {}",
                t.warning, t.critical
            )));
        }

        let dec = self.planner.swap_stress_decrement;
        if !(dec.is_finite() && dec >= 0.0) {
            return Err(config_error(format!("swap decrement must be >= 0, got {dec}")));
        }

        if self.store.snapshot_key.trim().is_empty() {
            return Err(config_error("snapshot key must not be empty"));
        }
        Ok(())
    }
}

fn config_error(reason: impl Into<String>) -> MindError {
    MindError::Config { reason: reason.into() }
}
