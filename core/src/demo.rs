//! Deterministic demo roster used when no working set has been stored yet.
//!
//! Rows are raw (not yet scored) and go through the normal ingestor, so
//! demo staff are scored exactly like uploaded staff.

use crate::{rng::RandomSource, types::RawRow};
use serde_json::json;

/// Placeholder roster generator.
pub struct DemoRoster;

impl DemoRoster {
    /// One raw row per placeholder name, ids E001.. in order.
    pub fn generate(rng: &mut dyn RandomSource) -> Vec<RawRow> {
        let shifts = Self::shifts();
        Self::names()
            .iter()
            .enumerate()
            .map(|(i, name)| {
                let row = json!({
                    "employee_id":      format!("E{:03}", i + 1),
                    "name":             name,
                    "avg_hours":        rng.uniform(7.0, 12.0),
                    "error_rate":       rng.uniform(0.0, 8.0),
                    "night_shifts":     rng.next_u64_below(5),
                    "shift":            shifts[i % shifts.len()],
                    "login_count":      40 + rng.next_u64_below(80),
                    "task_count":       60 + rng.next_u64_below(120),
                    "patients_handled": 10 + rng.next_u64_below(40),
                });
                match row {
                    serde_json::Value::Object(map) => map,
                    _ => RawRow::new(),
                }
            })
            .collect()
    }

    pub fn shifts() -> &'static [&'static str] {
        &["Day-A", "Day-B", "Night-1", "Night-2", "Evening"]
    }

    fn names() -> &'static [&'static str] {
        &[
            "Dr. Anderson", "Nurse Peterson", "Dr. Martinez", "Nurse Johnson", "Dr. Williams",
            "Nurse Brown", "Dr. Garcia", "Nurse Davis", "Dr. Rodriguez", "Nurse Wilson",
            "Dr. Thompson", "Nurse Moore", "Dr. Taylor", "Nurse Jackson", "Dr. Lee",
            "Nurse White", "Dr. Harris", "Nurse Martin", "Dr. Clark", "Nurse Lewis",
        ]
    }
}
