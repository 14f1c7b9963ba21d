//! Record ingest: loosely typed rows → scored EmployeeRecords.
//!
//! Field names are looked up snake_case first, then in space-separated form
//! ("avg hours"). A field is absent when the key is missing, null, or a blank
//! string. Present but unparseable numbers coerce to 0.

use crate::{
    csv_input::parse_delimited,
    employee::{EmployeeRecord, RawMetrics, DEFAULT_NAME, DEFAULT_SHIFT},
    error::{MindError, MindResult},
    rng::RandomSource,
    scoring::StressScorer,
    types::RawRow,
};
use serde_json::Value;

const ID_PREFIX: &str = "EMP";
const ID_ALPHABET: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const ID_SUFFIX_LEN: usize = 6;

/// Exclusive upper bounds for placeholder metrics when a row omits them.
pub const PLACEHOLDER_LOGIN_MAX: u64 = 100;
pub const PLACEHOLDER_TASK_MAX: u64 = 150;
pub const PLACEHOLDER_PATIENTS_MAX: u64 = 50;

#[derive(Debug, Clone, Default)]
pub struct RecordIngestor {
    scorer: StressScorer,
}

impl RecordIngestor {
    pub fn new(scorer: StressScorer) -> Self {
        Self { scorer }
    }

    pub fn scorer(&self) -> &StressScorer {
        &self.scorer
    }

    /// Parse delimited text and ingest it. Fails without a partial result
    /// if the text is malformed or yields no rows.
    pub fn ingest_delimited(
        &self,
        text: &str,
        rng: &mut dyn RandomSource,
    ) -> MindResult<Vec<EmployeeRecord>> {
        let rows = parse_delimited(text)?;
        if rows.is_empty() {
            return Err(MindError::malformed("No valid data found in CSV"));
        }
        Ok(self.ingest(&rows, rng))
    }

    pub fn ingest(&self, rows: &[RawRow], rng: &mut dyn RandomSource) -> Vec<EmployeeRecord> {
        rows.iter().map(|row| self.ingest_row(row, rng)).collect()
    }

    pub fn ingest_row(&self, row: &RawRow, rng: &mut dyn RandomSource) -> EmployeeRecord {
        let employee_id = text_field(row, "employee_id").unwrap_or_else(|| random_employee_id(rng));
        let name = text_field(row, "name").unwrap_or_else(|| DEFAULT_NAME.to_string());

        let avg_hours = metric(row, "avg_hours").unwrap_or(0.0);
        let error_rate = metric(row, "error_rate").unwrap_or(0.0);
        let night_shifts = metric(row, "night_shifts").unwrap_or(0.0);
        let shift = text_field(row, "shift").unwrap_or_else(|| DEFAULT_SHIFT.to_string());
        let login_count = metric(row, "login_count")
            .unwrap_or_else(|| rng.next_u64_below(PLACEHOLDER_LOGIN_MAX) as f64);
        let task_count = metric(row, "task_count")
            .unwrap_or_else(|| rng.next_u64_below(PLACEHOLDER_TASK_MAX) as f64);
        let patients_handled = metric(row, "patients_handled")
            .unwrap_or_else(|| rng.next_u64_below(PLACEHOLDER_PATIENTS_MAX) as f64);

        let metrics = RawMetrics {
            avg_hours,
            error_rate,
            night_shifts,
            login_count,
            task_count,
            patients_handled,
        };
        EmployeeRecord::scored(employee_id, name, shift, metrics, &self.scorer)
    }
}

/// Find a field by its snake_case name, falling back to the spaced form.
fn lookup<'a>(row: &'a RawRow, snake: &str) -> Option<&'a Value> {
    let present = |v: &&Value| match v {
        Value::Null => false,
        Value::String(s) => !s.trim().is_empty(),
        _ => true,
    };
    row.get(snake)
        .filter(present)
        .or_else(|| row.get(&snake.replace('_', " ")).filter(present))
}

fn text_field(row: &RawRow, key: &str) -> Option<String> {
    lookup(row, key).map(|v| match v {
        Value::String(s) => s.trim().to_string(),
        other => other.to_string(),
    })
}

fn metric(row: &RawRow, key: &str) -> Option<f64> {
    lookup(row, key).map(coerce_number)
}

/// Non-numeric, non-finite and negative values all become 0.
fn coerce_number(v: &Value) -> f64 {
    let n = match v {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.trim().parse::<f64>().unwrap_or(0.0),
        _ => 0.0,
    };
    if n.is_finite() && n > 0.0 {
        n
    } else {
        0.0
    }
}

fn random_employee_id(rng: &mut dyn RandomSource) -> String {
    let suffix: String = (0..ID_SUFFIX_LEN)
        .map(|_| ID_ALPHABET[rng.next_u64_below(ID_ALPHABET.len() as u64) as usize] as char)
        .collect();
    format!("{ID_PREFIX}{suffix}")
}
