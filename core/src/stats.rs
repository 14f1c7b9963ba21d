//! Dashboard statistics: display derivatives over the working set.
//!
//! Nothing here mutates records. Empty sets produce zeros, never NaN.

use crate::{
    employee::EmployeeRecord,
    rng::RandomSource,
    scoring::StressLevel,
};
use serde::{Deserialize, Serialize};

// ── Analytics cards ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsCards {
    pub total_staff:    usize,
    /// Mean stress score in [0, 1].
    pub average_stress: f64,
    pub critical_count: usize,
    pub healthy_count:  usize,
}

pub fn analytics_cards(records: &[EmployeeRecord]) -> AnalyticsCards {
    AnalyticsCards {
        total_staff: records.len(),
        average_stress: average_stress(records),
        critical_count: count_level(records, StressLevel::Critical),
        healthy_count: count_level(records, StressLevel::Healthy),
    }
}

pub fn average_stress(records: &[EmployeeRecord]) -> f64 {
    if records.is_empty() {
        return 0.0;
    }
    records.iter().map(|e| e.stress_score()).sum::<f64>() / records.len() as f64
}

pub fn count_level(records: &[EmployeeRecord], level: StressLevel) -> usize {
    records.iter().filter(|e| e.is_level(level)).count()
}

/// Records by descending stress score. Ties keep their input order.
pub fn ranked_by_stress(records: &[EmployeeRecord]) -> Vec<&EmployeeRecord> {
    let mut ranked: Vec<&EmployeeRecord> = records.iter().collect();
    ranked.sort_by(|a, b| b.stress_score().total_cmp(&a.stress_score()));
    ranked
}

// ── Distribution ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BandShare {
    pub count:   usize,
    pub percent: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StressDistribution {
    pub healthy:  BandShare,
    pub warning:  BandShare,
    pub critical: BandShare,
}

pub fn distribution(records: &[EmployeeRecord]) -> StressDistribution {
    let total = records.len();
    let share = |level| {
        let count = count_level(records, level);
        let percent = if total == 0 { 0.0 } else { count as f64 / total as f64 * 100.0 };
        BandShare { count, percent }
    };
    StressDistribution {
        healthy: share(StressLevel::Healthy),
        warning: share(StressLevel::Warning),
        critical: share(StressLevel::Critical),
    }
}

// ── Departments ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepartmentStats {
    pub name:           String,
    pub count:          usize,
    pub average_stress: f64,
    pub critical:       usize,
}

/// Grouped by shift prefix, in first-seen order.
pub fn department_stats(records: &[EmployeeRecord]) -> Vec<DepartmentStats> {
    let mut out: Vec<(DepartmentStats, f64)> = Vec::new();
    for e in records {
        let dept = e.department();
        let idx = match out.iter().position(|(d, _)| d.name == dept) {
            Some(i) => i,
            None => {
                out.push((
                    DepartmentStats {
                        name: dept.to_string(),
                        count: 0,
                        average_stress: 0.0,
                        critical: 0,
                    },
                    0.0,
                ));
                out.len() - 1
            }
        };
        let (stats, total) = &mut out[idx];
        stats.count += 1;
        *total += e.stress_score();
        if e.is_level(StressLevel::Critical) {
            stats.critical += 1;
        }
    }
    out.into_iter()
        .map(|(mut stats, total)| {
            stats.average_stress = total / stats.count as f64;
            stats
        })
        .collect()
}

// ── Home page counters ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HomeCounters {
    /// Staff outside the healthy band.
    pub detected:  usize,
    pub prevented: usize,
}

pub fn home_counters(records: &[EmployeeRecord]) -> HomeCounters {
    HomeCounters {
        detected: records.len() - count_level(records, StressLevel::Healthy),
        prevented: (records.len() as f64 * 0.75).floor() as usize,
    }
}

// ── Weekly trend ─────────────────────────────────────────────────────────────

pub const WEEKDAYS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];
const TREND_JITTER: f64 = 15.0;
const TREND_FLOOR: f64 = 20.0;
const TREND_CEIL: f64 = 90.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub day:     String,
    pub percent: f64,
}

/// Seven illustrative points around the current average stress (percent),
/// jittered by ±7.5 and kept within [20, 90].
pub fn weekly_trend(records: &[EmployeeRecord], rng: &mut dyn RandomSource) -> Vec<TrendPoint> {
    let avg = average_stress(records) * 100.0;
    WEEKDAYS
        .iter()
        .map(|day| {
            let variance = (rng.next_f64() - 0.5) * TREND_JITTER;
            TrendPoint {
                day: day.to_string(),
                percent: (avg + variance).clamp(TREND_FLOOR, TREND_CEIL),
            }
        })
        .collect()
}
