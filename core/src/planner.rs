//! Shift optimization planner.
//!
//! Greedy, first-fit, single pass: each critical record (in order) takes the
//! first unclaimed healthy record (in order). Warning-band records never
//! participate. A critical record left without a partner is dropped silently.

use crate::{
    employee::EmployeeRecord,
    scoring::{percent, StressLevel},
    types::EmployeeId,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A suggested shift exchange between a critical and a healthy employee.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwapProposal {
    pub staff_id:           EmployeeId,
    pub staff_name:         String,
    pub current_shift:      String,
    pub suggested_shift:    String,
    pub swap_with_id:       EmployeeId,
    pub swap_with_name:     String,
    pub current_stress:     f64,
    pub target_stress:      f64,
    /// Half the score gap, as a whole percentage.
    pub expected_reduction: i64,
    pub reason:             String,
    pub impact:             String,
}

/// Display derivatives of a planning pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptimizationSummary {
    pub swap_count:        usize,
    pub average_reduction: i64,
    pub balance:           i64,
}

pub struct OptimizationPlanner;

impl OptimizationPlanner {
    pub fn plan(records: &[EmployeeRecord]) -> Vec<SwapProposal> {
        let healthy: Vec<&EmployeeRecord> = records
            .iter()
            .filter(|e| e.is_level(StressLevel::Healthy))
            .collect();
        let mut claimed: HashSet<&str> = HashSet::new();
        let mut proposals = Vec::new();

        for critical in records.iter().filter(|e| e.is_level(StressLevel::Critical)) {
            let partner = healthy.iter().find(|h| {
                !claimed.contains(h.employee_id.as_str()) && h.employee_id != critical.employee_id
            });
            match partner {
                Some(h) => {
                    claimed.insert(h.employee_id.as_str());
                    proposals.push(Self::proposal(critical, h));
                }
                None => log::debug!("No healthy partner left for {}", critical.employee_id),
            }
        }
        proposals
    }

    fn proposal(critical: &EmployeeRecord, healthy: &EmployeeRecord) -> SwapProposal {
        let expected_reduction = expected_reduction(critical.stress_score(), healthy.stress_score());
        SwapProposal {
            staff_id: critical.employee_id.clone(),
            staff_name: critical.name.clone(),
            current_shift: critical.shift.clone(),
            suggested_shift: healthy.shift.clone(),
            swap_with_id: healthy.employee_id.clone(),
            swap_with_name: healthy.name.clone(),
            current_stress: critical.stress_score(),
            target_stress: healthy.stress_score(),
            expected_reduction,
            reason: format!(
                "High stress ({}%) - {} night shifts, {:.1}h avg",
                percent(critical.stress_score()),
                critical.metrics.night_shifts,
                critical.metrics.avg_hours
            ),
            impact: format!("Expected stress reduction: {expected_reduction}%"),
        }
    }

    /// Zero proposals is a defined case: 0% reduction, 100% balance.
    pub fn summarize(proposals: &[SwapProposal], records: &[EmployeeRecord]) -> OptimizationSummary {
        if proposals.is_empty() || records.is_empty() {
            return OptimizationSummary {
                swap_count: proposals.len(),
                average_reduction: 0,
                balance: 100,
            };
        }
        let total: i64 = proposals.iter().map(|p| p.expected_reduction).sum();
        let average = total as f64 / proposals.len() as f64;
        let healthy = records.iter().filter(|e| e.is_level(StressLevel::Healthy)).count();
        OptimizationSummary {
            swap_count: proposals.len(),
            average_reduction: average.round() as i64,
            balance: (healthy as f64 / records.len() as f64 * 100.0).round() as i64,
        }
    }
}

/// round((critical - healthy) / 2 * 100)
pub fn expected_reduction(critical_score: f64, healthy_score: f64) -> i64 {
    ((critical_score - healthy_score) / 2.0 * 100.0).round() as i64
}
