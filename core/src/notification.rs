//! Payloads handed to the messaging and remote-sync collaborators when a
//! swap is applied, plus the dispatcher seam that receives them.

use crate::{
    employee::EmployeeRecord,
    planner::expected_reduction,
    scoring::percent,
    types::EmployeeId,
};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// A swap request addressed to the low-stress side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwapNotification {
    pub to:        String,
    pub from:      String,
    pub subject:   String,
    pub message:   String,
    pub timestamp: String,
}

/// The swap record posted to the optimize endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwapConfirmation {
    pub from:      EmployeeId,
    pub to:        EmployeeId,
    pub timestamp: String,
}

pub const SWAP_SUBJECT: &str = "Shift Swap Request - Help Prevent Colleague Burnout";

impl SwapNotification {
    /// Build from the records as they are before the swap is applied.
    pub fn compose(
        sender: &str,
        high: &EmployeeRecord,
        low: &EmployeeRecord,
        at: DateTime<Utc>,
    ) -> Self {
        let high_pct = percent(high.stress_score());
        let low_pct = percent(low.stress_score());
        let benefit = expected_reduction(high.stress_score(), low.stress_score());
        let message = format!(
            "Hello {low_name},\n\
             \n\
             Our AI system has detected that {high_name} is experiencing high stress levels ({high_pct}%).\n\
             \n\
             Current Status:\n\
             - {high_name}: {high_shift} shift, {nights} night shifts this week\n\
             - Your Status: {low_shift} shift, Low stress ({low_pct}%)\n\
             \n\
             Would you be available for a voluntary shift swap?\n\
             Swapping shifts would help prevent burnout and maintain team wellbeing.\n\
             \n\
             Expected Benefit:\n\
             - Reduces {high_name}'s stress by approximately {benefit}%\n\
             - Maintains overall team balance\n\
             \n\
             Please respond at your earliest convenience.\n\
             \n\
             Thank you for being part of our wellbeing initiative!\n\
             \n\
             Best regards,\n\
             MindEase AI Workforce Management",
            low_name = low.name,
            high_name = high.name,
            high_shift = high.shift,
            nights = high.metrics.night_shifts,
            low_shift = low.shift,
        );
        Self {
            to: low.name.clone(),
            from: sender.to_string(),
            subject: SWAP_SUBJECT.to_string(),
            message,
            timestamp: rfc3339(at),
        }
    }
}

impl SwapConfirmation {
    pub fn new(from: &str, to: &str, at: DateTime<Utc>) -> Self {
        Self {
            from: from.to_string(),
            to: to.to_string(),
            timestamp: rfc3339(at),
        }
    }
}

fn rfc3339(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Receives swap payloads. Dispatch is fire-and-forget: implementations
/// must not report back and must not touch the working set.
pub trait SwapDispatcher {
    fn dispatch(&self, notification: &SwapNotification, confirmation: &SwapConfirmation);
}

/// Offline dispatcher: records the hand-off in the log only.
pub struct LogDispatcher;

impl SwapDispatcher for LogDispatcher {
    fn dispatch(&self, notification: &SwapNotification, confirmation: &SwapConfirmation) {
        log::info!(
            "Swap request for {} ({} -> {}) not sent: offline",
            notification.to,
            confirmation.from,
            confirmation.to
        );
    }
}
