//! Session events: the audit trail of everything that changed the working set.
//!
//! Every event is appended to the store's event log with a per-session
//! sequence number. Variants are only ever appended.

use crate::types::{EmployeeId, SessionId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DashboardEvent {
    // ── Session lifecycle ──────────────────────────
    SessionOpened {
        session_id: SessionId,
        seed: u64,
    },
    SnapshotLoaded {
        count: usize,
    },
    SnapshotUnreadable {
        reason: String,
    },
    SnapshotRefreshed {
        count: usize,
    },

    // ── Ingest ─────────────────────────────────────
    DemoDataGenerated {
        count: usize,
    },
    DataIngested {
        source: IngestSource,
        count: usize,
        critical: usize,
        warning: usize,
        healthy: usize,
    },
    IngestRejected {
        source: IngestSource,
        reason: String,
    },

    // ── Remote prediction ──────────────────────────
    PredictionsApplied {
        matched: usize,
        received: usize,
    },
    PredictionsSkipped {
        reason: String,
    },

    // ── Swaps ──────────────────────────────────────
    SwapApplied {
        staff_id: EmployeeId,
        swap_with_id: EmployeeId,
        new_stress: f64,
    },
    SwapRejected {
        staff_id: EmployeeId,
        swap_with_id: EmployeeId,
        reason: String,
    },
}

impl DashboardEvent {
    /// Stable name for the event_type column.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::SessionOpened { .. }      => "session_opened",
            Self::SnapshotLoaded { .. }     => "snapshot_loaded",
            Self::SnapshotUnreadable { .. } => "snapshot_unreadable",
            Self::SnapshotRefreshed { .. }  => "snapshot_refreshed",
            Self::DemoDataGenerated { .. }  => "demo_data_generated",
            Self::DataIngested { .. }       => "data_ingested",
            Self::IngestRejected { .. }     => "ingest_rejected",
            Self::PredictionsApplied { .. } => "predictions_applied",
            Self::PredictionsSkipped { .. } => "predictions_skipped",
            Self::SwapApplied { .. }        => "swap_applied",
            Self::SwapRejected { .. }       => "swap_rejected",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IngestSource {
    Delimited,
    RemoteApi,
    Rows,
}

/// The event log entry as persisted to SQLite.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventLogEntry {
    pub id:         Option<i64>,
    pub session_id: SessionId,
    pub seq:        u64,
    pub event_type: String,
    pub payload:    String, // JSON-serialized DashboardEvent
    pub created_at: String,
}
