use serde::{Deserialize, Serialize};

/// Commands a front end can send to a running session (one JSON object per
/// line in IPC mode). Variants are only ever appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum DashboardCommand {
    GetState,
    IngestCsv {
        /// Raw delimited text, not a path.
        text: String,
    },
    IngestRows {
        employees: Vec<crate::types::RawRow>,
    },
    Plan,
    ApplySwap {
        staff_id: String,
        swap_with_id: String,
    },
    Refresh,
    Quit,
}
