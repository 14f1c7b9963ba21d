use super::DashboardStore;
use crate::{employee::EmployeeRecord, error::MindResult};

impl DashboardStore {
    // ── Working-set snapshot ───────────────────────────────────

    /// Serialize the whole working set under `key`, replacing any prior blob.
    pub fn save_working_set(&self, key: &str, records: &[EmployeeRecord]) -> MindResult<()> {
        let json = serde_json::to_string(records)?;
        self.put_value(key, &json)?;
        log::debug!("Snapshot '{key}' saved ({} records)", records.len());
        Ok(())
    }

    /// `Ok(None)` when nothing is stored; `Err(Serialization)` when the blob
    /// is present but unreadable.
    pub fn load_working_set(&self, key: &str) -> MindResult<Option<Vec<EmployeeRecord>>> {
        match self.get_value(key)? {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }
}
