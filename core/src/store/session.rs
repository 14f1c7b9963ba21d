use super::DashboardStore;
use crate::error::MindResult;
use rusqlite::{params, OptionalExtension};

impl DashboardStore {
    // ── Session-scoped flags ───────────────────────────────────

    pub fn set_session_flag(&self, session_id: &str, flag: &str, value: &str) -> MindResult<()> {
        self.conn.execute(
            "INSERT INTO session_flag (session_id, flag, value) VALUES (?1, ?2, ?3)
             ON CONFLICT(session_id, flag) DO UPDATE SET value = excluded.value",
            params![session_id, flag, value],
        )?;
        Ok(())
    }

    pub fn session_flag(&self, session_id: &str, flag: &str) -> MindResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM session_flag WHERE session_id = ?1 AND flag = ?2",
                params![session_id, flag],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }
}
