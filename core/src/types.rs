//! Shared primitive types used across the whole dashboard core.

/// A stable identifier for one staff member in the working set.
pub type EmployeeId = String;

/// Identifies one page context (one owner of a working set).
pub type SessionId = String;

/// A raw input row: field name to string/number, as produced by the
/// delimited-text parser or a remote JSON payload.
pub type RawRow = serde_json::Map<String, serde_json::Value>;
