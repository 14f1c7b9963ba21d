use thiserror::Error;

#[derive(Error, Debug)]
pub enum MindError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Malformed input: {reason}")]
    MalformedInput { reason: String },

    #[error("Employee '{employee_id}' not found")]
    EmployeeNotFound { employee_id: String },

    #[error("Employee '{employee_id}' cannot be swapped with itself")]
    InvalidSwap { employee_id: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Remote endpoint {endpoint} returned status {status}")]
    RemoteStatus { endpoint: String, status: u16 },

    #[error("Invalid response from {endpoint}: {reason}")]
    InvalidResponse { endpoint: String, reason: String },

    #[error("Invalid configuration: {reason}")]
    Config { reason: String },
}

impl MindError {
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedInput { reason: reason.into() }
    }

    /// True for failures of a remote collaborator. These are logged and
    /// degraded, never surfaced as a failed user action.
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            Self::Http(_) | Self::RemoteStatus { .. } | Self::InvalidResponse { .. }
        )
    }
}

pub type MindResult<T> = Result<T, MindError>;
