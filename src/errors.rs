use thiserror::Error;

/// Result type for gate-pass client operations
pub type GatePassResult<T> = Result<T, GatePassError>;

/// Errors that can occur while driving the approval workflow.
///
/// Validation errors are raised before any network call is issued. Transport
/// and Backend errors abort the action and leave local state unchanged.
/// Side-channel failures (notification mail, profile enrichment) are never
/// surfaced through this enum; they degrade to warnings on the action report.
#[derive(Debug, Error)]
pub enum GatePassError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Gateway request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Backend rejected the call ({status_code}): {message}")]
    Backend { status_code: u16, message: String },

    #[error("Failed to decode backend payload: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Session error: {0}")]
    Session(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Template rendering failed: {0}")]
    Template(#[from] tera::Error),
}

impl GatePassError {
    pub fn validation(message: impl Into<String>) -> Self {
        GatePassError::Validation(message.into())
    }

    pub fn backend(status_code: u16, message: impl Into<String>) -> Self {
        GatePassError::Backend {
            status_code,
            message: message.into(),
        }
    }

    /// ✅ **Check whether the error was caught before any network call**
    pub fn is_validation(&self) -> bool {
        matches!(self, GatePassError::Validation(_))
    }
}
