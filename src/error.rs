use thiserror::Error;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("GraphQL error in {operation}: {errors}")]
    GraphQL { operation: String, errors: String },

    #[error("API request failed with status {status}: {message}")]
    ApiError { status: u16, message: String },

    #[error("GraphQL response contained no data")]
    NoResponseData,

    #[error("Workout payload could not be repaired: {0}")]
    Repair(#[source] serde_json::Error),

    #[error("Unexpected workout structure: {0}")]
    Extraction(String),

    #[error("No workout id for session '{0}'")]
    MissingWorkoutId(String),

    #[error("Upload rejected with status {status}: {message}")]
    Upload { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("XML serialization error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SyncError {
    /// Whether the error only affects the session being processed.
    ///
    /// Configuration and authentication problems abort the whole run; everything
    /// else raised while handling a single session is logged and skipped.
    pub fn is_session_recoverable(&self) -> bool {
        !matches!(self, SyncError::Config(_) | SyncError::Auth(_))
    }
}

pub type Result<T> = std::result::Result<T, SyncError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_level_errors_are_not_recoverable() {
        assert!(!SyncError::Config("missing password".into()).is_session_recoverable());
        assert!(!SyncError::Auth("bad credentials".into()).is_session_recoverable());
    }

    #[test]
    fn test_session_errors_are_recoverable() {
        let parse_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert!(SyncError::Repair(parse_err).is_session_recoverable());
        assert!(SyncError::MissingWorkoutId("Nine Hammers".into()).is_session_recoverable());
        assert!(SyncError::Upload {
            status: 500,
            message: "boom".into()
        }
        .is_session_recoverable());
    }
}
