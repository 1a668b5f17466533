//! Error types shared by the session core and its adapters

use std::io;
use thiserror::Error;

/// Errors surfaced by item sources, deletion backends and the session controller.
///
/// The type is `Clone` so the controller can keep the most recent failure in
/// its snapshot as `last_error` while still handing copies to the UI.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TriageError {
    /// Access to the photo library was refused. Not retried automatically.
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("I/O failure: {0}")]
    IoFailure(String),

    /// The user declined the consent prompt for a pending deletion.
    #[error("Deletion of {count} photo(s) was not approved")]
    ApprovalDenied { count: usize },

    /// A batch delete removed fewer items than requested.
    ///
    /// Treated as a failure of the whole batch; nothing is counted as confirmed.
    #[error("Batch delete removed {confirmed} of {requested} photos")]
    BatchPartialFailure { confirmed: usize, requested: usize },

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("Nothing to undo")]
    NothingToUndo,

    /// The most recent deletion was submitted and has not been resolved yet.
    #[error("Cannot undo a deletion that is awaiting confirmation")]
    DeletionInFlight,

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Runtime error: {0}")]
    RuntimeError(String),
}

impl From<io::Error> for TriageError {
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::PermissionDenied => TriageError::PermissionDenied(err.to_string()),
            _ => TriageError::IoFailure(err.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, TriageError>;
