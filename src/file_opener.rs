// Hands a photo to the system viewer

use crate::error::{Result, TriageError};
use std::path::Path;
use tracing::info;

/// Opens the photo with the platform's default application.
///
/// Returns once the viewer has been launched; it does not wait for it to close.
pub fn open_file(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(TriageError::IoFailure(format!(
            "File not found: {}",
            path.display()
        )));
    }

    info!(path = %path.display(), "opening in system viewer");
    open::that_detached(path).map_err(TriageError::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_missing_file_fails_without_launching() {
        let result = open_file(Path::new("/nonexistent/photo.jpg"));
        assert!(matches!(result, Err(TriageError::IoFailure(msg)) if msg.contains("not found")));
    }
}
