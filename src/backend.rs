//! Destructive delete backends

use crate::domain::Item;
use crate::error::{Result, TriageError};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use tracing::{debug, info, warn};

/// Opaque handle for a delete that waits on user consent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ApprovalToken(pub u64);

/// Result of asking a backend to delete one or more items
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    Success,
    /// Nothing has been deleted yet; the user must approve first
    RequiresApproval(ApprovalToken),
    Error(TriageError),
}

/// Performs destructive deletes on behalf of the session.
///
/// Calls may block; the driver runs them on a blocking worker thread.
pub trait DeletionBackend: Send + Sync {
    fn delete(&self, item: &Item) -> DeleteOutcome;

    /// Deletes a non-empty batch. Anything short of all items is an error.
    fn delete_batch(&self, items: &[Item]) -> DeleteOutcome;

    /// Forgets a request waiting on consent without deleting anything.
    ///
    /// Called when the session stops tracking the request. Unknown tokens are
    /// ignored.
    fn cancel(&self, token: ApprovalToken);
}

/// Moves photos to the system trash, optionally behind a consent step.
#[derive(Debug, Default)]
pub struct TrashBackend {
    /// Validate and log but never touch the filesystem
    dry_run: bool,
    /// Hold every request until [`TrashBackend::resolve`] is called
    require_approval: bool,
    pending: Mutex<HashMap<ApprovalToken, Vec<PathBuf>>>,
    next_token: AtomicU64,
}

impl TrashBackend {
    pub fn new(dry_run: bool, require_approval: bool) -> Self {
        Self {
            dry_run,
            require_approval,
            ..Self::default()
        }
    }

    /// Number of requests waiting on consent
    pub fn pending_count(&self) -> usize {
        self.pending.lock().map(|p| p.len()).unwrap_or(0)
    }

    fn submit(&self, paths: Vec<PathBuf>) -> DeleteOutcome {
        if self.require_approval {
            let token = ApprovalToken(self.next_token.fetch_add(1, Ordering::Relaxed) + 1);
            return match self.pending.lock() {
                Ok(mut pending) => {
                    debug!(?token, count = paths.len(), "delete awaiting approval");
                    pending.insert(token, paths);
                    DeleteOutcome::RequiresApproval(token)
                }
                Err(_) => DeleteOutcome::Error(TriageError::RuntimeError(
                    "Approval registry lock poisoned".to_string(),
                )),
            };
        }

        match self.trash_paths(&paths) {
            Ok(()) => DeleteOutcome::Success,
            Err(e) => DeleteOutcome::Error(e),
        }
    }

    /// Completes the consent round trip for `token`.
    ///
    /// An approved request is carried out now; a declined one is dropped
    /// without touching the files.
    pub fn resolve(&self, token: ApprovalToken, approved: bool) -> Result<()> {
        let paths = self
            .pending
            .lock()
            .map_err(|_| TriageError::RuntimeError("Approval registry lock poisoned".to_string()))?
            .remove(&token)
            .ok_or_else(|| TriageError::DeleteFailed(format!("Unknown approval {:?}", token)))?;

        if !approved {
            info!(?token, count = paths.len(), "delete declined");
            return Ok(());
        }

        self.trash_paths(&paths)
    }

    fn trash_paths(&self, paths: &[PathBuf]) -> Result<()> {
        let requested = paths.len();

        // Refuse the whole request if anything is already gone
        if let Some(missing) = paths.iter().find(|p| !p.exists()) {
            warn!(path = %missing.display(), "photo to delete not found");
            return Err(if requested == 1 {
                TriageError::DeleteFailed(format!("File not found: {}", missing.display()))
            } else {
                TriageError::BatchPartialFailure {
                    confirmed: 0,
                    requested,
                }
            });
        }

        if self.dry_run {
            info!(count = requested, "[dry run] would move photos to trash");
            return Ok(());
        }

        let mut confirmed = 0;
        let mut last_failure = None;
        for path in paths {
            match trash::delete(path) {
                Ok(()) => confirmed += 1,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "trash failed");
                    last_failure = Some(e.to_string());
                }
            }
        }

        match last_failure {
            None => {
                info!(count = confirmed, "moved photos to trash");
                Ok(())
            }
            Some(reason) if requested == 1 => Err(TriageError::DeleteFailed(reason)),
            Some(_) => Err(TriageError::BatchPartialFailure {
                confirmed,
                requested,
            }),
        }
    }
}

impl DeletionBackend for TrashBackend {
    fn delete(&self, item: &Item) -> DeleteOutcome {
        self.submit(vec![item.locator.clone()])
    }

    fn delete_batch(&self, items: &[Item]) -> DeleteOutcome {
        if items.is_empty() {
            return DeleteOutcome::Success;
        }
        self.submit(items.iter().map(|item| item.locator.clone()).collect())
    }

    fn cancel(&self, token: ApprovalToken) {
        match self.pending.lock() {
            Ok(mut pending) => {
                if let Some(paths) = pending.remove(&token) {
                    debug!(?token, count = paths.len(), "approval request cancelled");
                }
            }
            Err(_) => warn!(?token, "approval registry lock poisoned"),
        }
    }
}
