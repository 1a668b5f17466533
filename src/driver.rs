// Session driver: runs controller effects on a background runtime
//
// The controller never performs I/O. The driver owns it together with a tokio
// runtime, hands each `Effect` to a blocking worker, and applies the
// resulting `Completion`s one at a time on the thread that owns the driver.

use crate::backend::{DeleteOutcome, DeletionBackend};
use crate::domain::{
    Action, Completion, DeleteMode, Effect, SessionController, SessionState, SortOrder,
};
use crate::error::{Result, TriageError};
use crate::source::ItemSource;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, watch};
use tracing::{debug, warn};

/// Owns a review session and the plumbing to its source and backend.
///
/// Intents mutate the session synchronously and return immediately; backend
/// results are picked up by [`SessionDriver::poll`].
pub struct SessionDriver {
    controller: SessionController,
    runtime: tokio::runtime::Runtime,
    source: Arc<dyn ItemSource>,
    backend: Arc<dyn DeletionBackend>,
    completion_tx: mpsc::UnboundedSender<Completion>,
    completion_rx: mpsc::UnboundedReceiver<Completion>,
    snapshot_tx: watch::Sender<SessionState>,
    /// Effects dispatched whose completion has not been received
    in_flight: usize,
}

impl SessionDriver {
    pub fn new(
        source: Arc<dyn ItemSource>,
        backend: Arc<dyn DeletionBackend>,
        sort_order: SortOrder,
        delete_mode: DeleteMode,
    ) -> Result<Self> {
        let runtime = tokio::runtime::Runtime::new()
            .map_err(|e| TriageError::RuntimeError(format!("Failed to start runtime: {}", e)))?;
        let controller = SessionController::new(sort_order, delete_mode);
        let (completion_tx, completion_rx) = mpsc::unbounded_channel();
        let (snapshot_tx, _) = watch::channel(controller.state().clone());

        Ok(Self {
            controller,
            runtime,
            source,
            backend,
            completion_tx,
            completion_rx,
            snapshot_tx,
            in_flight: 0,
        })
    }

    pub fn state(&self) -> &SessionState {
        self.controller.state()
    }

    /// Receives a fresh snapshot after every applied change
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.snapshot_tx.subscribe()
    }

    /// Whether backend work is still outstanding
    pub fn is_busy(&self) -> bool {
        self.in_flight > 0
    }

    pub fn load(&mut self, order: SortOrder) {
        let effects = self.controller.load(order);
        self.apply(effects);
    }

    pub fn ensure_loaded(&mut self, order: SortOrder) {
        let effects = self.controller.ensure_loaded(order);
        self.apply(effects);
    }

    pub fn reload(&mut self) {
        let effects = self.controller.reload();
        self.apply(effects);
    }

    pub fn clear_error(&mut self) {
        self.controller.clear_error();
        self.publish();
    }

    pub fn set_sort_order(&mut self, order: SortOrder) {
        let effects = self.controller.set_sort_order(order);
        self.apply(effects);
    }

    pub fn set_delete_mode(&mut self, mode: DeleteMode) {
        self.controller.set_delete_mode(mode);
        self.publish();
    }

    pub fn restart(&mut self) {
        self.controller.restart();
        self.publish();
    }

    pub fn keep(&mut self) {
        let effects = self.controller.keep();
        self.apply(effects);
    }

    pub fn delete(&mut self) {
        let effects = self.controller.delete();
        self.apply(effects);
    }

    pub fn skip(&mut self) {
        self.controller.skip();
        self.publish();
    }

    pub fn previous(&mut self) {
        self.controller.previous();
        self.publish();
    }

    pub fn undo(&mut self) -> Result<Action> {
        let result = self.controller.undo();
        if result.is_ok() {
            self.publish();
        }
        result
    }

    pub fn commit_queued_deletes(&mut self) {
        let effects = self.controller.commit_queued_deletes();
        self.apply(effects);
    }

    pub fn approval_resolved(&mut self, success: bool) {
        let effects = self.controller.approval_resolved(success);
        self.apply(effects);
    }

    /// Applies every completion that has arrived so far without blocking.
    ///
    /// Returns the number of completions applied.
    pub fn poll(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(completion) = self.completion_rx.try_recv() {
            self.complete(completion);
            applied += 1;
        }
        if applied > 0 {
            self.publish();
        }
        applied
    }

    /// Blocks until all outstanding backend work has completed.
    ///
    /// Returns false if `timeout` elapses first.
    pub fn wait_idle(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;

        while self.in_flight > 0 {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return false;
            }

            let rx = &mut self.completion_rx;
            let next = self
                .runtime
                .block_on(async { tokio::time::timeout(remaining, rx.recv()).await });

            match next {
                Ok(Some(completion)) => {
                    self.complete(completion);
                    self.publish();
                }
                Ok(None) | Err(_) => return false,
            }
        }
        true
    }

    fn complete(&mut self, completion: Completion) {
        self.in_flight = self.in_flight.saturating_sub(1);
        let effects = self.controller.complete(completion);
        self.dispatch(effects);
    }

    fn apply(&mut self, effects: Vec<Effect>) {
        self.dispatch(effects);
        self.publish();
    }

    fn publish(&self) {
        self.snapshot_tx.send_replace(self.controller.state().clone());
    }

    fn dispatch(&mut self, effects: Vec<Effect>) {
        for token in self.controller.take_abandoned_approvals() {
            debug!(?token, "releasing abandoned approval");
            self.backend.cancel(token);
        }

        for effect in effects {
            self.in_flight += 1;
            let tx = self.completion_tx.clone();
            debug!(ticket = ?effect.ticket(), "dispatching effect");

            match effect {
                Effect::Load { ticket, order } => {
                    let source = Arc::clone(&self.source);
                    self.runtime.spawn(async move {
                        let result =
                            tokio::task::spawn_blocking(move || source.list_items(order)).await;
                        let result = result.unwrap_or_else(|e| {
                            Err(TriageError::RuntimeError(format!("Load task panicked: {}", e)))
                        });
                        if tx.send(Completion::Loaded { ticket, result }).is_err() {
                            warn!("session dropped before load completed");
                        }
                    });
                }
                Effect::Delete { ticket, item } => {
                    let backend = Arc::clone(&self.backend);
                    self.runtime.spawn(async move {
                        let outcome =
                            tokio::task::spawn_blocking(move || backend.delete(&item)).await;
                        let outcome = outcome.unwrap_or_else(|e| {
                            DeleteOutcome::Error(TriageError::RuntimeError(format!(
                                "Delete task panicked: {}",
                                e
                            )))
                        });
                        if tx.send(Completion::Deleted { ticket, outcome }).is_err() {
                            warn!("session dropped before delete completed");
                        }
                    });
                }
                Effect::DeleteBatch { ticket, items } => {
                    let backend = Arc::clone(&self.backend);
                    self.runtime.spawn(async move {
                        let outcome =
                            tokio::task::spawn_blocking(move || backend.delete_batch(&items))
                                .await;
                        let outcome = outcome.unwrap_or_else(|e| {
                            DeleteOutcome::Error(TriageError::RuntimeError(format!(
                                "Batch delete task panicked: {}",
                                e
                            )))
                        });
                        if tx.send(Completion::Deleted { ticket, outcome }).is_err() {
                            warn!("session dropped before batch delete completed");
                        }
                    });
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{ApprovalToken, TrashBackend};
    use crate::domain::{sort_items, Item};
    use chrono::{TimeZone, Utc};
    use std::sync::Mutex;

    const WAIT: Duration = Duration::from_secs(5);

    /// In-memory library shared by the fake source and backend
    struct FakeLibrary {
        items: Mutex<Vec<Item>>,
        delete_outcome: Mutex<DeleteOutcome>,
        batch_outcome: Mutex<DeleteOutcome>,
        cancelled: Mutex<Vec<ApprovalToken>>,
        fail_loads: bool,
    }

    impl FakeLibrary {
        fn new(count: u64) -> Arc<Self> {
            let items = (1..=count)
                .map(|i| {
                    Item::new(
                        i,
                        format!("/photos/{}.jpg", i),
                        Utc.timestamp_opt(1000 * i as i64, 0).single(),
                    )
                })
                .collect();
            Arc::new(Self {
                items: Mutex::new(items),
                delete_outcome: Mutex::new(DeleteOutcome::Success),
                batch_outcome: Mutex::new(DeleteOutcome::Success),
                cancelled: Mutex::new(Vec::new()),
                fail_loads: false,
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                items: Mutex::new(Vec::new()),
                delete_outcome: Mutex::new(DeleteOutcome::Success),
                batch_outcome: Mutex::new(DeleteOutcome::Success),
                cancelled: Mutex::new(Vec::new()),
                fail_loads: true,
            })
        }
    }

    impl ItemSource for FakeLibrary {
        fn list_items(&self, order: SortOrder) -> Result<Vec<Item>> {
            if self.fail_loads {
                return Err(TriageError::PermissionDenied("photos".to_string()));
            }
            let mut items = self.items.lock().unwrap().clone();
            sort_items(&mut items, order);
            Ok(items)
        }
    }

    impl DeletionBackend for FakeLibrary {
        fn delete(&self, item: &Item) -> DeleteOutcome {
            let outcome = self.delete_outcome.lock().unwrap().clone();
            if outcome == DeleteOutcome::Success {
                self.items.lock().unwrap().retain(|i| i.id != item.id);
            }
            outcome
        }

        fn delete_batch(&self, items: &[Item]) -> DeleteOutcome {
            let outcome = self.batch_outcome.lock().unwrap().clone();
            if outcome == DeleteOutcome::Success {
                self.items.lock().unwrap().retain(|i| !items.contains(i));
            }
            outcome
        }

        fn cancel(&self, token: ApprovalToken) {
            self.cancelled.lock().unwrap().push(token);
        }
    }

    fn driver_for(library: &Arc<FakeLibrary>, mode: DeleteMode) -> SessionDriver {
        let source: Arc<dyn ItemSource> = library.clone();
        let backend: Arc<dyn DeletionBackend> = library.clone();
        let mut driver = SessionDriver::new(source, backend, SortOrder::NewestFirst, mode).unwrap();
        driver.load(SortOrder::NewestFirst);
        assert!(driver.wait_idle(WAIT));
        driver
    }

    #[test]
    fn test_load_populates_session() {
        let library = FakeLibrary::new(3);
        let driver = driver_for(&library, DeleteMode::Immediate);

        let state = driver.state();
        assert!(!state.is_loading);
        assert_eq!(state.total_count, 3);
        assert_eq!(state.current_position(), Some(1));
        assert!(!driver.is_busy());
    }

    #[test]
    fn test_load_failure_is_reported_in_state() {
        let library = FakeLibrary::failing();
        let driver = driver_for(&library, DeleteMode::Immediate);

        let state = driver.state();
        assert!(state.working_set.is_empty());
        assert!(matches!(
            state.last_error,
            Some(TriageError::PermissionDenied(_))
        ));
    }

    #[test]
    fn test_immediate_delete_reaches_backend() {
        let library = FakeLibrary::new(3);
        let mut driver = driver_for(&library, DeleteMode::Immediate);

        driver.delete();
        assert_eq!(driver.state().working_set.len(), 2);
        assert!(driver.wait_idle(WAIT));

        assert_eq!(driver.state().display_total(), 2);
        assert_eq!(library.items.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_approval_round_trip() {
        let library = FakeLibrary::new(3);
        *library.delete_outcome.lock().unwrap() =
            DeleteOutcome::RequiresApproval(ApprovalToken(1));
        let mut driver = driver_for(&library, DeleteMode::Immediate);

        driver.delete();
        assert!(driver.wait_idle(WAIT));
        assert!(driver.state().has_pending_approval());
        assert_eq!(driver.state().display_total(), 3);

        driver.approval_resolved(true);
        assert!(!driver.state().has_pending_approval());
        assert_eq!(driver.state().display_total(), 2);
    }

    /// Driver over the fake library with a dry-run trash behind a consent gate
    fn gated_driver(library: &Arc<FakeLibrary>, trash: &Arc<TrashBackend>) -> SessionDriver {
        let source: Arc<dyn ItemSource> = library.clone();
        let backend: Arc<dyn DeletionBackend> = trash.clone();
        let mut driver =
            SessionDriver::new(source, backend, SortOrder::NewestFirst, DeleteMode::Immediate)
                .unwrap();
        driver.ensure_loaded(SortOrder::NewestFirst);
        assert!(driver.wait_idle(WAIT));
        driver
    }

    #[test]
    fn test_sort_change_releases_pending_approval() {
        let library = FakeLibrary::new(3);
        let trash = Arc::new(TrashBackend::new(true, true));
        let mut driver = gated_driver(&library, &trash);

        driver.delete();
        driver.set_sort_order(SortOrder::OldestFirst);
        assert!(driver.wait_idle(WAIT));

        assert!(!driver.state().has_pending_approval());
        assert_eq!(trash.pending_count(), 0);
        assert_eq!(driver.state().working_set.len(), 3);
    }

    #[test]
    fn test_denied_approval_releases_the_rest() {
        let library = FakeLibrary::new(3);
        let trash = Arc::new(TrashBackend::new(true, true));
        let mut driver = gated_driver(&library, &trash);

        driver.delete();
        driver.delete();
        assert!(driver.wait_idle(WAIT));
        assert_eq!(driver.state().approvals.len(), 2);
        assert_eq!(trash.pending_count(), 2);

        let first = driver.state().pending_approval().map(|a| a.token).unwrap();
        trash.resolve(first, false).unwrap();
        driver.approval_resolved(false);
        assert!(driver.wait_idle(WAIT));

        assert!(!driver.state().has_pending_approval());
        assert_eq!(trash.pending_count(), 0);
        assert_eq!(
            driver.state().last_error,
            Some(TriageError::ApprovalDenied { count: 1 })
        );
    }

    #[test]
    fn test_reload_cancels_through_backend() {
        let library = FakeLibrary::new(3);
        *library.delete_outcome.lock().unwrap() =
            DeleteOutcome::RequiresApproval(ApprovalToken(4));
        let mut driver = driver_for(&library, DeleteMode::Immediate);

        driver.delete();
        assert!(driver.wait_idle(WAIT));
        driver.reload();
        assert!(driver.wait_idle(WAIT));

        assert_eq!(*library.cancelled.lock().unwrap(), vec![ApprovalToken(4)]);
    }

    #[test]
    fn test_ensure_loaded_skips_current_session() {
        let library = FakeLibrary::new(2);
        let mut driver = driver_for(&library, DeleteMode::Immediate);

        driver.ensure_loaded(SortOrder::NewestFirst);
        assert!(!driver.is_busy());
        assert!(!driver.state().is_loading);

        driver.ensure_loaded(SortOrder::OldestFirst);
        assert!(driver.is_busy());
        assert!(driver.wait_idle(WAIT));
        assert_eq!(driver.state().sort_order, SortOrder::OldestFirst);
    }

    #[test]
    fn test_queued_exhaustion_auto_commits() {
        let library = FakeLibrary::new(2);
        let mut driver = driver_for(&library, DeleteMode::Queued);

        driver.delete();
        driver.delete();
        assert!(driver.wait_idle(WAIT));

        let state = driver.state();
        assert!(state.working_set.is_empty());
        assert!(state.queued_deletes.is_empty());
        assert_eq!(state.display_total(), 0);
        assert!(library.items.lock().unwrap().is_empty());
    }

    #[test]
    fn test_subscribers_see_updates() {
        let library = FakeLibrary::new(3);
        let mut driver = driver_for(&library, DeleteMode::Immediate);
        let mut rx = driver.subscribe();

        driver.keep();
        assert!(rx.has_changed().unwrap());
        let snapshot = rx.borrow_and_update().clone();
        assert_eq!(snapshot.working_set.len(), 2);
        assert_eq!(snapshot.kept_count, 1);
    }

    #[test]
    fn test_dropping_driver_with_delete_in_flight() {
        let library = FakeLibrary::new(2);
        let mut driver = driver_for(&library, DeleteMode::Immediate);
        driver.delete();
        drop(driver);
        assert!(library.items.lock().unwrap().len() <= 2);
    }

    #[test]
    fn test_poll_without_work_is_noop() {
        let library = FakeLibrary::new(1);
        let mut driver = driver_for(&library, DeleteMode::Immediate);
        assert_eq!(driver.poll(), 0);
        assert!(driver.wait_idle(Duration::from_millis(10)));
    }
}
