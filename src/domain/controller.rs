//! The review session state machine.
//!
//! [`SessionController`] is the only code that mutates a [`SessionState`]. It
//! performs no I/O: intents return [`Effect`]s describing backend work, and
//! the outcome of that work comes back as a [`Completion`]. Every effect
//! carries a [`Ticket`] stamped with the load generation it was issued under,
//! so results that arrive after a reload are dropped instead of corrupting
//! the newer session.

use super::session::{ApprovalScope, PendingApproval, SessionState, TentativeDelete, TentativePhase};
use super::{sort_items, Action, DeleteMode, Item, ItemId, SortOrder};
use crate::backend::{ApprovalToken, DeleteOutcome};
use crate::error::{Result, TriageError};
use tracing::{debug, info, warn};

/// Identifies one dispatched backend operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    pub generation: u64,
    pub request: u64,
}

/// Backend work requested by the controller
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Load { ticket: Ticket, order: SortOrder },
    Delete { ticket: Ticket, item: Item },
    DeleteBatch { ticket: Ticket, items: Vec<Item> },
}

impl Effect {
    pub fn ticket(&self) -> Ticket {
        match self {
            Effect::Load { ticket, .. }
            | Effect::Delete { ticket, .. }
            | Effect::DeleteBatch { ticket, .. } => *ticket,
        }
    }
}

/// Result of an [`Effect`], fed back through [`SessionController::complete`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    Loaded {
        ticket: Ticket,
        result: Result<Vec<Item>>,
    },
    Deleted {
        ticket: Ticket,
        outcome: DeleteOutcome,
    },
}

impl Completion {
    pub fn ticket(&self) -> Ticket {
        match self {
            Completion::Loaded { ticket, .. } | Completion::Deleted { ticket, .. } => *ticket,
        }
    }
}

#[derive(Debug)]
pub struct SessionController {
    state: SessionState,
    generation: u64,
    next_request: u64,
    /// Set once the queue has been auto-committed for the current exhaustion
    auto_commit_spent: bool,
    /// Consent requests dropped without an answer; the backend must forget them
    abandoned: Vec<ApprovalToken>,
}

impl SessionController {
    pub fn new(sort_order: SortOrder, delete_mode: DeleteMode) -> Self {
        Self {
            state: SessionState::new(sort_order, delete_mode),
            generation: 0,
            next_request: 0,
            auto_commit_spent: false,
            abandoned: Vec::new(),
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Drains the approval tokens the session gave up on.
    ///
    /// A token lands here when its request is superseded by a reload or when
    /// it arrives for a delete the session no longer tracks. The caller owns
    /// telling the backend to release it.
    pub fn take_abandoned_approvals(&mut self) -> Vec<ApprovalToken> {
        std::mem::take(&mut self.abandoned)
    }

    fn abandon(&mut self, token: ApprovalToken) {
        debug!(?token, "approval abandoned");
        self.abandoned.push(token);
    }

    fn ticket(&mut self) -> Ticket {
        self.next_request += 1;
        Ticket {
            generation: self.generation,
            request: self.next_request,
        }
    }

    /// Starts a fresh session in the given order.
    ///
    /// History, queue and pending approvals are discarded immediately; the
    /// working set is replaced when the load completes. Tokens of discarded
    /// approvals are reported by [`Self::take_abandoned_approvals`].
    pub fn load(&mut self, order: SortOrder) -> Vec<Effect> {
        self.generation += 1;
        self.auto_commit_spent = false;

        let state = &mut self.state;
        state.sort_order = order;
        state.is_loading = true;
        state.last_error = None;
        state.cursor = 0;
        state.history.clear();
        state.queued_deletes.clear();
        state.tentative.clear();
        let dropped: Vec<ApprovalToken> = state.approvals.drain(..).map(|a| a.token).collect();
        self.abandoned.extend(dropped);

        info!(generation = self.generation, ?order, "loading photos");
        let ticket = self.ticket();
        vec![Effect::Load { ticket, order }]
    }

    /// Loads only if the session is not already showing this order
    pub fn ensure_loaded(&mut self, order: SortOrder) -> Vec<Effect> {
        let state = &self.state;
        if !state.is_loading && !state.working_set.is_empty() && state.sort_order == order {
            return Vec::new();
        }
        self.load(order)
    }

    pub fn reload(&mut self) -> Vec<Effect> {
        self.load(self.state.sort_order)
    }

    /// Acknowledges the error currently shown to the user
    pub fn clear_error(&mut self) {
        self.state.last_error = None;
    }

    pub fn set_sort_order(&mut self, order: SortOrder) -> Vec<Effect> {
        if order == self.state.sort_order && !self.state.is_loading {
            return Vec::new();
        }
        self.load(order)
    }

    /// Reloads after a failure while keeping the failure visible
    fn resync(&mut self, error: TriageError) -> Vec<Effect> {
        let effects = self.reload();
        self.state.last_error = Some(error);
        effects
    }

    /// Re-reviews the current working set without fetching it again
    pub fn restart(&mut self) {
        let state = &mut self.state;
        state.cursor = 0;
        state.history.clear();
        state.kept_count = 0;
        state.processed_count = 0;
        state.confirmed_delete_count = 0;
        state.total_count = state.working_set.len()
            + state.queued_deletes.len()
            + state.unconfirmed_immediate_count();
        state.last_error = None;
        self.auto_commit_spent = false;
        debug!(total = state.total_count, "session restarted");
    }

    /// Removes the current item, returning it with its index
    fn take_current(&mut self) -> Option<(Item, usize)> {
        let state = &mut self.state;
        if state.is_loading || state.cursor >= state.working_set.len() {
            return None;
        }

        let index = state.cursor;
        let item = state.working_set.remove(index);
        state.cursor = index.min(state.working_set.len());
        state.processed_count += 1;
        state.last_error = None;
        Some((item, index))
    }

    pub fn keep(&mut self) -> Vec<Effect> {
        let Some((item, index_before)) = self.take_current() else {
            return Vec::new();
        };

        debug!(id = %item.id, index_before, "kept");
        self.state.kept_count += 1;
        self.state.history.push(Action::Kept { item, index_before });
        self.auto_commit_if_exhausted()
    }

    pub fn delete(&mut self) -> Vec<Effect> {
        let Some((item, index_before)) = self.take_current() else {
            return Vec::new();
        };

        debug!(id = %item.id, index_before, mode = ?self.state.delete_mode, "deleted");
        self.state.history.push(Action::Deleted {
            item: item.clone(),
            index_before,
        });

        let mut effects = Vec::new();
        match self.state.delete_mode {
            DeleteMode::Immediate => {
                let ticket = self.ticket();
                self.state.tentative.push(TentativeDelete {
                    request: ticket.request,
                    scope: ApprovalScope::Immediate,
                    items: vec![item.clone()],
                    phase: TentativePhase::Submitted,
                });
                effects.push(Effect::Delete { ticket, item });
            }
            DeleteMode::Queued => {
                self.state.queued_deletes.push(item);
                self.auto_commit_spent = false;
            }
        }

        effects.extend(self.auto_commit_if_exhausted());
        effects
    }

    /// Moves past the current item without deciding
    pub fn skip(&mut self) {
        let state = &mut self.state;
        if state.cursor < state.working_set.len() {
            state.cursor += 1;
        }
    }

    pub fn previous(&mut self) {
        self.state.cursor = self.state.cursor.saturating_sub(1);
    }

    /// Reverts the most recent keep or delete.
    pub fn undo(&mut self) -> Result<Action> {
        match self.state.history.last() {
            None => return Err(TriageError::NothingToUndo),
            Some(Action::Deleted { item, .. }) if self.state.is_submitted(item.id) => {
                return Err(TriageError::DeletionInFlight);
            }
            Some(_) => {}
        }

        let Some(action) = self.state.history.pop() else {
            return Err(TriageError::NothingToUndo);
        };

        let state = &mut self.state;
        let item = action.item().clone();
        let index = action.index_before().min(state.working_set.len());
        state.working_set.insert(index, item.clone());
        state.cursor = index;
        state.processed_count = state.processed_count.saturating_sub(1);

        match &action {
            Action::Kept { .. } => {
                state.kept_count = state.kept_count.saturating_sub(1);
            }
            Action::Deleted { .. } => {
                state.queued_deletes.retain(|queued| queued.id != item.id);
            }
        }

        debug!(id = %item.id, index, "undone");
        Ok(action)
    }

    /// Submits every queued delete that is not already in flight
    pub fn commit_queued_deletes(&mut self) -> Vec<Effect> {
        let batch: Vec<Item> = self.state.unsubmitted_queue().cloned().collect();
        if batch.is_empty() {
            return Vec::new();
        }

        let ticket = self.ticket();
        info!(count = batch.len(), request = ticket.request, "committing queued deletes");
        self.state.tentative.push(TentativeDelete {
            request: ticket.request,
            scope: ApprovalScope::Queued,
            items: batch.clone(),
            phase: TentativePhase::Submitted,
        });
        vec![Effect::DeleteBatch {
            ticket,
            items: batch,
        }]
    }

    fn auto_commit_if_exhausted(&mut self) -> Vec<Effect> {
        if !self.state.working_set.is_empty() || self.auto_commit_spent {
            return Vec::new();
        }
        if self.state.unsubmitted_queue().next().is_none() {
            return Vec::new();
        }

        self.auto_commit_spent = true;
        debug!("working set exhausted, auto-committing queue");
        self.commit_queued_deletes()
    }

    /// Switches delete mode.
    ///
    /// Leaving queued mode returns unsubmitted queued items to the working set
    /// in review order; the cursor stays on the current item.
    pub fn set_delete_mode(&mut self, mode: DeleteMode) {
        if mode == self.state.delete_mode {
            return;
        }
        self.state.delete_mode = mode;
        debug!(?mode, "delete mode changed");

        if mode != DeleteMode::Immediate {
            return;
        }

        let (restore, still_submitted): (Vec<Item>, Vec<Item>) = std::mem::take(
            &mut self.state.queued_deletes,
        )
        .into_iter()
        .partition(|item| !self.state.is_submitted(item.id));

        let state = &mut self.state;
        state.queued_deletes = still_submitted;
        if restore.is_empty() {
            return;
        }

        let restored: Vec<ItemId> = restore.iter().map(|item| item.id).collect();
        let current = state.current_item().map(|item| item.id);
        state.history.retain(|action| match action {
            Action::Deleted { item, .. } => !restored.contains(&item.id),
            Action::Kept { .. } => true,
        });
        state.processed_count = state.processed_count.saturating_sub(restore.len());
        state.working_set.extend(restore);
        sort_items(&mut state.working_set, state.sort_order);
        state.cursor = current
            .and_then(|id| state.working_set.iter().position(|item| item.id == id))
            .unwrap_or(0);
        self.auto_commit_spent = false;
    }

    /// Applies the result of a user consent prompt to the oldest pending approval.
    ///
    /// Does nothing when no approval is pending.
    pub fn approval_resolved(&mut self, success: bool) -> Vec<Effect> {
        let Some(approval) = self.state.approvals.pop_front() else {
            debug!("approval resolution with nothing pending");
            return Vec::new();
        };

        let pos = self
            .state
            .tentative
            .iter()
            .position(|t| t.request == approval.request);
        let tentative = pos.map(|pos| self.state.tentative.remove(pos));

        if success {
            info!(count = approval.count, scope = ?approval.scope, "deletion approved");
            match tentative {
                Some(tentative) => self.confirm(tentative),
                None => self.add_confirmed(approval.count),
            }
            Vec::new()
        } else {
            warn!(count = approval.count, scope = ?approval.scope, "deletion not approved");
            self.resync(TriageError::ApprovalDenied {
                count: approval.count,
            })
        }
    }

    /// Applies a backend result, returning follow-up work
    pub fn complete(&mut self, completion: Completion) -> Vec<Effect> {
        let ticket = completion.ticket();
        if ticket.generation != self.generation {
            debug!(
                stale = ticket.generation,
                current = self.generation,
                "discarding result from superseded session"
            );
            if let Completion::Deleted {
                outcome: DeleteOutcome::RequiresApproval(token),
                ..
            } = completion
            {
                self.abandon(token);
            }
            return Vec::new();
        }

        match completion {
            Completion::Loaded { result, .. } => {
                self.apply_loaded(result);
                Vec::new()
            }
            Completion::Deleted { ticket, outcome } => {
                self.apply_delete_outcome(ticket.request, outcome)
            }
        }
    }

    fn apply_loaded(&mut self, result: Result<Vec<Item>>) {
        let state = &mut self.state;
        state.is_loading = false;
        state.cursor = 0;
        state.kept_count = 0;
        state.processed_count = 0;
        state.confirmed_delete_count = 0;

        match result {
            Ok(items) => {
                info!(count = items.len(), "photos loaded");
                state.total_count = items.len();
                state.working_set = items;
            }
            Err(err) => {
                warn!(error = %err, "failed to load photos");
                state.working_set.clear();
                state.total_count = 0;
                state.last_error = Some(err);
            }
        }
    }

    fn apply_delete_outcome(&mut self, request: u64, outcome: DeleteOutcome) -> Vec<Effect> {
        let Some(pos) = self
            .state
            .tentative
            .iter()
            .position(|t| t.request == request)
        else {
            warn!(request, "delete outcome for unknown request");
            if let DeleteOutcome::RequiresApproval(token) = outcome {
                self.abandon(token);
            }
            return Vec::new();
        };

        match outcome {
            DeleteOutcome::Success => {
                let tentative = self.state.tentative.remove(pos);
                self.confirm(tentative);
                Vec::new()
            }
            DeleteOutcome::RequiresApproval(token) => {
                let tentative = &mut self.state.tentative[pos];
                tentative.phase = TentativePhase::AwaitingApproval;
                let approval = PendingApproval {
                    token,
                    count: tentative.items.len(),
                    scope: tentative.scope,
                    request,
                };
                debug!(?token, count = approval.count, "delete requires approval");
                self.state.approvals.push_back(approval);
                Vec::new()
            }
            DeleteOutcome::Error(err) => {
                let tentative = self.state.tentative.remove(pos);
                warn!(error = %err, count = tentative.items.len(), "delete failed");
                match tentative.scope {
                    // The optimistic removal can no longer be trusted
                    ApprovalScope::Immediate => self.resync(err),
                    ApprovalScope::Queued => {
                        self.state.last_error = Some(err);
                        Vec::new()
                    }
                }
            }
        }
    }

    /// Moves a tentative delete to confirmed and forgets its undo entries
    fn confirm(&mut self, tentative: TentativeDelete) {
        let ids: Vec<ItemId> = tentative.items.iter().map(|item| item.id).collect();
        self.add_confirmed(ids.len());

        let state = &mut self.state;
        state.history.retain(|action| match action {
            Action::Deleted { item, .. } => !ids.contains(&item.id),
            Action::Kept { .. } => true,
        });
        if tentative.scope == ApprovalScope::Queued {
            state.queued_deletes.retain(|item| !ids.contains(&item.id));
        }
    }

    fn add_confirmed(&mut self, count: usize) {
        let state = &mut self.state;
        state.confirmed_delete_count = (state.confirmed_delete_count + count).min(state.total_count);
        debug!(confirmed = state.confirmed_delete_count, "deletes confirmed");
    }
}
