use super::{Action, DeleteMode, Item, ItemId, SortOrder};
use crate::backend::ApprovalToken;
use crate::error::TriageError;
use std::collections::VecDeque;

/// Which kind of submission an approval request belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApprovalScope {
    Immediate,
    Queued,
}

/// A backend request waiting on out-of-band user consent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingApproval {
    pub token: ApprovalToken,
    /// Number of deletions that become confirmed if the request is approved
    pub count: usize,
    pub scope: ApprovalScope,
    pub(crate) request: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TentativePhase {
    Submitted,
    AwaitingApproval,
}

/// Items handed to the backend whose deletion is not confirmed yet.
///
/// Immediate deletes are already gone from the working set; queued batches
/// stay in `queued_deletes` until the outcome is known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TentativeDelete {
    pub(crate) request: u64,
    pub scope: ApprovalScope,
    pub items: Vec<Item>,
    pub phase: TentativePhase,
}

impl TentativeDelete {
    pub fn contains(&self, id: ItemId) -> bool {
        self.items.iter().any(|item| item.id == id)
    }
}

/// Snapshot of a review session.
///
/// Only [`SessionController`](super::SessionController) mutates this type;
/// everything else receives it by shared reference or as a cloned snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    /// Items not yet decided in this pass, in review order
    pub working_set: Vec<Item>,
    /// Index into `working_set`; equal to its length when exhausted
    pub cursor: usize,
    /// Reversible actions, most recent last
    pub history: Vec<Action>,
    pub queued_deletes: Vec<Item>,
    /// Size of the working set when the session was loaded or restarted
    pub total_count: usize,
    pub confirmed_delete_count: usize,
    /// Keep decisions in this pass
    pub kept_count: usize,
    /// Keep and delete decisions in this pass
    pub processed_count: usize,
    pub approvals: VecDeque<PendingApproval>,
    pub tentative: Vec<TentativeDelete>,
    pub sort_order: SortOrder,
    pub delete_mode: DeleteMode,
    pub is_loading: bool,
    pub last_error: Option<TriageError>,
}

impl SessionState {
    pub fn new(sort_order: SortOrder, delete_mode: DeleteMode) -> Self {
        Self {
            sort_order,
            delete_mode,
            ..Self::default()
        }
    }

    /// The "of N" denominator shown to the user
    pub fn display_total(&self) -> usize {
        self.total_count.saturating_sub(self.confirmed_delete_count)
    }

    pub fn current_item(&self) -> Option<&Item> {
        self.working_set.get(self.cursor)
    }

    /// True when every remaining item has been passed over
    pub fn is_exhausted(&self) -> bool {
        self.cursor >= self.working_set.len()
    }

    /// 1-based position of the current item within `display_total`.
    ///
    /// Newest-first counts up as the user advances; oldest-first counts down.
    /// `None` when there is no current item.
    ///
    /// Oldest-first results are clamped into `1..=display_total`. After a
    /// confirmed delete at the head, neighbouring items can therefore share a
    /// number (three photos, first one trashed: both survivors read "2 of 2").
    /// The counter stays in range and never rises while advancing.
    pub fn current_position(&self) -> Option<usize> {
        if self.working_set.is_empty() || self.is_exhausted() {
            return None;
        }

        let len = self.working_set.len();
        let display_total = self.display_total();
        let position = match self.sort_order {
            SortOrder::NewestFirst => (display_total + self.cursor + 1).saturating_sub(len),
            SortOrder::OldestFirst => {
                (len + self.confirmed_delete_count).saturating_sub(self.cursor)
            }
        };

        Some(position.clamp(1, display_total.max(1)))
    }

    pub fn last_action(&self) -> Option<&Action> {
        self.history.last()
    }

    /// The approval the UI should prompt for next
    pub fn pending_approval(&self) -> Option<&PendingApproval> {
        self.approvals.front()
    }

    pub fn has_pending_approval(&self) -> bool {
        !self.approvals.is_empty()
    }

    pub fn can_undo(&self) -> bool {
        match self.history.last() {
            Some(Action::Deleted { item, .. }) => !self.is_submitted(item.id),
            Some(Action::Kept { .. }) => true,
            None => false,
        }
    }

    /// Whether the item's deletion has been handed to the backend
    pub fn is_submitted(&self, id: ItemId) -> bool {
        self.tentative.iter().any(|t| t.contains(id))
    }

    /// Queued items not yet part of a submitted batch
    pub fn unsubmitted_queue(&self) -> impl Iterator<Item = &Item> {
        self.queued_deletes
            .iter()
            .filter(move |item| !self.is_submitted(item.id))
    }

    /// Number of immediate deletes still awaiting an outcome
    pub fn unconfirmed_immediate_count(&self) -> usize {
        self.tentative
            .iter()
            .filter(|t| t.scope == ApprovalScope::Immediate)
            .map(|t| t.items.len())
            .sum()
    }
}
