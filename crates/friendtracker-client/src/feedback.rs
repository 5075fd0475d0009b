//! User-facing feedback around contact mutations.
//!
//! The contact store itself is never optimistic.  Views are: they show a
//! pending message while a mutation runs, leave edit mode before the save
//! returns, and roll back to edit mode when it fails.

use std::cell::{Cell, RefCell};
use std::fmt::Display;
use std::future::Future;

use friendtracker_shared::{Contact, ContactPatch};

use crate::error::{SaveError, ServiceError};
use crate::service::ContactService;
use crate::store::ContactStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    Create,
    Update,
    Delete,
    Archive,
    Unarchive,
}

impl MutationKind {
    pub fn pending_message(self) -> &'static str {
        match self {
            MutationKind::Create => "Creating contact...",
            MutationKind::Update => "Saving changes...",
            MutationKind::Delete => "Deleting contact...",
            MutationKind::Archive => "Archiving contact...",
            MutationKind::Unarchive => "Restoring contact...",
        }
    }

    pub fn success_message(self) -> &'static str {
        match self {
            MutationKind::Create => "Contact created successfully",
            MutationKind::Update => "Contact updated successfully",
            MutationKind::Delete => "Contact deleted successfully",
            MutationKind::Archive => "Contact archived successfully",
            MutationKind::Unarchive => "Contact restored successfully",
        }
    }

    pub fn failure_message(self, err: &impl Display) -> String {
        let verb = match self {
            MutationKind::Create | MutationKind::Update => "save",
            MutationKind::Delete => "delete",
            MutationKind::Archive => "archive",
            MutationKind::Unarchive => "restore",
        };
        format!("Failed to {verb}: {err}")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum MutationState {
    #[default]
    Idle,
    Pending,
    Succeeded,
    Failed(String),
}

/// Tracks one kind of mutation for a view and renders its status line.
#[derive(Debug)]
pub struct MutationTracker {
    kind: MutationKind,
    state: RefCell<MutationState>,
}

impl MutationTracker {
    pub fn new(kind: MutationKind) -> Self {
        Self {
            kind,
            state: RefCell::new(MutationState::Idle),
        }
    }

    pub fn kind(&self) -> MutationKind {
        self.kind
    }

    pub fn state(&self) -> MutationState {
        self.state.borrow().clone()
    }

    /// The status line for the current state, if there is one to show.
    pub fn message(&self) -> Option<String> {
        match &*self.state.borrow() {
            MutationState::Idle => None,
            MutationState::Pending => Some(self.kind.pending_message().to_string()),
            MutationState::Succeeded => Some(self.kind.success_message().to_string()),
            MutationState::Failed(message) => Some(message.clone()),
        }
    }

    /// Await `mutation`, moving through pending to succeeded or failed.
    pub async fn run<T, E: Display>(&self, mutation: impl Future<Output = Result<T, E>>) -> Result<T, E> {
        self.state.replace(MutationState::Pending);
        let result = mutation.await;
        let next = match &result {
            Ok(_) => MutationState::Succeeded,
            Err(e) => MutationState::Failed(self.kind.failure_message(e)),
        };
        self.state.replace(next);
        result
    }

    pub fn reset(&self) {
        self.state.replace(MutationState::Idle);
    }
}

/// Edit mode of the contact detail view.
#[derive(Debug)]
pub struct EditSession {
    editing: Cell<bool>,
    tracker: MutationTracker,
}

impl Default for EditSession {
    fn default() -> Self {
        Self {
            editing: Cell::new(false),
            tracker: MutationTracker::new(MutationKind::Update),
        }
    }
}

impl EditSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_editing(&self) -> bool {
        self.editing.get()
    }

    pub fn tracker(&self) -> &MutationTracker {
        &self.tracker
    }

    pub fn begin(&self) {
        self.tracker.reset();
        self.editing.set(true);
    }

    pub fn cancel(&self) {
        self.editing.set(false);
    }

    /// Validate and submit `patch` for contact `id`.
    ///
    /// An invalid patch never reaches the store and keeps edit mode.  A valid
    /// one leaves edit mode immediately; a store failure puts it back.
    pub async fn save<S: ContactService>(
        &self,
        store: &ContactStore<S>,
        id: i64,
        patch: ContactPatch,
    ) -> Result<Contact, SaveError> {
        let patch = match patch.normalized() {
            Ok(patch) => patch,
            Err(e) => {
                self.tracker
                    .state
                    .replace(MutationState::Failed(e.to_string()));
                return Err(e.into());
            }
        };

        self.editing.set(false);
        let result: Result<Contact, ServiceError> =
            self.tracker.run(store.update(id, patch)).await;
        if result.is_err() {
            self.editing.set(true);
        }
        Ok(result?)
    }
}
