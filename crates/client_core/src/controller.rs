//! Todo list controller: owns the local list and reconciles it with the remote table.
//!
//! State is only touched while holding the lock and never across a remote call,
//! so overlapping operations are applied in the order their responses arrive.

use std::sync::Arc;

use shared::{
    domain::{NewTodo, TodoId, TodoItem, TodoPatch, User},
    error::RemoteError,
};
use tokio::sync::Mutex;
use tracing::{error, info};

use crate::{
    error::{ControllerError, Operation},
    IdentityProvider, RemoteTable, TodoRepository,
};

/// Creation form inputs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Draft {
    pub subject: String,
    pub description: String,
}

/// Copy of a listed item being edited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedEdit {
    pub id: TodoId,
    pub subject: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum EditState {
    #[default]
    NotEditing,
    Editing(StagedEdit),
}

impl EditState {
    pub fn staged_id(&self) -> Option<TodoId> {
        match self {
            EditState::NotEditing => None,
            EditState::Editing(staged) => Some(staged.id),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoListState {
    pub items: Vec<TodoItem>,
    pub draft: Draft,
    pub edit: EditState,
}

impl TodoListState {
    pub fn replace_all(&mut self, items: Vec<TodoItem>) {
        self.items = items;
    }

    pub fn prepend(&mut self, item: TodoItem) {
        self.items.insert(0, item);
    }

    /// Swaps in `item` where the id matches. Returns false when it is not listed.
    pub fn replace(&mut self, item: TodoItem) -> bool {
        match self.items.iter_mut().find(|existing| existing.id == item.id) {
            Some(slot) => {
                *slot = item;
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, id: TodoId) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.id != id);
        self.items.len() != before
    }

    pub fn find(&self, id: TodoId) -> Option<&TodoItem> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn rows(&self) -> Vec<TodoRow> {
        self.items.iter().map(TodoRow::from).collect()
    }
}

/// Display row: Subject, Description, Status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoRow {
    pub id: TodoId,
    pub subject: String,
    pub description: String,
    pub status: &'static str,
}

impl From<&TodoItem> for TodoRow {
    fn from(item: &TodoItem) -> Self {
        Self {
            id: item.id,
            subject: item.subject.clone(),
            description: item.description.clone().unwrap_or_default(),
            status: item.status_label(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    EmptySubject,
    NotAuthenticated,
    NothingStaged,
}

/// Result of an operation whose preconditions may short-circuit the remote call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    Applied(T),
    Skipped(SkipReason),
}

impl<T> Outcome<T> {
    pub fn is_applied(&self) -> bool {
        matches!(self, Outcome::Applied(_))
    }

    pub fn applied(self) -> Option<T> {
        match self {
            Outcome::Applied(value) => Some(value),
            Outcome::Skipped(_) => None,
        }
    }
}

pub struct TodoListController {
    identity: Arc<dyn IdentityProvider>,
    repository: TodoRepository,
    state: Mutex<TodoListState>,
}

impl TodoListController {
    pub fn new(identity: Arc<dyn IdentityProvider>, table: Arc<dyn RemoteTable>) -> Self {
        Self::with_repository(identity, TodoRepository::new(table))
    }

    pub fn with_repository(identity: Arc<dyn IdentityProvider>, repository: TodoRepository) -> Self {
        Self {
            identity,
            repository,
            state: Mutex::new(TodoListState::default()),
        }
    }

    pub async fn snapshot(&self) -> TodoListState {
        self.state.lock().await.clone()
    }

    pub async fn items(&self) -> Vec<TodoItem> {
        self.state.lock().await.items.clone()
    }

    pub async fn rows(&self) -> Vec<TodoRow> {
        self.state.lock().await.rows()
    }

    /// Replaces the list with the current user's items, newest first.
    ///
    /// Without an authenticated user the list is emptied and nothing is reported.
    /// On failure the list is left as it was.
    pub async fn load(&self) -> Result<Outcome<usize>, ControllerError> {
        let Some(user) = self.current_user(Operation::Load).await? else {
            self.state.lock().await.replace_all(Vec::new());
            return Ok(Outcome::Skipped(SkipReason::NotAuthenticated));
        };

        let items = self
            .repository
            .list_for_owner(user.id)
            .await
            .map_err(|err| failed(Operation::Load, err))?;

        let count = items.len();
        self.state.lock().await.replace_all(items);
        info!(user_id = %user.id, count, "loaded todos");
        Ok(Outcome::Applied(count))
    }

    pub async fn set_draft_subject(&self, subject: impl Into<String>) {
        self.state.lock().await.draft.subject = subject.into();
    }

    pub async fn set_draft_description(&self, description: impl Into<String>) {
        self.state.lock().await.draft.description = description.into();
    }

    /// Inserts the draft as a new item owned by the current user.
    ///
    /// The draft is cleared only after a successful insert.
    pub async fn create(&self) -> Result<Outcome<TodoItem>, ControllerError> {
        let draft = self.state.lock().await.draft.clone();
        if draft.subject.trim().is_empty() {
            return Ok(Outcome::Skipped(SkipReason::EmptySubject));
        }

        let Some(user) = self.current_user(Operation::Create).await? else {
            return Ok(Outcome::Skipped(SkipReason::NotAuthenticated));
        };

        let new_todo = NewTodo {
            subject: draft.subject,
            description: non_blank(draft.description),
            user_id: user.id,
        };
        let created = self
            .repository
            .insert(&new_todo)
            .await
            .map_err(|err| failed(Operation::Create, err))?;

        let mut state = self.state.lock().await;
        state.prepend(created.clone());
        state.draft = Draft::default();
        info!(todo_id = %created.id, "created todo");
        Ok(Outcome::Applied(created))
    }

    /// Stages a copy of a listed item for editing.
    pub async fn begin_edit(&self, id: TodoId) -> Result<StagedEdit, ControllerError> {
        let mut state = self.state.lock().await;
        let item = state.find(id).ok_or(ControllerError::NotListed(id))?;
        let staged = StagedEdit {
            id,
            subject: item.subject.clone(),
            description: item.description.clone(),
        };
        state.edit = EditState::Editing(staged.clone());
        Ok(staged)
    }

    /// Returns false when nothing is staged.
    pub async fn set_edit_subject(&self, subject: impl Into<String>) -> bool {
        match &mut self.state.lock().await.edit {
            EditState::Editing(staged) => {
                staged.subject = subject.into();
                true
            }
            EditState::NotEditing => false,
        }
    }

    /// Returns false when nothing is staged.
    pub async fn set_edit_description(&self, description: impl Into<String>) -> bool {
        match &mut self.state.lock().await.edit {
            EditState::Editing(staged) => {
                staged.description = non_blank(description.into());
                true
            }
            EditState::NotEditing => false,
        }
    }

    pub async fn cancel_edit(&self) {
        self.state.lock().await.edit = EditState::NotEditing;
    }

    /// Writes the staged subject and description back and ends the edit session.
    ///
    /// An empty subject is rejected before any request. On failure the staged
    /// edit is kept so it can be retried.
    pub async fn update(&self) -> Result<Outcome<TodoItem>, ControllerError> {
        let staged = match &self.state.lock().await.edit {
            EditState::NotEditing => return Ok(Outcome::Skipped(SkipReason::NothingStaged)),
            EditState::Editing(staged) => staged.clone(),
        };
        if staged.subject.trim().is_empty() {
            return Ok(Outcome::Skipped(SkipReason::EmptySubject));
        }

        let patch = TodoPatch {
            subject: staged.subject,
            description: staged.description,
        };
        let updated = self
            .repository
            .update(staged.id, &patch)
            .await
            .map_err(|err| failed(Operation::Update, err))?;

        let mut state = self.state.lock().await;
        state.replace(updated.clone());
        // A different item may have been staged while this request was in flight.
        if state.edit.staged_id() == Some(updated.id) {
            state.edit = EditState::NotEditing;
        }
        info!(todo_id = %updated.id, "updated todo");
        Ok(Outcome::Applied(updated))
    }

    /// Deletes remotely, then drops the id from the list.
    ///
    /// Yields whether the id was present locally; the remote call is issued regardless.
    pub async fn delete(&self, id: TodoId) -> Result<Outcome<bool>, ControllerError> {
        self.repository
            .delete(id)
            .await
            .map_err(|err| failed(Operation::Delete, err))?;

        let removed = self.state.lock().await.remove(id);
        info!(todo_id = %id, removed, "deleted todo");
        Ok(Outcome::Applied(removed))
    }

    async fn current_user(&self, operation: Operation) -> Result<Option<User>, ControllerError> {
        self.identity
            .current_user()
            .await
            .map_err(|err| failed(operation, err))
    }
}

fn non_blank(text: String) -> Option<String> {
    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}

fn failed(operation: Operation, source: RemoteError) -> ControllerError {
    error!(%operation, code = ?source.code, "todo {operation} failed: {}", source.message);
    ControllerError::remote(operation, source)
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
