//! Presentation state for one session: search text, per-group view state,
//! the add/edit form and the delete confirmation.
//!
//! The shell routes intents: mutations go to the [`TaskCache`], everything
//! else only touches local state. The list is re-derived from scratch by
//! [`Shell::screen`] whenever it is rendered.

use crate::cache::{CollectionState, TaskCache};
use crate::error::AppError;
use crate::model::{Task, TaskInput, TaskStatus};
use crate::view::{SortKey, TaskListView, ViewMemo, ViewState};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormState {
    Closed,
    Creating(TaskInput),
    Editing { id: String, input: TaskInput },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingDelete {
    pub id: String,
    /// Known when the task is in the loaded collection.
    pub title: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    Loading,
    LoadFailed(String),
    /// Nothing matched (or the collection is empty).
    Empty,
    Tasks(Arc<TaskListView>),
}

pub struct Shell {
    cache: Arc<TaskCache>,
    view_state: ViewState,
    query: String,
    form: FormState,
    pending_delete: Option<PendingDelete>,
    memo: ViewMemo,
}

impl Shell {
    pub fn new(cache: Arc<TaskCache>) -> Self {
        Self {
            cache,
            view_state: ViewState::new(),
            query: String::new(),
            form: FormState::Closed,
            pending_delete: None,
            memo: ViewMemo::new(),
        }
    }

    pub fn cache(&self) -> &TaskCache {
        &self.cache
    }

    pub fn view_state(&self) -> &ViewState {
        &self.view_state
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// How many times the task list was derived rather than reused.
    pub fn derivations(&self) -> u64 {
        self.memo.derivations()
    }

    pub fn set_search<Q: Into<String>>(&mut self, query: Q) {
        self.query = query.into();
    }

    pub fn set_sort(&mut self, status: TaskStatus, sort: SortKey) {
        self.view_state.set_sort(status, sort);
    }

    pub fn set_page(&mut self, status: TaskStatus, page: usize) {
        self.view_state.set_page(status, page);
    }

    pub fn next_page(&mut self, status: TaskStatus) {
        self.view_state.next_page(status);
    }

    pub fn prev_page(&mut self, status: TaskStatus) {
        self.view_state.prev_page(status);
    }

    pub fn form(&self) -> &FormState {
        &self.form
    }

    pub fn form_input_mut(&mut self) -> Option<&mut TaskInput> {
        match &mut self.form {
            FormState::Closed => None,
            FormState::Creating(input) => Some(input),
            FormState::Editing { input, .. } => Some(input),
        }
    }

    pub fn open_create_form(&mut self) {
        self.form = FormState::Creating(TaskInput::new(""));
    }

    /// Opens the edit form pre-filled from the loaded task.
    pub fn open_edit_form(&mut self, id: &str) -> Result<(), AppError> {
        let task = self
            .cache
            .find_task(id.trim())
            .ok_or_else(|| AppError::invalid_input("task not found"))?;
        self.form = FormState::Editing {
            input: task.to_input(),
            id: task.id,
        };
        Ok(())
    }

    pub fn close_form(&mut self) {
        self.form = FormState::Closed;
    }

    /// Sends the open form. The form closes only when the request succeeds.
    pub async fn submit_form(&mut self) -> Result<Task, AppError> {
        let result = match &self.form {
            FormState::Closed => return Err(AppError::invalid_input("no form is open")),
            FormState::Creating(input) => {
                let input = input.clone().validated()?;
                self.cache.create_task(&input).await
            }
            FormState::Editing { id, input } => {
                let input = input.clone().validated()?;
                self.cache.update_task(id, &input).await
            }
        };

        if result.is_ok() {
            self.form = FormState::Closed;
        }
        result
    }

    pub fn request_delete(&mut self, id: &str) -> Result<&PendingDelete, AppError> {
        let id = id.trim();
        if id.is_empty() {
            return Err(AppError::invalid_input("id is required"));
        }

        let title = self.cache.find_task(id).map(|task| task.title);
        Ok(self.pending_delete.insert(PendingDelete {
            id: id.to_string(),
            title,
        }))
    }

    pub fn pending_delete(&self) -> Option<&PendingDelete> {
        self.pending_delete.as_ref()
    }

    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
    }

    /// Deletes the pending task. The confirmation closes whatever the outcome.
    pub async fn confirm_delete(&mut self) -> Result<PendingDelete, AppError> {
        let pending = self
            .pending_delete
            .take()
            .ok_or_else(|| AppError::invalid_input("no delete is awaiting confirmation"))?;
        self.cache.delete_task(&pending.id).await?;
        Ok(pending)
    }

    /// Loads the collection if needed, then renders it.
    pub async fn load(&mut self) -> Screen {
        self.cache.ensure_loaded().await;
        self.screen()
    }

    pub async fn refresh(&mut self) -> Screen {
        self.cache.refresh().await;
        self.screen()
    }

    /// Derives the current screen from the cached collection.
    pub fn screen(&mut self) -> Screen {
        match self.cache.state() {
            CollectionState::NotLoaded => Screen::Loading,
            CollectionState::LoadFailed(message) => Screen::LoadFailed(message),
            CollectionState::Loaded(snapshot) => {
                let view = self.memo.view(
                    snapshot.version,
                    &snapshot.tasks,
                    &self.query,
                    &self.view_state,
                );
                self.view_state.sync_pages(&view);
                if view.is_empty() {
                    Screen::Empty
                } else {
                    Screen::Tasks(view)
                }
            }
        }
    }
}
