//! The task synchronizer owns the local task list and mirrors every change to
//! the remote store.
//!
//! Mutations are confirm-then-apply: local state changes only after the store
//! answers, and the store's representation replaces the local record. A failed
//! round trip leaves the list exactly as it was and is surfaced as a
//! [`SyncError`] naming the tier that failed.

use std::future::Future;
use std::time::Duration;

use parking_lot::Mutex;
use tasklist_services::{
    Task, TaskApiError, TaskApiResult, TaskBackend, TaskCreateRequest, TaskUpdateRequest,
};

use crate::edit::EditMode;
use crate::error::{Operation, SyncError};
use crate::in_flight::{InFlight, InFlightGuard};

/// Upper bound on a single round trip unless configured otherwise
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Caller's answer to a "are you sure?" prompt. Delete and begin-edit only
/// proceed when the intent arrives already confirmed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Confirmed,
    Declined,
}

impl From<bool> for Confirmation {
    fn from(confirmed: bool) -> Self {
        if confirmed {
            Self::Confirmed
        } else {
            Self::Declined
        }
    }
}

#[derive(Debug)]
struct SyncState {
    tasks: Vec<Task>,
    edit: EditMode,
    loading: bool,
    last_error: Option<String>,
}

impl SyncState {
    fn position(&self, id: &str) -> Option<usize> {
        self.tasks.iter().position(|task| task.id == id)
    }

    /// Swap in the store's copy of `id`
    fn replace(&mut self, id: &str, updated: Task) {
        match self.position(id) {
            Some(index) => self.tasks[index] = updated,
            None => {
                tracing::warn!("Task {} left the list while its update was in flight", id);
            }
        }
    }
}

/// Owns the ordered task list and the inline edit state.
///
/// All methods take `&self`; state is only locked between round trips, so a
/// presentation layer may fire operations concurrently without corrupting it.
pub struct TaskSynchronizer<B> {
    backend: B,
    state: Mutex<SyncState>,
    in_flight: InFlight,
    timeout: Duration,
}

impl<B: TaskBackend> TaskSynchronizer<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            state: Mutex::new(SyncState {
                tasks: Vec::new(),
                edit: EditMode::Viewing,
                loading: true,
                last_error: None,
            }),
            in_flight: InFlight::default(),
            timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Bound every remote call by `timeout`
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Snapshot of the task list, in store order
    pub fn tasks(&self) -> Vec<Task> {
        self.state.lock().tasks.clone()
    }

    pub fn task(&self, id: &str) -> Option<Task> {
        let state = self.state.lock();
        state.position(id).map(|index| state.tasks[index].clone())
    }

    pub fn len(&self) -> usize {
        self.state.lock().tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().tasks.is_empty()
    }

    pub fn edit_mode(&self) -> EditMode {
        self.state.lock().edit.clone()
    }

    /// True until the first `load` has finished, successfully or not
    pub fn is_loading(&self) -> bool {
        self.state.lock().loading
    }

    /// Message of the most recent failure, cleared when the next operation starts
    pub fn last_error(&self) -> Option<String> {
        self.state.lock().last_error.clone()
    }

    /// True while a mutating request for `id` awaits the store
    pub fn is_pending(&self, id: &str) -> bool {
        self.in_flight.contains(id)
    }

    /// Replace the local list with the store's full list.
    ///
    /// Returns the number of tasks loaded. On failure the previous list is kept.
    pub async fn load(&self) -> Result<usize, SyncError> {
        self.begin_operation();

        let result = self.call(Operation::Fetch, self.backend.list()).await;

        let mut state = self.state.lock();
        state.loading = false;
        let fetched = result.map_err(|e| Self::record_failure(&mut state, e))?;

        let mut tasks: Vec<Task> = Vec::with_capacity(fetched.len());
        for task in fetched {
            if tasks.iter().any(|existing| existing.id == task.id) {
                tracing::warn!("Dropping duplicate task {} from fetch", task.id);
                continue;
            }
            tasks.push(task);
        }

        if let Some(id) = state.edit.cancel() {
            tracing::debug!("Reload discarded edit of task {}", id);
        }
        state.tasks = tasks;

        tracing::info!("Loaded {} tasks", state.tasks.len());
        Ok(state.tasks.len())
    }

    /// Create a task and append the stored record.
    ///
    /// Blank titles are rejected without contacting the store. Nothing is
    /// inserted until the store has assigned the identifier.
    pub async fn create(&self, title: &str) -> Result<Task, SyncError> {
        self.begin_operation();

        if title.trim().is_empty() {
            tracing::warn!("Ignoring create with an empty title");
            return Err(SyncError::Validation(
                "Task title cannot be empty".to_string(),
            ));
        }

        let request = TaskCreateRequest {
            title: title.to_string(),
        };
        let created = self
            .call(Operation::Create, self.backend.create(request))
            .await
            .map_err(|e| self.fail(e))?;

        let mut state = self.state.lock();
        if state.position(&created.id).is_some() {
            tracing::warn!("Created task {} is already listed", created.id);
        } else {
            state.tasks.push(created.clone());
        }

        tracing::info!("Added task {}", created.id);
        Ok(created)
    }

    /// Flip the completed flag of `id`.
    ///
    /// The local record changes only once the store confirms, and takes the
    /// store's value rather than the local negation.
    pub async fn toggle(&self, id: &str) -> Result<Task, SyncError> {
        self.begin_operation();

        let _claim = self.claim(Operation::Update, id)?;
        let current = self.task(id).ok_or_else(|| {
            self.fail(SyncError::Stale {
                operation: Operation::Update,
                id: id.to_string(),
            })
        })?;

        let request = TaskUpdateRequest::completed(!current.completed);
        let updated = self
            .call(Operation::Update, self.backend.update(id, request))
            .await
            .and_then(|task| Self::same_identity(id, task))
            .map_err(|e| self.fail(e))?;

        self.state.lock().replace(id, updated.clone());

        tracing::info!("Task {} completed = {}", id, updated.completed);
        Ok(updated)
    }

    /// Change the title of `id`.
    ///
    /// A blank title is a no-op (`Ok(None)`). On success the record is replaced
    /// and edit mode for `id` ends; on failure edit mode and its draft are kept.
    pub async fn rename(&self, id: &str, new_title: &str) -> Result<Option<Task>, SyncError> {
        self.begin_operation();

        if new_title.trim().is_empty() {
            tracing::debug!("Ignoring rename of {} to an empty title", id);
            return Ok(None);
        }

        let _claim = self.claim(Operation::Update, id)?;
        if self.task(id).is_none() {
            return Err(self.fail(SyncError::Stale {
                operation: Operation::Update,
                id: id.to_string(),
            }));
        }

        let request = TaskUpdateRequest::title(new_title);
        let updated = self
            .call(Operation::Update, self.backend.update(id, request))
            .await
            .and_then(|task| Self::same_identity(id, task))
            .map_err(|e| self.fail(e))?;

        {
            let mut state = self.state.lock();
            state.replace(id, updated.clone());
            state.edit.finish(id);
        }

        tracing::info!("Renamed task {}", id);
        Ok(Some(updated))
    }

    /// Commit the current draft. `Ok(None)` when not editing or the draft is blank.
    pub async fn commit_edit(&self) -> Result<Option<Task>, SyncError> {
        let (id, draft) = match self.edit_mode() {
            EditMode::Viewing => return Ok(None),
            EditMode::Editing { id, draft } => (id, draft),
        };
        self.rename(&id, &draft).await
    }

    /// Delete `id` once the caller has confirmed.
    ///
    /// Returns `Ok(false)` when declined (no request is made).
    pub async fn remove(&self, id: &str, confirmation: Confirmation) -> Result<bool, SyncError> {
        self.begin_operation();

        if confirmation == Confirmation::Declined {
            tracing::debug!("Delete of {} declined", id);
            return Ok(false);
        }

        let _claim = self.claim(Operation::Delete, id)?;
        if self.task(id).is_none() {
            return Err(self.fail(SyncError::Stale {
                operation: Operation::Delete,
                id: id.to_string(),
            }));
        }

        self.call(Operation::Delete, self.backend.delete(id))
            .await
            .map_err(|e| self.fail(e))?;

        {
            let mut state = self.state.lock();
            state.tasks.retain(|task| task.id != id);
            if state.edit.finish(id) {
                tracing::debug!("Deleted task {} was being edited", id);
            }
        }

        tracing::info!("Deleted task {}", id);
        Ok(true)
    }

    /// Enter edit mode for `id` once the caller has confirmed, seeding the
    /// draft from its current title. An edit already open on another task is
    /// cancelled and its draft discarded.
    ///
    /// Returns `Ok(false)` when declined.
    pub fn begin_edit(&self, id: &str, confirmation: Confirmation) -> Result<bool, SyncError> {
        if confirmation == Confirmation::Declined {
            return Ok(false);
        }

        let mut state = self.state.lock();
        let Some(index) = state.position(id) else {
            return Err(SyncError::Stale {
                operation: Operation::Update,
                id: id.to_string(),
            });
        };

        let title = state.tasks[index].title.clone();
        if let Some(previous) = state.edit.begin(id, &title) {
            tracing::info!("Edit of task {} cancelled by edit of {}", previous, id);
        }
        Ok(true)
    }

    /// Replace the draft text. Returns false when nothing is being edited.
    pub fn set_draft(&self, text: &str) -> bool {
        self.state.lock().edit.set_draft(text)
    }

    /// Leave edit mode without saving. Returns false when nothing was being edited.
    pub fn cancel_edit(&self) -> bool {
        self.state.lock().edit.cancel().is_some()
    }

    fn begin_operation(&self) {
        self.state.lock().last_error = None;
    }

    fn claim(&self, operation: Operation, id: &str) -> Result<InFlightGuard<'_>, SyncError> {
        self.in_flight.try_acquire(id).ok_or_else(|| {
            self.fail(SyncError::Busy {
                operation,
                id: id.to_string(),
            })
        })
    }

    /// Run one round trip under the configured timeout
    async fn call<T>(
        &self,
        operation: Operation,
        request: impl Future<Output = TaskApiResult<T>>,
    ) -> Result<T, SyncError> {
        match tokio::time::timeout(self.timeout, request).await {
            Ok(result) => result.map_err(|e| SyncError::remote(operation, e)),
            Err(_) => {
                tracing::warn!("Task {} timed out after {:?}", operation, self.timeout);
                Err(SyncError::remote(operation, TaskApiError::Timeout))
            }
        }
    }

    /// Identifiers never change once assigned; an update answered with another
    /// record is a malformed response.
    fn same_identity(id: &str, task: Task) -> Result<Task, SyncError> {
        if task.id == id {
            Ok(task)
        } else {
            Err(SyncError::remote(
                Operation::Update,
                TaskApiError::InvalidResponse(format!(
                    "update of task {} answered with task {}",
                    id, task.id
                )),
            ))
        }
    }

    fn fail(&self, error: SyncError) -> SyncError {
        Self::record_failure(&mut self.state.lock(), error)
    }

    fn record_failure(state: &mut SyncState, error: SyncError) -> SyncError {
        tracing::error!("{}", error);
        state.last_error = Some(error.user_message());
        error
    }
}

impl<B> std::fmt::Debug for TaskSynchronizer<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("TaskSynchronizer")
            .field("tasks", &state.tasks.len())
            .field("edit", &state.edit)
            .field("loading", &state.loading)
            .field("timeout", &self.timeout)
            .finish()
    }
}
