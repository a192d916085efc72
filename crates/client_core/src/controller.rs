use std::{str::FromStr, sync::Arc};

use shared::domain::{Task, TaskId};
use tracing::{debug, info};

use crate::{
    api::TaskApi,
    diagnostics::{DiagnosticSink, Operation, TracingSink},
    error::{ControllerError, SyncError},
    store::TaskStore,
};

/// What happens to the local order when submitting a reorder fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReorderFailurePolicy {
    /// Keep the dragged order locally even though the remote kept the old one.
    #[default]
    KeepLocal,
    /// Restore the order from before the drag, like toggle and delete do.
    Rollback,
}

impl FromStr for ReorderFailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "keep" | "keep_local" | "keep-local" | "false" => Ok(Self::KeepLocal),
            "rollback" | "roll_back" | "true" => Ok(Self::Rollback),
            other => Err(format!("unknown reorder failure policy '{other}'")),
        }
    }
}

/// Owns the task list and reconciles local edits with the remote store.
///
/// Toggle and delete are applied locally first and rolled back to a full
/// snapshot if the remote call fails. Add waits for the server-assigned id
/// before touching the list. Reorder is applied locally first; whether a
/// failed submission rolls back is governed by [`ReorderFailurePolicy`].
///
/// Every mutating method takes `&mut self`, so operations on one controller
/// never interleave. Use [`crate::ControllerHandle`] to share a controller
/// between tasks.
pub struct TaskListController {
    api: Arc<dyn TaskApi>,
    sink: Arc<dyn DiagnosticSink>,
    store: TaskStore,
    reorder_failure: ReorderFailurePolicy,
}

impl TaskListController {
    pub fn new(api: Arc<dyn TaskApi>) -> Self {
        Self {
            api,
            sink: Arc::new(TracingSink),
            store: TaskStore::new(),
            reorder_failure: ReorderFailurePolicy::default(),
        }
    }

    pub fn with_diagnostic_sink(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn with_reorder_failure_policy(mut self, policy: ReorderFailurePolicy) -> Self {
        self.reorder_failure = policy;
        self
    }

    #[cfg(test)]
    pub(crate) fn reorder_failure_policy(&self) -> ReorderFailurePolicy {
        self.reorder_failure
    }

    pub fn store(&self) -> &TaskStore {
        &self.store
    }

    pub fn tasks(&self) -> &[Task] {
        self.store.tasks()
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.store.set_input(text);
    }

    /// Replaces the local list with the remote one, ordered by position.
    /// A failed fetch leaves the current list as it was.
    pub async fn load(&mut self) -> Result<(), ControllerError> {
        let mut tasks = self
            .api
            .list()
            .await
            .map_err(|e| self.report(Operation::Load, e))?;
        tasks.sort_by_key(|task| task.position);
        info!(count = tasks.len(), "tasks: list loaded");
        self.store.set_all(tasks);
        Ok(())
    }

    /// Submits the current input text, as typed, as a new task at the end of
    /// the list. Input that is only whitespace is rejected.
    pub async fn submit(&mut self) -> Result<Task, ControllerError> {
        if self.store.input().trim().is_empty() {
            return Err(ControllerError::EmptyText);
        }
        let text = self.store.input().to_string();

        let position = self.store.len() as u32;
        let task = self
            .api
            .create(&text, position)
            .await
            .map_err(|e| self.report(Operation::Add, e))?;

        info!(task_id = %task.id, position, "tasks: task created");
        self.store.append(task.clone());
        self.store.clear_input();
        Ok(task)
    }

    /// Sets the input text to `text` and submits it.
    pub async fn add(&mut self, text: &str) -> Result<Task, ControllerError> {
        self.store.set_input(text);
        self.submit().await
    }

    pub async fn toggle(&mut self, task_id: &TaskId) -> Result<(), ControllerError> {
        let mut task = self
            .store
            .get(task_id)
            .cloned()
            .ok_or_else(|| ControllerError::UnknownTask(task_id.clone()))?;

        let snapshot = self.store.snapshot();
        task.completed = !task.completed;
        let completed = task.completed;
        self.store.replace(task);

        let result = self.api.set_completed(task_id, completed).await;
        if let Err(err) = result {
            self.store.restore(snapshot);
            return Err(self.report(Operation::Toggle, err));
        }

        debug!(task_id = %task_id, completed, "tasks: completion updated");
        Ok(())
    }

    pub async fn delete(&mut self, task_id: &TaskId) -> Result<(), ControllerError> {
        let snapshot = self.store.snapshot();
        if self.store.remove(task_id).is_none() {
            return Err(ControllerError::UnknownTask(task_id.clone()));
        }

        let result = self.api.delete(task_id).await;
        if let Err(err) = result {
            self.store.restore(snapshot);
            return Err(self.report(Operation::Delete, err));
        }

        info!(task_id = %task_id, "tasks: task deleted");
        Ok(())
    }

    /// Drag-and-drop: moves the task at `source` to `destination` and submits
    /// the renumbered list. A drop without destination does nothing.
    pub async fn reorder(
        &mut self,
        source: usize,
        destination: Option<usize>,
    ) -> Result<(), ControllerError> {
        let Some(destination) = destination else {
            debug!(source, "tasks: drop without destination ignored");
            return Ok(());
        };

        let snapshot = self.store.snapshot();
        self.store.move_task(source, destination)?;
        self.store.renumber();

        let result = self.api.reorder_all(self.store.tasks()).await;
        if let Err(err) = result {
            if self.reorder_failure == ReorderFailurePolicy::Rollback {
                self.store.restore(snapshot);
            }
            return Err(self.report(Operation::Reorder, err));
        }

        debug!(source, destination, "tasks: positions submitted");
        Ok(())
    }

    fn report(&self, operation: Operation, err: SyncError) -> ControllerError {
        let err = ControllerError::from(err);
        self.sink.report(operation, &err);
        err
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
