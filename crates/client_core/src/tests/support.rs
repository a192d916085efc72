use std::{
    collections::HashSet,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use shared::domain::{Task, TaskId};

use crate::{
    api::TaskApi,
    controller::TaskListController,
    diagnostics::{DiagnosticSink, Operation},
    error::{ControllerError, SyncError},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Call {
    List,
    Create { text: String, position: u32 },
    SetCompleted { task_id: TaskId, completed: bool },
    Delete { task_id: TaskId },
    ReorderAll { tasks: Vec<Task> },
}

/// In-memory stand-in for the remote store. Successful calls are applied to
/// `remote`; operations listed in `failing` return a server error instead.
#[derive(Default)]
pub(crate) struct ScriptedTaskApi {
    remote: Mutex<Vec<Task>>,
    calls: Mutex<Vec<Call>>,
    failing: Mutex<HashSet<Operation>>,
    next_id: Mutex<u32>,
}

impl ScriptedTaskApi {
    pub(crate) fn with_tasks(tasks: Vec<Task>) -> Arc<Self> {
        let api = Self::default();
        *api.remote.lock().expect("remote") = tasks;
        Arc::new(api)
    }

    pub(crate) fn fail(&self, operation: Operation) {
        self.failing.lock().expect("failing").insert(operation);
    }

    pub(crate) fn recover(&self, operation: Operation) {
        self.failing.lock().expect("failing").remove(&operation);
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.calls.lock().expect("calls").clone()
    }

    pub(crate) fn remote(&self) -> Vec<Task> {
        self.remote.lock().expect("remote").clone()
    }

    fn record(&self, call: Call, operation: Operation) -> Result<(), SyncError> {
        self.calls.lock().expect("calls").push(call);
        if self.failing.lock().expect("failing").contains(&operation) {
            return Err(SyncError::server(500, r#"{"message":"scripted failure"}"#));
        }
        Ok(())
    }
}

#[async_trait]
impl TaskApi for ScriptedTaskApi {
    async fn list(&self) -> Result<Vec<Task>, SyncError> {
        self.record(Call::List, Operation::Load)?;
        Ok(self.remote())
    }

    async fn create(&self, text: &str, position: u32) -> Result<Task, SyncError> {
        self.record(
            Call::Create {
                text: text.to_string(),
                position,
            },
            Operation::Add,
        )?;
        let mut next_id = self.next_id.lock().expect("next id");
        *next_id += 1;
        let task = Task::new(format!("srv-{}", *next_id), text, position);
        self.remote.lock().expect("remote").push(task.clone());
        Ok(task)
    }

    async fn set_completed(&self, task_id: &TaskId, completed: bool) -> Result<(), SyncError> {
        self.record(
            Call::SetCompleted {
                task_id: task_id.clone(),
                completed,
            },
            Operation::Toggle,
        )?;
        let mut remote = self.remote.lock().expect("remote");
        match remote.iter_mut().find(|task| &task.id == task_id) {
            Some(task) => {
                task.completed = completed;
                Ok(())
            }
            None => Err(SyncError::server(404, "task not found")),
        }
    }

    async fn delete(&self, task_id: &TaskId) -> Result<(), SyncError> {
        self.record(
            Call::Delete {
                task_id: task_id.clone(),
            },
            Operation::Delete,
        )?;
        self.remote
            .lock()
            .expect("remote")
            .retain(|task| &task.id != task_id);
        Ok(())
    }

    async fn reorder_all(&self, tasks: &[Task]) -> Result<(), SyncError> {
        self.record(
            Call::ReorderAll {
                tasks: tasks.to_vec(),
            },
            Operation::Reorder,
        )?;
        *self.remote.lock().expect("remote") = tasks.to_vec();
        Ok(())
    }
}

#[derive(Default)]
pub(crate) struct RecordingSink {
    reports: Mutex<Vec<(Operation, String)>>,
}

impl RecordingSink {
    pub(crate) fn reports(&self) -> Vec<(Operation, String)> {
        self.reports.lock().expect("reports").clone()
    }
}

impl DiagnosticSink for RecordingSink {
    fn report(&self, operation: Operation, error: &ControllerError) {
        self.reports
            .lock()
            .expect("reports")
            .push((operation, error.to_string()));
    }
}

pub(crate) fn task(id: &str, text: &str, position: u32) -> Task {
    Task::new(id, text, position)
}

/// Controller over `api` with a recording sink, already loaded.
pub(crate) async fn loaded_controller(
    api: Arc<ScriptedTaskApi>,
) -> (TaskListController, Arc<RecordingSink>) {
    let sink = Arc::new(RecordingSink::default());
    let mut controller = TaskListController::new(api).with_diagnostic_sink(sink.clone());
    controller.load().await.expect("load");
    (controller, sink)
}
