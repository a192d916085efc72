//! Single-writer command queue in front of a [`TaskListController`].

use shared::domain::{Task, TaskId};
use tokio::{
    sync::{mpsc, oneshot},
    task::JoinHandle,
};
use tracing::debug;

use crate::{controller::TaskListController, error::ControllerError};

const COMMAND_QUEUE_CAPACITY: usize = 64;

pub type Reply<T> = oneshot::Sender<Result<T, ControllerError>>;

pub enum TaskCommand {
    Load {
        reply: Reply<()>,
    },
    Add {
        text: String,
        reply: Reply<Task>,
    },
    Toggle {
        task_id: TaskId,
        reply: Reply<()>,
    },
    Delete {
        task_id: TaskId,
        reply: Reply<()>,
    },
    Reorder {
        source: usize,
        destination: Option<usize>,
        reply: Reply<()>,
    },
    Snapshot {
        reply: oneshot::Sender<Vec<Task>>,
    },
}

impl TaskCommand {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Load { .. } => "load",
            Self::Add { .. } => "add",
            Self::Toggle { .. } => "toggle",
            Self::Delete { .. } => "delete",
            Self::Reorder { .. } => "reorder",
            Self::Snapshot { .. } => "snapshot",
        }
    }
}

/// Cloneable front end to a controller running on its own task. Commands are
/// applied one at a time in the order they were queued, so each operation's
/// snapshot and rollback see a list nobody else is editing.
#[derive(Clone)]
pub struct ControllerHandle {
    tx: mpsc::Sender<TaskCommand>,
}

impl ControllerHandle {
    /// Moves `controller` onto a tokio task. The join handle yields the
    /// controller back once every handle has been dropped.
    pub fn spawn(controller: TaskListController) -> (Self, JoinHandle<TaskListController>) {
        let (tx, rx) = mpsc::channel(COMMAND_QUEUE_CAPACITY);
        let worker = tokio::spawn(run(controller, rx));
        (Self { tx }, worker)
    }

    pub async fn load(&self) -> Result<(), ControllerError> {
        self.request(|reply| TaskCommand::Load { reply }).await?
    }

    pub async fn add(&self, text: impl Into<String>) -> Result<Task, ControllerError> {
        let text = text.into();
        self.request(|reply| TaskCommand::Add { text, reply })
            .await?
    }

    pub async fn toggle(&self, task_id: TaskId) -> Result<(), ControllerError> {
        self.request(|reply| TaskCommand::Toggle { task_id, reply })
            .await?
    }

    pub async fn delete(&self, task_id: TaskId) -> Result<(), ControllerError> {
        self.request(|reply| TaskCommand::Delete { task_id, reply })
            .await?
    }

    pub async fn reorder(
        &self,
        source: usize,
        destination: Option<usize>,
    ) -> Result<(), ControllerError> {
        self.request(|reply| TaskCommand::Reorder {
            source,
            destination,
            reply,
        })
        .await?
    }

    pub async fn tasks(&self) -> Result<Vec<Task>, ControllerError> {
        self.request(|reply| TaskCommand::Snapshot { reply }).await
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> TaskCommand,
    ) -> Result<T, ControllerError> {
        let (reply, rx) = oneshot::channel();
        let cmd = build(reply);
        debug!(command = cmd.name(), "tasks: queued command");
        self.tx
            .send(cmd)
            .await
            .map_err(|_| ControllerError::ControllerStopped)?;
        rx.await.map_err(|_| ControllerError::ControllerStopped)
    }
}

async fn run(
    mut controller: TaskListController,
    mut rx: mpsc::Receiver<TaskCommand>,
) -> TaskListController {
    while let Some(cmd) = rx.recv().await {
        // A dropped receiver only means the caller stopped waiting.
        match cmd {
            TaskCommand::Load { reply } => {
                let _ = reply.send(controller.load().await);
            }
            TaskCommand::Add { text, reply } => {
                let _ = reply.send(controller.add(&text).await);
            }
            TaskCommand::Toggle { task_id, reply } => {
                let _ = reply.send(controller.toggle(&task_id).await);
            }
            TaskCommand::Delete { task_id, reply } => {
                let _ = reply.send(controller.delete(&task_id).await);
            }
            TaskCommand::Reorder {
                source,
                destination,
                reply,
            } => {
                let _ = reply.send(controller.reorder(source, destination).await);
            }
            TaskCommand::Snapshot { reply } => {
                let _ = reply.send(controller.tasks().to_vec());
            }
        }
    }
    controller
}

#[cfg(test)]
#[path = "tests/worker_tests.rs"]
mod tests;
