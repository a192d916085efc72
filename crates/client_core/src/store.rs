//! In-memory task list backing the controller.

use shared::domain::{Task, TaskId};

use crate::error::ControllerError;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskStore {
    tasks: Vec<Task>,
    input: String,
}

impl TaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn get(&self, task_id: &TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| &task.id == task_id)
    }

    pub fn index_of(&self, task_id: &TaskId) -> Option<usize> {
        self.tasks.iter().position(|task| &task.id == task_id)
    }

    pub fn set_all(&mut self, tasks: Vec<Task>) {
        self.tasks = tasks;
    }

    pub fn append(&mut self, task: Task) {
        self.tasks.push(task);
    }

    /// Swaps in `task` for the entry with the same id. Returns false when no
    /// such entry exists.
    pub fn replace(&mut self, task: Task) -> bool {
        match self.index_of(&task.id) {
            Some(index) => {
                self.tasks[index] = task;
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, task_id: &TaskId) -> Option<(usize, Task)> {
        let index = self.index_of(task_id)?;
        Some((index, self.tasks.remove(index)))
    }

    /// Array splice: take the task at `source` out and insert it at
    /// `destination`. Positions are left alone; see [`TaskStore::renumber`].
    pub fn move_task(&mut self, source: usize, destination: usize) -> Result<(), ControllerError> {
        let len = self.tasks.len();
        if source >= len {
            return Err(ControllerError::IndexOutOfRange { index: source, len });
        }
        if destination >= len {
            return Err(ControllerError::IndexOutOfRange {
                index: destination,
                len,
            });
        }
        let task = self.tasks.remove(source);
        self.tasks.insert(destination, task);
        Ok(())
    }

    pub fn renumber(&mut self) {
        for (index, task) in self.tasks.iter_mut().enumerate() {
            task.position = index as u32;
        }
    }

    /// True when every task's position equals its index.
    #[cfg(test)]
    pub(crate) fn positions_match_order(&self) -> bool {
        self.tasks
            .iter()
            .enumerate()
            .all(|(index, task)| task.position as usize == index)
    }

    pub fn snapshot(&self) -> Vec<Task> {
        self.tasks.clone()
    }

    pub fn restore(&mut self, snapshot: Vec<Task>) {
        self.tasks = snapshot;
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    pub fn clear_input(&mut self) {
        self.input.clear();
    }
}
