use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Opaque identifier assigned by the remote store when a task is created.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(pub String);

impl TaskId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for TaskId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for TaskId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// A to-do item as the remote store represents it.
///
/// Field names follow the remote document layout (`_id`, `task`). Any other
/// fields the store attaches are kept in `extra` and written back unchanged,
/// so submitting the whole list does not strip them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    #[serde(rename = "_id")]
    pub id: TaskId,
    #[serde(rename = "task")]
    pub text: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub position: u32,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Task {
    pub fn new(id: impl Into<TaskId>, text: impl Into<String>, position: u32) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            completed: false,
            position,
            extra: Map::new(),
        }
    }
}
