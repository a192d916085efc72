use serde::{Deserialize, Serialize};

use crate::domain::TaskId;

/// Body of `POST /api/tasks`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateTaskRequest {
    pub task: String,
    pub position: u32,
}

/// Body of `PUT /api/tasks/:id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateTaskRequest {
    pub completed: bool,
}

/// Path segments of the task collection, below the API base URL.
pub const TASKS_SEGMENTS: [&str; 2] = ["api", "tasks"];

/// Last segment of the batch position update. It sits beside `:id`, so a
/// task id is always pushed as a single encoded segment.
pub const UPDATE_POSITIONS_SEGMENT: &str = "updatePositions";

pub fn tasks_route() -> &'static str {
    "/api/tasks"
}

/// Segments of a single task's resource. The id is kept as one segment;
/// encoding reserved characters is up to the URL builder.
pub fn task_segments(task_id: &TaskId) -> [&str; 3] {
    [TASKS_SEGMENTS[0], TASKS_SEGMENTS[1], task_id.as_str()]
}

pub fn update_positions_segments() -> [&'static str; 3] {
    [TASKS_SEGMENTS[0], TASKS_SEGMENTS[1], UPDATE_POSITIONS_SEGMENT]
}
