//! Task list client: an in-memory task list kept in sync with a remote REST
//! store through optimistic updates.

pub mod api;
pub mod controller;
pub mod diagnostics;
pub mod error;
pub mod store;
pub mod worker;

pub use api::{HttpTaskApi, HttpTaskApiOptions, TaskApi};
pub use controller::{ReorderFailurePolicy, TaskListController};
pub use diagnostics::{DiagnosticSink, Operation, TracingSink};
pub use error::{ControllerError, SyncError};
pub use store::TaskStore;
pub use worker::{ControllerHandle, TaskCommand};

#[cfg(test)]
#[path = "tests/support.rs"]
pub(crate) mod test_support;
