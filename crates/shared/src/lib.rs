//! Wire types shared between the task list client and its front ends.

pub mod domain;
pub mod error;
pub mod protocol;
