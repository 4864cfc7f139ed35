//! Shared wire definitions for the task board REST contract.

pub mod bulk;
pub mod codec;
pub mod history;
pub mod patch;
pub mod task;
