pub mod backend;
pub mod client;
pub mod task;

pub use backend::{TaskApiError, TaskApiResult, TaskBackend};
pub use client::TaskClient;
pub use task::{Task, TaskCreateRequest, TaskUpdateRequest};
