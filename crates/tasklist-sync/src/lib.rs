//! Task list synchronization: the local task collection, its edit mode, and
//! the confirm-then-apply discipline every mutation follows against the
//! remote store.

pub mod edit;
pub mod error;
mod in_flight;
pub mod synchronizer;

pub use edit::EditMode;
pub use error::{Operation, SyncError};
pub use synchronizer::{Confirmation, TaskSynchronizer, DEFAULT_REQUEST_TIMEOUT};
