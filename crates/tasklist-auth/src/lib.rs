pub mod client;
pub mod session;
pub mod storage;

pub use client::{AuthClient, AuthClientError, RegisterRequest};
pub use session::SessionGate;
pub use storage::{StorageError, TokenStore};
