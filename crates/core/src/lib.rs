//! Solara core: the session data model and the credential store the rest of the
//! client is built on.

pub mod error;
pub mod rewards;
pub mod storage;
pub mod store;
pub mod types;

pub use error::{StorageError, StorageResult};
pub use storage::{FileStorage, MemoryStorage, Storage};
pub use store::CredentialStore;
pub use types::{SessionUser, Token};
