//! Explicit, injected key/value persistence for client-side state.
//!
//! Values are raw bytes keyed by string. `MemoryStore` is process-local,
//! `FileStore` survives restarts by writing a JSON document to disk.

pub mod error;
pub mod file;
pub mod memory;
pub mod store;

pub use error::StorageError;
pub use file::FileStore;
pub use memory::MemoryStore;
pub use store::{LocalStore, LocalStoreExt};
