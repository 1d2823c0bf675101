//! Blob storage for cached API responses
//!
//! Objects are opaque byte bodies addressed by slash-separated keys. Stores
//! support four operations: get, put, delete and list-by-prefix. Listing
//! returns the storage-maintained last-modified time of every object, which
//! is what stale-entry sweeps age against.

mod error;
mod file;
mod memory;
mod store;
mod types;

pub use error::{Result, StoreError};
pub use file::FileStore;
pub use memory::MemoryStore;
pub use store::{validate_key, CacheStore};
pub use types::StoredObject;
