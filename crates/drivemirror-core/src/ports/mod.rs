//! Port definitions
//!
//! Traits implemented by adapter crates. The sync engine depends only on
//! these interfaces, never on a concrete backend.

pub mod remote_store;

pub use remote_store::{ChildPage, IRemoteStore, RemoteEntry, RemoteFileMeta};
