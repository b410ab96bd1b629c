//! Domain types for DriveMirror
//!
//! Pure data types with no I/O: the ledger record, opaque identifiers,
//! and the remote error taxonomy.

pub mod errors;
pub mod newtypes;
pub mod record;

pub use errors::RemoteStoreError;
pub use newtypes::RemoteId;
pub use record::FileRecord;
