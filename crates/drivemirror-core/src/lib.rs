//! DriveMirror Core - Domain types and port definitions
//!
//! This crate contains the dependency-free heart of DriveMirror:
//! - **Domain types** - `FileRecord`, `RemoteId`, the remote error taxonomy
//! - **Port definitions** - `IRemoteStore`, the contract every remote
//!   storage adapter implements
//! - **Configuration** - typed config with loading, validation and a builder
//!
//! # Architecture
//!
//! DriveMirror follows a ports & adapters layout. The sync engine
//! (`drivemirror-sync`) talks to the remote store exclusively through the
//! [`ports::remote_store::IRemoteStore`] trait; concrete backends such as
//! the Google Drive adapter live in their own crates.

pub mod config;
pub mod domain;
pub mod ports;
