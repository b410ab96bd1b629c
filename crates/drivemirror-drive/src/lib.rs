//! Google Drive adapter for DriveMirror
//!
//! Implements the [`IRemoteStore`](drivemirror_core::ports::remote_store::IRemoteStore)
//! port on top of the Google Drive v3 REST API:
//!
//! - [`client`]: authenticated HTTP transport with Retry-After-aware
//!   throttling and the status-to-error-class mapping
//! - [`store`]: the port implementation (listing, folder and file
//!   creation, media upload and download)
//! - [`token`]: access token sources
//!
//! One [`DriveStore`] wraps one `reqwest::Client`; callers that want
//! independent transports construct several stores.

pub mod client;
pub mod store;
pub mod token;

pub use client::DriveClient;
pub use store::DriveStore;
pub use token::{FileTokenProvider, StaticTokenProvider, TokenProvider};
