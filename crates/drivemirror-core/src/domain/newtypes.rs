//! Domain newtypes
//!
//! Strongly-typed wrappers for identifiers that would otherwise be bare
//! strings. Remote node identifiers are opaque: DriveMirror never parses
//! or interprets them, only passes them back to the adapter that issued
//! them.

use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

/// Opaque identifier assigned by the remote store to a node (file or folder).
///
/// The value is vendor-specific and has no structure that the engine may
/// rely on; it is only ever compared for equality and echoed back in
/// subsequent calls.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RemoteId(String);

impl RemoteId {
    /// Wraps a vendor-issued identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for RemoteId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for RemoteId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for RemoteId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}
