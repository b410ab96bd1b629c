//! Access token sources for the Drive API
//!
//! The transport asks a [`TokenProvider`] for the bearer token on every
//! request, so a provider that refreshes itself can be dropped in later
//! without touching the client.

use std::path::Path;

use anyhow::Context;

/// Source of OAuth2 bearer tokens for Drive API requests.
pub trait TokenProvider: Send + Sync {
    /// The token to place in the `Authorization` header.
    fn bearer_token(&self) -> String;
}

/// Token read once from a file on disk.
///
/// A missing or empty token file is a startup failure: there is no
/// interactive flow to fall back to.
pub struct FileTokenProvider {
    token: String,
}

impl FileTokenProvider {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading access token from {}", path.display()))?;
        let token = raw.trim().to_string();
        anyhow::ensure!(!token.is_empty(), "token file {} is empty", path.display());
        Ok(Self { token })
    }
}

impl TokenProvider for FileTokenProvider {
    fn bearer_token(&self) -> String {
        self.token.clone()
    }
}

/// Fixed in-memory token, mainly for tests.
pub struct StaticTokenProvider {
    token: String,
}

impl StaticTokenProvider {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

impl TokenProvider for StaticTokenProvider {
    fn bearer_token(&self) -> String {
        self.token.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_provider_trims_trailing_newline() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token");
        std::fs::write(&path, "ya29.secret-token\n").unwrap();

        let provider = FileTokenProvider::load(&path).unwrap();
        assert_eq!(provider.bearer_token(), "ya29.secret-token");
    }

    #[test]
    fn missing_token_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(FileTokenProvider::load(&dir.path().join("absent")).is_err());
    }

    #[test]
    fn empty_token_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token");
        std::fs::write(&path, "  \n").unwrap();
        assert!(FileTokenProvider::load(&path).is_err());
    }

    #[test]
    fn static_provider_returns_its_token() {
        let provider = StaticTokenProvider::new("abc");
        assert_eq!(provider.bearer_token(), "abc");
    }
}
