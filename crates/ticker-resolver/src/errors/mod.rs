//! Error types and recovery classification for the resolver crate.
//!
//! This module provides:
//! - [`ResolverError`]: The main error enum for listing, cache and refresh operations
//! - [`Recovery`]: How the caller is expected to recover from each error

mod recovery;

pub use recovery::Recovery;

use thiserror::Error;

/// Errors that can occur while building or maintaining the listing index.
///
/// None of these ever reach a resolution caller: a name that cannot be
/// matched is `None`, not an error. Each variant is classified into a
/// [`Recovery`] via [`recovery`](Self::recovery).
#[derive(Error, Debug)]
pub enum ResolverError {
    /// A single listing provider failed or returned no usable rows.
    /// Recovered by trying the next provider for the same universe.
    #[error("Source unavailable: {provider} - {message}")]
    SourceUnavailable {
        /// The provider that failed
        provider: String,
        /// What went wrong
        message: String,
    },

    /// A listing provider did not answer within the configured timeout.
    #[error("Timeout: {provider}")]
    Timeout {
        /// The provider that timed out
        provider: String,
    },

    /// Every universe came back empty, so no snapshot could be built.
    /// The previous snapshot (if any) stays in service.
    #[error("Refresh failed: no listing rows from any universe")]
    RefreshFailed,

    /// The persisted cache file exists but could not be read back.
    /// Treated exactly like a missing cache.
    #[error("Cache corrupt at {path}: {message}")]
    CacheCorrupt {
        /// Location of the cache file
        path: String,
        /// Parse or validation failure
        message: String,
    },

    /// A listing row was rejected at ingestion (empty identifier or name).
    #[error("Invalid listing row: {0}")]
    InvalidRecord(String),

    /// Filesystem error while persisting the cache.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Transport error while talking to a listing provider.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// JSON encoding or decoding failed.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ResolverError {
    /// Returns the recovery classification for this error.
    ///
    /// # Examples
    ///
    /// ```
    /// use ticker_resolver::errors::{Recovery, ResolverError};
    ///
    /// let error = ResolverError::Timeout { provider: "SINA_HK".to_string() };
    /// assert_eq!(error.recovery(), Recovery::NextProvider);
    ///
    /// let error = ResolverError::RefreshFailed;
    /// assert_eq!(error.recovery(), Recovery::KeepCurrent);
    /// ```
    pub fn recovery(&self) -> Recovery {
        match self {
            Self::SourceUnavailable { .. }
            | Self::Timeout { .. }
            | Self::Network(_)
            | Self::Serialization(_) => Recovery::NextProvider,

            Self::RefreshFailed | Self::Io(_) => Recovery::KeepCurrent,

            Self::CacheCorrupt { .. } => Recovery::Rebuild,

            Self::InvalidRecord(_) => Recovery::SkipRow,
        }
    }

    /// Convenience constructor used by provider implementations.
    pub(crate) fn unavailable(provider: &str, message: impl Into<String>) -> Self {
        Self::SourceUnavailable {
            provider: provider.to_string(),
            message: message.into(),
        }
    }
}
