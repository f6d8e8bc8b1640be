//! Error types for modmap
//!
//! All modules use `LoaderResult<T>` as their return type. An identifier that
//! no resolver knows about is not an error; see [`crate::loader::LoadOutcome`].

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for modmap operations
pub type LoaderResult<T> = Result<T, LoaderError>;

/// All errors that can occur while resolving, caching or loading modules
#[derive(Error, Debug)]
pub enum LoaderError {
    // Resolution errors
    #[error("Invalid chain for {identifier}: {reason}")]
    InvalidChain { identifier: String, reason: String },

    #[error("Chain identifier mismatch: requested {requested}, got {found}")]
    ChainIdentifierMismatch { requested: String, found: String },

    #[error("Invalid identifier '{identifier}': {reason}")]
    InvalidIdentifier { identifier: String, reason: String },

    #[error("Resolver failed for {identifier}: {reason}")]
    Resolver { identifier: String, reason: String },

    // Cache errors
    #[error("Cache write failed at {path}: {source}")]
    CacheWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to purge cache file {path}: {source}")]
    PurgeFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Caching is enabled but no cache directory is configured")]
    CacheDirMissing,

    #[error("Corrupt meta record at {path}: {reason}")]
    MetaCorrupt { path: PathBuf, reason: String },

    // Virtual source errors
    #[error("Fragment {0} is already set")]
    DuplicateFragment(String),

    #[error("Fragment not found: {0}")]
    FragmentNotFound(String),

    #[error("Invalid source reference: {0}")]
    InvalidReference(String),

    #[error("Source execution failed for {origin}: {reason}")]
    Execution { origin: String, reason: String },

    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Failed to create config directory {path}: {source}")]
    ConfigDirCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    // General errors
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("{0}")]
    User(String),
}

impl LoaderError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a cache write error for a path
    pub fn cache_write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::CacheWriteFailed {
            path: path.into(),
            source,
        }
    }

    /// Create an invalid chain error
    pub fn invalid_chain(identifier: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidChain {
            identifier: identifier.into(),
            reason: reason.into(),
        }
    }

    /// Create a resolver error
    pub fn resolver(identifier: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Resolver {
            identifier: identifier.into(),
            reason: reason.into(),
        }
    }

    /// Whether the error came from malformed resolver output
    pub fn is_chain_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidChain { .. } | Self::ChainIdentifierMismatch { .. }
        )
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::CacheDirMissing => Some("Set cache.dir in config.toml or disable cache.enabled"),
            Self::CacheWriteFailed { .. } => Some("Check permissions on the cache directory"),
            Self::PurgeFailed { .. } => Some("Check permissions, or run: modmap clear"),
            Self::MetaCorrupt { .. } => Some("Purge the identifier to rebuild its cache entry"),
            Self::ConfigInvalid { .. } => Some("Run: modmap config init --force"),
            Self::InvalidReference(_) => {
                Some("Expected modmap-include://-/<content>,<reported> or modmap-eval://-/<name>")
            }
            Self::FragmentNotFound(_) => Some("Fragments exist only inside the process that set them"),
            _ => None,
        }
    }
}
