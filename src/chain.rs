//! Load actions and chain validation
//!
//! A resolver answers a request with a chain: an ordered list of
//! [`LoadAction`]s that must be materialized together. The chain must cover
//! the requested identifier, and every action must name an identifier and
//! carry either source text or a physical path.

use crate::error::{LoaderError, LoaderResult};
use std::path::{Path, PathBuf};

/// Ordered load actions produced by one resolver call
pub type Chain = Vec<LoadAction>;

/// One instruction from a resolver: load `identifier` from source text,
/// from a physical file, or from source text reported as the file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadAction {
    identifier: String,
    file: Option<PathBuf>,
    source: Option<String>,
    hint: Option<String>,
}

impl LoadAction {
    /// An action backed by a file on disk
    pub fn from_file(identifier: impl Into<String>, file: impl Into<PathBuf>) -> Self {
        Self {
            identifier: identifier.into(),
            file: Some(file.into()),
            source: None,
            hint: None,
        }
    }

    /// An action carrying generated or transformed source text
    pub fn from_source(identifier: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            file: None,
            source: Some(source.into()),
            hint: None,
        }
    }

    /// Report `file` as the origin of this action's source text
    pub fn with_file(mut self, file: impl Into<PathBuf>) -> Self {
        self.file = Some(file.into());
        self
    }

    /// Attach source text
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Attach hint text for external tooling
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Physical path, if any. An empty path counts as absent.
    pub fn file(&self) -> Option<&Path> {
        self.file
            .as_deref()
            .filter(|p| !p.as_os_str().is_empty())
    }

    /// Source text, if any. An empty string counts as absent.
    pub fn source(&self) -> Option<&str> {
        self.source.as_deref().filter(|s| !s.is_empty())
    }

    /// Hint text. Unlike source, an empty hint is still written.
    pub fn hint(&self) -> Option<&str> {
        self.hint.as_deref()
    }
}

/// Validate a non-empty chain resolved for `requested`.
///
/// Fails with `InvalidChain` on an action without an identifier or without
/// both source and file, and with `ChainIdentifierMismatch` when no action
/// covers the requested identifier. The covering action may sit anywhere.
pub fn validate_chain(chain: &[LoadAction], requested: &str) -> LoaderResult<()> {
    let mut covered = false;

    for (index, action) in chain.iter().enumerate() {
        if action.identifier().is_empty() {
            return Err(LoaderError::invalid_chain(
                requested,
                format!("action #{} does not specify an identifier", index),
            ));
        }
        if action.source().is_none() && action.file().is_none() {
            return Err(LoaderError::invalid_chain(
                requested,
                format!(
                    "action for {} specifies neither source nor file",
                    action.identifier()
                ),
            ));
        }
        if action.identifier() == requested {
            covered = true;
        }
    }

    if !covered {
        return Err(LoaderError::ChainIdentifierMismatch {
            requested: requested.to_string(),
            found: chain
                .iter()
                .map(LoadAction::identifier)
                .collect::<Vec<_>>()
                .join(", "),
        });
    }

    Ok(())
}
