//! Source references
//!
//! A reference names what a [`super::VirtualStream`] reads. It renders as a
//! URL so it can travel through hosts that only accept a path string:
//!
//! - `modmap-eval://-/<name>` reads a registered fragment
//! - `modmap-include://-/<content>,<reported>` reads `content`, reports `reported`

use crate::error::{LoaderError, LoaderResult};
use std::fmt;
use std::path::PathBuf;

/// URL scheme for fragment references
pub const EVAL_SCHEME: &str = "modmap-eval";

/// URL scheme for origin-remapped file references
pub const INCLUDE_SCHEME: &str = "modmap-include";

/// Name prefix for fragments with no backing file
pub const INLINE_PREFIX: &str = "inline";

const HOST: &str = "-";

/// What a virtual stream reads
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceRef {
    /// A single-use fragment registered under `name`
    Fragment { name: String },

    /// Bytes of `content`, metadata of `reported`
    Remap { content: PathBuf, reported: PathBuf },
}

impl SourceRef {
    pub fn fragment(name: impl Into<String>) -> Self {
        Self::Fragment { name: name.into() }
    }

    pub fn remap(content: impl Into<PathBuf>, reported: impl Into<PathBuf>) -> Self {
        Self::Remap {
            content: content.into(),
            reported: reported.into(),
        }
    }

    /// Parse a reference URL
    pub fn parse(url: &str) -> LoaderResult<Self> {
        let invalid = || LoaderError::InvalidReference(url.to_string());

        let (scheme, rest) = url.split_once("://").ok_or_else(invalid)?;
        let (host, path) = rest.split_once('/').ok_or_else(invalid)?;
        if host != HOST || path.is_empty() {
            return Err(invalid());
        }

        match scheme {
            EVAL_SCHEME => Ok(Self::fragment(path)),
            INCLUDE_SCHEME => {
                let (content, reported) = path.split_once(',').ok_or_else(invalid)?;
                if content.is_empty() || reported.is_empty() {
                    return Err(invalid());
                }
                Ok(Self::remap(content, reported))
            }
            _ => Err(invalid()),
        }
    }
}

impl fmt::Display for SourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fragment { name } => write!(f, "{}://{}/{}", EVAL_SCHEME, HOST, name),
            Self::Remap { content, reported } => write!(
                f,
                "{}://{}/{},{}",
                INCLUDE_SCHEME,
                HOST,
                content.display(),
                reported.display()
            ),
        }
    }
}
