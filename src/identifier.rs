//! Identifier handling
//!
//! An identifier is a hierarchical name such as `App\Model\User` or
//! `A/B/C`. Both `\` and `/` separate segments. After delimiter substitution
//! the identifier doubles as a relative path under the cache or hint
//! directory, so segments are checked for traversal before any path is built.

use crate::error::{LoaderError, LoaderResult};
use std::path::{Path, PathBuf};

/// Characters accepted as segment delimiters
pub const SEPARATORS: [char; 2] = ['\\', '/'];

/// Split an identifier into its segments (no validation)
pub fn segments(identifier: &str) -> impl Iterator<Item = &str> {
    identifier.split(SEPARATORS)
}

/// Validate that an identifier is safe to map onto the filesystem.
pub fn validate(identifier: &str) -> LoaderResult<()> {
    let invalid = |reason: &str| LoaderError::InvalidIdentifier {
        identifier: identifier.to_string(),
        reason: reason.to_string(),
    };

    if identifier.is_empty() {
        return Err(invalid("identifier cannot be empty"));
    }
    if identifier.contains('\0') {
        return Err(invalid("identifier must not contain NUL"));
    }
    for segment in segments(identifier) {
        if segment.is_empty() {
            return Err(invalid("identifier must not contain empty segments"));
        }
        if segment == "." || segment == ".." {
            return Err(invalid("identifier must not contain '.' or '..' segments"));
        }
    }
    Ok(())
}

/// Relative path for an identifier, e.g. `A\B\C` -> `A/B/C`
pub fn relative_path(identifier: &str) -> LoaderResult<PathBuf> {
    validate(identifier)?;
    Ok(segments(identifier).collect())
}

/// Full path of an identifier's file under `dir`, with `suffix` appended to
/// the last segment (`.php`, `.map`, `.meta.php`, ...).
pub fn file_path(dir: &Path, identifier: &str, suffix: &str) -> LoaderResult<PathBuf> {
    let mut path = dir.join(relative_path(identifier)?);
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .ok_or_else(|| LoaderError::Internal(format!("no file name for {}", identifier)))?;
    name.push(suffix);
    path.set_file_name(name);
    Ok(path)
}
