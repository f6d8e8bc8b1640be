//! Directory resolver
//!
//! Resolves identifiers to files under a list of source roots:
//! `A\B\C` maps to `{root}/A/B/C.{ext}`. Roots are searched in order and the
//! first one holding the file wins, the same precedence used when listing.
//!
//! An optional `{root}/A/B/C.{ext}.hint` beside the file becomes the action's
//! hint.

use crate::chain::{Chain, LoadAction};
use crate::dispatch::{Resolver, Scanner};
use crate::error::{LoaderError, LoaderResult};
use crate::identifier;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const HINT_SUFFIX: &str = ".hint";

/// Separator used for identifiers produced by [`Scanner::scan`]
pub const SCAN_SEPARATOR: &str = "\\";

/// Resolver and scanner over one or more source directories
#[derive(Debug, Clone)]
pub struct DirectoryResolver {
    roots: Vec<PathBuf>,
    extension: String,
    inline_source: bool,
}

impl DirectoryResolver {
    pub fn new(roots: Vec<PathBuf>, extension: impl AsRef<str>) -> Self {
        Self {
            roots,
            extension: extension.as_ref().trim_start_matches('.').to_string(),
            inline_source: false,
        }
    }

    /// Return file contents as source text, reported as the file.
    ///
    /// The cache then stores an artifact plus origin map instead of a bare
    /// include path.
    pub fn with_inline_source(mut self, inline: bool) -> Self {
        self.inline_source = inline;
        self
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    fn suffix(&self) -> String {
        format!(".{}", self.extension)
    }

    /// First existing file for `identifier` across the roots
    fn locate(&self, identifier: &str) -> LoaderResult<Option<PathBuf>> {
        let suffix = self.suffix();
        for root in &self.roots {
            let path = identifier::file_path(root, identifier, &suffix)?;
            if path.is_file() {
                return Ok(Some(path));
            }
        }
        Ok(None)
    }

    fn action_for(&self, identifier: &str, path: PathBuf) -> LoaderResult<LoadAction> {
        let mut action = if self.inline_source {
            let source = fs::read_to_string(&path).map_err(|e| {
                LoaderError::resolver(identifier, format!("reading {}: {}", path.display(), e))
            })?;
            LoadAction::from_source(identifier, source).with_file(&path)
        } else {
            LoadAction::from_file(identifier, &path)
        };

        let mut hint_path = path.into_os_string();
        hint_path.push(HINT_SUFFIX);
        let hint_path = PathBuf::from(hint_path);
        if hint_path.is_file() {
            match fs::read_to_string(&hint_path) {
                Ok(hint) => action = action.with_hint(hint),
                Err(e) => warn!("Skipping unreadable hint {}: {}", hint_path.display(), e),
            }
        }

        Ok(action)
    }

    fn scan_root(&self, root: &Path, found: &mut Vec<String>) -> LoaderResult<()> {
        let suffix = self.suffix();
        let mut pending = vec![root.to_path_buf()];

        while let Some(dir) = pending.pop() {
            let entries = match fs::read_dir(&dir) {
                Ok(entries) => entries,
                Err(_) if dir == root => return Ok(()), // Root doesn't exist, skip
                Err(e) => {
                    return Err(LoaderError::io(
                        format!("Failed to list {}", dir.display()),
                        e,
                    ))
                }
            };

            for entry in entries {
                let entry = entry
                    .map_err(|e| LoaderError::io(format!("Failed to list {}", dir.display()), e))?;
                let path = entry.path();
                let file_type = entry
                    .file_type()
                    .map_err(|e| LoaderError::io(format!("Failed to stat {}", path.display()), e))?;
                // Symlinked directories are not followed
                if file_type.is_dir() {
                    pending.push(path);
                    continue;
                }
                if file_type.is_symlink() && path.is_dir() {
                    debug!("Skipping symlinked directory {}", path.display());
                    continue;
                }
                if let Some(id) = identifier_for(root, &path, &suffix) {
                    found.push(id);
                }
            }
        }
        Ok(())
    }
}

/// Identifier for a source file under `root`, if it is one
fn identifier_for(root: &Path, path: &Path, suffix: &str) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let mut segments = relative
        .iter()
        .map(|s| s.to_str().map(str::to_string))
        .collect::<Option<Vec<_>>>()?;
    let last = segments.pop()?;
    let stem = last.strip_suffix(suffix)?;
    if stem.is_empty() {
        return None;
    }
    segments.push(stem.to_string());
    let id = segments.join(SCAN_SEPARATOR);
    identifier::validate(&id).ok()?;
    Some(id)
}

impl Resolver for DirectoryResolver {
    fn resolve(&self, identifier: &str) -> LoaderResult<Chain> {
        if identifier::validate(identifier).is_err() {
            // Not a name this resolver could map to a file
            return Ok(Vec::new());
        }
        match self.locate(identifier)? {
            Some(path) => {
                debug!("{} found at {}", identifier, path.display());
                Ok(vec![self.action_for(identifier, path)?])
            }
            None => Ok(Vec::new()),
        }
    }

    fn scanner(&self) -> Option<&dyn Scanner> {
        Some(self)
    }
}

impl Scanner for DirectoryResolver {
    fn scan(&self) -> LoaderResult<Vec<String>> {
        let mut seen = HashSet::new();
        let mut identifiers = Vec::new();

        for root in &self.roots {
            let mut found = Vec::new();
            self.scan_root(root, &mut found)?;
            found.sort();
            for id in found {
                if seen.insert(id.clone()) {
                    identifiers.push(id);
                }
            }
        }

        Ok(identifiers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(root: &Path, relative: &str, content: &str) -> PathBuf {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn resolves_to_physical_file() {
        let temp = TempDir::new().unwrap();
        let path = write(temp.path(), "App/Model/User.php", "<?php user");
        let resolver = DirectoryResolver::new(vec![temp.path().to_path_buf()], "php");

        let chain = resolver.resolve("App\\Model\\User").unwrap();
        assert_eq!(chain.len(), 1);
        assert_eq!(chain[0].identifier(), "App\\Model\\User");
        assert_eq!(chain[0].file(), Some(path.as_path()));
        assert!(chain[0].source().is_none());
    }

    #[test]
    fn inline_source_reads_file() {
        let temp = TempDir::new().unwrap();
        let path = write(temp.path(), "Foo.php", "<?php foo");
        let resolver =
            DirectoryResolver::new(vec![temp.path().to_path_buf()], ".php").with_inline_source(true);

        let chain = resolver.resolve("Foo").unwrap();
        assert_eq!(chain[0].source(), Some("<?php foo"));
        assert_eq!(chain[0].file(), Some(path.as_path()));
    }

    #[test]
    fn first_root_wins() {
        let first = TempDir::new().unwrap();
        let second = TempDir::new().unwrap();
        let winner = write(first.path(), "Shared.php", "first");
        write(second.path(), "Shared.php", "second");
        write(second.path(), "OnlySecond.php", "second");

        let resolver = DirectoryResolver::new(
            vec![first.path().to_path_buf(), second.path().to_path_buf()],
            "php",
        );
        assert_eq!(
            resolver.resolve("Shared").unwrap()[0].file(),
            Some(winner.as_path())
        );
        assert_eq!(resolver.resolve("OnlySecond").unwrap().len(), 1);
    }

    #[test]
    fn missing_and_invalid_identifiers_are_not_resolved() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "Foo.php", "foo");
        let resolver = DirectoryResolver::new(vec![temp.path().to_path_buf()], "php");

        assert!(resolver.resolve("Bar").unwrap().is_empty());
        assert!(resolver.resolve("..\\Foo").unwrap().is_empty());
        assert!(resolver.resolve("").unwrap().is_empty());
    }

    #[test]
    fn hint_file_is_attached() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "Foo.php", "foo");
        write(temp.path(), "Foo.php.hint", "<?php class Foo {}");
        let resolver = DirectoryResolver::new(vec![temp.path().to_path_buf()], "php");

        let chain = resolver.resolve("Foo").unwrap();
        assert_eq!(chain[0].hint(), Some("<?php class Foo {}"));
    }

    #[test]
    fn scan_lists_sorted_deduplicated() {
        let first = TempDir::new().unwrap();
        let second = TempDir::new().unwrap();
        write(first.path(), "B.php", "");
        write(first.path(), "A/C.php", "");
        write(first.path(), "A/C.php.hint", "");
        write(first.path(), "README.md", "");
        write(second.path(), "B.php", "");
        write(second.path(), "Z.php", "");

        let resolver = DirectoryResolver::new(
            vec![
                first.path().to_path_buf(),
                second.path().to_path_buf(),
                first.path().join("missing"),
            ],
            "php",
        );
        assert_eq!(resolver.scan().unwrap(), vec!["A\\C", "B", "Z"]);
        assert!(resolver.scanner().is_some());
    }

    #[cfg(unix)]
    #[test]
    fn scan_skips_symlinked_directories() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "A/Foo.php", "");
        std::os::unix::fs::symlink(temp.path(), temp.path().join("A").join("loop")).unwrap();

        let resolver = DirectoryResolver::new(vec![temp.path().to_path_buf()], "php");
        assert_eq!(resolver.scan().unwrap(), vec!["A\\Foo"]);
    }
}
