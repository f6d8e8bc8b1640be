//! Mapping file loader
//!
//! The boundary between the cache/orchestrator and whatever actually
//! executes source. [`StreamLoader`] routes every load through the
//! [`VirtualSourceRegistry`] so the executing host sees the reported origin
//! rather than the cache path or an anonymous buffer.

use crate::error::LoaderResult;
use crate::vfs::{SourceRef, VirtualSourceRegistry, VirtualStream, INLINE_PREFIX};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

/// Executes source on behalf of the loader.
pub trait MappingFileLoader: Send + Sync {
    /// Execute `source`, reporting `map_to` as its origin when given.
    fn eval(&self, source: &str, map_to: Option<&Path>) -> LoaderResult<()>;

    /// Execute `file` at most once, reporting `map_to` as its origin.
    fn include_once(&self, file: &Path, map_to: &Path) -> LoaderResult<()>;

    /// Execute `file` at most once, as itself.
    fn require_once(&self, file: &Path) -> LoaderResult<()>;

    /// Forget that anything at or beneath `path` was included, so the next
    /// include runs it again. Called when the cache rewrites or removes it.
    fn forget(&self, _path: &Path) {}
}

/// Consumes an open stream: reads it, stats it, runs it.
pub trait SourceHost: Send + Sync {
    fn execute(&self, stream: &mut VirtualStream) -> LoaderResult<()>;
}

/// [`MappingFileLoader`] backed by the virtual source registry
pub struct StreamLoader<H> {
    registry: VirtualSourceRegistry,
    host: H,
    enable_mapping: bool,
    included: Mutex<HashSet<PathBuf>>,
}

impl<H: SourceHost> StreamLoader<H> {
    pub fn new(registry: VirtualSourceRegistry, host: H) -> Self {
        Self {
            registry,
            host,
            enable_mapping: true,
            included: Mutex::new(HashSet::new()),
        }
    }

    /// Toggle origin remapping. Without it, evaluated text is anonymous and
    /// included files report themselves.
    pub fn with_mapping(mut self, enable: bool) -> Self {
        self.enable_mapping = enable;
        self
    }

    pub fn registry(&self) -> &VirtualSourceRegistry {
        &self.registry
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    fn run(&self, reference: &SourceRef) -> LoaderResult<()> {
        let mut stream = self.registry.open(reference)?;
        let result = self.host.execute(&mut stream);
        stream.close();
        result
    }

    /// Mark `file` as included; false if it already was.
    fn claim(&self, file: &Path) -> bool {
        self.included
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(file.to_path_buf())
    }

    fn unclaim(&self, file: &Path) {
        self.included
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .remove(file);
    }

    fn include(&self, file: &Path, reported: &Path) -> LoaderResult<()> {
        if !self.claim(file) {
            debug!("{} already included, skipping", file.display());
            return Ok(());
        }
        let result = self.run(&SourceRef::remap(file, reported));
        if result.is_err() {
            self.unclaim(file);
        }
        result
    }
}

impl<H: SourceHost> MappingFileLoader for StreamLoader<H> {
    fn eval(&self, source: &str, map_to: Option<&Path>) -> LoaderResult<()> {
        let (name, origin) = match map_to {
            Some(path) if self.enable_mapping => {
                (path.display().to_string(), Some(path.to_path_buf()))
            }
            _ => (format!("{}/{}", INLINE_PREFIX, Uuid::new_v4()), None),
        };

        self.registry.set_fragment(name.clone(), source, origin)?;
        let reference = SourceRef::fragment(name.clone());
        match self.registry.open(&reference) {
            Ok(mut stream) => {
                let result = self.host.execute(&mut stream);
                stream.close();
                result
            }
            Err(e) => {
                self.registry.discard(&name);
                Err(e)
            }
        }
    }

    fn include_once(&self, file: &Path, map_to: &Path) -> LoaderResult<()> {
        if self.enable_mapping {
            self.include(file, map_to)
        } else {
            self.include(file, file)
        }
    }

    fn require_once(&self, file: &Path) -> LoaderResult<()> {
        self.include(file, file)
    }

    fn forget(&self, path: &Path) {
        self.included
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .retain(|included| !included.starts_with(path));
    }
}
