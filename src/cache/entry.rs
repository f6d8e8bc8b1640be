//! Cache store and per-identifier entries

use crate::cache::meta::{CacheLayout, CachedMeta};
use crate::chain::LoadAction;
use crate::error::{LoaderError, LoaderResult};
use crate::identifier;
use crate::init::Initializer;
use crate::mapping::MappingFileLoader;
use serde::Serialize;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::{fmt, fs};
use tracing::{debug, info, warn};

/// Root of the compile cache.
///
/// Owns the directory, its file layout, and the loader and initializer that
/// [`CacheEntry`] uses when it loads what it materialized.
pub struct CacheStore {
    cache_dir: PathBuf,
    layout: CacheLayout,
    file_loader: Arc<dyn MappingFileLoader>,
    initializer: Option<Arc<dyn Initializer>>,
}

impl CacheStore {
    pub fn new(cache_dir: impl Into<PathBuf>, file_loader: Arc<dyn MappingFileLoader>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            layout: CacheLayout::default(),
            file_loader,
            initializer: None,
        }
    }

    pub fn with_layout(mut self, layout: CacheLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_initializer(mut self, initializer: Option<Arc<dyn Initializer>>) -> Self {
        self.initializer = initializer;
        self
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    pub fn layout(&self) -> &CacheLayout {
        &self.layout
    }

    /// Entry for `identifier`. Nothing touches the disk until it is used.
    pub fn entry(&self, identifier: impl Into<String>) -> CacheEntry<'_> {
        CacheEntry {
            store: self,
            identifier: identifier.into(),
        }
    }

    /// Remove the whole cache directory. Returns false if it did not exist.
    pub fn clear(&self) -> LoaderResult<bool> {
        match fs::remove_dir_all(&self.cache_dir) {
            Ok(()) => {
                self.file_loader.forget(&self.cache_dir);
                info!("Cleared cache directory {}", self.cache_dir.display());
                Ok(true)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(LoaderError::PurgeFailed {
                path: self.cache_dir.clone(),
                source: e,
            }),
        }
    }

    fn init(&self, identifier: &str) {
        if let Some(initializer) = &self.initializer {
            initializer.init(identifier);
        }
    }
}

impl fmt::Debug for CacheStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheStore")
            .field("cache_dir", &self.cache_dir)
            .field("layout", &self.layout)
            .field("initializer", &self.initializer.is_some())
            .finish()
    }
}

/// What is on disk for one identifier
#[derive(Debug, Clone, Serialize)]
pub struct EntryStatus {
    pub identifier: String,
    pub artifact: Option<PathBuf>,
    pub origin: Option<PathBuf>,
    pub meta: Option<CachedMeta>,
}

impl EntryStatus {
    /// Whether `load` would find something usable
    pub fn is_cached(&self) -> bool {
        self.artifact.is_some()
            || self
                .meta
                .as_ref()
                .is_some_and(|meta| meta.include.is_some())
    }
}

/// Cache files of a single identifier
pub struct CacheEntry<'a> {
    store: &'a CacheStore,
    identifier: String,
}

impl CacheEntry<'_> {
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn artifact_path(&self) -> LoaderResult<PathBuf> {
        self.path(&self.store.layout.artifact_suffix)
    }

    pub fn map_path(&self) -> LoaderResult<PathBuf> {
        self.path(&self.store.layout.map_suffix)
    }

    pub fn meta_path(&self) -> LoaderResult<PathBuf> {
        self.path(&self.store.layout.meta_suffix)
    }

    fn path(&self, suffix: &str) -> LoaderResult<PathBuf> {
        identifier::file_path(&self.store.cache_dir, &self.identifier, suffix)
    }

    /// Materialize `chain` on disk without loading anything.
    ///
    /// The last action must be this entry's own; every earlier one is
    /// written to its own entry first.
    pub fn cache(&self, chain: &[LoadAction]) -> LoaderResult<()> {
        self.materialize(chain, false)
    }

    /// Materialize `chain` and load each action as soon as it is written.
    pub fn cache_and_load(&self, chain: &[LoadAction]) -> LoaderResult<()> {
        self.materialize(chain, true)
    }

    fn materialize(&self, chain: &[LoadAction], load: bool) -> LoaderResult<()> {
        let Some((own, dependencies)) = chain.split_last() else {
            return Err(LoaderError::invalid_chain(&self.identifier, "chain is empty"));
        };
        if own.identifier() != self.identifier {
            return Err(LoaderError::ChainIdentifierMismatch {
                requested: self.identifier.clone(),
                found: own.identifier().to_string(),
            });
        }

        // Each dependency records the ones after it; the target records all
        for (i, dependency) in dependencies.iter().enumerate() {
            self.store
                .entry(dependency.identifier())
                .materialize_single(dependency, &dependencies[i + 1..], load)?;
        }
        self.materialize_single(own, dependencies, load)
    }

    fn materialize_single(
        &self,
        action: &LoadAction,
        dependency_chain: &[LoadAction],
        load: bool,
    ) -> LoaderResult<()> {
        if action.identifier() != self.identifier {
            return Err(LoaderError::ChainIdentifierMismatch {
                requested: self.identifier.clone(),
                found: action.identifier().to_string(),
            });
        }

        let loader = &self.store.file_loader;
        let include = match (action.source(), action.file()) {
            (Some(source), file) => {
                let artifact = self.artifact_path()?;
                write_file(&artifact, source)?;
                loader.forget(&artifact);
                let map = self.map_path()?;
                match file {
                    Some(file) => {
                        write_file(&map, &file.to_string_lossy())?;
                        if load {
                            loader.include_once(&artifact, file)?;
                        }
                    }
                    None => {
                        remove_stale(&map)?;
                        if load {
                            loader.require_once(&artifact)?;
                        }
                    }
                }
                None
            }
            (None, Some(file)) => {
                let artifact = self.artifact_path()?;
                remove_stale(&artifact)?;
                loader.forget(&artifact);
                remove_stale(&self.map_path()?)?;
                if load {
                    loader.require_once(file)?;
                }
                Some(file.to_path_buf())
            }
            (None, None) => {
                return Err(LoaderError::invalid_chain(
                    &self.identifier,
                    "action has neither source nor file",
                ));
            }
        };

        if load {
            self.store.init(&self.identifier);
        }

        let meta = CachedMeta::new(
            include,
            dependency_chain
                .iter()
                .map(|dependency| dependency.identifier().to_string())
                .collect(),
        );
        write_file(&self.meta_path()?, &serde_json::to_string_pretty(&meta)?)?;
        debug!("Cached {}", self.identifier);
        Ok(())
    }

    /// Load whatever was cached for this identifier.
    ///
    /// Returns false, having executed nothing, when nothing usable is cached.
    pub fn load(&self) -> LoaderResult<bool> {
        let loader = &self.store.file_loader;
        let artifact = self.artifact_path()?;

        if artifact.is_file() {
            match self.origin()? {
                Some(origin) => loader.include_once(&artifact, &origin)?,
                None => loader.require_once(&artifact)?,
            }
            self.store.init(&self.identifier);
            debug!("Loaded {} from cache artifact", self.identifier);
            return Ok(true);
        }

        let Some(include) = self.meta()?.and_then(|meta| meta.include) else {
            return Ok(false);
        };
        if !include.is_file() {
            warn!(
                "Cached include for {} is gone: {}",
                self.identifier,
                include.display()
            );
            return Ok(false);
        }
        loader.require_once(&include)?;
        self.store.init(&self.identifier);
        debug!("Loaded {} from {}", self.identifier, include.display());
        Ok(true)
    }

    /// Origin path recorded for the artifact, if any
    fn origin(&self) -> LoaderResult<Option<PathBuf>> {
        let map = self.map_path()?;
        match fs::read_to_string(&map) {
            Ok(origin) if origin.is_empty() => Ok(None),
            Ok(origin) => Ok(Some(PathBuf::from(origin))),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(LoaderError::io(
                format!("Failed to read {}", map.display()),
                e,
            )),
        }
    }

    /// Read the meta record, if one was written
    pub fn meta(&self) -> LoaderResult<Option<CachedMeta>> {
        let path = self.meta_path()?;
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(LoaderError::io(
                    format!("Failed to read {}", path.display()),
                    e,
                ))
            }
        };
        serde_json::from_str(&content)
            .map(Some)
            .map_err(|e| LoaderError::MetaCorrupt {
                path,
                reason: e.to_string(),
            })
    }

    /// Delete this entry and every entry in its recorded dependency chain.
    ///
    /// The cascade is one level deep: the dependencies' own chains are not
    /// followed, since each one is already a suffix of this entry's chain.
    pub fn purge(&self) -> LoaderResult<()> {
        let meta = match self.meta() {
            Ok(meta) => meta,
            Err(e @ LoaderError::MetaCorrupt { .. }) => {
                warn!("{}; purging {} alone", e, self.identifier);
                None
            }
            Err(e) => return Err(e),
        };

        self.purge_single()?;
        if let Some(meta) = meta {
            for dependency in &meta.dependency_chain {
                self.store.entry(dependency.as_str()).purge_single()?;
            }
        }
        info!("Purged {}", self.identifier);
        Ok(())
    }

    fn purge_single(&self) -> LoaderResult<()> {
        let artifact = self.artifact_path()?;
        for path in [artifact.clone(), self.map_path()?, self.meta_path()?] {
            match fs::remove_file(&path) {
                Ok(()) => debug!("Removed {}", path.display()),
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => return Err(LoaderError::PurgeFailed { path, source: e }),
            }
        }
        self.store.file_loader.forget(&artifact);
        Ok(())
    }

    pub fn status(&self) -> LoaderResult<EntryStatus> {
        let artifact = self.artifact_path()?;
        Ok(EntryStatus {
            identifier: self.identifier.clone(),
            artifact: artifact.is_file().then_some(artifact),
            origin: self.origin()?,
            meta: self.meta()?,
        })
    }
}

fn write_file(path: &Path, content: &str) -> LoaderResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| LoaderError::cache_write(parent, e))?;
    }
    fs::write(path, content).map_err(|e| LoaderError::cache_write(path, e))?;
    debug!("Wrote {}", path.display());
    Ok(())
}

fn remove_stale(path: &Path) -> LoaderResult<()> {
    match fs::remove_file(path) {
        Ok(()) => {
            debug!("Removed stale {}", path.display());
            Ok(())
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(LoaderError::cache_write(path, e)),
    }
}
