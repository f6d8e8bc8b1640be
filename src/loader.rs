//! Loader orchestrator
//!
//! Ties the resolvers, the compile cache and the mapping file loader
//! together. With caching enabled a load first tries the cache and only
//! falls back to the resolvers on a miss; without it every load resolves
//! and executes the chain directly.

use crate::cache::{CacheLayout, CacheStore};
use crate::chain::{Chain, LoadAction};
use crate::config::Config;
use crate::dispatch::{Resolver, ResolverSet, Scanner};
use crate::error::{LoaderError, LoaderResult};
use crate::identifier;
use crate::init::Initializer;
use crate::mapping::MappingFileLoader;
use crate::resolvers::DirectoryResolver;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Result of a single load request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadOutcome {
    /// Served from the compile cache
    Cached,
    /// Resolved and loaded (and cached, when caching is on)
    Resolved,
    /// No resolver knows the identifier; nothing was executed
    Unresolved,
}

impl LoadOutcome {
    pub fn is_loaded(self) -> bool {
        !matches!(self, Self::Unresolved)
    }
}

impl std::fmt::Display for LoadOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cached => write!(f, "cached"),
            Self::Resolved => write!(f, "resolved"),
            Self::Unresolved => write!(f, "unresolved"),
        }
    }
}

/// Caching settings for [`ModuleLoader::new`]
#[derive(Debug, Clone, Default)]
pub struct LoaderOptions {
    pub enable_caching: bool,
    pub cache_dir: Option<PathBuf>,
    pub layout: CacheLayout,
}

/// Resolves, caches and loads identifiers
pub struct ModuleLoader {
    resolvers: ResolverSet,
    file_loader: Arc<dyn MappingFileLoader>,
    initializer: Option<Arc<dyn Initializer>>,
    cache_dir: Option<PathBuf>,
    layout: CacheLayout,
    caching: bool,
}

impl ModuleLoader {
    /// Fails with `CacheDirMissing` when caching is enabled without a
    /// cache directory.
    pub fn new(
        options: LoaderOptions,
        resolvers: Vec<Box<dyn Resolver>>,
        initializer: Option<Arc<dyn Initializer>>,
        file_loader: Arc<dyn MappingFileLoader>,
    ) -> LoaderResult<Self> {
        if options.enable_caching && options.cache_dir.is_none() {
            return Err(LoaderError::CacheDirMissing);
        }
        Ok(Self {
            resolvers: ResolverSet::new(resolvers),
            file_loader,
            initializer,
            cache_dir: options.cache_dir,
            layout: options.layout,
            caching: options.enable_caching,
        })
    }

    /// Build from configuration, with a [`DirectoryResolver`] over the
    /// configured roots when there are any.
    pub fn from_config(
        config: &Config,
        initializer: Option<Arc<dyn Initializer>>,
        file_loader: Arc<dyn MappingFileLoader>,
    ) -> LoaderResult<Self> {
        let options = LoaderOptions {
            enable_caching: config.cache.enabled,
            cache_dir: config.cache.resolved_dir(),
            layout: CacheLayout::for_extension(&config.cache.artifact_extension),
        };

        let mut resolvers: Vec<Box<dyn Resolver>> = Vec::new();
        if !config.resolver.roots.is_empty() {
            resolvers.push(Box::new(
                DirectoryResolver::new(config.resolver.roots.clone(), &config.resolver.extension)
                    .with_inline_source(config.resolver.inline_source),
            ));
        }

        Self::new(options, resolvers, initializer, file_loader)
    }

    pub fn is_caching(&self) -> bool {
        self.caching
    }

    pub fn cache_dir(&self) -> Option<&Path> {
        self.cache_dir.as_deref()
    }

    /// Append a resolver with the lowest priority
    pub fn add_resolver(&mut self, resolver: Box<dyn Resolver>) {
        self.resolvers.push(resolver);
    }

    /// The compile cache, if a directory is configured
    pub fn cache(&self) -> Option<CacheStore> {
        self.cache_dir.as_ref().map(|dir| {
            CacheStore::new(dir, self.file_loader.clone())
                .with_layout(self.layout.clone())
                .with_initializer(self.initializer.clone())
        })
    }

    fn require_cache(&self) -> LoaderResult<CacheStore> {
        self.cache().ok_or(LoaderError::CacheDirMissing)
    }

    /// Resolved, validated chain for `identifier`; empty if unresolved.
    pub fn resolve(&self, identifier: &str) -> LoaderResult<Chain> {
        self.resolvers.resolve(identifier)
    }

    /// Load `identifier` and everything its chain depends on.
    pub fn load(&self, identifier: &str) -> LoaderResult<LoadOutcome> {
        identifier::validate(identifier)?;

        if self.caching {
            let cache = self.require_cache()?;
            let entry = cache.entry(identifier);
            if entry.load()? {
                return Ok(LoadOutcome::Cached);
            }
            let chain = self.resolve(identifier)?;
            if chain.is_empty() {
                return Ok(LoadOutcome::Unresolved);
            }
            entry.cache_and_load(&chain)?;
            return Ok(LoadOutcome::Resolved);
        }

        let chain = self.resolve(identifier)?;
        if chain.is_empty() {
            return Ok(LoadOutcome::Unresolved);
        }
        for action in &chain {
            self.load_uncached(action)?;
        }
        Ok(LoadOutcome::Resolved)
    }

    fn load_uncached(&self, action: &LoadAction) -> LoaderResult<()> {
        match (action.source(), action.file()) {
            (Some(source), file) => self.file_loader.eval(source, file)?,
            (None, Some(file)) => self.file_loader.require_once(file)?,
            (None, None) => {
                return Err(LoaderError::invalid_chain(
                    action.identifier(),
                    "action has neither source nor file",
                ))
            }
        }
        if let Some(initializer) = &self.initializer {
            initializer.init(action.identifier());
        }
        Ok(())
    }

    /// Identifiers reported by every scanning resolver
    pub fn scan_identifiers(&self) -> LoaderResult<Vec<String>> {
        self.resolvers.scan()
    }

    /// Scanned identifiers with their chains
    fn prefetch(&self) -> LoaderResult<Vec<(String, Chain)>> {
        self.scan_identifiers()?
            .into_iter()
            .map(|id| {
                let chain = self.resolve(&id)?;
                Ok((id, chain))
            })
            .collect()
    }

    /// Materialize every scanned identifier without loading anything.
    ///
    /// `on_primed` is called after each identifier. Returns how many were
    /// cached.
    pub fn prime_cache(&self, mut on_primed: impl FnMut(&str)) -> LoaderResult<usize> {
        let cache = self.require_cache()?;
        let mut primed = 0;

        for (id, chain) in self.prefetch()? {
            if chain.is_empty() {
                warn!("Scanned identifier {} did not resolve, skipping", id);
            } else {
                cache.entry(id.as_str()).cache(&chain)?;
                primed += 1;
            }
            on_primed(&id);
        }

        info!("Primed {} identifier(s)", primed);
        Ok(primed)
    }

    /// Write the hint text of every scanned action under `target_dir`.
    ///
    /// Returns the written paths.
    pub fn dump_hints(&self, target_dir: &Path) -> LoaderResult<Vec<PathBuf>> {
        let mut written = Vec::new();

        for (_, chain) in self.prefetch()? {
            for action in &chain {
                let Some(hint) = action.hint() else {
                    continue;
                };
                let path = identifier::file_path(
                    target_dir,
                    action.identifier(),
                    &self.layout.artifact_suffix,
                )?;
                if let Some(parent) = path.parent() {
                    fs::create_dir_all(parent).map_err(|e| {
                        LoaderError::io(format!("Failed to create {}", parent.display()), e)
                    })?;
                }
                fs::write(&path, hint).map_err(|e| {
                    LoaderError::io(format!("Failed to write {}", path.display()), e)
                })?;
                debug!("Wrote hint {}", path.display());
                written.push(path);
            }
        }

        info!("Dumped {} hint file(s) to {}", written.len(), target_dir.display());
        Ok(written)
    }

    /// Remove the whole cache directory. Returns false if it did not exist.
    pub fn clear_cache(&self) -> LoaderResult<bool> {
        self.require_cache()?.clear()
    }

    /// Purge each identifier and its recorded dependencies.
    pub fn clear_specific<S: AsRef<str>>(&self, identifiers: &[S]) -> LoaderResult<()> {
        let cache = self.require_cache()?;
        for id in identifiers {
            cache.entry(id.as_ref()).purge()?;
        }
        Ok(())
    }
}

impl Scanner for ModuleLoader {
    fn scan(&self) -> LoaderResult<Vec<String>> {
        self.scan_identifiers()
    }
}
