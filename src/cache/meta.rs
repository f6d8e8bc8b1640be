//! Cache meta records and on-disk layout

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Persisted per identifier, always as the last write of a cache cycle.
///
/// Serialized as `{"include": "...", "classChain": [...]}`; `include` is
/// omitted when absent and `classChain` when empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedMeta {
    /// Physical file to load when no artifact was cached
    #[serde(rename = "include", default, skip_serializing_if = "Option::is_none")]
    pub include: Option<PathBuf>,

    /// Identifiers purged together with this one
    #[serde(rename = "classChain", default, skip_serializing_if = "Vec::is_empty")]
    pub dependency_chain: Vec<String>,
}

impl CachedMeta {
    pub fn new(include: Option<PathBuf>, dependency_chain: Vec<String>) -> Self {
        Self {
            include,
            dependency_chain,
        }
    }
}

/// File suffixes of a cache entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheLayout {
    pub artifact_suffix: String,
    pub map_suffix: String,
    pub meta_suffix: String,
}

impl CacheLayout {
    /// Layout for artifacts with extension `ext`: `.ext`, `.map`, `.meta.ext`
    pub fn for_extension(ext: &str) -> Self {
        let ext = ext.trim_start_matches('.');
        Self {
            artifact_suffix: format!(".{}", ext),
            map_suffix: ".map".to_string(),
            meta_suffix: format!(".meta.{}", ext),
        }
    }
}

impl Default for CacheLayout {
    fn default() -> Self {
        Self::for_extension("php")
    }
}
