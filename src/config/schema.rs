//! Configuration schema for modmap
//!
//! Configuration is stored at `~/.config/modmap/config.toml`, optionally
//! overridden per project by a `.modmap.toml`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Compile cache settings
    pub cache: CacheConfig,

    /// Mapping file loader settings
    pub loader: LoaderConfig,

    /// Built-in directory resolver settings
    pub resolver: ResolverConfig,
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log format: "text" or "json"
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_format: "text".to_string(),
        }
    }
}

/// Compile cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Serve loads from the compile cache (default: true)
    pub enabled: bool,

    /// Cache directory (default: platform cache dir + `modmap`)
    pub dir: Option<PathBuf>,

    /// Extension of artifact and meta files
    pub artifact_extension: String,
}

impl CacheConfig {
    /// Configured directory, or the platform default
    pub fn resolved_dir(&self) -> Option<PathBuf> {
        self.dir
            .clone()
            .or_else(|| dirs::cache_dir().map(|d| d.join("modmap")))
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            dir: None,
            artifact_extension: "php".to_string(),
        }
    }
}

/// Mapping file loader configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Report original paths for cached and generated sources
    pub enable_mapping: bool,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            enable_mapping: true,
        }
    }
}

/// Directory resolver configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Source roots, searched in order
    pub roots: Vec<PathBuf>,

    /// Source file extension
    pub extension: String,

    /// Cache file contents as artifacts instead of recording the path
    pub inline_source: bool,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            roots: vec![],
            extension: "php".to_string(),
            inline_source: false,
        }
    }
}
