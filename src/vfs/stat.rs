//! Stat records for virtual streams

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs::Metadata;
use std::path::PathBuf;
use std::time::SystemTime;

/// What a virtual stream reports about itself.
///
/// `size` always describes the bytes the stream yields. Everything else
/// describes the reported origin, which may be a different file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SourceStat {
    /// Number of bytes the stream yields
    pub size: u64,

    /// File the stream claims to be
    pub origin: Option<PathBuf>,

    pub modified: Option<DateTime<Utc>>,
    pub accessed: Option<DateTime<Utc>>,
    pub created: Option<DateTime<Utc>>,
    pub readonly: bool,
}

impl SourceStat {
    /// Stat with only a size (fragment with no backing file)
    pub fn sized(size: u64) -> Self {
        Self {
            size,
            ..Self::default()
        }
    }

    /// Copy timestamps and permissions from `meta`, keeping `size`.
    pub fn from_metadata(size: u64, origin: Option<PathBuf>, meta: &Metadata) -> Self {
        Self {
            size,
            origin,
            modified: to_utc(meta.modified()),
            accessed: to_utc(meta.accessed()),
            created: to_utc(meta.created()),
            readonly: meta.permissions().readonly(),
        }
    }
}

// Not every platform/filesystem records every timestamp
fn to_utc(time: std::io::Result<SystemTime>) -> Option<DateTime<Utc>> {
    time.ok().map(DateTime::<Utc>::from)
}
