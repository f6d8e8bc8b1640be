//! Virtual sources
//!
//! Lets a loader execute text that does not live where it claims to: a
//! transformed artifact in the cache, or a fragment generated in memory,
//! while stat and origin queries answer for the human-authored file.
//!
//! # Modes
//!
//! | Reference | Bytes from | Stat from |
//! |-----------|------------|-----------|
//! | Fragment | registered text | backing file, if any (size from text) |
//! | Remap | content path | reported path (size from content) |

mod reference;
mod registry;
mod stat;

pub use reference::{SourceRef, EVAL_SCHEME, INCLUDE_SCHEME, INLINE_PREFIX};
pub use registry::{VirtualSourceRegistry, VirtualStream};
pub use stat::SourceStat;
