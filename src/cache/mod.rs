//! Compile cache
//!
//! Materializes resolved load chains on disk so later loads skip the
//! resolvers entirely.
//!
//! # Layout
//!
//! For identifier `A\B\C` under cache root `R`:
//!
//! | File | Written when | Contents |
//! |------|--------------|----------|
//! | `R/A/B/C.php` | action has source | source text |
//! | `R/A/B/C.map` | action has source and file | origin path |
//! | `R/A/B/C.meta.php` | always, last | [`CachedMeta`] as JSON |
//!
//! # Purge Cascade
//!
//! For a chain `[D1, D2, Target]`, `Target` records `[D1, D2]`, `D1`
//! records `[D2]` and `D2` records nothing. Purging an entry removes it and
//! every identifier it records, so a purge of `Target` clears all three
//! while a purge of `D1` leaves `Target` in place.

mod entry;
mod meta;

pub use entry::{CacheEntry, CacheStore, EntryStatus};
pub use meta::{CacheLayout, CachedMeta};
