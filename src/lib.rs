//! modmap - dynamic module resolution with a compile cache
//!
//! Turns identifiers into executable source through an ordered list of
//! resolvers, materializes each resolved chain into an on-disk cache, and
//! serves cached or generated source through virtual streams that report the
//! original file as their origin.

pub mod cache;
pub mod chain;
pub mod cli;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod identifier;
pub mod init;
pub mod loader;
pub mod mapping;
pub mod resolvers;
pub mod ui;
pub mod vfs;

pub use chain::{Chain, LoadAction};
pub use dispatch::{Resolver, ResolverSet, Scanner};
pub use error::{LoaderError, LoaderResult};
pub use init::{HookInitializer, Initializer, MultiInitializer};
pub use loader::{LoadOutcome, LoaderOptions, ModuleLoader};
pub use mapping::{MappingFileLoader, SourceHost, StreamLoader};
