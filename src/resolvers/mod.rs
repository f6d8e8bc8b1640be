//! Built-in resolvers

mod directory;

pub use directory::{DirectoryResolver, SCAN_SEPARATOR};
