//! Resolver dispatch
//!
//! Resolvers are queried in registration order and the first one returning
//! a non-empty chain wins; later resolvers are not consulted. No resolver
//! answering is a normal outcome and yields an empty chain.

use crate::chain::{validate_chain, Chain};
use crate::error::LoaderResult;
use std::collections::HashSet;
use tracing::debug;

/// Turns a requested identifier into a chain of load actions.
pub trait Resolver: Send + Sync {
    /// Resolve `identifier`. An empty chain means "not mine".
    fn resolve(&self, identifier: &str) -> LoaderResult<Chain>;

    /// Listing capability, used only by batch priming and hint dumping.
    fn scanner(&self) -> Option<&dyn Scanner> {
        None
    }
}

/// Enumerates every identifier a resolver can resolve.
pub trait Scanner {
    fn scan(&self) -> LoaderResult<Vec<String>>;
}

/// Ordered set of resolvers with first-match-wins dispatch
#[derive(Default)]
pub struct ResolverSet {
    resolvers: Vec<Box<dyn Resolver>>,
}

impl ResolverSet {
    pub fn new(resolvers: Vec<Box<dyn Resolver>>) -> Self {
        Self { resolvers }
    }

    /// Append a resolver with the lowest priority
    pub fn push(&mut self, resolver: Box<dyn Resolver>) {
        self.resolvers.push(resolver);
    }

    pub fn len(&self) -> usize {
        self.resolvers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resolvers.is_empty()
    }

    /// Resolve and validate a chain for `identifier`.
    pub fn resolve(&self, identifier: &str) -> LoaderResult<Chain> {
        for (index, resolver) in self.resolvers.iter().enumerate() {
            let chain = resolver.resolve(identifier)?;
            if chain.is_empty() {
                continue;
            }
            debug!(
                "Resolver #{} resolved {} ({} action(s))",
                index,
                identifier,
                chain.len()
            );
            validate_chain(&chain, identifier)?;
            return Ok(chain);
        }

        debug!("No resolver matched {}", identifier);
        Ok(Vec::new())
    }

    /// Union of all scanner listings, first-seen order, deduplicated.
    pub fn scan(&self) -> LoaderResult<Vec<String>> {
        let mut seen = HashSet::new();
        let mut identifiers = Vec::new();

        for scanner in self.resolvers.iter().filter_map(|r| r.scanner()) {
            for identifier in scanner.scan()? {
                if seen.insert(identifier.clone()) {
                    identifiers.push(identifier);
                }
            }
        }

        Ok(identifiers)
    }
}
