//! Post-load initializers
//!
//! The loader calls [`Initializer::init`] exactly once per successful load
//! event. Whether a hook runs again after a purge and reload is up to the
//! initializer; [`HookInitializer`] runs each hook once per process.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use tracing::debug;

/// Hook invoked after an identifier has been loaded.
pub trait Initializer: Send + Sync {
    fn init(&self, identifier: &str);
}

/// Runs several initializers in order for every load
#[derive(Default)]
pub struct MultiInitializer {
    initializers: Vec<Box<dyn Initializer>>,
}

impl MultiInitializer {
    pub fn new(initializers: Vec<Box<dyn Initializer>>) -> Self {
        Self { initializers }
    }

    pub fn push(&mut self, initializer: Box<dyn Initializer>) {
        self.initializers.push(initializer);
    }
}

impl Initializer for MultiInitializer {
    fn init(&self, identifier: &str) {
        for initializer in &self.initializers {
            initializer.init(identifier);
        }
    }
}

type Hook = Box<dyn Fn() + Send + Sync>;

/// Per-identifier init hooks, each run at most once.
///
/// Only identifiers that declare their own hook get an entry; an identifier
/// that merely derives from one with a hook registers nothing.
#[derive(Default)]
pub struct HookInitializer {
    hooks: HashMap<String, Hook>,
    initialized: Mutex<HashSet<String>>,
}

impl HookInitializer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare `hook` as `identifier`'s own init hook
    pub fn register(
        &mut self,
        identifier: impl Into<String>,
        hook: impl Fn() + Send + Sync + 'static,
    ) -> &mut Self {
        self.hooks.insert(identifier.into(), Box::new(hook));
        self
    }

    pub fn has_hook(&self, identifier: &str) -> bool {
        self.hooks.contains_key(identifier)
    }

    pub fn is_initialized(&self, identifier: &str) -> bool {
        self.initialized
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .contains(identifier)
    }
}

impl Initializer for HookInitializer {
    fn init(&self, identifier: &str) {
        let Some(hook) = self.hooks.get(identifier) else {
            return;
        };
        let first = self
            .initialized
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(identifier.to_string());
        if first {
            debug!("Running init hook for {}", identifier);
            hook();
        }
    }
}
