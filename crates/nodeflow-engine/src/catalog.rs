use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use nodeflow_core::error::{EngineError, Result};

use crate::node::Module;

type ModuleFactory = Arc<dyn Fn() -> Module + Send + Sync>;

/// Maps module identifiers (as written in config) to module factories.
#[derive(Clone, Default)]
pub struct ModuleCatalog {
    factories: BTreeMap<String, ModuleFactory>,
}

impl ModuleCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory under `name`, replacing any previous one.
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn() -> Module + Send + Sync + 'static,
    {
        self.factories.insert(name.into(), Arc::new(factory));
    }

    /// Chainable form of [`register`](Self::register).
    pub fn with<F>(mut self, name: impl Into<String>, factory: F) -> Self
    where
        F: Fn() -> Module + Send + Sync + 'static,
    {
        self.register(name, factory);
        self
    }

    /// Merge another catalog in; its entries win on collision.
    pub fn extend(&mut self, other: ModuleCatalog) {
        self.factories.extend(other.factories);
    }

    /// Instantiate the module registered as `name`.
    pub fn resolve(&self, name: &str) -> Result<Module> {
        self.factories
            .get(name)
            .map(|factory| factory())
            .ok_or_else(|| {
                EngineError::Configuration(format!(
                    "Unknown module '{}' (available: {})",
                    name,
                    self.names().join(", ")
                ))
            })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Registered identifiers, sorted.
    pub fn names(&self) -> Vec<&str> {
        self.factories.keys().map(|k| k.as_str()).collect()
    }
}

impl fmt::Debug for ModuleCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleCatalog")
            .field("modules", &self.names())
            .finish()
    }
}
