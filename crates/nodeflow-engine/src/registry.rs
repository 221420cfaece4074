use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, warn};

use nodeflow_core::error::{EngineError, Result};
use nodeflow_core::traits::Computation;
use nodeflow_core::types::NodeDefinition;

use crate::node::Module;

/// A registered computation plus the module it came from.
#[derive(Clone)]
pub struct RegisteredNode {
    pub computation: Arc<dyn Computation>,
    pub module: String,
    dependencies: Vec<String>,
}

impl RegisteredNode {
    /// Dependency names, in declaration order.
    pub fn dependencies(&self) -> &[String] {
        &self.dependencies
    }

    pub fn name(&self) -> &str {
        self.computation.name()
    }
}

/// Index of computations by output name.
pub struct NodeRegistry {
    nodes: HashMap<String, RegisteredNode>,
    // Registration order of first appearance, for stable listings
    order: Vec<String>,
}

impl NodeRegistry {
    pub fn new() -> Self {
        Self {
            nodes: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Build a registry from modules, in order.
    ///
    /// A name registered by a later module replaces the earlier node.
    /// Fails if any computation declares a variadic parameter.
    pub fn from_modules(modules: &[Module]) -> Result<Self> {
        let mut registry = Self::new();
        for module in modules {
            registry.register_module(module)?;
        }
        Ok(registry)
    }

    /// Register every computation of a module.
    pub fn register_module(&mut self, module: &Module) -> Result<()> {
        if module.is_empty() {
            debug!(module = %module.name(), "Module has no computations");
        }
        for computation in module.computations() {
            self.register(Arc::clone(computation), module.name())?;
        }
        Ok(())
    }

    /// Register a single computation under its name, replacing any existing entry.
    pub fn register(&mut self, computation: Arc<dyn Computation>, module: &str) -> Result<()> {
        let name = computation.name().to_string();

        let mut dependencies = Vec::with_capacity(computation.parameters().len());
        for parameter in computation.parameters() {
            if parameter.is_variadic() {
                return Err(EngineError::UnsupportedParameter {
                    node: name,
                    parameter: parameter.name().to_string(),
                });
            }
            dependencies.push(parameter.name().to_string());
        }

        let entry = RegisteredNode {
            computation,
            module: module.to_string(),
            dependencies,
        };

        match self.nodes.insert(name.clone(), entry) {
            Some(previous) => {
                warn!(
                    node = %name,
                    previous_module = %previous.module,
                    module = %module,
                    "Computation overridden by later registration"
                );
            }
            None => self.order.push(name),
        }
        Ok(())
    }

    /// Look up a computation by name.
    pub fn get(&self, name: &str) -> Option<&RegisteredNode> {
        self.nodes.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.nodes.contains_key(name)
    }

    /// Registered names, in order of first registration.
    pub fn list(&self) -> Vec<&str> {
        self.order.iter().map(|s| s.as_str()).collect()
    }

    /// Definitions for listing (name, dependencies, source module).
    pub fn definitions(&self) -> Vec<NodeDefinition> {
        self.order
            .iter()
            .filter_map(|name| self.nodes.get(name))
            .map(|node| NodeDefinition {
                name: node.name().to_string(),
                dependencies: node.dependencies.clone(),
                module: node.module.clone(),
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl Default for NodeRegistry {
    fn default() -> Self {
        Self::new()
    }
}
