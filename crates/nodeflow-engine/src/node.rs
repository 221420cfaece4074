use std::fmt;
use std::sync::Arc;

use nodeflow_core::traits::{ComputeResult, Computation};
use nodeflow_core::types::{Arguments, Parameter};

type NodeFn = dyn Fn(&Arguments) -> ComputeResult + Send + Sync;

/// A computation backed by a closure, with an explicit parameter list.
///
/// The parameter list is the node's dependency list; it is fixed when the
/// node is created rather than discovered from the closure.
#[derive(Clone)]
pub struct FnNode {
    name: String,
    parameters: Vec<Parameter>,
    description: String,
    func: Arc<NodeFn>,
}

impl FnNode {
    /// Create a node named `name` that depends on `parameters`.
    pub fn new<I, P, F>(name: impl Into<String>, parameters: I, func: F) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<Parameter>,
        F: Fn(&Arguments) -> ComputeResult + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            parameters: parameters.into_iter().map(Into::into).collect(),
            description: String::new(),
            func: Arc::new(func),
        }
    }

    /// Create a node with no dependencies.
    pub fn source<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&Arguments) -> ComputeResult + Send + Sync + 'static,
    {
        Self::new(name, Vec::<Parameter>::new(), func)
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

impl Computation for FnNode {
    fn name(&self) -> &str {
        &self.name
    }

    fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    fn invoke(&self, args: &Arguments) -> ComputeResult {
        (self.func)(args)
    }

    fn description(&self) -> &str {
        &self.description
    }
}

impl fmt::Debug for FnNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnNode")
            .field("name", &self.name)
            .field("parameters", &self.parameters)
            .finish_non_exhaustive()
    }
}

/// A named collection of computations.
///
/// Modules are inert until registered into a driver. Registration order
/// inside a module matters only for name collisions: the later node wins.
#[derive(Clone, Default)]
pub struct Module {
    name: String,
    computations: Vec<Arc<dyn Computation>>,
}

impl Module {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            computations: Vec::new(),
        }
    }

    /// Add a computation.
    pub fn with(mut self, computation: impl Computation) -> Self {
        self.computations.push(Arc::new(computation));
        self
    }

    /// Add an already shared computation.
    pub fn with_shared(mut self, computation: Arc<dyn Computation>) -> Self {
        self.computations.push(computation);
        self
    }

    /// Add a computation in place.
    pub fn add(&mut self, computation: impl Computation) {
        self.computations.push(Arc::new(computation));
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn computations(&self) -> &[Arc<dyn Computation>] {
        &self.computations
    }

    pub fn len(&self) -> usize {
        self.computations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.computations.is_empty()
    }
}

impl fmt::Debug for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.computations.iter().map(|c| c.name()).collect();
        f.debug_struct("Module")
            .field("name", &self.name)
            .field("computations", &names)
            .finish()
    }
}
