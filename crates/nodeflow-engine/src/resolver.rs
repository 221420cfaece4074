//! Memoized, pull-based dependency resolution.
//!
//! A `Resolver` lives for exactly one execution. Its cache starts as the
//! merged input context, so any name supplied as an input is never computed,
//! even when a computation with that name is registered. Every computed value
//! is cached, which guarantees each node runs at most once per execution.
//!
//! The walk keeps pending nodes on a heap-allocated stack of frames, so graph
//! depth is bounded by memory rather than by the thread's call stack.

use std::collections::{HashMap, HashSet};

use serde_json::Value;
use tracing::debug;

use nodeflow_core::error::{EngineError, Result};
use nodeflow_core::types::{Arguments, ValueMap};

use crate::registry::{NodeRegistry, RegisteredNode};

/// Raw outcome of resolving a set of targets.
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    /// `{target: value}` in the order targets were requested.
    pub values: ValueMap,
    /// Names of computed nodes, in evaluation order.
    pub execution_log: Vec<String>,
}

/// A node waiting on its dependencies.
struct Frame<'a> {
    node: &'a RegisteredNode,
    args: Arguments,
    // Index of the next dependency to bind
    next: usize,
}

impl<'a> Frame<'a> {
    fn new(node: &'a RegisteredNode) -> Self {
        Self {
            node,
            args: Arguments::new(),
            next: 0,
        }
    }

    fn bind_next(&mut self, name: &str, value: Value) {
        self.args.bind(name, value);
        self.next += 1;
    }
}

/// Per-execution resolution state.
pub struct Resolver<'a> {
    registry: &'a NodeRegistry,
    cache: HashMap<String, Value>,
    execution_log: Vec<String>,
}

impl<'a> Resolver<'a> {
    /// Create a resolver whose cache is seeded with `context`.
    pub fn new(registry: &'a NodeRegistry, context: ValueMap) -> Self {
        Self {
            registry,
            cache: context.into_iter().collect(),
            execution_log: Vec::new(),
        }
    }

    /// Resolve `name`, computing it and its dependencies if needed.
    pub fn resolve(&mut self, name: &str) -> Result<Value> {
        if let Some(value) = self.cache.get(name) {
            return Ok(value.clone());
        }

        let registry = self.registry;
        let root = registry.get(name).ok_or_else(|| missing(name, &[]))?;

        let mut stack = vec![Frame::new(root)];
        let mut in_progress: HashSet<&'a str> = HashSet::from([root.name()]);

        while let Some(top) = stack.last() {
            let node = top.node;
            match node.dependencies().get(top.next) {
                Some(dependency) => {
                    if let Some(value) = self.cache.get(dependency.as_str()) {
                        let value = value.clone();
                        if let Some(top) = stack.last_mut() {
                            top.bind_next(dependency, value);
                        }
                        continue;
                    }

                    if in_progress.contains(dependency.as_str()) {
                        return Err(cycle(&stack, dependency));
                    }

                    let child = registry
                        .get(dependency)
                        .ok_or_else(|| missing(dependency, &stack))?;
                    in_progress.insert(child.name());
                    stack.push(Frame::new(child));
                }
                None => {
                    let Some(frame) = stack.pop() else { break };
                    let node_name = frame.node.name();
                    in_progress.remove(node_name);

                    let value = frame
                        .node
                        .computation
                        .invoke(&frame.args)
                        .map_err(EngineError::Computation)?;

                    debug!(node = %node_name, module = %frame.node.module, "Computed node");
                    self.cache.insert(node_name.to_string(), value.clone());
                    self.execution_log.push(node_name.to_string());

                    if let Some(parent) = stack.last_mut() {
                        parent.bind_next(node_name, value);
                    }
                }
            }
        }

        self.cache
            .get(name)
            .cloned()
            .ok_or_else(|| missing(name, &[]))
    }

    /// Names computed so far, in evaluation order.
    pub fn execution_log(&self) -> &[String] {
        &self.execution_log
    }

    pub fn into_execution_log(self) -> Vec<String> {
        self.execution_log
    }
}

// Missing `name`, requested through every frame on the stack
fn missing(name: &str, stack: &[Frame<'_>]) -> EngineError {
    let error = EngineError::MissingDependency {
        missing: name.to_string(),
        requested_by: None,
        chain: Vec::new(),
    };
    stack
        .iter()
        .rev()
        .fold(error, |error, frame| error.requested_via(frame.node.name()))
}

// Frames from the first occurrence of `name` upward, closed by `name`
fn cycle(stack: &[Frame<'_>], name: &str) -> EngineError {
    let start = stack
        .iter()
        .position(|frame| frame.node.name() == name)
        .unwrap_or(0);
    let mut cycle: Vec<String> = stack[start..]
        .iter()
        .map(|frame| frame.node.name().to_string())
        .collect();
    cycle.push(name.to_string());
    EngineError::CycleDetected { cycle }
}

/// Resolve each target in order against a fresh cache seeded with `context`.
///
/// Fails on the first error; no partial mapping is returned.
pub fn execute_targets(
    registry: &NodeRegistry,
    targets: &[String],
    context: ValueMap,
) -> Result<Resolution> {
    let mut resolver = Resolver::new(registry, context);
    let mut values = ValueMap::new();

    for target in targets {
        let value = resolver.resolve(target)?;
        values.insert(target.clone(), value);
    }

    Ok(Resolution {
        values,
        execution_log: resolver.into_execution_log(),
    })
}
