//! Shared fixtures for Nodeflow tests: invocation-counting nodes, canned
//! graphs and ordering assertions.

use std::collections::HashMap;
use std::io::Write;
use std::sync::{Arc, Mutex, MutexGuard};

use serde_json::{json, Value};
use tempfile::NamedTempFile;

use nodeflow_core::types::{NodeDefinition, ValueMap};
use nodeflow_engine::{FnNode, Module};

/// Thread-safe tally of how many times each node was invoked.
#[derive(Debug, Clone, Default)]
pub struct InvocationCounter {
    counts: Arc<Mutex<HashMap<String, usize>>>,
}

impl InvocationCounter {
    pub fn new() -> Self {
        Self::default()
    }

    fn counts(&self) -> MutexGuard<'_, HashMap<String, usize>> {
        self.counts.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn record(&self, name: &str) {
        *self.counts().entry(name.to_string()).or_insert(0) += 1;
    }

    pub fn count(&self, name: &str) -> usize {
        self.counts().get(name).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.counts().values().sum()
    }

    /// Largest invocation count of any single node.
    pub fn max(&self) -> usize {
        self.counts().values().copied().max().unwrap_or(0)
    }

    pub fn reset(&self) {
        self.counts().clear();
    }
}

/// A node that records each invocation and returns `{"node": name, "inputs": {...}}`.
pub fn counting_node(name: &str, deps: &[&str], counter: &InvocationCounter) -> FnNode {
    let owned_name = name.to_string();
    let owned_deps: Vec<String> = deps.iter().map(|d| d.to_string()).collect();
    let counter = counter.clone();
    FnNode::new(name, deps.to_vec(), move |args| {
        counter.record(&owned_name);
        let mut inputs = ValueMap::new();
        for dep in &owned_deps {
            inputs.insert(dep.clone(), args.get(dep)?.clone());
        }
        Ok(json!({ "node": owned_name, "inputs": inputs }))
    })
}

/// `a <- b <- c`
pub fn chain_module(counter: &InvocationCounter) -> Module {
    Module::new("chain")
        .with(counting_node("a", &[], counter))
        .with(counting_node("b", &["a"], counter))
        .with(counting_node("c", &["b"], counter))
}

/// `base <- {left, right} <- top`
pub fn diamond_module(counter: &InvocationCounter) -> Module {
    Module::new("diamond")
        .with(counting_node("base", &[], counter))
        .with(counting_node("left", &["base"], counter))
        .with(counting_node("right", &["base"], counter))
        .with(counting_node("top", &["left", "right"], counter))
}

/// `a -> b -> c -> a`
pub fn cycle_module() -> Module {
    let counter = InvocationCounter::new();
    Module::new("cycle")
        .with(counting_node("a", &["b"], &counter))
        .with(counting_node("b", &["c"], &counter))
        .with(counting_node("c", &["a"], &counter))
}

/// Name of node `i` in a generated DAG.
pub fn dag_node_name(i: usize) -> String {
    format!("n{}", i)
}

/// Build a DAG where node `i` depends on the nodes listed in `edges[i]`.
///
/// Edges pointing at `i` or later are dropped, so the result is always acyclic.
pub fn dag_module(edges: &[Vec<usize>], counter: &InvocationCounter) -> Module {
    let mut module = Module::new("dag");
    for (i, targets) in edges.iter().enumerate() {
        let mut deps: Vec<String> = targets
            .iter()
            .filter(|&&t| t < i)
            .map(|&t| dag_node_name(t))
            .collect();
        deps.sort();
        deps.dedup();
        let dep_refs: Vec<&str> = deps.iter().map(|d| d.as_str()).collect();
        module.add(counting_node(&dag_node_name(i), &dep_refs, counter));
    }
    module
}

/// Panics unless every logged node appears after each of its logged dependencies.
pub fn assert_topological(log: &[String], nodes: &[NodeDefinition]) {
    let position: HashMap<&str, usize> = log
        .iter()
        .enumerate()
        .map(|(i, name)| (name.as_str(), i))
        .collect();
    let deps: HashMap<&str, &[String]> = nodes
        .iter()
        .map(|n| (n.name.as_str(), n.dependencies.as_slice()))
        .collect();

    for (i, name) in log.iter().enumerate() {
        for dep in deps.get(name.as_str()).copied().unwrap_or_default() {
            if let Some(&p) = position.get(dep.as_str()) {
                assert!(
                    p < i,
                    "'{}' computed at {} before its dependency '{}' at {}",
                    name,
                    i,
                    dep,
                    p
                );
            }
        }
    }
}

/// Convert a JSON object literal into a `ValueMap`; anything else is empty.
pub fn value_map(value: Value) -> ValueMap {
    match value {
        Value::Object(map) => map,
        _ => ValueMap::new(),
    }
}

/// Write `content` to a temporary `.toml` file.
pub fn write_config(content: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".toml")
        .tempfile()
        .expect("create temp config");
    file.write_all(content.as_bytes()).expect("write temp config");
    file
}
