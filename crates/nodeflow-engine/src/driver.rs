use std::time::{Duration, Instant};

use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};
use uuid::Uuid;

use nodeflow_core::error::{EngineError, Result};
use nodeflow_core::types::{NodeDefinition, ValueMap};

use crate::adapter::AdapterChain;
use crate::builder::Builder;
use crate::registry::NodeRegistry;
use crate::resolver::execute_targets;

/// Outcome of one `Driver::execute` call.
#[derive(Debug, Clone, Serialize)]
pub struct Execution {
    pub run_id: Uuid,
    /// Output of the last adapter.
    pub value: Value,
    /// Computed node names, in evaluation order. Inputs never appear here.
    pub execution_log: Vec<String>,
    pub elapsed: Duration,
}

impl Execution {
    pub fn into_value(self) -> Value {
        self.value
    }
}

/// Immutable execution facade over a node registry.
///
/// A `Driver` holds no per-call state, so one instance can serve concurrent
/// `execute` calls from several threads.
pub struct Driver {
    registry: NodeRegistry,
    defaults: ValueMap,
    adapters: AdapterChain,
    modules: Vec<String>,
}

impl Driver {
    pub(crate) fn new(
        registry: NodeRegistry,
        defaults: ValueMap,
        adapters: AdapterChain,
        modules: Vec<String>,
    ) -> Self {
        Self {
            registry,
            defaults,
            adapters,
            modules,
        }
    }

    pub fn builder() -> Builder {
        Builder::new()
    }

    /// Compute `targets`, with `inputs` layered over the stored defaults.
    ///
    /// Fails on the first missing dependency, cycle or computation error;
    /// computation errors come back as [`EngineError::Computation`] carrying
    /// the computation's error untouched.
    pub fn execute<S: AsRef<str>>(&self, targets: &[S], inputs: ValueMap) -> Result<Execution> {
        if targets.is_empty() {
            return Err(EngineError::Configuration(
                "execute requires at least one target".to_string(),
            ));
        }

        let run_id = Uuid::new_v4();
        let start = Instant::now();
        let targets: Vec<String> = targets.iter().map(|t| t.as_ref().to_string()).collect();

        let input_count = inputs.len();
        let mut context = self.defaults.clone();
        context.extend(inputs);

        info!(
            run_id = %run_id,
            targets = ?targets,
            inputs = input_count,
            "Executing graph"
        );

        let resolution = match execute_targets(&self.registry, &targets, context) {
            Ok(resolution) => resolution,
            Err(e) => {
                warn!(run_id = %run_id, error = %e, "Execution failed");
                return Err(e);
            }
        };

        let value = self.adapters.apply(Value::Object(resolution.values));
        let elapsed = start.elapsed();

        info!(
            run_id = %run_id,
            computed = resolution.execution_log.len(),
            elapsed_ms = elapsed.as_millis() as u64,
            "Execution complete"
        );

        Ok(Execution {
            run_id,
            value,
            execution_log: resolution.execution_log,
            elapsed,
        })
    }

    /// Compute `targets` using only the stored defaults as context.
    pub fn execute_with_defaults<S: AsRef<str>>(&self, targets: &[S]) -> Result<Execution> {
        self.execute(targets, ValueMap::new())
    }

    /// Registered computations with their dependencies and source module.
    pub fn nodes(&self) -> Vec<NodeDefinition> {
        self.registry.definitions()
    }

    pub fn defaults(&self) -> &ValueMap {
        &self.defaults
    }

    /// Names of the modules this driver was built from, in registration order.
    pub fn modules(&self) -> &[String] {
        &self.modules
    }

    pub fn adapter_names(&self) -> Vec<&str> {
        self.adapters.names()
    }

    pub fn registry(&self) -> &NodeRegistry {
        &self.registry
    }
}
