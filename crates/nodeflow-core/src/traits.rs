use serde_json::Value;

use crate::error::BoxError;
use crate::types::{Arguments, Parameter};

/// Outcome of invoking a computation.
pub type ComputeResult = std::result::Result<Value, BoxError>;

/// A named unit of work whose parameters are its dependencies.
pub trait Computation: Send + Sync + 'static {
    /// Output name; also the name other computations depend on.
    fn name(&self) -> &str;

    /// Declared parameters, in declaration order.
    fn parameters(&self) -> &[Parameter];

    /// Produce the output from resolved dependency values.
    fn invoke(&self, args: &Arguments) -> ComputeResult;

    /// One-line description for listings.
    fn description(&self) -> &str {
        ""
    }
}

/// Transforms the raw result mapping after resolution.
///
/// Adapters receive the previous stage's output (the raw `{target: value}`
/// object for the first adapter) and must not assume it is still an object.
pub trait ResultAdapter: Send + Sync + 'static {
    /// Adapter name (used in logs and config).
    fn name(&self) -> &str {
        "custom"
    }

    fn adapt(&self, result: Value) -> Value;
}

impl<F> ResultAdapter for F
where
    F: Fn(Value) -> Value + Send + Sync + 'static,
{
    fn adapt(&self, result: Value) -> Value {
        self(result)
    }
}
