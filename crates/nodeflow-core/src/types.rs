use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Ordered name → value mapping (inputs, defaults, raw results).
pub type ValueMap = serde_json::Map<String, Value>;

/// A declared parameter of a computation.
///
/// Named parameters bind exactly one dependency by name. Variadic parameters
/// have no finite dependency list and are rejected when a registry is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "name", rename_all = "snake_case")]
pub enum Parameter {
    Named(String),
    Variadic(String),
}

impl Parameter {
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named(name.into())
    }

    pub fn variadic(name: impl Into<String>) -> Self {
        Self::Variadic(name.into())
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Named(name) | Self::Variadic(name) => name,
        }
    }

    pub fn is_variadic(&self) -> bool {
        matches!(self, Self::Variadic(_))
    }
}

impl From<&str> for Parameter {
    fn from(name: &str) -> Self {
        Self::Named(name.to_string())
    }
}

impl From<String> for Parameter {
    fn from(name: String) -> Self {
        Self::Named(name)
    }
}

/// Failure to read a resolved argument inside a computation.
#[derive(Debug, Error)]
pub enum ArgumentError {
    #[error("argument '{0}' was not bound")]
    Unbound(String),

    #[error("argument '{name}' is not {expected}")]
    WrongType { name: String, expected: &'static str },

    #[error("argument '{name}' could not be decoded: {source}")]
    Decode {
        name: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Resolved dependency values handed to a computation, keyed by parameter name.
#[derive(Debug, Clone, Default)]
pub struct Arguments {
    values: HashMap<String, Value>,
}

impl Arguments {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a value to a parameter name.
    pub fn bind(&mut self, name: impl Into<String>, value: Value) {
        self.values.insert(name.into(), value);
    }

    /// Get a bound value by parameter name.
    pub fn get(&self, name: &str) -> Result<&Value, ArgumentError> {
        self.values
            .get(name)
            .ok_or_else(|| ArgumentError::Unbound(name.to_string()))
    }

    pub fn str(&self, name: &str) -> Result<&str, ArgumentError> {
        self.get(name)?
            .as_str()
            .ok_or_else(|| wrong_type(name, "a string"))
    }

    pub fn f64(&self, name: &str) -> Result<f64, ArgumentError> {
        self.get(name)?
            .as_f64()
            .ok_or_else(|| wrong_type(name, "a number"))
    }

    pub fn u64(&self, name: &str) -> Result<u64, ArgumentError> {
        self.get(name)?
            .as_u64()
            .ok_or_else(|| wrong_type(name, "an unsigned integer"))
    }

    pub fn array(&self, name: &str) -> Result<&Vec<Value>, ArgumentError> {
        self.get(name)?
            .as_array()
            .ok_or_else(|| wrong_type(name, "an array"))
    }

    pub fn object(&self, name: &str) -> Result<&ValueMap, ArgumentError> {
        self.get(name)?
            .as_object()
            .ok_or_else(|| wrong_type(name, "an object"))
    }

    /// Decode a bound value into a typed structure.
    pub fn deserialize<T: DeserializeOwned>(&self, name: &str) -> Result<T, ArgumentError> {
        let value = self.get(name)?.clone();
        serde_json::from_value(value).map_err(|source| ArgumentError::Decode {
            name: name.to_string(),
            source,
        })
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

fn wrong_type(name: &str, expected: &'static str) -> ArgumentError {
    ArgumentError::WrongType {
        name: name.to_string(),
        expected,
    }
}

/// Summary of a registered computation, for listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeDefinition {
    pub name: String,
    pub dependencies: Vec<String>,
    /// Module the winning registration came from.
    pub module: String,
}
