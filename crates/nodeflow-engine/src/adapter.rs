//! Result adapters and the chain that folds a raw result through them.

use std::collections::HashSet;
use std::sync::Arc;

use serde_json::Value;

use nodeflow_core::error::{EngineError, Result};
use nodeflow_core::traits::ResultAdapter;

/// Identity adapter: returns the raw `{target: value}` mapping as-is.
///
/// Used when no adapter is registered.
#[derive(Debug, Clone, Copy, Default)]
pub struct DictResult;

impl ResultAdapter for DictResult {
    fn name(&self) -> &str {
        "dict"
    }

    fn adapt(&self, value: Value) -> Value {
        value
    }
}

/// Replaces a mapping with the sorted array of its keys.
#[derive(Debug, Clone, Copy, Default)]
pub struct SortedKeys;

impl ResultAdapter for SortedKeys {
    fn name(&self) -> &str {
        "keys"
    }

    fn adapt(&self, value: Value) -> Value {
        match value {
            Value::Object(map) => {
                let mut keys: Vec<String> = map.into_iter().map(|(k, _)| k).collect();
                keys.sort();
                Value::Array(keys.into_iter().map(Value::String).collect())
            }
            other => other,
        }
    }
}

/// Keeps only the listed keys of a mapping.
#[derive(Debug, Clone, Default)]
pub struct SelectKeys {
    keys: HashSet<String>,
}

impl SelectKeys {
    pub fn new<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keys: keys.into_iter().map(Into::into).collect(),
        }
    }
}

impl ResultAdapter for SelectKeys {
    fn name(&self) -> &str {
        "select"
    }

    fn adapt(&self, value: Value) -> Value {
        match value {
            Value::Object(map) => Value::Object(
                map.into_iter()
                    .filter(|(k, _)| self.keys.contains(k))
                    .collect(),
            ),
            other => other,
        }
    }
}

/// Resolve an adapter from its configuration name.
///
/// Accepts `dict`, `keys` and `select:<key>,<key>,...`.
pub fn by_name(name: &str) -> Result<Arc<dyn ResultAdapter>> {
    let name = name.trim();
    if let Some(list) = name.strip_prefix("select:") {
        let keys = list
            .split(',')
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(String::from);
        return Ok(Arc::new(SelectKeys::new(keys)));
    }

    match name {
        "dict" => Ok(Arc::new(DictResult)),
        "keys" => Ok(Arc::new(SortedKeys)),
        other => Err(EngineError::Configuration(format!(
            "Unknown adapter '{}' (expected dict, keys or select:<keys>)",
            other
        ))),
    }
}

/// Ordered adapters; each one's output feeds the next.
#[derive(Clone, Default)]
pub struct AdapterChain {
    adapters: Vec<Arc<dyn ResultAdapter>>,
}

impl AdapterChain {
    pub fn new(adapters: Vec<Arc<dyn ResultAdapter>>) -> Self {
        Self { adapters }
    }

    /// Fold `raw` through every adapter in registration order.
    pub fn apply(&self, raw: Value) -> Value {
        if self.adapters.is_empty() {
            return DictResult.adapt(raw);
        }
        self.adapters
            .iter()
            .fold(raw, |value, adapter| adapter.adapt(value))
    }

    pub fn names(&self) -> Vec<&str> {
        self.adapters.iter().map(|a| a.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw() -> Value {
        json!({"template": "t", "pace": [1, 2], "cost": 0.5})
    }

    #[test]
    fn test_empty_chain_is_identity() {
        assert_eq!(AdapterChain::default().apply(raw()), raw());
    }

    #[test]
    fn test_sorted_keys() {
        assert_eq!(SortedKeys.adapt(raw()), json!(["cost", "pace", "template"]));
        assert_eq!(SortedKeys.adapt(json!(3)), json!(3));
    }

    #[test]
    fn test_select_keys() {
        let select = SelectKeys::new(["cost", "missing"]);
        assert_eq!(select.adapt(raw()), json!({"cost": 0.5}));
    }

    #[test]
    fn test_chain_applies_in_order() {
        let wrap = |v: Value| json!({ "wrapped": v });
        let adapters: Vec<Arc<dyn ResultAdapter>> = vec![Arc::new(SortedKeys), Arc::new(wrap)];
        let chain = AdapterChain::new(adapters);
        assert_eq!(
            chain.apply(raw()),
            json!({"wrapped": ["cost", "pace", "template"]})
        );
        assert_eq!(chain.names(), vec!["keys", "custom"]);
    }

    #[test]
    fn test_by_name() {
        assert_eq!(by_name("dict").unwrap().name(), "dict");
        assert_eq!(by_name(" keys ").unwrap().name(), "keys");

        let select = by_name("select:pace, cost").unwrap();
        assert_eq!(select.adapt(raw()), json!({"pace": [1, 2], "cost": 0.5}));

        let err = by_name("yaml").err().unwrap();
        assert!(matches!(err, EngineError::Configuration(_)));
        assert!(err.to_string().contains("'yaml'"));
    }
}
