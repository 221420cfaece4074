use std::path::Path;

use anyhow::{anyhow, bail, Context};
use serde_json::Value;

use nodeflow_core::types::ValueMap;

/// Parse a `key=value` pair. The value is read as JSON, falling back to a
/// plain string when it is not valid JSON.
pub fn parse_pair(pair: &str) -> anyhow::Result<(String, Value)> {
    let (key, raw) = pair
        .split_once('=')
        .ok_or_else(|| anyhow!("expected key=value, got '{}'", pair))?;
    let key = key.trim();
    if key.is_empty() {
        bail!("empty input name in '{}'", pair);
    }
    let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
    Ok((key.to_string(), value))
}

/// Read a JSON object of inputs from `path`.
pub fn load_file(path: &Path) -> anyhow::Result<ValueMap> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading inputs from {}", path.display()))?;
    let value: Value = serde_json::from_str(&content)
        .with_context(|| format!("parsing inputs from {}", path.display()))?;
    match value {
        Value::Object(map) => Ok(map),
        _ => bail!("{} must contain a JSON object", path.display()),
    }
}

/// Inputs file first, then `--input` pairs in order; later keys win.
pub fn collect(file: Option<&Path>, pairs: &[String]) -> anyhow::Result<ValueMap> {
    let mut inputs = match file {
        Some(path) => load_file(path)?,
        None => ValueMap::new(),
    };
    for pair in pairs {
        let (key, value) = parse_pair(pair)?;
        inputs.insert(key, value);
    }
    Ok(inputs)
}
