pub mod blobs;
pub mod context;
pub mod events;
pub mod flush;
pub mod ping;
pub mod profile;
pub mod users;

use memobase_client::Fields;
use serde::de::DeserializeOwned;

/// Parse a `KEY=VALUE` argument.
///
/// The value is read as JSON when it parses, and kept as a string otherwise,
/// so `age=30` stores a number and `name=Gus` a string.
pub fn parse_key_val(s: &str) -> Result<(String, serde_json::Value), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("invalid KEY=VALUE: no `=` found in `{s}`"))?;
    let value = serde_json::from_str(value)
        .unwrap_or_else(|_| serde_json::Value::String(value.to_string()));
    Ok((key.to_string(), value))
}

pub fn to_fields(pairs: &[(String, serde_json::Value)]) -> Fields {
    pairs.iter().cloned().collect()
}

/// Read JSON given inline or as `@path`.
pub fn read_json<T: DeserializeOwned>(input: &str) -> anyhow::Result<T> {
    if let Some(path) = input.strip_prefix('@') {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    } else {
        Ok(serde_json::from_str(input)?)
    }
}
