use anyhow::{Context, Result};
use schemars::{JsonSchema, schema_for};
use strum::{EnumMessage, IntoEnumIterator};

/// Pretty-printed JSON schema of a configuration type.
pub fn schema_json<T: JsonSchema>() -> Result<String> {
    serde_json::to_string_pretty(&schema_for!(T)).context("serializing JSON schema")
}

/// `(type tag, short description)` for every variant of a choice enum.
pub fn kinds<K>() -> Vec<(&'static str, &'static str)>
where
    K: IntoEnumIterator + Into<&'static str> + EnumMessage + Copy,
{
    K::iter()
        .map(|k| (k.into(), k.get_message().unwrap_or_default()))
        .collect()
}
