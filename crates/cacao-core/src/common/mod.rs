//! Shared wire types: external references, variables and the extension bag.

use serde::{Deserialize, Serialize};

use crate::errors::{CacaoError, Result};

/// Unknown fields captured during decode and replayed on encode.
///
/// Forward-compatible documents may carry properties this crate does not
/// model; they round-trip through this bag instead of being dropped.
pub type ExtensionBag = serde_json::Map<String, serde_json::Value>;

/// Predicate for `skip_serializing_if` on boolean fields that are absent
/// when false on the wire.
pub(crate) fn is_false(value: &bool) -> bool {
    !*value
}

/// Removes and returns the `type` discriminator from a decoded JSON object.
pub(crate) fn take_discriminator(
    location: &str,
    map: &mut serde_json::Map<String, serde_json::Value>,
) -> Result<String> {
    match map.remove("type") {
        Some(serde_json::Value::String(s)) => Ok(s),
        Some(_) => Err(CacaoError::SchemaMismatch {
            location: location.to_string(),
            reason: "the type property must be a string".to_string(),
        }),
        None => Err(CacaoError::SchemaMismatch {
            location: location.to_string(),
            reason: "the type property is required but missing".to_string(),
        }),
    }
}

/// Captures the location of information represented outside the playbook.
///
/// Besides `name` at least one of `description`, `source`, `url` or
/// `external_id` should be present for the reference to be useful.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExternalReference {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_id: Option<String>,
}

/// A playbook or step variable.
///
/// Variables live in a dictionary keyed by variable name; the inline `name`
/// is cleared when a variable is added to a playbook, the key is
/// authoritative.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Variable {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub object_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub constant: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub external: bool,
}

/// Appends a single value or a comma separated list of values to `list`,
/// trimming surrounding whitespace from each entry.
pub fn add_values_to_list(list: &mut Vec<String>, values: &str) {
    for v in values.split(',') {
        list.push(v.trim().to_string());
    }
}
