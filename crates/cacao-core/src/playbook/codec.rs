//! JSON codec for the playbook document.
//!
//! `workflow` and `data_marking_definitions` are dictionaries of tagged
//! unions keyed by object identifier. The key is the identity: decode
//! re-populates each entry's inline `id` from its key and rejects a
//! conflicting nested one; encode clears workflow step ids so the id lives
//! only at the dictionary level. Marking definitions keep their inline id
//! on the wire.

use indexmap::IndexMap;
use serde_json::Value;
use tracing::debug;

use crate::errors::{CacaoError, Result};
use crate::markings::{self, DataMarking};
use crate::playbook::Playbook;
use crate::workflow::{self, WorkflowStep};

/// Decodes a playbook from JSON bytes.
pub fn decode(data: &[u8]) -> Result<Playbook> {
    let root: Value = serde_json::from_slice(data).map_err(|e| CacaoError::SchemaMismatch {
        location: "playbook".to_string(),
        reason: e.to_string(),
    })?;
    let Value::Object(mut map) = root else {
        return Err(CacaoError::SchemaMismatch {
            location: "playbook".to_string(),
            reason: "the document root must be a JSON object".to_string(),
        });
    };

    let raw_workflow = map.remove("workflow");
    let raw_markings = map.remove("data_marking_definitions");

    let mut playbook: Playbook =
        serde_json::from_value(Value::Object(map)).map_err(|e| CacaoError::SchemaMismatch {
            location: "playbook".to_string(),
            reason: e.to_string(),
        })?;

    if let Some(raw) = raw_workflow {
        playbook.workflow = decode_step_map(raw)?;
    }
    if let Some(raw) = raw_markings {
        playbook.data_marking_definitions = decode_marking_map(raw)?;
    }

    debug!(
        steps = playbook.workflow.len(),
        marking_definitions = playbook.data_marking_definitions.len(),
        signatures = playbook.signatures.len(),
        "decoded playbook"
    );
    Ok(playbook)
}

pub fn decode_from_str(data: &str) -> Result<Playbook> {
    decode(data.as_bytes())
}

/// Encodes a playbook as 2-space indented JSON bytes.
pub fn encode(playbook: &Playbook) -> Result<Vec<u8>> {
    Ok(encode_to_string(playbook)?.into_bytes())
}

/// Encodes a playbook as a 2-space indented JSON string. Works on a copy:
/// the caller's object keeps its inline workflow step ids.
pub fn encode_to_string(playbook: &Playbook) -> Result<String> {
    let mut working = playbook.clone();
    clear_step_ids(&mut working);
    serde_json::to_string_pretty(&working).map_err(|e| CacaoError::SchemaMismatch {
        location: "playbook".to_string(),
        reason: e.to_string(),
    })
}

/// Zeroes the inline id of every workflow step. On the wire the id lives
/// only at the dictionary level.
pub(crate) fn clear_step_ids(playbook: &mut Playbook) {
    for step in playbook.workflow.values_mut() {
        step.common_mut().id = None;
    }
}

fn decode_step_map(raw: Value) -> Result<IndexMap<String, WorkflowStep>> {
    let Value::Object(entries) = raw else {
        return Err(CacaoError::SchemaMismatch {
            location: "workflow".to_string(),
            reason: "the workflow property must be a dictionary".to_string(),
        });
    };
    let mut steps = IndexMap::with_capacity(entries.len());
    for (key, value) in entries {
        let Value::Object(obj) = value else {
            return Err(CacaoError::SchemaMismatch {
                location: key,
                reason: "workflow entries must be objects".to_string(),
            });
        };
        let mut step = workflow::decode_step(&key, obj)?;
        claim_key_identity(&key, &mut step.common_mut().id)?;
        steps.insert(key, step);
    }
    Ok(steps)
}

fn decode_marking_map(raw: Value) -> Result<IndexMap<String, DataMarking>> {
    let Value::Object(entries) = raw else {
        return Err(CacaoError::SchemaMismatch {
            location: "data_marking_definitions".to_string(),
            reason: "the data_marking_definitions property must be a dictionary".to_string(),
        });
    };
    let mut definitions = IndexMap::with_capacity(entries.len());
    for (key, value) in entries {
        let Value::Object(obj) = value else {
            return Err(CacaoError::SchemaMismatch {
                location: key,
                reason: "data marking definitions must be objects".to_string(),
            });
        };
        let mut marking = markings::decode_marking(&key, obj)?;
        claim_key_identity(&key, &mut marking.common_mut().id)?;
        definitions.insert(key, marking);
    }
    Ok(definitions)
}

/// The dictionary key is the object's identity: a non-empty inline id must
/// agree with it, and the key then becomes the inline id.
fn claim_key_identity(key: &str, id: &mut Option<String>) -> Result<()> {
    match id.as_deref() {
        Some(embedded) if !embedded.is_empty() && embedded != key => Err(CacaoError::TypeCollision {
            key: key.to_string(),
            embedded: embedded.to_string(),
        }),
        _ => {
            *id = Some(key.to_string());
            Ok(())
        }
    }
}
