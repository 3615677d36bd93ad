//! The playbook aggregate: the root document object, its mutators, the
//! JSON codec, the validator and the signing envelopes.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::common::{add_values_to_list, is_false, ExtensionBag, ExternalReference, Variable};
use crate::errors::{CacaoError, Result};
use crate::markings::DataMarking;
use crate::signature::Signature;
use crate::timestamp;
use crate::vocab;
use crate::workflow::WorkflowStep;

pub mod codec;
pub mod features;
pub mod sign;
pub mod validate;

pub use features::Features;
pub use sign::Verification;

/// A CACAO playbook document.
///
/// `workflow` and `data_marking_definitions` hold tagged unions and are
/// populated by [`codec::decode`] rather than by derived deserialization;
/// both maps keep insertion order. Fields the model does not name are
/// preserved in `extra`.
///
/// [`codec::decode`] is the only supported way to read a document.
/// Deserializing a `Playbook` directly with serde leaves `workflow` and
/// `data_marking_definitions` empty and routes their raw JSON into
/// `extra`, where it would be re-emitted untyped on encode.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Playbook {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub object_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spec_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub playbook_types: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified: Option<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub revoked: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid_from: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid_until: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub derived_from: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub impact: Option<i32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub industry_sectors: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub external_references: Vec<ExternalReference>,
    /// Marking identifiers applied to the whole playbook; definitions live
    /// in `data_marking_definitions`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub markings: Vec<String>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub playbook_variables: IndexMap<String, Variable>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workflow_start: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workflow_exception: Option<String>,
    #[serde(default, skip_deserializing, skip_serializing_if = "IndexMap::is_empty")]
    pub workflow: IndexMap<String, WorkflowStep>,
    #[serde(default, skip_deserializing, skip_serializing_if = "IndexMap::is_empty")]
    pub data_marking_definitions: IndexMap<String, DataMarking>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub signatures: Vec<Signature>,
    #[serde(flatten)]
    pub extra: ExtensionBag,
}

impl Playbook {
    /// Creates a playbook with the basic properties stamped: type
    /// `playbook`, the current spec version, a fresh id and
    /// created/modified set to now at millisecond precision.
    pub fn new() -> Self {
        let now = timestamp::now_milli();
        Playbook {
            object_type: Some("playbook".to_string()),
            spec_version: Some(crate::CURRENT_SPEC_VERSION.to_string()),
            id: Some(format!("playbook--{}", Uuid::new_v4())),
            created: Some(now.clone()),
            modified: Some(now),
            ..Default::default()
        }
    }

    /// Replaces the id with a fresh one for `object_type`, which must be
    /// `playbook` or `playbook-template`.
    pub fn set_new_id(&mut self, object_type: &str) -> Result<()> {
        if object_type != "playbook" && object_type != "playbook-template" {
            return Err(CacaoError::InvariantViolation(
                "the object type is not valid for a CACAO playbook id".to_string(),
            ));
        }
        self.id = Some(format!("{object_type}--{}", Uuid::new_v4()));
        Ok(())
    }

    pub fn set_created(&mut self, ts: &str) -> Result<()> {
        if !timestamp::is_valid(ts) {
            return Err(CacaoError::InvariantViolation(
                "the created timestamp is not a valid RFC 3339 timestamp".to_string(),
            ));
        }
        self.created = Some(ts.to_string());
        Ok(())
    }

    /// Sets `modified`, which requires `created` to be populated and must
    /// not precede it.
    pub fn set_modified(&mut self, ts: &str) -> Result<()> {
        if !timestamp::is_valid(ts) {
            return Err(CacaoError::InvariantViolation(
                "the modified timestamp is not a valid RFC 3339 timestamp".to_string(),
            ));
        }
        let Some(created) = self.created.as_deref() else {
            return Err(CacaoError::InvariantViolation(
                "the created property is null, but must be populated".to_string(),
            ));
        };
        if let (Some(c), Some(m)) = (timestamp::parse(created), timestamp::parse(ts)) {
            if m < c {
                return Err(CacaoError::InvariantViolation(
                    "the modified timestamp is invalid, it is before the created timestamp"
                        .to_string(),
                ));
            }
        }
        self.modified = Some(ts.to_string());
        Ok(())
    }

    /// Adds one value or a comma separated list of values to
    /// `playbook_types`.
    pub fn add_playbook_types(&mut self, values: &str) {
        add_values_to_list(&mut self.playbook_types, values);
    }

    pub fn add_derived_from(&mut self, values: &str) {
        add_values_to_list(&mut self.derived_from, values);
    }

    pub fn add_industry_sectors(&mut self, values: &str) {
        add_values_to_list(&mut self.industry_sectors, values);
    }

    pub fn add_labels(&mut self, values: &str) {
        add_values_to_list(&mut self.labels, values);
    }

    pub fn add_markings(&mut self, values: &str) {
        add_values_to_list(&mut self.markings, values);
    }

    pub fn add_external_reference(&mut self, reference: ExternalReference) {
        self.external_references.push(reference);
    }

    /// Adds a global playbook variable, keyed by its name. The inline name
    /// is cleared; the dictionary key is authoritative.
    pub fn add_variable(&mut self, mut variable: Variable) -> Result<()> {
        let valid = variable
            .object_type
            .as_deref()
            .is_some_and(vocab::is_variable_type_valid);
        if !valid {
            return Err(CacaoError::InvariantViolation(
                "the variable type is not valid".to_string(),
            ));
        }
        let Some(name) = variable.name.take().filter(|n| !n.is_empty()) else {
            return Err(CacaoError::InvariantViolation(
                "the variable name is required but missing".to_string(),
            ));
        };
        self.playbook_variables.insert(name, variable);
        Ok(())
    }

    /// Adds a workflow step, keyed by its id. Re-adding the identical step
    /// is a no-op; a different step under an existing id is rejected.
    pub fn add_workflow_step(&mut self, step: WorkflowStep) -> Result<()> {
        let Some(key) = step.common().id.clone().filter(|id| !id.is_empty()) else {
            return Err(CacaoError::InvariantViolation(
                "the workflow step id is required but missing".to_string(),
            ));
        };
        match self.workflow.get(&key) {
            Some(existing) if *existing != step => Err(CacaoError::InvariantViolation(
                format!("a different workflow step is already stored under {key}"),
            )),
            Some(_) => Ok(()),
            None => {
                self.workflow.insert(key, step);
                Ok(())
            }
        }
    }

    /// Adds a data marking definition, keyed by its id. Marking definitions
    /// are immutable: changed content needs a new identifier.
    pub fn add_marking_definition(&mut self, marking: DataMarking) -> Result<()> {
        let Some(key) = marking.common().id.clone().filter(|id| !id.is_empty()) else {
            return Err(CacaoError::InvariantViolation(
                "the data marking id is required but missing".to_string(),
            ));
        };
        match self.data_marking_definitions.get(&key) {
            Some(existing) if *existing != marking => Err(CacaoError::InvariantViolation(
                format!("a different data marking is already stored under {key}"),
            )),
            Some(_) => Ok(()),
            None => {
                self.data_marking_definitions.insert(key, marking);
                Ok(())
            }
        }
    }

    pub fn set_workflow_start(&mut self, id: &str) {
        self.workflow_start = Some(id.to_string());
    }

    pub fn set_workflow_exception(&mut self, id: &str) {
        self.workflow_exception = Some(id.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_playbooks_carry_the_basic_properties() {
        let pb = Playbook::new();
        assert_eq!(pb.object_type.as_deref(), Some("playbook"));
        assert_eq!(pb.spec_version.as_deref(), Some(crate::CURRENT_SPEC_VERSION));
        assert!(crate::id::is_valid(pb.id.as_deref().unwrap()));
        assert_eq!(pb.created, pb.modified);
        assert!(!pb.revoked);
        assert!(pb.workflow.is_empty());
    }

    #[test]
    fn set_new_id_only_accepts_playbook_object_types() {
        let mut pb = Playbook::new();
        let before = pb.id.clone();
        pb.set_new_id("playbook-template").unwrap();
        assert!(pb.id.as_deref().unwrap().starts_with("playbook-template--"));
        assert_ne!(pb.id, before);

        let err = pb.set_new_id("identity").unwrap_err();
        assert!(matches!(err, CacaoError::InvariantViolation(_)));
        assert!(err.to_string().contains("not valid for a CACAO playbook id"));
    }

    #[test]
    fn modified_must_not_precede_created() {
        let mut pb = Playbook::new();
        pb.set_created("2022-05-18T11:31:31.319Z").unwrap();
        pb.set_modified("2022-05-18T11:31:31.319Z").unwrap();
        pb.set_modified("2023-01-01T00:00:00Z").unwrap();

        let err = pb.set_modified("2021-01-01T00:00:00Z").unwrap_err();
        assert!(err.to_string().contains("before the created timestamp"));

        let mut blank = Playbook::default();
        let err = blank.set_modified("2023-01-01T00:00:00Z").unwrap_err();
        assert!(err.to_string().contains("created property is null"));
    }

    #[test]
    fn timestamps_are_validated_on_set() {
        let mut pb = Playbook::new();
        assert!(pb.set_created("yesterday").is_err());
        assert!(pb.set_modified("2022-13-40T99:99:99Z").is_err());
    }

    #[test]
    fn list_adders_split_comma_separated_values() {
        let mut pb = Playbook::new();
        pb.add_playbook_types("detection, investigation");
        pb.add_labels("demo");
        pb.add_industry_sectors("energy , water");
        assert_eq!(pb.playbook_types, vec!["detection", "investigation"]);
        assert_eq!(pb.labels, vec!["demo"]);
        assert_eq!(pb.industry_sectors, vec!["energy", "water"]);
    }

    #[test]
    fn variables_are_keyed_by_name_with_the_inline_name_cleared() {
        let mut pb = Playbook::new();
        pb.add_variable(Variable {
            name: Some("$$data_to_analyze$$".to_string()),
            object_type: Some("string".to_string()),
            value: Some("some binary blob".to_string()),
            ..Default::default()
        })
        .unwrap();

        let stored = &pb.playbook_variables["$$data_to_analyze$$"];
        assert!(stored.name.is_none());
        assert_eq!(stored.value.as_deref(), Some("some binary blob"));

        let err = pb
            .add_variable(Variable {
                name: Some("$$bad$$".to_string()),
                object_type: Some("blob".to_string()),
                ..Default::default()
            })
            .unwrap_err();
        assert!(err.to_string().contains("the variable type is not valid"));

        let err = pb
            .add_variable(Variable {
                object_type: Some("string".to_string()),
                ..Default::default()
            })
            .unwrap_err();
        assert!(err.to_string().contains("the variable name is required"));
    }

    #[test]
    fn workflow_steps_are_keyed_by_id_and_immutable_once_added() {
        let mut pb = Playbook::new();
        let mut step = WorkflowStep::new_start();
        step.common_mut().name = Some("start".to_string());
        let id = step.common().id.clone().unwrap();

        pb.add_workflow_step(step.clone()).unwrap();
        // identical payload is idempotent
        pb.add_workflow_step(step.clone()).unwrap();
        assert_eq!(pb.workflow.len(), 1);
        assert!(pb.workflow.contains_key(&id));

        step.common_mut().name = Some("renamed".to_string());
        let err = pb.add_workflow_step(step).unwrap_err();
        assert!(err.to_string().contains("already stored under"));

        let mut anonymous = WorkflowStep::new_end();
        anonymous.common_mut().id = None;
        let err = pb.add_workflow_step(anonymous).unwrap_err();
        assert!(err.to_string().contains("workflow step id is required"));
    }

    #[test]
    fn marking_definitions_are_immutable_once_added() {
        use crate::markings::TlpMarking;

        let mut pb = Playbook::new();
        let amber = DataMarking::Tlp(TlpMarking::amber());
        let id = amber.common().id.clone().unwrap();

        pb.add_marking_definition(amber.clone()).unwrap();
        pb.add_marking_definition(amber).unwrap();
        assert_eq!(pb.data_marking_definitions.len(), 1);

        let mut altered = TlpMarking::amber();
        altered.tlp_level = Some("RED".to_string());
        let err = pb.add_marking_definition(DataMarking::Tlp(altered)).unwrap_err();
        assert!(err.to_string().contains("already stored under"));
        match &pb.data_marking_definitions[&id] {
            DataMarking::Tlp(kept) => assert_eq!(kept.tlp_level.as_deref(), Some("AMBER")),
            other => panic!("unexpected marking variant: {other:?}"),
        }
    }

    #[test]
    fn unknown_root_fields_survive_in_the_extension_bag() {
        let raw = serde_json::json!({
            "type": "playbook",
            "spec_version": "2.0",
            "name": "P",
            "x_acme_rollout_ring": 2
        });
        let pb: Playbook = serde_json::from_value(raw).unwrap();
        assert_eq!(pb.extra["x_acme_rollout_ring"], 2);
        let back = serde_json::to_value(&pb).unwrap();
        assert_eq!(back["x_acme_rollout_ring"], 2);
    }

    #[test]
    fn direct_deserialization_leaves_the_workflow_untyped() {
        let raw = serde_json::json!({
            "type": "playbook",
            "spec_version": "2.0",
            "workflow": {
                "end--44444444-dddd-4ddd-8ddd-444444444444": {"type": "end"}
            }
        });

        // plain serde cannot type the unions; the raw map lands in extra
        let pb: Playbook = serde_json::from_value(raw.clone()).unwrap();
        assert!(pb.workflow.is_empty());
        assert!(pb.extra.contains_key("workflow"));

        let pb = codec::decode(raw.to_string().as_bytes()).unwrap();
        assert_eq!(pb.workflow.len(), 1);
        assert!(!pb.extra.contains_key("workflow"));
    }
}
