//! Workflow steps: the polymorphic nodes of a playbook's execution graph.
//!
//! Steps form a tagged union discriminated by the `type` property. Inside a
//! playbook they live in an ordered map keyed by step identifier; the map
//! key is authoritative, the inline `id` is cleared on encode and
//! re-populated on decode.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use uuid::Uuid;

use crate::common::{take_discriminator, ExtensionBag, ExternalReference, Variable};
use crate::errors::{CacaoError, Result};
use crate::vocab::Category;

/// Properties shared by every workflow step type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StepCommon {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub external_references: Vec<ExternalReference>,
    /// Milliseconds to wait before the step runs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delay: Option<i64>,
    /// Milliseconds before the step is considered failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<i64>,
    #[serde(
        rename = "playbook_variables",
        default,
        skip_serializing_if = "IndexMap::is_empty"
    )]
    pub step_variables: IndexMap<String, Variable>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_completion: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_success: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_failure: Option<String>,
}

impl StepCommon {
    /// Fresh common block carrying a generated `<step_type>--<uuid4>` id.
    pub fn with_new_id(step_type: &str) -> Self {
        Self { id: Some(format!("{step_type}--{}", Uuid::new_v4())), ..Default::default() }
    }
}

/// Explicit entry point of a playbook. Must not use `on_success` or
/// `on_failure`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StartStep {
    #[serde(flatten)]
    pub common: StepCommon,
    #[serde(flatten)]
    pub extra: ExtensionBag,
}

/// Explicit terminal point of a playbook or branch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EndStep {
    #[serde(flatten)]
    pub common: StepCommon,
    #[serde(flatten)]
    pub extra: ExtensionBag,
}

/// Commands executed on one or more agents, processed sequentially.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionStep {
    #[serde(flatten)]
    pub common: StepCommon,
    /// Decoded separately; each entry is a tagged union by command `type`.
    #[serde(default, skip_deserializing, skip_serializing_if = "Vec::is_empty")]
    pub commands: Vec<CommandData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub targets: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub in_args: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub out_args: Vec<String>,
    #[serde(flatten)]
    pub extra: ExtensionBag,
}

/// Executes another playbook by reference.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlaybookActionStep {
    #[serde(flatten)]
    pub common: StepCommon,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub playbook_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub playbook_version: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub in_args: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub out_args: Vec<String>,
    #[serde(flatten)]
    pub extra: ExtensionBag,
}

/// Fan-out over `next_steps`; all referenced steps must complete before the
/// workflow moves on.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParallelStep {
    #[serde(flatten)]
    pub common: StepCommon,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub next_steps: Vec<String>,
    #[serde(flatten)]
    pub extra: ExtensionBag,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IfStep {
    #[serde(flatten)]
    pub common: StepCommon,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub on_true: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub on_false: Vec<String>,
    #[serde(flatten)]
    pub extra: ExtensionBag,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WhileStep {
    #[serde(flatten)]
    pub common: StepCommon,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub on_true: Vec<String>,
    #[serde(flatten)]
    pub extra: ExtensionBag,
}

/// Multi-way branch: `switch` names the tested variable, `cases` maps a
/// case label to the successor list for that label.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SwitchStep {
    #[serde(flatten)]
    pub common: StepCommon,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub switch: Option<String>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub cases: IndexMap<String, Vec<String>>,
    #[serde(flatten)]
    pub extra: ExtensionBag,
}

/// A workflow step, discriminated by the wire `type` property.
#[derive(Debug, Clone, PartialEq)]
pub enum WorkflowStep {
    Start(StartStep),
    End(EndStep),
    Action(ActionStep),
    PlaybookAction(PlaybookActionStep),
    Parallel(ParallelStep),
    If(IfStep),
    While(WhileStep),
    Switch(SwitchStep),
}

impl WorkflowStep {
    pub fn new_start() -> Self {
        Self::Start(StartStep { common: StepCommon::with_new_id("start"), ..Default::default() })
    }

    pub fn new_end() -> Self {
        Self::End(EndStep { common: StepCommon::with_new_id("end"), ..Default::default() })
    }

    pub fn new_action() -> Self {
        Self::Action(ActionStep { common: StepCommon::with_new_id("action"), ..Default::default() })
    }

    pub fn new_playbook_action() -> Self {
        Self::PlaybookAction(PlaybookActionStep {
            common: StepCommon::with_new_id("playbook-action"),
            ..Default::default()
        })
    }

    pub fn new_parallel() -> Self {
        Self::Parallel(ParallelStep {
            common: StepCommon::with_new_id("parallel"),
            ..Default::default()
        })
    }

    pub fn new_if() -> Self {
        Self::If(IfStep { common: StepCommon::with_new_id("if-condition"), ..Default::default() })
    }

    pub fn new_while() -> Self {
        Self::While(WhileStep {
            common: StepCommon::with_new_id("while-condition"),
            ..Default::default()
        })
    }

    pub fn new_switch() -> Self {
        Self::Switch(SwitchStep {
            common: StepCommon::with_new_id("switch-condition"),
            ..Default::default()
        })
    }

    /// The wire discriminator for this step.
    pub fn step_type(&self) -> &'static str {
        match self {
            Self::Start(_) => "start",
            Self::End(_) => "end",
            Self::Action(_) => "action",
            Self::PlaybookAction(_) => "playbook-action",
            Self::Parallel(_) => "parallel",
            Self::If(_) => "if-condition",
            Self::While(_) => "while-condition",
            Self::Switch(_) => "switch-condition",
        }
    }

    pub fn common(&self) -> &StepCommon {
        match self {
            Self::Start(s) => &s.common,
            Self::End(s) => &s.common,
            Self::Action(s) => &s.common,
            Self::PlaybookAction(s) => &s.common,
            Self::Parallel(s) => &s.common,
            Self::If(s) => &s.common,
            Self::While(s) => &s.common,
            Self::Switch(s) => &s.common,
        }
    }

    pub fn common_mut(&mut self) -> &mut StepCommon {
        match self {
            Self::Start(s) => &mut s.common,
            Self::End(s) => &mut s.common,
            Self::Action(s) => &mut s.common,
            Self::PlaybookAction(s) => &mut s.common,
            Self::Parallel(s) => &mut s.common,
            Self::If(s) => &mut s.common,
            Self::While(s) => &mut s.common,
            Self::Switch(s) => &mut s.common,
        }
    }

    /// Unmodeled properties captured during decode.
    pub fn extra(&self) -> &ExtensionBag {
        match self {
            Self::Start(s) => &s.extra,
            Self::End(s) => &s.extra,
            Self::Action(s) => &s.extra,
            Self::PlaybookAction(s) => &s.extra,
            Self::Parallel(s) => &s.extra,
            Self::If(s) => &s.extra,
            Self::While(s) => &s.extra,
            Self::Switch(s) => &s.extra,
        }
    }
}

impl Serialize for WorkflowStep {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let fields = match self {
            Self::Start(s) => serde_json::to_value(s),
            Self::End(s) => serde_json::to_value(s),
            Self::Action(s) => serde_json::to_value(s),
            Self::PlaybookAction(s) => serde_json::to_value(s),
            Self::Parallel(s) => serde_json::to_value(s),
            Self::If(s) => serde_json::to_value(s),
            Self::While(s) => serde_json::to_value(s),
            Self::Switch(s) => serde_json::to_value(s),
        }
        .map_err(serde::ser::Error::custom)?;

        let mut map = serde_json::Map::new();
        map.insert("type".to_string(), Value::String(self.step_type().to_string()));
        if let Value::Object(fields) = fields {
            map.extend(fields);
        }
        map.serialize(serializer)
    }
}

/// Decodes one workflow step from its JSON object form. `location` names
/// the spot in the document for error reporting, usually the map key.
pub fn decode_step(location: &str, mut map: serde_json::Map<String, Value>) -> Result<WorkflowStep> {
    let step_type = take_discriminator(location, &mut map)?;
    let schema = |e: serde_json::Error| CacaoError::SchemaMismatch {
        location: location.to_string(),
        reason: e.to_string(),
    };
    let step = match step_type.as_str() {
        "start" => WorkflowStep::Start(serde_json::from_value(Value::Object(map)).map_err(schema)?),
        "end" => WorkflowStep::End(serde_json::from_value(Value::Object(map)).map_err(schema)?),
        "action" => {
            let commands = map.remove("commands");
            let mut step: ActionStep =
                serde_json::from_value(Value::Object(map)).map_err(schema)?;
            if let Some(raw) = commands {
                step.commands = decode_commands(location, raw)?;
            }
            WorkflowStep::Action(step)
        }
        "playbook-action" => WorkflowStep::PlaybookAction(
            serde_json::from_value(Value::Object(map)).map_err(schema)?,
        ),
        "parallel" => {
            WorkflowStep::Parallel(serde_json::from_value(Value::Object(map)).map_err(schema)?)
        }
        "if-condition" => {
            WorkflowStep::If(serde_json::from_value(Value::Object(map)).map_err(schema)?)
        }
        "while-condition" => {
            WorkflowStep::While(serde_json::from_value(Value::Object(map)).map_err(schema)?)
        }
        "switch-condition" => {
            WorkflowStep::Switch(serde_json::from_value(Value::Object(map)).map_err(schema)?)
        }
        other => {
            return Err(CacaoError::UnknownVariant {
                category: Category::WorkflowStepType.label(),
                value: other.to_string(),
            })
        }
    };
    Ok(step)
}

fn decode_commands(location: &str, raw: Value) -> Result<Vec<CommandData>> {
    let Value::Array(items) = raw else {
        return Err(CacaoError::SchemaMismatch {
            location: location.to_string(),
            reason: "the commands property must be an array".to_string(),
        });
    };
    items
        .into_iter()
        .map(|item| match item {
            Value::Object(map) => decode_command(location, map),
            _ => Err(CacaoError::SchemaMismatch {
                location: location.to_string(),
                reason: "command entries must be objects".to_string(),
            }),
        })
        .collect()
}

/// Decodes one command from its JSON object form.
pub fn decode_command(
    location: &str,
    mut map: serde_json::Map<String, Value>,
) -> Result<CommandData> {
    let command_type = take_discriminator(location, &mut map)?;
    let body: CommandBody =
        serde_json::from_value(Value::Object(map)).map_err(|e| CacaoError::SchemaMismatch {
            location: location.to_string(),
            reason: e.to_string(),
        })?;
    CommandData::from_parts(&command_type, body)
}

/// Fields shared by every command type. Either `command` or `command_b64`
/// must be present for the command to be executable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommandBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command_b64: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub playbook_activity: Option<String>,
    #[serde(flatten)]
    pub extra: ExtensionBag,
}

/// A command carried by an action step, discriminated by command `type`.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandData {
    Manual(CommandBody),
    Bash(CommandBody),
    HttpApi(CommandBody),
    Ssh(CommandBody),
    CalderaCmd(CommandBody),
    Elastic(CommandBody),
    Jupyter(CommandBody),
    Kestrel(CommandBody),
    Openc2Json(CommandBody),
    Sigma(CommandBody),
    Yara(CommandBody),
}

impl CommandData {
    /// Builds a command from its wire discriminator and shared body.
    pub fn from_parts(command_type: &str, body: CommandBody) -> Result<Self> {
        Ok(match command_type {
            "manual" => Self::Manual(body),
            "bash" => Self::Bash(body),
            "http-api" => Self::HttpApi(body),
            "ssh" => Self::Ssh(body),
            "caldera-cmd" => Self::CalderaCmd(body),
            "elastic" => Self::Elastic(body),
            "jupyter" => Self::Jupyter(body),
            "kestrel" => Self::Kestrel(body),
            "openc2-json" => Self::Openc2Json(body),
            "sigma" => Self::Sigma(body),
            "yara" => Self::Yara(body),
            other => {
                return Err(CacaoError::UnknownVariant {
                    category: Category::CommandType.label(),
                    value: other.to_string(),
                })
            }
        })
    }

    /// The wire discriminator for this command.
    pub fn command_type(&self) -> &'static str {
        match self {
            Self::Manual(_) => "manual",
            Self::Bash(_) => "bash",
            Self::HttpApi(_) => "http-api",
            Self::Ssh(_) => "ssh",
            Self::CalderaCmd(_) => "caldera-cmd",
            Self::Elastic(_) => "elastic",
            Self::Jupyter(_) => "jupyter",
            Self::Kestrel(_) => "kestrel",
            Self::Openc2Json(_) => "openc2-json",
            Self::Sigma(_) => "sigma",
            Self::Yara(_) => "yara",
        }
    }

    pub fn body(&self) -> &CommandBody {
        match self {
            Self::Manual(b)
            | Self::Bash(b)
            | Self::HttpApi(b)
            | Self::Ssh(b)
            | Self::CalderaCmd(b)
            | Self::Elastic(b)
            | Self::Jupyter(b)
            | Self::Kestrel(b)
            | Self::Openc2Json(b)
            | Self::Sigma(b)
            | Self::Yara(b) => b,
        }
    }

    pub fn body_mut(&mut self) -> &mut CommandBody {
        match self {
            Self::Manual(b)
            | Self::Bash(b)
            | Self::HttpApi(b)
            | Self::Ssh(b)
            | Self::CalderaCmd(b)
            | Self::Elastic(b)
            | Self::Jupyter(b)
            | Self::Kestrel(b)
            | Self::Openc2Json(b)
            | Self::Sigma(b)
            | Self::Yara(b) => b,
        }
    }
}

impl Serialize for CommandData {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let fields = serde_json::to_value(self.body()).map_err(serde::ser::Error::custom)?;
        let mut map = serde_json::Map::new();
        map.insert("type".to_string(), Value::String(self.command_type().to_string()));
        if let Value::Object(fields) = fields {
            map.extend(fields);
        }
        map.serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn obj(v: Value) -> serde_json::Map<String, Value> {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn action_step_decodes_with_its_commands() {
        let raw = obj(json!({
            "type": "action",
            "name": "IP Verification",
            "on_completion": "end--6b23c237-ade8-4d00-9aa1-75999738d557",
            "agent": "organization--5abe695c-7bd5-4c31-8824-2528696cdbf1",
            "commands": [
                {"type": "bash", "command": "dig @8.8.8.8 example.com"},
                {"type": "manual", "description": "escalate to on-call"}
            ]
        }));
        let step = decode_step("test", raw).unwrap();
        let WorkflowStep::Action(action) = step else {
            panic!("expected an action step");
        };
        assert_eq!(action.common.name.as_deref(), Some("IP Verification"));
        assert_eq!(action.commands.len(), 2);
        assert_eq!(action.commands[0].command_type(), "bash");
        assert_eq!(
            action.commands[0].body().command.as_deref(),
            Some("dig @8.8.8.8 example.com")
        );
        assert_eq!(action.commands[1].command_type(), "manual");
    }

    #[test]
    fn unknown_step_type_is_rejected() {
        let raw = obj(json!({"type": "noop"}));
        let err = decode_step("test", raw).unwrap_err();
        assert!(matches!(err, CacaoError::UnknownVariant { .. }));
        assert_eq!(err.to_string(), "unknown workflow step type value: noop");
    }

    #[test]
    fn missing_discriminator_is_a_schema_mismatch() {
        let raw = obj(json!({"name": "no type here"}));
        let err = decode_step("step--0000", raw).unwrap_err();
        assert!(matches!(err, CacaoError::SchemaMismatch { .. }));
        assert!(err.to_string().contains("step--0000"));
    }

    #[test]
    fn unknown_command_type_is_rejected() {
        let raw = obj(json!({
            "type": "action",
            "commands": [{"type": "telnet", "command": "open example.com"}]
        }));
        let err = decode_step("test", raw).unwrap_err();
        assert!(matches!(err, CacaoError::UnknownVariant { .. }));
    }

    #[test]
    fn unmodeled_fields_round_trip_through_the_extra_bag() {
        let raw = obj(json!({
            "type": "while-condition",
            "condition": "incident_open == true",
            "on_true": ["action--c3bf4522-e79b-4601-90a7-4ba78a1cb4e5"],
            "x_acme_note": "vendor specific"
        }));
        let step = decode_step("test", raw).unwrap();
        assert_eq!(step.extra()["x_acme_note"], "vendor specific");

        let encoded = serde_json::to_value(&step).unwrap();
        assert_eq!(encoded["x_acme_note"], "vendor specific");
        assert_eq!(encoded["type"], "while-condition");
    }

    #[test]
    fn serialized_steps_lead_with_the_type_discriminator() {
        let mut step = WorkflowStep::new_if();
        if let WorkflowStep::If(s) = &mut step {
            s.condition = Some("severity > 70".to_string());
        }
        let text = serde_json::to_string(&step).unwrap();
        assert!(text.starts_with(r#"{"type":"if-condition""#), "got: {text}");
    }

    #[test]
    fn constructors_generate_prefixed_ids() {
        let step = WorkflowStep::new_parallel();
        let id = step.common().id.clone().unwrap();
        assert!(id.starts_with("parallel--"));
        assert!(crate::id::is_valid(&id));
        assert_eq!(step.step_type(), "parallel");
    }

    #[test]
    fn switch_cases_keep_declaration_order() {
        let raw = obj(json!({
            "type": "switch-condition",
            "switch": "alert_kind",
            "cases": {
                "phishing": ["action--11111111-1111-4111-8111-111111111111"],
                "malware": ["action--22222222-2222-4222-8222-222222222222"],
                "other": ["end--33333333-3333-4333-8333-333333333333"]
            }
        }));
        let step = decode_step("test", raw).unwrap();
        let WorkflowStep::Switch(switch) = step else {
            panic!("expected a switch step");
        };
        let labels: Vec<&str> = switch.cases.keys().map(String::as_str).collect();
        assert_eq!(labels, ["phishing", "malware", "other"]);
    }
}
