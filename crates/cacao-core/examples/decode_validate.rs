//! Decodes a playbook document, validates it and prints the capability
//! summary.

use cacao_core::playbook::codec;

const DOCUMENT: &str = r#"{
  "type": "playbook",
  "spec_version": "2.0",
  "id": "playbook--61a6c41e-6efc-4516-a242-dfbc5c89d562",
  "name": "Prevent FuzzyPanda Malware",
  "description": "This playbook will block traffic to the FuzzyPanda data exfil site",
  "playbook_types": ["prevention"],
  "created_by": "identity--5abe695c-7bd5-4c31-8824-2528696cdbf1",
  "created": "2026-02-19T08:00:24.918Z",
  "modified": "2026-02-19T08:00:24.918Z",
  "priority": 3,
  "severity": 70,
  "impact": 5,
  "labels": ["malware", "fuzzypanda", "apt"],
  "workflow_start": "start--07bea005-4a36-4a77-bd1f-79a6e4682a13",
  "workflow": {
    "start--07bea005-4a36-4a77-bd1f-79a6e4682a13": {
      "type": "start",
      "on_completion": "if-condition--26b51a46-8b7c-43ed-bb5e-13a17e752a2e"
    },
    "if-condition--26b51a46-8b7c-43ed-bb5e-13a17e752a2e": {
      "type": "if-condition",
      "name": "Check beacon volume",
      "condition": "__beacon_count__:value > 10",
      "on_true": ["action--2e55ee69-4281-4771-9149-2b3701879388"],
      "on_completion": "end--6b23c237-ade8-4d00-9aa1-75999738d557"
    },
    "action--2e55ee69-4281-4771-9149-2b3701879388": {
      "type": "action",
      "name": "Block the exfil site",
      "delay": 5000,
      "commands": [
        { "type": "bash", "command": "iptables -A OUTPUT -d 1.2.3.4 -j DROP" }
      ],
      "on_completion": "end--6b23c237-ade8-4d00-9aa1-75999738d557"
    },
    "end--6b23c237-ade8-4d00-9aa1-75999738d557": { "type": "end" }
  }
}"#;

fn main() -> anyhow::Result<()> {
    let playbook = codec::decode_from_str(DOCUMENT)?;

    let (valid, count, details) = playbook.validate(true);
    println!("Object valid: {valid}");
    println!("Error Count: {count}");
    println!();
    println!("Details:");
    for record in &details {
        println!("{record}");
    }

    println!();
    println!("Workflow steps: {}", playbook.workflow.len());
    println!("Features: {}", serde_json::to_string(&playbook.features())?);
    Ok(())
}
