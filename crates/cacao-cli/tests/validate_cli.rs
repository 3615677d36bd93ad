#![allow(deprecated)]
//! Integration tests for `cacao validate`.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn cacao_cmd() -> Command {
    Command::cargo_bin("cacao").unwrap()
}

const VALID_PLAYBOOK: &str = r#"{
  "type": "playbook",
  "spec_version": "2.0",
  "id": "playbook--44444444-bbbb-4fbb-9e11-2b7b6e7bf2c9",
  "name": "Block outbound beacon",
  "playbook_types": ["mitigation"],
  "created_by": "identity--5abe695c-7bd5-4c31-8824-2528696cdbf1",
  "created": "2024-04-02T09:00:00.000Z",
  "modified": "2024-04-02T09:00:00.000Z"
}"#;

#[test]
fn valid_playbook_from_stdin_exits_0() {
    cacao_cmd()
        .arg("validate")
        .write_stdin(VALID_PLAYBOOK)
        .assert()
        .success()
        .stdout(predicate::str::contains("Object valid: true"))
        .stdout(predicate::str::contains("Error Count: 0"));
}

#[test]
fn valid_playbook_from_file_exits_0() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("playbook.json");
    std::fs::write(&path, VALID_PLAYBOOK).unwrap();

    cacao_cmd().arg("validate").arg(&path).assert().success();
}

#[test]
fn broken_playbook_exits_1_and_lists_problems() {
    let broken = VALID_PLAYBOOK.replace("\"name\": \"Block outbound beacon\",\n", "");

    cacao_cmd()
        .arg("validate")
        .write_stdin(broken)
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Object valid: false"))
        .stdout(predicate::str::contains(
            "-- the name property is required but missing",
        ))
        .stdout(predicate::str::contains("++").not());
}

#[test]
fn debug_flag_includes_passing_checks() {
    cacao_cmd()
        .args(["validate", "--debug"])
        .write_stdin(VALID_PLAYBOOK)
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "++ the type property does contain a value of playbook or playbook-template",
        ));
}

#[test]
fn undecodable_input_exits_2() {
    cacao_cmd()
        .arg("validate")
        .write_stdin("this is not json")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("schema mismatch"));
}

#[test]
fn unknown_step_type_is_a_decode_error() {
    let doc = r#"{
      "type": "playbook",
      "workflow": {
        "step--f7262b34-4dbb-4dd3-8ab7-58e53e5a6253": { "type": "noop" }
      }
    }"#;

    cacao_cmd()
        .arg("validate")
        .write_stdin(doc)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("unknown workflow step type value: noop"));
}
