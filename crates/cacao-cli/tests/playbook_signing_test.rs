//! Integration tests for `cacao keygen`, `cacao sign` and `cacao verify`.

use std::process::Command;
use tempfile::TempDir;

fn cacao_cmd() -> Command {
    Command::new(env!("CARGO_BIN_EXE_cacao"))
}

const PLAYBOOK: &str = r#"{
  "type": "playbook",
  "spec_version": "2.0",
  "id": "playbook--44444444-bbbb-4fbb-9e11-2b7b6e7bf2c9",
  "name": "Block outbound beacon",
  "playbook_types": ["mitigation"],
  "created_by": "identity--5abe695c-7bd5-4c31-8824-2528696cdbf1",
  "created": "2024-04-02T09:00:00.000Z",
  "modified": "2024-04-02T09:00:00.000Z"
}"#;

fn keygen(dir: &std::path::Path, algorithm: &str) {
    let output = cacao_cmd()
        .args(["keygen", "--algorithm", algorithm, "--out"])
        .arg(dir)
        .output()
        .expect("failed to run cacao keygen");
    assert!(output.status.success(), "keygen should succeed");
}

#[test]
fn test_keygen_creates_keypair() {
    let tmp = TempDir::new().unwrap();
    let out_dir = tmp.path();

    let output = cacao_cmd()
        .args(["keygen", "--out"])
        .arg(out_dir)
        .output()
        .expect("failed to run cacao keygen");

    assert!(output.status.success(), "keygen should succeed");
    assert!(out_dir.join("private_key.pem").exists());
    assert!(out_dir.join("public_key.pem").exists());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Generated rsa keypair"), "should name the key type");

    // Check private key permissions on Unix
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let metadata = std::fs::metadata(out_dir.join("private_key.pem")).unwrap();
        let mode = metadata.permissions().mode() & 0o777;
        assert_eq!(mode, 0o600, "private key should have mode 0600");
    }
}

#[test]
fn test_keygen_refuses_overwrite_without_force() {
    let tmp = TempDir::new().unwrap();
    let out_dir = tmp.path();

    keygen(out_dir, "p256");

    let output = cacao_cmd()
        .args(["keygen", "--algorithm", "p256", "--out"])
        .arg(out_dir)
        .output()
        .expect("failed to run second keygen");
    assert!(!output.status.success(), "should fail without --force");

    let output = cacao_cmd()
        .args(["keygen", "--algorithm", "p256", "--out"])
        .arg(out_dir)
        .args(["--force"])
        .output()
        .expect("failed to run keygen with --force");
    assert!(output.status.success(), "should succeed with --force");
}

#[test]
fn test_sign_verify_roundtrip() {
    let tmp = TempDir::new().unwrap();
    let key_dir = tmp.path().join("keys");
    std::fs::create_dir_all(&key_dir).unwrap();
    keygen(&key_dir, "p256");

    let playbook_path = tmp.path().join("playbook.json");
    std::fs::write(&playbook_path, PLAYBOOK).unwrap();

    let signed_path = tmp.path().join("signed.json");
    let output = cacao_cmd()
        .arg("sign")
        .arg(&playbook_path)
        .args(["--key"])
        .arg(key_dir.join("private_key.pem"))
        .args(["--algorithm", "ES256", "--signee", "ACME Cyber Company", "--out"])
        .arg(&signed_path)
        .output()
        .expect("sign failed");
    assert!(output.status.success(), "sign should succeed");

    let signed_content = std::fs::read_to_string(&signed_path).unwrap();
    assert!(signed_content.contains("\"signatures\""));
    assert!(signed_content.contains("\"algorithm\": \"ES256\""));
    assert!(signed_content.contains("\"signee\": \"ACME Cyber Company\""));

    // embedded key
    let output = cacao_cmd()
        .arg("verify")
        .arg(&signed_path)
        .output()
        .expect("verify failed");
    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains(": valid"));

    // explicit key
    let output = cacao_cmd()
        .arg("verify")
        .arg(&signed_path)
        .args(["--pubkey"])
        .arg(key_dir.join("public_key.pem"))
        .output()
        .expect("verify failed");
    assert_eq!(output.status.code(), Some(0));
}

#[test]
fn test_legacy_documents_get_the_digest_envelope() {
    let tmp = TempDir::new().unwrap();
    let key_dir = tmp.path().join("keys");
    std::fs::create_dir_all(&key_dir).unwrap();
    keygen(&key_dir, "p256");

    let playbook_path = tmp.path().join("playbook.json");
    std::fs::write(&playbook_path, PLAYBOOK.replace("\"2.0\"", "\"1.0\"")).unwrap();

    let signed_path = tmp.path().join("signed.json");
    let output = cacao_cmd()
        .arg("sign")
        .arg(&playbook_path)
        .args(["--key"])
        .arg(key_dir.join("private_key.pem"))
        .args(["--algorithm", "ES256", "--out"])
        .arg(&signed_path)
        .output()
        .expect("sign failed");
    assert!(output.status.success());

    let signed_content = std::fs::read_to_string(&signed_path).unwrap();
    assert!(signed_content.contains("\"sha256\""), "legacy envelope embeds the digest");

    let output = cacao_cmd()
        .arg("verify")
        .arg(&signed_path)
        .output()
        .expect("verify failed");
    assert_eq!(output.status.code(), Some(0));
}

#[test]
fn test_verify_wrong_key_exits_4() {
    let tmp = TempDir::new().unwrap();
    let key1_dir = tmp.path().join("key1");
    let key2_dir = tmp.path().join("key2");
    std::fs::create_dir_all(&key1_dir).unwrap();
    std::fs::create_dir_all(&key2_dir).unwrap();
    keygen(&key1_dir, "p256");
    keygen(&key2_dir, "p256");

    let playbook_path = tmp.path().join("playbook.json");
    std::fs::write(&playbook_path, PLAYBOOK).unwrap();

    let signed_path = tmp.path().join("signed.json");
    cacao_cmd()
        .arg("sign")
        .arg(&playbook_path)
        .args(["--key"])
        .arg(key1_dir.join("private_key.pem"))
        .args(["--algorithm", "ES256", "--out"])
        .arg(&signed_path)
        .output()
        .unwrap();

    let output = cacao_cmd()
        .arg("verify")
        .arg(&signed_path)
        .args(["--pubkey"])
        .arg(key2_dir.join("public_key.pem"))
        .output()
        .expect("verify failed");
    assert_eq!(output.status.code(), Some(4), "wrong key must exit 4");
}

#[test]
fn test_sign_rejects_unknown_algorithm() {
    let tmp = TempDir::new().unwrap();
    let key_dir = tmp.path().join("keys");
    std::fs::create_dir_all(&key_dir).unwrap();
    keygen(&key_dir, "p256");

    let playbook_path = tmp.path().join("playbook.json");
    std::fs::write(&playbook_path, PLAYBOOK).unwrap();

    let output = cacao_cmd()
        .arg("sign")
        .arg(&playbook_path)
        .args(["--key"])
        .arg(key_dir.join("private_key.pem"))
        .args(["--algorithm", "HS256", "--out"])
        .arg(tmp.path().join("signed.json"))
        .output()
        .expect("sign failed to run");
    assert_eq!(output.status.code(), Some(3), "unsupported algorithm must exit 3");
}
