//! Command-line behaviour of the `parley` binary.

use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;

fn parley() -> Command {
    Command::cargo_bin("parley").unwrap()
}

#[test]
fn help_lists_commands() {
    parley()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("roster"))
        .stdout(predicate::str::contains("replay"));
}

#[test]
fn send_requires_content() {
    parley()
        .args(["send", "A"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Must specify message text or --image"));
}

#[test]
fn replay_prints_final_state() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{
            "roster": {{ "success": true, "users": [{{ "_id": "A" }}, {{ "_id": "B" }}], "unseenMessages": {{ "B": 1 }} }},
            "steps": [
                {{ "open": "A" }},
                {{ "push": {{ "_id": "m1", "senderId": "A", "text": "hello there" }} }},
                {{ "push": {{ "_id": "m2", "senderId": "B", "text": "psst" }} }}
            ]
        }}"#
    )
    .unwrap();

    parley()
        .arg("replay")
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Active: A"))
        .stdout(predicate::str::contains("A: hello there"))
        .stdout(predicate::str::contains("B: 2"))
        .stdout(predicate::str::contains("Acknowledged: m1"))
        .stdout(predicate::str::contains("Max handlers: 1"));
}

#[test]
fn replay_rejects_malformed_scenario() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "{{ \"steps\": [{{ \"dance\": true }}] }}").unwrap();

    parley()
        .arg("replay")
        .arg(file.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid scenario"));
}

#[test]
fn missing_config_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    parley()
        .arg("--config")
        .arg(dir.path().join("absent.toml"))
        .arg("roster")
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read config file"));
}
