//! CLI behavior tests: exit codes, output formats, config, init.

mod common;

use assert_cmd::Command;
use common::{wordnet_fixture, ESSAY_DIR, FLAWED_ESSAY, GOOD_ESSAY};
use predicates::prelude::*;
use std::fs;

fn lexigrade_cmd() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_lexigrade"));
    cmd.env("NO_COLOR", "1");
    cmd
}

fn parse_stdout(output: &std::process::Output) -> serde_json::Value {
    let s = String::from_utf8_lossy(&output.stdout);
    serde_json::from_str(s.trim()).expect("valid JSON")
}

#[test]
fn no_args_returns_error_not_panic() {
    let mut cmd = lexigrade_cmd();
    cmd.assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("PATH"));
}

#[test]
fn single_essay_console_output() {
    let mut cmd = lexigrade_cmd();
    cmd.arg(GOOD_ESSAY);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Subject-Verb Agreement"))
        .stdout(predicate::str::contains("LOW"));
}

#[test]
fn json_output_valid() {
    let mut cmd = lexigrade_cmd();
    cmd.arg(FLAWED_ESSAY).arg("--json");
    let output = cmd.output().unwrap();
    assert!(output.status.success());
    let parsed = parse_stdout(&output);
    assert_eq!(parsed["essayId"], "flawed-001");
    assert_eq!(parsed["grade"], "low");
    assert_eq!(parsed["scores"]["grammar"], 1);
    assert!(!parsed["findings"].as_array().unwrap().is_empty());
}

#[test]
fn file_not_found_exit_2() {
    let mut cmd = lexigrade_cmd();
    cmd.arg("nonexistent.json");
    cmd.assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("Path does not exist"));
}

#[test]
fn empty_directory_exit_2() {
    let dir = tempfile::TempDir::new().unwrap();
    let mut cmd = lexigrade_cmd();
    cmd.arg(dir.path());
    cmd.assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("No essay files found"));
}

#[test]
fn directory_grades_every_essay_with_summary() {
    let mut cmd = lexigrade_cmd();
    cmd.arg(ESSAY_DIR).arg("--json");
    let output = cmd.output().unwrap();
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let parsed = parse_stdout(&output);
    assert!(parsed.get("generatedAt").is_some());
    assert_eq!(parsed["summary"]["essaysGraded"], 3);
    assert_eq!(parsed["results"].as_array().unwrap().len(), 3);
}

#[test]
fn config_ignore_and_cutoff_apply() {
    let dir = tempfile::TempDir::new().unwrap();
    let config = dir.path().join("grading.json");
    fs::write(
        &config,
        r#"{ "ignore": ["**/drafts/**"], "model": { "cutoff": -10.0 } }"#,
    )
    .unwrap();

    let mut cmd = lexigrade_cmd();
    cmd.arg(ESSAY_DIR).arg("--json").arg("--config").arg(&config);
    let output = cmd.output().unwrap();
    assert!(output.status.success());
    let parsed = parse_stdout(&output);
    assert_eq!(parsed["summary"]["essaysGraded"], 2);
    assert_eq!(parsed["summary"]["high"], 2);
}

#[test]
fn missing_config_file_exit_2() {
    let mut cmd = lexigrade_cmd();
    cmd.arg(GOOD_ESSAY).arg("--config").arg("/no/such/config.json");
    cmd.assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("Config file not found"));
}

#[test]
fn wordnet_flag_enables_topic_relevance() {
    let dict = wordnet_fixture();
    let mut cmd = lexigrade_cmd();
    cmd.arg(GOOD_ESSAY).arg("--json").arg("--wordnet").arg(dict.path());
    let output = cmd.output().unwrap();
    assert!(output.status.success());
    let parsed = parse_stdout(&output);
    assert_eq!(parsed["scores"]["topicRelevance"], 4);
    assert_eq!(parsed["scores"]["spelling"], 0);
}

#[test]
fn topic_flag_overrides_essay_topic() {
    let dict = wordnet_fixture();
    let mut cmd = lexigrade_cmd();
    cmd.arg(GOOD_ESSAY)
        .arg("--json")
        .arg("--wordnet")
        .arg(dict.path())
        .arg("--topic")
        .arg("City parks");
    let output = cmd.output().unwrap();
    assert!(output.status.success());
    let parsed = parse_stdout(&output);
    assert_eq!(parsed["scores"]["topicRelevance"], 0);
    let unrelated = parsed["findings"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|f| f["feature"] == "topic-relevance")
        .count();
    assert_eq!(unrelated, 3);
}

#[test]
fn missing_wordnet_directory_exit_2() {
    let mut cmd = lexigrade_cmd();
    cmd.arg(GOOD_ESSAY).arg("--wordnet").arg("/no/such/dict");
    cmd.assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("WordNet directory not found"));
}

#[test]
fn broken_essay_still_reports_others() {
    let dir = tempfile::TempDir::new().unwrap();
    fs::copy(GOOD_ESSAY, dir.path().join("good.json")).unwrap();
    fs::write(dir.path().join("broken.json"), "{ nope").unwrap();

    let mut cmd = lexigrade_cmd();
    cmd.arg(dir.path()).arg("--quiet");
    cmd.assert()
        .failure()
        .code(2)
        .stdout(predicate::str::contains("good.json"));
}

#[test]
fn quiet_prints_one_line_per_essay() {
    let mut cmd = lexigrade_cmd();
    cmd.arg(ESSAY_DIR).arg("--quiet");
    let output = cmd.output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.lines().count(), 3);
    assert!(stdout.contains("flawed.json"));
}

#[test]
fn parallel_with_jobs_matches_sequential() {
    let sequential = lexigrade_cmd()
        .arg(ESSAY_DIR)
        .arg("--quiet")
        .output()
        .unwrap();
    let parallel = lexigrade_cmd()
        .arg(ESSAY_DIR)
        .arg("--quiet")
        .arg("--parallel")
        .arg("--jobs")
        .arg("2")
        .output()
        .unwrap();
    assert!(parallel.status.success());
    assert_eq!(sequential.stdout, parallel.stdout);
}

#[test]
fn init_creates_config() {
    let dir = tempfile::TempDir::new().unwrap();
    let config_path = dir.path().join(".lexigraderc.json");
    let mut cmd = lexigrade_cmd();
    cmd.arg("init").arg("--dir").arg(dir.path());
    cmd.assert().success();
    assert!(config_path.exists(), ".lexigraderc.json should be created");
    let content = fs::read_to_string(&config_path).unwrap();
    assert!(content.contains("wordnet"));
    assert!(content.contains("\"mode\": \"off\""));
}

#[test]
fn init_does_not_overwrite() {
    let dir = tempfile::TempDir::new().unwrap();
    let config_path = dir.path().join(".lexigraderc.json");
    fs::write(&config_path, "{}").unwrap();
    let mut cmd = lexigrade_cmd();
    cmd.arg("init").arg("--dir").arg(dir.path());
    cmd.assert()
        .success()
        .stderr(predicate::str::contains("already exists"));
    assert_eq!(fs::read_to_string(&config_path).unwrap(), "{}");
}
