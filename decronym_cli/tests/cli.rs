use assert_cmd::Command;
use decronym_test_utils::DefinitionFileBuilder;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// A config file with one local definitions file and a private cache dir
struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let defs = DefinitionFileBuilder::new()
            .with_source("team glossary")
            .define_with(
                "DMA",
                "Direct Memory Access",
                "Hardware moves data without the CPU",
                &["hardware"],
            )
            .define_with("DME", "Distance Measuring Equipment", "", &["aviation"])
            .write_to(dir.path(), "defs.json");

        let config = format!(
            "[cache]\ndir = {:?}\n\n[[sources]]\ntype = \"json_file\"\nlocation = {:?}\n",
            dir.path().join("cache").display().to_string(),
            defs.display().to_string(),
        );
        fs::write(dir.path().join("config.toml"), config).unwrap();
        Self { dir }
    }

    fn config_path(&self) -> PathBuf {
        self.dir.path().join("config.toml")
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("decronym").unwrap();
        cmd.env("NO_COLOR", "1")
            .env_remove("DECRONYM_USERNAME")
            .env_remove("DECRONYM_PASSWORD")
            .arg("--config")
            .arg(self.config_path());
        cmd
    }
}

#[test]
fn test_version() {
    let mut cmd = Command::cargo_bin("decronym").unwrap();
    cmd.arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_find_in_local_file() {
    let workspace = Workspace::new();
    workspace
        .cmd()
        .args(["find", "dma"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Direct Memory Access"))
        .stdout(predicate::str::contains("[hardware]"))
        .stdout(predicate::str::contains("from: team glossary"));
}

#[test]
fn test_find_not_found_suggests() {
    let workspace = Workspace::new();
    workspace
        .cmd()
        .args(["find", "DMA", "DMX"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No entries for 'DMX' found!"))
        .stdout(predicate::str::contains("Suggested:"));
}

#[test]
fn test_find_tag_filter() {
    let workspace = Workspace::new();
    workspace
        .cmd()
        .args(["find", "DMA", "DME", "-t", "aviation"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Distance Measuring Equipment"))
        .stdout(predicate::str::contains("try running without tags"))
        .stdout(predicate::str::contains("Direct Memory Access").not());
}

#[test]
fn test_find_json_output() {
    let workspace = Workspace::new();
    let output = workspace
        .cmd()
        .args(["find", "DMA", "--format", "json"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value[0]["status"], "matched");
    assert_eq!(value[0]["records"][0]["full"], "Direct Memory Access");
}

#[test]
fn test_find_only_invalid_acronyms_is_misuse() {
    let workspace = Workspace::new();
    workspace
        .cmd()
        .args(["find", "#$%"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("No valid acronyms given"));
}

#[test]
fn test_find_requires_an_acronym() {
    let workspace = Workspace::new();
    workspace.cmd().arg("find").assert().failure();
}

#[test]
fn test_clean_removes_cache_files() {
    let workspace = Workspace::new();
    workspace.cmd().args(["find", "DMA"]).assert().success();

    workspace
        .cmd()
        .arg("clean")
        .assert()
        .success()
        .stderr(predicate::str::contains("Removed 1 cache files"));
}

#[test]
fn test_sources_add_list_and_duplicate() {
    let workspace = Workspace::new();
    workspace
        .cmd()
        .args(["sources", "add", "wikipedia", "https://en.wikipedia.org/wiki/", "--disabled"])
        .assert()
        .success();

    workspace
        .cmd()
        .args(["sources", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("json_file"))
        .stdout(predicate::str::contains("[ ] | wikipedia"));

    workspace
        .cmd()
        .args(["sources", "add", "wikipedia", "https://en.wikipedia.org/wiki/"])
        .assert()
        .code(2);
}

#[test]
fn test_sources_add_unknown_type_suggests() {
    let workspace = Workspace::new();
    workspace
        .cmd()
        .args(["sources", "add", "wikipeda", "https://en.wikipedia.org/wiki/"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Did you mean 'wikipedia'?"));
}

#[test]
fn test_confluence_source_needs_page_id() {
    let workspace = Workspace::new();
    workspace
        .cmd()
        .args(["sources", "add", "confluence_table", "https://wiki.example.com"])
        .assert()
        .code(2);
}

#[test]
fn test_config_init_and_get() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("config.toml");
    let cmd = || {
        let mut cmd = Command::cargo_bin("decronym").unwrap();
        cmd.env("NO_COLOR", "1").arg("--config").arg(&path);
        cmd
    };

    cmd().args(["config", "init"]).assert().success();
    assert!(path.exists());

    cmd()
        .args(["config", "get", "lookup.concurrency"])
        .assert()
        .success()
        .stdout("8\n");
    cmd()
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
    cmd()
        .args(["sources", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("timedate"));
}

#[test]
fn test_config_set_rejects_bad_value() {
    let workspace = Workspace::new();
    workspace
        .cmd()
        .args(["config", "set", "network.timeout_seconds", "0"])
        .assert()
        .failure();
}

#[test]
fn test_completions() {
    let mut cmd = Command::cargo_bin("decronym").unwrap();
    cmd.args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("decronym"));
}
