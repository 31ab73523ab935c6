use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const SCHEMA: &str = r#"ActiveRecord::Schema[7.1].define(version: 2024_01_01_000000) do
  create_enum "status", ["draft", "published"]

  create_table "users" do |t|
    t.string "name", null: false
    t.integer "age"
    t.enum "status", enum_type: "status", default: "draft"
  end
end
"#;

/// Helper to get the tspec binary command, always on the built-in parser.
#[allow(deprecated)]
fn tspec(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("tspec").unwrap();
    cmd.current_dir(dir.path()).env_remove("TSPEC_DISABLE_NATIVE");
    cmd
}

fn workspace() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("schema.rb"), SCHEMA).unwrap();
    dir
}

#[test]
fn test_help_exits_zero() {
    let dir = TempDir::new().unwrap();
    tspec(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("TypeSpec"));
}

#[test]
fn test_generate_writes_documents() {
    let dir = workspace();
    tspec(&dir)
        .args(["generate", "schema.rb", "-o", "types"])
        .assert()
        .success()
        .stdout(predicate::str::contains("✓ generated 2 documents"));

    let users = fs::read_to_string(dir.path().join("types/Users.tsp")).unwrap();
    assert_eq!(
        users,
        "model Users {\n  name: string;\n  age?: int32;\n  @doc(\"default: draft\")\n  status?: Status;\n}\n"
    );
    let status = fs::read_to_string(dir.path().join("types/Status.tsp")).unwrap();
    assert_eq!(
        status,
        "enum Status {\n  DRAFT: \"draft\";\n  PUBLISHED: \"published\";\n}\n"
    );
}

#[test]
fn test_generate_dry_run_uses_namespace_flag() {
    let dir = workspace();
    tspec(&dir)
        .args(["generate", "schema.rb", "--dry-run", "--namespace", "App.Models"])
        .assert()
        .success()
        .stdout(predicate::str::contains("── Users.tsp ──"))
        .stdout(predicate::str::contains("namespace App.Models;\n\nmodel Users {"));

    assert!(!dir.path().join("Users.tsp").exists());
}

#[test]
fn test_generate_reads_namespace_from_config() {
    let dir = workspace();
    fs::write(dir.path().join("tspec.toml"), "namespace = \"FromFile\"\n").unwrap();
    tspec(&dir)
        .args(["generate", "schema.rb", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("namespace FromFile;"));
}

#[test]
fn test_invalid_config_is_reported() {
    let dir = workspace();
    fs::write(dir.path().join("custom.toml"), "namespace = 3\n").unwrap();
    tspec(&dir)
        .args(["--config", "custom.toml", "check", "schema.rb"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to parse custom.toml"));
}

#[test]
fn test_generate_fails_on_syntax_errors() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("broken.rb"), "create_table \"users\" do |t|\n").unwrap();
    tspec(&dir)
        .args(["generate", "broken.rb", "-o", "out"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error: broken.rb:"));

    assert!(!dir.path().join("out").exists());
}

#[test]
fn test_parse_prints_json() {
    let dir = workspace();
    tspec(&dir)
        .args(["parse", "schema.rb"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"className\": \"Users\""))
        .stdout(predicate::str::contains("\"enumName\": \"Status\""));
}

#[test]
fn test_check_summarizes_schema() {
    let dir = workspace();
    tspec(&dir)
        .args(["check", "schema.rb"])
        .assert()
        .success()
        .stdout(predicate::str::contains("✓ schema.rb (1 table, 1 enum):"))
        .stdout(predicate::str::contains("model Users ← users (3 columns)"));
}

#[test]
fn test_check_reports_syntax_errors() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("bad.rb"), "create_table \"a\" do |t|\n  t.integer \"x\", 1 + 2\nend\n")
        .unwrap();
    tspec(&dir)
        .args(["check", "bad.rb"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unsupported operator"));
}

#[test]
fn test_missing_schema_fails() {
    let dir = TempDir::new().unwrap();
    tspec(&dir)
        .args(["generate", "nope.rb"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read schema"));
}

#[test]
fn test_completions_for_bash() {
    let dir = TempDir::new().unwrap();
    tspec(&dir)
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("tspec"));
}
