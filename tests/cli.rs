use pretty_assertions::assert_eq;
use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

const MANIFEST: &str = "\
name: demo # deployment name
instance_groups:
- name: web
  jobs:
  - name: nginx
    release: nginx
";

fn yasak(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_yasak"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

fn fixture() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("manifest.yml"), MANIFEST).unwrap();
    dir
}

fn manifest(dir: &TempDir) -> String {
    dir.path().join("manifest.yml").to_string_lossy().to_string()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

#[test]
fn test_locate_value() {
    let dir = fixture();
    let output = yasak(&[
        "locate",
        &manifest(&dir),
        "-p",
        "/instance_groups/name=web/jobs/name=nginx/release",
    ]);

    assert_eq!(output.status.code(), Some(0));
    assert_eq!(stdout(&output), "6\t14\t\n");
    assert_eq!(stderr(&output), "");
}

#[test]
fn test_locate_collection() {
    let dir = fixture();

    let output = yasak(&["locate", &manifest(&dir), "-p", "/instance_groups/name=web"]);
    assert_eq!(output.status.code(), Some(0));
    assert_eq!(stdout(&output), "3\t3\t\n");

    let output = yasak(&["locate", &manifest(&dir), "-p", "/instance_groups"]);
    assert_eq!(stdout(&output), "3\t1\t\n");
}

#[test]
fn test_locate_with_comment_as_json() {
    let dir = fixture();
    let output = yasak(&["locate", &manifest(&dir), "--path", "/name", "--format", "json"]);

    assert_eq!(output.status.code(), Some(0));
    let value: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(value["line"], 1);
    assert_eq!(value["column"], 7);
    assert_eq!(value["comment"], "# deployment name");
}

#[test]
fn test_absent_optional_key() {
    let dir = fixture();
    let output = yasak(&["locate", &manifest(&dir), "-p", "/update?/canaries"]);

    assert_eq!(output.status.code(), Some(0));
    assert_eq!(stdout(&output), "");
}

#[test]
fn test_resolution_error_exits_one() {
    let dir = fixture();
    let output = yasak(&["locate", &manifest(&dir), "-p", "/instance_groups/name=db"]);

    assert_eq!(output.status.code(), Some(1));
    assert_eq!(stdout(&output), "");
    assert_eq!(
        stderr(&output),
        "Expected to find exactly one matching array item for path '/instance_groups/name=db' but found 0\n"
    );
}

#[test]
fn test_silent_mode() {
    let dir = fixture();

    let output = yasak(&["-s", "locate", &manifest(&dir), "-p", "/missing"]);
    assert_eq!(output.status.code(), Some(0));
    assert_eq!(stdout(&output), "");
    assert_eq!(stderr(&output), "");

    let output = yasak(&["--silent", "locate", &manifest(&dir), "-p", "missing"]);
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).starts_with("ERROR: invalid path: 'missing'"));
}

#[test]
fn test_invalid_path() {
    let dir = fixture();
    let output = yasak(&["locate", &manifest(&dir), "-p", "/name:prev"]);

    assert_eq!(output.status.code(), Some(2));
    let message = stderr(&output);
    assert!(message.starts_with("ERROR: invalid path: '/name:prev' ("));
    assert!(message.contains(
        "Please consult <https://github.com/cppforlife/go-patch/blob/master/docs/examples.md> for reference."
    ));
}

#[test]
fn test_missing_file() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("absent.yml");
    let output = yasak(&["locate", &missing.to_string_lossy(), "-p", "not-a-path"]);

    assert_eq!(output.status.code(), Some(2));
    assert_eq!(
        stderr(&output),
        format!("ERROR: file does not exist: '{}'\n", missing.display())
    );
}

#[test]
fn test_invalid_yaml() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("broken.yml");
    fs::write(&file, "key: [unclosed\n").unwrap();

    let output = yasak(&["locate", &file.to_string_lossy(), "-p", "/key"]);
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).starts_with(&format!(
        "ERROR: invalid YAML content in file: '{}' (",
        Path::new(&file).display()
    )));
}

#[test]
fn test_version_flag() {
    let output = yasak(&["-v"]);
    assert_eq!(output.status.code(), Some(0));
    assert!(stdout(&output).contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_path_flag_is_required() {
    let dir = fixture();
    let output = yasak(&["locate", &manifest(&dir)]);
    assert_eq!(output.status.code(), Some(2));
}
