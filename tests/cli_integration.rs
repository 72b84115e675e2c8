//! Integration tests for the `tm` CLI.
//!
//! Each test creates a temp vault directory, runs `tm` as a subprocess,
//! and verifies stdout and/or file contents.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Get the path to the built `tm` binary.
fn tm_bin() -> PathBuf {
    // cargo test builds to target/debug/
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps/
    path.push("tm");
    path
}

/// Create a small vault with a TODO/DOING/DONE status model.
fn create_test_vault(root: &Path) {
    fs::create_dir_all(root.join(".tickmark")).unwrap();
    fs::write(
        root.join(".tickmark/config.toml"),
        r#"[status]
cycle = ["TODO", "DOING", "DONE"]

[status.marks]
TODO = " "
DOING = "/"
DONE = "x"
"#,
    )
    .unwrap();

    fs::write(
        root.join("daily.md"),
        "\
# Today

- [ ] Write report #work
- [/] Review PR
- [x] Buy milk ✅ 2024-01-15

> [!todo] Errands
> - [ ] Post office
",
    )
    .unwrap();

    fs::create_dir_all(root.join("notes")).unwrap();
    fs::write(
        root.join("notes/templates.md"),
        "# Templates\n\n## Task Templates\n\n",
    )
    .unwrap();
}

/// Run `tm` with the given args in the given directory, returning (stdout, stderr, success).
fn run_tm(dir: &Path, args: &[&str]) -> (String, String, bool) {
    let output = Command::new(tm_bin())
        .args(args)
        .current_dir(dir)
        .output()
        .expect("failed to run tm");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (stdout, stderr, output.status.success())
}

/// Run `tm` expecting success, return stdout.
fn run_tm_ok(dir: &Path, args: &[&str]) -> String {
    let (stdout, stderr, success) = run_tm(dir, args);
    if !success {
        panic!(
            "tm {:?} failed:\nstdout: {}\nstderr: {}",
            args, stdout, stderr
        );
    }
    stdout
}

fn read(root: &Path, file: &str) -> String {
    fs::read_to_string(root.join(file)).unwrap()
}

fn today() -> String {
    chrono::Local::now().date_naive().format("%Y-%m-%d").to_string()
}

// ---------------------------------------------------------------------------
// Init
// ---------------------------------------------------------------------------

#[test]
fn test_init_writes_default_config() {
    let tmp = tempfile::TempDir::new().unwrap();
    let out = run_tm_ok(tmp.path(), &["init"]);
    assert!(out.contains("Initialized tickmark config"));

    let config = read(tmp.path(), ".tickmark/config.toml");
    assert!(config.contains("[status]"));
    assert!(config.contains("In Progress"));

    let (_, stderr, success) = run_tm(tmp.path(), &["init"]);
    assert!(!success);
    assert!(stderr.contains("already exists"));

    run_tm_ok(tmp.path(), &["init", "--force"]);
}

// ---------------------------------------------------------------------------
// Cycle
// ---------------------------------------------------------------------------

#[test]
fn test_cycle_uses_stored_mark() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_vault(tmp.path());

    let out = run_tm_ok(tmp.path(), &["cycle", "daily.md", "--section-start", "2", "--line", "0"]);
    assert_eq!(out.trim(), "line 2: [ ] → [/] DOING");
    assert!(read(tmp.path(), "daily.md").contains("- [/] Write report #work"));
}

#[test]
fn test_cycle_to_done_reports_completion() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_vault(tmp.path());

    let out = run_tm_ok(tmp.path(), &["cycle", "daily.md", "--line", "3"]);
    assert!(out.contains("completed: Review PR"));
    assert!(out.contains("[/] → [x] DONE"));
    assert!(read(tmp.path(), "daily.md").contains("- [x] Review PR\n"));
}

#[test]
fn test_cycle_out_of_done_strips_date() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_vault(tmp.path());

    run_tm_ok(tmp.path(), &["cycle", "daily.md", "--line", "4"]);
    let doc = read(tmp.path(), "daily.md");
    assert!(doc.contains("- [ ] Buy milk\n"));
    assert!(!doc.contains("✅"));
}

#[test]
fn test_cycle_in_callout_container() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_vault(tmp.path());

    let doc = read(tmp.path(), "daily.md");
    let start = doc[..doc.find("> [!todo]").unwrap()].chars().count();
    let end = doc.chars().count();
    let range = format!("{}..{}", start, end);

    let out = run_tm_ok(tmp.path(), &["--json", "cycle", "daily.md", "--container", &range, "--line", "1"]);
    let json: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(json["changed"], true);
    assert_eq!(json["lineIndex"], 7);
    assert!(read(tmp.path(), "daily.md").contains("> - [/] Post office"));
}

#[test]
fn test_cycle_with_stale_mark_is_silent_and_logged() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_vault(tmp.path());
    let before = read(tmp.path(), "daily.md");

    let out = run_tm_ok(tmp.path(), &["cycle", "daily.md", "--line", "0", "--mark", " "]);
    assert_eq!(out.trim(), "no change");
    assert_eq!(read(tmp.path(), "daily.md"), before);

    let log = run_tm_ok(tmp.path(), &["log"]);
    assert!(log.contains("unresolved: status cycle skipped"));
    assert!(log.contains("line 0 is not a task"));
}

#[test]
fn test_cycle_out_of_bounds_line_fails() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_vault(tmp.path());

    let (_, stderr, success) = run_tm(tmp.path(), &["cycle", "daily.md", "--line", "99"]);
    assert!(!success);
    assert!(stderr.contains("outside the document"));
}

// ---------------------------------------------------------------------------
// Duplicate
// ---------------------------------------------------------------------------

#[test]
fn test_dup_same_file() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_vault(tmp.path());

    let out = run_tm_ok(tmp.path(), &["dup", "daily.md", "4"]);
    assert_eq!(out.trim(), "Task duplicated in same file");

    let doc = read(tmp.path(), "daily.md");
    let expected = format!(
        "- [x] Buy milk ✅ 2024-01-15\n- [ ] Buy milk (duplicated {})\n",
        today()
    );
    assert!(doc.contains(&expected), "got:\n{}", doc);
}

#[test]
fn test_dup_to_section() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_vault(tmp.path());

    let out = run_tm_ok(
        tmp.path(),
        &["dup", "daily.md", "4", "--to", "notes/templates.md", "--section", "Task Templates"],
    );
    assert_eq!(
        out.trim(),
        "Task duplicated to notes/templates.md (section: Task Templates)"
    );
    assert_eq!(
        read(tmp.path(), "notes/templates.md"),
        format!(
            "# Templates\n\n## Task Templates\n- [ ] Buy milk (duplicated {})\n\n",
            today()
        )
    );
}

#[test]
fn test_dup_creates_target() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_vault(tmp.path());

    run_tm_ok(tmp.path(), &["dup", "daily.md", "2", "--to", "someday.md", "--keep-metadata"]);
    assert_eq!(
        read(tmp.path(), "someday.md"),
        format!("- [ ] Write report #work (duplicated {})\n", today())
    );
}

#[test]
fn test_dup_target_creation_failure() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_vault(tmp.path());
    let before = read(tmp.path(), "daily.md");

    let (_, stderr, success) = run_tm(tmp.path(), &["dup", "daily.md", "2", "--to", "missing/dir/x.md"]);
    assert!(!success);
    assert!(stderr.contains("Failed to create target file: missing/dir/x.md"));
    assert_eq!(read(tmp.path(), "daily.md"), before);
}

#[test]
fn test_dup_missing_source_json() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_vault(tmp.path());

    let (stdout, _, success) = run_tm(tmp.path(), &["--json", "dup", "nope.md", "0"]);
    assert!(!success);
    let json: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(json["success"], false);
    assert_eq!(json["error"], "Source file not found: nope.md");
}

#[test]
fn test_dup_to_canvas_is_unsupported() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_vault(tmp.path());

    let (_, stderr, success) = run_tm(tmp.path(), &["dup", "daily.md", "2", "--to", "board.canvas"]);
    assert!(!success);
    assert!(stderr.contains("canvas documents are not supported by this build"));
}

// ---------------------------------------------------------------------------
// Describe / next / log
// ---------------------------------------------------------------------------

#[test]
fn test_describe() {
    let tmp = tempfile::TempDir::new().unwrap();
    assert_eq!(
        run_tm_ok(tmp.path(), &["describe"]).trim(),
        "Duplicate task in same file"
    );
    assert_eq!(
        run_tm_ok(tmp.path(), &["describe", "--to", "t.md", "--section", "Later"]).trim(),
        "Duplicate task to t.md (section: Later)"
    );
}

#[test]
fn test_next_follows_config() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_vault(tmp.path());

    assert_eq!(run_tm_ok(tmp.path(), &["next", " "]).trim(), "[ ] TODO → [/] DOING");
    assert_eq!(run_tm_ok(tmp.path(), &["next", "x"]).trim(), "[x] DONE → [ ] TODO");

    let out = run_tm_ok(tmp.path(), &["--json", "next", "/"]);
    let json: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(json["next_state"], "DONE");
    assert_eq!(json["entering_done"], true);
}

#[test]
fn test_next_defaults_without_vault() {
    let tmp = tempfile::TempDir::new().unwrap();
    assert_eq!(
        run_tm_ok(tmp.path(), &["next", "/"]).trim(),
        "[/] In Progress → [x] Completed"
    );
}

#[test]
fn test_log_empty() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_vault(tmp.path());
    assert_eq!(run_tm_ok(tmp.path(), &["log"]).trim(), "recovery log is empty");
    assert_eq!(run_tm_ok(tmp.path(), &["--json", "log"]).trim(), "[]");
}

#[test]
fn test_vault_dir_flag_from_subdirectory() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_vault(tmp.path());

    // config discovered by walking up from notes/
    let out = run_tm_ok(&tmp.path().join("notes"), &["next", " "]);
    assert_eq!(out.trim(), "[ ] TODO → [/] DOING");

    let other = tempfile::TempDir::new().unwrap();
    let vault = tmp.path().to_str().unwrap();
    let out = run_tm_ok(other.path(), &["-C", vault, "cycle", "daily.md", "--line", "3"]);
    assert!(out.contains("[/] → [x] DONE"));
}
