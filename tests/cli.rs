//! CLI integration tests.
//!
//! Tests the command-line interface by running the binary as a subprocess
//! inside a throwaway project directory.

mod common;

use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};

use common::{build_bibliography, Project, SAMPLE_BIBLIOGRAPHY};

/// Run `refmark` with `args` from `dir`.
fn refmark(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_refmark"))
        .current_dir(dir)
        .args(args)
        .output()
        .expect("Failed to execute command")
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn assert_exit_code(output: &Output, code: i32, what: &str) {
    assert_eq!(
        output.status.code(),
        Some(code),
        "{} should exit with code {}, got {:?}. stderr: {}",
        what,
        code,
        output.status.code(),
        stderr(output)
    );
}

// ============================================
// Tests for CLI argument parsing
// ============================================

#[test]
fn test_cli_help() {
    // Given: The CLI binary
    let dir = tempfile::TempDir::new().unwrap();

    // When: We ask for help
    let output = refmark(dir.path(), &["--help"]);

    // Then: Help names the tool and its subcommands
    let out = stdout(&output);
    assert!(output.status.success(), "Help should exit with success");
    assert!(out.contains("refmark"), "{}", out);
    assert!(out.contains("build"), "{}", out);
    assert!(out.contains("styles"), "{}", out);
}

#[test]
fn test_cli_build_help_mentions_token_syntax() {
    let dir = tempfile::TempDir::new().unwrap();

    let output = refmark(dir.path(), &["build", "--help"]);

    let out = stdout(&output);
    assert!(output.status.success());
    assert!(out.contains("--watch"), "{}", out);
    assert!(out.contains("ref:a,b"), "{}", out);
}

#[test]
fn test_cli_watch_conflicts_with_stdout() {
    let project = Project::new("Text.\n", "");

    let output = refmark(project.dir.path(), &["build", "--watch", "--stdout"]);

    assert!(!output.status.success());
    assert!(stderr(&output).contains("cannot be used with"), "{}", stderr(&output));
}

#[test]
fn test_cli_watch_rejects_stdin() {
    let project = Project::new("", "");

    let output = refmark(project.dir.path(), &["build", "-", "--watch"]);

    assert_exit_code(&output, 17, "Watching stdin");
    assert!(stderr(&output).contains("cannot watch stdin"), "{}", stderr(&output));
}

#[test]
fn test_cli_styles_lists_builtins() {
    let dir = tempfile::TempDir::new().unwrap();

    let output = refmark(dir.path(), &["styles"]);

    assert!(output.status.success());
    let names: Vec<String> = stdout(&output).lines().map(str::to_string).collect();
    assert_eq!(names, vec!["plain".to_string(), "html".to_string()]);
}

// ============================================
// Tests for build command
// ============================================

#[test]
fn test_cli_build_default_layout() {
    // Given: A project with src/index.md and src/references.md
    let project = Project::new(
        "# Paper\n\nAs shown `ref:jones2019,smith2020`.\n\n## References\n\n`references`\n",
        SAMPLE_BIBLIOGRAPHY,
    );

    // When: We run build with no arguments
    let output = refmark(project.dir.path(), &["build"]);

    // Then: out/ holds the resolved markdown, the html page and the stylesheet
    assert!(
        output.status.success(),
        "Build should succeed. stderr: {}",
        stderr(&output)
    );
    let md = project.read("out/index.md");
    assert!(
        md.contains(r#"As shown [<span class="ref">1</span>,<span class="ref">2</span>]."#),
        "{}",
        md
    );
    assert!(md.contains(r#"<li id="ref-1" data-doi="" value="1">Jones, K."#), "{}", md);
    assert!(
        md.contains(r#"<li id="ref-2" data-doi="10.1000/fast.1" value="2">Smith, J."#),
        "{}",
        md
    );

    let html = project.read("out/index.html");
    assert!(html.starts_with("<!doctype html><html><link rel='stylesheet' href='style.css'>"));
    assert!(html.contains("<h1>Paper</h1>"), "{}", html);
    assert!(project.path("out/style.css").is_file());

    // And: the summary and the unused entry warning go to stderr
    let err = stderr(&output);
    assert!(err.contains("resolved 2 citation(s), 0 figure(s), 0 table(s)"), "{}", err);
    assert!(err.contains("unused citation entry: lee2021"), "{}", err);
}

#[test]
fn test_cli_build_explicit_paths() {
    // Given: Inputs in non-default locations
    let project = Project::new("", "");
    fs::write(project.path("paper.md"), "Cite `ref:b`.\n\n`references`\n").unwrap();
    fs::write(project.path("refs.md"), build_bibliography(&["a", "b"])).unwrap();

    // When: We pass them on the command line
    let output = refmark(
        project.dir.path(),
        &["build", "paper.md", "--bib", "refs.md", "-o", "site", "--style", "plain"],
    );

    // Then: Output lands in the requested directory
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let md = project.read("site/index.md");
    assert!(md.contains("Cite [1]."), "{}", md);
    assert!(md.contains("Source b."), "{}", md);
    assert!(!md.contains("Source a."), "{}", md);
}

#[test]
fn test_cli_build_with_project_file() {
    // Given: A refmark.toml declaring a figure and a table
    let project = Project::new(
        "Figure `fig:overview`, Table `tab:results`.\n\n`figures`\n\n`tables`\n",
        "",
    )
    .with_config(
        r#"
style = "plain"

[figures.overview]
caption = "Overview."
src = "overview.svg"

[tables.results]
caption = "Results."
content = "<table><tr><td>42</td></tr></table>"
"#,
    );

    // When: We build
    let output = refmark(project.dir.path(), &["build"]);

    // Then: Both are numbered and listed
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let md = project.read("out/index.md");
    assert!(md.starts_with("Figure 1, Table 1."), "{}", md);
    assert!(md.contains(r#"<img src="overview.svg" />"#), "{}", md);
    assert!(md.contains("<figcaption><b>Table 1</b> Results.</figcaption>"), "{}", md);
}

#[test]
fn test_cli_build_stdout() {
    let project = Project::new("Cite `ref:a`.\n", &build_bibliography(&["a"]));

    let output = refmark(project.dir.path(), &["build", "--stdout", "-s", "plain"]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(stdout(&output), "Cite [1].\n");
    assert!(!project.path("out").exists());
}

#[test]
fn test_cli_build_from_stdin() {
    // Given: A manuscript piped on stdin
    let project = Project::new("", &build_bibliography(&["a", "b"]));
    let mut child = Command::new(env!("CARGO_BIN_EXE_refmark"))
        .current_dir(project.dir.path())
        .args(["build", "-", "-s", "plain"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to spawn command");
    child
        .stdin
        .take()
        .unwrap()
        .write_all(b"Both `ref:b,a`.")
        .unwrap();

    // When: The process finishes
    let output = child.wait_with_output().unwrap();

    // Then: The resolved text is printed
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(stdout(&output), "Both [1,2].");
}

#[test]
fn test_cli_build_report() {
    // Given: A bibliography declaring tag b twice
    let bibliography = format!("{}3. `tag:b` Source b again.\n", build_bibliography(&["a", "b"]));
    let project = Project::new("`ref:b`\n\n`references`\n", &bibliography);

    // When: We build with a report
    let output = refmark(project.dir.path(), &["build", "--report", "report.json"]);

    // Then: The report holds the bibliography warning before the unused entry
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let report: serde_json::Value = serde_json::from_str(&project.read("report.json")).unwrap();
    assert_eq!(report["assignments"]["citations"][0]["tag"], "b");
    assert_eq!(report["assignments"]["citations"][0]["index"], 1);
    assert_eq!(report["warnings"][0]["type"], "duplicate_entry");
    assert_eq!(report["warnings"][0]["tag"], "b");
    assert_eq!(report["warnings"][0]["line"], 3);
    assert_eq!(report["warnings"][1]["type"], "unused_entry");
    assert_eq!(report["warnings"][1]["tag"], "a");
}

#[test]
fn test_cli_stdout_report_includes_bibliography_warnings() {
    let bibliography = "1. `tag:a` One.\n2. `tag:a` Two.\n";
    let project = Project::new("`ref:a`\n", bibliography);

    let output = refmark(
        project.dir.path(),
        &["build", "--stdout", "--report", "report.json"],
    );

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let report: serde_json::Value = serde_json::from_str(&project.read("report.json")).unwrap();
    assert_eq!(report["warnings"][0]["type"], "duplicate_entry");
}

#[test]
fn test_cli_quiet_keeps_warnings() {
    let project = Project::new("`ref:b`\n\n`references`\n", &build_bibliography(&["a", "b"]));

    let output = refmark(project.dir.path(), &["-q", "build"]);

    assert!(output.status.success());
    let err = stderr(&output);
    assert!(!err.contains("Wrote:"), "{}", err);
    assert!(err.contains("unused citation entry: a"), "{}", err);
}

#[test]
fn test_cli_verbose_shows_assignments() {
    let project = Project::new("`ref:b`\n\n`references`\n", &build_bibliography(&["b"]));

    let output = refmark(project.dir.path(), &["build", "--verbose"]);

    assert!(output.status.success());
    let err = stderr(&output);
    assert!(err.contains("citation #1 = b"), "{}", err);
}

#[test]
fn test_cli_failed_build_keeps_previous_output() {
    // Given: A successful first build
    let project = Project::new("Cite `ref:a`.\n", &build_bibliography(&["a"]));
    let first = refmark(project.dir.path(), &["build"]);
    assert!(first.status.success());
    let before = project.read("out/index.md");

    // When: The manuscript gains an unknown tag and we rebuild
    fs::write(project.path("src/index.md"), "Cite `ref:ghost`.\n").unwrap();
    let second = refmark(project.dir.path(), &["build"]);

    // Then: The build fails and the previous output is untouched
    assert!(!second.status.success());
    assert_eq!(project.read("out/index.md"), before);
}

// ============================================
// Tests for exit codes (semantic: 10-16)
// ============================================

#[test]
fn test_exit_code_10_manuscript_not_found() {
    let project = Project::new("", "");

    let output = refmark(project.dir.path(), &["build", "missing.md"]);

    assert_exit_code(&output, 10, "Missing manuscript");
    assert!(stderr(&output).contains("missing.md"), "{}", stderr(&output));
}

#[test]
fn test_exit_code_11_bibliography_not_found() {
    let project = Project::new("Text.\n", "");

    let output = refmark(project.dir.path(), &["build", "--bib", "nope.md"]);

    assert_exit_code(&output, 11, "Missing bibliography");
}

#[test]
fn test_exit_code_12_unknown_style() {
    let project = Project::new("Text.\n", "");

    let output = refmark(project.dir.path(), &["build", "--style", "nonexistent"]);

    assert_exit_code(&output, 12, "Unknown style");
    let err = stderr(&output);
    assert!(err.contains("available builtin styles: plain, html"), "{}", err);
}

#[test]
fn test_exit_code_13_unknown_tag() {
    let project = Project::new("Cite `ref:ghost`.\n", &build_bibliography(&["a"]));

    let output = refmark(project.dir.path(), &["build"]);

    assert_exit_code(&output, 13, "Unknown tag");
    assert!(stderr(&output).contains("Unknown citation tag: ghost"));
    assert!(!project.path("out").exists());
}

#[test]
fn test_exit_code_14_malformed_token() {
    let project = Project::new("Cite `ref:a,,b`.\n", &build_bibliography(&["a", "b"]));

    let output = refmark(project.dir.path(), &["build"]);

    assert_exit_code(&output, 14, "Malformed token");
}

#[test]
fn test_exit_code_15_output_not_writable() {
    // Given: A regular file where the output directory should go
    let project = Project::new("Text.\n", "");
    fs::write(project.path("blocked"), "").unwrap();

    let output = refmark(project.dir.path(), &["build", "-o", "blocked"]);

    assert_exit_code(&output, 15, "Unwritable output");
}

#[test]
fn test_exit_code_16_invalid_project_file() {
    let project = Project::new("Text.\n", "").with_config("unknown_key = 1\n");

    let output = refmark(project.dir.path(), &["build"]);

    assert_exit_code(&output, 16, "Invalid project file");
}
