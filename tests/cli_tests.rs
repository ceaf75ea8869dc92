//! CLI Integration Tests for DocQA
//!
//! Runs the built `docqa` binary against temporary project directories. None
//! of these commands reach a model server.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

const ENV_OVERRIDES: &[&str] = &[
    "DOCQA_HOST",
    "DOCQA_PORT",
    "DOCQA_DATA_DIR",
    "DOCQA_DB_DIR",
    "DOCQA_OLLAMA_URL",
    "DOCQA_MODEL",
    "DOCQA_EMBEDDING_MODEL",
    "DOCQA_CHROMA_URL",
];

/// Helper to run docqa with arguments
fn run_docqa(args: &[&str], working_dir: &Path) -> Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_docqa"));
    cmd.arg("--no-color").args(args).current_dir(working_dir);
    for name in ENV_OVERRIDES {
        cmd.env_remove(name);
    }
    cmd.output().expect("Failed to execute command")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

/// An initialized project whose Chroma URL points at a closed port.
fn project() -> TempDir {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let output = run_docqa(&["init"], temp_dir.path());
    assert!(output.status.success(), "init failed: {}", stderr(&output));

    let config_path = temp_dir.path().join("docqa.toml");
    let content = fs::read_to_string(&config_path).unwrap();
    fs::write(
        &config_path,
        content.replace("http://localhost:8000", "http://127.0.0.1:9"),
    )
    .unwrap();
    temp_dir
}

// =============================================================================
// Help and Version Tests
// =============================================================================

#[test]
fn test_help_command() {
    let temp_dir = TempDir::new().unwrap();
    let output = run_docqa(&["--help"], temp_dir.path());

    assert!(output.status.success());
    let out = stdout(&output);
    assert!(out.contains("DocQA"));
    for command in ["serve", "init", "upload", "index", "ask", "status", "clear", "config"] {
        assert!(out.contains(command), "help is missing '{}'", command);
    }
}

#[test]
fn test_version_command() {
    let temp_dir = TempDir::new().unwrap();
    let output = run_docqa(&["--version"], temp_dir.path());

    assert!(output.status.success());
    assert!(stdout(&output).contains(env!("CARGO_PKG_VERSION")));
}

// =============================================================================
// Init Command Tests
// =============================================================================

#[test]
fn test_init_creates_project() {
    let temp_dir = TempDir::new().unwrap();
    let output = run_docqa(&["init", "--port", "9100", "--model", "llama3.2"], temp_dir.path());

    assert!(output.status.success());
    let content = fs::read_to_string(temp_dir.path().join("docqa.toml")).unwrap();
    assert!(content.contains("port = 9100"));
    assert!(content.contains("model = \"llama3.2\""));
    assert!(temp_dir.path().join("data").is_dir());
    assert!(temp_dir.path().join("db").is_dir());
    assert!(temp_dir.path().join(".env.example").exists());
}

#[test]
fn test_init_keeps_existing_config() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("docqa.toml"), "# mine\n").unwrap();

    let output = run_docqa(&["init"], temp_dir.path());

    assert!(output.status.success());
    assert!(stdout(&output).contains("already exists"));
    assert_eq!(
        fs::read_to_string(temp_dir.path().join("docqa.toml")).unwrap(),
        "# mine\n"
    );
}

// =============================================================================
// Config Command Tests
// =============================================================================

#[test]
fn test_config_validate_ok() {
    let temp_dir = project();
    let output = run_docqa(&["config", "--validate"], temp_dir.path());

    assert!(output.status.success(), "{}", stderr(&output));
    let out = stdout(&output);
    assert!(out.contains("gemma:2b"));
    assert!(out.contains("Configuration is valid"));
}

#[test]
fn test_config_validate_rejects_bad_chunking() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(
        temp_dir.path().join("docqa.toml"),
        "[rag]\nchunk_size = 100\nchunk_overlap = 200\n",
    )
    .unwrap();

    let output = run_docqa(&["config", "--validate"], temp_dir.path());

    assert!(!output.status.success());
    assert!(stderr(&output).contains("chunk_overlap"));
}

// =============================================================================
// Document Commands
// =============================================================================

#[test]
fn test_upload_status_and_clear() {
    let temp_dir = project();
    let pdf = temp_dir.path().join("paper.pdf");
    fs::write(&pdf, b"%PDF-1.4 not really").unwrap();

    let output = run_docqa(&["upload", pdf.to_str().unwrap()], temp_dir.path());
    assert!(output.status.success(), "{}", stderr(&output));
    assert!(temp_dir.path().join("data/paper.pdf").exists());

    let output = run_docqa(&["status"], temp_dir.path());
    assert!(output.status.success(), "{}", stderr(&output));
    let out = stdout(&output);
    assert!(out.contains("paper.pdf"));
    assert!(out.contains("No index built"));

    let output = run_docqa(&["clear", "uploads", "--yes"], temp_dir.path());
    assert!(output.status.success());
    assert!(!temp_dir.path().join("data/paper.pdf").exists());
}

#[test]
fn test_upload_rejects_other_types() {
    let temp_dir = project();
    let exe = temp_dir.path().join("tool.exe");
    fs::write(&exe, b"MZ").unwrap();

    let output = run_docqa(&["upload", exe.to_str().unwrap()], temp_dir.path());

    assert!(!output.status.success());
    assert!(!temp_dir.path().join("data/tool.exe").exists());
}

#[test]
fn test_index_without_documents() {
    let temp_dir = project();
    let output = run_docqa(&["index"], temp_dir.path());

    assert!(output.status.success());
    assert!(stdout(&output).contains("No documents found in data/"));
}

#[test]
fn test_ask_without_index() {
    let temp_dir = project();
    let output = run_docqa(&["ask", "What is this about?"], temp_dir.path());

    assert!(output.status.success());
    assert!(stdout(&output).contains("No vector DB found"));
}

#[test]
fn test_clear_index_when_chroma_is_down() {
    let temp_dir = project();
    fs::write(temp_dir.path().join("db/index.json"), "{}").unwrap();

    let output = run_docqa(&["clear", "index", "--yes"], temp_dir.path());

    assert!(output.status.success(), "{}", stderr(&output));
    assert!(stdout(&output).contains("db/ cleared."));
    assert_eq!(fs::read_dir(temp_dir.path().join("db")).unwrap().count(), 0);
}
