use std::io::Write;
use std::net::TcpListener;
use std::path::Path;
use std::process::Output;
use std::time::Duration;

use tempfile::{NamedTempFile, TempDir};
use tokio::time::timeout;

/// Find an available port
fn get_available_port() -> u16 {
    TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port()
}

/// A config rooted in `dir` reading content from `dir/{input}`.
fn config_in(dir: &Path, input: &str, port: u16) -> String {
    format!(
        r#"
[render_server]
host = "127.0.0.1"
port = {port}

[staging]
root = "{staging}"
finished_dir = "{finished}"

[content]
input_dir = "{input}"
"#,
        port = port,
        staging = dir.join("staging").display(),
        finished = dir.join("finished").display(),
        input = dir.join(input).display(),
    )
}

fn write_config(contents: &str) -> NamedTempFile {
    let mut temp_file = NamedTempFile::new().unwrap();
    temp_file.write_all(contents.as_bytes()).unwrap();
    temp_file.flush().unwrap();
    temp_file
}

/// Run the binary to completion with `config_path`.
async fn run_binary(config_path: &Path) -> Output {
    timeout(
        Duration::from_secs(10),
        tokio::process::Command::new(env!("CARGO_BIN_EXE_tales"))
            .env("TALES_CONFIG", config_path)
            .env("RUST_LOG", "error")
            .kill_on_drop(true)
            .output(),
    )
    .await
    .expect("Command timed out")
    .expect("Failed to execute command")
}

#[tokio::test]
async fn test_empty_input_exits_cleanly() {
    let dir = TempDir::new().unwrap();
    std::fs::create_dir_all(dir.path().join("input")).unwrap();
    let config = write_config(&config_in(dir.path(), "input", get_available_port()));

    let output = run_binary(config.path()).await;

    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(!dir.path().join("finished").exists());
}

#[tokio::test]
async fn test_missing_config_file_exits_with_error() {
    let output = run_binary(Path::new("/nonexistent/tales.toml")).await;
    assert!(!output.status.success());
}

#[tokio::test]
async fn test_invalid_config_exits_with_error() {
    let dir = TempDir::new().unwrap();
    std::fs::create_dir_all(dir.path().join("input")).unwrap();
    let mut contents = config_in(dir.path(), "input", get_available_port());
    contents.push_str("\n[encoder]\nwidth = 1921\n");
    let config = write_config(&contents);

    let output = run_binary(config.path()).await;

    assert!(!output.status.success());
}

#[tokio::test]
async fn test_missing_input_dir_exits_with_error() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&config_in(dir.path(), "absent", get_available_port()));

    let output = run_binary(config.path()).await;

    assert!(!output.status.success());
}

#[tokio::test]
async fn test_missing_template_exits_with_error() {
    let dir = TempDir::new().unwrap();
    std::fs::create_dir_all(dir.path().join("input")).unwrap();
    let contents = config_in(dir.path(), "input", get_available_port()).replace(
        "[render_server]\n",
        &format!(
            "[render_server]\ntemplate_path = \"{}\"\n",
            dir.path().join("missing.html").display()
        ),
    );
    let config = write_config(&contents);

    let output = run_binary(config.path()).await;

    assert!(!output.status.success());
    assert!(!dir.path().join("finished").exists());
}
