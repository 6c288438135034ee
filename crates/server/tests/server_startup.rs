//! Startup tests against the real `vidspeak` binary.

use std::io::Write;
use std::net::TcpListener;
use std::path::Path;
use std::process::Output;
use std::time::Duration;

use reqwest::Client;
use tempfile::{NamedTempFile, TempDir};
use tokio::process::{Child, Command};
use tokio::time::{sleep, timeout};

const BIN: &str = env!("CARGO_BIN_EXE_vidspeak");

/// A spawned server bound to a free local port. Killed on drop.
struct RunningServer {
    port: u16,
    client: Client,
    _child: Child,
    _config: NamedTempFile,
}

impl RunningServer {
    /// Starts the binary with an openai-backed config rooted at `workspace`.
    async fn start(workspace: &Path) -> Self {
        let port = TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let config = write_config(&format!(
            r#"
[server]
host = "127.0.0.1"
port = {port}

[workspace]
root = "{root}"
clear_on_start = true

[synthesizer]
backend = "openai"

[synthesizer.openai]
api_key = "sk-startup-test"
"#,
            port = port,
            root = workspace.display(),
        ));

        let child = Command::new(BIN)
            .env("VIDSPEAK_CONFIG", config.path())
            .env("RUST_LOG", "error")
            .kill_on_drop(true)
            .spawn()
            .expect("Failed to spawn server");

        let server = Self {
            port,
            client: Client::new(),
            _child: child,
            _config: config,
        };
        server.wait_ready().await;
        server
    }

    fn url(&self, path: &str) -> String {
        format!("http://127.0.0.1:{}{}", self.port, path)
    }

    async fn wait_ready(&self) {
        for _ in 0..100 {
            if self.client.get(self.url("/health")).send().await.is_ok() {
                return;
            }
            sleep(Duration::from_millis(50)).await;
        }
        panic!("Server did not start in time");
    }
}

fn write_config(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

/// Runs the binary to completion, failing the test if it hangs.
async fn run_to_exit(config_path: &Path) -> Output {
    timeout(
        Duration::from_secs(5),
        Command::new(BIN)
            .env("VIDSPEAK_CONFIG", config_path)
            .env("RUST_LOG", "error")
            .output(),
    )
    .await
    .expect("Binary did not exit")
    .expect("Failed to execute binary")
}

#[tokio::test]
async fn test_health_and_sanitized_config() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().join("vidspeak");
    let stale = root.join("stale-dir");
    std::fs::create_dir_all(&stale).unwrap();

    let server = RunningServer::start(&root).await;

    let health: serde_json::Value = server
        .client
        .get(server.url("/api/v1/health"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(health["status"], "ok");

    let response = server.client.get(server.url("/config")).send().await.unwrap();
    assert!(response.status().is_success());
    let text = response.text().await.unwrap();
    let config: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(config["server"]["port"], server.port);
    assert_eq!(config["synthesizer"]["backend"], "openai");
    assert_eq!(config["synthesizer"]["api_key_configured"], true);
    assert!(!text.contains("sk-startup-test"));

    // clear_on_start wiped the leftover directory
    assert!(!stale.exists());
}

#[tokio::test]
async fn test_validation_error_from_running_server() {
    let temp = TempDir::new().unwrap();
    let server = RunningServer::start(temp.path()).await;

    let response = server
        .client
        .post(server.url("/generate-video"))
        .header("Content-Type", "application/json")
        .body(r#"{"image_url":"https://example.com/a.png"}"#)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 400);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Missing text parameter");
}

#[tokio::test]
async fn test_missing_explicit_config_exits_with_error() {
    let output = run_to_exit(Path::new("/nonexistent/config.toml")).await;
    assert!(!output.status.success());
}

#[tokio::test]
async fn test_openai_without_key_exits_with_error() {
    let config = write_config(
        r#"
[server]
port = 8080

[synthesizer]
backend = "openai"
"#,
    );

    let output = run_to_exit(config.path()).await;
    assert!(!output.status.success());
}
