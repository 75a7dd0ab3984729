use std::io::Write;
use std::net::TcpListener;
use std::time::Duration;

use reqwest::Client;
use tempfile::NamedTempFile;
use tokio::time::sleep;

/// Find an available port
fn get_available_port() -> u16 {
    TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port()
}

/// Create a minimal valid config. Upstreams point at a closed local port so
/// no test traffic leaves the machine.
fn minimal_config(port: u16) -> String {
    format!(
        r#"
[station]
latitude = 29.735
longitude = -94.977
nws_base_url = "http://127.0.0.1:9"
radar_url = "http://127.0.0.1:9/radar.png"

[server]
host = "127.0.0.1"
port = {}
"#,
        port
    )
}

/// Spawn the server and return a handle
async fn spawn_server(config_path: &std::path::Path) -> tokio::process::Child {
    tokio::process::Command::new(env!("CARGO_BIN_EXE_weatharr"))
        .env("WEATHARR_CONFIG", config_path)
        .env("RUST_LOG", "error") // Quiet logs during tests
        .kill_on_drop(true)
        .spawn()
        .expect("Failed to spawn server")
}

/// Wait for server to be ready
async fn wait_for_server(port: u16, max_attempts: u32) -> bool {
    let client = Client::new();
    for _ in 0..max_attempts {
        if client
            .get(format!("http://127.0.0.1:{}/api/v1/health", port))
            .send()
            .await
            .is_ok()
        {
            return true;
        }
        sleep(Duration::from_millis(50)).await;
    }
    false
}

#[tokio::test]
async fn test_health_endpoint() {
    let port = get_available_port();

    let mut temp_file = NamedTempFile::new().unwrap();
    temp_file
        .write_all(minimal_config(port).as_bytes())
        .unwrap();
    temp_file.flush().unwrap();

    let mut server = spawn_server(temp_file.path()).await;
    assert!(
        wait_for_server(port, 100).await,
        "Server did not start in time"
    );

    let client = Client::new();
    let response = tokio_test::assert_ok!(
        client
            .get(format!("http://127.0.0.1:{}/api/v1/health", port))
            .send()
            .await
    );
    assert!(response.status().is_success());

    let json: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(json["status"], "ok");

    // Upstreams are unreachable: feeds report failures, the server keeps serving.
    sleep(Duration::from_millis(300)).await;
    let feeds: serde_json::Value = client
        .get(format!("http://127.0.0.1:{}/api/v1/feeds", port))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(feeds["running"], true);
    assert_eq!(feeds["feeds"].as_array().unwrap().len(), 9);

    server.kill().await.ok();
}

#[tokio::test]
async fn test_invalid_config_exits_with_error() {
    let mut temp_file = NamedTempFile::new().unwrap();
    temp_file
        .write_all(
            br#"
[station]
latitude = 129.0
longitude = -94.977
"#,
        )
        .unwrap();
    temp_file.flush().unwrap();

    let mut server = spawn_server(temp_file.path()).await;
    let status = tokio::time::timeout(Duration::from_secs(10), server.wait())
        .await
        .expect("Server did not exit")
        .expect("Failed to wait for server");
    assert!(!status.success());
}

#[tokio::test]
async fn test_missing_config_exits_with_error() {
    let mut server = tokio::process::Command::new(env!("CARGO_BIN_EXE_weatharr"))
        .env("WEATHARR_CONFIG", "/nonexistent/weatharr.toml")
        .env("RUST_LOG", "error")
        .kill_on_drop(true)
        .spawn()
        .expect("Failed to spawn server");

    let status = tokio::time::timeout(Duration::from_secs(10), server.wait())
        .await
        .expect("Server did not exit")
        .expect("Failed to wait for server");
    assert!(!status.success());
}
