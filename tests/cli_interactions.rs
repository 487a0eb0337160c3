//! Binary-level tests: flags, startup failures and a full probe round trip

mod common;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};
use tempfile::TempDir;

const ENV_VARS: [&str; 11] = [
    "SPEEDTEST_ADDRESS",
    "SPEEDTEST_PORT",
    "SPEEDTEST_SERVER_ID",
    "SPEEDTEST_SOURCE_ADDRESS",
    "SPEEDTEST_TIMEOUT_SECONDS",
    "SPEEDTEST_COMMAND",
    "SPEEDTEST_STATIC_DIR",
    "SPEEDTEST_BUSY_POLICY",
    "LOG_LEVEL",
    "LOG_FORMAT",
    "ENABLE_COLOR",
];

/// Binary command isolated from the caller's environment and any .env file
fn create_test_cmd(work_dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("prometheus_speedtest").unwrap();
    cmd.current_dir(work_dir.path());
    for var in ENV_VARS {
        cmd.env_remove(var);
    }
    cmd
}

#[test]
fn test_version_flag() {
    let dir = TempDir::new().unwrap();
    create_test_cmd(&dir)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::diff(format!(
            "prometheus_speedtest v{}\n",
            env!("CARGO_PKG_VERSION")
        )));
}

#[test]
fn test_help_lists_options() {
    let dir = TempDir::new().unwrap();
    create_test_cmd(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--server"))
        .stdout(predicate::str::contains("--busy-policy"))
        .stdout(predicate::str::contains("--timeout"));
}

#[test]
fn test_print_env_example() {
    let dir = TempDir::new().unwrap();
    create_test_cmd(&dir)
        .arg("--print-env-example")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("# Prometheus Speedtest Exporter Configuration"))
        .stdout(predicate::str::contains("# SPEEDTEST_PORT=9516"))
        .stdout(predicate::str::contains("# SPEEDTEST_BUSY_POLICY=queue"));
}

#[test]
fn test_invalid_timeout_rejected_by_parser() {
    let dir = TempDir::new().unwrap();
    create_test_cmd(&dir)
        .args(["--timeout", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Duration must be greater than 0"));
}

#[test]
fn test_invalid_address_is_config_error() {
    let dir = TempDir::new().unwrap();
    create_test_cmd(&dir)
        .args(["--address", "not-an-ip", "--no-color"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("[CONFIG]"))
        .stderr(predicate::str::contains("not-an-ip"));
}

#[test]
fn test_invalid_env_value_is_config_error() {
    let dir = TempDir::new().unwrap();
    create_test_cmd(&dir)
        .env("SPEEDTEST_BUSY_POLICY", "drop")
        .arg("--no-color")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("SPEEDTEST_BUSY_POLICY"));
}

#[test]
fn test_invalid_dotenv_value_is_config_error() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join(".env"), "SPEEDTEST_PORT=not-a-port\n").unwrap();

    create_test_cmd(&dir)
        .arg("--no-color")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("SPEEDTEST_PORT"));
}

/// Kills the server when the test ends, pass or fail
struct ServerGuard(Child);

impl Drop for ServerGuard {
    fn drop(&mut self) {
        let _ = self.0.kill();
        let _ = self.0.wait();
    }
}

fn free_port() -> u16 {
    std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port()
}

#[cfg(unix)]
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_probe_round_trip_through_binary() {
    let dir = TempDir::new().unwrap();
    let tool = common::FakeTool::new();
    let script = tool.write("ok.sh", &format!("cat <<'EOF'\n{}\nEOF", common::SAMPLE_REPORT));
    let port = free_port();

    let child = create_test_cmd(&dir)
        .args([
            "--address", "127.0.0.1",
            "--port", &port.to_string(),
            "--speedtest-command", &format!("sh {}", script.display()),
            "--static-dir", &dir.path().display().to_string(),
            "--log-level", "error",
            "--no-color",
        ])
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .unwrap();
    let _guard = ServerGuard(child);

    let url = format!("http://127.0.0.1:{}/probe", port);
    let deadline = Instant::now() + Duration::from_secs(15);
    let response = loop {
        match reqwest::get(&url).await {
            Ok(response) => break response,
            Err(_) if Instant::now() < deadline => tokio::time::sleep(Duration::from_millis(100)).await,
            Err(e) => panic!("server did not come up: {}", e),
        }
    };

    assert_eq!(response.status(), reqwest::StatusCode::OK);
    let values = common::exposition_values(&response.text().await.unwrap());
    assert_eq!(values["download_speed_bps"], 100_000_000.0);
    assert_eq!(values["bytes_sent"], 45_678_901.0);
}
