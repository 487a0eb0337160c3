//! Shared fixtures for integration tests
#![allow(dead_code)]

use async_trait::async_trait;
use prometheus_speedtest::{
    MeasurementError, MeasurementResult, MeasurementRunner, MeasurementService,
};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tempfile::TempDir;

/// Report the tool prints for the reference scenario
pub const SAMPLE_REPORT: &str = r#"{"type":"result","download":{"bandwidth":12500000,"bytes":98765432},"upload":{"bandwidth":6250000,"bytes":45678901},"ping":{"latency":14.2},"isp":"Example ISP","server":{"id":1234,"name":"Example","location":"Amsterdam"}}"#;

pub fn sample_result() -> MeasurementResult {
    MeasurementResult::new(100_000_000.0, 50_000_000.0, 14.2, 98_765_432, 45_678_901).unwrap()
}

/// Fake speedtest tools written as shell scripts into a temporary directory
///
/// Scripts are run through `sh` rather than executed directly, which avoids
/// "text file busy" races when a test writes and spawns in quick succession.
pub struct FakeTool {
    dir: TempDir,
}

impl FakeTool {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write a script and return a runner that invokes it
    pub fn script(&self, name: &str, body: &str) -> MeasurementRunner {
        let path = self.write(name, body);
        MeasurementRunner::new("sh").with_leading_args([path.to_string_lossy().into_owned()])
    }

    pub fn write(&self, name: &str, body: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        path
    }

    /// Tool printing the sample report
    pub fn succeeding(&self) -> MeasurementRunner {
        self.script("ok.sh", &format!("cat <<'EOF'\n{}\nEOF", SAMPLE_REPORT))
    }

    /// Tool that records its arguments before printing the sample report
    pub fn recording(&self) -> (MeasurementRunner, PathBuf) {
        let args_file = self.dir.path().join("args.txt");
        let runner = self.script(
            "record.sh",
            &format!(
                "printf '%s\\n' \"$@\" > '{}'\ncat <<'EOF'\n{}\nEOF",
                args_file.display(),
                SAMPLE_REPORT
            ),
        );
        (runner, args_file)
    }

    /// Tool that logs start and end of each run, sleeping in between
    pub fn logging_runs(&self, sleep_secs: &str) -> (MeasurementRunner, PathBuf) {
        let log_file = self.dir.path().join("runs.log");
        let runner = self.script(
            "slow.sh",
            &format!(
                "echo start >> '{log}'\nsleep {sleep}\necho end >> '{log}'\ncat <<'EOF'\n{report}\nEOF",
                log = log_file.display(),
                sleep = sleep_secs,
                report = SAMPLE_REPORT
            ),
        );
        (runner, log_file)
    }
}

/// Test double with a configurable outcome and delay, counting overlap
pub struct FakeService {
    outcome: Result<MeasurementResult, MeasurementError>,
    delay: Duration,
    pub calls: AtomicUsize,
    pub active: AtomicUsize,
    pub max_active: AtomicUsize,
}

impl FakeService {
    pub fn new(outcome: Result<MeasurementResult, MeasurementError>) -> Self {
        Self {
            outcome,
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
            active: AtomicUsize::new(0),
            max_active: AtomicUsize::new(0),
        }
    }

    pub fn succeeding() -> Self {
        Self::new(Ok(sample_result()))
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn max_active(&self) -> usize {
        self.max_active.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MeasurementService for FakeService {
    async fn test(&self) -> Result<MeasurementResult, MeasurementError> {
        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(now, Ordering::SeqCst);
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.active.fetch_sub(1, Ordering::SeqCst);
        self.outcome.clone()
    }
}

/// Numeric value of every sample line in an exposition body
pub fn exposition_values(body: &str) -> HashMap<String, f64> {
    body.lines()
        .filter(|line| !line.starts_with('#') && !line.trim().is_empty())
        .filter_map(|line| {
            let (name, value) = line.split_once(' ')?;
            Some((name.to_string(), value.trim().parse().ok()?))
        })
        .collect()
}
