//! Execution of the external speedtest tool
//!
//! A [`MeasurementRunner`] launches the tool once per call, waits for it
//! under the configured timeout and decodes its JSON report. Dropping the
//! future of [`MeasurementRunner::run`] kills the child process.

pub mod command;
pub mod report;

pub use command::{build_args, BASE_ARGS};
pub use report::{decode_result, parse_report, SpeedtestReport};

use crate::error::MeasurementError;
use crate::logging::Logger;
use crate::models::{MeasurementConfig, MeasurementResult};
use std::process::{ExitStatus, Stdio};
use std::time::Instant;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};

/// Longest stderr excerpt kept in an error
const MAX_STDERR_CHARS: usize = 512;

/// Launches the measurement tool and turns its output into a result
#[derive(Clone)]
pub struct MeasurementRunner {
    program: String,
    leading_args: Vec<String>,
    logger: Logger,
}

impl MeasurementRunner {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            leading_args: Vec::new(),
            logger: Logger::silent("runner"),
        }
    }

    /// Arguments placed before the tool flags, e.g. a script for an interpreter
    pub fn with_leading_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.leading_args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = logger;
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Full argument list passed to the program for a configuration
    pub fn command_args(&self, config: &MeasurementConfig) -> Vec<String> {
        let mut args = self.leading_args.clone();
        args.extend(build_args(config));
        args
    }

    /// Run the tool once
    ///
    /// On timeout the child and everything in its process group are killed
    /// before the error is returned.
    pub async fn run(&self, config: &MeasurementConfig) -> Result<MeasurementResult, MeasurementError> {
        let args = self.command_args(config);
        self.logger
            .debug("Starting speedtest")
            .field("program", &self.program)
            .field("args", &args)
            .field("timeout_secs", config.timeout().as_secs())
            .log()
            .await;

        let started_at = Instant::now();
        let mut command = Command::new(&self.program);
        command
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        // own process group, so a timeout also reaches tools started by a wrapper
        #[cfg(unix)]
        command.process_group(0);

        let mut child = command
            .spawn()
            .map_err(|e| MeasurementError::spawn(format!("failed to start '{}': {}", self.program, e)))?;

        let outcome = tokio::time::timeout(config.timeout(), wait_with_output(&mut child)).await;

        let (status, stdout, stderr) = match outcome {
            Ok(result) => result?,
            Err(_) => {
                kill_process_group(&child);
                // kill() also reaps the child
                if let Err(e) = child.kill().await {
                    self.logger
                        .warn("Failed to kill timed out speedtest")
                        .field("error", e.to_string())
                        .log()
                        .await;
                }
                return Err(MeasurementError::Timeout(config.timeout()));
            }
        };

        self.logger
            .debug("Speedtest exited")
            .field("exit_code", status.code())
            .field("elapsed_ms", started_at.elapsed().as_millis() as u64)
            .field("stdout_bytes", stdout.len())
            .log()
            .await;

        if !status.success() {
            return Err(MeasurementError::exit(status.code(), stderr_excerpt(&stderr)));
        }

        let report = parse_report(&stdout)?;
        if let Some(server) = &report.server {
            self.logger
                .debug("Speedtest server")
                .field("server_id", server.id)
                .field("server_name", &server.name)
                .field("server_location", &server.location)
                .field("isp", &report.isp)
                .field("result_url", report.result.as_ref().and_then(|r| r.url.as_ref()))
                .log()
                .await;
        }

        report.to_result()
    }
}

/// Wait for exit while draining both pipes, so a chatty child cannot block
/// on a full pipe buffer
async fn wait_with_output(child: &mut Child) -> Result<(ExitStatus, Vec<u8>, Vec<u8>), MeasurementError> {
    let (stdout, stderr) = drain_pipes(child.stdout.take(), child.stderr.take()).await?;

    let status = child
        .wait()
        .await
        .map_err(|e| MeasurementError::output(format!("failed to wait for speedtest: {}", e)))?;

    Ok((status, stdout, stderr))
}

async fn drain_pipes<O, E>(stdout: Option<O>, stderr: Option<E>) -> Result<(Vec<u8>, Vec<u8>), MeasurementError>
where
    O: AsyncRead + Unpin,
    E: AsyncRead + Unpin,
{
    tokio::try_join!(read_all(stdout), read_all(stderr))
        .map_err(|e| MeasurementError::output(format!("failed to read speedtest output: {}", e)))
}

/// SIGKILL every process in the child's group
#[cfg(unix)]
fn kill_process_group(child: &Child) {
    if let Some(pid) = child.id() {
        // SAFETY: killpg has no memory-safety preconditions; the group id is
        // the pid of a child we spawned as group leader and have not reaped.
        unsafe {
            libc::killpg(pid as libc::pid_t, libc::SIGKILL);
        }
    }
}

#[cfg(not(unix))]
fn kill_process_group(_child: &Child) {}

async fn read_all<R: AsyncRead + Unpin>(pipe: Option<R>) -> std::io::Result<Vec<u8>> {
    let mut buffer = Vec::new();
    if let Some(mut pipe) = pipe {
        pipe.read_to_end(&mut buffer).await?;
    }
    Ok(buffer)
}

/// Trimmed and bounded stderr, `None` if the tool printed nothing
fn stderr_excerpt(stderr: &[u8]) -> Option<String> {
    let text = String::from_utf8_lossy(stderr);
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if text.chars().count() <= MAX_STDERR_CHARS {
        Some(text.to_string())
    } else {
        let mut excerpt: String = text.chars().take(MAX_STDERR_CHARS).collect();
        excerpt.push_str("...");
        Some(excerpt)
    }
}
