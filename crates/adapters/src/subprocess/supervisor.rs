// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The subprocess supervisor: spawns a shell invocation in its own
//! process group so the whole group can be signalled, streams
//! stdout/stderr with a tail-capped buffer, and enforces overall and
//! inactivity timeouts plus pattern-triggered kill.

use std::collections::HashMap;
use std::process::Stdio;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tokio::time::Instant;

use super::capture::{CapturedStream, CAP_BYTES};
use super::env::build_env;
use super::error::SubprocessError;

/// Options controlling one subprocess invocation. Mirrors the spec's
/// `run(command, options)` table verbatim.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// `0` (or `None`) disables the overall wall-clock deadline.
    pub timeout_ms: Option<u64>,
    /// Inactivity deadline; reset on stdout (and, unless
    /// `hang_reset_on_stderr` is false, stderr) traffic.
    pub hang_timeout_ms: Option<u64>,
    pub hang_reset_on_stderr: bool,
    /// First-match substring list; matching stderr output kills the
    /// group immediately with [`SubprocessError::Auth`].
    pub kill_on_stderr_patterns: Vec<String>,
    pub background: bool,
    pub throw_on_non_zero: bool,
    pub secrets: HashMap<String, String>,
}

impl RunOptions {
    pub fn new() -> Self {
        Self { hang_reset_on_stderr: true, ..Default::default() }
    }
}

/// Outcome of a foreground run that did not hit a timeout or kill
/// pattern. A non-zero exit is returned here (not raised) unless the
/// caller set `throw_on_non_zero`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutput {
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl RunOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

enum ChunkSource {
    Stdout(Vec<u8>),
    Stderr(Vec<u8>),
}

/// Shared cell an agent adapter can poll to find the process group of its
/// in-flight invocation, so `kill()` can reach a run already in progress.
#[derive(Debug, Default, Clone)]
pub struct PgidTracker(std::sync::Arc<parking_lot::Mutex<Option<i32>>>);

impl PgidTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> Option<i32> {
        *self.0.lock()
    }

    fn set(&self, pgid: Option<i32>) {
        *self.0.lock() = pgid;
    }
}

/// Run `command` through `/bin/sh -lc`, in a fresh process group, honoring
/// the timeout/hang/kill-pattern options.
pub async fn run(command: &str, options: &RunOptions) -> Result<RunOutput, SubprocessError> {
    run_inner(command, options, None).await
}

/// As [`run`], but publishes the child's process group id to `tracker` as
/// soon as it is known, letting a caller holding the tracker kill the run
/// from another task while it is still in flight.
pub async fn run_tracked(
    command: &str,
    options: &RunOptions,
    tracker: &PgidTracker,
) -> Result<RunOutput, SubprocessError> {
    run_inner(command, options, Some(tracker)).await
}

async fn run_inner(
    command: &str,
    options: &RunOptions,
    tracker: Option<&PgidTracker>,
) -> Result<RunOutput, SubprocessError> {
    let env = build_env(&options.secrets);
    let mut cmd = Command::new("/bin/sh");
    cmd.arg("-lc").arg(command);
    cmd.env_clear();
    cmd.envs(env);
    cmd.stdin(Stdio::null());
    cmd.stdout(Stdio::piped());
    cmd.stderr(Stdio::piped());
    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        cmd.process_group(0);
    }

    let mut child = cmd.spawn().map_err(|e| SubprocessError::Spawn(e.to_string()))?;
    let pgid = child.id().map(|id| id as i32);
    if let Some(tracker) = tracker {
        tracker.set(pgid);
    }

    if options.background {
        return Ok(RunOutput { exit_code: None, stdout: String::new(), stderr: String::new() });
    }

    let (Some(stdout), Some(stderr)) = (child.stdout.take(), child.stderr.take()) else {
        return Err(SubprocessError::Spawn("child spawned without piped stdout/stderr".to_string()));
    };

    let (tx, mut rx) = tokio::sync::mpsc::channel::<ChunkSource>(256);
    let stdout_tx = tx.clone();
    let stdout_task = tokio::spawn(async move {
        let mut lines = BufReader::new(stdout).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            let mut bytes = line.into_bytes();
            bytes.push(b'\n');
            if stdout_tx.send(ChunkSource::Stdout(bytes)).await.is_err() {
                break;
            }
        }
    });
    let stderr_task = tokio::spawn(async move {
        let mut lines = BufReader::new(stderr).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            let mut bytes = line.into_bytes();
            bytes.push(b'\n');
            if tx.send(ChunkSource::Stderr(bytes)).await.is_err() {
                break;
            }
        }
    });

    let mut stdout_buf = CapturedStream::new(CAP_BYTES);
    let mut stderr_buf = CapturedStream::new(CAP_BYTES);

    let overall_deadline = options.timeout_ms.filter(|&ms| ms > 0).map(|ms| Instant::now() + Duration::from_millis(ms));
    let mut hang_deadline = options
        .hang_timeout_ms
        .filter(|&ms| ms > 0)
        .map(|ms| (Instant::now() + Duration::from_millis(ms), Duration::from_millis(ms)));

    let mut wait_fut = Box::pin(child.wait());
    let mut rx_closed = false;
    let exit_status = loop {
        let overall_sleep = async {
            match overall_deadline {
                Some(d) => tokio::time::sleep_until(d).await,
                None => std::future::pending().await,
            }
        };
        let hang_sleep = async {
            match hang_deadline {
                Some((d, _)) => tokio::time::sleep_until(d).await,
                None => std::future::pending().await,
            }
        };

        tokio::select! {
            _ = overall_sleep => {
                kill_group(pgid).await;
                stdout_task.abort();
                stderr_task.abort();
                return Err(SubprocessError::Timeout {
                    reason: "overall timeout exceeded".to_string(),
                    stdout: stdout_buf.as_str(),
                    stderr: stderr_buf.as_str(),
                });
            }
            _ = hang_sleep => {
                kill_group(pgid).await;
                return Err(SubprocessError::Timeout {
                    reason: "inactivity timeout exceeded".to_string(),
                    stdout: stdout_buf.as_str(),
                    stderr: stderr_buf.as_str(),
                });
            }
            maybe_chunk = rx.recv(), if !rx_closed => {
                match maybe_chunk {
                    Some(ChunkSource::Stdout(bytes)) => {
                        stdout_buf.push(&bytes);
                        if let Some((_, dur)) = hang_deadline {
                            hang_deadline = Some((Instant::now() + dur, dur));
                        }
                    }
                    Some(ChunkSource::Stderr(bytes)) => {
                        if let Some(pattern) = options
                            .kill_on_stderr_patterns
                            .iter()
                            .find(|p| !p.is_empty() && String::from_utf8_lossy(&bytes).contains(p.as_str()))
                        {
                            let pattern = pattern.clone();
                            stderr_buf.push(&bytes);
                            kill_group(pgid).await;
                            return Err(SubprocessError::Auth {
                                pattern,
                                stdout: stdout_buf.as_str(),
                                stderr: stderr_buf.as_str(),
                            });
                        }
                        stderr_buf.push(&bytes);
                        if options.hang_reset_on_stderr {
                            if let Some((_, dur)) = hang_deadline {
                                hang_deadline = Some((Instant::now() + dur, dur));
                            }
                        }
                    }
                    None => {
                        // Both reader tasks have exited (pipes closed);
                        // stop polling this branch and wait on the child.
                        rx_closed = true;
                    }
                }
            }
            status = &mut wait_fut => {
                break status.map_err(|e| SubprocessError::Io(e.to_string()))?;
            }
        }
    };

    // Drain any remaining buffered chunks emitted right at process exit.
    while let Ok(chunk) = rx.try_recv() {
        match chunk {
            ChunkSource::Stdout(bytes) => stdout_buf.push(&bytes),
            ChunkSource::Stderr(bytes) => stderr_buf.push(&bytes),
        }
    }
    let _ = stdout_task.await;
    let _ = stderr_task.await;
    if let Some(tracker) = tracker {
        tracker.set(None);
    }

    let output = RunOutput {
        exit_code: exit_status.code(),
        stdout: stdout_buf.as_str(),
        stderr: stderr_buf.as_str(),
    };

    if options.throw_on_non_zero && !output.success() {
        return Err(SubprocessError::Io(format!(
            "command exited with code {:?}",
            output.exit_code
        )));
    }
    Ok(output)
}

/// Spawn `command` detached in its own process group and return the pgid
/// immediately, without waiting or capturing output. The returned pgid
/// is the only handle the caller needs to later call [`kill_group`] —
/// teardown must work even if the direct child has already exited but
/// grandchildren still hold stdio, which a remembered pgid (rather than
/// a `Child` reference) guarantees.
pub async fn spawn_detached(command: &str, secrets: &HashMap<String, String>) -> Result<i32, SubprocessError> {
    let env = build_env(secrets);
    let mut cmd = Command::new("/bin/sh");
    cmd.arg("-lc").arg(command);
    cmd.env_clear();
    cmd.envs(env);
    cmd.stdin(Stdio::null());
    cmd.stdout(Stdio::null());
    cmd.stderr(Stdio::null());
    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        cmd.process_group(0);
    }
    let child = cmd.spawn().map_err(|e| SubprocessError::Spawn(e.to_string()))?;
    let pgid = child.id().ok_or_else(|| SubprocessError::Spawn("child exited before pid was observed".to_string()))?;
    // Drop without kill_on_drop: the process is meant to outlive this handle.
    drop(child);
    Ok(pgid as i32)
}

/// Terminate a process group: SIGTERM, then SIGKILL after a short grace
/// period if it is still alive. Must succeed even if the direct child
/// already exited but grandchildren still hold stdio.
#[cfg(unix)]
pub async fn kill_group(pgid: Option<i32>) {
    use nix::sys::signal::{kill, Signal};
    use nix::unistd::Pid;

    let Some(pgid) = pgid else { return };
    let target = Pid::from_raw(-pgid);
    let _ = kill(target, Signal::SIGTERM);
    tokio::time::sleep(Duration::from_millis(500)).await;
    // kill(pgid, 0) with Signal unset (None) probes liveness.
    if kill(Pid::from_raw(pgid), None).is_ok() {
        let _ = kill(target, Signal::SIGKILL);
    }
}

#[cfg(not(unix))]
pub async fn kill_group(_pgid: Option<i32>) {}

#[cfg(test)]
#[path = "supervisor_tests.rs"]
mod tests;
