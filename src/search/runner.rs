//! External search process execution.
//!
//! One runner owns at most one live process at a time, behind an explicit
//! state tag. Output is streamed through an unbounded channel as it arrives;
//! the pump task emits exactly one terminal event per started process.

use std::ffi::OsStr;
use std::process::Stdio;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::process::{Child, ChildStderr, ChildStdout, Command};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::error::LaunchError;

/// Wait this long after a graceful termination request before force-killing.
pub const KILL_GRACE: Duration = Duration::from_millis(3000);

const STDOUT_CHUNK: usize = 8192;

/// Raw process output and lifecycle events.
#[derive(Debug, Clone, PartialEq)]
pub enum ProcessEvent {
    /// Raw stdout chunk, decoded as UTF-8.
    Stdout(String),
    /// One non-empty stderr line.
    Stderr(String),
    /// Terminal event; exactly one per started process.
    Exited(ProcessExit),
}

/// How a process ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessExit {
    /// The process exited on its own. `code` is `None` when it was killed by
    /// a signal; that is the only exit treated as abnormal downstream.
    Exited { code: Option<i32> },
    /// [`ProcessRunner::stop`] was requested before the process finished.
    Cancelled,
}

enum RunnerState {
    NotStarted,
    Running {
        token: CancellationToken,
        pump: JoinHandle<()>,
    },
    Stopped,
}

/// Owns one external search process at a time.
pub struct ProcessRunner {
    events: mpsc::UnboundedSender<ProcessEvent>,
    state: RunnerState,
}

impl ProcessRunner {
    pub fn new(events: mpsc::UnboundedSender<ProcessEvent>) -> Self {
        Self {
            events,
            state: RunnerState::NotStarted,
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, RunnerState::Running { .. })
    }

    /// Spawn `program` with `args`. A process still running from a previous
    /// start is fully stopped first, so two generations can never interleave
    /// on the event channel.
    pub async fn start<I, S>(
        &mut self,
        program: impl AsRef<OsStr>,
        args: I,
    ) -> Result<(), LaunchError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.stop().await;

        let program_name = program.as_ref().to_string_lossy().into_owned();
        let mut command = Command::new(program.as_ref());
        command
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = command.spawn().map_err(|source| LaunchError::Spawn {
            program: program_name.clone(),
            source,
        })?;
        let stdout = child.stdout.take().ok_or(LaunchError::StdoutUnavailable)?;
        let stderr = child.stderr.take().ok_or(LaunchError::StderrUnavailable)?;

        log::debug!("spawned search process: {}", program_name);

        let token = CancellationToken::new();
        let pump = tokio::spawn(pump_process(
            child,
            stdout,
            stderr,
            token.clone(),
            self.events.clone(),
        ));
        self.state = RunnerState::Running { token, pump };
        Ok(())
    }

    /// Request graceful termination, escalating to a forced kill after
    /// [`KILL_GRACE`]. Idempotent; a no-op when nothing is running.
    pub async fn stop(&mut self) {
        match std::mem::replace(&mut self.state, RunnerState::Stopped) {
            RunnerState::Running { token, pump } => {
                token.cancel();
                if let Err(error) = pump.await {
                    log::warn!("process pump task failed: {}", error);
                }
            }
            RunnerState::NotStarted => self.state = RunnerState::NotStarted,
            RunnerState::Stopped => {}
        }
    }
}

impl Drop for ProcessRunner {
    fn drop(&mut self) {
        // The detached pump finishes the shutdown on its own.
        if let RunnerState::Running { token, .. } = &self.state {
            token.cancel();
        }
    }
}

async fn pump_process(
    mut child: Child,
    mut stdout: ChildStdout,
    stderr: ChildStderr,
    token: CancellationToken,
    events: mpsc::UnboundedSender<ProcessEvent>,
) {
    let mut stderr_lines = BufReader::new(stderr).lines();
    let mut buffer = vec![0u8; STDOUT_CHUNK];
    let mut stdout_open = true;
    let mut stderr_open = true;

    while stdout_open || stderr_open {
        tokio::select! {
            _ = token.cancelled() => {
                shutdown_child(&mut child).await;
                let _ = events.send(ProcessEvent::Exited(ProcessExit::Cancelled));
                return;
            }
            read = stdout.read(&mut buffer), if stdout_open => {
                match read {
                    Ok(0) => stdout_open = false,
                    Ok(count) => {
                        let chunk = String::from_utf8_lossy(&buffer[..count]).into_owned();
                        let _ = events.send(ProcessEvent::Stdout(chunk));
                    }
                    Err(error) => {
                        log::warn!("stdout read failed: {}", error);
                        stdout_open = false;
                    }
                }
            }
            line = stderr_lines.next_line(), if stderr_open => {
                match line {
                    Ok(Some(line)) => {
                        if !line.trim().is_empty() {
                            let _ = events.send(ProcessEvent::Stderr(line));
                        }
                    }
                    Ok(None) => stderr_open = false,
                    Err(error) => {
                        log::warn!("stderr read failed: {}", error);
                        stderr_open = false;
                    }
                }
            }
        }
    }

    // Streams are done; the process may still be winding down.
    let exit = tokio::select! {
        _ = token.cancelled() => {
            shutdown_child(&mut child).await;
            ProcessExit::Cancelled
        }
        status = child.wait() => {
            match status {
                Ok(status) => {
                    log::debug!("search process exited: {}", status);
                    ProcessExit::Exited { code: status.code() }
                }
                Err(error) => {
                    log::error!("failed to wait for search process: {}", error);
                    ProcessExit::Exited { code: None }
                }
            }
        }
    };
    let _ = events.send(ProcessEvent::Exited(exit));
}

/// Graceful termination first, forced kill once the grace period elapses.
async fn shutdown_child(child: &mut Child) {
    #[cfg(unix)]
    if let Some(pid) = child.id() {
        // SAFETY: pid belongs to a child we still own.
        unsafe { libc::kill(pid as libc::pid_t, libc::SIGTERM) };
        match tokio::time::timeout(KILL_GRACE, child.wait()).await {
            Ok(_) => return,
            Err(_) => log::warn!("search process ignored SIGTERM, killing"),
        }
    }
    if let Err(error) = child.kill().await {
        log::warn!("failed to kill search process: {}", error);
    }
}
