//! Search orchestration: one process runner and one output parser per
//! request, typed event delivery, and the session state machine.
//!
//! State transitions: `Idle → Running → (Completed | Errored | Cancelled)`,
//! and every terminal state accepts a new `submit`.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::error::SpecError;
use crate::search::parser::OutputParser;
use crate::search::runner::{ProcessEvent, ProcessExit, ProcessRunner};
use crate::types::{SearchEvent, SearchMode, SearchOutcome, SearchSpec, SessionState};

/// Map a spec to the search tool's command line.
///
/// `-n` is always passed so match lines carry line numbers. The default is
/// case-insensitive: `-i` is appended unless the spec explicitly asks for
/// case sensitivity.
pub fn build_command_args(spec: &SearchSpec) -> Vec<String> {
    let mut args = vec!["-n".to_string()];
    if !spec.case_sensitive {
        args.push("-i".to_string());
    }
    if spec.include_hidden {
        args.push("--hidden".to_string());
    }
    match spec.mode {
        SearchMode::Regexp => args.push("-e".to_string()),
        SearchMode::Literal => args.push("-F".to_string()),
    }
    args.push(spec.pattern.clone());
    let root = spec.root.to_string_lossy();
    if !root.is_empty() {
        args.push(root.into_owned());
    }
    args
}

struct ActiveSearch {
    runner: ProcessRunner,
    pump: JoinHandle<()>,
    /// Cancelled to suppress records already in flight but not yet forwarded
    /// (best effort).
    suppress: CancellationToken,
}

/// Owns the search lifecycle for one consumer at a time.
pub struct SearchSession {
    program: PathBuf,
    state: Arc<Mutex<SessionState>>,
    active: Option<ActiveSearch>,
}

impl SearchSession {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            state: Arc::new(Mutex::new(SessionState::Idle)),
            active: None,
        }
    }

    pub fn state(&self) -> SessionState {
        *self.state.lock().unwrap()
    }

    /// Validate and launch a new search. Any running search is fully stopped
    /// first; its consumer receives a single `Finished(Cancelled)`.
    ///
    /// The returned receiver carries this search's records, stderr notices
    /// and exactly one `Finished` event. A launch failure is delivered as
    /// that terminal event rather than a synchronous error.
    pub async fn submit(
        &mut self,
        spec: SearchSpec,
    ) -> Result<mpsc::UnboundedReceiver<SearchEvent>, SpecError> {
        spec.validate()?;
        self.stop_active().await;

        let (event_sender, event_receiver) = mpsc::unbounded_channel();
        let (process_sender, process_receiver) = mpsc::unbounded_channel();
        let mut runner = ProcessRunner::new(process_sender);

        *self.state.lock().unwrap() = SessionState::Running;
        log::info!(
            "starting search: pattern={:?} root={} mode={:?}",
            spec.pattern,
            spec.root.display(),
            spec.mode,
        );

        if let Err(error) = runner.start(&self.program, build_command_args(&spec)).await {
            log::error!("search launch failed: {}", error);
            *self.state.lock().unwrap() = SessionState::Errored;
            let _ = event_sender.send(SearchEvent::Finished(SearchOutcome::Errored {
                message: error.to_string(),
            }));
            return Ok(event_receiver);
        }

        let suppress = CancellationToken::new();
        let pump = tokio::spawn(pump_events(
            process_receiver,
            event_sender,
            Arc::clone(&self.state),
            suppress.clone(),
        ));
        self.active = Some(ActiveSearch {
            runner,
            pump,
            suppress,
        });
        Ok(event_receiver)
    }

    /// Stop the running search. Valid only while running; cancelling an idle
    /// or finished session is a no-op.
    pub async fn cancel(&mut self) {
        if self.state() != SessionState::Running {
            return;
        }
        self.stop_active().await;
    }

    async fn stop_active(&mut self) {
        let Some(mut active) = self.active.take() else {
            return;
        };
        active.suppress.cancel();
        active.runner.stop().await;
        if let Err(error) = active.pump.await {
            log::warn!("session pump task failed: {}", error);
        }
    }
}

async fn pump_events(
    mut process_receiver: mpsc::UnboundedReceiver<ProcessEvent>,
    events: mpsc::UnboundedSender<SearchEvent>,
    state: Arc<Mutex<SessionState>>,
    suppress: CancellationToken,
) {
    // Fresh parser per search: current-file context never leaks across
    // sessions.
    let mut parser = OutputParser::new();
    while let Some(event) = process_receiver.recv().await {
        match event {
            ProcessEvent::Stdout(chunk) => {
                let records = parser.push_chunk(&chunk);
                if suppress.is_cancelled() {
                    continue;
                }
                for record in records {
                    let _ = events.send(SearchEvent::Record(record));
                }
            }
            ProcessEvent::Stderr(line) => {
                if suppress.is_cancelled() {
                    continue;
                }
                log::warn!("search tool stderr: {}", line);
                let _ = events.send(SearchEvent::StderrNotice(line));
            }
            ProcessEvent::Exited(exit) => {
                let outcome = match exit {
                    ProcessExit::Cancelled => SearchOutcome::Cancelled,
                    ProcessExit::Exited { code: Some(code) } => {
                        for record in parser.finish() {
                            if !suppress.is_cancelled() {
                                let _ = events.send(SearchEvent::Record(record));
                            }
                        }
                        SearchOutcome::Completed {
                            exit_code: Some(code),
                        }
                    }
                    ProcessExit::Exited { code: None } => SearchOutcome::Errored {
                        message: "search process terminated abnormally".to_string(),
                    },
                };
                *state.lock().unwrap() = match &outcome {
                    SearchOutcome::Completed { .. } => SessionState::Completed,
                    SearchOutcome::Errored { .. } => SessionState::Errored,
                    SearchOutcome::Cancelled => SessionState::Cancelled,
                };
                let _ = events.send(SearchEvent::Finished(outcome));
                // Exactly one terminal event per search.
                return;
            }
        }
    }
}
