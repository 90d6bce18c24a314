//! Build/preview driver
//!
//! The session tells the driver which files to compile and when the first
//! preview of a document is due. [`Motion`] runs the typesetter on a
//! background thread and is polled from the UI frame loop.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread;

use super::environment::EnvFiles;

/// Receives the environment of each (re)created document
pub trait PreviewDriver {
    fn update_env_files(&mut self, files: &EnvFiles);
    fn initial_preview(&mut self);
}

/// Result of the latest typesetter run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompileState {
    /// Nothing compiled for the current environment
    Idle,
    Running,
    Succeeded,
    /// First error line of the typesetter log, or why it could not run
    Failed(String),
}

/// Message from a compile thread
#[derive(Debug)]
struct CompileOutcome {
    generation: u64,
    result: Result<(), String>,
}

/// Preview state shown by the preview panel
#[derive(Debug)]
pub struct Motion {
    files: Option<EnvFiles>,
    typesetter: String,
    /// Set by `initial_preview`, cleared once the app has compiled for it
    preview_requested: bool,
    state: CompileState,
    /// Bumped on every environment change so late results are dropped
    generation: u64,
    /// Buffer text that arrived while a compile was running
    pending: Option<String>,
    outcome_rx: Option<Receiver<CompileOutcome>>,
}

impl Motion {
    pub fn new(typesetter: impl Into<String>) -> Self {
        Self {
            files: None,
            typesetter: typesetter.into(),
            preview_requested: false,
            state: CompileState::Idle,
            generation: 0,
            pending: None,
            outcome_rx: None,
        }
    }

    pub fn files(&self) -> Option<&EnvFiles> {
        self.files.as_ref()
    }

    pub fn typesetter(&self) -> &str {
        &self.typesetter
    }

    pub fn state(&self) -> &CompileState {
        &self.state
    }

    pub fn is_running(&self) -> bool {
        self.outcome_rx.is_some()
    }

    /// Compiled PDF, if the typesetter has produced one
    pub fn output(&self) -> Option<&Path> {
        self.files
            .as_ref()
            .map(|f| f.output_file.as_path())
            .filter(|p| p.exists())
    }

    /// Consume a pending preview request
    pub fn take_preview_request(&mut self) -> bool {
        std::mem::take(&mut self.preview_requested)
    }

    /// Typeset `text` through the working file.
    ///
    /// While a run is in progress only the newest text is kept and compiled
    /// once that run finishes.
    pub fn compile(&mut self, text: &str) {
        if self.files.is_none() {
            tracing::debug!("No environment yet, nothing to compile");
            return;
        }
        if self.is_running() {
            self.pending = Some(text.to_string());
            return;
        }
        self.start_compile(text);
    }

    fn start_compile(&mut self, text: &str) {
        let Some(files) = self.files.clone() else {
            return;
        };

        if let Err(e) = std::fs::write(&files.working_file, text) {
            tracing::warn!(
                "Failed to write working file {}: {}",
                files.working_file.display(),
                e
            );
            self.state = CompileState::Failed(format!(
                "could not write {}: {}",
                files.working_file.display(),
                e
            ));
            return;
        }

        let (outcome_tx, outcome_rx) = mpsc::channel();
        Self::spawn_compile_thread(
            self.typesetter.clone(),
            files,
            self.generation,
            outcome_tx,
        );
        self.outcome_rx = Some(outcome_rx);
        self.state = CompileState::Running;
        tracing::debug!("Compiling with {}", self.typesetter);
    }

    /// Run the typesetter to completion on a background thread
    fn spawn_compile_thread(
        typesetter: String,
        files: EnvFiles,
        generation: u64,
        tx: Sender<CompileOutcome>,
    ) {
        thread::spawn(move || {
            // Relative \input paths resolve against the document's directory
            let cwd: PathBuf = files
                .source_dir
                .clone()
                .unwrap_or_else(|| files.temp_dir.clone());
            let output = Command::new(&typesetter)
                .arg("-interaction=nonstopmode")
                .arg("-halt-on-error")
                .arg(format!("-output-directory={}", files.temp_dir.display()))
                .arg(&files.working_file)
                .current_dir(cwd)
                .stdin(Stdio::null())
                .stderr(Stdio::null())
                .output();

            let result = match output {
                Ok(out) if out.status.success() => Ok(()),
                Ok(out) => Err(first_error_line(&out.stdout)
                    .unwrap_or_else(|| format!("{} exited with {}", typesetter, out.status))),
                Err(e) => Err(format!("failed to run {}: {}", typesetter, e)),
            };
            // Receiver dropped: the environment changed, nobody wants this result
            let _ = tx.send(CompileOutcome { generation, result });
        });
    }

    /// Pick up a finished compile. Returns true when the state changed.
    pub fn poll(&mut self) -> bool {
        let Some(rx) = &self.outcome_rx else {
            return false;
        };

        let outcome = match rx.try_recv() {
            Ok(outcome) => outcome,
            Err(TryRecvError::Empty) => return false,
            Err(TryRecvError::Disconnected) => CompileOutcome {
                generation: self.generation,
                result: Err("compile thread stopped".to_string()),
            },
        };
        self.outcome_rx = None;

        if outcome.generation == self.generation {
            self.state = match outcome.result {
                Ok(()) => {
                    tracing::info!("Compiled with {}", self.typesetter);
                    CompileState::Succeeded
                }
                Err(message) => {
                    tracing::warn!("Compilation failed: {}", message);
                    CompileState::Failed(message)
                }
            };
        }

        if let Some(text) = self.pending.take() {
            self.start_compile(&text);
        }
        true
    }
}

/// First `! ...` line of a TeX log
fn first_error_line(stdout: &[u8]) -> Option<String> {
    String::from_utf8_lossy(stdout)
        .lines()
        .find(|line| line.starts_with('!'))
        .map(|line| line.trim_start_matches('!').trim().to_string())
}

impl PreviewDriver for Motion {
    fn update_env_files(&mut self, files: &EnvFiles) {
        tracing::debug!(
            "Preview now tracks {} -> {}",
            files.working_file.display(),
            files.output_file.display()
        );
        self.files = Some(files.clone());
        self.generation += 1;
        self.outcome_rx = None;
        self.pending = None;
        self.state = CompileState::Idle;
    }

    fn initial_preview(&mut self) {
        tracing::debug!("Initial preview requested ({})", self.typesetter);
        self.preview_requested = true;
    }
}
