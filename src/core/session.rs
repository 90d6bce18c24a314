//! Document session: the open document, its working files and autosave
//!
//! The session sits between the editor buffer, the preview driver and the
//! status bar. Timed work (autosave, clearing status messages) is queued as
//! [`SessionEvent`]s and delivered by [`DocumentSession::tick`] from the UI
//! frame loop, so every mutation happens on the UI thread.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use super::config::ConfigStore;
use super::editor::EditorBuffer;
use super::environment::{EnvFiles, Environment};
use super::error::SessionError;
use super::motion::PreviewDriver;
use super::status::StatusSink;
use super::timer::{Repeat, TimerId, TimerQueue};

/// Status bar context the session posts under
pub const STATUS_CONTEXT: &str = "Texpad";
/// How long a status message stays visible
pub const STATUS_TIMEOUT: Duration = Duration::from_millis(4000);

/// Timed work owned by the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    Autosave,
    ClearStatus,
}

/// The currently open document and its collaborators
pub struct DocumentSession<E, P, S> {
    editor: E,
    preview: P,
    status: S,
    status_context: u32,
    environment: Environment,
    timers: TimerQueue<SessionEvent>,
    autosave: Option<TimerId>,
    /// Pending clear of the message currently shown
    status_clear: Option<TimerId>,
}

impl<E, P, S> DocumentSession<E, P, S>
where
    E: EditorBuffer,
    P: PreviewDriver,
    S: StatusSink,
{
    /// Create a session with working files under `TMPDIR`
    pub fn new(editor: E, preview: P, status: S) -> Self {
        Self::with_environment(editor, preview, status, Environment::new())
    }

    pub fn with_environment(editor: E, preview: P, mut status: S, environment: Environment) -> Self {
        let status_context = status.context_id(STATUS_CONTEXT);
        Self {
            editor,
            preview,
            status,
            status_context,
            environment,
            timers: TimerQueue::new(),
            autosave: None,
            status_clear: None,
        }
    }

    /// Allocate new working files, switching source if `filename` is given
    pub fn create_environment(&mut self, filename: Option<&Path>) -> Result<(), SessionError> {
        self.environment.create(filename)
    }

    /// Set up the environment for `filename` (or a new unsaved document)
    /// and hand it to the preview driver.
    pub fn make_environment(&mut self, filename: Option<&Path>) -> Result<(), SessionError> {
        if filename.is_none() {
            self.environment.clear_source();
        }
        self.create_environment(filename)?;
        if let Some(files) = self.environment.files() {
            self.preview.update_env_files(&files);
        }
        self.preview.initial_preview();
        Ok(())
    }

    /// Fill the editor with the welcome text and move to the home directory
    pub fn load_default_text(&mut self, config: &dyn ConfigStore) -> Result<(), SessionError> {
        let text = config
            .get_value("default_text", "welcome")
            .unwrap_or_default();
        self.editor.fill_buffer(&text);

        let Some(home) = home_dir() else {
            tracing::warn!("No home directory, staying in the current directory");
            return Ok(());
        };
        std::env::set_current_dir(&home)
            .map_err(|source| SessionError::ChangeDirectory { path: home, source })
    }

    /// Start a new unsaved document from the template called `name`
    pub fn load_template(
        &mut self,
        config: &dyn ConfigStore,
        name: &str,
    ) -> Result<(), SessionError> {
        let text = config
            .get_value("default_text", name)
            .ok_or_else(|| SessionError::UnknownTemplate(name.to_string()))?;
        self.make_environment(None)?;
        self.editor.fill_buffer(&text);
        self.set_status(&format!("Loaded template {name}"));
        Ok(())
    }

    /// Open `path` in the editor and make it the session's document
    pub fn load_file(&mut self, path: &Path) -> Result<(), SessionError> {
        let text = self
            .editor
            .decode_text(path)
            .map_err(|source| SessionError::Load {
                path: path.to_path_buf(),
                source,
            })?;
        self.editor.fill_buffer(&text);
        self.make_environment(Some(path))?;
        self.set_status(&format!("Loading file {}", path.display()));
        Ok(())
    }

    /// Write the buffer to the open document.
    ///
    /// `filename` does not choose the destination: the buffer always goes to
    /// the document the session has open. Use [`Self::save_file_as`] to
    /// write somewhere else.
    pub fn save_file(&mut self, filename: &Path) -> Result<(), SessionError> {
        let target = self
            .environment
            .source()
            .map(Path::to_path_buf)
            .ok_or(SessionError::NoDocument)?;
        if filename != target {
            tracing::debug!(
                "Save requested for {}, writing open document {}",
                filename.display(),
                target.display()
            );
        }

        let content = self.editor.grab_buffer();
        let encoded = self
            .editor
            .encode_text(&content)
            .map_err(|source| SessionError::Save {
                path: target.clone(),
                source,
            })?;

        self.set_status(&format!("Saving file {}", target.display()));
        std::fs::write(&target, encoded).map_err(|source| SessionError::Save {
            path: target.clone(),
            source,
        })?;
        self.editor.mark_saved();

        tracing::info!("Saved document: {}", target.display());
        Ok(())
    }

    /// Make `path` the open document and save the buffer there.
    ///
    /// If the write fails the previous document stays open.
    pub fn save_file_as(&mut self, path: &Path) -> Result<(), SessionError> {
        let previous = self.environment.source().map(Path::to_path_buf);
        self.environment.set_source(path);

        if let Err(e) = self.save_file(path) {
            match previous {
                Some(previous) => self.environment.set_source(&previous),
                None => self.environment.clear_source(),
            }
            return Err(e);
        }

        if let Some(files) = self.environment.files() {
            self.preview.update_env_files(&files);
        }
        Ok(())
    }

    /// Copy the compiled PDF next to the source as `<base_name>.pdf`.
    ///
    /// Returns `Ok(None)` when nothing has been compiled yet.
    pub fn export_pdf(&mut self) -> Result<Option<PathBuf>, SessionError> {
        let target = self
            .environment
            .export_target()
            .ok_or(SessionError::NoDocument)?;
        let source_dir = self
            .environment
            .source_dir()
            .map(Path::to_path_buf)
            .ok_or(SessionError::NoDocument)?;

        let Some(output) = self
            .environment
            .output_file()
            .filter(|p| p.exists())
            .map(Path::to_path_buf)
        else {
            tracing::debug!("No compiled output to export");
            return Ok(None);
        };

        std::fs::copy(&output, &target).map_err(|source| SessionError::Export {
            from: output.clone(),
            to: target.clone(),
            source,
        })?;
        std::env::set_current_dir(&source_dir).map_err(|source| {
            SessionError::ChangeDirectory {
                path: source_dir.clone(),
                source,
            }
        })?;

        tracing::info!("Exported PDF to {}", target.display());
        Ok(Some(target))
    }

    /// Save the open document every `interval`. A zero interval disables autosave.
    pub fn start_autosave(&mut self, interval: Duration) {
        self.stop_autosave();
        if interval.is_zero() {
            tracing::debug!("Autosave interval is zero, autosave stays off");
            return;
        }
        self.autosave = Some(
            self.timers
                .repeating(Instant::now(), interval, SessionEvent::Autosave),
        );
        tracing::debug!("Autosave every {:?}", interval);
    }

    pub fn stop_autosave(&mut self) {
        if let Some(id) = self.autosave.take() {
            self.timers.cancel(id);
            tracing::debug!("Autosave stopped");
        }
    }

    /// Restart autosave with the configured `autosave_timer` seconds
    pub fn reset_autosave(&mut self, config: &dyn ConfigStore) {
        self.stop_autosave();
        let seconds = u64::try_from(config.get_int("autosave_timer")).unwrap_or(0);
        self.start_autosave(Duration::from_secs(seconds));
    }

    #[allow(dead_code)]
    pub fn is_autosaving(&self) -> bool {
        self.autosave.is_some()
    }

    /// Autosave timer body. Keeps the timer running even with no document.
    pub fn autosave_document(&mut self) -> Repeat {
        if let Some(source) = self.environment.source().map(Path::to_path_buf) {
            match self.save_file(&source) {
                Ok(()) => self.set_status(&format!("Autosaving file {}", source.display())),
                Err(e) => tracing::warn!("Autosave failed: {:#}", anyhow::Error::from(e)),
            }
        }
        Repeat::Continue
    }

    /// Show `message` and clear it after [`STATUS_TIMEOUT`].
    ///
    /// A message still on screen is replaced along with its pending clear.
    pub fn set_status(&mut self, message: &str) {
        self.remove_status();
        self.status.push(self.status_context, message);
        self.status_clear = Some(self.timers.once(
            Instant::now(),
            STATUS_TIMEOUT,
            SessionEvent::ClearStatus,
        ));
    }

    pub fn remove_status(&mut self) {
        if let Some(id) = self.status_clear.take() {
            self.timers.cancel(id);
            self.status.pop(self.status_context);
        }
    }

    /// Run the timed work due at `now`
    pub fn tick(&mut self, now: Instant) {
        for (id, event) in self.timers.due(now) {
            match event {
                SessionEvent::Autosave if self.autosave == Some(id) => {
                    if self.autosave_document() == Repeat::Stop {
                        self.stop_autosave();
                    }
                }
                SessionEvent::ClearStatus if self.status_clear == Some(id) => {
                    self.remove_status();
                }
                // Superseded while this batch was being handled
                _ => {}
            }
        }
    }

    /// When [`Self::tick`] next has work to do
    pub fn next_deadline(&self) -> Option<Instant> {
        self.timers.next_deadline()
    }

    pub fn filename(&self) -> Option<&Path> {
        self.environment.source()
    }

    #[allow(dead_code)]
    pub fn env_files(&self) -> Option<EnvFiles> {
        self.environment.files()
    }

    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    pub fn editor(&self) -> &E {
        &self.editor
    }

    pub fn editor_mut(&mut self) -> &mut E {
        &mut self.editor
    }

    pub fn preview(&self) -> &P {
        &self.preview
    }

    pub fn preview_mut(&mut self) -> &mut P {
        &mut self.preview
    }

    pub fn status(&self) -> &S {
        &self.status
    }
}

/// `HOME`, or the platform's idea of the user's home directory
fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .filter(|home| !home.is_empty())
        .map(PathBuf::from)
        .or_else(|| directories::BaseDirs::new().map(|dirs| dirs.home_dir().to_path_buf()))
}
