//! Main application state and UI coordination

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use eframe::egui;

use crate::core::config::{AppConfig, ConfigStore};
use crate::core::editor::EditorBuffer;
use crate::core::error::SessionError;
use crate::core::motion::Motion;
use crate::core::session::DocumentSession;
use crate::ui::{editor::EditorPane, preview::PreviewPanel, status_bar::StatusBar};

/// The document session as wired into the application
pub type Session = DocumentSession<EditorPane, Motion, StatusBar>;

/// How often to check on a running typesetter
const COMPILE_POLL: Duration = Duration::from_millis(100);

/// File actions requested from menus or shortcuts this frame
#[derive(Debug, Default)]
struct PendingActions {
    new: bool,
    open: bool,
    open_path: Option<PathBuf>,
    save: bool,
    save_as: bool,
    export: bool,
    template: Option<String>,
    save_template: bool,
    remove_template: Option<String>,
    compile: bool,
}

/// Main application state
pub struct TexpadApp {
    /// The open document
    pub session: Session,
    /// Application configuration
    pub config: AppConfig,
    /// Window title last sent to the viewport
    title: String,
}

impl TexpadApp {
    /// Create a new application instance
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        // Load config or use defaults
        let config = AppConfig::load().unwrap_or_else(|e| {
            tracing::warn!("Using default config: {:#}", e);
            AppConfig::default()
        });

        Self::apply_theme(&cc.egui_ctx, &config);

        let typesetter = config
            .get_value("compile", "typesetter")
            .unwrap_or_else(|| "pdflatex".to_string());
        let session = DocumentSession::new(
            EditorPane::new(config.editor.font_size),
            Motion::new(typesetter),
            StatusBar::new(),
        );

        let mut app = Self {
            session,
            config,
            title: String::new(),
        };
        app.open_initial_document();
        if app.config.get_bool("autosaving") {
            app.session.reset_autosave(&app.config);
        }
        app
    }

    fn apply_theme(ctx: &egui::Context, config: &AppConfig) {
        match config.get_value("ui", "theme").as_deref() {
            Some("light") => ctx.set_visuals(egui::Visuals::light()),
            _ => ctx.set_visuals(egui::Visuals::dark()),
        }
    }

    /// Reopen the last document, or start from the welcome text
    fn open_initial_document(&mut self) {
        match self.config.last_document.clone().filter(|p| p.exists()) {
            Some(path) => self.open_document(path),
            None => self.new_document(),
        }
    }

    /// Start a new unsaved document
    pub fn new_document(&mut self) {
        if let Err(e) = self.session.make_environment(None) {
            self.report(e);
            return;
        }
        if let Err(e) = self.session.load_default_text(&self.config) {
            self.report(e);
        }
    }

    /// Start a new unsaved document from a stored template
    pub fn new_from_template(&mut self, name: &str) {
        if let Err(e) = self.session.load_template(&self.config, name) {
            self.report(e);
        }
    }

    /// Store the editor contents as a new template
    pub fn save_buffer_as_template(&mut self) {
        let text = self.session.editor().grab_buffer();
        let name = self.config.add_template(&text);
        self.save_config();
        self.session.set_status(&format!("Saved template {name}"));
    }

    pub fn remove_template(&mut self, name: &str) {
        if self.config.remove_template(name) {
            self.save_config();
            self.session.set_status(&format!("Removed template {name}"));
        }
    }

    /// Typeset the current buffer
    fn compile(&mut self) {
        let text = self.session.editor().grab_buffer();
        self.session.preview_mut().compile(&text);
    }

    /// Open a document
    pub fn open_document(&mut self, path: PathBuf) {
        match self.session.load_file(&path) {
            Ok(()) => {
                self.config.add_recent_document(path);
                self.save_config();
            }
            Err(e) => self.report(e),
        }
    }

    /// Save the open document, asking for a path if it was never saved
    pub fn save_document(&mut self) {
        let Some(path) = self.session.filename().map(|p| p.to_path_buf()) else {
            self.save_document_as();
            return;
        };
        if let Err(e) = self.session.save_file(&path) {
            self.report(e);
        }
    }

    pub fn save_document_as(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .add_filter("LaTeX", &["tex"])
            .save_file()
        else {
            return;
        };
        match self.session.save_file_as(&path) {
            Ok(()) => {
                self.config.add_recent_document(path);
                self.save_config();
            }
            Err(e) => self.report(e),
        }
    }

    pub fn export_pdf(&mut self) {
        match self.session.export_pdf() {
            Ok(Some(path)) => self
                .session
                .set_status(&format!("Exported {}", path.display())),
            Ok(None) => self
                .session
                .set_status("Nothing to export, the document has not been compiled yet"),
            Err(e) => self.report(e),
        }
    }

    pub fn set_autosaving(&mut self, enabled: bool) {
        self.config.editor.autosaving = enabled;
        if enabled {
            self.session.reset_autosave(&self.config);
        } else {
            self.session.stop_autosave();
        }
        self.save_config();
    }

    /// `paper.tex*` style title for the open document
    fn window_title(&self) -> String {
        let name = self
            .session
            .environment()
            .source()
            .and_then(Path::file_name)
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| "Untitled".to_string());
        let marker = if self.session.editor().is_modified() { "*" } else { "" };
        format!("{name}{marker} - Texpad")
    }

    /// Route a session failure to the log and the status bar
    fn report(&mut self, error: SessionError) {
        let message = match std::error::Error::source(&error) {
            Some(cause) => format!("{error}: {cause}"),
            None => error.to_string(),
        };
        tracing::error!("{}", message);
        self.session.set_status(&message);
    }

    fn save_config(&self) {
        if let Err(e) = self.config.save() {
            tracing::warn!("Failed to save config: {:#}", e);
        }
    }

    /// Render the top menu bar
    fn render_menu_bar(&mut self, ctx: &egui::Context, actions: &mut PendingActions) {
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("New").clicked() {
                        actions.new = true;
                        ui.close();
                    }
                    if ui.button("Open...").clicked() {
                        actions.open = true;
                        ui.close();
                    }
                    ui.menu_button("New From Template", |ui| {
                        let mut any = false;
                        for name in self.config.template_names() {
                            any = true;
                            if ui.button(name).clicked() {
                                actions.template = Some(name.to_string());
                                ui.close();
                            }
                        }
                        if !any {
                            ui.label("No templates");
                        }
                        ui.separator();
                        if ui.button("Save Buffer as Template").clicked() {
                            actions.save_template = true;
                            ui.close();
                        }
                        ui.menu_button("Remove Template", |ui| {
                            for name in self.config.template_names() {
                                if ui.button(name).clicked() {
                                    actions.remove_template = Some(name.to_string());
                                    ui.close();
                                }
                            }
                        });
                    });
                    ui.menu_button("Open Recent", |ui| {
                        if self.config.recent_documents.is_empty() {
                            ui.label("No recent documents");
                        }
                        for path in &self.config.recent_documents {
                            if ui.button(path.display().to_string()).clicked() {
                                actions.open_path = Some(path.clone());
                                ui.close();
                            }
                        }
                    });
                    ui.separator();
                    if ui.button("Save").clicked() {
                        actions.save = true;
                        ui.close();
                    }
                    if ui.button("Save As...").clicked() {
                        actions.save_as = true;
                        ui.close();
                    }
                    if ui.button("Export PDF").clicked() {
                        actions.export = true;
                        ui.close();
                    }
                    ui.separator();
                    if ui.button("Exit").clicked() {
                        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                    }
                });

                ui.menu_button("Options", |ui| {
                    let mut autosaving = self.config.editor.autosaving;
                    if ui.checkbox(&mut autosaving, "Autosave").changed() {
                        self.set_autosaving(autosaving);
                    }
                    if ui
                        .checkbox(&mut self.config.ui.preview_visible, "Show Preview")
                        .changed()
                    {
                        self.save_config();
                    }
                });
            });
        });
    }

    fn run_actions(&mut self, actions: PendingActions) {
        if actions.new {
            self.new_document();
        }
        if let Some(name) = actions.template {
            self.new_from_template(&name);
        }
        if actions.save_template {
            self.save_buffer_as_template();
        }
        if let Some(name) = actions.remove_template {
            self.remove_template(&name);
        }
        if actions.open {
            if let Some(path) = rfd::FileDialog::new()
                .add_filter("LaTeX", &["tex"])
                .pick_file()
            {
                self.open_document(path);
            }
        }
        if let Some(path) = actions.open_path {
            self.open_document(path);
        }
        if actions.save {
            self.save_document();
        }
        if actions.save_as {
            self.save_document_as();
        }
        if actions.export {
            self.export_pdf();
        }
        // After the file actions, so a new environment compiles its own text
        let requested = self.session.preview_mut().take_preview_request();
        if actions.compile || requested {
            self.compile();
        }
    }
}

impl eframe::App for TexpadApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.session.tick(Instant::now());
        self.session.preview_mut().poll();

        // Handle keyboard shortcuts
        let mut actions = ctx.input(|i| PendingActions {
            new: i.modifiers.ctrl && i.key_pressed(egui::Key::N),
            open: i.modifiers.ctrl && i.key_pressed(egui::Key::O),
            save: i.modifiers.ctrl && !i.modifiers.shift && i.key_pressed(egui::Key::S),
            save_as: i.modifiers.ctrl && i.modifiers.shift && i.key_pressed(egui::Key::S),
            export: i.modifiers.ctrl && i.key_pressed(egui::Key::E),
            ..Default::default()
        });

        // Render menu bar
        self.render_menu_bar(ctx, &mut actions);

        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            self.session.status().show(ui);
        });

        // Render main content area
        let preview_visible = self.config.get_bool("preview_visible");
        egui::CentralPanel::default().show(ctx, |ui| {
            if !preview_visible {
                actions.compile |= self.session.editor_mut().show(ui);
                return;
            }

            // Split view: editor on left, preview on right
            let available_width = ui.available_width();
            ui.horizontal(|ui| {
                ui.set_min_width(available_width);

                ui.vertical(|ui| {
                    ui.set_width(available_width / 2.0 - 4.0);
                    actions.compile |= self.session.editor_mut().show(ui);
                });

                ui.separator();

                ui.vertical(|ui| {
                    ui.set_width(available_width / 2.0 - 4.0);
                    actions.compile |= PreviewPanel::show(ui, self.session.preview());
                });
            });
        });

        self.run_actions(actions);

        let title = self.window_title();
        if title != self.title {
            ctx.send_viewport_cmd(egui::ViewportCommand::Title(title.clone()));
            self.title = title;
        }

        if self.session.preview().is_running() {
            ctx.request_repaint_after(COMPILE_POLL);
        } else if let Some(deadline) = self.session.next_deadline() {
            ctx.request_repaint_after(deadline.saturating_duration_since(Instant::now()));
        }
    }
}
