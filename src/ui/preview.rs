//! PDF preview panel

use eframe::egui;

use crate::core::motion::{CompileState, Motion};

/// Preview panel showing the compile state of the document
pub struct PreviewPanel;

impl PreviewPanel {
    /// Show the preview panel. Returns true if a recompile was requested.
    pub fn show(ui: &mut egui::Ui, motion: &Motion) -> bool {
        let Some(files) = motion.files() else {
            Self::show_empty(ui);
            return false;
        };

        let mut refresh = false;
        egui::ScrollArea::vertical()
            .id_salt("preview_scroll")
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("Preview");
                    if ui
                        .add_enabled(!motion.is_running(), egui::Button::new("Refresh"))
                        .clicked()
                    {
                        refresh = true;
                    }
                });
                ui.add_space(8.0);

                egui::Grid::new("preview_files").num_columns(2).show(ui, |ui| {
                    ui.label("Document");
                    ui.label(
                        files
                            .source
                            .as_ref()
                            .map(|p| p.display().to_string())
                            .unwrap_or_else(|| "(unsaved)".to_string()),
                    );
                    ui.end_row();

                    ui.label("Working file");
                    ui.monospace(files.working_file.display().to_string());
                    ui.end_row();

                    ui.label("Output");
                    ui.monospace(files.output_file.display().to_string());
                    ui.end_row();
                });

                ui.add_space(8.0);
                match motion.state() {
                    CompileState::Running => {
                        ui.horizontal(|ui| {
                            ui.spinner();
                            ui.label(format!("Compiling with {}", motion.typesetter()));
                        });
                    }
                    CompileState::Failed(message) => {
                        let color = ui.visuals().error_fg_color;
                        ui.colored_label(color, "Document could not be compiled");
                        ui.monospace(message.as_str());
                    }
                    CompileState::Idle | CompileState::Succeeded => {}
                }

                match motion.output() {
                    Some(pdf) => {
                        if ui.button("Open PDF").clicked() {
                            if let Err(e) = open::that(pdf) {
                                tracing::error!("Failed to open {}: {}", pdf.display(), e);
                            }
                        }
                    }
                    None if *motion.state() == CompileState::Idle => {
                        ui.label("Not compiled yet");
                    }
                    None => {}
                }
            });
        refresh
    }

    /// Show empty state
    fn show_empty(ui: &mut egui::Ui) {
        ui.vertical_centered(|ui| {
            ui.add_space(50.0);
            ui.label("No document");
            ui.label("Open a LaTeX file to see the preview");
        });
    }
}
