//! LaTeX source editor panel

use std::io;
use std::path::Path;

use eframe::egui;

use crate::core::editor::EditorBuffer;

/// UTF-8 byte order mark some editors put at the start of files
const BOM: char = '\u{feff}';

/// Source editor holding the document text
pub struct EditorPane {
    content: String,
    /// Edited since the last fill
    modified: bool,
    font_size: f32,
}

#[cfg(test)]
impl Default for EditorPane {
    fn default() -> Self {
        Self::new(14.0)
    }
}

impl EditorPane {
    pub fn new(font_size: f32) -> Self {
        Self {
            content: String::new(),
            modified: false,
            font_size,
        }
    }

    pub fn is_modified(&self) -> bool {
        self.modified
    }

    /// Show the editor. Returns true if the text changed this frame.
    pub fn show(&mut self, ui: &mut egui::Ui) -> bool {
        let mut changed = false;
        egui::ScrollArea::vertical()
            .id_salt("editor_scroll")
            .show(ui, |ui| {
                let response = egui::TextEdit::multiline(&mut self.content)
                    .font(egui::FontId::monospace(self.font_size))
                    .code_editor()
                    .desired_width(f32::INFINITY)
                    .desired_rows(30)
                    .show(ui);

                if response.response.changed() {
                    self.modified = true;
                    changed = true;
                }
            });
        changed
    }
}

impl EditorBuffer for EditorPane {
    fn decode_text(&self, path: &Path) -> io::Result<String> {
        let bytes = std::fs::read(path)?;
        let text = String::from_utf8(bytes)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        Ok(match text.strip_prefix(BOM) {
            Some(rest) => rest.to_string(),
            None => text,
        })
    }

    fn encode_text(&self, text: &str) -> io::Result<Vec<u8>> {
        Ok(text.as_bytes().to_vec())
    }

    fn fill_buffer(&mut self, text: &str) {
        self.content = text.to_string();
        self.modified = false;
    }

    fn grab_buffer(&self) -> String {
        self.content.clone()
    }

    fn mark_saved(&mut self) {
        self.modified = false;
    }
}
