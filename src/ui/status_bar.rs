//! Status bar at the bottom of the window

use eframe::egui;

use crate::core::status::StatusSink;

/// Message stack shared by several contexts; the newest message is shown
#[derive(Debug, Default)]
pub struct StatusBar {
    contexts: Vec<String>,
    stack: Vec<(u32, String)>,
}

impl StatusBar {
    pub fn new() -> Self {
        Self::default()
    }

    /// The message currently displayed
    pub fn current(&self) -> Option<&str> {
        self.stack.last().map(|(_, message)| message.as_str())
    }

    pub fn show(&self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.label(self.current().unwrap_or_default());
        });
    }
}

impl StatusSink for StatusBar {
    fn context_id(&mut self, description: &str) -> u32 {
        let index = match self.contexts.iter().position(|c| c == description) {
            Some(index) => index,
            None => {
                self.contexts.push(description.to_string());
                self.contexts.len() - 1
            }
        };
        // Ids start at 1
        index as u32 + 1
    }

    fn push(&mut self, context: u32, message: &str) {
        self.stack.push((context, message.to_string()));
    }

    fn pop(&mut self, context: u32) {
        if let Some(pos) = self.stack.iter().rposition(|(c, _)| *c == context) {
            self.stack.remove(pos);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_ids_are_stable() {
        let mut bar = StatusBar::new();
        let a = bar.context_id("Texpad");
        let b = bar.context_id("Preview");
        assert_ne!(a, b);
        assert_eq!(bar.context_id("Texpad"), a);
        assert!(a > 0);
    }

    #[test]
    fn test_pop_only_touches_own_context() {
        let mut bar = StatusBar::new();
        let session = bar.context_id("Texpad");
        let preview = bar.context_id("Preview");

        bar.push(session, "Saving");
        bar.push(preview, "Compiling");
        assert_eq!(bar.current(), Some("Compiling"));

        bar.pop(session);
        assert_eq!(bar.current(), Some("Compiling"));
        bar.pop(preview);
        assert_eq!(bar.current(), None);
        bar.pop(preview);
    }
}
