//! Application configuration management

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

/// Text shown in the editor when the application starts without a document
pub const WELCOME_TEXT: &str = r"\documentclass{article}
\begin{document}

\section{Welcome}
Start typing your document here. The preview updates as you write.

\end{document}
";

/// Name given to the first template saved without one
const TEMPLATE_PREFIX: &str = "untitled";

/// Key/value lookups the document session needs from configuration
pub trait ConfigStore {
    fn get_bool(&self, key: &str) -> bool;
    fn get_value(&self, section: &str, key: &str) -> Option<String>;
    fn get_int(&self, key: &str) -> i64;
}

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Last opened document
    pub last_document: Option<PathBuf>,
    /// Recently opened documents, newest first
    pub recent_documents: Vec<PathBuf>,
    /// Editor settings
    pub editor: EditorConfig,
    /// Typesetting settings
    pub compile: CompileConfig,
    /// Templates for new documents
    pub default_text: DefaultText,
    /// UI settings
    pub ui: UiConfig,
}

/// Editor-specific settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Font size in pixels
    pub font_size: f32,
    /// Save the open document periodically
    pub autosaving: bool,
    /// Auto-save interval in seconds (0 = disabled)
    pub autosave_timer: u64,
}

/// Typesetter settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CompileConfig {
    /// Program used to build the preview
    pub typesetter: String,
}

/// Starting text for new documents
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultText {
    pub welcome: String,
    /// User templates by name
    pub templates: BTreeMap<String, String>,
}

/// UI settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Theme (light/dark)
    pub theme: String,
    /// Show the preview panel next to the editor
    pub preview_visible: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            last_document: None,
            recent_documents: Vec::new(),
            editor: EditorConfig::default(),
            compile: CompileConfig::default(),
            default_text: DefaultText::default(),
            ui: UiConfig::default(),
        }
    }
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            font_size: 14.0,
            autosaving: false,
            autosave_timer: 600,
        }
    }
}

impl Default for CompileConfig {
    fn default() -> Self {
        Self {
            typesetter: "pdflatex".to_string(),
        }
    }
}

impl Default for DefaultText {
    fn default() -> Self {
        Self {
            welcome: WELCOME_TEXT.to_string(),
            templates: BTreeMap::new(),
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            theme: "dark".to_string(),
            preview_visible: true,
        }
    }
}

impl AppConfig {
    /// Get the config file path
    fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("com", "texpad", "Texpad")
            .map(|dirs| dirs.config_dir().join("config.json"))
    }

    /// Load configuration from disk
    pub fn load() -> Result<Self> {
        let path = Self::config_path()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
        Self::load_from(&path)
    }

    /// Load configuration from `path`, falling back to defaults if it is missing
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("Invalid config: {}", path.display()))?;
        Ok(config)
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure config directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config: {}", path.display()))?;

        tracing::info!("Saved config to: {}", path.display());
        Ok(())
    }

    /// Record a document as the most recently opened one
    pub fn add_recent_document(&mut self, path: PathBuf) {
        self.recent_documents.retain(|p| p != &path);
        self.recent_documents.insert(0, path.clone());
        // Keep only last 10
        self.recent_documents.truncate(10);
        self.last_document = Some(path);
    }

    pub fn template_names(&self) -> impl Iterator<Item = &str> {
        self.default_text.templates.keys().map(String::as_str)
    }

    /// Store `text` as a new template and return the name it got
    pub fn add_template(&mut self, text: &str) -> String {
        let name = (1..)
            .map(|n| match n {
                1 => TEMPLATE_PREFIX.to_string(),
                n => format!("{TEMPLATE_PREFIX}-{n}"),
            })
            .find(|name| !self.default_text.templates.contains_key(name) && name != "welcome")
            .unwrap_or_else(|| TEMPLATE_PREFIX.to_string());
        self.default_text
            .templates
            .insert(name.clone(), text.to_string());
        name
    }

    pub fn remove_template(&mut self, name: &str) -> bool {
        self.default_text.templates.remove(name).is_some()
    }
}

impl ConfigStore for AppConfig {
    fn get_bool(&self, key: &str) -> bool {
        match key {
            "autosaving" => self.editor.autosaving,
            "preview_visible" => self.ui.preview_visible,
            _ => {
                tracing::warn!("Unknown boolean config key: {}", key);
                false
            }
        }
    }

    fn get_value(&self, section: &str, key: &str) -> Option<String> {
        match (section, key) {
            ("default_text", "welcome") => Some(self.default_text.welcome.clone()),
            ("default_text", name) => self.default_text.templates.get(name).cloned(),
            ("compile", "typesetter") => Some(self.compile.typesetter.clone()),
            ("ui", "theme") => Some(self.ui.theme.clone()),
            _ => None,
        }
    }

    fn get_int(&self, key: &str) -> i64 {
        match key {
            "autosave_timer" => i64::try_from(self.editor.autosave_timer).unwrap_or(i64::MAX),
            _ => {
                tracing::warn!("Unknown integer config key: {}", key);
                0
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let config = AppConfig::load_from(&tmp.path().join("config.json")).unwrap();
        assert!(!config.editor.autosaving);
        assert!(config.get_bool("preview_visible"));
        assert_eq!(config.get_int("autosave_timer"), 600);
        assert_eq!(
            config.get_value("compile", "typesetter").as_deref(),
            Some("pdflatex")
        );
        assert_eq!(config.get_value("ui", "theme").as_deref(), Some("dark"));
        assert_eq!(
            config.get_value("default_text", "welcome").as_deref(),
            Some(WELCOME_TEXT)
        );
    }

    #[test]
    fn test_save_and_reload() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("nested").join("config.json");

        let mut config = AppConfig::default();
        config.editor.autosaving = true;
        config.editor.autosave_timer = 30;
        config.save_to(&path).unwrap();

        let loaded = AppConfig::load_from(&path).unwrap();
        assert!(loaded.get_bool("autosaving"));
        assert_eq!(loaded.get_int("autosave_timer"), 30);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.json");
        std::fs::write(&path, r#"{ "editor": { "autosaving": true } }"#).unwrap();

        let config = AppConfig::load_from(&path).unwrap();
        assert!(config.editor.autosaving);
        assert_eq!(config.editor.autosave_timer, 600);
        assert_eq!(config.compile.typesetter, "pdflatex");
    }

    #[test]
    fn test_unknown_keys() {
        let config = AppConfig::default();
        assert!(!config.get_bool("nonexistent"));
        assert_eq!(config.get_int("nonexistent"), 0);
        assert_eq!(config.get_value("nope", "nothing"), None);
    }

    #[test]
    fn test_templates_get_free_names() {
        let mut config = AppConfig::default();
        assert_eq!(config.add_template("\\documentclass{letter}"), "untitled");
        assert_eq!(config.add_template("\\documentclass{beamer}"), "untitled-2");
        assert_eq!(
            config.get_value("default_text", "untitled-2").as_deref(),
            Some("\\documentclass{beamer}")
        );

        assert!(config.remove_template("untitled"));
        assert!(!config.remove_template("untitled"));
        assert_eq!(config.get_value("default_text", "untitled"), None);
        assert_eq!(config.add_template("again"), "untitled");
        assert_eq!(
            config.template_names().collect::<Vec<_>>(),
            vec!["untitled", "untitled-2"]
        );
    }

    #[test]
    fn test_templates_survive_reload() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.json");

        let mut config = AppConfig::default();
        config.add_template("\\documentclass{report}");
        config.save_to(&path).unwrap();

        let loaded = AppConfig::load_from(&path).unwrap();
        assert_eq!(
            loaded.get_value("default_text", "untitled").as_deref(),
            Some("\\documentclass{report}")
        );
        assert_eq!(
            loaded.get_value("default_text", "welcome").as_deref(),
            Some(WELCOME_TEXT)
        );
    }

    #[test]
    fn test_recent_documents_capped_and_deduplicated() {
        let mut config = AppConfig::default();
        for i in 0..12 {
            config.add_recent_document(PathBuf::from(format!("/docs/{i}.tex")));
        }
        config.add_recent_document(PathBuf::from("/docs/5.tex"));

        assert_eq!(config.recent_documents.len(), 10);
        assert_eq!(config.recent_documents[0], PathBuf::from("/docs/5.tex"));
        assert_eq!(config.last_document, Some(PathBuf::from("/docs/5.tex")));
        assert_eq!(
            config
                .recent_documents
                .iter()
                .filter(|p| p.ends_with("5.tex"))
                .count(),
            1
        );
    }
}
