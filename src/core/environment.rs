//! Working environment for the open document
//!
//! The environment ties the user's source file to a temporary working copy
//! that the typesetter compiles, and to the PDF that compilation produces.
//! Both working paths live in the temp directory and share a stem.

use std::ffi::{OsStr, OsString};
use std::io;
use std::path::{Path, PathBuf};

use tempfile::TempPath;

use super::error::SessionError;

/// Extension of LaTeX sources and working files
pub const TEX_EXTENSION: &str = "tex";
/// Extension of the compiled output
pub const PDF_EXTENSION: &str = "pdf";

/// Compiler byproducts removed together with a discarded working file
const BYPRODUCT_EXTENSIONS: [&str; 3] = [PDF_EXTENSION, "aux", "log"];

/// The path set handed to the preview driver
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvFiles {
    pub temp_dir: PathBuf,
    pub source: Option<PathBuf>,
    pub source_dir: Option<PathBuf>,
    pub working_file: PathBuf,
    pub output_file: PathBuf,
}

/// Paths of the currently open document
#[derive(Debug)]
pub struct Environment {
    /// Directory holding working files, resolved once
    temp_dir: PathBuf,
    /// The user's saved document, if any
    source: Option<PathBuf>,
    source_dir: Option<PathBuf>,
    /// Kept as an OS string so non-UTF-8 names export unchanged
    base_name: Option<OsString>,
    /// Deleted from disk when replaced or dropped
    working_file: Option<TempPath>,
    output_file: Option<PathBuf>,
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

impl Environment {
    /// Create an empty environment using `TMPDIR` or the platform temp directory
    pub fn new() -> Self {
        Self::with_temp_dir(resolve_temp_dir())
    }

    /// Create an empty environment with working files under `temp_dir`
    pub fn with_temp_dir(temp_dir: PathBuf) -> Self {
        Self {
            temp_dir,
            source: None,
            source_dir: None,
            base_name: None,
            working_file: None,
            output_file: None,
        }
    }

    /// Point the environment at a new source document.
    ///
    /// The directory is the parent of `path` and the base name is its last
    /// segment with a trailing `.tex` removed.
    pub fn set_source(&mut self, path: &Path) {
        let source_dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        self.source = Some(path.to_path_buf());
        self.source_dir = Some(source_dir);
        self.base_name = Some(base_name_of(path));
    }

    /// Forget the source document, as for a new unsaved buffer
    pub fn clear_source(&mut self) {
        self.source = None;
        self.source_dir = None;
        self.base_name = None;
    }

    /// Allocate a fresh working file, optionally switching source first.
    ///
    /// The previous working file and its compiler output are deleted.
    pub fn create(&mut self, filename: Option<&Path>) -> Result<(), SessionError> {
        if let Some(filename) = filename {
            self.set_source(filename);
        }

        self.discard_working_files();

        let working = tempfile::Builder::new()
            .prefix("texpad-")
            .suffix(&format!(".{TEX_EXTENSION}"))
            .tempfile_in(&self.temp_dir)
            .map_err(|source| SessionError::Environment {
                dir: self.temp_dir.clone(),
                source,
            })?
            .into_temp_path();
        let output = working.with_extension(PDF_EXTENSION);

        tracing::info!(
            "Environment created for: TEX: {} TMP: {} PDF: {}",
            self.source
                .as_deref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "(unsaved)".to_string()),
            working.display(),
            output.display()
        );

        self.working_file = Some(working);
        self.output_file = Some(output);
        Ok(())
    }

    /// Delete the current working file and any output next to it
    fn discard_working_files(&mut self) {
        self.output_file = None;
        let Some(working) = self.working_file.take() else {
            return;
        };

        let stem = working.to_path_buf();
        if let Err(e) = working.close() {
            tracing::warn!("Failed to remove working file {}: {}", stem.display(), e);
        }

        for ext in BYPRODUCT_EXTENSIONS {
            let byproduct = stem.with_extension(ext);
            match std::fs::remove_file(&byproduct) {
                Ok(()) => tracing::debug!("Removed {}", byproduct.display()),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => tracing::warn!("Failed to remove {}: {}", byproduct.display(), e),
            }
        }
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn source_dir(&self) -> Option<&Path> {
        self.source_dir.as_deref()
    }

    #[allow(dead_code)]
    pub fn base_name(&self) -> Option<&OsStr> {
        self.base_name.as_deref()
    }

    #[allow(dead_code)]
    pub fn working_file(&self) -> Option<&Path> {
        self.working_file.as_deref()
    }

    pub fn output_file(&self) -> Option<&Path> {
        self.output_file.as_deref()
    }

    /// Where `export` places the compiled PDF: `<source_dir>/<base_name>.pdf`
    pub fn export_target(&self) -> Option<PathBuf> {
        let dir = self.source_dir.as_ref()?;
        let mut name = self.base_name.clone()?;
        name.push(".");
        name.push(PDF_EXTENSION);
        Some(dir.join(name))
    }

    /// Snapshot of the path set, once a working file exists
    pub fn files(&self) -> Option<EnvFiles> {
        Some(EnvFiles {
            temp_dir: self.temp_dir.clone(),
            source: self.source.clone(),
            source_dir: self.source_dir.clone(),
            working_file: self.working_file.as_deref()?.to_path_buf(),
            output_file: self.output_file.clone()?,
        })
    }
}

impl Drop for Environment {
    fn drop(&mut self) {
        self.discard_working_files();
    }
}

/// `TMPDIR` if set, otherwise the platform temp directory
pub fn resolve_temp_dir() -> PathBuf {
    std::env::var_os("TMPDIR")
        .filter(|dir| !dir.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(std::env::temp_dir)
}

/// Last path segment of `path` with a trailing `.tex` stripped
pub fn base_name_of(path: &Path) -> OsString {
    let Some(name) = path.file_name() else {
        return OsString::new();
    };
    // `Path::extension` treats a bare `.tex` as a hidden file without one
    if name == ".tex" {
        return OsString::new();
    }
    match (path.file_stem(), path.extension()) {
        (Some(stem), Some(ext)) if ext == TEX_EXTENSION => stem.to_os_string(),
        _ => name.to_os_string(),
    }
}
