//! Errors returned by document session operations

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failure of a load, save, export or environment operation.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The operation needs a saved document but the session has none
    #[error("no document path is set")]
    NoDocument,

    #[error("no template named {0}")]
    UnknownTemplate(String),

    #[error("failed to load {}", .path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to save {}", .path.display())]
    Save {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to export {} to {}", .from.display(), .to.display())]
    Export {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The temporary working file could not be created
    #[error("failed to create working file in {}", .dir.display())]
    Environment {
        dir: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to change directory to {}", .path.display())]
    ChangeDirectory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
