//! Discovery error types

use std::path::PathBuf;
use thiserror::Error;

/// Fatal errors that abort a run before any unit executes
#[derive(Error, Debug)]
pub enum DiscoveryError {
    #[error("Test root does not exist: {}", .0.display())]
    RootNotFound(PathBuf),

    #[error("Test root is not a directory: {}", .0.display())]
    RootNotDirectory(PathBuf),

    #[error("Failed to read {}", path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid test index {}: {message}", path.display())]
    InvalidIndex { path: PathBuf, message: String },

    #[error("Duplicate test unit {name} in {} and {}", first.display(), second.display())]
    DuplicateUnit {
        name: String,
        first: PathBuf,
        second: PathBuf,
    },
}
