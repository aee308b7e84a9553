use serde::{Deserialize, Serialize};
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// How a batch reacts to a failure on one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorPolicy {
    /// Stop at the first failure and return it
    #[default]
    FailFast,
    /// Record the failure in the report and move on to the next file
    Continue,
}

/// Errors returned by the rename and merge operations.
///
/// Every variant that concerns a single file carries its path so callers can
/// report which file stopped the batch.
#[derive(Debug, Error)]
pub enum BhavError {
    #[error("Bad pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    #[error("Failed to list files under {}: {source}", root.display())]
    Enumerate {
        root: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("Failed to rename {} to {}: {source}", from.display(), to.display())]
    Rename {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Date token {token} from {} collides with {}", from.display(), to.display())]
    Collision {
        token: String,
        from: PathBuf,
        to: PathBuf,
    },

    #[error("Failed to open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to read CSV {}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Failed to write merged output {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to write merged output {}: {source}", path.display())]
    WriteRecord {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Failed to move merged output into place at {}: {source}", path.display())]
    Persist {
        path: PathBuf,
        #[source]
        source: tempfile::PersistError,
    },
}

impl BhavError {
    /// The file this error concerns, if it is tied to one.
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            Self::Pattern { .. } => None,
            Self::Enumerate { root, .. } => Some(root),
            Self::Rename { from, .. } | Self::Collision { from, .. } => Some(from),
            Self::Open { path, .. }
            | Self::Csv { path, .. }
            | Self::Write { path, .. }
            | Self::WriteRecord { path, .. }
            | Self::Persist { path, .. } => Some(path),
        }
    }
}

pub type Result<T, E = BhavError> = std::result::Result<T, E>;
