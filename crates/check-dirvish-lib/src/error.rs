use std::path::PathBuf;
use thiserror::Error;

/// Failure modes of a vault check.
///
/// The first three arise on vault-level paths and are fatal to the whole
/// check; all four can arise per backup image, where the scan recovers by
/// moving on to the next older image.
#[derive(Debug, Error)]
pub enum CheckError {
    #[error("path {path:?} is not accessible")]
    PathNotAccessible { path: PathBuf },

    #[error("path {path:?} is not a directory")]
    PathNotADirectory { path: PathBuf },

    #[error("history file {path:?} not found. Is there at least one backup?")]
    HistoryFileNotFound { path: PathBuf },

    #[error("backup is not valid: {0}")]
    BackupNotValid(String),
}
