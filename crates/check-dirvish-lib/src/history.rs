use std::fs;
use tracing::{debug, info};

use crate::error::CheckError;
use crate::paths;
use crate::vault::Vault;

/// Newest-first traversal of a vault's history log.
///
/// The log is read once up front (it is small and append-only); identifiers
/// are produced on demand, most recent line first. The iterator is finite
/// and single-use per scan.
#[derive(Debug)]
pub struct HistoryScan {
    /// Remaining lines in physical (chronological) order; consumed from
    /// the back.
    lines: Vec<String>,
}

impl Iterator for HistoryScan {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        while let Some(line) = self.lines.pop() {
            let entry = line.trim();
            if entry.is_empty() {
                debug!("Skipping empty history line");
                continue;
            }
            // Field 0 of the tab-separated record is the image directory
            // name; a line without tabs is taken whole.
            let image = entry.split('\t').next().unwrap_or(entry).to_string();
            info!("Found next backup in {:?}", image);
            return Some(image);
        }
        None
    }
}

/// Scans `vault`'s history log and returns its backup identifiers,
/// newest first.
///
/// Vault-level problems are fatal: an unreachable bank or vault directory
/// propagates as [`CheckError::PathNotAccessible`] /
/// [`CheckError::PathNotADirectory`], an unreadable history log as
/// [`CheckError::HistoryFileNotFound`]. Individual lines never fail the
/// scan.
pub fn scan(vault: &Vault) -> Result<HistoryScan, CheckError> {
    debug!("Finding the latest backup for vault {:?}", vault.name());
    paths::check_accessible(vault.base_path())?;
    paths::check_accessible(&vault.vault_path())?;

    let history_file = vault.history_file_path();
    debug!("Check for {:?}", history_file);
    if !paths::readable(&history_file) {
        return Err(CheckError::HistoryFileNotFound { path: history_file });
    }
    let contents = fs::read_to_string(&history_file)
        .map_err(|_| CheckError::HistoryFileNotFound { path: history_file })?;

    Ok(HistoryScan {
        lines: contents.lines().map(str::to_string).collect(),
    })
}
