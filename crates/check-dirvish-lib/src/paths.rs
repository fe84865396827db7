use std::ffi::CString;
use std::os::unix::ffi::OsStrExt;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::CheckError;

/// Default bank of vaults, used when neither the command line nor the
/// environment names one.
pub const DEFAULT_BASE_PATH: &str = "/srv/backup/";

/// Environment variable overriding the default base path.
pub const BASE_PATH_ENV: &str = "CHECK_DIRVISH_BASE_PATH";

fn access(path: &Path, mode: libc::c_int) -> bool {
    let Ok(cpath) = CString::new(path.as_os_str().as_bytes()) else {
        return false;
    };
    unsafe { libc::access(cpath.as_ptr(), mode) == 0 }
}

/// Returns whether `path` is readable by the current process.
pub fn readable(path: &Path) -> bool {
    access(path, libc::R_OK)
}

/// Verifies that `path` is a readable, traversable directory.
///
/// Distinguishes a path that cannot be reached at all
/// ([`CheckError::PathNotAccessible`]) from one that exists but is not a
/// directory ([`CheckError::PathNotADirectory`]).
pub fn check_accessible(path: &Path) -> Result<(), CheckError> {
    debug!("Check if {:?} is accessible and a directory", path);
    if !access(path, libc::R_OK | libc::X_OK) {
        return Err(CheckError::PathNotAccessible {
            path: path.to_path_buf(),
        });
    }
    if !path.is_dir() {
        return Err(CheckError::PathNotADirectory {
            path: path.to_path_buf(),
        });
    }
    Ok(())
}

/// Returns the base path to check under, preferring an explicit value from
/// the command line, then `CHECK_DIRVISH_BASE_PATH`, then
/// [`DEFAULT_BASE_PATH`].
pub fn active_base_path(explicit: Option<PathBuf>) -> PathBuf {
    explicit.unwrap_or_else(|| {
        std::env::var_os(BASE_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_BASE_PATH))
    })
}
