use std::collections::HashMap;
use std::fs;
use tracing::{debug, info};

use crate::error::CheckError;
use crate::paths;
use crate::vault::Vault;

/// Reads the summary record of one backup image and extracts the requested
/// fields.
///
/// The image directory and its `tree` subdirectory must be accessible
/// (errors propagate and are recoverable at the caller); a missing or
/// unreadable `summary` file makes the image invalid. Field names are
/// matched case-insensitively and keys in the returned map are lowercase.
/// Only fields both requested and present appear, so callers must tolerate
/// missing keys.
pub fn parse_summary(
    vault: &Vault,
    image: &str,
    wanted: &[&str],
) -> Result<HashMap<String, String>, CheckError> {
    debug!("Parsing backup {:?}", image);
    let wanted: Vec<String> = wanted.iter().map(|field| field.to_lowercase()).collect();

    let image_path = vault.image_path(image);
    paths::check_accessible(&image_path)?;
    paths::check_accessible(&image_path.join("tree"))?;

    let summary_file = image_path.join("summary");
    if !paths::readable(&summary_file) {
        return Err(CheckError::BackupNotValid(
            "could not access summary file".to_string(),
        ));
    }
    let contents = fs::read_to_string(&summary_file)
        .map_err(|_| CheckError::BackupNotValid("could not read summary file".to_string()))?;

    let mut fields = HashMap::new();
    for line in contents.lines() {
        // Only the first ": " separates key from value; the value keeps
        // any later occurrences verbatim.
        let Some((key, value)) = line.trim().split_once(": ") else {
            continue;
        };
        let key = key.to_lowercase();
        if wanted.contains(&key) {
            debug!("Found field {:?} with value {:?}", key, value);
            fields.insert(key, value.to_string());
        }
    }
    info!("Parsed backup {:?} to {:?}", image, fields);
    Ok(fields)
}
