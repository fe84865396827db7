use std::collections::HashMap;

use chrono::{DateTime, Local, NaiveDateTime, TimeZone};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::CheckError;
use crate::history;
use crate::summary;
use crate::vault::Vault;

const STATUS: &str = "status";
const BACKUP_BEGIN: &str = "backup-begin";
const BACKUP_COMPLETE: &str = "backup-complete";

/// The three values derived from a vault's most recent usable backups.
///
/// Each field is filled at most once while scanning newest-first and never
/// overwritten. A field left `None` means no record in the history could
/// answer it; consumers must report that distinctly and never substitute
/// zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FreshnessMetrics {
    /// Wall-clock seconds the most recent parseable backup took,
    /// regardless of its status.
    pub duration: Option<i64>,
    /// Seconds elapsed since the most recent backup attempt began.
    pub last_try: Option<i64>,
    /// Seconds elapsed since the most recent successful backup began.
    pub last_success: Option<i64>,
}

impl FreshnessMetrics {
    /// True once every metric has a value and the scan may stop.
    pub fn is_complete(&self) -> bool {
        self.duration.is_some() && self.last_try.is_some() && self.last_success.is_some()
    }
}

/// Derives the freshness metrics for `vault`.
///
/// Scans the history newest-first, skipping images that are inaccessible,
/// invalid, or missing parseable timestamps, and stops as soon as all
/// three metrics are known. Only vault-level failures are returned as
/// errors.
pub fn evaluate(vault: &Vault) -> Result<FreshnessMetrics, CheckError> {
    evaluate_at(vault, Local::now())
}

/// As [`evaluate`], against an explicit notion of "now".
pub fn evaluate_at(vault: &Vault, now: DateTime<Local>) -> Result<FreshnessMetrics, CheckError> {
    let mut metrics = FreshnessMetrics::default();

    for image in history::scan(vault)? {
        let record =
            match summary::parse_summary(vault, &image, &[STATUS, BACKUP_BEGIN, BACKUP_COMPLETE]) {
                Ok(record) => record,
                Err(
                    err @ (CheckError::PathNotAccessible { .. }
                    | CheckError::PathNotADirectory { .. }),
                ) => {
                    // Incomplete or expired image; try the next older one.
                    debug!("Skipping backup {:?}: {}", image, err);
                    continue;
                }
                Err(err) => {
                    warn!("Skipping invalid backup {:?}: {}", image, err);
                    continue;
                }
            };

        let Some(begin) = timestamp_field(&record, BACKUP_BEGIN, &image) else {
            continue;
        };
        let Some(complete) = timestamp_field(&record, BACKUP_COMPLETE, &image) else {
            continue;
        };

        let dur = (complete - begin).num_seconds();
        debug!("Duration of backup {:?} is {}s", image, dur);
        if metrics.duration.is_none() {
            metrics.duration = Some(dur);
            info!("Gathered duration of last backup: {}s", dur);
        }
        if metrics.last_try.is_none() {
            let age = (now - begin).num_seconds();
            metrics.last_try = Some(age);
            info!("Gathered age of last try: {}s", age);
        }
        if metrics.last_success.is_none()
            && record
                .get(STATUS)
                .is_some_and(|status| status.eq_ignore_ascii_case("success"))
        {
            let age = (now - begin).num_seconds();
            metrics.last_success = Some(age);
            info!("Gathered age of last success: {}s", age);
        }
        if metrics.is_complete() {
            info!("All metrics gathered, stopping history scan");
            break;
        }
    }

    Ok(metrics)
}

fn timestamp_field(
    record: &HashMap<String, String>,
    field: &str,
    image: &str,
) -> Option<DateTime<Local>> {
    let Some(raw) = record.get(field) else {
        warn!("Backup {:?} summary has no {:?}, skipping", image, field);
        return None;
    };
    match parse_timestamp(raw) {
        Some(instant) => {
            debug!("Backup {} {:?} parsed to {:?}", field, raw, instant);
            Some(instant)
        }
        None => {
            warn!(
                "Backup {:?} has unparseable {} {:?}, skipping",
                image, field, raw
            );
            None
        }
    }
}

/// Parses the free-form timestamps dirvish writes into summary files.
///
/// Offset-carrying forms are honored; naive ones are interpreted in the
/// machine-local timezone, which is what dirvish itself writes.
fn parse_timestamp(raw: &str) -> Option<DateTime<Local>> {
    let raw = raw.trim();
    if let Ok(instant) = DateTime::parse_from_rfc3339(raw) {
        return Some(instant.with_timezone(&Local));
    }
    if let Ok(instant) = DateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S %z") {
        return Some(instant.with_timezone(&Local));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Local.from_local_datetime(&naive).earliest();
    }
    None
}
