use assert_cmd::prelude::*;
use chrono::{DateTime, Duration, Local};
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use std::process::Command;
use tempfile::tempdir;

fn check_dirvish() -> Command {
    Command::new(assert_cmd::cargo_bin!("check-dirvish"))
}

fn write_vault(base: &Path, vault: &str, begin: DateTime<Local>, duration_secs: i64) {
    let dirvish_dir = base.join(vault).join("dirvish");
    fs::create_dir_all(&dirvish_dir).unwrap();
    fs::write(dirvish_dir.join("default.hist"), "img1\t22:00\tdefault\n").unwrap();

    let image_dir = base.join(vault).join("img1");
    fs::create_dir_all(image_dir.join("tree")).unwrap();
    let complete = begin + Duration::seconds(duration_secs);
    fs::write(
        image_dir.join("summary"),
        format!(
            "Backup-begin: {}\n\
             Backup-complete: {}\n\
             Status: success\n",
            begin.format("%Y-%m-%d %H:%M:%S"),
            complete.format("%Y-%m-%d %H:%M:%S"),
        ),
    )
    .unwrap();
}

#[test]
fn test_json_report() {
    let temp = tempdir().unwrap();
    write_vault(temp.path(), "mail", Local::now() - Duration::hours(1), 600);

    check_dirvish()
        .arg("--base-path")
        .arg(temp.path())
        .arg("--json")
        .arg("mail")
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""check": "BACKUP MAIL""#))
        .stdout(predicate::str::contains(r#""state": "OK""#))
        .stdout(predicate::str::contains(r#""exit_code": 0"#))
        .stdout(predicate::str::contains(r#""duration": 600"#));
}

#[test]
fn test_json_report_on_fatal_error() {
    let temp = tempdir().unwrap();

    check_dirvish()
        .arg("--base-path")
        .arg(temp.path())
        .arg("--json")
        .arg("ghost")
        .assert()
        .code(3)
        .stdout(predicate::str::contains(r#""state": "UNKNOWN""#))
        .stdout(predicate::str::contains(r#""error""#));
}

#[test]
fn test_base_path_from_environment() {
    let temp = tempdir().unwrap();
    write_vault(temp.path(), "mail", Local::now() - Duration::hours(1), 600);

    check_dirvish()
        .env("CHECK_DIRVISH_BASE_PATH", temp.path())
        .arg("mail")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("BACKUP MAIL OK - "));
}

#[test]
fn test_base_path_flag_beats_environment() {
    let temp = tempdir().unwrap();
    write_vault(temp.path(), "mail", Local::now() - Duration::hours(1), 600);

    check_dirvish()
        .env("CHECK_DIRVISH_BASE_PATH", "/nowhere/at/all")
        .arg("--base-path")
        .arg(temp.path())
        .arg("mail")
        .assert()
        .success();
}

#[test]
fn test_verbose_diagnostics_go_to_stderr() {
    let temp = tempdir().unwrap();
    write_vault(temp.path(), "mail", Local::now() - Duration::hours(1), 600);

    check_dirvish()
        .arg("--base-path")
        .arg(temp.path())
        .arg("-vvv")
        .arg("mail")
        .assert()
        .success()
        // The status line stays alone on stdout; diagnostics land on stderr.
        .stdout(predicate::str::starts_with("BACKUP MAIL OK - "))
        .stderr(predicate::str::contains("Finding the latest backup"));
}

#[test]
fn test_quiet_by_default() {
    let temp = tempdir().unwrap();
    write_vault(temp.path(), "mail", Local::now() - Duration::hours(1), 600);

    check_dirvish()
        .arg("--base-path")
        .arg(temp.path())
        .arg("mail")
        .assert()
        .success()
        .stderr(predicate::str::is_empty());
}

#[test]
fn test_help_documents_plugin_options() {
    check_dirvish()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--base-path"))
        .stdout(predicate::str::contains("--warning"))
        .stdout(predicate::str::contains("--critical"))
        .stdout(predicate::str::contains("--timeout"))
        .stdout(predicate::str::contains("--max-duration"));
}

#[test]
fn test_rejects_malformed_range() {
    check_dirvish()
        .args(["-w", "20:10"])
        .arg("mail")
        .assert()
        .failure()
        .stderr(predicate::str::contains("range"));
}
