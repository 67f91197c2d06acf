use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::tempdir;

const FEED: &str = "var hvz_peg_stmn = [\n ['00389','Ebnet','Dreisam',3,'92','cm','01.01.2024 12:00 MEZ','2.31','m3/s','01.01.2024 12:00 MEZ'],\n];\n";

#[test]
fn help_lists_both_commands() {
    let mut cmd = Command::cargo_bin("dreisam-pegel").expect("Binary exists");
    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("bot").and(predicate::str::contains("show")));
}

#[test]
fn bot_requires_credentials_and_data_dir() {
    let mut cmd = Command::cargo_bin("dreisam-pegel").expect("Binary exists");
    cmd.arg("bot");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("--credentials"));
}

#[test]
fn show_uses_fresh_cache_and_writes_history_and_chart() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("cache"), FEED).unwrap();
    fs::write(dir.path().join("history"), "2024-01-01 06:00;95\n").unwrap();
    let chart = dir.path().join("chart.png");

    let mut cmd = Command::cargo_bin("dreisam-pegel").expect("Binary exists");
    cmd.arg("show")
        .arg("--data-dir")
        .arg(dir.path())
        .arg("--chart")
        .arg(&chart)
        .env_remove("DREISAM_PEGEL_FEED_URL")
        .env_remove("DREISAM_PEGEL_STATION_PREFIX");

    cmd.assert().success().stdout(
        predicate::str::contains("2024-01-01 12:00")
            .and(predicate::str::contains("92"))
            .and(predicate::str::contains("-3")),
    );

    assert_eq!(
        fs::read_to_string(dir.path().join("history")).unwrap(),
        "2024-01-01 06:00;95\n2024-01-01 12:00;92\n"
    );
    let png = fs::read(&chart).unwrap();
    assert!(png.starts_with(b"\x89PNG"), "chart should be a PNG");
}

#[test]
fn show_fails_on_malformed_history() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("cache"), FEED).unwrap();
    fs::write(dir.path().join("history"), "garbage\n").unwrap();

    let mut cmd = Command::cargo_bin("dreisam-pegel").expect("Binary exists");
    cmd.arg("show")
        .arg("--data-dir")
        .arg(dir.path())
        .arg("--chart")
        .arg(dir.path().join("chart.png"))
        .env_remove("DREISAM_PEGEL_FEED_URL")
        .env_remove("DREISAM_PEGEL_STATION_PREFIX");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("error: cannot get pegel"))
        .stderr(predicate::str::contains("garbage"));
    assert_eq!(
        fs::read_to_string(dir.path().join("history")).unwrap(),
        "garbage\n"
    );
    assert!(!dir.path().join("chart.png").exists());
}

#[test]
fn unreadable_config_file_fails() {
    let dir = tempdir().unwrap();
    let mut cmd = Command::cargo_bin("dreisam-pegel").expect("Binary exists");
    cmd.arg("--config")
        .arg(dir.path().join("missing.yaml"))
        .arg("show")
        .arg("--data-dir")
        .arg(dir.path());
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read config file"));
}
