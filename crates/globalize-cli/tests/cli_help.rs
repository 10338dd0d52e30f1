
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::tempdir;

use fixtures::{globalize, read_storage};

#[test]
fn test_help_shows_all_commands() {
    cargo_bin_cmd!("globalize")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("countries"))
        .stdout(predicate::str::contains("show"))
        .stdout(predicate::str::contains("favorites"))
        .stdout(predicate::str::contains("login"));
}

#[test]
fn test_favorites_help_shows_subcommands() {
    cargo_bin_cmd!("globalize")
        .args(["favorites", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("list"))
        .stdout(predicate::str::contains("toggle"))
        .stdout(predicate::str::contains("check"));
}

#[test]
fn test_unknown_command_is_rejected() {
    cargo_bin_cmd!("globalize")
        .arg("atlas")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unrecognized subcommand"));
}

#[test]
fn test_theme_toggle_persists() {
    let home = tempdir().unwrap();

    globalize(home.path())
        .arg("theme")
        .assert()
        .success()
        .stdout(predicate::str::contains("Theme: light"));
    globalize(home.path())
        .args(["theme", "toggle"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Theme: dark"));
    assert_eq!(read_storage(home.path())["theme"], "dark");

    globalize(home.path())
        .args(["theme", "sepia"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown theme"));
}
