use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use predicates::str::contains;
use serde_json::Value;
use tempfile::TempDir;

const REMOTE_KEYS: [&str; 6] = [
    "GITHUB_PAT",
    "REPO_URL",
    "FIKASYNC_API_URL",
    "FIKASYNC_BACKUP_RETENTION",
    "FIKASYNC_RELEASE_REPO",
    "FIKASYNC_HOME",
];

fn fikasync(base: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("fikasync"));
    for key in REMOTE_KEYS {
        cmd.env_remove(key);
    }
    cmd.env("FIKASYNC_LANG", "en")
        .env("NO_COLOR", "1")
        .arg("--base-dir")
        .arg(base);
    cmd
}

fn profile_json(ts: i64) -> String {
    format!(r#"{{"characters":{{"pmc":{{"Hideout":{{"sptUpdateLastRunTimestamp":{ts}}}}}}}}}"#)
}

fn profiles_dir(base: &Path) -> PathBuf {
    let dir = base.join("SPT/user/profiles");
    fs::create_dir_all(&dir).expect("create profiles dir");
    dir
}

#[test]
fn help_lists_subcommands() {
    let base = TempDir::new().expect("base");
    fikasync(base.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("run"))
        .stdout(contains("pull"))
        .stdout(contains("status"))
        .stdout(contains("backups"))
        .stdout(contains("init"));
}

#[test]
fn status_json_reports_non_ignored_profiles() {
    let base = TempDir::new().expect("base");
    let dir = profiles_dir(base.path());
    fs::write(dir.join("alice.json"), profile_json(12)).expect("write alice");
    fs::write(dir.join("hidden.json"), profile_json(3)).expect("write hidden");
    fs::write(dir.join("notes.txt"), "not a profile").expect("write notes");
    fs::write(base.path().join(".fikaignore"), "# comment\nHIDDEN.json\n").expect("write ignore");

    let assert = fikasync(base.path())
        .args(["status", "--json"])
        .assert()
        .success();
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).expect("stdout utf8");
    let json: Value = serde_json::from_str(&stdout).expect("status JSON");

    let profiles = json["profiles"].as_array().expect("profiles array");
    assert_eq!(profiles.len(), 1);
    assert_eq!(profiles[0]["file"], "alice.json");
    assert_eq!(profiles[0]["timestamp"], 12);
    assert_eq!(profiles[0]["hash"].as_str().map(str::len), Some(64));
    assert_eq!(json["ignored"], serde_json::json!(["hidden.json"]));
}

#[test]
fn status_creates_ignore_template() {
    let base = TempDir::new().expect("base");

    fikasync(base.path())
        .arg("status")
        .assert()
        .success()
        .stdout(contains("No local profiles found."));

    let template = fs::read_to_string(base.path().join(".fikaignore")).expect("ignore file");
    assert!(template.lines().all(|l| l.is_empty() || l.starts_with('#')));
}

#[test]
fn backups_are_listed_newest_first() {
    let base = TempDir::new().expect("base");
    for stamp in ["2024-01-02_03-04-05", "2024-03-01_10-00-00"] {
        let dir = base.path().join("backups/p.json").join(stamp);
        fs::create_dir_all(&dir).expect("backup dir");
        fs::write(dir.join("p.json"), profile_json(1)).expect("backup copy");
    }

    let assert = fikasync(base.path())
        .args(["backups", "p.json"])
        .assert()
        .success();
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).expect("stdout utf8");

    let newer = stdout.find("2024-03-01_10-00-00").expect("newer backup listed");
    let older = stdout.find("2024-01-02_03-04-05").expect("older backup listed");
    assert!(newer < older);
}

#[test]
fn no_backups_is_not_an_error() {
    let base = TempDir::new().expect("base");
    fikasync(base.path())
        .arg("backups")
        .assert()
        .success()
        .stdout(contains("No backups found."));
}

#[test]
fn init_writes_env_and_keeps_other_lines() {
    let base = TempDir::new().expect("base");
    fs::write(base.path().join(".env"), "# mine\nFIKASYNC_BACKUP_RETENTION=3\n").expect("env");
    let token = format!("ghp_{}", "a".repeat(36));

    fikasync(base.path())
        .args(["--lang", "ru", "init", "--token", &token])
        .args(["--repo", "https://github.com/owner/profiles.git"])
        .assert()
        .success()
        .stdout(contains("Настройки сохранены"));

    let env = fs::read_to_string(base.path().join(".env")).expect("read env");
    assert!(env.starts_with("# mine\nFIKASYNC_BACKUP_RETENTION=3\n"));
    assert!(env.contains(&format!("GITHUB_PAT={token}")));
    assert!(env.contains("REPO_URL=https://github.com/owner/profiles.git"));
    assert!(env.contains("FIKASYNC_LANG=ru"));
}

#[test]
fn init_rejects_foreign_repository_url() {
    let base = TempDir::new().expect("base");
    fikasync(base.path())
        .args(["init", "--token", "ghp_short", "--repo", "https://gitlab.com/a/b"])
        .assert()
        .failure()
        .stderr(contains("https://github.com/<owner>/<repo>"));
    assert!(!base.path().join(".env").exists());
}

#[test]
fn run_without_configuration_fails_before_any_request() {
    let base = TempDir::new().expect("base");
    fikasync(base.path())
        .args(["run", "--yes"])
        .assert()
        .failure()
        .stderr(contains("Setup not complete").and(contains("GITHUB_PAT")));
}

#[test]
fn run_warns_about_unusual_token_and_goes_offline() {
    let base = TempDir::new().expect("base");
    profiles_dir(base.path());
    fs::write(
        base.path().join(".env"),
        "GITHUB_PAT=not-a-token\nREPO_URL=https://github.com/owner/profiles\nFIKASYNC_API_URL=http://127.0.0.1:1\n",
    )
    .expect("write env");

    fikasync(base.path())
        .args(["run", "--no-launch", "--yes"])
        .assert()
        .success()
        .stdout(contains("GITHUB_PAT does not look like a GitHub token"))
        .stdout(contains("Offline mode"));
}
