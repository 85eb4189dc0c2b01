use std::fs;
use std::io::{Cursor, Write};
use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

fn profile_json(ts: i64) -> String {
    format!(r#"{{"characters":{{"pmc":{{"Hideout":{{"sptUpdateLastRunTimestamp":{ts}}}}}}}}}"#)
}

fn zipball(entries: &[(&str, String)]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, content) in entries {
        writer
            .start_file(*name, SimpleFileOptions::default())
            .expect("start file");
        writer.write_all(content.as_bytes()).expect("write entry");
    }
    writer.finish().expect("finish zip").into_inner()
}

fn write_env(base: &Path, api_url: &str) {
    let token = format!("ghp_{}", "t".repeat(36));
    fs::write(
        base.join(".env"),
        format!(
            "GITHUB_PAT={token}\nREPO_URL=https://github.com/owner/profiles\nFIKASYNC_API_URL={api_url}\n"
        ),
    )
    .expect("write env");
}

async fn run_pull(base: &Path) -> Output {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("fikasync"));
    for key in ["GITHUB_PAT", "REPO_URL", "FIKASYNC_API_URL", "FIKASYNC_HOME"] {
        cmd.env_remove(key);
    }
    cmd.env("FIKASYNC_LANG", "en")
        .env("NO_COLOR", "1")
        .arg("--base-dir")
        .arg(base)
        .arg("pull");
    tokio::task::spawn_blocking(move || cmd.output())
        .await
        .expect("blocking task")
        .expect("run fikasync")
}

#[tokio::test(flavor = "multi_thread")]
async fn pull_downloads_newer_profiles_and_reports_pending() {
    let server = MockServer::start().await;
    let archive = zipball(&[
        ("owner-profiles-9f8e/profiles/alice.json", profile_json(20)),
        ("owner-profiles-9f8e/profiles/bob.json", profile_json(1)),
    ]);
    Mock::given(method("GET"))
        .and(path("/repos/owner/profiles/zipball"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(archive))
        .expect(1)
        .mount(&server)
        .await;

    let base = TempDir::new().expect("base");
    write_env(base.path(), &server.uri());
    let profiles = base.path().join("SPT/user/profiles");
    fs::create_dir_all(&profiles).expect("profiles dir");
    fs::write(profiles.join("alice.json"), profile_json(10)).expect("write alice");
    fs::write(profiles.join("bob.json"), profile_json(5)).expect("write bob");

    let output = run_pull(base.path()).await;
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    assert_eq!(
        fs::read_to_string(profiles.join("alice.json")).expect("read alice"),
        profile_json(20)
    );
    assert_eq!(
        fs::read_to_string(profiles.join("bob.json")).expect("read bob"),
        profile_json(5)
    );
    assert!(stdout.contains("Profiles in cloud: 2"));
    assert!(stdout.contains("Downloaded"));
    assert!(stdout.contains("Updated 1 profiles from cloud."));
    assert!(stdout.contains("Waiting for upload after the session: bob.json"));
    assert!(base.path().join("backups/alice.json").is_dir());
}

#[tokio::test(flavor = "multi_thread")]
async fn pull_fails_when_the_archive_is_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/owner/profiles/zipball"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let base = TempDir::new().expect("base");
    write_env(base.path(), &server.uri());
    let profiles = base.path().join("SPT/user/profiles");
    fs::create_dir_all(&profiles).expect("profiles dir");
    fs::write(profiles.join("alice.json"), profile_json(10)).expect("write alice");

    let output = run_pull(base.path()).await;

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("failed to pull profiles"));
    assert_eq!(
        fs::read_to_string(profiles.join("alice.json")).expect("read alice"),
        profile_json(10)
    );
}
