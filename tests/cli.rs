use assert_cmd::Command;
use predicates::prelude::*;

fn vidscribe() -> Command {
    let mut cmd = Command::cargo_bin("vidscribe").unwrap();
    cmd.env_remove("RUST_LOG");
    cmd
}

#[test]
fn platforms_lists_supported_sites() {
    vidscribe()
        .arg("platforms")
        .assert()
        .success()
        .stdout(predicate::str::contains("YouTube"))
        .stdout(predicate::str::contains("TikTok"))
        .stdout(predicate::str::contains("x.com"));
}

#[test]
fn classify_short_youtube_link() {
    vidscribe()
        .args(["classify", "https://youtu.be/dQw4w9WgXcQ?t=42"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Platform: youtube"))
        .stdout(predicate::str::contains(
            "URL: https://www.youtube.com/watch?v=dQw4w9WgXcQ",
        ))
        .stdout(predicate::str::contains("Video ID: dQw4w9WgXcQ"));
}

#[test]
fn classify_tiktok_passes_url_through() {
    vidscribe()
        .args(["classify", "https://www.tiktok.com/@scout2015/video/6718335390845095173"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Platform: tiktok"))
        .stdout(predicate::str::contains("Video ID").not());
}

#[test]
fn classify_blank_input_fails() {
    vidscribe()
        .args(["classify", "   "])
        .assert()
        .failure()
        .stderr(predicate::str::contains("URL must not be empty"));
}

#[test]
fn fetch_rejects_bad_language_code() {
    let dir = tempfile::tempdir().unwrap();
    vidscribe()
        .current_dir(dir.path())
        .args(["fetch", "dQw4w9WgXcQ", "-l", "vi,en", "--quiet"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not a language code"));
}
