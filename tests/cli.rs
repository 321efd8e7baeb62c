use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;
use tempfile::TempDir;

/// Working directory with a local config.yaml pointing storage at a temp dir
fn workspace() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    let storage = dir.path().join("storage");
    let config = format!(
        "backend:\n  base_url: http://127.0.0.1:9/verbatim-ai/\nstorage:\n  dir: {}\n",
        storage.display()
    );
    std::fs::write(dir.path().join("config.yaml"), config).unwrap();
    dir
}

fn verbatim(cwd: &Path) -> Command {
    let mut cmd = Command::cargo_bin("verbatim").unwrap();
    cmd.current_dir(cwd).env_remove("VERBATIM_BASE_URL").env_remove("RUST_LOG");
    cmd
}

#[test]
fn help_lists_subcommands() {
    let dir = workspace();
    verbatim(dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("fetch"))
        .stdout(predicate::str::contains("models"))
        .stdout(predicate::str::contains("settings"));
}

#[test]
fn config_show_reads_local_file() {
    let dir = workspace();
    verbatim(dir.path())
        .args(["config", "--show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("http://127.0.0.1:9/verbatim-ai/"));
}

#[test]
fn base_url_flag_overrides_config() {
    let dir = workspace();
    verbatim(dir.path())
        .args(["--base-url", "https://example.com/app/", "config", "--show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("https://example.com/app/"));
}

#[test]
fn invalid_base_url_is_rejected() {
    let dir = workspace();
    verbatim(dir.path())
        .args(["--base-url", "ftp://example.com/", "config", "--show"])
        .assert()
        .failure();
}

#[test]
fn api_key_is_masked_until_revealed() {
    let dir = workspace();

    verbatim(dir.path())
        .args(["settings", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("(not set)"));

    verbatim(dir.path())
        .args(["settings", "set-key", "sk-or-secret"])
        .assert()
        .success()
        .stderr(predicate::str::contains("API key saved successfully!"));

    verbatim(dir.path())
        .args(["settings", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("••••••••••••••••"))
        .stdout(predicate::str::contains("sk-or-secret").not());

    verbatim(dir.path())
        .args(["settings", "show", "--reveal"])
        .assert()
        .success()
        .stdout(predicate::str::contains("sk-or-secret"));
}

#[test]
fn export_writes_settings_document() {
    let dir = workspace();
    let export = dir.path().join("out.json");

    verbatim(dir.path())
        .args(["settings", "set-key", "sk-export"])
        .assert()
        .success();

    verbatim(dir.path())
        .args(["settings", "export"])
        .arg(&export)
        .assert()
        .success()
        .stderr(predicate::str::contains("Settings exported successfully"));

    let document = std::fs::read_to_string(&export).unwrap();
    assert!(document.contains("\"apiKey\": \"sk-export\""));
    assert!(document.contains("\"customModels\": []"));
}

#[test]
fn import_rejects_invalid_file() {
    let dir = workspace();
    let bad = dir.path().join("bad.json");
    std::fs::write(&bad, "[1, 2, 3]").unwrap();

    verbatim(dir.path())
        .args(["settings", "import"])
        .arg(&bad)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid settings file"));
}

#[test]
fn fetch_requires_non_blank_url() {
    let dir = workspace();
    verbatim(dir.path())
        .args(["--quiet", "fetch", "   "])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Please enter a YouTube URL"));
}
