use assert_cmd::Command;
use predicates::str::contains;

/// A command with no inherited environment, run from an empty directory so no
/// `.env` or `config/` is picked up.
fn catalog(dir: &std::path::Path) -> Command {
    let mut cmd = Command::cargo_bin("catalog").unwrap();
    cmd.env_clear().current_dir(dir);
    cmd
}

fn scratch_dir(name: &str) -> std::path::PathBuf {
    let dir = std::env::temp_dir().join(format!("catalog-cli-{}-{}", name, std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn help_lists_subcommands() {
    catalog(&scratch_dir("help"))
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("serve"))
        .stdout(contains("check"))
        .stdout(contains("config"));
}

#[test]
fn config_fails_without_required_settings() {
    catalog(&scratch_dir("missing"))
        .arg("config")
        .assert()
        .failure()
        .stderr(contains("failed to load catalog settings"));
}

#[test]
fn config_prints_settings_from_conventional_variables() {
    catalog(&scratch_dir("vars"))
        .arg("config")
        .env("MONGO_URI", "mongodb://db.internal:27017")
        .env("DB_NAME", "shop")
        .env("PORT", "9000")
        .assert()
        .success()
        .stdout(contains("\"port\": 9000"))
        .stdout(contains("\"name\": \"shop\""))
        .stdout(contains("mongodb://db.internal:27017"));
}

#[test]
fn config_reads_prefixed_variables_and_config_files() {
    let dir = scratch_dir("files");
    let config_dir = dir.join("config");
    std::fs::create_dir_all(&config_dir).unwrap();
    std::fs::write(
        config_dir.join("base.toml"),
        "[server]\nport = 7000\n\n[telemetry]\nlog_format = \"json\"\n",
    )
    .unwrap();

    catalog(&dir)
        .arg("config")
        .env("CATALOG_DATABASE__URI", "mongodb://127.0.0.1:27017")
        .env("CATALOG_DATABASE__NAME", "catalog")
        .assert()
        .success()
        .stdout(contains("\"port\": 7000"))
        .stdout(contains("\"log_format\": \"json\""));
}
