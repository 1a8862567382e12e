//! Error scenario integration tests

use std::process::Command;

use tempfile::TempDir;

fn notifytool_bin() -> Command {
    Command::new(env!("CARGO_BIN_EXE_notifytool"))
}

#[test]
fn argument_errors_do_not_touch_the_container_dir() {
    let dir = TempDir::new().unwrap();
    let container_dir = dir.path().join("support");

    let output = notifytool_bin()
        .args(["--title", "only a title"])
        .env("NOTIFYTOOL_CONTAINER_DIR", &container_dir)
        .env("XDG_CONFIG_HOME", dir.path())
        .output()
        .expect("Failed to execute command");

    assert_eq!(output.status.code(), Some(1));
    assert!(!container_dir.exists());
}

#[test]
fn help_does_not_touch_the_container_dir() {
    let dir = TempDir::new().unwrap();
    let container_dir = dir.path().join("support");

    let output = notifytool_bin()
        .arg("--help")
        .env("NOTIFYTOOL_CONTAINER_DIR", &container_dir)
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    assert!(!container_dir.exists());
}

#[test]
fn broken_config_file_does_not_change_argument_handling() {
    let dir = TempDir::new().unwrap();
    let config_dir = dir.path().join("notifytool");
    std::fs::create_dir_all(&config_dir).unwrap();
    std::fs::write(config_dir.join("config.toml"), "this is = = not toml").unwrap();

    let output = notifytool_bin()
        .args(["--title", "t"])
        .env("XDG_CONFIG_HOME", dir.path())
        .output()
        .expect("Failed to execute command");

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("Missing required flag --body"),
        "Expected missing flag error, got: {}",
        stderr
    );
}
