use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn lograte(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("lograte").unwrap();
    cmd.current_dir(dir.path())
        .env_remove("LOGRATE_CONFIG")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_message_to_stdout() {
    let dir = TempDir::new().unwrap();
    lograte(&dir)
        .args(["--no-color", "--flags", "", "hello", "world"])
        .assert()
        .success()
        .stdout("[info] hello world\n");
}

#[test]
fn test_colored_by_default_on_console() {
    let dir = TempDir::new().unwrap();
    lograte(&dir)
        .args(["--flags", "", "-t", "warn", "careful"])
        .assert()
        .success()
        .stdout("\x1b[0;33m[warning] careful\x1b[0m\n");
}

#[test]
fn test_stdin_lines_to_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("app.log");

    lograte(&dir)
        .arg("--file")
        .arg(&path)
        .args(["--type", "error"])
        .write_stdin("first\nsecond\n")
        .assert()
        .success()
        .stdout("");

    let content = fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].ends_with("[error] first"));
    assert!(lines[1].ends_with("[error] second"));
    assert!(!content.contains('\x1b'));
}

#[test]
fn test_level_filters_type() {
    let dir = TempDir::new().unwrap();
    lograte(&dir)
        .args(["--level", "error", "--type", "info", "quiet"])
        .assert()
        .success()
        .stdout("");
}

#[test]
fn test_fatal_exits_non_zero() {
    let dir = TempDir::new().unwrap();
    lograte(&dir)
        .args(["--no-color", "--flags", "", "--type", "fatal", "boom"])
        .assert()
        .code(255)
        .stdout("[fatal] boom\n");
}

#[test]
fn test_size_rotation() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("size.log");

    lograte(&dir)
        .arg("--file")
        .arg(&path)
        .args(["--flags", "", "--rotate", "size", "--rotate-size", "10"])
        .write_stdin("one\ntwo\nthree\n")
        .assert()
        .success();

    assert_eq!(fs::read_to_string(dir.path().join("size.log.0")).unwrap(), "[info] one\n");
    assert_eq!(fs::read_to_string(dir.path().join("size.log.1")).unwrap(), "[info] two\n");
    assert_eq!(fs::read_to_string(&path).unwrap(), "[info] three\n");
}

#[test]
fn test_rotation_requires_file() {
    let dir = TempDir::new().unwrap();
    lograte(&dir)
        .args(["--rotate", "daily", "msg"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("rotates but has no path"));
}

#[test]
fn test_discovered_config() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("lograte.toml"),
        r#"
[[backends]]
name = "file"
path = "configured.log"
level = "warn"
flags = []
prefix = "app: "
"#,
    )
    .unwrap();

    lograte(&dir)
        .args(["--type", "warning", "from config"])
        .assert()
        .success()
        .stdout("");
    lograte(&dir)
        .args(["--type", "info", "filtered"])
        .assert()
        .success();

    let content = fs::read_to_string(dir.path().join("configured.log")).unwrap();
    assert_eq!(content, "app: [warning] from config\n");
}

#[test]
fn test_level_override_applies_to_config() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("custom.yaml");
    fs::write(
        &config,
        "backends:\n  - name: out\n    level: error\n    colored: false\n    flags: []\n",
    )
    .unwrap();

    lograte(&dir)
        .arg("--config")
        .arg(&config)
        .args(["--level", "debug", "--type", "debug", "verbose"])
        .assert()
        .success()
        .stdout("[debug] verbose\n");
}

#[test]
fn test_line_options_override_config() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("lograte.toml"),
        r#"
[[backends]]
name = "console"
colored = false
flags = ["date", "time"]
prefix = "cfg: "

[[backends]]
name = "file"
path = "out.log"
prefix = "cfg: "
"#,
    )
    .unwrap();

    lograte(&dir)
        .args(["--flags", "", "--prefix", "cli: ", "msg"])
        .assert()
        .success()
        .stdout("cli: [info] msg\n");

    let content = fs::read_to_string(dir.path().join("out.log")).unwrap();
    assert_eq!(content, "cli: [info] msg\n");
}

#[test]
fn test_rotation_override_applies_to_config() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("lograte.yaml"),
        "backends:\n  - name: file\n    path: rot.log\n    flags: []\n",
    )
    .unwrap();

    lograte(&dir)
        .args(["--rotate", "size", "--rotate-size", "10"])
        .write_stdin("one\ntwo\n")
        .assert()
        .success();

    assert_eq!(fs::read_to_string(dir.path().join("rot.log.0")).unwrap(), "[info] one\n");
    assert_eq!(fs::read_to_string(dir.path().join("rot.log")).unwrap(), "[info] two\n");
}

#[test]
fn test_rotation_override_needs_file_backend() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("lograte.toml"), "[[backends]]\nname = \"console\"\n").unwrap();

    lograte(&dir)
        .args(["--rotate", "daily", "msg"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("need a backend with a path"));
}

#[test]
fn test_bad_config() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("broken.toml");
    fs::write(&config, "[[backends]]\nname = \"x\"\nrotate = \"weekly\"\npath = \"x.log\"\n").unwrap();

    lograte(&dir)
        .arg("--config")
        .arg(&config)
        .arg("msg")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Error:").and(predicate::str::contains("weekly")));
}

#[test]
fn test_missing_config() {
    let dir = TempDir::new().unwrap();
    lograte(&dir)
        .args(["--config", "nope.toml", "msg"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Config file not found"));
}

#[test]
fn test_crash_log_captures_stderr() {
    let dir = TempDir::new().unwrap();
    let crash = dir.path().join("crash.log");

    lograte(&dir)
        .arg("--crash-log")
        .arg(&crash)
        .args(["--stderr", "--no-color", "--flags", "", "to the crash log"])
        .assert()
        .success()
        .stderr("");

    assert_eq!(fs::read_to_string(&crash).unwrap(), "[info] to the crash log\n");
}
