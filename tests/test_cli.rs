use std::fs;
use std::path::Path;
use std::process::Command;

use tempfile::tempdir;

fn bin() -> &'static str {
    env!("CARGO_BIN_EXE_warning-capture")
}

fn write_file(path: &Path, content: &str) {
    fs::write(path, content).expect("failed to write test file");
}

#[test]
fn test_filters_json_lists_config_before_options() {
    let dir = tempdir().expect("temp dir");
    let config = dir.path().join("warnings.toml");
    write_file(
        &config,
        "[warnings]\nfilterwarnings = \"\"\"\nignore:.*deprecated.*:DeprecationWarning\n\"\"\"\n",
    );

    let output = Command::new(bin())
        .args([
            "-W",
            "error::UserWarning",
            "--config",
            config.to_str().expect("utf8 path"),
            "-F",
            "json",
            "filters",
        ])
        .output()
        .expect("command should run");

    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let value: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout should be JSON");
    let filters = value["filters"].as_array().expect("filters array");
    assert_eq!(filters.len(), 3);
    assert_eq!(filters[0]["origin"], "config");
    assert_eq!(filters[0]["rule"]["action"], "ignore");
    assert_eq!(filters[1]["origin"], "-W");
    assert_eq!(filters[1]["rule"]["action"], "error");
    assert_eq!(filters[2]["rule"]["action"], "once");
}

#[test]
fn test_invalid_spec_exits_with_error_naming_it() {
    let output = Command::new(bin())
        .args(["-W", "bogus::::", "filters"])
        .output()
        .expect("command should run");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("bogus::::"), "stderr: {stderr}");
}

#[test]
fn test_missing_config_file_is_reported() {
    let dir = tempdir().expect("temp dir");
    let missing = dir.path().join("nope.toml");

    let output = Command::new(bin())
        .args(["--config", missing.to_str().expect("utf8 path"), "filters"])
        .output()
        .expect("command should run");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Cannot read warnings config"), "stderr: {stderr}");
}

#[test]
fn test_categories_include_custom_entries() {
    let dir = tempdir().expect("temp dir");
    let config = dir.path().join("warnings.toml");
    write_file(
        &config,
        "[[warnings.categories]]\nname = \"PluginWarning\"\nparent = \"UserWarning\"\n",
    );

    let output = Command::new(bin())
        .args([
            "--config",
            config.to_str().expect("utf8 path"),
            "-F",
            "json",
            "categories",
        ])
        .output()
        .expect("command should run");

    assert!(output.status.success());
    let value: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout should be JSON");
    let categories = value["categories"].as_array().expect("categories array");
    let plugin = categories
        .iter()
        .find(|c| c["name"] == "PluginWarning")
        .expect("custom category listed");
    assert_eq!(plugin["parent"], "UserWarning");
}
