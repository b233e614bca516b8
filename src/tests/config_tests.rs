use super::{load_config, BoardConfig, ConfigError, DisplayMode, DEFAULT_TICK_MS};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

#[test]
fn parses_display_and_tasks() {
    let config = BoardConfig::parse(
        "[display]\nmode = \"static\"\nstyles = false\ntick_ms = 250\n\n[[tasks]]\nname = \"build\"\nrun = \"cargo build\"\n\n[[tasks]]\nname = \"docs\"\nrun = \"make docs\"\ncwd = \"docs\"\n",
        Path::new("taskboard.toml"),
    )
    .expect("parse");

    assert_eq!(config.display.mode, DisplayMode::Static);
    assert!(!config.display.styles);
    assert_eq!(config.display.tick_ms, 250);
    assert_eq!(config.tasks.len(), 2);
    assert_eq!(config.tasks[1].cwd, Some(PathBuf::from("docs")));
}

#[test]
fn empty_file_uses_defaults() {
    let config = BoardConfig::parse("", Path::new("taskboard.toml")).expect("parse");
    assert_eq!(config.display.mode, DisplayMode::Live);
    assert!(config.display.styles);
    assert_eq!(config.display.tick_ms, DEFAULT_TICK_MS);
    assert!(config.tasks.is_empty());
}

#[test]
fn rejects_unknown_fields_and_zero_tick() {
    let unknown = BoardConfig::parse("[display]\ncolour = true\n", Path::new("a.toml"));
    assert!(matches!(unknown, Err(ConfigError::Parse { .. })));

    let zero = BoardConfig::parse("[display]\ntick_ms = 0\n", Path::new("a.toml"));
    assert!(matches!(zero, Err(ConfigError::Invalid(_))));
}

#[test]
fn rejects_tasks_without_command() {
    let err = BoardConfig::parse("[[tasks]]\nname = \"x\"\nrun = \" \"\n", Path::new("a.toml"))
        .expect_err("invalid");
    assert_eq!(err.to_string(), "invalid configuration: task `x` has an empty run command");
}

#[test]
fn missing_default_file_is_not_an_error_but_missing_explicit_file_is() {
    let root = temp_workspace("config-missing");
    assert_eq!(load_config(None, &root).expect("defaults"), BoardConfig::default());

    let explicit = root.join("nope.toml");
    assert!(matches!(
        load_config(Some(explicit.as_path()), &root),
        Err(ConfigError::Read { .. })
    ));
}

#[test]
fn discovers_config_in_working_directory() {
    let root = temp_workspace("config-discover");
    fs::write(
        root.join("taskboard.toml"),
        "[[tasks]]\nname = \"ping\"\nrun = \"printf pong\"\n",
    )
    .expect("write config");

    let config = load_config(None, &root).expect("load");
    assert_eq!(config.tasks[0].name, "ping");
}

fn temp_workspace(name: &str) -> PathBuf {
    let ts = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("time")
        .as_nanos();
    let root = std::env::temp_dir().join(format!("taskboard-{name}-{ts}"));
    fs::create_dir_all(&root).expect("mkdir workspace");
    root
}
