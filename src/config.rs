use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = "taskboard.toml";
pub const DEFAULT_TICK_MS: u64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    #[default]
    Live,
    Static,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DisplayConfig {
    #[serde(default)]
    pub mode: DisplayMode,
    #[serde(default = "default_true")]
    pub styles: bool,
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            mode: DisplayMode::default(),
            styles: true,
            tick_ms: DEFAULT_TICK_MS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TaskConfig {
    pub name: String,
    pub run: String,
    #[serde(default)]
    pub cwd: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BoardConfig {
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub tasks: Vec<TaskConfig>,
}

#[derive(Debug)]
pub enum ConfigError {
    Read {
        path: PathBuf,
        error: std::io::Error,
    },
    Parse {
        path: PathBuf,
        error: toml::de::Error,
    },
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Read { path, error } => {
                write!(f, "failed to read {}: {error}", path.display())
            }
            ConfigError::Parse { path, error } => {
                write!(f, "failed to parse {}: {error}", path.display())
            }
            ConfigError::Invalid(message) => write!(f, "invalid configuration: {message}"),
        }
    }
}

impl std::error::Error for ConfigError {}

fn default_true() -> bool {
    true
}

fn default_tick_ms() -> u64 {
    DEFAULT_TICK_MS
}

impl BoardConfig {
    pub fn parse(source: &str, path: &Path) -> Result<Self, ConfigError> {
        let config: BoardConfig = toml::from_str(source).map_err(|error| ConfigError::Parse {
            path: path.to_path_buf(),
            error,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.display.tick_ms == 0 {
            return Err(ConfigError::Invalid("display.tick_ms must be > 0".to_owned()));
        }
        for task in &self.tasks {
            if task.name.trim().is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "task with command `{}` has an empty name",
                    task.run
                )));
            }
            if task.run.trim().is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "task `{}` has an empty run command",
                    task.name
                )));
            }
        }
        Ok(())
    }
}

/// Loads `path`, or the defaults when `path` is `None` and no
/// `taskboard.toml` exists in `cwd`.
pub fn load_config(path: Option<&Path>, cwd: &Path) -> Result<BoardConfig, ConfigError> {
    let (path, required) = match path {
        Some(path) => (path.to_path_buf(), true),
        None => (cwd.join(DEFAULT_CONFIG_FILE), false),
    };
    if !required && !path.is_file() {
        return Ok(BoardConfig::default());
    }
    let source = std::fs::read_to_string(&path).map_err(|error| ConfigError::Read {
        path: path.clone(),
        error,
    })?;
    tracing::debug!(path = %path.display(), "loaded configuration");
    BoardConfig::parse(&source, &path)
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
