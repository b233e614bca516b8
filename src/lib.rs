pub mod board;
pub mod config;
pub mod listener;
pub mod logging;
pub mod process_manager;
pub mod task;
pub mod ui;

use std::path::PathBuf;

use crate::config::{DisplayMode, TaskConfig};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Run(BoardArgs),
    Help,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoardArgs {
    pub config: Option<PathBuf>,
    pub mode: Option<DisplayMode>,
    pub no_styles: bool,
    pub tick_ms: Option<u64>,
    pub tasks: Vec<TaskConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliParseError {
    MissingConfigValue,
    MissingTickValue,
    InvalidTickValue(String),
    InvalidTaskSpec(String),
    UnknownArgument(String),
}

impl std::fmt::Display for CliParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliParseError::MissingConfigValue => write!(f, "--config requires a value"),
            CliParseError::MissingTickValue => write!(f, "--tick-ms requires a value"),
            CliParseError::InvalidTickValue(value) => {
                write!(f, "--tick-ms expects a positive integer, got `{value}`")
            }
            CliParseError::InvalidTaskSpec(spec) => {
                write!(f, "task `{spec}` must be written as NAME=COMMAND")
            }
            CliParseError::UnknownArgument(arg) => write!(f, "unknown argument: {arg}"),
        }
    }
}

impl std::error::Error for CliParseError {}

pub fn parse_command<I>(args: I) -> Result<Command, CliParseError>
where
    I: IntoIterator<Item = String>,
{
    let mut args = args.into_iter();
    let mut parsed = BoardArgs::default();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--help" | "-h" => return Ok(Command::Help),
            "--static" => parsed.mode = Some(DisplayMode::Static),
            "--live" => parsed.mode = Some(DisplayMode::Live),
            "--no-styles" => parsed.no_styles = true,
            "--config" => {
                let Some(path) = args.next() else {
                    return Err(CliParseError::MissingConfigValue);
                };
                parsed.config = Some(PathBuf::from(path));
            }
            "--tick-ms" => {
                let Some(value) = args.next() else {
                    return Err(CliParseError::MissingTickValue);
                };
                match value.parse::<u64>() {
                    Ok(ms) if ms > 0 => parsed.tick_ms = Some(ms),
                    _ => return Err(CliParseError::InvalidTickValue(value)),
                }
            }
            "--" => {
                for spec in args.by_ref() {
                    parsed.tasks.push(parse_task_spec(&spec)?);
                }
            }
            other if other.starts_with('-') => {
                return Err(CliParseError::UnknownArgument(other.to_owned()))
            }
            other => parsed.tasks.push(parse_task_spec(other)?),
        }
    }

    Ok(Command::Run(parsed))
}

fn parse_task_spec(spec: &str) -> Result<TaskConfig, CliParseError> {
    let Some((name, run)) = spec.split_once('=') else {
        return Err(CliParseError::InvalidTaskSpec(spec.to_owned()));
    };
    if name.trim().is_empty() || run.trim().is_empty() {
        return Err(CliParseError::InvalidTaskSpec(spec.to_owned()));
    }
    Ok(TaskConfig {
        name: name.trim().to_owned(),
        run: run.to_owned(),
        cwd: None,
    })
}

pub fn print_usage() {
    eprintln!(
        "taskboard\n\nUSAGE:\n  taskboard [OPTIONS] [NAME=COMMAND ...]\n\nRuns every task at once and reports progress until all of them finish.\nTasks given on the command line replace the ones from the config file.\n\nOPTIONS:\n  --config <PATH>   Read tasks and display settings from PATH (default: ./taskboard.toml)\n  --live            Redraw a status table on every tick (default)\n  --static          Only print status changes\n  --no-styles       Do not register the default color styles\n  --tick-ms <MS>    Polling interval in milliseconds (default: 100)\n  -h, --help        Print help\n\nENVIRONMENT:\n  TASKBOARD_COLOR   auto | always | never\n  TASKBOARD_LOG     Log filter for diagnostics on stderr (default: warn)\n  NO_COLOR          Disable color output\n"
    );
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
