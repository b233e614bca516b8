use std::fmt::{Display, Formatter};
use std::path::Path;
use std::thread;
use std::time::Duration;

use crate::config::{load_config, ConfigError, DisplayMode};
use crate::listener::{
    ConsoleListener, ExecutionListener, ListenerOptions, ListenerSet, StaticConsoleListener,
};
use crate::process_manager::{ChildProcess, ProcessManagerError, ProcessSpec};
use crate::task::{Task, TaskGroup};
use crate::ui::{OutputMode, OutputSink, TerminalSink};
use crate::BoardArgs;

#[derive(Debug)]
pub enum BoardError {
    Config(ConfigError),
    Process(ProcessManagerError),
    NoTasks,
}

impl Display for BoardError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            BoardError::Config(error) => write!(f, "{error}"),
            BoardError::Process(error) => write!(f, "{error}"),
            BoardError::NoTasks => write!(
                f,
                "no tasks to run; pass NAME=COMMAND arguments or add [[tasks]] to taskboard.toml"
            ),
        }
    }
}

impl std::error::Error for BoardError {}

impl From<ConfigError> for BoardError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<ProcessManagerError> for BoardError {
    fn from(value: ProcessManagerError) -> Self {
        Self::Process(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoardOutcome {
    pub total: usize,
    pub failed: usize,
}

impl BoardOutcome {
    pub fn success(&self) -> bool {
        self.failed == 0
    }
}

/// Runs the board against stdout.
pub fn run_board(args: &BoardArgs, cwd: &Path) -> Result<BoardOutcome, BoardError> {
    run_board_with_sink(args, cwd, TerminalSink::stdout(OutputMode::from_env()))
}

pub fn run_board_with_sink<S>(args: &BoardArgs, cwd: &Path, sink: S) -> Result<BoardOutcome, BoardError>
where
    S: OutputSink + 'static,
{
    let config = load_config(args.config.as_deref(), cwd)?;
    let tasks = if args.tasks.is_empty() {
        config.tasks
    } else {
        args.tasks.clone()
    };
    if tasks.is_empty() {
        return Err(BoardError::NoTasks);
    }

    let mode = args.mode.unwrap_or(config.display.mode);
    let options = ListenerOptions::default()
        .with_configure_formatter(config.display.styles && !args.no_styles);
    let tick = Duration::from_millis(args.tick_ms.unwrap_or(config.display.tick_ms));

    let mut listeners: ListenerSet<ChildProcess> = ListenerSet::new();
    let listener: Box<dyn ExecutionListener<ChildProcess>> = match mode {
        DisplayMode::Live => Box::new(ConsoleListener::with_options(sink, options)),
        DisplayMode::Static => Box::new(StaticConsoleListener::with_options(sink, options)),
    };
    listeners.register(listener);

    let mut group = TaskGroup::new(
        tasks
            .into_iter()
            .map(|task| {
                let cwd = match &task.cwd {
                    Some(dir) => cwd.join(dir),
                    None => cwd.to_path_buf(),
                };
                Task::new(
                    task.name.clone(),
                    ChildProcess::new(ProcessSpec {
                        name: task.name,
                        run: task.run,
                        cwd,
                    }),
                )
            })
            .collect(),
    );
    tracing::info!(group = %group.id(), tasks = group.len(), ?mode, "starting task board");

    for task in group.iter_mut() {
        task.process_mut().start()?;
    }

    loop {
        for task in group.iter_mut() {
            task.process_mut().poll()?;
        }
        listeners.tick(&group);
        if group.all_completed() {
            break;
        }
        thread::sleep(tick);
    }

    Ok(BoardOutcome {
        total: group.len(),
        failed: group.failed_tasks().count(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TaskConfig;
    use crate::ui::MemorySink;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn task(name: &str, run: &str) -> TaskConfig {
        TaskConfig {
            name: name.to_owned(),
            run: run.to_owned(),
            cwd: None,
        }
    }

    #[test]
    fn static_board_reports_each_task_and_counts_failures() {
        let sink = Rc::new(RefCell::new(MemorySink::new()));
        let args = BoardArgs {
            mode: Some(DisplayMode::Static),
            tick_ms: Some(10),
            tasks: vec![task("ok", "true"), task("bad", "printf nope 1>&2; exit 4")],
            ..BoardArgs::default()
        };

        let outcome =
            run_board_with_sink(&args, &std::env::temp_dir(), sink.clone()).expect("run board");

        assert_eq!(outcome, BoardOutcome { total: 2, failed: 1 });
        let appended = sink.borrow().appended().to_vec();
        assert!(appended.contains(&"ok is successful".to_owned()), "{appended:?}");
        assert!(appended.contains(&"bad has failed".to_owned()), "{appended:?}");
        assert!(appended.contains(&"nope".to_owned()), "{appended:?}");
    }

    #[test]
    fn live_board_ends_on_final_frame() {
        let sink = Rc::new(RefCell::new(MemorySink::new()));
        let args = BoardArgs {
            tick_ms: Some(10),
            tasks: vec![task("one", "exit 0")],
            ..BoardArgs::default()
        };

        let outcome =
            run_board_with_sink(&args, &std::env::temp_dir(), sink.clone()).expect("run board");

        assert!(outcome.success());
        let sink = sink.borrow();
        assert_eq!(sink.region_count(), 1);
        let region = sink.region(crate::ui::RegionId(0)).expect("region");
        assert_eq!(region, ["one (success)", ""]);
    }

    #[test]
    fn board_without_tasks_is_an_error() {
        let dir = std::env::temp_dir().join(format!("taskboard-empty-{}", std::process::id()));
        std::fs::create_dir_all(&dir).expect("mkdir");
        let result = run_board_with_sink(&BoardArgs::default(), &dir, MemorySink::new());
        assert!(matches!(result, Err(BoardError::NoTasks)));
    }
}
