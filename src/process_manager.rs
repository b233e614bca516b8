use std::io::{ErrorKind, Read};
#[cfg(unix)]
use std::os::unix::process::CommandExt;
#[cfg(unix)]
use std::os::unix::process::ExitStatusExt;
use std::path::PathBuf;
use std::process::{Child, Command as ProcessCommand, ExitStatus, Stdio};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

#[cfg(unix)]
use nix::sys::signal::{kill, Signal};
#[cfg(unix)]
use nix::unistd::{setpgid, Pid};

use crate::task::{Process, TaskStatus};

/// How long to keep collecting output after exit while a pipe is still held
/// open, e.g. by a backgrounded grandchild.
pub const OUTPUT_GRACE: Duration = Duration::from_millis(200);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessSpec {
    pub name: String,
    pub run: String,
    pub cwd: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StreamKind {
    Stdout,
    Stderr,
}

#[derive(Debug)]
pub enum ProcessManagerError {
    Spawn {
        process: String,
        command: String,
        error: std::io::Error,
    },
    MissingStdio {
        process: String,
    },
    Wait {
        process: String,
        error: std::io::Error,
    },
}

impl std::fmt::Display for ProcessManagerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProcessManagerError::Spawn {
                process,
                command,
                error,
            } => write!(
                f,
                "failed to spawn process `{process}` with command `{command}`: {error}"
            ),
            ProcessManagerError::MissingStdio { process } => {
                write!(f, "process `{process}` missing stdout/stderr pipe")
            }
            ProcessManagerError::Wait { process, error } => {
                write!(f, "failed waiting on process `{process}`: {error}")
            }
        }
    }
}

impl std::error::Error for ProcessManagerError {}

/// Shell command whose output is captured in memory while it runs.
///
/// Status only advances when [`ChildProcess::poll`] is called, so a listener
/// always sees the state as of the last poll.
pub struct ChildProcess {
    spec: ProcessSpec,
    child: Option<Child>,
    status: TaskStatus,
    output: Vec<u8>,
    error_output: Vec<u8>,
    chunks: Option<Receiver<(StreamKind, Vec<u8>)>>,
    readers: Vec<JoinHandle<()>>,
    exited: Option<(TaskStatus, Instant)>,
}

impl ChildProcess {
    pub fn new(spec: ProcessSpec) -> Self {
        Self {
            spec,
            child: None,
            status: TaskStatus::Idle,
            output: Vec::new(),
            error_output: Vec::new(),
            chunks: None,
            readers: Vec::new(),
            exited: None,
        }
    }

    pub fn spec(&self) -> &ProcessSpec {
        &self.spec
    }

    pub fn start(&mut self) -> Result<(), ProcessManagerError> {
        if self.child.is_some() {
            return Ok(());
        }
        let mut child = spawn_plain_shell(&self.spec)
            .spawn()
            .map_err(|error| ProcessManagerError::Spawn {
                process: self.spec.name.clone(),
                command: self.spec.run.clone(),
                error,
            })?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| ProcessManagerError::MissingStdio {
                process: self.spec.name.clone(),
            })?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| ProcessManagerError::MissingStdio {
                process: self.spec.name.clone(),
            })?;

        let (tx, rx) = mpsc::channel();
        self.readers = vec![
            spawn_reader(stdout, StreamKind::Stdout, tx.clone()),
            spawn_reader(stderr, StreamKind::Stderr, tx),
        ];
        self.chunks = Some(rx);
        self.child = Some(child);
        self.status = TaskStatus::Running;
        tracing::debug!(process = %self.spec.name, command = %self.spec.run, "spawned process");
        Ok(())
    }

    /// Collects pending output and checks for exit without blocking.
    ///
    /// After exit the status stays `Running` until both pipes close or
    /// [`OUTPUT_GRACE`] has passed, so trailing output is not lost.
    pub fn poll(&mut self) -> Result<TaskStatus, ProcessManagerError> {
        self.drain_chunks();
        let Some(child) = self.child.as_mut() else {
            return Ok(self.status);
        };
        if !self.status.is_running() {
            return Ok(self.status);
        }

        if self.exited.is_none() {
            let exited = child.try_wait().map_err(|error| ProcessManagerError::Wait {
                process: self.spec.name.clone(),
                error,
            })?;
            self.exited = exited.map(|exit| (status_from_exit(exit), Instant::now()));
        }
        let Some((status, exited_at)) = self.exited else {
            return Ok(self.status);
        };

        self.readers.retain(|reader| !reader.is_finished());
        if self.readers.is_empty() || exited_at.elapsed() >= OUTPUT_GRACE {
            self.drain_chunks();
            if !self.readers.is_empty() {
                tracing::debug!(process = %self.spec.name, "output pipe still open after exit");
            }
            self.status = status;
            tracing::debug!(process = %self.spec.name, status = ?self.status, "process exited");
        }
        Ok(self.status)
    }

    pub fn terminate(&mut self) {
        if !self.status.is_running() {
            return;
        }
        let Some(child) = self.child.as_mut() else {
            return;
        };
        #[cfg(unix)]
        {
            let _ = signal_process_group(child, Signal::SIGTERM);
        }
        #[cfg(not(unix))]
        {
            let _ = child.kill();
        }
    }

    fn drain_chunks(&mut self) {
        let Some(chunks) = self.chunks.as_ref() else {
            return;
        };
        for (kind, chunk) in chunks.try_iter() {
            match kind {
                StreamKind::Stdout => self.output.extend_from_slice(&chunk),
                StreamKind::Stderr => self.error_output.extend_from_slice(&chunk),
            }
        }
    }
}

impl Process for ChildProcess {
    fn status(&self) -> TaskStatus {
        self.status
    }

    fn output(&self) -> &[u8] {
        &self.output
    }

    fn error_output(&self) -> &[u8] {
        &self.error_output
    }
}

impl Drop for ChildProcess {
    fn drop(&mut self) {
        self.terminate();
    }
}

fn spawn_reader<R>(mut source: R, kind: StreamKind, tx: Sender<(StreamKind, Vec<u8>)>) -> JoinHandle<()>
where
    R: Read + Send + 'static,
{
    thread::spawn(move || {
        let mut buf = [0u8; 4096];
        loop {
            match source.read(&mut buf) {
                Ok(0) => break,
                Ok(read) => {
                    if tx.send((kind, buf[..read].to_vec())).is_err() {
                        break;
                    }
                }
                Err(error) if error.kind() == ErrorKind::Interrupted => continue,
                Err(_) => break,
            }
        }
    })
}

fn status_from_exit(status: ExitStatus) -> TaskStatus {
    if status.success() {
        return TaskStatus::Succeeded;
    }
    if let Some(code) = status.code() {
        return TaskStatus::Failed(code);
    }
    #[cfg(unix)]
    {
        if let Some(signal) = status.signal() {
            return TaskStatus::Failed(128 + signal);
        }
    }
    TaskStatus::Failed(-1)
}

fn spawn_plain_shell(spec: &ProcessSpec) -> ProcessCommand {
    let mut process = ProcessCommand::new("sh");
    process
        .arg("-c")
        .arg(&spec.run)
        .current_dir(&spec.cwd)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    #[cfg(unix)]
    unsafe {
        process.pre_exec(|| {
            setpgid(Pid::from_raw(0), Pid::from_raw(0))
                .map_err(|error| std::io::Error::new(ErrorKind::Other, error.to_string()))
        });
    }
    process
}

#[cfg(unix)]
fn signal_process_group(child: &mut Child, signal: Signal) -> Result<(), nix::Error> {
    let pid = child.id() as i32;
    if pid > 0 {
        kill(Pid::from_raw(-pid), signal)
    } else {
        Ok(())
    }
}
