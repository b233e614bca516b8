use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_GROUP_ID: AtomicU64 = AtomicU64::new(1);

/// Lifecycle state reported by a process. One value, assigned by whoever
/// owns the process, so a task is never idle and running at the same time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TaskStatus {
    #[default]
    Idle,
    Running,
    Succeeded,
    Failed(i32),
}

impl TaskStatus {
    pub fn is_running(self) -> bool {
        matches!(self, TaskStatus::Running)
    }

    pub fn is_completed(self) -> bool {
        matches!(self, TaskStatus::Succeeded | TaskStatus::Failed(_))
    }

    pub fn exit_code(self) -> Option<i32> {
        match self {
            TaskStatus::Succeeded => Some(0),
            TaskStatus::Failed(code) => Some(code),
            TaskStatus::Idle | TaskStatus::Running => None,
        }
    }
}

/// Read-only view over an external process bound to a task.
pub trait Process {
    fn status(&self) -> TaskStatus;
    fn output(&self) -> &[u8];
    fn error_output(&self) -> &[u8];
}

/// Process state held in memory and advanced by a scheduler.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapturedProcess {
    status: TaskStatus,
    output: Vec<u8>,
    error_output: Vec<u8>,
}

impl CapturedProcess {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_output(mut self, output: impl Into<Vec<u8>>) -> Self {
        self.output = output.into();
        self
    }

    pub fn with_error_output(mut self, output: impl Into<Vec<u8>>) -> Self {
        self.error_output = output.into();
        self
    }

    pub fn set_status(&mut self, status: TaskStatus) {
        self.status = status;
    }

    pub fn append_output(&mut self, chunk: &[u8]) {
        self.output.extend_from_slice(chunk);
    }

    pub fn append_error_output(&mut self, chunk: &[u8]) {
        self.error_output.extend_from_slice(chunk);
    }
}

impl Process for CapturedProcess {
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

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task<P = CapturedProcess> {
    name: String,
    process: P,
}

impl<P: Process> Task<P> {
    pub fn new(name: impl Into<String>, process: P) -> Self {
        Self {
            name: name.into(),
            process,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn process(&self) -> &P {
        &self.process
    }

    pub fn process_mut(&mut self) -> &mut P {
        &mut self.process
    }

    pub fn status(&self) -> TaskStatus {
        self.process.status()
    }

    pub fn is_running(&self) -> bool {
        self.status().is_running()
    }

    pub fn is_completed(&self) -> bool {
        self.status().is_completed()
    }
}

/// Stable handle identifying a task group across ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroupId(u64);

impl GroupId {
    pub fn next() -> Self {
        Self(NEXT_GROUP_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub fn as_raw(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for GroupId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "group-{}", self.0)
    }
}

/// Ordered, index-stable batch of tasks. Clones share the id and therefore
/// count as the same group for listeners.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskGroup<P = CapturedProcess> {
    id: GroupId,
    tasks: Vec<Task<P>>,
}

impl<P: Process> TaskGroup<P> {
    pub fn new(tasks: Vec<Task<P>>) -> Self {
        Self::with_id(GroupId::next(), tasks)
    }

    pub fn with_id(id: GroupId, tasks: Vec<Task<P>>) -> Self {
        Self { id, tasks }
    }

    pub fn id(&self) -> GroupId {
        self.id
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn push(&mut self, task: Task<P>) {
        self.tasks.push(task);
    }

    pub fn get(&self, index: usize) -> Option<&Task<P>> {
        self.tasks.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Task<P>> {
        self.tasks.get_mut(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Task<P>> {
        self.tasks.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Task<P>> {
        self.tasks.iter_mut()
    }

    pub fn failed_tasks(&self) -> impl Iterator<Item = &Task<P>> {
        self.tasks
            .iter()
            .filter(|task| matches!(task.status(), TaskStatus::Failed(_)))
    }

    pub fn all_completed(&self) -> bool {
        self.tasks.iter().all(Task::is_completed)
    }

    pub fn any_failed(&self) -> bool {
        self.failed_tasks().next().is_some()
    }
}

impl<'a, P: Process> IntoIterator for &'a TaskGroup<P> {
    type Item = &'a Task<P>;
    type IntoIter = std::slice::Iter<'a, Task<P>>;

    fn into_iter(self) -> Self::IntoIter {
        self.tasks.iter()
    }
}
