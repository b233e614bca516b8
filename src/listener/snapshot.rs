use indexmap::IndexMap;

use crate::task::{GroupId, Process, Task, TaskGroup};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskState {
    pub completed: bool,
    pub running: bool,
}

impl TaskState {
    pub fn of<P: Process>(task: &Task<P>) -> Self {
        Self {
            completed: task.is_completed(),
            running: task.is_running(),
        }
    }
}

/// Last observed state of every task position, per group.
///
/// Entries are keyed by position: a group that reorders or replaces tasks
/// between ticks has the new task compared against whatever previously sat at
/// that index.
#[derive(Debug, Default)]
pub struct SnapshotTracker {
    snapshots: IndexMap<GroupId, Vec<TaskState>>,
}

impl SnapshotTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn previous(&self, group: GroupId) -> &[TaskState] {
        self.snapshots.get(&group).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Positions that are new since the last recorded tick or whose state moved.
    pub fn changed_positions<P: Process>(&self, group: &TaskGroup<P>) -> Vec<usize> {
        let previous = self.previous(group.id());
        group
            .iter()
            .enumerate()
            .filter(|(index, task)| match previous.get(*index) {
                None => true,
                Some(state) => *state != TaskState::of(task),
            })
            .map(|(index, _)| index)
            .collect()
    }

    pub fn record<P: Process>(&mut self, group: &TaskGroup<P>) {
        let states = group.iter().map(TaskState::of).collect::<Vec<TaskState>>();
        self.snapshots.insert(group.id(), states);
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}
