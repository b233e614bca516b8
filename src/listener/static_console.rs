use crate::listener::snapshot::SnapshotTracker;
use crate::listener::status::{classify, StatusCategory};
use crate::listener::{push_output_blocks, ExecutionListener, ListenerOptions};
use crate::task::{Process, TaskGroup};
use crate::ui::sink::{Line, OutputSink};
use crate::ui::theme::{StyleSheet, StyleTag};

/// Change log: only prints a line when a task starts, succeeds or fails.
/// Never rewrites earlier output, so it suits logs and CI.
pub struct StaticConsoleListener<S: OutputSink> {
    sink: S,
    priority: i32,
    snapshots: SnapshotTracker,
}

impl<S: OutputSink> StaticConsoleListener<S> {
    pub fn new(sink: S) -> Self {
        Self::with_options(sink, ListenerOptions::default())
    }

    pub fn with_options(mut sink: S, options: ListenerOptions) -> Self {
        if options.configure_formatter {
            sink.register_styles(&StyleSheet::default_styles());
        }
        Self {
            sink,
            priority: options.priority,
            snapshots: SnapshotTracker::new(),
        }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    pub fn snapshots(&self) -> &SnapshotTracker {
        &self.snapshots
    }

    /// Lines describing what changed since the group's last tick. Does not
    /// update the snapshot.
    pub fn changes<P: Process>(&self, group: &TaskGroup<P>) -> Vec<Line> {
        let mut buffer = Vec::new();
        for index in self.snapshots.changed_positions(group) {
            let Some(task) = group.get(index) else {
                continue;
            };
            let name = task.name();
            match classify(task) {
                StatusCategory::Idle => {}
                StatusCategory::Running => {
                    buffer.push(Line::plain(format!("{name} is ")).push_tagged("running", StyleTag::Running));
                }
                StatusCategory::Succeeded => {
                    buffer.push(Line::plain(format!("{name} is ")).push_tagged("successful", StyleTag::Success));
                }
                StatusCategory::Failed { .. } => {
                    buffer.push(Line::plain(format!("{name} has ")).push_tagged("failed", StyleTag::Error));
                    push_output_blocks(&mut buffer, task.process(), true);
                }
            }
        }
        buffer
    }
}

impl<P: Process, S: OutputSink> ExecutionListener<P> for StaticConsoleListener<S> {
    fn on_tick(&mut self, group: &TaskGroup<P>) {
        let lines = self.changes(group);
        if !lines.is_empty() {
            tracing::debug!(group = %group.id(), lines = lines.len(), "reporting task changes");
            if let Err(error) = self.sink.write_lines(&lines) {
                tracing::warn!(group = %group.id(), %error, "failed to report task changes");
            }
        }
        self.snapshots.record(group);
    }

    fn priority(&self) -> i32 {
        self.priority
    }
}

#[cfg(test)]
#[path = "../tests/static_listener_tests.rs"]
mod tests;
