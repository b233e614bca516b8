mod console;
pub mod regions;
pub mod snapshot;
mod static_console;
pub mod status;

pub use console::ConsoleListener;
pub use regions::RegionMap;
pub use snapshot::{SnapshotTracker, TaskState};
pub use static_console::StaticConsoleListener;
pub use status::{classify, StatusCategory};

use crate::task::{CapturedProcess, Process, TaskGroup};
use crate::ui::normalize::normalize_output;
use crate::ui::sink::Line;

/// Observer called once per scheduler polling cycle with the current state of
/// a task group.
pub trait ExecutionListener<P: Process = CapturedProcess> {
    fn on_tick(&mut self, group: &TaskGroup<P>);

    /// Higher priorities are ticked first.
    fn priority(&self) -> i32 {
        0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListenerOptions {
    /// Register the default `error`/`success`/`idle`/`running` styles with the sink.
    pub configure_formatter: bool,
    pub priority: i32,
}

impl Default for ListenerOptions {
    fn default() -> Self {
        Self {
            configure_formatter: true,
            priority: 0,
        }
    }
}

impl ListenerOptions {
    pub fn with_configure_formatter(mut self, enabled: bool) -> Self {
        self.configure_formatter = enabled;
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }
}

/// Listeners ordered by descending priority, registration order breaking ties.
pub struct ListenerSet<P: Process = CapturedProcess> {
    listeners: Vec<Box<dyn ExecutionListener<P>>>,
}

impl<P: Process> Default for ListenerSet<P> {
    fn default() -> Self {
        Self {
            listeners: Vec::new(),
        }
    }
}

impl<P: Process> ListenerSet<P> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, listener: Box<dyn ExecutionListener<P>>) {
        let priority = listener.priority();
        let position = self
            .listeners
            .iter()
            .position(|existing| existing.priority() < priority)
            .unwrap_or(self.listeners.len());
        self.listeners.insert(position, listener);
    }

    pub fn tick(&mut self, group: &TaskGroup<P>) {
        for listener in &mut self.listeners {
            listener.on_tick(group);
        }
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

/// Appends the labelled stdout/stderr blocks of a process, skipping empty ones.
pub(crate) fn push_output_blocks<P: Process>(
    buffer: &mut Vec<Line>,
    process: &P,
    blank_after_each: bool,
) {
    let blocks = [
        ("Output:", process.output()),
        ("Error output:", process.error_output()),
    ];
    for (label, raw) in blocks {
        let normalized = normalize_output(raw);
        if normalized.is_empty() {
            continue;
        }
        buffer.push(Line::plain(label));
        buffer.push(Line::plain(normalized));
        if blank_after_each {
            buffer.push(Line::blank());
        }
    }
}

#[cfg(test)]
#[path = "../tests/listener_set_tests.rs"]
mod tests;
