use crate::listener::regions::RegionMap;
use crate::listener::status::{classify, StatusCategory};
use crate::listener::{push_output_blocks, ExecutionListener, ListenerOptions};
use crate::task::{Process, TaskGroup};
use crate::ui::sink::{Line, OutputSink};
use crate::ui::theme::{StyleSheet, StyleTag};

/// Live dashboard: every tick redraws the group's full status table followed
/// by the details of each failed task.
pub struct ConsoleListener<S: OutputSink> {
    sink: S,
    priority: i32,
    regions: RegionMap,
}

impl<S: OutputSink> ConsoleListener<S> {
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
            regions: RegionMap::new(),
        }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    pub fn regions(&self) -> &RegionMap {
        &self.regions
    }

    pub fn render_frame<P: Process>(group: &TaskGroup<P>) -> Vec<Line> {
        let mut buffer = group
            .iter()
            .map(|task| {
                let category = classify(task);
                Line::plain(format!("{} (", task.name()))
                    .push_tagged(category.label(), category.tag())
                    .push(")")
            })
            .collect::<Vec<Line>>();

        buffer.push(Line::blank());

        for task in group.iter() {
            let StatusCategory::Failed { exit_code } = classify(task) else {
                continue;
            };
            buffer.push(Line::tagged(
                format!("Task \"{}\" failed (exit code: {exit_code}).", task.name()),
                StyleTag::Error,
            ));
            push_output_blocks(&mut buffer, task.process(), false);
            buffer.push(Line::blank());
        }

        buffer
    }
}

impl<P: Process, S: OutputSink> ExecutionListener<P> for ConsoleListener<S> {
    fn on_tick(&mut self, group: &TaskGroup<P>) {
        let region = self.regions.resolve(group.id(), &mut self.sink);
        let frame = Self::render_frame(group);
        tracing::trace!(group = %group.id(), tasks = group.len(), lines = frame.len(), "redrawing task group");
        if let Err(error) = self.sink.rewrite_region(region, &frame) {
            tracing::warn!(group = %group.id(), %error, "failed to redraw task group");
        }
    }

    fn priority(&self) -> i32 {
        self.priority
    }
}

#[cfg(test)]
#[path = "../tests/console_listener_tests.rs"]
mod tests;
