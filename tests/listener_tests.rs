use std::cell::RefCell;
use std::rc::Rc;

use taskboard::listener::{
    ConsoleListener, ExecutionListener, ListenerOptions, ListenerSet, StaticConsoleListener,
};
use taskboard::task::{CapturedProcess, Task, TaskGroup, TaskStatus};
use taskboard::ui::TerminalSink;

fn running(name: &str) -> Task {
    Task::new(name, CapturedProcess::new().with_status(TaskStatus::Running))
}

#[test]
fn dashboard_and_change_log_share_one_terminal() {
    let sink = Rc::new(RefCell::new(
        TerminalSink::new(Vec::<u8>::new(), false).with_live_regions(false),
    ));
    let mut listeners: ListenerSet = ListenerSet::new();
    listeners.register(Box::new(StaticConsoleListener::with_options(
        sink.clone(),
        ListenerOptions::default().with_priority(-1),
    )));
    listeners.register(Box::new(ConsoleListener::new(sink.clone())));

    let mut group = TaskGroup::new(vec![running("build")]);
    listeners.tick(&group);
    group
        .get_mut(0)
        .expect("task")
        .process_mut()
        .set_status(TaskStatus::Succeeded);
    listeners.tick(&group);
    drop(listeners);

    let sink = Rc::try_unwrap(sink).ok().expect("sole owner").into_inner();
    let rendered = String::from_utf8(sink.into_inner()).expect("utf8");
    assert_eq!(
        rendered,
        "build (running)\n\nbuild is running\nbuild (success)\n\nbuild is successful\n"
    );
}

#[test]
fn live_terminal_keeps_groups_in_separate_regions() {
    let mut listener = ConsoleListener::new(TerminalSink::new(Vec::<u8>::new(), false));
    let first = TaskGroup::new(vec![running("a")]);
    let second = TaskGroup::new(vec![running("b")]);

    listener.on_tick(&first);
    listener.on_tick(&second);
    listener.on_tick(&first);

    let rendered = String::from_utf8(listener.into_sink().into_inner()).expect("utf8");
    // Redrawing the first group erases both regions (4 rows) and repaints them in order.
    assert!(
        rendered.ends_with("\u{1b}[4F\u{1b}[Ja (running)\n\nb (running)\n\n"),
        "{rendered:?}"
    );
}
