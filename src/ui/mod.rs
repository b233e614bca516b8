pub mod normalize;
pub mod sink;
pub mod terminal;
pub mod theme;

pub use normalize::{normalize_output, LINE_SEPARATOR};
pub use sink::{Line, MemorySink, OutputSink, RegionId, Span, UiError, UiResult};
pub use terminal::TerminalSink;
pub use theme::{OutputMode, StyleSheet, StyleTag};
