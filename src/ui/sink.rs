use std::cell::RefCell;
use std::fmt::{Display, Formatter};
use std::rc::Rc;

use crate::ui::theme::{StyleSheet, StyleTag};

pub type UiResult<T> = Result<T, UiError>;

#[derive(Debug)]
pub enum UiError {
    Io(std::io::Error),
    UnknownRegion(RegionId),
}

impl Display for UiError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            UiError::Io(error) => write!(f, "{error}"),
            UiError::UnknownRegion(region) => write!(f, "unknown output region #{}", region.0),
        }
    }
}

impl std::error::Error for UiError {}

impl From<std::io::Error> for UiError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RegionId(pub(crate) usize);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub text: String,
    pub tag: Option<StyleTag>,
}

/// One logical output line. The text may itself contain line separators
/// (normalized process output is kept as a single block).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Line {
    spans: Vec<Span>,
}

impl Line {
    pub fn blank() -> Self {
        Self::default()
    }

    pub fn plain(text: impl Into<String>) -> Self {
        Self::blank().push(text)
    }

    pub fn tagged(text: impl Into<String>, tag: StyleTag) -> Self {
        Self::blank().push_tagged(text, tag)
    }

    pub fn push(mut self, text: impl Into<String>) -> Self {
        self.spans.push(Span {
            text: text.into(),
            tag: None,
        });
        self
    }

    pub fn push_tagged(mut self, text: impl Into<String>, tag: StyleTag) -> Self {
        self.spans.push(Span {
            text: text.into(),
            tag: Some(tag),
        });
        self
    }

    pub fn spans(&self) -> &[Span] {
        &self.spans
    }

    pub fn plain_text(&self) -> String {
        self.spans.iter().map(|span| span.text.as_str()).collect()
    }
}

impl From<&str> for Line {
    fn from(value: &str) -> Self {
        Line::plain(value)
    }
}

impl From<String> for Line {
    fn from(value: String) -> Self {
        Line::plain(value)
    }
}

/// Destination for listener output: rewritable regions plus an append-only log.
pub trait OutputSink {
    fn open_region(&mut self) -> RegionId;
    /// Replaces the region's previous contents with `lines` in one update.
    fn rewrite_region(&mut self, region: RegionId, lines: &[Line]) -> UiResult<()>;
    fn write_lines(&mut self, lines: &[Line]) -> UiResult<()>;
    fn register_styles(&mut self, styles: &StyleSheet);
}

impl<S: OutputSink + ?Sized> OutputSink for &mut S {
    fn open_region(&mut self) -> RegionId {
        (**self).open_region()
    }

    fn rewrite_region(&mut self, region: RegionId, lines: &[Line]) -> UiResult<()> {
        (**self).rewrite_region(region, lines)
    }

    fn write_lines(&mut self, lines: &[Line]) -> UiResult<()> {
        (**self).write_lines(lines)
    }

    fn register_styles(&mut self, styles: &StyleSheet) {
        (**self).register_styles(styles)
    }
}

// Lets several listeners on one thread share a terminal.
impl<S: OutputSink> OutputSink for Rc<RefCell<S>> {
    fn open_region(&mut self) -> RegionId {
        self.borrow_mut().open_region()
    }

    fn rewrite_region(&mut self, region: RegionId, lines: &[Line]) -> UiResult<()> {
        self.borrow_mut().rewrite_region(region, lines)
    }

    fn write_lines(&mut self, lines: &[Line]) -> UiResult<()> {
        self.borrow_mut().write_lines(lines)
    }

    fn register_styles(&mut self, styles: &StyleSheet) {
        self.borrow_mut().register_styles(styles)
    }
}

/// Records output as plain text.
#[derive(Debug, Default)]
pub struct MemorySink {
    regions: Vec<Vec<String>>,
    rewrites: Vec<usize>,
    appended: Vec<String>,
    styles: StyleSheet,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn region(&self, region: RegionId) -> Option<&[String]> {
        self.regions.get(region.0).map(Vec::as_slice)
    }

    pub fn region_count(&self) -> usize {
        self.regions.len()
    }

    pub fn rewrite_count(&self, region: RegionId) -> usize {
        self.rewrites.get(region.0).copied().unwrap_or(0)
    }

    pub fn appended(&self) -> &[String] {
        &self.appended
    }

    pub fn take_appended(&mut self) -> Vec<String> {
        std::mem::take(&mut self.appended)
    }

    pub fn styles(&self) -> &StyleSheet {
        &self.styles
    }
}

impl OutputSink for MemorySink {
    fn open_region(&mut self) -> RegionId {
        self.regions.push(Vec::new());
        self.rewrites.push(0);
        RegionId(self.regions.len() - 1)
    }

    fn rewrite_region(&mut self, region: RegionId, lines: &[Line]) -> UiResult<()> {
        let Some(slot) = self.regions.get_mut(region.0) else {
            return Err(UiError::UnknownRegion(region));
        };
        *slot = lines.iter().map(Line::plain_text).collect();
        self.rewrites[region.0] += 1;
        Ok(())
    }

    fn write_lines(&mut self, lines: &[Line]) -> UiResult<()> {
        self.appended.extend(lines.iter().map(Line::plain_text));
        Ok(())
    }

    fn register_styles(&mut self, styles: &StyleSheet) {
        self.styles.merge(styles);
    }
}
