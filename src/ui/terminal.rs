use std::io::{IsTerminal, Write};

use anstream::adapter::strip_str;
use anstream::{AutoStream, ColorChoice};
use crossterm::cursor::MoveToPreviousLine;
use crossterm::terminal::{Clear, ClearType};
use unicode_width::UnicodeWidthStr;

use crate::ui::sink::{Line, OutputSink, RegionId, UiError, UiResult};
use crate::ui::theme::{resolve_color_enabled, OutputMode, StyleSheet};

#[derive(Debug, Default)]
struct Region {
    lines: Vec<String>,
}

/// Terminal sink with live regions stacked at the bottom of the output.
///
/// Rewriting a region erases it together with every region opened after it
/// and redraws them in one write. Appended lines are printed above the
/// regions so the live area always stays last. With live regions disabled
/// (output is not a terminal) every frame is simply appended.
pub struct TerminalSink<W: Write> {
    writer: W,
    color_enabled: bool,
    live_regions: bool,
    width: Option<usize>,
    width_probe: Option<fn() -> Option<usize>>,
    styles: StyleSheet,
    regions: Vec<Region>,
}

impl<W: Write> TerminalSink<W> {
    pub fn new(writer: W, color_enabled: bool) -> Self {
        Self {
            writer,
            color_enabled,
            live_regions: true,
            width: None,
            width_probe: None,
            styles: StyleSheet::new(),
            regions: Vec::new(),
        }
    }

    pub fn with_live_regions(mut self, enabled: bool) -> Self {
        self.live_regions = enabled;
        self
    }

    /// Terminal width used to count wrapped rows when erasing a region.
    pub fn with_width(mut self, width: Option<usize>) -> Self {
        self.width = width.filter(|width| *width > 0);
        self
    }

    /// Re-reads the width before every redraw so resizes are picked up.
    pub fn with_width_probe(mut self, probe: fn() -> Option<usize>) -> Self {
        self.width_probe = Some(probe);
        self
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn render_line(&self, line: &Line) -> String {
        let mut out = String::new();
        for span in line.spans() {
            match span.tag.and_then(|tag| self.styles.get(tag)) {
                Some(style) if self.color_enabled => {
                    out.push_str(&format!("{}{}{}", style.render(), span.text, style.render_reset()));
                }
                _ => out.push_str(&span.text),
            }
        }
        out
    }

    fn refresh_width(&mut self) {
        if !self.live_regions {
            return;
        }
        if let Some(probe) = self.width_probe {
            self.width = probe().filter(|width| *width > 0);
        }
    }

    /// Screen rows a rendered line occupies, ignoring escape sequences and
    /// counting wide characters as two columns.
    fn rows_for(&self, rendered: &str) -> usize {
        rendered
            .split('\n')
            .map(|row| {
                let visible = strip_str(row.trim_end_matches('\r')).to_string();
                let columns = visible.width();
                match self.width {
                    Some(width) if columns > width => columns.div_ceil(width),
                    _ => 1,
                }
            })
            .sum()
    }

    fn erase_rows(&self, frame: &mut Vec<u8>, rows: usize) -> UiResult<()> {
        if !self.live_regions || rows == 0 {
            return Ok(());
        }
        let rows = u16::try_from(rows).unwrap_or(u16::MAX);
        crossterm::queue!(frame, MoveToPreviousLine(rows), Clear(ClearType::FromCursorDown))?;
        Ok(())
    }

    fn push_regions(&self, frame: &mut Vec<u8>, range: std::ops::Range<usize>) {
        for region in &self.regions[range] {
            for line in &region.lines {
                frame.extend_from_slice(line.as_bytes());
                frame.push(b'\n');
            }
        }
    }

    fn rows_from(&self, from: usize) -> usize {
        self.regions[from..]
            .iter()
            .flat_map(|region| region.lines.iter())
            .map(|line| self.rows_for(line))
            .sum()
    }

    fn flush_frame(&mut self, frame: &[u8]) -> UiResult<()> {
        self.writer.write_all(frame)?;
        self.writer.flush()?;
        Ok(())
    }
}

fn terminal_columns() -> Option<usize> {
    crossterm::terminal::size()
        .ok()
        .map(|(columns, _)| usize::from(columns))
}

impl TerminalSink<AutoStream<std::io::Stdout>> {
    pub fn stdout(mode: OutputMode) -> Self {
        let choice = match mode {
            OutputMode::Auto => ColorChoice::Auto,
            OutputMode::Always => ColorChoice::AlwaysAnsi,
            OutputMode::Never => ColorChoice::Never,
        };
        let is_tty = std::io::stdout().is_terminal();
        let stream = AutoStream::new(std::io::stdout(), choice);
        let color_enabled = resolve_color_enabled(mode, is_tty);
        let sink = Self::new(stream, color_enabled).with_live_regions(is_tty);
        if is_tty {
            sink.with_width(terminal_columns())
                .with_width_probe(terminal_columns)
        } else {
            sink
        }
    }
}

impl<W: Write> OutputSink for TerminalSink<W> {
    fn open_region(&mut self) -> RegionId {
        self.regions.push(Region::default());
        RegionId(self.regions.len() - 1)
    }

    fn rewrite_region(&mut self, region: RegionId, lines: &[Line]) -> UiResult<()> {
        if region.0 >= self.regions.len() {
            return Err(UiError::UnknownRegion(region));
        }
        self.refresh_width();
        let mut frame = Vec::new();
        self.erase_rows(&mut frame, self.rows_from(region.0))?;

        let rendered = lines
            .iter()
            .map(|line| self.render_line(line))
            .collect::<Vec<String>>();
        self.regions[region.0] = Region { lines: rendered };

        let redraw_until = if self.live_regions {
            self.regions.len()
        } else {
            region.0 + 1
        };
        self.push_regions(&mut frame, region.0..redraw_until);
        self.flush_frame(&frame)
    }

    fn write_lines(&mut self, lines: &[Line]) -> UiResult<()> {
        if lines.is_empty() {
            return Ok(());
        }
        self.refresh_width();
        let mut frame = Vec::new();
        self.erase_rows(&mut frame, self.rows_from(0))?;
        for line in lines {
            frame.extend_from_slice(self.render_line(line).as_bytes());
            frame.push(b'\n');
        }
        if self.live_regions {
            self.push_regions(&mut frame, 0..self.regions.len());
        }
        self.flush_frame(&frame)
    }

    fn register_styles(&mut self, styles: &StyleSheet) {
        self.styles.merge(styles);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::theme::StyleTag;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn output(sink: TerminalSink<Vec<u8>>) -> String {
        String::from_utf8(sink.into_inner()).expect("utf8")
    }

    #[test]
    fn renders_tags_only_when_styles_registered_and_color_enabled() {
        let line = Line::plain("a ").push_tagged("ok", StyleTag::Success);

        let mut plain = TerminalSink::new(Vec::<u8>::new(), true).with_live_regions(false);
        plain.write_lines(&[line.clone()]).expect("write");
        assert_eq!(output(plain), "a ok\n");

        let mut colored = TerminalSink::new(Vec::<u8>::new(), true).with_live_regions(false);
        colored.register_styles(&StyleSheet::default_styles());
        colored.write_lines(&[line.clone()]).expect("write");
        assert!(output(colored).contains("\u{1b}["));

        let mut disabled = TerminalSink::new(Vec::<u8>::new(), false).with_live_regions(false);
        disabled.register_styles(&StyleSheet::default_styles());
        disabled.write_lines(&[line]).expect("write");
        assert_eq!(output(disabled), "a ok\n");
    }

    #[test]
    fn appends_frames_when_live_regions_disabled() {
        let mut sink = TerminalSink::new(Vec::<u8>::new(), false).with_live_regions(false);
        let first = sink.open_region();
        let second = sink.open_region();
        sink.rewrite_region(first, &[Line::plain("one")]).expect("rewrite");
        sink.rewrite_region(second, &[Line::plain("two")]).expect("rewrite");
        sink.rewrite_region(first, &[Line::plain("uno")]).expect("rewrite");
        assert_eq!(output(sink), "one\ntwo\nuno\n");
    }

    #[test]
    fn rewriting_a_region_redraws_the_regions_below_it() {
        let mut sink = TerminalSink::new(Vec::<u8>::new(), false);
        let first = sink.open_region();
        let second = sink.open_region();
        sink.rewrite_region(first, &[Line::plain("one")]).expect("rewrite");
        sink.rewrite_region(second, &[Line::plain("two"), Line::blank()])
            .expect("rewrite");
        sink.rewrite_region(first, &[Line::plain("uno")]).expect("rewrite");

        let rendered = output(sink);
        // 3 rows erased: "one" plus the two rows of the second region.
        assert!(rendered.ends_with("\u{1b}[3F\u{1b}[Juno\ntwo\n\n"));
    }

    #[test]
    fn appended_lines_print_above_live_regions() {
        let mut sink = TerminalSink::new(Vec::<u8>::new(), false);
        let region = sink.open_region();
        sink.rewrite_region(region, &[Line::plain("status")]).expect("rewrite");
        sink.write_lines(&[Line::plain("log line")]).expect("write");
        assert!(output(sink).ends_with("\u{1b}[1F\u{1b}[Jlog line\nstatus\n"));
    }

    static PROBED_WIDTH: AtomicUsize = AtomicUsize::new(8);

    fn probed_width() -> Option<usize> {
        Some(PROBED_WIDTH.load(Ordering::SeqCst))
    }

    #[test]
    fn escape_sequences_in_captured_output_take_no_columns() {
        let mut sink = TerminalSink::new(Vec::<u8>::new(), false).with_width(Some(12));
        let region = sink.open_region();
        let colored = Line::plain("\u{1b}[1;31merror\u{1b}[0m: cannot find `x`");
        sink.rewrite_region(region, &[colored]).expect("rewrite");
        sink.rewrite_region(region, &[Line::plain("ok")]).expect("rewrite");

        // 22 visible columns at width 12 is two rows; the raw 33 bytes would count three.
        assert!(output(sink).ends_with("\u{1b}[2F\u{1b}[Jok\n"));
    }

    #[test]
    fn wide_characters_count_two_columns() {
        let sink = TerminalSink::new(Vec::<u8>::new(), false).with_width(Some(4));
        assert_eq!(sink.rows_for("日本語です"), 3);
        assert_eq!(sink.rows_for("\u{1b}[32mabcd\u{1b}[0m"), 1);
    }

    #[test]
    fn width_is_requeried_before_each_redraw() {
        let mut sink = TerminalSink::new(Vec::<u8>::new(), false).with_width_probe(probed_width);
        let region = sink.open_region();
        PROBED_WIDTH.store(8, Ordering::SeqCst);
        sink.rewrite_region(region, &[Line::plain("abcdefgh")]).expect("rewrite");

        PROBED_WIDTH.store(4, Ordering::SeqCst);
        sink.rewrite_region(region, &[Line::plain("done")]).expect("rewrite");

        // The old line reflowed onto two rows at the narrower width.
        assert!(output(sink).ends_with("abcdefgh\n\u{1b}[2F\u{1b}[Jdone\n"));
    }

    #[test]
    fn counts_wrapped_and_embedded_rows() {
        let sink = TerminalSink::new(Vec::<u8>::new(), false).with_width(Some(4));
        assert_eq!(sink.rows_for("abcdefghi"), 3);
        assert_eq!(sink.rows_for("ab\ncd\n"), 3);
        assert_eq!(sink.rows_for(""), 1);
    }
}
