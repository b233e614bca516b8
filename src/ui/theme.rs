use anstyle::{AnsiColor, Color, Style};
use indexmap::IndexMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Auto,
    Always,
    Never,
}

impl OutputMode {
    pub fn from_env() -> Self {
        match std::env::var("TASKBOARD_COLOR").ok().as_deref() {
            Some("always") => OutputMode::Always,
            Some("never") => OutputMode::Never,
            _ => OutputMode::Auto,
        }
    }
}

/// Semantic tag a line fragment can carry; sinks map it to a concrete style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StyleTag {
    Error,
    Success,
    Idle,
    Running,
}

impl StyleTag {
    pub fn name(self) -> &'static str {
        match self {
            StyleTag::Error => "error",
            StyleTag::Success => "success",
            StyleTag::Idle => "idle",
            StyleTag::Running => "running",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    Added,
    Unchanged,
    Conflict,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyleSheet {
    styles: IndexMap<StyleTag, Style>,
}

impl StyleSheet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn default_styles() -> Self {
        let mut sheet = Self::new();
        sheet.register(StyleTag::Error, fg(AnsiColor::Red));
        sheet.register(StyleTag::Success, fg(AnsiColor::Green));
        sheet.register(StyleTag::Idle, fg(AnsiColor::Blue));
        sheet.register(StyleTag::Running, fg(AnsiColor::Yellow));
        sheet
    }

    /// First definition wins; a differing redefinition is reported, not applied.
    pub fn register(&mut self, tag: StyleTag, style: Style) -> Registration {
        match self.styles.get(&tag) {
            None => {
                self.styles.insert(tag, style);
                Registration::Added
            }
            Some(existing) if *existing == style => Registration::Unchanged,
            Some(_) => Registration::Conflict,
        }
    }

    pub fn merge(&mut self, other: &StyleSheet) {
        for (tag, style) in &other.styles {
            if self.register(*tag, *style) == Registration::Conflict {
                tracing::warn!(tag = tag.name(), "ignoring conflicting style redefinition");
            }
        }
    }

    pub fn get(&self, tag: StyleTag) -> Option<Style> {
        self.styles.get(&tag).copied()
    }

    pub fn len(&self) -> usize {
        self.styles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }
}

fn fg(color: AnsiColor) -> Style {
    Style::new().fg_color(Some(Color::Ansi(color)))
}

pub fn resolve_color_enabled(mode: OutputMode, is_tty: bool) -> bool {
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    match mode {
        OutputMode::Always => true,
        OutputMode::Never => false,
        OutputMode::Auto => is_tty,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_styles_cover_every_tag() {
        let sheet = StyleSheet::default_styles();
        assert_eq!(sheet.len(), 4);
        assert_eq!(sheet.get(StyleTag::Error), Some(fg(AnsiColor::Red)));
        assert_eq!(sheet.get(StyleTag::Running), Some(fg(AnsiColor::Yellow)));
    }

    #[test]
    fn registration_is_idempotent_and_first_definition_wins() {
        let mut sheet = StyleSheet::default_styles();
        assert_eq!(
            sheet.register(StyleTag::Idle, fg(AnsiColor::Blue)),
            Registration::Unchanged
        );
        assert_eq!(
            sheet.register(StyleTag::Idle, fg(AnsiColor::Magenta)),
            Registration::Conflict
        );
        sheet.merge(&StyleSheet::default_styles());
        assert_eq!(sheet, StyleSheet::default_styles());
    }
}
