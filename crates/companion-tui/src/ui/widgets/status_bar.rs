//! Status bar widget with key hints and toast notices.

use crate::ui::theme::{Palette, Styles};
use companion_engine::{Notice, NoticeLevel};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::Widget,
};
use unicode_width::UnicodeWidthStr;

/// A key hint for the status bar.
#[derive(Debug, Clone)]
pub struct KeyHint {
    pub key: &'static str,
    pub label: &'static str,
}

impl KeyHint {
    pub const fn new(key: &'static str, label: &'static str) -> Self {
        Self { key, label }
    }
}

/// Status bar widget displayed at the bottom of the screen.
#[derive(Debug, Clone)]
pub struct StatusBar<'a> {
    mode: &'a str,
    hints: Vec<KeyHint>,
    right_text: Option<&'a str>,
    toast: Option<&'a Notice>,
}

impl<'a> StatusBar<'a> {
    /// Create a new status bar.
    pub fn new(mode: &'a str) -> Self {
        Self {
            mode,
            hints: Vec::new(),
            right_text: None,
            toast: None,
        }
    }

    /// Add key hints.
    #[must_use]
    pub fn hints(mut self, hints: Vec<KeyHint>) -> Self {
        self.hints = hints;
        self
    }

    /// Set right-aligned text, shown when no toast is active.
    #[must_use]
    pub fn right(mut self, text: &'a str) -> Self {
        self.right_text = Some(text);
        self
    }

    /// Show a notice on the right, replacing the right text.
    #[must_use]
    pub fn toast(mut self, notice: Option<&'a Notice>) -> Self {
        self.toast = notice;
        self
    }
}

/// Single-line rendering of a notice.
pub fn toast_text(notice: &Notice) -> String {
    format!("{}: {}", notice.title, notice.description)
}

fn toast_style(notice: &Notice) -> Style {
    match notice.level {
        NoticeLevel::Info => Styles::toast_info(),
        NoticeLevel::Error => Styles::toast_error(),
    }
}

impl Widget for StatusBar<'_> {
    #[allow(clippy::cast_possible_truncation)]
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height < 1 {
            return;
        }

        // Fill background with status bar color
        for x in area.x..area.x.saturating_add(area.width) {
            buf[(x, area.y)].set_char(' ').set_bg(Palette::STATUS_BG);
        }

        let mut spans = Vec::new();

        // Mode indicator (bright accent background)
        spans.push(Span::styled(
            format!(" {} ", self.mode),
            Styles::default().bg(Palette::ACCENT).fg(Palette::BG),
        ));
        spans.push(Span::styled(" ", Styles::status_bar()));

        // Hints give way to the toast so the notice stays readable
        if self.toast.is_none() {
            for hint in &self.hints {
                spans.push(Span::styled(format!(" {} ", hint.key), Styles::key_hint()));
                spans.push(Span::styled(
                    format!(" {} ", hint.label),
                    Styles::key_label(),
                ));
            }
        }

        let left_line = Line::from(spans);
        buf.set_line(area.x, area.y, &left_line, area.width);

        let (text, style) = match (self.toast, self.right_text) {
            (Some(notice), _) => (toast_text(notice), toast_style(notice)),
            (None, Some(text)) => (text.to_string(), Styles::status_bar()),
            (None, None) => return,
        };

        let mode_width = self.mode.width() as u16 + 3;
        let available = area.width.saturating_sub(mode_width + 1);
        let text_width = text.width() as u16;
        if text_width <= available {
            let x = area.x + area.width - text_width - 1;
            buf.set_string(x, area.y, &text, style);
        } else if available > 0 {
            let x = area.x + mode_width;
            buf.set_stringn(x, area.y, &text, available as usize, style);
        }
    }
}
