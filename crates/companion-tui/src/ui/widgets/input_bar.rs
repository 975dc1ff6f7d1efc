//! Chat input bar.
//!
//! Multi-line: Shift+Enter or Ctrl+J insert a newline. While a reply is
//! pending the bar is replaced by a waiting line and accepts nothing.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

use crate::ui::theme::{spinner_frame, Styles};
use crate::ui::widgets::TextInputState;

/// Placeholder shown while the input is empty.
pub const PLACEHOLDER: &str = "Share what's on your mind...";

const CURSOR: &str = "█";

/// Input bar for composing a message.
pub struct InputBar<'a> {
    input: &'a TextInputState,
    focused: bool,
    waiting: bool,
    tick: usize,
}

impl<'a> InputBar<'a> {
    /// Create a new input bar widget.
    pub fn new(input: &'a TextInputState) -> Self {
        Self {
            input,
            focused: false,
            waiting: false,
            tick: 0,
        }
    }

    /// Set whether the input bar is focused.
    #[must_use]
    pub fn focused(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }

    /// Show the waiting state while a reply is pending.
    #[must_use]
    pub fn waiting(mut self, waiting: bool, tick: usize) -> Self {
        self.waiting = waiting;
        self.tick = tick;
        self
    }

    /// Height the bar wants for `input`, borders included.
    #[allow(clippy::cast_possible_truncation)]
    pub fn desired_height(input: &TextInputState, max: u16) -> u16 {
        let lines = input.content().split('\n').count().max(1);
        (lines.min(usize::from(u16::MAX)) as u16 + 2).clamp(3, max.max(3))
    }

    /// Build display lines and the index of the line holding the cursor.
    fn build_input_lines(&self) -> (Vec<Line<'static>>, usize) {
        let content = self.input.content();

        if content.is_empty() {
            let mut spans = vec![Span::styled("> ", Styles::active())];
            if self.focused {
                spans.push(Span::styled(CURSOR, Styles::default()));
            }
            spans.push(Span::styled(PLACEHOLDER, Styles::dim()));
            return (vec![Line::from(spans)], 0);
        }

        let text_lines: Vec<&str> = content.split('\n').collect();

        // Find which line the cursor is on
        let mut remaining = self.input.cursor;
        let mut cursor_line = text_lines.len() - 1;
        let mut cursor_col = text_lines[cursor_line].chars().count();
        for (idx, line) in text_lines.iter().enumerate() {
            let len = line.chars().count();
            if remaining <= len {
                cursor_line = idx;
                cursor_col = remaining;
                break;
            }
            remaining -= len + 1;
        }

        let lines = text_lines
            .iter()
            .enumerate()
            .map(|(idx, text)| {
                let prefix = if idx == 0 { "> " } else { "  " };
                let mut spans = vec![Span::styled(prefix, Styles::active())];
                if self.focused && idx == cursor_line {
                    let before: String = text.chars().take(cursor_col).collect();
                    let after: String = text.chars().skip(cursor_col).collect();
                    spans.push(Span::styled(before, Styles::default()));
                    spans.push(Span::styled(CURSOR, Styles::default()));
                    spans.push(Span::styled(after, Styles::default()));
                } else {
                    spans.push(Span::styled((*text).to_string(), Styles::default()));
                }
                Line::from(spans)
            })
            .collect();

        (lines, cursor_line)
    }
}

impl Widget for InputBar<'_> {
    #[allow(clippy::cast_possible_truncation)]
    fn render(self, area: Rect, buf: &mut Buffer) {
        let border_style = if self.focused && !self.waiting {
            Styles::border_active()
        } else {
            Styles::border()
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .style(Styles::default());

        let inner_height = usize::from(area.height.saturating_sub(2));

        let paragraph = if self.waiting {
            Paragraph::new(Line::from(vec![
                Span::styled(spinner_frame(self.tick), Styles::active()),
                Span::styled(" Waiting for a reply...", Styles::dim()),
            ]))
            .block(block)
        } else {
            let (lines, cursor_line) = self.build_input_lines();

            // Keep the cursor line visible
            let scroll_offset = if lines.len() <= inner_height {
                0
            } else {
                cursor_line.saturating_sub(inner_height.saturating_sub(1))
            };

            Paragraph::new(lines)
                .block(block)
                .scroll((scroll_offset.min(usize::from(u16::MAX)) as u16, 0))
        };

        paragraph.render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::buffer_to_string;

    fn render(bar: InputBar<'_>, width: u16, height: u16) -> String {
        let area = Rect::new(0, 0, width, height);
        let mut buf = Buffer::empty(area);
        bar.render(area, &mut buf);
        buffer_to_string(&buf)
    }

    #[test]
    fn test_placeholder_when_empty() {
        let input = TextInputState::new();
        let text = render(InputBar::new(&input).focused(true), 50, 3);
        assert!(text.contains(PLACEHOLDER));
    }

    #[test]
    fn test_content_replaces_placeholder() {
        let mut input = TextInputState::new();
        input.insert_str("hello");
        let text = render(InputBar::new(&input).focused(true), 50, 3);
        assert!(text.contains("> hello█"));
        assert!(!text.contains(PLACEHOLDER));
    }

    #[test]
    fn test_cursor_on_second_line() {
        let mut input = TextInputState::new();
        input.insert_str("one\ntwo");
        input.move_left();
        let text = render(InputBar::new(&input).focused(true), 50, 4);
        assert!(text.contains("> one"));
        assert!(text.contains("  tw█o"));
    }

    #[test]
    fn test_waiting_hides_input() {
        let mut input = TextInputState::new();
        input.insert_str("draft");
        let text = render(InputBar::new(&input).focused(true).waiting(true, 0), 50, 3);
        assert!(text.contains("Waiting for a reply..."));
        assert!(!text.contains("draft"));
    }

    #[test]
    fn test_desired_height() {
        let mut input = TextInputState::new();
        assert_eq!(InputBar::desired_height(&input, 8), 3);

        input.insert_str("a\nb\nc");
        assert_eq!(InputBar::desired_height(&input, 8), 5);

        input.insert_str("\n".repeat(20).as_str());
        assert_eq!(InputBar::desired_height(&input, 8), 8);
    }
}
