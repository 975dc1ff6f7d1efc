//! Scrolling message list for the chat screen.
//!
//! User messages sit on the right, companion messages on the left with
//! their emotion label beneath. While a reply is pending the last row is
//! a typing indicator.

use std::cell::Cell;

use companion_engine::Message;
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

use crate::ui::theme::{spinner_frame, Styles};

/// Text shown next to the spinner while a reply is pending.
pub const TYPING_TEXT: &str = "Your companion is thinking...";

const USER_LABEL: &str = "You";
const COMPANION_LABEL: &str = "Companion";

/// Narrowest a message column gets before it stops shrinking.
const MIN_BUBBLE_WIDTH: usize = 16;

/// Message list widget.
pub struct MessageList<'a> {
    messages: &'a [Message],
    pending: bool,
    tick: usize,
    /// Lines scrolled up from the bottom.
    scroll: usize,
    max_scroll: Option<&'a Cell<usize>>,
}

impl<'a> MessageList<'a> {
    pub fn new(messages: &'a [Message]) -> Self {
        Self {
            messages,
            pending: false,
            tick: 0,
            scroll: 0,
            max_scroll: None,
        }
    }

    /// Show the typing indicator, animated by `tick`.
    #[must_use]
    pub fn pending(mut self, pending: bool, tick: usize) -> Self {
        self.pending = pending;
        self.tick = tick;
        self
    }

    /// Scroll offset measured from the newest line.
    #[must_use]
    pub fn scroll(mut self, scroll: usize) -> Self {
        self.scroll = scroll;
        self
    }

    /// Receives the largest usable scroll offset after each render.
    #[must_use]
    pub fn max_scroll(mut self, cell: &'a Cell<usize>) -> Self {
        self.max_scroll = Some(cell);
        self
    }
}

/// Width a single message wraps to inside a list `width` columns wide.
pub fn bubble_width(width: u16) -> usize {
    let width = usize::from(width);
    (width * 3 / 4).max(MIN_BUBBLE_WIDTH).min(width.max(1))
}

/// Lay out every message (and the typing row) as display lines.
pub fn build_lines(
    messages: &[Message],
    pending: bool,
    tick: usize,
    width: u16,
) -> Vec<Line<'static>> {
    let wrap_width = bubble_width(width);
    let mut lines = Vec::new();

    for (i, message) in messages.iter().enumerate() {
        if i > 0 {
            lines.push(Line::from(""));
        }

        let alignment = if message.is_user() {
            Alignment::Right
        } else {
            Alignment::Left
        };
        let (label, label_style) = if message.is_user() {
            (USER_LABEL, Styles::user_label())
        } else {
            (COMPANION_LABEL, Styles::companion_label())
        };

        lines.push(Line::from(Span::styled(label, label_style)).alignment(alignment));
        for row in textwrap::wrap(&message.text, wrap_width) {
            lines.push(
                Line::from(Span::styled(row.into_owned(), Styles::default())).alignment(alignment),
            );
        }

        // Emotion labels only ever accompany companion replies
        if !message.is_user() {
            if let Some(emotion) = message.emotion.as_deref() {
                for row in textwrap::wrap(emotion, wrap_width) {
                    lines.push(Line::from(Span::styled(row.into_owned(), Styles::emotion())));
                }
            }
        }
    }

    if pending {
        if !lines.is_empty() {
            lines.push(Line::from(""));
        }
        lines.push(Line::from(vec![
            Span::styled(spinner_frame(tick), Styles::active()),
            Span::raw(" "),
            Span::styled(TYPING_TEXT, Styles::dim()),
        ]));
    }

    lines
}

impl Widget for MessageList<'_> {
    #[allow(clippy::cast_possible_truncation)]
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }

        let lines = build_lines(self.messages, self.pending, self.tick, area.width);
        let max_scroll = lines.len().saturating_sub(usize::from(area.height));
        if let Some(cell) = self.max_scroll {
            cell.set(max_scroll);
        }

        let top = max_scroll - self.scroll.min(max_scroll);
        Paragraph::new(lines)
            .style(Styles::default())
            .scroll((top.min(usize::from(u16::MAX)) as u16, 0))
            .render(area, buf);
    }
}
