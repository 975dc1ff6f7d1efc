//! Chat screen: header, message list, input bar and disclaimer.

use crate::app::App;
use crate::screens::landing::{DISCLAIMER, HEADING};
use crate::screens::Screen;
use crate::ui::theme::{Styles, Symbols};
use crate::ui::widgets::{InputBar, KeyHint, MessageList, StatusBar};
use crate::ui::{centered_column, main_layout, MAX_CONTENT_WIDTH};
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

pub const SUBTITLE: &str = "A safe space to share what's on your mind";

/// Tallest the input bar grows, borders included.
const MAX_INPUT_HEIGHT: u16 = 8;

/// The chat screen.
pub struct ChatScreen;

impl Screen for ChatScreen {
    fn render(&self, app: &App, area: Rect, buf: &mut Buffer) {
        let (main_area, status_area) = main_layout(area);
        buf.set_style(main_area, Styles::default());

        let column = centered_column(MAX_CONTENT_WIDTH, main_area);
        let input_height = InputBar::desired_height(&app.input_state, MAX_INPUT_HEIGHT);
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(3),
                Constraint::Length(input_height),
                Constraint::Length(1),
            ])
            .split(column);

        render_header(chunks[0], buf);

        let pending = app.conversation.is_pending();
        MessageList::new(app.conversation.messages())
            .pending(pending, app.tick)
            .scroll(app.transcript_scroll)
            .max_scroll(&app.transcript_max_scroll)
            .render(chunks[1], buf);

        InputBar::new(&app.input_state)
            .focused(!app.show_help)
            .waiting(pending, app.tick)
            .render(chunks[2], buf);

        Paragraph::new(Span::styled(DISCLAIMER, Styles::dim()))
            .alignment(Alignment::Center)
            .render(chunks[3], buf);

        let mut hints = Vec::with_capacity(5);
        // Offered only when Enter would actually send
        if app.conversation.can_submit(app.input_state.content()) {
            hints.push(KeyHint::new("Enter", "Send"));
        }
        hints.extend([
            KeyHint::new("S-Enter", "Newline"),
            KeyHint::new("^N", "New chat"),
            KeyHint::new("Esc", "Home"),
            KeyHint::new("^C", "Quit"),
        ]);
        let mut status_bar = StatusBar::new("Chat")
            .hints(hints)
            .toast(app.notification.as_ref());
        if app.transcript_scroll > 0 {
            status_bar = status_bar.right("scrolled");
        }
        status_bar.render(status_area, buf);
    }
}

fn render_header(area: Rect, buf: &mut Buffer) {
    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(Styles::border())
        .style(Styles::default());
    let inner = block.inner(area);
    block.render(area, buf);

    let lines = vec![
        Line::from(vec![
            Span::styled(Symbols::HEART, Styles::warm()),
            Span::raw(" "),
            Span::styled(HEADING, Styles::highlight()),
        ]),
        Line::from(Span::styled(SUBTITLE, Styles::dim())),
    ];
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .render(inner, buf);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::Screen as AppScreen;
    use crate::test_utils::{create_test_app_at_screen, render_screen_to_string};
    use crate::ui::widgets::{PLACEHOLDER, TYPING_TEXT};
    use companion_engine::{Reply, ReplyError, GREETING};

    #[test]
    fn test_chat_shows_header_greeting_and_placeholder() {
        let app = create_test_app_at_screen(AppScreen::Chat);
        let text = render_screen_to_string(&ChatScreen, &app);

        assert!(text.contains(HEADING));
        assert!(text.contains(SUBTITLE));
        assert!(text.contains(&GREETING[..20]));
        assert!(text.contains(PLACEHOLDER));
        assert!(text.contains(DISCLAIMER));
        assert!(!text.contains(TYPING_TEXT));
    }

    #[test]
    fn test_pending_shows_typing_indicator() {
        let mut app = create_test_app_at_screen(AppScreen::Chat);
        app.conversation.begin_submit("I feel anxious").unwrap();

        let text = render_screen_to_string(&ChatScreen, &app);
        assert!(text.contains("I feel anxious"));
        assert!(text.contains(TYPING_TEXT));
        assert!(text.contains("Waiting for a reply..."));
        assert!(!text.contains(PLACEHOLDER));
    }

    #[test]
    fn test_reply_with_emotion_rendered() {
        let mut app = create_test_app_at_screen(AppScreen::Chat);
        let request = app.conversation.begin_submit("hello").unwrap();
        app.apply_reply(
            request.generation,
            Ok(Reply::new("Hi there, I'm listening.", Some("warm".into()))),
        );

        let text = render_screen_to_string(&ChatScreen, &app);
        assert!(text.contains("Hi there, I'm listening."));
        assert!(text.lines().any(|line| line.trim() == "warm"));
        assert!(!text.contains(TYPING_TEXT));
    }

    #[test]
    fn test_failure_toast_in_status_bar() {
        let mut app = create_test_app_at_screen(AppScreen::Chat);
        let request = app.conversation.begin_submit("hello").unwrap();
        app.apply_reply(request.generation, Err(ReplyError::Network("refused".into())));

        let text = render_screen_to_string(&ChatScreen, &app);
        let status = text.lines().last().unwrap();
        assert!(status.contains("Connection issue"));
    }

    #[test]
    fn test_status_bar_hints() {
        let mut app = create_test_app_at_screen(AppScreen::Chat);
        app.input_state.insert_str("I had a long day");
        let text = render_screen_to_string(&ChatScreen, &app);
        let status = text.lines().last().unwrap();
        assert!(status.contains("Send"));
        assert!(status.contains("New chat"));
    }

    #[test]
    fn test_send_hint_hidden_when_nothing_to_send() {
        let mut app = create_test_app_at_screen(AppScreen::Chat);
        app.input_state.insert_str("   ");
        let text = render_screen_to_string(&ChatScreen, &app);
        assert!(!text.lines().last().unwrap().contains("Send"));

        app.input_state.insert_str("hello");
        app.conversation.begin_submit("first").unwrap();
        let text = render_screen_to_string(&ChatScreen, &app);
        let status = text.lines().last().unwrap();
        assert!(!status.contains("Send"));
        assert!(status.contains("New chat"));
    }
}
