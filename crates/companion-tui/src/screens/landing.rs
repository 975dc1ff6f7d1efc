//! Landing screen, shown at start.

use crate::app::App;
use crate::screens::Screen;
use crate::ui::theme::{Styles, Symbols};
use crate::ui::widgets::{KeyHint, StatusBar};
use crate::ui::{centered_column, main_layout};
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    text::{Line, Span},
    widgets::{Paragraph, Widget, Wrap},
};

pub const HEADING: &str = "Your Emotional Companion";
pub const TAGLINE: &str = "A safe, supportive space to share what's on your mind";
pub const CALL_TO_ACTION: &str = "Start Talking";
pub const DISCLAIMER: &str = "This is a supportive companion, not a licensed therapist.";

/// Feature blurbs: title and one-line description.
pub const FEATURES: [(&str, &str); 3] = [
    ("Always Listening", "Share your thoughts anytime, judgment-free"),
    ("Empathetic Support", "Warm, understanding responses"),
    ("Private & Safe", "Your conversations, your space"),
];

const CONTENT_WIDTH: u16 = 72;

/// The landing screen.
pub struct LandingScreen;

impl Screen for LandingScreen {
    fn render(&self, app: &App, area: Rect, buf: &mut Buffer) {
        let (main_area, status_area) = main_layout(area);

        buf.set_style(main_area, Styles::default());
        render_landing_content(main_area, buf);

        let hints = vec![
            KeyHint::new("Enter", CALL_TO_ACTION),
            KeyHint::new("?", "Help"),
            KeyHint::new("q", "Quit"),
        ];
        StatusBar::new("Companion")
            .hints(hints)
            .right(&app.backend_url)
            .toast(app.notification.as_ref())
            .render(status_area, buf);
    }
}

fn landing_lines() -> Vec<Line<'static>> {
    let mut lines = vec![
        Line::from(Span::styled(Symbols::HEART, Styles::warm())),
        Line::from(""),
        Line::from(Span::styled(HEADING, Styles::highlight())),
        Line::from(Span::styled(TAGLINE, Styles::dim())),
        Line::from(""),
    ];

    for (title, description) in FEATURES {
        lines.push(Line::from(Span::styled(title, Styles::companion_label())));
        lines.push(Line::from(Span::styled(description, Styles::dim())));
        lines.push(Line::from(""));
    }

    lines.push(Line::from(vec![
        Span::styled(" Enter ", Styles::key_hint()),
        Span::raw("  "),
        Span::styled(CALL_TO_ACTION, Styles::warm()),
    ]));
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(DISCLAIMER, Styles::dim())));
    lines
}

#[allow(clippy::cast_possible_truncation)]
fn render_landing_content(area: Rect, buf: &mut Buffer) {
    let column = centered_column(CONTENT_WIDTH, area);
    let lines = landing_lines();

    // Center vertically when there is room
    let height = (lines.len().min(usize::from(u16::MAX)) as u16).min(column.height);
    let top = column.y + (column.height - height) / 2;
    let content_area = Rect::new(column.x, top, column.width, column.height - (top - column.y));

    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .style(Styles::default())
        .render(content_area, buf);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{
        create_test_app, render_screen_to_string, render_screen_to_string_sized,
    };

    #[test]
    fn test_landing_shows_heading_features_and_disclaimer() {
        let app = create_test_app();
        let text = render_screen_to_string(&LandingScreen, &app);

        assert!(text.contains(HEADING));
        assert!(text.contains(TAGLINE));
        for (title, description) in FEATURES {
            assert!(text.contains(title), "missing {title}");
            assert!(text.contains(description), "missing {description}");
        }
        assert!(text.contains(CALL_TO_ACTION));
        assert!(text.contains(DISCLAIMER));
    }

    #[test]
    fn test_landing_status_bar() {
        let app = create_test_app();
        let text = render_screen_to_string(&LandingScreen, &app);
        let status = text.lines().last().unwrap();
        assert!(status.contains("Companion"));
        assert!(status.contains("Quit"));
    }

    #[test]
    fn test_landing_renders_on_small_terminal() {
        let app = create_test_app();
        let text = render_screen_to_string_sized(&LandingScreen, &app, 40, 10);
        assert!(text.contains("<3"));
    }
}
