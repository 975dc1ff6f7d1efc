//! Screen definitions for the companion TUI.

pub mod chat;
pub mod landing;

use crate::app::{self, App};
use ratatui::{buffer::Buffer, layout::Rect, widgets::Widget};

/// Trait for screens that can be rendered.
pub trait Screen {
    /// Render the screen to the buffer.
    fn render(&self, app: &App, area: Rect, buf: &mut Buffer);
}

/// Render whichever screen `app` is on, plus the help overlay if open.
pub fn render_app(app: &App, area: Rect, buf: &mut Buffer) {
    match app.screen {
        app::Screen::Landing => landing::LandingScreen.render(app, area, buf),
        app::Screen::Chat => chat::ChatScreen.render(app, area, buf),
    }

    if app.show_help {
        render_help_overlay(area, buf);
    }
}

/// Render the help overlay.
pub fn render_help_overlay(area: Rect, buf: &mut Buffer) {
    use crate::ui::centered_fixed;
    use crate::ui::theme::Styles;
    use ratatui::widgets::{Block, Borders, Clear, Paragraph};

    let help_text = r"
  Chat
    Enter               Send message
    Shift+Enter, Ctrl+J New line
    Up/Down, PgUp/PgDn  Scroll messages
    Ctrl+N              New conversation
    Esc                 Back to start

  Anywhere
    ?                   Toggle this help
    Ctrl+C              Quit

  [Press any key to close]
";

    let width = 50.min(area.width.saturating_sub(4));
    let height = 16.min(area.height.saturating_sub(4));
    let overlay_area = centered_fixed(width, height, area);

    Clear.render(overlay_area, buf);

    let block = Block::default()
        .title(" Help ")
        .title_style(Styles::title())
        .borders(Borders::ALL)
        .border_style(Styles::border_active())
        .style(Styles::default());

    let paragraph = Paragraph::new(help_text)
        .block(block)
        .style(Styles::default());

    paragraph.render(overlay_area, buf);
}
