//! Test utilities for rendering screens and driving the app in tests.

use crate::app::{App, Screen};
use crate::screens::Screen as ScreenTrait;
use ratatui::{backend::TestBackend, buffer::Buffer, layout::Rect, Terminal};

pub use crate::headless::buffer_to_string;

/// Default terminal width for tests.
pub const TEST_WIDTH: u16 = 80;

/// Default terminal height for tests.
pub const TEST_HEIGHT: u16 = 24;

/// Create a test terminal with the default dimensions (80x24).
pub fn create_test_terminal() -> Terminal<TestBackend> {
    let backend = TestBackend::new(TEST_WIDTH, TEST_HEIGHT);
    Terminal::new(backend).expect("Failed to create test terminal")
}

/// Create a test app on the landing screen.
pub fn create_test_app() -> App {
    App::new_for_test()
}

/// Create a test app positioned at a specific screen.
pub fn create_test_app_at_screen(screen: Screen) -> App {
    let mut app = App::new_for_test();
    app.screen = screen;
    app
}

/// Render a screen to a buffer and return it as a string.
pub fn render_screen_to_string<S: ScreenTrait>(screen: &S, app: &App) -> String {
    render_screen_to_string_sized(screen, app, TEST_WIDTH, TEST_HEIGHT)
}

/// Render a screen to a buffer and return it as a string with custom dimensions.
pub fn render_screen_to_string_sized<S: ScreenTrait>(
    screen: &S,
    app: &App,
    width: u16,
    height: u16,
) -> String {
    let area = Rect::new(0, 0, width, height);
    let mut buffer = Buffer::empty(area);
    screen.render(app, area, &mut buffer);
    buffer_to_string(&buffer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_test_terminal() {
        let terminal = create_test_terminal();
        let size = terminal.size().unwrap();
        assert_eq!(size.width, TEST_WIDTH);
        assert_eq!(size.height, TEST_HEIGHT);
    }

    #[test]
    fn test_create_test_app_at_screen() {
        let app = create_test_app_at_screen(Screen::Chat);
        assert_eq!(app.screen, Screen::Chat);
    }

    #[test]
    fn test_full_app_render_with_help() {
        let mut app = create_test_app();
        app.show_help = true;
        let mut terminal = create_test_terminal();
        terminal
            .draw(|frame| {
                let area = frame.area();
                crate::screens::render_app(&app, area, frame.buffer_mut());
            })
            .unwrap();
        let text = buffer_to_string(terminal.backend().buffer());
        assert!(text.contains("Help"));
        assert!(text.contains("New conversation"));
    }
}
