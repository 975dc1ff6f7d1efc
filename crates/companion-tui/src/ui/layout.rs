//! Layout helpers for the companion TUI.

use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Widest the chat column grows on large terminals.
pub const MAX_CONTENT_WIDTH: u16 = 96;

/// Create a centered rect with fixed dimensions.
pub fn centered_fixed(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect::new(x, y, width.min(area.width), height.min(area.height))
}

/// Horizontally center a column no wider than `max_width`.
pub fn centered_column(max_width: u16, area: Rect) -> Rect {
    let width = area.width.min(max_width);
    let x = area.x + (area.width - width) / 2;
    Rect::new(x, area.y, width, area.height)
}

/// Create the main layout with status bar at bottom.
pub fn main_layout(area: Rect) -> (Rect, Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(area);
    (chunks[0], chunks[1])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centered_fixed_clamps_to_area() {
        let area = Rect::new(0, 0, 20, 10);
        let rect = centered_fixed(50, 50, area);
        assert_eq!(rect.width, 20);
        assert_eq!(rect.height, 10);
    }

    #[test]
    fn test_centered_column() {
        let area = Rect::new(0, 0, 120, 30);
        let column = centered_column(MAX_CONTENT_WIDTH, area);
        assert_eq!(column.width, MAX_CONTENT_WIDTH);
        assert_eq!(column.x, 12);

        let narrow = Rect::new(0, 0, 60, 30);
        assert_eq!(centered_column(MAX_CONTENT_WIDTH, narrow), narrow);
    }

    #[test]
    fn test_main_layout_reserves_status_line() {
        let (main, status) = main_layout(Rect::new(0, 0, 80, 24));
        assert_eq!(status.height, 1);
        assert_eq!(main.height, 23);
    }
}
