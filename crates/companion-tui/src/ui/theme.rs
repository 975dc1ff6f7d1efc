//! Theme and styling definitions for the companion TUI.

use ratatui::style::{Color, Modifier, Style};

/// Color palette for the TUI.
pub struct Palette;

impl Palette {
    // Base colors
    pub const BG: Color = Color::Rgb(28, 30, 38);
    pub const FG: Color = Color::Rgb(226, 224, 232);
    pub const DIM: Color = Color::Rgb(140, 140, 158);

    // Accent colors
    pub const ACCENT: Color = Color::Rgb(150, 190, 230);
    pub const ACCENT_WARM: Color = Color::Rgb(232, 170, 190);

    // Message colors
    pub const USER: Color = Color::Rgb(150, 190, 230);
    pub const COMPANION: Color = Color::Rgb(190, 220, 180);

    // Status bar colors (high contrast)
    pub const STATUS_BG: Color = Color::Rgb(42, 44, 58);
    pub const STATUS_KEY_BG: Color = Color::Rgb(72, 90, 128);

    // Status colors
    pub const SUCCESS: Color = Color::Rgb(130, 210, 150);
    pub const ERROR: Color = Color::Rgb(236, 110, 110);

    // Border colors
    pub const BORDER: Color = Color::Rgb(78, 80, 100);
    pub const BORDER_ACTIVE: Color = Color::Rgb(150, 190, 230);
}

/// Indicator symbols.
pub struct Symbols;

impl Symbols {
    pub const HEART: &'static str = "<3";
    pub const SPINNER: [&'static str; 4] = ["·  ", "·· ", "···", " ··"];
}

/// Common styles used throughout the TUI.
pub struct Styles;

impl Styles {
    /// Default text style.
    pub fn default() -> Style {
        Style::default().fg(Palette::FG).bg(Palette::BG)
    }

    /// Dimmed text for secondary information.
    pub fn dim() -> Style {
        Style::default().fg(Palette::DIM).bg(Palette::BG)
    }

    /// Highlighted heading text.
    pub fn highlight() -> Style {
        Style::default()
            .fg(Palette::ACCENT)
            .bg(Palette::BG)
            .add_modifier(Modifier::BOLD)
    }

    /// Active/focused element.
    pub fn active() -> Style {
        Style::default().fg(Palette::ACCENT).bg(Palette::BG)
    }

    /// Warm accent used for the landing call to action.
    pub fn warm() -> Style {
        Style::default()
            .fg(Palette::ACCENT_WARM)
            .bg(Palette::BG)
            .add_modifier(Modifier::BOLD)
    }

    /// Label above a user message.
    pub fn user_label() -> Style {
        Style::default()
            .fg(Palette::USER)
            .bg(Palette::BG)
            .add_modifier(Modifier::BOLD)
    }

    /// Label above a companion message.
    pub fn companion_label() -> Style {
        Style::default()
            .fg(Palette::COMPANION)
            .bg(Palette::BG)
            .add_modifier(Modifier::BOLD)
    }

    /// Emotion label beneath a companion message.
    pub fn emotion() -> Style {
        Style::default()
            .fg(Palette::DIM)
            .bg(Palette::BG)
            .add_modifier(Modifier::ITALIC)
    }

    /// Title style.
    pub fn title() -> Style {
        Style::default()
            .fg(Palette::ACCENT)
            .add_modifier(Modifier::BOLD)
    }

    /// Key hint style (for status bar) - bright on dark for visibility.
    pub fn key_hint() -> Style {
        Style::default()
            .fg(Palette::FG)
            .bg(Palette::STATUS_KEY_BG)
            .add_modifier(Modifier::BOLD)
    }

    /// Key hint label style - readable on status bar background.
    pub fn key_label() -> Style {
        Style::default().fg(Palette::FG).bg(Palette::STATUS_BG)
    }

    /// Status bar background style.
    pub fn status_bar() -> Style {
        Style::default().fg(Palette::FG).bg(Palette::STATUS_BG)
    }

    /// Toast text for informational notices.
    pub fn toast_info() -> Style {
        Style::default().fg(Palette::SUCCESS).bg(Palette::STATUS_BG)
    }

    /// Toast text for error notices.
    pub fn toast_error() -> Style {
        Style::default()
            .fg(Palette::ERROR)
            .bg(Palette::STATUS_BG)
            .add_modifier(Modifier::BOLD)
    }

    /// Border style for inactive elements.
    pub fn border() -> Style {
        Style::default().fg(Palette::BORDER)
    }

    /// Border style for active/focused elements.
    pub fn border_active() -> Style {
        Style::default().fg(Palette::BORDER_ACTIVE)
    }
}

/// Spinner frame for the given tick.
pub fn spinner_frame(tick: usize) -> &'static str {
    Symbols::SPINNER[tick % Symbols::SPINNER.len()]
}
