// Colour palette shared by every screen

use ratatui::style::Color;

/// Delete actions and errors
pub const ACCENT_PRIMARY: Color = Color::Rgb(235, 87, 87);
/// Keep actions
pub const ACCENT_SECONDARY: Color = Color::Rgb(111, 207, 151);
/// Titles and key hints
pub const ACCENT_HIGHLIGHT: Color = Color::Rgb(242, 201, 76);
/// Queued deletes and approval prompts
pub const ACCENT_WARNING: Color = Color::Rgb(242, 153, 74);

pub const TEXT_PRIMARY: Color = Color::Rgb(230, 230, 230);
pub const TEXT_SECONDARY: Color = Color::Rgb(140, 140, 150);

pub const BG_DARK: Color = Color::Rgb(24, 24, 30);
pub const BORDER_COLOR: Color = Color::Rgb(80, 80, 95);
