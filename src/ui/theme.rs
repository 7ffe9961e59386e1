use ratatui::style::Color;

use crate::domain::ToolAccent;

// Dark neutral palette with one accent. Prefer adding roles here over
// scattering raw colors through the render code.
pub const BG: Color = Color::Rgb(13, 15, 18);
pub const SURFACE: Color = Color::Rgb(20, 24, 30);
pub const BAR_BG: Color = Color::Rgb(16, 20, 26);

pub const FG: Color = Color::Rgb(226, 229, 234);
pub const MUTED: Color = Color::Rgb(148, 155, 168);
pub const DIM: Color = Color::Rgb(100, 108, 122);
pub const BORDER: Color = Color::Rgb(52, 60, 74);

pub const ACCENT: Color = Color::Rgb(255, 153, 51);
pub const SELECTION_BG: Color = Color::Rgb(38, 45, 56);

pub const SUCCESS: Color = Color::Rgb(121, 222, 160);
pub const ERROR: Color = Color::Rgb(245, 106, 106);

// Diff gutters and line tints.
pub const DIFF_ADDED: Color = Color::Rgb(121, 222, 160);
pub const DIFF_REMOVED: Color = Color::Rgb(245, 106, 106);

// Search-hit emphasis.
pub const HIGHLIGHT_FG: Color = Color::Rgb(20, 18, 8);
pub const HIGHLIGHT_BG: Color = Color::Rgb(236, 201, 94);

/// One color per tool accent, mirroring the icon/color semantics of the
/// classifier's categories.
pub fn tool_color(accent: ToolAccent) -> Color {
    match accent {
        ToolAccent::Shell => Color::Rgb(121, 222, 160),
        ToolAccent::File => Color::Rgb(118, 170, 255),
        ToolAccent::Edit => Color::Rgb(190, 140, 255),
        ToolAccent::Search => Color::Rgb(255, 178, 102),
        ToolAccent::Plan => Color::Rgb(142, 150, 255),
        ToolAccent::Delegate => Color::Rgb(236, 201, 94),
        ToolAccent::Web => Color::Rgb(102, 212, 224),
        ToolAccent::Ask => Color::Rgb(244, 140, 186),
        ToolAccent::Todo => Color::Rgb(98, 208, 182),
        ToolAccent::Neutral => MUTED,
    }
}
