use ratatui::style::Color;

pub const PRIMARY: Color = Color::from_u32(0x0026c6da);
pub const SECONDARY: Color = Color::from_u32(0x00006978);
pub const NEUTRAL: Color = Color::from_u32(0x00404040);
pub const BACKGROUND: Color = Color::from_u32(0x000b0f14);
pub const ACCENT: Color = Color::from_u32(0x00ffb74d);
pub const ERROR: Color = Color::from_u32(0x00ef5350);
