use ratatui::style::Color;

/// Parses a `#rrggbb` display color, falling back to `None` on bad input.
pub fn color_from_hex(hex: &str) -> Option<Color> {
    let hex = hex.strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some(Color::Rgb(r, g, b))
}

#[derive(Debug, Clone, Copy)]
pub struct Theme {
    pub background: Color,
    pub surface: Color,
    pub text: Color,
    pub dim: Color,
    pub accent: Color,
    pub border: Color,
    pub border_focused: Color,
    pub positive: Color,
    pub negative: Color,
    pub error: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            background: Color::Rgb(10, 13, 18),
            surface: Color::Rgb(22, 27, 34),
            text: Color::Rgb(220, 220, 220),
            dim: Color::Rgb(140, 140, 140),
            accent: Color::Rgb(96, 156, 176),
            border: Color::Rgb(60, 68, 78),
            border_focused: Color::Rgb(96, 156, 176),
            positive: Color::Rgb(110, 180, 110),
            negative: Color::Rgb(205, 95, 95),
            error: Color::Rgb(205, 95, 95),
        }
    }
}
