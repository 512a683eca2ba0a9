//! Loading indicator.

use std::time::{SystemTime, UNIX_EPOCH};

use ratatui::{buffer::Buffer, layout::Rect, style::Style, widgets::Widget};
use unicode_width::UnicodeWidthStr;

const FRAMES: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// An animated braille spinner with an optional label, centered in its area.
pub struct Spinner {
    style: Style,
    label: Option<String>,
}

impl Spinner {
    pub fn new() -> Self {
        Self {
            style: Style::default(),
            label: None,
        }
    }

    pub fn style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    fn frame() -> &'static str {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis();
        FRAMES[(now / 100) as usize % FRAMES.len()]
    }
}

impl Default for Spinner {
    fn default() -> Self {
        Self::new()
    }
}

impl Widget for Spinner {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }

        let symbol = Self::frame();
        let text = match self.label {
            Some(label) => format!("{} {}", symbol, label),
            None => symbol.to_string(),
        };

        let width = text.width() as u16;
        let x = area.x + area.width.saturating_sub(width) / 2;
        let y = area.y + area.height / 2;

        buf.set_stringn(x, y, text, area.width as usize, self.style);
    }
}
