//! Star Sky Widget
//!
//! Draws star field sprites into terminal cells. Sprites arrive in viewport
//! units, which the app keeps equal to cells.

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::widgets::Widget;

use hydrant_conductor::Sprite;

use crate::theme;

/// Renders a frame of star sprites
pub struct StarSky<'a> {
    sprites: &'a [Sprite],
}

impl<'a> StarSky<'a> {
    /// Sky over the given sprites
    #[must_use]
    pub fn new(sprites: &'a [Sprite]) -> Self {
        Self { sprites }
    }
}

/// Glyph for a star of `size` pixels
fn glyph(size: f32) -> &'static str {
    match size {
        s if s < 1.2 => "·",
        s if s < 2.0 => "∙",
        s if s < 3.0 => "•",
        _ => "✦",
    }
}

impl Widget for StarSky<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        for sprite in self.sprites {
            if sprite.opacity <= 0.02 || sprite.x < 0.0 || sprite.y < 0.0 {
                continue;
            }
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let (x, y) = (sprite.x.floor() as u16, sprite.y.floor() as u16);
            if x >= area.width || y >= area.height {
                continue;
            }
            let color = if sprite.burst {
                theme::STAR_BURST
            } else {
                theme::fade(theme::STAR_BRIGHT, sprite.opacity)
            };
            buf[(area.x + x, area.y + y)]
                .set_symbol(glyph(sprite.size))
                .set_style(Style::default().fg(color));
        }
    }
}
