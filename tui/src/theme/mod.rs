//! Theme and Colors
//!
//! Silver Hydrant's palette: cool silvers on a near-black night sky, with a
//! single water-blue accent for anything interactive.

use ratatui::style::{Color, Modifier, Style};

// ============================================================================
// Stage Palette
// ============================================================================

/// Night sky behind everything
pub const NIGHT: Color = Color::Rgb(8, 10, 16);

/// Headline silver
pub const SILVER: Color = Color::Rgb(200, 205, 214);

/// Dimmed silver for secondary copy
pub const SILVER_DIM: Color = Color::Rgb(120, 126, 138);

/// The box outline
pub const BOX_EDGE: Color = Color::Rgb(168, 174, 186);

/// The hydrant icon
pub const HYDRANT: Color = Color::Rgb(214, 220, 230);

/// Accent for hints and the ask button
pub const WATER_BLUE: Color = Color::Rgb(100, 180, 255);

// ============================================================================
// Chat Colors
// ============================================================================

/// User bubble text
pub const USER_TEXT: Color = Color::Rgb(130, 220, 130);

/// Assistant bubble text
pub const AI_TEXT: Color = Color::Rgb(230, 232, 238);

/// Typing cursor
pub const CURSOR: Color = WATER_BLUE;

// ============================================================================
// Star Colors
// ============================================================================

/// Brightest star
pub const STAR_BRIGHT: (u8, u8, u8) = (255, 255, 255);

/// Burst stars
pub const STAR_BURST: Color = Color::Rgb(170, 210, 255);

/// Blend `rgb` into the night sky by `opacity` (0..=1)
#[must_use]
pub fn fade(rgb: (u8, u8, u8), opacity: f32) -> Color {
    let (nr, ng, nb) = (8.0, 10.0, 16.0);
    let t = opacity.clamp(0.0, 1.0);
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let mix = |night: f32, value: u8| (night + (f32::from(value) - night) * t).round() as u8;
    Color::Rgb(mix(nr, rgb.0), mix(ng, rgb.1), mix(nb, rgb.2))
}

/// Style for text at `opacity`; below a sliver it is not drawn at all
#[must_use]
pub fn faded_text(rgb: (u8, u8, u8), opacity: f32) -> Option<Style> {
    if opacity < 0.05 {
        return None;
    }
    Some(Style::default().fg(fade(rgb, opacity)))
}

/// Emphasis used for `<strong>` runs
#[must_use]
pub fn strong(style: Style) -> Style {
    style.add_modifier(Modifier::BOLD)
}

/// RGB components of a palette color (black for non-RGB colors)
#[must_use]
pub fn rgb(color: Color) -> (u8, u8, u8) {
    match color {
        Color::Rgb(r, g, b) => (r, g, b),
        _ => (0, 0, 0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fade_endpoints() {
        assert_eq!(fade(STAR_BRIGHT, 1.0), Color::Rgb(255, 255, 255));
        assert_eq!(fade(STAR_BRIGHT, 0.0), NIGHT);
    }

    #[test]
    fn test_faded_text_hides_near_zero() {
        assert!(faded_text(rgb(SILVER), 0.01).is_none());
        assert!(faded_text(rgb(SILVER), 0.5).is_some());
    }
}
