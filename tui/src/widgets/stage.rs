//! Stage Widget
//!
//! Renders the [`Scene`] into the terminal: the intro headline, the box with
//! the hydrant icon, the revealed screen and the chat panel.
//!
//! Geometry lives in [`StageLayout`] so the app can hit-test mouse events
//! against exactly what was drawn.

use std::time::Duration;

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{StatefulWidget, Widget};
use unicode_width::UnicodeWidthStr;

use hydrant_conductor::{Scene, Target};

use crate::theme;
use crate::widgets::text_block::{wrap_markup, TextBlock, TextBlockState};

/// Headline, one entry per intro group
pub const INTRO_COPY: [&str; 6] = [
    "Silver Hydrant",
    "AI consulting",
    "for humans",
    "built for the future",
    "without the noise",
    "without the hype",
];

/// Box size in cells at scale 1.0
const BOX_BASE: (f32, f32) = (14.0, 7.0);

/// Hydrant icon, drawn centered in the box
const ICON: [&str; 4] = [" ▄██▄ ", "▐████▌", " ████ ", "▀▀▀▀▀▀"];

const HINT: &str = "click the box";
const ASK_LABEL: &str = "[ ask Silver Hydrant ]";
const REVEAL_TITLE: &str = "Clarity, not complexity.";
const REVEAL_BODY: &str = "We spotlight the <strong>systems</strong> and <strong>decisions</strong> that actually move the needle.";
const THINKING: &str = "…";

/// Where everything sits for a given terminal area and box scale
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StageLayout {
    /// Whole stage
    pub area: Rect,
    /// The box outline, clipped to the stage
    pub box_area: Rect,
    /// The ask button
    pub ask: Rect,
    /// The chat panel
    pub chat: Rect,
}

impl StageLayout {
    /// Compute the layout for `area` with the box at `box_scale`
    #[must_use]
    pub fn new(area: Rect, box_scale: f32) -> Self {
        let (bw, bh) = (BOX_BASE.0 * box_scale, BOX_BASE.1 * box_scale);
        let cx = f32::from(area.x) + f32::from(area.width) / 2.0;
        let cy = f32::from(area.y) + f32::from(area.height) / 2.0;
        let box_area = clip(
            area,
            (cx - bw / 2.0).round(),
            (cy - bh / 2.0).round(),
            bw.round(),
            bh.round(),
        );

        #[allow(clippy::cast_possible_truncation)]
        let ask_width = (ASK_LABEL.width() as u16).min(area.width);
        let ask = Rect::new(
            area.x + (area.width - ask_width) / 2,
            area.y + area.height.saturating_sub(area.height / 4),
            ask_width,
            1u16.min(area.height),
        )
        .intersection(area);

        let chat_width = (area.width * 3 / 5).max(area.width.min(30));
        let chat = Rect::new(
            area.x + (area.width - chat_width) / 2,
            area.y + area.height / 6,
            chat_width,
            area.height - area.height / 3,
        );

        Self {
            area,
            box_area,
            ask,
            chat,
        }
    }

    /// Whether the cell at `(x, y)` is inside the box
    #[must_use]
    pub fn hits_box(&self, x: u16, y: u16) -> bool {
        contains(self.box_area, x, y)
    }

    /// Whether the cell at `(x, y)` is on the ask button
    #[must_use]
    pub fn hits_ask(&self, x: u16, y: u16) -> bool {
        contains(self.ask, x, y)
    }

    /// Inner chat text area (inside the panel padding)
    #[must_use]
    pub fn chat_text(&self) -> Rect {
        Rect::new(
            self.chat.x + 2,
            self.chat.y + 1,
            self.chat.width.saturating_sub(4),
            self.chat.height.saturating_sub(2),
        )
    }
}

fn contains(rect: Rect, x: u16, y: u16) -> bool {
    x >= rect.x && x < rect.x + rect.width && y >= rect.y && y < rect.y + rect.height
}

/// Clip a float rectangle to `area`
fn clip(area: Rect, x: f32, y: f32, w: f32, h: f32) -> Rect {
    let left = x.max(f32::from(area.x));
    let top = y.max(f32::from(area.y));
    let right = (x + w).min(f32::from(area.x + area.width));
    let bottom = (y + h).min(f32::from(area.y + area.height));
    if right <= left || bottom <= top {
        return Rect::new(area.x, area.y, 0, 0);
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    Rect::new(
        left as u16,
        top as u16,
        (right - left) as u16,
        (bottom - top) as u16,
    )
}

/// Build the chat transcript as wrapped lines
#[must_use]
pub fn chat_lines(scene: &Scene, width: u16) -> Vec<Line<'static>> {
    let width = usize::from(width.max(1));
    let mut lines = Vec::new();

    if let Some(user) = scene.element(Target::UserBubble).filter(|e| e.is_visible()) {
        let style = Style::default().fg(theme::USER_TEXT);
        lines.push(Line::styled("you", Style::default().fg(theme::SILVER_DIM)));
        lines.extend(wrap_markup(&user.text, width, style));
        if user.cursor {
            lines.push(Line::styled("▌", Style::default().fg(theme::CURSOR)));
        }
    }
    if scene.is_visible(Target::Thinking) {
        lines.push(Line::default());
        lines.push(Line::styled(THINKING, Style::default().fg(theme::SILVER_DIM)));
    }
    if let Some(ai) = scene.element(Target::AiBubble).filter(|e| e.is_visible()) {
        let style = Style::default().fg(theme::AI_TEXT);
        lines.push(Line::default());
        lines.push(Line::styled("silver hydrant", Style::default().fg(theme::WATER_BLUE)));
        lines.extend(wrap_markup(&ai.text, width, style));
    }
    lines
}

/// Renders a scene at a point in time
pub struct StageView<'a> {
    scene: &'a Scene,
    now: Duration,
    chat_offset: usize,
}

impl<'a> StageView<'a> {
    /// View of `scene` at `now`
    #[must_use]
    pub fn new(scene: &'a Scene, now: Duration) -> Self {
        Self {
            scene,
            now,
            chat_offset: 0,
        }
    }

    /// First chat line to show
    #[must_use]
    pub fn chat_offset(mut self, offset: usize) -> Self {
        self.chat_offset = offset;
        self
    }

    fn opacity(&self, target: Target) -> f32 {
        self.scene
            .element(target)
            .map_or(0.0, |e| e.opacity(self.now))
    }

    fn scale(&self, target: Target) -> f32 {
        self.scene.element(target).map_or(1.0, |e| e.scale)
    }

    fn render_intro(&self, area: Rect, buf: &mut Buffer) {
        let layer = self.opacity(Target::IntroLayer) * self.opacity(Target::IntroLine);
        if layer <= 0.0 {
            return;
        }
        #[allow(clippy::cast_possible_truncation)]
        let top = area.y + (area.height / 2).saturating_sub(INTRO_COPY.len() as u16);
        for (group, text) in (0u8..).zip(INTRO_COPY) {
            let opacity = self.opacity(Target::IntroGroup(group)) * layer;
            let Some(mut style) = theme::faded_text(theme::rgb(theme::SILVER), opacity) else {
                continue;
            };
            if group == 0 {
                style = theme::strong(style);
            }
            let y = top + u16::from(group) * 2;
            centered(buf, area, y, text, style);
        }
    }

    fn render_box(&self, layout: &StageLayout, buf: &mut Buffer) {
        let opacity = self.opacity(Target::Box);
        let Some(style) = theme::faded_text(theme::rgb(theme::BOX_EDGE), opacity) else {
            return;
        };
        let b = layout.box_area;
        if b.width < 2 || b.height < 2 {
            return;
        }
        let (right, bottom) = (b.x + b.width - 1, b.y + b.height - 1);
        for x in b.x..=right {
            let (top_glyph, bottom_glyph) = match x {
                x if x == b.x => ("╭", "╰"),
                x if x == right => ("╮", "╯"),
                _ => ("─", "─"),
            };
            buf[(x, b.y)].set_symbol(top_glyph).set_style(style);
            buf[(x, bottom)].set_symbol(bottom_glyph).set_style(style);
        }
        for y in b.y + 1..bottom {
            buf[(b.x, y)].set_symbol("│").set_style(style);
            buf[(right, y)].set_symbol("│").set_style(style);
        }

        let icon_opacity = self.opacity(Target::Icon).min(opacity);
        if let Some(mut icon_style) = theme::faded_text(theme::rgb(theme::HYDRANT), icon_opacity) {
            if self.scale(Target::Icon) > 1.5 {
                icon_style = icon_style.add_modifier(Modifier::BOLD);
            }
            #[allow(clippy::cast_possible_truncation)]
            let top = (b.y + b.height / 2).saturating_sub(ICON.len() as u16 / 2);
            for (row, line) in (0u16..).zip(ICON) {
                let y = top + row;
                if y > b.y && y < bottom {
                    centered(buf, b, y, line, icon_style);
                }
            }
        }

        if let Some(hint) = theme::faded_text(theme::rgb(theme::WATER_BLUE), self.opacity(Target::Hint)) {
            let y = bottom + 2;
            if y < layout.area.y + layout.area.height {
                centered(buf, layout.area, y, HINT, hint);
            }
        }
    }

    fn render_reveal(&self, layout: &StageLayout, buf: &mut Buffer) {
        let opacity = self.opacity(Target::RevealScreen);
        let Some(title) = theme::faded_text(theme::rgb(theme::SILVER), opacity) else {
            return;
        };
        let area = layout.area;
        let chat_open = self.scene.is_visible(Target::ChatPanel);
        if !chat_open {
            let y = area.y + area.height / 4;
            centered(buf, area, y, REVEAL_TITLE, theme::strong(title));
            let body = Rect::new(
                area.x + area.width / 6,
                y + 2,
                area.width - area.width / 3,
                3u16.min(area.height.saturating_sub(y + 2 - area.y)),
            );
            let mut state = TextBlockState::default();
            TextBlock::new(REVEAL_BODY)
                .style(Style::default().fg(theme::SILVER_DIM))
                .render(body, buf, &mut state);
        }

        if let Some(ask) = theme::faded_text(theme::rgb(theme::WATER_BLUE), self.opacity(Target::AskButton)) {
            buf.set_string(layout.ask.x, layout.ask.y, ASK_LABEL, ask);
        }
    }

    fn render_chat(&self, layout: &StageLayout, buf: &mut Buffer) {
        if self.opacity(Target::ChatPanel) <= 0.05 {
            return;
        }
        let text = layout.chat_text();
        for (i, line) in chat_lines(self.scene, text.width)
            .iter()
            .skip(self.chat_offset)
            .take(usize::from(text.height))
            .enumerate()
        {
            #[allow(clippy::cast_possible_truncation)]
            buf.set_line(text.x, text.y + i as u16, line, text.width);
        }
    }
}

impl Widget for StageView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width < 4 || area.height < 4 {
            return;
        }
        let layout = StageLayout::new(area, self.scale(Target::Box));
        self.render_intro(area, buf);
        self.render_box(&layout, buf);
        self.render_reveal(&layout, buf);
        self.render_chat(&layout, buf);
    }
}

/// Write `text` centered horizontally in `area` at row `y`
fn centered(buf: &mut Buffer, area: Rect, y: u16, text: &str, style: Style) {
    if y < area.y || y >= area.y + area.height {
        return;
    }
    #[allow(clippy::cast_possible_truncation)]
    let width = (text.width() as u16).min(area.width);
    let x = area.x + (area.width - width) / 2;
    buf.set_stringn(x, y, text, usize::from(width), style);
}
