//! TextBlock Widget
//!
//! A borderless, scrollable text region that understands the chat markup
//! (`<strong>`, `<em>`, `<br>`). Styled runs survive word wrapping.

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::StatefulWidget;
use textwrap::{wrap, Options, WordSplitter};

use hydrant_conductor::typewriter::markup::segments;

use crate::theme;

/// Typing cursor glyph
const CURSOR: &str = "▌";

/// State for a scrollable text block
#[derive(Debug, Default)]
pub struct TextBlockState {
    /// Scroll offset (lines from top)
    pub scroll_offset: usize,
    /// Total content lines
    pub total_lines: usize,
}

/// Wrap revealed markup to `width` columns, keeping bold and italic runs
#[must_use]
pub fn wrap_markup(markup: &str, width: usize, base: Style) -> Vec<Line<'static>> {
    let width = width.max(1);
    let mut styled: Vec<(char, Style)> = Vec::new();
    for segment in segments(markup) {
        let mut style = base;
        if segment.strong {
            style = theme::strong(style);
        }
        if segment.emphasis {
            style = style.add_modifier(Modifier::ITALIC);
        }
        styled.extend(segment.text.chars().map(|ch| (ch, style)));
    }

    let mut lines = Vec::new();
    for paragraph in styled.split(|(ch, _)| *ch == '\n') {
        let plain: String = paragraph.iter().map(|(ch, _)| ch).collect();
        if plain.is_empty() {
            lines.push(Line::default());
            continue;
        }

        let options = Options::new(width).word_splitter(WordSplitter::NoHyphenation);
        let mut cursor = 0;
        for piece in wrap(&plain, options) {
            let Some(found) = plain[cursor..].find(piece.as_ref()) else {
                lines.push(Line::styled(piece.into_owned(), base));
                continue;
            };
            let start = cursor + found;
            let first = plain[..start].chars().count();
            let len = piece.chars().count();
            cursor = start + piece.len();
            lines.push(styled_line(&paragraph[first..first + len]));
        }
    }
    lines
}

/// Merge adjacent characters with equal style into spans
fn styled_line(chars: &[(char, Style)]) -> Line<'static> {
    let mut spans: Vec<Span<'static>> = Vec::new();
    let mut run = String::new();
    let mut run_style: Option<Style> = None;
    for &(ch, style) in chars {
        if run_style.is_some_and(|s| s != style) {
            spans.push(Span::styled(std::mem::take(&mut run), run_style.unwrap_or_default()));
        }
        run_style = Some(style);
        run.push(ch);
    }
    if !run.is_empty() {
        spans.push(Span::styled(run, run_style.unwrap_or_default()));
    }
    Line::from(spans)
}

/// A borderless, scrollable, markup-aware text block
pub struct TextBlock<'a> {
    content: &'a str,
    style: Style,
    cursor: bool,
}

impl<'a> TextBlock<'a> {
    /// Block over revealed markup
    #[must_use]
    pub fn new(content: &'a str) -> Self {
        Self {
            content,
            style: Style::default(),
            cursor: false,
        }
    }

    /// Base text style
    #[must_use]
    pub fn style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    /// Show a typing cursor after the last character
    #[must_use]
    pub fn cursor(mut self, visible: bool) -> Self {
        self.cursor = visible;
        self
    }
}

impl StatefulWidget for TextBlock<'_> {
    type State = TextBlockState;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        if area.width == 0 || area.height == 0 {
            return;
        }
        let mut lines = wrap_markup(self.content, area.width as usize, self.style);
        if self.cursor {
            match lines.last_mut() {
                Some(last) if last.width() < area.width as usize => {
                    last.push_span(Span::styled(CURSOR, Style::default().fg(theme::CURSOR)));
                }
                _ => lines.push(Line::styled(CURSOR, Style::default().fg(theme::CURSOR))),
            }
        }

        state.total_lines = lines.len();

        // Clamp scroll
        let max_scroll = state.total_lines.saturating_sub(area.height as usize);
        state.scroll_offset = state.scroll_offset.min(max_scroll);

        // Render visible lines
        for (i, line) in lines
            .iter()
            .skip(state.scroll_offset)
            .take(area.height as usize)
            .enumerate()
        {
            #[allow(clippy::cast_possible_truncation)]
            let y = area.y + i as u16;
            buf.set_line(area.x, y, line, area.width);
        }
    }
}
