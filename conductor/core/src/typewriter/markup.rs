//! Inline Markup
//!
//! The chat copy carries a tiny markup subset: `<strong>`/`<b>`, `<em>`/`<i>`
//! and `<br>`. The typewriter treats every tag as one atomic unit; surfaces
//! use [`segments`] to turn revealed markup into styled runs.
//!
//! A `<` only opens a tag when it is followed by a letter or `/`, so plain
//! text like `1 < 2` reveals normally.

/// One lexical unit of a source string
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Token {
    /// A visible character
    Char(char),
    /// A complete tag, including the angle brackets
    Tag(String),
    /// A tag opened at end of input and never closed
    Unterminated(String),
}

/// Split `source` into visible characters and atomic tags
#[must_use]
pub fn tokenize(source: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut chars = source.chars().peekable();

    while let Some(ch) = chars.next() {
        let opens_tag = ch == '<'
            && chars
                .peek()
                .is_some_and(|next| next.is_ascii_alphabetic() || *next == '/');
        if !opens_tag {
            tokens.push(Token::Char(ch));
            continue;
        }

        let mut tag = String::from('<');
        let mut closed = false;
        for inner in chars.by_ref() {
            tag.push(inner);
            if inner == '>' {
                closed = true;
                break;
            }
        }
        tokens.push(if closed {
            Token::Tag(tag)
        } else {
            Token::Unterminated(tag)
        });
    }

    tokens
}

/// Number of visible characters in `source`
#[must_use]
pub fn visible_len(source: &str) -> usize {
    tokenize(source)
        .iter()
        .filter(|token| matches!(token, Token::Char(_)))
        .count()
}

/// Cumulative reveal snapshots, one per visible character
///
/// Tags preceding a visible character are folded into that character's
/// snapshot. Tags after the last visible character, and an unterminated tag
/// at the end of input, are folded into the final snapshot. A source with no
/// visible characters yields a single snapshot holding the whole source.
#[must_use]
pub fn snapshots(source: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    let mut current = String::with_capacity(source.len());
    let mut pending = String::new();

    for token in tokenize(source) {
        match token {
            Token::Char(ch) => {
                current.push_str(&pending);
                pending.clear();
                current.push(ch);
                out.push(current.clone());
            }
            Token::Tag(tag) | Token::Unterminated(tag) => pending.push_str(&tag),
        }
    }

    if !pending.is_empty() {
        current.push_str(&pending);
        match out.last_mut() {
            Some(last) => *last = current,
            None => out.push(current),
        }
    }

    out
}

/// A run of text sharing one style
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Segment {
    /// Text content (`<br>` becomes `\n`)
    pub text: String,
    /// Inside `<strong>` or `<b>`
    pub strong: bool,
    /// Inside `<em>` or `<i>`
    pub emphasis: bool,
}

/// Split markup into styled runs
///
/// Unknown tags are dropped. Unbalanced closing tags are ignored; an
/// unterminated trailing tag is rendered as text.
#[must_use]
pub fn segments(markup: &str) -> Vec<Segment> {
    let mut out: Vec<Segment> = Vec::new();
    let mut strong = 0usize;
    let mut emphasis = 0usize;

    let push = |out: &mut Vec<Segment>, text: &str, strong: bool, emphasis: bool| {
        if text.is_empty() {
            return;
        }
        match out.last_mut() {
            Some(last) if last.strong == strong && last.emphasis == emphasis => {
                last.text.push_str(text);
            }
            _ => out.push(Segment {
                text: text.to_string(),
                strong,
                emphasis,
            }),
        }
    };

    for token in tokenize(markup) {
        match token {
            Token::Char(ch) => {
                let mut buf = [0u8; 4];
                push(&mut out, ch.encode_utf8(&mut buf), strong > 0, emphasis > 0);
            }
            Token::Unterminated(raw) => push(&mut out, &raw, strong > 0, emphasis > 0),
            Token::Tag(tag) => match tag_name(&tag) {
                (false, "strong" | "b") => strong += 1,
                (true, "strong" | "b") => strong = strong.saturating_sub(1),
                (false, "em" | "i") => emphasis += 1,
                (true, "em" | "i") => emphasis = emphasis.saturating_sub(1),
                (_, "br") => push(&mut out, "\n", strong > 0, emphasis > 0),
                _ => {}
            },
        }
    }

    out
}

/// Revealed markup as plain text
#[must_use]
pub fn plain_text(markup: &str) -> String {
    segments(markup).into_iter().map(|s| s.text).collect()
}

/// `(is_closing, lowercase name)` of a complete tag
fn tag_name(tag: &str) -> (bool, &str) {
    let inner = tag.trim_start_matches('<').trim_end_matches('>');
    let (closing, inner) = match inner.strip_prefix('/') {
        Some(rest) => (true, rest),
        None => (false, inner),
    };
    let name = inner
        .split(|c: char| c.is_whitespace() || c == '/')
        .next()
        .unwrap_or("");
    let name = match name {
        n if n.eq_ignore_ascii_case("strong") => "strong",
        n if n.eq_ignore_ascii_case("b") => "b",
        n if n.eq_ignore_ascii_case("em") => "em",
        n if n.eq_ignore_ascii_case("i") => "i",
        n if n.eq_ignore_ascii_case("br") => "br",
        _ => "",
    };
    (closing, name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_tokenize_tags_are_atomic() {
        assert_eq!(
            tokenize("a<b>c</b>"),
            vec![
                Token::Char('a'),
                Token::Tag("<b>".into()),
                Token::Char('c'),
                Token::Tag("</b>".into()),
            ]
        );
    }

    #[test]
    fn test_less_than_in_text_is_visible() {
        assert_eq!(visible_len("1 < 2"), 5);
        assert_eq!(snapshots("1 < 2").last().map(String::as_str), Some("1 < 2"));
    }

    #[test]
    fn test_snapshots_fold_tags_forward() {
        assert_eq!(
            snapshots("hi <b>there</b>"),
            vec![
                "h",
                "hi",
                "hi ",
                "hi <b>t",
                "hi <b>th",
                "hi <b>the",
                "hi <b>ther",
                "hi <b>there</b>",
            ]
        );
    }

    #[test]
    fn test_unterminated_tag_flushed_verbatim() {
        let snaps = snapshots("ok <stro");
        assert_eq!(snaps.len(), 3);
        assert_eq!(snaps[2], "ok <stro");
        assert_eq!(snaps[1], "ok");
    }

    #[test]
    fn test_no_visible_characters() {
        assert_eq!(snapshots("<br><br>"), vec!["<br><br>"]);
        assert!(snapshots("").is_empty());
    }

    #[test]
    fn test_segments_styles() {
        let segs = segments("a <strong>bold</strong> and <em>soft</em><br>end");
        assert_eq!(
            segs,
            vec![
                Segment { text: "a ".into(), strong: false, emphasis: false },
                Segment { text: "bold".into(), strong: true, emphasis: false },
                Segment { text: " and ".into(), strong: false, emphasis: false },
                Segment { text: "soft".into(), strong: false, emphasis: true },
                Segment { text: "\nend".into(), strong: false, emphasis: false },
            ]
        );
    }

    #[test]
    fn test_segments_of_partial_reveal() {
        // Mid-reveal text has an open tag with no closer yet
        let segs = segments("a <b>bo");
        assert_eq!(segs.len(), 2);
        assert!(segs[1].strong);
        assert_eq!(segs[1].text, "bo");
    }

    #[test]
    fn test_plain_text() {
        assert_eq!(plain_text("<B>We</B> remove it.<br>"), "We remove it.\n");
        assert_eq!(plain_text("<span>x</span>"), "x");
    }
}
