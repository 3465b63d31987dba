//! Stage Messages
//!
//! Messages sent from the core to render surfaces. They describe every visual
//! effect the sequencer wants applied: show or hide an element, set its scale,
//! write typewriter text.
//!
//! # Design Philosophy
//!
//! Surfaces are pure renderers. They hold no narrative state and make no
//! timing decisions; they apply what they are told, in order. A surface that
//! has not mounted a target simply ignores messages for it (see
//! [`Scene`](crate::scene::Scene)).

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::sequencer::Phase;

/// A renderable element of the stage
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Target {
    /// One staggered group of the intro headline (0-based)
    IntroGroup(u8),
    /// The intro headline as a whole (pushed away when breathing starts)
    IntroLine,
    /// The intro overlay (hidden once the push-away has played)
    IntroLayer,
    /// The breathing square
    Box,
    /// The icon sitting on the square
    Icon,
    /// "click the box" hint
    Hint,
    /// Screen revealed after the expansion
    RevealScreen,
    /// The "Ask AI" button
    AskButton,
    /// Chat container
    ChatPanel,
    /// The user's question bubble
    UserBubble,
    /// Thinking indicator between question and answer
    Thinking,
    /// The AI answer bubble
    AiBubble,
}

impl Target {
    /// Stable name for logs and web surfaces
    #[must_use]
    pub fn name(self) -> String {
        match self {
            Self::IntroGroup(n) => format!("intro-group-{n}"),
            Self::IntroLine => "intro-line".to_string(),
            Self::IntroLayer => "intro".to_string(),
            Self::Box => "box".to_string(),
            Self::Icon => "icon".to_string(),
            Self::Hint => "hint".to_string(),
            Self::RevealScreen => "reveal".to_string(),
            Self::AskButton => "ask".to_string(),
            Self::ChatPanel => "chat".to_string(),
            Self::UserBubble => "chat-user".to_string(),
            Self::Thinking => "thinking".to_string(),
            Self::AiBubble => "chat-ai".to_string(),
        }
    }
}

/// Messages from the core to a render surface
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum StageMessage {
    /// The narrative moved to a new phase
    PhaseChanged {
        /// Phase that was left
        from: Phase,
        /// Phase that was entered
        to: Phase,
    },

    /// Make an element visible
    Show {
        /// Element to show
        target: Target,
        /// Fade-in duration (zero = instant)
        transition: Duration,
    },

    /// Make an element invisible
    Hide {
        /// Element to hide
        target: Target,
        /// Fade-out duration (zero = instant)
        transition: Duration,
    },

    /// Set an element's scale (already interpolated by the core)
    SetScale {
        /// Element to scale
        target: Target,
        /// Absolute scale factor
        scale: f32,
    },

    /// Replace an element's text content
    SetText {
        /// Element to write
        target: Target,
        /// Revealed text, possibly containing inline markup
        text: String,
        /// Whether a typing cursor should trail the text
        cursor: bool,
    },
}

impl StageMessage {
    /// The element this message addresses, if any
    #[must_use]
    pub fn target(&self) -> Option<Target> {
        match self {
            Self::PhaseChanged { .. } => None,
            Self::Show { target, .. }
            | Self::Hide { target, .. }
            | Self::SetScale { target, .. }
            | Self::SetText { target, .. } => Some(*target),
        }
    }
}
