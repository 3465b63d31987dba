//! Scene - Reference Surface Model
//!
//! A surface-agnostic model of what is on stage, built by applying
//! [`StageMessage`]s in order. Surfaces mount the targets they actually
//! render; messages for targets that are not mounted are dropped.
//!
//! # Design Philosophy
//!
//! The scene is the bridge between the sequencer's messages and a renderer.
//! It holds state only: visibility with its fade, scale and typed text. A
//! missing element never affects any other element.

use std::collections::BTreeMap;
use std::time::Duration;

use crate::animation::{lerp, progress, EasingFunction};
use crate::messages::{StageMessage, Target};
use crate::sequencer::Phase;

/// A visibility change in progress
#[derive(Clone, Copy, Debug, PartialEq)]
struct Fade {
    from: f32,
    to: f32,
    start: Duration,
    duration: Duration,
}

impl Fade {
    fn at(&self, now: Duration) -> f32 {
        let t = progress(now.saturating_sub(self.start), self.duration);
        lerp(self.from, self.to, EasingFunction::EaseOut.apply(t))
    }
}

/// State of one mounted target
#[derive(Clone, Debug, PartialEq)]
pub struct Element {
    visible: bool,
    fade: Fade,
    /// Current scale (1.0 = natural size)
    pub scale: f32,
    /// Revealed markup for text targets
    pub text: String,
    /// Whether a typing cursor follows the text
    pub cursor: bool,
}

impl Default for Element {
    fn default() -> Self {
        Self {
            visible: false,
            fade: Fade {
                from: 0.0,
                to: 0.0,
                start: Duration::ZERO,
                duration: Duration::ZERO,
            },
            scale: 1.0,
            text: String::new(),
            cursor: false,
        }
    }
}

impl Element {
    /// Whether the element is shown (or fading in)
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Opacity at `now`, following any fade in progress
    #[must_use]
    pub fn opacity(&self, now: Duration) -> f32 {
        self.fade.at(now)
    }

    /// Whether anything is worth drawing at `now`
    #[must_use]
    pub fn is_drawn(&self, now: Duration) -> bool {
        self.visible || self.opacity(now) > 0.0
    }

    fn fade_to(&mut self, visible: bool, now: Duration, transition: Duration) {
        let from = self.fade.at(now);
        self.visible = visible;
        self.fade = Fade {
            from,
            to: if visible { 1.0 } else { 0.0 },
            start: now,
            duration: transition,
        };
    }
}

/// Everything currently on stage
#[derive(Clone, Debug, Default)]
pub struct Scene {
    phase: Phase,
    elements: BTreeMap<Target, Element>,
    dropped: usize,
}

impl Scene {
    /// Create an empty scene
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a scene with every target in `targets` mounted
    #[must_use]
    pub fn with_targets(targets: impl IntoIterator<Item = Target>) -> Self {
        let mut scene = Self::new();
        for target in targets {
            scene.mount(target);
        }
        scene
    }

    /// Mount `target` so messages for it are applied
    pub fn mount(&mut self, target: Target) {
        self.elements.entry(target).or_default();
    }

    /// Unmount `target`; later messages for it are ignored
    pub fn unmount(&mut self, target: Target) -> bool {
        self.elements.remove(&target).is_some()
    }

    /// Apply one message at `now`
    ///
    /// Returns `false` when the message named a target that is not mounted.
    pub fn apply(&mut self, msg: &StageMessage, now: Duration) -> bool {
        if let StageMessage::PhaseChanged { to, .. } = msg {
            self.phase = *to;
            return true;
        }

        let Some(target) = msg.target() else {
            return true;
        };
        let Some(element) = self.elements.get_mut(&target) else {
            tracing::trace!(element = %target.name(), "Message for missing target ignored");
            self.dropped += 1;
            return false;
        };

        match msg {
            StageMessage::Show { transition, .. } => element.fade_to(true, now, *transition),
            StageMessage::Hide { transition, .. } => element.fade_to(false, now, *transition),
            StageMessage::SetScale { scale, .. } => element.scale = *scale,
            StageMessage::SetText { text, cursor, .. } => {
                element.text.clone_from(text);
                element.cursor = *cursor;
            }
            StageMessage::PhaseChanged { .. } => {}
        }
        true
    }

    /// Apply messages in order, returning how many were applied
    pub fn apply_all<'a>(
        &mut self,
        msgs: impl IntoIterator<Item = &'a StageMessage>,
        now: Duration,
    ) -> usize {
        msgs.into_iter().filter(|msg| self.apply(msg, now)).count()
    }

    /// Last phase announced
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// State of a mounted target
    #[must_use]
    pub fn element(&self, target: Target) -> Option<&Element> {
        self.elements.get(&target)
    }

    /// Whether `target` is mounted and shown
    #[must_use]
    pub fn is_visible(&self, target: Target) -> bool {
        self.elements.get(&target).is_some_and(Element::is_visible)
    }

    /// Mounted targets in a stable order
    pub fn targets(&self) -> impl Iterator<Item = Target> + '_ {
        self.elements.keys().copied()
    }

    /// Number of messages dropped for missing targets
    #[must_use]
    pub fn dropped(&self) -> usize {
        self.dropped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_show_fades_in() {
        let mut scene = Scene::with_targets([Target::Box]);
        scene.apply(
            &StageMessage::Show {
                target: Target::Box,
                transition: Duration::from_millis(400),
            },
            Duration::ZERO,
        );
        let el = scene.element(Target::Box).unwrap();
        assert!(el.is_visible());
        assert_eq!(el.opacity(Duration::ZERO), 0.0);
        assert!(el.opacity(Duration::from_millis(200)) > 0.0);
        assert_eq!(el.opacity(Duration::from_millis(400)), 1.0);
    }

    #[test]
    fn test_hide_mid_fade_starts_from_current_opacity() {
        let mut scene = Scene::with_targets([Target::Hint]);
        let show = StageMessage::Show {
            target: Target::Hint,
            transition: Duration::from_millis(1000),
        };
        let hide = StageMessage::Hide {
            target: Target::Hint,
            transition: Duration::from_millis(1000),
        };
        scene.apply(&show, Duration::ZERO);
        let mid = scene.element(Target::Hint).unwrap().opacity(Duration::from_millis(500));
        scene.apply(&hide, Duration::from_millis(500));

        let el = scene.element(Target::Hint).unwrap();
        assert!(!el.is_visible());
        assert!((el.opacity(Duration::from_millis(500)) - mid).abs() < 1e-6);
        assert!(el.is_drawn(Duration::from_millis(600)));
        assert!(!el.is_drawn(Duration::from_millis(1500)));
    }

    #[test]
    fn test_missing_target_ignored() {
        let mut scene = Scene::with_targets([Target::Box]);
        let msgs = [
            StageMessage::Show {
                target: Target::Hint,
                transition: Duration::ZERO,
            },
            StageMessage::SetScale {
                target: Target::Box,
                scale: 1.5,
            },
        ];
        assert_eq!(scene.apply_all(&msgs, Duration::ZERO), 1);
        assert_eq!(scene.dropped(), 1);
        assert_eq!(scene.element(Target::Box).unwrap().scale, 1.5);
        assert!(scene.element(Target::Hint).is_none());
    }

    #[test]
    fn test_text_and_phase() {
        let mut scene = Scene::with_targets([Target::UserBubble]);
        scene.apply(
            &StageMessage::PhaseChanged {
                from: Phase::AskPending,
                to: Phase::Chatting,
            },
            Duration::ZERO,
        );
        scene.apply(
            &StageMessage::SetText {
                target: Target::UserBubble,
                text: "Hi".into(),
                cursor: true,
            },
            Duration::ZERO,
        );
        assert_eq!(scene.phase(), Phase::Chatting);
        let el = scene.element(Target::UserBubble).unwrap();
        assert_eq!(el.text, "Hi");
        assert!(el.cursor);
    }

    #[test]
    fn test_unmount() {
        let mut scene = Scene::with_targets([Target::Icon]);
        assert!(scene.unmount(Target::Icon));
        assert!(!scene.apply(
            &StageMessage::Show {
                target: Target::Icon,
                transition: Duration::ZERO,
            },
            Duration::ZERO,
        ));
    }
}
