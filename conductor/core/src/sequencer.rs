//! Phase Sequencer - The Stage Narrative
//!
//! The sequencer walks the landing stage through its story:
//!
//! ```text
//! Intro ──► Breathing ──► Expanding ──► Revealed ──► AskPending ──► Chatting ──► ChatDone
//!   │  skip()    │ trigger_expand()  │ timer | growth   │ trigger_ask()   │ user, pause, ai
//!   └── timers ──┘                   └── (first wins) ──┘                 └── typewriter
//! ```
//!
//! # Design Philosophy
//!
//! The sequencer is single-threaded and never blocks. Every delay is a
//! continuation parked in its [`Scheduler`] and fired from [`tick`]. Each
//! continuation records the phase it expects and the sequencer
//! [`Generation`] it was scheduled under; a continuation whose expectations no
//! longer hold is dropped without effect.
//!
//! Operations whose guard fails (a click after the box has expanded, a skip
//! after the intro) are silent no-ops. The narrative only moves forward.
//!
//! Visual effects go out as [`StageMessage`]s. The current phase is also
//! published on a `watch` channel for UI chrome that only cares about the
//! phase.
//!
//! [`tick`]: PhaseSequencer::tick

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, watch};

use crate::accessibility::MotionPreference;
use crate::animation::{AfterTween, EasingFunction, ScaleDriver};
use crate::clock::Clock;
use crate::config::{StageConfig, StageCopy, TimingConfig};
use crate::messages::{StageMessage, Target};
use crate::scheduler::{Generation, Latch, Scheduler};
use crate::stars::{Sprite, StarField, StarFieldConfig, Viewport, ORIGIN};
use crate::typewriter::{TypewriterEngine, TypewriterMode, TypewriterSession, TypewriterUpdate};

/// Number of staggered intro groups
pub const INTRO_GROUPS: u8 = 6;

/// Box scale once it has taken over the screen
pub const BOX_EXPANDED_SCALE: f32 = 18.0;

/// Icon growth relative to its scale when the click landed
pub const ICON_GROWTH_FACTOR: f32 = 2.0;

/// Box growth on hover, relative to its current scale
pub const HOVER_BOX_FACTOR: f32 = 1.15;

/// Icon growth on hover, relative to its current scale
pub const HOVER_ICON_FACTOR: f32 = 1.13;

/// Relative breathing amplitude
pub const PULSE_AMPLITUDE: f32 = 0.06;

/// Scale the box and icon breathe around
const REST_SCALE: f32 = 1.0;

/// Extra wait after the push-away before the intro layer is removed
const INTRO_LAYER_GRACE: Duration = Duration::from_millis(100);

/// Top-level narrative phase
///
/// Phases are totally ordered; a sequencer only ever moves to a later one.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Phase {
    /// Staggered headline reveal
    #[default]
    Intro,
    /// Box and icon pulse, waiting for hover or click
    Breathing,
    /// Box grows to fill the screen
    Expanding,
    /// Revealed screen with the ask button
    Revealed,
    /// Chat panel opening
    AskPending,
    /// Question and answer typing
    Chatting,
    /// Conversation finished (terminal)
    ChatDone,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Intro => "intro",
            Self::Breathing => "breathing",
            Self::Expanding => "expanding",
            Self::Revealed => "revealed",
            Self::AskPending => "ask-pending",
            Self::Chatting => "chatting",
            Self::ChatDone => "chat-done",
        };
        f.write_str(name)
    }
}

/// A scheduled narrative step
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Cue {
    /// Fade in one intro group
    ShowIntroGroup(u8),
    /// Intro finished; start breathing
    EnterBreathing,
    /// Remove the intro layer after the push-away
    HideIntroLayer,
    /// Show the "click the box" hint
    ShowHint,
    /// Post-expand timer: advance to `Revealed`
    Reveal,
    /// Ask delay elapsed: start typing the question
    StartChat,
    /// Thinking pause elapsed: start typing the answer
    StartReply,
}

/// A cue plus the state it expects when it fires
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Continuation {
    cue: Cue,
    /// Phase that must still be current (`None` = any)
    expect: Option<Phase>,
    generation: Generation,
}

/// Drives the stage narrative
pub struct PhaseSequencer {
    timing: TimingConfig,
    motion: MotionPreference,
    copy: StageCopy,
    clock: Arc<dyn Clock>,
    tx: mpsc::UnboundedSender<StageMessage>,
    phase_tx: watch::Sender<Phase>,
    phase: Phase,
    scheduler: Scheduler<Continuation>,
    typewriter: TypewriterEngine,
    stars: StarField,
    box_driver: ScaleDriver,
    icon_driver: ScaleDriver,
    intro_shown: [bool; INTRO_GROUPS as usize],
    started: bool,
    hovered: bool,
    expand_latch: Latch,
    finished: Latch,
    growth_pending: u8,
    generation: Generation,
    disposed: bool,
}

impl fmt::Debug for PhaseSequencer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PhaseSequencer")
            .field("phase", &self.phase)
            .field("motion", &self.motion)
            .field("pending", &self.scheduler.len())
            .field("generation", &self.generation)
            .field("disposed", &self.disposed)
            .finish_non_exhaustive()
    }
}

impl PhaseSequencer {
    /// Create a sequencer in `Intro`, not yet started
    ///
    /// The background star field is seeded from `config.stars` on a unit
    /// viewport; surfaces call [`resize`](Self::resize) with their real size.
    pub fn new(
        config: &StageConfig,
        clock: Arc<dyn Clock>,
        tx: mpsc::UnboundedSender<StageMessage>,
    ) -> Self {
        let stars = StarField::new(config.stars.clone(), Viewport::new(1.0, 1.0));
        Self::with_star_field(config, clock, tx, stars)
    }

    /// Create a sequencer around an existing star field
    pub fn with_star_field(
        config: &StageConfig,
        clock: Arc<dyn Clock>,
        tx: mpsc::UnboundedSender<StageMessage>,
        mut stars: StarField,
    ) -> Self {
        stars.set_motion(config.motion);
        let (phase_tx, _) = watch::channel(Phase::Intro);
        let now = clock.now();
        Self {
            timing: config.timing.clone(),
            motion: config.motion,
            copy: config.copy.clone(),
            clock,
            tx,
            phase_tx,
            phase: Phase::Intro,
            scheduler: Scheduler::starting_at(now),
            typewriter: TypewriterEngine::new(),
            stars,
            box_driver: ScaleDriver::new(REST_SCALE),
            icon_driver: ScaleDriver::new(REST_SCALE),
            intro_shown: [false; INTRO_GROUPS as usize],
            started: false,
            hovered: false,
            expand_latch: Latch::new(),
            finished: Latch::new(),
            growth_pending: 0,
            generation: Generation::initial(),
            disposed: false,
        }
    }

    // =========================================================================
    // Operations
    // =========================================================================

    /// Begin the intro
    ///
    /// With reduced motion the breathing end state is reached before this
    /// returns, with every effect applied instantly.
    pub fn start(&mut self) {
        if self.disposed || self.started {
            tracing::debug!(phase = %self.phase, "start() ignored");
            return;
        }
        self.started = true;
        let now = self.sync_clock();

        self.show(Target::IntroLayer, Duration::ZERO);
        self.show(Target::IntroLine, Duration::ZERO);

        if self.motion.prefers_reduced_motion() {
            for group in 0..INTRO_GROUPS {
                self.show_intro_group(group);
            }
            self.enter_breathing(now);
            return;
        }

        self.show_intro_group(0);
        let stagger = self.timing.stagger();
        for group in 1..INTRO_GROUPS {
            self.schedule(stagger * u32::from(group), Cue::ShowIntroGroup(group), Some(Phase::Intro));
        }
        let intro = stagger * u32::from(INTRO_GROUPS - 1) + self.timing.hold;
        self.schedule(intro, Cue::EnterBreathing, Some(Phase::Intro));
        tracing::debug!(intro_ms = intro.as_millis(), "Intro started");
    }

    /// Jump past the intro; a no-op outside `Intro`
    pub fn skip(&mut self) {
        if self.disposed || !self.started || self.phase != Phase::Intro {
            tracing::debug!(phase = %self.phase, "skip() ignored");
            return;
        }
        let now = self.sync_clock();
        self.scheduler.cancel_where(|c| {
            matches!(c.cue, Cue::ShowIntroGroup(_) | Cue::EnterBreathing)
        });
        for group in 0..INTRO_GROUPS {
            self.show_intro_group(group);
        }
        self.enter_breathing(now);
    }

    /// Pointer entered (`true`) or left (`false`) the box
    ///
    /// Only acts in `Breathing` and only on a change of hover state.
    pub fn hover(&mut self, entered: bool) {
        if self.disposed || self.phase != Phase::Breathing || self.hovered == entered {
            tracing::trace!(phase = %self.phase, entered, "hover ignored");
            return;
        }
        self.hovered = entered;
        let now = self.sync_clock();
        let duration = self.motion.transition(self.timing.hover);

        if entered {
            self.stars.tick(now);
            self.stars.burst(ORIGIN.x, ORIGIN.y);
            let box_target = self.box_driver.current_scale() * HOVER_BOX_FACTOR;
            let icon_target = self.icon_driver.current_scale() * HOVER_ICON_FACTOR;
            self.box_driver
                .tween_to(box_target, now, duration, EasingFunction::EaseInOut, AfterTween::Hold);
            self.icon_driver
                .tween_to(icon_target, now, duration, EasingFunction::EaseInOut, AfterTween::Hold);
        } else {
            let then = self.breathing();
            self.box_driver
                .tween_to(REST_SCALE, now, duration, EasingFunction::EaseInOut, then);
            self.icon_driver
                .tween_to(REST_SCALE, now, duration, EasingFunction::EaseInOut, then);
        }
    }

    /// The box was clicked
    ///
    /// Acts once, and only in `Breathing`. Advancement to `Revealed` has two
    /// paths: the `expand` timer and both growth tweens settling. Whichever
    /// arrives first advances; the other is a no-op.
    pub fn trigger_expand(&mut self) {
        if self.disposed || self.phase != Phase::Breathing {
            tracing::debug!(phase = %self.phase, "trigger_expand() ignored");
            return;
        }
        if !self.expand_latch.trip() {
            return;
        }
        let now = self.sync_clock();
        self.transition(Phase::Expanding);
        self.hide(Target::Hint, self.motion.transition(self.timing.appear));

        let box_growth = self.motion.transition(self.timing.box_growth);
        let icon_growth = self.motion.transition(self.timing.icon_growth);
        let icon_target = self.icon_driver.current_scale() * ICON_GROWTH_FACTOR;
        self.box_driver.tween_to(
            BOX_EXPANDED_SCALE,
            now,
            box_growth,
            EasingFunction::EaseInOutCubic,
            AfterTween::Hold,
        );
        self.icon_driver
            .tween_to(icon_target, now, icon_growth, EasingFunction::EaseInOutCubic, AfterTween::Hold);
        self.growth_pending = 2;

        self.schedule(self.timing.expand, Cue::Reveal, Some(Phase::Expanding));
    }

    /// The ask button was pressed; a no-op outside `Revealed`
    pub fn trigger_ask(&mut self) {
        if self.disposed || self.phase != Phase::Revealed {
            tracing::debug!(phase = %self.phase, "trigger_ask() ignored");
            return;
        }
        self.sync_clock();
        self.transition(Phase::AskPending);
        let appear = self.motion.transition(self.timing.appear);
        self.hide(Target::AskButton, appear);
        self.show(Target::ChatPanel, appear);
        self.schedule(self.timing.ask, Cue::StartChat, Some(Phase::AskPending));
    }

    /// Forward a viewport change to the star field
    pub fn resize(&mut self, viewport: Viewport) {
        if self.disposed {
            return;
        }
        let now = self.sync_clock();
        self.stars.tick(now);
        self.stars.resize(viewport);
    }

    /// Reconfigure the background star field (debounced)
    pub fn configure_stars(&mut self, config: StarFieldConfig) {
        if self.disposed {
            return;
        }
        let now = self.sync_clock();
        self.stars.tick(now);
        self.stars.configure_debounced(config);
    }

    /// Advance everything to the clock's current time
    ///
    /// Due continuations fire in deadline order, then typewriter sessions,
    /// scale drivers and the star field advance.
    pub fn tick(&mut self) {
        if self.disposed {
            return;
        }
        let now = self.clock.now();

        while let Some((at, continuation)) = self.scheduler.pop_due(now) {
            if continuation.generation != self.generation
                || continuation.expect.is_some_and(|phase| phase != self.phase)
            {
                tracing::trace!(cue = ?continuation.cue, phase = %self.phase, "Dropping stale continuation");
                continue;
            }
            self.handle(continuation.cue, at);
        }

        let updates = self.typewriter.tick(now);
        self.apply_typewriter(updates, now);

        self.update_drivers(now);
        self.stars.tick(now);
    }

    /// Cancel everything; every later operation is a no-op
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.scheduler.cancel_all();
        self.typewriter.cancel_all();
        self.stars.dispose();
        self.box_driver.hold();
        self.icon_driver.hold();
        self.generation.bump();
        self.disposed = true;
        tracing::debug!(phase = %self.phase, "Sequencer disposed");
    }

    // =========================================================================
    // Observation
    // =========================================================================

    /// Current phase
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Read-only phase observable
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Phase> {
        self.phase_tx.subscribe()
    }

    /// Held scale of the box or icon
    #[must_use]
    pub fn current_scale(&self, target: Target) -> Option<f32> {
        match target {
            Target::Box => Some(self.box_driver.current_scale()),
            Target::Icon => Some(self.icon_driver.current_scale()),
            _ => None,
        }
    }

    /// The background star field
    #[must_use]
    pub fn stars(&self) -> &StarField {
        &self.stars
    }

    /// Star sprites to draw right now
    #[must_use]
    pub fn sprites(&self) -> Vec<Sprite> {
        self.stars.sprites(self.clock.now())
    }

    /// Pending narrative cues in firing order
    #[must_use]
    pub fn pending(&self) -> Vec<(Duration, Cue)> {
        self.scheduler.iter().map(|(at, c)| (at, c.cue)).collect()
    }

    /// Active motion preference
    #[must_use]
    pub fn motion(&self) -> MotionPreference {
        self.motion
    }

    /// Whether the pointer is over the box
    #[must_use]
    pub fn is_hovered(&self) -> bool {
        self.hovered
    }

    /// Whether [`dispose`](Self::dispose) has run
    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn sync_clock(&mut self) -> Duration {
        let now = self.clock.now();
        self.scheduler.set_now(now);
        now
    }

    fn schedule(&mut self, delay: Duration, cue: Cue, expect: Option<Phase>) {
        let continuation = Continuation {
            cue,
            expect,
            generation: self.generation,
        };
        self.scheduler.schedule_after(delay, continuation);
    }

    fn handle(&mut self, cue: Cue, at: Duration) {
        match cue {
            Cue::ShowIntroGroup(group) => self.show_intro_group(group),
            Cue::EnterBreathing => self.enter_breathing(at),
            Cue::HideIntroLayer => self.hide(Target::IntroLayer, Duration::ZERO),
            Cue::ShowHint => self.show(Target::Hint, self.motion.transition(self.timing.appear)),
            Cue::Reveal => self.finish_expand("timer"),
            Cue::StartChat => {
                self.transition(Phase::Chatting);
                self.show(Target::UserBubble, Duration::ZERO);
                let session = TypewriterSession::new(
                    Target::UserBubble,
                    self.copy.user_message.clone(),
                    TypewriterMode::PerCharDelay(self.timing.type_speed),
                );
                self.typewriter.start(session, at);
                let updates = self.typewriter.drain();
                self.apply_typewriter(updates, at);
            }
            Cue::StartReply => {
                self.hide(Target::Thinking, Duration::ZERO);
                self.show(Target::AiBubble, Duration::ZERO);
                let session = TypewriterSession::new(
                    Target::AiBubble,
                    self.copy.ai_response.clone(),
                    TypewriterMode::TotalDuration(self.timing.total_duration),
                );
                self.typewriter.start(session, at);
                let updates = self.typewriter.drain();
                self.apply_typewriter(updates, at);
            }
        }
    }

    fn show_intro_group(&mut self, group: u8) {
        let Some(shown) = self.intro_shown.get_mut(usize::from(group)) else {
            return;
        };
        if *shown {
            return;
        }
        *shown = true;
        let fade = self.motion.transition(self.timing.fade);
        self.show(Target::IntroGroup(group), fade);
    }

    fn enter_breathing(&mut self, at: Duration) {
        if !self.transition(Phase::Breathing) {
            return;
        }
        let reduced = self.motion.prefers_reduced_motion();
        let push = self.motion.transition(self.timing.push);
        let appear = self.motion.transition(self.timing.appear);

        self.hide(Target::IntroLine, push);
        self.show(Target::Box, appear);
        self.show(Target::Icon, appear);
        if let AfterTween::Pulse { amplitude, period } = self.breathing() {
            self.box_driver.pulse(amplitude, period, at);
            self.icon_driver.pulse(amplitude, period, at);
        }

        if reduced {
            self.hide(Target::IntroLayer, Duration::ZERO);
            self.show(Target::Hint, Duration::ZERO);
        } else {
            let layer = self.timing.rise.max(self.timing.push) + INTRO_LAYER_GRACE;
            self.schedule(layer, Cue::HideIntroLayer, None);
            self.schedule(self.timing.hint, Cue::ShowHint, Some(Phase::Breathing));
        }
    }

    /// How the drivers settle after a hover: breathe, unless motion is reduced
    fn breathing(&self) -> AfterTween {
        if self.motion.prefers_reduced_motion() {
            AfterTween::Hold
        } else {
            AfterTween::Pulse {
                amplitude: PULSE_AMPLITUDE,
                period: self.timing.pulse,
            }
        }
    }

    /// Single advancement from `Expanding` to `Revealed`
    fn finish_expand(&mut self, path: &'static str) {
        if self.phase != Phase::Expanding || !self.finished.trip() {
            tracing::trace!(path, "Expansion already finished");
            return;
        }
        tracing::debug!(path, "Expansion finished");
        self.scheduler.cancel_where(|c| c.cue == Cue::Reveal);
        self.transition(Phase::Revealed);
        self.show(Target::RevealScreen, self.motion.transition(self.timing.crossfade));
        self.show(Target::AskButton, self.motion.transition(self.timing.appear));
    }

    fn update_drivers(&mut self, now: Duration) {
        for target in [Target::Box, Target::Icon] {
            let driver = match target {
                Target::Box => &mut self.box_driver,
                _ => &mut self.icon_driver,
            };
            let step = driver.update(now);
            if step.changed || step.settled {
                self.send(StageMessage::SetScale {
                    target,
                    scale: step.scale,
                });
            }
            if step.settled && self.phase == Phase::Expanding && self.growth_pending > 0 {
                self.growth_pending -= 1;
                if self.growth_pending == 0 {
                    self.finish_expand("growth");
                }
            }
        }
    }

    fn apply_typewriter(&mut self, updates: Vec<TypewriterUpdate>, at: Duration) {
        for update in updates {
            match update {
                TypewriterUpdate::Text {
                    target, text, cursor, ..
                } => self.send(StageMessage::SetText {
                    target,
                    text,
                    cursor,
                }),
                TypewriterUpdate::Completed { target, .. } => self.session_completed(target, at),
            }
        }
    }

    fn session_completed(&mut self, target: Target, at: Duration) {
        match (target, self.phase) {
            (Target::UserBubble, Phase::Chatting) => {
                self.show(Target::Thinking, self.motion.transition(self.timing.appear));
                self.scheduler.set_now(at);
                self.schedule(self.timing.pause, Cue::StartReply, Some(Phase::Chatting));
            }
            (Target::AiBubble, Phase::Chatting) => {
                self.transition(Phase::ChatDone);
            }
            _ => tracing::trace!(element = %target.name(), phase = %self.phase, "Ignoring session completion"),
        }
    }

    /// Move forward to `to`; returns `false` if that would not be forward
    fn transition(&mut self, to: Phase) -> bool {
        if to <= self.phase {
            return false;
        }
        let from = self.phase;
        self.phase = to;
        self.phase_tx.send_replace(to);
        tracing::debug!(%from, %to, "Phase transition");
        self.send(StageMessage::PhaseChanged { from, to });
        true
    }

    fn show(&self, target: Target, transition: Duration) {
        self.send(StageMessage::Show { target, transition });
    }

    fn hide(&self, target: Target, transition: Duration) {
        self.send(StageMessage::Hide { target, transition });
    }

    fn send(&self, msg: StageMessage) {
        if self.tx.send(msg).is_err() {
            tracing::trace!("Surface receiver dropped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    struct Harness {
        clock: Arc<ManualClock>,
        sequencer: PhaseSequencer,
        rx: mpsc::UnboundedReceiver<StageMessage>,
    }

    impl Harness {
        fn new(motion: MotionPreference) -> Self {
            let clock = Arc::new(ManualClock::new());
            let (tx, rx) = mpsc::unbounded_channel();
            let config = StageConfig::default()
                .with_motion(motion)
                .with_stars(StarFieldConfig::default().with_count(10));
            let stars = StarField::with_rng(
                config.stars.clone(),
                Viewport::new(1.0, 1.0),
                StdRng::seed_from_u64(9),
            );
            let sequencer = PhaseSequencer::with_star_field(&config, clock.clone(), tx, stars);
            Self { clock, sequencer, rx }
        }

        fn advance(&mut self, ms: u64) {
            self.clock.advance_ms(ms);
            self.sequencer.tick();
        }

        fn messages(&mut self) -> Vec<StageMessage> {
            let mut out = Vec::new();
            while let Ok(msg) = self.rx.try_recv() {
                out.push(msg);
            }
            out
        }
    }

    #[test]
    fn test_intro_reaches_breathing_after_stagger_and_hold() {
        let mut h = Harness::new(MotionPreference::Full);
        h.sequencer.start();
        // 5 * 1200 + 3000
        h.advance(8999);
        assert_eq!(h.sequencer.phase(), Phase::Intro);
        h.advance(1);
        assert_eq!(h.sequencer.phase(), Phase::Breathing);
    }

    #[test]
    fn test_intro_groups_staggered() {
        let mut h = Harness::new(MotionPreference::Full);
        h.sequencer.start();
        h.advance(1200);
        let shown: Vec<Target> = h
            .messages()
            .into_iter()
            .filter_map(|m| match m {
                StageMessage::Show { target: t @ Target::IntroGroup(_), .. } => Some(t),
                _ => None,
            })
            .collect();
        assert_eq!(shown, vec![Target::IntroGroup(0), Target::IntroGroup(1)]);
    }

    #[test]
    fn test_skip_outside_intro_is_noop() {
        let mut h = Harness::new(MotionPreference::Full);
        h.sequencer.skip();
        assert_eq!(h.sequencer.phase(), Phase::Intro);

        h.sequencer.start();
        h.sequencer.skip();
        assert_eq!(h.sequencer.phase(), Phase::Breathing);
        h.messages();

        h.sequencer.skip();
        assert!(h.messages().is_empty());
    }

    #[test]
    fn test_hint_after_delay_in_breathing() {
        let mut h = Harness::new(MotionPreference::Full);
        h.sequencer.start();
        h.sequencer.skip();
        h.messages();

        h.advance(1199);
        assert!(!h
            .messages()
            .iter()
            .any(|m| matches!(m, StageMessage::Show { target: Target::Hint, .. })));
        h.advance(1);
        assert!(h
            .messages()
            .iter()
            .any(|m| matches!(m, StageMessage::Show { target: Target::Hint, .. })));
    }

    #[test]
    fn test_click_before_breathing_ignored() {
        let mut h = Harness::new(MotionPreference::Full);
        h.sequencer.start();
        h.sequencer.trigger_expand();
        assert_eq!(h.sequencer.phase(), Phase::Intro);

        // the click did not burn the latch
        h.sequencer.skip();
        h.sequencer.trigger_expand();
        assert_eq!(h.sequencer.phase(), Phase::Expanding);
    }

    #[test]
    fn test_timer_path_reveals() {
        let mut h = Harness::new(MotionPreference::Full);
        h.sequencer.start();
        h.sequencer.skip();
        h.sequencer.trigger_expand();

        h.advance(1999);
        assert_eq!(h.sequencer.phase(), Phase::Expanding);
        h.advance(1);
        assert_eq!(h.sequencer.phase(), Phase::Revealed);
    }

    #[test]
    fn test_growth_path_reveals_when_timer_is_slower() {
        let clock = Arc::new(ManualClock::new());
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut timing = TimingConfig::default();
        timing.expand = Duration::from_secs(60);
        timing.box_growth = Duration::from_millis(300);
        timing.icon_growth = Duration::from_millis(200);
        let config = StageConfig::default().with_timing(timing);
        let mut sequencer = PhaseSequencer::new(&config, clock.clone(), tx);

        sequencer.start();
        sequencer.skip();
        sequencer.trigger_expand();

        clock.advance_ms(200);
        sequencer.tick();
        assert_eq!(sequencer.phase(), Phase::Expanding, "icon alone is not enough");

        clock.advance_ms(100);
        sequencer.tick();
        assert_eq!(sequencer.phase(), Phase::Revealed);
        assert!(sequencer.pending().iter().all(|(_, cue)| *cue != Cue::Reveal));

        clock.advance_ms(60_000);
        sequencer.tick();
        assert_eq!(sequencer.phase(), Phase::Revealed);
    }

    #[test]
    fn test_hover_only_in_breathing_and_on_change() {
        let mut h = Harness::new(MotionPreference::Full);
        h.sequencer.start();
        h.sequencer.hover(true);
        assert!(!h.sequencer.is_hovered());
        assert_eq!(h.sequencer.stars().burst_count(), 0);

        h.sequencer.skip();
        h.sequencer.hover(true);
        h.sequencer.hover(true);
        assert_eq!(h.sequencer.stars().burst_count(), crate::stars::BURST_SIZE);

        h.sequencer.hover(false);
        h.sequencer.hover(true);
        assert_eq!(h.sequencer.stars().burst_count(), 2 * crate::stars::BURST_SIZE);
    }

    #[test]
    fn test_hover_scales_from_held_pulse() {
        let mut h = Harness::new(MotionPreference::Full);
        h.sequencer.start();
        h.sequencer.skip();
        // half a pulse period: peak of the breath
        h.advance(1845);
        let held = h.sequencer.current_scale(Target::Box).unwrap();
        assert!(held > 1.05);

        h.sequencer.hover(true);
        h.advance(500);
        let hovered = h.sequencer.current_scale(Target::Box).unwrap();
        assert!((hovered - held * HOVER_BOX_FACTOR).abs() < 1e-4);
    }

    #[test]
    fn test_chat_runs_to_done() {
        let mut h = Harness::new(MotionPreference::Full);
        h.sequencer.start();
        h.sequencer.skip();
        h.sequencer.trigger_expand();
        h.advance(2000);
        h.sequencer.trigger_ask();
        assert_eq!(h.sequencer.phase(), Phase::AskPending);

        h.advance(800);
        assert_eq!(h.sequencer.phase(), Phase::Chatting);

        // long enough for both sessions and the pause
        for _ in 0..200 {
            h.advance(50);
        }
        assert_eq!(h.sequencer.phase(), Phase::ChatDone);

        let last_ai_text = h
            .messages()
            .into_iter()
            .filter_map(|m| match m {
                StageMessage::SetText { target: Target::AiBubble, text, .. } => Some(text),
                _ => None,
            })
            .last();
        assert_eq!(last_ai_text, Some(StageCopy::default().ai_response));
    }

    #[test]
    fn test_reduced_motion_breathing_is_synchronous() {
        let mut h = Harness::new(MotionPreference::Reduced);
        h.sequencer.start();
        assert_eq!(h.sequencer.phase(), Phase::Breathing);
        assert!(h.sequencer.pending().is_empty());

        for msg in h.messages() {
            if let StageMessage::Show { transition, .. } | StageMessage::Hide { transition, .. } = msg {
                assert_eq!(transition, Duration::ZERO);
            }
        }
    }

    #[test]
    fn test_dispose_stops_everything() {
        let mut h = Harness::new(MotionPreference::Full);
        h.sequencer.start();
        h.sequencer.dispose();
        h.messages();

        h.advance(60_000);
        h.sequencer.skip();
        h.sequencer.trigger_expand();
        assert_eq!(h.sequencer.phase(), Phase::Intro);
        assert!(h.messages().is_empty());
        assert!(h.sequencer.pending().is_empty());
    }

    #[test]
    fn test_watch_observes_transitions() {
        let mut h = Harness::new(MotionPreference::Full);
        let rx = h.sequencer.subscribe();
        h.sequencer.start();
        h.sequencer.skip();
        assert_eq!(*rx.borrow(), Phase::Breathing);
    }
}
