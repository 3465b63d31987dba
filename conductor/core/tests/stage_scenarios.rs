//! Integration tests for the landing stage
//!
//! These tests drive the public API end to end with a manual clock.
//! Tests cover:
//! - Per-character and total-duration typing
//! - Star field reseeding, bursts and debouncing
//! - Expansion with its two completion paths, and disposal mid-flight
//! - Reduced motion
//! - Scene application with unmounted targets
//! - Configuration priority

use std::collections::HashMap;
use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tempfile::NamedTempFile;
use tokio::sync::mpsc;

use hydrant_conductor::config::{apply_env_overrides, load_config_from_path, ConfigSource};
use hydrant_conductor::stars::{BURST_LIFETIME, BURST_SIZE};
use hydrant_conductor::typewriter::markup;
use hydrant_conductor::{
    Cue, ManualClock, MotionPreference, Phase, PhaseSequencer, Scene, StageConfig, StageMessage,
    StarField, StarFieldConfig, Target, TypewriterEngine, TypewriterMode, TypewriterSession,
    TypewriterUpdate, Viewport,
};

fn ms(value: u64) -> Duration {
    Duration::from_millis(value)
}

struct Stage {
    clock: Arc<ManualClock>,
    sequencer: PhaseSequencer,
    rx: mpsc::UnboundedReceiver<StageMessage>,
}

impl Stage {
    fn new(config: &StageConfig) -> Self {
        let clock = Arc::new(ManualClock::new());
        let (tx, rx) = mpsc::unbounded_channel();
        let stars = StarField::with_rng(
            config.stars.clone(),
            Viewport::new(80.0, 24.0),
            StdRng::seed_from_u64(42),
        );
        let sequencer = PhaseSequencer::with_star_field(config, clock.clone(), tx, stars);
        Self { clock, sequencer, rx }
    }

    fn default_motion() -> Self {
        Self::new(&StageConfig::default().with_stars(StarFieldConfig::default().with_count(50)))
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

    fn to_breathing(&mut self) {
        self.sequencer.start();
        self.sequencer.skip();
        self.messages();
    }
}

fn phase_changes(msgs: &[StageMessage]) -> Vec<Phase> {
    msgs.iter()
        .filter_map(|m| match m {
            StageMessage::PhaseChanged { to, .. } => Some(*to),
            _ => None,
        })
        .collect()
}

// =============================================================================
// Typewriter
// =============================================================================

#[test]
fn test_per_char_reveal_with_atomic_tags() {
    let mut engine = TypewriterEngine::new();
    engine.start(
        TypewriterSession::new(Target::AiBubble, "hi <b>there</b>", TypewriterMode::PerCharDelay(ms(10))),
        ms(0),
    );
    engine.drain();

    let mut snapshots = Vec::new();
    let mut times = Vec::new();
    for t in (0..=200).map(ms) {
        for update in engine.tick(t) {
            if let TypewriterUpdate::Text { text, .. } = update {
                snapshots.push(text);
                times.push(t);
            }
        }
    }

    assert_eq!(
        snapshots,
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
    for pair in times.windows(2) {
        assert!(pair[1] - pair[0] >= ms(10));
    }
}

#[test]
fn test_total_duration_reveals_by_elapsed_fraction() {
    let source = "x".repeat(100);
    let fired = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&fired);

    let mut engine = TypewriterEngine::new();
    engine.start(
        TypewriterSession::new(Target::AiBubble, source, TypewriterMode::TotalDuration(ms(4000)))
            .on_complete(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
        ms(0),
    );
    engine.drain();

    let mid = engine.tick(ms(2000));
    let revealed = mid
        .iter()
        .filter_map(|u| match u {
            TypewriterUpdate::Text { text, .. } => Some(markup::visible_len(text)),
            TypewriterUpdate::Completed { .. } => None,
        })
        .last();
    assert_eq!(revealed, Some(50));
    assert_eq!(fired.load(Ordering::SeqCst), 0);

    let end = engine.tick(ms(4000));
    let full = "x".repeat(100);
    assert!(end
        .iter()
        .any(|u| matches!(u, TypewriterUpdate::Text { text, cursor: false, .. } if *text == full)));
    engine.tick(ms(9000));
    assert_eq!(fired.load(Ordering::SeqCst), 1);
}

#[test]
fn test_cancel_before_completion_never_fires() {
    let fired = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&fired);

    let mut engine = TypewriterEngine::new();
    engine.start(
        TypewriterSession::new(Target::UserBubble, "hello", TypewriterMode::PerCharDelay(ms(10)))
            .on_complete(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
        ms(0),
    );
    engine.tick(ms(25));
    assert!(engine.cancel(Target::UserBubble));

    assert!(engine.tick(ms(10_000)).is_empty());
    assert_eq!(fired.load(Ordering::SeqCst), 0);
}

// =============================================================================
// Star Field
// =============================================================================

#[test]
fn test_reseed_then_empty_before_first_frame() {
    let mut field = StarField::with_rng(
        StarFieldConfig::default().with_count(600),
        Viewport::new(100.0, 100.0),
        StdRng::seed_from_u64(1),
    );
    assert_eq!(field.len(), 600);

    field.configure(StarFieldConfig::default().with_count(0));
    assert_eq!(field.len(), 0);
    assert_eq!(field.pending_continuations(), 0);

    field.tick(Duration::from_secs(60));
    assert_eq!(field.len(), 0);
    assert!(field.sprites(Duration::from_secs(60)).is_empty());
}

#[test]
fn test_count_replaced_not_accumulated() {
    let mut field = StarField::with_rng(
        StarFieldConfig::default().with_count(300),
        Viewport::new(100.0, 100.0),
        StdRng::seed_from_u64(2),
    );
    let before = field.generation();
    field.configure(StarFieldConfig::default().with_count(120));
    assert_eq!(field.len(), 120);
    assert!(field.generation() > before);
    assert_eq!(field.drifting(), 120);
}

#[test]
fn test_bursts_released_across_reseed() {
    let mut field = StarField::with_rng(
        StarFieldConfig::default().with_count(10),
        Viewport::new(100.0, 100.0),
        StdRng::seed_from_u64(3),
    );
    assert_eq!(field.burst(0.5, 0.5), BURST_SIZE);
    field.configure(StarFieldConfig::default().with_count(20));
    assert_eq!(field.burst_count(), BURST_SIZE);

    field.tick(BURST_LIFETIME);
    assert_eq!(field.burst_count(), 0);
}

#[test]
fn test_debounced_configure_reseeds_once() {
    let mut field = StarField::with_rng(
        StarFieldConfig::default().with_count(10),
        Viewport::new(100.0, 100.0),
        StdRng::seed_from_u64(4),
    );
    let initial = field.reseed_count();

    for step in 0..5u64 {
        field.tick(ms(step * 100));
        field.configure_debounced(StarFieldConfig::default().with_count(10 + step as usize));
    }
    field.tick(ms(400 + 149));
    assert_eq!(field.reseed_count(), initial);

    field.tick(ms(400 + 150));
    assert_eq!(field.reseed_count(), initial + 1);
    assert_eq!(field.len(), 14);
}

// =============================================================================
// Sequencer
// =============================================================================

#[test]
fn test_double_click_expands_once() {
    let mut stage = Stage::default_motion();
    stage.to_breathing();

    stage.sequencer.trigger_expand();
    stage.sequencer.trigger_expand();

    assert_eq!(phase_changes(&stage.messages()), vec![Phase::Expanding]);
    let reveals = stage
        .sequencer
        .pending()
        .into_iter()
        .filter(|(_, cue)| *cue == Cue::Reveal)
        .count();
    assert_eq!(reveals, 1);

    stage.advance(10_000);
    assert_eq!(phase_changes(&stage.messages()), vec![Phase::Revealed]);
}

#[test]
fn test_dispose_during_expand_prevents_reveal() {
    let mut stage = Stage::default_motion();
    stage.to_breathing();
    stage.sequencer.trigger_expand();
    stage.advance(1000);
    stage.sequencer.dispose();
    stage.messages();

    for _ in 0..100 {
        stage.advance(100);
    }
    assert_eq!(stage.sequencer.phase(), Phase::Expanding);
    assert!(phase_changes(&stage.messages()).is_empty());
}

#[test]
fn test_reduced_motion_reaches_breathing_synchronously() {
    let config = StageConfig::default()
        .with_motion(MotionPreference::Reduced)
        .with_stars(StarFieldConfig::default().with_count(10));
    let mut stage = Stage::new(&config);
    stage.sequencer.start();

    assert_eq!(stage.sequencer.phase(), Phase::Breathing);
    assert!(stage.sequencer.pending().is_empty());

    let msgs = stage.messages();
    let groups = msgs
        .iter()
        .filter(|m| matches!(m, StageMessage::Show { target: Target::IntroGroup(_), .. }))
        .count();
    assert_eq!(groups, 6);
    assert!(msgs
        .iter()
        .any(|m| matches!(m, StageMessage::Show { target: Target::Hint, .. })));
}

#[test]
fn test_hover_bursts_once_per_enter() {
    let mut stage = Stage::default_motion();
    stage.sequencer.start();
    stage.sequencer.hover(true);
    stage.sequencer.hover(false);
    assert_eq!(stage.sequencer.stars().burst_count(), 0);

    stage.sequencer.skip();
    for _ in 0..3 {
        stage.sequencer.hover(true);
        stage.sequencer.hover(true);
        stage.sequencer.hover(false);
    }
    assert_eq!(stage.sequencer.stars().burst_count(), 3 * BURST_SIZE);

    stage.sequencer.trigger_expand();
    stage.sequencer.hover(true);
    assert_eq!(stage.sequencer.stars().burst_count(), 3 * BURST_SIZE);
}

#[test]
fn test_full_run_through_scene() {
    let mut stage = Stage::default_motion();
    // No hint in this surface
    let mut scene = Scene::with_targets([
        Target::Box,
        Target::Icon,
        Target::RevealScreen,
        Target::AskButton,
        Target::ChatPanel,
        Target::UserBubble,
        Target::AiBubble,
    ]);

    stage.sequencer.start();
    for _ in 0..200 {
        stage.advance(50);
    }
    assert_eq!(stage.sequencer.phase(), Phase::Breathing);
    stage.sequencer.trigger_expand();
    stage.advance(2000);
    stage.sequencer.trigger_ask();
    for _ in 0..400 {
        stage.advance(50);
    }
    assert_eq!(stage.sequencer.phase(), Phase::ChatDone);

    let now = Duration::from_secs(60);
    scene.apply_all(&stage.messages(), now);

    assert!(scene.dropped() > 0);
    assert_eq!(scene.phase(), Phase::ChatDone);
    assert!(scene.is_visible(Target::RevealScreen));
    assert!(!scene.is_visible(Target::AskButton));
    assert_eq!(
        scene.element(Target::UserBubble).map(|e| e.text.as_str()),
        Some(StageConfig::default().copy.user_message.as_str())
    );
    assert!(scene.element(Target::Box).is_some_and(|e| e.scale > 10.0));
}

// =============================================================================
// Configuration
// =============================================================================

#[test]
fn test_config_priority_and_per_key_fallback() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
[timing]
fade = 900
hold = "soon"
type_speed = "60ms"

[stars]
count = 800
"#
    )
    .unwrap();

    let mut config = load_config_from_path(Some(file.path().to_path_buf())).unwrap();
    assert_eq!(config.source(), ConfigSource::File);
    assert_eq!(config.timing.fade, ms(900));
    assert_eq!(config.timing.hold, ms(3000));
    assert_eq!(config.stars.count, 800);

    let env: HashMap<&str, &str> = [("HYDRANT_TYPE_SPEED", "40ms"), ("HYDRANT_FADE", "bogus")]
        .into_iter()
        .collect();
    apply_env_overrides(&mut config, |key| env.get(key).map(|v| (*v).to_string()));

    assert_eq!(config.source(), ConfigSource::Env);
    assert_eq!(config.timing.type_speed, ms(40));
    assert_eq!(config.timing.fade, ms(900));
}
