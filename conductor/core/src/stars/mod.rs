//! Star Field
//!
//! A procedural field of twinkling stars with an optional one-shot drift out
//! from the center, plus short-lived bursts for hover feedback.
//!
//! # Lifecycle
//!
//! ```text
//! configure()/resize() ──► reseed ──► stars drift out ──► settled, twinkling
//!         ▲                   │
//!         └── generation bump ┘ (in-flight drifts from the old field dropped)
//! ```
//!
//! All timed work lives in the field's own [`Scheduler`]. Drift continuations
//! carry the [`Generation`] they were created under; bursts carry none, so
//! they outlive reseeds and are only released by their own expiry or by
//! [`StarField::dispose`].

pub mod config;
mod generate;

pub use config::{StarFieldConfig, StarPreset, UnknownPreset, MAX_END_SCALE, MAX_STARS, MAX_STAR_SIZE};
pub use generate::{
    BurstStar, Drift, Point, Star, BURST_LIFETIME, BURST_SIZE, CLUSTERS, CLUSTER_SHARE, ORIGIN,
};

use std::collections::BTreeMap;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::accessibility::MotionPreference;
use crate::animation::EasingFunction;
use crate::scheduler::{Generation, Scheduler};

/// Quiet period before a debounced reconfigure applies
pub const DEBOUNCE: Duration = Duration::from_millis(150);

/// Size of the surface the field is drawn on
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Width in surface units
    pub width: f32,
    /// Height in surface units
    pub height: f32,
}

impl Viewport {
    /// Create a viewport
    #[must_use]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// Something a surface should draw this frame
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sprite {
    /// Horizontal position in viewport units
    pub x: f32,
    /// Vertical position in viewport units
    pub y: f32,
    /// Diameter in pixels
    pub size: f32,
    /// Opacity 0..=1
    pub opacity: f32,
    /// Whether this sprite belongs to a burst
    pub burst: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum StarCue {
    DriftSettled { generation: Generation, index: usize },
    BurstExpired { id: u64 },
    Reconfigure,
}

/// Twinkling, drifting star field
#[derive(Debug)]
pub struct StarField {
    config: StarFieldConfig,
    viewport: Viewport,
    motion: MotionPreference,
    stars: Vec<Star>,
    bursts: BTreeMap<u64, BurstStar>,
    scheduler: Scheduler<StarCue>,
    generation: Generation,
    epoch: Duration,
    pending: Option<StarFieldConfig>,
    rng: StdRng,
    next_burst: u64,
    reseeds: u64,
    disposed: bool,
}

impl StarField {
    /// Create and seed a field with entropy from the OS
    #[must_use]
    pub fn new(config: StarFieldConfig, viewport: Viewport) -> Self {
        Self::with_rng(config, viewport, StdRng::from_entropy())
    }

    /// Create and seed a field from a given generator
    #[must_use]
    pub fn with_rng(config: StarFieldConfig, viewport: Viewport, rng: StdRng) -> Self {
        let mut field = Self {
            config: StarFieldConfig::default(),
            viewport,
            motion: MotionPreference::Full,
            stars: Vec::new(),
            bursts: BTreeMap::new(),
            scheduler: Scheduler::new(),
            generation: Generation::initial(),
            epoch: Duration::ZERO,
            pending: None,
            rng,
            next_burst: 0,
            reseeds: 0,
            disposed: false,
        };
        field.configure(config);
        field
    }

    /// Apply a motion preference; `None` freezes twinkle and stops drift
    ///
    /// A field caught mid-drift by `None` is reseeded at rest.
    pub fn set_motion(&mut self, motion: MotionPreference) {
        self.motion = motion;
        if !motion.allows_ambient_motion() && self.drifting() > 0 {
            self.reseed();
        }
    }

    /// Clamp `config`, store it and reseed
    pub fn configure(&mut self, config: StarFieldConfig) {
        if self.disposed {
            return;
        }
        let (clean, clamped) = config.sanitized();
        if clamped {
            tracing::warn!(requested = ?config, applied = ?clean, "Star field config clamped");
        }
        self.config = clean;
        self.pending = None;
        self.scheduler.cancel_where(|cue| matches!(cue, StarCue::Reconfigure));
        self.reseed();
    }

    /// Reconfigure after [`DEBOUNCE`] of quiet
    ///
    /// A later call replaces the pending one and restarts the wait.
    pub fn configure_debounced(&mut self, config: StarFieldConfig) {
        if self.disposed {
            return;
        }
        self.scheduler.cancel_where(|cue| matches!(cue, StarCue::Reconfigure));
        self.pending = Some(config);
        self.scheduler.schedule_after(DEBOUNCE, StarCue::Reconfigure);
    }

    /// Replace every star with a freshly generated field
    ///
    /// Pending drift continuations from the previous field are removed and
    /// would be dropped as stale anyway. Bursts are untouched.
    pub fn reseed(&mut self) {
        if self.disposed {
            return;
        }
        let stale = self.generation;
        let generation = self.generation.bump();
        let removed = self
            .scheduler
            .cancel_where(|cue| matches!(cue, StarCue::DriftSettled { generation: g, .. } if *g == stale));

        self.epoch = self.scheduler.now();
        let drift = self.config.drift && self.motion.allows_ambient_motion();
        let clusters = generate::clusters(&mut self.rng);
        let config = &self.config;
        let rng = &mut self.rng;
        self.stars = (0..config.count)
            .map(|index| generate::star(rng, index, &clusters, config, drift))
            .collect();

        for (index, star) in self.stars.iter().enumerate() {
            if let Some(drift) = star.drift {
                let at = self.epoch + drift.delay + drift.duration;
                self.scheduler
                    .schedule_at(at, StarCue::DriftSettled { generation, index });
            }
        }

        self.reseeds += 1;
        tracing::debug!(
            generation = generation.value(),
            count = self.stars.len(),
            dropped_drifts = removed,
            "Star field reseeded"
        );
    }

    /// Store a new viewport and reseed; a same-size resize does nothing
    pub fn resize(&mut self, viewport: Viewport) {
        if self.disposed || viewport == self.viewport {
            return;
        }
        self.viewport = viewport;
        self.reseed();
    }

    /// Emit a burst from `(x, y)` in normalized field space
    ///
    /// Returns the number of stars emitted (zero when motion is off).
    pub fn burst(&mut self, x: f32, y: f32) -> usize {
        if self.disposed || !self.motion.allows_ambient_motion() {
            return 0;
        }
        let now = self.scheduler.now();
        let origin = Point::new(x, y);
        for _ in 0..BURST_SIZE {
            let id = self.next_burst;
            self.next_burst += 1;
            let star = generate::burst_star(&mut self.rng, origin, now, &self.config);
            self.bursts.insert(id, star);
            self.scheduler
                .schedule_after(BURST_LIFETIME, StarCue::BurstExpired { id });
        }
        tracing::trace!(x, y, live = self.bursts.len(), "Star burst");
        BURST_SIZE
    }

    /// Fire due continuations up to `now`
    pub fn tick(&mut self, now: Duration) {
        if self.disposed {
            return;
        }
        while let Some((_, cue)) = self.scheduler.pop_due(now) {
            match cue {
                StarCue::DriftSettled { generation, index } => {
                    if generation != self.generation {
                        tracing::trace!(index, "Dropping drift from a previous field");
                        continue;
                    }
                    if let Some(star) = self.stars.get_mut(index) {
                        if let Some(drift) = star.drift.take() {
                            star.radius *= drift.end_scale;
                        }
                    }
                }
                StarCue::BurstExpired { id } => {
                    self.bursts.remove(&id);
                }
                StarCue::Reconfigure => {
                    if let Some(config) = self.pending.take() {
                        self.configure(config);
                    }
                }
            }
        }
    }

    /// Everything to draw at `now`, in viewport units
    ///
    /// Sprites that drift outside the field are left out.
    #[must_use]
    pub fn sprites(&self, now: Duration) -> Vec<Sprite> {
        if self.disposed {
            return Vec::new();
        }
        let t = now.as_secs_f32();
        let ambient = self.motion.allows_ambient_motion();
        let mut sprites = Vec::with_capacity(self.stars.len() + self.bursts.len());

        for star in &self.stars {
            let (position, scale) = match star.drift {
                Some(drift) => {
                    let start = self.epoch + drift.delay;
                    if now < start {
                        continue;
                    }
                    let progress = crate::animation::progress(now - start, drift.duration);
                    let eased = EasingFunction::EaseOutCubic.apply(progress);
                    (ORIGIN.lerp(star.position, eased), drift.end_scale * eased)
                }
                None => (star.position, 1.0),
            };
            if !position.in_bounds() {
                continue;
            }
            let opacity = if ambient { star.twinkle(t) } else { star.base_opacity };
            sprites.push(self.sprite(position, star.radius * 2.0 * scale, opacity, false));
        }

        for burst in self.bursts.values() {
            let progress = crate::animation::progress(now.saturating_sub(burst.born), BURST_LIFETIME);
            let eased = EasingFunction::EaseOutCubic.apply(progress);
            let position = burst.origin.lerp(burst.target, eased);
            if position.in_bounds() {
                sprites.push(self.sprite(position, MAX_STAR_SIZE * burst.end_scale * eased, 1.0, true));
            }
        }

        sprites
    }

    fn sprite(&self, position: Point, size: f32, opacity: f32, burst: bool) -> Sprite {
        Sprite {
            x: position.x * self.viewport.width,
            y: position.y * self.viewport.height,
            size: size.min(MAX_STAR_SIZE * MAX_END_SCALE),
            opacity: opacity.clamp(0.0, 1.0),
            burst,
        }
    }

    /// Release every star, burst and pending continuation
    ///
    /// The field stays inert afterwards.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.scheduler.cancel_all();
        self.generation.bump();
        self.stars.clear();
        self.bursts.clear();
        self.pending = None;
        self.disposed = true;
        tracing::debug!("Star field disposed");
    }

    /// Current stars
    #[must_use]
    pub fn stars(&self) -> &[Star] {
        &self.stars
    }

    /// Number of stars in the field (bursts excluded)
    #[must_use]
    pub fn len(&self) -> usize {
        self.stars.len()
    }

    /// Whether the field has no stars
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stars.is_empty()
    }

    /// Live burst stars
    #[must_use]
    pub fn burst_count(&self) -> usize {
        self.bursts.len()
    }

    /// Stars still drifting
    #[must_use]
    pub fn drifting(&self) -> usize {
        self.stars.iter().filter(|s| s.drift.is_some()).count()
    }

    /// Pending continuations of any kind
    #[must_use]
    pub fn pending_continuations(&self) -> usize {
        self.scheduler.len()
    }

    /// Applied (clamped) settings
    #[must_use]
    pub fn config(&self) -> &StarFieldConfig {
        &self.config
    }

    /// Current viewport
    #[must_use]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Current field generation
    #[must_use]
    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// How many reseeds have happened
    #[must_use]
    pub fn reseed_count(&self) -> u64 {
        self.reseeds
    }

    /// Whether [`dispose`](Self::dispose) has run
    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(config: StarFieldConfig) -> StarField {
        StarField::with_rng(config, Viewport::new(800.0, 600.0), StdRng::seed_from_u64(42))
    }

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    #[test]
    fn test_exact_count() {
        let mut stars = field(StarFieldConfig::default().with_count(250));
        assert_eq!(stars.len(), 250);

        stars.configure(StarFieldConfig::default().with_count(7));
        assert_eq!(stars.len(), 7);
    }

    #[test]
    fn test_count_capped_at_max_stars() {
        let stars = field(StarFieldConfig::default().with_count(MAX_STARS * 3));
        assert_eq!(stars.len(), MAX_STARS);
    }

    #[test]
    fn test_reseed_drops_old_drift_continuations() {
        let mut stars = field(StarFieldConfig::default().with_count(100));
        assert_eq!(stars.pending_continuations(), 100);

        stars.configure(StarFieldConfig::default().with_count(10));
        assert_eq!(stars.pending_continuations(), 10);
    }

    #[test]
    fn test_drift_settles() {
        let mut stars = field(StarFieldConfig::default().with_count(20));
        assert_eq!(stars.drifting(), 20);

        stars.tick(Duration::from_secs(60));
        assert_eq!(stars.drifting(), 0);
        assert_eq!(stars.pending_continuations(), 0);
    }

    #[test]
    fn test_no_drift_when_disabled() {
        let stars = field(StarFieldConfig::default().with_count(20).with_drift(false));
        assert_eq!(stars.drifting(), 0);
        assert_eq!(stars.pending_continuations(), 0);
    }

    #[test]
    fn test_static_field_without_motion() {
        let mut stars = field(StarFieldConfig::default().with_count(0));
        stars.set_motion(MotionPreference::None);
        stars.configure(StarFieldConfig::default().with_count(20));

        assert_eq!(stars.drifting(), 0);
        assert_eq!(stars.burst(0.5, 0.5), 0);

        let a = stars.sprites(ms(100));
        let b = stars.sprites(ms(900));
        assert_eq!(a, b);
    }

    #[test]
    fn test_burst_expires() {
        let mut stars = field(StarFieldConfig::default().with_count(0));
        assert_eq!(stars.burst(0.5, 0.5), BURST_SIZE);
        assert_eq!(stars.burst_count(), BURST_SIZE);

        stars.tick(BURST_LIFETIME - ms(1));
        assert_eq!(stars.burst_count(), BURST_SIZE);
        stars.tick(BURST_LIFETIME);
        assert_eq!(stars.burst_count(), 0);
    }

    #[test]
    fn test_same_size_resize_is_noop() {
        let mut stars = field(StarFieldConfig::default().with_count(5));
        let generation = stars.generation();

        stars.resize(Viewport::new(800.0, 600.0));
        assert_eq!(stars.generation(), generation);

        stars.resize(Viewport::new(1024.0, 768.0));
        assert_ne!(stars.generation(), generation);
        assert_eq!(stars.len(), 5);
    }

    #[test]
    fn test_debounce_coalesces() {
        let mut stars = field(StarFieldConfig::default().with_count(5));
        let before = stars.reseed_count();

        stars.configure_debounced(StarFieldConfig::default().with_count(10));
        stars.tick(ms(100));
        stars.configure_debounced(StarFieldConfig::default().with_count(20));
        stars.tick(ms(200));
        assert_eq!(stars.reseed_count(), before);
        assert_eq!(stars.len(), 5);

        stars.tick(ms(250));
        assert_eq!(stars.reseed_count(), before + 1);
        assert_eq!(stars.len(), 20);
    }

    #[test]
    fn test_sprites_scale_into_viewport() {
        let mut stars = field(StarFieldConfig::default().with_count(50).with_drift(false));
        stars.tick(ms(10));
        for sprite in stars.sprites(ms(10)) {
            assert!((0.0..=800.0).contains(&sprite.x));
            assert!((0.0..=600.0).contains(&sprite.y));
            assert!(sprite.size <= MAX_STAR_SIZE * MAX_END_SCALE);
        }
    }

    #[test]
    fn test_drifting_stars_hidden_until_their_delay() {
        let stars = field(StarFieldConfig::default().with_count(100));
        // stream delay 20ms per star: at t=0 only star 0 has started
        assert!(stars.sprites(Duration::ZERO).len() <= 1);
    }

    #[test]
    fn test_dispose_releases_everything() {
        let mut stars = field(StarFieldConfig::default().with_count(30));
        stars.burst(0.2, 0.2);
        stars.configure_debounced(StarFieldConfig::default());
        stars.dispose();

        assert!(stars.is_empty());
        assert_eq!(stars.burst_count(), 0);
        assert_eq!(stars.pending_continuations(), 0);

        stars.configure(StarFieldConfig::default().with_count(10));
        stars.tick(Duration::from_secs(10));
        assert!(stars.is_empty());
        assert!(stars.sprites(Duration::from_secs(10)).is_empty());
    }
}
