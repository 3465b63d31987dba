//! Star generation
//!
//! Positions are normalized to the unit square. A fixed share of stars is
//! placed around a handful of random cluster centers, the rest scattered
//! uniformly, which gives the field its uneven dense/sparse texture.

use std::f32::consts::TAU;
use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::config::{StarFieldConfig, MAX_END_SCALE, MAX_STAR_SIZE};

/// Number of cluster centers per reseed
pub const CLUSTERS: usize = 8;

/// Probability that a star belongs to a cluster
pub const CLUSTER_SHARE: f64 = 0.6;

/// Attempts at an in-bounds cluster position before clamping
const CLUSTER_RETRIES: usize = 4;

/// Extra drift time for a star at the corner versus one at the origin
pub const DRIFT_SPREAD: Duration = Duration::from_secs(3);

/// Shared drift origin (center of the field)
pub const ORIGIN: Point = Point { x: 0.5, y: 0.5 };

/// Distance from the origin to a corner
const MAX_DISTANCE: f32 = std::f32::consts::FRAC_1_SQRT_2;

/// A position in normalized field space
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal, 0 = left edge
    pub x: f32,
    /// Vertical, 0 = top edge
    pub y: f32,
}

impl Point {
    /// Create a point
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Distance to `other`
    #[must_use]
    pub fn distance(self, other: Point) -> f32 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Point `t` of the way towards `other`
    #[must_use]
    pub fn lerp(self, other: Point, t: f32) -> Point {
        Point {
            x: self.x + (other.x - self.x) * t,
            y: self.y + (other.y - self.y) * t,
        }
    }

    /// Whether the point lies inside the unit square
    #[must_use]
    pub fn in_bounds(self) -> bool {
        (0.0..=1.0).contains(&self.x) && (0.0..=1.0).contains(&self.y)
    }

    fn clamped(self) -> Point {
        Point {
            x: self.x.clamp(0.0, 1.0),
            y: self.y.clamp(0.0, 1.0),
        }
    }
}

/// One-shot travel from [`ORIGIN`] out to a star's resting position
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Drift {
    /// Wait after the reseed before moving
    pub delay: Duration,
    /// Travel time
    pub duration: Duration,
    /// Scale on arrival (starts at zero)
    pub end_scale: f32,
}

/// A background star
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Star {
    /// Resting position
    pub position: Point,
    /// Radius in pixels
    pub radius: f32,
    /// Twinkle phase offset in radians
    pub twinkle_phase: f32,
    /// Twinkle angular speed in radians per second
    pub twinkle_speed: f32,
    /// Peak opacity
    pub base_opacity: f32,
    /// Pending drift, cleared once the star has arrived
    pub drift: Option<Drift>,
}

impl Star {
    /// Opacity at `t` seconds
    #[must_use]
    pub fn twinkle(&self, t: f32) -> f32 {
        self.base_opacity * (0.5 + 0.5 * (t * self.twinkle_speed + self.twinkle_phase).sin())
    }
}

/// A dense region of the field
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Cluster {
    /// Center
    pub center: Point,
    /// Radius in normalized units
    pub radius: f32,
}

/// Pick cluster centers for a reseed
pub fn clusters(rng: &mut impl Rng) -> Vec<Cluster> {
    (0..CLUSTERS)
        .map(|_| Cluster {
            center: Point::new(rng.gen(), rng.gen()),
            radius: rng.gen_range(0.15..0.35),
        })
        .collect()
}

/// Sample a resting position: clustered with [`CLUSTER_SHARE`], else uniform
pub fn sample_position(rng: &mut impl Rng, clusters: &[Cluster]) -> Point {
    if clusters.is_empty() || !rng.gen_bool(CLUSTER_SHARE) {
        return Point::new(rng.gen(), rng.gen());
    }

    let cluster = clusters[rng.gen_range(0..clusters.len())];
    let mut candidate = cluster.center;
    for _ in 0..CLUSTER_RETRIES {
        let angle = rng.gen_range(0.0..TAU);
        let distance = rng.gen_range(0.0..=cluster.radius);
        candidate = Point::new(
            cluster.center.x + angle.cos() * distance,
            cluster.center.y + angle.sin() * distance,
        );
        if candidate.in_bounds() {
            return candidate;
        }
    }
    candidate.clamped()
}

/// Drift parameters for the star at `index` resting at `position`
///
/// Stars near the origin travel for less time than stars near the edges.
#[must_use]
pub fn drift_for(index: usize, position: Point, config: &StarFieldConfig) -> Drift {
    let normalized = (position.distance(ORIGIN) / MAX_DISTANCE).clamp(0.0, 1.0);
    let base = Duration::try_from_secs_f32(config.base_duration).unwrap_or_default();
    #[allow(clippy::cast_precision_loss)]
    let delay = Duration::try_from_secs_f32(index as f32 * config.stream_delay).unwrap_or_default();
    Drift {
        delay,
        duration: base + DRIFT_SPREAD.mul_f32(normalized),
        end_scale: config.end_scale.min(MAX_END_SCALE),
    }
}

/// Generate the star at `index`
///
/// `drift` decides whether the star travels out from the origin or starts at
/// rest.
pub fn star(
    rng: &mut impl Rng,
    index: usize,
    clusters: &[Cluster],
    config: &StarFieldConfig,
    drift: bool,
) -> Star {
    let sample = sample_position(rng, clusters);
    let position = ORIGIN.lerp(sample, config.distance_multiplier);
    let diameter = (config.star_size * 0.75).min(MAX_STAR_SIZE);
    Star {
        position,
        radius: diameter * 0.5 * rng.gen_range(0.6..=1.0),
        twinkle_phase: rng.gen_range(0.0..TAU),
        twinkle_speed: rng.gen_range(0.3..=1.0),
        base_opacity: rng.gen_range(0.4..=1.0),
        drift: drift.then(|| drift_for(index, position, config)),
    }
}

/// Lifetime of a burst star
pub const BURST_LIFETIME: Duration = Duration::from_secs(2);

/// Stars per burst
pub const BURST_SIZE: usize = 30;

/// A short-lived star flung out from a point
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BurstStar {
    /// Where it was emitted
    pub origin: Point,
    /// Where it ends up
    pub target: Point,
    /// Emission time
    pub born: Duration,
    /// Scale on arrival
    pub end_scale: f32,
}

/// Generate one burst star emitted from `origin` at `now`
pub fn burst_star(
    rng: &mut impl Rng,
    origin: Point,
    now: Duration,
    config: &StarFieldConfig,
) -> BurstStar {
    let angle = rng.gen_range(0.0..TAU);
    let distance = rng.gen_range(0.30..=0.50) * config.distance_multiplier;
    BurstStar {
        origin,
        target: Point::new(
            origin.x + angle.cos() * distance,
            origin.y + angle.sin() * distance,
        ),
        born: now,
        end_scale: config.end_scale.min(MAX_END_SCALE),
    }
}
