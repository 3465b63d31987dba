//! Easing and Tweening
//!
//! Frame-rate independent interpolation. A [`Tween`] is a parameterized
//! animation description evaluated at whatever time the driver asks for, so
//! no per-variant animation rules are ever synthesized or accumulated.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Easing functions for smooth animation
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum EasingFunction {
    /// No easing (constant speed)
    #[default]
    Linear,

    /// Slow start, fast end
    EaseIn,

    /// Fast start, slow end
    EaseOut,

    /// Slow start and end
    EaseInOut,

    /// Cubic ease out (star drift: fast start, long settle)
    EaseOutCubic,

    /// Cubic ease in and out (box and icon growth)
    EaseInOutCubic,
}

impl EasingFunction {
    /// Apply the easing function to a progress value (0.0 to 1.0)
    #[must_use]
    pub fn apply(self, t: f32) -> f32 {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };

        match self {
            Self::Linear => t,
            Self::EaseIn => t * t,
            Self::EaseOut => 1.0 - (1.0 - t).powi(2),
            Self::EaseInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }
            Self::EaseOutCubic => 1.0 - (1.0 - t).powi(3),
            Self::EaseInOutCubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
        }
    }
}

/// Progress of `elapsed` through `duration`, clamped to 0..=1
///
/// A zero duration is always complete.
#[must_use]
pub fn progress(elapsed: Duration, duration: Duration) -> f32 {
    if duration.is_zero() {
        return 1.0;
    }
    (elapsed.as_secs_f32() / duration.as_secs_f32()).clamp(0.0, 1.0)
}

/// Linear interpolation
#[must_use]
pub fn lerp(from: f32, to: f32, t: f32) -> f32 {
    from + (to - from) * t
}

/// A one-shot interpolation between two values
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tween {
    /// Starting value
    pub from: f32,
    /// Final value
    pub to: f32,
    /// When the tween started (driver time)
    pub start: Duration,
    /// Total duration (zero completes immediately)
    pub duration: Duration,
    /// Easing curve
    pub easing: EasingFunction,
}

impl Tween {
    /// Create a tween
    #[must_use]
    pub fn new(from: f32, to: f32, start: Duration, duration: Duration) -> Self {
        Self {
            from,
            to,
            start,
            duration,
            easing: EasingFunction::Linear,
        }
    }

    /// Set the easing curve
    #[must_use]
    pub fn with_easing(mut self, easing: EasingFunction) -> Self {
        self.easing = easing;
        self
    }

    /// Value at time `now`
    #[must_use]
    pub fn value_at(&self, now: Duration) -> f32 {
        let t = progress(now.saturating_sub(self.start), self.duration);
        lerp(self.from, self.to, self.easing.apply(t))
    }

    /// Whether the tween has reached its final value at `now`
    #[must_use]
    pub fn is_complete(&self, now: Duration) -> bool {
        now.saturating_sub(self.start) >= self.duration
    }

    /// When the tween reaches its final value
    #[must_use]
    pub fn end(&self) -> Duration {
        self.start.saturating_add(self.duration)
    }
}
