//! Animation Drivers - Held Transform State
//!
//! Surfaces never report back what scale an element is "currently" at.
//! Instead the core owns a [`ScaleDriver`] per animated element and evaluates
//! it every frame. The driver's `current_scale` is the single source of truth
//! for where an element is, so a hover or click can resume from wherever the
//! breathing pulse happened to be.
//!
//! # Motions
//!
//! ```text
//! Hold ──pulse()──► Pulse ──tween_to()──► Tween ──(done)──► Hold | Pulse
//! ```

mod timing;

pub use timing::{lerp, progress, EasingFunction, Tween};

use std::f32::consts::TAU;
use std::time::Duration;

/// Minimum scale change worth reporting to a surface
const SCALE_EPSILON: f32 = 1e-4;

/// What a driver does once its tween finishes
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum AfterTween {
    /// Stay at the tween's final value
    Hold,
    /// Resume breathing around the tween's final value
    Pulse {
        /// Relative pulse amplitude (0.06 = grows 6% at the peak)
        amplitude: f32,
        /// Full pulse period
        period: Duration,
    },
}

/// Current motion of a driver
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Motion {
    /// Static
    Hold,
    /// Periodic breathing around `base`
    Pulse {
        /// Resting scale
        base: f32,
        /// Relative amplitude
        amplitude: f32,
        /// Full period
        period: Duration,
        /// When the pulse (re)started
        since: Duration,
    },
    /// One-shot interpolation
    Tween {
        /// The interpolation
        tween: Tween,
        /// What happens when it completes
        then: AfterTween,
    },
}

/// Result of advancing a driver by one frame
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DriverStep {
    /// Scale after the update
    pub scale: f32,
    /// Whether the scale moved enough to be worth rendering
    pub changed: bool,
    /// Whether a tween finished during this update
    pub settled: bool,
}

/// Drives one element's scale and remembers where it is
#[derive(Clone, Debug)]
pub struct ScaleDriver {
    current: f32,
    motion: Motion,
}

impl ScaleDriver {
    /// Create a static driver at `initial`
    #[must_use]
    pub fn new(initial: f32) -> Self {
        Self {
            current: initial,
            motion: Motion::Hold,
        }
    }

    /// The held current scale
    #[must_use]
    pub fn current_scale(&self) -> f32 {
        self.current
    }

    /// The active motion
    #[must_use]
    pub fn motion(&self) -> Motion {
        self.motion
    }

    /// Whether a tween is in flight
    #[must_use]
    pub fn is_tweening(&self) -> bool {
        matches!(self.motion, Motion::Tween { .. })
    }

    /// Start breathing around the current scale
    pub fn pulse(&mut self, amplitude: f32, period: Duration, now: Duration) {
        self.motion = Motion::Pulse {
            base: self.current,
            amplitude: amplitude.max(0.0),
            period,
            since: now,
        };
    }

    /// Tween from the current scale to `target`
    ///
    /// A zero duration snaps on the next [`update`](Self::update), which also
    /// reports the tween as settled.
    pub fn tween_to(
        &mut self,
        target: f32,
        now: Duration,
        duration: Duration,
        easing: EasingFunction,
        then: AfterTween,
    ) {
        let tween = Tween::new(self.current, target, now, duration).with_easing(easing);
        self.motion = Motion::Tween { tween, then };
    }

    /// Freeze at the current scale
    pub fn hold(&mut self) {
        self.motion = Motion::Hold;
    }

    /// Jump to `scale` and hold there
    pub fn snap(&mut self, scale: f32) {
        self.current = scale;
        self.motion = Motion::Hold;
    }

    /// Evaluate the driver at `now`
    pub fn update(&mut self, now: Duration) -> DriverStep {
        let previous = self.current;
        let mut settled = false;

        match self.motion {
            Motion::Hold => {}
            Motion::Pulse {
                base,
                amplitude,
                period,
                since,
            } => {
                self.current = pulse_value(base, amplitude, period, now.saturating_sub(since));
            }
            Motion::Tween { tween, then } => {
                self.current = tween.value_at(now);
                if tween.is_complete(now) {
                    self.current = tween.to;
                    settled = true;
                    self.motion = match then {
                        AfterTween::Hold => Motion::Hold,
                        AfterTween::Pulse { amplitude, period } => Motion::Pulse {
                            base: tween.to,
                            amplitude,
                            period,
                            since: now,
                        },
                    };
                }
            }
        }

        DriverStep {
            scale: self.current,
            changed: (self.current - previous).abs() > SCALE_EPSILON,
            settled,
        }
    }
}

/// Breathing curve: starts at `base`, peaks at `base * (1 + amplitude)`
fn pulse_value(base: f32, amplitude: f32, period: Duration, elapsed: Duration) -> f32 {
    if period.is_zero() {
        return base;
    }
    let phase = (elapsed.as_secs_f32() / period.as_secs_f32()).fract();
    let swell = 0.5 - 0.5 * (phase * TAU).cos();
    base * (1.0 + amplitude * swell)
}
