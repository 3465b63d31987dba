//! Reduced-Motion Accessibility
//!
//! Users who prefer reduced motion get the same narrative with the motion
//! taken out: every class/flag effect still happens, but transitions run with
//! zero duration and staggered intros collapse into a single synchronous step.
//!
//! # Motion Preferences
//!
//! - `Full`: normal animation playback
//! - `Reduced`: no staggers, zero-length transitions, stars still twinkle
//! - `None`: as `Reduced`, and the star field is static (no twinkle, drift
//!   or bursts)
//!
//! # Environment Variable Detection
//!
//! - `REDUCE_MOTION=1` or `REDUCE_MOTION=reduced` -> `MotionPreference::Reduced`
//! - `REDUCE_MOTION=none` or `REDUCE_MOTION=static` -> `MotionPreference::None`
//! - Unset or other values -> `MotionPreference::Full`

use std::env;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Environment variable consulted by [`detect_motion_preference`]
pub const REDUCE_MOTION_ENV: &str = "REDUCE_MOTION";

/// User preference for motion and animation
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MotionPreference {
    /// Full animation
    #[default]
    Full,
    /// Reduced motion - end states without transitions
    Reduced,
    /// No motion at all - also freezes the star field
    None,
}

impl MotionPreference {
    /// Whether the platform signals a reduced-motion preference
    #[must_use]
    pub fn prefers_reduced_motion(self) -> bool {
        !matches!(self, MotionPreference::Full)
    }

    /// Whether transitions should be animated
    #[must_use]
    pub fn allows_transitions(self) -> bool {
        matches!(self, MotionPreference::Full)
    }

    /// Whether ambient animation (twinkle, drift, bursts) may run
    #[must_use]
    pub fn allows_ambient_motion(self) -> bool {
        !matches!(self, MotionPreference::None)
    }

    /// Duration to use for a transition under this preference
    #[must_use]
    pub fn transition(self, duration: Duration) -> Duration {
        if self.allows_transitions() {
            duration
        } else {
            Duration::ZERO
        }
    }
}

/// Detect the motion preference from the `REDUCE_MOTION` environment variable
#[must_use]
pub fn detect_motion_preference() -> MotionPreference {
    match env::var(REDUCE_MOTION_ENV) {
        Ok(value) => parse_motion_preference(&value),
        Err(_) => MotionPreference::Full,
    }
}

/// Parse a motion preference value string
#[must_use]
pub fn parse_motion_preference(value: &str) -> MotionPreference {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "reduce" | "reduced" => MotionPreference::Reduced,
        "none" | "static" | "off" | "2" => MotionPreference::None,
        _ => MotionPreference::Full,
    }
}
