//! Star Field Settings and Presets

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Upper bound on stars per field
pub const MAX_STARS: usize = 4000;

/// Largest star diameter in pixels; anything bigger reads as a dot, not a star
pub const MAX_STAR_SIZE: f32 = 4.0;

/// Largest scale a drifting star may grow to
pub const MAX_END_SCALE: f32 = 1.5;

/// Parameters of a star field
///
/// Each field owns its own copy; changing settings means calling
/// [`StarField::configure`](super::StarField::configure) with a new value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StarFieldConfig {
    /// Number of stars
    pub count: usize,
    /// Base drift duration in seconds
    pub base_duration: f32,
    /// Star diameter in pixels
    pub star_size: f32,
    /// Delay between consecutive stars starting their drift, in seconds
    pub stream_delay: f32,
    /// How far stars travel relative to their resting offset from the origin
    pub distance_multiplier: f32,
    /// Scale reached at the end of the drift
    pub end_scale: f32,
    /// Whether stars drift out from the origin after a reseed
    pub drift: bool,
}

impl Default for StarFieldConfig {
    fn default() -> Self {
        Self {
            count: 600,
            base_duration: 6.0,
            star_size: 4.0,
            stream_delay: 0.02,
            distance_multiplier: 1.0,
            end_scale: 1.5,
            drift: true,
        }
    }
}

impl StarFieldConfig {
    /// Clamp every value into its valid range
    ///
    /// Returns the sanitized config and whether anything had to change.
    #[must_use]
    pub fn sanitized(&self) -> (Self, bool) {
        let clean = Self {
            count: self.count.min(MAX_STARS),
            base_duration: non_negative(self.base_duration),
            star_size: non_negative(self.star_size).min(MAX_STAR_SIZE),
            stream_delay: non_negative(self.stream_delay),
            distance_multiplier: non_negative(self.distance_multiplier),
            end_scale: non_negative(self.end_scale).min(MAX_END_SCALE),
            drift: self.drift,
        };
        let changed = clean != *self;
        (clean, changed)
    }

    /// Use a different star count
    #[must_use]
    pub fn with_count(mut self, count: usize) -> Self {
        self.count = count;
        self
    }

    /// Enable or disable drift
    #[must_use]
    pub fn with_drift(mut self, drift: bool) -> Self {
        self.drift = drift;
        self
    }
}

fn non_negative(value: f32) -> f32 {
    if value.is_finite() {
        value.max(0.0)
    } else {
        0.0
    }
}

/// Named settings from the star control panel
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StarPreset {
    /// Many small stars
    Dense,
    /// Short drift, wide travel
    Fast,
    /// Long drift, short travel
    Slow,
    /// Few large stars, gentle stream
    Subtle,
    /// Maximum density and travel
    Intense,
    /// Back to defaults
    Reset,
}

impl StarPreset {
    /// Every preset, in control-panel order
    pub const ALL: [StarPreset; 6] = [
        StarPreset::Dense,
        StarPreset::Fast,
        StarPreset::Slow,
        StarPreset::Subtle,
        StarPreset::Intense,
        StarPreset::Reset,
    ];

    /// Preset name as used in config files and environment variables
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Dense => "dense",
            Self::Fast => "fast",
            Self::Slow => "slow",
            Self::Subtle => "subtle",
            Self::Intense => "intense",
            Self::Reset => "reset",
        }
    }

    /// The preset after this one, wrapping around
    #[must_use]
    pub fn next(self) -> Self {
        let index = Self::ALL.iter().position(|p| *p == self).unwrap_or(0);
        Self::ALL[(index + 1) % Self::ALL.len()]
    }

    /// Settings for this preset
    ///
    /// Values the control panel allowed beyond the field's limits are kept as
    /// written; [`StarFieldConfig::sanitized`] clamps them on configure.
    #[must_use]
    pub fn config(self) -> StarFieldConfig {
        let base = StarFieldConfig::default();
        match self {
            Self::Dense => StarFieldConfig {
                count: 1500,
                base_duration: 6.0,
                star_size: 1.5,
                stream_delay: 0.015,
                distance_multiplier: 2.5,
                end_scale: 4.0,
                ..base
            },
            Self::Fast => StarFieldConfig {
                count: 1000,
                base_duration: 2.5,
                star_size: 1.8,
                stream_delay: 0.01,
                distance_multiplier: 3.0,
                end_scale: 5.0,
                ..base
            },
            Self::Slow => StarFieldConfig {
                count: 600,
                base_duration: 10.0,
                star_size: 1.0,
                stream_delay: 0.03,
                distance_multiplier: 1.5,
                end_scale: 2.5,
                ..base
            },
            Self::Subtle => StarFieldConfig {
                count: 400,
                base_duration: 8.0,
                star_size: 3.0,
                stream_delay: 0.04,
                distance_multiplier: 2.0,
                end_scale: 2.0,
                ..base
            },
            Self::Intense => StarFieldConfig {
                count: 2000,
                base_duration: 3.0,
                star_size: 2.0,
                stream_delay: 0.008,
                distance_multiplier: 4.0,
                end_scale: 6.0,
                ..base
            },
            Self::Reset => base,
        }
    }
}

impl fmt::Display for StarPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error for an unrecognized preset name
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("unknown star preset '{0}' (expected dense, fast, slow, subtle, intense or reset)")]
pub struct UnknownPreset(pub String);

impl FromStr for StarPreset {
    type Err = UnknownPreset;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|preset| preset.name() == wanted)
            .ok_or_else(|| UnknownPreset(s.to_string()))
    }
}
