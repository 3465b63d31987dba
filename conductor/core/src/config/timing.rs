//! Narrative Timing
//!
//! Every delay the sequencer uses, by name. Values arrive from TOML or the
//! environment in whatever shape a person typed them; anything that does not
//! parse to a non-negative finite duration keeps its default.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Named narrative durations
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimingConfig {
    /// Intro group fade; the stagger step is `fade + gap`
    pub fade: Duration,
    /// Extra stagger between intro groups
    pub gap: Duration,
    /// Hold after the last intro group before breathing
    pub hold: Duration,
    /// Intro push-away rise
    pub rise: Duration,
    /// Intro push-away
    pub push: Duration,
    /// Fade-in of the hint and the ask button
    pub appear: Duration,
    /// Crossfade into the revealed screen
    pub crossfade: Duration,
    /// Delay inside breathing before the hint shows
    pub hint: Duration,
    /// Breathing pulse period
    pub pulse: Duration,
    /// Hover scale tween
    pub hover: Duration,
    /// Post-expand delay before the reveal
    pub expand: Duration,
    /// Box growth tween
    pub box_growth: Duration,
    /// Icon growth tween
    pub icon_growth: Duration,
    /// Delay between asking and the chat starting
    pub ask: Duration,
    /// Thinking pause between the question and the answer
    pub pause: Duration,
    /// Per-character delay of the question
    pub type_speed: Duration,
    /// Total reveal time of the answer
    pub total_duration: Duration,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            fade: Duration::from_millis(1200),
            gap: Duration::ZERO,
            hold: Duration::from_millis(3000),
            rise: Duration::from_millis(950),
            push: Duration::from_millis(700),
            appear: Duration::from_millis(450),
            crossfade: Duration::from_millis(600),
            hint: Duration::from_millis(1200),
            pulse: Duration::from_millis(3690),
            hover: Duration::from_millis(500),
            expand: Duration::from_millis(2000),
            box_growth: Duration::from_millis(6000),
            icon_growth: Duration::from_millis(3000),
            ask: Duration::from_millis(800),
            pause: Duration::from_millis(1200),
            type_speed: Duration::from_millis(80),
            total_duration: Duration::from_millis(4000),
        }
    }
}

impl TimingConfig {
    /// Every recognized key
    pub const KEYS: [&'static str; 17] = [
        "fade",
        "gap",
        "hold",
        "rise",
        "push",
        "appear",
        "crossfade",
        "hint",
        "pulse",
        "hover",
        "expand",
        "box_growth",
        "icon_growth",
        "ask",
        "pause",
        "type_speed",
        "total_duration",
    ];

    fn slot(&mut self, key: &str) -> Option<&mut Duration> {
        let slot = match normalize_key(key).as_str() {
            "fade" => &mut self.fade,
            "gap" => &mut self.gap,
            "hold" => &mut self.hold,
            "rise" => &mut self.rise,
            "push" => &mut self.push,
            "appear" => &mut self.appear,
            "crossfade" => &mut self.crossfade,
            "hint" => &mut self.hint,
            "pulse" => &mut self.pulse,
            "hover" => &mut self.hover,
            "expand" => &mut self.expand,
            "box_growth" => &mut self.box_growth,
            "icon_growth" => &mut self.icon_growth,
            "ask" => &mut self.ask,
            "pause" => &mut self.pause,
            "type_speed" => &mut self.type_speed,
            "total_duration" => &mut self.total_duration,
            _ => return None,
        };
        Some(slot)
    }

    /// Every `(key, duration)` pair, in [`KEYS`](Self::KEYS) order
    #[must_use]
    pub fn entries(&self) -> [(&'static str, Duration); 17] {
        [
            ("fade", self.fade),
            ("gap", self.gap),
            ("hold", self.hold),
            ("rise", self.rise),
            ("push", self.push),
            ("appear", self.appear),
            ("crossfade", self.crossfade),
            ("hint", self.hint),
            ("pulse", self.pulse),
            ("hover", self.hover),
            ("expand", self.expand),
            ("box_growth", self.box_growth),
            ("icon_growth", self.icon_growth),
            ("ask", self.ask),
            ("pause", self.pause),
            ("type_speed", self.type_speed),
            ("total_duration", self.total_duration),
        ]
    }

    /// Look up a duration by key
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Duration> {
        let key = normalize_key(key);
        self.entries()
            .into_iter()
            .find(|(name, _)| *name == key)
            .map(|(_, duration)| duration)
    }

    /// Set a duration by key. Returns `false` for unknown keys.
    pub fn set(&mut self, key: &str, value: Duration) -> bool {
        match self.slot(key) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    /// Apply a TOML value to `key`, keeping the current value when it does
    /// not parse
    pub fn apply_value(&mut self, key: &str, value: &toml::Value) -> TimingUpdate {
        let Some(slot) = self.slot(key) else {
            return TimingUpdate::UnknownKey;
        };
        match parse_duration_value(value) {
            Some(duration) => {
                *slot = duration;
                TimingUpdate::Applied
            }
            None => TimingUpdate::Invalid,
        }
    }

    /// Apply a raw string (environment variable) to `key`
    pub fn apply_str(&mut self, key: &str, value: &str) -> TimingUpdate {
        let Some(slot) = self.slot(key) else {
            return TimingUpdate::UnknownKey;
        };
        match parse_duration_str(value) {
            Some(duration) => {
                *slot = duration;
                TimingUpdate::Applied
            }
            None => TimingUpdate::Invalid,
        }
    }

    /// Stagger step between intro groups
    #[must_use]
    pub fn stagger(&self) -> Duration {
        self.fade.saturating_add(self.gap)
    }
}

/// Outcome of applying one timing value
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimingUpdate {
    /// Value stored
    Applied,
    /// Key recognized, value unparsable; default kept
    Invalid,
    /// Key not recognized
    UnknownKey,
}

/// Accept `typeSpeed`, `type-speed` and `type_speed` alike
fn normalize_key(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);
    for ch in key.trim().chars() {
        if ch == '-' {
            out.push('_');
        } else if ch.is_ascii_uppercase() {
            out.push('_');
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

/// Milliseconds to a duration, rejecting negative and non-finite values
fn from_millis_f64(ms: f64) -> Option<Duration> {
    if ms.is_finite() && ms >= 0.0 {
        Duration::try_from_secs_f64(ms / 1000.0).ok()
    } else {
        None
    }
}

/// Parse a TOML duration: integer or float milliseconds, or a string
#[must_use]
pub fn parse_duration_value(value: &toml::Value) -> Option<Duration> {
    match value {
        toml::Value::Integer(ms) => u64::try_from(*ms).ok().map(Duration::from_millis),
        toml::Value::Float(ms) => from_millis_f64(*ms),
        toml::Value::String(s) => parse_duration_str(s),
        _ => None,
    }
}

/// Parse `"450"`, `"450ms"`, `"1.2s"` or `"0.5 s"`
///
/// Bare numbers are milliseconds.
#[must_use]
pub fn parse_duration_str(value: &str) -> Option<Duration> {
    let value = value.trim().to_lowercase();
    let (number, scale) = if let Some(ms) = value.strip_suffix("ms") {
        (ms, 1.0)
    } else if let Some(secs) = value.strip_suffix('s') {
        (secs, 1000.0)
    } else {
        (value.as_str(), 1.0)
    };
    let number: f64 = number.trim().parse().ok()?;
    from_millis_f64(number * scale)
}
