//! Hydrant Conductor - Headless Stage Sequencing for Silver Hydrant
//!
//! This crate drives the animated landing stage: the staggered intro, the
//! breathing box, its expansion into the revealed screen, the typed chat
//! exchange and the star field behind it all. It is completely independent
//! of any UI framework and can drive a terminal, a web canvas or run headless
//! in tests.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                         Render Surfaces                          │
//! │   ┌─────────────┐   ┌─────────────┐   ┌────────────────────────┐ │
//! │   │     TUI     │   │  Web canvas │   │  Headless / Scene      │ │
//! │   │  (ratatui)  │   │             │   │                        │ │
//! │   └──────┬──────┘   └──────┬──────┘   └───────────┬────────────┘ │
//! │          └─────────────────┴──────────────────────┘              │
//! │                 hover / click / skip (up)                        │
//! │                 StageMessage + sprites (down)                    │
//! └──────────────────────────────┼───────────────────────────────────┘
//!                                │
//! ┌──────────────────────────────┼───────────────────────────────────┐
//! │                       CONDUCTOR CORE                             │
//! │  ┌───────────────────────────┴────────────────────────────────┐  │
//! │  │                     PhaseSequencer                         │  │
//! │  │  ┌────────────┐  ┌──────────────┐  ┌──────────┐  ┌───────┐ │  │
//! │  │  │ Scheduler  │  │  Typewriter  │  │ StarField│  │ Scale │ │  │
//! │  │  │ (timers)   │  │  Engine      │  │          │  │ Driver│ │  │
//! │  │  └────────────┘  └──────────────┘  └──────────┘  └───────┘ │  │
//! │  └────────────────────────────────────────────────────────────┘  │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Everything is single-threaded and cooperative. Nothing sleeps: every delay
//! is a continuation in a [`Scheduler`], and the owner calls `tick()` once per
//! frame with time taken from a [`Clock`].
//!
//! # Key Types
//!
//! - [`PhaseSequencer`]: The narrative state machine
//! - [`TypewriterEngine`]: Markup-aware character reveal
//! - [`StarField`]: Procedural twinkling background
//! - [`StageMessage`]: Messages sent from the core to render surfaces
//! - [`Scene`]: Reference surface model built from those messages
//! - [`StageConfig`]: Timing, star and motion settings
//!
//! # Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use hydrant_conductor::{load_config, MonotonicClock, PhaseSequencer};
//! use tokio::sync::mpsc;
//!
//! let config = load_config()?;
//! let (tx, mut rx) = mpsc::unbounded_channel();
//! let mut sequencer = PhaseSequencer::new(&config, Arc::new(MonotonicClock::new()), tx);
//! sequencer.start();
//!
//! loop {
//!     sequencer.tick();
//!     while let Ok(msg) = rx.try_recv() {
//!         // Render message to surface
//!     }
//!     // Draw sequencer.sprites(), forward input as hover()/trigger_expand()
//! }
//! ```
//!
//! # Module Overview
//!
//! - [`sequencer`]: Phase state machine and its continuations
//! - [`typewriter`]: Typewriter sessions and inline markup
//! - [`stars`]: Star field generation, drift, bursts and presets
//! - [`scheduler`]: Cancelable timer queue, generations and latches
//! - [`animation`]: Easing, tweens and held-scale drivers
//! - [`clock`]: Real and manual time sources
//! - [`messages`]: Messages from the core to surfaces
//! - [`scene`]: Surface-agnostic model of what is on stage
//! - [`scroll`]: Chat follow-scroll
//! - [`config`]: TOML file and environment configuration
//! - [`accessibility`]: Reduced motion support
//!
//! # No TUI Dependencies
//!
//! This crate has **zero** dependencies on ratatui, crossterm, or any other
//! UI framework. It's pure sequencing logic that can be used anywhere.

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod accessibility;
pub mod animation;
pub mod clock;
pub mod config;
pub mod messages;
pub mod scene;
pub mod scheduler;
pub mod scroll;
pub mod sequencer;
pub mod stars;
pub mod typewriter;

// Re-exports for convenience
pub use accessibility::{detect_motion_preference, parse_motion_preference, MotionPreference};
pub use animation::{AfterTween, EasingFunction, ScaleDriver, Tween};
pub use clock::{Clock, ManualClock, MonotonicClock};
pub use messages::{StageMessage, Target};
pub use scene::{Element, Scene};
pub use scheduler::{Generation, Latch, Scheduler, TimerId};
pub use scroll::FollowScroll;
pub use sequencer::{Cue, Phase, PhaseSequencer};
pub use stars::{Sprite, StarField, StarFieldConfig, StarPreset, Viewport};
pub use typewriter::{TypewriterEngine, TypewriterMode, TypewriterSession, TypewriterUpdate};

// Config exports
pub use config::{
    apply_env_overrides, default_config_path, load_config, load_config_from_path, parse_config,
    ConfigError, ConfigSource, StageConfig, StageCopy, StageToml, TimingConfig,
};
