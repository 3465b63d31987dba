//! Hydrant Stage - Terminal surface for the Silver Hydrant landing stage
//!
//! This crate plays the presentation driven by `hydrant-conductor` in a
//! full-screen terminal: a twinkling star sky, the breathing box, the
//! reveal screen and the typed chat.
//!
//! # Architecture
//!
//! - **App**: Event loop that feeds input to the sequencer and ticks it per frame
//! - **Widgets**: Star sky, stage view, borderless scrollable text blocks
//! - **Theme**: Night palette and opacity fading

pub mod app;
pub mod theme;
pub mod widgets;

pub use app::App;
