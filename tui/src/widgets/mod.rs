//! Custom widgets for the stage

pub mod stage;
pub mod stars;
pub mod text_block;

pub use stage::{StageLayout, StageView};
pub use stars::StarSky;
pub use text_block::{TextBlock, TextBlockState};
