//! Balafon library - Percussive tone synthesis, caching and analysis

pub mod audio;
pub mod cli;
pub mod engine;
pub mod error;
pub mod keymap;
pub mod params;
pub mod pitch;
pub mod scale;
pub mod store;

pub use engine::{Engine, SavedTake};
