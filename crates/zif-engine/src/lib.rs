//! ZIF Engine -- deterministic simulation core for the Zero Insertion Force
//! shooter.
//!
//! This crate builds on [`zif_store`] to provide a single-player top-down
//! simulation: a player that moves, aims at the pointer and fires bullets in a
//! wrapping arena, driven by a fixed-timestep clock. Every live session is
//! recorded tick by tick and can be replayed in place with bit-identical
//! results.
//!
//! Windowing, drawing and sound output stay outside the core behind the
//! [`InputSource`](input::InputSource), [`Renderer`](render::Renderer) and
//! [`AudioSink`](audio::AudioSink) traits.
//!
//! # Quick Start
//!
//! ```
//! use zif_engine::prelude::*;
//!
//! let mut input = InputManager::new();
//! let mut world = World::new(WorldConfig::default(), &mut input, Box::new(NullAudio));
//!
//! input.simulate_input_action(InputAction::AttackPrimary);
//! world.process_input(&mut input);
//! world.update(1.0 / 30.0, &input);
//!
//! assert_eq!(world.bullets().len(), 1);
//! ```

#![deny(unsafe_code)]

pub mod audio;
pub mod command;
pub mod config;
pub mod device;
pub mod input;
pub mod math;
pub mod render;
pub mod replay;
pub mod tick;
pub mod world;

// ---------------------------------------------------------------------------
// Re-exports
// ---------------------------------------------------------------------------

/// Re-export the store crate for convenience.
pub use zif_store;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors produced while setting up the engine.
///
/// Nothing in the per-frame path returns an error; once a [`Game`](tick::Game)
/// is built it runs until the input source asks to quit.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// A configuration value is out of range.
    #[error("invalid config `{field}`: {reason}")]
    InvalidConfig { field: &'static str, reason: String },

    /// A configuration document could not be parsed.
    #[error("failed to parse config: {0}")]
    ConfigParse(#[from] serde_json::Error),

    /// An external device failed to initialise.
    #[error("failed to acquire {device}: {reason}")]
    Device { device: &'static str, reason: String },
}

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

/// Convenience re-exports for common engine usage.
pub mod prelude {
    pub use zif_store::prelude::*;

    pub use glam::Vec2;

    pub use crate::audio::{AudioSink, NullAudio, SoundId, SoundLog};
    pub use crate::command::{Command, CommandSequence};
    pub use crate::config::GameConfig;
    pub use crate::device::{Device, ScopedDevice};
    pub use crate::input::{InputAction, InputManager, InputSource, LevelState, SubscriberId};
    pub use crate::render::{NullRenderer, Renderer};
    pub use crate::replay::{ReplayController, ReplayDivergence, ReplayMode, ReplayReport};
    pub use crate::tick::{FrameReport, Game, SimulationClock, TickConfig};
    pub use crate::world::{
        Bullet, Player, Transform, World, WorldConfig, WorldSnapshot, WorldView,
    };
    pub use crate::EngineError;
}
