//! Simulation state and the per-tick update.
//!
//! The [`World`] owns the single [`Player`] and every live [`Bullet`]. Each
//! call to [`update`](World::update) runs two phases in order:
//!
//! 1. **Player**: steer from the move axes, aim at the pointer, integrate,
//!    wrap at the world bounds, damp velocity, tick the fire cooldown down.
//! 2. **Bullets**: integrate every bullet, flag those outside the cull radius,
//!    then sweep the flagged ones in one pass.
//!
//! Firing is not polled. The world subscribes to the [`InputManager`] when it
//! is built and reacts to `AttackPrimary` events in
//! [`process_input`](World::process_input).

use glam::Vec2;
use serde::{Deserialize, Serialize};
use tracing::debug;
use zif_store::prelude::*;

use crate::audio::{AudioSink, SoundId};
use crate::input::{InputAction, InputManager, SubscriberId};
use crate::math::{lerp, safe_normalize, wrap_axis};
use crate::EngineError;

// ---------------------------------------------------------------------------
// WorldConfig
// ---------------------------------------------------------------------------

/// Tunable constants of the simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Half-size of the play area. The player wraps at `±bounds` per axis.
    pub bounds: Vec2,
    /// Bullets farther than this from the origin are removed.
    pub cull_radius: f32,
    /// Seconds between shots.
    pub fire_interval: f64,
    /// Bullet speed in world units per second.
    pub bullet_speed: f32,
    /// Rate at which player velocity decays toward zero, per second.
    pub velocity_damping: f32,
    /// Steering input is divided by this while `SpeedChange` is held.
    pub slow_move_divisor: f32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            bounds: Vec2::new(6.0, 4.0),
            cull_radius: 100.0,
            fire_interval: 1.0 / 8.0,
            bullet_speed: 20.0,
            velocity_damping: 4.0,
            slow_move_divisor: 2.0,
        }
    }
}

impl WorldConfig {
    /// Parse a JSON object of overrides. Missing fields keep their defaults.
    ///
    /// # Errors
    ///
    /// [`EngineError::ConfigParse`] on malformed JSON, or
    /// [`EngineError::InvalidConfig`] if a value fails [`validate`](Self::validate).
    pub fn from_json_str(json: &str) -> Result<Self, EngineError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check every field is usable.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidConfig`] naming the first bad field.
    pub fn validate(&self) -> Result<(), EngineError> {
        let invalid = |field: &'static str, reason: &str| EngineError::InvalidConfig {
            field,
            reason: reason.to_owned(),
        };

        if !(self.bounds.x > 0.0 && self.bounds.y > 0.0 && self.bounds.is_finite()) {
            return Err(invalid("world.bounds", "must be positive and finite"));
        }
        if !(self.cull_radius > 0.0 && self.cull_radius.is_finite()) {
            return Err(invalid("world.cull_radius", "must be positive and finite"));
        }
        if !(self.fire_interval >= 0.0 && self.fire_interval.is_finite()) {
            return Err(invalid("world.fire_interval", "must be non-negative and finite"));
        }
        if !self.bullet_speed.is_finite() {
            return Err(invalid("world.bullet_speed", "must be finite"));
        }
        if !(self.velocity_damping >= 0.0 && self.velocity_damping.is_finite()) {
            return Err(invalid("world.velocity_damping", "must be non-negative and finite"));
        }
        if !(self.slow_move_divisor > 0.0 && self.slow_move_divisor.is_finite()) {
            return Err(invalid("world.slow_move_divisor", "must be positive and finite"));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Entities
// ---------------------------------------------------------------------------

/// Position and facing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec2,
    /// Unit facing vector, or zero when the pointer sits on the player.
    pub direction: Vec2,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            direction: Vec2::X,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Player {
    pub transform: Transform,
    pub velocity: Vec2,
    /// Seconds until the next shot is allowed. Never negative.
    pub bullet_cooldown: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Bullet {
    pub transform: Transform,
    pub velocity: Vec2,
}

// ---------------------------------------------------------------------------
// WorldSnapshot
// ---------------------------------------------------------------------------

/// Plain copy of the simulation state, bullets in storage order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    pub player: Player,
    pub bullets: Vec<Bullet>,
}

impl WorldSnapshot {
    /// BLAKE3 hex digest of the JSON encoding.
    pub fn hash(&self) -> String {
        let json_bytes =
            serde_json::to_vec(self).expect("WorldSnapshot should always be JSON-serializable");
        blake3::hash(&json_bytes).to_hex().to_string()
    }
}

// ---------------------------------------------------------------------------
// WorldView
// ---------------------------------------------------------------------------

/// Read-only view handed to renderers for the duration of one render call.
#[derive(Debug, Clone, Copy)]
pub struct WorldView<'a> {
    player: &'a Player,
    bullets: &'a SparseSet<Spawned<Bullet>>,
}

impl<'a> WorldView<'a> {
    pub fn player_transform(&self) -> &'a Transform {
        &self.player.transform
    }

    pub fn bullet_transforms(&self) -> impl Iterator<Item = &'a Transform> + 'a {
        self.bullets.iter().map(|(_, bullet)| &bullet.value.transform)
    }

    pub fn bullet_count(&self) -> usize {
        self.bullets.len()
    }
}

// ---------------------------------------------------------------------------
// World
// ---------------------------------------------------------------------------

/// Owns the player and the bullets, and advances them one fixed tick at a
/// time.
pub struct World {
    config: WorldConfig,
    player: Player,
    bullets: SparseSet<Spawned<Bullet>>,
    audio: Box<dyn AudioSink>,
    subscription: SubscriberId,
}

impl World {
    /// Create a world and subscribe it to `input`'s action events.
    pub fn new(config: WorldConfig, input: &mut InputManager, audio: Box<dyn AudioSink>) -> Self {
        Self {
            config,
            player: Player::default(),
            bullets: SparseSet::new(),
            audio,
            subscription: input.subscribe(),
        }
    }

    /// Put the player and bullets back to their initial state.
    ///
    /// Events already waiting in the world's mailbox are not touched; callers
    /// that reset mid-frame should also clear them with
    /// [`InputManager::clear_events`] using [`subscription`](Self::subscription).
    pub fn reset(&mut self) {
        debug!(bullets = self.bullets.len(), "world reset");
        self.player = Player::default();
        self.bullets.clear();
    }

    /// Handle every action event waiting in the world's mailbox, in order.
    pub fn process_input(&mut self, input: &mut InputManager) {
        while let Some(action) = input.poll_event(self.subscription) {
            self.on_action_pressed(action);
        }
    }

    /// Advance the simulation by one fixed step of `delta_seconds`.
    pub fn update(&mut self, delta_seconds: f64, input: &InputManager) {
        self.update_player(delta_seconds, input);
        self.update_bullets(delta_seconds);
    }

    /// Add a bullet and play the fire sound.
    pub fn spawn_bullet(&mut self, bullet: Bullet) -> SparseIndex {
        let index = self.bullets.add(Spawned::new(bullet));
        self.audio.play_sound(SoundId::PlayerShoot);
        debug!(%index, position = ?bullet.transform.position, "bullet spawned");
        index
    }

    // -- accessors ----------------------------------------------------------

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn bullets(&self) -> &SparseSet<Spawned<Bullet>> {
        &self.bullets
    }

    /// The mailbox this world drains in [`process_input`](Self::process_input).
    pub fn subscription(&self) -> SubscriberId {
        self.subscription
    }

    pub fn view(&self) -> WorldView<'_> {
        WorldView {
            player: &self.player,
            bullets: &self.bullets,
        }
    }

    pub fn snapshot(&self) -> WorldSnapshot {
        WorldSnapshot {
            player: self.player,
            bullets: self.bullets.iter().map(|(_, b)| b.value).collect(),
        }
    }

    /// BLAKE3 hex digest of [`snapshot`](Self::snapshot).
    pub fn state_hash(&self) -> String {
        self.snapshot().hash()
    }

    // -- update phases ------------------------------------------------------

    fn update_player(&mut self, delta_seconds: f64, input: &InputManager) {
        let dt = delta_seconds as f32;
        let player = &mut self.player;

        let mut steer = safe_normalize(input.move_axes());
        if input.is_action_pressed(InputAction::SpeedChange) {
            steer /= self.config.slow_move_divisor;
        }
        player.velocity += steer;

        player.transform.direction =
            safe_normalize(input.pointer_world_position() - player.transform.position);
        player.transform.position += player.velocity * dt;

        let bounds = self.config.bounds;
        player.transform.position.x = wrap_axis(player.transform.position.x, bounds.x);
        player.transform.position.y = wrap_axis(player.transform.position.y, bounds.y);

        player.velocity = lerp(player.velocity, Vec2::ZERO, self.config.velocity_damping * dt);
        player.bullet_cooldown = (player.bullet_cooldown - delta_seconds).max(0.0);
    }

    fn update_bullets(&mut self, delta_seconds: f64) {
        let dt = delta_seconds as f32;
        let max_distance_squared = self.config.cull_radius * self.config.cull_radius;

        for (_, bullet) in self.bullets.iter_mut() {
            bullet.value.transform.position += bullet.value.velocity * dt;

            if bullet.value.transform.position.length_squared() > max_distance_squared {
                bullet.flag_for_deletion();
            }
        }

        let culled = self.bullets.remove_all(Spawned::is_flagged_for_deletion);
        if culled > 0 {
            debug!(culled, remaining = self.bullets.len(), "bullets culled");
        }
    }

    fn on_action_pressed(&mut self, action: InputAction) {
        if action != InputAction::AttackPrimary || self.player.bullet_cooldown > 0.0 {
            return;
        }

        let transform = self.player.transform;
        self.spawn_bullet(Bullet {
            transform: Transform {
                position: transform.position + transform.direction,
                ..transform
            },
            velocity: transform.direction * self.config.bullet_speed,
        });
        self.player.bullet_cooldown = self.config.fire_interval;
    }
}

impl std::fmt::Debug for World {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("World")
            .field("config", &self.config)
            .field("player", &self.player)
            .field("bullets", &self.bullets.len())
            .field("subscription", &self.subscription)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
