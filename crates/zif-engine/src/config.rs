//! Top-level game configuration.
//!
//! Every field has a default, so an empty JSON object is a valid config:
//!
//! ```
//! use zif_engine::config::GameConfig;
//!
//! let config = GameConfig::from_json_str(r#"{ "world": { "bullet_speed": 40.0 } }"#).unwrap();
//! assert_eq!(config.world.bullet_speed, 40.0);
//! assert_eq!(config.tick.max_frame_skip, 30);
//! ```

use serde::{Deserialize, Serialize};

use crate::tick::TickConfig;
use crate::world::WorldConfig;
use crate::EngineError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub tick: TickConfig,
    pub world: WorldConfig,
    /// Record a replay checkpoint every this many ticks. 0 disables them.
    pub checkpoint_interval: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            tick: TickConfig::default(),
            world: WorldConfig::default(),
            checkpoint_interval: 1,
        }
    }
}

impl GameConfig {
    /// Parse and validate a JSON config.
    ///
    /// # Errors
    ///
    /// [`EngineError::ConfigParse`] on malformed JSON or unknown value types,
    /// [`EngineError::InvalidConfig`] if a value is out of range.
    pub fn from_json_str(json: &str) -> Result<Self, EngineError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        self.tick.validate()?;
        self.world.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_is_default() {
        let config = GameConfig::from_json_str("{}").unwrap();
        assert_eq!(config, GameConfig::default());
    }

    #[test]
    fn malformed_json_is_parse_error() {
        let err = GameConfig::from_json_str("{ tick: ").unwrap_err();
        assert!(matches!(err, EngineError::ConfigParse(_)), "{err:?}");
    }

    #[test]
    fn out_of_range_value_is_invalid_config() {
        let err = GameConfig::from_json_str(r#"{ "tick": { "fixed_dt": 0.0 } }"#).unwrap_err();
        match err {
            EngineError::InvalidConfig { field, .. } => assert_eq!(field, "tick.fixed_dt"),
            other => panic!("expected InvalidConfig, got {other:?}"),
        }
    }

    #[test]
    fn world_overrides_keep_other_defaults() {
        let json = r#"{ "world": { "cull_radius": 50.0 }, "checkpoint_interval": 0 }"#;
        let config = GameConfig::from_json_str(json).unwrap();
        assert_eq!(config.world.cull_radius, 50.0);
        assert_eq!(config.world.fire_interval, 1.0 / 8.0);
        assert_eq!(config.checkpoint_interval, 0);
    }

    #[test]
    fn world_config_from_json() {
        let world = WorldConfig::from_json_str(r#"{ "bounds": [8.0, 5.0] }"#).unwrap();
        assert_eq!(world.bounds, glam::Vec2::new(8.0, 5.0));
        assert!(WorldConfig::from_json_str(r#"{ "slow_move_divisor": 0.0 }"#).is_err());
    }
}
