//! Fixed-timestep simulation clock and the per-frame driver.
//!
//! Wall-clock time is accumulated into a lag budget. Each rendered frame:
//!
//! 1. Add the frame delta to the lag, clamped to `max_frame_skip` ticks. Any
//!    excess is discarded and logged.
//! 2. Sample input once (suspended while replaying) and dispatch its events.
//! 3. While at least one tick of lag remains: run the replayed commands for
//!    the tick (or record it when live), then update the world by exactly
//!    `fixed_dt`.
//! 4. Render once.
//!
//! # Example
//!
//! ```
//! use zif_engine::prelude::*;
//!
//! struct Idle;
//!
//! impl InputSource for Idle {
//!     fn is_action_active(&self, _action: InputAction) -> bool { false }
//!     fn pointer_world_position(&self) -> Vec2 { Vec2::ZERO }
//!     fn quit_requested(&self) -> bool { false }
//! }
//!
//! let mut game = Game::new(Idle, Box::new(NullAudio), GameConfig::default()).unwrap();
//!
//! // Two ticks' worth of wall time.
//! let report = game.frame(2.0 / 30.0);
//! assert_eq!(report.ticks_run, 2);
//! assert_eq!(game.tick_count(), 2);
//! ```

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::audio::AudioSink;
use crate::config::GameConfig;
use crate::input::{InputManager, InputSource};
use crate::render::Renderer;
use crate::replay::{ReplayController, ReplayReport};
use crate::world::{World, WorldView};
use crate::EngineError;

// ---------------------------------------------------------------------------
// TickConfig
// ---------------------------------------------------------------------------

/// Configuration for the fixed-timestep loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TickConfig {
    /// Seconds per tick. Must be positive and finite.
    pub fixed_dt: f64,
    /// Most ticks a single frame may catch up. Must be at least 1.
    pub max_frame_skip: u32,
}

impl Default for TickConfig {
    /// 30 Hz, catching up at most 30 ticks (one second) per frame.
    fn default() -> Self {
        Self {
            fixed_dt: 1.0 / 30.0,
            max_frame_skip: 30,
        }
    }
}

impl TickConfig {
    pub fn validate(&self) -> Result<(), EngineError> {
        if !(self.fixed_dt > 0.0 && self.fixed_dt.is_finite()) {
            return Err(EngineError::InvalidConfig {
                field: "tick.fixed_dt",
                reason: format!("must be positive and finite, got {}", self.fixed_dt),
            });
        }
        if self.max_frame_skip == 0 {
            return Err(EngineError::InvalidConfig {
                field: "tick.max_frame_skip",
                reason: "must be at least 1".to_owned(),
            });
        }
        Ok(())
    }

    /// Largest lag the clock will hold, in seconds.
    pub fn max_lag(&self) -> f64 {
        f64::from(self.max_frame_skip) * self.fixed_dt
    }
}

// ---------------------------------------------------------------------------
// SimulationClock
// ---------------------------------------------------------------------------

/// Lag accumulator for a fixed-timestep loop.
#[derive(Debug, Clone)]
pub struct SimulationClock {
    config: TickConfig,
    lag: f64,
}

impl SimulationClock {
    /// # Panics
    ///
    /// Panics if `config` does not pass [`TickConfig::validate`].
    pub fn new(config: TickConfig) -> Self {
        assert!(
            config.fixed_dt > 0.0 && config.fixed_dt.is_finite(),
            "fixed_dt must be positive and finite, got {}",
            config.fixed_dt
        );
        assert!(config.max_frame_skip > 0, "max_frame_skip must be at least 1");
        Self { config, lag: 0.0 }
    }

    /// Add a frame's wall-clock delta to the lag.
    ///
    /// Negative and NaN deltas count as zero. Returns the seconds discarded
    /// by the frame-skip cap, zero if none.
    pub fn accumulate(&mut self, wall_dt: f64) -> f64 {
        if wall_dt > 0.0 {
            self.lag += wall_dt;
        }

        let max_lag = self.config.max_lag();
        if self.lag <= max_lag {
            return 0.0;
        }

        let discarded = self.lag - max_lag;
        self.lag = max_lag;
        warn!(
            discarded_seconds = discarded,
            max_frame_skip = self.config.max_frame_skip,
            "frame skip cap reached, dropping lag"
        );
        discarded
    }

    /// Take one tick's worth of lag if available.
    pub fn try_consume_tick(&mut self) -> bool {
        if self.lag >= self.config.fixed_dt {
            self.lag -= self.config.fixed_dt;
            true
        } else {
            false
        }
    }

    pub fn lag(&self) -> f64 {
        self.lag
    }

    pub fn fixed_dt(&self) -> f64 {
        self.config.fixed_dt
    }

    pub fn config(&self) -> &TickConfig {
        &self.config
    }

    pub fn reset(&mut self) {
        self.lag = 0.0;
    }
}

// ---------------------------------------------------------------------------
// FrameReport
// ---------------------------------------------------------------------------

/// What one call to [`Game::frame`] did.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameReport {
    pub ticks_run: u32,
    /// Seconds of lag dropped by the frame-skip cap.
    pub lag_discarded: f64,
    /// A replay began this frame.
    pub replay_started: bool,
    /// A replay ended this frame.
    pub replay_finished: Option<ReplayReport>,
}

// ---------------------------------------------------------------------------
// Game
// ---------------------------------------------------------------------------

/// Owns the input manager, world, replay controller and clock, and runs them
/// in the fixed per-frame order.
pub struct Game<S: InputSource> {
    source: S,
    input: InputManager,
    world: World,
    replay: ReplayController,
    clock: SimulationClock,
    /// Ticks completed in the current session.
    tick: u64,
}

impl<S: InputSource> Game<S> {
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidConfig`] if `config` does not validate.
    pub fn new(
        source: S,
        audio: Box<dyn AudioSink>,
        config: GameConfig,
    ) -> Result<Self, EngineError> {
        config.validate()?;

        let mut input = InputManager::new();
        let world = World::new(config.world, &mut input, audio);
        let replay = ReplayController::new(&mut input, config.checkpoint_interval);
        info!(
            fixed_dt = config.tick.fixed_dt,
            max_frame_skip = config.tick.max_frame_skip,
            checkpoint_interval = config.checkpoint_interval,
            "recording session started"
        );

        Ok(Self {
            source,
            input,
            world,
            replay,
            clock: SimulationClock::new(config.tick),
            tick: 0,
        })
    }

    /// Run one wall-clock iteration, without rendering.
    pub fn frame(&mut self, wall_dt: f64) -> FrameReport {
        let lag_discarded = self.clock.accumulate(wall_dt);

        self.input.update(&self.source, self.replay.is_replaying());
        let replay_started = self.replay.capture_frame(&mut self.input, self.tick);
        if replay_started {
            self.replay.start_replay(&mut self.world, &mut self.input);
            self.tick = 0;
        }
        self.world.process_input(&mut self.input);

        let mut ticks_run = 0;
        let mut replay_finished = None;
        while self.clock.try_consume_tick() {
            if self.replay.is_replaying() {
                self.replay.execute_tick(self.tick, &mut self.input, &mut self.world);
            } else {
                self.replay.record_tick(self.tick, &self.input, &self.world);
            }

            self.world.update(self.clock.fixed_dt(), &self.input);
            self.tick += 1;
            ticks_run += 1;

            if self.replay.is_finished(self.tick) {
                replay_finished = Some(self.replay.finish_replay(&mut self.world, &mut self.input));
                self.tick = 0;
                // The rest of this frame's lag waits for a fresh input sample.
                break;
            }
        }

        FrameReport {
            ticks_run,
            lag_discarded,
            replay_started,
            replay_finished,
        }
    }

    /// Loop until the input source asks to quit, rendering once per frame.
    ///
    /// `now` returns a monotonic time in seconds. Returns the number of frames
    /// run.
    pub fn run(&mut self, mut now: impl FnMut() -> f64, renderer: &mut impl Renderer) -> u64 {
        let mut previous = now();
        let mut frames = 0;

        while !self.source.quit_requested() {
            let current = now();
            let frame_dt = current - previous;
            previous = current;

            self.frame(frame_dt);
            renderer.render(self.world.view(), frame_dt);
            frames += 1;
        }

        info!(frames, ticks = self.tick, "game loop stopped");
        frames
    }

    // -- accessors ----------------------------------------------------------

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    pub fn input(&self) -> &InputManager {
        &self.input
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn replay(&self) -> &ReplayController {
        &self.replay
    }

    pub fn clock(&self) -> &SimulationClock {
        &self.clock
    }

    /// Ticks completed in the current session. Restarts at zero when a replay
    /// starts or finishes.
    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    pub fn view(&self) -> WorldView<'_> {
        self.world.view()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
