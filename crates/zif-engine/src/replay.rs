//! Session recording and in-place replay.
//!
//! The [`ReplayController`] has two modes:
//!
//! - [`ReplayMode::Live`]: every action event except `Replay` is recorded at
//!   the current tick as a command that re-injects it with
//!   [`InputManager::simulate_input_action`]. Before each live tick the held
//!   table and pointer sample are recorded too, along with a checkpoint hash
//!   of the world.
//! - [`ReplayMode::Replaying`]: the world has been reset and input polling is
//!   suspended. Before each tick the commands recorded for that tick are run
//!   against the input manager, the world handles the resulting events, and
//!   the state hash is compared against the recorded checkpoint.
//!
//! Once the last recorded tick has been replayed the world is reset again and
//! a fresh recording starts at tick zero.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::command::CommandSequence;
use crate::input::{InputAction, InputManager, SubscriberId};
use crate::world::World;

// ---------------------------------------------------------------------------
// ReplayMode
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ReplayMode {
    #[default]
    Live,
    Replaying,
}

// ---------------------------------------------------------------------------
// ReplayDivergence / ReplayReport
// ---------------------------------------------------------------------------

/// A tick where the replayed state did not hash to the recorded checkpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplayDivergence {
    /// Tick index, checked after that tick's commands ran and before it
    /// updated.
    pub tick: u64,
    /// Hash recorded live.
    pub expected_hash: String,
    /// Hash computed during replay.
    pub actual_hash: String,
}

/// Outcome of one completed replay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplayReport {
    pub ticks_replayed: u64,
    /// `None` if every checkpoint matched.
    pub first_divergence: Option<ReplayDivergence>,
}

impl ReplayReport {
    pub fn is_deterministic(&self) -> bool {
        self.first_divergence.is_none()
    }
}

// ---------------------------------------------------------------------------
// ReplayController
// ---------------------------------------------------------------------------

/// Records a live session and plays it back against the same world.
#[derive(Debug)]
pub struct ReplayController {
    mode: ReplayMode,
    commands: CommandSequence<InputManager>,
    /// Tick -> world hash, taken before the tick updated.
    checkpoints: BTreeMap<u64, String>,
    /// Record a checkpoint every this many ticks. 0 disables checkpoints.
    checkpoint_interval: u64,
    recorded_ticks: u64,
    subscription: SubscriberId,
    /// Set once `Replay` has been seen released since the last trigger.
    armed: bool,
    first_divergence: Option<ReplayDivergence>,
    last_report: Option<ReplayReport>,
}

impl ReplayController {
    /// Create a controller in [`ReplayMode::Live`] and subscribe it to
    /// `input`.
    pub fn new(input: &mut InputManager, checkpoint_interval: u64) -> Self {
        Self {
            mode: ReplayMode::Live,
            commands: CommandSequence::new(),
            checkpoints: BTreeMap::new(),
            checkpoint_interval,
            recorded_ticks: 0,
            subscription: input.subscribe(),
            armed: true,
            first_divergence: None,
            last_report: None,
        }
    }

    /// Drain this frame's events.
    ///
    /// In live mode every event except `Replay` is recorded at `tick`.
    /// Returns `true` if `Replay` fired, was armed, and there is at least one
    /// recorded tick to play back; in that case nothing from this frame is
    /// recorded and the caller should call [`start_replay`](Self::start_replay).
    ///
    /// While replaying, events are dropped.
    pub fn capture_frame(&mut self, input: &mut InputManager, tick: u64) -> bool {
        let mut events = Vec::new();
        while let Some(action) = input.poll_event(self.subscription) {
            events.push(action);
        }

        if self.mode == ReplayMode::Replaying {
            return false;
        }

        let was_armed = self.armed;
        self.armed = !input.is_action_pressed(InputAction::Replay);

        if events.contains(&InputAction::Replay) && was_armed && self.recorded_ticks > 0 {
            return true;
        }

        for action in events {
            if action == InputAction::Replay {
                continue;
            }
            self.commands.record(tick, move |input| input.simulate_input_action(action));
        }
        false
    }

    /// Record the level-sensitive input and a checkpoint for a live tick.
    ///
    /// Call once per tick, after events for the tick have been handled and
    /// before the world updates.
    ///
    /// # Panics
    ///
    /// Panics if `tick` is not the next tick to record, or if called while
    /// replaying.
    pub fn record_tick(&mut self, tick: u64, input: &InputManager, world: &World) {
        assert_eq!(
            self.mode,
            ReplayMode::Live,
            "ReplayController::record_tick: cannot record while replaying"
        );
        assert_eq!(
            tick, self.recorded_ticks,
            "ReplayController::record_tick: expected tick {}, got {tick}. \
             Ticks must be recorded consecutively from zero.",
            self.recorded_ticks
        );

        let level = input.level_state();
        self.commands.record(tick, move |input| input.restore_level_state(&level));

        let checkpoint_due = self.checkpoint_interval != 0 && tick % self.checkpoint_interval == 0;
        if checkpoint_due {
            self.checkpoints.insert(tick, world.state_hash());
        }

        self.recorded_ticks += 1;
    }

    /// Play back everything recorded for `tick` and verify its checkpoint.
    ///
    /// Call once per replayed tick, before the world updates.
    pub fn execute_tick(&mut self, tick: u64, input: &mut InputManager, world: &mut World) {
        self.commands.try_execute_all_at(tick, input);
        world.process_input(input);
        // Synthetic events must not be captured again.
        input.clear_events(self.subscription);

        let Some(expected_hash) = self.checkpoints.get(&tick) else {
            return;
        };
        let actual_hash = world.state_hash();
        if &actual_hash != expected_hash && self.first_divergence.is_none() {
            warn!(tick, %expected_hash, %actual_hash, "replay diverged from recording");
            self.first_divergence = Some(ReplayDivergence {
                tick,
                expected_hash: expected_hash.clone(),
                actual_hash,
            });
        }
    }

    /// Reset `world` and switch to [`ReplayMode::Replaying`] from tick zero.
    ///
    /// Events still waiting for the world are dropped so the frame that
    /// triggered the replay does not leak into it.
    pub fn start_replay(&mut self, world: &mut World, input: &mut InputManager) {
        info!(
            ticks = self.recorded_ticks,
            commands = self.commands.len(),
            checkpoints = self.checkpoints.len(),
            "replay started"
        );
        self.mode = ReplayMode::Replaying;
        self.first_divergence = None;
        world.reset();
        input.clear_events(world.subscription());
        input.clear_events(self.subscription);
    }

    /// Whether a replay has run past its last recorded tick.
    pub fn is_finished(&self, tick: u64) -> bool {
        self.mode == ReplayMode::Replaying && tick >= self.recorded_ticks
    }

    /// End the replay, reset `world`, and start a fresh recording.
    pub fn finish_replay(&mut self, world: &mut World, input: &mut InputManager) -> ReplayReport {
        let report = ReplayReport {
            ticks_replayed: self.recorded_ticks,
            first_divergence: self.first_divergence.take(),
        };
        info!(
            ticks = report.ticks_replayed,
            deterministic = report.is_deterministic(),
            "replay finished, recording new session"
        );

        self.mode = ReplayMode::Live;
        self.commands.clear();
        self.checkpoints.clear();
        self.recorded_ticks = 0;
        self.armed = false;
        world.reset();
        input.clear_events(world.subscription());
        input.clear_events(self.subscription);

        self.last_report = Some(report.clone());
        report
    }

    // -- accessors ----------------------------------------------------------

    pub fn mode(&self) -> ReplayMode {
        self.mode
    }

    pub fn is_replaying(&self) -> bool {
        self.mode == ReplayMode::Replaying
    }

    /// Live ticks recorded in the current session.
    pub fn recorded_ticks(&self) -> u64 {
        self.recorded_ticks
    }

    pub fn commands(&self) -> &CommandSequence<InputManager> {
        &self.commands
    }

    /// Recorded checkpoint hash for `tick`, if one was taken.
    pub fn checkpoint(&self, tick: u64) -> Option<&str> {
        self.checkpoints.get(&tick).map(String::as_str)
    }

    /// Report of the most recent completed replay.
    pub fn last_report(&self) -> Option<&ReplayReport> {
        self.last_report.as_ref()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
