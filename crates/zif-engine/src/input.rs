//! Input actions, the per-frame input manager, and its subscriber mailboxes.
//!
//! The [`InputManager`] polls an [`InputSource`] once per rendered frame. It
//! keeps two views of the result:
//!
//! - a **held table** ([`is_action_pressed`](InputManager::is_action_pressed),
//!   [`move_axes`](InputManager::move_axes)) that level-sensitive logic such as
//!   movement reads every tick;
//! - **action events**, delivered to every subscriber's mailbox in
//!   [`InputAction::ALL`] order, for logic that should react once per press.
//!
//! Subscribers register with [`subscribe`](InputManager::subscribe) and drain
//! their mailbox with [`poll_event`](InputManager::poll_event). The manager
//! only knows subscriber handles, never the subscribers themselves.
//!
//! # Example
//!
//! ```
//! use zif_engine::prelude::*;
//!
//! struct Keys;
//! impl InputSource for Keys {
//!     fn is_action_active(&self, action: InputAction) -> bool {
//!         matches!(action, InputAction::MoveUp | InputAction::MoveRight)
//!     }
//!     fn pointer_world_position(&self) -> Vec2 { Vec2::ZERO }
//!     fn quit_requested(&self) -> bool { false }
//! }
//!
//! let mut input = InputManager::new();
//! let listener = input.subscribe();
//! input.update(&Keys, false);
//!
//! assert_eq!(input.move_axes(), Vec2::new(1.0, -1.0));
//! assert_eq!(input.poll_event(listener), Some(InputAction::MoveUp));
//! assert_eq!(input.poll_event(listener), Some(InputAction::MoveRight));
//! assert_eq!(input.poll_event(listener), None);
//! ```

use std::collections::VecDeque;

use glam::Vec2;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// InputAction
// ---------------------------------------------------------------------------

/// Every action the game understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InputAction {
    MoveUp,
    MoveRight,
    MoveDown,
    MoveLeft,
    AttackPrimary,
    SpeedChange,
    Replay,
}

impl InputAction {
    /// Number of variants.
    pub const COUNT: usize = 7;

    /// All variants in polling order.
    pub const ALL: [InputAction; Self::COUNT] = [
        InputAction::MoveUp,
        InputAction::MoveRight,
        InputAction::MoveDown,
        InputAction::MoveLeft,
        InputAction::AttackPrimary,
        InputAction::SpeedChange,
        InputAction::Replay,
    ];

    /// Position of this action in [`ALL`](Self::ALL) and in the held table.
    #[inline]
    pub const fn index(self) -> usize {
        match self {
            InputAction::MoveUp => 0,
            InputAction::MoveRight => 1,
            InputAction::MoveDown => 2,
            InputAction::MoveLeft => 3,
            InputAction::AttackPrimary => 4,
            InputAction::SpeedChange => 5,
            InputAction::Replay => 6,
        }
    }
}

// `index` is an exhaustive match, so every variant has a slot; this checks
// the slots are exactly 0..COUNT in `ALL` order.
const _: () = {
    let mut i = 0;
    while i < InputAction::COUNT {
        assert!(InputAction::ALL[i].index() == i);
        i += 1;
    }
};

// ---------------------------------------------------------------------------
// InputSource
// ---------------------------------------------------------------------------

/// The device layer the input manager polls.
///
/// Implemented outside the core, typically by mapping keyboard and mouse state
/// to actions.
pub trait InputSource {
    /// Whether `action` is physically active right now.
    fn is_action_active(&self, action: InputAction) -> bool;

    /// The pointer position in world coordinates.
    fn pointer_world_position(&self) -> Vec2;

    /// Whether the user asked to quit.
    fn quit_requested(&self) -> bool;
}

// ---------------------------------------------------------------------------
// LevelState
// ---------------------------------------------------------------------------

/// The level-sensitive part of the input state: the held table and the
/// pointer sample.
///
/// Captured per tick during recording so held movement and aim can be put
/// back exactly on replay.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LevelState {
    pub held: [bool; InputAction::COUNT],
    pub pointer_world_position: Vec2,
}

// ---------------------------------------------------------------------------
// SubscriberId
// ---------------------------------------------------------------------------

/// Handle to a mailbox registered with [`InputManager::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(usize);

// ---------------------------------------------------------------------------
// InputManager
// ---------------------------------------------------------------------------

/// Per-frame input sampling, held state, and action events.
#[derive(Debug, Default)]
pub struct InputManager {
    held: [bool; InputAction::COUNT],
    /// Actions found active by the last poll, waiting to be fired.
    queue: Vec<InputAction>,
    move_axes: Vec2,
    pointer_world_position: Vec2,
    mailboxes: Vec<VecDeque<InputAction>>,
}

impl InputManager {
    /// Create a manager with nothing held and no subscribers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new subscriber and return its mailbox handle.
    pub fn subscribe(&mut self) -> SubscriberId {
        self.mailboxes.push(VecDeque::new());
        SubscriberId(self.mailboxes.len() - 1)
    }

    /// Sample the source once for this rendered frame.
    ///
    /// When not `suspended`, every action is polled, the held table is
    /// rebuilt, and each active action is fired to all subscribers in
    /// [`InputAction::ALL`] order. When `suspended`, the held table is left
    /// alone and nothing fires. In both cases the move axes are recomputed
    /// from the held table and the pointer is re-sampled.
    pub fn update(&mut self, source: &dyn InputSource, suspended: bool) {
        if !suspended {
            self.queue.clear();
            for action in InputAction::ALL {
                let active = source.is_action_active(action);
                if active {
                    self.queue.push(action);
                }
                self.held[action.index()] = active;
            }
        }

        self.refresh_move_axes();
        self.pointer_world_position = source.pointer_world_position();

        let queue = std::mem::take(&mut self.queue);
        for &action in &queue {
            self.fire(action);
        }
        self.queue = queue;
        self.queue.clear();
    }

    /// Inject one synthetic press without touching the source.
    ///
    /// Marks `action` held and fires it immediately, bypassing the per-frame
    /// queue.
    pub fn simulate_input_action(&mut self, action: InputAction) {
        self.held[action.index()] = true;
        self.refresh_move_axes();
        self.fire(action);
    }

    /// Whether `action` was held as of the last update.
    #[inline]
    pub fn is_action_pressed(&self, action: InputAction) -> bool {
        self.held[action.index()]
    }

    /// `(right - left, down - up)` from the held table. Not normalized.
    #[inline]
    pub fn move_axes(&self) -> Vec2 {
        self.move_axes
    }

    /// The pointer position in world coordinates as last sampled.
    #[inline]
    pub fn pointer_world_position(&self) -> Vec2 {
        self.pointer_world_position
    }

    /// Pop the oldest pending event for `subscriber`.
    ///
    /// # Panics
    ///
    /// Panics if `subscriber` was not returned by this manager's
    /// [`subscribe`](Self::subscribe).
    pub fn poll_event(&mut self, subscriber: SubscriberId) -> Option<InputAction> {
        self.mailbox(subscriber).pop_front()
    }

    /// Number of events waiting for `subscriber`.
    pub fn pending_events(&self, subscriber: SubscriberId) -> usize {
        self.mailboxes.get(subscriber.0).map_or(0, VecDeque::len)
    }

    /// Drop every event waiting for `subscriber`.
    pub fn clear_events(&mut self, subscriber: SubscriberId) {
        self.mailbox(subscriber).clear();
    }

    /// Capture the held table and pointer sample.
    pub fn level_state(&self) -> LevelState {
        LevelState {
            held: self.held,
            pointer_world_position: self.pointer_world_position,
        }
    }

    /// Overwrite the held table and pointer sample. Fires nothing.
    pub fn restore_level_state(&mut self, state: &LevelState) {
        self.held = state.held;
        self.pointer_world_position = state.pointer_world_position;
        self.refresh_move_axes();
    }

    fn fire(&mut self, action: InputAction) {
        for mailbox in &mut self.mailboxes {
            mailbox.push_back(action);
        }
    }

    fn mailbox(&mut self, subscriber: SubscriberId) -> &mut VecDeque<InputAction> {
        let count = self.mailboxes.len();
        self.mailboxes
            .get_mut(subscriber.0)
            .unwrap_or_else(|| {
                panic!("unknown input subscriber {subscriber:?} ({count} registered)")
            })
    }

    fn refresh_move_axes(&mut self) {
        let axis = |positive: InputAction, negative: InputAction| {
            f32::from(u8::from(self.held[positive.index()]))
                - f32::from(u8::from(self.held[negative.index()]))
        };

        self.move_axes = Vec2::new(
            axis(InputAction::MoveRight, InputAction::MoveLeft),
            axis(InputAction::MoveDown, InputAction::MoveUp),
        );
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
