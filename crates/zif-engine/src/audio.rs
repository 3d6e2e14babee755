//! Audio sink boundary.
//!
//! The simulation never plays sound itself. It calls an [`AudioSink`]
//! synchronously and moves on.

use std::cell::RefCell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

/// Sounds the simulation can ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SoundId {
    PlayerShoot,
}

/// Fire-and-forget sound playback.
pub trait AudioSink {
    fn play_sound(&mut self, sound: SoundId);
}

/// Discards every request.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullAudio;

impl AudioSink for NullAudio {
    fn play_sound(&mut self, _sound: SoundId) {}
}

/// Records requests into a log shared between clones.
///
/// Hand one clone to the world and keep another to inspect what was played.
#[derive(Debug, Clone, Default)]
pub struct SoundLog {
    played: Rc<RefCell<Vec<SoundId>>>,
}

impl SoundLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything played so far, oldest first.
    pub fn played(&self) -> Vec<SoundId> {
        self.played.borrow().clone()
    }

    /// How many times `sound` was played.
    pub fn count(&self, sound: SoundId) -> usize {
        self.played.borrow().iter().filter(|&&s| s == sound).count()
    }
}

impl AudioSink for SoundLog {
    fn play_sound(&mut self, sound: SoundId) {
        self.played.borrow_mut().push(sound);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sound_log_clones_share_history() {
        let log = SoundLog::new();
        let mut sink: Box<dyn AudioSink> = Box::new(log.clone());

        sink.play_sound(SoundId::PlayerShoot);
        sink.play_sound(SoundId::PlayerShoot);

        assert_eq!(log.count(SoundId::PlayerShoot), 2);
        assert_eq!(log.played(), vec![SoundId::PlayerShoot; 2]);
    }
}
