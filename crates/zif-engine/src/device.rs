//! Scoped ownership of external devices (audio output, windows).
//!
//! A [`ScopedDevice`] is acquired once at startup and released exactly once,
//! either explicitly through [`ScopedDevice::release`] or when it is dropped.
//! Releasing twice is a no-op.

use std::fmt;
use std::ops::{Deref, DerefMut};

use tracing::debug;

use crate::audio::{AudioSink, SoundId};
use crate::EngineError;

/// A resource with an explicit teardown step.
pub trait Device {
    /// Name used in logs and errors.
    const NAME: &'static str;

    /// Tear the device down. Called at most once by [`ScopedDevice`].
    fn release(&mut self);
}

/// Owns a [`Device`] and guarantees a single release.
pub struct ScopedDevice<D: Device> {
    device: D,
    released: bool,
}

impl<D: Device> ScopedDevice<D> {
    /// Run `init` and take ownership of the device it returns.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Device`] carrying `init`'s error message.
    pub fn acquire<E: fmt::Display>(
        init: impl FnOnce() -> Result<D, E>,
    ) -> Result<Self, EngineError> {
        let device = init().map_err(|e| EngineError::Device {
            device: D::NAME,
            reason: e.to_string(),
        })?;
        debug!(device = D::NAME, "device acquired");
        Ok(Self {
            device,
            released: false,
        })
    }

    /// Release the device now. Later calls, and the eventual drop, do nothing.
    pub fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        self.device.release();
        debug!(device = D::NAME, "device released");
    }

    pub fn is_released(&self) -> bool {
        self.released
    }
}

impl<D: Device> Drop for ScopedDevice<D> {
    fn drop(&mut self) {
        self.release();
    }
}

impl<D: Device> Deref for ScopedDevice<D> {
    type Target = D;

    fn deref(&self) -> &D {
        &self.device
    }
}

impl<D: Device> DerefMut for ScopedDevice<D> {
    fn deref_mut(&mut self) -> &mut D {
        &mut self.device
    }
}

impl<D: Device + fmt::Debug> fmt::Debug for ScopedDevice<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScopedDevice")
            .field("device", &self.device)
            .field("released", &self.released)
            .finish()
    }
}

/// A released audio device drops requests instead of forwarding them.
impl<D: Device + AudioSink> AudioSink for ScopedDevice<D> {
    fn play_sound(&mut self, sound: SoundId) {
        if !self.released {
            self.device.play_sound(sound);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[derive(Debug, Default)]
    struct FakeSpeaker {
        releases: Rc<Cell<u32>>,
        played: u32,
    }

    impl Device for FakeSpeaker {
        const NAME: &'static str = "fake-speaker";

        fn release(&mut self) {
            self.releases.set(self.releases.get() + 1);
        }
    }

    impl AudioSink for FakeSpeaker {
        fn play_sound(&mut self, _sound: SoundId) {
            self.played += 1;
        }
    }

    fn acquire(releases: &Rc<Cell<u32>>) -> ScopedDevice<FakeSpeaker> {
        let releases = Rc::clone(releases);
        ScopedDevice::acquire(|| {
            Ok::<_, String>(FakeSpeaker {
                releases,
                played: 0,
            })
        })
        .unwrap()
    }

    #[test]
    fn release_is_idempotent() {
        let releases = Rc::new(Cell::new(0));
        let mut device = acquire(&releases);

        device.release();
        device.release();
        drop(device);

        assert_eq!(releases.get(), 1);
    }

    #[test]
    fn drop_releases_once() {
        let releases = Rc::new(Cell::new(0));
        {
            let device = acquire(&releases);
            assert!(!device.is_released());
        }
        assert_eq!(releases.get(), 1);
    }

    #[test]
    fn failed_acquire_names_device() {
        let result = ScopedDevice::<FakeSpeaker>::acquire(|| Err("no output device"));
        let err = result.unwrap_err();
        assert!(matches!(err, EngineError::Device { device: "fake-speaker", .. }));
        assert!(err.to_string().contains("no output device"), "{err}");
    }

    #[test]
    fn released_sink_drops_sounds() {
        let releases = Rc::new(Cell::new(0));
        let mut device = acquire(&releases);

        device.play_sound(SoundId::PlayerShoot);
        device.release();
        device.play_sound(SoundId::PlayerShoot);

        assert_eq!(device.played, 1);
    }
}
