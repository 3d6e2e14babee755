//! Headless session: record a scripted run, replay it, and report whether the
//! replay matched.
//!
//! ```sh
//! RUST_LOG=debug cargo run -p zif-engine --example headless_session
//! ```

use std::cell::Cell;

use tracing::info;
use tracing_subscriber::EnvFilter;
use zif_engine::prelude::*;

/// Frames of scripted play before `Replay` is pressed.
const SESSION_FRAMES: u32 = 90;
/// Frames to run in total; enough for the session and its replay.
const TOTAL_FRAMES: u32 = 200;

/// Plays a fixed script keyed on the frame number.
struct ScriptedPad {
    frame: Cell<u32>,
}

impl ScriptedPad {
    fn new() -> Self {
        Self { frame: Cell::new(0) }
    }
}

impl InputSource for ScriptedPad {
    fn is_action_active(&self, action: InputAction) -> bool {
        let frame = self.frame.get();
        match action {
            InputAction::Replay => frame == SESSION_FRAMES,
            _ if frame >= SESSION_FRAMES => false,
            InputAction::MoveRight => frame < 30,
            InputAction::MoveDown => (30..60).contains(&frame),
            InputAction::MoveLeft => frame >= 60,
            InputAction::SpeedChange => (45..75).contains(&frame),
            InputAction::AttackPrimary => frame % 3 == 0,
            InputAction::MoveUp => false,
        }
    }

    fn pointer_world_position(&self) -> Vec2 {
        let t = self.frame.get() as f32 * 0.1;
        Vec2::new(t.cos(), t.sin()) * 5.0
    }

    /// Called once per loop iteration, so it also advances the script.
    fn quit_requested(&self) -> bool {
        let frame = self.frame.get();
        self.frame.set(frame + 1);
        frame >= TOTAL_FRAMES
    }
}

/// Pretends to be an audio output.
#[derive(Debug, Default)]
struct ConsoleSpeaker {
    played: u32,
}

impl Device for ConsoleSpeaker {
    const NAME: &'static str = "console-speaker";

    fn release(&mut self) {
        info!(sounds = self.played, "speaker closed");
    }
}

impl AudioSink for ConsoleSpeaker {
    fn play_sound(&mut self, sound: SoundId) {
        self.played += 1;
        tracing::trace!(?sound, "sound");
    }
}

/// Logs a summary of the world every second of frames.
#[derive(Default)]
struct LogRenderer {
    frames: u64,
}

impl Renderer for LogRenderer {
    fn render(&mut self, view: WorldView<'_>, frame_dt: f64) {
        self.frames += 1;
        if self.frames % 30 == 0 {
            let player = view.player_transform();
            info!(
                frame = self.frames,
                frame_dt,
                x = player.position.x,
                y = player.position.y,
                bullets = view.bullet_count(),
                "frame"
            );
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = GameConfig::from_json_str(r#"{ "checkpoint_interval": 1 }"#)?;
    let speaker = ScopedDevice::acquire(|| Ok::<_, std::io::Error>(ConsoleSpeaker::default()))?;
    let mut game = Game::new(ScriptedPad::new(), Box::new(speaker), config)?;

    // A synthetic clock advancing exactly one tick per frame.
    let mut now = 0.0;
    let mut renderer = LogRenderer::default();
    let frames = game.run(
        || {
            now += 1.0 / 30.0;
            now
        },
        &mut renderer,
    );

    let report = game
        .replay()
        .last_report()
        .ok_or_else(|| anyhow::anyhow!("replay did not finish within {frames} frames"))?;
    match &report.first_divergence {
        None => info!(ticks = report.ticks_replayed, "replay matched the recording"),
        Some(divergence) => anyhow::bail!(
            "replay diverged at tick {}: expected {}, got {}",
            divergence.tick,
            divergence.expected_hash,
            divergence.actual_hash
        ),
    }

    Ok(())
}
