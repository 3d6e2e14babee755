//! Integration tests for the fixed-timestep clock and frame-skip cap.

use proptest::prelude::*;
use zif_engine::prelude::*;

struct Idle;

impl InputSource for Idle {
    fn is_action_active(&self, _action: InputAction) -> bool {
        false
    }

    fn pointer_world_position(&self) -> Vec2 {
        Vec2::ZERO
    }

    fn quit_requested(&self) -> bool {
        false
    }
}

fn game_with(tick: TickConfig) -> Game<Idle> {
    let config = GameConfig {
        tick,
        ..Default::default()
    };
    Game::new(Idle, Box::new(NullAudio), config).expect("config should be valid")
}

#[test]
fn one_second_at_thirty_hz() {
    let mut game = game_with(TickConfig::default());
    let mut total = 0;
    for _ in 0..60 {
        total += game.frame(1.0 / 60.0).ticks_run;
    }
    // Rounding may leave the last tick's worth just short of a full step.
    assert!((29..=30).contains(&total), "ran {total} ticks");
}

#[test]
fn stall_runs_at_most_the_cap() {
    let mut game = game_with(TickConfig::default());
    let report = game.frame(3_600.0);

    assert!(report.ticks_run <= 30);
    assert!(report.ticks_run >= 29);
    assert!(report.lag_discarded > 3_598.0);

    // The backlog is gone; a normal frame afterwards runs normally.
    let next = game.frame(1.0 / 30.0);
    assert!(next.ticks_run <= 2);
}

#[test]
fn custom_cap_is_honoured() {
    let mut game = game_with(TickConfig {
        fixed_dt: 0.25,
        max_frame_skip: 4,
    });
    let report = game.frame(10.0);
    assert_eq!(report.ticks_run, 4);
    assert_eq!(report.lag_discarded, 9.0);
    assert_eq!(game.clock().lag(), 0.0);
}

#[test]
fn tick_counter_matches_recording() {
    let mut game = game_with(TickConfig {
        fixed_dt: 0.125,
        max_frame_skip: 8,
    });
    for dt in [0.0, 0.1, 0.3, 0.05, 1.0, 0.125] {
        game.frame(dt);
    }
    assert_eq!(game.tick_count(), game.replay().recorded_ticks());
}

proptest! {
    /// However long the stall, one frame never catches up more than the cap.
    #[test]
    fn catch_up_never_exceeds_cap(
        max_frame_skip in 1u32..64,
        warmup in prop::collection::vec(0.0f64..0.2, 0..20),
        stall in 0.0f64..1.0e6,
    ) {
        let mut game = game_with(TickConfig {
            fixed_dt: 1.0 / 30.0,
            max_frame_skip,
        });
        for dt in warmup {
            let report = game.frame(dt);
            prop_assert!(report.ticks_run <= max_frame_skip);
        }

        let report = game.frame(stall);
        prop_assert!(report.ticks_run <= max_frame_skip);
        prop_assert!(game.clock().lag() < game.clock().fixed_dt());
    }
}
