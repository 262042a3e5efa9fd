//! End-to-end runs through the controller: scheduling, outcomes, bests

use std::cell::RefCell;
use std::rc::Rc;

use arcade_sim::engine::{
    Action, Controller, Generation, InputState, ManualScheduler, SessionPhase, Shape, Spawn, Timing, Verdict,
};
use arcade_sim::games::breakout::{self, Breakout};
use arcade_sim::games::meteor_dodge::MeteorDodge;
use arcade_sim::games::snake::{self, Snake};
use arcade_sim::persistence::{KeyValueStore, MemoryStore};
use arcade_sim::ui::{RecordingUi, overlay};
use arcade_sim::{ControlScheme, Settings, games};
use glam::Vec2;

const DT: f32 = 1.0 / 60.0;

/// Run one scheduled tick the way a host timer would
fn fire<G: arcade_sim::Game>(c: &mut Controller<G, ManualScheduler>, input: &InputState) -> bool {
    let (generation, timing) = c.scheduler_mut().take().expect("a tick is scheduled");
    let dt = match timing {
        Timing::Fixed { interval_ms } => interval_ms / 1000.0,
        Timing::Variable => DT,
    };
    c.on_tick(generation, input, dt)
}

fn breakout_with(lives: u32) -> Controller<Breakout, ManualScheduler> {
    let mut c = Controller::new(move || Breakout::with_lives(lives), ManualScheduler::new(), 5);
    assert!(c.start());
    fire(&mut c, &InputState::press(Action::Primary));
    c
}

#[test]
fn breakout_last_brick_starts_the_next_level() {
    let mut c = breakout_with(3);
    let world = &mut c.session_mut().world;
    world.remove_kind(breakout::Kind::Brick);
    world.spawn_now(Spawn::new(
        breakout::Kind::Brick,
        Vec2::new(90.0, 80.0),
        Shape::rect(breakout::consts::BRICK_WIDTH, breakout::consts::BRICK_HEIGHT),
    ));
    let ball = world.first_mut(breakout::Kind::Ball).unwrap();
    ball.pos = Vec2::new(100.0, 100.0);
    ball.vel = Vec2::new(0.0, -5.0);

    fire(&mut c, &InputState::default());
    assert_eq!(c.phase(), SessionPhase::Running);
    assert_eq!(c.stats().level, 2);
    assert_eq!(c.stats().score, 60);
    assert!(c.scheduler().pending().is_some());
}

#[test]
fn breakout_losing_the_only_life_ends_the_run() {
    let mut c = breakout_with(1);
    let ball = c.session_mut().world.first_mut(breakout::Kind::Ball).unwrap();
    ball.pos = Vec2::new(400.0, breakout::consts::HEIGHT + 20.0);
    ball.vel = Vec2::new(0.0, 5.0);

    fire(&mut c, &InputState::default());
    assert_eq!(c.phase(), SessionPhase::Ended);
    assert_eq!(c.outcome().map(|o| o.verdict), Some(Verdict::Lost));
    // An ended session stops asking for ticks
    assert!(c.scheduler().pending().is_none());
}

#[test]
fn snake_eats_then_runs_into_the_wall() {
    let mut c = Controller::new(Snake::new, ManualScheduler::new(), 9);
    c.start();
    c.session_mut().world.first_mut(snake::Kind::Food).unwrap().pos = Vec2::new(16.0, 15.0);

    fire(&mut c, &InputState::default());
    assert_eq!(c.stats().score, snake::consts::FOOD_POINTS);
    assert_eq!(Snake::length(&c.session().world), 4);

    for _ in 0..40 {
        if c.phase() == SessionPhase::Ended {
            break;
        }
        fire(&mut c, &InputState::default());
    }
    assert_eq!(c.outcome().map(|o| o.verdict), Some(Verdict::Lost));
    assert!(c.stats().score >= snake::consts::FOOD_POINTS);
}

#[test]
fn ticks_from_before_a_reset_are_ignored() {
    let mut c = Controller::new(Snake::new, ManualScheduler::new(), 9);
    c.start();
    let (old, _) = c.scheduler_mut().take().unwrap();
    c.reset();
    c.start();
    assert_ne!(c.generation(), old);

    assert!(!c.on_tick(old, &InputState::default(), DT));
    assert_eq!(c.stats().ticks, 0);
    assert_eq!(c.scheduler().pending().map(|(g, _)| g), Some(c.generation()));
}

#[test]
fn reset_returns_to_the_start_screen() {
    let ui = Rc::new(RefCell::new(RecordingUi::new()));
    let mut c = breakout_with(3).with_ui(Box::new(ui.clone()));
    fire(&mut c, &InputState::default());
    c.reset();
    assert_eq!(c.phase(), SessionPhase::NotStarted);
    assert_eq!(c.stats().score, 0);
    assert_eq!(c.generation(), Generation(1));
    assert!(ui.borrow().is_visible(overlay::START));
}

#[test]
fn same_seed_same_run() {
    let run = || {
        let mut c = Controller::new(|| MeteorDodge::new(ControlScheme::Keyboard), ManualScheduler::new(), 77);
        c.start();
        for _ in 0..600 {
            if c.phase() != SessionPhase::Running {
                break;
            }
            let input = c.autopilot();
            fire(&mut c, &input);
        }
        let positions: Vec<Vec2> = c.session().world.all().iter().map(|e| e.pos).collect();
        (c.stats(), positions)
    };
    assert_eq!(run(), run());
}

#[test]
fn best_score_only_moves_up() {
    let play_to = |store: MemoryStore, score: u64| {
        let mut c = Controller::new(Snake::new, ManualScheduler::new(), 3).with_store(Box::new(store));
        c.start();
        c.session_mut().stats.score = score;
        // Straight into the right wall
        for _ in 0..40 {
            if c.phase() == SessionPhase::Ended {
                break;
            }
            c.session_mut().world.first_mut(snake::Kind::Food).unwrap().pos = Vec2::ZERO;
            fire(&mut c, &InputState::default());
        }
        assert_eq!(c.phase(), SessionPhase::Ended);
        c.best()
    };

    let mut store = MemoryStore::new();
    store.set(snake::consts::BEST_KEY, "100").unwrap();
    assert_eq!(play_to(store.clone(), 80), Some(100.0));
    assert_eq!(play_to(store, 150), Some(150.0));
}

#[test]
fn malformed_best_reads_as_absent() {
    let mut store = MemoryStore::new();
    store.set(snake::consts::BEST_KEY, "lots").unwrap();
    let ui = Rc::new(RefCell::new(RecordingUi::new()));
    let c = Controller::new(Snake::new, ManualScheduler::new(), 3)
        .with_store(Box::new(store))
        .with_ui(Box::new(ui.clone()));
    assert_eq!(c.best(), None);
    assert_eq!(ui.borrow().text("high-score"), Some("0"));
}

#[test]
fn registry_builds_playable_games() {
    for name in games::GAME_NAMES {
        let mut arcade = games::build(name, &Settings::default(), ManualScheduler::new(), 21).unwrap();
        assert!(arcade.start());
        for _ in 0..120 {
            let Some((generation, _)) = arcade.scheduler_mut().take() else {
                break;
            };
            let input = arcade.autopilot();
            arcade.on_tick(generation, &input, DT);
        }
        assert!(arcade.stats().ticks > 0, "{name} never ticked");
    }
}
