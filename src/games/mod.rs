//! The nine rule sets and a by-name registry
//!
//! Hosts pick a game at run time, so `build` erases the concrete game type
//! behind `Arcade`.

pub mod breakout;
pub mod memory;
pub mod meteor_dodge;
pub mod platform_runner;
pub mod pong;
pub mod racing;
pub mod snake;
pub mod space_invaders;
pub mod tetris;

use crate::engine::{Arcade, Controller, Game, Scheduler};
use crate::error::{Error, Result};
use crate::persistence::KeyValueStore;
use crate::settings::Settings;
use crate::ui::UiSink;

/// Registry names, in menu order
pub const GAME_NAMES: [&str; 9] = [
    "breakout",
    "snake",
    "pong",
    "space-invaders",
    "meteor-dodge",
    "platform-runner",
    "racing",
    "tetris",
    "memory",
];

/// Optional collaborators attached to a freshly built controller
#[derive(Default)]
pub struct Hookup {
    pub store: Option<Box<dyn KeyValueStore>>,
    pub ui: Option<Box<dyn UiSink>>,
}

/// Build a bare controller for `name`
pub fn build<S: Scheduler + 'static>(
    name: &str,
    settings: &Settings,
    scheduler: S,
    seed: u64,
) -> Result<Box<dyn Arcade<S>>> {
    build_with(name, settings, scheduler, seed, Hookup::default())
}

/// Build a controller for `name` with a store and UI attached
pub fn build_with<S: Scheduler + 'static>(
    name: &str,
    settings: &Settings,
    scheduler: S,
    seed: u64,
    hookup: Hookup,
) -> Result<Box<dyn Arcade<S>>> {
    let difficulty = settings.difficulty;
    let control = settings.control;
    let arcade = match name {
        "breakout" => wire(Controller::new(breakout::Breakout::new, scheduler, seed), hookup),
        "snake" => wire(Controller::new(snake::Snake::new, scheduler, seed), hookup),
        "pong" => wire(Controller::new(move || pong::Pong::new(difficulty), scheduler, seed), hookup),
        "space-invaders" => wire(
            Controller::new(space_invaders::SpaceInvaders::new, scheduler, seed),
            hookup,
        ),
        "meteor-dodge" => wire(
            Controller::new(move || meteor_dodge::MeteorDodge::new(control), scheduler, seed),
            hookup,
        ),
        "platform-runner" => wire(
            Controller::new(platform_runner::PlatformRunner::new, scheduler, seed),
            hookup,
        ),
        "racing" => wire(Controller::new(racing::Racing::new, scheduler, seed), hookup),
        "tetris" => wire(Controller::new(tetris::Tetris::new, scheduler, seed), hookup),
        "memory" => wire(
            Controller::new(move || memory::Memory::new(difficulty), scheduler, seed),
            hookup,
        ),
        _ => return Err(Error::UnknownGame(name.to_string())),
    };
    log::info!("Built {name} (seed {seed})");
    Ok(arcade)
}

fn wire<G, S>(mut controller: Controller<G, S>, hookup: Hookup) -> Box<dyn Arcade<S>>
where
    G: Game + 'static,
    S: Scheduler + 'static,
{
    if let Some(store) = hookup.store {
        controller = controller.with_store(store);
    }
    if let Some(ui) = hookup.ui {
        controller = controller.with_ui(ui);
    }
    Box::new(controller)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{ManualScheduler, SessionPhase};

    #[test]
    fn every_registered_name_builds() {
        for name in GAME_NAMES {
            let arcade = build(name, &Settings::default(), ManualScheduler::new(), 1).unwrap();
            assert_eq!(arcade.phase(), SessionPhase::NotStarted);
        }
    }

    #[test]
    fn unknown_name_is_an_error() {
        let err = build("pacman", &Settings::default(), ManualScheduler::new(), 1)
            .err()
            .unwrap();
        assert_eq!(err.to_string(), "unknown game: pacman");
    }
}
