//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Logger initialisation
//! - Wall-clock time (seeding, frame timestamps)
//! - The default key-value store
//! - Keyboard key names to logical actions

use crate::engine::Action;
use crate::persistence::KeyValueStore;

/// Install the logger for the current target
#[cfg(not(target_arch = "wasm32"))]
pub fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).try_init();
}

#[cfg(target_arch = "wasm32")]
pub fn init_logging() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        web_sys::console::warn_1(&"logger already initialised".into());
    }
}

/// Milliseconds since the Unix epoch
#[cfg(not(target_arch = "wasm32"))]
pub fn now_ms() -> f64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs_f64() * 1000.0)
        .unwrap_or(0.0)
}

#[cfg(target_arch = "wasm32")]
pub fn now_ms() -> f64 {
    js_sys::Date::now()
}

/// Seed derived from the clock, for sessions without a fixed seed
pub fn clock_seed() -> u64 {
    now_ms() as u64
}

/// The store best scores and settings go to on this target
#[cfg(not(target_arch = "wasm32"))]
pub fn default_store() -> Box<dyn KeyValueStore> {
    let path = std::env::var("ARCADE_SIM_STORE").unwrap_or_else(|_| "arcade-sim.json".to_string());
    Box::new(crate::persistence::JsonFileStore::open(path))
}

#[cfg(target_arch = "wasm32")]
pub fn default_store() -> Box<dyn KeyValueStore> {
    match crate::persistence::LocalStorage::open() {
        Ok(store) => Box::new(store),
        Err(e) => {
            log::warn!("{e}; bests will not persist");
            Box::new(crate::persistence::MemoryStore::new())
        }
    }
}

/// Map a DOM `KeyboardEvent.key` value to an action.
///
/// Arrows always drive the first player. WASD drives the second player in
/// two-player games and aliases the arrows everywhere else.
pub fn key_action(key: &str, two_player: bool) -> Option<Action> {
    let action = match key {
        "ArrowLeft" => Action::Left,
        "ArrowRight" => Action::Right,
        "ArrowUp" => Action::Up,
        "ArrowDown" => Action::Down,
        " " | "Spacebar" => Action::Primary,
        "Escape" | "p" | "P" => Action::Pause,
        "Enter" => Action::Start,
        "a" | "A" => alt(two_player, Action::AltLeft, Action::Left),
        "d" | "D" => alt(two_player, Action::AltRight, Action::Right),
        "w" | "W" => alt(two_player, Action::AltUp, Action::Up),
        "s" | "S" => alt(two_player, Action::AltDown, Action::Down),
        _ => return None,
    };
    Some(action)
}

fn alt(two_player: bool, second: Action, first: Action) -> Action {
    if two_player { second } else { first }
}
