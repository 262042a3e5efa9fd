//! Browser entry point
//!
//! The page owns the canvas, the event listeners and `requestAnimationFrame`;
//! it forwards keys, pointer positions and frame timestamps here and paints
//! the JSON draw list it gets back.

use wasm_bindgen::prelude::*;

use crate::engine::{Action, Arcade, FrameDriver, InputState, ManualScheduler, SessionPhase};
use crate::games::{self, Hookup};
use crate::platform;
use crate::render::DrawList;
use crate::settings::Settings;
use crate::ui::{DomUi, UiSink};

#[wasm_bindgen]
pub struct WebArcade {
    arcade: Box<dyn Arcade<ManualScheduler>>,
    driver: FrameDriver,
    input: InputState,
    two_player: bool,
}

#[wasm_bindgen]
impl WebArcade {
    #[wasm_bindgen(constructor)]
    pub fn new(name: &str) -> Result<WebArcade, JsValue> {
        platform::init_logging();

        let store = platform::default_store();
        let settings = Settings::load(store.as_ref());
        let seed = settings.seed_or(platform::clock_seed());
        let ui = DomUi::new().map(|ui| Box::new(ui) as Box<dyn UiSink>);
        if ui.is_none() {
            log::warn!("No document; HUD updates disabled");
        }
        let hookup = Hookup { store: Some(store), ui };

        let arcade = games::build_with(name, &settings, ManualScheduler::new(), seed, hookup)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        log::info!("{name} ready (seed {seed})");

        Ok(WebArcade {
            arcade,
            driver: FrameDriver::new(),
            input: InputState::default(),
            two_player: name == "racing",
        })
    }

    /// Returns true when the key was consumed
    pub fn key_down(&mut self, key: &str) -> bool {
        let Some(action) = platform::key_action(key, self.two_player) else {
            return false;
        };
        match action {
            Action::Pause | Action::Start => {
                self.arcade.handle_input(&InputState::press(action));
                self.driver.reset();
            }
            _ => {
                if !self.input.is_held(action) {
                    self.input.pressed.insert(action);
                }
                self.input.held.insert(action);
            }
        }
        true
    }

    pub fn key_up(&mut self, key: &str) {
        if let Some(action) = platform::key_action(key, self.two_player) {
            self.input.held.remove(action);
        }
    }

    /// Pointer moved, in playfield coordinates
    pub fn pointer_move(&mut self, x: f32, y: f32) {
        self.input.pointer = Some(glam::Vec2::new(x, y));
    }

    /// Click or tap, in playfield coordinates
    pub fn pointer_down(&mut self, x: f32, y: f32) {
        self.pointer_move(x, y);
        self.input.pressed.insert(Action::Select);
        self.input.pressed.insert(Action::Primary);
    }

    pub fn pointer_leave(&mut self) {
        self.input.pointer = None;
    }

    /// Advance by one animation frame
    pub fn frame(&mut self, now_ms: f64) {
        let Some((_, timing)) = self.arcade.scheduler_mut().pending() else {
            self.driver.reset();
            return;
        };
        if self.arcade.phase() == SessionPhase::Paused {
            self.driver.reset();
            return;
        }
        for dt in self.driver.frame(now_ms, timing) {
            let Some((generation, _)) = self.arcade.scheduler_mut().take() else {
                break;
            };
            self.arcade.on_tick(generation, &self.input, dt);
            self.input.clear_presses();
        }
    }

    pub fn start(&mut self) -> bool {
        self.driver.reset();
        self.arcade.start()
    }

    pub fn toggle_pause(&mut self) -> bool {
        self.driver.reset();
        self.arcade.toggle_pause()
    }

    pub fn reset(&mut self) {
        self.driver.reset();
        self.input = InputState::default();
        self.arcade.reset();
    }

    pub fn phase(&self) -> String {
        format!("{:?}", self.arcade.phase())
    }

    pub fn score(&self) -> u64 {
        self.arcade.stats().score
    }

    /// Current frame as a JSON array of draw commands
    pub fn draw_json(&self) -> Result<String, JsValue> {
        let mut list = DrawList::new();
        self.arcade.render(&mut list);
        serde_json::to_string(&list.commands).map_err(|e| JsValue::from_str(&e.to_string()))
    }
}

/// Names the page can pass to the constructor
#[wasm_bindgen]
pub fn game_names() -> js_sys::Array {
    games::GAME_NAMES.iter().map(|name| JsValue::from_str(name)).collect()
}
