//! Top-level owner of a game's session
//!
//! The controller is the only thing the host talks to. It wires the session
//! state machine to the scheduler (with a generation guard against stale
//! ticks), pushes HUD text and overlay visibility to the UI sink, and offers
//! best values to the store.

use super::game::{BestSpec, Game, Timing};
use super::input::{Action, InputState};
use super::scheduler::{Generation, Scheduler};
use super::session::{Outcome, Session, SessionPhase, Stats, Verdict};
use crate::highscores::{self, BestOrder};
use crate::persistence::KeyValueStore;
use crate::render::DrawList;
use crate::ui::{self, UiSink, overlay};

/// Spreads successive generations across the seed space
const SEED_MIX: u64 = 0x9E37_79B9_7F4A_7C15;

/// Owns the active session of one game
pub struct Controller<G: Game, S: Scheduler> {
    session: Session<G>,
    factory: Box<dyn Fn() -> G>,
    scheduler: S,
    generation: Generation,
    base_seed: u64,
    ui: Option<Box<dyn UiSink>>,
    store: Option<Box<dyn KeyValueStore>>,
}

impl<G: Game, S: Scheduler> Controller<G, S> {
    /// Build a controller around a game factory. Every reset calls the
    /// factory again so no state leaks between playthroughs.
    pub fn new(factory: impl Fn() -> G + 'static, scheduler: S, seed: u64) -> Self {
        let generation = Generation::default();
        let session = Session::new(factory(), seed_for(seed, generation));
        Self {
            session,
            factory: Box::new(factory),
            scheduler,
            generation,
            base_seed: seed,
            ui: None,
            store: None,
        }
    }

    pub fn with_ui(mut self, ui: Box<dyn UiSink>) -> Self {
        self.ui = Some(ui);
        self.push_ui();
        self
    }

    pub fn with_store(mut self, store: Box<dyn KeyValueStore>) -> Self {
        self.store = Some(store);
        self.push_ui();
        self
    }

    pub fn session(&self) -> &Session<G> {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session<G> {
        &mut self.session
    }

    pub fn phase(&self) -> SessionPhase {
        self.session.phase()
    }

    pub fn stats(&self) -> Stats {
        self.session.stats
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.session.outcome()
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn timing(&self) -> Timing {
        self.session.game.timing()
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    pub fn store(&self) -> Option<&dyn KeyValueStore> {
        self.store.as_deref()
    }

    pub fn ui(&self) -> Option<&dyn UiSink> {
        self.ui.as_deref()
    }

    /// Stored best for this game, if any
    pub fn best(&self) -> Option<f64> {
        let spec = self.session.game.best()?;
        highscores::load_best(self.store.as_deref()?, &spec.key)
    }

    /// NotStarted -> Running; begins scheduling
    pub fn start(&mut self) -> bool {
        if !self.session.start() {
            return false;
        }
        self.scheduler.schedule_tick(self.generation, self.timing());
        self.push_ui();
        true
    }

    pub fn pause(&mut self) -> bool {
        let changed = self.session.pause();
        if changed {
            self.push_ui();
        }
        changed
    }

    pub fn resume(&mut self) -> bool {
        let changed = self.session.resume();
        if changed {
            self.push_ui();
        }
        changed
    }

    pub fn toggle_pause(&mut self) -> bool {
        let changed = self.session.toggle_pause();
        if changed {
            self.push_ui();
        }
        changed
    }

    /// Any state -> NotStarted. The old scheduling loop is cancelled and its
    /// generation retired, so a late callback cannot touch the new session.
    pub fn reset(&mut self) {
        self.scheduler.cancel();
        self.generation = self.generation.next();
        let seed = seed_for(self.base_seed, self.generation);
        self.session.reset((self.factory)(), seed);
        self.push_ui();
    }

    /// Host input outside the tick: pause toggles and start/restart
    pub fn handle_input(&mut self, input: &InputState) -> bool {
        if input.was_pressed(Action::Pause) {
            return self.toggle_pause();
        }
        if input.was_pressed(Action::Start) {
            return match self.phase() {
                SessionPhase::NotStarted => self.start(),
                SessionPhase::Ended => {
                    self.reset();
                    self.start()
                }
                _ => false,
            };
        }
        false
    }

    /// Scheduled tick callback. Stale generations are ignored; the active
    /// loop reschedules itself until the session ends.
    pub fn on_tick(&mut self, generation: Generation, input: &InputState, dt: f32) -> bool {
        if generation != self.generation {
            log::debug!(
                "{}: dropping stale tick from generation {} (active {})",
                self.session.game.name(),
                generation.0,
                self.generation.0
            );
            return false;
        }

        let ran = self.session.tick(input, dt);
        if ran {
            self.record_live_best();
            if self.phase() == SessionPhase::Ended {
                self.record_final_best();
            }
            self.push_ui();
        }

        if matches!(self.phase(), SessionPhase::Running | SessionPhase::Paused) {
            self.scheduler.schedule_tick(self.generation, self.timing());
        }
        ran
    }

    /// Read-only render of the current state
    pub fn render(&self, out: &mut DrawList) {
        self.session.game.draw(&self.session.world, out);
    }

    /// Demo input for the current state
    pub fn autopilot(&self) -> InputState {
        self.session.game.autopilot(&self.session.world, &self.session.stats)
    }

    fn record_live_best(&mut self) {
        let Some(spec) = self.session.game.best().filter(|s| s.live) else {
            return;
        };
        if let Some(candidate) = self.session.game.best_candidate(&self.session.stats, None) {
            self.offer_best(&spec, candidate);
        }
    }

    fn record_final_best(&mut self) {
        let Some(spec) = self.session.game.best() else {
            return;
        };
        let verdict = self.outcome().map(|o| o.verdict);
        if let Some(candidate) = self.session.game.best_candidate(&self.session.stats, verdict) {
            self.offer_best(&spec, candidate);
        }
    }

    fn offer_best(&mut self, spec: &BestSpec, candidate: f64) {
        let Some(store) = self.store.as_deref_mut() else {
            return;
        };
        if let Err(e) = highscores::record(store, &spec.key, spec.order, candidate) {
            log::warn!("Could not store best for {}: {e}", spec.key);
        }
    }

    /// Push HUD values, the best value and overlay visibility
    fn push_ui(&mut self) {
        let best = self.best();
        let spec = self.session.game.best();
        let Some(ui) = self.ui.as_deref_mut() else {
            return;
        };

        for field in self.session.game.hud(&self.session.world, &self.session.stats) {
            ui.set_text(field.id, &field.value);
        }

        if let Some(spec) = spec {
            let text = match spec.order {
                BestOrder::HigherIsBetter => format!("{}", best.unwrap_or(0.0) as u64),
                BestOrder::LowerIsBetter => highscores::format_best_time(best),
            };
            ui.set_text(spec.element, &text);
        }

        let outcome = self.session.outcome();
        let won = matches!(outcome.map(|o| o.verdict), Some(Verdict::Won | Verdict::Winner(_)));
        ui::apply_overlays(ui, self.session.phase(), won);

        if let Some(outcome) = outcome {
            ui.set_text(overlay::RESULT_TEXT, &result_text(outcome.verdict));
            ui.set_text(overlay::FINAL_SCORE, &outcome.score.to_string());
        }
    }
}

fn seed_for(base: u64, generation: Generation) -> u64 {
    base.wrapping_add(generation.0.wrapping_mul(SEED_MIX))
}

fn result_text(verdict: Verdict) -> String {
    match verdict {
        Verdict::Won => "You Win!".to_string(),
        Verdict::Lost => "Game Over".to_string(),
        Verdict::Winner(n) => format!("Player {n} Wins!"),
    }
}

/// Object-safe view of a controller so hosts can pick a game at run time
pub trait Arcade<S: Scheduler> {
    fn name(&self) -> &'static str;
    fn phase(&self) -> SessionPhase;
    fn stats(&self) -> Stats;
    fn outcome(&self) -> Option<Outcome>;
    fn timing(&self) -> Timing;
    fn generation(&self) -> Generation;
    fn start(&mut self) -> bool;
    fn pause(&mut self) -> bool;
    fn resume(&mut self) -> bool;
    fn toggle_pause(&mut self) -> bool;
    fn reset(&mut self);
    fn handle_input(&mut self, input: &InputState) -> bool;
    fn on_tick(&mut self, generation: Generation, input: &InputState, dt: f32) -> bool;
    fn render(&self, out: &mut DrawList);
    fn autopilot(&self) -> InputState;
    fn best(&self) -> Option<f64>;
    fn scheduler_mut(&mut self) -> &mut S;
}

impl<G: Game, S: Scheduler> Arcade<S> for Controller<G, S> {
    fn name(&self) -> &'static str {
        self.session.game.name()
    }

    fn phase(&self) -> SessionPhase {
        Controller::phase(self)
    }

    fn stats(&self) -> Stats {
        Controller::stats(self)
    }

    fn outcome(&self) -> Option<Outcome> {
        Controller::outcome(self)
    }

    fn timing(&self) -> Timing {
        Controller::timing(self)
    }

    fn generation(&self) -> Generation {
        Controller::generation(self)
    }

    fn start(&mut self) -> bool {
        Controller::start(self)
    }

    fn pause(&mut self) -> bool {
        Controller::pause(self)
    }

    fn resume(&mut self) -> bool {
        Controller::resume(self)
    }

    fn toggle_pause(&mut self) -> bool {
        Controller::toggle_pause(self)
    }

    fn reset(&mut self) {
        Controller::reset(self)
    }

    fn handle_input(&mut self, input: &InputState) -> bool {
        Controller::handle_input(self, input)
    }

    fn on_tick(&mut self, generation: Generation, input: &InputState, dt: f32) -> bool {
        Controller::on_tick(self, generation, input, dt)
    }

    fn render(&self, out: &mut DrawList) {
        Controller::render(self, out)
    }

    fn autopilot(&self) -> InputState {
        Controller::autopilot(self)
    }

    fn best(&self) -> Option<f64> {
        Controller::best(self)
    }

    fn scheduler_mut(&mut self) -> &mut S {
        Controller::scheduler_mut(self)
    }
}
