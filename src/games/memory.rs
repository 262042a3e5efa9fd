//! Memory: flip two cards, keep the pairs, beat your best time
//!
//! Card entities carry the hit rectangles; faces and states live in the
//! game. Timed steps (showing a pair, the win pause) count ticks.

use glam::Vec2;

use crate::engine::{
    Aabb, Action, BestSpec, EntityId, Game, InputState, Progress, Shape, SimRng, Spawn, SpawnTimer, Stats,
    StepContext, Verdict, World,
};
use crate::highscores::{self, BestOrder};
use crate::render::{Color, DrawList};
use crate::settings::Difficulty;
use crate::ui::HudField;

pub mod consts {
    pub const CARD_SIZE: f32 = 80.0;
    pub const CARD_GAP: f32 = 10.0;
    /// How long a flipped pair stays visible (800 ms at 60 Hz)
    pub const REVEAL_TICKS: f32 = 48.0;
    /// Pause between the last match and the win (500 ms at 60 Hz)
    pub const WIN_DELAY_TICKS: f32 = 30.0;
    pub const BEST_KEY_PREFIX: &str = "memoryBestTime_";
}

use consts::*;

const SYMBOLS: [&str; 18] = [
    "🎮", "🎯", "🎲", "🎪", "🎨", "🎭", "🎬", "🎸", "🎹", "🎺", "🎻", "🎤", "🎧", "🎼", "🎵", "🎶", "🏀", "⚽",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Card,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardState {
    Hidden,
    Flipped,
    Matched,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Card {
    pub id: EntityId,
    pub symbol: &'static str,
    pub state: CardState,
}

#[derive(Debug, Clone)]
pub struct Memory {
    difficulty: Difficulty,
    cards: Vec<Card>,
    /// Indices of the face-up unmatched cards, at most two
    flipped: Vec<usize>,
    matched_pairs: usize,
    moves: u32,
    reveal: Option<SpawnTimer>,
    win: Option<SpawnTimer>,
}

impl Memory {
    pub fn new(difficulty: Difficulty) -> Self {
        Self {
            difficulty,
            cards: Vec::new(),
            flipped: Vec::new(),
            matched_pairs: 0,
            moves: 0,
            reveal: None,
            win: None,
        }
    }

    pub fn pairs_for(difficulty: Difficulty) -> usize {
        match difficulty {
            Difficulty::Easy => 8,
            Difficulty::Medium => 12,
            Difficulty::Hard => 18,
        }
    }

    pub fn columns_for(difficulty: Difficulty) -> usize {
        match difficulty {
            Difficulty::Easy => 4,
            Difficulty::Medium | Difficulty::Hard => 6,
        }
    }

    pub fn best_key(difficulty: Difficulty) -> String {
        format!("{BEST_KEY_PREFIX}{}", difficulty.as_str())
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn moves(&self) -> u32 {
        self.moves
    }

    pub fn matched_pairs(&self) -> usize {
        self.matched_pairs
    }

    pub fn total_pairs(&self) -> usize {
        self.cards.len() / 2
    }

    pub fn card_at(world: &World<Kind>, point: Vec2) -> Option<EntityId> {
        world.live().find(|e| Aabb::of(e).contains(point)).map(|e| e.id)
    }

    /// Flip a hidden card while fewer than two are showing
    fn flip(&mut self, id: EntityId) {
        if self.reveal.is_some() || self.flipped.len() >= 2 {
            return;
        }
        let Some(index) = self.cards.iter().position(|c| c.id == id) else {
            return;
        };
        if self.cards[index].state != CardState::Hidden {
            return;
        }
        self.cards[index].state = CardState::Flipped;
        self.flipped.push(index);
        if self.flipped.len() == 2 {
            self.moves += 1;
            self.reveal = Some(SpawnTimer::new(REVEAL_TICKS));
        }
    }

    fn settle_pair(&mut self) {
        let [a, b] = self.flipped[..] else {
            self.flipped.clear();
            return;
        };
        let state = if self.cards[a].symbol == self.cards[b].symbol {
            self.matched_pairs += 1;
            CardState::Matched
        } else {
            CardState::Hidden
        };
        self.cards[a].state = state;
        self.cards[b].state = state;
        self.flipped.clear();

        if self.matched_pairs == self.total_pairs() {
            self.win = Some(SpawnTimer::new(WIN_DELAY_TICKS));
        }
    }

    fn elapsed_secs(stats: &Stats) -> u64 {
        stats.elapsed.max(0.0).floor() as u64
    }
}

impl Game for Memory {
    type Kind = Kind;

    fn name(&self) -> &'static str {
        "memory"
    }

    fn initial_lives(&self) -> u32 {
        0
    }

    /// Two of each symbol, shuffled, laid out row by row
    fn setup(&mut self, world: &mut World<Kind>, rng: &mut SimRng) {
        let pairs = Self::pairs_for(self.difficulty);
        let mut deck: Vec<&'static str> = SYMBOLS[..pairs].iter().chain(&SYMBOLS[..pairs]).copied().collect();
        rng.shuffle(&mut deck);

        let columns = Self::columns_for(self.difficulty);
        let pitch = CARD_SIZE + CARD_GAP;
        self.cards = deck
            .into_iter()
            .enumerate()
            .map(|(i, symbol)| {
                let pos = Vec2::new((i % columns) as f32 * pitch, (i / columns) as f32 * pitch);
                let id = world.spawn_now(Spawn::new(Kind::Card, pos, Shape::rect(CARD_SIZE, CARD_SIZE)));
                Card {
                    id,
                    symbol,
                    state: CardState::Hidden,
                }
            })
            .collect();
    }

    /// A showing pair settles first, so a click on the same tick already counts
    fn apply_input(&mut self, world: &mut World<Kind>, input: &InputState, _ctx: &mut StepContext) {
        if let Some(timer) = &mut self.reveal {
            if timer.tick(1.0, REVEAL_TICKS) {
                self.reveal = None;
                self.settle_pair();
            }
        }
        if !input.was_pressed(Action::Select) {
            return;
        }
        if let Some(id) = input.pointer.and_then(|p| Self::card_at(world, p)) {
            self.flip(id);
        }
    }

    fn evaluate(&mut self, _world: &World<Kind>, _ctx: &StepContext) -> Progress {
        if let Some(timer) = &mut self.win {
            if timer.tick(1.0, WIN_DELAY_TICKS) {
                return Progress::End(Verdict::Won);
            }
        }
        Progress::Continue
    }

    fn hud(&self, _world: &World<Kind>, stats: &Stats) -> Vec<HudField> {
        vec![
            HudField::new("moves", self.moves),
            HudField::new("pairs", format!("{} / {}", self.matched_pairs, self.total_pairs())),
            HudField::new("time", highscores::format_time(Self::elapsed_secs(stats))),
            HudField::new("final-moves", self.moves),
            HudField::new("final-time", highscores::format_time(Self::elapsed_secs(stats))),
        ]
    }

    fn draw(&self, world: &World<Kind>, out: &mut DrawList) {
        out.clear(Color::hex(0x1A1A2E));
        for (card, e) in self.cards.iter().zip(world.live()) {
            let size = Vec2::new(e.width(), e.height());
            match card.state {
                CardState::Hidden => out.rect(e.pos, size, Color::hex(0x3A86FF)),
                CardState::Flipped | CardState::Matched => {
                    let face = if card.state == CardState::Matched {
                        Color::hex(0x06FFA5)
                    } else {
                        Color::WHITE
                    };
                    out.rect(e.pos, size, face);
                    out.text(e.center(), card.symbol, Color::BLACK);
                }
            }
        }
    }

    fn best(&self) -> Option<BestSpec> {
        Some(BestSpec {
            key: Self::best_key(self.difficulty),
            order: BestOrder::LowerIsBetter,
            live: false,
            element: "best-time",
        })
    }

    /// Only a finished, won board has a time worth keeping
    fn best_candidate(&self, stats: &Stats, verdict: Option<Verdict>) -> Option<f64> {
        (verdict == Some(Verdict::Won)).then(|| Self::elapsed_secs(stats) as f64)
    }

    /// Perfect recall: open a hidden card, then its twin
    fn autopilot(&self, world: &World<Kind>, stats: &Stats) -> InputState {
        if self.reveal.is_some() || stats.ticks % 2 == 1 {
            return InputState::default();
        }
        let target = match self.flipped.first() {
            Some(&open) => self
                .cards
                .iter()
                .position(|c| c.state == CardState::Hidden && c.symbol == self.cards[open].symbol),
            None => self.cards.iter().position(|c| c.state == CardState::Hidden),
        };
        target
            .and_then(|i| world.get(self.cards[i].id))
            .map(|e| InputState::select_at(e.center()))
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{Session, SessionPhase};

    const DT: f32 = 1.0 / 60.0;

    fn running(difficulty: Difficulty) -> Session<Memory> {
        let mut s = Session::new(Memory::new(difficulty), 6);
        s.start();
        s
    }

    fn click(s: &mut Session<Memory>, index: usize) {
        let id = s.game.cards()[index].id;
        let center = s.world.get(id).unwrap().center();
        s.tick(&InputState::select_at(center), DT);
    }

    fn wait(s: &mut Session<Memory>, ticks: usize) {
        for _ in 0..ticks {
            s.tick(&InputState::default(), DT);
        }
    }

    /// Indices of one matching pair and one card that does not match the first
    fn pair_and_stranger(game: &Memory) -> (usize, usize, usize) {
        let cards = game.cards();
        let twin = (1..cards.len()).find(|&i| cards[i].symbol == cards[0].symbol).unwrap();
        let stranger = (1..cards.len()).find(|&i| cards[i].symbol != cards[0].symbol).unwrap();
        (0, twin, stranger)
    }

    #[test]
    fn deck_sizes_by_difficulty() {
        for (difficulty, pairs) in [(Difficulty::Easy, 8), (Difficulty::Medium, 12), (Difficulty::Hard, 18)] {
            let s = Session::new(Memory::new(difficulty), 1);
            assert_eq!(s.game.cards().len(), pairs * 2);
            assert_eq!(s.world.count(Kind::Card), pairs * 2);
            for card in s.game.cards() {
                let twins = s.game.cards().iter().filter(|c| c.symbol == card.symbol).count();
                assert_eq!(twins, 2);
            }
        }
    }

    #[test]
    fn shuffle_follows_seed() {
        let symbols = |seed| -> Vec<&str> {
            Session::new(Memory::new(Difficulty::Hard), seed)
                .game
                .cards()
                .iter()
                .map(|c| c.symbol)
                .collect()
        };
        assert_eq!(symbols(3), symbols(3));
        assert_ne!(symbols(3), symbols(4));
    }

    #[test]
    fn matching_pair_stays_open() {
        let mut s = running(Difficulty::Easy);
        let (a, b, _) = pair_and_stranger(&s.game);
        click(&mut s, a);
        click(&mut s, b);
        assert_eq!(s.game.moves(), 1);
        assert_eq!(s.game.cards()[a].state, CardState::Flipped);

        wait(&mut s, REVEAL_TICKS as usize);
        assert_eq!(s.game.cards()[a].state, CardState::Matched);
        assert_eq!(s.game.cards()[b].state, CardState::Matched);
        assert_eq!(s.game.matched_pairs(), 1);
    }

    #[test]
    fn mismatch_turns_back() {
        let mut s = running(Difficulty::Easy);
        let (a, _, c) = pair_and_stranger(&s.game);
        click(&mut s, a);
        click(&mut s, c);
        wait(&mut s, REVEAL_TICKS as usize - 1);
        assert_eq!(s.game.cards()[c].state, CardState::Flipped);
        wait(&mut s, 1);
        assert_eq!(s.game.cards()[a].state, CardState::Hidden);
        assert_eq!(s.game.cards()[c].state, CardState::Hidden);
        assert_eq!(s.game.matched_pairs(), 0);
    }

    #[test]
    fn third_card_waits_for_the_pair() {
        let mut s = running(Difficulty::Easy);
        let (a, b, c) = pair_and_stranger(&s.game);
        click(&mut s, a);
        click(&mut s, c);
        click(&mut s, b);
        assert_eq!(s.game.cards()[b].state, CardState::Hidden);
        assert_eq!(s.game.moves(), 1);
    }

    #[test]
    fn same_card_twice_is_one_flip() {
        let mut s = running(Difficulty::Easy);
        click(&mut s, 0);
        click(&mut s, 0);
        assert_eq!(s.game.moves(), 0);
    }

    #[test]
    fn clearing_the_board_wins_after_a_pause() {
        let mut s = running(Difficulty::Easy);
        let total = s.game.total_pairs();
        for _ in 0..total {
            let cards = s.game.cards().to_vec();
            let a = cards.iter().position(|c| c.state == CardState::Hidden).unwrap();
            let b = (a + 1..cards.len()).find(|&i| cards[i].symbol == cards[a].symbol).unwrap();
            click(&mut s, a);
            click(&mut s, b);
            wait(&mut s, REVEAL_TICKS as usize);
        }
        assert_eq!(s.game.matched_pairs(), total);
        assert_eq!(s.phase(), SessionPhase::Running);
        wait(&mut s, WIN_DELAY_TICKS as usize);
        assert_eq!(s.outcome().map(|o| o.verdict), Some(Verdict::Won));
        assert_eq!(s.game.moves(), total as u32);

        let secs = s.game.best_candidate(&s.stats, Some(Verdict::Won)).unwrap();
        assert_eq!(secs, s.stats.elapsed.floor() as f64);
    }

    #[test]
    fn only_wins_offer_a_best_time() {
        let game = Memory::new(Difficulty::Medium);
        let stats = Stats {
            elapsed: 42.7,
            ..Stats::default()
        };
        assert_eq!(game.best_candidate(&stats, Some(Verdict::Won)), Some(42.0));
        assert_eq!(game.best_candidate(&stats, None), None);
        assert_eq!(game.best_candidate(&stats, Some(Verdict::Lost)), None);
        let spec = game.best().unwrap();
        assert_eq!(spec.key, "memoryBestTime_medium");
        assert_eq!(spec.order, BestOrder::LowerIsBetter);
        assert!(!spec.live);
    }

    #[test]
    fn clicks_between_cards_do_nothing() {
        let mut s = running(Difficulty::Easy);
        s.tick(&InputState::select_at(Vec2::new(CARD_SIZE + CARD_GAP / 2.0, 10.0)), DT);
        assert!(s.game.cards().iter().all(|c| c.state == CardState::Hidden));
    }
}
