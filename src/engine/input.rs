//! Logical input state for one tick
//!
//! The host maps keys, buttons and touches onto a fixed action set. The update
//! step only ever reads this; one-shot presses are cleared by the host after
//! the tick that consumed them.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Logical actions shared by every game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Action {
    Left,
    Right,
    Up,
    Down,
    /// Launch / fire / jump / hard drop / continue
    Primary,
    /// Pause toggle
    Pause,
    /// Leave the start screen
    Start,
    /// Pointer press (card flip, ...)
    Select,
    /// Second local player
    AltLeft,
    AltRight,
    AltUp,
    AltDown,
}

/// Compact set of actions
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionSet(u16);

impl ActionSet {
    pub const EMPTY: Self = Self(0);

    #[inline]
    fn bit(action: Action) -> u16 {
        1 << action as u8
    }

    pub fn insert(&mut self, action: Action) {
        self.0 |= Self::bit(action);
    }

    pub fn remove(&mut self, action: Action) {
        self.0 &= !Self::bit(action);
    }

    #[inline]
    pub fn contains(&self, action: Action) -> bool {
        self.0 & Self::bit(action) != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn clear(&mut self) {
        self.0 = 0;
    }
}

impl FromIterator<Action> for ActionSet {
    fn from_iter<T: IntoIterator<Item = Action>>(iter: T) -> Self {
        let mut set = ActionSet::EMPTY;
        for action in iter {
            set.insert(action);
        }
        set
    }
}

/// Input for a single tick
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InputState {
    /// Actions currently held down
    pub held: ActionSet,
    /// Actions pressed since the previous tick (edge-triggered)
    pub pressed: ActionSet,
    /// Pointer/touch position in playfield coordinates, if the pointer is in use
    pub pointer: Option<Vec2>,
}

impl InputState {
    /// Input with only these actions held
    pub fn holding(actions: &[Action]) -> Self {
        Self {
            held: actions.iter().copied().collect(),
            ..Default::default()
        }
    }

    /// Input with a single one-shot press
    pub fn press(action: Action) -> Self {
        let mut input = Self::default();
        input.pressed.insert(action);
        input
    }

    /// Input with a pointer position and a select press
    pub fn select_at(pointer: Vec2) -> Self {
        let mut input = Self::press(Action::Select);
        input.pointer = Some(pointer);
        input
    }

    #[inline]
    pub fn is_held(&self, action: Action) -> bool {
        self.held.contains(action)
    }

    #[inline]
    pub fn was_pressed(&self, action: Action) -> bool {
        self.pressed.contains(action)
    }

    /// Held or freshly pressed
    pub fn is_active(&self, action: Action) -> bool {
        self.is_held(action) || self.was_pressed(action)
    }

    /// Horizontal intent in -1..=1 for a left/right pair
    pub fn axis(&self, negative: Action, positive: Action) -> f32 {
        let mut v = 0.0;
        if self.is_held(negative) {
            v -= 1.0;
        }
        if self.is_held(positive) {
            v += 1.0;
        }
        v
    }

    /// Clear one-shot presses after a tick consumed them
    pub fn clear_presses(&mut self) {
        self.pressed.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_set_insert_remove() {
        let mut set = ActionSet::EMPTY;
        set.insert(Action::Left);
        set.insert(Action::AltDown);
        assert!(set.contains(Action::Left));
        assert!(set.contains(Action::AltDown));
        assert!(!set.contains(Action::Right));
        set.remove(Action::Left);
        assert!(!set.contains(Action::Left));
        assert!(!set.is_empty());
    }

    #[test]
    fn axis_cancels_out() {
        let input = InputState::holding(&[Action::Left, Action::Right]);
        assert_eq!(input.axis(Action::Left, Action::Right), 0.0);
        let input = InputState::holding(&[Action::Right]);
        assert_eq!(input.axis(Action::Left, Action::Right), 1.0);
    }

    #[test]
    fn presses_clear_but_holds_stay() {
        let mut input = InputState::holding(&[Action::Up]);
        input.pressed.insert(Action::Primary);
        assert!(input.is_active(Action::Primary));
        input.clear_presses();
        assert!(!input.was_pressed(Action::Primary));
        assert!(input.is_held(Action::Up));
    }
}
