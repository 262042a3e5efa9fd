//! UI text/visibility collaborator
//!
//! The engine writes HUD values and overlay visibility after each
//! state-affecting tick. It never reads anything back.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt::Display;
use std::rc::Rc;

use crate::engine::SessionPhase;

/// Overlay panel element ids
pub mod overlay {
    pub const START: &str = "start-screen";
    pub const PAUSE: &str = "pause-screen";
    pub const GAME_OVER: &str = "game-over";
    pub const WIN: &str = "win-screen";
    pub const RESULT_TEXT: &str = "result-text";
    pub const FINAL_SCORE: &str = "final-score";
}

/// A single HUD value keyed by element id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HudField {
    pub id: &'static str,
    pub value: String,
}

impl HudField {
    pub fn new(id: &'static str, value: impl Display) -> Self {
        Self {
            id,
            value: value.to_string(),
        }
    }
}

/// Sink for text and visibility updates
pub trait UiSink {
    fn set_text(&mut self, id: &str, value: &str);
    fn set_visible(&mut self, id: &str, visible: bool);
}

/// Show exactly the overlay that matches the session phase
pub fn apply_overlays(ui: &mut dyn UiSink, phase: SessionPhase, won: bool) {
    ui.set_visible(overlay::START, phase == SessionPhase::NotStarted);
    ui.set_visible(overlay::PAUSE, phase == SessionPhase::Paused);
    ui.set_visible(overlay::GAME_OVER, phase == SessionPhase::Ended && !won);
    ui.set_visible(overlay::WIN, phase == SessionPhase::Ended && won);
}

/// Records the latest text and visibility per element (tests, headless runs)
#[derive(Debug, Clone, Default)]
pub struct RecordingUi {
    pub text: BTreeMap<String, String>,
    pub visible: BTreeMap<String, bool>,
    pub writes: usize,
}

impl RecordingUi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self, id: &str) -> Option<&str> {
        self.text.get(id).map(String::as_str)
    }

    pub fn is_visible(&self, id: &str) -> bool {
        self.visible.get(id).copied().unwrap_or(false)
    }
}

impl UiSink for RecordingUi {
    fn set_text(&mut self, id: &str, value: &str) {
        self.text.insert(id.to_string(), value.to_string());
        self.writes += 1;
    }

    fn set_visible(&mut self, id: &str, visible: bool) {
        self.visible.insert(id.to_string(), visible);
        self.writes += 1;
    }
}

/// Shared sink, so a host (or a test) can keep a handle on what was written
impl<T: UiSink> UiSink for Rc<RefCell<T>> {
    fn set_text(&mut self, id: &str, value: &str) {
        self.borrow_mut().set_text(id, value);
    }

    fn set_visible(&mut self, id: &str, visible: bool) {
        self.borrow_mut().set_visible(id, visible);
    }
}

/// DOM-backed sink: text content by element id, `hidden` class for visibility
#[cfg(target_arch = "wasm32")]
pub struct DomUi {
    document: web_sys::Document,
}

#[cfg(target_arch = "wasm32")]
impl DomUi {
    pub fn new() -> Option<Self> {
        let document = web_sys::window()?.document()?;
        Some(Self { document })
    }
}

#[cfg(target_arch = "wasm32")]
impl UiSink for DomUi {
    fn set_text(&mut self, id: &str, value: &str) {
        if let Some(el) = self.document.get_element_by_id(id) {
            el.set_text_content(Some(value));
        }
    }

    fn set_visible(&mut self, id: &str, visible: bool) {
        if let Some(el) = self.document.get_element_by_id(id) {
            let classes = el.class_list();
            let result = if visible {
                classes.remove_1("hidden")
            } else {
                classes.add_1("hidden")
            };
            if let Err(e) = result {
                log::warn!("Could not toggle {id}: {e:?}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlays_follow_phase() {
        let mut ui = RecordingUi::new();
        apply_overlays(&mut ui, SessionPhase::NotStarted, false);
        assert!(ui.is_visible(overlay::START));
        assert!(!ui.is_visible(overlay::PAUSE));

        apply_overlays(&mut ui, SessionPhase::Paused, false);
        assert!(!ui.is_visible(overlay::START));
        assert!(ui.is_visible(overlay::PAUSE));

        apply_overlays(&mut ui, SessionPhase::Ended, true);
        assert!(ui.is_visible(overlay::WIN));
        assert!(!ui.is_visible(overlay::GAME_OVER));
    }

    #[test]
    fn hud_field_formats_value() {
        let f = HudField::new("score", 120u64);
        assert_eq!(f.value, "120");
    }
}
