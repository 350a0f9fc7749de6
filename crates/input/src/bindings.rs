use crate::action::Action;
use crate::key::Key;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Keys that went down during one frame.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputFrame {
    pressed: BTreeSet<Key>,
}

impl InputFrame {
    pub fn new() -> Self {
        Self::default()
    }

    /// A frame in which only `key` went down.
    pub fn with(key: Key) -> Self {
        let mut frame = Self::new();
        frame.press(key);
        frame
    }

    pub fn press(&mut self, key: Key) {
        self.pressed.insert(key);
    }

    pub fn was_pressed(&self, key: Key) -> bool {
        self.pressed.contains(&key)
    }

    pub fn is_empty(&self) -> bool {
        self.pressed.is_empty()
    }

    pub fn clear(&mut self) {
        self.pressed.clear();
    }
}

/// Designer-configurable key for each sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyBindings {
    pub expand_appear: Key,
    pub contract_disappear: Key,
    pub random_appear: Key,
    pub random_disappear: Key,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            expand_appear: Key::Digit1,
            contract_disappear: Key::Digit2,
            random_appear: Key::Digit3,
            random_disappear: Key::Digit4,
        }
    }
}

impl KeyBindings {
    pub fn key_for(&self, action: Action) -> Key {
        match action {
            Action::ExpandAppear => self.expand_appear,
            Action::ContractDisappear => self.contract_disappear,
            Action::RandomAppear => self.random_appear,
            Action::RandomDisappear => self.random_disappear,
        }
    }

    /// The action to start this frame, if any. At most one action fires;
    /// ties resolve in [`Action::ALL`] order.
    pub fn resolve(&self, frame: &InputFrame) -> Option<Action> {
        let action = Action::ALL
            .into_iter()
            .find(|a| frame.was_pressed(self.key_for(*a)));
        if let Some(a) = action {
            tracing::trace!(action = %a, key = %self.key_for(a), "resolved key press");
        }
        action
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_frame_resolves_nothing() {
        let bindings = KeyBindings::default();
        assert_eq!(bindings.resolve(&InputFrame::new()), None);
    }

    #[test]
    fn unbound_key_resolves_nothing() {
        let bindings = KeyBindings::default();
        assert_eq!(bindings.resolve(&InputFrame::with(Key::KeyQ)), None);
    }

    #[test]
    fn each_binding_maps_to_its_action() {
        let bindings = KeyBindings::default();
        for action in Action::ALL {
            let frame = InputFrame::with(bindings.key_for(action));
            assert_eq!(bindings.resolve(&frame), Some(action));
        }
    }

    #[test]
    fn simultaneous_presses_follow_priority() {
        let bindings = KeyBindings::default();
        let mut frame = InputFrame::new();
        frame.press(Key::Digit4);
        frame.press(Key::Digit2);
        assert_eq!(bindings.resolve(&frame), Some(Action::ContractDisappear));
        frame.press(Key::Digit1);
        assert_eq!(bindings.resolve(&frame), Some(Action::ExpandAppear));
    }

    #[test]
    fn partial_yaml_keeps_defaults() {
        let bindings: KeyBindings = serde_yaml::from_str("random_disappear: KeyX\n").unwrap();
        assert_eq!(bindings.random_disappear, Key::KeyX);
        assert_eq!(bindings.expand_appear, Key::Digit1);
    }

    #[test]
    fn clear_empties_frame() {
        let mut frame = InputFrame::with(Key::Space);
        assert!(!frame.is_empty());
        frame.clear();
        assert!(frame.is_empty());
    }
}
