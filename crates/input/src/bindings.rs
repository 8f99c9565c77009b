use crate::action::Action;
use std::collections::BTreeMap;

/// Character key to action table.
///
/// Lookups ignore case, so `W` and `w` page the same way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyBindings {
    keys: BTreeMap<char, Action>,
}

impl Default for KeyBindings {
    fn default() -> Self {
        let mut bindings = Self::empty();
        bindings.bind('z', Action::ZeroSensor);
        bindings.bind('f', Action::FullScreen);
        bindings.bind('w', Action::PageUp);
        bindings.bind('s', Action::PageDown);
        bindings.bind('a', Action::SpinLeft);
        bindings.bind('d', Action::SpinRight);
        bindings
    }
}

impl KeyBindings {
    pub fn empty() -> Self {
        Self {
            keys: BTreeMap::new(),
        }
    }

    /// Bind `key` to `action`, replacing any previous binding.
    pub fn bind(&mut self, key: char, action: Action) -> Option<Action> {
        self.keys.insert(key.to_ascii_lowercase(), action)
    }

    pub fn action_for(&self, key: char) -> Action {
        self.keys
            .get(&key.to_ascii_lowercase())
            .copied()
            .unwrap_or(Action::Noop)
    }

    /// Map the text of a key press. Only single-character text is bound.
    pub fn action_for_text(&self, text: &str) -> Action {
        let mut chars = text.chars();
        match (chars.next(), chars.next()) {
            (Some(key), None) => self.action_for(key),
            _ => Action::Noop,
        }
    }

    /// Bound keys in key order.
    pub fn iter(&self) -> impl Iterator<Item = (char, Action)> + '_ {
        self.keys.iter().map(|(k, a)| (*k, *a))
    }

    /// One-line help text, e.g. `a: SpinLeft | d: SpinRight`.
    pub fn help(&self) -> String {
        self.iter()
            .map(|(key, action)| format!("{key}: {action:?}"))
            .collect::<Vec<_>>()
            .join(" | ")
    }
}
