//! Keyboard shortcuts for the input dialog

use serde::Serialize;

/// A key as reported by the DOM `KeyboardEvent.key` property
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum Key {
    Enter,
    Escape,
    Tab,
    Backspace,
    Char(char),
    Other(String),
}

impl Key {
    pub fn from_dom(name: &str) -> Self {
        match name {
            "Enter" => Key::Enter,
            "Escape" | "Esc" => Key::Escape,
            "Tab" => Key::Tab,
            "Backspace" => Key::Backspace,
            _ => {
                let mut chars = name.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Key::Char(c),
                    _ => Key::Other(name.to_string()),
                }
            }
        }
    }
}

impl From<&str> for Key {
    fn from(name: &str) -> Self {
        Self::from_dom(name)
    }
}

/// What a key press on the text field asks the input dialog to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputAction {
    /// Same as clicking OK
    Submit,
    /// Same as clicking Cancel
    Dismiss,
}

/// Key mappings active while the input field has focus
#[derive(Debug, Clone)]
pub struct InputKeyMap {
    pub submit: Key,
    pub dismiss: Key,
}

impl Default for InputKeyMap {
    fn default() -> Self {
        Self {
            submit: Key::Enter,
            dismiss: Key::Escape,
        }
    }
}

impl InputKeyMap {
    pub fn action(&self, key: &Key) -> Option<InputAction> {
        if *key == self.submit {
            Some(InputAction::Submit)
        } else if *key == self.dismiss {
            Some(InputAction::Dismiss)
        } else {
            None
        }
    }
}
