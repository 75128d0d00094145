//! Key code to navigation intent table

use serde::{Deserialize, Serialize};

/// Physical key codes, as reported by keyboard events.
pub mod keycodes {
    pub const TAB: u32 = 9;
    pub const ENTER: u32 = 13;
    pub const ESC: u32 = 27;
    pub const SPACE: u32 = 32;
    pub const END: u32 = 35;
    pub const HOME: u32 = 36;
    pub const LEFT: u32 = 37;
    pub const UP: u32 = 38;
    pub const RIGHT: u32 = 39;
    pub const DOWN: u32 = 40;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intent {
    Previous,
    Next,
    First,
    Last,
}

const BINDINGS: &[(u32, Intent)] = &[
    (keycodes::LEFT, Intent::Previous),
    (keycodes::RIGHT, Intent::Next),
    (keycodes::HOME, Intent::First),
    (keycodes::END, Intent::Last),
];

/// Static lookup from key code to intent. Codes not bound here are ignored
/// by the tab list and keep their default behavior.
pub struct KeyMap;

impl KeyMap {
    pub fn lookup(key_code: u32) -> Option<Intent> {
        BINDINGS
            .iter()
            .find(|(code, _)| *code == key_code)
            .map(|(_, intent)| *intent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bound_keys() {
        assert_eq!(KeyMap::lookup(keycodes::LEFT), Some(Intent::Previous));
        assert_eq!(KeyMap::lookup(keycodes::RIGHT), Some(Intent::Next));
        assert_eq!(KeyMap::lookup(keycodes::HOME), Some(Intent::First));
        assert_eq!(KeyMap::lookup(keycodes::END), Some(Intent::Last));
    }

    #[test]
    fn test_unbound_keys() {
        for code in [
            keycodes::TAB,
            keycodes::ENTER,
            keycodes::ESC,
            keycodes::SPACE,
            keycodes::UP,
            keycodes::DOWN,
            65,
        ] {
            assert_eq!(KeyMap::lookup(code), None, "key code {code}");
        }
    }
}
