//! Input events delivered to components

use serde::{Deserialize, Serialize};

/// A key press routed to a component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyboardEvent {
    /// Physical key code (`37` for the left arrow, ...)
    pub key_code: u32,
    default_prevented: bool,
}

impl KeyboardEvent {
    pub fn new(key_code: u32) -> Self {
        Self {
            key_code,
            default_prevented: false,
        }
    }

    /// Suppress the environment's default handling (scrolling for arrows)
    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prevent_default() {
        let mut event = KeyboardEvent::new(39);
        assert!(!event.default_prevented());

        event.prevent_default();
        assert!(event.default_prevented());
        assert_eq!(event.key_code, 39);
    }
}
