//! Change notification

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Emitted after a confirmed selection change has been fully rendered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "selected-changed")]
pub struct SelectedChanged {
    /// The newly selected index
    pub detail: usize,
    pub timestamp: DateTime<Utc>,
}

impl SelectedChanged {
    pub const NAME: &'static str = "selected-changed";

    pub fn new(detail: usize) -> Self {
        Self {
            detail,
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_json_shape() {
        let event = SelectedChanged::new(2);
        let json = serde_json::to_value(&event).unwrap();

        assert_eq!(json["type"], SelectedChanged::NAME);
        assert_eq!(json["detail"], 2);
        assert!(json["timestamp"].is_string());

        let parsed: SelectedChanged = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, event);
    }
}
