//! Handling of selection indices that point past the last tab

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexPolicy {
    /// Refuse to render; report `IndexOutOfRange` and leave items untouched
    #[default]
    Strict,
    /// Select the last tab instead and write the clamped index back
    Clamp,
}

impl IndexPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            IndexPolicy::Strict => "strict",
            IndexPolicy::Clamp => "clamp",
        }
    }
}

impl std::fmt::Display for IndexPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for IndexPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "strict" => Ok(IndexPolicy::Strict),
            "clamp" => Ok(IndexPolicy::Clamp),
            _ => Err(format!("Unknown index policy: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_policy() {
        assert_eq!("strict".parse::<IndexPolicy>(), Ok(IndexPolicy::Strict));
        assert_eq!("Clamp".parse::<IndexPolicy>(), Ok(IndexPolicy::Clamp));
        assert!("wrap".parse::<IndexPolicy>().is_err());
    }

    #[test]
    fn test_default_is_strict() {
        assert_eq!(IndexPolicy::default(), IndexPolicy::Strict);
        assert_eq!(IndexPolicy::Clamp.to_string(), "clamp");
    }
}
