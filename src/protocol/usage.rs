//! Token usage tracking types.

use serde::{Deserialize, Serialize};

/// Token usage statistics attached to a `turn.completed` event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Usage {
    /// Input tokens served from cache.
    pub cached_input_tokens: u64,
    /// Input tokens consumed.
    pub input_tokens: u64,
    /// Output tokens generated.
    pub output_tokens: u64,
}

impl Usage {
    /// Create a new empty Usage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Total input tokens including cached ones.
    pub fn total_input_tokens(&self) -> u64 {
        self.cached_input_tokens + self.input_tokens
    }

    /// Total tokens (input + output).
    pub fn total_tokens(&self) -> u64 {
        self.total_input_tokens() + self.output_tokens
    }

    /// Accumulate usage from another Usage instance.
    pub fn accumulate(&mut self, other: &Usage) {
        self.cached_input_tokens += other.cached_input_tokens;
        self.input_tokens += other.input_tokens;
        self.output_tokens += other.output_tokens;
    }
}

impl std::ops::Add for Usage {
    type Output = Usage;

    fn add(self, other: Usage) -> Usage {
        Usage {
            cached_input_tokens: self.cached_input_tokens + other.cached_input_tokens,
            input_tokens: self.input_tokens + other.input_tokens,
            output_tokens: self.output_tokens + other.output_tokens,
        }
    }
}

impl std::ops::AddAssign for Usage {
    fn add_assign(&mut self, other: Usage) {
        self.accumulate(&other);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_basic_usage() {
        let json = r#"{"cached_input_tokens": 1, "input_tokens": 2, "output_tokens": 3}"#;
        let usage: Usage = serde_json::from_str(json).unwrap();
        assert_eq!(usage.cached_input_tokens, 1);
        assert_eq!(usage.input_tokens, 2);
        assert_eq!(usage.output_tokens, 3);
    }

    #[test]
    fn parse_empty_object() {
        let json = r#"{}"#;
        let usage: Usage = serde_json::from_str(json).unwrap();
        assert_eq!(usage, Usage::default());
    }

    #[test]
    fn total_calculations() {
        let usage = Usage {
            cached_input_tokens: 10,
            input_tokens: 100,
            output_tokens: 50,
        };
        assert_eq!(usage.total_input_tokens(), 110);
        assert_eq!(usage.total_tokens(), 160);
    }

    #[test]
    fn accumulate_usage() {
        let mut usage1 = Usage {
            cached_input_tokens: 1,
            input_tokens: 100,
            output_tokens: 50,
        };
        let usage2 = Usage {
            cached_input_tokens: 2,
            input_tokens: 200,
            output_tokens: 100,
        };
        usage1.accumulate(&usage2);
        assert_eq!(usage1.cached_input_tokens, 3);
        assert_eq!(usage1.input_tokens, 300);
        assert_eq!(usage1.output_tokens, 150);
    }

    #[test]
    fn add_operator() {
        let sum = Usage {
            input_tokens: 100,
            ..Default::default()
        } + Usage {
            input_tokens: 200,
            output_tokens: 5,
            ..Default::default()
        };
        assert_eq!(sum.input_tokens, 300);
        assert_eq!(sum.output_tokens, 5);
    }

    #[test]
    fn add_assign_operator() {
        let mut usage = Usage::new();
        usage += Usage {
            cached_input_tokens: 1,
            input_tokens: 2,
            output_tokens: 3,
        };
        usage += Usage {
            cached_input_tokens: 1,
            input_tokens: 2,
            output_tokens: 3,
        };
        assert_eq!(usage.total_tokens(), 12);
    }

    #[test]
    fn serde_roundtrip() {
        let usage = Usage {
            cached_input_tokens: 7,
            input_tokens: 8,
            output_tokens: 9,
        };
        let json = serde_json::to_string(&usage).unwrap();
        let parsed: Usage = serde_json::from_str(&json).unwrap();
        assert_eq!(usage, parsed);
    }
}
