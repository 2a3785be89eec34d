//! Generator configuration.

use keel_primitives::types::CODE_SIZE;
use serde::{Deserialize, Serialize};

/// Resource limits for one top-level execution.
///
/// Both limits must be identical on every node replaying the same
/// execution, otherwise results diverge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Capacity of the shared code buffer, in bytes.
    /// Default: `CODE_SIZE` (512 KiB).
    pub code_buffer_size: usize,

    /// Maximum nesting depth of cross-contract calls. The top-level frame is
    /// depth 0. `None` leaves depth bounded only by the code buffer.
    pub max_call_depth: Option<u32>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            code_buffer_size: CODE_SIZE,
            max_call_depth: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = GeneratorConfig::default();
        assert_eq!(config.code_buffer_size, 512 * 1024);
        assert_eq!(config.max_call_depth, None);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: GeneratorConfig = serde_json::from_str(r#"{"max_call_depth": 16}"#).unwrap();
        assert_eq!(config.max_call_depth, Some(16));
        assert_eq!(config.code_buffer_size, CODE_SIZE);
    }

    #[test]
    fn test_json_roundtrip() {
        let config = GeneratorConfig {
            code_buffer_size: 4096,
            max_call_depth: Some(3),
        };
        let json = serde_json::to_string(&config).unwrap();
        let back: GeneratorConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, back);
    }
}
