//! Configuration for the Synthesizer

use reshape_engine::DEFAULT_MAX_OUTPUTS;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the Synthesizer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthesizerConfig {
    /// Repair invocations allowed per repair loop (each fragment, the composite,
    /// and each field match get their own counter)
    pub max_retries: u32,

    /// Maximum time for a single model call (seconds)
    pub llm_timeout_secs: u64,

    /// Pause before each repair attempt (milliseconds)
    pub repair_delay_ms: u64,

    /// Maximum serialized input document length (characters)
    pub max_document_chars: usize,

    /// Outputs a fragment may yield before it is rejected as runaway
    pub max_query_outputs: usize,
}

impl SynthesizerConfig {
    /// Get the model call timeout as a Duration
    pub fn llm_timeout(&self) -> Duration {
        Duration::from_secs(self.llm_timeout_secs)
    }

    /// Get the repair delay as a Duration
    pub fn repair_delay(&self) -> Duration {
        Duration::from_millis(self.repair_delay_ms)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.llm_timeout_secs == 0 {
            return Err("llm_timeout_secs must be greater than 0".to_string());
        }
        if self.max_document_chars == 0 {
            return Err("max_document_chars must be greater than 0".to_string());
        }
        if self.max_query_outputs == 0 {
            return Err("max_query_outputs must be greater than 0".to_string());
        }
        Ok(())
    }
}

impl Default for SynthesizerConfig {
    /// Default configuration with balanced settings
    fn default() -> Self {
        Self {
            max_retries: 10,
            llm_timeout_secs: 120,
            repair_delay_ms: 0,
            max_document_chars: 100_000,
            max_query_outputs: DEFAULT_MAX_OUTPUTS,
        }
    }
}

impl SynthesizerConfig {
    /// Quick preset: few repairs, short timeouts
    pub fn quick() -> Self {
        Self {
            max_retries: 3,
            llm_timeout_secs: 60,
            repair_delay_ms: 0,
            max_document_chars: 50_000,
            max_query_outputs: DEFAULT_MAX_OUTPUTS,
        }
    }

    /// Thorough preset: more repairs, paced for rate-limited backends
    pub fn thorough() -> Self {
        Self {
            max_retries: 20,
            llm_timeout_secs: 300,
            repair_delay_ms: 1_000,
            max_document_chars: 200_000,
            max_query_outputs: DEFAULT_MAX_OUTPUTS,
        }
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = SynthesizerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.max_retries, 10);
    }

    #[test]
    fn test_presets_are_valid() {
        assert!(SynthesizerConfig::quick().validate().is_ok());
        assert!(SynthesizerConfig::thorough().validate().is_ok());
    }

    #[test]
    fn test_zero_retries_is_allowed() {
        let config = SynthesizerConfig {
            max_retries: 0,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_timeout() {
        let mut config = SynthesizerConfig::default();
        config.llm_timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_document_cap() {
        let mut config = SynthesizerConfig::default();
        config.max_document_chars = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_output_cap() {
        let config = SynthesizerConfig {
            max_query_outputs: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toml_round_trip() {
        let config = SynthesizerConfig::thorough();
        let toml_str = config.to_toml().unwrap();
        let parsed = SynthesizerConfig::from_toml(&toml_str).unwrap();
        assert_eq!(config, parsed);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let parsed = SynthesizerConfig::from_toml("max_retries = 4").unwrap();
        assert_eq!(parsed.max_retries, 4);
        assert_eq!(parsed.llm_timeout_secs, 120);
        assert_eq!(parsed.repair_delay(), Duration::ZERO);
        assert_eq!(parsed.max_query_outputs, DEFAULT_MAX_OUTPUTS);
    }
}
