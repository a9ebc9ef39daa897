//! Runtime settings for the CLI and the batch driver, read from YAML.
//!
//! ```yaml
//! batch_size: 64
//! workers: 4
//! default_label: dep
//! log_level: info
//! color: false
//! ```
//!
//! Every field is optional; missing fields take their defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::models::DEFAULT_LABEL;
use crate::{ErrorContext, ParseError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ParserConfig {
    /// Configurations handed to the model per call.
    pub batch_size: usize,
    /// Partitions processed in parallel by the batch driver.
    pub workers: usize,
    /// Label proposed by the baseline models.
    pub default_label: String,
    /// Default `tracing` filter directive, overridden by `RUST_LOG`.
    pub log_level: String,
    pub color: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            batch_size: 32,
            workers: 1,
            default_label: DEFAULT_LABEL.to_string(),
            log_level: "warn".to_string(),
            color: atty::is(atty::Stream::Stderr),
        }
    }
}

impl ParserConfig {
    pub fn from_yaml(text: &str) -> Result<Self, ParseError> {
        let config: Self = serde_yaml::from_str(text).map_err(|e| ParseError::Config {
            message: "invalid YAML configuration".to_string(),
            ctx: ErrorContext::with_help("see ParserConfig for the accepted keys"),
            source: Some(Box::new(e)),
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ParseError> {
        let text = std::fs::read_to_string(path).map_err(|e| ParseError::io(path, e))?;
        Self::from_yaml(&text)
    }

    fn validate(&self) -> Result<(), ParseError> {
        if self.batch_size == 0 {
            return Err(crate::err_msg!(Config, "batch_size must be at least 1"));
        }
        if self.workers == 0 {
            return Err(crate::err_msg!(Config, "workers must be at least 1"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let config = ParserConfig::from_yaml("batch_size: 8\n").unwrap();
        assert_eq!(config.batch_size, 8);
        assert_eq!(config.workers, 1);
        assert_eq!(config.default_label, "deprel");
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = ParserConfig::from_yaml("batchsize: 8\n").unwrap_err();
        assert!(matches!(err, ParseError::Config { .. }));
    }

    #[test]
    fn zero_batch_size_is_rejected() {
        let err = ParserConfig::from_yaml("batch_size: 0\n").unwrap_err();
        assert!(err.to_string().contains("batch_size"));
    }
}
