//! Subject configuration
//!
//! # Example
//!
//! ```
//! use shared_subject::{Subject, SubjectConfig};
//!
//! let config = SubjectConfig::new("block-events").with_metrics(false);
//! let subject: Subject = Subject::with_config(config).expect("valid config");
//! assert_eq!(subject.label(), "block-events");
//! ```

use crate::error::SubjectError;
use crate::{DEFAULT_LABEL, MAX_LABEL_LEN};
use serde::{Deserialize, Serialize};
use std::env;

/// Environment variable holding the subject label.
pub const ENV_LABEL: &str = "SUBJECT_LABEL";

/// Environment variable toggling metrics collection.
pub const ENV_METRICS: &str = "SUBJECT_METRICS";

/// Configuration for a [`Subject`](crate::Subject).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectConfig {
    /// Name attached to every log record emitted by the subject.
    pub label: String,

    /// Whether dispatch counters are collected.
    pub metrics_enabled: bool,
}

impl Default for SubjectConfig {
    fn default() -> Self {
        Self {
            label: DEFAULT_LABEL.to_string(),
            metrics_enabled: true,
        }
    }
}

impl SubjectConfig {
    /// Default configuration with the given label.
    #[must_use]
    pub fn new(label: impl Into<String>) -> Self {
        Self::default().with_label(label)
    }

    /// Replace the label.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Enable or disable metrics collection.
    #[must_use]
    pub fn with_metrics(mut self, enabled: bool) -> Self {
        self.metrics_enabled = enabled;
        self
    }

    /// Check the label bounds.
    ///
    /// # Errors
    ///
    /// - `SubjectError::EmptyLabel` - Label is empty or whitespace
    /// - `SubjectError::LabelTooLong` - Label exceeds `MAX_LABEL_LEN` bytes
    pub fn validate(&self) -> Result<(), SubjectError> {
        if self.label.trim().is_empty() {
            return Err(SubjectError::EmptyLabel);
        }

        if self.label.len() > MAX_LABEL_LEN {
            return Err(SubjectError::LabelTooLong {
                len: self.label.len(),
                max: MAX_LABEL_LEN,
            });
        }

        Ok(())
    }

    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `SUBJECT_LABEL`: Log label (default: subject)
    /// - `SUBJECT_METRICS`: `true`/`false`/`1`/`0` (default: true)
    ///
    /// # Errors
    ///
    /// Returns `SubjectError::InvalidEnvValue` for an unparsable metrics flag,
    /// or any error from [`validate`](Self::validate).
    pub fn from_env() -> Result<Self, SubjectError> {
        Self::from_lookup(|var| env::var(var).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, SubjectError> {
        let mut config = Self::default();

        if let Some(label) = lookup(ENV_LABEL) {
            config.label = label;
        }

        if let Some(value) = lookup(ENV_METRICS) {
            config.metrics_enabled = match value.trim().to_ascii_lowercase().as_str() {
                "true" | "1" => true,
                "false" | "0" => false,
                _ => {
                    return Err(SubjectError::InvalidEnvValue {
                        var: ENV_METRICS,
                        value,
                    })
                }
            };
        }

        config.validate()?;
        Ok(config)
    }
}
