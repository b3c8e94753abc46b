//! Error types for the subject crate
//!
//! Dispatch itself has no runtime failure modes: unknown tags, unmatched
//! signatures, repeated unsubscribes, and unsubscribes after the subject is
//! gone are all silent no-ops. Errors only arise while building a subject
//! from configuration.

use thiserror::Error;

/// Errors from subject construction and configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SubjectError {
    #[error("Subject label must not be empty")]
    EmptyLabel,

    #[error("Subject label too long: {len} > {max}")]
    LabelTooLong { len: usize, max: usize },

    #[error("Invalid value for {var}: {value:?}")]
    InvalidEnvValue { var: &'static str, value: String },
}
