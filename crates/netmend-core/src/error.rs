//! Error types for netmend-core

use thiserror::Error;

/// Engine error type
#[derive(Error, Debug)]
pub enum Error {
    /// A sibling with the same text already exists under a parent that does
    /// not allow duplicate children
    #[error("duplicate child {text:?} under {parent:?}")]
    DuplicateChild {
        /// Text of the parent node (empty for the root)
        parent: String,
        /// Text of the rejected child
        text: String,
    },

    /// A rule payload failed validation at driver or rule-file construction
    #[error("invalid rule: {0}")]
    InvalidRule(String),

    /// JSON serialization error (tree dump/load, reports)
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Malformed input text
    #[error("parse error at line {line}: {message}: {text:?}")]
    Parse {
        /// 1-based line number of the offending line
        line: usize,
        /// What went wrong
        message: String,
        /// The offending text
        text: String,
    },

    /// Two configs from different platforms were combined
    #[error("platform mismatch: {left} vs {right}")]
    PlatformMismatch {
        /// Platform of the left operand
        left: String,
        /// Platform of the right operand
        right: String,
    },

    /// Driver factory lookup failed
    #[error("unsupported platform: {0}")]
    UnsupportedPlatform(String),

    /// YAML deserialization error (tag rule files)
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Engine result type
pub type Result<T> = std::result::Result<T, Error>;
