//! Error type for loading definition documents.
//!
//! Structural problems in a tree are reported as
//! [`DefinitionError`](crate::DefinitionError); this type adds the I/O and
//! deserialization failures that can happen before a tree exists.

use std::path::PathBuf;

use thiserror::Error;

use crate::DefinitionError;

/// Errors that can occur while loading a command definition document.
#[derive(Debug, Error)]
pub enum LoadError {
    /// File I/O failure.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON parsing failure.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// YAML parsing failure.
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// The file extension names no supported format.
    #[error("unsupported definition format: {}", .0.display())]
    UnsupportedFormat(PathBuf),

    /// The document parsed but describes an invalid tree.
    #[error("invalid definition: {0}")]
    Definition(#[from] DefinitionError),
}

/// Convenience alias for results with [`LoadError`].
pub type Result<T, E = LoadError> = std::result::Result<T, E>;
