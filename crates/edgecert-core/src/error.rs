//! Core domain errors.

use thiserror::Error;

/// Core domain errors for edgecert.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A required field was missing or empty.
    #[error("missing required field: {0}")]
    MissingField(&'static str),
}
