//! Base error type.
//!
//! Sub-crates define their own error enums and wrap `CoreError` where a
//! configuration or parse problem bubbles up from here.

use thiserror::Error;

use crate::GeoPoint;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid coordinate {0}")]
    InvalidCoordinate(GeoPoint),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Shorthand result type for `tr-core`.
pub type CoreResult<T> = Result<T, CoreError>;
