//! Base error type.
//!
//! Sub-crates define their own error enums and wrap `RrError` as one variant
//! via `#[from]`, so configuration problems surface unchanged at any layer.

use thiserror::Error;

/// The top-level error type for `rr-core`.
#[derive(Debug, Error)]
pub enum RrError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("unknown {what} code {code:?}")]
    UnknownCode { what: &'static str, code: String },
}

/// Shorthand result type for `rr-core`.
pub type RrResult<T> = Result<T, RrError>;
