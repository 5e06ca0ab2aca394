//! Error types for the engine crate.

use data_loader::DataLoadError;
use thiserror::Error;

/// Errors raised by the compatibility and recommendation passes
#[derive(Error, Debug)]
pub enum EngineError {
    /// A tuning knob was rejected before any user was processed
    #[error("Invalid configuration for {field}: {reason}")]
    InvalidConfig { field: &'static str, reason: String },

    /// A store lookup failed while processing a user
    #[error(transparent)]
    Store(#[from] DataLoadError),
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, EngineError>;
