//! Error types for the transition engine.

use thiserror::Error;

/// Result type for transition operations.
pub type Result<T> = std::result::Result<T, TransitionError>;

/// Errors raised synchronously by transition operations.
///
/// Only programmer errors surface here. A missing handler or a missing
/// options object is reported through the diagnostic sink instead and the
/// transition carries on with a safe default.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransitionError {
    /// `animate_style` was called with a completion callback.
    #[error(
        "animate_style no longer accepts a completion callback; await the returned animation instead"
    )]
    CallbackArgument,

    /// `get_style` was given something other than a property name or a list of names.
    #[error("get_style must be passed a string, or an array of strings representing style properties (got {0})")]
    InvalidStyleQuery(String),
}
