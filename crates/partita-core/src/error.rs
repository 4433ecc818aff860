//! Parse errors for the requirement grammar.

use thiserror::Error;

/// Errors produced while parsing versions, formulas, and requirements.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseError {
    /// A semantic version string could not be parsed.
    #[error("invalid version '{version}': {message}")]
    InvalidVersion {
        /// The offending version string.
        version: String,
        /// Parser message.
        message: String,
    },

    /// A version formula (or one of its disjuncts) could not be parsed.
    #[error("invalid version formula '{formula}': {message}")]
    InvalidFormula {
        /// The offending formula string.
        formula: String,
        /// Parser message.
        message: String,
    },

    /// A source reference could not be parsed.
    #[error("invalid source reference '{spec}': {message}")]
    InvalidSourceSpec {
        /// The offending source string.
        spec: String,
        /// Parser message.
        message: String,
    },
}
