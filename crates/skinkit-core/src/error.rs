//! Error types for the core crate.

use thiserror::Error;

/// Errors raised while reading annotated G-code lines.
///
/// Malformed numeric arguments on a recognized tag are hard failures: the
/// geometry downstream is meaningless without valid constants.
#[derive(Error, Debug)]
pub enum GcodeError {
    /// A recognized tag carried a word that does not parse as a number.
    #[error("invalid numeric argument '{value}' after {tag}")]
    InvalidNumber { tag: String, value: String },

    /// A recognized tag is missing its required argument.
    #[error("missing argument after {tag}")]
    MissingArgument { tag: String },

    /// A rotation marker carried an unparseable complex literal.
    #[error("invalid rotation literal '{0}'")]
    InvalidRotation(String),
}

/// Result type alias for G-code line parsing.
pub type GcodeResult<T> = Result<T, GcodeError>;
