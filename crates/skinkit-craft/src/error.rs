//! Error types for the skin stage.

use skinkit_core::GcodeError;
use thiserror::Error;

/// Errors that abort the transform.
///
/// Structurally unbalanced markers are deliberately NOT errors: a generator
/// invoked without its capture buffer is a silent no-op, which keeps the
/// stage tolerant of partial or truncated streams.
#[derive(Error, Debug)]
pub enum SkinError {
    /// A recognized tag carried a malformed numeric argument.
    #[error(transparent)]
    Gcode(#[from] GcodeError),

    /// The initialization region never supplied a required machine constant.
    #[error("missing required initialization tag {0}")]
    MissingTag(&'static str),
}
