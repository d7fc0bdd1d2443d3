//! # SkinKit Core
//!
//! Shared building blocks for SkinKit: the tag-bracketed G-code line model
//! (tokenizing, numeric words, the output writer) and the 2D toolpath
//! geometry primitives (loop inset, scanline intersection, endpoint joining,
//! clip-and-simplify, rotation) that the craft stage calls into.

pub mod error;
pub mod gcode;
pub mod geometry;

pub use error::{GcodeError, GcodeResult};
pub use gcode::{
    double_after_first_letter, first_word, parse_f64, split_line, text_lines, without_duplication,
    GcodeWriter, Vector3,
};
pub use geometry::{Point2, Rotation2};
