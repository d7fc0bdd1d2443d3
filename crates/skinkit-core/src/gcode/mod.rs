//! Line-oriented model of the tag-bracketed G-code annotation convention.
//!
//! Every line is whitespace-tokenized; the first token is the tag that
//! decides how the rest of the line is interpreted. Numeric words carry a
//! leading letter (`X12.5`, `F960.0`, `S210.0`).

mod parse;
mod write;

pub use parse::{
    double_after_first_letter, first_word, parse_f64, parse_rotation, split_line, text_lines,
    Vector3,
};
pub use write::{four_significant_figures, rounded_to_places, without_duplication, GcodeWriter};
