//! Tokenizing and numeric-word parsing for annotated G-code lines.

use crate::error::{GcodeError, GcodeResult};
use crate::geometry::Rotation2;

/// A 3D location plus nothing else; motion commands mutate one of these
/// letter by letter, leaving unspecified axes at their previous value.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vector3 {
    /// Create a new location.
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// Split a text into lines, tolerating CRLF endings and a missing final
/// newline.
pub fn text_lines(text: &str) -> Vec<&str> {
    text.lines().map(|line| line.trim_end_matches('\r')).collect()
}

/// Split a line into its whitespace-delimited words.
pub fn split_line(line: &str) -> Vec<&str> {
    line.split_whitespace().collect()
}

/// The leading tag of a line, or the empty string for a blank line.
pub fn first_word(line: &str) -> &str {
    line.split_whitespace().next().unwrap_or("")
}

/// Parse a bare float word, reporting the owning tag on failure.
pub fn parse_f64(tag: &str, word: &str) -> GcodeResult<f64> {
    word.parse::<f64>().map_err(|_| GcodeError::InvalidNumber {
        tag: tag.to_string(),
        value: word.to_string(),
    })
}

/// Parse the number after the leading letter of a word such as `S210.0`.
pub fn double_after_first_letter(tag: &str, word: &str) -> GcodeResult<f64> {
    if word.len() < 2 {
        return Err(GcodeError::MissingArgument {
            tag: tag.to_string(),
        });
    }
    parse_f64(tag, &word[1..])
}

/// Parse a rotation marker argument.
///
/// The argument is a Python-style complex literal as written by the fill
/// stage: `(0.6+0.8j)`, `(0.6-0.8j)`, `1j`, or a bare real like `1.0`.
pub fn parse_rotation(word: &str) -> GcodeResult<Rotation2> {
    let bad = || GcodeError::InvalidRotation(word.to_string());
    let inner = word.trim_start_matches('(').trim_end_matches(')');
    if inner.is_empty() {
        return Err(bad());
    }
    if let Some(body) = inner.strip_suffix('j') {
        // Search for the sign separating real and imaginary parts, ignoring
        // a leading sign and exponent signs.
        let mut split_at = None;
        for (index, ch) in body.char_indices().skip(1) {
            if (ch == '+' || ch == '-') && !matches!(&body[index - 1..index], "e" | "E") {
                split_at = Some(index);
            }
        }
        let (real, imag) = match split_at {
            Some(index) => {
                let real = body[..index].parse::<f64>().map_err(|_| bad())?;
                let imag = match &body[index..] {
                    "+" => 1.0,
                    "-" => -1.0,
                    imag_text => imag_text.parse::<f64>().map_err(|_| bad())?,
                };
                (real, imag)
            }
            None => {
                // Pure imaginary such as `1j` or `-j`.
                let imag = match body {
                    "" | "+" => 1.0,
                    "-" => -1.0,
                    imag_text => imag_text.parse::<f64>().map_err(|_| bad())?,
                };
                (0.0, imag)
            }
        };
        Ok(Rotation2::new(real, imag))
    } else {
        let real = inner.parse::<f64>().map_err(|_| bad())?;
        Ok(Rotation2::new(real, 0.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn words_split_on_whitespace() {
        assert_eq!(split_line("G1  X10.0\tF960.0"), vec!["G1", "X10.0", "F960.0"]);
        assert_eq!(first_word("  "), "");
        assert_eq!(first_word("(<layer> 0.4 )"), "(<layer>");
    }

    #[test]
    fn malformed_number_is_a_hard_error() {
        assert!(double_after_first_letter("M108", "Sabc").is_err());
        assert!(parse_f64("(<layer>", "zilch").is_err());
    }

    #[test]
    fn rotation_literals() {
        let rotation = parse_rotation("(0.6+0.8j)").unwrap();
        assert!((rotation.x - 0.6).abs() < 1e-12);
        assert!((rotation.y - 0.8).abs() < 1e-12);

        let rotation = parse_rotation("(0.6-0.8j)").unwrap();
        assert!((rotation.y + 0.8).abs() < 1e-12);

        let rotation = parse_rotation("1j").unwrap();
        assert!((rotation.x).abs() < 1e-12);
        assert!((rotation.y - 1.0).abs() < 1e-12);

        let rotation = parse_rotation("1.0").unwrap();
        assert!((rotation.x - 1.0).abs() < 1e-12);
        assert!((rotation.y).abs() < 1e-12);

        assert!(parse_rotation("(west)").is_err());
    }
}
