//! Classification of body lines into structural events.
//!
//! The single forward pass dispatches on a closed enumeration instead of
//! comparing tag strings at every call site, so a new marker kind cannot be
//! half-handled.

use skinkit_core::gcode::{
    double_after_first_letter, parse_f64, parse_rotation, split_line, Vector3,
};
use skinkit_core::{GcodeError, GcodeResult, Point2, Rotation2};

/// The axis and feed words of a linear motion command. Absent words inherit
/// the previous value when resolved.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MoveWords {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub z: Option<f64>,
    pub feed_rate: Option<f64>,
}

impl MoveWords {
    /// Resolve the target location relative to the previous one.
    pub fn resolve(&self, old: Option<Vector3>) -> Vector3 {
        let mut location = old.unwrap_or_default();
        if let Some(x) = self.x {
            location.x = x;
        }
        if let Some(y) = self.y {
            location.y = y;
        }
        if let Some(z) = self.z {
            location.z = z;
        }
        location
    }
}

/// One structural event of the body region.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LineEvent {
    /// `G1` linear motion.
    Move(MoveWords),
    /// `M101` extruder on.
    ExtruderOn,
    /// `M103` extruder off.
    ExtruderOff,
    /// `M108 S<rate>` flow rate.
    FlowRate(f64),
    /// `(<layer> <z> )` start of a layer.
    LayerStart(f64),
    /// `(<perimeter> ...)` start of a perimeter pass.
    PerimeterStart,
    /// `(</perimeter>)` end of a perimeter pass.
    PerimeterEnd,
    /// `(<infill>)` start of an infill region.
    InfillStart,
    /// `(</infill>)` end of an infill region.
    InfillEnd,
    /// `(<infillBoundary>)` start of one infill boundary loop.
    InfillBoundaryStart,
    /// `(<infillPoint> X Y Z )` one vertex of an infill boundary loop.
    InfillPoint(Point2),
    /// `(<boundaryPoint> X Y Z )` one vertex of a layer boundary loop.
    BoundaryPoint(Point2),
    /// `(</boundaryPerimeter>)` end of a layer boundary loop.
    BoundaryPerimeterEnd,
    /// `(<rotation> <complex> )` infill rotation of the layer.
    Rotation(Rotation2),
    /// Anything else; forwarded untouched.
    Other,
}

/// Classify one body line. Malformed numeric arguments on recognized tags are
/// hard failures.
pub fn classify(line: &str) -> GcodeResult<LineEvent> {
    let words = split_line(line);
    let Some(&first) = words.first() else {
        return Ok(LineEvent::Other);
    };
    let event = match first {
        "G1" => {
            let mut move_words = MoveWords::default();
            for word in &words[1..] {
                match word.chars().next() {
                    Some('X') => move_words.x = Some(double_after_first_letter("G1", word)?),
                    Some('Y') => move_words.y = Some(double_after_first_letter("G1", word)?),
                    Some('Z') => move_words.z = Some(double_after_first_letter("G1", word)?),
                    Some('F') => {
                        move_words.feed_rate = Some(double_after_first_letter("G1", word)?)
                    }
                    _ => {}
                }
            }
            LineEvent::Move(move_words)
        }
        "M101" => LineEvent::ExtruderOn,
        "M103" => LineEvent::ExtruderOff,
        "M108" => LineEvent::FlowRate(double_after_first_letter(
            "M108",
            argument(first, &words)?,
        )?),
        "(<layer>" => LineEvent::LayerStart(parse_f64(first, argument(first, &words)?)?),
        "(<perimeter>" => LineEvent::PerimeterStart,
        "(</perimeter>)" => LineEvent::PerimeterEnd,
        "(<infill>)" => LineEvent::InfillStart,
        "(</infill>)" => LineEvent::InfillEnd,
        "(<infillBoundary>)" => LineEvent::InfillBoundaryStart,
        "(<infillPoint>" => LineEvent::InfillPoint(point_argument(first, &words)?),
        "(<boundaryPoint>" => LineEvent::BoundaryPoint(point_argument(first, &words)?),
        "(</boundaryPerimeter>)" => LineEvent::BoundaryPerimeterEnd,
        "(<rotation>" => LineEvent::Rotation(parse_rotation(argument(first, &words)?)?),
        _ => LineEvent::Other,
    };
    Ok(event)
}

fn argument<'a>(tag: &str, words: &[&'a str]) -> GcodeResult<&'a str> {
    words.get(1).copied().ok_or_else(|| GcodeError::MissingArgument {
        tag: tag.to_string(),
    })
}

/// Parse the 2D projection of a bracketed point marker such as
/// `(<boundaryPoint> X1.0 Y2.0 Z0.4 )`.
fn point_argument(tag: &str, words: &[&str]) -> GcodeResult<Point2> {
    let mut point = Point2::default();
    let mut seen_any = false;
    for word in &words[1..] {
        match word.chars().next() {
            Some('X') => {
                point.x = double_after_first_letter(tag, word)?;
                seen_any = true;
            }
            Some('Y') => {
                point.y = double_after_first_letter(tag, word)?;
                seen_any = true;
            }
            _ => {}
        }
    }
    if !seen_any {
        return Err(GcodeError::MissingArgument {
            tag: tag.to_string(),
        });
    }
    Ok(point)
}
