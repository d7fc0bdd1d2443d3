//! Output assembly for annotated G-code.
//!
//! `GcodeWriter` accumulates the rewritten stream line by line and knows how
//! to emit motion commands, flow-rate commands, and extrusion threads at a
//! fixed number of carried decimal places.

use tracing::warn;

use crate::geometry::Point2;

/// Render a value rounded to the given number of decimal places, trimming
/// trailing zeros the way the upstream toolchain writes numbers.
pub fn rounded_to_places(places: usize, value: f64) -> String {
    let mut text = format!("{value:.places$}");
    if text.contains('.') {
        while text.ends_with('0') {
            text.pop();
        }
        if text.ends_with('.') {
            text.push('0');
        }
    }
    text
}

/// Render a value with four significant figures.
pub fn four_significant_figures(value: f64) -> String {
    let magnitude = value.abs();
    if magnitude >= 100.0 {
        return rounded_to_places(1, value);
    }
    if magnitude < 1e-9 {
        return rounded_to_places(13, value);
    }
    let places = 3 - magnitude.log10().floor() as i32;
    rounded_to_places(places.max(0) as usize, value)
}

/// Drop all but the last of every consecutive run of lines sharing the given
/// command word. A flow rate that is set and immediately reset collapses to
/// the reset.
pub fn without_duplication(duplicate_word: &str, text: &str) -> String {
    let mut output = String::with_capacity(text.len());
    let mut pending: Option<&str> = None;
    for line in text.lines() {
        let line = line.trim_end_matches('\r');
        if super::first_word(line) == duplicate_word {
            pending = Some(line);
            continue;
        }
        if let Some(held) = pending.take() {
            output.push_str(held);
            output.push('\n');
        }
        output.push_str(line);
        output.push('\n');
    }
    if let Some(held) = pending {
        output.push_str(held);
        output.push('\n');
    }
    output
}

/// Accumulator for the rewritten stream.
#[derive(Debug, Default)]
pub struct GcodeWriter {
    output: String,
    decimal_places: usize,
}

impl GcodeWriter {
    /// Create a writer carrying three decimal places.
    pub fn new() -> Self {
        Self {
            output: String::new(),
            decimal_places: 3,
        }
    }

    /// Set the number of decimal places carried on motion words.
    pub fn set_decimal_places(&mut self, places: usize) {
        self.decimal_places = places;
    }

    /// Append one line verbatim. Empty lines are dropped.
    pub fn add_line(&mut self, line: &str) {
        if line.is_empty() {
            return;
        }
        self.output.push_str(line);
        self.output.push('\n');
    }

    /// Append a `M108` flow-rate command.
    pub fn add_flow_rate(&mut self, flow_rate: f64) {
        self.add_line(&format!("M108 S{}", four_significant_figures(flow_rate)));
    }

    /// Append a `G1` move to the given 2D point at the given height and feed
    /// rate.
    pub fn add_z_move(&mut self, feed_rate: f64, point: Point2, z: f64) {
        let line = format!(
            "G1 X{} Y{} Z{} F{}",
            self.rounded(point.x),
            self.rounded(point.y),
            self.rounded(z),
            self.rounded(feed_rate)
        );
        self.add_line(&line);
    }

    /// Append one extrusion thread at the given height: a travel move to the
    /// first point, extruder on, the remaining moves, extruder off.
    pub fn add_thread(&mut self, feed_rate: f64, thread: &[Point2], travel_feed_rate: f64, z: f64) {
        let Some(first) = thread.first() else {
            warn!("skipped a zero length thread");
            return;
        };
        self.add_z_move(travel_feed_rate, *first, z);
        if thread.len() < 2 {
            warn!("skipped a thread of only one point");
            return;
        }
        self.add_line("M101");
        for point in &thread[1..] {
            self.add_z_move(feed_rate, *point, z);
        }
        self.add_line("M103");
    }

    /// Append a tag-bracketed stage-completion marker.
    pub fn add_procedure(&mut self, procedure: &str) {
        self.add_line(&format!(
            "(<procedureName> {procedure} </procedureName>)"
        ));
    }

    /// Consume the writer and return the accumulated text.
    pub fn into_output(self) -> String {
        self.output
    }

    fn rounded(&self, value: f64) -> String {
        rounded_to_places(self.decimal_places, value)
    }
}
