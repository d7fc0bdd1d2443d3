//! The transformation state machine and the two sub-pass generators.

use tracing::debug;

use skinkit_core::gcode::{text_lines, without_duplication, GcodeWriter, Vector3};
use skinkit_core::geometry::{
    clipped_simplified_loop_path, join_segments_into_paths, largest_inset_loop,
    scanline_intersections, segments_from_intersections,
};
use skinkit_core::{Point2, Rotation2};

use crate::config::SkinConfig;
use crate::error::SkinError;
use crate::event::{classify, LineEvent};
use crate::params::{parse_initialization, MachineParameters, DEFAULT_FEED_RATE};
use crate::prescan;

/// Endpoints closer than this multiple of the skinned infill width join into
/// one path.
const JOIN_WIDTH_MULTIPLIER: f64 = 5.0;

/// Whether every loop has at least `sides` vertices. A loop of two or fewer
/// points can never bound area and fails for any division configuration.
pub fn is_minimum_sides(loops: &[Vec<Point2>], sides: usize) -> bool {
    loops.iter().all(|polygon| polygon.len() >= sides)
}

/// Whether the stage-completion marker for `procedure` is already present.
pub fn is_procedure_done(gcode_text: &str, procedure: &str) -> bool {
    gcode_text.contains(&format!("(<procedureName> {procedure} </procedureName>)"))
}

/// Rewrite each perimeter and infill pass of an annotated toolpath stream
/// into fractional-height sub-passes.
///
/// Returns the input unchanged when it is empty, when the stage has already
/// run on it, or when the feature is deactivated.
pub fn skin_text(gcode_text: &str, config: &SkinConfig) -> Result<String, SkinError> {
    if gcode_text.trim().is_empty() || is_procedure_done(gcode_text, "skin") || !config.activate {
        return Ok(gcode_text.to_string());
    }
    SkinRewriter::rewrite(gcode_text, &config.clamped())
}

/// Single-owner scan state for one forward pass over the body.
struct SkinRewriter {
    config: SkinConfig,
    params: MachineParameters,
    writer: GcodeWriter,
    feed_rate: f64,
    flow_rate: f64,
    location: Option<Vector3>,
    layer_index: i64,
    /// First structural layer index eligible for skinning, already shifted by
    /// the prescan's leading boundary-free layers.
    layers_from: i64,
    /// Index of the last prescanned layer; only this layer triggers infill
    /// capture.
    top_layer_index: i64,
    perimeter: Option<Vec<Point2>>,
    infill_boundaries: Option<Vec<Vec<Point2>>>,
    rotation: Rotation2,
    reverse_rotation: Rotation2,
}

impl SkinRewriter {
    fn rewrite(gcode_text: &str, config: &SkinConfig) -> Result<String, SkinError> {
        let lines = text_lines(gcode_text);
        let mut writer = GcodeWriter::new();
        let (params, body_start) = parse_initialization(&lines, config, &mut writer)?;
        let body = &lines[body_start..];
        let prescan = prescan::scan(body)?;
        let layers_from =
            (config.layers_from + prescan.first_populated_layer().unwrap_or(0)) as i64;
        let top_layer_index = prescan
            .top_layer_index()
            .map_or(-1, |index| index as i64);

        let mut rewriter = Self {
            config: config.clone(),
            feed_rate: DEFAULT_FEED_RATE,
            flow_rate: params.operating_flow_rate,
            params,
            writer,
            location: None,
            layer_index: -1,
            layers_from,
            top_layer_index,
            perimeter: None,
            infill_boundaries: None,
            rotation: Rotation2::identity(),
            reverse_rotation: Rotation2::identity(),
        };
        for line in body {
            rewriter.parse_line(line)?;
        }
        Ok(without_duplication("M108", &rewriter.writer.into_output()))
    }

    fn parse_line(&mut self, line: &str) -> Result<(), SkinError> {
        match classify(line)? {
            LineEvent::Move(words) => {
                if let Some(feed_rate) = words.feed_rate {
                    self.feed_rate = feed_rate;
                }
                let location = words.resolve(self.location);
                self.location = Some(location);
                if self.infill_boundaries.is_some() {
                    // Infill paths are reconstructed geometrically, not
                    // replayed.
                    return Ok(());
                }
                if let Some(perimeter) = self.perimeter.as_mut() {
                    perimeter.push(Point2::new(location.x, location.y));
                    return Ok(());
                }
            }
            LineEvent::ExtruderOn | LineEvent::ExtruderOff => {
                // The regenerated passes bracket their own extrusion.
                if self.infill_boundaries.is_some() || self.perimeter.is_some() {
                    return Ok(());
                }
            }
            LineEvent::FlowRate(flow_rate) => self.flow_rate = flow_rate,
            LineEvent::LayerStart(_) => {
                self.layer_index += 1;
                debug!(layer = self.layer_index, "skinning layer");
            }
            LineEvent::PerimeterStart => {
                if self.layer_index >= self.layers_from {
                    self.perimeter = Some(Vec::new());
                }
            }
            LineEvent::PerimeterEnd => self.add_skinned_perimeter(),
            LineEvent::InfillStart => {
                if self.layer_index >= self.layers_from
                    && self.layer_index == self.top_layer_index
                {
                    self.infill_boundaries = Some(Vec::new());
                }
            }
            LineEvent::InfillEnd => self.add_skinned_infill(),
            LineEvent::InfillBoundaryStart => {
                if let Some(boundaries) = self.infill_boundaries.as_mut() {
                    boundaries.push(Vec::new());
                }
            }
            LineEvent::InfillPoint(point) => {
                if let Some(boundaries) = self.infill_boundaries.as_mut() {
                    if let Some(boundary) = boundaries.last_mut() {
                        boundary.push(point);
                    }
                }
            }
            LineEvent::Rotation(rotation) => {
                self.rotation = rotation;
                self.reverse_rotation = rotation.conjugate();
            }
            LineEvent::BoundaryPoint(_)
            | LineEvent::BoundaryPerimeterEnd
            | LineEvent::Other => {}
        }
        self.writer.add_line(line);
        Ok(())
    }

    /// Height of the lowest sub-pass, one thickness fraction above the bottom
    /// of the current layer.
    fn bottom_z(&self, top_z: f64) -> f64 {
        top_z + self.params.layer_thickness / self.vertical_divisions() - self.params.layer_thickness
    }

    fn vertical_divisions(&self) -> f64 {
        self.config.vertical_divisions as f64
    }

    /// Consume the captured perimeter loop and emit its sub-passes.
    ///
    /// Without a capture buffer or a known position this is a no-op, which
    /// keeps unbalanced end markers harmless.
    fn add_skinned_perimeter(&mut self) {
        let Some(perimeter) = self.perimeter.take() else {
            return;
        };
        let Some(location) = self.location else {
            return;
        };
        let vertical_divisions = self.vertical_divisions();
        let horizontal_divisions = self.config.horizontal_perimeter_divisions;
        let bottom_z = self.bottom_z(location.z);
        // The captured path ends where it started; drop the duplicate point
        // to treat it as a loop.
        let thread = &perimeter[..perimeter.len().saturating_sub(1)];

        let radius_addition = self.params.perimeter_width / horizontal_divisions as f64;
        let mut radius = 0.5 * radius_addition - self.params.half_perimeter_width;
        let mut insets = Vec::with_capacity(horizontal_divisions as usize);
        for _ in 0..horizontal_divisions {
            insets.push(self.clipped_loop_path(&largest_inset_loop(thread, radius)));
            radius += radius_addition;
        }

        let skinned_flow_rate = self.flow_rate / vertical_divisions;
        if is_minimum_sides(&insets, 3) {
            self.writer
                .add_flow_rate(skinned_flow_rate / horizontal_divisions as f64);
            for vertical_index in 0..self.config.vertical_divisions {
                let z = bottom_z
                    + self.params.layer_thickness / vertical_divisions * vertical_index as f64;
                for inset in &insets {
                    self.writer
                        .add_thread(self.feed_rate, inset, self.params.travel_feed_rate, z);
                }
            }
        } else {
            // Too narrow to subdivide horizontally; replay the original loop
            // at each height instead of emitting degenerate geometry.
            debug!("perimeter below the minimum sides, replaying the original loop");
            self.writer.add_flow_rate(skinned_flow_rate);
            for vertical_index in 0..self.config.vertical_divisions {
                let z = bottom_z
                    + self.params.layer_thickness / vertical_divisions * vertical_index as f64;
                self.writer
                    .add_thread(self.feed_rate, &perimeter, self.params.travel_feed_rate, z);
            }
        }
        self.writer.add_flow_rate(self.flow_rate);
    }

    /// Close a loop into a path and clip and simplify it.
    fn clipped_loop_path(&self, polygon: &[Point2]) -> Vec<Point2> {
        let Some(&first) = polygon.first() else {
            return Vec::new();
        };
        let mut loop_path = polygon.to_vec();
        loop_path.push(first);
        clipped_simplified_loop_path(
            self.params.clip_length,
            &loop_path,
            self.params.half_perimeter_width,
        )
    }

    /// Consume the captured infill boundary set and emit its sub-passes.
    fn add_skinned_infill(&mut self) {
        let Some(boundaries) = self.infill_boundaries.take() else {
            return;
        };
        let Some(location) = self.location else {
            return;
        };
        let vertical_divisions = self.vertical_divisions();
        let upper_z = location.z;
        let bottom_z = self.bottom_z(upper_z);
        let offset_y = 0.5 * self.params.skin_infill_width;
        self.writer.add_flow_rate(
            self.flow_rate
                / vertical_divisions
                / self.config.horizontal_infill_divisions as f64,
        );
        for vertical_index in 0..self.config.vertical_divisions {
            let z =
                bottom_z + self.params.layer_thickness / vertical_divisions * vertical_index as f64;
            let lateral = if vertical_index % 2 == 0 { offset_y } else { 0.0 };
            self.add_skinned_infill_band(&boundaries, lateral, upper_z, z);
        }
        self.writer.add_flow_rate(self.flow_rate);
    }

    /// Emit the scanline-reconstructed infill of one vertical sub-pass.
    fn add_skinned_infill_band(
        &mut self,
        boundaries: &[Vec<Point2>],
        offset_y: f64,
        upper_z: f64,
        z: f64,
    ) {
        let width = self.params.skin_infill_width;
        // Work in the canonical unrotated frame, laterally shifted so
        // alternating bands interleave.
        let mut working = Vec::with_capacity(boundaries.len());
        for boundary in boundaries {
            let mut rotated = self.reverse_rotation.rotate_path(boundary);
            if offset_y != 0.0 {
                for point in &mut rotated {
                    point.y -= offset_y;
                }
            }
            let inset = largest_inset_loop(&rotated, self.params.skin_infill_inset);
            if inset.len() >= 3 {
                working.push(inset);
            }
        }

        let mut segments = Vec::new();
        for (row, intersections) in scanline_intersections(&working, width) {
            let mut intersections = intersections;
            intersections.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
            segments.extend(segments_from_intersections(&intersections, row as f64 * width));
        }
        if offset_y != 0.0 {
            for segment in &mut segments {
                segment[0].y += offset_y;
                segment[1].y += offset_y;
            }
        }

        let hop = self.config.hop_when_extruding_infill && upper_z > z;
        for path in join_segments_into_paths(&segments, JOIN_WIDTH_MULTIPLIER * width) {
            let rotated = self.rotation.rotate_path(&path);
            let (Some(&first), Some(&last)) = (rotated.first(), rotated.last()) else {
                continue;
            };
            if hop {
                // Clear the thin perimeter already printed at this spot.
                self.writer
                    .add_z_move(self.params.maximum_z_feed_rate, first, upper_z);
            }
            self.writer
                .add_thread(self.feed_rate, &rotated, self.params.travel_feed_rate, z);
            self.location = Some(Vector3::new(last.x, last.y, upper_z));
            if hop {
                self.writer
                    .add_z_move(self.params.maximum_z_feed_rate, last, upper_z);
            }
        }
    }
}
