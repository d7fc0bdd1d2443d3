//! Configuration surface of the skin stage.

use serde::{Deserialize, Serialize};

/// Settings consumed by the skin stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SkinConfig {
    /// Master switch; when off the stage returns its input unchanged.
    pub activate: bool,
    /// How many times the skinned infill is divided horizontally.
    pub horizontal_infill_divisions: u32,
    /// How many times the skinned perimeters are divided horizontally.
    pub horizontal_perimeter_divisions: u32,
    /// How many times both are divided vertically.
    pub vertical_divisions: u32,
    /// Hop over the thin threads already printed before and after extruding
    /// the lower infill sub-passes.
    pub hop_when_extruding_infill: bool,
    /// Index of the first boundary-bearing layer to skin. Zero is accepted
    /// but unwise: a skinned bottom perimeter loses full-height adhesion.
    pub layers_from: usize,
}

impl Default for SkinConfig {
    fn default() -> Self {
        Self {
            activate: false,
            horizontal_infill_divisions: 2,
            horizontal_perimeter_divisions: 1,
            vertical_divisions: 2,
            hop_when_extruding_infill: false,
            layers_from: 1,
        }
    }
}

impl SkinConfig {
    /// A copy with every division count clamped to at least one.
    pub fn clamped(&self) -> Self {
        Self {
            horizontal_infill_divisions: self.horizontal_infill_divisions.max(1),
            horizontal_perimeter_divisions: self.horizontal_perimeter_divisions.max(1),
            vertical_divisions: self.vertical_divisions.max(1),
            ..self.clone()
        }
    }
}
