//! Machine-parameter parsing over the initialization region.

use skinkit_core::gcode::{parse_f64, split_line, GcodeWriter};
use skinkit_core::GcodeError;

use crate::config::SkinConfig;
use crate::error::SkinError;

/// Seed feed rate used until a `G1 F` word overrides it (mm/min).
pub const DEFAULT_FEED_RATE: f64 = 959.0;
const DEFAULT_TRAVEL_FEED_RATE: f64 = 957.0;
const DEFAULT_MAXIMUM_Z_FEED_RATE: f64 = 60.0;
const SECONDS_PER_MINUTE: f64 = 60.0;

/// Machine constants extracted from the initialization region, immutable
/// after the parse, plus the values derived from them.
#[derive(Debug, Clone)]
pub struct MachineParameters {
    pub layer_thickness: f64,
    pub perimeter_width: f64,
    pub half_perimeter_width: f64,
    pub infill_width: f64,
    /// Infill width divided by the horizontal infill division count.
    pub skin_infill_width: f64,
    pub infill_perimeter_overlap: f64,
    pub clip_over_perimeter_width: f64,
    pub operating_flow_rate: f64,
    /// mm/min, converted from the per-second value on the wire.
    pub travel_feed_rate: f64,
    /// mm/min, converted from the per-second value on the wire.
    pub maximum_z_feed_rate: f64,
    /// Length clipped off each end of a skinned perimeter loop.
    pub clip_length: f64,
    /// Inward inset applied to infill boundaries before scanline fill.
    pub skin_infill_inset: f64,
}

#[derive(Debug, Default)]
struct Collected {
    layer_thickness: Option<f64>,
    perimeter_width: Option<f64>,
    infill_width: Option<f64>,
    infill_perimeter_overlap: Option<f64>,
    operating_flow_rate: Option<f64>,
    clip_over_perimeter_width: f64,
    travel_feed_rate: f64,
    maximum_z_feed_rate: f64,
}

/// Scan the initialization region from the start of `lines`, forwarding every
/// line to the writer. At the end-of-initialization marker a stage-completion
/// marker is emitted ahead of the terminator and the populated parameters are
/// returned together with the index one line past the marker.
pub fn parse_initialization(
    lines: &[&str],
    config: &SkinConfig,
    writer: &mut GcodeWriter,
) -> Result<(MachineParameters, usize), SkinError> {
    let mut collected = Collected {
        travel_feed_rate: DEFAULT_TRAVEL_FEED_RATE,
        maximum_z_feed_rate: DEFAULT_MAXIMUM_Z_FEED_RATE,
        ..Default::default()
    };
    for (index, line) in lines.iter().enumerate() {
        let words = split_line(line);
        let tag = words.first().copied().unwrap_or("");
        let value = |collected_into: &mut Option<f64>| -> Result<(), SkinError> {
            *collected_into = Some(tag_value(tag, &words)?);
            Ok(())
        };
        match tag {
            "(</extruderInitialization>)" => {
                writer.add_procedure("skin");
                writer.add_line(line);
                return Ok((finalize(collected, config)?, index + 1));
            }
            "(<clipOverPerimeterWidth>" => {
                collected.clip_over_perimeter_width = tag_value(tag, &words)?;
            }
            "(<infillPerimeterOverlap>" => value(&mut collected.infill_perimeter_overlap)?,
            "(<infillWidth>" => value(&mut collected.infill_width)?,
            "(<layerThickness>" => value(&mut collected.layer_thickness)?,
            "(<maximumZFeedRatePerSecond>" => {
                collected.maximum_z_feed_rate = SECONDS_PER_MINUTE * tag_value(tag, &words)?;
            }
            "(<operatingFlowRate>" => value(&mut collected.operating_flow_rate)?,
            "(<perimeterWidth>" => value(&mut collected.perimeter_width)?,
            "(<travelFeedRatePerSecond>" => {
                collected.travel_feed_rate = SECONDS_PER_MINUTE * tag_value(tag, &words)?;
            }
            "(<decimalPlacesCarried>" => {
                writer.set_decimal_places(tag_value(tag, &words)? as usize);
            }
            _ => {}
        }
        writer.add_line(line);
    }
    Err(SkinError::MissingTag("(</extruderInitialization>)"))
}

fn tag_value(tag: &str, words: &[&str]) -> Result<f64, GcodeError> {
    let word = words.get(1).ok_or_else(|| GcodeError::MissingArgument {
        tag: tag.to_string(),
    })?;
    parse_f64(tag, word)
}

fn finalize(collected: Collected, config: &SkinConfig) -> Result<MachineParameters, SkinError> {
    let layer_thickness = collected
        .layer_thickness
        .ok_or(SkinError::MissingTag("(<layerThickness>"))?;
    let perimeter_width = collected
        .perimeter_width
        .ok_or(SkinError::MissingTag("(<perimeterWidth>"))?;
    let infill_width = collected
        .infill_width
        .ok_or(SkinError::MissingTag("(<infillWidth>"))?;
    let infill_perimeter_overlap = collected
        .infill_perimeter_overlap
        .ok_or(SkinError::MissingTag("(<infillPerimeterOverlap>"))?;
    let operating_flow_rate = collected
        .operating_flow_rate
        .ok_or(SkinError::MissingTag("(<operatingFlowRate>"))?;

    let skin_infill_width = infill_width / config.horizontal_infill_divisions as f64;
    Ok(MachineParameters {
        layer_thickness,
        perimeter_width,
        half_perimeter_width: 0.5 * perimeter_width,
        infill_width,
        skin_infill_width,
        infill_perimeter_overlap,
        clip_over_perimeter_width: collected.clip_over_perimeter_width,
        operating_flow_rate,
        travel_feed_rate: collected.travel_feed_rate,
        maximum_z_feed_rate: collected.maximum_z_feed_rate,
        clip_length: 0.5 * collected.clip_over_perimeter_width * perimeter_width,
        skin_infill_inset: 0.5
            * (infill_width + skin_infill_width)
            * (1.0 - infill_perimeter_overlap),
    })
}
