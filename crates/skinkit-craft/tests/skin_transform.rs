//! End-to-end tests of the skin transform over synthetic annotated streams.

use skinkit_craft::{skin_text, SkinConfig};

const INITIALIZATION: &str = "\
(<layerThickness> 0.4 )
(<perimeterWidth> 0.6 )
(<infillWidth> 0.6 )
(<infillPerimeterOverlap> 0.0 )
(<operatingFlowRate> 210.0 )
(<travelFeedRatePerSecond> 16.0 )
(<maximumZFeedRatePerSecond> 10.0 )
(</extruderInitialization>)
";

fn active_config() -> SkinConfig {
    SkinConfig {
        activate: true,
        layers_from: 0,
        ..Default::default()
    }
}

/// One layer holding a 20x20 square perimeter and a matching infill
/// boundary.
fn square_layer() -> String {
    let mut text = String::from(INITIALIZATION);
    text.push_str(
        "\
(<layer> 0.4 )
(<rotation> (1.0+0.0j) )
(<boundaryPoint> X0.0 Y0.0 Z0.4 )
(<boundaryPoint> X20.0 Y0.0 Z0.4 )
(<boundaryPoint> X20.0 Y20.0 Z0.4 )
(<boundaryPoint> X0.0 Y20.0 Z0.4 )
(</boundaryPerimeter>)
(<perimeter> outer )
G1 X0.0 Y0.0 Z0.4 F960.0
M101
G1 X20.0 Y0.0 Z0.4
G1 X20.0 Y20.0 Z0.4
G1 X0.0 Y20.0 Z0.4
G1 X0.0 Y0.0 Z0.4
M103
(</perimeter>)
(<infill>)
(<infillBoundary>)
(<infillPoint> X0.3 Y0.3 Z0.4 )
(<infillPoint> X19.7 Y0.3 Z0.4 )
(<infillPoint> X19.7 Y19.7 Z0.4 )
(<infillPoint> X0.3 Y19.7 Z0.4 )
(</infill>)
",
    );
    text
}

fn lines_between<'a>(output: &'a str, start: &str, end: &str) -> Vec<&'a str> {
    let lines: Vec<&str> = output.lines().collect();
    let from = lines
        .iter()
        .position(|line| *line == start)
        .expect("start marker present");
    let to = lines
        .iter()
        .position(|line| *line == end)
        .expect("end marker present");
    lines[from + 1..to].to_vec()
}

#[test]
fn short_circuits_return_the_input_unchanged() {
    let config = active_config();
    assert_eq!(skin_text("", &config).unwrap(), "");

    let deactivated = SkinConfig::default();
    let input = square_layer();
    assert_eq!(skin_text(&input, &deactivated).unwrap(), input);
}

#[test]
fn transform_is_idempotent_through_its_marker() {
    let config = active_config();
    let once = skin_text(&square_layer(), &config).unwrap();
    assert!(once.contains("(<procedureName> skin </procedureName>)"));
    let twice = skin_text(&once, &config).unwrap();
    assert_eq!(once, twice);
}

#[test]
fn completion_marker_precedes_the_initialization_terminator() {
    let output = skin_text(&square_layer(), &active_config()).unwrap();
    let marker = output
        .find("(<procedureName> skin </procedureName>)")
        .unwrap();
    let terminator = output.find("(</extruderInitialization>)").unwrap();
    assert!(marker < terminator);
}

#[test]
fn perimeter_block_scales_and_restores_the_flow_rate() {
    let output = skin_text(&square_layer(), &active_config()).unwrap();
    let block = lines_between(&output, "(<perimeter> outer )", "(</perimeter>)");
    // Vertical divisions 2, horizontal perimeter divisions 1.
    assert_eq!(block.first().copied(), Some("M108 S105.0"));
    assert_eq!(block.last().copied(), Some("M108 S210.0"));
    let scaled_count = block.iter().filter(|line| **line == "M108 S105.0").count();
    assert_eq!(scaled_count, 1);
}

#[test]
fn perimeter_yields_vertical_times_horizontal_loops() {
    let config = SkinConfig {
        horizontal_perimeter_divisions: 2,
        vertical_divisions: 3,
        ..active_config()
    };
    let output = skin_text(&square_layer(), &config).unwrap();
    let block = lines_between(&output, "(<perimeter> outer )", "(</perimeter>)");
    let loop_count = block.iter().filter(|line| **line == "M101").count();
    assert_eq!(loop_count, 6);
    // Flow scales by both division counts: 210 / 3 / 2.
    assert_eq!(block.first().copied(), Some("M108 S35.0"));
    // Heights step from top - thickness + thickness/3 up to the layer top.
    assert!(block.iter().any(|line| line.contains("Z0.133")));
    assert!(block.iter().any(|line| line.contains("Z0.267")));
    assert!(block.iter().any(|line| line.ends_with("Z0.4 F960.0")));
}

#[test]
fn captured_perimeter_motion_is_not_replayed_verbatim() {
    let output = skin_text(&square_layer(), &active_config()).unwrap();
    // The original full-height moves sat at Z0.4 with no feed word.
    assert!(!output.contains("G1 X20.0 Y0.0 Z0.4\n"));
    // The regenerated sub-passes revisit the same corners at Z0.2.
    assert!(output.contains("G1 X20.0 Y0.0 Z0.2 F960.0"));
}

#[test]
fn narrow_perimeter_falls_back_to_the_original_loop() {
    let mut text = String::from(INITIALIZATION);
    text.push_str(
        "\
(<layer> 0.4 )
(<perimeter> outer )
G1 X0.0 Y0.0 Z0.4 F960.0
M101
G1 X0.2 Y0.0 Z0.4
G1 X0.1 Y0.17 Z0.4
G1 X0.0 Y0.0 Z0.4
M103
(</perimeter>)
",
    );
    let config = SkinConfig {
        horizontal_perimeter_divisions: 2,
        ..active_config()
    };
    let output = skin_text(&text, &config).unwrap();
    let block = lines_between(&output, "(<perimeter> outer )", "(</perimeter>)");
    // The fallback replays the original shape at each height, scaling flow
    // only by the vertical division count.
    assert_eq!(block.first().copied(), Some("M108 S105.0"));
    let loop_count = block.iter().filter(|line| **line == "M101").count();
    assert_eq!(loop_count, 2);
    assert!(block.iter().any(|line| line.starts_with("G1 X0.2 Y0.0 Z0.2")));
    assert!(block.iter().any(|line| line.starts_with("G1 X0.2 Y0.0 Z0.4")));
}

#[test]
fn pinched_perimeter_skins_the_largest_surviving_loop() {
    let mut text = String::from(INITIALIZATION);
    // A 4x1 outline with a 0.5-wide slot down to y = 0.2. The strip under
    // the slot is thinner than twice the inward inset, so the loop splits;
    // only the larger piece left of the slot may be re-extruded.
    text.push_str(
        "\
(<layer> 0.4 )
(<perimeter> outer )
G1 X0.0 Y0.0 Z0.4 F960.0
M101
G1 X4.0 Y0.0 Z0.4
G1 X4.0 Y1.0 Z0.4
G1 X2.75 Y1.0 Z0.4
G1 X2.75 Y0.2 Z0.4
G1 X2.25 Y0.2 Z0.4
G1 X2.25 Y1.0 Z0.4
G1 X0.0 Y1.0 Z0.4
G1 X0.0 Y0.0 Z0.4
M103
(</perimeter>)
",
    );
    let config = SkinConfig {
        horizontal_perimeter_divisions: 2,
        ..active_config()
    };
    let output = skin_text(&text, &config).unwrap();
    let block = lines_between(&output, "(<perimeter> outer )", "(</perimeter>)");
    // Both horizontal divisions survive the split, so no fallback replay:
    // 2 vertical x 2 horizontal loops.
    let loop_count = block.iter().filter(|line| **line == "M101").count();
    assert_eq!(loop_count, 4);
    // No motion lands in the piece right of the slot or in the vanished
    // strip under it.
    for line in &block {
        if !line.starts_with("G1 ") {
            continue;
        }
        for word in line.split_whitespace() {
            if let Some(value) = word.strip_prefix('X') {
                let x: f64 = value.parse().unwrap();
                assert!(
                    !(2.8..=3.9).contains(&x),
                    "motion reaches the discarded piece: {line}"
                );
            }
        }
    }
}

#[test]
fn infill_block_scales_flow_by_both_division_counts() {
    let output = skin_text(&square_layer(), &active_config()).unwrap();
    let block = lines_between(&output, "(<infill>)", "(</infill>)");
    // Original boundary markers inside the block are forwarded first.
    assert_eq!(block.first().copied(), Some("(<infillBoundary>)"));
    // 210 / vertical 2 / horizontal infill 2.
    assert!(block.iter().any(|line| *line == "M108 S52.5"));
    assert_eq!(block.last().copied(), Some("M108 S210.0"));
    assert!(block.iter().any(|line| *line == "M101"));
}

#[test]
fn hop_brackets_lower_infill_passes() {
    let config = SkinConfig {
        hop_when_extruding_infill: true,
        ..active_config()
    };
    let output = skin_text(&square_layer(), &config).unwrap();
    let block = lines_between(&output, "(<infill>)", "(</infill>)");
    let hops: Vec<usize> = block
        .iter()
        .enumerate()
        .filter(|(_, line)| line.contains("Z0.4 F600.0"))
        .map(|(index, _)| index)
        .collect();
    // One reconstructed path in the lower band, hopped into and out of; the
    // top band sits at the previous top and gets no hop.
    assert_eq!(hops.len(), 2);
    // The opening hop is followed by the travel move down to the band.
    assert!(block[hops[0] + 1].contains("Z0.2"));
    // The closing hop follows the extruder-off of the band's thread.
    assert_eq!(block[hops[1] - 1], "M103");
}

#[test]
fn skinning_starts_at_the_first_boundary_layer_plus_the_configured_index() {
    let mut text = String::from(INITIALIZATION);
    // Layers 0 and 1 carry no boundary loops (a raft); layer 2 is the first
    // with boundary content; with layers_from = 1 skinning begins at
    // structural layer 3.
    text.push_str(
        "\
(<layer> 0.4 )
G1 X1.0 Y1.0 Z0.4 F960.0
(<layer> 0.8 )
G1 X1.0 Y2.0 Z0.8
(<layer> 1.2 )
(<boundaryPoint> X0.0 Y0.0 Z1.2 )
(<boundaryPoint> X20.0 Y0.0 Z1.2 )
(<boundaryPoint> X20.0 Y20.0 Z1.2 )
(</boundaryPerimeter>)
(<perimeter> outer )
G1 X5.0 Y5.0 Z1.2 F960.0
M101
G1 X15.0 Y5.0 Z1.2
G1 X10.0 Y15.0 Z1.2
G1 X5.0 Y5.0 Z1.2
M103
(</perimeter>)
(<layer> 1.6 )
(<perimeter> outer )
G1 X5.0 Y5.0 Z1.6 F960.0
M101
G1 X15.0 Y5.0 Z1.6
G1 X10.0 Y15.0 Z1.6
G1 X5.0 Y5.0 Z1.6
M103
(</perimeter>)
",
    );
    let config = SkinConfig {
        layers_from: 1,
        ..active_config()
    };
    let output = skin_text(&text, &config).unwrap();
    // Layer 2's perimeter passes through untouched.
    assert!(output.contains("G1 X15.0 Y5.0 Z1.2\n"));
    assert!(!output.contains("Z1.0"));
    // Layer 3's perimeter is regenerated at fractional heights.
    assert!(!output.contains("G1 X15.0 Y5.0 Z1.6\n"));
    assert!(output.contains("Z1.4"));
}

#[test]
fn carried_decimal_places_control_motion_rounding() {
    let text = square_layer().replace(
        "(</extruderInitialization>)",
        "(<decimalPlacesCarried> 2 )\n(</extruderInitialization>)",
    );
    let config = SkinConfig {
        vertical_divisions: 3,
        ..active_config()
    };
    let output = skin_text(&text, &config).unwrap();
    // 0.4 / 3 heights round to two places instead of three.
    assert!(output.contains("Z0.13"));
    assert!(!output.contains("Z0.133"));
}

#[test]
fn unrecognized_lines_pass_through_in_order() {
    let mut text = String::from(INITIALIZATION);
    text.push_str(
        "\
(<layer> 0.4 )
M113 S1.0
(<bridgeRotation> (0.5+0.866j) )
( operator comment )
G1 X3.0 Y3.0 Z0.4 F960.0
",
    );
    let output = skin_text(&text, &active_config()).unwrap();
    let m113 = output.find("M113 S1.0").unwrap();
    let bridge = output.find("(<bridgeRotation> (0.5+0.866j) )").unwrap();
    let comment = output.find("( operator comment )").unwrap();
    let motion = output.find("G1 X3.0 Y3.0 Z0.4 F960.0").unwrap();
    assert!(m113 < bridge && bridge < comment && comment < motion);
}

#[test]
fn unbalanced_end_markers_are_harmless() {
    let mut text = String::from(INITIALIZATION);
    text.push_str(
        "\
(<layer> 0.4 )
G1 X1.0 Y1.0 Z0.4 F960.0
(</perimeter>)
(</infill>)
",
    );
    let output = skin_text(&text, &active_config()).unwrap();
    assert!(output.contains("(</perimeter>)"));
    assert!(output.contains("(</infill>)"));
    assert!(!output.contains("M101"));
}

#[test]
fn malformed_numbers_abort_the_transform() {
    let mut text = String::from(INITIALIZATION);
    text.push_str("(<layer> lofty )\n");
    assert!(skin_text(&text, &active_config()).is_err());
}
