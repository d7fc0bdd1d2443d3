//! Lookahead scan over the body for per-layer boundary loops.
//!
//! The transform pass needs the index of the last boundary-bearing layer
//! before it can begin, so this scan stays a separate pass and is never fused
//! with the transform.

use skinkit_core::Point2;

use crate::error::SkinError;
use crate::event::{classify, LineEvent};

/// The closed boundary loops of one structural layer.
#[derive(Debug, Clone)]
pub struct BoundaryLayer {
    /// Height carried by the layer marker.
    pub z: f64,
    pub loops: Vec<Vec<Point2>>,
}

/// The ordered boundary layers of the whole body.
#[derive(Debug, Clone, Default)]
pub struct BoundaryPrescan {
    pub layers: Vec<BoundaryLayer>,
}

impl BoundaryPrescan {
    /// Index of the last recorded layer, or `None` for a body without layer
    /// markers.
    pub fn top_layer_index(&self) -> Option<usize> {
        self.layers.len().checked_sub(1)
    }

    /// Index of the first layer that actually carries boundary loops. Leading
    /// layers without boundary content (a raft, for example) shift the
    /// configured starting layer up by this amount.
    pub fn first_populated_layer(&self) -> Option<usize> {
        self.layers.iter().position(|layer| !layer.loops.is_empty())
    }
}

/// Scan the body lines without consuming them, collecting one
/// [`BoundaryLayer`] per layer marker. A boundary point before any layer
/// marker is ignored rather than fatal.
pub fn scan(lines: &[&str]) -> Result<BoundaryPrescan, SkinError> {
    let mut prescan = BoundaryPrescan::default();
    let mut loop_open = false;
    for line in lines {
        match classify(line)? {
            LineEvent::LayerStart(z) => {
                prescan.layers.push(BoundaryLayer {
                    z,
                    loops: Vec::new(),
                });
                loop_open = false;
            }
            LineEvent::BoundaryPerimeterEnd => loop_open = false,
            LineEvent::BoundaryPoint(point) => {
                if let Some(layer) = prescan.layers.last_mut() {
                    if !loop_open {
                        layer.loops.push(Vec::new());
                        loop_open = true;
                    }
                    if let Some(current) = layer.loops.last_mut() {
                        current.push(point);
                    }
                }
            }
            _ => {}
        }
    }
    Ok(prescan)
}
