//! Inward loop offsetting.

use cavalier_contours::polyline::{PlineSource, PlineSourceMut, PlineVertex, Polyline};

use super::{polygon_area, Point2};

const COINCIDENT_EPSILON: f64 = 1e-9;

/// Offset a closed loop inward by `radius` and return the largest surviving
/// loop.
///
/// Positive radius moves toward the loop interior regardless of winding;
/// negative radius moves outward. A pinched loop may split under the offset;
/// of the surviving pieces only the largest by area is returned, with arc
/// joins chorded to their endpoints. A loop that collapses entirely yields an
/// empty vector. The returned loop keeps the winding of the input.
pub fn largest_inset_loop(polygon: &[Point2], radius: f64) -> Vec<Point2> {
    let cleaned = deduplicated(polygon);
    if cleaned.len() < 3 {
        return Vec::new();
    }
    if radius == 0.0 {
        return cleaned;
    }
    // Counterclockwise winding so a positive parallel offset moves inward.
    let reversed = polygon_area(&cleaned) < 0.0;
    let mut polyline = Polyline::new();
    if reversed {
        for point in cleaned.iter().rev() {
            polyline.add_vertex(PlineVertex::new(point.x, point.y, 0.0));
        }
    } else {
        for point in &cleaned {
            polyline.add_vertex(PlineVertex::new(point.x, point.y, 0.0));
        }
    }
    polyline.set_is_closed(true);

    let mut largest: Vec<Point2> = Vec::new();
    let mut largest_area = 0.0;
    for offset in polyline.parallel_offset(radius) {
        let points: Vec<Point2> = offset
            .vertex_data
            .iter()
            .map(|vertex| Point2::new(vertex.x, vertex.y))
            .collect();
        let points = deduplicated(&points);
        if points.len() < 3 {
            continue;
        }
        let area = polygon_area(&points).abs();
        if area > largest_area {
            largest_area = area;
            largest = points;
        }
    }
    if reversed {
        largest.reverse();
    }
    largest
}

/// Remove consecutive coincident vertices, including a duplicated closing
/// vertex.
fn deduplicated(polygon: &[Point2]) -> Vec<Point2> {
    let mut cleaned: Vec<Point2> = Vec::with_capacity(polygon.len());
    for point in polygon {
        if let Some(last) = cleaned.last() {
            if last.distance_to(*point) <= COINCIDENT_EPSILON {
                continue;
            }
        }
        cleaned.push(*point);
    }
    while cleaned.len() > 1
        && cleaned[0].distance_to(*cleaned.last().unwrap()) <= COINCIDENT_EPSILON
    {
        cleaned.pop();
    }
    cleaned
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(size: f64) -> Vec<Point2> {
        vec![
            Point2::new(0.0, 0.0),
            Point2::new(size, 0.0),
            Point2::new(size, size),
            Point2::new(0.0, size),
        ]
    }

    /// A 20x10 rectangle with a 2-wide slot cut from the top edge down to
    /// y = 2, leaving a thin strip under the slot.
    fn slotted_rectangle() -> Vec<Point2> {
        vec![
            Point2::new(0.0, 0.0),
            Point2::new(20.0, 0.0),
            Point2::new(20.0, 10.0),
            Point2::new(10.0, 10.0),
            Point2::new(10.0, 2.0),
            Point2::new(8.0, 2.0),
            Point2::new(8.0, 10.0),
            Point2::new(0.0, 10.0),
        ]
    }

    fn orientation(a: Point2, b: Point2, c: Point2) -> f64 {
        (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
    }

    fn segments_cross(a: Point2, b: Point2, c: Point2, d: Point2) -> bool {
        let d1 = orientation(c, d, a);
        let d2 = orientation(c, d, b);
        let d3 = orientation(a, b, c);
        let d4 = orientation(a, b, d);
        d1 * d2 < 0.0 && d3 * d4 < 0.0
    }

    fn is_self_intersecting(polygon: &[Point2]) -> bool {
        let count = polygon.len();
        for i in 0..count {
            for j in i + 1..count {
                // Skip edges sharing a vertex.
                if (j + 1) % count == i || (i + 1) % count == j {
                    continue;
                }
                if segments_cross(
                    polygon[i],
                    polygon[(i + 1) % count],
                    polygon[j],
                    polygon[(j + 1) % count],
                ) {
                    return true;
                }
            }
        }
        false
    }

    #[test]
    fn inset_square_shrinks() {
        let inset = largest_inset_loop(&square(10.0), 1.0);
        let area = polygon_area(&inset).abs();
        assert!((area - 64.0).abs() < 1e-6, "area was {area}");
        for point in &inset {
            assert!(point.x > 0.9 && point.x < 9.1);
            assert!(point.y > 0.9 && point.y < 9.1);
        }
    }

    #[test]
    fn outward_offset_grows() {
        let outset = largest_inset_loop(&square(10.0), -1.0);
        // Chorded corner arcs shave a little off the exact 144.
        assert!(polygon_area(&outset).abs() > 120.0);
    }

    #[test]
    fn winding_does_not_change_the_interior() {
        let clockwise: Vec<Point2> = square(10.0).into_iter().rev().collect();
        let inset = largest_inset_loop(&clockwise, 1.0);
        assert!((polygon_area(&inset).abs() - 64.0).abs() < 1e-6);
        // Clockwise input comes back clockwise.
        assert!(polygon_area(&inset) < 0.0);
    }

    #[test]
    fn zero_radius_returns_the_loop() {
        let inset = largest_inset_loop(&square(10.0), 0.0);
        assert_eq!(inset, square(10.0));
    }

    #[test]
    fn collapsing_inset_is_empty() {
        assert!(largest_inset_loop(&square(1.0), 0.8).is_empty());
    }

    #[test]
    fn pinched_loop_splits_to_the_largest_piece() {
        // Insetting by 1.5 eats through the 2-thick strip under the slot, so
        // the loop splits; the piece right of the slot (about 7x7) beats the
        // one left of it (about 5x7).
        let inset = largest_inset_loop(&slotted_rectangle(), 1.5);
        assert!(inset.len() >= 3);
        assert!(
            !is_self_intersecting(&inset),
            "inset loop crosses itself: {inset:?}"
        );
        for point in &inset {
            assert!(point.x > 11.0, "point {point:?} is outside the right piece");
        }
        let area = polygon_area(&inset).abs();
        assert!((area - 49.0).abs() < 0.5, "area was {area}");
    }

    #[test]
    fn degenerate_input_is_empty() {
        assert!(largest_inset_loop(&[], 0.5).is_empty());
        let two = [Point2::new(0.0, 0.0), Point2::new(1.0, 0.0)];
        assert!(largest_inset_loop(&two, 0.5).is_empty());
    }
}
