//! Scanline-to-polygon intersection and endpoint-to-path reconstruction.

use std::collections::{BTreeMap, HashMap};

use super::Point2;

/// Collect the x coordinates where horizontal scanlines spaced `width` apart
/// cross the given loops, keyed by scanline row. Row `r` sits at
/// `y = r * width`.
pub fn scanline_intersections(loops: &[Vec<Point2>], width: f64) -> BTreeMap<i64, Vec<f64>> {
    let mut table: BTreeMap<i64, Vec<f64>> = BTreeMap::new();
    if width <= 0.0 {
        return table;
    }
    for polygon in loops {
        for index in 0..polygon.len() {
            let mut begin = polygon[index];
            let mut end = polygon[(index + 1) % polygon.len()];
            if begin.y > end.y {
                std::mem::swap(&mut begin, &mut end);
            }
            let row_begin = (begin.y / width).ceil() as i64;
            let row_end = (end.y / width).ceil() as i64;
            for row in row_begin..row_end {
                let y = row as f64 * width;
                let x = begin.x + (end.x - begin.x) * (y - begin.y) / (end.y - begin.y);
                table.entry(row).or_default().push(x);
            }
        }
    }
    table
}

/// Pair sorted x intersections into horizontal fill segments at height `y`.
/// An odd trailing intersection and zero-length pairs are discarded.
pub fn segments_from_intersections(intersections: &[f64], y: f64) -> Vec<[Point2; 2]> {
    let mut segments = Vec::new();
    let end = intersections.len() - intersections.len() % 2;
    for pair in intersections[..end].chunks_exact(2) {
        if pair[0] != pair[1] {
            segments.push([Point2::new(pair[0], y), Point2::new(pair[1], y)]);
        }
    }
    segments
}

/// Join fill segments whose endpoints sit within `join_distance` of each
/// other into continuous paths.
///
/// A uniform grid keyed by endpoint cell accelerates the nearest-endpoint
/// search; each lookup only inspects the 3x3 neighborhood of the current path
/// end.
pub fn join_segments_into_paths(segments: &[[Point2; 2]], join_distance: f64) -> Vec<Vec<Point2>> {
    if segments.is_empty() || join_distance <= 0.0 {
        return segments.iter().map(|segment| segment.to_vec()).collect();
    }

    let cell_of = |point: Point2| -> (i64, i64) {
        (
            (point.x / join_distance).floor() as i64,
            (point.y / join_distance).floor() as i64,
        )
    };

    // Endpoint 2i is segment i entered at its first point, 2i + 1 entered at
    // its second.
    let mut grid: HashMap<(i64, i64), Vec<usize>> = HashMap::new();
    for (index, segment) in segments.iter().enumerate() {
        grid.entry(cell_of(segment[0])).or_default().push(2 * index);
        grid.entry(cell_of(segment[1]))
            .or_default()
            .push(2 * index + 1);
    }
    let endpoint = |id: usize| -> Point2 { segments[id / 2][id % 2] };

    let mut used = vec![false; segments.len()];
    let mut paths = Vec::new();
    for seed in 0..segments.len() {
        if used[seed] {
            continue;
        }
        used[seed] = true;
        let mut path = vec![segments[seed][0], segments[seed][1]];
        loop {
            let tail = *path.last().unwrap();
            let (tail_cx, tail_cy) = cell_of(tail);
            let mut nearest: Option<(usize, f64)> = None;
            for cell_x in tail_cx - 1..=tail_cx + 1 {
                for cell_y in tail_cy - 1..=tail_cy + 1 {
                    let Some(ids) = grid.get(&(cell_x, cell_y)) else {
                        continue;
                    };
                    for &id in ids {
                        if used[id / 2] {
                            continue;
                        }
                        let distance = tail.distance_to(endpoint(id));
                        if distance > join_distance {
                            continue;
                        }
                        if nearest.map_or(true, |(_, best)| distance < best) {
                            nearest = Some((id, distance));
                        }
                    }
                }
            }
            let Some((id, _)) = nearest else {
                break;
            };
            used[id / 2] = true;
            path.push(endpoint(id));
            path.push(endpoint(id ^ 1));
        }
        paths.push(path);
    }
    paths
}
