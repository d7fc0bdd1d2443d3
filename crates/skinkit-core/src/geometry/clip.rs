//! Loop-path clipping and simplification.

use super::{path_length, Point2};

/// Clip both ends of a closed loop path by `clip` and simplify the result
/// within a channel of `half_width`.
///
/// The loop path is the loop with its first point appended again; clipping
/// opens it so consecutive thin passes do not pile material where the loop
/// closes. An empty input yields an empty path.
pub fn clipped_simplified_loop_path(
    clip: f64,
    loop_path: &[Point2],
    half_width: f64,
) -> Vec<Point2> {
    let clipped = clipped_loop_path(clip, loop_path);
    simplified_path(&clipped, half_width)
}

fn clipped_loop_path(clip: f64, loop_path: &[Point2]) -> Vec<Point2> {
    if clip <= 0.0 || loop_path.len() < 2 {
        return loop_path.to_vec();
    }
    // Never eat more than a third of the loop from either end.
    let clip = clip.min(0.3 * path_length(loop_path));
    let front_clipped = clipped_at_start(clip, loop_path);
    let mut reversed: Vec<Point2> = front_clipped.into_iter().rev().collect();
    reversed = clipped_at_start(clip, &reversed);
    reversed.into_iter().rev().collect()
}

/// Remove `clip` of path length from the start, interpolating a new first
/// point on the partially clipped segment.
fn clipped_at_start(clip: f64, path: &[Point2]) -> Vec<Point2> {
    let mut total_length = 0.0;
    let mut last_length = 0.0;
    let mut index = 0;
    while total_length < clip && index < path.len() - 1 {
        last_length = total_length;
        total_length += path[index].distance_to(path[index + 1]);
        index += 1;
    }
    let remaining = clip - last_length;
    let mut clipped: Vec<Point2> = path[index..].to_vec();
    if index == 0 {
        return clipped;
    }
    let penultimate = path[index - 1];
    let segment = path[index] - penultimate;
    let segment_length = segment.length();
    if segment_length > 0.0 {
        clipped.insert(0, penultimate + segment * (remaining / segment_length));
    }
    clipped
}

/// Remove points that stay within the channel: interior points that deviate
/// negligibly from the line through their neighbors, then points packed more
/// tightly than the channel radius. The endpoints always survive.
fn simplified_path(path: &[Point2], radius: f64) -> Vec<Point2> {
    if path.len() < 3 {
        return path.to_vec();
    }
    let deviation_limit = radius / 256.0;
    let mut kept: Vec<Point2> = vec![path[0]];
    for index in 1..path.len() - 1 {
        let previous = *kept.last().unwrap();
        let next = path[index + 1];
        if point_to_segment_distance(path[index], previous, next) > deviation_limit {
            kept.push(path[index]);
        }
    }
    kept.push(*path.last().unwrap());

    let mut away: Vec<Point2> = Vec::with_capacity(kept.len());
    for (index, point) in kept.iter().enumerate() {
        let is_last = index == kept.len() - 1;
        match away.last() {
            Some(last) if !is_last && last.distance_to(*point) < radius => {}
            _ => away.push(*point),
        }
    }
    away
}

fn point_to_segment_distance(point: Point2, start: Point2, end: Point2) -> f64 {
    let segment = end - start;
    let length_squared = segment.dot(segment);
    if length_squared <= 0.0 {
        return point.distance_to(start);
    }
    let t = ((point - start).dot(segment) / length_squared).clamp(0.0, 1.0);
    point.distance_to(start + segment * t)
}
