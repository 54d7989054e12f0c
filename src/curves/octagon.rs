//! Nested-octagon fractal.

use std::f64::consts::PI;

/// Waypoints of the octagon fractal: the eight edges of a regular
/// octagon, each refined `levels` deep by replacing every segment with an
/// L-shaped pair of half-edges bent toward the plate center. The first
/// point is the starting vertex; level 0 is the plain octagon.
pub fn octagon_points(radius: f64, levels: u32) -> Vec<(f64, f64)> {
    // Bends stack up across levels; 0.85 keeps every point on the plate.
    let r = radius * 0.85;
    let vertices: Vec<(f64, f64)> = (0..8)
        .map(|i| {
            let angle = i as f64 * PI / 4.0;
            (r * angle.cos(), r * angle.sin())
        })
        .collect();

    let mut points = vec![vertices[0]];
    for i in 0..8 {
        refine_edge(vertices[i], vertices[(i + 1) % 8], levels, &mut points);
    }
    points
}

/// Replace the segment with two half-edges meeting at a right angle at
/// the displaced midpoint, recursing on both; level 0 emits the far
/// endpoint.
fn refine_edge(from: (f64, f64), to: (f64, f64), level: u32, out: &mut Vec<(f64, f64)>) {
    if level == 0 {
        out.push(to);
        return;
    }

    let mx = (from.0 + to.0) / 2.0;
    let my = (from.1 + to.1) / 2.0;
    // A perpendicular displacement of half the segment length makes the
    // two halves meet at 90°; of the two sides, bend toward the center.
    let (mut px, mut py) = ((to.1 - from.1) / 2.0, -(to.0 - from.0) / 2.0);
    if px * mx + py * my > 0.0 {
        px = -px;
        py = -py;
    }
    let mid = (mx + px, my + py);

    refine_edge(from, mid, level - 1, out);
    refine_edge(mid, to, level - 1, out);
}
