//! Hilbert space-filling curve.

use crate::motion::rotated_position;

/// Cell orientations. The production and offset tables below encode the
/// turning rule that keeps successive cells adjacent; they must match
/// exactly or the curve tears.
#[derive(Debug, Clone, Copy)]
enum Orientation {
    A,
    B,
    C,
    D,
}

impl Orientation {
    /// Orientation each of the four children takes, in traversal order.
    fn children(self) -> [Orientation; 4] {
        use Orientation::*;
        match self {
            A => [D, A, A, B],
            B => [C, B, B, A],
            C => [B, C, C, D],
            D => [A, D, D, C],
        }
    }

    /// Offsets of the four children from the cell center, in half-cells.
    fn offsets(self) -> [(f64, f64); 4] {
        match self {
            Orientation::A => [(-1.0, -1.0), (-1.0, 1.0), (1.0, 1.0), (1.0, -1.0)],
            Orientation::B => [(1.0, 1.0), (-1.0, 1.0), (-1.0, -1.0), (1.0, -1.0)],
            Orientation::C => [(1.0, 1.0), (1.0, -1.0), (-1.0, -1.0), (-1.0, 1.0)],
            Orientation::D => [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)],
        }
    }
}

/// Waypoints of a Hilbert curve of `depth` filling the square inscribed
/// in a plate of `radius`, rotated by `rotation_deg`.
///
/// Emits `4^depth` points, one per cell of the `2^depth`-per-side grid;
/// every cell is visited exactly once and successive points are always
/// neighbouring cells. Depth 0 emits nothing.
pub fn hilbert_points(radius: f64, depth: u32, rotation_deg: f64) -> Vec<(f64, f64)> {
    let mut points = Vec::new();
    if depth == 0 {
        return points;
    }
    if let Some(capacity) = 4usize.checked_pow(depth) {
        points.reserve(capacity);
    }
    let side = radius * 2.0_f64.sqrt() - 0.1;
    emit(0.0, 0.0, side, Orientation::C, depth, rotation_deg, &mut points);
    points
}

fn emit(
    cx: f64,
    cy: f64,
    size: f64,
    orientation: Orientation,
    depth: u32,
    rotation_deg: f64,
    out: &mut Vec<(f64, f64)>,
) {
    if depth == 0 {
        out.push(rotated_position(cx, cy, rotation_deg));
        return;
    }
    let half = size / 2.0;
    let children = orientation.children();
    let offsets = orientation.offsets();
    for (child, (dx, dy)) in children.into_iter().zip(offsets) {
        emit(
            cx + dx * half / 2.0,
            cy + dy * half / 2.0,
            half,
            child,
            depth - 1,
            rotation_deg,
            out,
        );
    }
}
