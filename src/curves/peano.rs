//! Peano space-filling curve.

use crate::motion::rotated_position;

/// Mirror state of a cell: `One` is `Zero` flipped vertically.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PeanoType {
    Zero,
    One,
}

impl PeanoType {
    fn flipped(self) -> Self {
        match self {
            PeanoType::Zero => PeanoType::One,
            PeanoType::One => PeanoType::Zero,
        }
    }

    /// Offsets of the nine children from the cell center, in thirds, in
    /// forward traversal order: a column serpentine, entered bottom-left
    /// for `Zero` and top-left for its mirror.
    fn cells(self) -> [(f64, f64); 9] {
        match self {
            PeanoType::Zero => [
                (-1.0, -1.0),
                (-1.0, 0.0),
                (-1.0, 1.0),
                (0.0, 1.0),
                (0.0, 0.0),
                (0.0, -1.0),
                (1.0, -1.0),
                (1.0, 0.0),
                (1.0, 1.0),
            ],
            PeanoType::One => [
                (-1.0, 1.0),
                (-1.0, 0.0),
                (-1.0, -1.0),
                (0.0, -1.0),
                (0.0, 0.0),
                (0.0, 1.0),
                (1.0, 1.0),
                (1.0, 0.0),
                (1.0, -1.0),
            ],
        }
    }
}

/// Whether the k-th child is traversed forward when its parent is. A
/// backward parent walks the sequence in reverse and flips every flag, so
/// both traversals visit the same cells in opposite order.
const CHILD_FORWARD: [bool; 9] = [true, false, true, true, false, true, true, false, true];

/// Waypoints of a Peano curve of `depth` filling the square inscribed in
/// a plate of `radius`, rotated by `rotation_deg`.
///
/// Emits `9^depth` points, one per cell of the `3^depth`-per-side grid;
/// every cell is visited exactly once and successive points are always
/// edge-adjacent cells. Depth 0 emits nothing.
pub fn peano_points(radius: f64, depth: u32, rotation_deg: f64) -> Vec<(f64, f64)> {
    let mut points = Vec::new();
    if depth == 0 {
        return points;
    }
    if let Some(capacity) = 9usize.checked_pow(depth) {
        points.reserve(capacity);
    }
    let side = radius * 2.0_f64.sqrt() - 0.1;
    emit(0.0, 0.0, side, PeanoType::Zero, true, depth, rotation_deg, &mut points);
    points
}

#[allow(clippy::too_many_arguments)]
fn emit(
    cx: f64,
    cy: f64,
    size: f64,
    typ: PeanoType,
    forward: bool,
    depth: u32,
    rotation_deg: f64,
    out: &mut Vec<(f64, f64)>,
) {
    if depth == 0 {
        out.push(rotated_position(cx, cy, rotation_deg));
        return;
    }
    let third = size / 3.0;
    let cells = typ.cells();
    for k in 0..9 {
        let idx = if forward { k } else { 8 - k };
        let (dx, dy) = cells[idx];
        // Successive children alternate mirror state.
        let child_typ = if idx % 2 == 1 { typ.flipped() } else { typ };
        let child_forward = forward == CHILD_FORWARD[idx];
        emit(
            cx + dx * third,
            cy + dy * third,
            third,
            child_typ,
            child_forward,
            depth - 1,
            rotation_deg,
            out,
        );
    }
}
