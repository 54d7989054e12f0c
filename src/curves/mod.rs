//! Recursive curve generators.
//!
//! The generators are pure: they recurse over the curve's self-similar
//! structure and emit waypoint sequences, which the plate then traces
//! through `line_to`. Keeping them free of motion state makes the
//! production tables testable on their own.

mod hilbert;
mod octagon;
mod peano;
mod turtle;

pub use hilbert::hilbert_points;
pub use octagon::octagon_points;
pub use peano::peano_points;

use tracing::warn;

use crate::motion::{MotionError, SandPlate};

impl SandPlate {
    /// Draw a Hilbert curve of the given depth, rotated by `rotation_deg`
    /// around the plate center.
    pub async fn hilbert_curve(&self, depth: u32, rotation_deg: f64) -> Result<(), MotionError> {
        if depth == 0 {
            warn!("hilbert depth must be a positive integer");
            return Ok(());
        }
        for (x, y) in hilbert_points(self.radius(), depth, rotation_deg) {
            self.line_to(x, y).await?;
        }
        Ok(())
    }

    /// Draw a Peano curve of the given depth, rotated by `rotation_deg`
    /// around the plate center.
    pub async fn peano_curve(&self, depth: u32, rotation_deg: f64) -> Result<(), MotionError> {
        if depth == 0 {
            warn!("peano depth must be a positive integer");
            return Ok(());
        }
        for (x, y) in peano_points(self.radius(), depth, rotation_deg) {
            self.line_to(x, y).await?;
        }
        Ok(())
    }

    /// Draw the octagon fractal: every outer edge recursively folded into
    /// L-shaped micro-paths, `levels` deep.
    pub async fn octagon_fractal(&self, levels: u32) -> Result<(), MotionError> {
        let mut points = octagon_points(self.radius(), levels).into_iter();
        if let Some((x, y)) = points.next() {
            self.goto_pos(x, y).await?;
        }
        for (x, y) in points {
            self.line_to(x, y).await?;
        }
        Ok(())
    }
}
