//! Arm state and the shared trigonometry helpers.

use crate::hardware::Axis;

use super::{DEGREES_PER_STEP, EPS};

/// Fixed geometry of a plate.
#[derive(Debug, Clone, Copy)]
pub struct PlateGeometry {
    radius: f64,
}

impl PlateGeometry {
    pub fn new(radius: f64) -> Self {
        Self { radius }
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Both arms are the same length, half the plate radius, so the ball
    /// reaches exactly the full disc.
    pub fn arm_length(&self) -> f64 {
        self.radius / 2.0
    }

    /// Forward kinematics: ball position for the given arm angles.
    pub fn ball_position(&self, arm0_deg: f64, arm1_deg: f64) -> (f64, f64) {
        let r = self.arm_length();
        let a0 = arm0_deg.to_radians();
        let a01 = (arm0_deg + arm1_deg).to_radians();
        (r * a0.cos() + r * a01.cos(), r * a0.sin() + r * a01.sin())
    }

    /// Cartesian position of the elbow (Arm0's free end).
    pub fn elbow_position(&self, arm0_deg: f64) -> (f64, f64) {
        let r = self.arm_length();
        let a0 = arm0_deg.to_radians();
        (r * a0.cos(), r * a0.sin())
    }
}

/// Raw angle accumulators for both arms plus the turtle heading.
///
/// The stored angles are unnormalized so the winding direction survives
/// many full revolutions; the normalized accessors reduce into `[0, 360)`.
#[derive(Debug, Clone, Default)]
pub struct KinematicState {
    arm0_raw_deg: f64,
    arm1_raw_deg: f64,
    heading_deg: f64,
}

impl KinematicState {
    pub fn arm0_deg(&self) -> f64 {
        normalize_degrees(self.arm0_raw_deg)
    }

    pub fn arm1_deg(&self) -> f64 {
        normalize_degrees(self.arm1_raw_deg)
    }

    pub fn arm0_raw_deg(&self) -> f64 {
        self.arm0_raw_deg
    }

    pub fn arm1_raw_deg(&self) -> f64 {
        self.arm1_raw_deg
    }

    pub fn heading_deg(&self) -> f64 {
        self.heading_deg
    }

    pub fn set_heading_deg(&mut self, heading: f64) {
        self.heading_deg = normalize_degrees(heading);
    }

    /// Apply a quantized rotation to one axis.
    pub fn apply_steps(&mut self, axis: Axis, steps: u32, clockwise: bool) {
        let delta = f64::from(steps) * DEGREES_PER_STEP * if clockwise { 1.0 } else { -1.0 };
        match axis {
            Axis::Arm0 => self.arm0_raw_deg += delta,
            Axis::Arm1 => self.arm1_raw_deg += delta,
        }
    }
}

/// Reduce an angle in degrees into `[0, 360)`.
pub fn normalize_degrees(deg: f64) -> f64 {
    deg.rem_euclid(360.0)
}

/// Recover the angle in `[0, 360)` degrees from its cosine and sine.
///
/// Branches explicitly near the axes so `asin` never sees an argument
/// pushed outside its domain by rounding.
pub fn trig_to_angle(c: f64, s: f64) -> f64 {
    if s.abs() < EPS {
        return if c > 0.0 { 0.0 } else { 180.0 };
    }
    if c.abs() < EPS {
        return if s > 0.0 { 90.0 } else { 270.0 };
    }

    let mut alpha = s.clamp(-1.0, 1.0).asin().to_degrees();
    if c < 0.0 {
        alpha = 180.0 - alpha;
    } else if s < 0.0 {
        alpha += 360.0;
    }
    alpha
}

/// Rotate `(x, y)` around the origin by `rotation` degrees. Rotations
/// within EPS of a full turn pass the point through unchanged.
pub fn rotated_position(x: f64, y: f64, rotation: f64) -> (f64, f64) {
    let rotation = normalize_degrees(rotation);
    if rotation >= EPS && rotation <= 360.0 - EPS {
        let (s, c) = rotation.to_radians().sin_cos();
        (x * c - y * s, x * s + y * c)
    } else {
        (x, y)
    }
}
