//! Inverse kinematics and continuous path tracing.

use std::time::Duration;

use tracing::{debug, warn};

use crate::hardware::Axis;

use super::state::{normalize_degrees, trig_to_angle};
use super::{DEGREES_PER_STEP, EPS, MotionError, STEPS_PER_REV, SandPlate};

impl SandPlate {
    /// Move the ball to `(x, y)`.
    ///
    /// Solves the two-circle intersection for the elbow, quantizes both
    /// angle deltas to whole steps, then refines the pair with a bounded
    /// grid search over true forward kinematics before dispatching one
    /// synchronized two-axis rotation. Targets beyond the plate are
    /// clamped onto the boundary along the same ray.
    pub async fn goto_pos(&self, x: f64, y: f64) -> Result<(), MotionError> {
        self.cancel.check()?;

        let r = self.arm_length();
        let (mut x0, mut y0) = (x, y);
        let mut r0 = (x0 * x0 + y0 * y0).sqrt();

        if r0 > self.radius() {
            let scale = self.radius() / r0;
            warn!(
                x = x0,
                y = y0,
                clamped_x = x0 * scale,
                clamped_y = y0 * scale,
                "target out of range, going to the nearest reachable point"
            );
            x0 *= scale;
            y0 *= scale;
            r0 = self.radius();
        }

        let (cur_x, cur_y) = self.position().await;
        let hop = ((cur_x - x0).powi(2) + (cur_y - y0).powi(2)).sqrt();
        if hop >= self.tuning.goto_warn_distance {
            warn!(distance = hop, "large single positioning hop");
        }

        let pose = self.pose().await;
        let a0 = pose.arm0_deg;
        let a1 = pose.arm1_deg;

        // Ball at the center: folding arm1 to 180° is enough, arm0 stays.
        if x0.abs() < EPS && y0.abs() < EPS {
            let (steps, clockwise) = if a1 <= 180.0 {
                (((180.0 - a1) / DEGREES_PER_STEP).floor() as i64, true)
            } else {
                (((a1 - 180.0) / DEGREES_PER_STEP).floor() as i64, false)
            };
            self.rotate_axis(Axis::Arm1, steps, clockwise, Duration::ZERO)
                .await?;
            self.renderer.on_dot(x0, y0);
            return Ok(());
        }

        // The elbow must lie on both the arm0 circle x² + y² = r² and the
        // circle of radius r around the target; the second condition
        // reduces to the bisector line x0·x + y0·y = r0²/2.
        let (x1, y1, x2, y2) = elbow_candidates(x0, y0, r0, r);

        // Take the candidate closer to where the elbow is now.
        let (elbow_x, elbow_y) = self.geometry.elbow_position(a0);
        let d1 = (elbow_x - x1).powi(2) + (elbow_y - y1).powi(2);
        let d2 = (elbow_x - x2).powi(2) + (elbow_y - y2).powi(2);
        let (mut xt, mut yt) = if d1 <= d2 { (x1, y1) } else { (x2, y2) };

        // Quantize arm0 onto a step boundary.
        let alpha = trig_to_angle(xt / r, yt / r);
        let delta0 = normalize_degrees(alpha - a0);
        let j0 = (delta0 / DEGREES_PER_STEP).floor() as i64;
        let a0_quantized = normalize_degrees(a0 + j0 as f64 * DEGREES_PER_STEP);

        // Arm0 lands slightly off the algebraic elbow; aim arm1 from the
        // quantized elbow instead. The elbow-to-target distance is then
        // not exactly r.
        (xt, yt) = self.geometry.elbow_position(a0_quantized);
        let rt = ((x0 - xt).powi(2) + (y0 - yt).powi(2)).sqrt();
        let beta = trig_to_angle((x0 - xt) / rt, (y0 - yt) / rt);
        let delta1 = normalize_degrees(beta - a0_quantized - a1);
        let j1 = (delta1 / DEGREES_PER_STEP).floor() as i64;

        // Independent flooring biases each axis; search the surrounding
        // window for the pair that truly lands closest.
        let (j0, j1) = self.refine_steps(a0, a1, j0, j1, x0, y0);

        let (arm0_steps, arm0_clockwise) = signed_rotation(j0);
        let (arm1_steps, arm1_clockwise) = signed_rotation(j1);
        debug!(
            arm0_steps,
            arm0_clockwise, arm1_steps, arm1_clockwise, "positioning dispatch"
        );
        self.rotate_both(arm0_steps, arm0_clockwise, arm1_steps, arm1_clockwise)
            .await?;

        // Report the requested target, not the quantized landing, so
        // callers draw at request precision.
        self.renderer.on_dot(x0, y0);
        Ok(())
    }

    /// Evaluate every step pair in a `±grid_search_width` window around
    /// the floored deltas and keep the one whose forward kinematics lands
    /// nearest the target. Strict `<` keeps the lowest `(j0, j1)` on ties.
    fn refine_steps(&self, a0: f64, a1: f64, j0: i64, j1: i64, x0: f64, y0: f64) -> (i64, i64) {
        let width = self.tuning.grid_search_width;
        let mut best = (j0, j1);
        let mut min_dist = self.radius() * self.radius() * 4.0 + 1.0;

        for i in (j0 - width)..=(j0 + width) {
            for j in (j1 - width)..=(j1 + width) {
                let arm0 = a0 + i as f64 * DEGREES_PER_STEP;
                let arm1 = a1 + j as f64 * DEGREES_PER_STEP;
                let (px, py) = self.geometry.ball_position(arm0, arm1);
                let dist = (px - x0).powi(2) + (py - y0).powi(2);
                if dist < min_dist {
                    min_dist = dist;
                    best = (i, j);
                }
            }
        }
        best
    }

    /// Trace a (visually) straight line to `(x, y)` as bounded hops, the
    /// exact target last.
    pub async fn line_to(&self, x: f64, y: f64) -> Result<(), MotionError> {
        let (start_x, start_y) = self.position().await;
        let dx = x - start_x;
        let dy = y - start_y;
        let steps = ((dx * dx + dy * dy).sqrt() / self.tuning.line_max_step).ceil() as i64;

        for i in 1..steps {
            let t = i as f64 / steps as f64;
            self.goto_pos(start_x + dx * t, start_y + dy * t).await?;
        }
        self.goto_pos(x, y).await
    }

    /// Trace a circular arc of the given radius from the current position
    /// to `(x, y)`.
    ///
    /// `right_hand_side` picks which side of the chord the arc bulges to,
    /// `draw_minor_arc` the shorter or longer of the two paths. A chord
    /// longer than the diameter cannot lie on such a circle; the call
    /// degrades to a straight line with a warning.
    pub async fn arc_to(
        &self,
        x: f64,
        y: f64,
        radius: f64,
        right_hand_side: bool,
        draw_minor_arc: bool,
    ) -> Result<(), MotionError> {
        let (mut cur_x, mut cur_y) = self.position().await;
        let dist = ((cur_x - x).powi(2) + (cur_y - y).powi(2)).sqrt();

        if dist > 2.0 * radius {
            warn!(dist, radius, "chord longer than the diameter, drawing a line instead");
            return self.line_to(x, y).await;
        }
        if dist < EPS {
            warn!("arc endpoints coincide, nothing to sweep");
            return self.goto_pos(x, y).await;
        }

        // Arc center: chord midpoint offset perpendicular to the chord.
        let t = (radius * radius / (dist * dist) - 0.25).max(0.0).sqrt();
        let (center_x, center_y) = if right_hand_side == draw_minor_arc {
            ((cur_x + x) / 2.0 - (y - cur_y) * t, (cur_y + y) / 2.0 + (x - cur_x) * t)
        } else {
            ((cur_x + x) / 2.0 + (y - cur_y) * t, (cur_y + y) / 2.0 - (x - cur_x) * t)
        };

        // Swept angle between the start and end vectors around the center.
        let v00 = cur_x - center_x;
        let v01 = cur_y - center_y;
        let v10 = x - center_x;
        let v11 = y - center_y;
        let cos_theta = ((v10 * v00 + v11 * v01) / (v00 * v00 + v01 * v01)).clamp(-1.0, 1.0);

        let mut theta = if right_hand_side {
            cos_theta.acos()
        } else {
            -cos_theta.acos()
        }
        .to_degrees();
        if !draw_minor_arc {
            theta = if right_hand_side { 360.0 - theta } else { -360.0 - theta };
        }

        let steps =
            (radius * theta.abs().to_radians() / self.tuning.arc_max_step).ceil() as i64;
        if steps <= 1 {
            return self.goto_pos(x, y).await;
        }

        let (sin_step, cos_step) = (theta / steps as f64).to_radians().sin_cos();
        for _ in 0..steps - 1 {
            let next_x = center_x + (cur_x - center_x) * cos_step - (cur_y - center_y) * sin_step;
            let next_y = center_y + (cur_y - center_y) * cos_step + (cur_x - center_x) * sin_step;
            self.goto_pos(next_x, next_y).await?;
            cur_x = next_x;
            cur_y = next_y;
        }
        self.goto_pos(x, y).await
    }
}

/// The two elbow solutions for a reachable target, via the perpendicular-
/// bisector form of the two-circle intersection. Near-axis targets use
/// closed forms so nothing divides by a vanishing coordinate.
fn elbow_candidates(x0: f64, y0: f64, r0: f64, r: f64) -> (f64, f64, f64, f64) {
    if x0.abs() < EPS {
        let y1 = r0 * r0 / 2.0 / y0;
        let x1 = (r * r - y1 * y1).max(0.0).sqrt();
        (x1, y1, -x1, y1)
    } else if y0.abs() < EPS {
        let x1 = r0 * r0 / 2.0 / x0;
        let y1 = (r * r - x1 * x1).max(0.0).sqrt();
        (x1, y1, x1, -y1)
    } else {
        let a = 4.0 * r0.powi(2);
        let b = -4.0 * r0.powi(2) * y0;
        let c = r0.powi(4) - 4.0 * r.powi(2) * x0.powi(2);
        let root = (b * b - 4.0 * a * c).max(0.0).sqrt();

        // Pair the roots so neither suffers cancellation between -b and
        // the discriminant root.
        let (y1, y2) = if b >= 0.0 {
            ((-b - root) / a / 2.0, 2.0 * c / (-b - root))
        } else {
            (2.0 * c / (-b + root), (-b + root) / a / 2.0)
        };

        let x1 = (r0 * r0 / 2.0 - y0 * y1) / x0;
        let x2 = (r0 * r0 / 2.0 - y0 * y2) / x0;
        (x1, y1, x2, y2)
    }
}

/// Map an absolute step delta (mod one revolution) onto the short signed
/// rotation: at most half a revolution in either direction.
fn signed_rotation(j: i64) -> (i64, bool) {
    let j = j.rem_euclid(i64::from(STEPS_PER_REV));
    if j <= i64::from(STEPS_PER_REV / 2) {
        (j, true)
    } else {
        (i64::from(STEPS_PER_REV) - j, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_on_circles(x0: f64, y0: f64, r0: f64, r: f64, ex: f64, ey: f64) {
        // on the arm0 circle
        assert!(
            ((ex * ex + ey * ey).sqrt() - r).abs() < 1e-6,
            "elbow ({ex}, {ey}) off the arm circle"
        );
        // on the bisector line, i.e. equidistant from center and target
        assert!(
            (x0 * ex + y0 * ey - r0 * r0 / 2.0).abs() < 1e-6,
            "elbow ({ex}, {ey}) off the bisector"
        );
    }

    #[test]
    fn elbow_candidates_lie_on_both_circles() {
        let r = 200.0;
        for &(x0, y0) in &[
            (120.0, 90.0),
            (-250.0, 130.0),
            (30.0, -340.0),
            (-100.0, -100.0),
            (0.0, 260.0),
            (310.0, 0.0),
        ] {
            let r0 = f64::hypot(x0, y0);
            let (x1, y1, x2, y2) = elbow_candidates(x0, y0, r0, r);
            assert_on_circles(x0, y0, r0, r, x1, y1);
            assert_on_circles(x0, y0, r0, r, x2, y2);
        }
    }

    #[test]
    fn elbow_candidates_merge_at_full_extension() {
        let r = 200.0;
        let (x0, y0) = (240.0, 320.0); // exactly on the rim
        let r0 = f64::hypot(x0, y0);
        let (x1, y1, x2, y2) = elbow_candidates(x0, y0, r0, r);
        assert!((x1 - x2).abs() < 1e-6);
        assert!((y1 - y2).abs() < 1e-6);
        assert_on_circles(x0, y0, r0, r, x1, y1);
    }

    #[test]
    fn signed_rotation_prefers_the_short_way() {
        assert_eq!(signed_rotation(100), (100, true));
        assert_eq!(signed_rotation(512), (512, true));
        assert_eq!(signed_rotation(513), (511, false));
        assert_eq!(signed_rotation(1023), (1, false));
        assert_eq!(signed_rotation(-1), (1, false));
        assert_eq!(signed_rotation(1024), (0, true));
    }
}
