//! Quantized rotation primitives and the two-axis synchronization contract.

use std::time::Duration;

use tracing::{debug, warn};

use crate::hardware::{ArmPose, Axis};

use super::state::normalize_degrees;
use super::{DEGREES_PER_STEP, MotionError, SandPlate};

impl SandPlate {
    /// Milliseconds the motor needs for `steps`, under the fixed linear
    /// time model.
    pub fn time_needed(&self, steps: u32) -> Duration {
        Duration::from_millis(u64::from(steps) * self.tuning.ms_per_step)
    }

    /// Rotate a single axis by a quantized step count.
    ///
    /// Negative counts are clamped to zero with a warning, never rejected.
    /// The rotation is issued in chunks of at most `chunk_steps` so the
    /// renderer sees intermediate poses; chunking changes neither the
    /// final angle nor the total duration. `extra_delay` is slept after
    /// the rotation, before completion is reported.
    pub async fn rotate_axis(
        &self,
        axis: Axis,
        steps: i64,
        clockwise: bool,
        extra_delay: Duration,
    ) -> Result<(), MotionError> {
        self.cancel.check()?;

        if steps < 0 {
            warn!(%axis, steps, "negative step count clamped to 0");
        }
        let mut remaining = saturate_steps(steps);

        while remaining > 0 {
            self.cancel.check()?;
            let chunk = remaining.min(self.tuning.chunk_steps.max(1));
            self.actuator.rotate(axis, chunk, clockwise).await?;
            let pose = {
                let mut state = self.state.write().await;
                state.apply_steps(axis, chunk, clockwise);
                ArmPose {
                    arm0_deg: state.arm0_deg(),
                    arm1_deg: state.arm1_deg(),
                }
            };
            self.renderer.on_step(pose);
            remaining -= chunk;
        }

        if !extra_delay.is_zero() {
            tokio::time::sleep(extra_delay).await;
        }
        Ok(())
    }

    /// Rotate both axes so they complete at (approximately) the same time.
    ///
    /// The axis needing less time sleeps the difference after its own
    /// rotation, so both futures resolve together; completion skew stays
    /// under one step duration.
    pub async fn rotate_both(
        &self,
        arm0_steps: i64,
        arm0_clockwise: bool,
        arm1_steps: i64,
        arm1_clockwise: bool,
    ) -> Result<(), MotionError> {
        let t0 = self.time_needed(saturate_steps(arm0_steps));
        let t1 = self.time_needed(saturate_steps(arm1_steps));
        let (delay0, delay1) = compensating_delays(t0, t1);

        let (r0, r1) = tokio::join!(
            self.rotate_axis(Axis::Arm0, arm0_steps, arm0_clockwise, delay0),
            self.rotate_axis(Axis::Arm1, arm1_steps, arm1_clockwise, delay1),
        );
        r0?;
        r1?;
        Ok(())
    }

    /// Return to the rest pose: arm0 at 0°, arm1 at 180°, each by the
    /// shortest quantized rotation from its current normalized angle.
    pub async fn park(&self) -> Result<(), MotionError> {
        let pose = self.pose().await;
        let (steps0, cw0) = shortest_rotation(pose.arm0_deg, 0.0);
        let (steps1, cw1) = shortest_rotation(pose.arm1_deg, 180.0);
        debug!(steps0, cw0, steps1, cw1, "parking");
        self.rotate_both(steps0, cw0, steps1, cw1).await
    }
}

fn saturate_steps(steps: i64) -> u32 {
    u32::try_from(steps.max(0)).unwrap_or(u32::MAX)
}

/// Extra post-rotation delay for each axis so both complete together.
fn compensating_delays(t0: Duration, t1: Duration) -> (Duration, Duration) {
    if t0 >= t1 {
        (Duration::ZERO, t0 - t1)
    } else {
        (t1 - t0, Duration::ZERO)
    }
}

/// Quantized shortest rotation taking one normalized angle to another.
fn shortest_rotation(from_deg: f64, to_deg: f64) -> (i64, bool) {
    let delta = normalize_degrees(to_deg - from_deg);
    if delta <= 180.0 {
        ((delta / DEGREES_PER_STEP).floor() as i64, true)
    } else {
        (((360.0 - delta) / DEGREES_PER_STEP).floor() as i64, false)
    }
}
