//! Kinematic core: arm state, quantized rotation primitives, path tracing.

mod primitives;
mod state;
mod tracer;

pub use state::{KinematicState, PlateGeometry, normalize_degrees, rotated_position, trig_to_angle};

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use thiserror::Error;
use tokio::sync::RwLock;

use crate::config::MotionTuning;
use crate::hardware::{Actuator, ActuatorError, ArmPose, Renderer};

/// Steps per full revolution, fixed by the motor-controller protocol.
pub const STEPS_PER_REV: u32 = 1024;

/// Degrees swept by a single motor step.
pub const DEGREES_PER_STEP: f64 = 360.0 / 1024.0;

/// Tolerance for "at the center" targets and for the trig branch cuts.
pub const EPS: f64 = 1e-2;

#[derive(Debug, Error)]
pub enum MotionError {
    #[error("motion cancelled")]
    Cancelled,
    #[error(transparent)]
    Actuator(#[from] ActuatorError),
}

/// Cooperative cancellation handle. Clones share the flag; any clone
/// cancels all holders.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    pub(crate) fn check(&self) -> Result<(), MotionError> {
        if self.is_cancelled() {
            Err(MotionError::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// A drivable two-arm plate: geometry, angle state, the external
/// capabilities, and the motion tuning constants.
///
/// All motion methods take `&self`; the angle state sits behind a lock so
/// the two axes of a synchronized rotation can update it concurrently.
pub struct SandPlate {
    geometry: PlateGeometry,
    state: Arc<RwLock<KinematicState>>,
    actuator: Arc<dyn Actuator>,
    renderer: Arc<dyn Renderer>,
    tuning: MotionTuning,
    cancel: CancelToken,
}

impl SandPlate {
    pub fn new(
        radius: f64,
        actuator: Arc<dyn Actuator>,
        renderer: Arc<dyn Renderer>,
        tuning: MotionTuning,
    ) -> Self {
        Self {
            geometry: PlateGeometry::new(radius),
            state: Arc::new(RwLock::new(KinematicState::default())),
            actuator,
            renderer,
            tuning,
            cancel: CancelToken::new(),
        }
    }

    pub fn geometry(&self) -> PlateGeometry {
        self.geometry
    }

    pub fn radius(&self) -> f64 {
        self.geometry.radius()
    }

    pub fn arm_length(&self) -> f64 {
        self.geometry.arm_length()
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Current normalized arm angles.
    pub async fn pose(&self) -> ArmPose {
        let state = self.state.read().await;
        ArmPose {
            arm0_deg: state.arm0_deg(),
            arm1_deg: state.arm1_deg(),
        }
    }

    /// Ball position from forward kinematics. Never cached, so it cannot
    /// drift from the angle state.
    pub async fn position(&self) -> (f64, f64) {
        let state = self.state.read().await;
        self.geometry.ball_position(state.arm0_deg(), state.arm1_deg())
    }

    /// Turtle heading in degrees, `[0, 360)`.
    pub async fn heading_deg(&self) -> f64 {
        self.state.read().await.heading_deg()
    }

    pub async fn set_heading_deg(&self, heading: f64) {
        self.state.write().await.set_heading_deg(heading);
    }
}
