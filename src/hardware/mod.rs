//! Capability traits consumed by the kinematic core.
//!
//! The core never speaks the motor wire protocol and never draws anything
//! itself: it commands an [`Actuator`] and notifies a [`Renderer`].

mod sim;

pub use sim::{NullRenderer, RecordingRenderer, SimulatedActuator, TraceRenderer};

use async_trait::async_trait;
use thiserror::Error;

/// The two motorized axes of the rig.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    /// The arm pivoting at the plate center.
    Arm0,
    /// The arm pivoting at Arm0's free end.
    Arm1,
}

impl std::fmt::Display for Axis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Axis::Arm0 => write!(f, "arm0"),
            Axis::Arm1 => write!(f, "arm1"),
        }
    }
}

#[derive(Debug, Error)]
pub enum ActuatorError {
    #[error("{axis} rejected rotation: {reason}")]
    Rejected { axis: Axis, reason: String },
    #[error("device unavailable: {0}")]
    Unavailable(String),
}

/// Motor-controller capability.
///
/// Called once per primitive (sub-)rotation with a quantized step count;
/// resolves when the physical motion has completed. Timeout and retry
/// policy belong to the driver behind this trait, not to the core.
#[async_trait]
pub trait Actuator: Send + Sync {
    async fn rotate(&self, axis: Axis, steps: u32, clockwise: bool) -> Result<(), ActuatorError>;
}

/// Normalized arm angles after a completed sub-rotation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArmPose {
    pub arm0_deg: f64,
    pub arm1_deg: f64,
}

/// Observational rendering capability.
///
/// `on_step` fires after every sub-rotation, `on_dot` after every settled
/// positioning move. Implementations must not meaningfully block motion.
pub trait Renderer: Send + Sync {
    fn on_step(&self, pose: ArmPose);
    fn on_dot(&self, x: f64, y: f64);
}
