//! sandrig: host software for a two-arm polar drawing rig.
//!
//! Two equal-length arms position a drawing ball anywhere on a disc: Arm0
//! pivots at the plate center, Arm1 pivots at Arm0's free end. The crate
//! covers the kinematic core (forward/inverse kinematics with step
//! quantization, synchronized two-axis rotation), path tracing (lines,
//! arcs), recursive curve generators (Hilbert, Peano, octagon fractal,
//! turtle-style drawing), and a small plan language with nested loops and
//! variable substitution.
//!
//! Rendering and the motor wire protocol stay behind the [`Renderer`] and
//! [`Actuator`] capabilities.

pub mod config;
pub mod curves;
pub mod hardware;
pub mod motion;
pub mod plan;

pub use config::{Config, load_config};
pub use hardware::{Actuator, ActuatorError, ArmPose, Axis, Renderer};
pub use motion::{CancelToken, MotionError, SandPlate};
pub use plan::{Driver, DriverState, ExecError, Instruction, Plan, PlanError};
