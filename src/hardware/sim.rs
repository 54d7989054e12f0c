//! Hardware-free actuator and renderer implementations.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use super::{Actuator, ActuatorError, ArmPose, Axis, Renderer};

/// Actuator that models motor timing as a fixed number of milliseconds
/// per step, spent in a tokio sleep.
#[derive(Debug, Clone)]
pub struct SimulatedActuator {
    ms_per_step: u64,
}

impl SimulatedActuator {
    pub fn new(ms_per_step: u64) -> Self {
        Self { ms_per_step }
    }
}

#[async_trait]
impl Actuator for SimulatedActuator {
    async fn rotate(&self, _axis: Axis, steps: u32, _clockwise: bool) -> Result<(), ActuatorError> {
        tokio::time::sleep(Duration::from_millis(u64::from(steps) * self.ms_per_step)).await;
        Ok(())
    }
}

/// Renderer that ignores every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullRenderer;

impl Renderer for NullRenderer {
    fn on_step(&self, _pose: ArmPose) {}
    fn on_dot(&self, _x: f64, _y: f64) {}
}

/// Renderer that traces every event, for running the host headless.
#[derive(Debug, Clone, Copy, Default)]
pub struct TraceRenderer;

impl Renderer for TraceRenderer {
    fn on_step(&self, pose: ArmPose) {
        debug!(arm0 = pose.arm0_deg, arm1 = pose.arm1_deg, "step");
    }

    fn on_dot(&self, x: f64, y: f64) {
        debug!(x, y, "dot");
    }
}

/// Renderer that records every event, for assertions in tests.
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    steps: Mutex<Vec<ArmPose>>,
    dots: Mutex<Vec<(f64, f64)>>,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn steps(&self) -> Vec<ArmPose> {
        self.steps.lock().unwrap().clone()
    }

    pub fn dots(&self) -> Vec<(f64, f64)> {
        self.dots.lock().unwrap().clone()
    }
}

impl Renderer for RecordingRenderer {
    fn on_step(&self, pose: ArmPose) {
        self.steps.lock().unwrap().push(pose);
    }

    fn on_dot(&self, x: f64, y: f64) {
        self.dots.lock().unwrap().push((x, y));
    }
}
