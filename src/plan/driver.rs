//! Plan execution: argument resolution and dispatch onto the plate.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use thiserror::Error;
use tracing::{info, warn};

use crate::hardware::Axis;
use crate::motion::{MotionError, SandPlate};

use super::expr::{self, Context, ExprError};
use super::{Instruction, Plan, PlanError};

#[derive(Debug, Error)]
pub enum ExecError {
    #[error("no plan loaded")]
    NoPlan,
    #[error("argument `{argument}` of `{instruction}`: {source}")]
    Argument {
        instruction: &'static str,
        argument: &'static str,
        #[source]
        source: ExprError,
    },
    #[error(transparent)]
    Motion(#[from] MotionError),
}

/// Interpreter states. A plan is loaded once and can run many times; a
/// failed load leaves the driver without a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    Idle,
    Loaded,
    Running,
}

/// Owns a plate and feeds it instructions from a loaded plan.
pub struct Driver {
    plate: SandPlate,
    plan: Option<Plan>,
    running: bool,
}

impl Driver {
    pub fn new(plate: SandPlate) -> Self {
        Self {
            plate,
            plan: None,
            running: false,
        }
    }

    pub fn plate(&self) -> &SandPlate {
        &self.plate
    }

    pub fn state(&self) -> DriverState {
        match (&self.plan, self.running) {
            (_, true) => DriverState::Running,
            (Some(_), false) => DriverState::Loaded,
            (None, false) => DriverState::Idle,
        }
    }

    /// Load a plan from text. On failure nothing stays loaded.
    pub fn load_from_str(&mut self, text: &str) -> Result<(), PlanError> {
        self.plan = None;
        let plan = Plan::parse(text)?;
        info!(instructions = plan.instructions().len(), "plan loaded");
        self.plan = Some(plan);
        Ok(())
    }

    /// Execute the loaded plan to completion, strictly sequentially. The
    /// variable context lives for exactly this one run.
    pub async fn execute(&mut self) -> Result<(), ExecError> {
        let plan = self.plan.clone().ok_or(ExecError::NoPlan)?;
        self.running = true;
        let mut ctx = Context::new();
        let result = self.execute_block(plan.instructions(), &mut ctx, 0).await;
        self.running = false;
        result
    }

    fn execute_block<'a>(
        &'a self,
        instructions: &'a [Instruction],
        ctx: &'a mut Context,
        depth: usize,
    ) -> Pin<Box<dyn Future<Output = Result<(), ExecError>> + Send + 'a>> {
        Box::pin(async move {
            for instruction in instructions {
                if self.plate.cancel_token().is_cancelled() {
                    return Err(MotionError::Cancelled.into());
                }
                self.execute_instruction(instruction, ctx, depth).await?;
            }
            Ok(())
        })
    }

    async fn execute_instruction(
        &self,
        instruction: &Instruction,
        ctx: &mut Context,
        depth: usize,
    ) -> Result<(), ExecError> {
        let plate = &self.plate;
        match instruction {
            Instruction::Line { x, y } => {
                let x = resolve(x, ctx, "line", "x")?;
                let y = resolve(y, ctx, "line", "y")?;
                plate.line_to(x, y).await?;
            }
            Instruction::Goto { x, y } => {
                let x = resolve(x, ctx, "goto", "x")?;
                let y = resolve(y, ctx, "goto", "y")?;
                plate.goto_pos(x, y).await?;
            }
            Instruction::Park => plate.park().await?,
            Instruction::Arc {
                x,
                y,
                radius,
                right_hand_side,
                draw_minor_arc,
            } => {
                let x = resolve(x, ctx, "arc", "x")?;
                let y = resolve(y, ctx, "arc", "y")?;
                let radius = resolve(radius, ctx, "arc", "radius")?;
                let right_hand_side =
                    resolve_flag(right_hand_side, true, ctx, "arc", "rightHandSide")?;
                let draw_minor_arc =
                    resolve_flag(draw_minor_arc, true, ctx, "arc", "drawMinorArc")?;
                plate
                    .arc_to(x, y, radius, right_hand_side, draw_minor_arc)
                    .await?;
            }
            Instruction::RotateArm0 { steps, clockwise } => {
                let steps = resolve(steps, ctx, "rotateArm0", "steps")?.floor() as i64;
                let clockwise = resolve_flag(clockwise, true, ctx, "rotateArm0", "clockwise")?;
                plate
                    .rotate_axis(Axis::Arm0, steps, clockwise, Duration::ZERO)
                    .await?;
            }
            Instruction::RotateArm1 { steps, clockwise } => {
                let steps = resolve(steps, ctx, "rotateArm1", "steps")?.floor() as i64;
                let clockwise = resolve_flag(clockwise, true, ctx, "rotateArm1", "clockwise")?;
                plate
                    .rotate_axis(Axis::Arm1, steps, clockwise, Duration::ZERO)
                    .await?;
            }
            Instruction::RotateBoth {
                arm0_steps,
                arm0_clockwise,
                arm1_steps,
                arm1_clockwise,
            } => {
                let arm0_steps = resolve(arm0_steps, ctx, "rotateBothArms", "arm0Steps")?.floor() as i64;
                let arm0_clockwise =
                    flag_value(arm0_clockwise, ctx, "rotateBothArms", "arm0Clockwise")?;
                let arm1_steps = resolve(arm1_steps, ctx, "rotateBothArms", "arm1Steps")?.floor() as i64;
                let arm1_clockwise =
                    flag_value(arm1_clockwise, ctx, "rotateBothArms", "arm1Clockwise")?;
                plate
                    .rotate_both(arm0_steps, arm0_clockwise, arm1_steps, arm1_clockwise)
                    .await?;
            }
            Instruction::Hilbert { depth: d, rotation } => {
                let d = curve_depth(resolve(d, ctx, "hilbert", "depth")?);
                let rotation = resolve_or(rotation, 0.0, ctx, "hilbert", "rotation")?;
                plate.hilbert_curve(d, rotation).await?;
            }
            Instruction::Peano { depth: d, rotation } => {
                let d = curve_depth(resolve(d, ctx, "peano", "depth")?);
                let rotation = resolve_or(rotation, 0.0, ctx, "peano", "rotation")?;
                plate.peano_curve(d, rotation).await?;
            }
            Instruction::Sleep { millis } => {
                let mut millis = resolve(millis, ctx, "sleep", "milliseconds")?;
                if !(millis >= 0.0 && millis.is_finite()) {
                    warn!(millis, "sleep duration clamped to 0");
                    millis = 0.0;
                }
                tokio::time::sleep(Duration::from_secs_f64(millis / 1000.0)).await;
            }
            Instruction::Let { name, value } => {
                // Only the right-hand side is an expression; the name is
                // bound verbatim.
                let value = resolve(value, ctx, "let", "value")?;
                ctx.bind(name.clone(), value);
            }
            Instruction::Loop { count, body } => {
                let count = resolve(count, ctx, "loop", "count")?.floor().max(0.0) as u64;
                let index_name = format!("i{depth}");
                for i in 0..count {
                    ctx.bind(index_name.clone(), i as f64);
                    self.execute_block(body, ctx, depth + 1).await?;
                }
            }
        }
        Ok(())
    }
}

/// Deepest curve a plan may request; 4^10 cells is already far beyond any
/// drawable plate.
const MAX_CURVE_DEPTH: u32 = 10;

fn curve_depth(value: f64) -> u32 {
    let depth = value.floor().max(0.0) as u32;
    if depth > MAX_CURVE_DEPTH {
        warn!(depth, "curve depth clamped to {MAX_CURVE_DEPTH}");
        return MAX_CURVE_DEPTH;
    }
    depth
}

fn resolve(
    expr: &str,
    ctx: &Context,
    instruction: &'static str,
    argument: &'static str,
) -> Result<f64, ExecError> {
    expr::eval(expr, ctx).map_err(|source| ExecError::Argument {
        instruction,
        argument,
        source,
    })
}

fn resolve_or(
    expr: &Option<String>,
    default: f64,
    ctx: &Context,
    instruction: &'static str,
    argument: &'static str,
) -> Result<f64, ExecError> {
    match expr {
        Some(expr) => resolve(expr, ctx, instruction, argument),
        None => Ok(default),
    }
}

/// Boolean-ish arguments: JSON `true`/`false` literals pass through, any
/// numeric expression counts as true when non-zero.
fn flag_value(
    expr: &str,
    ctx: &Context,
    instruction: &'static str,
    argument: &'static str,
) -> Result<bool, ExecError> {
    match expr {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Ok(resolve(expr, ctx, instruction, argument)? != 0.0),
    }
}

fn resolve_flag(
    expr: &Option<String>,
    default: bool,
    ctx: &Context,
    instruction: &'static str,
    argument: &'static str,
) -> Result<bool, ExecError> {
    match expr {
        Some(expr) => flag_value(expr, ctx, instruction, argument),
        None => Ok(default),
    }
}
