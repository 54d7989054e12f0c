//! The plan language: rows of instructions with nested loops and
//! variable substitution.

mod driver;
mod expr;
mod parser;

pub use driver::{Driver, DriverState, ExecError};
pub use expr::{Context, ExprError, eval, is_identifier};

use thiserror::Error;

/// Errors raised while loading a plan. All are fatal: a plan that fails
/// to parse is not loaded.
#[derive(Debug, Error, PartialEq)]
pub enum PlanError {
    #[error("unknown instruction `{0}`")]
    UnknownInstruction(String),
    #[error("`{instruction}` expects {expected} argument(s), got {got}")]
    BadArity {
        instruction: String,
        expected: String,
        got: usize,
    },
    #[error("loopStart without a matching loopEnd")]
    UnmatchedLoopStart,
    #[error("loopEnd without a matching loopStart")]
    UnmatchedLoopEnd,
    #[error("`let` target `{0}` is not a valid identifier")]
    InvalidIdentifier(String),
    #[error("row {row} is empty")]
    EmptyRow { row: usize },
}

/// One node of the instruction tree.
///
/// Arguments are raw expression strings, resolved against the loop
/// context at execution time; optional arguments fall back to their
/// defaults when omitted.
#[derive(Debug, Clone, PartialEq)]
pub enum Instruction {
    Line {
        x: String,
        y: String,
    },
    Goto {
        x: String,
        y: String,
    },
    Park,
    Arc {
        x: String,
        y: String,
        radius: String,
        right_hand_side: Option<String>,
        draw_minor_arc: Option<String>,
    },
    RotateArm0 {
        steps: String,
        clockwise: Option<String>,
    },
    RotateArm1 {
        steps: String,
        clockwise: Option<String>,
    },
    RotateBoth {
        arm0_steps: String,
        arm0_clockwise: String,
        arm1_steps: String,
        arm1_clockwise: String,
    },
    Hilbert {
        depth: String,
        rotation: Option<String>,
    },
    Peano {
        depth: String,
        rotation: Option<String>,
    },
    Loop {
        count: String,
        body: Vec<Instruction>,
    },
    Sleep {
        millis: String,
    },
    Let {
        name: String,
        value: String,
    },
}

/// An immutable, loop-structured instruction tree.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Plan {
    instructions: Vec<Instruction>,
}

impl Plan {
    /// Parse plan text: a JSON array of rows, or the plain-text fallback
    /// (one comma-separated row per line) when the text is not JSON.
    pub fn parse(text: &str) -> Result<Self, PlanError> {
        parser::parse(text)
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }
}
