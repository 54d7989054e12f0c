//! Row tokenization and loop-tree construction.

use serde_json::Value;
use tracing::debug;

use super::expr::is_identifier;
use super::{Instruction, Plan, PlanError};

/// Parse plan text into an instruction tree.
///
/// The primary format is a JSON array of rows, each row
/// `[keyword, arg, ...]`. Anything that does not parse as such JSON goes
/// through the plain-text fallback: one row per line, comma-separated,
/// fields trimmed, blank lines skipped.
pub(super) fn parse(text: &str) -> Result<Plan, PlanError> {
    let rows = match serde_json::from_str::<Vec<Vec<Value>>>(text) {
        Ok(rows) => rows
            .into_iter()
            .map(|row| row.iter().map(value_to_string).collect())
            .collect(),
        Err(err) => {
            debug!(%err, "not a JSON plan, using the plain-text row format");
            plaintext_rows(text)
        }
    };
    build_tree(rows)
}

fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_string(),
        other => other.to_string(),
    }
}

fn plaintext_rows(text: &str) -> Vec<Vec<String>> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| line.split(',').map(|field| field.trim().to_string()).collect())
        .collect()
}

/// Fold the flat row list into a tree by matching loop markers with a
/// stack of open loop bodies. Markers must balance.
fn build_tree(rows: Vec<Vec<String>>) -> Result<Plan, PlanError> {
    let mut top: Vec<Instruction> = Vec::new();
    let mut open: Vec<(String, Vec<Instruction>)> = Vec::new();

    for (row, fields) in rows.into_iter().enumerate() {
        let mut fields = fields.into_iter();
        let keyword = fields
            .next()
            .filter(|keyword| !keyword.is_empty())
            .ok_or(PlanError::EmptyRow { row })?;
        let args: Vec<String> = fields.collect();

        match keyword.as_str() {
            "loopStart" => {
                let got = args.len();
                let mut args = args.into_iter();
                match (args.next(), args.next()) {
                    (Some(count), None) => open.push((count, Vec::new())),
                    _ => {
                        return Err(PlanError::BadArity {
                            instruction: "loopStart".into(),
                            expected: "1".into(),
                            got,
                        });
                    }
                }
            }
            "loopEnd" => {
                if !args.is_empty() {
                    return Err(PlanError::BadArity {
                        instruction: "loopEnd".into(),
                        expected: "0".into(),
                        got: args.len(),
                    });
                }
                let (count, body) = open.pop().ok_or(PlanError::UnmatchedLoopEnd)?;
                let node = Instruction::Loop { count, body };
                match open.last_mut() {
                    Some((_, parent)) => parent.push(node),
                    None => top.push(node),
                }
            }
            _ => {
                let instruction = parse_instruction(&keyword, args)?;
                match open.last_mut() {
                    Some((_, body)) => body.push(instruction),
                    None => top.push(instruction),
                }
            }
        }
    }

    if !open.is_empty() {
        return Err(PlanError::UnmatchedLoopStart);
    }
    Ok(Plan { instructions: top })
}

fn parse_instruction(keyword: &str, args: Vec<String>) -> Result<Instruction, PlanError> {
    let got = args.len();
    let bad = |expected: &str| PlanError::BadArity {
        instruction: keyword.to_string(),
        expected: expected.to_string(),
        got,
    };
    let mut args = args.into_iter();

    match keyword {
        "line" => {
            let (Some(x), Some(y), None) = (args.next(), args.next(), args.next()) else {
                return Err(bad("2"));
            };
            Ok(Instruction::Line { x, y })
        }
        "goto" => {
            let (Some(x), Some(y), None) = (args.next(), args.next(), args.next()) else {
                return Err(bad("2"));
            };
            Ok(Instruction::Goto { x, y })
        }
        "park" => {
            if args.next().is_some() {
                return Err(bad("0"));
            }
            Ok(Instruction::Park)
        }
        "arc" => {
            let (Some(x), Some(y), Some(radius)) = (args.next(), args.next(), args.next()) else {
                return Err(bad("3 to 5"));
            };
            let right_hand_side = args.next();
            let draw_minor_arc = args.next();
            if args.next().is_some() {
                return Err(bad("3 to 5"));
            }
            Ok(Instruction::Arc {
                x,
                y,
                radius,
                right_hand_side,
                draw_minor_arc,
            })
        }
        "rotateArm0" | "rotateArm1" => {
            let Some(steps) = args.next() else {
                return Err(bad("1 to 2"));
            };
            let clockwise = args.next();
            if args.next().is_some() {
                return Err(bad("1 to 2"));
            }
            if keyword == "rotateArm0" {
                Ok(Instruction::RotateArm0 { steps, clockwise })
            } else {
                Ok(Instruction::RotateArm1 { steps, clockwise })
            }
        }
        "rotateBothArms" => {
            let (Some(arm0_steps), Some(arm0_clockwise), Some(arm1_steps), Some(arm1_clockwise), None) =
                (args.next(), args.next(), args.next(), args.next(), args.next())
            else {
                return Err(bad("4"));
            };
            Ok(Instruction::RotateBoth {
                arm0_steps,
                arm0_clockwise,
                arm1_steps,
                arm1_clockwise,
            })
        }
        "hilbert" | "peano" => {
            let Some(depth) = args.next() else {
                return Err(bad("1 to 2"));
            };
            let rotation = args.next();
            if args.next().is_some() {
                return Err(bad("1 to 2"));
            }
            if keyword == "hilbert" {
                Ok(Instruction::Hilbert { depth, rotation })
            } else {
                Ok(Instruction::Peano { depth, rotation })
            }
        }
        "sleep" => {
            let (Some(millis), None) = (args.next(), args.next()) else {
                return Err(bad("1"));
            };
            Ok(Instruction::Sleep { millis })
        }
        "let" => {
            let (Some(name), Some(value), None) = (args.next(), args.next(), args.next()) else {
                return Err(bad("2"));
            };
            if !is_identifier(&name) {
                return Err(PlanError::InvalidIdentifier(name));
            }
            Ok(Instruction::Let { name, value })
        }
        _ => Err(PlanError::UnknownInstruction(keyword.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_and_plaintext_rows_build_the_same_tree() {
        let json = Plan::parse(r#"[["line", "10", "20"], ["park"]]"#).unwrap();
        let text = Plan::parse("line, 10, 20\npark").unwrap();
        assert_eq!(json, text);
    }

    #[test]
    fn json_numbers_become_expression_strings() {
        let plan = Plan::parse(r#"[["goto", 120, -40.5]]"#).unwrap();
        assert_eq!(
            plan.instructions(),
            &[Instruction::Goto {
                x: "120".into(),
                y: "-40.5".into()
            }]
        );
    }

    #[test]
    fn nested_loops_fold_inside_out() {
        let plan = Plan::parse(
            "loopStart, 2\nloopStart, 3\nline, i1, i0\nloopEnd\npark\nloopEnd",
        )
        .unwrap();
        assert_eq!(plan.instructions().len(), 1);
        let Instruction::Loop { count, body } = &plan.instructions()[0] else {
            panic!("expected outer loop");
        };
        assert_eq!(count, "2");
        assert_eq!(body.len(), 2);
        assert!(matches!(&body[0], Instruction::Loop { count, body } if count == "3" && body.len() == 1));
        assert_eq!(body[1], Instruction::Park);
    }

    #[test]
    fn unbalanced_markers_fail() {
        assert_eq!(
            Plan::parse("loopStart, 2\nline, 0, 0"),
            Err(PlanError::UnmatchedLoopStart)
        );
        assert_eq!(Plan::parse("loopEnd"), Err(PlanError::UnmatchedLoopEnd));
    }

    #[test]
    fn arity_is_checked_per_keyword() {
        assert!(matches!(
            Plan::parse("line, 10"),
            Err(PlanError::BadArity { .. })
        ));
        assert!(matches!(
            Plan::parse("park, 1"),
            Err(PlanError::BadArity { .. })
        ));
        assert!(matches!(
            Plan::parse("arc, 1, 2"),
            Err(PlanError::BadArity { .. })
        ));
        assert!(matches!(
            Plan::parse("loopStart"),
            Err(PlanError::BadArity { .. })
        ));
    }

    #[test]
    fn keywords_are_case_sensitive() {
        assert_eq!(
            Plan::parse("Line, 1, 2"),
            Err(PlanError::UnknownInstruction("Line".into()))
        );
    }

    #[test]
    fn let_requires_an_identifier_target() {
        assert_eq!(
            Plan::parse("let, 2x, 5"),
            Err(PlanError::InvalidIdentifier("2x".into()))
        );
        assert!(Plan::parse("let, r, 5").is_ok());
    }
}
