//! Plan loading and interpretation against a simulated plate.

use std::sync::Arc;
use std::time::Duration;

use sandrig::config::MotionTuning;
use sandrig::hardware::{NullRenderer, RecordingRenderer, SimulatedActuator};
use sandrig::motion::{MotionError, SandPlate};
use sandrig::plan::{Driver, DriverState, ExecError, Instruction, Plan, PlanError};

fn plate_with(renderer: Arc<RecordingRenderer>) -> SandPlate {
    let tuning = MotionTuning::default();
    SandPlate::new(
        400.0,
        Arc::new(SimulatedActuator::new(tuning.ms_per_step)),
        renderer,
        tuning,
    )
}

fn quiet_driver() -> Driver {
    let tuning = MotionTuning::default();
    Driver::new(SandPlate::new(
        400.0,
        Arc::new(SimulatedActuator::new(tuning.ms_per_step)),
        Arc::new(NullRenderer),
        tuning,
    ))
}

#[test]
fn loop_markers_fold_into_a_tree() {
    let plan = Plan::parse(r#"[["loopStart", 3], ["line", 1, 1], ["loopEnd"]]"#).unwrap();
    assert_eq!(plan.instructions().len(), 1);
    let Instruction::Loop { count, body } = &plan.instructions()[0] else {
        panic!("expected a loop node, got {:?}", plan.instructions()[0]);
    };
    assert_eq!(count, "3");
    assert_eq!(body.len(), 1);
    assert!(matches!(&body[0], Instruction::Line { .. }));
}

#[test]
fn unmatched_loop_start_fails_to_load() {
    let mut driver = quiet_driver();
    assert_eq!(
        driver.load_from_str(r#"[["loopStart", 2], ["park"]]"#),
        Err(PlanError::UnmatchedLoopStart)
    );
    assert_eq!(driver.state(), DriverState::Idle);
}

#[test]
fn plain_text_fallback_matches_json() {
    let from_text = Plan::parse("line,10,20\npark").unwrap();
    let from_json = Plan::parse(r#"[["line", "10", "20"], ["park"]]"#).unwrap();
    assert_eq!(from_text, from_json);
}

#[tokio::test(start_paused = true)]
async fn driver_walks_idle_loaded_running() {
    let mut driver = quiet_driver();
    assert_eq!(driver.state(), DriverState::Idle);

    driver.load_from_str("park").unwrap();
    assert_eq!(driver.state(), DriverState::Loaded);

    driver.execute().await.unwrap();
    assert_eq!(driver.state(), DriverState::Loaded);

    // a failed reload clears the previous plan
    assert!(driver.load_from_str("loopEnd").is_err());
    assert_eq!(driver.state(), DriverState::Idle);
    assert!(matches!(
        driver.execute().await.unwrap_err(),
        ExecError::NoPlan
    ));
}

#[tokio::test(start_paused = true)]
async fn loops_bind_an_index_per_iteration() {
    let renderer = Arc::new(RecordingRenderer::new());
    let mut driver = Driver::new(plate_with(renderer.clone()));

    driver
        .load_from_str(r#"[["let", "r", 40], ["loopStart", 4], ["goto", "i0 * r", "10"], ["loopEnd"]]"#)
        .unwrap();
    driver.execute().await.unwrap();

    let dots = renderer.dots();
    assert_eq!(dots.len(), 4);
    for (i, &(x, y)) in dots.iter().enumerate() {
        assert_eq!(x, i as f64 * 40.0);
        assert_eq!(y, 10.0);
    }
}

#[tokio::test(start_paused = true)]
async fn nested_loops_bind_one_index_per_depth() {
    let renderer = Arc::new(RecordingRenderer::new());
    let mut driver = Driver::new(plate_with(renderer.clone()));

    driver
        .load_from_str(
            "loopStart, 2\nloopStart, 3\ngoto, i0 * 100 + i1 * 10, 20\nloopEnd\nloopEnd",
        )
        .unwrap();
    driver.execute().await.unwrap();

    let xs: Vec<f64> = renderer.dots().iter().map(|&(x, _)| x).collect();
    assert_eq!(xs, vec![0.0, 10.0, 20.0, 100.0, 110.0, 120.0]);
}

#[tokio::test(start_paused = true)]
async fn loop_count_may_reference_outer_bindings() {
    let renderer = Arc::new(RecordingRenderer::new());
    let mut driver = Driver::new(plate_with(renderer.clone()));

    driver
        .load_from_str(r#"[["let", "n", 3], ["loopStart", "n"], ["goto", "i0", "0"], ["loopEnd"]]"#)
        .unwrap();
    driver.execute().await.unwrap();

    assert_eq!(renderer.dots().len(), 3);
}

#[tokio::test(start_paused = true)]
async fn unbound_variable_stops_the_run_and_names_the_argument() {
    let renderer = Arc::new(RecordingRenderer::new());
    let mut driver = Driver::new(plate_with(renderer.clone()));

    driver
        .load_from_str("goto, 10, 0\nline, q, 10\ngoto, 20, 0")
        .unwrap();
    let err = driver.execute().await.unwrap_err();

    match err {
        ExecError::Argument {
            instruction,
            argument,
            ..
        } => {
            assert_eq!(instruction, "line");
            assert_eq!(argument, "x");
        }
        other => panic!("expected an argument error, got {other:?}"),
    }
    // execution stopped before the third instruction
    assert_eq!(renderer.dots().len(), 1);
    assert_eq!(driver.state(), DriverState::Loaded);
}

#[tokio::test(start_paused = true)]
async fn sleep_suspends_for_the_evaluated_duration() {
    let mut driver = quiet_driver();
    driver.load_from_str(r#"[["sleep", "3 * 500"]]"#).unwrap();

    let start = tokio::time::Instant::now();
    driver.execute().await.unwrap();
    assert_eq!(start.elapsed(), Duration::from_millis(1500));
}

#[tokio::test(start_paused = true)]
async fn rotations_dispatch_with_numeric_flags() {
    let mut driver = quiet_driver();
    driver
        .load_from_str(r#"[["rotateArm0", 100, 1], ["rotateArm1", 50, 0], ["rotateBothArms", 10, 1, 20, 0]]"#)
        .unwrap();
    driver.execute().await.unwrap();

    let pose = driver.plate().pose().await;
    // arm0: +100 +10 steps, arm1: -50 -20 steps
    assert!((pose.arm0_deg - 110.0 * (360.0 / 1024.0)).abs() < 1e-9);
    assert!((pose.arm1_deg - (360.0 - 70.0 * (360.0 / 1024.0))).abs() < 1e-9);
}

#[tokio::test(start_paused = true)]
async fn hilbert_instruction_draws_the_whole_curve() {
    let renderer = Arc::new(RecordingRenderer::new());
    let mut driver = Driver::new(plate_with(renderer.clone()));

    driver.load_from_str(r#"[["hilbert", 2]]"#).unwrap();
    driver.execute().await.unwrap();

    // 16 curve waypoints, each traced with at least one settled dot
    assert!(renderer.dots().len() >= 16);
}

#[tokio::test(start_paused = true)]
async fn cancellation_aborts_a_running_plan() {
    let mut driver = quiet_driver();
    driver
        .load_from_str("loopStart, 100000\nrotateArm0, 10\nloopEnd")
        .unwrap();
    let token = driver.plate().cancel_token();

    let handle = tokio::spawn(async move {
        let result = driver.execute().await;
        (driver, result)
    });
    tokio::time::sleep(Duration::from_millis(500)).await;
    token.cancel();

    let (driver, result) = handle.await.unwrap();
    assert!(matches!(
        result,
        Err(ExecError::Motion(MotionError::Cancelled))
    ));
    assert_eq!(driver.state(), DriverState::Loaded);
}
