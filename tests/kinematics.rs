//! End-to-end kinematics: positioning accuracy, synchronization, parking,
//! and the recovered-with-warning conditions.

use std::sync::Arc;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use sandrig::config::MotionTuning;
use sandrig::hardware::{Axis, NullRenderer, RecordingRenderer, SimulatedActuator};
use sandrig::motion::{DEGREES_PER_STEP, MotionError, SandPlate};

const RADIUS: f64 = 400.0;

fn test_plate() -> SandPlate {
    let tuning = MotionTuning::default();
    SandPlate::new(
        RADIUS,
        Arc::new(SimulatedActuator::new(tuning.ms_per_step)),
        Arc::new(NullRenderer),
        tuning,
    )
}

fn recording_plate(renderer: Arc<RecordingRenderer>) -> SandPlate {
    let tuning = MotionTuning::default();
    SandPlate::new(
        RADIUS,
        Arc::new(SimulatedActuator::new(tuning.ms_per_step)),
        renderer,
        tuning,
    )
}

#[tokio::test(start_paused = true)]
async fn goto_lands_within_quantization_error() {
    let plate = test_plate();
    let mut rng = StdRng::seed_from_u64(7);

    for _ in 0..25 {
        let angle = rng.random_range(0.0..std::f64::consts::TAU);
        let r = rng.random_range(0.0..RADIUS);
        let (x, y) = (r * angle.cos(), r * angle.sin());

        plate.goto_pos(x, y).await.unwrap();

        let (px, py) = plate.position().await;
        let error = ((px - x).powi(2) + (py - y).powi(2)).sqrt();
        assert!(
            error <= 2.0,
            "target ({x:.1}, {y:.1}) landed {error:.3} away"
        );
    }
}

#[tokio::test(start_paused = true)]
async fn goto_center_only_folds_arm1() {
    let plate = test_plate();
    plate
        .rotate_axis(Axis::Arm0, 100, true, Duration::ZERO)
        .await
        .unwrap();

    plate.goto_pos(0.0, 0.0).await.unwrap();

    let pose = plate.pose().await;
    // arm0 untouched, arm1 folded opposite
    assert_eq!(pose.arm0_deg, 100.0 * DEGREES_PER_STEP);
    assert!((pose.arm1_deg - 180.0).abs() < DEGREES_PER_STEP);
    let (x, y) = plate.position().await;
    assert!((x * x + y * y).sqrt() < 2.0);
}

#[tokio::test(start_paused = true)]
async fn out_of_range_target_clamps_to_the_boundary_ray() {
    let plate = test_plate();
    plate.goto_pos(0.0, 0.0).await.unwrap();

    plate.goto_pos(600.0, 0.0).await.unwrap();

    let (x, y) = plate.position().await;
    let r = (x * x + y * y).sqrt();
    assert!(r <= RADIUS + 1e-6, "ball left the plate: {r}");
    assert!((r - RADIUS).abs() <= 2.0, "expected the rim, got {r}");
    assert!(x > 0.0 && y.abs() <= 2.0, "expected the +x ray, got ({x}, {y})");
}

#[tokio::test(start_paused = true)]
async fn angle_accumulators_normalize_into_one_revolution() {
    let plate = test_plate();

    // five full revolutions plus a bit: the accumulator keeps winding,
    // the normalized accessor reduces it
    plate
        .rotate_axis(Axis::Arm0, 1024 * 5 + 100, true, Duration::ZERO)
        .await
        .unwrap();
    let pose = plate.pose().await;
    assert!((pose.arm0_deg - 100.0 * DEGREES_PER_STEP).abs() < 1e-9);

    plate
        .rotate_axis(Axis::Arm1, 200, false, Duration::ZERO)
        .await
        .unwrap();
    let pose = plate.pose().await;
    assert!(pose.arm1_deg >= 0.0 && pose.arm1_deg < 360.0);
    assert!((pose.arm1_deg - (360.0 - 200.0 * DEGREES_PER_STEP)).abs() < 1e-9);
}

#[tokio::test(start_paused = true)]
async fn both_axes_complete_together() {
    let plate = test_plate();

    let start = tokio::time::Instant::now();
    plate.rotate_both(100, true, 10, false).await.unwrap();

    // 100 steps at 3 ms/step dominate; the 10-step axis is padded with
    // the 270 ms difference, so the joint move takes exactly the longer
    // duration and neither axis finishes early.
    assert_eq!(start.elapsed(), Duration::from_millis(300));
}

#[tokio::test(start_paused = true)]
async fn chunked_rotation_reaches_the_exact_angle() {
    let renderer = Arc::new(RecordingRenderer::new());
    let plate = recording_plate(renderer.clone());

    plate
        .rotate_axis(Axis::Arm0, 17, true, Duration::ZERO)
        .await
        .unwrap();

    // chunks of at most 5 steps: 5 + 5 + 5 + 2
    let steps = renderer.steps();
    assert_eq!(steps.len(), 4);
    let pose = plate.pose().await;
    assert!((pose.arm0_deg - 17.0 * DEGREES_PER_STEP).abs() < 1e-9);
}

#[tokio::test(start_paused = true)]
async fn negative_step_count_is_clamped_to_zero() {
    let plate = test_plate();
    plate
        .rotate_axis(Axis::Arm0, -5, true, Duration::ZERO)
        .await
        .unwrap();
    let pose = plate.pose().await;
    assert_eq!(pose.arm0_deg, 0.0);
}

#[tokio::test(start_paused = true)]
async fn park_is_idempotent() {
    let plate = test_plate();
    plate
        .rotate_axis(Axis::Arm0, 700, true, Duration::ZERO)
        .await
        .unwrap();
    plate
        .rotate_axis(Axis::Arm1, 123, false, Duration::ZERO)
        .await
        .unwrap();

    plate.park().await.unwrap();
    let first = plate.pose().await;
    assert!(first.arm0_deg < DEGREES_PER_STEP || first.arm0_deg > 360.0 - DEGREES_PER_STEP);
    assert!((first.arm1_deg - 180.0).abs() <= DEGREES_PER_STEP);

    plate.park().await.unwrap();
    let second = plate.pose().await;
    assert_eq!(first.arm0_deg, second.arm0_deg);
    assert_eq!(first.arm1_deg, second.arm1_deg);
}

#[tokio::test(start_paused = true)]
async fn infeasible_arc_degrades_to_the_same_motion_as_a_line() {
    let arc_renderer = Arc::new(RecordingRenderer::new());
    let arc_plate = recording_plate(arc_renderer.clone());
    // chord of 200 can never lie on a circle of radius 10
    arc_plate.arc_to(200.0, 0.0, 10.0, true, true).await.unwrap();

    let line_renderer = Arc::new(RecordingRenderer::new());
    let line_plate = recording_plate(line_renderer.clone());
    line_plate.line_to(200.0, 0.0).await.unwrap();

    assert_eq!(arc_renderer.dots(), line_renderer.dots());
}

#[tokio::test(start_paused = true)]
async fn minor_arc_stays_on_its_circle() {
    // quarter arc from (100, 0) to (0, 100) with radius 100: the center
    // lands at the origin, so every intermediate dot keeps r near 100
    let renderer = Arc::new(RecordingRenderer::new());
    let plate = recording_plate(renderer.clone());
    plate.goto_pos(100.0, 0.0).await.unwrap();
    let before = renderer.dots().len();

    plate.arc_to(0.0, 100.0, 100.0, true, true).await.unwrap();

    let dots = renderer.dots();
    assert!(dots.len() > before + 10, "arc should subdivide");
    for &(x, y) in &dots[before..] {
        let r = (x * x + y * y).sqrt();
        assert!(
            (r - 100.0).abs() < 5.0,
            "arc point ({x:.1}, {y:.1}) strayed off the circle: r = {r:.2}"
        );
    }

    let (x, y) = plate.position().await;
    assert!((x.powi(2) + (y - 100.0).powi(2)).sqrt() <= 2.0);
}

#[tokio::test(start_paused = true)]
async fn line_reaches_the_exact_requested_target() {
    let renderer = Arc::new(RecordingRenderer::new());
    let plate = recording_plate(renderer.clone());

    plate.line_to(123.4, -56.7).await.unwrap();

    let dots = renderer.dots();
    assert_eq!(*dots.last().unwrap(), (123.4, -56.7));
    let (x, y) = plate.position().await;
    assert!(((x - 123.4).powi(2) + (y + 56.7).powi(2)).sqrt() <= 2.0);
}

#[tokio::test(start_paused = true)]
async fn cancellation_interrupts_motion() {
    let plate = test_plate();
    let token = plate.cancel_token();
    token.cancel();

    let err = plate
        .rotate_axis(Axis::Arm0, 100, true, Duration::ZERO)
        .await
        .unwrap_err();
    assert!(matches!(err, MotionError::Cancelled));

    let err = plate.goto_pos(10.0, 10.0).await.unwrap_err();
    assert!(matches!(err, MotionError::Cancelled));
}

#[tokio::test(start_paused = true)]
async fn turtle_forward_moves_along_the_heading() {
    let plate = test_plate();
    plate.goto_pos(0.0, 0.0).await.unwrap();

    plate.forward(150.0, Some(90.0)).await.unwrap();

    let (x, y) = plate.position().await;
    assert!(((x - 0.0).powi(2) + (y - 150.0).powi(2)).sqrt() <= 2.0);
    assert_eq!(plate.heading_deg().await, 90.0);
}

#[tokio::test(start_paused = true)]
async fn turtle_arc_turns_the_heading_by_the_sweep() {
    let plate = test_plate();
    plate.goto_pos(0.0, 0.0).await.unwrap();
    plate.forward(100.0, Some(0.0)).await.unwrap();

    plate.turtle_arc(80.0, 90.0, true, None).await.unwrap();

    // turtle_arc flips handedness internally, so a "right-handed" 90°
    // arc turns the heading left
    assert_eq!(plate.heading_deg().await, 90.0);
    let (x, y) = plate.position().await;
    assert!(
        (x * x + y * y).sqrt() <= RADIUS,
        "turtle arc left the plate: ({x:.1}, {y:.1})"
    );
}

#[tokio::test(start_paused = true)]
async fn rosette_closes_back_on_its_start() {
    let plate = test_plate();
    plate.rosette(0).await.unwrap();

    // three 120° lobes of equal radius return to the entry point
    let (x, y) = plate.position().await;
    let start_x = RADIUS * (151.0 / 400.0);
    let drift = ((x - start_x).powi(2) + y.powi(2)).sqrt();
    assert!(drift <= 10.0, "rosette drifted {drift:.2} from its start");
}
