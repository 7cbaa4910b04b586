//! Safety Metric Tests
//!
//! Longitudinal TTC branches and separation, as logged per tick.

use cut_in_simulator_core_rs::metrics::{longitudinal_ttc, separation, SafetySummary, VEHICLE_LENGTH};
use cut_in_simulator_core_rs::VehicleKinematics;

fn vehicle(x: f64, speed: f64, lane: f64) -> VehicleKinematics {
    VehicleKinematics::new(x, lane * 4.0, speed, 0.0, lane)
}

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {}, got {}",
        expected,
        actual
    );
}

#[test]
fn test_same_lane_behind_uses_bumper_gap() {
    // 50 m centre-to-centre, 45 m bumper-to-bumper, closing at 5 m/s
    let bv = vehicle(0.0, 30.0, 1.0);
    let av = vehicle(50.0, 25.0, 1.0);

    assert_close(longitudinal_ttc(&bv, &av), (50.0 - VEHICLE_LENGTH) / 5.0);
}

#[test]
fn test_same_lane_ahead_and_slower() {
    // Aggressor 30 m ahead doing 20 m/s, target closing from behind at 30 m/s
    let bv = vehicle(30.0, 20.0, 1.0);
    let av = vehicle(0.0, 30.0, 1.0);

    assert_close(longitudinal_ttc(&bv, &av), 25.0 / 10.0);
}

#[test]
fn test_ahead_and_faster_never_collides() {
    let bv = vehicle(30.0, 35.0, 1.0);
    let av = vehicle(0.0, 25.0, 1.0);

    assert!(longitudinal_ttc(&bv, &av).is_infinite());
}

#[test]
fn test_behind_and_slower_never_collides() {
    let bv = vehicle(0.0, 20.0, 1.0);
    let av = vehicle(40.0, 25.0, 1.0);

    assert!(longitudinal_ttc(&bv, &av).is_infinite());
}

#[test]
fn test_adjacent_lane_uses_raw_longitudinal_gap() {
    let bv = vehicle(0.0, 30.0, 2.0);
    let av = vehicle(50.0, 25.0, 1.0);

    assert_close(longitudinal_ttc(&bv, &av), 50.0 / 5.0);
}

#[test]
fn test_equal_speeds_are_infinite_in_any_lane() {
    for lane in [0.0, 1.0, 2.0] {
        let bv = vehicle(0.0, 27.0, lane);
        let av = vehicle(15.0, 27.0, 1.0);
        assert_eq!(longitudinal_ttc(&bv, &av), f64::INFINITY);
    }
}

#[test]
fn test_fractional_lane_index_counts_as_other_lane() {
    // Mid lane change: the raw gap is used, not the bumper gap
    let bv = VehicleKinematics::new(0.0, 6.0, 30.0, 0.0, 1.5);
    let av = vehicle(50.0, 25.0, 1.0);

    assert_close(longitudinal_ttc(&bv, &av), 10.0);
}

#[test]
fn test_separation_is_euclidean() {
    let bv = VehicleKinematics::new(0.0, 8.0, 30.0, 0.0, 2.0);
    let av = VehicleKinematics::new(3.0, 4.0, 25.0, 0.0, 1.0);

    assert_close(separation(&bv, &av), 5.0);
    assert_close(separation(&av, &bv), 5.0);
}

#[test]
fn test_summary_over_closing_sequence() {
    let av = vehicle(60.0, 25.0, 1.0);
    let mut summary = SafetySummary::new();

    for (step, x) in [(1, 0.0), (2, 20.0), (3, 40.0)] {
        let bv = vehicle(x, 30.0, 1.0);
        summary.observe(step, longitudinal_ttc(&bv, &av), separation(&bv, &av), false);
    }

    assert_eq!(summary.steps, 3);
    assert_close(summary.min_ttc.unwrap(), 15.0 / 5.0);
    assert_close(summary.min_separation.unwrap(), 20.0);
    assert!(!summary.collided());
}
