//! Cut-in Controller Scenario Tests
//!
//! Hand-built tick traces through the four-phase state machine.

use cut_in_simulator_core_rs::controller::{AggressorController, CutInConfig, CutInController, Phase};
use cut_in_simulator_core_rs::{Command, VehicleKinematics};

fn bv(x: f64, speed: f64, lane: f64) -> VehicleKinematics {
    VehicleKinematics::new(x, lane * 4.0, speed, 0.0, lane)
}

fn av(x: f64, lane: f64) -> VehicleKinematics {
    VehicleKinematics::new(x, lane * 4.0, 25.0, 0.0, lane)
}

#[test]
fn test_accelerates_then_overtakes_from_thirty() {
    // 30 m/s aggressor, 25 m/s target 50 m ahead in the next lane
    let mut controller = CutInController::default();
    let mut x = 0.0;
    let mut target_x = 50.0;
    let mut speed = 30.0;

    let mut commands = Vec::new();
    while controller.phase() == Phase::Accelerating {
        let command = controller.get_action(&bv(x, speed, 2.0), &av(target_x, 1.0));
        commands.push((speed, command, controller.phase()));
        if command == Command::Faster {
            speed += 1.0;
        }
        x += speed * 0.1;
        target_x += 2.5;
    }

    // Faster on every tick; the speed guard fires once 35 m/s is reached
    let (last_speed, last_command, last_phase) = *commands.last().unwrap();
    assert_eq!(last_speed, 35.0);
    assert_eq!(last_phase, Phase::Overtaking);
    // Overtaking still tops up towards max_speed - 0.5
    assert_eq!(last_command, Command::Faster);
    for (speed, command, phase) in &commands[..commands.len() - 1] {
        assert!(*speed < 35.0);
        assert_eq!(*command, Command::Faster);
        assert_eq!(*phase, Phase::Accelerating);
    }
    assert_eq!(commands.len(), 6);
    assert!(controller.acceleration_complete());
}

#[test]
fn test_aggressor_already_ahead_skips_overtaking() {
    // Same lane so the fresh CuttingIn phase has nothing to change
    let mut controller = CutInController::default();

    let command = controller.get_action(&bv(10.0, 30.0, 1.0), &av(0.0, 1.0));

    assert_eq!(controller.phase(), Phase::CuttingIn);
    assert_eq!(command, Command::Idle);
    assert!(controller.acceleration_complete());
    assert!(!controller.lane_change_pending());
}

#[test]
fn test_ahead_in_adjacent_lane_issues_lane_change_immediately() {
    let mut controller = CutInController::default();

    let command = controller.get_action(&bv(10.0, 30.0, 2.0), &av(0.0, 1.0));

    assert_eq!(controller.phase(), Phase::CuttingIn);
    assert_eq!(command, Command::LaneLeft);
    assert!(controller.lane_change_pending());
}

#[test]
fn test_speed_guard_wins_over_distance_guard() {
    let mut controller = CutInController::default();

    // Both guards true on the same tick: first match wins
    controller.get_action(&bv(10.0, 35.5, 2.0), &av(0.0, 1.0));
    assert_eq!(controller.phase(), Phase::Overtaking);

    // Next tick the distance guard moves it on
    controller.get_action(&bv(13.0, 35.5, 2.0), &av(2.5, 1.0));
    assert_eq!(controller.phase(), Phase::CuttingIn);
}

#[test]
fn test_aligned_lanes_enter_maintaining_and_hold_station() {
    let mut controller = CutInController::default();
    controller.get_action(&bv(10.0, 30.0, 2.0), &av(0.0, 1.0));
    assert_eq!(controller.phase(), Phase::CuttingIn);

    let command = controller.get_action(&bv(15.0, 30.0, 1.0), &av(0.0, 1.0));

    assert_eq!(controller.phase(), Phase::Maintaining);
    assert_eq!(command, Command::Idle);
}

#[test]
fn test_maintaining_band() {
    let mut controller = CutInController::default();
    controller.get_action(&bv(10.0, 30.0, 1.0), &av(0.0, 1.0));
    controller.get_action(&bv(10.0, 30.0, 1.0), &av(0.0, 1.0));
    assert_eq!(controller.phase(), Phase::Maintaining);

    let cases = [
        (25.0, Command::Slower),
        (20.0, Command::Idle),
        (15.0, Command::Idle),
        (10.0, Command::Idle),
        (8.0, Command::Faster),
        (-3.0, Command::Faster),
    ];
    for (lead, expected) in cases {
        let command = controller.get_action(&bv(lead, 30.0, 1.0), &av(0.0, 1.0));
        assert_eq!(command, expected, "lead {}", lead);
        assert_eq!(controller.phase(), Phase::Maintaining);
    }
}

#[test]
fn test_lane_change_issued_once_while_waiting_for_alignment() {
    let mut controller = CutInController::default();
    let target = av(0.0, 1.0);

    let mut commands = vec![controller.get_action(&bv(10.0, 30.0, 2.0), &target)];
    for lane in [2.0, 1.9, 1.6, 1.3, 1.05] {
        commands.push(controller.get_action(&bv(12.0, 30.0, lane), &target));
    }

    assert_eq!(commands[0], Command::LaneLeft);
    assert!(commands[1..].iter().all(|c| *c == Command::Idle));
    assert_eq!(controller.phase(), Phase::CuttingIn);

    controller.get_action(&bv(12.0, 30.0, 1.005), &target);
    assert_eq!(controller.phase(), Phase::Maintaining);
}

#[test]
fn test_cleared_pending_flag_allows_reissue() {
    let mut controller = CutInController::default();
    let target = av(0.0, 1.0);

    assert_eq!(controller.get_action(&bv(10.0, 30.0, 0.0), &target), Command::LaneRight);
    assert_eq!(controller.get_action(&bv(11.0, 30.0, 0.0), &target), Command::Idle);

    controller.clear_lane_change_pending();
    assert_eq!(controller.get_action(&bv(12.0, 30.0, 0.0), &target), Command::LaneRight);
}

#[test]
fn test_reset_from_any_phase() {
    let mut controller = CutInController::default();
    controller.get_action(&bv(10.0, 30.0, 2.0), &av(0.0, 1.0));
    assert!(controller.lane_change_pending());

    controller.reset();

    assert_eq!(controller.phase(), Phase::Accelerating);
    assert!(!controller.acceleration_complete());
    assert!(!controller.lane_change_pending());
}

#[test]
fn test_custom_tuning() {
    let mut controller = CutInController::new(CutInConfig {
        max_speed: 30.0,
        overtake_distance: 12.0,
    });

    // 29 >= 30 - 1 fires the speed guard
    controller.get_action(&bv(0.0, 29.0, 2.0), &av(40.0, 1.0));
    assert_eq!(controller.phase(), Phase::Overtaking);

    // 10 m ahead is not enough with a 12 m overtake distance
    assert_eq!(controller.get_action(&bv(50.0, 29.0, 2.0), &av(40.0, 1.0)), Command::Faster);
    assert_eq!(controller.phase(), Phase::Overtaking);
}

#[test]
fn test_trait_object_reports_phase() {
    let mut controller: Box<dyn AggressorController> = Box::new(CutInController::default());

    controller.get_action(&bv(0.0, 36.0, 2.0), &av(40.0, 1.0));

    assert_eq!(controller.phase(), Some(Phase::Overtaking));
}
