//! Tests for EpisodeClock

use cut_in_simulator_core_rs::EpisodeClock;

#[test]
fn test_clock_new() {
    let clock = EpisodeClock::new(400);
    assert_eq!(clock.current_episode(), None);
    assert_eq!(clock.episodes_started(), 0);
    assert_eq!(clock.step(), 0);
    assert_eq!(clock.max_steps(), 400);
}

#[test]
fn test_advance_step() {
    let mut clock = EpisodeClock::new(400);
    clock.start_episode();

    clock.advance_step();
    assert_eq!(clock.step(), 1);

    clock.advance_step();
    assert_eq!(clock.step(), 2);
}

#[test]
fn test_step_budget_boundary() {
    let mut clock = EpisodeClock::new(3);
    clock.start_episode();

    clock.advance_step();
    clock.advance_step();
    assert!(!clock.is_exhausted());

    clock.advance_step();
    assert!(clock.is_exhausted());
}

#[test]
fn test_episodes_number_consecutively() {
    let mut clock = EpisodeClock::new(10);

    for expected in 0..5 {
        assert_eq!(clock.start_episode(), expected);
        assert_eq!(clock.current_episode(), Some(expected));
        clock.advance_step();
        clock.end_episode();
        assert_eq!(clock.current_episode(), None);
    }
    assert_eq!(clock.episodes_started(), 5);
}

#[test]
fn test_new_episode_resets_step() {
    let mut clock = EpisodeClock::new(10);
    clock.start_episode();
    for _ in 0..7 {
        clock.advance_step();
    }

    clock.start_episode();
    assert_eq!(clock.step(), 0);
    assert!(!clock.is_exhausted());
}
