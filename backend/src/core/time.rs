//! Episode and step counting for a campaign
//!
//! A campaign is a sequence of episodes; each episode is a sequence of
//! steps capped by a step budget. This module provides deterministic
//! advancement of both counters.

use serde::{Deserialize, Serialize};

/// Tracks the current episode and the step within it
///
/// # Example
/// ```
/// use cut_in_simulator_core_rs::EpisodeClock;
///
/// let mut clock = EpisodeClock::new(400);
/// assert_eq!(clock.start_episode(), 0);
/// assert_eq!(clock.step(), 0);
///
/// clock.advance_step();
/// assert_eq!(clock.step(), 1);
///
/// assert_eq!(clock.start_episode(), 1);
/// assert_eq!(clock.step(), 0);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpisodeClock {
    /// Index of the running episode, if any
    current_episode: Option<usize>,
    /// Index the next started episode receives
    next_episode: usize,
    /// Steps taken in the current episode
    step: usize,
    /// Step budget per episode
    max_steps: usize,
}

impl EpisodeClock {
    /// Create a new clock
    ///
    /// # Arguments
    /// * `max_steps` - Step budget for every episode
    pub fn new(max_steps: usize) -> Self {
        assert!(max_steps > 0, "max_steps must be positive");
        Self {
            current_episode: None,
            next_episode: 0,
            step: 0,
            max_steps,
        }
    }

    /// Begin the next episode and return its index
    pub fn start_episode(&mut self) -> usize {
        let episode = self.next_episode;
        self.current_episode = Some(episode);
        self.next_episode += 1;
        self.step = 0;
        episode
    }

    /// Mark the current episode finished
    pub fn end_episode(&mut self) {
        self.current_episode = None;
    }

    /// Advance one step within the current episode
    pub fn advance_step(&mut self) {
        self.step += 1;
    }

    pub fn current_episode(&self) -> Option<usize> {
        self.current_episode
    }

    /// Number of episodes started so far
    pub fn episodes_started(&self) -> usize {
        self.next_episode
    }

    /// Steps taken in the current episode (1 after the first step)
    pub fn step(&self) -> usize {
        self.step
    }

    /// Check if the step budget is used up
    pub fn is_exhausted(&self) -> bool {
        self.step >= self.max_steps
    }

    pub fn max_steps(&self) -> usize {
        self.max_steps
    }

    /// Continue numbering from `next_episode` (checkpoint restore)
    pub(crate) fn resume_at(&mut self, next_episode: usize) {
        self.current_episode = None;
        self.next_episode = next_episode;
        self.step = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[should_panic(expected = "max_steps must be positive")]
    fn test_zero_max_steps_panics() {
        EpisodeClock::new(0);
    }

    #[test]
    fn test_budget_exhaustion() {
        let mut clock = EpisodeClock::new(3);
        clock.start_episode();
        for _ in 0..2 {
            clock.advance_step();
            assert!(!clock.is_exhausted());
        }
        clock.advance_step();
        assert!(clock.is_exhausted());

        clock.start_episode();
        assert!(!clock.is_exhausted());
    }

    #[test]
    fn test_end_episode_clears_current() {
        let mut clock = EpisodeClock::new(10);
        clock.start_episode();
        clock.end_episode();
        assert_eq!(clock.current_episode(), None);
        assert_eq!(clock.episodes_started(), 1);
    }
}
