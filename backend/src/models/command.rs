//! High-level commands issued to the aggressor vehicle.
//!
//! The numeric encoding matches the substrate's discrete meta-action space
//! and must not be reordered.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Discrete command emitted once per control tick
///
/// # Example
/// ```
/// use cut_in_simulator_core_rs::Command;
///
/// assert_eq!(Command::Faster.code(), 3);
/// assert_eq!(Command::from_code(0), Some(Command::LaneLeft));
/// assert_eq!(Command::from_code(9), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Command {
    LaneLeft,
    Idle,
    LaneRight,
    Faster,
    Slower,
}

impl Command {
    /// All commands in encoding order
    pub const ALL: [Command; 5] = [
        Command::LaneLeft,
        Command::Idle,
        Command::LaneRight,
        Command::Faster,
        Command::Slower,
    ];

    /// Integer code understood by the substrate
    pub fn code(self) -> u8 {
        match self {
            Command::LaneLeft => 0,
            Command::Idle => 1,
            Command::LaneRight => 2,
            Command::Faster => 3,
            Command::Slower => 4,
        }
    }

    /// Decode a substrate action code
    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.get(code as usize).copied()
    }

    /// True for the two lateral commands
    pub fn is_lane_change(self) -> bool {
        matches!(self, Command::LaneLeft | Command::LaneRight)
    }

    pub fn name(self) -> &'static str {
        match self {
            Command::LaneLeft => "LANE_LEFT",
            Command::Idle => "IDLE",
            Command::LaneRight => "LANE_RIGHT",
            Command::Faster => "FASTER",
            Command::Slower => "SLOWER",
        }
    }
}

impl Default for Command {
    fn default() -> Self {
        Command::Idle
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_match_action_space() {
        for (i, cmd) in Command::ALL.iter().enumerate() {
            assert_eq!(cmd.code() as usize, i);
            assert_eq!(Command::from_code(i as u8), Some(*cmd));
        }
    }

    #[test]
    fn test_only_lateral_commands_are_lane_changes() {
        assert!(Command::LaneLeft.is_lane_change());
        assert!(Command::LaneRight.is_lane_change());
        assert!(!Command::Idle.is_lane_change());
        assert!(!Command::Faster.is_lane_change());
        assert!(!Command::Slower.is_lane_change());
    }
}
