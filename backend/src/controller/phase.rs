//! Maneuver phases of the cut-in state machine

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stage of the cut-in maneuver
///
/// Phases only ever move forward in declaration order. `Accelerating` may
/// skip straight to `CuttingIn` when the aggressor is already far enough
/// ahead; no other skip exists and no phase is ever re-entered.
///
/// # Example
/// ```
/// use cut_in_simulator_core_rs::controller::Phase;
///
/// assert!(Phase::Accelerating.can_transition_to(Phase::CuttingIn));
/// assert!(!Phase::Overtaking.can_transition_to(Phase::Accelerating));
/// assert!(!Phase::Accelerating.can_transition_to(Phase::Maintaining));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Close the gap at full throttle
    Accelerating,
    /// Hold high speed until far enough ahead of the target
    Overtaking,
    /// Issue the lane change into the target's lane
    CuttingIn,
    /// Hold station just ahead of the target (terminal)
    Maintaining,
}

impl Phase {
    /// Allowed single-step transitions
    pub fn can_transition_to(self, next: Phase) -> bool {
        matches!(
            (self, next),
            (Phase::Accelerating, Phase::Overtaking)
                | (Phase::Accelerating, Phase::CuttingIn)
                | (Phase::Overtaking, Phase::CuttingIn)
                | (Phase::CuttingIn, Phase::Maintaining)
        )
    }

    pub fn is_terminal(self) -> bool {
        self == Phase::Maintaining
    }

    pub fn name(self) -> &'static str {
        match self {
            Phase::Accelerating => "accelerating",
            Phase::Overtaking => "overtaking",
            Phase::CuttingIn => "cutting_in",
            Phase::Maintaining => "maintaining",
        }
    }
}

impl Default for Phase {
    fn default() -> Self {
        Phase::Accelerating
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
