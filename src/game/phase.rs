//! Match phases and their physics constants

use serde::{Deserialize, Serialize};

/// A named ruleset the match cycles through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Regular football
    Soccer,
    /// Heavier, flatter ball
    American,
    /// Floaty and bouncy
    Basket,
}

/// Fixed cyclic order of phases. Index 0 is the phase every match starts in.
pub const PHASE_ORDER: [Phase; 3] = [Phase::Soccer, Phase::American, Phase::Basket];

impl Default for Phase {
    fn default() -> Self {
        PHASE_ORDER[0]
    }
}

impl Phase {
    /// Phase at a position in the cycle, wrapping around
    pub fn at(index: usize) -> Self {
        PHASE_ORDER[index % PHASE_ORDER.len()]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Soccer => "soccer",
            Phase::American => "american",
            Phase::Basket => "basket",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Physics constants per phase, in pixels and ticks
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhaseParams {
    /// Downward acceleration added to vertical velocity each tick
    pub gravity: f32,
    /// Vertical velocity set on jump (negative is up)
    pub jump_force: f32,
    /// Fraction of vertical speed the ball keeps on a floor/ceiling bounce
    pub bounciness: f32,
    /// Horizontal speed given by a jump
    pub move_speed: f32,
    /// Horizontal velocity a player keeps each tick
    pub player_damping: f32,
    /// Horizontal velocity the ball keeps each tick
    pub ball_damping: f32,
}

impl PhaseParams {
    pub fn for_phase(phase: Phase) -> Self {
        match phase {
            Phase::Soccer => Self {
                gravity: 0.6,
                jump_force: -13.0,
                bounciness: 0.7,
                move_speed: 5.0,
                player_damping: 0.95,
                ball_damping: 0.99,
            },
            Phase::American => Self {
                gravity: 0.7,
                jump_force: -14.0,
                bounciness: 0.45,
                move_speed: 6.0,
                player_damping: 0.95,
                ball_damping: 0.99,
            },
            Phase::Basket => Self {
                gravity: 0.5,
                jump_force: -15.0,
                bounciness: 0.85,
                move_speed: 4.0,
                player_damping: 0.95,
                ball_damping: 0.99,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_wraps() {
        assert_eq!(Phase::at(0), Phase::Soccer);
        assert_eq!(Phase::at(1), Phase::American);
        assert_eq!(Phase::at(2), Phase::Basket);
        assert_eq!(Phase::at(3), Phase::Soccer);
    }

    #[test]
    fn test_phase_serializes_as_name() {
        assert_eq!(serde_json::to_string(&Phase::Basket).unwrap(), "\"basket\"");
        assert_eq!(Phase::American.to_string(), "american");
    }

    #[test]
    fn test_params_are_sane() {
        for phase in PHASE_ORDER {
            let params = PhaseParams::for_phase(phase);
            assert!(params.gravity > 0.0);
            assert!(params.jump_force < 0.0);
            assert!(params.bounciness > 0.0 && params.bounciness < 1.0);
            assert!(params.player_damping > 0.0 && params.player_damping < 1.0);
            assert!(params.ball_damping > 0.0 && params.ball_damping < 1.0);
        }
    }
}
