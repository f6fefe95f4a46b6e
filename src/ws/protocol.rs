//! WebSocket protocol message definitions
//! These are the wire types for client-server communication

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::game::phase::Phase;
use crate::game::state::{MatchStatus, Role, Seat};

/// Messages sent from client to server
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMsg {
    /// Jump/kick press for a seat
    PlayerInput {
        /// "p1" or "p2"; anything else is ignored
        role: String,
    },

    /// Start over from 0-0
    RestartGame,
}

/// Messages sent from server to client
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMsg {
    /// Sent once, to the connecting session only
    AssignRole { role: Role },

    /// Full match state, broadcast every tick
    StateUpdate(MatchSnapshot),

    /// A goal was scored
    GoalEvent {
        scorer: Seat,
        /// Phase the match continues in
        phase: Phase,
    },

    /// Win score reached
    GameOver { winner: Seat },

    /// A seated player disconnected
    PlayerLeft { role: Seat },
}

/// Discrete events produced by a simulation step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    Goal { scorer: Seat, phase: Phase },
    GameOver { winner: Seat },
}

impl From<GameEvent> for ServerMsg {
    fn from(event: GameEvent) -> Self {
        match event {
            GameEvent::Goal { scorer, phase } => ServerMsg::GoalEvent { scorer, phase },
            GameEvent::GameOver { winner } => ServerMsg::GameOver { winner },
        }
    }
}

/// Player body in a snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    /// Body lean in degrees
    pub angle: f32,
    /// Leg swing in degrees
    pub leg_angle: f32,
    pub on_ground: bool,
    pub score: u32,
    /// Connection holding the seat
    pub id: Option<Uuid>,
}

/// Both seats, keyed the way clients look them up
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeatsSnapshot {
    pub p1: PlayerSnapshot,
    pub p2: PlayerSnapshot,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BallSnapshot {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
}

/// Full serialized match state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchSnapshot {
    /// Server tick number
    pub tick: u64,
    pub players: SeatsSnapshot,
    pub ball: BallSnapshot,
    pub status: MatchStatus,
    pub winner: Option<Seat>,
    pub phase: Phase,
    pub phase_index: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_player_input() {
        let msg: ClientMsg =
            serde_json::from_str(r#"{"type":"player_input","role":"p2"}"#).unwrap();
        match msg {
            ClientMsg::PlayerInput { role } => assert_eq!(role, "p2"),
            other => panic!("unexpected message: {:?}", other),
        }
    }

    #[test]
    fn test_parse_restart() {
        let msg: ClientMsg = serde_json::from_str(r#"{"type":"restart_game"}"#).unwrap();
        assert!(matches!(msg, ClientMsg::RestartGame));
    }

    #[test]
    fn test_unknown_role_still_parses() {
        let msg: ClientMsg =
            serde_json::from_str(r#"{"type":"player_input","role":"spectator"}"#).unwrap();
        assert!(matches!(msg, ClientMsg::PlayerInput { .. }));
    }

    #[test]
    fn test_server_msg_shapes() {
        let json = serde_json::to_value(ServerMsg::AssignRole {
            role: Role::Spectator,
        })
        .unwrap();
        assert_eq!(json["type"], "assign_role");
        assert_eq!(json["role"], "spectator");

        let json = serde_json::to_value(ServerMsg::from(GameEvent::Goal {
            scorer: Seat::P1,
            phase: Phase::American,
        }))
        .unwrap();
        assert_eq!(json["type"], "goal_event");
        assert_eq!(json["scorer"], "p1");
        assert_eq!(json["phase"], "american");

        let json = serde_json::to_value(ServerMsg::GameOver { winner: Seat::P2 }).unwrap();
        assert_eq!(json["type"], "game_over");
        assert_eq!(json["winner"], "p2");
    }
}
