//! Snapshot building for network transmission

use crate::ws::protocol::{BallSnapshot, MatchSnapshot, PlayerSnapshot, SeatsSnapshot, ServerMsg};

use super::state::{MatchState, PlayerBody, Seat};

fn player_snapshot(p: &PlayerBody) -> PlayerSnapshot {
    PlayerSnapshot {
        x: p.x,
        y: p.y,
        vx: p.vx,
        vy: p.vy,
        angle: p.angle,
        leg_angle: p.leg_angle,
        on_ground: p.on_ground,
        score: p.score,
        id: p.conn_id,
    }
}

/// Build a read-only copy of the match state
pub fn build(state: &MatchState) -> MatchSnapshot {
    MatchSnapshot {
        tick: state.tick,
        players: SeatsSnapshot {
            p1: player_snapshot(state.player(Seat::P1)),
            p2: player_snapshot(state.player(Seat::P2)),
        },
        ball: BallSnapshot {
            x: state.ball.x,
            y: state.ball.y,
            vx: state.ball.vx,
            vy: state.ball.vy,
        },
        status: state.status,
        winner: state.winner,
        phase: state.phase(),
        phase_index: state.phase_index,
    }
}

/// Build the `state_update` message
pub fn state_update(state: &MatchState) -> ServerMsg {
    ServerMsg::StateUpdate(build(state))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::state::MatchStatus;
    use uuid::Uuid;

    #[test]
    fn test_snapshot_json_layout() {
        let mut state = MatchState::new();
        let conn = Uuid::new_v4();
        state.player_mut(Seat::P1).conn_id = Some(conn);
        state.player_mut(Seat::P2).score = 4;
        state.status = MatchStatus::Playing;

        let json = serde_json::to_value(state_update(&state)).unwrap();
        assert_eq!(json["type"], "state_update");
        assert_eq!(json["status"], "playing");
        assert_eq!(json["phase"], "soccer");
        assert_eq!(json["winner"], serde_json::Value::Null);
        assert_eq!(json["players"]["p1"]["id"], conn.to_string());
        assert_eq!(json["players"]["p2"]["id"], serde_json::Value::Null);
        assert_eq!(json["players"]["p2"]["score"], 4);
        assert_eq!(json["players"]["p1"]["x"], 150.0);
        assert_eq!(json["ball"]["y"], 200.0);
    }
}
