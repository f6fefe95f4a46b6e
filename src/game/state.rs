//! Authoritative match data model

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::phase::{Phase, PhaseParams};

/// Field width in pixels
pub const WIDTH: f32 = 800.0;
/// Field height in pixels
pub const HEIGHT: f32 = 450.0;
pub const PLAYER_RADIUS: f32 = 30.0;
pub const BALL_RADIUS: f32 = 18.0;

pub const P1_SPAWN: (f32, f32) = (150.0, 350.0);
pub const P2_SPAWN: (f32, f32) = (650.0, 350.0);
/// Ball position when the process starts
pub const BALL_INITIAL: (f32, f32) = (400.0, 200.0);
/// Ball drop point after a goal or restart
pub const BALL_KICKOFF: (f32, f32) = (400.0, 150.0);

/// One of the two player slots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Seat {
    P1,
    P2,
}

impl Seat {
    /// Fixed priority and processing order
    pub const ALL: [Seat; 2] = [Seat::P1, Seat::P2];

    /// Parse a wire role. Anything other than "p1"/"p2" is not a seat.
    pub fn from_role(role: &str) -> Option<Self> {
        match role {
            "p1" => Some(Seat::P1),
            "p2" => Some(Seat::P2),
            _ => None,
        }
    }

    /// Facing direction: p1 attacks rightwards, p2 leftwards
    pub fn direction(self) -> f32 {
        match self {
            Seat::P1 => 1.0,
            Seat::P2 => -1.0,
        }
    }

    pub fn spawn(self) -> (f32, f32) {
        match self {
            Seat::P1 => P1_SPAWN,
            Seat::P2 => P2_SPAWN,
        }
    }

    pub fn index(self) -> usize {
        match self {
            Seat::P1 => 0,
            Seat::P2 => 1,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Seat::P1 => "p1",
            Seat::P2 => "p2",
        }
    }
}

impl std::fmt::Display for Seat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Role handed to a connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    P1,
    P2,
    /// Watches only, never mutates the match
    Spectator,
}

impl From<Seat> for Role {
    fn from(seat: Seat) -> Self {
        match seat {
            Seat::P1 => Role::P1,
            Seat::P2 => Role::P2,
        }
    }
}

impl Role {
    pub fn seat(self) -> Option<Seat> {
        match self {
            Role::P1 => Some(Seat::P1),
            Role::P2 => Some(Seat::P2),
            Role::Spectator => None,
        }
    }
}

/// Match status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    /// Fewer than two seats occupied
    Waiting,
    /// Physics running
    Playing,
    /// Post-goal pause
    Goal,
    /// Someone reached the win score (terminal until restart)
    GameOver,
}

/// A player body
#[derive(Debug, Clone)]
pub struct PlayerBody {
    pub seat: Seat,
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    /// Body lean in degrees
    pub angle: f32,
    /// Kick swing of the leg in degrees, relative to the body
    pub leg_angle: f32,
    pub on_ground: bool,
    pub score: u32,
    /// Connection currently holding the seat. Lookup only.
    pub conn_id: Option<Uuid>,
}

impl PlayerBody {
    pub fn new(seat: Seat) -> Self {
        let (x, y) = seat.spawn();
        Self {
            seat,
            x,
            y,
            vx: 0.0,
            vy: 0.0,
            angle: 0.0,
            leg_angle: 0.0,
            on_ground: false,
            score: 0,
            conn_id: None,
        }
    }

    /// Move back to the spawn point and drop all motion. Score and seat stay.
    pub fn respawn(&mut self) {
        let (x, y) = self.seat.spawn();
        self.x = x;
        self.y = y;
        self.vx = 0.0;
        self.vy = 0.0;
        self.angle = 0.0;
        self.leg_angle = 0.0;
        self.on_ground = false;
    }

    pub fn is_occupied(&self) -> bool {
        self.conn_id.is_some()
    }

    /// Keep the body inside the field and above the floor
    pub fn clamp_to_field(&mut self) {
        self.x = self.x.clamp(PLAYER_RADIUS, WIDTH - PLAYER_RADIUS);
        if self.y > HEIGHT - PLAYER_RADIUS {
            self.y = HEIGHT - PLAYER_RADIUS;
            if self.vy > 0.0 {
                self.vy = 0.0;
            }
        }
    }

    fn is_finite(&self) -> bool {
        [self.x, self.y, self.vx, self.vy, self.angle, self.leg_angle]
            .iter()
            .all(|v| v.is_finite())
    }
}

/// The ball
#[derive(Debug, Clone, PartialEq)]
pub struct Ball {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
}

impl Ball {
    pub fn at(x: f32, y: f32) -> Self {
        Self {
            x,
            y,
            vx: 0.0,
            vy: 0.0,
        }
    }

    fn is_finite(&self) -> bool {
        [self.x, self.y, self.vx, self.vy].iter().all(|v| v.is_finite())
    }
}

/// Authoritative match state (owned by the engine)
#[derive(Debug, Clone)]
pub struct MatchState {
    pub players: [PlayerBody; 2],
    pub ball: Ball,
    pub status: MatchStatus,
    /// Set only while `status` is `GameOver`
    pub winner: Option<Seat>,
    pub phase_index: usize,
    pub tick: u64,
}

impl MatchState {
    pub fn new() -> Self {
        Self {
            players: [PlayerBody::new(Seat::P1), PlayerBody::new(Seat::P2)],
            ball: Ball::at(BALL_INITIAL.0, BALL_INITIAL.1),
            status: MatchStatus::Waiting,
            winner: None,
            phase_index: 0,
            tick: 0,
        }
    }

    pub fn player(&self, seat: Seat) -> &PlayerBody {
        &self.players[seat.index()]
    }

    pub fn player_mut(&mut self, seat: Seat) -> &mut PlayerBody {
        &mut self.players[seat.index()]
    }

    /// Current phase
    pub fn phase(&self) -> Phase {
        Phase::at(self.phase_index)
    }

    /// Physics constants of the current phase, looked up fresh on every call
    pub fn params(&self) -> PhaseParams {
        PhaseParams::for_phase(self.phase())
    }

    /// Goals scored by both seats combined
    pub fn total_goals(&self) -> u32 {
        self.players.iter().map(|p| p.score).sum()
    }

    /// Put bodies and ball back at kickoff. Score and phase are kept.
    pub fn reset_positions(&mut self) {
        self.ball = Ball::at(BALL_KICKOFF.0, BALL_KICKOFF.1);
        for player in self.players.iter_mut() {
            player.respawn();
        }
    }

    /// Zero scores, clear the winner and go back to the first phase
    pub fn reset_scores(&mut self) {
        for player in self.players.iter_mut() {
            player.score = 0;
        }
        self.winner = None;
        self.phase_index = 0;
    }

    /// First free seat in priority order
    pub fn first_free_seat(&self) -> Option<Seat> {
        Seat::ALL
            .into_iter()
            .find(|seat| !self.player(*seat).is_occupied())
    }

    /// Seat held by a connection, if any
    pub fn seat_of(&self, conn_id: Uuid) -> Option<Seat> {
        Seat::ALL
            .into_iter()
            .find(|seat| self.player(*seat).conn_id == Some(conn_id))
    }

    pub fn occupied_seats(&self) -> usize {
        self.players.iter().filter(|p| p.is_occupied()).count()
    }

    pub fn is_finite(&self) -> bool {
        self.ball.is_finite() && self.players.iter().all(PlayerBody::is_finite)
    }
}

impl Default for MatchState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_match_is_waiting() {
        let state = MatchState::new();
        assert_eq!(state.status, MatchStatus::Waiting);
        assert_eq!(state.winner, None);
        assert_eq!(state.phase(), Phase::Soccer);
        assert_eq!(state.occupied_seats(), 0);
        assert_eq!(state.ball, Ball::at(400.0, 200.0));
    }

    #[test]
    fn test_seat_priority() {
        let mut state = MatchState::new();
        assert_eq!(state.first_free_seat(), Some(Seat::P1));

        let a = Uuid::new_v4();
        state.player_mut(Seat::P1).conn_id = Some(a);
        assert_eq!(state.first_free_seat(), Some(Seat::P2));
        assert_eq!(state.seat_of(a), Some(Seat::P1));

        state.player_mut(Seat::P2).conn_id = Some(Uuid::new_v4());
        assert_eq!(state.first_free_seat(), None);
        assert_eq!(state.occupied_seats(), 2);

        // p1 frees up again and is preferred over nothing
        state.player_mut(Seat::P1).conn_id = None;
        assert_eq!(state.first_free_seat(), Some(Seat::P1));
    }

    #[test]
    fn test_reset_positions_keeps_score_and_phase() {
        let mut state = MatchState::new();
        state.player_mut(Seat::P2).score = 3;
        state.phase_index = 1;
        state.player_mut(Seat::P1).x = 500.0;
        state.player_mut(Seat::P1).vx = 4.0;
        state.ball.vx = 12.0;

        state.reset_positions();

        assert_eq!(state.player(Seat::P1).x, P1_SPAWN.0);
        assert_eq!(state.player(Seat::P1).vx, 0.0);
        assert_eq!(state.ball, Ball::at(400.0, 150.0));
        assert_eq!(state.player(Seat::P2).score, 3);
        assert_eq!(state.phase_index, 1);
    }

    #[test]
    fn test_clamp_to_field() {
        let mut body = PlayerBody::new(Seat::P1);
        body.x = -40.0;
        body.y = HEIGHT + 10.0;
        body.vy = 5.0;
        body.clamp_to_field();
        assert_eq!(body.x, PLAYER_RADIUS);
        assert_eq!(body.y, HEIGHT - PLAYER_RADIUS);
        assert_eq!(body.vy, 0.0);

        body.x = WIDTH + 1.0;
        body.clamp_to_field();
        assert_eq!(body.x, WIDTH - PLAYER_RADIUS);
    }

    #[test]
    fn test_role_parsing() {
        assert_eq!(Seat::from_role("p1"), Some(Seat::P1));
        assert_eq!(Seat::from_role("p2"), Some(Seat::P2));
        assert_eq!(Seat::from_role("spectator"), None);
        assert_eq!(Seat::from_role("P1"), None);
        assert_eq!(Role::from(Seat::P2).seat(), Some(Seat::P2));
        assert_eq!(Role::Spectator.seat(), None);
    }
}
