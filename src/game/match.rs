//! Match engine and authoritative tick loop

use parking_lot::Mutex;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::session::SessionRegistry;
use crate::util::time::{millis_to_ticks, tick_duration};
use crate::ws::protocol::{GameEvent, MatchSnapshot, ServerMsg};

use super::input::InputBuffer;
use super::math::{
    angle_between, circle_contact, deg_to_rad, mix_velocities, push_clear, separate_equally,
};
use super::phase::{PhaseParams, PHASE_ORDER};
use super::snapshot;
use super::state::{
    MatchState, MatchStatus, PlayerBody, Role, Seat, BALL_RADIUS, HEIGHT, PLAYER_RADIUS, WIDTH,
};

/// Body lean kept each tick
pub const ANGLE_DAMPING: f32 = 0.94;
/// Leg swing kept each tick
pub const LEG_DAMPING: f32 = 0.85;
/// A player this close to the floor may jump
pub const GROUND_TOLERANCE: f32 = 10.0;
/// Lean applied on jump, degrees
pub const JUMP_LEAN_DEG: f32 = 45.0;
/// Leg swing applied on a press, degrees
pub const KICK_SWING_DEG: f32 = 70.0;
/// Fraction of horizontal velocity exchanged when players bump
pub const PLAYER_VELOCITY_MIX: f32 = 0.5;
/// Speed the ball gets pushed away from a body at
pub const BALL_REPULSION: f32 = 8.0;
/// Fraction of the player's velocity carried into the ball on body contact
pub const PLAYER_VELOCITY_TRANSFER: f32 = 0.6;
pub const FOOT_RADIUS: f32 = 12.0;
/// Distance from body centre to foot centre
pub const FOOT_ORBIT: f32 = PLAYER_RADIUS + 12.0;
/// Ball speed after a foot contact
pub const KICK_POWER: f32 = 14.0;
/// Kick multiplier when the player pressed this tick
pub const KICK_PRESS_MULTIPLIER: f32 = 1.4;
/// Floor rebounds slower than this come to rest
pub const BOUNCE_REST_THRESHOLD: f32 = 1.0;

/// What happens to scores when a seated player disconnects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisconnectPolicy {
    /// Only the seat is cleared
    #[default]
    KeepScores,
    /// Both scores go back to zero
    ResetScores,
}

/// Match rules
#[derive(Debug, Clone)]
pub struct GameRules {
    /// Score that ends the match
    pub win_score: u32,
    /// Total goals between phase changes (0 disables cycling)
    pub goals_per_phase: u32,
    /// Length of the post-goal pause in ticks
    pub goal_pause_ticks: u32,
    pub disconnect_policy: DisconnectPolicy,
}

impl Default for GameRules {
    fn default() -> Self {
        Self {
            win_score: 10,
            goals_per_phase: 2,
            goal_pause_ticks: millis_to_ticks(2000),
            disconnect_policy: DisconnectPolicy::KeepScores,
        }
    }
}

/// Foot centre: orbits the body at the combined body and leg angle
pub fn foot_position(player: &PlayerBody) -> (f32, f32) {
    let theta = deg_to_rad(player.angle + player.leg_angle);
    (
        player.x + FOOT_ORBIT * theta.sin(),
        player.y + FOOT_ORBIT * theta.cos(),
    )
}

/// The authoritative game match
pub struct GameMatch {
    state: MatchState,
    rules: GameRules,
    /// Ticks left before play resumes after a goal
    goal_pause_remaining: Option<u32>,
}

impl GameMatch {
    pub fn new(rules: GameRules) -> Self {
        Self {
            state: MatchState::new(),
            rules,
            goal_pause_remaining: None,
        }
    }

    pub fn state(&self) -> &MatchState {
        &self.state
    }

    #[cfg(test)]
    pub fn state_mut(&mut self) -> &mut MatchState {
        &mut self.state
    }

    #[cfg(test)]
    pub fn rules(&self) -> &GameRules {
        &self.rules
    }

    #[cfg(test)]
    pub fn goal_pause_remaining(&self) -> Option<u32> {
        self.goal_pause_remaining
    }

    pub fn snapshot(&self) -> MatchSnapshot {
        snapshot::build(&self.state)
    }

    /// Handle a new connection: first free seat in p1, p2 order, otherwise
    /// spectator
    pub fn connect(&mut self, conn_id: Uuid) -> Role {
        let role = match self.state.first_free_seat() {
            Some(seat) => {
                self.state.player_mut(seat).conn_id = Some(conn_id);
                Role::from(seat)
            }
            None => Role::Spectator,
        };

        if self.state.occupied_seats() == 2 && self.state.status == MatchStatus::Waiting {
            self.state.status = MatchStatus::Playing;
            info!(tick = self.state.tick, "Both seats taken, match playing");
        }

        role
    }

    /// Handle a closed connection. Returns the seat it held, if any.
    pub fn disconnect(&mut self, conn_id: Uuid) -> Option<Seat> {
        let seat = self.state.seat_of(conn_id)?;
        self.state.player_mut(seat).conn_id = None;

        let was_over = self.state.status == MatchStatus::GameOver;
        if was_over || self.rules.disconnect_policy == DisconnectPolicy::ResetScores {
            self.state.reset_scores();
        }

        // Nothing may resume a goal pause once the seat is gone
        if self.goal_pause_remaining.take().is_some() || was_over {
            self.state.reset_positions();
        }

        self.state.status = MatchStatus::Waiting;
        info!(seat = %seat, "Seat released, match waiting");
        Some(seat)
    }

    /// Zero the scores and start playing from kickoff, whatever the status.
    /// A pending post-goal resume is cancelled.
    pub fn restart(&mut self) {
        self.state.reset_scores();
        self.state.reset_positions();
        self.goal_pause_remaining = None;
        self.state.status = MatchStatus::Playing;
        info!(tick = self.state.tick, "Match restarted");
    }

    /// Advance the match by one tick
    pub fn step(&mut self, inputs: &InputBuffer) -> Vec<GameEvent> {
        let mut events = Vec::new();
        self.state.tick += 1;

        match self.state.status {
            MatchStatus::Playing => self.update_physics(inputs, &mut events),
            MatchStatus::Goal => {
                self.discard_inputs(inputs);
                self.update_goal_pause();
            }
            MatchStatus::Waiting | MatchStatus::GameOver => self.discard_inputs(inputs),
        }

        if !self.state.is_finite() {
            warn!(tick = self.state.tick, "Non-finite body state, resetting positions");
            self.state.reset_positions();
        }

        events
    }

    /// Presses outside of play are dropped so they don't fire later
    fn discard_inputs(&self, inputs: &InputBuffer) {
        for seat in Seat::ALL {
            inputs.take(seat);
        }
    }

    fn update_goal_pause(&mut self) {
        let remaining = match self.goal_pause_remaining {
            Some(remaining) => remaining.saturating_sub(1),
            None => 0,
        };

        if remaining == 0 {
            self.goal_pause_remaining = None;
            self.state.reset_positions();
            self.state.status = MatchStatus::Playing;
            debug!(tick = self.state.tick, "Goal pause over, play resumes");
        } else {
            self.goal_pause_remaining = Some(remaining);
        }
    }

    fn update_physics(&mut self, inputs: &InputBuffer, events: &mut Vec<GameEvent>) {
        let params = self.state.params();
        let mut pressed = [false; 2];

        for seat in Seat::ALL {
            let player = self.state.player_mut(seat);
            integrate_player(player, &params);

            pressed[seat.index()] = inputs.take(seat);
            if pressed[seat.index()] {
                apply_press(player, &params);
            }
        }

        self.resolve_player_collision();
        self.integrate_ball(&params);

        if let Some(scorer) = self.detect_goal() {
            self.score_goal(scorer, events);
            return;
        }

        for seat in Seat::ALL {
            self.resolve_body_contact(seat);
        }
        for seat in Seat::ALL {
            self.resolve_foot_contact(seat, pressed[seat.index()]);
        }
    }

    fn resolve_player_collision(&mut self) {
        let [p1, p2] = &mut self.state.players;

        let Some(contact) = circle_contact(p1.x, p1.y, PLAYER_RADIUS, p2.x, p2.y, PLAYER_RADIUS)
        else {
            return;
        };

        let ((x1, y1), (x2, y2)) = separate_equally(p1.x, p1.y, p2.x, p2.y, &contact);
        p1.x = x1;
        p1.y = y1;
        p2.x = x2;
        p2.y = y2;

        let (vx1, vx2) = mix_velocities(p1.vx, p2.vx, PLAYER_VELOCITY_MIX);
        p1.vx = vx1;
        p2.vx = vx2;

        p1.clamp_to_field();
        p2.clamp_to_field();
    }

    fn integrate_ball(&mut self, params: &PhaseParams) {
        let ball = &mut self.state.ball;
        ball.vy += params.gravity;
        ball.x += ball.vx;
        ball.y += ball.vy;
        ball.vx *= params.ball_damping;

        if ball.y > HEIGHT - BALL_RADIUS {
            ball.y = HEIGHT - BALL_RADIUS;
            ball.vy = -ball.vy * params.bounciness;
            if ball.vy.abs() < BOUNCE_REST_THRESHOLD {
                ball.vy = 0.0;
            }
        }

        if ball.y < BALL_RADIUS {
            ball.y = BALL_RADIUS;
            ball.vy = -ball.vy * params.bounciness;
        }
    }

    /// Left edge is checked first, so it wins if both could fire
    fn detect_goal(&self) -> Option<Seat> {
        if self.state.ball.x <= 0.0 {
            Some(Seat::P2)
        } else if self.state.ball.x >= WIDTH {
            Some(Seat::P1)
        } else {
            None
        }
    }

    fn score_goal(&mut self, scorer: Seat, events: &mut Vec<GameEvent>) {
        let player = self.state.player_mut(scorer);
        player.score += 1;
        let score = player.score;

        if score >= self.rules.win_score {
            self.state.status = MatchStatus::GameOver;
            self.state.winner = Some(scorer);
            self.goal_pause_remaining = None;
            events.push(GameEvent::GameOver { winner: scorer });
            info!(winner = %scorer, score, "Game over");
            return;
        }

        let total = self.state.total_goals();
        if self.rules.goals_per_phase > 0 && total % self.rules.goals_per_phase == 0 {
            self.state.phase_index = (self.state.phase_index + 1) % PHASE_ORDER.len();
            info!(phase = %self.state.phase(), total_goals = total, "Phase changed");
        }

        self.state.status = MatchStatus::Goal;
        self.goal_pause_remaining = Some(self.rules.goal_pause_ticks);
        events.push(GameEvent::Goal {
            scorer,
            phase: self.state.phase(),
        });

        info!(
            scorer = %scorer,
            p1 = self.state.player(Seat::P1).score,
            p2 = self.state.player(Seat::P2).score,
            "Goal"
        );
    }

    fn resolve_body_contact(&mut self, seat: Seat) {
        let player = &self.state.players[seat.index()];
        let ball = &mut self.state.ball;

        let Some(contact) =
            circle_contact(player.x, player.y, PLAYER_RADIUS, ball.x, ball.y, BALL_RADIUS)
        else {
            return;
        };

        let angle = angle_between(player.x, player.y, ball.x, ball.y);
        ball.vx = angle.cos() * BALL_REPULSION + player.vx * PLAYER_VELOCITY_TRANSFER;
        ball.vy = angle.sin() * BALL_REPULSION + player.vy * PLAYER_VELOCITY_TRANSFER;

        let (x, y) = push_clear(player.x, player.y, PLAYER_RADIUS + BALL_RADIUS, &contact);
        ball.x = x;
        ball.y = y.min(HEIGHT - BALL_RADIUS);
    }

    fn resolve_foot_contact(&mut self, seat: Seat, pressed: bool) {
        let (fx, fy) = foot_position(&self.state.players[seat.index()]);
        let ball = &mut self.state.ball;

        let Some(contact) = circle_contact(fx, fy, FOOT_RADIUS, ball.x, ball.y, BALL_RADIUS) else {
            return;
        };

        let power = if pressed {
            KICK_POWER * KICK_PRESS_MULTIPLIER
        } else {
            KICK_POWER
        };
        ball.vx = contact.nx * power;
        ball.vy = contact.ny * power;

        let (x, y) = push_clear(fx, fy, FOOT_RADIUS + BALL_RADIUS, &contact);
        ball.x = x;
        ball.y = y.min(HEIGHT - BALL_RADIUS);
    }
}

fn integrate_player(player: &mut PlayerBody, params: &PhaseParams) {
    player.vy += params.gravity;
    player.y += player.vy;
    player.x += player.vx;
    player.vx *= params.player_damping;
    player.angle *= ANGLE_DAMPING;
    player.leg_angle *= LEG_DAMPING;

    if player.y >= HEIGHT - PLAYER_RADIUS {
        player.y = HEIGHT - PLAYER_RADIUS;
        player.vy = 0.0;
    }
    player.on_ground = player.y >= HEIGHT - PLAYER_RADIUS - GROUND_TOLERANCE;
    player.x = player.x.clamp(PLAYER_RADIUS, WIDTH - PLAYER_RADIUS);
}

/// Jump when grounded; the leg swings either way
fn apply_press(player: &mut PlayerBody, params: &PhaseParams) {
    let direction = player.seat.direction();
    if player.on_ground {
        player.vy = params.jump_force;
        player.vx = params.move_speed * direction;
        player.angle = JUMP_LEAN_DEG * direction;
        player.on_ground = false;
    }
    player.leg_angle = KICK_SWING_DEG * direction;
}

/// Handle to the running match, shared by every connection handler
#[derive(Clone)]
pub struct MatchHandle {
    game: Arc<Mutex<GameMatch>>,
    inputs: Arc<InputBuffer>,
    sessions: Arc<SessionRegistry>,
    events_tx: broadcast::Sender<ServerMsg>,
    started: Arc<AtomicBool>,
}

impl MatchHandle {
    pub fn new(rules: GameRules) -> Self {
        let (events_tx, _) = broadcast::channel(64);
        Self {
            game: Arc::new(Mutex::new(GameMatch::new(rules))),
            inputs: Arc::new(InputBuffer::new()),
            sessions: Arc::new(SessionRegistry::new()),
            events_tx,
            started: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Spawn the tick loop. Only the first call spawns anything.
    pub fn start(&self) -> Option<JoinHandle<()>> {
        if self.started.swap(true, Ordering::AcqRel) {
            return None;
        }
        let handle = self.clone();
        Some(tokio::spawn(async move { handle.run().await }))
    }

    /// Receiver for every broadcast message (snapshots and events)
    pub fn subscribe(&self) -> broadcast::Receiver<ServerMsg> {
        self.events_tx.subscribe()
    }

    pub fn snapshot(&self) -> MatchSnapshot {
        self.game.lock().snapshot()
    }

    pub fn connect(&self, conn_id: Uuid) -> Role {
        let role = self.game.lock().connect(conn_id);
        self.sessions.assign(conn_id, role);
        info!(
            conn_id = %conn_id,
            role = ?role,
            connected = self.sessions.connected(),
            spectators = self.sessions.spectators(),
            "Connection assigned"
        );
        role
    }

    pub fn disconnect(&self, conn_id: Uuid) -> Option<Seat> {
        let seat = self.game.lock().disconnect(conn_id);
        let role = self.sessions.release(conn_id);

        if let Some(seat) = seat {
            let _ = self.events_tx.send(ServerMsg::PlayerLeft { role: seat });
        }
        info!(
            conn_id = %conn_id,
            role = ?role,
            connected = self.sessions.connected(),
            spectators = self.sessions.spectators(),
            "Connection released"
        );
        seat
    }

    /// Record a press for the given wire role. Unknown roles are ignored.
    /// The role is not checked against the sender's own seat.
    pub fn press(&self, role: &str) -> bool {
        match Seat::from_role(role) {
            Some(seat) => {
                self.inputs.press(seat);
                true
            }
            None => {
                debug!(role, "Ignoring input for unknown role");
                false
            }
        }
    }

    /// Restart the match. Presses queued before the restart are dropped.
    pub fn restart(&self) {
        self.inputs.clear();
        self.game.lock().restart();
    }

    /// Run one tick and broadcast its events followed by the snapshot
    pub fn tick(&self) {
        let (events, update) = {
            let mut game = self.game.lock();
            let events = game.step(&self.inputs);
            (events, snapshot::state_update(game.state()))
        };

        for event in events {
            let _ = self.events_tx.send(event.into());
        }
        let _ = self.events_tx.send(update);
    }

    /// Run the authoritative tick loop for the life of the process
    pub async fn run(self) {
        info!("Tick loop started");

        let mut tick_interval = interval(tick_duration());
        tick_interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tick_interval.tick().await;

            if !run_guarded(|| self.tick()) {
                error!("Tick panicked, continuing with next tick");
            }
        }
    }
}

/// Run one tick, containing any panic. Returns false if it panicked.
fn run_guarded(tick: impl FnOnce()) -> bool {
    std::panic::catch_unwind(AssertUnwindSafe(tick)).is_ok()
}
