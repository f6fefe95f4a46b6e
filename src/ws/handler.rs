//! WebSocket upgrade handler

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::app::AppState;
use crate::game::MatchHandle;
use crate::util::rate_limit::ConnectionRateLimiter;
use crate::ws::protocol::{ClientMsg, ServerMsg};

/// WebSocket upgrade handler
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handle the upgraded WebSocket connection
async fn handle_socket(socket: WebSocket, state: AppState) {
    let conn_id = Uuid::new_v4();
    info!(conn_id = %conn_id, "New WebSocket connection");

    let (mut ws_sink, ws_stream) = socket.split();

    // Subscribe before taking a seat so no broadcast is missed
    let broadcast_rx = state.game.subscribe();
    let role = state.game.connect(conn_id);

    if let Err(e) = send_msg(&mut ws_sink, &ServerMsg::AssignRole { role }).await {
        error!(conn_id = %conn_id, error = %e, "Failed to send role");
        state.game.disconnect(conn_id);
        return;
    }

    let rate_limiter = ConnectionRateLimiter::new(state.config.input_rate_limit);
    run_session(conn_id, &state.game, rate_limiter, ws_sink, ws_stream, broadcast_rx).await;

    // Cleanup on disconnect
    state.game.disconnect(conn_id);

    info!(conn_id = %conn_id, "WebSocket connection closed");
}

/// Run the WebSocket session with read/write split
async fn run_session(
    conn_id: Uuid,
    game: &MatchHandle,
    rate_limiter: ConnectionRateLimiter,
    mut ws_sink: futures::stream::SplitSink<WebSocket, Message>,
    mut ws_stream: futures::stream::SplitStream<WebSocket>,
    mut broadcast_rx: broadcast::Receiver<ServerMsg>,
) {
    // Spawn writer task: broadcasts -> WebSocket
    let writer_handle = tokio::spawn(async move {
        loop {
            match broadcast_rx.recv().await {
                Ok(msg) => {
                    if let Err(e) = send_msg(&mut ws_sink, &msg).await {
                        debug!(conn_id = %conn_id, error = %e, "WebSocket send failed");
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    warn!(
                        conn_id = %conn_id,
                        lagged_count = n,
                        "Client lagged, skipping {} messages", n
                    );
                    // Continue - don't disconnect for lag
                }
                Err(broadcast::error::RecvError::Closed) => {
                    debug!(conn_id = %conn_id, "Broadcast channel closed");
                    break;
                }
            }
        }
    });

    // Reader loop: WebSocket -> match
    while let Some(result) = ws_stream.next().await {
        match result {
            Ok(Message::Text(text)) => {
                if !rate_limiter.check() {
                    warn!(conn_id = %conn_id, "Rate limited client message");
                    continue;
                }

                match serde_json::from_str::<ClientMsg>(&text) {
                    Ok(client_msg) => dispatch(conn_id, game, client_msg),
                    Err(e) => {
                        warn!(conn_id = %conn_id, error = %e, "Failed to parse client message");
                    }
                }
            }
            Ok(Message::Binary(_)) => {
                warn!(conn_id = %conn_id, "Received binary message, ignoring");
            }
            Ok(Message::Ping(_)) => {
                debug!(conn_id = %conn_id, "Received ping");
            }
            Ok(Message::Pong(_)) => {
                debug!(conn_id = %conn_id, "Received pong");
            }
            Ok(Message::Close(_)) => {
                info!(conn_id = %conn_id, "Client initiated close");
                break;
            }
            Err(e) => {
                error!(conn_id = %conn_id, error = %e, "WebSocket error");
                break;
            }
        }
    }

    // Abort writer task
    writer_handle.abort();
}

/// Apply a client message to the match. Never blocks.
fn dispatch(conn_id: Uuid, game: &MatchHandle, msg: ClientMsg) {
    match msg {
        ClientMsg::PlayerInput { role } => {
            game.press(&role);
        }
        ClientMsg::RestartGame => {
            info!(conn_id = %conn_id, "Restart requested");
            game.restart();
        }
    }
}

/// Send a message over WebSocket
async fn send_msg(
    sink: &mut futures::stream::SplitSink<WebSocket, Message>,
    msg: &ServerMsg,
) -> Result<(), String> {
    let json = serde_json::to_string(msg).map_err(|e| e.to_string())?;
    sink.send(Message::Text(json))
        .await
        .map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::state::{MatchStatus, Role};
    use crate::game::GameRules;

    #[test]
    fn test_dispatch_input_and_restart() {
        let game = MatchHandle::new(GameRules::default());
        let a = Uuid::new_v4();
        assert_eq!(game.connect(a), Role::P1);

        dispatch(a, &game, ClientMsg::RestartGame);
        assert_eq!(game.snapshot().status, MatchStatus::Playing);

        // Settle, then press on behalf of p2 from p1's connection
        for _ in 0..30 {
            game.tick();
        }
        dispatch(
            a,
            &game,
            ClientMsg::PlayerInput {
                role: "p2".to_string(),
            },
        );
        dispatch(
            a,
            &game,
            ClientMsg::PlayerInput {
                role: "nobody".to_string(),
            },
        );
        game.tick();

        let snapshot = game.snapshot();
        assert!(snapshot.players.p2.vy < 0.0);
        assert_eq!(snapshot.players.p1.vy, 0.0);
    }
}
