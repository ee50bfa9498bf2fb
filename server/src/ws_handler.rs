use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;

use common::id_generator::generate_connection_id;
use common::protocol::{ClientMessage, ServerMessage};
use common::ConnectionId;

use crate::web_server::WebServerState;

const OUTBOUND_CHANNEL_CAPACITY: usize = 128;

/// One invocation per WebSocket connection. Events are handled to completion
/// in arrival order for this connection; the tail performs the full
/// disconnect teardown whether the peer closed cleanly or the socket died.
pub async fn handle_websocket(socket: WebSocket, state: WebServerState) {
    let (mut ws_sender, mut ws_receiver) = socket.split();
    let logger = state.logger;

    let (tx, mut rx) = mpsc::channel::<ServerMessage>(OUTBOUND_CHANNEL_CAPACITY);

    let send_logger = logger.clone();
    let send_task = tokio::spawn(async move {
        while let Some(message) = rx.recv().await {
            match serde_json::to_string(&message) {
                Ok(json) => {
                    if ws_sender.send(Message::Text(json.into())).await.is_err() {
                        break;
                    }
                }
                Err(e) => {
                    send_logger.error(format!("Failed to encode server message: {}", e));
                }
            }
        }
    });

    let connection_id = ConnectionId::new(generate_connection_id());
    state
        .broadcaster
        .register(connection_id.clone(), tx.clone())
        .await;
    logger.info(format!("Client connected: {}", connection_id));

    state
        .broadcaster
        .send_to(
            &connection_id,
            ServerMessage::Connected {
                connection_id: connection_id.clone(),
            },
        )
        .await;

    while let Some(result) = ws_receiver.next().await {
        match result {
            Ok(Message::Text(text)) => match serde_json::from_str::<ClientMessage>(&text) {
                Ok(ClientMessage::FindGame) => {
                    state.session_manager.handle_find_game(&connection_id).await;
                }
                Ok(ClientMessage::MakeMove {
                    game_id,
                    row,
                    col,
                    client_asserted_win,
                }) => {
                    state
                        .session_manager
                        .handle_make_move(&connection_id, &game_id, row, col, client_asserted_win)
                        .await;
                }
                Err(e) => {
                    logger.warn(format!(
                        "Failed to decode message from {}: {}",
                        connection_id, e
                    ));
                    state
                        .broadcaster
                        .send_to(
                            &connection_id,
                            ServerMessage::Error {
                                message: format!("Invalid message: {}", e),
                            },
                        )
                        .await;
                }
            },
            Ok(Message::Close(_)) => break,
            Ok(_) => continue,
            Err(e) => {
                logger.warn(format!("WebSocket error for {}: {}", connection_id, e));
                break;
            }
        }
    }

    logger.info(format!("WebSocket connection ended for {}", connection_id));
    state.session_manager.handle_disconnect(&connection_id).await;

    send_task.abort();
}
