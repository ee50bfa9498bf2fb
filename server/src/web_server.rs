use axum::{
    Router,
    extract::{State, WebSocketUpgrade},
    response::IntoResponse,
    routing::get,
};
use common::Logger;
use std::path::PathBuf;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
};

use crate::broadcaster::Broadcaster;
use crate::session_manager::SessionManager;
use crate::ws_handler::handle_websocket;

#[derive(Clone)]
pub struct WebServerState {
    pub broadcaster: Broadcaster,
    pub session_manager: SessionManager,
    pub logger: Logger,
}

pub async fn run_web_server(
    state: WebServerState,
    listen_addr: &str,
    static_files_path: Option<PathBuf>,
) {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let mut app = Router::new().route("/ws", get(ws_upgrade_handler));
    if let Some(path) = static_files_path {
        app = app.nest_service("/ui", ServeDir::new(path));
    }
    let app = app.layer(cors).with_state(state.clone());

    state
        .logger
        .info(format!("Web server listening on {}", listen_addr));

    let listener = tokio::net::TcpListener::bind(listen_addr)
        .await
        .expect("Failed to bind web server address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(state.logger.clone()))
        .await
        .expect("Web server error");
}

async fn shutdown_signal(logger: Logger) {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to listen for Ctrl+C");
    logger.info("Shutdown signal received");
}

async fn ws_upgrade_handler(
    ws: WebSocketUpgrade,
    State(state): State<WebServerState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_websocket(socket, state))
}
