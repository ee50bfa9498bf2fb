use common::engine::{Game, Player, check_win_at};
use common::id_generator::generate_request_id;
use common::protocol::{GameFound, MoveMade, MoveSummary, OpponentMove, ServerMessage, Symbol};
use common::{ConnectionId, GameError, GameId, Logger};
use rand::Rng;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::broadcaster::Broadcaster;
use crate::matchmaker::{FindGameOutcome, Matchmaker};
use crate::rate_limiter::RateLimiter;

/// The single dispatch point for session events. All state lives in-process
/// behind these mutexes, so events touching one game are serialized here and
/// there is no read-modify-write window against an external store.
#[derive(Clone)]
pub struct SessionManager {
    games: Arc<Mutex<HashMap<GameId, Game>>>,
    connection_to_game: Arc<Mutex<HashMap<ConnectionId, GameId>>>,
    broadcaster: Broadcaster,
    matchmaker: Matchmaker,
    rate_limiter: RateLimiter,
    logger: Logger,
}

impl SessionManager {
    pub fn new(
        broadcaster: Broadcaster,
        matchmaker: Matchmaker,
        rate_limiter: RateLimiter,
        logger: Logger,
    ) -> Self {
        Self {
            games: Arc::new(Mutex::new(HashMap::new())),
            connection_to_game: Arc::new(Mutex::new(HashMap::new())),
            broadcaster,
            matchmaker,
            rate_limiter,
            logger,
        }
    }

    pub async fn handle_find_game(&self, connection_id: &ConnectionId) {
        let request_id = generate_request_id();
        self.logger.info(format!(
            "[req:{}] Player {} looking for game",
            request_id, connection_id
        ));

        match self.matchmaker.find_game(connection_id).await {
            FindGameOutcome::Paired { opponent } => {
                if let Err(reason) = self.create_game(&opponent, connection_id, &request_id).await
                {
                    self.logger.error(format!(
                        "[req:{}] Error creating game for {} and {}: {}",
                        request_id, opponent, connection_id, reason
                    ));
                    // The unaffected peer keeps its place in line.
                    self.matchmaker.requeue_front(opponent).await;
                    self.broadcaster
                        .send_to(
                            connection_id,
                            ServerMessage::Error {
                                message: "Failed to create game".to_string(),
                            },
                        )
                        .await;
                }
            }
            FindGameOutcome::Waiting => {
                self.logger.info(format!(
                    "[req:{}] No opponent found, {} added to waiting list",
                    request_id, connection_id
                ));
                self.broadcaster
                    .send_to(connection_id, ServerMessage::WaitingForOpponent)
                    .await;
            }
        }
    }

    async fn create_game(
        &self,
        opponent: &ConnectionId,
        requester: &ConnectionId,
        request_id: &str,
    ) -> Result<(), String> {
        if !self.broadcaster.is_registered(opponent).await {
            return Err(format!("opponent {} is no longer connected", opponent));
        }

        let game_id = GameId::from_pair(opponent, requester);
        self.logger.info(format!(
            "[req:{}] Creating game {} for players {} and {}",
            request_id, game_id, opponent, requester
        ));

        // The longer-waiting player moves first with a random symbol.
        let starting_symbol = if rand::rng().random() {
            Symbol::X
        } else {
            Symbol::O
        };
        let second_symbol = starting_symbol.opponent();

        let game = Game::new([
            Player::new(opponent.clone(), starting_symbol.mark()),
            Player::new(requester.clone(), second_symbol.mark()),
        ]);

        {
            let mut games = self.games.lock().await;
            games.insert(game_id.clone(), game);
        }
        {
            let mut mapping = self.connection_to_game.lock().await;
            mapping.insert(opponent.clone(), game_id.clone());
            mapping.insert(requester.clone(), game_id.clone());
        }

        self.broadcaster
            .send_to(
                opponent,
                ServerMessage::GameFound(GameFound {
                    game_id: game_id.clone(),
                    opponent_id: requester.clone(),
                    is_first_player: true,
                    starting_player: starting_symbol,
                    assigned_symbol: starting_symbol,
                }),
            )
            .await;
        self.broadcaster
            .send_to(
                requester,
                ServerMessage::GameFound(GameFound {
                    game_id: game_id.clone(),
                    opponent_id: opponent.clone(),
                    is_first_player: false,
                    starting_player: starting_symbol,
                    assigned_symbol: second_symbol,
                }),
            )
            .await;

        self.logger.info(format!(
            "[req:{}] Game found notifications sent for {}",
            request_id, game_id
        ));
        Ok(())
    }

    pub async fn handle_make_move(
        &self,
        connection_id: &ConnectionId,
        game_id: &GameId,
        row: usize,
        col: usize,
        client_asserted_win: bool,
    ) {
        let request_id = generate_request_id();

        if let Err(err) = self.rate_limiter.check(connection_id).await {
            self.logger.warn(format!(
                "[req:{}] Rate limit exceeded for {}",
                request_id, connection_id
            ));
            self.send_error(connection_id, &err).await;
            return;
        }

        self.logger.info(format!(
            "[req:{}] Move ({}, {}) received from {} for game {}",
            request_id, row, col, connection_id, game_id
        ));

        if let Err(err) = self
            .process_move(
                connection_id,
                game_id,
                row,
                col,
                client_asserted_win,
                &request_id,
            )
            .await
        {
            self.logger.warn(format!(
                "[req:{}][{}] Move by {} rejected: {}",
                request_id,
                err.code(),
                connection_id,
                err
            ));
            self.send_error(connection_id, &err).await;
        }
    }

    async fn process_move(
        &self,
        connection_id: &ConnectionId,
        game_id: &GameId,
        row: usize,
        col: usize,
        client_asserted_win: bool,
        request_id: &str,
    ) -> Result<(), GameError> {
        let mut games = self.games.lock().await;
        let game = games
            .get_mut(game_id)
            .ok_or_else(|| GameError::GameState(format!("Game {} not found", game_id)))?;

        let mark = game.apply_move(connection_id, row, col)?;
        let mover_symbol = Symbol::from_mark(mark).unwrap();
        let opponent = game
            .opponent_of(connection_id)
            .cloned()
            .ok_or_else(|| GameError::Player("Opponent not found in game".to_string()))?;

        // The server is authoritative; the client's assertion is only a hint.
        let win = check_win_at(game.board(), row, col, game.win_streak());
        if client_asserted_win && win.is_none() {
            self.logger.warn(format!(
                "[req:{}] Client {} asserted a win the server does not see",
                request_id, connection_id
            ));
        }

        let current_player = Symbol::from_mark(game.current_mark()).unwrap();

        let (summary, terminal) = match win {
            Some(line) => {
                self.logger.info(format!(
                    "[req:{}] Winning move detected, ending game {}",
                    request_id, game_id
                ));
                (
                    MoveSummary {
                        current_player,
                        is_board_full: game.is_board_full(),
                        new_grid_size: game.grid_size(),
                        is_winner: true,
                        winner: Some(mover_symbol),
                        winning_line: Some(line.cells),
                    },
                    true,
                )
            }
            None => {
                let was_full = game.is_board_full();
                if was_full {
                    self.logger.info(format!(
                        "[req:{}] Board is full, expanding grid for game {}",
                        request_id, game_id
                    ));
                    game.expand_if_full();
                }
                (
                    MoveSummary {
                        current_player,
                        is_board_full: was_full,
                        new_grid_size: game.grid_size(),
                        is_winner: false,
                        winner: None,
                        winning_line: None,
                    },
                    false,
                )
            }
        };

        if terminal {
            games.remove(game_id);
        }
        drop(games);

        if terminal {
            let mut mapping = self.connection_to_game.lock().await;
            mapping.remove(connection_id);
            mapping.remove(&opponent.connection_id);
        }

        let opponent_payload = ServerMessage::MoveMade(MoveMade::Opponent(OpponentMove {
            summary: summary.clone(),
            row,
            col,
            player: mover_symbol,
            player_id: connection_id.clone(),
        }));
        self.broadcaster
            .send_to(&opponent.connection_id, opponent_payload)
            .await;
        self.broadcaster
            .send_to(connection_id, ServerMessage::MoveMade(MoveMade::Mover(summary)))
            .await;

        Ok(())
    }

    /// Atomic teardown for a connection: waiting-queue slot, rate-limit
    /// entry, any owned game (opponent notified exactly once), sender
    /// registration.
    pub async fn handle_disconnect(&self, connection_id: &ConnectionId) {
        self.logger
            .info(format!("Client disconnected: {}", connection_id));

        self.matchmaker.remove(connection_id).await;
        self.rate_limiter.remove(connection_id).await;

        let game_id = {
            let mut mapping = self.connection_to_game.lock().await;
            mapping.remove(connection_id)
        };

        if let Some(game_id) = game_id {
            let game = {
                let mut games = self.games.lock().await;
                games.remove(&game_id)
            };

            if let Some(game) = game {
                if let Some(opponent) = game.opponent_of(connection_id) {
                    self.connection_to_game
                        .lock()
                        .await
                        .remove(&opponent.connection_id);
                    self.logger.info(format!(
                        "Notifying {} that opponent {} left game {}",
                        opponent.connection_id, connection_id, game_id
                    ));
                    self.broadcaster
                        .send_to(&opponent.connection_id, ServerMessage::OpponentDisconnected)
                        .await;
                }
                self.logger.info(format!("Game removed: {}", game_id));
            }
        }

        self.broadcaster.unregister(connection_id).await;
    }

    async fn send_error(&self, connection_id: &ConnectionId, err: &GameError) {
        self.broadcaster
            .send_to(
                connection_id,
                ServerMessage::Error {
                    message: err.message().to_string(),
                },
            )
            .await;
    }
}
