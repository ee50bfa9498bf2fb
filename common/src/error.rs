use std::fmt;

/// Recoverable failures surfaced to the offending connection as an `error`
/// event. None of these terminate the connection or the process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    /// Out-of-bounds or occupied-cell move.
    Validation(String),
    /// Move by the wrong side, or a player/opponent lookup failure.
    Player(String),
    /// The referenced game does not exist.
    GameState(String),
    /// Per-connection move window exceeded.
    RateLimit(String),
}

impl GameError {
    pub fn code(&self) -> &'static str {
        match self {
            GameError::Validation(_) => "VALIDATION_ERROR",
            GameError::Player(_) => "PLAYER_ERROR",
            GameError::GameState(_) => "GAME_STATE_ERROR",
            GameError::RateLimit(_) => "RATE_LIMIT_ERROR",
        }
    }

    pub fn message(&self) -> &str {
        match self {
            GameError::Validation(message)
            | GameError::Player(message)
            | GameError::GameState(message)
            | GameError::RateLimit(message) => message,
        }
    }
}

impl fmt::Display for GameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for GameError {}
