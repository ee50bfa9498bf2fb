use super::board::{Mark, is_inside, new_board};
use super::expansion::{INITIAL_GRID_SIZE, expand, required_streak};
use crate::error::GameError;
use crate::identifiers::ConnectionId;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Player {
    pub connection_id: ConnectionId,
    pub mark: Mark,
}

impl Player {
    pub fn new(connection_id: ConnectionId, mark: Mark) -> Self {
        Self {
            connection_id,
            mark,
        }
    }
}

/// Authoritative state for one two-player match. Only mutates state; win
/// detection is the transport layer's job, so a session never decides that
/// the game is over.
#[derive(Debug)]
pub struct Game {
    board: Vec<Vec<Mark>>,
    grid_size: usize,
    win_streak: usize,
    players: [Player; 2],
    current_mark: Mark,
    filled_cells: usize,
}

impl Game {
    /// `players[0]` moves first. Both marks must be assigned and opposed.
    pub fn new(players: [Player; 2]) -> Self {
        assert!(
            players[0].mark.opponent() == Some(players[1].mark),
            "game requires one X and one O player"
        );

        let current_mark = players[0].mark;
        Self {
            board: new_board(INITIAL_GRID_SIZE),
            grid_size: INITIAL_GRID_SIZE,
            win_streak: required_streak(INITIAL_GRID_SIZE),
            players,
            current_mark,
            filled_cells: 0,
        }
    }

    pub fn board(&self) -> &[Vec<Mark>] {
        &self.board
    }

    pub fn grid_size(&self) -> usize {
        self.grid_size
    }

    pub fn win_streak(&self) -> usize {
        self.win_streak
    }

    pub fn current_mark(&self) -> Mark {
        self.current_mark
    }

    pub fn players(&self) -> &[Player; 2] {
        &self.players
    }

    /// Validates and applies one move for the given connection. The caller's
    /// identity is resolved to a player and checked against the side to move;
    /// a connection can never move as a symbol it was not assigned.
    pub fn apply_move(
        &mut self,
        connection_id: &ConnectionId,
        row: usize,
        col: usize,
    ) -> Result<Mark, GameError> {
        let player = self.player_for(connection_id).ok_or_else(|| {
            GameError::Player(format!("Player {} is not part of this game", connection_id))
        })?;
        let mark = player.mark;

        if mark != self.current_mark {
            return Err(GameError::Player(format!(
                "Player {} attempted to move out of turn",
                connection_id
            )));
        }

        if !is_inside(&self.board, row, col) {
            return Err(GameError::Validation(format!(
                "Invalid move: position ({}, {}) is out of bounds",
                row, col
            )));
        }

        if self.board[row][col] != Mark::Empty {
            return Err(GameError::Validation(format!(
                "Cell ({}, {}) is already marked",
                row, col
            )));
        }

        self.board[row][col] = mark;
        self.filled_cells += 1;
        self.switch_turn();

        Ok(mark)
    }

    fn switch_turn(&mut self) {
        self.current_mark = match self.current_mark {
            Mark::X => Mark::O,
            Mark::O => Mark::X,
            Mark::Empty => unreachable!("current mark is never empty"),
        };
    }

    pub fn is_board_full(&self) -> bool {
        self.filled_cells == self.grid_size * self.grid_size
    }

    /// Expansion side effect for a full board with no winner. The caller must
    /// run the win check first: a winning board-filling move ends the game on
    /// the pre-expansion coordinates.
    pub fn expand_if_full(&mut self) -> bool {
        if !self.is_board_full() {
            return false;
        }

        self.board = expand(&self.board);
        self.grid_size = self.board.len();
        self.win_streak = required_streak(self.grid_size);
        true
    }

    pub fn player_for(&self, connection_id: &ConnectionId) -> Option<&Player> {
        self.players
            .iter()
            .find(|player| &player.connection_id == connection_id)
    }

    pub fn opponent_of(&self, connection_id: &ConnectionId) -> Option<&Player> {
        self.players
            .iter()
            .find(|player| &player.connection_id != connection_id)
    }

    pub fn player_by_mark(&self, mark: Mark) -> Option<&Player> {
        self.players.iter().find(|player| player.mark == mark)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_game() -> (Game, ConnectionId, ConnectionId) {
        let first = ConnectionId::new("first".to_string());
        let second = ConnectionId::new("second".to_string());
        let game = Game::new([
            Player::new(first.clone(), Mark::X),
            Player::new(second.clone(), Mark::O),
        ]);
        (game, first, second)
    }

    #[test]
    fn test_new_game_starts_at_initial_size() {
        let (game, _, _) = test_game();

        assert_eq!(game.grid_size(), 3);
        assert_eq!(game.win_streak(), 3);
        assert_eq!(game.current_mark(), Mark::X);
        assert!(!game.is_board_full());
    }

    #[test]
    fn test_apply_move_places_mark_and_flips_turn() {
        let (mut game, first, _) = test_game();

        let mark = game.apply_move(&first, 1, 1).unwrap();

        assert_eq!(mark, Mark::X);
        assert_eq!(game.board()[1][1], Mark::X);
        assert_eq!(game.current_mark(), Mark::O);
    }

    #[test]
    fn test_out_of_turn_move_is_a_player_error() {
        let (mut game, _, second) = test_game();

        let err = game.apply_move(&second, 0, 0).unwrap_err();
        assert!(matches!(err, GameError::Player(_)));
        assert_eq!(game.board()[0][0], Mark::Empty);
    }

    #[test]
    fn test_unknown_connection_is_a_player_error() {
        let (mut game, _, _) = test_game();
        let stranger = ConnectionId::new("stranger".to_string());

        let err = game.apply_move(&stranger, 0, 0).unwrap_err();
        assert!(matches!(err, GameError::Player(_)));
    }

    #[test]
    fn test_out_of_bounds_and_occupied_are_validation_errors() {
        let (mut game, first, second) = test_game();

        let err = game.apply_move(&first, 3, 0).unwrap_err();
        assert!(matches!(err, GameError::Validation(_)));

        game.apply_move(&first, 0, 0).unwrap();
        let err = game.apply_move(&second, 0, 0).unwrap_err();
        assert!(matches!(err, GameError::Validation(_)));
    }

    #[test]
    fn test_filled_counter_tracks_board_fullness() {
        let (mut game, first, second) = test_game();

        // 3x3 sequence with no three-in-a-row: X at (0,0) (0,1) (1,2) (2,0) (2,2),
        // O at (0,2) (1,0) (1,1) (2,1).
        let moves = [
            (0, 0),
            (0, 2),
            (0, 1),
            (1, 0),
            (1, 2),
            (1, 1),
            (2, 0),
            (2, 1),
            (2, 2),
        ];
        for (index, &(row, col)) in moves.iter().enumerate() {
            let mover = if index % 2 == 0 { &first } else { &second };
            game.apply_move(mover, row, col).unwrap();
        }

        assert!(game.is_board_full());
    }

    #[test]
    fn test_expand_if_full_grows_and_recenters() {
        let (mut game, first, second) = test_game();
        let moves = [
            (0, 0),
            (0, 2),
            (0, 1),
            (1, 0),
            (1, 2),
            (1, 1),
            (2, 0),
            (2, 1),
            (2, 2),
        ];
        for (index, &(row, col)) in moves.iter().enumerate() {
            let mover = if index % 2 == 0 { &first } else { &second };
            game.apply_move(mover, row, col).unwrap();
        }

        assert!(game.expand_if_full());
        assert_eq!(game.grid_size(), 7);
        assert_eq!(game.win_streak(), 5);
        assert!(!game.is_board_full());
        assert_eq!(game.board()[2][2], Mark::X);
        assert_eq!(game.board()[3][3], Mark::O);
        assert_eq!(game.board()[0][0], Mark::Empty);
    }

    #[test]
    fn test_expand_if_full_is_a_no_op_on_partial_board() {
        let (mut game, first, _) = test_game();
        game.apply_move(&first, 0, 0).unwrap();

        assert!(!game.expand_if_full());
        assert_eq!(game.grid_size(), 3);
    }

    #[test]
    fn test_player_lookups() {
        let (game, first, second) = test_game();

        assert_eq!(game.opponent_of(&first).unwrap().connection_id, second);
        assert_eq!(game.opponent_of(&second).unwrap().connection_id, first);
        assert_eq!(game.player_by_mark(Mark::O).unwrap().connection_id, second);
        assert!(game.player_by_mark(Mark::Empty).is_none());
    }
}
