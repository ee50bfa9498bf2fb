mod board;
mod bot;
mod expansion;
mod game;
mod types;
mod win_detector;

pub use board::{Mark, is_inside, is_valid_move, new_board};
pub use bot::find_move;
pub use expansion::{GROWTH_INCREMENT, INITIAL_GRID_SIZE, expand, required_streak};
pub use game::{Game, Player};
pub use types::{Position, WinningLine};
pub use win_detector::check_win_at;
