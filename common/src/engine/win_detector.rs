use super::board::{Mark, is_inside};
use super::types::{Position, WinningLine};

const DIRECTIONS: [(isize, isize); 4] = [(0, 1), (1, 0), (1, 1), (1, -1)];

/// Decides whether the mark just placed at (row, col) completes a streak.
///
/// Counts contiguous same-mark cells forward and backward from the placed
/// cell in each line direction, stopping at the board edge or a non-matching
/// cell. O(win_streak) per direction; the rest of the board is never scanned.
pub fn check_win_at(
    board: &[Vec<Mark>],
    row: usize,
    col: usize,
    win_streak: usize,
) -> Option<WinningLine> {
    if !is_inside(board, row, col) {
        return None;
    }
    let mark = board[row][col];
    if mark == Mark::Empty {
        return None;
    }

    for (dr, dc) in DIRECTIONS {
        let mut cells = vec![Position::new(row, col)];
        collect_run(board, row, col, dr, dc, mark, win_streak, &mut cells);
        collect_run(board, row, col, -dr, -dc, mark, win_streak, &mut cells);

        if cells.len() >= win_streak {
            return Some(WinningLine::new(mark, cells));
        }
    }

    None
}

fn collect_run(
    board: &[Vec<Mark>],
    row: usize,
    col: usize,
    dr: isize,
    dc: isize,
    mark: Mark,
    win_streak: usize,
    cells: &mut Vec<Position>,
) {
    let size = board.len() as isize;

    for i in 1..win_streak as isize {
        let nr = row as isize + dr * i;
        let nc = col as isize + dc * i;
        if nr < 0 || nc < 0 || nr >= size || nc >= size {
            break;
        }
        if board[nr as usize][nc as usize] != mark {
            break;
        }
        cells.push(Position::new(nr as usize, nc as usize));
    }
}
