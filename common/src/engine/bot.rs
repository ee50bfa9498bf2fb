use super::board::Mark;
use super::types::Position;
use super::win_detector::check_win_at;
use rand::prelude::IndexedRandom;
use std::collections::HashMap;

const DIRECTIONS: [(isize, isize); 4] = [(0, 1), (1, 0), (1, 1), (1, -1)];
const PATTERN_BONUS: f64 = 0.1;
const PATTERN_PENALTY: f64 = 0.2;
const MAX_SEARCH_DEPTH: usize = 3;

/// Picks a move for `player`, in strict priority order: opening book, forced
/// block of the opponent's immediate win, own immediate win, suppression of
/// the opponent's strongest threat, bounded adversarial search, and finally
/// center / first empty cell. Returns `None` only for a board with no empty
/// cell, which a live game never presents.
pub fn find_move(board: &[Vec<Mark>], player: Mark, win_streak: usize) -> Option<Position> {
    let opponent = player.opponent()?;
    let size = board.len();

    if is_opening_position(board, player) {
        let candidates: Vec<Position> = opening_candidates(size)
            .into_iter()
            .filter(|pos| board[pos.row][pos.col] == Mark::Empty)
            .collect();
        if let Some(&pos) = candidates.choose(&mut rand::rng()) {
            return Some(pos);
        }
    }

    let mut scratch = board.to_vec();

    // Forced defense is checked before the bot's own win.
    if let Some(pos) = immediate_win_cell(&mut scratch, opponent, win_streak) {
        return Some(pos);
    }
    if let Some(pos) = immediate_win_cell(&mut scratch, player, win_streak) {
        return Some(pos);
    }

    if let Some(pos) = strongest_threat_cell(&scratch, opponent, win_streak) {
        return Some(pos);
    }

    let max_depth = search_depth(size);
    let mut memo = HashMap::new();
    let result = evaluate_position(
        &mut scratch,
        player,
        player,
        0,
        max_depth,
        win_streak,
        &mut memo,
    );
    if let Some(pos) = result.best_move {
        return Some(pos);
    }

    let center = size / 2;
    if scratch[center][center] == Mark::Empty {
        return Some(Position::new(center, center));
    }
    first_empty(&scratch)
}

/// True while the board holds nothing but empties and the player's own marks.
fn is_opening_position(board: &[Vec<Mark>], player: Mark) -> bool {
    board
        .iter()
        .flatten()
        .all(|&cell| cell == Mark::Empty || cell == player)
}

/// Center, the four corners, and every non-corner edge cell.
fn opening_candidates(size: usize) -> Vec<Position> {
    let last = size - 1;
    let center = size / 2;

    let mut candidates = vec![
        Position::new(center, center),
        Position::new(0, 0),
        Position::new(0, last),
        Position::new(last, 0),
        Position::new(last, last),
    ];
    for i in 1..last {
        candidates.push(Position::new(0, i));
        candidates.push(Position::new(last, i));
        candidates.push(Position::new(i, 0));
        candidates.push(Position::new(i, last));
    }
    candidates
}

/// First empty cell in row-major order where placing `mark` wins outright.
fn immediate_win_cell(
    board: &mut [Vec<Mark>],
    mark: Mark,
    win_streak: usize,
) -> Option<Position> {
    let size = board.len();
    for row in 0..size {
        for col in 0..size {
            if board[row][col] != Mark::Empty {
                continue;
            }
            board[row][col] = mark;
            let wins = check_win_at(board, row, col, win_streak).is_some();
            board[row][col] = Mark::Empty;
            if wins {
                return Some(Position::new(row, col));
            }
        }
    }
    None
}

/// Highest-potential empty cell for `mark`, if that potential is within two
/// marks of a completed streak.
fn strongest_threat_cell(
    board: &[Vec<Mark>],
    mark: Mark,
    win_streak: usize,
) -> Option<Position> {
    let size = board.len();
    let mut best = None;
    let mut max_pattern = 0;

    for row in 0..size {
        for col in 0..size {
            if board[row][col] != Mark::Empty {
                continue;
            }
            let pattern = potential_win(board, row, col, mark, win_streak);
            if pattern > max_pattern {
                max_pattern = pattern;
                best = Some(Position::new(row, col));
            }
        }
    }

    if max_pattern >= win_streak.saturating_sub(2) {
        best
    } else {
        None
    }
}

/// Best-case completable count for `mark` anchored at (row, col): counts
/// same-mark cells reachable within the streak window in each direction, and
/// only scores directions whose marks plus empties could still complete a
/// streak. The anchor itself counts as one hypothetical mark.
fn potential_win(
    board: &[Vec<Mark>],
    row: usize,
    col: usize,
    mark: Mark,
    win_streak: usize,
) -> usize {
    let size = board.len() as isize;
    let mut max_count = 0;

    for (dr, dc) in DIRECTIONS {
        let mut count = 1;
        let mut empties = 0;

        for (step_r, step_c) in [(dr, dc), (-dr, -dc)] {
            for i in 1..win_streak as isize {
                let nr = row as isize + step_r * i;
                let nc = col as isize + step_c * i;
                if nr < 0 || nc < 0 || nr >= size || nc >= size {
                    break;
                }
                match board[nr as usize][nc as usize] {
                    cell if cell == mark => count += 1,
                    Mark::Empty => empties += 1,
                    _ => break,
                }
            }
        }

        if count + empties >= win_streak {
            max_count = max_count.max(count);
        }
    }

    max_count
}

fn search_depth(size: usize) -> usize {
    MAX_SEARCH_DEPTH.min((size * size).div_ceil(4))
}

fn first_empty(board: &[Vec<Mark>]) -> Option<Position> {
    for (row, cells) in board.iter().enumerate() {
        for (col, &cell) in cells.iter().enumerate() {
            if cell == Mark::Empty {
                return Some(Position::new(row, col));
            }
        }
    }
    None
}

#[derive(Clone)]
struct SearchResult {
    score: f64,
    best_move: Option<Position>,
}

/// Depth-bounded adversarial evaluation, bot maximizing. Repeated positions
/// are memoized under a canonical (board, side to move, depth) key; the map
/// lives for exactly one `find_move` call.
fn evaluate_position(
    board: &mut Vec<Vec<Mark>>,
    to_move: Mark,
    bot: Mark,
    depth: usize,
    max_depth: usize,
    win_streak: usize,
    memo: &mut HashMap<String, SearchResult>,
) -> SearchResult {
    let key = memo_key(board, to_move, depth);
    if let Some(cached) = memo.get(&key) {
        return cached.clone();
    }

    if depth >= max_depth {
        return SearchResult {
            score: 0.0,
            best_move: None,
        };
    }

    let opponent = to_move.opponent().unwrap();
    let maximizing = to_move == bot;
    let size = board.len();

    let mut best_score = if maximizing {
        f64::NEG_INFINITY
    } else {
        f64::INFINITY
    };
    let mut best_move = None;
    let mut has_empty = false;

    for row in 0..size {
        for col in 0..size {
            if board[row][col] != Mark::Empty {
                continue;
            }
            has_empty = true;

            board[row][col] = to_move;
            let own_pattern = potential_win(board, row, col, to_move, win_streak) as f64;
            let opponent_pattern = potential_win(board, row, col, opponent, win_streak) as f64;

            let score = if check_win_at(board, row, col, win_streak).is_some() {
                if maximizing { 1.0 } else { -1.0 }
            } else {
                evaluate_position(board, opponent, bot, depth + 1, max_depth, win_streak, memo)
                    .score
            };
            board[row][col] = Mark::Empty;

            // Bias toward moves that build own threats and deny the
            // opponent's, even when the horizon cuts the search off.
            let adjusted = if maximizing {
                score + own_pattern * PATTERN_BONUS - opponent_pattern * PATTERN_PENALTY
            } else {
                score - own_pattern * PATTERN_BONUS + opponent_pattern * PATTERN_PENALTY
            };

            if (maximizing && adjusted > best_score) || (!maximizing && adjusted < best_score) {
                best_score = adjusted;
                best_move = Some(Position::new(row, col));
            }
        }
    }

    let result = if has_empty {
        SearchResult {
            score: best_score,
            best_move,
        }
    } else {
        SearchResult {
            score: 0.0,
            best_move: None,
        }
    };
    memo.insert(key, result.clone());
    result
}

fn memo_key(board: &[Vec<Mark>], to_move: Mark, depth: usize) -> String {
    let size = board.len();
    let mut key = String::with_capacity(size * size + 8);
    for row in board {
        for cell in row {
            key.push(cell.as_char());
        }
    }
    key.push('|');
    key.push(to_move.as_char());
    key.push('|');
    key.push_str(&depth.to_string());
    key
}
