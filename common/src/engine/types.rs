use super::board::Mark;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

/// The exact cells completing a win, sorted by (row, col).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WinningLine {
    pub mark: Mark,
    pub cells: Vec<Position>,
}

impl WinningLine {
    pub fn new(mark: Mark, mut cells: Vec<Position>) -> Self {
        cells.sort();
        Self { mark, cells }
    }
}
