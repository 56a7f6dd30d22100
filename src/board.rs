//! Board: the grid, run detection, deletion, gravity and score.

use crate::piece::Piece;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

pub const COLUMNS: usize = 6;
/// Rows the player sees.
pub const VISIBLE_ROWS: usize = 13;
/// Spawn buffer above the visible rows. A freeze in here ends the game.
pub const HIDDEN_ROWS: usize = 3;
pub const ROWS: usize = VISIBLE_ROWS + HIDDEN_ROWS;

/// Shortest run that clears.
pub const MIN_RUN: usize = 3;
pub const POINTS_PER_PIECE: u32 = 10;
pub const POINTS_PER_WILDCARD: u32 = 100;

/// (col, row) steps for the eight compass directions. Row grows downwards.
const DIRECTIONS_8: [(isize, isize); 8] = [
    (0, -1),
    (0, 1),
    (-1, 0),
    (1, 0),
    (-1, -1),
    (1, -1),
    (-1, 1),
    (1, 1),
];

/// Single cell: either empty or holding a piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Cell {
    #[default]
    Empty,
    Occupied(Piece),
}

impl Cell {
    #[inline]
    pub fn piece(self) -> Option<Piece> {
        match self {
            Self::Empty => None,
            Self::Occupied(p) => Some(p),
        }
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self == Self::Empty
    }
}

/// Grid coordinate. Column 0 is leftmost, row 0 is the top hidden row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Position {
    pub col: usize,
    pub row: usize,
}

impl Position {
    pub const fn new(col: usize, row: usize) -> Self {
        Self { col, row }
    }

    #[inline]
    pub fn is_hidden(self) -> bool {
        self.row < HIDDEN_ROWS
    }

    /// Neighbour one step away, or None past the grid edge.
    pub fn offset(self, dcol: isize, drow: isize) -> Option<Self> {
        let col = self.col.checked_add_signed(dcol)?;
        let row = self.row.checked_add_signed(drow)?;
        (col < COLUMNS && row < ROWS).then_some(Self { col, row })
    }

    #[inline]
    pub fn below(self) -> Option<Self> {
        self.offset(0, 1)
    }
}

/// Playfield: `grid[col][row]`, plus pending matches and score.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    grid: [[Cell; ROWS]; COLUMNS],
    /// Pieces marked matched and waiting for deletion. Keyed by position so a piece hit by
    /// several directions in one pass is recorded once.
    matched: BTreeMap<Position, Piece>,
    score: u32,
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    pub fn new() -> Self {
        Self {
            grid: [[Cell::Empty; ROWS]; COLUMNS],
            matched: BTreeMap::new(),
            score: 0,
        }
    }

    #[inline]
    pub fn get(&self, pos: Position) -> Option<Cell> {
        self.grid.get(pos.col).and_then(|col| col.get(pos.row)).copied()
    }

    /// Write a cell. Out-of-bounds writes are ignored.
    #[inline]
    pub fn set(&mut self, pos: Position, cell: Cell) {
        if let Some(slot) = self.grid.get_mut(pos.col).and_then(|col| col.get_mut(pos.row)) {
            *slot = cell;
        }
    }

    #[inline]
    pub fn piece_at(&self, pos: Position) -> Option<Piece> {
        self.get(pos).and_then(Cell::piece)
    }

    /// True only for in-bounds empty cells.
    #[inline]
    pub fn is_empty(&self, pos: Position) -> bool {
        self.get(pos) == Some(Cell::Empty)
    }

    /// True if the three hidden rows of `col` are free for a new faller.
    pub fn spawn_rows_clear(&self, col: usize) -> bool {
        (0..HIDDEN_ROWS).all(|row| self.is_empty(Position::new(col, row)))
    }

    /// True if any piece sits in the hidden rows.
    pub fn has_hidden_pieces(&self) -> bool {
        self.grid
            .iter()
            .any(|col| col[..HIDDEN_ROWS].iter().any(|c| !c.is_empty()))
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    /// Full grid, indexed `[col][row]`.
    pub fn cells(&self) -> &[[Cell; ROWS]; COLUMNS] {
        &self.grid
    }

    /// Positions currently waiting for deletion, in column/row order.
    pub fn matched_positions(&self) -> impl Iterator<Item = Position> + '_ {
        self.matched.keys().copied()
    }

    pub fn has_pending_matches(&self) -> bool {
        !self.matched.is_empty()
    }

    /// Search every occupied cell in all eight directions and mark runs of [`MIN_RUN`] or more.
    /// Returns true if any piece is waiting for deletion.
    pub fn find_matches(&mut self) -> bool {
        for col in 0..COLUMNS {
            for row in 0..ROWS {
                let origin = Position::new(col, row);
                if self.piece_at(origin).is_none() {
                    continue;
                }
                for (dcol, drow) in DIRECTIONS_8 {
                    self.search_direction(origin, dcol, drow);
                }
            }
        }
        self.has_pending_matches()
    }

    /// Walk from `origin` in one direction collecting the run that starts there.
    ///
    /// The run's kind is the anchor's, or the first standard piece met when the anchor is a
    /// wildcard. Wildcards always extend the run. The walk stops at the grid edge, an empty cell
    /// or a standard piece of another kind.
    fn search_direction(&mut self, origin: Position, dcol: isize, drow: isize) {
        let Some(anchor) = self.piece_at(origin) else {
            return;
        };
        // first standard piece of the run; None while only wildcards have been seen
        let mut kind = (!anchor.is_wildcard()).then_some(anchor);
        let mut run = vec![origin];
        let mut pos = origin;
        while let Some(next) = pos.offset(dcol, drow) {
            let Some(piece) = self.piece_at(next) else {
                break;
            };
            if !piece.is_wildcard() {
                match kind {
                    None => kind = Some(piece),
                    Some(k) if k.same_kind(&piece) => {}
                    Some(_) => break,
                }
            }
            run.push(next);
            pos = next;
        }
        if run.len() < MIN_RUN {
            return;
        }
        for pos in run {
            if let Some(mut piece) = self.piece_at(pos) {
                piece.mark_matched();
                self.set(pos, Cell::Occupied(piece));
                self.matched.insert(pos, piece);
            }
        }
    }

    /// Empty every matched cell and credit its points. Returns false if nothing was pending.
    pub fn delete_matched_pieces(&mut self) -> bool {
        if self.matched.is_empty() {
            return false;
        }
        let matched = std::mem::take(&mut self.matched);
        for (pos, piece) in matched {
            self.set(pos, Cell::Empty);
            self.score += piece.points();
        }
        true
    }

    /// Visible occupied cells with an empty cell directly below.
    /// Hidden rows are skipped: a piece frozen up there has already ended the game.
    fn floaters(&self) -> Vec<Position> {
        let mut out = Vec::new();
        for col in 0..COLUMNS {
            for row in HIDDEN_ROWS..ROWS {
                let pos = Position::new(col, row);
                if self.piece_at(pos).is_none() {
                    continue;
                }
                if pos.below().is_some_and(|b| self.is_empty(b)) {
                    out.push(pos);
                }
            }
        }
        out
    }

    /// Drop floating pieces one row per pass until nothing floats.
    /// Each pass moves every floater found by the same scan, so no piece falls twice in a pass.
    /// Returns true if anything moved.
    pub fn apply_gravity(&mut self) -> bool {
        let mut moved = false;
        let mut floaters = self.floaters();
        while !floaters.is_empty() {
            for pos in floaters {
                let cell = self.get(pos).unwrap_or_default();
                if let Some(below) = pos.below() {
                    self.set(pos, Cell::Empty);
                    self.set(below, cell);
                }
            }
            moved = true;
            floaters = self.floaters();
        }
        moved
    }

    /// Delete pending matches and settle the board. Returns true if anything was deleted;
    /// the caller should then search for matches again.
    pub fn handle_match_process(&mut self) -> bool {
        if !self.delete_matched_pieces() {
            return false;
        }
        self.apply_gravity();
        true
    }
}

fn write_rows(f: &mut fmt::Formatter<'_>, board: &Board, rows: std::ops::Range<usize>) -> fmt::Result {
    for row in rows {
        f.write_str("|")?;
        for col in 0..COLUMNS {
            match board.piece_at(Position::new(col, row)) {
                Some(p) => write!(f, "{p}")?,
                None => f.write_str("   ")?,
            }
        }
        f.write_str("|\n")?;
    }
    writeln!(f, " {} ", "-".repeat(3 * COLUMNS))
}

/// Text view: visible rows between walls with a dashed floor. `{:#}` prints the hidden rows first.
impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            writeln!(f, " {} ", "-".repeat(3 * COLUMNS))?;
            write_rows(f, self, 0..HIDDEN_ROWS)?;
        }
        write_rows(f, self, HIDDEN_ROWS..ROWS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::piece::{Jewel, PieceState};

    fn frozen(jewel: Jewel) -> Cell {
        let mut p = Piece::new(jewel);
        p.freeze();
        Cell::Occupied(p)
    }

    fn put(board: &mut Board, col: usize, row: usize, jewel: Jewel) {
        board.set(Position::new(col, row), frozen(jewel));
    }

    fn state_at(board: &Board, col: usize, row: usize) -> Option<PieceState> {
        board.piece_at(Position::new(col, row)).map(|p| p.state())
    }

    #[test]
    fn test_new_board_empty() {
        let board = Board::new();
        for col in 0..COLUMNS {
            for row in 0..ROWS {
                assert!(board.is_empty(Position::new(col, row)));
            }
        }
        assert_eq!(board.score(), 0);
        assert!(!board.has_hidden_pieces());
    }

    #[test]
    fn test_out_of_bounds() {
        let mut board = Board::new();
        assert_eq!(board.get(Position::new(COLUMNS, 0)), None);
        assert_eq!(board.get(Position::new(0, ROWS)), None);
        assert!(!board.is_empty(Position::new(0, ROWS)));
        board.set(Position::new(COLUMNS, 0), frozen(Jewel::Red));
        assert_eq!(board, Board::new());
        assert_eq!(Position::new(0, 0).offset(-1, 0), None);
        assert_eq!(Position::new(0, ROWS - 1).below(), None);
    }

    #[test]
    fn test_horizontal_three_matches_and_scores_thirty() {
        let mut board = Board::new();
        for col in 1..4 {
            put(&mut board, col, ROWS - 1, Jewel::Red);
        }
        assert!(board.find_matches());
        for col in 1..4 {
            assert_eq!(state_at(&board, col, ROWS - 1), Some(PieceState::Matched));
        }
        assert_eq!(board.matched_positions().count(), 3);
        assert!(board.delete_matched_pieces());
        assert_eq!(board.score(), 30);
        for col in 1..4 {
            assert!(board.is_empty(Position::new(col, ROWS - 1)));
        }
        assert!(!board.apply_gravity());
        assert!(!board.delete_matched_pieces());
    }

    #[test]
    fn test_two_do_not_match() {
        let mut board = Board::new();
        put(&mut board, 0, ROWS - 1, Jewel::Blue);
        put(&mut board, 1, ROWS - 1, Jewel::Blue);
        put(&mut board, 2, ROWS - 1, Jewel::Green);
        assert!(!board.find_matches());
        assert_eq!(state_at(&board, 0, ROWS - 1), Some(PieceState::Frozen));
    }

    #[test]
    fn test_wildcard_completes_run() {
        let mut board = Board::new();
        put(&mut board, 0, ROWS - 1, Jewel::Blue);
        put(&mut board, 1, ROWS - 1, Jewel::Golden);
        put(&mut board, 2, ROWS - 1, Jewel::Blue);
        assert!(board.find_matches());
        assert!(board.delete_matched_pieces());
        assert_eq!(board.score(), 10 + 100 + 10);
    }

    #[test]
    fn test_wildcard_at_run_end_matches() {
        let mut board = Board::new();
        put(&mut board, 3, ROWS - 1, Jewel::Yellow);
        put(&mut board, 3, ROWS - 2, Jewel::Yellow);
        put(&mut board, 3, ROWS - 3, Jewel::Golden);
        assert!(board.find_matches());
        assert_eq!(board.matched_positions().count(), 3);
    }

    #[test]
    fn test_leading_wildcard_takes_next_kind() {
        let mut board = Board::new();
        put(&mut board, 0, ROWS - 1, Jewel::Golden);
        put(&mut board, 1, ROWS - 1, Jewel::Red);
        put(&mut board, 2, ROWS - 1, Jewel::Red);
        put(&mut board, 3, ROWS - 1, Jewel::Blue);
        assert!(board.find_matches());
        assert_eq!(board.matched_positions().count(), 3);
        assert_eq!(state_at(&board, 3, ROWS - 1), Some(PieceState::Frozen));
        board.delete_matched_pieces();
        assert_eq!(board.score(), 100 + 10 + 10);
    }

    #[test]
    fn test_three_wildcards_match() {
        let mut board = Board::new();
        for col in 2..5 {
            put(&mut board, col, ROWS - 1, Jewel::Golden);
        }
        assert!(board.find_matches());
        assert_eq!(board.matched_positions().count(), 3);
        board.delete_matched_pieces();
        assert_eq!(board.score(), 300);
    }

    #[test]
    fn test_wildcard_does_not_bridge_different_kinds() {
        let mut board = Board::new();
        put(&mut board, 0, ROWS - 1, Jewel::Red);
        put(&mut board, 1, ROWS - 1, Jewel::Golden);
        put(&mut board, 2, ROWS - 1, Jewel::Green);
        assert!(!board.find_matches());
    }

    #[test]
    fn test_diagonal_run() {
        let mut board = Board::new();
        // staircase supported from below so the layout is realistic
        put(&mut board, 0, ROWS - 1, Jewel::Purple);
        put(&mut board, 1, ROWS - 1, Jewel::White);
        put(&mut board, 1, ROWS - 2, Jewel::Purple);
        put(&mut board, 2, ROWS - 1, Jewel::Orange);
        put(&mut board, 2, ROWS - 2, Jewel::White);
        put(&mut board, 2, ROWS - 3, Jewel::Purple);
        assert!(board.find_matches());
        let matched: Vec<_> = board.matched_positions().collect();
        assert_eq!(
            matched,
            vec![
                Position::new(0, ROWS - 1),
                Position::new(1, ROWS - 2),
                Position::new(2, ROWS - 3),
            ]
        );
    }

    #[test]
    fn test_overlapping_runs_score_each_piece_once() {
        let mut board = Board::new();
        // an L of five reds: the corner belongs to a row run and a column run
        for col in 0..3 {
            put(&mut board, col, ROWS - 1, Jewel::Red);
        }
        put(&mut board, 0, ROWS - 2, Jewel::Red);
        put(&mut board, 0, ROWS - 3, Jewel::Red);
        assert!(board.find_matches());
        assert_eq!(board.matched_positions().count(), 5);
        board.delete_matched_pieces();
        assert_eq!(board.score(), 50);
    }

    #[test]
    fn test_repeated_find_does_not_duplicate() {
        let mut board = Board::new();
        for col in 0..4 {
            put(&mut board, col, ROWS - 1, Jewel::Green);
        }
        assert!(board.find_matches());
        assert!(board.find_matches());
        assert_eq!(board.matched_positions().count(), 4);
        board.delete_matched_pieces();
        assert_eq!(board.score(), 40);
    }

    #[test]
    fn test_gravity_collapses_gaps() {
        let mut board = Board::new();
        put(&mut board, 2, ROWS - 1, Jewel::Red);
        put(&mut board, 2, ROWS - 4, Jewel::Blue);
        put(&mut board, 2, ROWS - 5, Jewel::Green);
        put(&mut board, 4, HIDDEN_ROWS, Jewel::White);
        assert!(board.apply_gravity());
        assert_eq!(board.piece_at(Position::new(2, ROWS - 1)).map(|p| p.jewel()), Some(Jewel::Red));
        assert_eq!(board.piece_at(Position::new(2, ROWS - 2)).map(|p| p.jewel()), Some(Jewel::Blue));
        assert_eq!(board.piece_at(Position::new(2, ROWS - 3)).map(|p| p.jewel()), Some(Jewel::Green));
        assert_eq!(board.piece_at(Position::new(4, ROWS - 1)).map(|p| p.jewel()), Some(Jewel::White));
        for col in 0..COLUMNS {
            for row in HIDDEN_ROWS..ROWS - 1 {
                let pos = Position::new(col, row);
                if board.piece_at(pos).is_some() {
                    assert!(!board.is_empty(Position::new(col, row + 1)), "floater at {pos:?}");
                }
            }
        }
        assert!(!board.apply_gravity());
    }

    #[test]
    fn test_clear_then_gravity_cascades() {
        let mut board = Board::new();
        // bottom row G G G R R with a red and a blue resting on the middle greens
        for col in 0..3 {
            put(&mut board, col, ROWS - 1, Jewel::Green);
        }
        put(&mut board, 1, ROWS - 2, Jewel::Red);
        put(&mut board, 2, ROWS - 2, Jewel::Blue);
        put(&mut board, 3, ROWS - 1, Jewel::Red);
        put(&mut board, 4, ROWS - 1, Jewel::Red);
        assert!(board.find_matches());
        assert!(board.handle_match_process());
        assert_eq!(board.score(), 30);
        assert_eq!(board.piece_at(Position::new(1, ROWS - 1)).map(|p| p.jewel()), Some(Jewel::Red));
        assert_eq!(board.piece_at(Position::new(2, ROWS - 1)).map(|p| p.jewel()), Some(Jewel::Blue));
        // the fallen red does not line up with 3,4 because blue sits between
        assert!(!board.find_matches());
        assert!(!board.handle_match_process());
    }

    #[test]
    fn test_spawn_rows_and_hidden_pieces() {
        let mut board = Board::new();
        assert!(board.spawn_rows_clear(0));
        put(&mut board, 0, 2, Jewel::Red);
        assert!(!board.spawn_rows_clear(0));
        assert!(board.spawn_rows_clear(1));
        assert!(board.has_hidden_pieces());
    }

    #[test]
    fn test_display() {
        let mut board = Board::new();
        put(&mut board, 0, ROWS - 1, Jewel::Red);
        let text = board.to_string();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), VISIBLE_ROWS + 1);
        assert_eq!(lines[VISIBLE_ROWS - 1], "| R                |");
        assert_eq!(lines[VISIBLE_ROWS], " ------------------ ");
        assert_eq!(format!("{board:#}").lines().count(), VISIBLE_ROWS + HIDDEN_ROWS + 3);
    }
}
