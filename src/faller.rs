//! Faller: the three stacked pieces under player control.
//!
//! A faller never borrows the grid. Every operation takes the [`Board`] and addresses the cells
//! it occupies by position, so the board stays the only owner of the grid.

use crate::board::{Board, Cell, COLUMNS, Position};
use crate::piece::Piece;
use rand::Rng;

/// Faller lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallerState {
    Falling,
    Landed,
    Frozen,
}

/// What a single [`Faller::fall`] step did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallOutcome {
    /// Dropped one row.
    Moved,
    /// Could not drop; now resting. The next fall freezes it.
    Landed,
    /// Committed to the board.
    Frozen,
    /// Committed while still reaching into the hidden rows. Terminal.
    GameOver,
    /// Already frozen; nothing happened.
    Unchanged,
}

/// Three pieces in one column, top to bottom.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Faller {
    /// [top, middle, bottom].
    pieces: [Piece; 3],
    column: usize,
    /// Row of the top piece; the faller spans `top_row..top_row + 3`.
    top_row: usize,
    state: FallerState,
}

/// Three new falling pieces.
pub fn random_pieces<R: Rng + ?Sized>(rng: &mut R) -> [Piece; 3] {
    [Piece::random(rng), Piece::random(rng), Piece::random(rng)]
}

impl Faller {
    /// Place `pieces` into the hidden rows of `column`. If that column's spawn rows are still
    /// taken, the faller spawns one column to the right (wrapping).
    pub fn insert(board: &mut Board, pieces: [Piece; 3], column: usize) -> Self {
        let mut column = column % COLUMNS;
        if !board.spawn_rows_clear(column) {
            column = (column + 1) % COLUMNS;
        }
        let faller = Self {
            pieces,
            column,
            top_row: 0,
            state: FallerState::Falling,
        };
        faller.write(board);
        faller
    }

    #[inline]
    pub fn column(&self) -> usize {
        self.column
    }

    #[inline]
    pub fn state(&self) -> FallerState {
        self.state
    }

    #[inline]
    pub fn is_frozen(&self) -> bool {
        self.state == FallerState::Frozen
    }

    /// [top, middle, bottom].
    pub fn pieces(&self) -> &[Piece; 3] {
        &self.pieces
    }

    /// Cells occupied, top to bottom.
    pub fn positions(&self) -> [Position; 3] {
        Self::positions_at(self.column, self.top_row)
    }

    fn positions_at(column: usize, top_row: usize) -> [Position; 3] {
        [
            Position::new(column, top_row),
            Position::new(column, top_row + 1),
            Position::new(column, top_row + 2),
        ]
    }

    /// True while any piece is in the hidden spawn rows.
    pub fn in_hidden_rows(&self) -> bool {
        self.positions().iter().any(|p| p.is_hidden())
    }

    fn write(&self, board: &mut Board) {
        for (pos, piece) in self.positions().into_iter().zip(self.pieces) {
            board.set(pos, Cell::Occupied(piece));
        }
    }

    fn clear(&self, board: &mut Board) {
        for pos in self.positions() {
            board.set(pos, Cell::Empty);
        }
    }

    /// Empty in-bounds cell directly under the bottom piece.
    fn space_below(&self, board: &Board) -> bool {
        Position::new(self.column, self.top_row + 2)
            .below()
            .is_some_and(|pos| board.is_empty(pos))
    }

    fn land(&mut self, board: &mut Board) {
        self.state = FallerState::Landed;
        self.pieces.iter_mut().for_each(Piece::land);
        self.write(board);
    }

    fn unland(&mut self, board: &mut Board) {
        self.state = FallerState::Falling;
        self.pieces.iter_mut().for_each(Piece::unland);
        self.write(board);
    }

    fn freeze(&mut self, board: &mut Board) {
        self.state = FallerState::Frozen;
        self.pieces.iter_mut().for_each(Piece::freeze);
        self.write(board);
    }

    /// One gravity step.
    ///
    /// A falling faller drops a row when the cell below is empty and lands otherwise. A landed
    /// faller freezes; if it still reaches into the hidden rows the freeze is applied and then
    /// reported as [`FallOutcome::GameOver`].
    pub fn fall(&mut self, board: &mut Board) -> FallOutcome {
        match self.state {
            FallerState::Frozen => FallOutcome::Unchanged,
            FallerState::Landed => {
                self.freeze(board);
                if self.in_hidden_rows() {
                    FallOutcome::GameOver
                } else {
                    FallOutcome::Frozen
                }
            }
            FallerState::Falling => {
                if self.space_below(board) {
                    board.set(Position::new(self.column, self.top_row), Cell::Empty);
                    self.top_row += 1;
                    self.write(board);
                    FallOutcome::Moved
                } else {
                    self.land(board);
                    FallOutcome::Landed
                }
            }
        }
    }

    /// Cycle the pieces: bottom goes on top, the others move down one. Cells stay the same.
    pub fn rotate(&mut self, board: &mut Board) {
        if self.is_frozen() {
            return;
        }
        self.pieces.rotate_right(1);
        self.write(board);
    }

    /// Move to `column` at the same rows. Ignored if the column is off the board, the faller is
    /// frozen, or any destination cell is taken. Returns true if the faller moved.
    pub fn move_to(&mut self, board: &mut Board, column: isize) -> bool {
        if self.is_frozen() {
            return false;
        }
        let Ok(column) = usize::try_from(column) else {
            return false;
        };
        if column >= COLUMNS || column == self.column {
            return false;
        }
        let target = Self::positions_at(column, self.top_row);
        if !target.iter().all(|&pos| board.is_empty(pos)) {
            return false;
        }
        self.clear(board);
        self.column = column;
        self.write(board);

        // The new column may have room below (un-land) or none (land right away).
        match self.state {
            FallerState::Landed if self.space_below(board) => self.unland(board),
            FallerState::Falling if !self.space_below(board) => self.land(board),
            _ => {}
        }
        true
    }

    /// Move `delta` columns sideways (negative is left).
    pub fn shift(&mut self, board: &mut Board, delta: isize) -> bool {
        self.move_to(board, self.column as isize + delta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{HIDDEN_ROWS, ROWS};
    use crate::piece::{Jewel, PieceState};

    fn trio(a: Jewel, b: Jewel, c: Jewel) -> [Piece; 3] {
        [Piece::new(a), Piece::new(b), Piece::new(c)]
    }

    fn rgb() -> [Piece; 3] {
        trio(Jewel::Red, Jewel::Green, Jewel::Blue)
    }

    fn frozen_at(board: &mut Board, col: usize, row: usize, jewel: Jewel) {
        let mut p = Piece::new(jewel);
        p.freeze();
        board.set(Position::new(col, row), Cell::Occupied(p));
    }

    fn drop_until_landed(faller: &mut Faller, board: &mut Board) -> usize {
        let mut moves = 0;
        while faller.fall(board) == FallOutcome::Moved {
            moves += 1;
        }
        moves
    }

    #[test]
    fn test_insert_into_hidden_rows() {
        let mut board = Board::new();
        let faller = Faller::insert(&mut board, rgb(), 2);
        assert_eq!(faller.column(), 2);
        assert_eq!(faller.positions()[0], Position::new(2, 0));
        assert_eq!(board.piece_at(Position::new(2, 0)).map(|p| p.jewel()), Some(Jewel::Red));
        assert_eq!(board.piece_at(Position::new(2, 2)).map(|p| p.jewel()), Some(Jewel::Blue));
        assert!(faller.in_hidden_rows());
    }

    #[test]
    fn test_insert_deflects_when_spawn_taken() {
        let mut board = Board::new();
        let first = Faller::insert(&mut board, rgb(), 5);
        assert_eq!(first.column(), 5);
        let second = Faller::insert(&mut board, rgb(), 5);
        assert_eq!(second.column(), 0);
    }

    #[test]
    fn test_fall_lands_then_freezes() {
        let mut board = Board::new();
        let mut faller = Faller::insert(&mut board, rgb(), 0);
        let moves = drop_until_landed(&mut faller, &mut board);
        assert_eq!(moves, ROWS - 3);
        assert_eq!(faller.state(), FallerState::Landed);
        assert_eq!(board.piece_at(Position::new(0, ROWS - 1)).map(|p| p.state()), Some(PieceState::Landed));
        assert_eq!(faller.fall(&mut board), FallOutcome::Frozen);
        for pos in faller.positions() {
            assert_eq!(board.piece_at(pos).map(|p| p.state()), Some(PieceState::Frozen));
        }
        assert!(board.is_empty(Position::new(0, 0)));
        assert_eq!(faller.fall(&mut board), FallOutcome::Unchanged);
    }

    #[test]
    fn test_lands_on_stack() {
        let mut board = Board::new();
        frozen_at(&mut board, 1, ROWS - 1, Jewel::White);
        let mut faller = Faller::insert(&mut board, rgb(), 1);
        let moves = drop_until_landed(&mut faller, &mut board);
        assert_eq!(moves, ROWS - 4);
        assert_eq!(faller.positions()[2], Position::new(1, ROWS - 2));
    }

    #[test]
    fn test_freeze_in_hidden_rows_is_game_over_once() {
        let mut board = Board::new();
        // fill column 3 up to the first visible row
        for row in HIDDEN_ROWS..ROWS {
            frozen_at(&mut board, 3, row, Jewel::Orange);
        }
        let mut faller = Faller::insert(&mut board, rgb(), 3);
        assert_eq!(faller.fall(&mut board), FallOutcome::Landed);
        assert_eq!(faller.fall(&mut board), FallOutcome::GameOver);
        for pos in faller.positions() {
            assert_eq!(board.piece_at(pos).map(|p| p.state()), Some(PieceState::Frozen));
        }
        assert_eq!(faller.fall(&mut board), FallOutcome::Unchanged);
    }

    #[test]
    fn test_freeze_with_one_piece_hidden_is_game_over() {
        let mut board = Board::new();
        for row in HIDDEN_ROWS + 2..ROWS {
            frozen_at(&mut board, 0, row, Jewel::Orange);
        }
        let mut faller = Faller::insert(&mut board, rgb(), 0);
        assert_eq!(faller.fall(&mut board), FallOutcome::Moved);
        assert_eq!(faller.fall(&mut board), FallOutcome::Moved);
        assert_eq!(faller.fall(&mut board), FallOutcome::Landed);
        // top piece still in row 2
        assert_eq!(faller.positions()[0].row, HIDDEN_ROWS - 1);
        assert_eq!(faller.fall(&mut board), FallOutcome::GameOver);
    }

    #[test]
    fn test_freeze_fully_visible_is_not_game_over() {
        let mut board = Board::new();
        for row in HIDDEN_ROWS + 3..ROWS {
            frozen_at(&mut board, 0, row, Jewel::Orange);
        }
        let mut faller = Faller::insert(&mut board, rgb(), 0);
        assert_eq!(drop_until_landed(&mut faller, &mut board), 3);
        assert_eq!(faller.fall(&mut board), FallOutcome::Frozen);
    }

    #[test]
    fn test_rotate_cycles_pieces() {
        let mut board = Board::new();
        let mut faller = Faller::insert(&mut board, rgb(), 0);
        faller.fall(&mut board);
        let positions = faller.positions();
        let original = *faller.pieces();

        faller.rotate(&mut board);
        let jewels: Vec<_> = faller.pieces().iter().map(|p| p.jewel()).collect();
        assert_eq!(jewels, vec![Jewel::Blue, Jewel::Red, Jewel::Green]);
        assert_eq!(board.piece_at(positions[0]).map(|p| p.jewel()), Some(Jewel::Blue));
        assert_eq!(faller.positions(), positions);

        faller.rotate(&mut board);
        faller.rotate(&mut board);
        assert_eq!(*faller.pieces(), original);
        for (pos, piece) in positions.iter().zip(original) {
            assert_eq!(board.piece_at(*pos), Some(piece));
        }
    }

    #[test]
    fn test_move_left_right() {
        let mut board = Board::new();
        let mut faller = Faller::insert(&mut board, rgb(), 2);
        faller.fall(&mut board);
        assert!(faller.shift(&mut board, 1));
        assert_eq!(faller.column(), 3);
        for row in 1..4 {
            assert!(board.is_empty(Position::new(2, row)));
            assert!(!board.is_empty(Position::new(3, row)));
        }
        assert!(faller.shift(&mut board, -1));
        assert_eq!(faller.column(), 2);
    }

    #[test]
    fn test_move_out_of_range_is_noop() {
        let mut board = Board::new();
        let mut faller = Faller::insert(&mut board, rgb(), 0);
        let before = board.clone();
        assert!(!faller.move_to(&mut board, -1));
        assert!(!faller.move_to(&mut board, COLUMNS as isize));
        assert_eq!(board, before);
        assert_eq!(faller.column(), 0);
    }

    #[test]
    fn test_move_blocked_is_noop() {
        let mut board = Board::new();
        for row in ROWS - 4..ROWS {
            frozen_at(&mut board, 1, row, Jewel::Yellow);
        }
        let mut faller = Faller::insert(&mut board, rgb(), 0);
        drop_until_landed(&mut faller, &mut board);
        let before = board.clone();
        assert!(!faller.shift(&mut board, 1));
        assert_eq!(board, before);
    }

    #[test]
    fn test_move_over_gap_unlands() {
        let mut board = Board::new();
        for row in ROWS - 3..ROWS {
            frozen_at(&mut board, 4, row, Jewel::Purple);
        }
        let mut faller = Faller::insert(&mut board, rgb(), 4);
        drop_until_landed(&mut faller, &mut board);
        assert_eq!(faller.state(), FallerState::Landed);
        assert!(faller.shift(&mut board, 1));
        assert_eq!(faller.state(), FallerState::Falling);
        for pos in faller.positions() {
            assert_eq!(board.piece_at(pos).map(|p| p.state()), Some(PieceState::Falling));
        }
        assert_eq!(faller.fall(&mut board), FallOutcome::Moved);
    }

    #[test]
    fn test_move_onto_support_lands() {
        let mut board = Board::new();
        frozen_at(&mut board, 2, HIDDEN_ROWS + 1, Jewel::Purple);
        let mut faller = Faller::insert(&mut board, rgb(), 3);
        faller.fall(&mut board);
        assert_eq!(faller.state(), FallerState::Falling);
        // bottom piece now at row 3, directly above the purple in column 2
        assert!(faller.shift(&mut board, -1));
        assert_eq!(faller.state(), FallerState::Landed);
    }

    #[test]
    fn test_frozen_faller_ignores_controls() {
        let mut board = Board::new();
        let mut faller = Faller::insert(&mut board, rgb(), 0);
        drop_until_landed(&mut faller, &mut board);
        faller.fall(&mut board);
        let before = board.clone();
        faller.rotate(&mut board);
        assert!(!faller.shift(&mut board, 1));
        assert_eq!(board, before);
    }
}
