//! Game state: board, active faller, phase sequencing and the display snapshot.
//!
//! One call to [`Game::tick`] or [`Game::apply`] performs exactly one transition. Phases run in
//! a fixed order: a faller drops until it freezes, then the board alternates between searching
//! for runs and clearing them (with gravity) until a search comes back empty, then the next
//! faller spawns.

use crate::board::{Board, COLUMNS, Cell, ROWS};
use crate::faller::{FallOutcome, Faller, random_pieces};
use crate::piece::Piece;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

/// Discrete player command from a front-end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    MoveLeft,
    MoveRight,
    Rotate,
    /// Manual fall step.
    SoftDrop,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EndReason {
    /// A faller froze while reaching into the hidden rows.
    GameOver,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Phase {
    /// A faller is under player control.
    Falling,
    /// Next step searches the board for runs.
    Matching,
    /// Matched pieces are on display; next step deletes them and applies gravity.
    Clearing,
    Ended(EndReason),
}

/// Noteworthy result of a step, for front-ends to report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Spawned { column: usize },
    Landed,
    Frozen,
    Matched { pieces: usize },
    Cleared { points: u32 },
    GameOver { score: u32 },
    Quit { score: u32 },
}

/// Read-only view of the game for rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    /// `cells[col][row]`, hidden rows included.
    pub cells: [[Cell; ROWS]; COLUMNS],
    pub score: u32,
    pub phase: Phase,
    pub game_over: bool,
    /// Pieces of the next faller, top to bottom.
    pub next: [Piece; 3],
}

#[derive(Debug)]
pub struct Game<R: Rng = StdRng> {
    board: Board,
    faller: Option<Faller>,
    next: [Piece; 3],
    phase: Phase,
    rng: R,
}

impl Game<StdRng> {
    /// New game. A seed makes the piece stream reproducible.
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };
        Self::with_rng(rng)
    }
}

impl<R: Rng> Game<R> {
    /// New game drawing pieces and spawn columns from `rng`. The first faller is spawned.
    pub fn with_rng(mut rng: R) -> Self {
        let next = random_pieces(&mut rng);
        let mut game = Self {
            board: Board::new(),
            faller: None,
            next,
            phase: Phase::Matching,
            rng,
        };
        game.spawn_next();
        game
    }

    /// Start from a prepared board. The board phase runs first, so existing runs clear before
    /// the first faller appears.
    pub fn with_board(board: Board, mut rng: R) -> Self {
        let next = random_pieces(&mut rng);
        Self {
            board,
            faller: None,
            next,
            phase: Phase::Matching,
            rng,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn faller(&self) -> Option<&Faller> {
        self.faller.as_ref()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn score(&self) -> u32 {
        self.board.score()
    }

    pub fn next_pieces(&self) -> &[Piece; 3] {
        &self.next
    }

    pub fn is_over(&self) -> bool {
        matches!(self.phase, Phase::Ended(_))
    }

    /// True only for the loss condition, not for quitting.
    pub fn is_game_over(&self) -> bool {
        self.phase == Phase::Ended(EndReason::GameOver)
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            cells: *self.board.cells(),
            score: self.score(),
            phase: self.phase,
            game_over: self.is_game_over(),
            next: self.next,
        }
    }

    fn spawn_next(&mut self) -> Event {
        let pieces = std::mem::replace(&mut self.next, random_pieces(&mut self.rng));
        let column = self.rng.gen_range(0..COLUMNS);
        let faller = Faller::insert(&mut self.board, pieces, column);
        let column = faller.column();
        self.faller = Some(faller);
        self.phase = Phase::Falling;
        Event::Spawned { column }
    }

    fn fall_step(&mut self) -> Option<Event> {
        let faller = self.faller.as_mut()?;
        match faller.fall(&mut self.board) {
            FallOutcome::Moved | FallOutcome::Unchanged => None,
            FallOutcome::Landed => Some(Event::Landed),
            FallOutcome::Frozen => {
                self.faller = None;
                self.phase = Phase::Matching;
                Some(Event::Frozen)
            }
            FallOutcome::GameOver => {
                debug_assert!(self.board.has_hidden_pieces());
                self.faller = None;
                self.phase = Phase::Ended(EndReason::GameOver);
                Some(Event::GameOver { score: self.score() })
            }
        }
    }

    /// Advance one step: the automatic fall while a faller is active, otherwise the next
    /// board-phase step. Does nothing once the game has ended.
    pub fn tick(&mut self) -> Option<Event> {
        match self.phase {
            Phase::Falling => self.fall_step(),
            Phase::Matching => {
                if self.board.find_matches() {
                    self.phase = Phase::Clearing;
                    Some(Event::Matched {
                        pieces: self.board.matched_positions().count(),
                    })
                } else {
                    Some(self.spawn_next())
                }
            }
            Phase::Clearing => {
                let before = self.score();
                self.board.handle_match_process();
                self.phase = Phase::Matching;
                Some(Event::Cleared {
                    points: self.score() - before,
                })
            }
            Phase::Ended(_) => None,
        }
    }

    /// Apply a player command. Anything that makes no sense right now is ignored.
    pub fn apply(&mut self, command: Command) -> Option<Event> {
        if self.is_over() {
            return None;
        }
        if command == Command::Quit {
            self.faller = None;
            self.phase = Phase::Ended(EndReason::Quit);
            return Some(Event::Quit { score: self.score() });
        }
        if self.phase != Phase::Falling {
            return None;
        }
        match command {
            Command::MoveLeft => {
                let faller = self.faller.as_mut()?;
                faller.shift(&mut self.board, -1);
                None
            }
            Command::MoveRight => {
                let faller = self.faller.as_mut()?;
                faller.shift(&mut self.board, 1);
                None
            }
            Command::Rotate => {
                let faller = self.faller.as_mut()?;
                faller.rotate(&mut self.board);
                None
            }
            Command::SoftDrop => self.fall_step(),
            Command::Quit => None,
        }
    }

    /// Run board-phase steps until a faller is active or the game ends.
    pub fn settle(&mut self) -> Vec<Event> {
        let mut events = Vec::new();
        while matches!(self.phase, Phase::Matching | Phase::Clearing) {
            events.extend(self.tick());
        }
        events
    }
}
