//! Columnstui: Columns-style falling-jewel matching puzzle.
//!
//! The rules live here; the terminal front-ends in the binary only send [`Command`]s and draw
//! [`Snapshot`]s.

pub mod board;
pub mod faller;
pub mod game;
pub mod piece;

pub use board::{Board, Cell, Position};
pub use faller::{FallOutcome, Faller, FallerState};
pub use game::{Command, EndReason, Event, Game, Phase, Snapshot};
pub use piece::{Jewel, Piece, PieceState};
