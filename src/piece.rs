//! Jewels: the single-cell pieces a faller is built from.

use rand::Rng;
use serde::Serialize;
use std::fmt;

/// Chance that a freshly created piece is the golden wildcard.
pub const GOLDEN_CHANCE: f64 = 0.05;

/// Jewel kinds. Seven standard kinds plus the golden wildcard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Jewel {
    Red,
    Orange,
    Yellow,
    Green,
    Blue,
    Purple,
    White,
    Golden,
}

impl Jewel {
    pub const STANDARD: [Self; 7] = [
        Self::Red,
        Self::Orange,
        Self::Yellow,
        Self::Green,
        Self::Blue,
        Self::Purple,
        Self::White,
    ];

    /// Golden with probability [`GOLDEN_CHANCE`], otherwise a uniformly chosen standard kind.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        if rng.gen_bool(GOLDEN_CHANCE) {
            Self::Golden
        } else {
            Self::STANDARD[rng.gen_range(0..Self::STANDARD.len())]
        }
    }

    #[inline]
    pub fn is_golden(self) -> bool {
        self == Self::Golden
    }

    /// Single-letter glyph used by the text views.
    pub fn glyph(self) -> char {
        match self {
            Self::Red => 'R',
            Self::Orange => 'O',
            Self::Yellow => 'Y',
            Self::Green => 'G',
            Self::Blue => 'B',
            Self::Purple => 'P',
            Self::White => 'W',
            Self::Golden => '$',
        }
    }

    /// Colour index 0..8 for theme.jewel_color().
    pub fn color_index(self) -> u8 {
        match self {
            Self::Red => 0,
            Self::Orange => 1,
            Self::Yellow => 2,
            Self::Green => 3,
            Self::Blue => 4,
            Self::Purple => 5,
            Self::White => 6,
            Self::Golden => 7,
        }
    }
}

/// Lifecycle of a piece. Falling ⇄ Landed → Frozen → Matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PieceState {
    /// Part of a faller that can still drop.
    Falling,
    /// Resting on an obstruction; one more fall tick freezes it.
    Landed,
    /// Committed to the board and eligible for matching.
    Frozen,
    /// Part of a run; removed on the next deletion pass.
    Matched,
}

/// A single grid occupant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Piece {
    jewel: Jewel,
    state: PieceState,
}

impl Piece {
    pub fn new(jewel: Jewel) -> Self {
        Self {
            jewel,
            state: PieceState::Falling,
        }
    }

    /// New falling piece with a randomly chosen jewel.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::new(Jewel::random(rng))
    }

    /// Stable identity used when matching runs.
    #[inline]
    pub fn jewel(&self) -> Jewel {
        self.jewel
    }

    #[inline]
    pub fn state(&self) -> PieceState {
        self.state
    }

    #[inline]
    pub fn is_wildcard(&self) -> bool {
        self.jewel.is_golden()
    }

    /// True for two standard pieces of the same kind. A wildcard is never the same kind as
    /// anything; run search lets wildcards join any run before asking.
    pub fn same_kind(&self, other: &Self) -> bool {
        !self.is_wildcard() && !other.is_wildcard() && self.jewel == other.jewel
    }

    pub fn land(&mut self) {
        self.state = PieceState::Landed;
    }

    pub fn unland(&mut self) {
        self.state = PieceState::Falling;
    }

    pub fn freeze(&mut self) {
        self.state = PieceState::Frozen;
    }

    pub fn mark_matched(&mut self) {
        self.state = PieceState::Matched;
    }

    /// Points credited when this piece is cleared.
    pub fn points(&self) -> u32 {
        if self.is_wildcard() {
            crate::board::POINTS_PER_WILDCARD
        } else {
            crate::board::POINTS_PER_PIECE
        }
    }
}

/// Three-character sticker: `[X]` falling, `|X|` landed, ` X ` frozen, `*X*` matched.
impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (open, close) = match self.state {
            PieceState::Falling => ('[', ']'),
            PieceState::Landed => ('|', '|'),
            PieceState::Frozen => (' ', ' '),
            PieceState::Matched => ('*', '*'),
        };
        write!(f, "{}{}{}", open, self.jewel.glyph(), close)
    }
}
