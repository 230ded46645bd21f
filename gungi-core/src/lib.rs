//! Gungi rules engine: a 9×9 board where up to three pieces share a square.
//!
//! # Board Layout
//!
//! ```text
//!        col 0 1 2 3 4 5 6 7 8
//!   row 0    . . . 中 帥 大 . . .    <- Player 2 back edge
//!   row 1    . 馬 弓 . 槍 . 弓 忍 .
//!   row 2    兵 . 砦 侍 兵 侍 砦 . 兵
//!   ...
//!   row 6    兵 . 砦 侍 兵 侍 砦 . 兵
//!   row 7    . 忍 弓 . 槍 . 弓 馬 .
//!   row 8    . . . 大 帥 中 . . .    <- Player 1 back edge
//! ```
//!
//! Square indices are row-major: `index = row * 9 + col`.
//!
//! # Stacks and Tiers
//!
//! Each square holds a bottom-to-top stack of at most [`MAX_STACK`] pieces.
//! Only the top piece can move or be targeted. A piece's movement tier is
//! derived from the height of the stack it stands on:
//!
//! ```text
//! height 1 -> base
//! height 2 -> evolved  (falls back to base)
//! height 3 -> mastered (falls back to base)
//! ```
//!
//! All state transitions live on [`GameState`] and are pure: they borrow the
//! current state and return the next one, or a [`GungiError`] leaving the
//! original untouched.

pub mod board;
pub mod catalog;
pub mod error;
pub mod game;
pub mod movegen;
pub mod rules;

#[cfg(feature = "wasm")]
pub mod wasm;

use serde::{Deserialize, Serialize};

pub use board::{Board, Stack};
pub use catalog::{Offset, PieceRules, Tier, TierRule};
pub use error::{GungiError, MoveError, PlacementError, Result, SnapshotError};
pub use game::{Action, GameState, Phase, Resolution};
pub use movegen::{destinations_for_rule, legal_moves};
pub use rules::{Ruleset, Setup};

/// Board edge length.
pub const BOARD_SIZE: u8 = 9;

/// Number of squares on the board.
pub const SQUARES: usize = (BOARD_SIZE as usize) * (BOARD_SIZE as usize);

/// Maximum number of pieces on one square.
pub const MAX_STACK: usize = 3;

/// Player identifier.
///
/// Player One starts at the bottom (row 8) and moves toward row 0.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Player {
    One = 1,
    Two = 2,
}

impl Player {
    /// Get the opponent player.
    #[inline]
    pub fn opponent(self) -> Player {
        match self {
            Player::One => Player::Two,
            Player::Two => Player::One,
        }
    }

    /// Convert from u8 (1 or 2) to Player.
    #[inline]
    pub fn from_bits(bits: u8) -> Option<Player> {
        match bits {
            1 => Some(Player::One),
            2 => Some(Player::Two),
            _ => None,
        }
    }

    /// Index into per-player arrays (0 or 1).
    #[inline]
    pub fn index(self) -> usize {
        self as usize - 1
    }
}

/// Position on the 9x9 board (0-80), row-major.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8")]
pub struct Pos(pub u8);

impl TryFrom<u8> for Pos {
    type Error = SnapshotError;

    fn try_from(index: u8) -> std::result::Result<Pos, SnapshotError> {
        let pos = Pos(index);
        if pos.is_valid() {
            Ok(pos)
        } else {
            Err(SnapshotError::OffBoard(index))
        }
    }
}

impl Pos {
    /// Create a position from row and column, or None if off the board.
    #[inline]
    pub fn new(row: u8, col: u8) -> Option<Pos> {
        if row < BOARD_SIZE && col < BOARD_SIZE {
            Some(Pos(row * BOARD_SIZE + col))
        } else {
            None
        }
    }

    /// Create a position from row and column (0-8 each).
    #[inline]
    pub const fn from_row_col(row: u8, col: u8) -> Pos {
        debug_assert!(row < BOARD_SIZE && col < BOARD_SIZE);
        Pos(row * BOARD_SIZE + col)
    }

    /// Get the row (0-8).
    #[inline]
    pub fn row(self) -> u8 {
        self.0 / BOARD_SIZE
    }

    /// Get the column (0-8).
    #[inline]
    pub fn col(self) -> u8 {
        self.0 % BOARD_SIZE
    }

    /// Check if this is a valid position (0-80).
    #[inline]
    pub fn is_valid(self) -> bool {
        (self.0 as usize) < SQUARES
    }

    /// Shift by a signed (row, col) delta, or None if that leaves the board.
    #[inline]
    pub fn offset(self, d_row: i16, d_col: i16) -> Option<Pos> {
        let row = self.row() as i16 + d_row;
        let col = self.col() as i16 + d_col;
        if (0..BOARD_SIZE as i16).contains(&row) && (0..BOARD_SIZE as i16).contains(&col) {
            Some(Pos::from_row_col(row as u8, col as u8))
        } else {
            None
        }
    }

    /// Iterate over all 81 positions.
    pub fn all() -> impl Iterator<Item = Pos> {
        (0..SQUARES as u8).map(Pos)
    }
}

impl std::fmt::Display for Pos {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({},{})", self.row(), self.col())
    }
}

/// The fourteen piece kinds.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PieceKind {
    King,
    General,
    Lieutenant,
    Major,
    Samurai,
    Spear,
    Knight,
    Shinobi,
    Fort,
    Pawn,
    Canon,
    Archer,
    Tube,
    Commander,
}

impl PieceKind {
    pub const ALL: [PieceKind; 14] = [
        PieceKind::King,
        PieceKind::General,
        PieceKind::Lieutenant,
        PieceKind::Major,
        PieceKind::Samurai,
        PieceKind::Spear,
        PieceKind::Knight,
        PieceKind::Shinobi,
        PieceKind::Fort,
        PieceKind::Pawn,
        PieceKind::Canon,
        PieceKind::Archer,
        PieceKind::Tube,
        PieceKind::Commander,
    ];

    /// Display label (kanji).
    pub fn label(self) -> char {
        match self {
            PieceKind::King => '帥',
            PieceKind::General => '大',
            PieceKind::Lieutenant => '中',
            PieceKind::Major => '小',
            PieceKind::Samurai => '侍',
            PieceKind::Spear => '槍',
            PieceKind::Knight => '馬',
            PieceKind::Shinobi => '忍',
            PieceKind::Fort => '砦',
            PieceKind::Pawn => '兵',
            PieceKind::Canon => '砲',
            PieceKind::Archer => '弓',
            PieceKind::Tube => '筒',
            PieceKind::Commander => '謀',
        }
    }

    #[inline]
    pub fn is_king(self) -> bool {
        self == PieceKind::King
    }
}

/// Unique piece identity within one game.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PieceId(pub u32);

/// A piece on the board. Immutable once created.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
pub struct Piece {
    pub id: PieceId,
    pub kind: PieceKind,
    pub owner: Player,
}

impl Piece {
    #[inline]
    pub fn new(id: PieceId, kind: PieceKind, owner: Player) -> Piece {
        Piece { id, kind, owner }
    }

    /// Display label of this piece's kind.
    #[inline]
    pub fn label(&self) -> char {
        self.kind.label()
    }
}
