//! Movement geometry per piece kind and tier.
//!
//! Vectors are `(d_row, d_col)` in Player One's frame: negative `d_row`
//! points toward Player Two. Tiers are cumulative, so an evolved piece keeps
//! its base vectors and gains the evolved ones:
//!
//! ```text
//! base     = L1
//! evolved  = L1 + L2
//! mastered = L1 + L2 + L3
//! ```
//!
//! Long reach is expressed as long vectors with `max_steps = 1`; only the
//! mastered tier of the lower-ranked kinds may jump.

use serde::{Deserialize, Serialize};

use crate::PieceKind;

/// A `(d_row, d_col)` displacement in Player One's frame.
pub type Offset = (i8, i8);

/// Movement tier, derived from the height of the stack a piece stands on.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Base,
    Evolved,
    Mastered,
}

impl Tier {
    /// Tier for a stack height. Heights above three are treated as mastered.
    #[inline]
    pub fn from_height(height: usize) -> Tier {
        match height {
            0 | 1 => Tier::Base,
            2 => Tier::Evolved,
            _ => Tier::Mastered,
        }
    }
}

/// One tier's movement rule.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct TierRule {
    /// Vector layers; the tier's vector set is their union.
    pub moves: &'static [&'static [Offset]],
    /// How many multiples of each vector may be traversed.
    pub max_steps: u8,
    /// Whether the piece continues past occupied squares.
    pub can_jump: bool,
    /// Whether Player Two mirrors the row component.
    pub directional: bool,
}

impl TierRule {
    /// All vectors of this tier, in Player One's frame.
    pub fn vectors(&self) -> impl Iterator<Item = Offset> + '_ {
        self.moves.iter().flat_map(|layer| layer.iter().copied())
    }
}

/// The tier table of one piece kind. Missing tiers fall back to `base`.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct PieceRules {
    pub base: TierRule,
    pub evolved: Option<TierRule>,
    pub mastered: Option<TierRule>,
}

impl PieceRules {
    /// Rule for a tier, falling back to `base` when the tier is undefined.
    pub fn rule(&self, tier: Tier) -> &TierRule {
        let defined = match tier {
            Tier::Base => None,
            Tier::Evolved => self.evolved.as_ref(),
            Tier::Mastered => self.mastered.as_ref(),
        };
        defined.unwrap_or(&self.base)
    }

    /// Rule for a piece standing on a stack of `height`.
    #[inline]
    pub fn for_height(&self, height: usize) -> &TierRule {
        self.rule(Tier::from_height(height))
    }
}

impl PieceKind {
    /// This kind's tier table.
    #[inline]
    pub fn rules(self) -> &'static PieceRules {
        rules(self)
    }
}

// ============================================================================
// VECTOR LAYERS
// ============================================================================

const KING_L1: &[Offset] = &[(-1, -1), (-1, 0), (-1, 1), (0, -1), (0, 1), (1, -1), (1, 0), (1, 1)];
const KING_L2: &[Offset] = &[(-2, -2), (-2, 0), (-2, 2), (0, -2), (0, 2), (2, -2), (2, 0), (2, 2)];
const KING_L3: &[Offset] = &[(-3, -3), (-3, 0), (-3, 3), (0, -3), (0, 3), (3, -3), (3, 0), (3, 3)];

const GENERAL_L1: &[Offset] = &[(-1, -1), (-1, 1), (1, -1), (1, 1)];
const GENERAL_L2: &[Offset] = &[(-2, -2), (-2, 2), (2, -2), (2, 2)];
const GENERAL_L3: &[Offset] = &[(-3, -3), (-3, 3), (3, -3), (3, 3)];

const LIEUTENANT_L1: &[Offset] = &[(-1, 0), (0, -1), (0, 1), (1, 0)];
const LIEUTENANT_L2: &[Offset] = &[(-2, 0), (0, -2), (0, 2), (2, 0)];
const LIEUTENANT_L3: &[Offset] = &[(-3, 0), (0, -3), (0, 3), (3, 0)];

const MAJOR_L1: &[Offset] = &[(-1, -1), (-1, 0), (-1, 1), (0, -1), (0, 1), (1, 0)];
const MAJOR_L2: &[Offset] = &[(-2, -2), (-2, 0), (-2, 2), (0, -2), (0, 2), (2, 0)];
const MAJOR_L3: &[Offset] = &[(-3, -3), (-3, 0), (-3, 3), (0, -3), (0, 3), (3, 0)];

const SAMURAI_L1: &[Offset] = &[(-1, -1), (-1, 0), (-1, 1), (1, 0)];
const SAMURAI_L2: &[Offset] = &[(-2, -2), (-2, 0), (-2, 2), (2, 0)];
const SAMURAI_L3: &[Offset] = &[(-3, -3), (-3, 0), (-3, 3), (3, 0)];

const SPEAR_L1: &[Offset] = &[(-2, 0), (-1, -1), (-1, 0), (-1, 1), (1, 0)];
const SPEAR_L2: &[Offset] = &[(-3, 0), (-2, -2), (-2, 2), (2, 0)];
const SPEAR_L3: &[Offset] = &[(-4, 0), (-3, -3), (-3, 3), (3, 0)];

const KNIGHT_L1: &[Offset] = &[(-2, 0), (-1, 0), (0, -1), (0, 1), (1, 0), (2, 0)];
const KNIGHT_L2: &[Offset] = &[(-3, 0), (0, -2), (0, 2), (3, 0)];
const KNIGHT_L3: &[Offset] = &[(-4, 0), (0, -3), (0, 3), (4, 0)];

const SHINOBI_L1: &[Offset] = &[
    (-2, -2),
    (-2, 2),
    (-1, -1),
    (-1, 1),
    (1, -1),
    (1, 1),
    (2, -2),
    (2, 2),
];
const SHINOBI_L2: &[Offset] = &[(-3, -3), (-3, 3), (3, -3), (3, 3)];
const SHINOBI_L3: &[Offset] = &[(-4, -4), (-4, 4), (4, -4), (4, 4)];

const FORT_L1: &[Offset] = &[(-1, 0), (0, -1), (0, 1), (1, -1), (1, 1)];
const FORT_L2: &[Offset] = &[(-2, 0), (0, -2), (0, 2), (2, -2), (2, 2)];
const FORT_L3: &[Offset] = &[(-3, 0), (0, -3), (0, 3), (3, -3), (3, 3)];

const PAWN_L1: &[Offset] = &[(-1, 0), (1, 0)];
const PAWN_L2: &[Offset] = &[(-2, 0), (2, 0)];
const PAWN_L3: &[Offset] = &[(-3, 0), (3, 0)];

const CANON_L1: &[Offset] = &[(-3, 0), (0, -1), (0, 1), (1, 0)];
const CANON_L2: &[Offset] = &[(-4, 0), (0, -2), (0, 2), (2, 0)];
const CANON_L3: &[Offset] = &[(-5, 0), (0, -3), (0, 3), (3, 0)];

const ARCHER_L1: &[Offset] = &[(-2, -1), (-2, 0), (-2, 1), (1, 0)];
const ARCHER_L2: &[Offset] = &[(-3, -2), (-3, 0), (-3, 2), (2, 0)];
const ARCHER_L3: &[Offset] = &[(-4, -3), (-4, 0), (-4, 3), (3, 0)];

const TUBE_L1: &[Offset] = &[(-2, 0), (1, -1), (1, 1)];
const TUBE_L2: &[Offset] = &[(-2, 0), (2, -2), (2, 2)];
const TUBE_L3: &[Offset] = &[(-4, 0), (3, -3), (3, 3)];

const COMMANDER_L1: &[Offset] = &[(-1, -1), (-1, 1), (1, 0)];
const COMMANDER_L2: &[Offset] = &[(-2, -2), (-2, 2), (2, 0)];
const COMMANDER_L3: &[Offset] = &[(-3, -3), (-3, 3), (3, 0)];

// ============================================================================
// TIER TABLES
// ============================================================================

macro_rules! tiers {
    ($l1:ident, $l2:ident, $l3:ident, directional: $dir:expr, mastered_jumps: $jump:expr) => {
        PieceRules {
            base: TierRule {
                moves: &[$l1],
                max_steps: 1,
                can_jump: false,
                directional: $dir,
            },
            evolved: Some(TierRule {
                moves: &[$l1, $l2],
                max_steps: 1,
                can_jump: false,
                directional: $dir,
            }),
            mastered: Some(TierRule {
                moves: &[$l1, $l2, $l3],
                max_steps: 1,
                can_jump: $jump,
                directional: $dir,
            }),
        }
    };
}

const KING: PieceRules = tiers!(KING_L1, KING_L2, KING_L3, directional: false, mastered_jumps: false);
const GENERAL: PieceRules =
    tiers!(GENERAL_L1, GENERAL_L2, GENERAL_L3, directional: false, mastered_jumps: false);
const LIEUTENANT: PieceRules =
    tiers!(LIEUTENANT_L1, LIEUTENANT_L2, LIEUTENANT_L3, directional: false, mastered_jumps: false);
const MAJOR: PieceRules = tiers!(MAJOR_L1, MAJOR_L2, MAJOR_L3, directional: true, mastered_jumps: false);
const SAMURAI: PieceRules =
    tiers!(SAMURAI_L1, SAMURAI_L2, SAMURAI_L3, directional: true, mastered_jumps: false);
const SPEAR: PieceRules = tiers!(SPEAR_L1, SPEAR_L2, SPEAR_L3, directional: true, mastered_jumps: false);
const KNIGHT: PieceRules =
    tiers!(KNIGHT_L1, KNIGHT_L2, KNIGHT_L3, directional: false, mastered_jumps: true);
const SHINOBI: PieceRules =
    tiers!(SHINOBI_L1, SHINOBI_L2, SHINOBI_L3, directional: false, mastered_jumps: true);
const FORT: PieceRules = tiers!(FORT_L1, FORT_L2, FORT_L3, directional: true, mastered_jumps: true);
const PAWN: PieceRules = tiers!(PAWN_L1, PAWN_L2, PAWN_L3, directional: false, mastered_jumps: true);
const CANON: PieceRules = tiers!(CANON_L1, CANON_L2, CANON_L3, directional: true, mastered_jumps: true);
const ARCHER: PieceRules = tiers!(ARCHER_L1, ARCHER_L2, ARCHER_L3, directional: true, mastered_jumps: true);
const TUBE: PieceRules = tiers!(TUBE_L1, TUBE_L2, TUBE_L3, directional: true, mastered_jumps: true);
const COMMANDER: PieceRules =
    tiers!(COMMANDER_L1, COMMANDER_L2, COMMANDER_L3, directional: true, mastered_jumps: true);

/// Look up the tier table for a piece kind.
pub fn rules(kind: PieceKind) -> &'static PieceRules {
    match kind {
        PieceKind::King => &KING,
        PieceKind::General => &GENERAL,
        PieceKind::Lieutenant => &LIEUTENANT,
        PieceKind::Major => &MAJOR,
        PieceKind::Samurai => &SAMURAI,
        PieceKind::Spear => &SPEAR,
        PieceKind::Knight => &KNIGHT,
        PieceKind::Shinobi => &SHINOBI,
        PieceKind::Fort => &FORT,
        PieceKind::Pawn => &PAWN,
        PieceKind::Canon => &CANON,
        PieceKind::Archer => &ARCHER,
        PieceKind::Tube => &TUBE,
        PieceKind::Commander => &COMMANDER,
    }
}
