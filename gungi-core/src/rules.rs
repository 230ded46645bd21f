//! Variant configuration and the starting setup.

use serde::{Deserialize, Serialize};

use crate::{PieceKind, Player, Pos, BOARD_SIZE};

/// Which starting position to use.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Setup {
    /// Fixed opening layout plus a ten-piece reserve.
    #[default]
    Standard,
    /// Empty board; the whole complement (king included) starts in reserve.
    PlacementOnly,
}

/// Variant knobs.
#[derive(Clone, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Ruleset {
    pub setup: Setup,
    /// Non-king pieces removed by a capture join the capturer's reserve.
    pub captures_to_reserve: bool,
    /// Reserve pieces may not be placed ahead of the mover's frontline row.
    pub enforce_frontline: bool,
}

impl Default for Ruleset {
    fn default() -> Self {
        Ruleset {
            setup: Setup::Standard,
            captures_to_reserve: false,
            enforce_frontline: true,
        }
    }
}

/// Player One's half of the standard layout as (row, col, kind).
/// Player Two's half is the point mirror through the board center.
const STANDARD_LAYOUT: [(u8, u8, PieceKind); 15] = [
    (6, 0, PieceKind::Pawn),
    (6, 2, PieceKind::Fort),
    (6, 3, PieceKind::Samurai),
    (6, 4, PieceKind::Pawn),
    (6, 5, PieceKind::Samurai),
    (6, 6, PieceKind::Fort),
    (6, 8, PieceKind::Pawn),
    (7, 1, PieceKind::Shinobi),
    (7, 2, PieceKind::Archer),
    (7, 4, PieceKind::Spear),
    (7, 6, PieceKind::Archer),
    (7, 7, PieceKind::Knight),
    (8, 3, PieceKind::General),
    (8, 4, PieceKind::King),
    (8, 5, PieceKind::Lieutenant),
];

/// Each player's reserve in the standard setup.
const STANDARD_RESERVE: [PieceKind; 10] = [
    PieceKind::Major,
    PieceKind::Major,
    PieceKind::Spear,
    PieceKind::Spear,
    PieceKind::Knight,
    PieceKind::Shinobi,
    PieceKind::Pawn,
    PieceKind::Canon,
    PieceKind::Tube,
    PieceKind::Commander,
];

impl Ruleset {
    /// Parse a ruleset from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Ruleset, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Pieces on the board at game start, Player One first.
    pub fn initial_layout(&self) -> Vec<(Pos, PieceKind, Player)> {
        match self.setup {
            Setup::PlacementOnly => Vec::new(),
            Setup::Standard => {
                let last = BOARD_SIZE - 1;
                let one = STANDARD_LAYOUT
                    .iter()
                    .map(|&(row, col, kind)| (Pos::from_row_col(row, col), kind, Player::One));
                let two = STANDARD_LAYOUT.iter().map(move |&(row, col, kind)| {
                    (Pos::from_row_col(last - row, last - col), kind, Player::Two)
                });
                one.chain(two).collect()
            }
        }
    }

    /// A player's reserve at game start (identical for both players).
    pub fn initial_reserve(&self) -> Vec<PieceKind> {
        match self.setup {
            Setup::Standard => STANDARD_RESERVE.to_vec(),
            Setup::PlacementOnly => {
                let mut reserve: Vec<PieceKind> = STANDARD_LAYOUT.iter().map(|&(_, _, kind)| kind).collect();
                // King first so it is easy to find in the hand.
                reserve.sort_by_key(|&kind| !kind.is_king());
                reserve.extend_from_slice(&STANDARD_RESERVE);
                reserve
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_ruleset() {
        let rules = Ruleset::default();
        assert_eq!(rules.setup, Setup::Standard);
        assert!(!rules.captures_to_reserve);
        assert!(rules.enforce_frontline);
    }

    #[test]
    fn test_from_json_partial() {
        let rules = Ruleset::from_json(r#"{"captures_to_reserve": true}"#).unwrap();
        assert!(rules.captures_to_reserve);
        assert!(rules.enforce_frontline);
        assert_eq!(rules.setup, Setup::Standard);

        let rules = Ruleset::from_json(r#"{"setup": "placement_only"}"#).unwrap();
        assert_eq!(rules.setup, Setup::PlacementOnly);
    }

    #[test]
    fn test_from_json_rejects_unknown_fields() {
        assert!(Ruleset::from_json(r#"{"time_control": 60}"#).is_err());
    }

    #[test]
    fn test_standard_layout_is_point_symmetric() {
        let layout = Ruleset::default().initial_layout();
        assert_eq!(layout.len(), 30);

        for &(pos, kind, owner) in &layout {
            let mirror = Pos::from_row_col(8 - pos.row(), 8 - pos.col());
            assert!(layout
                .iter()
                .any(|&(p, k, o)| p == mirror && k == kind && o == owner.opponent()));
        }
    }

    #[test]
    fn test_standard_layout_kings() {
        let layout = Ruleset::default().initial_layout();
        let kings: Vec<_> = layout.iter().filter(|(_, k, _)| k.is_king()).collect();
        assert_eq!(kings.len(), 2);
        assert!(kings.contains(&&(Pos::from_row_col(8, 4), PieceKind::King, Player::One)));
        assert!(kings.contains(&&(Pos::from_row_col(0, 4), PieceKind::King, Player::Two)));
    }

    #[test]
    fn test_placement_only_reserve_holds_everything() {
        let rules = Ruleset {
            setup: Setup::PlacementOnly,
            ..Ruleset::default()
        };
        assert!(rules.initial_layout().is_empty());

        let reserve = rules.initial_reserve();
        assert_eq!(reserve.len(), 25);
        assert_eq!(reserve[0], PieceKind::King);
        assert_eq!(reserve.iter().filter(|k| k.is_king()).count(), 1);
    }
}
