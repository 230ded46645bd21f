//! Legal destination generation.
//!
//! One generic routine expands a [`TierRule`] from an origin square:
//!
//! 1. Mirror the row component for Player Two when the rule is directional.
//! 2. Walk `1..=max_steps` multiples of each vector, stopping at the board edge.
//! 3. Stop a vector once origin height + destination height would exceed three.
//! 4. Skip (but still collide with) a square topped by the mover's own king.
//! 5. Non-jumping rules stop a vector at the first occupied square.
//!
//! Occupancy of the destination (empty, own, opponent) is resolved later,
//! when the move is committed.

use tracing::trace;

use crate::board::Board;
use crate::catalog::TierRule;
use crate::{Piece, Player, Pos, MAX_STACK};

/// Legal destinations for `piece` standing on `from`, moved by `mover`.
///
/// The tier is taken from the height of the origin stack before the move.
/// Result is sorted and free of duplicates.
pub fn legal_moves(board: &Board, piece: &Piece, from: Pos, mover: Player) -> Vec<Pos> {
    let height = board.height(from);
    let rule = piece.kind.rules().for_height(height);
    let moves = destinations_for_rule(board, rule, from, mover);
    trace!(kind = ?piece.kind, %from, height, count = moves.len(), "generated destinations");
    moves
}

/// Expand an arbitrary tier rule from `from`.
pub fn destinations_for_rule(board: &Board, rule: &TierRule, from: Pos, mover: Player) -> Vec<Pos> {
    let origin_height = board.height(from);
    let mut moves = Vec::with_capacity(32);

    for (d_row, d_col) in rule.vectors() {
        let d_row = if rule.directional && mover == Player::Two {
            -d_row
        } else {
            d_row
        };

        for step in 1..=rule.max_steps as i16 {
            let Some(to) = from.offset(d_row as i16 * step, d_col as i16 * step) else {
                break;
            };

            let target = board.stack(to);
            if origin_height + target.len() > MAX_STACK {
                break;
            }

            let own_king = target
                .top()
                .is_some_and(|top| top.owner == mover && top.kind.is_king());
            if !own_king {
                moves.push(to);
            }

            if !target.is_empty() && !rule.can_jump {
                break;
            }
        }
    }

    moves.sort_unstable();
    moves.dedup();
    moves
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Offset;
    use crate::{PieceId, PieceKind};

    fn piece(id: u32, kind: PieceKind, owner: Player) -> Piece {
        Piece::new(PieceId(id), kind, owner)
    }

    fn at(row: u8, col: u8) -> Pos {
        Pos::from_row_col(row, col)
    }

    const ROOK_LIKE: &[Offset] = &[(-1, 0), (1, 0), (0, -1), (0, 1)];

    fn slider(can_jump: bool) -> TierRule {
        TierRule {
            moves: &[ROOK_LIKE],
            max_steps: 8,
            can_jump,
            directional: false,
        }
    }

    #[test]
    fn test_king_in_open_center() {
        let mut board = Board::new();
        let king = piece(1, PieceKind::King, Player::One);
        board.push_piece(at(4, 4), king).unwrap();

        let moves = legal_moves(&board, &king, at(4, 4), Player::One);
        assert_eq!(moves.len(), 8);
        assert!(moves.contains(&at(3, 3)));
        assert!(moves.contains(&at(5, 5)));
    }

    #[test]
    fn test_corner_stays_on_board() {
        let mut board = Board::new();
        let king = piece(1, PieceKind::King, Player::One);
        board.push_piece(at(0, 0), king).unwrap();

        let moves = legal_moves(&board, &king, at(0, 0), Player::One);
        assert_eq!(moves, vec![at(0, 1), at(1, 0), at(1, 1)]);
    }

    #[test]
    fn test_directional_piece_mirrors_for_player_two() {
        let mut board = Board::new();
        let spear_one = piece(1, PieceKind::Spear, Player::One);
        let spear_two = piece(2, PieceKind::Spear, Player::Two);
        board.push_piece(at(4, 2), spear_one).unwrap();
        board.push_piece(at(4, 6), spear_two).unwrap();

        let one = legal_moves(&board, &spear_one, at(4, 2), Player::One);
        let two = legal_moves(&board, &spear_two, at(4, 6), Player::Two);

        // Two squares forward is row 2 for Player One, row 6 for Player Two.
        assert!(one.contains(&at(2, 2)));
        assert!(!one.contains(&at(6, 2)));
        assert!(two.contains(&at(6, 6)));
        assert!(!two.contains(&at(2, 6)));
    }

    #[test]
    fn test_own_king_is_never_a_destination() {
        let mut board = Board::new();
        let general = piece(1, PieceKind::General, Player::One);
        board.push_piece(at(4, 4), general).unwrap();
        board.push_piece(at(3, 3), piece(2, PieceKind::King, Player::One)).unwrap();
        board.push_piece(at(3, 5), piece(3, PieceKind::King, Player::Two)).unwrap();

        let moves = legal_moves(&board, &general, at(4, 4), Player::One);
        assert!(!moves.contains(&at(3, 3)));
        assert!(moves.contains(&at(3, 5)));
    }

    #[test]
    fn test_height_cap_blocks_destination() {
        let mut board = Board::new();
        let origin = at(4, 4);
        board.push_piece(origin, piece(1, PieceKind::Pawn, Player::One)).unwrap();
        let lieutenant = piece(2, PieceKind::Lieutenant, Player::One);
        board.push_piece(origin, lieutenant).unwrap();

        // 2 + 2 > 3: blocked; 2 + 1 = 3: allowed.
        board.push_piece(at(3, 4), piece(3, PieceKind::Pawn, Player::Two)).unwrap();
        board.push_piece(at(3, 4), piece(4, PieceKind::Pawn, Player::Two)).unwrap();
        board.push_piece(at(5, 4), piece(5, PieceKind::Pawn, Player::Two)).unwrap();

        let moves = legal_moves(&board, &lieutenant, origin, Player::One);
        assert!(!moves.contains(&at(3, 4)));
        assert!(moves.contains(&at(5, 4)));
    }

    #[test]
    fn test_evolved_tier_used_at_height_two() {
        let mut board = Board::new();
        let origin = at(4, 4);
        board.push_piece(origin, piece(1, PieceKind::Pawn, Player::One)).unwrap();
        let general = piece(2, PieceKind::General, Player::One);
        board.push_piece(origin, general).unwrap();

        let moves = legal_moves(&board, &general, origin, Player::One);
        assert_eq!(moves.len(), 8);
        assert!(moves.contains(&at(2, 2)));
        assert!(moves.contains(&at(6, 6)));
    }

    #[test]
    fn test_non_jumping_slider_stops_at_blocker() {
        let mut board = Board::new();
        let origin = at(4, 4);
        board.push_piece(origin, piece(1, PieceKind::Lieutenant, Player::One)).unwrap();
        board.push_piece(at(2, 4), piece(2, PieceKind::Pawn, Player::Two)).unwrap();

        let moves = destinations_for_rule(&board, &slider(false), origin, Player::One);
        assert!(moves.contains(&at(3, 4)));
        assert!(moves.contains(&at(2, 4)));
        assert!(!moves.contains(&at(1, 4)));
        assert!(!moves.contains(&at(0, 4)));
        // Unobstructed directions run to the edge.
        assert!(moves.contains(&at(8, 4)));
        assert!(moves.contains(&at(4, 0)));
        assert!(moves.contains(&at(4, 8)));
    }

    #[test]
    fn test_jumping_slider_passes_blocker() {
        let mut board = Board::new();
        let origin = at(4, 4);
        board.push_piece(origin, piece(1, PieceKind::Lieutenant, Player::One)).unwrap();
        board.push_piece(at(2, 4), piece(2, PieceKind::Pawn, Player::Two)).unwrap();

        let moves = destinations_for_rule(&board, &slider(true), origin, Player::One);
        assert!(moves.contains(&at(1, 4)));
        assert!(moves.contains(&at(0, 4)));
    }

    #[test]
    fn test_own_king_still_blocks_slider() {
        let mut board = Board::new();
        let origin = at(4, 4);
        board.push_piece(origin, piece(1, PieceKind::Lieutenant, Player::One)).unwrap();
        board.push_piece(at(4, 6), piece(2, PieceKind::King, Player::One)).unwrap();

        let moves = destinations_for_rule(&board, &slider(false), origin, Player::One);
        assert!(moves.contains(&at(4, 5)));
        assert!(!moves.contains(&at(4, 6)));
        assert!(!moves.contains(&at(4, 7)));
    }

    #[test]
    fn test_destinations_are_distinct() {
        let mut board = Board::new();
        let origin = at(4, 4);
        let tube = piece(1, PieceKind::Tube, Player::One);
        board.push_piece(at(4, 4), piece(9, PieceKind::Pawn, Player::One)).unwrap();
        board.push_piece(origin, tube).unwrap();

        // Evolved tube lists (-2, 0) in two layers.
        let moves = legal_moves(&board, &tube, origin, Player::One);
        let mut deduped = moves.clone();
        deduped.dedup();
        assert_eq!(moves, deduped);
        assert_eq!(moves.iter().filter(|&&p| p == at(2, 4)).count(), 1);
    }
}
