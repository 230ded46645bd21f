//! The 9x9 grid of ordered stacks.
//!
//! All mutation goes through [`Board::push_piece`], [`Board::pop_top`] and
//! [`Board::capture_into`], which keep every stack within [`MAX_STACK`].

use serde::{Deserialize, Serialize};

use crate::error::{GungiError, Result, SnapshotError};
use crate::{Piece, PieceKind, Player, Pos, BOARD_SIZE, MAX_STACK, SQUARES};

/// Pieces on one square, bottom to top.
#[derive(Clone, PartialEq, Eq, Debug, Default, Hash, Serialize, Deserialize)]
#[serde(try_from = "StackRepr")]
pub struct Stack {
    pieces: Vec<Piece>,
}

#[derive(Deserialize)]
struct StackRepr {
    pieces: Vec<Piece>,
}

impl TryFrom<StackRepr> for Stack {
    type Error = SnapshotError;

    fn try_from(repr: StackRepr) -> std::result::Result<Stack, SnapshotError> {
        if repr.pieces.len() > MAX_STACK {
            return Err(SnapshotError::StackTooTall(repr.pieces.len()));
        }
        Ok(Stack { pieces: repr.pieces })
    }
}

impl Stack {
    #[inline]
    pub fn len(&self) -> usize {
        self.pieces.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pieces.is_empty()
    }

    /// The active (top) piece, if any.
    #[inline]
    pub fn top(&self) -> Option<&Piece> {
        self.pieces.last()
    }

    /// Pieces bottom to top.
    #[inline]
    pub fn pieces(&self) -> &[Piece] {
        &self.pieces
    }

    /// Check if any piece in the stack belongs to `player`.
    pub fn has_owner(&self, player: Player) -> bool {
        self.pieces.iter().any(|p| p.owner == player)
    }
}

/// Board state: 81 stacks, indexed by [`Pos`].
#[derive(Clone, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
#[serde(try_from = "BoardRepr")]
pub struct Board {
    squares: Vec<Stack>,
}

#[derive(Deserialize)]
struct BoardRepr {
    squares: Vec<Stack>,
}

impl TryFrom<BoardRepr> for Board {
    type Error = SnapshotError;

    fn try_from(repr: BoardRepr) -> std::result::Result<Board, SnapshotError> {
        if repr.squares.len() != SQUARES {
            return Err(SnapshotError::SquareCount(repr.squares.len()));
        }
        Ok(Board { squares: repr.squares })
    }
}

impl Board {
    /// Create an empty board.
    pub fn new() -> Board {
        Board {
            squares: vec![Stack::default(); SQUARES],
        }
    }

    /// Get the stack at a position.
    #[inline]
    pub fn stack(&self, pos: Pos) -> &Stack {
        &self.squares[pos.0 as usize]
    }

    /// Get the top (active) piece at a position.
    #[inline]
    pub fn top_piece(&self, pos: Pos) -> Option<&Piece> {
        self.stack(pos).top()
    }

    /// Number of pieces at a position.
    #[inline]
    pub fn height(&self, pos: Pos) -> usize {
        self.stack(pos).len()
    }

    #[inline]
    pub fn is_empty(&self, pos: Pos) -> bool {
        self.stack(pos).is_empty()
    }

    // ========== Piece Operations ==========

    /// Push a piece onto a square. The piece becomes the top.
    ///
    /// Fails with `StackOverflow` if the square already holds three pieces.
    pub fn push_piece(&mut self, pos: Pos, piece: Piece) -> Result<()> {
        let stack = &mut self.squares[pos.0 as usize];
        if stack.pieces.len() >= MAX_STACK {
            return Err(GungiError::StackOverflow);
        }
        stack.pieces.push(piece);
        Ok(())
    }

    /// Remove and return the top piece of a square.
    ///
    /// Fails with `EmptyStack` if the square is empty.
    pub fn pop_top(&mut self, pos: Pos) -> Result<Piece> {
        self.squares[pos.0 as usize]
            .pieces
            .pop()
            .ok_or(GungiError::EmptyStack)
    }

    /// Replace a square's whole stack with a single piece.
    /// Returns the discarded pieces, bottom to top.
    pub fn capture_into(&mut self, pos: Pos, piece: Piece) -> Vec<Piece> {
        let stack = &mut self.squares[pos.0 as usize];
        std::mem::replace(&mut stack.pieces, vec![piece])
    }

    // ========== Queries ==========

    /// Iterate over every piece on the board with its position, bottom to top per square.
    pub fn pieces(&self) -> impl Iterator<Item = (Pos, &Piece)> + '_ {
        Pos::all().flat_map(move |pos| self.stack(pos).pieces().iter().map(move |p| (pos, p)))
    }

    /// Check if `player` has a king anywhere on the board (buried or not).
    pub fn has_king(&self, player: Player) -> bool {
        self.pieces()
            .any(|(_, p)| p.owner == player && p.kind == PieceKind::King)
    }

    /// A player's most advanced occupied row, counting any piece in a stack.
    ///
    /// Minimum row for Player One, maximum row for Player Two.
    /// Returns None if the player has nothing on the board.
    pub fn frontline_row(&self, player: Player) -> Option<u8> {
        let rows = Pos::all()
            .filter(|&pos| self.stack(pos).has_owner(player))
            .map(|pos| pos.row());
        match player {
            Player::One => rows.min(),
            Player::Two => rows.max(),
        }
    }

    /// Total number of pieces on the board.
    pub fn piece_count(&self) -> usize {
        self.squares.iter().map(Stack::len).sum()
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

/// Text grid: each square shows the top label, the owner (1/2) and the stack height.
impl std::fmt::Display for Board {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "  ")?;
        for col in 0..BOARD_SIZE {
            write!(f, "  {}  ", col)?;
        }
        writeln!(f)?;
        for row in 0..BOARD_SIZE {
            write!(f, "{} ", row)?;
            for col in 0..BOARD_SIZE {
                let stack = self.stack(Pos::from_row_col(row, col));
                match stack.top() {
                    Some(top) => write!(f, " {}{}{}", top.label(), top.owner as u8, stack.len())?,
                    None => write!(f, "  .  ")?,
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PieceId;

    fn piece(id: u32, kind: PieceKind, owner: Player) -> Piece {
        Piece::new(PieceId(id), kind, owner)
    }

    #[test]
    fn test_board_new_is_empty() {
        let board = Board::new();
        for pos in Pos::all() {
            assert!(board.is_empty(pos));
            assert_eq!(board.top_piece(pos), None);
            assert_eq!(board.height(pos), 0);
        }
        assert_eq!(board.piece_count(), 0);
    }

    #[test]
    fn test_push_and_top() {
        let mut board = Board::new();
        let pos = Pos::from_row_col(4, 4);

        board.push_piece(pos, piece(1, PieceKind::Pawn, Player::One)).unwrap();
        board.push_piece(pos, piece(2, PieceKind::Spear, Player::Two)).unwrap();

        assert_eq!(board.height(pos), 2);
        assert_eq!(board.top_piece(pos).unwrap().kind, PieceKind::Spear);
        assert_eq!(board.stack(pos).pieces()[0].kind, PieceKind::Pawn);
    }

    #[test]
    fn test_push_overflow() {
        let mut board = Board::new();
        let pos = Pos::from_row_col(0, 0);
        for id in 0..3 {
            board.push_piece(pos, piece(id, PieceKind::Pawn, Player::One)).unwrap();
        }

        let result = board.push_piece(pos, piece(9, PieceKind::Pawn, Player::One));
        assert_eq!(result, Err(GungiError::StackOverflow));
        assert_eq!(board.height(pos), 3);
    }

    #[test]
    fn test_pop_top() {
        let mut board = Board::new();
        let pos = Pos::from_row_col(2, 3);
        board.push_piece(pos, piece(1, PieceKind::Fort, Player::One)).unwrap();
        board.push_piece(pos, piece(2, PieceKind::Knight, Player::Two)).unwrap();

        assert_eq!(board.pop_top(pos).unwrap().kind, PieceKind::Knight);
        assert_eq!(board.pop_top(pos).unwrap().kind, PieceKind::Fort);
        assert_eq!(board.pop_top(pos), Err(GungiError::EmptyStack));
    }

    #[test]
    fn test_capture_into_replaces_stack() {
        let mut board = Board::new();
        let pos = Pos::from_row_col(5, 5);
        board.push_piece(pos, piece(1, PieceKind::Pawn, Player::Two)).unwrap();
        board.push_piece(pos, piece(2, PieceKind::Major, Player::Two)).unwrap();

        let captured = board.capture_into(pos, piece(3, PieceKind::Canon, Player::One));

        assert_eq!(captured.len(), 2);
        assert_eq!(board.height(pos), 1);
        assert_eq!(board.top_piece(pos).unwrap().id, PieceId(3));
    }

    #[test]
    fn test_frontline_row() {
        let mut board = Board::new();
        assert_eq!(board.frontline_row(Player::One), None);

        board.push_piece(Pos::from_row_col(7, 1), piece(1, PieceKind::Pawn, Player::One)).unwrap();
        board.push_piece(Pos::from_row_col(6, 4), piece(2, PieceKind::Pawn, Player::One)).unwrap();
        board.push_piece(Pos::from_row_col(1, 4), piece(3, PieceKind::Pawn, Player::Two)).unwrap();
        board.push_piece(Pos::from_row_col(3, 4), piece(4, PieceKind::Pawn, Player::Two)).unwrap();

        assert_eq!(board.frontline_row(Player::One), Some(6));
        assert_eq!(board.frontline_row(Player::Two), Some(3));
    }

    #[test]
    fn test_frontline_counts_buried_pieces() {
        let mut board = Board::new();
        let pos = Pos::from_row_col(4, 0);
        board.push_piece(pos, piece(1, PieceKind::Pawn, Player::One)).unwrap();
        board.push_piece(pos, piece(2, PieceKind::Pawn, Player::Two)).unwrap();

        assert_eq!(board.frontline_row(Player::One), Some(4));
    }

    #[test]
    fn test_has_king_sees_buried_king() {
        let mut board = Board::new();
        let pos = Pos::from_row_col(8, 4);
        board.push_piece(pos, piece(1, PieceKind::King, Player::One)).unwrap();
        board.push_piece(pos, piece(2, PieceKind::Samurai, Player::Two)).unwrap();

        assert!(board.has_king(Player::One));
        assert!(!board.has_king(Player::Two));
    }

    #[test]
    fn test_deserialize_checks_shape() {
        let mut board = Board::new();
        board.push_piece(Pos(0), piece(1, PieceKind::Pawn, Player::One)).unwrap();
        let json = serde_json::to_value(&board).unwrap();
        assert_eq!(serde_json::from_value::<Board>(json.clone()).unwrap(), board);

        let mut short = json.clone();
        short["squares"].as_array_mut().unwrap().pop();
        let err = serde_json::from_value::<Board>(short).unwrap_err();
        assert!(err.to_string().contains("board has 80 squares"), "{}", err);

        let pawn = json["squares"][0]["pieces"][0].clone();
        let mut tall = json;
        tall["squares"][0]["pieces"] = serde_json::Value::Array(vec![pawn; 4]);
        let err = serde_json::from_value::<Board>(tall).unwrap_err();
        assert!(err.to_string().contains("stack holds 4 pieces"), "{}", err);
    }

    #[test]
    fn test_display_marks_stacks() {
        let mut board = Board::new();
        let pos = Pos::from_row_col(0, 0);
        board.push_piece(pos, piece(1, PieceKind::Pawn, Player::One)).unwrap();
        board.push_piece(pos, piece(2, PieceKind::King, Player::Two)).unwrap();

        let text = board.to_string();
        assert!(text.contains("帥22"));
        assert_eq!(text.lines().count(), 10);
    }
}
