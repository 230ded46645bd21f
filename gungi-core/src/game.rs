//! Turn, placement and capture-or-stack state machine.
//!
//! ```text
//! AwaitingSelection ──select square──▶ PieceSelected ──submit──▶ move applied ─┐
//!        │                                   │                                   │
//!        │                                   └─opponent top─▶ CaptureOrStackPending
//!        │                                                      │ capture / stack ┤
//!        └──select reserve──▶ ReserveSelected ──submit──▶ placed ────────────────┤
//!                                                                                ▼
//!                                                        turn advanced / GameOver
//! ```
//!
//! Every transition borrows the current state and returns the next one. A
//! rejected transition returns an error and the caller keeps the old state.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::board::Board;
use crate::error::{GungiError, MoveError, PlacementError, Result};
use crate::movegen::legal_moves;
use crate::rules::Ruleset;
use crate::{Piece, PieceId, PieceKind, Player, Pos, MAX_STACK};

/// Where the state machine currently stands.
#[derive(Clone, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Phase {
    AwaitingSelection,
    /// A board piece is selected; its legal destinations are precomputed.
    PieceSelected { from: Pos, destinations: Vec<Pos> },
    /// A reserve piece of the mover is selected.
    ReserveSelected { index: usize },
    /// A move onto an opponent-topped square awaits capture or stack.
    CaptureOrStackPending { from: Pos, to: Pos },
    GameOver { winner: Player },
}

/// How to settle a move onto an opponent-topped square.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resolution {
    /// Discard the destination stack; the mover's piece stands alone.
    Capture,
    /// Put the mover's piece on top of the destination stack.
    Stack,
}

/// A complete turn, independent of the click-by-click selection flow.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    /// Place the reserve piece at `index` onto `to`.
    Place { index: usize, to: Pos },
    /// Move the top piece of `from` to `to`. `resolution` is required exactly
    /// when `to` is topped by an opponent piece.
    Move {
        from: Pos,
        to: Pos,
        resolution: Option<Resolution>,
    },
}

/// Full game state.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct GameState {
    ruleset: Ruleset,
    board: Board,
    reserves: [Vec<PieceKind>; 2],
    to_move: Player,
    phase: Phase,
    winner: Option<Player>,
    /// Set once both kings have been on the board at the same time.
    started: bool,
    next_id: u32,
}

impl GameState {
    /// Fresh game under `ruleset`, Player One to move.
    #[instrument]
    pub fn new(ruleset: Ruleset) -> GameState {
        let mut board = Board::new();
        let mut next_id = 0;
        for (pos, kind, owner) in ruleset.initial_layout() {
            board
                .push_piece(pos, Piece::new(PieceId(next_id), kind, owner))
                .expect("setup never stacks");
            next_id += 1;
        }

        let reserve = ruleset.initial_reserve();
        let mut state = GameState {
            ruleset,
            board,
            reserves: [reserve.clone(), reserve],
            to_move: Player::One,
            phase: Phase::AwaitingSelection,
            winner: None,
            started: false,
            next_id,
        };
        state.check_kings(Player::Two);
        state
    }

    /// Fresh game under the same ruleset.
    pub fn restart(&self) -> GameState {
        GameState::new(self.ruleset.clone())
    }

    // ========== Accessors ==========

    #[inline]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[inline]
    pub fn ruleset(&self) -> &Ruleset {
        &self.ruleset
    }

    #[inline]
    pub fn to_move(&self) -> Player {
        self.to_move
    }

    #[inline]
    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    #[inline]
    pub fn winner(&self) -> Option<Player> {
        self.winner
    }

    #[inline]
    pub fn started(&self) -> bool {
        self.started
    }

    #[inline]
    pub fn is_over(&self) -> bool {
        self.winner.is_some()
    }

    /// A player's reserve, in hand order.
    #[inline]
    pub fn reserve(&self, player: Player) -> &[PieceKind] {
        &self.reserves[player.index()]
    }

    /// Destinations of the selected board piece, empty otherwise.
    pub fn legal_destinations(&self) -> &[Pos] {
        match &self.phase {
            Phase::PieceSelected { destinations, .. } => destinations,
            _ => &[],
        }
    }

    // ========== Selection ==========

    /// Select the mover's top piece at `pos`. Selecting the already selected
    /// square deselects it.
    #[instrument(skip(self), fields(mover = ?self.to_move), err(level = "debug"))]
    pub fn select_board_square(&self, pos: Pos) -> Result<GameState> {
        self.ensure_accepting()?;
        ensure_on_board(pos)?;

        let piece = *self.board.top_piece(pos).ok_or(GungiError::EmptyStack)?;
        if piece.owner != self.to_move {
            return Err(GungiError::NotYourTurn);
        }

        if matches!(self.phase, Phase::PieceSelected { from, .. } if from == pos) {
            return Ok(self.with_phase(Phase::AwaitingSelection));
        }

        let destinations = legal_moves(&self.board, &piece, pos, self.to_move);
        debug!(kind = ?piece.kind, count = destinations.len(), "piece selected");
        Ok(self.with_phase(Phase::PieceSelected { from: pos, destinations }))
    }

    /// Select a reserve piece. Selecting the already selected index deselects it.
    #[instrument(skip(self), fields(mover = ?self.to_move), err(level = "debug"))]
    pub fn select_reserve_piece(&self, player: Player, index: usize) -> Result<GameState> {
        self.ensure_accepting()?;

        if player != self.to_move {
            return Err(GungiError::NotYourTurn);
        }
        if index >= self.reserve(player).len() {
            return Err(GungiError::IllegalPlacement(PlacementError::NoSuchReservePiece));
        }

        if self.phase == (Phase::ReserveSelected { index }) {
            return Ok(self.with_phase(Phase::AwaitingSelection));
        }
        Ok(self.with_phase(Phase::ReserveSelected { index }))
    }

    /// Drop any selection.
    pub fn deselect(&self) -> Result<GameState> {
        self.ensure_accepting()?;
        Ok(self.with_phase(Phase::AwaitingSelection))
    }

    // ========== Submission ==========

    /// Submit a destination for the current selection.
    ///
    /// - reserve selected: place it, or fail with `IllegalPlacement`;
    /// - piece selected, `pos` not legal (or the origin): deselect;
    /// - piece selected, `pos` legal and opponent-topped: enter `CaptureOrStackPending`;
    /// - piece selected, `pos` legal otherwise: move and advance the turn.
    #[instrument(skip(self), fields(mover = ?self.to_move), err(level = "debug"))]
    pub fn submit_destination(&self, pos: Pos) -> Result<GameState> {
        self.ensure_accepting()?;
        ensure_on_board(pos)?;

        match &self.phase {
            Phase::ReserveSelected { index } => self.place(*index, pos),
            Phase::PieceSelected { from, destinations } => {
                let from = *from;
                if pos == from || !destinations.contains(&pos) {
                    return Ok(self.with_phase(Phase::AwaitingSelection));
                }

                let opponent_top = self
                    .board
                    .top_piece(pos)
                    .is_some_and(|top| top.owner != self.to_move);
                if opponent_top {
                    debug!(%from, to = %pos, "capture or stack pending");
                    return Ok(self.with_phase(Phase::CaptureOrStackPending { from, to: pos }));
                }

                self.commit_move(from, pos, Resolution::Stack)
            }
            _ => Err(GungiError::IllegalMove(MoveError::NothingSelected)),
        }
    }

    /// Single entry point for a square click: submit when something is
    /// selected, select otherwise.
    pub fn click_square(&self, pos: Pos) -> Result<GameState> {
        ensure_on_board(pos)?;
        match self.phase {
            Phase::AwaitingSelection => self.select_board_square(pos),
            _ => self.submit_destination(pos),
        }
    }

    // ========== Resolution ==========

    /// Settle a pending move onto an opponent-topped square.
    #[instrument(skip(self), fields(mover = ?self.to_move), err(level = "debug"))]
    pub fn resolve(&self, resolution: Resolution) -> Result<GameState> {
        self.ensure_not_over()?;
        match self.phase {
            Phase::CaptureOrStackPending { from, to } => self.commit_move(from, to, resolution),
            _ => Err(GungiError::IllegalMove(MoveError::NoPendingMove)),
        }
    }

    /// `resolve` with `true` for capture and `false` for stack.
    pub fn resolve_capture_choice(&self, capture: bool) -> Result<GameState> {
        self.resolve(if capture {
            Resolution::Capture
        } else {
            Resolution::Stack
        })
    }

    /// Abort a pending move without touching the board or the turn.
    #[instrument(skip(self), fields(mover = ?self.to_move), err(level = "debug"))]
    pub fn cancel_pending_move(&self) -> Result<GameState> {
        self.ensure_not_over()?;
        match self.phase {
            Phase::CaptureOrStackPending { .. } => Ok(self.with_phase(Phase::AwaitingSelection)),
            _ => Err(GungiError::IllegalMove(MoveError::NoPendingMove)),
        }
    }

    // ========== Whole-turn Actions ==========

    /// Every action available to the mover. Empty once the game is over or
    /// while a resolution is pending. Duplicate reserve kinds are listed once.
    pub fn legal_actions(&self) -> Vec<Action> {
        if self.is_over() || matches!(self.phase, Phase::CaptureOrStackPending { .. }) {
            return Vec::new();
        }

        let mover = self.to_move;
        let mut actions = Vec::new();

        let reserve = self.reserve(mover);
        for (index, kind) in reserve.iter().enumerate() {
            if reserve[..index].contains(kind) {
                continue;
            }
            for to in Pos::all() {
                if self.check_placement(to).is_ok() {
                    actions.push(Action::Place { index, to });
                }
            }
        }

        for from in Pos::all() {
            let Some(piece) = self.board.top_piece(from) else {
                continue;
            };
            if piece.owner != mover {
                continue;
            }
            for to in legal_moves(&self.board, piece, from, mover) {
                let opponent_top = self.board.top_piece(to).is_some_and(|top| top.owner != mover);
                if opponent_top {
                    for resolution in [Resolution::Capture, Resolution::Stack] {
                        actions.push(Action::Move {
                            from,
                            to,
                            resolution: Some(resolution),
                        });
                    }
                } else {
                    actions.push(Action::Move {
                        from,
                        to,
                        resolution: None,
                    });
                }
            }
        }

        actions
    }

    /// Play a whole action through the selection flow, discarding any
    /// current selection first.
    pub fn apply(&self, action: &Action) -> Result<GameState> {
        let state = self.deselect()?;
        match *action {
            Action::Place { index, to } => state
                .select_reserve_piece(state.to_move, index)?
                .submit_destination(to),
            Action::Move { from, to, resolution } => {
                ensure_on_board(to)?;
                let selected = state.select_board_square(from)?;
                if !selected.legal_destinations().contains(&to) {
                    return Err(GungiError::IllegalMove(MoveError::NotLegal));
                }
                let next = selected.submit_destination(to)?;
                match (&next.phase, resolution) {
                    (Phase::CaptureOrStackPending { .. }, Some(resolution)) => next.resolve(resolution),
                    (Phase::CaptureOrStackPending { .. }, None) => {
                        Err(GungiError::IllegalMove(MoveError::ResolutionPending))
                    }
                    (_, Some(_)) => Err(GungiError::IllegalMove(MoveError::NoPendingMove)),
                    (_, None) => Ok(next),
                }
            }
        }
    }

    // ========== Internals ==========

    fn ensure_not_over(&self) -> Result<()> {
        if self.is_over() {
            return Err(GungiError::GameAlreadyOver);
        }
        Ok(())
    }

    fn ensure_accepting(&self) -> Result<()> {
        self.ensure_not_over()?;
        if matches!(self.phase, Phase::CaptureOrStackPending { .. }) {
            return Err(GungiError::IllegalMove(MoveError::ResolutionPending));
        }
        Ok(())
    }

    fn with_phase(&self, phase: Phase) -> GameState {
        GameState {
            phase,
            ..self.clone()
        }
    }

    /// Placement constraints for the mover at `to`.
    fn check_placement(&self, to: Pos) -> std::result::Result<(), PlacementError> {
        let mover = self.to_move;
        let stack = self.board.stack(to);

        if stack.len() >= MAX_STACK {
            return Err(PlacementError::StackFull);
        }
        if let Some(top) = stack.top() {
            if top.owner != mover {
                return Err(PlacementError::OpponentStack);
            }
            if top.kind.is_king() {
                return Err(PlacementError::OwnKing);
            }
        }

        if self.ruleset.enforce_frontline {
            if let Some(front) = self.board.frontline_row(mover) {
                let ahead = match mover {
                    Player::One => to.row() < front,
                    Player::Two => to.row() > front,
                };
                if ahead {
                    return Err(PlacementError::BeyondFrontline);
                }
            }
        }
        Ok(())
    }

    fn place(&self, index: usize, to: Pos) -> Result<GameState> {
        let mover = self.to_move;
        if index >= self.reserve(mover).len() {
            return Err(GungiError::IllegalPlacement(PlacementError::NoSuchReservePiece));
        }
        self.check_placement(to).map_err(GungiError::IllegalPlacement)?;

        let mut next = self.clone();
        let kind = next.reserves[mover.index()].remove(index);
        let piece = Piece::new(PieceId(next.next_id), kind, mover);
        next.next_id += 1;
        next.board.push_piece(to, piece)?;

        debug!(?kind, %to, "placed from reserve");
        Ok(next.finish_turn())
    }

    fn commit_move(&self, from: Pos, to: Pos, resolution: Resolution) -> Result<GameState> {
        let mover = self.to_move;
        let mut next = self.clone();
        let piece = next.board.pop_top(from)?;

        match resolution {
            Resolution::Capture => {
                let captured = next.board.capture_into(to, piece);
                debug!(kind = ?piece.kind, %from, %to, captured = captured.len(), "captured");
                if next.ruleset.captures_to_reserve {
                    next.reserves[mover.index()].extend(
                        captured
                            .iter()
                            .filter(|p| !p.kind.is_king())
                            .map(|p| p.kind),
                    );
                }
            }
            Resolution::Stack => {
                next.board.push_piece(to, piece)?;
                debug!(kind = ?piece.kind, %from, %to, height = next.board.height(to), "moved");
            }
        }

        Ok(next.finish_turn())
    }

    fn finish_turn(mut self) -> GameState {
        let mover = self.to_move;
        self.phase = Phase::AwaitingSelection;
        self.to_move = mover.opponent();
        self.check_kings(mover);
        self
    }

    /// Update `started` and `winner` from king presence. `just_moved` wins
    /// if both kings are somehow gone at once.
    fn check_kings(&mut self, just_moved: Player) {
        let one = self.board.has_king(Player::One);
        let two = self.board.has_king(Player::Two);

        if one && two {
            self.started = true;
        }
        if !self.started {
            return;
        }

        let winner = match (one, two) {
            (true, true) => None,
            (true, false) => Some(Player::One),
            (false, true) => Some(Player::Two),
            (false, false) => Some(just_moved),
        };
        if let Some(winner) = winner {
            info!(?winner, "game over");
            self.winner = Some(winner);
            self.phase = Phase::GameOver { winner };
        }
    }
}

fn ensure_on_board(pos: Pos) -> Result<()> {
    if !pos.is_valid() {
        return Err(GungiError::IllegalMove(MoveError::OffBoard));
    }
    Ok(())
}

impl Default for GameState {
    fn default() -> Self {
        GameState::new(Ruleset::default())
    }
}
