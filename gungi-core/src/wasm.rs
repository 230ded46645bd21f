//! WASM bindings for gungi-core
//!
//! Exposes the game state machine to a browser UI. Every call either
//! advances the wrapped state or throws, leaving it unchanged.

use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::{GameState, GungiError, Player, Pos, Ruleset, BOARD_SIZE};

/// WASM-friendly wrapper around GameState
#[wasm_bindgen]
pub struct WasmGame {
    inner: GameState,
}

#[wasm_bindgen]
impl WasmGame {
    /// Create a standard game
    #[wasm_bindgen(constructor)]
    pub fn new() -> WasmGame {
        WasmGame {
            inner: GameState::default(),
        }
    }

    /// Create a game from a JSON ruleset
    #[wasm_bindgen(js_name = withRuleset)]
    pub fn with_ruleset(json: &str) -> Result<WasmGame, JsError> {
        let ruleset = Ruleset::from_json(json).map_err(|e| JsError::new(&e.to_string()))?;
        Ok(WasmGame {
            inner: GameState::new(ruleset),
        })
    }

    /// Current player (1 or 2)
    #[wasm_bindgen(js_name = currentPlayer)]
    pub fn current_player(&self) -> u8 {
        self.inner.to_move() as u8
    }

    /// Winner: 0 (none), 1 (P1), or 2 (P2)
    pub fn winner(&self) -> u8 {
        self.inner.winner().map_or(0, |p| p as u8)
    }

    /// Current phase as `{ state: "...", ... }`
    pub fn phase(&self) -> Result<JsValue, JsError> {
        to_js(self.inner.phase())
    }

    /// Board as rows of stacks; each stack is bottom-to-top `{ id, kind, label, owner }`
    pub fn board(&self) -> Result<JsValue, JsError> {
        let board = self.inner.board();
        let rows: Vec<Vec<Vec<PieceView>>> = (0..BOARD_SIZE)
            .map(|row| {
                (0..BOARD_SIZE)
                    .map(|col| {
                        board
                            .stack(Pos::from_row_col(row, col))
                            .pieces()
                            .iter()
                            .map(PieceView::from)
                            .collect()
                    })
                    .collect()
            })
            .collect();
        to_js(&rows)
    }

    /// Reserve of a player as an array of kind names
    pub fn reserve(&self, player: u8) -> Result<JsValue, JsError> {
        let player = Player::from_bits(player).ok_or_else(|| JsError::new("player must be 1 or 2"))?;
        to_js(self.inner.reserve(player))
    }

    /// Legal destinations of the selected piece as [row, col, row, col, ...]
    #[wasm_bindgen(js_name = legalDestinations)]
    pub fn legal_destinations(&self) -> Vec<u8> {
        self.inner
            .legal_destinations()
            .iter()
            .flat_map(|pos| [pos.row(), pos.col()])
            .collect()
    }

    #[wasm_bindgen(js_name = selectSquare)]
    pub fn select_square(&mut self, row: u8, col: u8) -> Result<(), JsError> {
        let pos = to_pos(row, col)?;
        self.step(|state| state.select_board_square(pos))
    }

    #[wasm_bindgen(js_name = selectReserve)]
    pub fn select_reserve(&mut self, player: u8, index: usize) -> Result<(), JsError> {
        let player = Player::from_bits(player).ok_or_else(|| JsError::new("player must be 1 or 2"))?;
        self.step(|state| state.select_reserve_piece(player, index))
    }

    #[wasm_bindgen(js_name = submitDestination)]
    pub fn submit_destination(&mut self, row: u8, col: u8) -> Result<(), JsError> {
        let pos = to_pos(row, col)?;
        self.step(|state| state.submit_destination(pos))
    }

    /// Select or submit, whichever the current phase calls for
    #[wasm_bindgen(js_name = clickSquare)]
    pub fn click_square(&mut self, row: u8, col: u8) -> Result<(), JsError> {
        let pos = to_pos(row, col)?;
        self.step(|state| state.click_square(pos))
    }

    /// Settle a pending move: true captures, false stacks
    #[wasm_bindgen(js_name = resolveCaptureChoice)]
    pub fn resolve_capture_choice(&mut self, capture: bool) -> Result<(), JsError> {
        self.step(|state| state.resolve_capture_choice(capture))
    }

    #[wasm_bindgen(js_name = cancelPendingMove)]
    pub fn cancel_pending_move(&mut self) -> Result<(), JsError> {
        self.step(GameState::cancel_pending_move)
    }

    /// Start over with the same ruleset
    pub fn restart(&mut self) {
        self.inner = self.inner.restart();
    }

    /// Full state snapshot as JSON
    #[wasm_bindgen(js_name = toJson)]
    pub fn to_json(&self) -> Result<String, JsError> {
        serde_json::to_string(&self.inner).map_err(|e| JsError::new(&e.to_string()))
    }
}

impl WasmGame {
    fn step(&mut self, f: impl FnOnce(&GameState) -> Result<GameState, GungiError>) -> Result<(), JsError> {
        self.inner = f(&self.inner).map_err(|e| JsError::new(&e.to_string()))?;
        Ok(())
    }
}

impl Default for WasmGame {
    fn default() -> Self {
        Self::new()
    }
}

fn to_pos(row: u8, col: u8) -> Result<Pos, JsError> {
    Pos::new(row, col).ok_or_else(|| JsError::new("square is off the board"))
}

fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsError> {
    serde_wasm_bindgen::to_value(value).map_err(|e| JsError::new(&e.to_string()))
}

/// Serializable piece for JavaScript
#[derive(Serialize)]
struct PieceView {
    id: u32,
    kind: crate::PieceKind,
    label: char,
    owner: u8,
}

impl From<&crate::Piece> for PieceView {
    fn from(piece: &crate::Piece) -> Self {
        PieceView {
            id: piece.id.0,
            kind: piece.kind,
            label: piece.label(),
            owner: piece.owner as u8,
        }
    }
}
