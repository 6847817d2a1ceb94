//! The turn engine: one game session from placement to game over.

use crate::board::Board;
use crate::config::Config;
use crate::constants::{GameOutcome, Highlight, PieceKind, TurnState};
use crate::coord::Coord;
use crate::error::{MapError, MapResult, SelectionError};
use crate::frontend::{Frontend, Notification};
use crate::map::{MapCatalog, load_map};
use crate::move_gen::{is_legal_move, random_legal_destination, reachable_positions, threatens};
use crate::piece::PieceId;
use crate::rng::RandomSource;
use rand::rngs::StdRng;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, info};

/// What a call to [`Engine::select_position`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// The player piece was placed on a start cell.
    Placed,
    /// The player moved, possibly capturing a piece by name.
    Moved { captured: Option<String> },
    /// Nothing changed; the reason was also sent to the notifier.
    Rejected(SelectionError),
    /// No board, game already over, or not the player's turn.
    Ignored,
}

/// A game session.
///
/// Owns the board, the turn state and the AI's pending moves. The only ways
/// in are [`Engine::select_position`] and [`Engine::restart`].
pub struct Engine<F: Frontend, R: RandomSource = StdRng> {
    config: Config,
    catalog: MapCatalog,
    board: Option<Board>,
    state: TurnState,
    pending: BTreeMap<PieceId, Coord>,
    outcome: Option<GameOutcome>,
    frontend: F,
    rng: R,
}

impl<F: Frontend, R: RandomSource> Engine<F, R> {
    /// Creates a session with no board. Call [`Engine::restart`] to begin.
    pub fn new(config: Config, catalog: MapCatalog, frontend: F, rng: R) -> Self {
        Self {
            config,
            catalog,
            board: None,
            state: TurnState::PickingPosition,
            pending: BTreeMap::new(),
            outcome: None,
            frontend,
            rng,
        }
    }

    pub fn state(&self) -> TurnState {
        self.state
    }

    pub fn board(&self) -> Option<&Board> {
        self.board.as_ref()
    }

    pub fn pending_moves(&self) -> &BTreeMap<PieceId, Coord> {
        &self.pending
    }

    pub fn outcome(&self) -> Option<GameOutcome> {
        self.outcome
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn catalog(&self) -> &MapCatalog {
        &self.catalog
    }

    pub fn frontend(&self) -> &F {
        &self.frontend
    }

    pub fn frontend_mut(&mut self) -> &mut F {
        &mut self.frontend
    }

    /// Discards the current game and loads a random map from the catalog.
    ///
    /// The old board and pending moves are gone before the new map is loaded;
    /// if loading fails the session is left without a board in
    /// `PickingPosition` and the error is returned.
    pub fn restart(&mut self) -> MapResult<()> {
        self.reset();
        if self.catalog.maps.is_empty() {
            return Err(MapError::EmptyCatalog);
        }
        let index = self.rng.uniform_int(0, self.catalog.maps.len());
        let board = load_map(&self.catalog.maps[index], &mut self.rng)?;
        self.install(board);
        Ok(())
    }

    /// Like [`Engine::restart`], on a board built by the caller.
    pub fn restart_with(&mut self, board: Board) {
        self.reset();
        self.install(board);
    }

    fn reset(&mut self) {
        self.pending.clear();
        self.frontend.clear_intents();
        self.board = None;
        self.state = TurnState::PickingPosition;
        self.outcome = None;
    }

    fn install(&mut self, board: Board) {
        info!(map = board.name(), "new game");
        self.board = Some(board);
        self.refresh_display();
    }

    /// Handles a cell picked by the human player.
    pub fn select_position(&mut self, coord: Coord) -> Selection {
        if self.outcome.is_some() {
            return Selection::Ignored;
        }
        let Some(board) = self.board.as_mut() else {
            return Selection::Ignored;
        };

        match self.state {
            TurnState::PickingPosition => {
                if !board.is_start(coord) {
                    debug!(at = %coord, "rejected start position");
                    self.frontend.notify(Notification::InvalidPosition);
                    return Selection::Rejected(SelectionError::InvalidPosition(coord));
                }
                board.place_player(self.catalog.player.spawn(PieceKind::Player, coord));
                info!(at = %coord, "player placed");
                self.state = TurnState::PlayerTurn;
                self.next_turn();
                Selection::Placed
            }
            TurnState::PlayerTurn => {
                if !self.try_move_player(coord) {
                    debug!(to = %coord, "rejected player move");
                    self.frontend.notify(Notification::InvalidMove);
                    return Selection::Rejected(SelectionError::InvalidMove(coord));
                }
                let captured = self.resolve_captures();
                self.state = TurnState::AITurn;
                self.next_turn();
                Selection::Moved { captured }
            }
            TurnState::AITurn => Selection::Ignored,
        }
    }

    fn try_move_player(&mut self, to: Coord) -> bool {
        let lenient = self.config.lenient_player_moves;
        let Some(board) = self.board.as_mut() else {
            return false;
        };
        let on_board = board.contains(to);
        let Some(player) = board.player_mut() else {
            return false;
        };
        if !is_legal_move(player, to) || !(on_board || lenient) {
            return false;
        }
        debug!(from = %player.coord, to = %to, "player moves");
        player.coord = to;
        true
    }

    /// Takes the first live piece standing on the player's cell, absorbing its
    /// offsets. Returns the captured piece's name.
    pub fn resolve_captures(&mut self) -> Option<String> {
        let board = self.board.as_mut()?;
        let at = board.player()?.coord;
        let (id, _) = board.piece_at(at)?;
        let captured = board.remove_piece(id)?;
        let gained = board.player_mut()?.merge_offsets(captured.legal_offsets());
        self.pending.remove(&id);

        info!(piece = %captured.name, at = %at, gained, "piece captured");
        self.frontend.notify(Notification::PieceCaptured(captured.name.clone()));
        Some(captured.name)
    }

    /// Advances the turn: terminal check first, then the action of the
    /// current state, then a display refresh.
    ///
    /// A game that ends before the AI acts is left in `PlayerTurn`, so
    /// `AITurn` is never observable from outside.
    fn next_turn(&mut self) {
        if let Some(outcome) = self.check_terminal() {
            info!(?outcome, "game over");
            self.outcome = Some(outcome);
            if self.state == TurnState::AITurn {
                self.state = TurnState::PlayerTurn;
            }
            self.pending.clear();
            self.frontend.clear_intents();
            self.frontend.notify(Notification::GameOver { won: outcome.is_win() });
            self.refresh_display();
            return;
        }

        match self.state {
            TurnState::PickingPosition => {}
            TurnState::PlayerTurn => self.plan_ai_moves(),
            TurnState::AITurn => {
                self.apply_pending_moves();
                self.state = TurnState::PlayerTurn;
                self.next_turn();
            }
        }
        self.refresh_display();
    }

    /// Win if the player stands on the king, loss if any non-king piece
    /// could move onto the player.
    pub fn check_terminal(&self) -> Option<GameOutcome> {
        let board = self.board.as_ref()?;
        let player = board.player()?;
        if board.king_coord() == Some(player.coord) {
            return Some(GameOutcome::Won);
        }
        let threatened = board
            .pieces()
            .any(|(_, piece)| !piece.is_king() && threatens(piece, player.coord));
        threatened.then_some(GameOutcome::Lost)
    }

    /// Picks `simul_moves` pieces with replacement and a random destination
    /// for each. A piece picked twice keeps its last destination.
    fn plan_ai_moves(&mut self) {
        self.pending.clear();
        self.frontend.clear_intents();
        let Some(board) = self.board.as_ref() else {
            return;
        };
        let ids = board.piece_ids();
        if ids.is_empty() {
            return;
        }

        for _ in 0..self.config.difficulty.simul_moves {
            let id = ids[self.rng.uniform_int(0, ids.len())];
            let Some(piece) = board.piece(id) else {
                continue;
            };
            let to = random_legal_destination(piece, board, &mut self.rng);
            self.pending.insert(id, to);
        }

        for (&id, &to) in &self.pending {
            if let Some(piece) = board.piece(id) {
                if piece.coord != to {
                    self.frontend.show_intent(piece.coord, to);
                }
            }
        }
        debug!(planned = self.pending.len(), "ai planned");
    }

    /// Applies the planned moves in piece order. Moves whose piece is gone,
    /// which stay in place, or whose target has been taken meanwhile are
    /// dropped so no cell ever holds two pieces.
    fn apply_pending_moves(&mut self) {
        let pending = std::mem::take(&mut self.pending);
        self.frontend.clear_intents();
        let Some(board) = self.board.as_mut() else {
            return;
        };

        for (id, to) in pending {
            let Some(from) = board.piece(id).map(|p| p.coord) else {
                debug!(?id, "planned piece no longer on the board");
                continue;
            };
            if from == to {
                continue;
            }
            if board.is_occupied(to) {
                debug!(from = %from, to = %to, "ai move blocked by another piece");
                continue;
            }
            if let Some(piece) = board.piece_mut(id) {
                if is_legal_move(piece, to) {
                    debug!(piece = %piece.name, from = %from, to = %to, "ai moves");
                    piece.coord = to;
                }
            }
        }
    }

    /// Final colour of every cell: neutral, then start cells or the player's
    /// reach, then enemy reach on top when enabled.
    pub fn highlights(&self) -> Vec<(Coord, Highlight)> {
        let Some(board) = self.board.as_ref() else {
            return Vec::new();
        };
        let mut colors: HashMap<Coord, Highlight> = HashMap::with_capacity(board.len());

        if self.state == TurnState::PickingPosition {
            for pos in board.start_positions() {
                colors.insert(pos.coord, Highlight::ValidStart);
            }
        } else if let Some(player) = board.player() {
            for to in reachable_positions(player, board) {
                colors.insert(to, Highlight::PlayerMove);
            }
        }

        if self.config.difficulty.show_enemy_range {
            for (_, piece) in board.pieces() {
                for to in reachable_positions(piece, board) {
                    colors.insert(to, Highlight::EnemyMove);
                }
            }
        }

        board
            .positions()
            .map(|pos| (pos.coord, colors.get(&pos.coord).copied().unwrap_or_default()))
            .collect()
    }

    fn refresh_display(&mut self) {
        for (coord, highlight) in self.highlights() {
            self.frontend.set_highlight(coord, highlight);
        }
    }
}
