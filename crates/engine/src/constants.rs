//! Constants and small enums shared across the engine.

use crate::coord::Coord;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PieceKind {
    Player,
    King,
    Enemy,
}

/// Which side is expected to act next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TurnState {
    #[default]
    PickingPosition,
    PlayerTurn,
    AITurn,
}

/// Colour tag handed to the display layer for a single cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Highlight {
    #[default]
    Neutral,
    ValidStart,
    PlayerMove,
    EnemyMove,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameOutcome {
    Won,
    Lost,
}

impl GameOutcome {
    pub fn is_win(self) -> bool {
        self == GameOutcome::Won
    }
}

// --- Stock offset sets ---
// Offsets point from the destination back to the piece: a piece at `p`
// with offset `o` may land on `p - o`.

pub const WAZIR: [(i32, i32); 4] = [(0, 1), (1, 0), (0, -1), (-1, 0)];

pub const FERZ: [(i32, i32); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];

pub const KNIGHT: [(i32, i32); 8] = [
    (1, 2),
    (2, 1),
    (2, -1),
    (1, -2),
    (-1, -2),
    (-2, -1),
    (-2, 1),
    (-1, 2),
];

/// Single step towards negative y.
pub const PAWN: [(i32, i32); 1] = [(0, 1)];

/// Longest slide generated for the ranged stock sets.
pub const MAX_SLIDE: i32 = 3;

/// Looks up a stock offset set by name, as used in map files.
pub fn named_offsets(name: &str) -> Option<Vec<Coord>> {
    let to_coords = |pairs: &[(i32, i32)]| pairs.iter().copied().map(Coord::from).collect::<Vec<_>>();
    let slides = |dirs: &[(i32, i32)], range: i32| {
        let mut out = Vec::with_capacity(dirs.len() * range as usize);
        for step in 1..=range {
            for &(dx, dy) in dirs {
                out.push(Coord::new(dx * step, dy * step));
            }
        }
        out
    };

    match name {
        "wazir" => Some(to_coords(&WAZIR)),
        "ferz" => Some(to_coords(&FERZ)),
        "king" => {
            let mut v = to_coords(&WAZIR);
            v.extend(to_coords(&FERZ));
            Some(v)
        }
        "knight" => Some(to_coords(&KNIGHT)),
        "pawn" => Some(to_coords(&PAWN)),
        "rook" => Some(slides(&WAZIR, MAX_SLIDE)),
        "bishop" => Some(slides(&FERZ, MAX_SLIDE)),
        "queen" => {
            let mut v = slides(&WAZIR, MAX_SLIDE);
            v.extend(slides(&FERZ, MAX_SLIDE));
            Some(v)
        }
        _ => None,
    }
}
