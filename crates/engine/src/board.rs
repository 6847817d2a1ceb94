//! The board: a fixed registry of cells plus the pieces standing on them.

use crate::coord::Coord;
use crate::error::MapError;
use crate::piece::{Piece, PieceArena, PieceId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// One occupiable cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub coord: Coord,
    #[serde(default)]
    pub start: bool,
    #[serde(default)]
    pub king_spawn: bool,
}

impl Position {
    pub fn new(coord: Coord) -> Self {
        Self { coord, start: false, king_spawn: false }
    }

    pub fn with_start(mut self, start: bool) -> Self {
        self.start = start;
        self
    }

    pub fn with_king_spawn(mut self, king_spawn: bool) -> Self {
        self.king_spawn = king_spawn;
        self
    }
}

/// Cell registry, live enemy pieces, the king handle and the player piece.
///
/// The player is kept apart from the live list: enemy occupancy checks never
/// see it, which is what lets an enemy threaten the player's cell.
#[derive(Debug, Clone)]
pub struct Board {
    name: String,
    positions: HashMap<Coord, Position>,
    order: Vec<Coord>,
    pieces: PieceArena,
    king: Option<PieceId>,
    fallen_king: Option<Coord>,
    player: Option<Piece>,
}

impl Board {
    /// Registers every cell. Fails if two cells share a coordinate.
    pub fn new(name: impl Into<String>, positions: impl IntoIterator<Item = Position>) -> Result<Self, MapError> {
        let positions = positions.into_iter();
        let mut map = HashMap::with_capacity(positions.size_hint().0);
        let mut order = Vec::with_capacity(positions.size_hint().0);
        for pos in positions {
            if map.insert(pos.coord, pos).is_some() {
                return Err(MapError::DuplicateCoordinate(pos.coord));
            }
            order.push(pos.coord);
        }
        Ok(Self {
            name: name.into(),
            positions: map,
            order,
            pieces: PieceArena::new(),
            king: None,
            fallen_king: None,
            player: None,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn lookup(&self, coord: Coord) -> Option<&Position> {
        self.positions.get(&coord)
    }

    #[inline]
    pub fn contains(&self, coord: Coord) -> bool {
        self.positions.contains_key(&coord)
    }

    /// Whether a live (non-player) piece stands on `coord`.
    pub fn is_occupied(&self, coord: Coord) -> bool {
        self.piece_at(coord).is_some()
    }

    pub fn is_start(&self, coord: Coord) -> bool {
        self.lookup(coord).is_some_and(|p| p.start)
    }

    /// Cells in definition order.
    pub fn positions(&self) -> impl Iterator<Item = &Position> + '_ {
        self.order.iter().map(|c| &self.positions[c])
    }

    pub fn start_positions(&self) -> impl Iterator<Item = &Position> + '_ {
        self.positions().filter(|p| p.start)
    }

    pub fn king_spawn_positions(&self) -> impl Iterator<Item = &Position> + '_ {
        self.positions().filter(|p| p.king_spawn)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    // --- Pieces ---

    pub fn pieces(&self) -> impl Iterator<Item = (PieceId, &Piece)> + '_ {
        self.pieces.iter()
    }

    pub fn piece_ids(&self) -> Vec<PieceId> {
        self.pieces.ids()
    }

    pub fn piece_count(&self) -> usize {
        self.pieces.len()
    }

    pub fn piece(&self, id: PieceId) -> Option<&Piece> {
        self.pieces.get(id)
    }

    pub fn piece_mut(&mut self, id: PieceId) -> Option<&mut Piece> {
        self.pieces.get_mut(id)
    }

    pub fn piece_at(&self, coord: Coord) -> Option<(PieceId, &Piece)> {
        self.pieces.iter().find(|(_, p)| p.coord == coord)
    }

    /// Places a piece on an existing, free cell.
    pub(crate) fn spawn_piece(&mut self, piece: Piece) -> PieceId {
        debug_assert!(self.contains(piece.coord), "spawn off board at {}", piece.coord);
        debug_assert!(!self.is_occupied(piece.coord), "spawn on occupied cell {}", piece.coord);
        let is_king = piece.is_king();
        let id = self.pieces.insert(piece);
        if is_king {
            self.king = Some(id);
        }
        id
    }

    /// Removes a live piece. Removing the king remembers where it fell.
    pub(crate) fn remove_piece(&mut self, id: PieceId) -> Option<Piece> {
        let piece = self.pieces.remove(id)?;
        if self.king == Some(id) {
            self.fallen_king = Some(piece.coord);
        }
        Some(piece)
    }

    pub fn king_id(&self) -> Option<PieceId> {
        self.king
    }

    pub fn king(&self) -> Option<&Piece> {
        self.king.and_then(|id| self.pieces.get(id))
    }

    /// Coordinate of the live king, or of the cell it was captured on.
    pub fn king_coord(&self) -> Option<Coord> {
        self.king().map(|k| k.coord).or(self.fallen_king)
    }

    pub fn player(&self) -> Option<&Piece> {
        self.player.as_ref()
    }

    pub fn player_mut(&mut self) -> Option<&mut Piece> {
        self.player.as_mut()
    }

    pub(crate) fn place_player(&mut self, player: Piece) {
        debug_assert!(self.player.is_none(), "player placed twice");
        self.player = Some(player);
    }

    fn bounds(&self) -> Option<(Coord, Coord)> {
        let mut it = self.order.iter();
        let first = *it.next()?;
        Some(it.fold((first, first), |(lo, hi), c| {
            (Coord::new(lo.x.min(c.x), lo.y.min(c.y)), Coord::new(hi.x.max(c.x), hi.y.max(c.y)))
        }))
    }

    /// Glyph for a single cell in the text rendering.
    pub fn glyph_at(&self, coord: Coord) -> char {
        if self.player.as_ref().is_some_and(|p| p.coord == coord) {
            return '@';
        }
        if let Some((_, piece)) = self.piece_at(coord) {
            if piece.is_king() {
                return 'K';
            }
            return piece.name.chars().next().map(|c| c.to_ascii_lowercase()).unwrap_or('e');
        }
        match self.lookup(coord) {
            Some(p) if p.start => 's',
            Some(_) => '.',
            None => ' ',
        }
    }

    /// Rows from the top (highest y) down, each as `(y, [(x, glyph)])`.
    pub fn rows(&self) -> Vec<(i32, Vec<(i32, char)>)> {
        let Some((lo, hi)) = self.bounds() else {
            return Vec::new();
        };
        (lo.y..=hi.y)
            .rev()
            .map(|y| (y, (lo.x..=hi.x).map(|x| (x, self.glyph_at(Coord::new(x, y)))).collect()))
            .collect()
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "(Map: {}, Pieces: {})", self.name, self.pieces.len())?;
        let rows = self.rows();
        for (y, cells) in &rows {
            write!(f, "{:>3} | ", y)?;
            for (_, glyph) in cells {
                write!(f, "{} ", glyph)?;
            }
            writeln!(f)?;
        }
        if let Some((_, cells)) = rows.first() {
            write!(f, "      ")?;
            for (x, _) in cells {
                write!(f, "{} ", x.rem_euclid(10))?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::PieceKind;
    use crate::piece::OffsetSet;

    fn grid(w: i32, h: i32) -> Vec<Position> {
        let mut out = Vec::new();
        for y in 0..h {
            for x in 0..w {
                out.push(Position::new(Coord::new(x, y)).with_start(y == 0));
            }
        }
        out
    }

    #[test]
    fn duplicate_coordinates_are_rejected() {
        let mut cells = grid(2, 2);
        cells.push(Position::new(Coord::new(1, 1)));
        let err = Board::new("dup", cells).unwrap_err();
        assert!(matches!(err, MapError::DuplicateCoordinate(c) if c == Coord::new(1, 1)));
    }

    #[test]
    fn lookup_and_occupancy() {
        let mut board = Board::new("small", grid(3, 3)).unwrap();
        assert!(board.lookup(Coord::new(2, 2)).is_some());
        assert!(board.lookup(Coord::new(3, 0)).is_none());
        assert!(board.is_start(Coord::new(1, 0)));
        assert!(!board.is_start(Coord::new(1, 1)));

        board.spawn_piece(Piece::new("Rook", PieceKind::Enemy, Coord::new(1, 2), OffsetSet::new()));
        assert!(board.is_occupied(Coord::new(1, 2)));
        assert!(!board.is_occupied(Coord::new(1, 1)));

        board.place_player(Piece::new("Player", PieceKind::Player, Coord::new(1, 1), OffsetSet::new()));
        assert!(!board.is_occupied(Coord::new(1, 1)), "player is not part of the live list");
    }

    #[test]
    fn captured_king_leaves_its_coordinate() {
        let mut board = Board::new("small", grid(3, 3)).unwrap();
        let king = board.spawn_piece(Piece::new("King", PieceKind::King, Coord::new(2, 2), OffsetSet::new()));
        assert_eq!(board.king_coord(), Some(Coord::new(2, 2)));

        board.remove_piece(king);
        assert!(board.king().is_none());
        assert_eq!(board.king_coord(), Some(Coord::new(2, 2)));
    }

    #[test]
    fn renders_top_row_first() {
        let mut board = Board::new("small", grid(2, 2)).unwrap();
        board.spawn_piece(Piece::new("King", PieceKind::King, Coord::new(0, 1), OffsetSet::new()));
        let text = board.to_string();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[1], "  1 | K . ");
        assert_eq!(lines[2], "  0 | s s ");
    }
}
