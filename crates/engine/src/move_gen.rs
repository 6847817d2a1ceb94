//! Move resolution against a board.
//!
//! Offsets point from the destination back to the piece, so every candidate
//! destination is `piece.coord - offset`.

use crate::board::Board;
use crate::coord::Coord;
use crate::piece::Piece;
use crate::rng::RandomSource;

/// Destinations that exist on the board and hold no live piece, in offset order.
pub fn legal_destinations(piece: &Piece, board: &Board) -> Vec<Coord> {
    let mut out = Vec::with_capacity(piece.legal_offsets().len());
    for to in piece.legal_offsets().iter().filter_map(|&o| piece.destination(o)) {
        if is_free_cell(board, to) && !out.contains(&to) {
            out.push(to);
        }
    }
    out
}

/// Destinations that exist on the board, occupied or not.
pub fn reachable_positions(piece: &Piece, board: &Board) -> Vec<Coord> {
    let mut out = Vec::with_capacity(piece.legal_offsets().len());
    for to in piece.legal_offsets().iter().filter_map(|&o| piece.destination(o)) {
        if board.contains(to) && !out.contains(&to) {
            out.push(to);
        }
    }
    out
}

/// Offset membership only: neither bounds nor occupancy are checked. A
/// difference that does not fit in a `Coord` is never an offset.
#[inline]
pub fn is_legal_move(piece: &Piece, target: Coord) -> bool {
    piece
        .coord
        .checked_sub(target)
        .is_some_and(|offset| piece.legal_offsets().contains(offset))
}

/// Whether one of `piece`'s offsets lands on `target`.
#[inline]
pub fn threatens(piece: &Piece, target: Coord) -> bool {
    is_legal_move(piece, target)
}

/// Tries the offsets in a random order and returns the first free on-board
/// destination. Falls back to the piece's own cell when nothing is free.
pub fn random_legal_destination<R: RandomSource + ?Sized>(piece: &Piece, board: &Board, rng: &mut R) -> Coord {
    let mut order: Vec<Coord> = piece.legal_offsets().as_slice().to_vec();
    // Fisher-Yates
    for i in (1..order.len()).rev() {
        let j = rng.uniform_int(0, i + 1);
        order.swap(i, j);
    }
    order
        .into_iter()
        .filter_map(|offset| piece.destination(offset))
        .find(|&to| is_free_cell(board, to))
        .unwrap_or(piece.coord)
}

#[inline]
fn is_free_cell(board: &Board, coord: Coord) -> bool {
    board.contains(coord) && !board.is_occupied(coord)
}
