//! Pieces, their offset sets, and the arena that owns live pieces.

use crate::constants::PieceKind;
use crate::coord::Coord;
use std::ops::Index;

/// Insertion-ordered, duplicate-free list of move offsets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OffsetSet {
    offsets: Vec<Coord>,
}

impl OffsetSet {
    pub fn new() -> Self {
        Self { offsets: Vec::new() }
    }

    /// Adds `offset` unless already present. Returns whether it was added.
    pub fn add(&mut self, offset: Coord) -> bool {
        if self.offsets.contains(&offset) {
            return false;
        }
        self.offsets.push(offset);
        true
    }

    /// Adds every offset of `other` that is not already present.
    /// Returns the number of offsets added.
    pub fn merge(&mut self, other: &OffsetSet) -> usize {
        other.iter().filter(|&&o| self.add(o)).count()
    }

    pub fn contains(&self, offset: Coord) -> bool {
        self.offsets.contains(&offset)
    }

    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Coord> {
        self.offsets.iter()
    }

    pub fn as_slice(&self) -> &[Coord] {
        &self.offsets
    }
}

impl FromIterator<Coord> for OffsetSet {
    fn from_iter<I: IntoIterator<Item = Coord>>(iter: I) -> Self {
        let mut set = OffsetSet::new();
        for o in iter {
            set.add(o);
        }
        set
    }
}

impl<'a> IntoIterator for &'a OffsetSet {
    type Item = &'a Coord;
    type IntoIter = std::slice::Iter<'a, Coord>;

    fn into_iter(self) -> Self::IntoIter {
        self.offsets.iter()
    }
}

impl Index<usize> for OffsetSet {
    type Output = Coord;

    fn index(&self, index: usize) -> &Self::Output {
        &self.offsets[index]
    }
}

/// A movable unit on the board.
#[derive(Debug, Clone)]
pub struct Piece {
    pub name: String,
    pub kind: PieceKind,
    pub coord: Coord,
    offsets: OffsetSet,
}

impl Piece {
    pub fn new(name: impl Into<String>, kind: PieceKind, coord: Coord, offsets: OffsetSet) -> Self {
        Self {
            name: name.into(),
            kind,
            coord,
            offsets,
        }
    }

    pub fn legal_offsets(&self) -> &OffsetSet {
        &self.offsets
    }

    /// Absorbs offsets from another set, skipping ones already known.
    pub fn merge_offsets(&mut self, other: &OffsetSet) -> usize {
        self.offsets.merge(other)
    }

    /// Cell reached through `offset` from the current coordinate, if it is
    /// representable.
    #[inline]
    pub fn destination(&self, offset: Coord) -> Option<Coord> {
        self.coord.checked_sub(offset)
    }

    pub fn is_king(&self) -> bool {
        self.kind == PieceKind::King
    }
}

/// Stable handle to a piece in a [`PieceArena`].
///
/// Handles of removed pieces never resolve again, even if the slot is reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PieceId {
    index: u32,
    generation: u32,
}

#[derive(Debug, Clone, Default)]
struct Slot {
    generation: u32,
    value: Option<Piece>,
}

/// Generational storage for live pieces. Iteration is in ascending slot order.
#[derive(Debug, Clone, Default)]
pub struct PieceArena {
    slots: Vec<Slot>,
    free: Vec<u32>,
    live: usize,
}

impl PieceArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, piece: Piece) -> PieceId {
        self.live += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            debug_assert!(slot.value.is_none());
            slot.value = Some(piece);
            PieceId { index, generation: slot.generation }
        } else {
            let index = self.slots.len() as u32;
            self.slots.push(Slot { generation: 0, value: Some(piece) });
            PieceId { index, generation: 0 }
        }
    }

    pub fn get(&self, id: PieceId) -> Option<&Piece> {
        let slot = self.slots.get(id.index as usize)?;
        if slot.generation == id.generation {
            slot.value.as_ref()
        } else {
            None
        }
    }

    pub fn get_mut(&mut self, id: PieceId) -> Option<&mut Piece> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation == id.generation {
            slot.value.as_mut()
        } else {
            None
        }
    }

    pub fn remove(&mut self, id: PieceId) -> Option<Piece> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        let piece = slot.value.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
        self.live -= 1;
        Some(piece)
    }

    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    pub fn ids(&self) -> Vec<PieceId> {
        self.iter().map(|(id, _)| id).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (PieceId, &Piece)> + '_ {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            let piece = slot.value.as_ref()?;
            Some((PieceId { index: index as u32, generation: slot.generation }, piece))
        })
    }
}
