use std::collections::VecDeque;

use crate::core::grid::CellIndex;

/// Positions kept for the comet tail.
pub const TRAIL_LEN: usize = 4;
/// Positions behind the head that receive a distinct look.
pub const STYLED_TRAIL_LEN: usize = 3;

/// Most-recent-first history of visited cells. Index 0 is the cell the light
/// is on; the rest are the cells it left, newest first.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TrailBuffer {
    items: VecDeque<CellIndex>,
}

impl TrailBuffer {
    pub fn new() -> Self {
        Self {
            items: VecDeque::with_capacity(TRAIL_LEN + 1),
        }
    }

    pub fn push(&mut self, index: CellIndex) {
        self.items.push_front(index);
        self.items.truncate(TRAIL_LEN);
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn head(&self) -> Option<CellIndex> {
        self.items.front().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = CellIndex> + '_ {
        self.items.iter().copied()
    }

    pub fn to_vec(&self) -> Vec<CellIndex> {
        self.iter().collect()
    }

    /// `(cell, rank)` pairs for the cells behind the head, rank 1 being the
    /// one just left. The head itself is not included.
    pub fn styled(&self) -> impl Iterator<Item = (CellIndex, usize)> + '_ {
        self.iter()
            .skip(1)
            .take(STYLED_TRAIL_LEN)
            .enumerate()
            .map(|(i, idx)| (idx, i + 1))
    }
}
