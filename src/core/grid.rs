//! Rectangular index space for the roulette cells.
//!
//! Cells are laid out row-major; only the final row may be partially filled.

use std::ops::Deref;

/// Identifies one occupant slot, in `[0, count)`.
pub type CellIndex = usize;

/// Orthogonal moves first, then diagonals. The order is part of the
/// reproducibility contract of the weighted draw.
const NEIGHBOR_OFFSETS: [(isize, isize); 8] = [
    (-1, 0),
    (1, 0),
    (0, -1),
    (0, 1),
    (-1, -1),
    (-1, 1),
    (1, -1),
    (1, 1),
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridDims {
    pub rows: usize,
    pub cols: usize,
}

impl GridDims {
    /// Mostly square layout; three entries get a 2+1 layout.
    pub fn for_count(count: usize) -> Option<Self> {
        if count == 0 {
            return None;
        }
        let cols = if count == 3 {
            2
        } else {
            (count as f64).sqrt().ceil() as usize
        };
        let rows = count.div_ceil(cols);
        Some(Self { rows, cols })
    }

    pub fn capacity(&self) -> usize {
        self.rows * self.cols
    }
}

/// Neighbor list of one cell. At most eight entries, no allocation.
#[derive(Clone, Copy, Debug)]
pub struct Neighbors {
    items: [CellIndex; 8],
    len: usize,
}

impl Neighbors {
    fn empty() -> Self {
        Self {
            items: [0; 8],
            len: 0,
        }
    }

    fn push(&mut self, idx: CellIndex) {
        self.items[self.len] = idx;
        self.len += 1;
    }
}

impl Deref for Neighbors {
    type Target = [CellIndex];

    fn deref(&self) -> &[CellIndex] {
        &self.items[..self.len]
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GridTopology {
    dims: GridDims,
    count: usize,
}

impl GridTopology {
    /// Returns `None` for an empty roster; no run can start on it.
    pub fn build(count: usize) -> Option<Self> {
        let dims = GridDims::for_count(count)?;
        Some(Self { dims, count })
    }

    pub fn dims(&self) -> GridDims {
        self.dims
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn row_col(&self, index: CellIndex) -> (usize, usize) {
        (index / self.dims.cols, index % self.dims.cols)
    }

    /// Unoccupied slots in the final row.
    pub fn empty_slots(&self) -> usize {
        self.dims.capacity() - self.count
    }

    /// Column span that lets the last cell fill a sparse final row.
    /// Cosmetic only; adjacency always uses the unspanned layout.
    pub fn last_row_span(&self) -> usize {
        self.empty_slots() + 1
    }

    /// In-bounds, occupied cells around `index`. Edges never wrap.
    pub fn neighbors(&self, index: CellIndex) -> Neighbors {
        let mut out = Neighbors::empty();
        if index >= self.count {
            return out;
        }
        let (r, c) = self.row_col(index);
        let GridDims { rows, cols } = self.dims;
        for (dr, dc) in NEIGHBOR_OFFSETS {
            let (Some(nr), Some(nc)) = (r.checked_add_signed(dr), c.checked_add_signed(dc))
            else {
                continue;
            };
            if nr >= rows || nc >= cols {
                continue;
            }
            let idx = nr * cols + nc;
            if idx < self.count {
                out.push(idx);
            }
        }
        out
    }
}
