use crate::core::grid::CellIndex;
use crate::core::timebase::Tick;

/// Staleness reported for a cell that was never visited. Large enough to
/// swamp any real gap, small enough to stay finite once squared in `f64`.
pub const UNSEEN_STALENESS: Tick = Tick::MAX / 4;

/// Last-visit tick per cell for the current run.
///
/// A cell that was never visited is maximally stale, whatever tick the
/// timeline started at.
#[derive(Clone, Debug, Default)]
pub struct RecencyTracker {
    last_visit: Vec<Option<Tick>>,
    visited: usize,
}

impl RecencyTracker {
    pub fn new(cell_count: usize) -> Self {
        Self {
            last_visit: vec![None; cell_count],
            visited: 0,
        }
    }

    /// Overwrites the visit tick of `index`. Out-of-range indices are ignored.
    pub fn record_visit(&mut self, index: CellIndex, now: Tick) {
        let Some(slot) = self.last_visit.get_mut(index) else {
            return;
        };
        if slot.is_none() {
            self.visited += 1;
        }
        *slot = Some(now);
    }

    pub fn last_visit(&self, index: CellIndex) -> Option<Tick> {
        self.last_visit.get(index).copied().flatten()
    }

    pub fn time_since(&self, index: CellIndex, now: Tick) -> Tick {
        match self.last_visit(index) {
            Some(at) => now.saturating_sub(at),
            None => UNSEEN_STALENESS,
        }
    }

    /// Number of distinct cells visited since the last clear.
    pub fn visited_count(&self) -> usize {
        self.visited
    }

    pub fn cell_count(&self) -> usize {
        self.last_visit.len()
    }

    pub fn is_covered(&self) -> bool {
        self.visited == self.last_visit.len()
    }

    pub fn clear(&mut self) {
        self.last_visit.iter_mut().for_each(|slot| *slot = None);
        self.visited = 0;
    }
}
