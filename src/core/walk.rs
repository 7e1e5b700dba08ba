//! Recency-weighted random walk.
//!
//! Each neighbor is weighted by `(time_since + floor)^2 * jitter`, so cells
//! that have not been lit for a while pull the light towards them
//! quadratically. Never-lit cells are maximally stale and win over any lit
//! one. A just-visited neighbor keeps a small non-zero weight.

use rand::Rng;

use crate::core::grid::{CellIndex, GridTopology};
use crate::core::recency::RecencyTracker;
use crate::core::timebase::Tick;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WalkParams {
    pub stale_floor_ms: f64,
    pub jitter_lo: f64,
    pub jitter_hi: f64,
}

impl Default for WalkParams {
    fn default() -> Self {
        Self {
            stale_floor_ms: 100.0,
            jitter_lo: 0.9,
            jitter_hi: 1.1,
        }
    }
}

impl WalkParams {
    pub fn weight(&self, time_since: Tick, jitter: f64) -> f64 {
        let stale = time_since as f64 + self.stale_floor_ms;
        stale * stale * jitter
    }

    fn jitter<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        if self.jitter_hi > self.jitter_lo {
            rng.random_range(self.jitter_lo..self.jitter_hi)
        } else {
            self.jitter_lo
        }
    }
}

/// Picks a position from `weights` by subtracting them in order from `draw`.
///
/// `draw` is expected in `[0, total)`. Returns the first position at which the
/// remainder becomes non-positive, or 0 if it never does.
pub fn weighted_pick(weights: &[f64], draw: f64) -> usize {
    let mut remaining = draw;
    for (i, &w) in weights.iter().enumerate() {
        remaining -= w;
        if remaining <= 0.0 {
            return i;
        }
    }
    0
}

/// Marks `current` as visited at `now` and draws the next position among its
/// neighbors. An isolated cell loops onto itself.
pub fn select_next<R: Rng + ?Sized>(
    topology: &GridTopology,
    recency: &mut RecencyTracker,
    current: CellIndex,
    now: Tick,
    params: &WalkParams,
    rng: &mut R,
) -> CellIndex {
    recency.record_visit(current, now);

    let neighbors = topology.neighbors(current);
    if neighbors.is_empty() {
        return current;
    }

    let mut weights = [0.0f64; 8];
    let mut total = 0.0;
    for (slot, &n) in weights.iter_mut().zip(neighbors.iter()) {
        let w = params.weight(recency.time_since(n, now), params.jitter(rng));
        *slot = w;
        total += w;
    }
    if total <= 0.0 || !total.is_finite() {
        return neighbors[0];
    }

    let draw = rng.random::<f64>() * total;
    neighbors[weighted_pick(&weights[..neighbors.len()], draw)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    #[test]
    fn weighted_pick_walks_in_order() {
        let weights = [1.0, 2.0, 3.0];
        assert_eq!(weighted_pick(&weights, 0.0), 0);
        assert_eq!(weighted_pick(&weights, 1.0), 0);
        assert_eq!(weighted_pick(&weights, 1.5), 1);
        assert_eq!(weighted_pick(&weights, 3.0), 1);
        assert_eq!(weighted_pick(&weights, 5.999), 2);
    }

    #[test]
    fn weighted_pick_falls_back_to_first() {
        assert_eq!(weighted_pick(&[], 1.0), 0);
        assert_eq!(weighted_pick(&[1.0, 1.0], 10.0), 0);
    }

    #[test]
    fn weight_is_quadratic_with_floor() {
        let p = WalkParams::default();
        assert_eq!(p.weight(0, 1.0), 10_000.0);
        assert_eq!(p.weight(100, 1.0), 40_000.0);
        assert_eq!(p.weight(100, 1.1), 40_000.0 * 1.1);
    }

    #[test]
    fn isolated_cell_returns_itself_and_is_recorded() {
        let topo = GridTopology::build(1).unwrap();
        let mut rec = RecencyTracker::new(1);
        let mut rng = SmallRng::seed_from_u64(7);
        let next = select_next(&topo, &mut rec, 0, 42, &WalkParams::default(), &mut rng);
        assert_eq!(next, 0);
        assert_eq!(rec.last_visit(0), Some(42));
    }

    #[test]
    fn selection_is_reproducible_for_a_seed() {
        let topo = GridTopology::build(25).unwrap();
        let params = WalkParams::default();
        let run = |seed: u64| {
            let mut rec = RecencyTracker::new(topo.len());
            let mut rng = SmallRng::seed_from_u64(seed);
            let mut pos = 12;
            let mut path = Vec::new();
            for step in 0..64u64 {
                pos = select_next(&topo, &mut rec, pos, step * 50, &params, &mut rng);
                path.push(pos);
            }
            path
        };
        assert_eq!(run(11), run(11));
    }

    #[test]
    fn next_is_always_a_neighbor() {
        let topo = GridTopology::build(10).unwrap();
        let params = WalkParams::default();
        let mut rec = RecencyTracker::new(topo.len());
        let mut rng = SmallRng::seed_from_u64(3);
        let mut pos = 0;
        for step in 0..500u64 {
            let next = select_next(&topo, &mut rec, pos, step * 50, &params, &mut rng);
            assert!(topo.neighbors(pos).contains(&next), "{pos} -> {next}");
            pos = next;
        }
    }

    #[test]
    fn unseen_neighbors_beat_a_just_left_one() {
        let topo = GridTopology::build(9).unwrap();
        let params = WalkParams::default();
        let mut rng = SmallRng::seed_from_u64(19);
        let mut stepped_back = 0;
        for _ in 0..10_000 {
            // Timeline starts at 0: the light left cell 1 for cell 0 at tick 0.
            let mut rec = RecencyTracker::new(9);
            rec.record_visit(1, 0);
            let next = select_next(&topo, &mut rec, 0, 50, &params, &mut rng);
            assert!([1, 3, 4].contains(&next));
            if next == 1 {
                stepped_back += 1;
            }
        }
        assert_eq!(stepped_back, 0);
    }

    #[test]
    fn weights_stay_finite_with_every_neighbor_unseen() {
        let topo = GridTopology::build(9).unwrap();
        let mut rec = RecencyTracker::new(9);
        let mut rng = SmallRng::seed_from_u64(1);
        let next = select_next(&topo, &mut rec, 4, 0, &WalkParams::default(), &mut rng);
        assert_ne!(next, 4);
        let w = WalkParams::default().weight(rec.time_since(0, 0), 1.1);
        assert!(w.is_finite() && w * 8.0 < f64::MAX);
    }

    #[test]
    fn stale_neighbor_dominates_fresh_one() {
        // Both neighbors visited: 1 just now, 2 ten seconds ago.
        let topo = GridTopology::build(3).unwrap();
        let params = WalkParams::default();
        let mut rng = SmallRng::seed_from_u64(5);
        let mut picks_stale = 0;
        for _ in 0..1000 {
            let mut rec = RecencyTracker::new(3);
            rec.record_visit(1, 10_000);
            rec.record_visit(2, 0);
            if select_next(&topo, &mut rec, 0, 10_000, &params, &mut rng) == 2 {
                picks_stale += 1;
            }
        }
        assert!(picks_stale > 950, "stale picked {picks_stale}/1000");
    }
}
