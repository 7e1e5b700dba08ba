use crate::core::recency::RecencyTracker;
use crate::core::timebase::Tick;
use crate::core::trail::TrailBuffer;

/// State owned by exactly one live run. Built fresh on start and dropped when
/// the run finishes or is stopped.
#[derive(Debug, Clone)]
pub struct RunSession {
    pub(crate) started_at: Tick,
    pub(crate) slowdown_started_at: Option<Tick>,
    pub(crate) recency: RecencyTracker,
    pub(crate) trail: TrailBuffer,
    pub(crate) moves: u64,
}

impl RunSession {
    pub fn new(cell_count: usize, now: Tick) -> Self {
        Self {
            started_at: now,
            slowdown_started_at: None,
            recency: RecencyTracker::new(cell_count),
            trail: TrailBuffer::new(),
            moves: 0,
        }
    }

    pub fn started_at(&self) -> Tick {
        self.started_at
    }

    pub fn slowdown_started_at(&self) -> Option<Tick> {
        self.slowdown_started_at
    }

    pub fn elapsed(&self, now: Tick) -> Tick {
        now.saturating_sub(self.started_at)
    }

    pub fn recency(&self) -> &RecencyTracker {
        &self.recency
    }

    pub fn trail(&self) -> &TrailBuffer {
        &self.trail
    }

    pub fn moves(&self) -> u64 {
        self.moves
    }
}
