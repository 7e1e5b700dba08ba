/// Milliseconds on the run's monotonic timeline.
pub type Tick = u64;

/// Animation-frame layout used by frame-driven timing and headless drivers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Timebase {
    pub frame_ms: Tick,
}

impl Default for Timebase {
    fn default() -> Self {
        Self { frame_ms: 16 }
    }
}

impl Timebase {
    pub fn new(frame_ms: Tick) -> Self {
        Self {
            frame_ms: frame_ms.max(1),
        }
    }

    pub fn frame_start_tick(&self, frame_idx: u64) -> Tick {
        frame_idx.saturating_mul(self.frame_ms)
    }

    pub fn frame_end_tick(&self, frame_idx: u64) -> Tick {
        self.frame_start_tick(frame_idx)
            .saturating_add(self.frame_ms)
    }

    /// Number of whole frames that fit in `span`.
    pub fn frames_in(&self, span: Tick) -> u64 {
        span / self.frame_ms.max(1)
    }

    /// First frame boundary strictly after `now`.
    pub fn next_frame_after(&self, now: Tick) -> Tick {
        let frame_ms = self.frame_ms.max(1);
        (now / frame_ms + 1).saturating_mul(frame_ms)
    }
}
