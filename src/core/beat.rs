//! Bass-band beat detection over analyser byte bins.
//!
//! The detector does not run an FFT; it consumes per-frame bin magnitudes
//! (0..=255) from a spectral collaborator and keeps a short window of bass
//! energy to compare each frame against.

use std::collections::VecDeque;

use crate::core::timebase::Tick;

pub const DEFAULT_BASS_BINS: usize = 10;
pub const DEFAULT_HISTORY_LEN: usize = 20;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BeatEnergy {
    /// Mean magnitude of the bass bins this frame.
    pub bass: f32,
    /// Mean of the bass window, this frame included.
    pub average: f32,
}

#[derive(Clone, Debug)]
pub struct BeatDetector {
    bass_bins: usize,
    capacity: usize,
    history: VecDeque<f32>,
    last: BeatEnergy,
}

impl Default for BeatDetector {
    fn default() -> Self {
        Self::new(DEFAULT_BASS_BINS, DEFAULT_HISTORY_LEN)
    }
}

impl BeatDetector {
    pub fn new(bass_bins: usize, history_len: usize) -> Self {
        let capacity = history_len.max(1);
        Self {
            bass_bins: bass_bins.max(1),
            capacity,
            history: VecDeque::with_capacity(capacity + 1),
            last: BeatEnergy::default(),
        }
    }

    /// Feeds one spectral frame and returns its bass energy and the window mean.
    pub fn process(&mut self, bins: &[u8]) -> BeatEnergy {
        let band = &bins[..bins.len().min(self.bass_bins)];
        let bass = if band.is_empty() {
            0.0
        } else {
            band.iter().map(|&b| b as f32).sum::<f32>() / band.len() as f32
        };

        self.history.push_back(bass);
        while self.history.len() > self.capacity {
            self.history.pop_front();
        }
        let average = self.history.iter().sum::<f32>() / self.history.len() as f32;

        self.last = BeatEnergy { bass, average };
        self.last
    }

    pub fn last(&self) -> BeatEnergy {
        self.last
    }

    pub fn window_len(&self) -> usize {
        self.history.len()
    }

    pub fn reset(&mut self) {
        self.history.clear();
        self.last = BeatEnergy::default();
    }
}

/// Decides whether a frame's energy counts as a beat.
#[derive(Clone, Debug)]
pub struct BeatGate {
    cooldown_ms: Tick,
    last_beat: Option<Tick>,
}

impl BeatGate {
    pub fn new(cooldown_ms: Tick) -> Self {
        Self {
            cooldown_ms,
            last_beat: None,
        }
    }

    /// True when `energy.bass` exceeds `threshold` times the window mean and
    /// the cooldown since the previous beat has elapsed. Records the beat.
    pub fn check(&mut self, now: Tick, energy: BeatEnergy, threshold: f32) -> bool {
        if energy.bass <= energy.average * threshold {
            return false;
        }
        if let Some(last) = self.last_beat {
            if now.saturating_sub(last) < self.cooldown_ms {
                return false;
            }
        }
        self.last_beat = Some(now);
        true
    }

    pub fn last_beat(&self) -> Option<Tick> {
        self.last_beat
    }

    pub fn reset(&mut self) {
        self.last_beat = None;
    }
}
