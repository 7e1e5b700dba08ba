//! When the light is allowed to move.
//!
//! The controller only talks to [`TickSource`]; fixed-interval and
//! beat-gated timing differ solely in how they answer `poll`.

use tracing::debug;

use super::{Pace, TimingParams};
use crate::audio::{AudioError, SpectrumSource};
use crate::core::beat::{
    BeatDetector, BeatEnergy, BeatGate, DEFAULT_BASS_BINS, DEFAULT_HISTORY_LEN,
};
use crate::core::easing::ease_out_cubic;
use crate::core::timebase::{Tick, Timebase};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Poll {
    /// No decision point at this tick.
    Idle,
    /// A decision point without a move.
    Step,
    /// Move now.
    Move,
}

pub trait TickSource: Send {
    fn name(&self) -> &'static str;

    /// False while an external dependency (audio) is still loading.
    fn is_ready(&self) -> bool {
        true
    }

    /// Called once when a run starts. An error is reported by the caller and
    /// the run proceeds.
    fn begin(&mut self, now: Tick) -> Result<(), AudioError>;

    fn poll(&mut self, now: Tick, pace: Pace) -> Poll;

    /// Called after every move, with the pace in effect after any phase change.
    fn moved(&mut self, now: Tick, pace: Pace);

    /// Earliest tick at which `poll` may answer something other than `Idle`.
    fn next_wake(&self) -> Tick;

    fn end(&mut self) {}
}

/// Fixed delay between moves, stretched by a cubic ease-out while slowing.
#[derive(Debug, Clone)]
pub struct FixedInterval {
    base_ms: Tick,
    span_ms: f32,
    next_due: Tick,
}

impl FixedInterval {
    pub fn new(base_ms: Tick, span_ms: f32) -> Self {
        Self {
            base_ms,
            span_ms,
            next_due: 0,
        }
    }

    pub fn from_timing(timing: &TimingParams) -> Self {
        Self::new(timing.base_interval_ms, timing.slowdown_span_ms)
    }

    /// Delay before the next move. Reaches `base + span` at progress 1.
    pub fn interval_ms(&self, pace: Pace) -> f32 {
        match pace {
            Pace::Covering => self.base_ms as f32,
            Pace::Slowing { progress } => {
                self.base_ms as f32 + self.span_ms * ease_out_cubic(progress)
            }
        }
    }
}

impl TickSource for FixedInterval {
    fn name(&self) -> &'static str {
        "fixed-interval"
    }

    fn begin(&mut self, now: Tick) -> Result<(), AudioError> {
        self.next_due = now;
        Ok(())
    }

    fn poll(&mut self, now: Tick, _pace: Pace) -> Poll {
        if now >= self.next_due {
            Poll::Move
        } else {
            Poll::Idle
        }
    }

    fn moved(&mut self, now: Tick, pace: Pace) {
        let interval = self.interval_ms(pace).round().max(1.0) as Tick;
        self.next_due = now.saturating_add(interval);
    }

    fn next_wake(&self) -> Tick {
        self.next_due
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BeatParams {
    pub bass_bins: usize,
    pub history_len: usize,
    pub threshold: f32,
    pub threshold_gain: f32,
    pub max_interval_ms: f32,
    pub max_interval_gain_ms: f32,
    pub cooldown_ms: Tick,
    pub frame_ms: Tick,
}

impl Default for BeatParams {
    fn default() -> Self {
        Self {
            bass_bins: DEFAULT_BASS_BINS,
            history_len: DEFAULT_HISTORY_LEN,
            threshold: 1.15,
            threshold_gain: 1.5,
            max_interval_ms: 100.0,
            max_interval_gain_ms: 900.0,
            cooldown_ms: 60,
            frame_ms: 16,
        }
    }
}

impl BeatParams {
    /// Energy ratio a beat must exceed; rises linearly while slowing.
    pub fn threshold(&self, pace: Pace) -> f32 {
        self.threshold + self.threshold_gain * pace.progress()
    }

    /// Longest quiet gap before a move is forced; rises linearly while slowing.
    pub fn max_interval_ms(&self, pace: Pace) -> f32 {
        self.max_interval_ms + self.max_interval_gain_ms * pace.progress()
    }
}

/// Moves on detected bass beats, with a fallback for quiet passages.
/// Polled once per animation frame.
pub struct BeatGated<S> {
    source: S,
    params: BeatParams,
    detector: BeatDetector,
    gate: BeatGate,
    timebase: Timebase,
    bins: Vec<u8>,
    last_move: Tick,
    next_frame: Tick,
    last_energy: BeatEnergy,
}

impl<S: SpectrumSource> BeatGated<S> {
    pub fn new(source: S, params: BeatParams) -> Self {
        Self {
            detector: BeatDetector::new(params.bass_bins, params.history_len),
            gate: BeatGate::new(params.cooldown_ms),
            timebase: Timebase::new(params.frame_ms),
            source,
            params,
            bins: Vec::new(),
            last_move: 0,
            next_frame: 0,
            last_energy: BeatEnergy::default(),
        }
    }

    pub fn params(&self) -> &BeatParams {
        &self.params
    }

    pub fn timebase(&self) -> Timebase {
        self.timebase
    }

    pub fn last_energy(&self) -> BeatEnergy {
        self.last_energy
    }

    pub fn source(&self) -> &S {
        &self.source
    }
}

impl<S: SpectrumSource> TickSource for BeatGated<S> {
    fn name(&self) -> &'static str {
        "beat-gated"
    }

    fn is_ready(&self) -> bool {
        self.source.is_ready()
    }

    fn begin(&mut self, now: Tick) -> Result<(), AudioError> {
        self.detector.reset();
        self.gate.reset();
        self.last_move = now;
        self.next_frame = now;
        self.last_energy = BeatEnergy::default();
        self.source.start(now)
    }

    fn poll(&mut self, now: Tick, pace: Pace) -> Poll {
        self.next_frame = now.saturating_add(self.timebase.frame_ms);

        self.source.frequency_data(now, &mut self.bins);
        let energy = self.detector.process(&self.bins);
        self.last_energy = energy;

        let beat = self.gate.check(now, energy, self.params.threshold(pace));
        let quiet_for = now.saturating_sub(self.last_move) as f32;
        let fallback = quiet_for > self.params.max_interval_ms(pace);
        if !(beat || fallback) {
            return Poll::Step;
        }
        debug!(
            target: "run::beat",
            now,
            beat,
            fallback,
            bass = energy.bass,
            average = energy.average,
            progress = pace.progress()
        );
        Poll::Move
    }

    fn moved(&mut self, now: Tick, _pace: Pace) {
        self.last_move = now;
    }

    fn next_wake(&self) -> Tick {
        self.next_frame
    }

    fn end(&mut self) {
        self.source.stop();
    }
}
