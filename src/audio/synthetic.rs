//! Generated spectra for headless runs and tests.

use super::SpectrumSource;
use crate::core::beat::DEFAULT_BASS_BINS;
use crate::core::timebase::Tick;

const SYNTH_BINS: usize = 64;

/// Flat spectrum at a fixed level. Never produces a beat.
#[derive(Clone, Debug)]
pub struct ConstantSpectrum {
    pub level: u8,
}

impl ConstantSpectrum {
    pub fn new(level: u8) -> Self {
        Self { level }
    }
}

impl SpectrumSource for ConstantSpectrum {
    fn frequency_data(&mut self, _now: Tick, out: &mut Vec<u8>) {
        out.clear();
        out.resize(SYNTH_BINS, self.level);
    }
}

/// Bass kick at a fixed tempo over a quiet floor.
#[derive(Clone, Debug)]
pub struct PulseTrain {
    period_ms: Tick,
    pulse_ms: Tick,
    floor: u8,
    peak: u8,
    origin: Tick,
}

impl PulseTrain {
    pub fn new(bpm: f32) -> Self {
        let bpm = if bpm.is_finite() && bpm > 0.0 { bpm } else { 120.0 };
        Self {
            period_ms: ((60_000.0 / bpm).round() as Tick).max(1),
            pulse_ms: 30,
            floor: 40,
            peak: 220,
            origin: 0,
        }
    }

    pub fn with_levels(mut self, floor: u8, peak: u8) -> Self {
        self.floor = floor;
        self.peak = peak;
        self
    }

    pub fn with_pulse_ms(mut self, pulse_ms: Tick) -> Self {
        self.pulse_ms = pulse_ms.max(1);
        self
    }

    pub fn period_ms(&self) -> Tick {
        self.period_ms
    }

    fn in_pulse(&self, now: Tick) -> bool {
        now.saturating_sub(self.origin) % self.period_ms < self.pulse_ms
    }
}

impl SpectrumSource for PulseTrain {
    fn start(&mut self, now: Tick) -> Result<(), super::AudioError> {
        self.origin = now;
        Ok(())
    }

    fn frequency_data(&mut self, now: Tick, out: &mut Vec<u8>) {
        out.clear();
        out.resize(SYNTH_BINS, self.floor / 2);
        let bass = if self.in_pulse(now) { self.peak } else { self.floor };
        out[..DEFAULT_BASS_BINS].fill(bass);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pulse_train_kicks_on_the_beat() {
        let mut src = PulseTrain::new(120.0);
        assert_eq!(src.period_ms(), 500);
        src.start(1000).unwrap();
        let mut bins = Vec::new();
        src.frequency_data(1000, &mut bins);
        assert_eq!(bins[0], 220);
        src.frequency_data(1200, &mut bins);
        assert_eq!(bins[0], 40);
        src.frequency_data(1510, &mut bins);
        assert_eq!(bins[0], 220);
        assert_eq!(bins[DEFAULT_BASS_BINS], 20);
    }

    #[test]
    fn invalid_tempo_falls_back() {
        assert_eq!(PulseTrain::new(0.0).period_ms(), 500);
        assert_eq!(PulseTrain::new(f32::NAN).period_ms(), 500);
    }

    #[test]
    fn constant_is_flat() {
        let mut src = ConstantSpectrum::new(90);
        let mut bins = Vec::new();
        src.frequency_data(0, &mut bins);
        assert!(bins.iter().all(|&b| b == 90));
    }
}
