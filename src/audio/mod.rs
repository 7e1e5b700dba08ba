//! Spectral collaborators feeding the beat-gated timing.
//!
//! Sources hand out analyser-style byte magnitudes per frequency bin. Decoding,
//! playback and the FFT live here, outside the selection core.

pub mod spectrum;
pub mod synthetic;

use crate::core::timebase::Tick;

/// Errors reported by audio collaborators. None of them stop a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AudioError {
    /// The asset has not finished loading yet.
    NotReady,
    /// The asset could not be read or decoded.
    Decode(String),
    /// The platform refused to start playback.
    PlaybackBlocked(String),
}

impl std::fmt::Display for AudioError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AudioError::NotReady => write!(f, "audio source not ready"),
            AudioError::Decode(msg) => write!(f, "audio decode failed: {msg}"),
            AudioError::PlaybackBlocked(msg) => write!(f, "audio playback blocked: {msg}"),
        }
    }
}

impl std::error::Error for AudioError {}

pub trait SpectrumSource: Send {
    /// False while the underlying asset is still loading.
    fn is_ready(&self) -> bool {
        true
    }

    /// Begins playback at `now`. Failures are reported, never fatal.
    fn start(&mut self, _now: Tick) -> Result<(), AudioError> {
        Ok(())
    }

    /// Fills `out` with the byte magnitude of every bin at `now`.
    fn frequency_data(&mut self, now: Tick, out: &mut Vec<u8>);

    fn stop(&mut self) {}
}

impl<S: SpectrumSource + ?Sized> SpectrumSource for Box<S> {
    fn is_ready(&self) -> bool {
        (**self).is_ready()
    }

    fn start(&mut self, now: Tick) -> Result<(), AudioError> {
        (**self).start(now)
    }

    fn frequency_data(&mut self, now: Tick, out: &mut Vec<u8>) {
        (**self).frequency_data(now, out)
    }

    fn stop(&mut self) {
        (**self).stop()
    }
}
