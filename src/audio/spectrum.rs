use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};
use std::thread;

use rustfft::{Fft, FftPlanner, num_complex::Complex32};
use tracing::{debug, warn};

use super::{AudioError, SpectrumSource};
use crate::core::timebase::Tick;

/// Analyser settings, mirroring a browser `AnalyserNode`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AnalyserParams {
    pub fft_size: usize,
    /// Weight of the previous frame in the magnitude smoothing, `[0, 1)`.
    pub smoothing: f32,
    pub min_db: f32,
    pub max_db: f32,
}

impl Default for AnalyserParams {
    fn default() -> Self {
        Self {
            fft_size: 2048,
            smoothing: 0.8,
            min_db: -100.0,
            max_db: -30.0,
        }
    }
}

/// Mono samples with their rate.
#[derive(Clone, Debug)]
pub struct DecodedAudio {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

impl DecodedAudio {
    pub fn duration_ms(&self) -> Tick {
        if self.sample_rate == 0 {
            return 0;
        }
        self.samples.len() as Tick * 1000 / self.sample_rate as Tick
    }
}

/// Reads a WAV file and downmixes it to mono.
pub fn decode_wav(path: &Path) -> Result<DecodedAudio, AudioError> {
    let mut reader =
        hound::WavReader::open(path).map_err(|e| AudioError::Decode(e.to_string()))?;
    let spec = reader.spec();
    let channels = spec.channels.max(1) as usize;

    let interleaved: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<Result<_, _>>()
            .map_err(|e| AudioError::Decode(e.to_string()))?,
        hound::SampleFormat::Int => {
            let scale = 1.0 / (1u64 << (spec.bits_per_sample.max(1) - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 * scale))
                .collect::<Result<_, _>>()
                .map_err(|e| AudioError::Decode(e.to_string()))?
        }
    };

    let samples = interleaved
        .chunks(channels)
        .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
        .collect();
    Ok(DecodedAudio {
        samples,
        sample_rate: spec.sample_rate,
    })
}

/// Periodic Hann window.
fn hann_window(n: usize) -> Vec<f32> {
    match n {
        0 => Vec::new(),
        1 => vec![1.0],
        _ => {
            let two_pi = std::f32::consts::PI * 2.0;
            (0..n)
                .map(|i| 0.5 * (1.0 - (two_pi * i as f32 / n as f32).cos()))
                .collect()
        }
    }
}

/// Byte-bin analyser over a decoded track.
///
/// The track is considered playing from the tick passed to `start`; each
/// `frequency_data` call analyses the `fft_size` samples ending at `now`.
pub struct WavSpectrum {
    audio: Arc<OnceLock<Result<DecodedAudio, AudioError>>>,
    params: AnalyserParams,
    fft: Arc<dyn Fft<f32>>,
    window: Vec<f32>,
    buf: Vec<Complex32>,
    smoothed: Vec<f32>,
    origin: Option<Tick>,
}

impl WavSpectrum {
    fn with_slot(
        audio: Arc<OnceLock<Result<DecodedAudio, AudioError>>>,
        params: AnalyserParams,
    ) -> Self {
        let fft_size = params.fft_size.max(32).next_power_of_two();
        let params = AnalyserParams { fft_size, ..params };
        let fft = FftPlanner::<f32>::new().plan_fft_forward(fft_size);
        Self {
            audio,
            params,
            fft,
            window: hann_window(fft_size),
            buf: vec![Complex32::new(0.0, 0.0); fft_size],
            smoothed: vec![0.0; fft_size / 2],
            origin: None,
        }
    }

    /// Ready immediately.
    pub fn from_decoded(audio: DecodedAudio, params: AnalyserParams) -> Self {
        let slot = Arc::new(OnceLock::new());
        let _ = slot.set(Ok(audio));
        Self::with_slot(slot, params)
    }

    /// Decodes `path` on a worker thread; the source reports not-ready until
    /// decoding has finished successfully.
    pub fn load_in_background(path: impl Into<PathBuf>, params: AnalyserParams) -> Self {
        let path = path.into();
        let slot = Arc::new(OnceLock::new());
        let slot_worker = Arc::clone(&slot);
        let spawned = thread::Builder::new()
            .name("wav-decode".into())
            .spawn(move || {
                let result = decode_wav(&path);
                match &result {
                    Ok(audio) => debug!(
                        target: "audio::wav",
                        path = %path.display(),
                        sample_rate = audio.sample_rate,
                        duration_ms = audio.duration_ms(),
                        "decoded"
                    ),
                    Err(err) => warn!(
                        target: "audio::wav",
                        path = %path.display(),
                        %err,
                        "decode failed"
                    ),
                }
                let _ = slot_worker.set(result);
            });
        if let Err(err) = spawned {
            let _ = slot.set(Err(AudioError::Decode(err.to_string())));
        }
        Self::with_slot(slot, params)
    }

    /// The decode failure, once decoding has finished unsuccessfully.
    pub fn decode_error(&self) -> Option<AudioError> {
        match self.audio.get() {
            Some(Err(err)) => Some(err.clone()),
            _ => None,
        }
    }

    pub fn bin_count(&self) -> usize {
        self.params.fft_size / 2
    }

    fn analyse(&mut self, audio_pos: usize) {
        let Some(Ok(audio)) = self.audio.get() else {
            return;
        };
        let n = self.params.fft_size;
        let first = audio_pos as isize - n as isize;
        for (i, slot) in self.buf.iter_mut().enumerate() {
            let idx = first + i as isize;
            let s = if idx >= 0 {
                audio.samples.get(idx as usize).copied().unwrap_or(0.0)
            } else {
                0.0
            };
            *slot = Complex32::new(s * self.window[i], 0.0);
        }
        self.fft.process(&mut self.buf);

        let tau = self.params.smoothing.clamp(0.0, 0.999);
        let inv_n = 1.0 / n as f32;
        for (k, sm) in self.smoothed.iter_mut().enumerate() {
            let mag = self.buf[k].norm() * inv_n;
            *sm = tau * *sm + (1.0 - tau) * mag;
        }
    }

    fn to_byte(&self, mag: f32) -> u8 {
        let range = (self.params.max_db - self.params.min_db).max(1e-3);
        let db = 20.0 * mag.max(1e-12).log10();
        let scaled = 255.0 * (db - self.params.min_db) / range;
        scaled.clamp(0.0, 255.0) as u8
    }
}

impl SpectrumSource for WavSpectrum {
    fn is_ready(&self) -> bool {
        matches!(self.audio.get(), Some(Ok(_)))
    }

    fn start(&mut self, now: Tick) -> Result<(), AudioError> {
        if !self.is_ready() {
            return Err(self.decode_error().unwrap_or(AudioError::NotReady));
        }
        self.origin = Some(now);
        self.smoothed.iter_mut().for_each(|s| *s = 0.0);
        Ok(())
    }

    fn frequency_data(&mut self, now: Tick, out: &mut Vec<u8>) {
        out.clear();
        out.resize(self.bin_count(), 0);
        let (Some(origin), Some(Ok(audio))) = (self.origin, self.audio.get()) else {
            return;
        };
        let sample_rate = audio.sample_rate as u128;
        let elapsed = now.saturating_sub(origin) as u128;
        self.analyse((elapsed * sample_rate / 1000) as usize);
        for (dst, &mag) in out.iter_mut().zip(self.smoothed.iter()) {
            *dst = self.to_byte(mag);
        }
    }

    fn stop(&mut self) {
        self.origin = None;
    }
}
