use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::warn;

use crate::audio::spectrum::AnalyserParams;
use crate::core::timebase::Tick;
use crate::core::walk::WalkParams;
use crate::run::TimingParams;
use crate::run::tick_source::BeatParams;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TimingConfig {
    #[serde(default = "TimingConfig::default_min_run_ms")]
    pub min_run_ms: Tick,
    #[serde(default = "TimingConfig::default_slowdown_ms")]
    pub slowdown_ms: Tick,
    #[serde(default = "TimingConfig::default_base_interval_ms")]
    pub base_interval_ms: Tick,
    #[serde(default = "TimingConfig::default_slowdown_span_ms")]
    pub slowdown_span_ms: f32,
}

impl TimingConfig {
    fn default_min_run_ms() -> Tick {
        2000
    }
    fn default_slowdown_ms() -> Tick {
        4000
    }
    fn default_base_interval_ms() -> Tick {
        50
    }
    fn default_slowdown_span_ms() -> f32 {
        1000.0
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            min_run_ms: Self::default_min_run_ms(),
            slowdown_ms: Self::default_slowdown_ms(),
            base_interval_ms: Self::default_base_interval_ms(),
            slowdown_span_ms: Self::default_slowdown_span_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WalkConfig {
    #[serde(default = "WalkConfig::default_stale_floor_ms")]
    pub stale_floor_ms: f64,
    #[serde(default = "WalkConfig::default_jitter_lo")]
    pub jitter_lo: f64,
    #[serde(default = "WalkConfig::default_jitter_hi")]
    pub jitter_hi: f64,
    /// Fixed seed for reproducible draws; entropy when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl WalkConfig {
    fn default_stale_floor_ms() -> f64 {
        100.0
    }
    fn default_jitter_lo() -> f64 {
        0.9
    }
    fn default_jitter_hi() -> f64 {
        1.1
    }
}

impl Default for WalkConfig {
    fn default() -> Self {
        Self {
            stale_floor_ms: Self::default_stale_floor_ms(),
            jitter_lo: Self::default_jitter_lo(),
            jitter_hi: Self::default_jitter_hi(),
            seed: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BeatConfig {
    #[serde(default = "BeatConfig::default_bass_bins")]
    pub bass_bins: usize,
    #[serde(default = "BeatConfig::default_history_len")]
    pub history_len: usize,
    #[serde(default = "BeatConfig::default_threshold")]
    pub threshold: f32,
    #[serde(default = "BeatConfig::default_threshold_gain")]
    pub threshold_gain: f32,
    #[serde(default = "BeatConfig::default_max_interval_ms")]
    pub max_interval_ms: f32,
    #[serde(default = "BeatConfig::default_max_interval_gain_ms")]
    pub max_interval_gain_ms: f32,
    #[serde(default = "BeatConfig::default_cooldown_ms")]
    pub cooldown_ms: Tick,
    #[serde(default = "BeatConfig::default_frame_ms")]
    pub frame_ms: Tick,
    #[serde(default = "BeatConfig::default_ready_retry_ms")]
    pub ready_retry_ms: Tick,
    #[serde(default = "BeatConfig::default_ready_max_attempts")]
    pub ready_max_attempts: u32,
}

impl BeatConfig {
    fn default_bass_bins() -> usize {
        10
    }
    fn default_history_len() -> usize {
        20
    }
    fn default_threshold() -> f32 {
        1.15
    }
    fn default_threshold_gain() -> f32 {
        1.5
    }
    fn default_max_interval_ms() -> f32 {
        100.0
    }
    fn default_max_interval_gain_ms() -> f32 {
        900.0
    }
    fn default_cooldown_ms() -> Tick {
        60
    }
    fn default_frame_ms() -> Tick {
        16
    }
    fn default_ready_retry_ms() -> Tick {
        100
    }
    fn default_ready_max_attempts() -> u32 {
        50
    }
}

impl Default for BeatConfig {
    fn default() -> Self {
        Self {
            bass_bins: Self::default_bass_bins(),
            history_len: Self::default_history_len(),
            threshold: Self::default_threshold(),
            threshold_gain: Self::default_threshold_gain(),
            max_interval_ms: Self::default_max_interval_ms(),
            max_interval_gain_ms: Self::default_max_interval_gain_ms(),
            cooldown_ms: Self::default_cooldown_ms(),
            frame_ms: Self::default_frame_ms(),
            ready_retry_ms: Self::default_ready_retry_ms(),
            ready_max_attempts: Self::default_ready_max_attempts(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AudioConfig {
    #[serde(default = "AudioConfig::default_fft_size")]
    pub fft_size: usize,
    #[serde(default = "AudioConfig::default_smoothing")]
    pub smoothing: f32,
    #[serde(default = "AudioConfig::default_min_db")]
    pub min_db: f32,
    #[serde(default = "AudioConfig::default_max_db")]
    pub max_db: f32,
}

impl AudioConfig {
    fn default_fft_size() -> usize {
        2048
    }
    fn default_smoothing() -> f32 {
        0.8
    }
    fn default_min_db() -> f32 {
        -100.0
    }
    fn default_max_db() -> f32 {
        -30.0
    }
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            fft_size: Self::default_fft_size(),
            smoothing: Self::default_smoothing(),
            min_db: Self::default_min_db(),
            max_db: Self::default_max_db(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlaybackConfig {
    /// Pace the run against the wall clock. When false the run is simulated.
    #[serde(default = "PlaybackConfig::default_realtime")]
    pub realtime: bool,
}

impl PlaybackConfig {
    fn default_realtime() -> bool {
        true
    }
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            realtime: Self::default_realtime(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub timing: TimingConfig,
    #[serde(default)]
    pub walk: WalkConfig,
    #[serde(default)]
    pub beat: BeatConfig,
    #[serde(default)]
    pub audio: AudioConfig,
    #[serde(default)]
    pub playback: PlaybackConfig,
}

impl AppConfig {
    pub fn timing_params(&self) -> TimingParams {
        TimingParams {
            min_run_ms: self.timing.min_run_ms,
            slowdown_ms: self.timing.slowdown_ms,
            base_interval_ms: self.timing.base_interval_ms,
            slowdown_span_ms: self.timing.slowdown_span_ms,
            ready_retry_ms: self.beat.ready_retry_ms,
            ready_max_attempts: self.beat.ready_max_attempts,
        }
    }

    pub fn walk_params(&self) -> WalkParams {
        WalkParams {
            stale_floor_ms: self.walk.stale_floor_ms,
            jitter_lo: self.walk.jitter_lo,
            jitter_hi: self.walk.jitter_hi,
        }
    }

    pub fn beat_params(&self) -> BeatParams {
        BeatParams {
            bass_bins: self.beat.bass_bins,
            history_len: self.beat.history_len,
            threshold: self.beat.threshold,
            threshold_gain: self.beat.threshold_gain,
            max_interval_ms: self.beat.max_interval_ms,
            max_interval_gain_ms: self.beat.max_interval_gain_ms,
            cooldown_ms: self.beat.cooldown_ms,
            frame_ms: self.beat.frame_ms,
        }
    }

    pub fn analyser_params(&self) -> AnalyserParams {
        AnalyserParams {
            fft_size: self.audio.fft_size,
            smoothing: self.audio.smoothing,
            min_db: self.audio.min_db,
            max_db: self.audio.max_db,
        }
    }

    fn round_f32(x: f32) -> f32 {
        (x * 1_000_000.0).round() / 1_000_000.0
    }

    fn format_float_compact(x: f64) -> String {
        let mut s = format!("{:.6}", x);
        while s.contains('.') && s.ends_with('0') {
            s.pop();
        }
        if s.ends_with('.') {
            s.pop();
        }
        if s.is_empty() || s == "-0" {
            "0".to_string()
        } else {
            s
        }
    }

    fn rounded(mut self) -> Self {
        self.timing.slowdown_span_ms = Self::round_f32(self.timing.slowdown_span_ms);
        self.beat.threshold = Self::round_f32(self.beat.threshold);
        self.beat.threshold_gain = Self::round_f32(self.beat.threshold_gain);
        self.beat.max_interval_ms = Self::round_f32(self.beat.max_interval_ms);
        self.beat.max_interval_gain_ms = Self::round_f32(self.beat.max_interval_gain_ms);
        self.audio.smoothing = Self::round_f32(self.audio.smoothing);
        self.audio.min_db = Self::round_f32(self.audio.min_db);
        self.audio.max_db = Self::round_f32(self.audio.max_db);
        self
    }

    /// Every key commented out, so the file documents the defaults without
    /// pinning them.
    fn commented_template(text: &str) -> String {
        let mut commented = String::new();
        for line in text.lines() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                commented.push('\n');
                continue;
            }
            if trimmed.starts_with('[') && trimmed.ends_with(']') {
                commented.push_str(line);
                commented.push('\n');
                continue;
            }
            let mut out_line = line.to_string();
            if let Some((lhs, rhs)) = line.split_once('=') {
                let rhs_trim = rhs.trim();
                let has_decimal = rhs_trim.contains('.');
                let is_float = has_decimal || rhs_trim.contains('e') || rhs_trim.contains('E');
                if is_float && !rhs_trim.contains('"') {
                    if let Ok(val) = rhs_trim.parse::<f64>() {
                        let mut formatted = Self::format_float_compact(val);
                        if has_decimal && !formatted.contains('.') {
                            formatted.push_str(".0");
                        }
                        out_line = format!("{} = {}", lhs.trim(), formatted);
                    }
                }
            }
            commented.push_str("# ");
            commented.push_str(&out_line);
            commented.push('\n');
        }
        commented
    }

    pub fn load_or_default(path: &str) -> Self {
        let path_obj = Path::new(path);
        if path_obj.exists() {
            match fs::read_to_string(path_obj) {
                Ok(contents) => match toml::from_str(&contents) {
                    Ok(cfg) => return cfg,
                    Err(err) => {
                        warn!(path, %err, "failed to parse config; using defaults");
                    }
                },
                Err(err) => {
                    warn!(path, %err, "failed to read config; using defaults");
                }
            }
            return Self::default();
        }

        let default_cfg = Self::default().rounded();
        match toml::to_string_pretty(&default_cfg) {
            Ok(text) => {
                if let Err(err) = fs::write(path_obj, Self::commented_template(&text)) {
                    warn!(path, %err, "failed to write default config");
                }
            }
            Err(err) => warn!(%err, "failed to serialize default config"),
        }
        default_cfg
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn unique_path(name: &str) -> std::path::PathBuf {
        let mut p = std::env::temp_dir();
        p.push(format!(
            "light_roulette_config_test_{}_{}",
            name,
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap()
                .as_nanos()
        ));
        p
    }

    #[test]
    fn load_or_default_writes_commented_template() {
        let path = unique_path("defaults.toml");
        let path_str = path.to_string_lossy().to_string();
        let _ = fs::remove_file(&path);

        let cfg = AppConfig::load_or_default(&path_str);
        assert!(path.exists(), "config file should be created");
        assert_eq!(cfg.timing.min_run_ms, 2000);
        assert_eq!(cfg.beat.ready_max_attempts, 50);
        assert_eq!(cfg.walk.seed, None);
        assert!(cfg.playback.realtime);

        let contents = fs::read_to_string(&path).expect("read written config");
        assert!(contents.contains("[timing]"));
        assert!(contents.contains("# min_run_ms = 2000"), "{contents}");
        assert!(contents.contains("# smoothing = 0.8"), "{contents}");
        assert!(contents.contains("# threshold = 1.15"), "{contents}");
        assert!(contents.contains("# min_db = -100.0"), "{contents}");
        assert!(contents.contains("# realtime = true"), "{contents}");

        // The template parses back to the defaults.
        let reread: AppConfig = toml::from_str(&contents).expect("template parses");
        assert_eq!(reread, AppConfig::default());

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn partial_file_fills_missing_keys() {
        let path = unique_path("partial.toml");
        let path_str = path.to_string_lossy().to_string();
        fs::write(&path, "[walk]\nseed = 7\n\n[timing]\nmin_run_ms = 500\n").unwrap();

        let cfg = AppConfig::load_or_default(&path_str);
        assert_eq!(cfg.walk.seed, Some(7));
        assert_eq!(cfg.walk.jitter_hi, 1.1);
        assert_eq!(cfg.timing.min_run_ms, 500);
        assert_eq!(cfg.timing.slowdown_ms, 4000);
        assert_eq!(cfg.beat, BeatConfig::default());

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn unparsable_file_falls_back_to_defaults() {
        let path = unique_path("broken.toml");
        let path_str = path.to_string_lossy().to_string();
        fs::write(&path, "[timing\nmin_run_ms = ").unwrap();

        let cfg = AppConfig::load_or_default(&path_str);
        assert_eq!(cfg, AppConfig::default());

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn params_carry_config_values() {
        let mut cfg = AppConfig::default();
        cfg.beat.ready_retry_ms = 250;
        cfg.beat.frame_ms = 20;
        cfg.audio.fft_size = 1024;
        assert_eq!(cfg.timing_params().ready_retry_ms, 250);
        assert_eq!(cfg.beat_params().frame_ms, 20);
        assert_eq!(cfg.analyser_params().fft_size, 1024);
        assert_eq!(cfg.walk_params(), WalkParams::default());

        let defaults = AppConfig::default();
        assert_eq!(defaults.timing_params(), TimingParams::default());
        assert_eq!(defaults.beat_params(), BeatParams::default());
        assert_eq!(defaults.analyser_params(), AnalyserParams::default());
    }
}
