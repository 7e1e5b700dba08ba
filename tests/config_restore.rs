use std::fs;
use std::path::PathBuf;

use light_roulette::config::{
    AppConfig, AudioConfig, BeatConfig, PlaybackConfig, TimingConfig, WalkConfig,
};

fn unique_path(name: &str) -> PathBuf {
    let mut path = std::env::temp_dir();
    path.push(format!(
        "light_roulette_config_restore_{}_{}",
        name,
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ));
    path
}

fn custom_config() -> AppConfig {
    AppConfig {
        timing: TimingConfig {
            min_run_ms: 1500,
            slowdown_ms: 3000,
            base_interval_ms: 40,
            slowdown_span_ms: 800.0,
        },
        walk: WalkConfig {
            stale_floor_ms: 50.0,
            jitter_lo: 0.95,
            jitter_hi: 1.05,
            seed: Some(1234),
        },
        beat: BeatConfig {
            bass_bins: 8,
            history_len: 30,
            threshold: 1.3,
            threshold_gain: 1.0,
            max_interval_ms: 120.0,
            max_interval_gain_ms: 600.0,
            cooldown_ms: 80,
            frame_ms: 20,
            ready_retry_ms: 200,
            ready_max_attempts: 10,
        },
        audio: AudioConfig {
            fft_size: 1024,
            smoothing: 0.5,
            min_db: -90.0,
            max_db: -20.0,
        },
        playback: PlaybackConfig { realtime: false },
    }
}

#[test]
fn written_config_is_restored() {
    let path = unique_path("custom.toml");
    let expected = custom_config();
    fs::write(&path, toml::to_string_pretty(&expected).unwrap()).unwrap();

    let cfg = AppConfig::load_or_default(&path.to_string_lossy());
    assert_eq!(cfg, expected);

    let timing = cfg.timing_params();
    assert_eq!(timing.min_run_ms, 1500);
    assert_eq!(timing.ready_max_attempts, 10);
    assert_eq!(cfg.beat_params().cooldown_ms, 80);
    assert_eq!(cfg.walk_params().stale_floor_ms, 50.0);

    let _ = fs::remove_file(&path);
}

#[test]
fn generated_template_round_trips_to_defaults() {
    let path = unique_path("template.toml");
    let _ = fs::remove_file(&path);
    let path_str = path.to_string_lossy().to_string();

    let first = AppConfig::load_or_default(&path_str);
    let written = fs::read_to_string(&path).expect("template written");
    let second = AppConfig::load_or_default(&path_str);
    assert_eq!(first, second);
    assert_eq!(fs::read_to_string(&path).unwrap(), written, "existing file kept");

    let _ = fs::remove_file(&path);
}
