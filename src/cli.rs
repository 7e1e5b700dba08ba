use clap::{Parser, ValueEnum};

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    /// Fixed interval, eased out while slowing
    Clock,
    /// Move on bass beats of a WAV file or a synthetic pulse
    Beat,
}

#[derive(Parser, Debug, Clone)]
#[command(author, version, about)]
pub struct Args {
    /// File with one name per line
    #[arg(value_name = "NAMES_FILE")]
    pub names_file: Option<String>,

    /// Add a name (repeatable)
    #[arg(long = "name", value_name = "NAME")]
    pub names: Vec<String>,

    /// Timing strategy
    #[arg(long, value_enum, default_value_t = Mode::Clock)]
    pub mode: Mode,

    /// WAV file to analyse in beat mode
    #[arg(long)]
    pub wav: Option<String>,

    /// Tempo of the synthetic pulse when beat mode has no WAV file
    #[arg(long, default_value_t = 120.0)]
    pub bpm: f32,

    /// Seed for reproducible runs (overrides config)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Path to config TOML
    #[arg(long, default_value = "config.toml")]
    pub config: String,

    /// Simulate the run instead of pacing it in real time
    #[arg(long, default_value_t = false)]
    pub headless: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_and_mode_parse() {
        let args = Args::parse_from([
            "light-roulette",
            "names.txt",
            "--name",
            "Ada",
            "--name",
            "Grace",
            "--mode",
            "beat",
            "--bpm",
            "90",
            "--headless",
        ]);
        assert_eq!(args.names_file.as_deref(), Some("names.txt"));
        assert_eq!(args.names, ["Ada", "Grace"]);
        assert_eq!(args.mode, Mode::Beat);
        assert_eq!(args.bpm, 90.0);
        assert!(args.headless);
        assert_eq!(args.config, "config.toml");
    }

    #[test]
    fn defaults_to_clock_mode() {
        let args = Args::parse_from(["light-roulette", "--name", "solo"]);
        assert_eq!(args.mode, Mode::Clock);
        assert!(args.names_file.is_none());
        assert!(args.seed.is_none());
        assert!(!args.headless);
    }
}
