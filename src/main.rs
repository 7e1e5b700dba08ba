// Entry point: builds the roster and drives one run on a worker thread.
use std::process::ExitCode;
use std::sync::atomic::Ordering;

use clap::Parser;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use light_roulette::audio::SpectrumSource;
use light_roulette::audio::spectrum::WavSpectrum;
use light_roulette::audio::synthetic::PulseTrain;
use light_roulette::cli::{Args, Mode};
use light_roulette::config::AppConfig;
use light_roulette::roster::Roster;
use light_roulette::run::controller::RunController;
use light_roulette::run::driver::{Clock, MonotonicClock, SimulatedClock, spawn_run};
use light_roulette::run::tick_source::{BeatGated, FixedInterval, TickSource};
use light_roulette::run::RunEvent;

fn load_roster(args: &Args) -> Result<Roster, String> {
    let mut roster = match &args.names_file {
        Some(path) => {
            Roster::from_path(path).map_err(|err| format!("cannot read {path}: {err}"))?
        }
        None => Roster::default(),
    };
    roster.extend(&args.names);
    Ok(roster)
}

fn build_source(args: &Args, cfg: &AppConfig) -> Box<dyn TickSource> {
    match args.mode {
        Mode::Clock => Box::new(FixedInterval::from_timing(&cfg.timing_params())),
        Mode::Beat => {
            let spectrum: Box<dyn SpectrumSource> = match &args.wav {
                Some(path) => Box::new(WavSpectrum::load_in_background(
                    path,
                    cfg.analyser_params(),
                )),
                None => Box::new(PulseTrain::new(args.bpm)),
            };
            Box::new(BeatGated::new(spectrum, cfg.beat_params()))
        }
    }
}

fn run_with<C: Clock + 'static>(
    controller: RunController<SmallRng>,
    clock: C,
    roster: &Roster,
    print_moves: bool,
) -> bool {
    let (handle, events) = spawn_run(controller, clock);

    let stop_flag = handle.stop_flag();
    ctrlc::set_handler(move || {
        stop_flag.store(true, Ordering::SeqCst);
    })
    .expect("Error setting Ctrl-C handler");

    let mut finished = false;
    for event in events.iter() {
        match event {
            RunEvent::Moved(frame) if print_moves => {
                println!("{:>6} ms  {}", frame.at, roster.name(frame.current).unwrap_or("?"));
            }
            RunEvent::Moved(_) => {}
            RunEvent::Finished(outcome) => {
                let winner = roster.name(outcome.winner).unwrap_or("?");
                info!(winner, elapsed = outcome.elapsed, moves = outcome.moves, "winner");
                println!("{winner}");
                finished = true;
            }
            RunEvent::Stopped => println!("stopped"),
        }
    }
    if handle.join().is_none() {
        warn!("run worker exited abnormally");
    }
    finished
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let cfg = AppConfig::load_or_default(&args.config);

    let roster = match load_roster(&args) {
        Ok(roster) => roster,
        Err(msg) => {
            eprintln!("{msg}");
            return ExitCode::FAILURE;
        }
    };
    if roster.is_empty() {
        eprintln!("no names given; pass a names file or --name");
        return ExitCode::FAILURE;
    }

    let seed = args
        .seed
        .or(cfg.walk.seed)
        .unwrap_or_else(|| rand::rng().random());
    info!(seed, entries = roster.len(), mode = ?args.mode, "starting");

    let mut controller = RunController::new(
        cfg.timing_params(),
        cfg.walk_params(),
        build_source(&args, &cfg),
        SmallRng::seed_from_u64(seed),
    );
    controller.load_grid(roster.len());

    let realtime = cfg.playback.realtime && !args.headless;
    let finished = if realtime {
        run_with(controller, MonotonicClock::new(), &roster, true)
    } else {
        run_with(controller, SimulatedClock::default(), &roster, false)
    };

    if finished {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
