//! Drives a controller on a worker thread and streams its events.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, Sender, unbounded};
use rand::Rng;
use tracing::warn;

use super::controller::RunController;
use super::{RunEvent, StartStatus};
use crate::core::timebase::Tick;

pub trait Clock: Send {
    fn now(&self) -> Tick;

    /// Waits until `tick`, returning early once `stop` is raised.
    fn wait_until(&mut self, tick: Tick, stop: &AtomicBool);
}

/// Wall-clock time since construction.
pub struct MonotonicClock {
    origin: Instant,
    slice: Duration,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            slice: Duration::from_millis(10),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> Tick {
        self.origin.elapsed().as_millis() as Tick
    }

    fn wait_until(&mut self, tick: Tick, stop: &AtomicBool) {
        loop {
            if stop.load(Ordering::SeqCst) {
                return;
            }
            let now = self.now();
            if now >= tick {
                return;
            }
            let remaining = Duration::from_millis(tick - now);
            thread::sleep(remaining.min(self.slice));
        }
    }
}

/// Jumps straight to each wake-up tick. Runs finish as fast as the CPU allows
/// and replay identically for a given seed.
#[derive(Debug, Default, Clone)]
pub struct SimulatedClock {
    now: Tick,
}

impl SimulatedClock {
    pub fn starting_at(now: Tick) -> Self {
        Self { now }
    }
}

impl Clock for SimulatedClock {
    fn now(&self) -> Tick {
        self.now
    }

    fn wait_until(&mut self, tick: Tick, _stop: &AtomicBool) {
        self.now = self.now.max(tick);
    }
}

pub struct RunHandle<R> {
    stop: Arc<AtomicBool>,
    worker: Option<JoinHandle<RunController<R>>>,
}

impl<R> RunHandle<R> {
    /// Requests the run to stop. Safe to call any number of times.
    pub fn stop(&self) {
        self.stop.store(true, Ordering::SeqCst);
    }

    /// Shared flag, e.g. for a Ctrl-C handler.
    pub fn stop_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop)
    }

    pub fn is_finished(&self) -> bool {
        self.worker.as_ref().is_none_or(|w| w.is_finished())
    }

    /// Waits for the worker and hands the controller back for the next run.
    pub fn join(mut self) -> Option<RunController<R>> {
        let worker = self.worker.take()?;
        match worker.join() {
            Ok(controller) => Some(controller),
            Err(_) => {
                warn!("run worker panicked");
                None
            }
        }
    }
}

impl<R> Drop for RunHandle<R> {
    fn drop(&mut self) {
        if let Some(worker) = self.worker.take() {
            self.stop();
            let _ = worker.join();
        }
    }
}

/// Starts `controller` on a worker thread.
///
/// The controller must already have a grid loaded. Events arrive on the
/// returned receiver; the channel closes when the run ends, is stopped, or
/// cannot start.
pub fn spawn_run<R, C>(controller: RunController<R>, clock: C) -> (RunHandle<R>, Receiver<RunEvent>)
where
    R: Rng + Send + 'static,
    C: Clock + 'static,
{
    let stop = Arc::new(AtomicBool::new(false));
    let (tx, rx) = unbounded();
    let stop_worker = Arc::clone(&stop);
    let worker = thread::Builder::new()
        .name("roulette-run".into())
        .spawn(move || drive(controller, clock, tx, stop_worker))
        .expect("spawn run worker");
    (
        RunHandle {
            stop,
            worker: Some(worker),
        },
        rx,
    )
}

fn drive<R: Rng, C: Clock>(
    mut controller: RunController<R>,
    mut clock: C,
    tx: Sender<RunEvent>,
    stop: Arc<AtomicBool>,
) -> RunController<R> {
    loop {
        if stop.load(Ordering::SeqCst) {
            let _ = tx.send(RunEvent::Stopped);
            return controller;
        }
        match controller.start(clock.now()) {
            Ok(StartStatus::Started) => break,
            Ok(StartStatus::Deferred { retry_at, .. }) => clock.wait_until(retry_at, &stop),
            Err(err) => {
                warn!(%err, "run could not start");
                return controller;
            }
        }
    }

    loop {
        if stop.load(Ordering::SeqCst) {
            if controller.stop() {
                let _ = tx.send(RunEvent::Stopped);
            }
            break;
        }
        let now = clock.now();
        if let Some(event) = controller.advance(now) {
            let finished = matches!(event, RunEvent::Finished(_));
            if tx.send(event).is_err() {
                controller.stop();
                break;
            }
            if finished {
                break;
            }
        }
        let Some(wake) = controller.next_wake() else {
            break;
        };
        clock.wait_until(wake.max(now + 1), &stop);
    }
    controller
}
