//! The run state machine.
//!
//! `Idle -> Covering -> Slowing -> Finished`. Covering ends once every cell
//! has been lit and the minimum run time has passed; Slowing ends when its
//! progress reaches 1. All time is passed in explicitly, so a run can be
//! driven by a real clock or stepped headlessly.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, warn};

use super::session::RunSession;
use super::tick_source::{FixedInterval, Poll, TickSource};
use super::{
    Pace, RunError, RunEvent, RunFrame, RunOutcome, RunState, StartStatus, TimingParams,
};
use crate::core::easing::slowdown_progress;
use crate::core::grid::{CellIndex, GridTopology};
use crate::core::timebase::Tick;
use crate::core::trail::TrailBuffer;
use crate::core::walk::{WalkParams, select_next};

pub struct RunController<R = SmallRng> {
    timing: TimingParams,
    walk: WalkParams,
    source: Box<dyn TickSource>,
    rng: R,
    topology: Option<GridTopology>,
    position: CellIndex,
    state: RunState,
    session: Option<RunSession>,
    resting_trail: TrailBuffer,
    outcome: Option<RunOutcome>,
    deferred_attempts: u32,
}

impl RunController<SmallRng> {
    /// Clock-driven controller with a seeded generator.
    pub fn with_seed(seed: u64) -> Self {
        let timing = TimingParams::default();
        Self::new(
            timing,
            WalkParams::default(),
            Box::new(FixedInterval::from_timing(&timing)),
            SmallRng::seed_from_u64(seed),
        )
    }
}

impl<R: Rng> RunController<R> {
    pub fn new(
        timing: TimingParams,
        walk: WalkParams,
        source: Box<dyn TickSource>,
        rng: R,
    ) -> Self {
        Self {
            timing,
            walk,
            source,
            rng,
            topology: None,
            position: 0,
            state: RunState::Idle,
            session: None,
            resting_trail: TrailBuffer::new(),
            outcome: None,
            deferred_attempts: 0,
        }
    }

    /// Rebuilds the grid for `count` entries and places the light on a random
    /// cell. A live run is stopped first. Returns `None` for an empty roster.
    pub fn load_grid(&mut self, count: usize) -> Option<&GridTopology> {
        self.stop();
        self.state = RunState::Idle;
        self.resting_trail.clear();
        self.outcome = None;
        self.deferred_attempts = 0;
        self.topology = GridTopology::build(count);
        self.position = if count > 0 {
            self.rng.random_range(0..count)
        } else {
            0
        };
        if let Some(topo) = &self.topology {
            let dims = topo.dims();
            debug!(
                count,
                rows = dims.rows,
                cols = dims.cols,
                start = self.position,
                "grid built"
            );
        }
        self.topology.as_ref()
    }

    /// Starts a run at `now`.
    ///
    /// While the timing source is not ready the start is deferred; after
    /// `ready_max_attempts` deferrals the controller falls back to fixed
    /// interval timing.
    pub fn start(&mut self, now: Tick) -> Result<StartStatus, RunError> {
        if self.state.is_live() {
            return Err(RunError::AlreadyRunning);
        }
        let cell_count = match &self.topology {
            Some(topo) => topo.len(),
            None => return Err(RunError::EmptyGrid),
        };

        if !self.source.is_ready() {
            if self.deferred_attempts < self.timing.ready_max_attempts {
                self.deferred_attempts += 1;
                debug!(
                    attempt = self.deferred_attempts,
                    source = self.source.name(),
                    "timing source not ready, deferring start"
                );
                return Ok(StartStatus::Deferred {
                    retry_at: now.saturating_add(self.timing.ready_retry_ms),
                    attempt: self.deferred_attempts,
                });
            }
            warn!(
                attempts = self.deferred_attempts,
                source = self.source.name(),
                "timing source never became ready; using fixed interval"
            );
            self.source = Box::new(FixedInterval::from_timing(&self.timing));
        }
        self.deferred_attempts = 0;

        let mut session = RunSession::new(cell_count, now);
        session.recency.record_visit(self.position, now);
        if let Err(err) = self.source.begin(now) {
            warn!(
                %err,
                source = self.source.name(),
                "audio failed to start; running without it"
            );
        }

        self.session = Some(session);
        self.state = RunState::Covering;
        self.resting_trail.clear();
        self.outcome = None;
        info!(
            cells = cell_count,
            start = self.position,
            source = self.source.name(),
            "run started"
        );
        Ok(StartStatus::Started)
    }

    /// Advances the run to `now`. Returns an event when the light moved or
    /// the run finished.
    pub fn advance(&mut self, now: Tick) -> Option<RunEvent> {
        let pace = {
            let session = self.session.as_ref()?;
            match self.state {
                RunState::Covering => Pace::Covering,
                RunState::Slowing => {
                    let since = session.slowdown_started_at.unwrap_or(now);
                    Pace::Slowing {
                        progress: slowdown_progress(now, since, self.timing.slowdown_ms),
                    }
                }
                RunState::Idle | RunState::Finished => return None,
            }
        };

        let poll = self.source.poll(now, pace);
        if poll == Poll::Idle {
            return None;
        }
        if let Pace::Slowing { progress } = pace {
            if progress >= 1.0 {
                let session = self.session.take()?;
                return Some(self.finish(session, now));
            }
        }
        if poll != Poll::Move {
            return None;
        }

        let session = self.session.as_mut()?;
        let topology = self.topology.as_ref()?;
        let next = select_next(
            topology,
            &mut session.recency,
            self.position,
            now,
            &self.walk,
            &mut self.rng,
        );
        session.recency.record_visit(next, now);
        session.trail.push(next);
        session.moves += 1;
        self.position = next;

        let mut pace_after = pace;
        if self.state == RunState::Covering
            && session.elapsed(now) > self.timing.min_run_ms
            && session.recency.is_covered()
        {
            session.slowdown_started_at = Some(now);
            self.state = RunState::Slowing;
            pace_after = Pace::Slowing { progress: 0.0 };
            info!(
                elapsed = session.elapsed(now),
                moves = session.moves,
                "every cell visited; slowing down"
            );
        }
        self.source.moved(now, pace_after);

        debug!(target: "run::walk", now, cell = next, state = ?self.state);
        Some(RunEvent::Moved(RunFrame {
            at: now,
            current: next,
            trail: session.trail.to_vec(),
            state: self.state,
        }))
    }

    fn finish(&mut self, session: RunSession, now: Tick) -> RunEvent {
        self.source.end();
        self.state = RunState::Finished;
        let outcome = RunOutcome {
            winner: self.position,
            trail: session.trail.to_vec(),
            elapsed: session.elapsed(now),
            moves: session.moves,
        };
        self.resting_trail = session.trail;
        self.outcome = Some(outcome.clone());
        info!(
            winner = outcome.winner,
            elapsed = outcome.elapsed,
            moves = outcome.moves,
            "run finished"
        );
        RunEvent::Finished(outcome)
    }

    /// Cancels a live run. Returns whether anything was stopped; calling it
    /// on an idle or finished controller changes nothing.
    pub fn stop(&mut self) -> bool {
        if !self.state.is_live() {
            return false;
        }
        if let Some(session) = self.session.take() {
            self.resting_trail = session.trail;
        }
        self.source.end();
        self.state = RunState::Idle;
        info!(position = self.position, "run stopped");
        true
    }

    /// Stops any run and clears what the last one left on screen.
    pub fn reset(&mut self) {
        self.stop();
        self.state = RunState::Idle;
        self.resting_trail.clear();
        self.outcome = None;
        self.deferred_attempts = 0;
    }

    /// When the driver should call `advance` next. `None` unless a run is live.
    pub fn next_wake(&self) -> Option<Tick> {
        if self.state.is_live() {
            Some(self.source.next_wake())
        } else {
            None
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn position(&self) -> CellIndex {
        self.position
    }

    pub fn trail(&self) -> &TrailBuffer {
        match &self.session {
            Some(session) => &session.trail,
            None => &self.resting_trail,
        }
    }

    pub fn topology(&self) -> Option<&GridTopology> {
        self.topology.as_ref()
    }

    pub fn session(&self) -> Option<&RunSession> {
        self.session.as_ref()
    }

    pub fn outcome(&self) -> Option<&RunOutcome> {
        self.outcome.as_ref()
    }

    pub fn timing(&self) -> &TimingParams {
        &self.timing
    }

    pub fn source_name(&self) -> &'static str {
        self.source.name()
    }
}
