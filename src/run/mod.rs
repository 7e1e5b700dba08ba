//! Two-phase run state machine and the timing sources that drive it.

pub mod controller;
pub mod driver;
pub mod session;
pub mod tick_source;

use crate::core::grid::CellIndex;
use crate::core::timebase::Tick;

/// Errors returned when a run cannot start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunError {
    /// No entries are loaded.
    EmptyGrid,
    /// A run is already live on this controller.
    AlreadyRunning,
}

impl std::fmt::Display for RunError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunError::EmptyGrid => write!(f, "no entries loaded"),
            RunError::AlreadyRunning => write!(f, "a run is already in progress"),
        }
    }
}

impl std::error::Error for RunError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunState {
    #[default]
    Idle,
    /// Full speed until every cell has been lit and the minimum time passed.
    Covering,
    /// Eased deceleration towards the winner.
    Slowing,
    Finished,
}

impl RunState {
    pub fn is_live(self) -> bool {
        matches!(self, RunState::Covering | RunState::Slowing)
    }
}

/// Phase information handed to timing sources.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Pace {
    Covering,
    Slowing { progress: f32 },
}

impl Pace {
    /// Slowdown progress clamped to `[0, 1]`; zero while covering.
    pub fn progress(self) -> f32 {
        match self {
            Pace::Covering => 0.0,
            Pace::Slowing { progress } => crate::core::easing::clamp01(progress),
        }
    }
}

/// Timing constants shared by both strategies.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimingParams {
    pub min_run_ms: Tick,
    pub slowdown_ms: Tick,
    pub base_interval_ms: Tick,
    pub slowdown_span_ms: f32,
    pub ready_retry_ms: Tick,
    pub ready_max_attempts: u32,
}

impl Default for TimingParams {
    fn default() -> Self {
        Self {
            min_run_ms: 2000,
            slowdown_ms: 4000,
            base_interval_ms: 50,
            slowdown_span_ms: 1000.0,
            ready_retry_ms: 100,
            ready_max_attempts: 50,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunFrame {
    pub at: Tick,
    pub current: CellIndex,
    /// Most recent first, head included.
    pub trail: Vec<CellIndex>,
    pub state: RunState,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutcome {
    pub winner: CellIndex,
    pub trail: Vec<CellIndex>,
    pub elapsed: Tick,
    pub moves: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunEvent {
    Moved(RunFrame),
    Finished(RunOutcome),
    Stopped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartStatus {
    Started,
    /// The timing source is not ready; call `start` again at `retry_at`.
    Deferred { retry_at: Tick, attempt: u32 },
}
