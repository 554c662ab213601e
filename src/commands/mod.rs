//! Drive command state machines
//!
//! A command is a cancellable, timeout-bounded maneuver ticked once per
//! scheduler period. The scheduler itself is external: it owns the
//! subsystem, guarantees at most one active command per subsystem, and
//! drives the [`Command`] lifecycle. On preemption it calls
//! [`Command::on_end`] with `was_cancelled = true` before starting the next
//! command; `on_end` is required to be idempotent.
//!
//! Termination predicates are layered by composition: each maneuver wraps
//! the previous layer and ORs in one more finishing condition, so a more
//! specific command can only finish earlier.

pub mod default_drive;
pub mod gyro_drive;

pub use default_drive::{DefaultDriveCommand, DriveStyle};
pub use gyro_drive::{
    DriveOnHeadingCommand, DriveOnHeadingDistanceCommand, RotateToHeadingCommand,
};

use crate::oi::OperatorInput;
use std::sync::Arc;

/// A maneuver bound to a subsystem of type `S`.
///
/// The scheduler passes the exclusively-owned subsystem into each callback;
/// the command holds no reference of its own. Per tick the scheduler calls
/// `on_tick` then `is_done`, and `on_end` exactly once when `is_done` first
/// returns true or the command is preempted.
pub trait Command<S> {
    /// Called once before the first tick
    fn on_start(&mut self, subsystem: &mut S);

    /// Called once per scheduler period while running
    fn on_tick(&mut self, subsystem: &mut S);

    /// Termination predicate, polled once per tick after `on_tick`
    fn is_done(&mut self, subsystem: &mut S) -> bool;

    /// Called exactly once when the command finishes or is preempted.
    /// Must be idempotent; the command may be interrupted before
    /// `is_done` ever returned true.
    fn on_end(&mut self, subsystem: &mut S, was_cancelled: bool);
}

/// Handle through which a command schedules follow-up commands.
///
/// Passed in explicitly at construction so ownership is visible and
/// testable; there is no global scheduler.
pub trait CommandDispatch<S> {
    /// Enqueue a command for the subsystem, preempting the active one
    fn schedule(&mut self, command: Box<dyn Command<S>>);
}

/// Lifecycle bookkeeping for one maneuver
#[derive(Debug, Clone, Default)]
pub struct CommandState {
    elapsed_ticks: u32,
    timeout_ticks: Option<u32>,
    cancelled: bool,
    finished: bool,
}

impl CommandState {
    /// State with the given timeout; `None` disables the timeout check
    pub fn with_timeout(timeout_ticks: Option<u32>) -> Self {
        Self {
            timeout_ticks,
            ..Self::default()
        }
    }

    /// Advance the tick counter
    pub fn advance(&mut self) {
        self.elapsed_ticks = self.elapsed_ticks.saturating_add(1);
    }

    /// Ticks elapsed since start
    pub fn elapsed_ticks(&self) -> u32 {
        self.elapsed_ticks
    }

    /// Whether the configured timeout has elapsed
    pub fn timed_out(&self) -> bool {
        match self.timeout_ticks {
            Some(timeout) => self.elapsed_ticks >= timeout,
            None => false,
        }
    }

    /// Latch the cancelled flag
    pub fn mark_cancelled(&mut self) {
        self.cancelled = true;
    }

    pub fn cancelled(&self) -> bool {
        self.cancelled
    }

    /// Latch the finished flag. Once set it stays set.
    pub fn mark_finished(&mut self) {
        self.finished = true;
    }

    pub fn finished(&self) -> bool {
        self.finished
    }
}

/// Base layer shared by all maneuvers: cancel and timeout termination.
///
/// The operator cancel signal is polled each time the predicate runs and
/// latched once observed.
pub struct SafeCommand {
    state: CommandState,
    oi: Arc<dyn OperatorInput>,
}

impl SafeCommand {
    pub fn new(timeout_ticks: Option<u32>, oi: Arc<dyn OperatorInput>) -> Self {
        Self {
            state: CommandState::with_timeout(timeout_ticks),
            oi,
        }
    }

    /// Advance the tick counter
    pub fn advance(&mut self) {
        self.state.advance();
    }

    /// Poll and latch the operator cancel signal
    pub fn cancelled(&mut self) -> bool {
        if self.oi.cancel() {
            self.state.mark_cancelled();
        }
        self.state.cancelled()
    }

    /// Base termination predicate: cancelled or timed out
    pub fn base_done(&mut self) -> bool {
        if self.cancelled() || self.state.timed_out() {
            self.state.mark_finished();
        }
        self.state.finished()
    }

    /// Lifecycle bookkeeping, for layered predicates to latch on
    pub fn state_mut(&mut self) -> &mut CommandState {
        &mut self.state
    }

    pub fn state(&self) -> &CommandState {
        &self.state
    }

    /// Shared operator input handle
    pub fn oi(&self) -> &Arc<dyn OperatorInput> {
        &self.oi
    }
}
