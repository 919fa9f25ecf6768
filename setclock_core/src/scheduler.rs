//! Tick scheduling for workout sessions.
//!
//! A `Scheduler` pulls events from a `TickSource` one at a time and applies
//! them to a session it borrows for the duration of the run. Because events
//! are handled strictly in sequence, a command that arrives between two ticks
//! always takes effect before the next tick, and once `run` returns no
//! further tick can reach the session.

use crate::session::{SessionCommand, WorkoutSession};
use crate::{SessionState, WorkoutStats};
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};

/// Something the scheduler has to act on
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Event {
    Tick,
    Command(SessionCommand),
    /// No more events will ever arrive
    Closed,
}

/// Source of ticks and commands
pub trait TickSource {
    /// Wait for the next event
    ///
    /// `ticking` tells the source whether the session is running; sources
    /// must not produce ticks while it is false.
    fn next_event(&mut self, ticking: bool) -> Event;
}

/// How a scheduled run ended
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    Completed(WorkoutStats),
    /// Stopped before completion, with the state at that point
    Abandoned(SessionState),
}

pub struct Scheduler<S: TickSource> {
    source: S,
}

impl<S: TickSource> Scheduler<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Drive a session until it completes, the user quits, or the source closes
    ///
    /// Abandoned runs shut the session down, releasing its audio output.
    pub fn run(&mut self, session: &mut WorkoutSession) -> Outcome {
        loop {
            if session.is_completed() {
                return Outcome::Completed(session.stats());
            }

            match self.source.next_event(session.is_running()) {
                Event::Tick => session.tick(),
                Event::Command(SessionCommand::Quit) => {
                    tracing::info!("Quit requested");
                    return self.abandon(session);
                }
                Event::Command(command) => session.apply(command),
                Event::Closed => {
                    tracing::info!("Tick source closed");
                    return self.abandon(session);
                }
            }
        }
    }

    fn abandon(&mut self, session: &mut WorkoutSession) -> Outcome {
        session.shutdown();
        Outcome::Abandoned(session.state().clone())
    }
}

/// Wall-clock ticks, one per period, interleaved with user commands
///
/// The deadline is re-armed whenever ticking resumes, so time spent paused
/// never turns into ticks.
pub struct IntervalTicks {
    period: Duration,
    deadline: Option<Instant>,
    commands: Option<Receiver<SessionCommand>>,
}

impl IntervalTicks {
    /// One tick per second
    pub fn new(commands: Receiver<SessionCommand>) -> Self {
        Self::with_period(commands, Duration::from_secs(1))
    }

    pub fn with_period(commands: Receiver<SessionCommand>, period: Duration) -> Self {
        Self {
            period,
            deadline: None,
            commands: Some(commands),
        }
    }

    fn wait_idle(&mut self) -> Event {
        self.deadline = None;
        let Some(commands) = self.commands.as_ref() else {
            // Paused with nobody left to resume us
            return Event::Closed;
        };

        match commands.recv() {
            Ok(command) => Event::Command(command),
            Err(_) => {
                self.commands = None;
                Event::Closed
            }
        }
    }

    fn wait_tick(&mut self) -> Event {
        let deadline = *self
            .deadline
            .get_or_insert_with(|| Instant::now() + self.period);
        let wait = deadline.saturating_duration_since(Instant::now());

        let received = match self.commands.as_ref() {
            Some(commands) => commands.recv_timeout(wait),
            None => {
                std::thread::sleep(wait);
                Err(RecvTimeoutError::Timeout)
            }
        };

        match received {
            Ok(command) => Event::Command(command),
            Err(RecvTimeoutError::Timeout) => {
                self.deadline = Some(deadline + self.period);
                Event::Tick
            }
            Err(RecvTimeoutError::Disconnected) => {
                tracing::debug!("Command channel closed, ticking on");
                self.commands = None;
                self.wait_tick()
            }
        }
    }
}

impl TickSource for IntervalTicks {
    fn next_event(&mut self, ticking: bool) -> Event {
        if ticking {
            self.wait_tick()
        } else {
            self.wait_idle()
        }
    }
}

/// Ticks back to back without waiting
///
/// Closes as soon as the session stops running.
#[derive(Debug, Default)]
pub struct InstantTicks {
    ticks: u64,
}

impl InstantTicks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}

impl TickSource for InstantTicks {
    fn next_event(&mut self, ticking: bool) -> Event {
        if ticking {
            self.ticks += 1;
            Event::Tick
        } else {
            Event::Closed
        }
    }
}
