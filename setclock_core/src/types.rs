//! Core domain types for the Setclock engine.
//!
//! This module defines the fundamental types used throughout the system:
//! - Exercises as supplied by the embedding application
//! - Phases and the session state owned by the controller
//! - Timing constants and completion statistics

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

// ============================================================================
// Timing Constants
// ============================================================================

/// Rest between two sets of the same exercise
pub const REST_BETWEEN_SETS_SECS: u32 = 15;

/// Rest before moving on to the next exercise
pub const REST_BETWEEN_EXERCISES_SECS: u32 = 30;

/// Per-set duration used when an exercise carries no duration token
pub const DEFAULT_EXERCISE_SECS: u32 = 45;

/// Countdown tones fire while this many seconds or fewer remain
pub const COUNTDOWN_SECS: u32 = 3;

// ============================================================================
// Exercise Types
// ============================================================================

/// An exercise as supplied by the embedding application
///
/// `reps` doubles as the per-set duration token ("30 sec", "2 min"). A plain
/// rep count such as "12" carries no duration and falls back to the default.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Exercise {
    pub name: String,
    pub sets: u32,
    pub reps: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
}

impl Exercise {
    pub fn new(name: impl Into<String>, sets: u32, reps: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sets,
            reps: reps.into(),
            duration: None,
        }
    }
}

/// Phase durations used by the progression state machine
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Timing {
    pub rest_between_sets: u32,
    pub rest_between_exercises: u32,
    pub default_exercise: u32,
    pub countdown: u32,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            rest_between_sets: REST_BETWEEN_SETS_SECS,
            rest_between_exercises: REST_BETWEEN_EXERCISES_SECS,
            default_exercise: DEFAULT_EXERCISE_SECS,
            countdown: COUNTDOWN_SECS,
        }
    }
}

// ============================================================================
// Session Types
// ============================================================================

/// The mutually exclusive phases a session occupies
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Active,
    RestingBetweenSets,
    RestingBetweenExercises,
    Completed,
}

impl Phase {
    pub fn is_rest(&self) -> bool {
        matches!(
            self,
            Phase::RestingBetweenSets | Phase::RestingBetweenExercises
        )
    }

    pub fn label(&self) -> &'static str {
        match self {
            Phase::Active => "WORK",
            Phase::RestingBetweenSets => "REST",
            Phase::RestingBetweenExercises => "NEXT UP",
            Phase::Completed => "DONE",
        }
    }
}

/// Session state, owned by a single `WorkoutSession`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionState {
    pub current_exercise_index: usize,
    pub current_set: u32,
    pub phase: Phase,
    pub is_running: bool,
    pub time_remaining: u32,
    pub total_elapsed_seconds: u32,
    pub completed_exercises: BTreeSet<usize>,
}

impl SessionState {
    /// State of a freshly constructed (or reset) session
    pub fn initial() -> Self {
        Self {
            current_exercise_index: 0,
            current_set: 1,
            phase: Phase::Active,
            is_running: false,
            time_remaining: 0,
            total_elapsed_seconds: 0,
            completed_exercises: BTreeSet::new(),
        }
    }

    pub fn is_completed(&self) -> bool {
        self.phase == Phase::Completed
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::initial()
    }
}

/// Aggregate statistics reported once a workout completes
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct WorkoutStats {
    /// Elapsed seconds, rests included
    pub total_time: u32,
    pub exercises_completed: usize,
    pub total_exercises: usize,
}
