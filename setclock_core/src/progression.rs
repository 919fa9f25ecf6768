//! Exercise progression state machine.
//!
//! Pure transitions over `SessionState`: nothing here plays sound or fires
//! callbacks. The caller inspects the returned `Transition` and performs
//! those side effects itself.
//!
//! Progression rules:
//! - An active set that is not the exercise's last is followed by a short rest
//! - The last set marks the exercise completed, then either a longer rest
//!   before the next exercise or, for the final exercise, completion
//! - Rests always expire into the next active set

use crate::duration::parse_duration_or;
use crate::{Exercise, Phase, SessionState, Timing};

/// The edge taken by a transition
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transition {
    /// Active set finished, resting before the next set
    SetRest,
    /// Exercise finished, resting before the next exercise
    ExerciseRest,
    /// Inter-set rest finished
    NextSet,
    /// Moved on to a new exercise
    NextExercise { index: usize },
    /// The workout is over
    Completed,
    /// Nothing changed
    None,
}

/// Per-set duration of an exercise, read from its `reps` token
pub fn exercise_seconds(exercise: &Exercise, timing: &Timing) -> u32 {
    parse_duration_or(Some(&exercise.reps), timing.default_exercise)
}

/// Compute the state that follows the current phase's countdown reaching zero
pub fn on_phase_expiry(
    state: &SessionState,
    exercises: &[Exercise],
    timing: &Timing,
) -> (SessionState, Transition) {
    let mut next = state.clone();
    let index = state.current_exercise_index;

    let transition = match state.phase {
        Phase::Active => {
            let sets = exercises[index].sets;
            if state.current_set < sets {
                next.phase = Phase::RestingBetweenSets;
                next.time_remaining = timing.rest_between_sets;
                Transition::SetRest
            } else {
                next.completed_exercises.insert(index);
                if index + 1 < exercises.len() {
                    next.phase = Phase::RestingBetweenExercises;
                    next.time_remaining = timing.rest_between_exercises;
                    Transition::ExerciseRest
                } else {
                    complete(&mut next);
                    Transition::Completed
                }
            }
        }

        Phase::RestingBetweenSets => {
            next.current_set += 1;
            next.phase = Phase::Active;
            next.time_remaining = exercise_seconds(&exercises[index], timing);
            Transition::NextSet
        }

        Phase::RestingBetweenExercises => {
            let new_index = index + 1;
            next.current_exercise_index = new_index;
            next.current_set = 1;
            next.phase = Phase::Active;
            next.time_remaining = exercise_seconds(&exercises[new_index], timing);
            Transition::NextExercise { index: new_index }
        }

        Phase::Completed => Transition::None,
    };

    tracing::debug!(
        "Phase expiry: {:?} -> {:?} ({:?})",
        state.phase,
        next.phase,
        transition
    );

    (next, transition)
}

/// Abandon the current exercise and move to the next one
///
/// The skipped exercise is marked completed. Skipping the final exercise
/// completes the workout.
pub fn skip(
    state: &SessionState,
    exercises: &[Exercise],
    timing: &Timing,
) -> (SessionState, Transition) {
    if state.is_completed() {
        return (state.clone(), Transition::None);
    }

    let mut next = state.clone();
    let index = state.current_exercise_index;
    next.completed_exercises.insert(index);

    let transition = if index + 1 < exercises.len() {
        let new_index = index + 1;
        next.current_exercise_index = new_index;
        next.current_set = 1;
        next.phase = Phase::Active;
        next.time_remaining = exercise_seconds(&exercises[new_index], timing);
        Transition::NextExercise { index: new_index }
    } else {
        complete(&mut next);
        Transition::Completed
    };

    tracing::debug!("Skipped exercise {} ({:?})", index, transition);
    (next, transition)
}

fn complete(state: &mut SessionState) {
    state.phase = Phase::Completed;
    state.is_running = false;
    state.time_remaining = 0;
}
