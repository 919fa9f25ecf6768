//! Workout plan files.
//!
//! A plan is a titled, ordered list of exercises, stored as TOML (default) or
//! JSON (`.json` extension):
//!
//! ```toml
//! title = "Morning circuit"
//!
//! [[exercises]]
//! name = "Jumping jacks"
//! sets = 2
//! reps = "30 sec"
//! ```

use crate::progression::exercise_seconds;
use crate::{Error, Exercise, Result, Timing};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A titled list of exercises
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct WorkoutPlan {
    pub title: String,
    pub exercises: Vec<Exercise>,
}

/// Reject exercise lists a session cannot run
pub fn validate_exercises(exercises: &[Exercise]) -> Result<()> {
    if exercises.is_empty() {
        return Err(Error::Plan("workout has no exercises".into()));
    }

    for (i, exercise) in exercises.iter().enumerate() {
        if exercise.name.trim().is_empty() {
            return Err(Error::Plan(format!("exercise {} has no name", i + 1)));
        }
        if exercise.sets == 0 {
            return Err(Error::Plan(format!(
                "exercise {:?} must have at least one set",
                exercise.name
            )));
        }
    }

    Ok(())
}

impl WorkoutPlan {
    /// Load and validate a plan; the format follows the file extension
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;

        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        let plan: WorkoutPlan = if is_json {
            serde_json::from_str(&contents)?
        } else {
            toml::from_str(&contents)?
        };

        plan.validate()?;
        tracing::info!(
            "Loaded plan {:?} ({} exercises) from {:?}",
            plan.title,
            plan.exercises.len(),
            path
        );
        Ok(plan)
    }

    pub fn validate(&self) -> Result<()> {
        validate_exercises(&self.exercises)
    }

    /// Elapsed seconds of an uninterrupted run to natural completion
    pub fn estimated_seconds(&self, timing: &Timing) -> u32 {
        let work: u32 = self
            .exercises
            .iter()
            .map(|e| e.sets * exercise_seconds(e, timing))
            .sum();
        let set_rests: u32 = self
            .exercises
            .iter()
            .map(|e| e.sets.saturating_sub(1))
            .sum();
        let exercise_rests = self.exercises.len().saturating_sub(1) as u32;

        work + set_rests * timing.rest_between_sets
            + exercise_rests * timing.rest_between_exercises
    }
}

/// Built-in plan used when none is given
pub fn demo_plan() -> WorkoutPlan {
    WorkoutPlan {
        title: "Quick circuit".into(),
        exercises: vec![
            Exercise::new("Jumping jacks", 2, "30 sec"),
            Exercise::new("Bodyweight squats", 2, "40 sec"),
            Exercise::new("Plank", 1, "1 min"),
        ],
    }
}

/// Format seconds as "MM:SS"
pub fn format_mmss(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}
