#![forbid(unsafe_code)]

//! Core engine for the Setclock interval workout timer.
//!
//! This crate provides:
//! - Domain types (exercises, phases, session state, stats)
//! - Duration parsing for human-authored tokens
//! - Procedural tone synthesis for audio cues
//! - The exercise progression state machine
//! - Tick scheduling and the session controller
//! - Workout plans and the completed-workout history log

pub mod types;
pub mod error;
pub mod config;
pub mod logging;
pub mod duration;
pub mod tone;
pub mod audio;
pub mod progression;
pub mod session;
pub mod scheduler;
pub mod plan;
pub mod history;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use config::Config;
pub use duration::{parse_duration, parse_duration_or};
pub use tone::{Beep, Cue, ToneSynth};
pub use audio::{open_default_output, ToneOutput};
pub use session::{NoopObserver, SessionCommand, SessionObserver, WorkoutSession};
pub use scheduler::{InstantTicks, IntervalTicks, Outcome, Scheduler, TickSource};
pub use plan::{demo_plan, WorkoutPlan};
pub use history::{load_recent_records, HistorySink, JsonlHistory, WorkoutRecord};
