//! Session controller for a single workout.
//!
//! `WorkoutSession` exclusively owns the session state and the tone
//! synthesizer. Every operation is synchronous: its effect is visible as soon
//! as the call returns. Exercise changes and completion are reported through
//! a `SessionObserver` so an embedding UI never has to poll.

use crate::plan::validate_exercises;
use crate::progression::{self, exercise_seconds, Transition};
use crate::tone::{Cue, ToneSynth};
use crate::{Exercise, Result, SessionState, Timing, WorkoutStats};

/// Receives session events
pub trait SessionObserver {
    /// The current exercise index changed (also fired once at construction)
    fn on_exercise_change(&mut self, index: usize);

    /// The workout completed; fired exactly once per run
    fn on_complete(&mut self, stats: &WorkoutStats);

    /// A tick was processed
    fn on_tick(&mut self, _state: &SessionState) {}

    /// A skip or reset changed the state between ticks
    fn on_state_change(&mut self, _state: &SessionState) {}
}

/// Observer that ignores every event
pub struct NoopObserver;

impl SessionObserver for NoopObserver {
    fn on_exercise_change(&mut self, _index: usize) {}
    fn on_complete(&mut self, _stats: &WorkoutStats) {}
}

/// User-facing operations, as delivered by a front end
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionCommand {
    Start,
    Pause,
    TogglePause,
    Skip,
    Reset,
    ToggleSound,
    /// Stop driving the session
    Quit,
}

pub struct WorkoutSession {
    title: String,
    exercises: Vec<Exercise>,
    timing: Timing,
    state: SessionState,
    synth: ToneSynth,
    observer: Box<dyn SessionObserver>,
    completion_reported: bool,
}

impl WorkoutSession {
    /// Create a session over a non-empty exercise list
    ///
    /// Fires `on_exercise_change(0)` before returning.
    pub fn new(
        title: impl Into<String>,
        exercises: Vec<Exercise>,
        synth: ToneSynth,
        observer: Box<dyn SessionObserver>,
        timing: Timing,
    ) -> Result<Self> {
        validate_exercises(&exercises)?;

        let mut session = Self {
            title: title.into(),
            exercises,
            timing,
            state: SessionState::initial(),
            synth,
            observer,
            completion_reported: false,
        };

        tracing::info!(
            "Session {:?} created with {} exercises",
            session.title,
            session.exercises.len()
        );
        session.observer.on_exercise_change(0);
        Ok(session)
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn exercises(&self) -> &[Exercise] {
        &self.exercises
    }

    pub fn timing(&self) -> &Timing {
        &self.timing
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn current_exercise(&self) -> &Exercise {
        &self.exercises[self.state.current_exercise_index]
    }

    pub fn is_running(&self) -> bool {
        self.state.is_running
    }

    pub fn is_completed(&self) -> bool {
        self.state.is_completed()
    }

    pub fn sound_enabled(&self) -> bool {
        self.synth.is_enabled()
    }

    pub fn set_sound_enabled(&mut self, enabled: bool) {
        self.synth.set_enabled(enabled);
    }

    pub fn stats(&self) -> WorkoutStats {
        WorkoutStats {
            total_time: self.state.total_elapsed_seconds,
            exercises_completed: self.state.completed_exercises.len(),
            total_exercises: self.exercises.len(),
        }
    }

    /// Begin or resume ticking
    ///
    /// A fresh or reset session seeds its countdown from the current
    /// exercise's duration.
    pub fn start(&mut self) {
        if self.is_completed() {
            tracing::debug!("Ignoring start on a completed session");
            return;
        }

        if self.state.time_remaining == 0 {
            self.state.time_remaining = exercise_seconds(self.current_exercise(), &self.timing);
        }
        self.state.is_running = true;
        tracing::debug!(
            "Started with {}s remaining in {:?}",
            self.state.time_remaining,
            self.state.phase
        );
    }

    /// Stop ticking; remaining and elapsed time are kept as-is
    pub fn pause(&mut self) {
        if self.state.is_running {
            self.state.is_running = false;
            tracing::debug!("Paused with {}s remaining", self.state.time_remaining);
        }
    }

    pub fn toggle_pause(&mut self) {
        if self.state.is_running {
            self.pause();
        } else {
            self.start();
        }
    }

    /// Abandon the current exercise; skipping the last one completes the workout
    pub fn skip(&mut self) {
        let (next, transition) = progression::skip(&self.state, &self.exercises, &self.timing);
        if transition == Transition::None {
            return;
        }
        self.state = next;
        self.after_transition(transition);
        self.observer.on_state_change(&self.state);
    }

    /// Return to the construction-time state and stop ticking
    pub fn reset(&mut self) {
        let index_changed = self.state.current_exercise_index != 0;

        self.state = SessionState::initial();
        self.completion_reported = false;
        self.synth.silence();
        tracing::info!("Session {:?} reset", self.title);

        if index_changed {
            self.observer.on_exercise_change(0);
        }
        self.observer.on_state_change(&self.state);
    }

    /// Advance the session by one second
    ///
    /// Does nothing unless the session is running.
    pub fn tick(&mut self) {
        if !self.state.is_running || self.is_completed() {
            return;
        }

        self.state.time_remaining = self.state.time_remaining.saturating_sub(1);
        self.state.total_elapsed_seconds += 1;

        match self.state.time_remaining {
            0 => self.expire(),
            remaining if remaining <= self.timing.countdown => {
                self.synth.cue(Cue::CountdownTick)
            }
            _ => {}
        }

        self.observer.on_tick(&self.state);
    }

    /// Apply a front-end command
    pub fn apply(&mut self, command: SessionCommand) {
        tracing::debug!("Applying {:?}", command);
        match command {
            SessionCommand::Start => self.start(),
            SessionCommand::Pause | SessionCommand::Quit => self.pause(),
            SessionCommand::TogglePause => self.toggle_pause(),
            SessionCommand::Skip => self.skip(),
            SessionCommand::Reset => self.reset(),
            SessionCommand::ToggleSound => self.set_sound_enabled(!self.sound_enabled()),
        }
    }

    /// Stop ticking and release the audio output
    pub fn shutdown(&mut self) {
        self.pause();
        self.synth.release();
        tracing::debug!("Session {:?} shut down", self.title);
    }

    fn expire(&mut self) {
        let (next, transition) =
            progression::on_phase_expiry(&self.state, &self.exercises, &self.timing);

        let cue = if transition == Transition::Completed {
            Cue::WorkoutComplete
        } else {
            Cue::PhaseComplete
        };
        self.synth.cue(cue);

        self.state = next;
        self.after_transition(transition);
    }

    fn after_transition(&mut self, transition: Transition) {
        match transition {
            Transition::NextExercise { index } => self.observer.on_exercise_change(index),
            Transition::Completed => self.report_completion(),
            _ => {}
        }
    }

    fn report_completion(&mut self) {
        if self.completion_reported {
            return;
        }
        self.completion_reported = true;

        let stats = self.stats();
        tracing::info!(
            "Workout {:?} complete: {}s, {}/{} exercises",
            self.title,
            stats.total_time,
            stats.exercises_completed,
            stats.total_exercises
        );
        self.observer.on_complete(&stats);
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::audio::testing::RecordingOutput;
    use crate::tone::Beep;
    use crate::{Error, Phase};
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Clone, Debug, PartialEq)]
    pub(crate) enum Event {
        ExerciseChange(usize),
        Complete(WorkoutStats),
    }

    #[derive(Default)]
    pub(crate) struct RecordingObserver {
        pub events: Rc<RefCell<Vec<Event>>>,
        pub phases: Rc<RefCell<Vec<Phase>>>,
        pub changes: Rc<RefCell<Vec<SessionState>>>,
    }

    impl SessionObserver for RecordingObserver {
        fn on_exercise_change(&mut self, index: usize) {
            self.events.borrow_mut().push(Event::ExerciseChange(index));
        }

        fn on_complete(&mut self, stats: &WorkoutStats) {
            self.events.borrow_mut().push(Event::Complete(*stats));
        }

        fn on_tick(&mut self, state: &SessionState) {
            let mut phases = self.phases.borrow_mut();
            if phases.last() != Some(&state.phase) {
                phases.push(state.phase);
            }
        }

        fn on_state_change(&mut self, state: &SessionState) {
            self.changes.borrow_mut().push(state.clone());
        }
    }

    pub(crate) struct Harness {
        pub session: WorkoutSession,
        pub events: Rc<RefCell<Vec<Event>>>,
        pub phases: Rc<RefCell<Vec<Phase>>>,
        pub changes: Rc<RefCell<Vec<SessionState>>>,
        pub beeps: Rc<RefCell<Vec<Beep>>>,
    }

    pub(crate) fn harness(exercises: Vec<Exercise>) -> Harness {
        harness_with_timing(exercises, Timing::default())
    }

    pub(crate) fn harness_with_timing(exercises: Vec<Exercise>, timing: Timing) -> Harness {
        crate::logging::init_test();

        let observer = RecordingObserver::default();
        let events = Rc::clone(&observer.events);
        let phases = Rc::clone(&observer.phases);
        let changes = Rc::clone(&observer.changes);
        phases.borrow_mut().push(Phase::Active);

        let output = RecordingOutput::default();
        let beeps = output.played();
        let synth = ToneSynth::new(Ok(Box::new(output)), true);

        let session =
            WorkoutSession::new("Test", exercises, synth, Box::new(observer), timing).unwrap();
        Harness {
            session,
            events,
            phases,
            changes,
            beeps,
        }
    }

    fn run_to_completion(session: &mut WorkoutSession) {
        session.start();
        for _ in 0..100_000 {
            if session.is_completed() {
                return;
            }
            session.tick();
        }
        panic!("session never completed");
    }

    #[test]
    fn test_single_exercise_two_sets() {
        let mut h = harness(vec![Exercise::new("Squats", 2, "10 sec")]);
        run_to_completion(&mut h.session);

        assert_eq!(
            *h.phases.borrow(),
            vec![
                Phase::Active,
                Phase::RestingBetweenSets,
                Phase::Active,
                Phase::Completed
            ]
        );
        assert_eq!(h.session.state().total_elapsed_seconds, 35);
        assert_eq!(
            h.events.borrow().last(),
            Some(&Event::Complete(WorkoutStats {
                total_time: 35,
                exercises_completed: 1,
                total_exercises: 1,
            }))
        );
    }

    #[test]
    fn test_two_exercises_one_set_each() {
        let mut h = harness(vec![
            Exercise::new("Jumping jacks", 1, "5 sec"),
            Exercise::new("Plank", 1, "10 sec"),
        ]);
        run_to_completion(&mut h.session);

        assert_eq!(
            *h.phases.borrow(),
            vec![
                Phase::Active,
                Phase::RestingBetweenExercises,
                Phase::Active,
                Phase::Completed
            ]
        );
        assert_eq!(h.session.state().total_elapsed_seconds, 45);

        let events = h.events.borrow();
        let changes: Vec<_> = events
            .iter()
            .filter(|e| matches!(e, Event::ExerciseChange(_)))
            .collect();
        assert_eq!(
            changes,
            vec![&Event::ExerciseChange(0), &Event::ExerciseChange(1)]
        );
    }

    #[test]
    fn test_phase_counts_and_elapsed_sum() {
        let mut h = harness(vec![
            Exercise::new("A", 2, "3 sec"),
            Exercise::new("B", 3, "4 sec"),
            Exercise::new("C", 1, "12"),
        ]);
        run_to_completion(&mut h.session);

        let phases = h.phases.borrow();
        let active = phases.iter().filter(|p| **p == Phase::Active).count();
        let rests = phases.iter().filter(|p| p.is_rest()).count();
        assert_eq!(active, 6);
        assert_eq!(rests, 5);

        // 2x3 + 3x4 + 1x45, three inter-set rests, two inter-exercise rests
        let expected = 2 * 3 + 3 * 4 + 45 + 3 * 15 + 2 * 30;
        assert_eq!(h.session.state().total_elapsed_seconds, expected);
    }

    #[test]
    fn test_completion_fires_once() {
        let mut h = harness(vec![Exercise::new("Squats", 1, "2 sec")]);
        run_to_completion(&mut h.session);

        h.session.tick();
        h.session.start();
        h.session.skip();
        h.session.tick();

        let completions = h
            .events
            .borrow()
            .iter()
            .filter(|e| matches!(e, Event::Complete(_)))
            .count();
        assert_eq!(completions, 1);
        assert!(!h.session.is_running());
    }

    #[test]
    fn test_start_seeds_countdown() {
        let mut h = harness(vec![Exercise::new("Plank", 1, "2 min")]);
        assert_eq!(h.session.state().time_remaining, 0);
        assert!(!h.session.is_running());

        h.session.start();
        assert_eq!(h.session.state().time_remaining, 120);
        assert!(h.session.is_running());
    }

    #[test]
    fn test_pause_preserves_time() {
        let mut h = harness(vec![Exercise::new("Plank", 1, "30 sec")]);
        h.session.start();
        for _ in 0..5 {
            h.session.tick();
        }
        h.session.pause();

        let before = h.session.state().clone();
        // Ticks delivered while paused are ignored
        for _ in 0..10 {
            h.session.tick();
        }
        assert_eq!(h.session.state(), &before);

        h.session.start();
        assert_eq!(h.session.state().time_remaining, 25);
        assert_eq!(h.session.state().total_elapsed_seconds, 5);
    }

    #[test]
    fn test_tick_before_start_does_nothing() {
        let mut h = harness(vec![Exercise::new("Plank", 1, "30 sec")]);
        h.session.tick();
        assert_eq!(h.session.state(), &SessionState::initial());
    }

    #[test]
    fn test_reset_restores_initial_state() {
        let mut h = harness(vec![
            Exercise::new("A", 2, "5 sec"),
            Exercise::new("B", 1, "5 sec"),
        ]);
        h.session.start();
        for _ in 0..7 {
            h.session.tick();
        }
        h.session.skip();
        assert_eq!(h.session.state().current_exercise_index, 1);

        h.session.reset();

        assert_eq!(h.session.state(), &SessionState::initial());
        assert_eq!(
            h.events.borrow().last(),
            Some(&Event::ExerciseChange(0))
        );
    }

    #[test]
    fn test_reset_allows_second_completion() {
        let mut h = harness(vec![Exercise::new("A", 1, "1 sec")]);
        run_to_completion(&mut h.session);
        h.session.reset();
        run_to_completion(&mut h.session);

        let completions = h
            .events
            .borrow()
            .iter()
            .filter(|e| matches!(e, Event::Complete(_)))
            .count();
        assert_eq!(completions, 2);
    }

    #[test]
    fn test_skip_only_exercise_completes() {
        let mut h = harness(vec![Exercise::new("Plank", 3, "30 sec")]);
        h.session.start();
        h.session.tick();
        h.session.skip();

        assert!(h.session.is_completed());
        assert!(!h.session.is_running());
        assert_eq!(
            h.events.borrow().last(),
            Some(&Event::Complete(WorkoutStats {
                total_time: 1,
                exercises_completed: 1,
                total_exercises: 1,
            }))
        );
    }

    #[test]
    fn test_skip_fires_exercise_change() {
        let mut h = harness(vec![
            Exercise::new("A", 2, "5 sec"),
            Exercise::new("B", 1, "20 sec"),
        ]);
        h.session.start();
        h.session.skip();

        assert_eq!(
            *h.events.borrow(),
            vec![Event::ExerciseChange(0), Event::ExerciseChange(1)]
        );
        assert_eq!(h.session.state().time_remaining, 20);
        assert_eq!(h.session.current_exercise().name, "B");
    }

    #[test]
    fn test_skip_reduces_rest_phases() {
        let mut h = harness(vec![
            Exercise::new("A", 2, "2 sec"),
            Exercise::new("B", 2, "2 sec"),
        ]);
        h.session.start();
        h.session.skip();
        run_to_completion(&mut h.session);

        let rests = h.phases.borrow().iter().filter(|p| p.is_rest()).count();
        assert_eq!(rests, 1);
        assert_eq!(h.session.stats().exercises_completed, 2);
    }

    #[test]
    fn test_countdown_and_completion_cues() {
        let mut h = harness(vec![Exercise::new("A", 1, "5 sec")]);
        run_to_completion(&mut h.session);

        let beeps = h.beeps.borrow();
        assert_eq!(
            *beeps,
            vec![
                Cue::CountdownTick.beep(),
                Cue::CountdownTick.beep(),
                Cue::CountdownTick.beep(),
                Cue::WorkoutComplete.beep(),
            ]
        );
    }

    #[test]
    fn test_phase_complete_cue_between_sets() {
        let mut h = harness(vec![Exercise::new("A", 2, "1 sec")]);
        h.session.start();
        h.session.tick();

        assert_eq!(*h.beeps.borrow(), vec![Cue::PhaseComplete.beep()]);
        assert_eq!(h.session.state().phase, Phase::RestingBetweenSets);
    }

    #[test]
    fn test_sound_toggle() {
        let mut h = harness(vec![Exercise::new("A", 1, "5 sec")]);
        h.session.apply(SessionCommand::ToggleSound);
        assert!(!h.session.sound_enabled());

        run_to_completion(&mut h.session);
        assert!(h.beeps.borrow().is_empty());
    }

    #[test]
    fn test_apply_commands() {
        let mut h = harness(vec![Exercise::new("A", 1, "5 sec")]);

        h.session.apply(SessionCommand::TogglePause);
        assert!(h.session.is_running());
        h.session.apply(SessionCommand::TogglePause);
        assert!(!h.session.is_running());
        h.session.apply(SessionCommand::Start);
        h.session.apply(SessionCommand::Quit);
        assert!(!h.session.is_running());
    }

    #[test]
    fn test_empty_exercise_list_rejected() {
        let result = WorkoutSession::new(
            "Empty",
            vec![],
            ToneSynth::silent(),
            Box::new(NoopObserver),
            Timing::default(),
        );
        assert!(matches!(result, Err(Error::Plan(_))));
    }

    #[test]
    fn test_zero_sets_rejected() {
        let result = WorkoutSession::new(
            "Broken",
            vec![Exercise::new("A", 0, "5 sec")],
            ToneSynth::silent(),
            Box::new(NoopObserver),
            Timing::default(),
        );
        assert!(matches!(result, Err(Error::Plan(_))));
    }

    #[test]
    fn test_custom_timing_elapsed() {
        let timing = Timing {
            rest_between_sets: 4,
            ..Timing::default()
        };
        let mut h = harness_with_timing(vec![Exercise::new("A", 2, "2 sec")], timing);
        assert_eq!(h.session.timing(), &timing);

        run_to_completion(&mut h.session);
        assert_eq!(h.session.state().total_elapsed_seconds, 8);
    }

    #[test]
    fn test_skip_and_reset_report_state() {
        let mut h = harness(vec![
            Exercise::new("A", 2, "5 sec"),
            Exercise::new("B", 3, "20 sec"),
        ]);
        h.session.start();
        h.session.tick();
        assert!(h.changes.borrow().is_empty());

        h.session.skip();
        {
            let changes = h.changes.borrow();
            assert_eq!(changes.len(), 1);
            assert_eq!(changes[0].current_exercise_index, 1);
            assert_eq!(changes[0].current_set, 1);
            assert_eq!(changes[0].time_remaining, 20);
        }

        h.session.reset();
        assert_eq!(h.changes.borrow().len(), 2);
        assert_eq!(h.changes.borrow()[1], SessionState::initial());
    }

    #[test]
    fn test_shutdown_stops_session() {
        let mut h = harness(vec![Exercise::new("A", 1, "5 sec")]);
        h.session.start();
        h.session.shutdown();
        h.session.tick();

        assert!(!h.session.is_running());
        assert_eq!(h.session.state().total_elapsed_seconds, 0);
    }
}
