//! Procedural tone synthesis for audio cues.
//!
//! Cues are built from short sine beeps with an exponential decay envelope,
//! so no audio assets ship with the engine. Sound is best-effort: a disabled
//! or unavailable output turns every cue into a no-op.

use crate::audio::ToneOutput;
use crate::{Error, Result};
use std::f32::consts::PI;
use std::time::Duration;

/// Silence between consecutive tones of one beep
pub const BEEP_GAP_MS: u64 = 100;

/// Output sample rate for synthesized tones
pub const SAMPLE_RATE: u32 = 44_100;

/// Envelope gain at the start of each tone
pub const START_GAIN: f32 = 0.3;

/// Envelope gain at the end of each tone
pub const END_GAIN: f32 = 0.01;

/// A run of identical tones
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Beep {
    pub frequency_hz: f32,
    pub duration_ms: u64,
    pub count: u32,
}

/// One tone of a beep, placed relative to the beep's start
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScheduledTone {
    pub offset: Duration,
    pub frequency_hz: f32,
    pub duration: Duration,
}

impl Beep {
    pub fn new(frequency_hz: f32, duration_ms: u64, count: u32) -> Self {
        Self {
            frequency_hz,
            duration_ms,
            count,
        }
    }

    /// Tone `i` starts at `i * (duration + gap)`
    pub fn schedule(&self) -> Vec<ScheduledTone> {
        let spacing = self.duration_ms + BEEP_GAP_MS;
        (0..self.count as u64)
            .map(|i| ScheduledTone {
                offset: Duration::from_millis(i * spacing),
                frequency_hz: self.frequency_hz,
                duration: Duration::from_millis(self.duration_ms),
            })
            .collect()
    }

    /// Time from the first tone's start to the last tone's end
    pub fn total_duration(&self) -> Duration {
        match self.count {
            0 => Duration::ZERO,
            n => Duration::from_millis(
                n as u64 * self.duration_ms + (n as u64 - 1) * BEEP_GAP_MS,
            ),
        }
    }
}

/// Semantic cue presets
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Cue {
    /// Final seconds of a phase
    CountdownTick,
    /// A set, exercise or rest finished
    PhaseComplete,
    /// The whole workout finished
    WorkoutComplete,
}

impl Cue {
    pub fn beep(&self) -> Beep {
        match self {
            Cue::CountdownTick => Beep::new(880.0, 100, 1),
            Cue::PhaseComplete => Beep::new(660.0, 200, 2),
            Cue::WorkoutComplete => Beep::new(1046.5, 300, 3),
        }
    }
}

/// Envelope gain at `t` seconds into a tone lasting `duration` seconds
///
/// Decays exponentially from `START_GAIN` to `END_GAIN`.
pub fn envelope_gain(t: f32, duration: f32) -> f32 {
    if duration <= 0.0 {
        return END_GAIN;
    }
    let progress = (t / duration).clamp(0.0, 1.0);
    START_GAIN * (END_GAIN / START_GAIN).powf(progress)
}

/// Mono sine samples shaped by the decay envelope
#[derive(Clone, Debug)]
pub struct DecayingTone {
    frequency_hz: f32,
    duration: Duration,
    sample_idx: usize,
    total_samples: usize,
}

impl DecayingTone {
    pub fn new(frequency_hz: f32, duration: Duration) -> Self {
        let total_samples = (duration.as_secs_f32() * SAMPLE_RATE as f32) as usize;
        Self {
            frequency_hz,
            duration,
            sample_idx: 0,
            total_samples,
        }
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn remaining_samples(&self) -> usize {
        self.total_samples - self.sample_idx
    }
}

impl Iterator for DecayingTone {
    type Item = f32;

    fn next(&mut self) -> Option<Self::Item> {
        if self.sample_idx >= self.total_samples {
            return None;
        }

        let t = self.sample_idx as f32 / SAMPLE_RATE as f32;
        let wave = (2.0 * PI * self.frequency_hz * t).sin();
        let sample = wave * envelope_gain(t, self.duration.as_secs_f32());

        self.sample_idx += 1;
        Some(sample)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.remaining_samples();
        (remaining, Some(remaining))
    }
}

/// Cue player owning the session's audio output
///
/// The output is released when the synthesizer is released or dropped.
pub struct ToneSynth {
    output: Option<Box<dyn ToneOutput>>,
    enabled: bool,
}

impl ToneSynth {
    /// Build a synthesizer from an output that may have failed to open
    ///
    /// An unavailable output yields a synthesizer whose cues are all no-ops.
    pub fn new(output: Result<Box<dyn ToneOutput>>, enabled: bool) -> Self {
        let output = match output {
            Ok(output) => Some(output),
            Err(Error::NoAudioBackend) => {
                tracing::debug!("No audio backend compiled in, cues disabled");
                None
            }
            Err(e) => {
                tracing::warn!("Audio unavailable, cues disabled: {}", e);
                None
            }
        };

        Self { output, enabled }
    }

    /// A synthesizer with no output at all
    pub fn silent() -> Self {
        Self {
            output: None,
            enabled: false,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.silence();
        }
    }

    pub fn is_available(&self) -> bool {
        self.output.is_some()
    }

    /// Play `count` tones at `frequency_hz`, each `duration_ms` long
    pub fn beep(&mut self, frequency_hz: f32, duration_ms: u64, count: u32) {
        self.play(Beep::new(frequency_hz, duration_ms, count));
    }

    pub fn cue(&mut self, cue: Cue) {
        self.play(cue.beep());
    }

    fn play(&mut self, beep: Beep) {
        if !self.enabled || beep.count == 0 {
            return;
        }
        let Some(output) = self.output.as_mut() else {
            return;
        };

        if let Err(e) = output.play(&beep) {
            tracing::debug!("Dropping beep at {} Hz: {}", beep.frequency_hz, e);
        }
    }

    /// Cut off anything still sounding
    pub fn silence(&mut self) {
        if let Some(output) = self.output.as_mut() {
            output.silence();
        }
    }

    /// Silence and drop the audio output
    pub fn release(&mut self) {
        if let Some(mut output) = self.output.take() {
            output.silence();
            tracing::debug!("Released audio output");
        }
    }
}

impl Drop for ToneSynth {
    fn drop(&mut self) {
        self.release();
    }
}
