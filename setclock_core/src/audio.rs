//! Audio output backends for the tone synthesizer.
//!
//! With the `audio` feature, cues play through the default output device via
//! rodio. Without it, no device can be opened and the synthesizer stays
//! silent.

use crate::tone::Beep;
use crate::Result;

/// Sink for synthesized beeps
pub trait ToneOutput {
    /// Start playing a beep; must not block for its duration
    fn play(&mut self, beep: &Beep) -> Result<()>;

    /// Stop everything still queued or sounding
    fn silence(&mut self) {}
}

/// Open the default output device
#[cfg(feature = "audio")]
pub fn open_default_output() -> Result<Box<dyn ToneOutput>> {
    Ok(Box::new(rodio_output::RodioOutput::open()?))
}

/// Open the default output device
#[cfg(not(feature = "audio"))]
pub fn open_default_output() -> Result<Box<dyn ToneOutput>> {
    Err(crate::Error::NoAudioBackend)
}

#[cfg(feature = "audio")]
pub use rodio_output::RodioOutput;

#[cfg(feature = "audio")]
mod rodio_output {
    use super::ToneOutput;
    use crate::tone::{Beep, DecayingTone, BEEP_GAP_MS, SAMPLE_RATE};
    use crate::{Error, Result};
    use rodio::{OutputStream, OutputStreamHandle, Sink, Source};
    use std::time::Duration;

    /// Plays beeps on the default device, one sink per beep so cues overlap
    pub struct RodioOutput {
        _stream: OutputStream,
        handle: OutputStreamHandle,
        sinks: Vec<Sink>,
    }

    impl RodioOutput {
        pub fn open() -> Result<Self> {
            let (stream, handle) =
                OutputStream::try_default().map_err(|e| Error::Audio(e.to_string()))?;
            tracing::info!("Opened default audio output");
            Ok(Self {
                _stream: stream,
                handle,
                sinks: Vec::new(),
            })
        }
    }

    impl ToneOutput for RodioOutput {
        fn play(&mut self, beep: &Beep) -> Result<()> {
            // Dropping a sink stops it, so finished ones are pruned here
            self.sinks.retain(|sink| !sink.empty());

            let sink = Sink::try_new(&self.handle).map_err(|e| Error::Audio(e.to_string()))?;
            for (i, tone) in beep.schedule().into_iter().enumerate() {
                let gap = if i == 0 {
                    Duration::ZERO
                } else {
                    Duration::from_millis(BEEP_GAP_MS)
                };
                sink.append(DecayingTone::new(tone.frequency_hz, tone.duration).delay(gap));
            }
            self.sinks.push(sink);
            Ok(())
        }

        fn silence(&mut self) {
            for sink in self.sinks.drain(..) {
                sink.stop();
            }
        }
    }

    impl Source for DecayingTone {
        fn current_frame_len(&self) -> Option<usize> {
            Some(self.remaining_samples())
        }

        fn channels(&self) -> u16 {
            1
        }

        fn sample_rate(&self) -> u32 {
            SAMPLE_RATE
        }

        fn total_duration(&self) -> Option<Duration> {
            Some(self.duration())
        }
    }
}
