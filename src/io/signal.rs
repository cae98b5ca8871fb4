//! Decoded mono audio shared with analysis workers

use crate::error::AnalysisError;
use std::sync::Arc;

/// Decoded mono audio signal
///
/// The sample buffer sits behind an `Arc` so bounded workers can take a
/// cheap clone without copying samples. The buffer is never mutated.
#[derive(Debug, Clone)]
pub struct AudioSignal {
    samples: Arc<[f32]>,
    sample_rate: u32,
}

impl AudioSignal {
    /// Wrap decoded samples
    ///
    /// # Errors
    ///
    /// Returns `AnalysisError::InvalidInput` for an empty buffer, a zero sample
    /// rate or non-finite samples.
    pub fn new(samples: impl Into<Arc<[f32]>>, sample_rate: u32) -> Result<Self, AnalysisError> {
        let samples = samples.into();

        if samples.is_empty() {
            return Err(AnalysisError::InvalidInput(
                "Empty audio samples".to_string(),
            ));
        }

        if sample_rate == 0 {
            return Err(AnalysisError::InvalidInput(
                "Invalid sample rate".to_string(),
            ));
        }

        if let Some(pos) = samples.iter().position(|s| !s.is_finite()) {
            return Err(AnalysisError::InvalidInput(format!(
                "Non-finite sample at index {}",
                pos
            )));
        }

        Ok(Self {
            samples,
            sample_rate,
        })
    }

    /// Mono samples
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Sample rate in Hz
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Duration in seconds
    pub fn duration(&self) -> f32 {
        self.samples.len() as f32 / self.sample_rate as f32
    }
}
