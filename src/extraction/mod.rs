//! Feature extraction orchestration
//!
//! [`FeatureExtractor`] drives a [`SignalPrimitives`] backend one feature at a
//! time. Every primitive call is wrapped in a [`bounded::BoundedOperation`];
//! an overrun or an error never escapes. Each feature swaps in its documented
//! fallback instead:
//!
//! | Feature  | Timeout                        | Failure          |
//! |----------|--------------------------------|------------------|
//! | tempo    | 120 BPM                        | 120 BPM          |
//! | key      | C major                        | C major          |
//! | beats    | synthetic grid, confidence 0.5 | no beats         |
//! | sections | evenly spaced, confidence 0.5  | no sections      |
//! | chords   | no chords                      | no chords        |

pub mod beats;
pub mod bounded;
pub mod chords;
pub mod key;
pub mod sections;
pub mod tempo;

use crate::analysis::result::{Beat, ChordEvent, KeyEstimate, Section};
use crate::config::AnalysisConfig;
use crate::error::AnalysisError;
use crate::features::SignalPrimitives;
use crate::io::AudioSignal;
use bounded::{BoundedOperation, Outcome};
use std::sync::Arc;
use std::time::Duration;

/// Raw features for one signal, before any theory reasoning
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedFeatures {
    /// Corrected tempo in BPM
    pub bpm: f32,
    /// Key estimate
    pub key: KeyEstimate,
    /// Beat grid
    pub beats: Vec<Beat>,
    /// Sections covering the whole signal
    pub sections: Vec<Section>,
    /// Chord progression
    pub chords: Vec<ChordEvent>,
}

/// Orchestrates bounded primitive calls and applies fallback heuristics
///
/// Holds no per-signal state, so one extractor can serve any number of
/// signals (including from several threads).
#[derive(Clone)]
pub struct FeatureExtractor {
    primitives: Arc<dyn SignalPrimitives>,
    config: AnalysisConfig,
}

impl FeatureExtractor {
    /// Create an extractor over `primitives`
    pub fn new(primitives: Arc<dyn SignalPrimitives>, config: AnalysisConfig) -> Self {
        Self { primitives, config }
    }

    /// Configuration in use
    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Extract every feature
    ///
    /// Never fails: each feature degrades on its own.
    pub fn extract(&self, signal: &AudioSignal) -> ExtractedFeatures {
        let bpm = self.extract_tempo(signal);
        let key = self.extract_key(signal);
        let beats = self.extract_beats_at(signal, bpm);
        let sections = self.extract_sections(signal);
        let chords = self.extract_chords(signal);

        log::info!(
            "Extracted features: {:.2} BPM, {}, {} beats, {} sections, {} chords",
            bpm,
            key.label(),
            beats.len(),
            sections.len(),
            chords.len()
        );

        ExtractedFeatures {
            bpm,
            key,
            beats,
            sections,
            chords,
        }
    }

    /// Run one primitive call on a worker thread under `budget`
    fn bounded<T, F>(&self, name: &str, budget: Duration, job: F) -> Outcome<T>
    where
        T: Send + 'static,
        F: FnOnce(&dyn SignalPrimitives) -> Result<T, AnalysisError> + Send + 'static,
    {
        let primitives = Arc::clone(&self.primitives);
        BoundedOperation::new(name, budget).run(move || job(primitives.as_ref()))
    }
}

impl std::fmt::Debug for FeatureExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeatureExtractor")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
