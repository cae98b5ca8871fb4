//! # Songform
//!
//! Musical structure analysis for decoded audio: tempo, key, beat grid,
//! sections and chords, plus theory-level annotations (Roman-numeral harmony,
//! cadences, rhythmic complexity and genre likelihood).
//!
//! ## Features
//!
//! - **Fault-tolerant extraction**: every signal primitive runs under its own
//!   time budget; overruns and failures degrade to documented fallbacks
//! - **Tempo**: candidate selection with octave correction
//! - **Key**: chroma correlation against Krumhansl-Kessler profiles
//! - **Harmony**: Roman numerals, functional labels, cadences, common patterns
//! - **Rhythm**: syncopation, note density, complexity
//! - **Genre**: rule-based template ranking
//! - **Export**: serde-serializable results and JAMS annotations
//!
//! ## Quick Start
//!
//! ```no_run
//! use songform::{analyze_file, AnalysisConfig};
//! use std::path::Path;
//!
//! let instruments = vec!["drums".to_string(), "bass".to_string()];
//! let result = analyze_file(Path::new("track.wav"), &instruments, AnalysisConfig::default())?;
//!
//! println!("BPM: {:.2}", result.bpm);
//! println!("Key: {}", result.key.label());
//! println!("Genre: {}", result.genre_analysis.primary_genre);
//! # Ok::<(), songform::AnalysisError>(())
//! ```
//!
//! ## Architecture
//!
//! ```text
//! AudioSignal → SignalPrimitives (bounded) → FeatureExtractor
//!             → {Harmony, Rhythm} → Genre → AnalysisResult
//! ```
//!
//! Only a signal that cannot be decoded or validated aborts the pipeline.
//! Everything past that point always produces a structurally complete
//! [`AnalysisResult`].

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod analysis;
pub mod config;
pub mod error;
pub mod extraction;
pub mod features;
pub mod io;
pub mod theory;

// Re-export main types
pub use analysis::annotation::{save_jams, to_jams, JamsDocument};
pub use analysis::result::{
    AnalysisMetadata, AnalysisResult, Beat, ChordEvent, KeyEstimate, Section,
};
pub use config::AnalysisConfig;
pub use error::AnalysisError;
pub use extraction::{ExtractedFeatures, FeatureExtractor};
pub use features::{ReferencePrimitives, SignalPrimitives};
pub use io::{decode_file, AudioSignal};

use rayon::prelude::*;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

/// Main analysis function
///
/// Extracts raw features through `primitives`, then runs the harmonic and
/// rhythmic reasoners (in parallel) and the genre classifier.
///
/// # Arguments
///
/// * `signal` - Decoded mono audio
/// * `primitives` - Signal-processing backend
/// * `instrumentation` - Detected instruments or stem names (genre evidence)
/// * `config` - Analysis configuration parameters
///
/// # Errors
///
/// Returns `AnalysisError::InvalidInput` if `config` does not validate.
/// Primitive timeouts and failures never surface here.
pub fn analyze_signal(
    signal: &AudioSignal,
    primitives: Arc<dyn SignalPrimitives>,
    instrumentation: &[String],
    config: AnalysisConfig,
) -> Result<AnalysisResult, AnalysisError> {
    let start_time = Instant::now();

    log::debug!(
        "Starting analysis: {} samples at {} Hz ({:.2}s)",
        signal.samples().len(),
        signal.sample_rate(),
        signal.duration()
    );

    config.validate()?;

    let extractor = FeatureExtractor::new(primitives, config);
    let features = extractor.extract(signal);
    let duration = signal.duration();

    let key_label = features.key.label();
    let (harmonic_analysis, rhythmic_analysis) = rayon::join(
        || theory::analyze_harmony(&features.chords, &key_label, features.bpm),
        || theory::analyze_rhythm(&features.beats, features.bpm, duration),
    );
    let genre_analysis =
        theory::classify_genre(&harmonic_analysis, &rhythmic_analysis, instrumentation);

    let processing_time_ms = start_time.elapsed().as_secs_f32() * 1000.0;

    log::info!(
        "Analysis complete in {:.1} ms: {:.2} BPM, {}, primary genre {}",
        processing_time_ms,
        features.bpm,
        key_label,
        genre_analysis.primary_genre
    );

    let ExtractedFeatures {
        bpm,
        key,
        beats,
        sections,
        chords,
    } = features;

    Ok(AnalysisResult {
        bpm,
        tuning_frequency: key.tuning_hz,
        key,
        duration_seconds: duration,
        beats,
        sections,
        chords,
        harmonic_analysis,
        rhythmic_analysis,
        genre_analysis,
        metadata: AnalysisMetadata {
            sample_rate: signal.sample_rate(),
            processing_time_ms,
            algorithm_version: env!("CARGO_PKG_VERSION").to_string(),
        },
    })
}

/// Decode a file and analyze it with [`ReferencePrimitives`]
///
/// # Errors
///
/// Returns `AnalysisError::DecodingError` if the file cannot be decoded and
/// `AnalysisError::InvalidInput` if `config` does not validate.
///
/// # Example
///
/// ```no_run
/// use songform::{analyze_file, AnalysisConfig};
/// use std::path::Path;
///
/// let result = analyze_file(Path::new("song.flac"), &[], AnalysisConfig::default())?;
/// assert!(result.bpm >= 60.0 && result.bpm <= 180.0);
/// # Ok::<(), songform::AnalysisError>(())
/// ```
pub fn analyze_file(
    path: &Path,
    instrumentation: &[String],
    config: AnalysisConfig,
) -> Result<AnalysisResult, AnalysisError> {
    config.validate()?;
    let signal = decode_file(path)?;
    let primitives: Arc<dyn SignalPrimitives> = Arc::new(ReferencePrimitives::new(&config));
    analyze_signal(&signal, primitives, instrumentation, config)
}

/// Analyze several signals in parallel
///
/// Each signal gets its own extractor; results come back in input order.
pub fn analyze_batch(
    signals: &[AudioSignal],
    primitives: Arc<dyn SignalPrimitives>,
    instrumentation: &[String],
    config: &AnalysisConfig,
) -> Vec<Result<AnalysisResult, AnalysisError>> {
    log::info!("Analyzing batch of {} signals", signals.len());
    signals
        .par_iter()
        .map(|signal| {
            analyze_signal(
                signal,
                Arc::clone(&primitives),
                instrumentation,
                config.clone(),
            )
        })
        .collect()
}
