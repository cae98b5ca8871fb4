//! Analysis result types

use crate::theory::genre::GenreAnalysis;
use crate::theory::harmony::HarmonicAnalysis;
use crate::theory::pitch::{Mode, PitchClass};
use crate::theory::rhythm::RhythmicAnalysis;
use serde::{Deserialize, Serialize};

/// Reference tuning reported for every key estimate (not measured)
pub const REFERENCE_TUNING_HZ: f32 = 440.0;

/// Estimated key with its reference tuning
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KeyEstimate {
    /// Tonic pitch class
    pub root: PitchClass,

    /// Major or minor
    pub mode: Mode,

    /// Tuning frequency of A4 in Hz (always 440.0)
    pub tuning_hz: f32,
}

impl KeyEstimate {
    /// Key at the reference tuning
    pub fn new(root: PitchClass, mode: Mode) -> Self {
        Self {
            root,
            mode,
            tuning_hz: REFERENCE_TUNING_HZ,
        }
    }

    /// Key in `"<root> <mode>"` form (e.g. `"C# minor"`)
    ///
    /// ```
    /// use songform::analysis::result::KeyEstimate;
    /// use songform::theory::pitch::{Mode, PitchClass};
    ///
    /// assert_eq!(KeyEstimate::new(PitchClass::A, Mode::Minor).label(), "A minor");
    /// ```
    pub fn label(&self) -> String {
        format!("{} {}", self.root, self.mode)
    }
}

impl Default for KeyEstimate {
    fn default() -> Self {
        Self::new(PitchClass::C, Mode::Major)
    }
}

/// Single beat on the beat grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Beat {
    /// Beat time in seconds
    pub time: f32,

    /// 1-based ordinal within the track
    pub position: u32,

    /// 0.8 for tracked beats, 0.5/0.6 for synthesized grids
    pub confidence: f32,
}

/// Structural section covering `[start_time, end_time)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    /// Section label (intro, verse, chorus, ...)
    pub label: String,

    /// Start in seconds
    pub start_time: f32,

    /// End in seconds (always > `start_time`)
    pub end_time: f32,

    /// 0.8 for segmentation-derived sections, 0.5 for evenly spaced ones
    pub confidence: f32,
}

impl Section {
    /// Length in seconds
    pub fn duration(&self) -> f32 {
        self.end_time - self.start_time
    }
}

/// Chord observation (root only, named as a major triad)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChordEvent {
    /// Chord root
    pub chord: PitchClass,

    /// Start in seconds
    pub start_time: f32,

    /// End in seconds (always > `start_time`)
    pub end_time: f32,

    /// Fixed detector confidence
    pub confidence: f32,
}

impl ChordEvent {
    /// Length in seconds
    pub fn duration(&self) -> f32 {
        self.end_time - self.start_time
    }
}

/// Complete analysis result
///
/// Built once per signal by the pipeline and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Tempo in BPM (60-180)
    pub bpm: f32,

    /// Detected key
    pub key: KeyEstimate,

    /// Tuning frequency in Hz
    pub tuning_frequency: f32,

    /// Audio duration in seconds
    pub duration_seconds: f32,

    /// Beat grid, ascending by time
    pub beats: Vec<Beat>,

    /// Contiguous sections
    pub sections: Vec<Section>,

    /// Chord progression, ascending by time
    pub chords: Vec<ChordEvent>,

    /// Roman-numeral harmony, cadences and patterns
    pub harmonic_analysis: HarmonicAnalysis,

    /// Syncopation, density and complexity
    pub rhythmic_analysis: RhythmicAnalysis,

    /// Ranked genre predictions
    pub genre_analysis: GenreAnalysis,

    /// Analysis metadata
    pub metadata: AnalysisMetadata,
}

/// Analysis metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisMetadata {
    /// Sample rate in Hz
    pub sample_rate: u32,

    /// Processing time in milliseconds
    pub processing_time_ms: f32,

    /// Algorithm version
    pub algorithm_version: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_label() {
        assert_eq!(KeyEstimate::default().label(), "C major");
        assert_eq!(
            KeyEstimate::new(PitchClass::CSharp, Mode::Minor).label(),
            "C# minor"
        );
        assert_eq!(KeyEstimate::default().tuning_hz, 440.0);
    }

    #[test]
    fn test_durations() {
        let chord = ChordEvent {
            chord: PitchClass::G,
            start_time: 1.0,
            end_time: 1.5,
            confidence: 0.7,
        };
        assert!((chord.duration() - 0.5).abs() < 1e-6);

        let section = Section {
            label: "verse".to_string(),
            start_time: 30.0,
            end_time: 60.0,
            confidence: 0.8,
        };
        assert_eq!(section.duration(), 30.0);
    }

    #[test]
    fn test_key_serializes_with_names() {
        let json = serde_json::to_value(KeyEstimate::new(PitchClass::FSharp, Mode::Major)).unwrap();
        assert_eq!(json["root"], "F#");
        assert_eq!(json["mode"], "major");
    }
}
