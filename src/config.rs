//! Configuration parameters for audio analysis

use crate::error::AnalysisError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Largest accepted time budget in seconds (one day)
pub const MAX_BUDGET_SECS: f32 = 86_400.0;

/// Analysis configuration parameters
///
/// Every field has a default, so partial JSON documents are accepted by
/// [`AnalysisConfig::from_json_str`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    // Time budgets
    /// Budget for onset envelope computation in seconds (default: 30.0)
    pub onset_timeout_secs: f32,

    /// Budget for tempo candidate estimation in seconds (default: 30.0)
    pub tempo_timeout_secs: f32,

    /// Budget for beat tracking in seconds (default: 30.0)
    pub beat_timeout_secs: f32,

    /// Budget for structural segmentation in seconds (default: 60.0)
    pub section_timeout_secs: f32,

    /// Budget for chroma computation in seconds (default: 30.0)
    pub chroma_timeout_secs: f32,

    // Tempo
    /// Tempo used whenever estimation is unavailable (default: 120.0)
    pub default_bpm: f32,

    /// Lowest accepted final tempo (default: 60.0)
    pub min_bpm: f32,

    /// Highest accepted final tempo (default: 180.0)
    pub max_bpm: f32,

    /// Candidates inside this window are preferred (default: [80.0, 140.0])
    pub preferred_bpm_range: (f32, f32),

    /// Tempos above this are treated as subdivision errors (default: 160.0)
    pub octave_correction_threshold: f32,

    /// A halved/quartered tempo is accepted inside this window (default: [60.0, 140.0])
    pub octave_accept_range: (f32, f32),

    // Chords
    /// Chord window length in seconds (default: 0.5)
    pub chord_window_secs: f32,

    /// Maximum number of chord events kept (default: 50)
    pub max_chords: usize,

    // Sections
    /// Target seconds per section when choosing k (default: 30.0)
    pub section_secs: f32,

    /// Minimum number of sections (default: 3)
    pub min_sections: usize,

    /// Maximum number of sections (default: 6)
    pub max_sections: usize,

    // Reference primitives
    /// STFT / onset frame size in samples (default: 2048)
    pub frame_size: usize,

    /// Hop size in samples (default: 512)
    pub hop_size: usize,

    /// Reference tuning for chroma mapping in Hz (default: 440.0 Hz, A4)
    pub center_frequency: f32,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            onset_timeout_secs: 30.0,
            tempo_timeout_secs: 30.0,
            beat_timeout_secs: 30.0,
            section_timeout_secs: 60.0,
            chroma_timeout_secs: 30.0,
            default_bpm: 120.0,
            min_bpm: 60.0,
            max_bpm: 180.0,
            preferred_bpm_range: (80.0, 140.0),
            octave_correction_threshold: 160.0,
            octave_accept_range: (60.0, 140.0),
            chord_window_secs: 0.5,
            max_chords: 50,
            section_secs: 30.0,
            min_sections: 3,
            max_sections: 6,
            frame_size: 2048,
            hop_size: 512,
            center_frequency: 440.0,
        }
    }
}

impl AnalysisConfig {
    /// Parse a (possibly partial) JSON configuration and validate it
    pub fn from_json_str(json: &str) -> Result<Self, AnalysisError> {
        let config: AnalysisConfig = serde_json::from_str(json)
            .map_err(|e| AnalysisError::InvalidInput(format!("Invalid config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Check that budgets, ranges and sizes are usable
    pub fn validate(&self) -> Result<(), AnalysisError> {
        let budgets = [
            ("onset_timeout_secs", self.onset_timeout_secs),
            ("tempo_timeout_secs", self.tempo_timeout_secs),
            ("beat_timeout_secs", self.beat_timeout_secs),
            ("section_timeout_secs", self.section_timeout_secs),
            ("chroma_timeout_secs", self.chroma_timeout_secs),
        ];
        for (name, secs) in budgets {
            if !secs.is_finite() || secs <= 0.0 || secs > MAX_BUDGET_SECS {
                return Err(AnalysisError::InvalidInput(format!(
                    "{} must be in (0, {}] seconds, got {}",
                    name, MAX_BUDGET_SECS, secs
                )));
            }
        }

        if self.min_bpm <= 0.0 || self.min_bpm >= self.max_bpm {
            return Err(AnalysisError::InvalidInput(format!(
                "Invalid BPM range: [{:.1}, {:.1}]",
                self.min_bpm, self.max_bpm
            )));
        }

        if self.default_bpm < self.min_bpm || self.default_bpm > self.max_bpm {
            return Err(AnalysisError::InvalidInput(format!(
                "default_bpm {:.1} outside [{:.1}, {:.1}]",
                self.default_bpm, self.min_bpm, self.max_bpm
            )));
        }

        if self.chord_window_secs <= 0.0 || self.section_secs <= 0.0 {
            return Err(AnalysisError::InvalidInput(
                "Window lengths must be positive".to_string(),
            ));
        }

        if self.min_sections == 0 || self.min_sections > self.max_sections {
            return Err(AnalysisError::InvalidInput(format!(
                "Invalid section count range: [{}, {}]",
                self.min_sections, self.max_sections
            )));
        }

        if self.frame_size == 0 || self.hop_size == 0 {
            return Err(AnalysisError::InvalidInput(
                "Frame and hop size must be > 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Onset envelope budget
    pub fn onset_timeout(&self) -> Duration {
        budget(self.onset_timeout_secs)
    }

    /// Tempo candidate budget
    pub fn tempo_timeout(&self) -> Duration {
        budget(self.tempo_timeout_secs)
    }

    /// Beat tracking budget
    pub fn beat_timeout(&self) -> Duration {
        budget(self.beat_timeout_secs)
    }

    /// Segmentation budget
    pub fn section_timeout(&self) -> Duration {
        budget(self.section_timeout_secs)
    }

    /// Chroma budget
    pub fn chroma_timeout(&self) -> Duration {
        budget(self.chroma_timeout_secs)
    }
}

/// Budget as a `Duration`; values `Duration` cannot hold (negative, NaN,
/// overflowing) mean no usable bound and saturate to `Duration::MAX`
fn budget(secs: f32) -> Duration {
    Duration::try_from_secs_f32(secs).unwrap_or(Duration::MAX)
}
