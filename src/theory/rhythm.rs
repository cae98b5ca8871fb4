//! Rhythmic complexity analysis
//!
//! Works on the beat grid alone. The meter is assumed to be 4/4 and
//! polyrhythm detection is not performed, so both enter the score as fixed
//! values.
//!
//! # Syncopation
//!
//! For each beat, `phase = (time mod (4 * beat_duration)) / beat_duration`.
//! A beat within 0.1 of an integer phase is on the grid: weight 1.0 on beats
//! 1 and 3, 0.5 on beats 2 and 4. Anything else is off-beat with weight 1.0.
//! The index is the off-beat share of the total weight.

use crate::analysis::result::Beat;
use serde::{Deserialize, Serialize};

/// Distance from an integer beat phase still counted as on the grid
pub const ON_BEAT_TOLERANCE: f32 = 0.1;

/// Musical time signature
///
/// Meter detection is not performed, so common time is the only meter the
/// analysis reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeSignature {
    /// 4/4 time (common time)
    #[serde(rename = "4/4")]
    FourFour,
}

impl TimeSignature {
    /// Get beats per bar for this time signature
    pub fn beats_per_bar(&self) -> u32 {
        match self {
            TimeSignature::FourFour => 4,
        }
    }

    /// Get name as string (e.g., "4/4")
    pub fn name(&self) -> &'static str {
        match self {
            TimeSignature::FourFour => "4/4",
        }
    }
}

/// Strong/weak beat layout of a bar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricHierarchy {
    /// Meter the layout belongs to
    pub time_signature: TimeSignature,
    /// Beats per bar
    pub beats_per_bar: u32,
    /// 1-based strong beats
    pub strong_beats: Vec<u32>,
    /// 1-based weak beats
    pub weak_beats: Vec<u32>,
}

impl MetricHierarchy {
    /// Layout for a meter: beats 1 and 3 strong, 2 and 4 weak in common time
    pub fn for_time_signature(time_signature: TimeSignature) -> Self {
        let beats_per_bar = time_signature.beats_per_bar();
        let (strong_beats, weak_beats) = match time_signature {
            TimeSignature::FourFour => (vec![1, 3], vec![2, 4]),
        };
        Self {
            time_signature,
            beats_per_bar,
            strong_beats,
            weak_beats,
        }
    }
}

/// Rhythm metrics for one beat grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RhythmicAnalysis {
    /// Off-beat share of rhythmic weight (0-1)
    pub syncopation_index: f32,
    /// Assumed meter
    pub time_signature: TimeSignature,
    /// Beats per second
    pub note_density: f32,
    /// Always false
    pub polyrhythms_detected: bool,
    /// Strong/weak beat layout
    pub metric_hierarchy: MetricHierarchy,
    /// Weighted complexity (0-1)
    pub complexity_score: f32,
    /// Tempo the analysis was made at
    pub bpm: f32,
    /// Number of beats
    pub total_beats: usize,
}

/// Off-beat share of rhythmic weight, in [0, 1]
pub fn syncopation_index(beats: &[Beat], bpm: f32) -> f32 {
    if beats.is_empty() || !(bpm.is_finite() && bpm > 0.0) {
        return 0.0;
    }
    let beat_duration = 60.0 / bpm;
    let bar = 4.0 * beat_duration;

    let mut on_beat = 0.0f32;
    let mut off_beat = 0.0f32;
    for beat in beats {
        let phase = beat.time.rem_euclid(bar) / beat_duration;
        let nearest = phase.round();
        if (phase - nearest).abs() < ON_BEAT_TOLERANCE {
            if matches!(nearest as i64 % 4, 0 | 2) {
                on_beat += 1.0;
            } else {
                on_beat += 0.5;
            }
        } else {
            off_beat += 1.0;
        }
    }

    let total = on_beat + off_beat;
    if total > 0.0 {
        (off_beat / total).clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// `0.4 * syncopation + 0.3 * min(density / 10, 1) + 0.3 * polyrhythm`, capped at 1
pub fn rhythmic_complexity(syncopation: f32, note_density: f32, polyrhythm: bool) -> f32 {
    let polyrhythm = if polyrhythm { 1.0 } else { 0.0 };
    (0.4 * syncopation + 0.3 * (note_density / 10.0).min(1.0) + 0.3 * polyrhythm).min(1.0)
}

/// Analyze a beat grid
///
/// # Arguments
///
/// * `beats` - Beat grid in time order
/// * `bpm` - Tempo of the grid
/// * `duration` - Track length in seconds
pub fn analyze_rhythm(beats: &[Beat], bpm: f32, duration: f32) -> RhythmicAnalysis {
    let time_signature = TimeSignature::FourFour;
    let polyrhythms_detected = false;

    let syncopation = syncopation_index(beats, bpm);
    let note_density = if duration > 0.0 {
        beats.len() as f32 / duration
    } else {
        0.0
    };
    let complexity_score = if beats.is_empty() {
        0.0
    } else {
        rhythmic_complexity(syncopation, note_density, polyrhythms_detected)
    };

    log::debug!(
        "Rhythm: syncopation {:.3}, density {:.2}/s, complexity {:.3}",
        syncopation,
        note_density,
        complexity_score
    );

    RhythmicAnalysis {
        syncopation_index: syncopation,
        time_signature,
        note_density,
        polyrhythms_detected,
        metric_hierarchy: MetricHierarchy::for_time_signature(time_signature),
        complexity_score,
        bpm,
        total_beats: beats.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn beats_at(times: &[f32]) -> Vec<Beat> {
        times
            .iter()
            .enumerate()
            .map(|(i, &time)| Beat {
                time,
                position: i as u32 + 1,
                confidence: 0.8,
            })
            .collect()
    }

    #[test]
    fn test_on_grid_is_not_syncopated() {
        let times: Vec<f32> = (0..16).map(|i| i as f32 * 0.5).collect();
        assert_eq!(syncopation_index(&beats_at(&times), 120.0), 0.0);
    }

    #[test]
    fn test_offbeats_weighting() {
        // 120 BPM: beat 1 (strong), "and" of 1 (off), beat 2 (weak)
        let beats = beats_at(&[0.0, 0.25, 0.5]);
        // off = 1, on = 1 + 0.5
        assert!((syncopation_index(&beats, 120.0) - 1.0 / 2.5).abs() < 1e-6);
    }

    #[test]
    fn test_wraps_into_next_bar() {
        // 1.98 s at 120 BPM is phase 3.96 -> downbeat of the next bar
        let beats = beats_at(&[1.98]);
        assert_eq!(syncopation_index(&beats, 120.0), 0.0);
    }

    #[test]
    fn test_complexity_formula() {
        assert!((rhythmic_complexity(0.5, 5.0, false) - (0.2 + 0.15)).abs() < 1e-6);
        assert!((rhythmic_complexity(1.0, 20.0, false) - 0.7).abs() < 1e-6);
        assert_eq!(rhythmic_complexity(1.0, 20.0, true), 1.0);
    }

    #[test]
    fn test_analysis_fields() {
        let times: Vec<f32> = (0..20).map(|i| i as f32 * 0.5).collect();
        let analysis = analyze_rhythm(&beats_at(&times), 120.0, 10.0);

        assert_eq!(analysis.time_signature.name(), "4/4");
        assert_eq!(analysis.total_beats, 20);
        assert!((analysis.note_density - 2.0).abs() < 1e-6);
        assert!((analysis.complexity_score - 0.06).abs() < 1e-6);
        assert!(!analysis.polyrhythms_detected);
        assert_eq!(analysis.metric_hierarchy.strong_beats, vec![1, 3]);
        assert_eq!(analysis.metric_hierarchy.weak_beats, vec![2, 4]);
    }

    #[test]
    fn test_empty_beats() {
        let analysis = analyze_rhythm(&[], 120.0, 30.0);
        assert_eq!(analysis.syncopation_index, 0.0);
        assert_eq!(analysis.note_density, 0.0);
        assert_eq!(analysis.complexity_score, 0.0);
        assert_eq!(analysis.time_signature, TimeSignature::FourFour);
    }

    #[test]
    fn test_common_time_hierarchy() {
        let hierarchy = MetricHierarchy::for_time_signature(TimeSignature::FourFour);
        assert_eq!(hierarchy.beats_per_bar, 4);
        assert_eq!(hierarchy.strong_beats, vec![1, 3]);
        assert_eq!(hierarchy.weak_beats, vec![2, 4]);
        assert_eq!(TimeSignature::FourFour.name(), "4/4");
    }

    #[test]
    fn test_serialized_meter() {
        assert_eq!(
            serde_json::to_string(&TimeSignature::FourFour).unwrap(),
            "\"4/4\""
        );
    }
}
