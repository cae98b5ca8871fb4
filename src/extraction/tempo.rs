//! Tempo selection and octave correction
//!
//! 1. Take the first candidate inside the preferred window, else the first one
//! 2. Above the correction threshold, try half then quarter tempo; accept the
//!    first that lands in the accept window
//! 3. Reset anything outside `[min_bpm, max_bpm]` to the default
//! 4. Round to two decimals

use super::bounded::Outcome;
use super::FeatureExtractor;
use crate::config::AnalysisConfig;
use crate::io::AudioSignal;

/// Pick the raw tempo from ranked candidates
///
/// Returns `None` for an empty candidate list.
pub fn select_candidate(candidates: &[f32], config: &AnalysisConfig) -> Option<f32> {
    let (lo, hi) = config.preferred_bpm_range;
    candidates
        .iter()
        .copied()
        .find(|bpm| (lo..=hi).contains(bpm))
        .or_else(|| candidates.first().copied())
}

/// Fold likely double/quadruple-time detections back into range
pub fn correct_octave(bpm: f32, config: &AnalysisConfig) -> f32 {
    if bpm <= config.octave_correction_threshold {
        return bpm;
    }
    let (lo, hi) = config.octave_accept_range;
    for divisor in [2.0f32, 4.0] {
        let candidate = bpm / divisor;
        if (lo..=hi).contains(&candidate) {
            log::debug!(
                "Octave correction: {:.2} -> {:.2} BPM (/{})",
                bpm,
                candidate,
                divisor
            );
            return candidate;
        }
    }
    bpm
}

/// Clamp-reset and round a corrected tempo
pub fn finalize_tempo(bpm: f32, config: &AnalysisConfig) -> f32 {
    let bpm = if (config.min_bpm..=config.max_bpm).contains(&bpm) {
        bpm
    } else {
        log::warn!(
            "Tempo {:.2} outside [{:.0}, {:.0}], using default {:.0}",
            bpm,
            config.min_bpm,
            config.max_bpm,
            config.default_bpm
        );
        config.default_bpm
    };
    (bpm * 100.0).round() / 100.0
}

/// Full tempo decision from a candidate list
pub fn tempo_from_candidates(candidates: &[f32], config: &AnalysisConfig) -> f32 {
    match select_candidate(candidates, config) {
        Some(raw) => finalize_tempo(correct_octave(raw, config), config),
        None => {
            log::warn!(
                "No tempo candidates, using default {:.0} BPM",
                config.default_bpm
            );
            config.default_bpm
        }
    }
}

impl FeatureExtractor {
    /// Estimate the corrected tempo in BPM
    ///
    /// Falls back to the default tempo when the onset envelope or the
    /// candidate search is unavailable.
    pub fn extract_tempo(&self, signal: &AudioSignal) -> f32 {
        let config = self.config();
        let default_bpm = config.default_bpm;

        let sig = signal.clone();
        let envelope = match self.bounded("onset_envelope", config.onset_timeout(), move |p| {
            p.onset_envelope(&sig)
        }) {
            Outcome::Succeeded(envelope) => envelope,
            _ => {
                log::warn!("Onset envelope unavailable, tempo defaults to {:.0} BPM", default_bpm);
                return default_bpm;
            }
        };

        let candidates = match self.bounded("tempo_candidates", config.tempo_timeout(), move |p| {
            p.tempo_candidates(&envelope)
        }) {
            Outcome::Succeeded(candidates) => candidates,
            _ => {
                log::warn!(
                    "Tempo candidates unavailable, tempo defaults to {:.0} BPM",
                    default_bpm
                );
                return default_bpm;
            }
        };

        let bpm = tempo_from_candidates(&candidates, config);
        log::info!("Tempo: {:.2} BPM (from {} candidates)", bpm, candidates.len());
        bpm
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> AnalysisConfig {
        AnalysisConfig::default()
    }

    #[test]
    fn test_prefers_candidate_in_window() {
        assert_eq!(select_candidate(&[180.0, 65.0, 128.0], &cfg()), Some(128.0));
        assert_eq!(select_candidate(&[184.0, 70.0], &cfg()), Some(184.0));
        assert_eq!(select_candidate(&[], &cfg()), None);
    }

    #[test]
    fn test_half_tempo_accepted() {
        assert_eq!(tempo_from_candidates(&[184.0], &cfg()), 92.0);
    }

    #[test]
    fn test_quarter_tempo_when_half_too_fast() {
        // 300 / 2 = 150 is outside [60, 140]; 300 / 4 = 75 is inside
        assert_eq!(correct_octave(300.0, &cfg()), 75.0);
    }

    #[test]
    fn test_below_threshold_untouched() {
        assert_eq!(correct_octave(155.0, &cfg()), 155.0);
        assert_eq!(tempo_from_candidates(&[155.0], &cfg()), 155.0);
    }

    #[test]
    fn test_out_of_range_reset() {
        // 700 -> 350 -> 175: neither accepted, stays 700, reset to default
        assert_eq!(tempo_from_candidates(&[700.0], &cfg()), 120.0);
        assert_eq!(tempo_from_candidates(&[45.0], &cfg()), 120.0);
        assert_eq!(tempo_from_candidates(&[f32::NAN], &cfg()), 120.0);
    }

    #[test]
    fn test_rounding() {
        assert_eq!(tempo_from_candidates(&[123.4567], &cfg()), 123.46);
    }

    #[test]
    fn test_empty_candidates_default() {
        assert_eq!(tempo_from_candidates(&[], &cfg()), 120.0);
    }
}
