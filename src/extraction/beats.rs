//! Beat grid extraction with synthetic fallbacks

use super::bounded::Outcome;
use super::FeatureExtractor;
use crate::analysis::result::Beat;
use crate::io::AudioSignal;

/// Confidence of beats tracked by the primitive
pub const TRACKED_CONFIDENCE: f32 = 0.8;

/// Confidence of a grid synthesized after a timeout
pub const TIMEOUT_GRID_CONFIDENCE: f32 = 0.5;

/// Confidence of a grid synthesized after the count sanity check failed
pub const IMPLAUSIBLE_GRID_CONFIDENCE: f32 = 0.6;

/// Fixed-interval beats at `60 / bpm` seconds from t = 0 up to `duration`
pub fn synthesize_grid(bpm: f32, duration: f32, confidence: f32) -> Vec<Beat> {
    if !(bpm.is_finite() && bpm > 0.0 && duration > 0.0) {
        return Vec::new();
    }
    let interval = 60.0 / bpm;
    let mut beats = Vec::new();
    let mut i = 0u32;
    loop {
        let time = i as f32 * interval;
        if time >= duration {
            break;
        }
        beats.push(Beat {
            time,
            position: i + 1,
            confidence,
        });
        i += 1;
    }
    beats
}

/// Whether `count` tracked beats are consistent with `bpm` over `duration`
///
/// Expected count is `floor(bpm * duration / 60)`; more than 50% deviation
/// is rejected.
pub fn beat_count_plausible(count: usize, bpm: f32, duration: f32) -> bool {
    let expected = (bpm * duration / 60.0).floor();
    (count as f32 - expected).abs() <= 0.5 * expected
}

/// Tracked beat times as sorted, 1-based beat records
pub fn beats_from_times(times: &[f32]) -> Vec<Beat> {
    let mut times: Vec<f32> = times
        .iter()
        .copied()
        .filter(|t| t.is_finite() && *t >= 0.0)
        .collect();
    times.sort_by(f32::total_cmp);

    times
        .into_iter()
        .enumerate()
        .map(|(i, time)| Beat {
            time,
            position: i as u32 + 1,
            confidence: TRACKED_CONFIDENCE,
        })
        .collect()
}

impl FeatureExtractor {
    /// Estimate the tempo, then track beats against it
    pub fn extract_beats(&self, signal: &AudioSignal) -> Vec<Beat> {
        let bpm = self.extract_tempo(signal);
        self.extract_beats_at(signal, bpm)
    }

    /// Track beats against an already corrected tempo
    ///
    /// A timeout in either step yields a synthetic grid (confidence 0.5); a
    /// primitive failure yields no beats.
    pub fn extract_beats_at(&self, signal: &AudioSignal, bpm: f32) -> Vec<Beat> {
        let duration = signal.duration();

        let sig = signal.clone();
        let onset_budget = self.config().onset_timeout();
        let envelope = match self.bounded("beat_onset_envelope", onset_budget, move |p| {
            p.onset_envelope(&sig)
        }) {
            Outcome::Succeeded(envelope) => envelope,
            Outcome::TimedOut => {
                log::warn!("Onset envelope timed out, synthesizing {:.2} BPM grid", bpm);
                return synthesize_grid(bpm, duration, TIMEOUT_GRID_CONFIDENCE);
            }
            Outcome::Failed(_) => return Vec::new(),
        };

        let frames = match self.bounded("beat_frames", self.config().beat_timeout(), move |p| {
            p.beat_frames(&envelope, bpm)
        }) {
            Outcome::Succeeded(frames) => frames,
            Outcome::TimedOut => {
                log::warn!("Beat tracking timed out, synthesizing {:.2} BPM grid", bpm);
                return synthesize_grid(bpm, duration, TIMEOUT_GRID_CONFIDENCE);
            }
            Outcome::Failed(_) => return Vec::new(),
        };

        let beats = beats_from_times(&frames.times());
        if !beat_count_plausible(beats.len(), bpm, duration) {
            log::warn!(
                "Tracked {} beats, expected ~{:.0} at {:.2} BPM; using synthetic grid",
                beats.len(),
                (bpm * duration / 60.0).floor(),
                bpm
            );
            return synthesize_grid(bpm, duration, IMPLAUSIBLE_GRID_CONFIDENCE);
        }

        log::info!("Beats: {} tracked", beats.len());
        beats
    }
}
