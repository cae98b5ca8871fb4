//! Windowed chord-root detection
//!
//! The chroma matrix is cut into non-overlapping windows of
//! `chord_window_secs`; each window's root is the pitch class with the most
//! mean energy. Only roots are detected, every chord is named as a major
//! triad on that root.

use super::bounded::Outcome;
use super::FeatureExtractor;
use crate::analysis::result::ChordEvent;
use crate::features::ChromaMatrix;
use crate::io::AudioSignal;
use crate::theory::pitch::PitchClass;

/// Fixed detector confidence
pub const CHORD_CONFIDENCE: f32 = 0.7;

/// Index of the largest value; the first one wins ties
fn argmax(values: &[f32; 12]) -> usize {
    let mut best = 0;
    for (i, &v) in values.iter().enumerate().skip(1) {
        if v > values[best] {
            best = i;
        }
    }
    best
}

/// Chord roots over fixed windows of a chroma matrix
pub fn chords_from_chroma(
    chroma: &ChromaMatrix,
    window_secs: f32,
    max_chords: usize,
) -> Vec<ChordEvent> {
    let frame_rate = chroma.frame_rate();
    if !(frame_rate.is_finite() && frame_rate > 0.0) {
        log::warn!("Chroma has invalid frame rate {}", frame_rate);
        return Vec::new();
    }

    let n = chroma.num_frames();
    let step = ((window_secs * frame_rate).round() as usize).max(1);

    (0..n.saturating_sub(step))
        .step_by(step)
        .take(max_chords)
        .map(|start| {
            let end = (start + step).min(n - 1);
            ChordEvent {
                chord: PitchClass::from_index(argmax(&chroma.mean_over(start, start + step))),
                start_time: start as f32 / frame_rate,
                end_time: end as f32 / frame_rate,
                confidence: CHORD_CONFIDENCE,
            }
        })
        .collect()
}

impl FeatureExtractor {
    /// Detect the chord progression
    ///
    /// Returns no chords when chroma is unavailable.
    pub fn extract_chords(&self, signal: &AudioSignal) -> Vec<ChordEvent> {
        let sig = signal.clone();
        match self.bounded("chord_chroma", self.config().chroma_timeout(), move |p| {
            p.chroma(&sig)
        }) {
            Outcome::Succeeded(chroma) => {
                let chords = chords_from_chroma(
                    &chroma,
                    self.config().chord_window_secs,
                    self.config().max_chords,
                );
                log::info!("Chords: {} windows", chords.len());
                chords
            }
            _ => {
                log::warn!("Chroma unavailable, no chords detected");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn one_hot(pc: usize) -> [f32; 12] {
        let mut v = [0.0f32; 12];
        v[pc] = 1.0;
        v
    }

    #[test]
    fn test_window_roots() {
        // 4 fps -> 2-frame windows; C C G G A A F F (+1 trailing frame)
        let frames: Vec<[f32; 12]> = [0, 0, 7, 7, 9, 9, 5, 5, 5]
            .iter()
            .map(|&pc| one_hot(pc))
            .collect();
        let chroma = ChromaMatrix::new(frames, 4.0);

        let chords = chords_from_chroma(&chroma, 0.5, 50);
        let roots: Vec<PitchClass> = chords.iter().map(|c| c.chord).collect();
        assert_eq!(
            roots,
            vec![PitchClass::C, PitchClass::G, PitchClass::A, PitchClass::F]
        );
        assert_eq!(chords[1].start_time, 0.5);
        assert_eq!(chords[1].end_time, 1.0);
        assert!(chords.iter().all(|c| c.end_time > c.start_time));
        assert!(chords.iter().all(|c| c.confidence == CHORD_CONFIDENCE));
    }

    #[test]
    fn test_capped() {
        let frames = vec![one_hot(2); 1000];
        let chroma = ChromaMatrix::new(frames, 10.0);
        let chords = chords_from_chroma(&chroma, 0.5, 50);
        assert_eq!(chords.len(), 50);
        assert!(chords.iter().all(|c| c.chord == PitchClass::D));
    }

    #[test]
    fn test_too_short_for_a_window() {
        let chroma = ChromaMatrix::new(vec![one_hot(0); 2], 4.0);
        assert!(chords_from_chroma(&chroma, 0.5, 50).is_empty());
    }

    #[test]
    fn test_ties_pick_lowest_pitch_class() {
        let chroma = ChromaMatrix::new(vec![[0.0; 12]; 10], 4.0);
        let chords = chords_from_chroma(&chroma, 0.5, 50);
        assert!(chords.iter().all(|c| c.chord == PitchClass::C));
    }
}
