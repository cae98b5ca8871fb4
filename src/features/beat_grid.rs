//! Onset-aligned beat tracking at a fixed tempo
//!
//! 1. Beat period in frames: `period = 60 * frame_rate / bpm`
//! 2. Choose the phase in `[0, period)` whose grid collects the most onset energy
//! 3. Walk the grid and snap each predicted beat to the strongest envelope frame
//!    within ±`tolerance * period`
//!
//! The result stays strictly increasing even when snapping pulls two
//! predictions toward the same onset.

use super::{FrameSequence, OnsetEnvelope};
use crate::error::AnalysisError;

/// Fraction of the beat period a beat may move when snapping to an onset
pub const SNAP_TOLERANCE: f32 = 0.1;

/// Track beats against a known tempo
pub fn track_beats(envelope: &OnsetEnvelope, bpm: f32) -> Result<FrameSequence, AnalysisError> {
    if !(bpm.is_finite() && bpm > 0.0) {
        return Err(AnalysisError::InvalidInput(format!(
            "Invalid BPM for beat tracking: {}",
            bpm
        )));
    }
    if envelope.frame_rate <= 0.0 {
        return Err(AnalysisError::InvalidInput(format!(
            "Invalid envelope frame rate: {}",
            envelope.frame_rate
        )));
    }

    let frame_rate = envelope.frame_rate;
    let n = envelope.len();
    if n == 0 {
        return Ok(FrameSequence {
            frames: Vec::new(),
            frame_rate,
        });
    }

    let period = 60.0 * frame_rate / bpm;
    let phase = best_phase(&envelope.values, period);
    let radius = (period * SNAP_TOLERANCE).round() as usize;

    log::debug!(
        "Tracking beats: {} frames, period {:.2} frames, phase {}",
        n,
        period,
        phase
    );

    let mut frames: Vec<usize> = Vec::new();
    let mut k = 0usize;
    loop {
        let predicted = (phase as f32 + k as f32 * period).round() as usize;
        if predicted >= n {
            break;
        }
        let lo = predicted.saturating_sub(radius);
        let hi = (predicted + radius).min(n - 1);

        let mut snapped = predicted;
        for i in lo..=hi {
            if envelope.values[i] > envelope.values[snapped] {
                snapped = i;
            }
        }

        match frames.last() {
            Some(&last) if snapped <= last => {
                if predicted > last {
                    frames.push(predicted);
                }
            }
            _ => frames.push(snapped),
        }
        k += 1;
    }

    Ok(FrameSequence { frames, frame_rate })
}

/// Phase offset (in frames) whose beat grid collects the most onset strength
fn best_phase(values: &[f32], period: f32) -> usize {
    let max_phase = (period.ceil() as usize).max(1).min(values.len());
    let mut best = (0usize, f32::MIN);

    for phase in 0..max_phase {
        let mut score = 0.0f32;
        let mut k = 0usize;
        loop {
            let idx = (phase as f32 + k as f32 * period).round() as usize;
            if idx >= values.len() {
                break;
            }
            score += values[idx];
            k += 1;
        }
        if score > best.1 {
            best = (phase, score);
        }
    }

    best.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finds_offset_grid() {
        // 120 BPM at 100 fps -> period 50, onsets start at frame 20
        let mut values = vec![0.0f32; 1000];
        for i in (20..1000).step_by(50) {
            values[i] = 1.0;
        }
        let env = OnsetEnvelope {
            values,
            frame_rate: 100.0,
        };

        let beats = track_beats(&env, 120.0).unwrap();
        assert_eq!(beats.frames[0], 20);
        assert_eq!(beats.frames.len(), 20);
        assert!(beats.frames.windows(2).all(|w| w[1] - w[0] == 50));
    }

    #[test]
    fn test_snaps_to_nearby_onsets() {
        let mut values = vec![0.0f32; 400];
        // Slightly early/late onsets around a 50-frame grid
        for (i, &f) in [0usize, 52, 98, 151, 200, 247, 300, 353].iter().enumerate() {
            values[f] = 1.0 - i as f32 * 0.01;
        }
        let env = OnsetEnvelope {
            values,
            frame_rate: 100.0,
        };

        let beats = track_beats(&env, 120.0).unwrap();
        assert_eq!(&beats.frames[..8], &[0, 52, 98, 151, 200, 247, 300, 353]);
    }

    #[test]
    fn test_strictly_increasing() {
        let env = OnsetEnvelope {
            values: (0..500).map(|i| ((i * 7919) % 13) as f32 / 13.0).collect(),
            frame_rate: 100.0,
        };
        let beats = track_beats(&env, 177.0).unwrap();
        assert!(beats.frames.windows(2).all(|w| w[1] > w[0]));
    }

    #[test]
    fn test_invalid_bpm() {
        let env = OnsetEnvelope {
            values: vec![0.0; 10],
            frame_rate: 100.0,
        };
        assert!(track_beats(&env, 0.0).is_err());
        assert!(track_beats(&env, f32::NAN).is_err());
    }
}
